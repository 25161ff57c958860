//! IAM enablement checks.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::Client;
use crate::error::Result;
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, impl_envelope, nullable};

/// Without a role ARN the body is `{}` and the broker answers for the
/// caller's own STS role.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IsIamEnabledRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role_arn: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsIamEnabledResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub role_arn: String,
    #[serde(default)]
    pub iam_enabled: bool,
}

impl_envelope!(IsIamEnabledResponse);

pub(crate) fn is_iam_enabled_call(role_arn: Option<&str>) -> Result<Call> {
    let role_arn = role_arn.filter(|arn| !arn.is_empty());
    Call::json(
        Method::POST,
        "/isIamEnabled",
        &IsIamEnabledRequest { role_arn },
        DecodePolicy::Envelope,
        "IAM enablement response",
    )
}

impl Client {
    /// Checks whether a machine identity role, or the caller's own STS role
    /// when `role_arn` is `None`, has IAM access.
    pub async fn is_iam_enabled(&self, role_arn: Option<&str>) -> Result<IsIamEnabledResponse> {
        match role_arn {
            Some(arn) => info!("Is IAM enabled for MI: {}", arn),
            None => info!("Is IAM enabled for STS: {}", self.account().role()),
        }
        self.execute(is_iam_enabled_call(role_arn)?).await
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    /// Checks whether a machine identity role, or the caller's own STS role
    /// when `role_arn` is `None`, has IAM access.
    pub fn is_iam_enabled(&self, role_arn: Option<&str>) -> Result<IsIamEnabledResponse> {
        match role_arn {
            Some(arn) => info!("Is IAM enabled for MI: {}", arn),
            None => info!("Is IAM enabled for STS: {}", self.account().role()),
        }
        self.execute(is_iam_enabled_call(role_arn)?)
    }
}
