//! Machine identity bindings for IAM roles.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, impl_envelope, nullable};

#[derive(Serialize)]
struct MachineIdentityRequest<'a> {
    #[serde(flatten)]
    account: &'a AccountContext,
    #[serde(rename = "roleARN")]
    role_arn: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineIdentityResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub machine_identity_arn: String,
}

impl_envelope!(MachineIdentityResponse);

fn machine_identity_call(
    account: &AccountContext,
    role_arn: &str,
    method: Method,
    path: &str,
) -> Result<Call> {
    if role_arn.is_empty() {
        return Err(AlksError::Validation("role ARN is required".into()));
    }
    Call::json(
        method,
        path,
        &MachineIdentityRequest { account, role_arn },
        DecodePolicy::Envelope,
        "machine identity response",
    )
}

pub(crate) fn add_call(account: &AccountContext, role_arn: &str) -> Result<Call> {
    machine_identity_call(account, role_arn, Method::POST, "/roleMachineIdentity/")
}

pub(crate) fn delete_call(account: &AccountContext, role_arn: &str) -> Result<Call> {
    machine_identity_call(account, role_arn, Method::DELETE, "/roleMachineIdentity/")
}

pub(crate) fn search_call(account: &AccountContext, role_arn: &str) -> Result<Call> {
    machine_identity_call(account, role_arn, Method::POST, "/roleMachineIdentity/search/")
}

impl Client {
    /// Registers the role as a machine identity.
    pub async fn add_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Adding machine identity: {}", role_arn);
        self.execute(add_call(self.account(), role_arn)?).await
    }

    /// Removes the machine identity binding of the role.
    pub async fn delete_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Deleting machine identity: {}", role_arn);
        self.execute(delete_call(self.account(), role_arn)?).await
    }

    /// Finds the machine identity bound to the role.
    pub async fn search_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Searching machine identity: {}", role_arn);
        self.execute(search_call(self.account(), role_arn)?).await
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    pub fn add_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Adding machine identity: {}", role_arn);
        self.execute(add_call(self.account(), role_arn)?)
    }

    pub fn delete_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Deleting machine identity: {}", role_arn);
        self.execute(delete_call(self.account(), role_arn)?)
    }

    pub fn search_role_machine_identity(&self, role_arn: &str) -> Result<MachineIdentityResponse> {
        info!("Searching machine identity: {}", role_arn);
        self.execute(search_call(self.account(), role_arn)?)
    }
}
