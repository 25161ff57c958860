//! IAM role management.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, Tag, impl_envelope, nullable};

/// Options for creating an IAM role.
///
/// [`Client::create_iam_role`] takes a `role_type` or a `trust_policy` (not
/// both); [`Client::create_iam_trust_role`] takes a `role_type` and a
/// `trust_arn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIamRoleOptions {
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_policy: Option<Value>,
    /// Attach the broker's default policies to the new role.
    #[serde(rename = "includeDefaultPolicy", serialize_with = "as_flag")]
    pub include_default_policies: bool,
    /// Make the role usable as a machine identity.
    pub enable_alks_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_fields: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_session_duration_in_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// ARN of the role trusted by a cross-account role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_arn: Option<String>,
}

/// The broker expects `includeDefaultPolicy` as 0 or 1.
fn as_flag<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

impl CreateIamRoleOptions {
    /// Options for a role named `role_name` of the given `role_type`.
    pub fn new(role_name: impl Into<String>, role_type: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            role_type: Some(role_type.into()),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.role_name.is_empty() {
            return Err(AlksError::Validation("role name is required".into()));
        }
        match (&self.role_type, &self.trust_policy) {
            (Some(_), Some(_)) => Err(AlksError::Validation(
                "role type and trust policy are mutually exclusive".into(),
            )),
            (None, None) => Err(AlksError::Validation(
                "either a role type or a trust policy is required".into(),
            )),
            _ if self.trust_arn.is_some() => Err(AlksError::Validation(
                "trust ARN is only accepted when creating a trust role".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_trust(&self) -> Result<()> {
        if self.role_name.is_empty() {
            return Err(AlksError::Validation("role name is required".into()));
        }
        if self.role_type.as_deref().is_none_or(str::is_empty) {
            return Err(AlksError::Validation("trust role requires a role type".into()));
        }
        if self.trust_policy.is_some() {
            return Err(AlksError::Validation(
                "trust policy is not accepted when creating a trust role".into(),
            ));
        }
        if self.trust_arn.as_deref().is_none_or(str::is_empty) {
            return Err(AlksError::Validation("trust role requires a trust ARN".into()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CreateRoleRequest<'a> {
    #[serde(flatten)]
    account: &'a AccountContext,
    #[serde(flatten)]
    options: &'a CreateIamRoleOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleNameRequest<'a> {
    #[serde(flatten)]
    account: &'a AccountContext,
    role_name: &'a str,
}

/// An IAM role as reported by the broker.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamRole {
    #[serde(default, deserialize_with = "nullable")]
    pub role_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub role_type: String,
    #[serde(default)]
    pub trust_policy: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub role_arn: String,
    #[serde(rename = "instanceProfileArn", default, deserialize_with = "nullable")]
    pub role_ip_arn: String,
    #[serde(rename = "addedRoleToInstanceProfile", default)]
    pub role_added_to_ip: bool,
    #[serde(rename = "roleExists", default)]
    pub exists: bool,
    #[serde(rename = "machineIdentity", default)]
    pub alks_access: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub template_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub max_session_duration_in_seconds: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IamRoleResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub role: IamRole,
}

impl_envelope!(IamRoleResponse);

/// A partial update of an IAM role. Fields left `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIamRoleRequest {
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_policy: Option<Value>,
}

impl UpdateIamRoleRequest {
    fn validate(&self) -> Result<()> {
        if self.role_name.is_empty() {
            return Err(AlksError::Validation("role name is required".into()));
        }
        if self.tags.is_none() && self.trust_policy.is_none() {
            return Err(AlksError::Validation(
                "nothing to update: provide tags or a trust policy".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct UpdateRoleBody<'a> {
    #[serde(flatten)]
    account: &'a AccountContext,
    #[serde(flatten)]
    request: &'a UpdateIamRoleRequest,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIamRoleResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub role_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub role_arn: String,
    #[serde(rename = "instanceProfileArn", default, deserialize_with = "nullable")]
    pub role_ip_arn: String,
    #[serde(rename = "roleExists", default)]
    pub exists: bool,
    #[serde(default)]
    pub basic_auth_used: bool,
    #[serde(rename = "isMachineIdentity", default)]
    pub alks_access: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

impl_envelope!(UpdateIamRoleResponse);

pub(crate) fn create_role_call(account: &AccountContext, options: &CreateIamRoleOptions) -> Result<Call> {
    options.validate()?;
    Call::json(
        Method::POST,
        "/createRole/",
        &CreateRoleRequest { account, options },
        DecodePolicy::StatusCode,
        "create role response",
    )
}

pub(crate) fn create_trust_role_call(
    account: &AccountContext,
    options: &CreateIamRoleOptions,
) -> Result<Call> {
    options.validate_trust()?;
    Call::json(
        Method::POST,
        "/createNonServiceRole/",
        &CreateRoleRequest { account, options },
        DecodePolicy::StatusCode,
        "create trust role response",
    )
}

fn role_name_call(
    account: &AccountContext,
    role_name: &str,
    path: &str,
    what: &'static str,
) -> Result<Call> {
    if role_name.is_empty() {
        return Err(AlksError::Validation("role name is required".into()));
    }
    Call::json(
        Method::POST,
        path,
        &RoleNameRequest { account, role_name },
        DecodePolicy::StatusCode,
        what,
    )
}

pub(crate) fn get_role_call(account: &AccountContext, role_name: &str) -> Result<Call> {
    role_name_call(account, role_name, "/getAccountRole/", "role response")
}

pub(crate) fn delete_role_call(account: &AccountContext, role_name: &str) -> Result<Call> {
    role_name_call(account, role_name, "/deleteRole/", "delete role response")
}

pub(crate) fn update_role_call(account: &AccountContext, request: &UpdateIamRoleRequest) -> Result<Call> {
    request.validate()?;
    Call::json(
        Method::PATCH,
        "/role/",
        &UpdateRoleBody { account, request },
        DecodePolicy::StatusCode,
        "update role response",
    )
}

fn found(response: IamRoleResponse) -> Option<IamRoleResponse> {
    response.role.exists.then_some(response)
}

impl Client {
    /// Creates an IAM role from a role type or an inline trust policy.
    pub async fn create_iam_role(&self, options: &CreateIamRoleOptions) -> Result<IamRoleResponse> {
        info!("Creating IAM role: {}", options.role_name);
        self.execute(create_role_call(self.account(), options)?).await
    }

    /// Creates a cross-account role trusting `options.trust_arn`.
    pub async fn create_iam_trust_role(&self, options: &CreateIamRoleOptions) -> Result<IamRoleResponse> {
        info!("Creating IAM trust role: {}", options.role_name);
        self.execute(create_trust_role_call(self.account(), options)?).await
    }

    /// Looks up a role by name. Returns `Ok(None)` if the broker reports the
    /// role does not exist.
    pub async fn get_iam_role(&self, role_name: &str) -> Result<Option<IamRoleResponse>> {
        info!("Getting IAM role: {}", role_name);
        let response = self.execute(get_role_call(self.account(), role_name)?).await?;
        Ok(found(response))
    }

    /// Updates the tags and/or trust policy of an existing role.
    pub async fn update_iam_role(&self, request: &UpdateIamRoleRequest) -> Result<UpdateIamRoleResponse> {
        info!("Updating IAM role: {}", request.role_name);
        self.execute(update_role_call(self.account(), request)?).await
    }

    pub async fn delete_iam_role(&self, role_name: &str) -> Result<()> {
        info!("Deleting IAM role: {}", role_name);
        let _: BaseResponse = self.execute(delete_role_call(self.account(), role_name)?).await?;
        Ok(())
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    /// Creates an IAM role from a role type or an inline trust policy.
    pub fn create_iam_role(&self, options: &CreateIamRoleOptions) -> Result<IamRoleResponse> {
        info!("Creating IAM role: {}", options.role_name);
        self.execute(create_role_call(self.account(), options)?)
    }

    /// Creates a cross-account role trusting `options.trust_arn`.
    pub fn create_iam_trust_role(&self, options: &CreateIamRoleOptions) -> Result<IamRoleResponse> {
        info!("Creating IAM trust role: {}", options.role_name);
        self.execute(create_trust_role_call(self.account(), options)?)
    }

    /// Looks up a role by name. Returns `Ok(None)` if it does not exist.
    pub fn get_iam_role(&self, role_name: &str) -> Result<Option<IamRoleResponse>> {
        info!("Getting IAM role: {}", role_name);
        let response = self.execute(get_role_call(self.account(), role_name)?)?;
        Ok(found(response))
    }

    pub fn update_iam_role(&self, request: &UpdateIamRoleRequest) -> Result<UpdateIamRoleResponse> {
        info!("Updating IAM role: {}", request.role_name);
        self.execute(update_role_call(self.account(), request)?)
    }

    pub fn delete_iam_role(&self, role_name: &str) -> Result<()> {
        info!("Deleting IAM role: {}", role_name);
        let _: BaseResponse = self.execute(delete_role_call(self.account(), role_name)?)?;
        Ok(())
    }
}
