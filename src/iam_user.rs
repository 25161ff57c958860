//! IAM users and their access keys, scoped by the client's account context.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;
use crate::long_term_key::LongTermKey;
use crate::request::Call;
use crate::response::{BaseResponse, Tag, impl_envelope, nullable};

/// Options for creating or updating an IAM user.
///
/// Creating requires `iam_user_name`; `tags` is optional. Updating requires
/// both. `Some(vec![])` clears the user's tags, while `None` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IamUserOptions {
    pub iam_user_name: Option<String>,
    pub tags: Option<Vec<Tag>>,
}

impl IamUserOptions {
    pub fn new(iam_user_name: impl Into<String>) -> Self {
        Self {
            iam_user_name: Some(iam_user_name.into()),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    fn user_name(&self) -> Result<&str> {
        self.iam_user_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AlksError::Validation("IAM user name is required".into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamUser {
    #[serde(default, deserialize_with = "nullable")]
    pub arn: String,
    #[serde(default, deserialize_with = "nullable")]
    pub account_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub access_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IamUserResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(rename = "item", default)]
    pub user: IamUser,
}

impl_envelope!(IamUserResponse);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetIamUsersResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(rename = "longTermKeys", default, deserialize_with = "nullable")]
    pub iam_users: Vec<LongTermKey>,
}

impl_envelope!(GetIamUsersResponse);

/// A newly created IAM user and its access key.
///
/// The `Debug` implementation redacts `secret_key`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIamUserResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub account: String,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(rename = "iamUserName", default, deserialize_with = "nullable")]
    pub iam_user_name: String,
    #[serde(rename = "iamUserArn", default, deserialize_with = "nullable")]
    pub iam_user_arn: String,
    #[serde(rename = "addedIAMUserToGroup", default)]
    pub added_iam_user_to_group: bool,
    #[serde(default)]
    pub partial_error: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub access_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub secret_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

impl_envelope!(CreateIamUserResponse);

impl std::fmt::Debug for CreateIamUserResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateIamUserResponse")
            .field("base", &self.base)
            .field("account", &self.account)
            .field("action", &self.action)
            .field("iam_user_name", &self.iam_user_name)
            .field("iam_user_arn", &self.iam_user_arn)
            .field("added_iam_user_to_group", &self.added_iam_user_to_group)
            .field("partial_error", &self.partial_error)
            .field("access_key", &self.access_key)
            .field("secret_key", &"****")
            .field("tags", &self.tags)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIamUserResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(rename = "addedIAMUserToGroup", default)]
    pub added_iam_user_to_group: bool,
    #[serde(default)]
    pub partial_error: bool,
}

impl_envelope!(DeleteIamUserResponse);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IamUserRequest<'a> {
    #[serde(flatten)]
    account: &'a AccountContext,
    iam_user_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [Tag]>,
}

#[derive(Serialize)]
struct UpdateIamUserRequest<'a> {
    tags: &'a [Tag],
}

fn user_path(account: &AccountContext) -> String {
    format!("/iam-users/id/{}/{}", account.account_id(), account.role())
}

pub(crate) fn list_call(account: &AccountContext) -> Call {
    Call::new(
        Method::GET,
        user_path(account),
        DecodePolicy::StatusCode,
        "IAM users response",
    )
}

pub(crate) fn get_call(account: &AccountContext, iam_user_name: &str) -> Result<Call> {
    if iam_user_name.is_empty() {
        return Err(AlksError::Validation("IAM user name is required".into()));
    }
    Ok(Call::new(
        Method::GET,
        format!("{}/{}", user_path(account), iam_user_name),
        DecodePolicy::StatusCode,
        "IAM user response",
    ))
}

pub(crate) fn create_call(account: &AccountContext, options: &IamUserOptions) -> Result<Call> {
    let request = IamUserRequest {
        account,
        iam_user_name: options.user_name()?,
        tags: options.tags.as_deref(),
    };
    Call::json(
        Method::POST,
        "/accessKeys",
        &request,
        DecodePolicy::StatusCode,
        "create IAM user response",
    )
}

pub(crate) fn update_call(account: &AccountContext, options: &IamUserOptions) -> Result<Call> {
    let iam_user_name = options.user_name()?;
    let tags = options
        .tags
        .as_deref()
        .ok_or_else(|| AlksError::Validation("tags are required to update an IAM user".into()))?;
    Call::json(
        Method::PATCH,
        format!("{}/{}", user_path(account), iam_user_name),
        &UpdateIamUserRequest { tags },
        DecodePolicy::StatusCode,
        "update IAM user response",
    )
}

pub(crate) fn delete_call(account: &AccountContext, iam_user_name: &str) -> Result<Call> {
    if iam_user_name.is_empty() {
        return Err(AlksError::Validation("IAM user name is required".into()));
    }
    Call::json(
        Method::DELETE,
        "/IAMUser",
        &IamUserRequest {
            account,
            iam_user_name,
            tags: None,
        },
        DecodePolicy::StatusCode,
        "delete IAM user response",
    )
}

impl Client {
    /// Lists the IAM users of the client's account.
    pub async fn get_iam_users(&self) -> Result<GetIamUsersResponse> {
        info!("Getting IAM users for: {}", self.account().account());
        self.execute(list_call(self.account())).await
    }

    pub async fn get_iam_user(&self, iam_user_name: &str) -> Result<IamUserResponse> {
        info!("Getting IAM user: {}", iam_user_name);
        self.execute(get_call(self.account(), iam_user_name)?).await
    }

    /// Creates an IAM user with an access key.
    pub async fn create_iam_user(&self, options: &IamUserOptions) -> Result<CreateIamUserResponse> {
        info!("Creating IAM user: {:?}", options.iam_user_name);
        self.execute(create_call(self.account(), options)?).await
    }

    /// Replaces the tags of an IAM user.
    pub async fn update_iam_user(&self, options: &IamUserOptions) -> Result<IamUserResponse> {
        info!("Updating IAM user: {:?}", options.iam_user_name);
        self.execute(update_call(self.account(), options)?).await
    }

    pub async fn delete_iam_user(&self, iam_user_name: &str) -> Result<DeleteIamUserResponse> {
        info!("Deleting IAM user: {}", iam_user_name);
        self.execute(delete_call(self.account(), iam_user_name)?).await
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    pub fn get_iam_users(&self) -> Result<GetIamUsersResponse> {
        info!("Getting IAM users for: {}", self.account().account());
        self.execute(list_call(self.account()))
    }

    pub fn get_iam_user(&self, iam_user_name: &str) -> Result<IamUserResponse> {
        info!("Getting IAM user: {}", iam_user_name);
        self.execute(get_call(self.account(), iam_user_name)?)
    }

    pub fn create_iam_user(&self, options: &IamUserOptions) -> Result<CreateIamUserResponse> {
        info!("Creating IAM user: {:?}", options.iam_user_name);
        self.execute(create_call(self.account(), options)?)
    }

    pub fn update_iam_user(&self, options: &IamUserOptions) -> Result<IamUserResponse> {
        info!("Updating IAM user: {:?}", options.iam_user_name);
        self.execute(update_call(self.account(), options)?)
    }

    pub fn delete_iam_user(&self, iam_user_name: &str) -> Result<DeleteIamUserResponse> {
        info!("Deleting IAM user: {}", iam_user_name);
        self.execute(delete_call(self.account(), iam_user_name)?)
    }
}
