//! Long-term keys addressed by explicit account id, role and alias.
//!
//! These are the older spelling of the IAM user operations in
//! [`crate::iam_user`], scoped by arguments instead of the client's account
//! context.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;
use crate::iam_user::{CreateIamUserResponse, DeleteIamUserResponse};
use crate::request::Call;
use crate::response::{BaseResponse, Tag, impl_envelope, nullable};

/// An access key owned by an IAM user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermKey {
    #[serde(default, deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub access_key_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub create_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLongTermKeysResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    pub long_term_keys: Vec<LongTermKey>,
}

impl_envelope!(GetLongTermKeysResponse);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LongTermKeyRequest<'a> {
    account: String,
    iam_user_name: &'a str,
}

pub(crate) fn list_call(account_id: &str, role: &str) -> Result<Call> {
    if account_id.is_empty() || role.is_empty() {
        return Err(AlksError::Validation("account id and role are required".into()));
    }
    Ok(Call::new(
        Method::GET,
        format!("/ltks/{}/{}", account_id, role),
        DecodePolicy::Envelope,
        "long term keys response",
    ))
}

fn key_call(
    method: Method,
    path: &str,
    account_id: &str,
    role: &str,
    alias: &str,
    iam_user_name: &str,
    what: &'static str,
) -> Result<Call> {
    if iam_user_name.is_empty() {
        return Err(AlksError::Validation("IAM user name is required".into()));
    }
    let request = LongTermKeyRequest {
        account: AccountContext::compose(account_id, role, alias),
        iam_user_name,
    };
    Call::json(method, path, &request, DecodePolicy::Envelope, what)
}

pub(crate) fn create_call(account_id: &str, role: &str, alias: &str, iam_user_name: &str) -> Result<Call> {
    key_call(
        Method::POST,
        "/accessKeys",
        account_id,
        role,
        alias,
        iam_user_name,
        "create long term key response",
    )
}

pub(crate) fn delete_call(account_id: &str, role: &str, alias: &str, iam_user_name: &str) -> Result<Call> {
    key_call(
        Method::DELETE,
        "/IAMUser",
        account_id,
        role,
        alias,
        iam_user_name,
        "delete long term key response",
    )
}

impl Client {
    /// Lists the long-term keys of an account/role.
    pub async fn get_long_term_keys(&self, account_id: &str, role: &str) -> Result<GetLongTermKeysResponse> {
        info!("Getting long term keys for: {}/{}", account_id, role);
        self.execute(list_call(account_id, role)?).await
    }

    /// Creates an IAM user with a long-term key.
    pub async fn create_long_term_key(
        &self,
        account_id: &str,
        role: &str,
        alias: &str,
        iam_user_name: &str,
    ) -> Result<CreateIamUserResponse> {
        info!("Creating long term key for: {}/{} - {}", account_id, role, alias);
        self.execute(create_call(account_id, role, alias, iam_user_name)?).await
    }

    /// Deletes an IAM user and its long-term keys.
    pub async fn delete_long_term_key(
        &self,
        account_id: &str,
        role: &str,
        alias: &str,
        iam_user_name: &str,
    ) -> Result<DeleteIamUserResponse> {
        info!("Deleting long term key user for: {}/{} - {}", account_id, role, alias);
        self.execute(delete_call(account_id, role, alias, iam_user_name)?).await
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    pub fn get_long_term_keys(&self, account_id: &str, role: &str) -> Result<GetLongTermKeysResponse> {
        info!("Getting long term keys for: {}/{}", account_id, role);
        self.execute(list_call(account_id, role)?)
    }

    pub fn create_long_term_key(
        &self,
        account_id: &str,
        role: &str,
        alias: &str,
        iam_user_name: &str,
    ) -> Result<CreateIamUserResponse> {
        info!("Creating long term key for: {}/{} - {}", account_id, role, alias);
        self.execute(create_call(account_id, role, alias, iam_user_name)?)
    }

    pub fn delete_long_term_key(
        &self,
        account_id: &str,
        role: &str,
        alias: &str,
        iam_user_name: &str,
    ) -> Result<DeleteIamUserResponse> {
        info!("Deleting long term key user for: {}/{} - {}", account_id, role, alias);
        self.execute(delete_call(account_id, role, alias, iam_user_name)?)
    }
}
