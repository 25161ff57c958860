//! Login role lookup.

use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::credential::Credentials;
use crate::error::Result;
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, impl_envelope};

/// The caller's role within an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRole {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub iam_key_active: bool,
    /// Longest session, in hours, the role may request.
    #[serde(default)]
    pub max_key_duration: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRoleResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    /// Absent when the broker reports a failure.
    #[serde(default)]
    pub login_role: Option<LoginRole>,
}

impl_envelope!(LoginRoleResponse);

pub(crate) fn login_role_call(account: &AccountContext) -> Call {
    Call::new(
        Method::GET,
        format!("/loginRoles/id/{}/{}", account.account_id(), account.role()),
        DecodePolicy::Envelope,
        "login role response",
    )
}

pub(crate) fn my_login_role_call() -> Call {
    Call::new(
        Method::GET,
        "/loginRoles/id/me",
        DecodePolicy::Envelope,
        "login role response",
    )
}

/// Session credentials identify their own role; basic credentials name it.
fn call_for(credentials: &Credentials, account: &AccountContext) -> Call {
    if credentials.is_session() {
        my_login_role_call()
    } else {
        login_role_call(account)
    }
}

impl Client {
    /// Resolves the login role of this client.
    ///
    /// With session credentials the broker reports the session's own
    /// account and role; with basic credentials the client's account
    /// context is looked up.
    pub async fn get_login_role(&self) -> Result<LoginRoleResponse> {
        info!("Getting login role for: {}/{}", self.account().account_id(), self.account().role());
        self.execute(call_for(self.credentials(), self.account())).await
    }

    /// Resolves the account and role behind the current STS session.
    pub async fn get_my_login_role(&self) -> Result<LoginRoleResponse> {
        info!("Getting login role for the current session");
        self.execute(my_login_role_call()).await
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    /// Resolves the login role of this client.
    pub fn get_login_role(&self) -> Result<LoginRoleResponse> {
        info!("Getting login role for: {}/{}", self.account().account_id(), self.account().role());
        self.execute(call_for(self.credentials(), self.account()))
    }

    /// Resolves the account and role behind the current STS session.
    pub fn get_my_login_role(&self) -> Result<LoginRoleResponse> {
        info!("Getting login role for the current session");
        self.execute(my_login_role_call())
    }
}
