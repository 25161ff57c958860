//! Listing the accounts and roles visible to the caller.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::error::Result;
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, impl_envelope, nullable};

/// One account/role pair the caller may use.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRole {
    /// Composite key `{id}/ALKS{role} - {alias}`.
    pub account: String,
    pub role: String,
    pub iam_active: bool,
    pub max_key_duration: Option<u32>,
    /// Provider metadata attached by the broker, passed through untouched.
    pub skypiea_account: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetAccountsResponse {
    pub base: BaseResponse,
    /// Sorted by account key.
    pub accounts: Vec<AccountRole>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRoleEntry {
    #[serde(default)]
    role: String,
    #[serde(default)]
    iam_key_active: bool,
    #[serde(default)]
    max_key_duration: Option<u32>,
    #[serde(default)]
    skypiea_account: Option<serde_json::Value>,
}

/// The broker keys each entry list by the composite account string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountsBody {
    #[serde(flatten)]
    base: BaseResponse,
    #[serde(default, deserialize_with = "nullable")]
    account_list_role: BTreeMap<String, Vec<AccountRoleEntry>>,
}

impl_envelope!(AccountsBody);

impl From<AccountsBody> for GetAccountsResponse {
    fn from(body: AccountsBody) -> Self {
        let accounts = body
            .account_list_role
            .into_iter()
            .flat_map(|(key, entries)| {
                entries.into_iter().map(move |entry| AccountRole {
                    account: key.clone(),
                    role: entry.role,
                    iam_active: entry.iam_key_active,
                    max_key_duration: entry.max_key_duration,
                    skypiea_account: entry.skypiea_account,
                })
            })
            .collect();
        Self {
            base: body.base,
            accounts,
        }
    }
}

pub(crate) fn accounts_call(account: &AccountContext) -> Result<Call> {
    Call::json(
        Method::POST,
        "/getAccounts/",
        account,
        DecodePolicy::StatusCode,
        "accounts response",
    )
}

impl Client {
    /// Lists the accounts and roles available to the caller.
    pub async fn get_accounts(&self) -> Result<GetAccountsResponse> {
        info!("Getting accounts");
        let body: AccountsBody = self.execute(accounts_call(self.account())?).await?;
        Ok(body.into())
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    /// Lists the accounts and roles available to the caller.
    pub fn get_accounts(&self) -> Result<GetAccountsResponse> {
        info!("Getting accounts");
        let body: AccountsBody = self.execute(accounts_call(self.account())?)?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNTS: &str = r#"{
        "StatusMessage": "Success",
        "accountListRole": {
            "345678/ALKSAdmin - foobarbaz3": [
                {"account": "234567/ALKSAdmin", "role": "Admin", "iamKeyActive": true}
            ],
            "123456/ALKSPowerUser - foobarbaz": [
                {"account": "123456/ALKSPowerUser", "role": "PowerUser", "iamKeyActive": false,
                 "maxKeyDuration": 12, "skypieaAccount": {"label": "sandbox"}}
            ]
        }
    }"#;

    #[test]
    fn entries_are_keyed_by_composite_account() {
        let body: AccountsBody = serde_json::from_str(ACCOUNTS).unwrap();
        let resp = GetAccountsResponse::from(body);

        assert_eq!(resp.base.status_message, "Success");
        assert_eq!(resp.accounts.len(), 2);

        let power = &resp.accounts[0];
        assert_eq!(power.account, "123456/ALKSPowerUser - foobarbaz");
        assert_eq!(power.role, "PowerUser");
        assert!(!power.iam_active);
        assert_eq!(power.max_key_duration, Some(12));
        assert_eq!(
            power.skypiea_account,
            Some(serde_json::json!({"label": "sandbox"}))
        );

        let admin = &resp.accounts[1];
        assert_eq!(admin.account, "345678/ALKSAdmin - foobarbaz3");
        assert_eq!(admin.role, "Admin");
        assert!(admin.iam_active);
        assert_eq!(admin.skypiea_account, None);
    }

    #[test]
    fn missing_list_is_empty() {
        let body: AccountsBody = serde_json::from_str(r#"{"accountListRole": null}"#).unwrap();
        assert!(GetAccountsResponse::from(body).accounts.is_empty());
    }

    #[test]
    fn request_carries_account_context() {
        let account = AccountContext::new("012345678910/ALKSAdmin - awstest123", "Admin").unwrap();
        let call = accounts_call(&account).unwrap();
        let body: serde_json::Value = serde_json::from_slice(call.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["account"], "012345678910/ALKSAdmin - awstest123");
        assert_eq!(body["role"], "Admin");
    }
}
