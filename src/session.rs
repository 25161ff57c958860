//! STS session issuance.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::AccountContext;
use crate::client::Client;
use crate::credential::Credentials;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;
use crate::request::Call;
use crate::response::{BaseResponse, impl_envelope};

/// Session lengths, in hours, the broker accepts.
pub const SUPPORTED_SESSION_DURATIONS: [u32; 5] = [1, 2, 6, 12, 18];

/// IAM sessions are always issued for one hour.
pub const IAM_SESSION_DURATION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    session_time: u32,
    #[serde(flatten)]
    account: &'a AccountContext,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionKeys {
    #[serde(flatten)]
    base: BaseResponse,
    access_key: String,
    secret_key: String,
    session_token: String,
}

impl_envelope!(SessionKeys);

/// A new STS session.
///
/// The `Debug` implementation redacts `secret_key` and `session_token`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    /// Requested session length in hours.
    pub session_duration: u32,
    /// Local estimate of when the session ends.
    pub expires: DateTime<Utc>,
}

impl SessionResponse {
    fn new(keys: SessionKeys, duration_hours: u32) -> Self {
        Self {
            access_key: keys.access_key,
            secret_key: keys.secret_key,
            session_token: keys.session_token,
            session_duration: duration_hours,
            expires: Utc::now() + TimeDelta::hours(i64::from(duration_hours)),
        }
    }

    /// Credentials for authenticating further requests with this session.
    pub fn credentials(&self) -> Credentials {
        Credentials::session(&self.access_key, &self.secret_key, &self.session_token)
    }

    /// Checks if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires
    }

    /// Returns the remaining time until expiration, or `None` once expired.
    pub fn time_to_expiry(&self) -> Option<std::time::Duration> {
        (self.expires - Utc::now()).to_std().ok().filter(|d| !d.is_zero())
    }
}

impl std::fmt::Debug for SessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResponse")
            .field("access_key", &self.access_key)
            .field("secret_key", &"****")
            .field("session_token", &"****")
            .field("session_duration", &self.session_duration)
            .field("expires", &self.expires)
            .finish()
    }
}

fn validate_duration(duration_hours: u32) -> Result<()> {
    if !SUPPORTED_SESSION_DURATIONS.contains(&duration_hours) {
        return Err(AlksError::Validation(format!(
            "Unsupported session duration {}h, expected one of {:?}",
            duration_hours, SUPPORTED_SESSION_DURATIONS
        )));
    }
    Ok(())
}

pub(crate) fn session_call(account: &AccountContext, duration_hours: u32) -> Result<Call> {
    validate_duration(duration_hours)?;
    Call::json(
        Method::POST,
        "/getKeys/",
        &SessionRequest {
            session_time: duration_hours,
            account,
        },
        DecodePolicy::StatusCode,
        "session response",
    )
}

pub(crate) fn iam_session_call(account: &AccountContext) -> Result<Call> {
    Call::json(
        Method::POST,
        "/getIAMKeys/",
        &SessionRequest {
            session_time: IAM_SESSION_DURATION,
            account,
        },
        DecodePolicy::StatusCode,
        "IAM session response",
    )
}

impl Client {
    /// Session durations, in hours, accepted by [`Client::create_session`].
    pub fn durations(&self) -> &'static [u32] {
        &SUPPORTED_SESSION_DURATIONS
    }

    /// Creates a new STS session lasting `duration_hours`.
    ///
    /// Durations outside [`SUPPORTED_SESSION_DURATIONS`] fail with
    /// [`AlksError::Validation`] without contacting the broker.
    pub async fn create_session(&self, duration_hours: u32) -> Result<SessionResponse> {
        info!("Creating {} hr session", duration_hours);
        let call = session_call(self.account(), duration_hours)?;
        let keys: SessionKeys = self.execute(call).await?;
        Ok(SessionResponse::new(keys, duration_hours))
    }

    /// Creates a one-hour STS session with IAM access.
    pub async fn create_iam_session(&self) -> Result<SessionResponse> {
        info!("Creating IAM session");
        let keys: SessionKeys = self.execute(iam_session_call(self.account())?).await?;
        Ok(SessionResponse::new(keys, IAM_SESSION_DURATION))
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::Client {
    /// Session durations, in hours, accepted by `create_session`.
    pub fn durations(&self) -> &'static [u32] {
        &SUPPORTED_SESSION_DURATIONS
    }

    /// Creates a new STS session lasting `duration_hours`.
    pub fn create_session(&self, duration_hours: u32) -> Result<SessionResponse> {
        info!("Creating {} hr session", duration_hours);
        let call = session_call(self.account(), duration_hours)?;
        let keys: SessionKeys = self.execute(call)?;
        Ok(SessionResponse::new(keys, duration_hours))
    }

    /// Creates a one-hour STS session with IAM access.
    pub fn create_iam_session(&self) -> Result<SessionResponse> {
        info!("Creating IAM session");
        let keys: SessionKeys = self.execute(iam_session_call(self.account())?)?;
        Ok(SessionResponse::new(keys, IAM_SESSION_DURATION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountContext {
        AccountContext::new("012345678910/ALKSAdmin - awstest123", "Admin").unwrap()
    }

    fn keys() -> SessionKeys {
        serde_json::from_str(r#"{"accessKey":"foo","secretKey":"bar","sessionToken":"baz"}"#)
            .unwrap()
    }

    #[test]
    fn supported_durations_build_a_call() {
        for d in SUPPORTED_SESSION_DURATIONS {
            let call = session_call(&account(), d).unwrap();
            let body: serde_json::Value = serde_json::from_slice(call.body.as_deref().unwrap()).unwrap();
            assert_eq!(
                body,
                serde_json::json!({
                    "sessionTime": d,
                    "account": "012345678910/ALKSAdmin - awstest123",
                    "role": "Admin"
                })
            );
            assert_eq!(call.path, "/getKeys/");
            assert_eq!(call.method, Method::POST);
        }
    }

    #[test]
    fn unsupported_durations_are_rejected() {
        for d in [0, 3, 24, 42] {
            let err = session_call(&account(), d).unwrap_err();
            assert!(matches!(err, AlksError::Validation(_)));
        }
    }

    #[test]
    fn iam_session_requests_one_hour() {
        let call = iam_session_call(&account()).unwrap();
        assert_eq!(call.path, "/getIAMKeys/");
        let body: serde_json::Value = serde_json::from_slice(call.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["sessionTime"], 1);
    }

    #[test]
    fn session_expiry_follows_duration() {
        let before = Utc::now();
        let session = SessionResponse::new(keys(), 2);
        assert_eq!(session.session_duration, 2);
        assert!(session.expires >= before + TimeDelta::hours(2));
        assert!(!session.is_expired());
        let remaining = session.time_to_expiry().unwrap();
        assert!(remaining.as_secs() > 7100);
    }

    #[test]
    fn expired_session() {
        let mut session = SessionResponse::new(keys(), 1);
        session.expires = Utc::now() - TimeDelta::seconds(1);
        assert!(session.is_expired());
        assert!(session.time_to_expiry().is_none());
    }

    #[test]
    fn session_credentials_and_debug() {
        let session = SessionResponse::new(keys(), 1);
        assert_eq!(session.credentials(), Credentials::session("foo", "bar", "baz"));

        let debug = format!("{:?}", session);
        assert!(debug.contains("foo"));
        assert!(!debug.contains("bar"));
        assert!(!debug.contains("baz"));
    }
}
