use std::env;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::{AlksError, Result};

const STS_ACCESS_KEY_HEADER: HeaderName = HeaderName::from_static("alks-sts-access-key");
const STS_SECRET_KEY_HEADER: HeaderName = HeaderName::from_static("alks-sts-secret-key");
const STS_SESSION_TOKEN_HEADER: HeaderName = HeaderName::from_static("alks-sts-session-token");

/// Credentials used to authenticate against the broker.
///
/// `Basic` is the bootstrap regime (network username and password).
/// `Session` carries an STS triple previously issued by the broker.
///
/// The `Debug` implementation redacts passwords, secret keys and session
/// tokens to prevent accidental leakage in logs.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic {
        username: String,
        password: String,
    },
    Session {
        access_key: String,
        secret_key: String,
        session_token: String,
    },
}

impl Credentials {
    /// Creates basic-auth credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates STS session credentials.
    pub fn session(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Credentials::Session {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: session_token.into(),
        }
    }

    /// Returns `true` for the STS session variant.
    pub fn is_session(&self) -> bool {
        matches!(self, Credentials::Session { .. })
    }

    /// Renders the authentication headers for these credentials.
    ///
    /// Called once when a client is built; the result is applied to every
    /// outgoing request.
    pub(crate) fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self {
            Credentials::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(AlksError::Construction(
                        "username and password are required".into(),
                    ));
                }
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                headers.insert(AUTHORIZATION, sensitive_value(&format!("Basic {}", encoded))?);
            }
            Credentials::Session {
                access_key,
                secret_key,
                session_token,
            } => {
                if access_key.is_empty() || secret_key.is_empty() || session_token.is_empty() {
                    return Err(AlksError::Construction(
                        "access key, secret key and session token are required".into(),
                    ));
                }
                headers.insert(STS_ACCESS_KEY_HEADER, sensitive_value(access_key)?);
                headers.insert(STS_SECRET_KEY_HEADER, sensitive_value(secret_key)?);
                headers.insert(STS_SESSION_TOKEN_HEADER, sensitive_value(session_token)?);
            }
        }
        Ok(headers)
    }
}

fn sensitive_value(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value).map_err(|_| {
        AlksError::Construction("credentials contain characters not allowed in headers".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"****")
                .finish(),
            Credentials::Session { access_key, .. } => f
                .debug_struct("Session")
                .field("access_key", access_key)
                .field("secret_key", &"****")
                .field("session_token", &"****")
                .finish(),
        }
    }
}

/// Resolves [`Credentials`] from a specific source.
pub trait CredentialProvider {
    /// Attempt to resolve credentials from this provider.
    fn resolve(&self) -> Result<Credentials>;
}

impl CredentialProvider for Credentials {
    fn resolve(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

/// Provides credentials from environment variables.
///
/// Session credentials are read from `ALKS_ACCESS_KEY_ID`,
/// `ALKS_SECRET_ACCESS_KEY` and `ALKS_SESSION_TOKEN`; basic credentials from
/// `ALKS_USERNAME` and `ALKS_PASSWORD`. A complete session triple takes
/// precedence.
pub struct EnvProvider;

impl EnvProvider {
    fn resolve_with(get: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let var = |name: &str| get(name).filter(|v| !v.is_empty());

        if let (Some(access_key), Some(secret_key), Some(session_token)) = (
            var("ALKS_ACCESS_KEY_ID"),
            var("ALKS_SECRET_ACCESS_KEY"),
            var("ALKS_SESSION_TOKEN"),
        ) {
            return Ok(Credentials::session(access_key, secret_key, session_token));
        }

        match (var("ALKS_USERNAME"), var("ALKS_PASSWORD")) {
            (Some(username), Some(password)) => Ok(Credentials::basic(username, password)),
            _ => Err(AlksError::Credential(
                "neither ALKS_ACCESS_KEY_ID/ALKS_SECRET_ACCESS_KEY/ALKS_SESSION_TOKEN \
                 nor ALKS_USERNAME/ALKS_PASSWORD are set"
                    .into(),
            )),
        }
    }
}

impl CredentialProvider for EnvProvider {
    fn resolve(&self) -> Result<Credentials> {
        Self::resolve_with(|name| env::var(name).ok())
    }
}
