use std::env;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::account::AccountContext;
use crate::config::ClientConfig;
use crate::credential::{CredentialProvider, Credentials, EnvProvider};
use crate::error::{AlksError, Result};
use crate::exec::{classify, extract_request_id};
use crate::request::{Call, PreparedRequest, build_request};
use crate::response::Envelope;

/// Everything a client needs to build requests, shared by the async and
/// blocking clients.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub config: ClientConfig,
    pub credentials: Credentials,
    pub account: AccountContext,
    /// Rendered once from `credentials`.
    auth: HeaderMap,
}

impl Settings {
    pub fn new(config: ClientConfig, credentials: Credentials, account: AccountContext) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(AlksError::Construction("base URL is required".into()));
        }
        Url::parse(&config.base_url).map_err(|e| {
            AlksError::Construction(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        let auth = credentials.auth_headers()?;
        Ok(Self {
            config,
            credentials,
            account,
            auth,
        })
    }

    pub fn with_credentials(&self, credentials: Credentials) -> Result<Self> {
        let auth = credentials.auth_headers()?;
        Ok(Self {
            config: self.config.clone(),
            credentials,
            account: self.account.clone(),
            auth,
        })
    }

    pub fn prepare(&self, body: Option<Vec<u8>>, method: Method, path: &str) -> Result<PreparedRequest> {
        build_request(&self.config, &self.auth, body, method, path)
    }

    pub fn prepare_call(&self, call: Call) -> Result<PreparedRequest> {
        debug!(method = %call.method, path = %call.path, "building {} request", call.what);
        self.prepare(call.body, call.method, &call.path)
    }

    /// Reads `ALKS_URL`, `ALKS_ACCOUNT`, `ALKS_ROLE` and the credential
    /// variables understood by [`EnvProvider`].
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AlksError::Construction(format!("{} not set", name)))
        };
        let config = ClientConfig::new(var("ALKS_URL")?);
        let account = AccountContext::new(var("ALKS_ACCOUNT")?, var("ALKS_ROLE")?)?;
        let credentials = EnvProvider.resolve()?;
        Self::new(config, credentials, account)
    }
}

/// Parses a method name given as a string.
pub(crate) fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| AlksError::Construction(format!("invalid HTTP method '{}'", method)))
}

/// Async client for the ALKS broker API.
///
/// Resource operations are methods of this type; see the resource modules
/// ([`crate::session`], [`crate::iam_role`], [`crate::iam_user`], …).
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    settings: Settings,
}

impl Client {
    /// Creates a client for `base_url` with default configuration.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        account: AccountContext,
    ) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url), credentials, account)
    }

    /// Creates a client with custom configuration.
    pub fn with_config(
        config: ClientConfig,
        credentials: Credentials,
        account: AccountContext,
    ) -> Result<Self> {
        let settings = Settings::new(config, credentials, account)?;
        Self::from_settings(settings)
    }

    /// Creates a client from `ALKS_URL`, `ALKS_ACCOUNT`, `ALKS_ROLE` and the
    /// credential variables read by [`EnvProvider`].
    pub fn from_env() -> Result<Self> {
        Self::from_settings(Settings::from_env()?)
    }

    fn from_settings(settings: Settings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AlksError::Construction(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, settings })
    }

    /// Returns a client that authenticates with `credentials` instead,
    /// sharing this client's transport, configuration and account context.
    ///
    /// Typically used after [`Client::create_session`] to switch from basic
    /// auth to the issued STS session.
    pub fn with_credentials(&self, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            http: self.http.clone(),
            settings: self.settings.with_credentials(credentials)?,
        })
    }

    /// Replaces the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.config.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.settings.config.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.settings.config.user_agent
    }

    pub fn credentials(&self) -> &Credentials {
        &self.settings.credentials
    }

    pub fn account(&self) -> &AccountContext {
        &self.settings.account
    }

    /// Builds an authenticated request for `path` without sending it.
    pub fn new_request(
        &self,
        body: Option<Vec<u8>>,
        method: &str,
        path: &str,
    ) -> Result<reqwest::Request> {
        let method = parse_method(method)?;
        Ok(self.settings.prepare(body, method, path)?.into_async())
    }

    pub(crate) async fn execute<T>(&self, call: Call) -> Result<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let (policy, what) = (call.policy, call.what);
        let request = self.settings.prepare_call(call)?.into_async();

        let response = self.http.execute(request).await?;

        let status = response.status();
        let request_id = extract_request_id(response.headers());
        let text = response.text().await?;

        classify(policy, status, request_id, &text, what)
    }
}
