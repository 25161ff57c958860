//! Synchronous (blocking) client for the ALKS broker API.
//!
//! This module is only available when the `blocking` feature is enabled.
//! It mirrors the async [`crate::client::Client`] API using `reqwest::blocking`;
//! every resource operation has the same name and arguments, minus `.await`.
//!
//! Use the blocking client from CLI tools and scripts that have no async
//! runtime. Do not call it from inside a Tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use rs_alks::blocking::Client;
//! use rs_alks::{AccountContext, Credentials};
//!
//! fn main() -> rs_alks::Result<()> {
//!     let account = AccountContext::new("012345678910/ALKSAdmin - awstest123", "Admin")?;
//!     let client = Client::new(
//!         "https://alks.example.com/rest",
//!         Credentials::basic("user", "pass"),
//!         account,
//!     )?;
//!
//!     let session = client.create_session(1)?;
//!     println!("AK: {}", session.access_key);
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;

use crate::account::AccountContext;
use crate::client::{Settings, parse_method};
use crate::config::ClientConfig;
use crate::credential::Credentials;
use crate::error::{AlksError, Result};
use crate::exec::{classify, extract_request_id};
use crate::request::Call;
use crate::response::Envelope;

/// Synchronous client for the ALKS broker API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    settings: Settings,
}

impl Client {
    /// Creates a new blocking client for `base_url` with default configuration.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        account: AccountContext,
    ) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url), credentials, account)
    }

    /// Creates a new blocking client with custom configuration.
    pub fn with_config(
        config: ClientConfig,
        credentials: Credentials,
        account: AccountContext,
    ) -> Result<Self> {
        Self::from_settings(Settings::new(config, credentials, account)?)
    }

    /// Creates a new blocking client from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_settings(Settings::from_env()?)
    }

    fn from_settings(settings: Settings) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = settings.config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AlksError::Construction(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, settings })
    }

    /// Returns a client that authenticates with `credentials` instead.
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
    ) -> Result<reqwest::blocking::Request> {
        let method = parse_method(method)?;
        Ok(self.settings.prepare(body, method, path)?.into_blocking())
    }

    pub(crate) fn execute<T>(&self, call: Call) -> Result<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let (policy, what) = (call.policy, call.what);
        let request = self.settings.prepare_call(call)?.into_blocking();

        let response = self.http.execute(request)?;

        let status = response.status();
        let request_id = extract_request_id(response.headers());
        let text = response.text()?;

        classify(policy, status, request_id, &text, what)
    }
}
