//! Request construction for the broker API.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{AlksError, Result};
use crate::exec::DecodePolicy;

/// A fully built request, independent of the transport that sends it.
#[derive(Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Converts into an async reqwest request.
    pub fn into_async(self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        request
    }

    /// Converts into a blocking reqwest request.
    #[cfg(feature = "blocking")]
    pub fn into_blocking(self) -> reqwest::blocking::Request {
        let mut request = reqwest::blocking::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        request
    }
}

/// Builds a request against the configured base URL.
///
/// The path is appended to the base URL verbatim. When a body is given it is
/// sent as-is with a JSON content type. Authentication headers are copied
/// from `auth`.
///
/// # Errors
///
/// Returns [`AlksError::Construction`] if the resulting URL does not parse or
/// the configured user agent is not a valid header value.
pub(crate) fn build_request(
    config: &ClientConfig,
    auth: &HeaderMap,
    body: Option<Vec<u8>>,
    method: Method,
    path: &str,
) -> Result<PreparedRequest> {
    let raw_url = format!("{}{}", config.base_url, path);
    let url = Url::parse(&raw_url)
        .map_err(|e| AlksError::Construction(format!("invalid URL '{}': {}", raw_url, e)))?;

    let mut headers = auth.clone();
    let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
        AlksError::Construction(format!("invalid user agent '{}'", config.user_agent))
    })?;
    headers.insert(USER_AGENT, user_agent);
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

/// One broker round trip: where to send it and how to read the answer.
#[derive(Debug)]
pub(crate) struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
    pub policy: DecodePolicy,
    /// Name of the response used in error messages and logs.
    pub what: &'static str,
}

impl Call {
    /// A call without a request body.
    pub fn new(method: Method, path: impl Into<String>, policy: DecodePolicy, what: &'static str) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            policy,
            what,
        }
    }

    /// A call carrying `body` encoded as JSON.
    pub fn json<B: Serialize>(
        method: Method,
        path: impl Into<String>,
        body: &B,
        policy: DecodePolicy,
        what: &'static str,
    ) -> Result<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| AlksError::Validation(format!("cannot encode {} request: {}", what, e)))?;
        Ok(Self {
            body: Some(encoded),
            ..Self::new(method, path, policy, what)
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;
    use crate::credential::Credentials;

    fn config() -> ClientConfig {
        ClientConfig::new("http://foo.bar.com").with_user_agent("test-value")
    }

    #[test]
    fn builds_post_with_body() {
        let auth = Credentials::basic("brian", "pass").auth_headers().unwrap();
        let request = build_request(
            &config(),
            &auth,
            Some(br#"{"fooz":"barz"}"#.to_vec()),
            Method::POST,
            "/endpointfun",
        )
        .unwrap();

        assert_eq!(request.url.as_str(), "http://foo.bar.com/endpointfun");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.get(USER_AGENT).unwrap(), "test-value");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(
            request
                .headers
                .get(AUTHORIZATION)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("Basic ")
        );
        assert_eq!(request.body.as_deref(), Some(br#"{"fooz":"barz"}"#.as_slice()));
    }

    #[test]
    fn get_without_body_has_no_content_type() {
        let request = build_request(
            &config(),
            &HeaderMap::new(),
            None,
            Method::GET,
            "/loginRoles/id/me",
        )
        .unwrap();
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn path_is_appended_verbatim() {
        let config = ClientConfig::new("http://foo.bar.com/rest/");
        let request =
            build_request(&config, &HeaderMap::new(), None, Method::GET, "/getKeys/").unwrap();
        assert_eq!(request.url.as_str(), "http://foo.bar.com/rest//getKeys/");
    }

    #[test]
    fn unparseable_url_is_construction_error() {
        let config = ClientConfig::new("not a url");
        let err = build_request(&config, &HeaderMap::new(), None, Method::GET, "/x").unwrap_err();
        assert!(matches!(err, AlksError::Construction(_)));
    }

    #[test]
    fn into_async_keeps_everything() {
        let request = build_request(
            &config(),
            &HeaderMap::new(),
            Some(b"{}".to_vec()),
            Method::PATCH,
            "/role/",
        )
        .unwrap()
        .into_async();
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().path(), "/role/");
        assert_eq!(request.headers().get(USER_AGENT).unwrap(), "test-value");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(b"{}".as_slice())
        );
    }

    #[test]
    fn json_call_encodes_body() {
        let call = Call::json(
            Method::POST,
            "/isIamEnabled",
            &serde_json::json!({"roleArn": "arn"}),
            DecodePolicy::Envelope,
            "isIamEnabled response",
        )
        .unwrap();
        assert_eq!(call.body.as_deref(), Some(br#"{"roleArn":"arn"}"#.as_slice()));
        assert_eq!(call.path, "/isIamEnabled");
    }
}
