use thiserror::Error;

/// Maximum characters of a response body echoed into debug logs.
pub(crate) const MAX_LOGGED_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the ALKS broker.
#[derive(Debug, Error)]
pub enum AlksError {
    /// The client could not be built: bad base URL, empty constructor
    /// argument, or credentials that cannot be sent as headers.
    #[error("construction error: {0}")]
    Construction(String),

    /// A client-side precondition failed. No request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// HTTP/network layer error from reqwest.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the shape expected for its status.
    #[error("failed to decode {what} (HTTP {status}){}: {source}", request_id_segment(.request_id.as_deref()))]
    Decode {
        what: &'static str,
        status: u16,
        request_id: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    /// The broker reported a failure, either through the status code or
    /// through the error list embedded in the body.
    #[error("API error (HTTP {status}){}{}", request_id_segment(Some(.request_id.as_str())), api_message(.status, .status_message, .errors))]
    Api {
        status: u16,
        request_id: String,
        status_message: String,
        errors: Vec<String>,
    },

    /// A credential provider could not resolve credentials.
    #[error("credential error: {0}")]
    Credential(String),
}

impl AlksError {
    /// Returns the HTTP status the error was classified from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AlksError::Api { status, .. } | AlksError::Decode { status, .. } => Some(*status),
            AlksError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the broker-assigned request ID, if one was reported.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            AlksError::Api { request_id, .. } if !request_id.is_empty() => Some(request_id),
            AlksError::Decode { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the service-reported error strings of an API error.
    pub fn errors(&self) -> &[String] {
        match self {
            AlksError::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Returns `true` if the error was raised before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AlksError::Construction(_) | AlksError::Validation(_) | AlksError::Credential(_)
        )
    }
}

/// A specialized Result type for ALKS operations.
pub type Result<T> = std::result::Result<T, AlksError>;

fn request_id_segment(request_id: Option<&str>) -> String {
    match request_id {
        Some(id) if !id.is_empty() => format!(" [{}]", id),
        _ => String::new(),
    }
}

/// Broker errors, then the status message, then the HTTP reason phrase.
fn api_message(status: &u16, status_message: &str, errors: &[String]) -> String {
    if !errors.is_empty() {
        return format!(": {}", errors.join(", "));
    }
    if !status_message.is_empty() {
        return format!(": {}", status_message);
    }
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(|reason| format!(": {}", reason))
        .unwrap_or_default()
}

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(request_id: &str) -> AlksError {
        AlksError::Api {
            status: 404,
            request_id: request_id.to_string(),
            status_message: "Failed".to_string(),
            errors: vec!["Role not found".to_string()],
        }
    }

    #[test]
    fn api_error_display_with_request_id() {
        let msg = api_error("mqtwkzij").to_string();
        assert_eq!(msg, "API error (HTTP 404) [mqtwkzij]: Role not found");
    }

    #[test]
    fn api_error_display_omits_empty_request_id() {
        let msg = api_error("").to_string();
        assert_eq!(msg, "API error (HTTP 404): Role not found");
        assert!(!msg.contains("[]"));
    }

    #[test]
    fn api_error_falls_back_to_status_message() {
        let err = AlksError::Api {
            status: 200,
            request_id: "abc".to_string(),
            status_message: "Unauthorized".to_string(),
            errors: vec![],
        };
        assert_eq!(err.to_string(), "API error (HTTP 200) [abc]: Unauthorized");
    }

    #[test]
    fn api_error_without_message_uses_reason_phrase() {
        let err = AlksError::Api {
            status: 500,
            request_id: String::new(),
            status_message: String::new(),
            errors: vec![],
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): Internal Server Error");

        let err = AlksError::Api {
            status: 599,
            request_id: "r-9".to_string(),
            status_message: String::new(),
            errors: vec![],
        };
        assert_eq!(err.to_string(), "API error (HTTP 599) [r-9]");
    }

    #[test]
    fn api_error_joins_errors() {
        let err = AlksError::Api {
            status: 400,
            request_id: String::new(),
            status_message: String::new(),
            errors: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "API error (HTTP 400): first, second");
        assert_eq!(err.errors(), ["first", "second"]);
    }

    #[test]
    fn request_id_accessor_hides_empty_id() {
        assert_eq!(api_error("").request_id(), None);
        assert_eq!(api_error("req-1").request_id(), Some("req-1"));
        assert_eq!(api_error("req-1").status(), Some(404));
    }

    #[test]
    fn decode_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = AlksError::Decode {
            what: "session response",
            status: 200,
            request_id: Some("req-9".to_string()),
            source,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to decode session response (HTTP 200) [req-9]: "));
        assert!(!err.is_local());
    }

    #[test]
    fn validation_error_is_local() {
        let err = AlksError::Validation("Unsupported session duration".to_string());
        assert_eq!(err.to_string(), "validation error: Unsupported session duration");
        assert!(err.is_local());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_str_multibyte() {
        let s = "中文测试数据";
        assert_eq!(truncate_str(s, 4), "中文测试");
    }

    #[test]
    fn truncate_str_short() {
        assert_eq!(truncate_str("", 10), "");
        assert_eq!(truncate_str("hello", 10), "hello");
    }
}
