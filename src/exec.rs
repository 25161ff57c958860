//! Response classification shared by the async and blocking clients.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AlksError, MAX_LOGGED_BODY_CHARS, Result, truncate_str};
use crate::response::{BaseResponse, Envelope};

/// Response header carrying the broker-assigned request identifier.
pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// How a response body is turned into a success value or an error.
///
/// Broker endpoints disagree on how they report failure, so each operation
/// picks the policy matching its observed response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodePolicy {
    /// Always decode the expected shape, then fail if the embedded
    /// [`BaseResponse`] reports errors. The status code is not consulted.
    Envelope,
    /// Fail on any status outside 2xx and decode the body as an error list;
    /// decode the expected shape only for 2xx.
    StatusCode,
}

/// Extracts the request identifier header, ignoring empty values.
pub(crate) fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Turns a raw broker response into a decoded value or a classified error.
pub(crate) fn classify<T>(
    policy: DecodePolicy,
    status: StatusCode,
    header_request_id: Option<String>,
    text: &str,
    what: &'static str,
) -> Result<T>
where
    T: DeserializeOwned + Envelope,
{
    debug!(
        status = status.as_u16(),
        request_id = header_request_id.as_deref().unwrap_or(""),
        ?policy,
        "received {}",
        what
    );

    match policy {
        DecodePolicy::Envelope => {
            let value: T = decode(status, header_request_id.as_deref(), text, what)?;
            if value.base().request_failed() {
                return Err(api_error(status, header_request_id, value.base().clone()));
            }
            Ok(value)
        }
        DecodePolicy::StatusCode if status.is_success() => {
            decode(status, header_request_id.as_deref(), text, what)
        }
        DecodePolicy::StatusCode => {
            let base: BaseResponse = decode(status, header_request_id.as_deref(), text, what)?;
            Err(api_error(status, header_request_id, base))
        }
    }
}

fn decode<T: DeserializeOwned>(
    status: StatusCode,
    request_id: Option<&str>,
    text: &str,
    what: &'static str,
) -> Result<T> {
    serde_json::from_str(text).map_err(|source| {
        debug!(
            status = status.as_u16(),
            body = truncate_str(text, MAX_LOGGED_BODY_CHARS),
            "cannot decode {}",
            what
        );
        AlksError::Decode {
            what,
            status: status.as_u16(),
            request_id: request_id.map(str::to_string),
            source,
        }
    })
}

/// Builds an API error. The header request ID wins over the body's.
fn api_error(status: StatusCode, header_request_id: Option<String>, base: BaseResponse) -> AlksError {
    AlksError::Api {
        status: status.as_u16(),
        request_id: header_request_id.unwrap_or(base.request_id),
        status_message: base.status_message,
        errors: base.errors,
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    use super::*;
    use crate::response::impl_envelope;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RoleArnResponse {
        #[serde(flatten)]
        base: BaseResponse,
        role_arn: String,
    }

    impl_envelope!(RoleArnResponse);

    #[test]
    fn envelope_success() {
        let resp: RoleArnResponse = classify(
            DecodePolicy::Envelope,
            StatusCode::ACCEPTED,
            None,
            r#"{"roleArn":"arn:aws:iam::1:role/x","errors":[]}"#,
            "role arn response",
        )
        .unwrap();
        assert_eq!(resp.role_arn, "arn:aws:iam::1:role/x");
    }

    #[test]
    fn envelope_embedded_errors_on_2xx() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::Envelope,
            StatusCode::OK,
            None,
            r#"{"roleArn":"","requestId":"abc","statusMessage":"Failed","errors":["nope","again"]}"#,
            "role arn response",
        )
        .unwrap_err();
        match err {
            AlksError::Api {
                status,
                request_id,
                status_message,
                errors,
            } => {
                assert_eq!(status, 200);
                assert_eq!(request_id, "abc");
                assert_eq!(status_message, "Failed");
                assert_eq!(errors, vec!["nope", "again"]);
            }
            other => panic!("expected AlksError::Api, got: {:?}", other),
        }
    }

    #[test]
    fn envelope_ignores_status_code() {
        let resp: RoleArnResponse = classify(
            DecodePolicy::Envelope,
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            r#"{"roleArn":"arn"}"#,
            "role arn response",
        )
        .unwrap();
        assert_eq!(resp.role_arn, "arn");
    }

    #[test]
    fn envelope_decode_failure() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::Envelope,
            StatusCode::OK,
            Some("hdr-1".to_string()),
            r#"{"errors":[]}"#,
            "role arn response",
        )
        .unwrap_err();
        assert!(matches!(err, AlksError::Decode { .. }));
        assert_eq!(err.request_id(), Some("hdr-1"));
    }

    #[test]
    fn status_code_failure_decodes_error_body() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::StatusCode,
            StatusCode::NOT_FOUND,
            None,
            r#"{"errors":["Role not found"],"requestId":""}"#,
            "role arn response",
        )
        .unwrap_err();
        match &err {
            AlksError::Api {
                status,
                request_id,
                errors,
                ..
            } => {
                assert_eq!(*status, 404);
                assert_eq!(request_id, "");
                assert_eq!(errors, &vec!["Role not found".to_string()]);
            }
            other => panic!("expected AlksError::Api, got: {:?}", other),
        }
        assert_eq!(err.to_string(), "API error (HTTP 404): Role not found");
    }

    #[test]
    fn status_code_failure_with_empty_error_body() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::StatusCode,
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            "{}",
            "role arn response",
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "API error (HTTP 500): Internal Server Error");
    }

    #[test]
    fn status_code_failure_with_unparseable_body() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::StatusCode,
            StatusCode::BAD_GATEWAY,
            None,
            "<html>Bad Gateway</html>",
            "role arn response",
        )
        .unwrap_err();
        match err {
            AlksError::Decode { status, what, .. } => {
                assert_eq!(status, 502);
                assert_eq!(what, "role arn response");
            }
            other => panic!("expected AlksError::Decode, got: {:?}", other),
        }
    }

    #[test]
    fn status_code_success_ignores_embedded_errors() {
        let resp: RoleArnResponse = classify(
            DecodePolicy::StatusCode,
            StatusCode::OK,
            None,
            r#"{"roleArn":"arn","errors":["ignored"]}"#,
            "role arn response",
        )
        .unwrap();
        assert_eq!(resp.base.errors, vec!["ignored"]);
    }

    #[test]
    fn header_request_id_wins() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::StatusCode,
            StatusCode::BAD_REQUEST,
            Some("from-header".to_string()),
            r#"{"errors":["bad"],"requestId":"from-body"}"#,
            "role arn response",
        )
        .unwrap_err();
        assert_eq!(err.request_id(), Some("from-header"));
        assert_eq!(err.to_string(), "API error (HTTP 400) [from-header]: bad");
    }

    #[test]
    fn body_request_id_used_without_header() {
        let err = classify::<RoleArnResponse>(
            DecodePolicy::StatusCode,
            StatusCode::BAD_REQUEST,
            None,
            r#"{"errors":["bad"],"requestId":"from-body"}"#,
            "role arn response",
        )
        .unwrap_err();
        assert_eq!(err.request_id(), Some("from-body"));
    }

    #[test]
    fn extract_request_id_skips_empty_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_request_id(&headers), None);
        headers.insert("x-request-id", HeaderValue::from_static(""));
        assert_eq!(extract_request_id(&headers), None);
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        assert_eq!(extract_request_id(&headers).as_deref(), Some("abc"));
    }
}
