//! Response screening for the field-service REST API.
//!
//! The service reports failures with a matching status and a JSON envelope:
//!
//! ```text
//! {"error": {"code": "OTP_LOCKED", "message": "too many attempts"}}
//! ```
//!
//! Anything non-2xx is turned into a [`ClientError`] here, so endpoint
//! methods only ever see successful payloads.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;

use crate::error::ClientError;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Raw bodies longer than this are cut in error messages.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Pass a successful response through; map every failure status.
///
/// - 401 / 403: [`ClientError::Unauthorized`], the session token was refused.
/// - 429: [`ClientError::RateLimited`], honoring a numeric `Retry-After`.
/// - anything else: [`ClientError::Api`] carrying the envelope message.
pub async fn screen_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let retry_after = retry_after_secs(resp.headers());
    let message = error_message(&resp.text().await.unwrap_or_default());
    tracing::debug!(%url, %status, %message, "field-service request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// `code: message` from the error envelope, else an excerpt of the raw body.
fn error_message(body: &str) -> String {
    if let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) {
        return match error.code {
            Some(code) => format!("{code}: {}", error.message),
            None => error.message,
        };
    }
    let body = body.trim();
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Decode a JSON body, mapping decode failures to [`ClientError::Parse`].
pub async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, ClientError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Parse(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn respond(status: u16, headers: &[(&str, &str)], body: &str) -> reqwest::Response {
        let mut builder = ::http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        reqwest::Response::from(builder.body(body.to_string()).unwrap())
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = screen_response(respond(200, &[], "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn envelope_message_carries_code() {
        let body = r#"{"error": {"code": "OTP_LOCKED", "message": "too many attempts"}}"#;
        let err = screen_response(respond(409, &[], body)).await.unwrap_err();
        assert!(
            matches!(err, ClientError::Api { status: 409, ref message } if message == "OTP_LOCKED: too many attempts")
        );
    }

    #[tokio::test]
    async fn refused_token_is_unauthorized() {
        let body = r#"{"error": {"message": "token expired"}}"#;
        let err = screen_response(respond(401, &[], body)).await.unwrap_err();
        assert!(
            matches!(err, ClientError::Unauthorized { status: 401, ref message } if message == "token expired")
        );
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn rate_limit_honors_retry_after() {
        let err = screen_response(respond(429, &[("Retry-After", " 30 ")], ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RateLimited { retry_after_secs: 30 }));

        let err = screen_response(respond(429, &[("Retry-After", "soon")], ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RateLimited { retry_after_secs: 60 }));
    }

    #[test]
    fn raw_body_is_cut_to_an_excerpt() {
        let body = "x".repeat(500);
        let message = error_message(&body);
        assert_eq!(message.len(), BODY_EXCERPT_CHARS + 3);
        assert!(message.ends_with("..."));
        assert_eq!(error_message("  maintenance \n"), "maintenance");
    }

    #[tokio::test]
    async fn decode_reports_parse_error() {
        let err = decode::<serde_json::Value>(respond(200, &[], "not json"), "compliance")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Parse(ref m) if m.starts_with("compliance:")));
    }
}
