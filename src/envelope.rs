//! JSON envelope writer
//!
//! Every response leaves through [`write_json`], which sets the JSON content type
//! and falls back to a fixed error envelope when the payload cannot be encoded.

use std::fmt::Display;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::logger;

/// Body sent when the envelope itself cannot be serialized
const ENCODE_FAILURE_BODY: &[u8] =
    br#"{"status":"ERROR","error":"failed to encode response as JSON"}"#;

/// Wire shape of every response
///
/// The `status` tag carries `OK` or `ERROR`, and exactly one of `response` or
/// `error` follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Envelope<T> {
    #[serde(rename = "OK")]
    Ok { response: T },
    #[serde(rename = "ERROR")]
    Error { error: String },
}

impl<T> Envelope<T> {
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Write a handler result: `Ok` becomes a success envelope, `Err` an error envelope
pub fn write_response<T, E>(result: Result<T, E>) -> Response<Full<Bytes>>
where
    T: Serialize,
    E: Display,
{
    match result {
        Ok(response) => write_success(&response),
        Err(err) => write_error(&err),
    }
}

/// 200 with `{"status":"OK","response":...}`
pub fn write_success<T: Serialize + ?Sized>(response: &T) -> Response<Full<Bytes>> {
    write_json(StatusCode::OK, &Envelope::Ok { response })
}

/// 500 with `{"status":"ERROR","error":"..."}`
pub fn write_error<E: Display + ?Sized>(err: &E) -> Response<Full<Bytes>> {
    write_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &Envelope::<()>::Error {
            error: err.to_string(),
        },
    )
}

/// Serialize `content` and build a JSON response with the given status
///
/// A serialization failure means the payload type cannot be represented as JSON,
/// which is a programming error rather than a problem with the request. It is
/// logged as such and answered with a fixed 500 envelope.
pub fn write_json<T: Serialize + ?Sized>(status: StatusCode, content: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(content) {
        Ok(body) => build_json_response(status, Bytes::from(body)),
        Err(e) => {
            logger::log_encode_defect(std::any::type_name::<T>(), &e);
            build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(ENCODE_FAILURE_BODY),
            )
        }
    }
}

fn build_json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build JSON response: {e}"));
            Response::new(Full::new(Bytes::from_static(ENCODE_FAILURE_BODY)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::collections::BTreeMap;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = write_success(&json!({"id": 7, "tags": ["a", "b"]}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            json!({"status": "OK", "response": {"id": 7, "tags": ["a", "b"]}})
        );
    }

    #[tokio::test]
    async fn test_error_envelope_has_no_response_field() {
        let response = write_error("database is locked");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = body_json(response).await;
        assert_eq!(body, json!({"status": "ERROR", "error": "database is locked"}));
        assert!(body.get("response").is_none());
    }

    #[tokio::test]
    async fn test_write_response_dispatches_on_result() {
        let ok: Result<u32, String> = Ok(5);
        let response = write_response(ok);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "OK", "response": 5}));

        let err: Result<u32, String> = Err("nope".to_string());
        let response = write_response(err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"status": "ERROR", "error": "nope"}));
    }

    #[tokio::test]
    async fn test_unit_and_none_responses_are_null() {
        let response = write_response(Ok::<(), String>(()));
        assert_eq!(body_json(response).await, json!({"status": "OK", "response": null}));

        let response = write_response(Ok::<Option<u8>, String>(None));
        assert_eq!(body_json(response).await, json!({"status": "OK", "response": null}));
    }

    #[tokio::test]
    async fn test_unserializable_payload_becomes_500() {
        // JSON object keys must be strings
        let mut payload = BTreeMap::new();
        payload.insert((1u8, 2u8), "pair");

        let response = write_success(&payload);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            json!({"status": "ERROR", "error": "failed to encode response as JSON"})
        );
    }

    #[test]
    fn test_envelope_round_trip() {
        let mut scores = BTreeMap::new();
        scores.insert("ann".to_string(), vec![1.5, 2.0]);
        scores.insert("bob".to_string(), vec![]);

        let encoded = serde_json::to_string(&Envelope::Ok { response: &scores }).unwrap();
        let decoded: Envelope<BTreeMap<String, Vec<f64>>> = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.is_ok());
        assert_eq!(decoded, Envelope::Ok { response: scores });
    }

    #[test]
    fn test_status_tag_comes_first() {
        let encoded = serde_json::to_string(&Envelope::<()>::Error {
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(encoded, r#"{"status":"ERROR","error":"boom"}"#);
    }
}
