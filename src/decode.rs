//! Request decoding
//!
//! Two strategies, picked by the verb the handler is registered for:
//! - read verbs get the query string flattened to one value per name
//! - write verbs get the JSON body decoded into the handler's input type

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::Uri;
use serde::de::DeserializeOwned;

use crate::error::{BoxError, DecodeError};
use crate::logger;

/// Query string flattened to a single value per parameter name
pub type QueryParams = HashMap<String, String>;

/// Build the parameter map for a request URI
///
/// The first value of a name wins. Each name that appears more than once is
/// reported once, and its extra values are dropped. A bare `?flag` maps to the
/// empty string.
pub fn query_parameters(uri: &Uri) -> QueryParams {
    let query = uri.query().unwrap_or_default();
    let mut params = QueryParams::new();
    let mut repeated: Vec<String> = Vec::new();

    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match params.entry(name.into_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
            Entry::Occupied(slot) => {
                if !repeated.iter().any(|n| n == slot.key()) {
                    repeated.push(slot.key().clone());
                }
            }
        }
    }

    for name in &repeated {
        logger::log_discarded_query_values(uri.path(), name);
    }

    params
}

/// Read the whole body and decode it as JSON into `T`
pub async fn decode_body<T, B>(body: B) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<BoxError>,
{
    let bytes = body
        .collect()
        .await
        .map_err(DecodeError::body::<T>)?
        .to_bytes();

    serde_json::from_slice(&bytes).map_err(DecodeError::json::<T>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{Empty, Full};
    use hyper::body::Bytes;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        item: String,
        quantity: u32,
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_query_parameters_basic() {
        let params = query_parameters(&uri("/list?name=ann&age=30"));
        assert_eq!(params.len(), 2);
        assert_eq!(params["name"], "ann");
        assert_eq!(params["age"], "30");
    }

    #[test]
    fn test_query_parameters_without_query() {
        assert!(query_parameters(&uri("/list")).is_empty());
        assert!(query_parameters(&uri("/list?")).is_empty());
    }

    #[test]
    fn test_query_parameters_decodes_escapes() {
        let params = query_parameters(&uri("/search?q=hot+soup&city=S%C3%A3o%20Paulo&flag"));
        assert_eq!(params["q"], "hot soup");
        assert_eq!(params["city"], "São Paulo");
        assert_eq!(params["flag"], "");
    }

    #[test]
    fn test_repeated_parameter_keeps_first_and_logs_once() {
        let (params, logged) = logger::capture(|| query_parameters(&uri("/list?x=1&x=2")));
        assert_eq!(params.len(), 1);
        assert_eq!(params["x"], "1");
        assert_eq!(
            logged
                .matches("received > 1 values for query parameter x.")
                .count(),
            1
        );
        assert!(logged.contains("request on /list"));
    }

    #[test]
    fn test_each_repeated_name_logged_once() {
        let (params, logged) =
            logger::capture(|| query_parameters(&uri("/list?a=1&b=2&a=3&a=4&b=5&c=6")));
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "2");
        assert_eq!(params["c"], "6");
        assert_eq!(logged.matches("query parameter a.").count(), 1);
        assert_eq!(logged.matches("query parameter b.").count(), 1);
        assert!(!logged.contains("query parameter c."));
    }

    #[test]
    fn test_unique_parameters_log_nothing() {
        let (_, logged) = logger::capture(|| query_parameters(&uri("/list?a=1&b=2")));
        assert!(logged.is_empty());
    }

    #[tokio::test]
    async fn test_decode_body_valid() {
        let body = Full::new(Bytes::from(r#"{"item":"soup","quantity":2}"#));
        let order: Order = decode_body(body).await.unwrap();
        assert_eq!(
            order,
            Order {
                item: "soup".to_string(),
                quantity: 2
            }
        );
    }

    #[tokio::test]
    async fn test_decode_body_malformed() {
        let body = Full::new(Bytes::from(r#"{"item":"soup","#));
        let err = decode_body::<Order, _>(body).await.unwrap_err();
        assert!(matches!(err, DecodeError::Json { .. }));
        assert!(err.to_string().contains("Order"));
    }

    #[tokio::test]
    async fn test_decode_body_type_mismatch() {
        let body = Full::new(Bytes::from(r#"{"item":"soup","quantity":"two"}"#));
        let err = decode_body::<Order, _>(body).await.unwrap_err();
        assert!(err.to_string().contains("invalid type"));
    }

    #[tokio::test]
    async fn test_decode_body_empty() {
        let err = decode_body::<Order, _>(Empty::<Bytes>::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("EOF while parsing"));
    }
}
