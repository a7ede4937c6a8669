//! Method-dependent payload extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::Method,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Payload read from the JSON body for POST, PUT and PATCH, and from the
/// query string for every other method. An empty body reads as `{}`.
#[derive(Debug, Clone)]
pub struct MethodPayload<T>(pub T);

/// Whether the payload of `method` travels in the request body.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

#[async_trait]
impl<S, T> FromRequest<S> for MethodPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if carries_body(req.method()) {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(format!("Cannot parse json: {}", e)))?;
            let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
                b"{}"
            } else {
                &bytes
            };
            let value = serde_json::from_slice(body)
                .map_err(|e| ApiError::Validation(format!("Cannot parse json: {}", e)))?;
            return Ok(MethodPayload(value));
        }

        let Query(value) = Query::<T>::try_from_uri(req.uri())
            .map_err(|e| ApiError::Validation(format!("Cannot parse json: {}", e)))?;
        Ok(MethodPayload(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        flag: Option<bool>,
    }

    async fn extract(req: Request) -> Result<Sample, ApiError> {
        MethodPayload::<Sample>::from_request(req, &())
            .await
            .map(|MethodPayload(sample)| sample)
    }

    #[test]
    fn test_carries_body() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
    }

    #[tokio::test]
    async fn test_post_reads_json_body() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/stats?name=ignored")
            .body(Body::from(r#"{"name":"body","flag":true,"extra":1}"#))
            .unwrap();

        let sample = extract(req).await.unwrap();
        assert_eq!(sample.name, "body");
        assert_eq!(sample.flag, Some(true));
    }

    #[tokio::test]
    async fn test_get_reads_query_string() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/stats?name=query&flag=false")
            .body(Body::empty())
            .unwrap();

        let sample = extract(req).await.unwrap();
        assert_eq!(sample.name, "query");
        assert_eq!(sample.flag, Some(false));
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/stats")
            .body(Body::from("{not json"))
            .unwrap();

        match extract(req).await {
            Err(ApiError::Validation(msg)) => assert!(msg.starts_with("Cannot parse json")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_reads_as_empty_object() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/stats")
            .body(Body::empty())
            .unwrap();

        match extract(req).await {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("missing field `name`")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_query_field_is_validation_error() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/stats?flag=true")
            .body(Body::empty())
            .unwrap();

        assert!(matches!(extract(req).await, Err(ApiError::Validation(_))));
    }
}
