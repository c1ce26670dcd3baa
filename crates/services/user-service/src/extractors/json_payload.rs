//! Optional JSON body extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use common::AppError;

/// JSON extractor that tolerates a missing body.
///
/// An empty body or a literal `null` yields `None`; deciding whether that is
/// acceptable is left to the handler. Anything that is not valid JSON for `T`
/// is rejected as a malformed request.
pub struct JsonPayload<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::malformed(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonPayload(None));
        }

        let Json(value) = Json::<Option<T>>::from_bytes(&bytes)
            .map_err(|e| AppError::malformed(e.body_text()))?;

        Ok(JsonPayload(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use domain::CreateUser;

    async fn extract(body: &'static str) -> Result<Option<CreateUser>, AppError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        JsonPayload::<CreateUser>::from_request(req, &())
            .await
            .map(|JsonPayload(value)| value)
    }

    #[tokio::test]
    async fn test_empty_body_is_absent() {
        assert_eq!(extract("").await.unwrap(), None);
        assert_eq!(extract("null").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_camel_case_alias_accepted() {
        let payload = extract(r#"{"userName":"valid_username","email":"valid_email@example.com"}"#)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload.username, "valid_username");
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let err = extract("{not json").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedRequest(_)));

        let err = extract(r#"{"username":"valid_username"}"#).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedRequest(_)));
    }
}
