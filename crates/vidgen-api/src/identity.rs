//! Caller identity.
//!
//! Authentication lives in the upstream gateway; by the time a request
//! reaches this service the gateway has installed the verified user id in
//! the `x-user-id` header.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The verified caller, extracted from `x-user-id`.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Caller(v.to_string()))
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {USER_ID_HEADER} header")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Caller, ApiError> {
        let (mut parts, _) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_present() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "user-42")
            .body(())
            .unwrap();
        let caller = extract(request).await.unwrap();
        assert_eq!(caller.0, "user-42");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_header_is_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
