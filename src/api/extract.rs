use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Tenant identity, taken verbatim from the `X-API-Key` header.
/// Any string is accepted; there is no credential check.
#[derive(Debug, Clone)]
pub struct ApiKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing request header '{}'", API_KEY_HEADER)))?;

        value
            .to_str()
            .map(|key| ApiKey(key.to_string()))
            .map_err(|_| ApiError::BadRequest(format!("Invalid request header '{}'", API_KEY_HEADER)))
    }
}
