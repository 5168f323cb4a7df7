use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Already-authenticated account id, installed as the `x-user-id` header
/// by the upstream auth gateway. The data service performs no
/// authentication of its own.
pub struct OwnerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authenticated user identity"))?;

        let id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::unauthorized("invalid user identity"))?;
        Ok(OwnerId(id))
    }
}
