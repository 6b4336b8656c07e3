//! Identity extraction from gateway-forwarded headers.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the gateway has verified the caller and forwarded
//! `x-professional-id`, `x-display-name` and `x-role`. The extractor only
//! shapes those into an [`ActorContext`] — authorization stays in the
//! engine's policy module.

use axum::{extract::FromRequestParts, http::request::Parts};
use despacho_domain::value_objects::{ActorContext, Role};

use crate::error::ApiError;

pub const HEADER_PROFESSIONAL_ID: &str = "x-professional-id";
pub const HEADER_DISPLAY_NAME: &str = "x-display-name";
pub const HEADER_ROLE: &str = "x-role";

#[derive(Debug, Clone)]
pub struct Identity(pub ActorContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let professional_id = header(HEADER_PROFESSIONAL_ID).ok_or(ApiError::MissingIdentity)?;
        let display_name = header(HEADER_DISPLAY_NAME).unwrap_or(professional_id);
        let role = header(HEADER_ROLE)
            .and_then(|value| Role::parse(value).ok())
            .ok_or(ApiError::MissingIdentity)?;

        Ok(Identity(ActorContext {
            professional_id: professional_id.to_string(),
            display_name: display_name.to_string(),
            role,
        }))
    }
}
