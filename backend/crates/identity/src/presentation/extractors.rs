//! Principal Extractors
//!
//! Read what [`authenticate_request`](super::middleware::authenticate_request)
//! stored for the current request.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::entity::principal::Principal;
use crate::error::IdentityError;

/// Request extension set for authenticated requests
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

/// Rejects anonymous requests with 401
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub Principal);

impl<S> FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentPrincipal>()
            .map(|current| RequirePrincipal(current.0.clone()))
            .ok_or(IdentityError::Unauthenticated)
    }
}

/// `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(
            parts
                .extensions
                .get::<CurrentPrincipal>()
                .map(|current| current.0.clone()),
        ))
    }
}
