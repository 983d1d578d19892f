//! Presentation Layer
//!
//! axum handlers, DTOs, extractors and the authentication middleware.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
