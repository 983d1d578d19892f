//! Identity Router

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::domain::repository::{AccountRepository, NotificationTransport};
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::authenticate_request;

/// Routes meant to be nested under `/api/users`.
///
/// Every request passes through [`authenticate_request`] first, so handlers
/// only ever see an already resolved principal.
pub fn identity_router<R, N>(state: IdentityAppState<R, N>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/send-verification", post(handlers::send_verification::<R, N>))
        .route("/register", post(handlers::register::<R, N>))
        .route("/login", post(handlers::login::<R, N>))
        .route("/me", get(handlers::me).put(handlers::update_me::<R, N>))
        .route(
            "/nickname/available",
            get(handlers::nickname_available::<R, N>),
        )
        .route(
            "/forgot-password/send-code",
            post(handlers::forgot_password_send_code::<R, N>),
        )
        .route(
            "/forgot-password/verify-code",
            post(handlers::forgot_password_verify_code::<R, N>),
        )
        .route(
            "/forgot-password/reset",
            post(handlers::forgot_password_reset::<R, N>),
        )
        .route("/admin/{id}/disable", put(handlers::disable_account::<R, N>))
        .route("/admin/{id}/enable", put(handlers::enable_account::<R, N>))
        .route("/admin/{id}", delete(handlers::delete_account::<R, N>))
        .route("/admin/active-count", get(handlers::active_count::<R, N>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_request::<R, N>,
        ))
        .with_state(state)
}
