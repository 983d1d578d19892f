//! Authentication Middleware
//!
//! Runs the authentication pipeline once per request. Anonymous requests pass
//! through untouched; gated handlers reject them via `RequirePrincipal`.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;

use crate::application::{AuthOutcome, AuthenticateUseCase};
use crate::domain::repository::{AccountRepository, NotificationTransport};
use crate::presentation::extractors::CurrentPrincipal;
use crate::presentation::handlers::IdentityAppState;

/// Disabled accounts are answered with 401 here; no handler runs.
pub async fn authenticate_request<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let use_case = AuthenticateUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.clock.clone(),
    );

    match use_case.execute(req.headers()).await {
        AuthOutcome::Anonymous => {}
        AuthOutcome::Rejected { reason } => {
            return AppError::unauthorized(reason).into_response();
        }
        AuthOutcome::Authenticated(principal) => {
            req.extensions_mut().insert(CurrentPrincipal(principal));
        }
    }

    next.run(req).await
}
