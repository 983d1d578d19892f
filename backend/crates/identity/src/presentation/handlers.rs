//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::AccountId;
use platform::clock::Clock;
use std::sync::Arc;

use crate::application::{
    CheckNicknameUseCase, CodePurpose, CountActiveAccountsUseCase, DeleteAccountUseCase,
    IdentityConfig, RegisterInput, RegisterUseCase, ResetPasswordInput, ResetPasswordUseCase,
    SendVerificationCodeUseCase, SetAccountEnabledUseCase, SignInInput, SignInUseCase,
    TokenService, UpdateProfileInput, UpdateProfileUseCase, VerificationCodeStore,
    VerifyResetCodeUseCase,
};
use crate::domain::repository::{AccountRepository, NotificationTransport};
use crate::error::IdentityResult;
use crate::presentation::dto::{
    AccountResponse, ActiveCountResponse, LoginRequest, LoginResponse, MessageResponse,
    NicknameAvailabilityQuery, NicknameAvailabilityResponse, RegisterRequest,
    ResetPasswordRequest, SendCodeRequest, UpdateProfileRequest, VerifyCodeRequest,
    VerifyCodeResponse,
};
use crate::presentation::extractors::{MaybePrincipal, RequirePrincipal};

/// Shared state for identity handlers and the authentication middleware
#[derive(Clone)]
pub struct IdentityAppState<R, N>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub transport: Arc<N>,
    pub codes: Arc<VerificationCodeStore>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<IdentityConfig>,
    pub clock: Arc<dyn Clock>,
}

impl<R, N> IdentityAppState<R, N>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    /// Builds the code store and token service from `config`.
    pub fn new(repo: R, transport: N, config: IdentityConfig, clock: Arc<dyn Clock>) -> Self {
        let codes = Arc::new(VerificationCodeStore::new(&config, clock.clone()));
        let tokens = Arc::new(TokenService::new(&config, clock.clone()));
        Self {
            repo: Arc::new(repo),
            transport: Arc::new(transport),
            codes,
            tokens,
            config: Arc::new(config),
            clock,
        }
    }

    fn send_code_use_case(&self) -> SendVerificationCodeUseCase<R, N> {
        SendVerificationCodeUseCase::new(
            self.repo.clone(),
            self.transport.clone(),
            self.codes.clone(),
            self.config.clone(),
        )
    }
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/users/send-verification
pub async fn send_verification<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<SendCodeRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    state
        .send_code_use_case()
        .execute(&req.email, CodePurpose::Register)
        .await?;

    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// POST /api/users/register
pub async fn register<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.codes.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let account = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
            nickname: req.nickname,
            code: req.code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

// ============================================================================
// Session
// ============================================================================

/// POST /api/users/login
pub async fn login<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<Json<LoginResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user: AccountResponse::from(&output.account),
    }))
}

/// GET /api/users/me
pub async fn me(RequirePrincipal(principal): RequirePrincipal) -> Json<AccountResponse> {
    Json(AccountResponse::from(principal.account()))
}

/// PUT /api/users/me
pub async fn update_me<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<UpdateProfileRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let account = UpdateProfileUseCase::new(state.repo.clone())
        .execute(
            &principal,
            UpdateProfileInput {
                nickname: req.nickname,
            },
        )
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// GET /api/users/nickname/available?nickname=..&excludeUserId=..
///
/// Signed-in callers are excluded by default, so their own nickname reads
/// as available.
pub async fn nickname_available<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    MaybePrincipal(principal): MaybePrincipal,
    Query(query): Query<NicknameAvailabilityQuery>,
) -> IdentityResult<Json<NicknameAvailabilityResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let exclude = query
        .exclude_user_id
        .map(AccountId::new)
        .or_else(|| principal.map(|p| p.id()));

    let available = CheckNicknameUseCase::new(state.repo.clone())
        .execute(&query.nickname, exclude)
        .await?;

    Ok(Json(NicknameAvailabilityResponse { available }))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/users/forgot-password/send-code
pub async fn forgot_password_send_code<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<SendCodeRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    state
        .send_code_use_case()
        .execute(&req.email, CodePurpose::ResetPassword)
        .await?;

    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// POST /api/users/forgot-password/verify-code
pub async fn forgot_password_verify_code<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<VerifyCodeRequest>,
) -> Json<VerifyCodeResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let valid = VerifyResetCodeUseCase::new(state.codes.clone()).execute(&req.email, &req.code);
    Json(VerifyCodeResponse { valid })
}

/// POST /api/users/forgot-password/reset
pub async fn forgot_password_reset<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let use_case =
        ResetPasswordUseCase::new(state.repo.clone(), state.codes.clone(), state.config.clone());

    use_case
        .execute(ResetPasswordInput {
            email: req.email,
            code: req.code,
            new_password: req.new_password,
            confirm_password: req.confirm_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

// ============================================================================
// Administration
// ============================================================================

/// PUT /api/users/admin/{id}/disable
pub async fn disable_account<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    RequirePrincipal(actor): RequirePrincipal,
    Path(id): Path<i64>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let account = SetAccountEnabledUseCase::new(state.repo.clone())
        .execute(&actor, AccountId::new(id), false)
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /api/users/admin/{id}/enable
pub async fn enable_account<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    RequirePrincipal(actor): RequirePrincipal,
    Path(id): Path<i64>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let account = SetAccountEnabledUseCase::new(state.repo.clone())
        .execute(&actor, AccountId::new(id), true)
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// DELETE /api/users/admin/{id}
pub async fn delete_account<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    RequirePrincipal(actor): RequirePrincipal,
    Path(id): Path<i64>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    DeleteAccountUseCase::new(state.repo.clone())
        .execute(&actor, AccountId::new(id))
        .await?;

    Ok(Json(MessageResponse::new("Account deleted")))
}

/// GET /api/users/admin/active-count
pub async fn active_count<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    RequirePrincipal(actor): RequirePrincipal,
) -> IdentityResult<Json<ActiveCountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: NotificationTransport + Clone + Send + Sync + 'static,
{
    let count = CountActiveAccountsUseCase::new(state.repo.clone(), state.clock.clone())
        .execute(&actor)
        .await?;

    Ok(Json(ActiveCountResponse { count }))
}
