use crate::Identity;
use crate::model::{
    Account, ChangePasswordRequest, LoginRequest, PendingVerification, RegisterRequest,
    ResendRequest, ResendResponse, Session, UpdateProfileRequest, VerifyRequest,
};
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use platter_domain::constants::TAG_AUTH;
use platter_kernel::prelude::*;
use platter_kernel::security::session::{clear_session_cookie, session_cookie};

fn identity(state: &ApiState) -> Result<&Identity, ApiError> {
    Ok(state.try_get_slice::<Identity>()?)
}

fn with_cookie(state: &ApiState, session: Session) -> ([(HeaderName, String); 1], Json<Session>) {
    let cookie = session_cookie(
        &state.config.security.session,
        &session.token,
        state.tokens.ttl_seconds(),
    );
    ([(SET_COOKIE, cookie)], Json(session))
}

#[api_handler(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = CREATED, description = "Account created; a verification code was sent", body = PendingVerification),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = CONFLICT, description = "Email already registered", body = ErrorBody),
    ),
    tag = TAG_AUTH,
)]
pub(crate) async fn register(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = identity(&state)?.service.register(request).await?;
    Ok((StatusCode::CREATED, Json(pending)))
}

#[api_handler(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = OK, description = "Verified and signed in", body = Session),
        (status = UNAUTHORIZED, description = "Wrong or expired code", body = ErrorBody),
        (status = CONFLICT, description = "Already verified", body = ErrorBody),
        (status = TOO_MANY_REQUESTS, description = "Attempts exhausted", body = ErrorBody),
    ),
    tag = TAG_AUTH,
)]
pub(crate) async fn verify(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = identity(&state)?.service.verify(request).await?;
    Ok(with_cookie(&state, session))
}

#[api_handler(
    post,
    path = "/api/auth/resend",
    request_body = ResendRequest,
    responses(
        (status = OK, description = "A new code was sent", body = ResendResponse),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Already verified", body = ErrorBody),
        (status = TOO_MANY_REQUESTS, description = "Inside the resend cooldown", body = ErrorBody),
    ),
    tag = TAG_AUTH,
)]
pub(crate) async fn resend(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<ResendRequest>,
) -> Result<Json<ResendResponse>, ApiError> {
    Ok(Json(identity(&state)?.service.resend(request).await?))
}

#[api_handler(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Signed in", body = Session),
        (status = UNAUTHORIZED, description = "Invalid email or password", body = ErrorBody),
        (status = FORBIDDEN, description = "Email not verified", body = ErrorBody),
    ),
    tag = TAG_AUTH,
)]
pub(crate) async fn login(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = identity(&state)?.service.login(request).await?;
    Ok(with_cookie(&state, session))
}

#[api_handler(
    post,
    path = "/api/auth/logout",
    responses((status = NO_CONTENT, description = "Session cookie cleared")),
    tag = TAG_AUTH,
)]
pub(crate) async fn logout(State(state): State<ApiState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(&state.config.security.session);
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)])
}

#[api_handler(
    get,
    path = "/api/auth/me",
    responses(
        (status = OK, body = Account),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_AUTH,
)]
pub(crate) async fn me(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(identity(&state)?.service.account(&user.id).await?))
}

#[api_handler(
    patch,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = OK, body = Account),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_AUTH,
)]
pub(crate) async fn update_me(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(identity(&state)?.service.update_profile(&user.id, request).await?))
}

#[api_handler(
    post,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = NO_CONTENT, description = "Password changed"),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = UNAUTHORIZED, description = "Current password is wrong", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_AUTH,
)]
pub(crate) async fn change_password(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    identity(&state)?.service.change_password(&user.id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}
