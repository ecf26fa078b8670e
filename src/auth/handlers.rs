use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{ApiResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest},
        extractors::AuthUser,
        services,
    },
    error::{AuthError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin", post(admin_login))
        .route("/forgot-password", post(forgot_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/change-password", put(change_password))
}

/// Unreadable bodies still get the JSON envelope.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(e) => {
            warn!(error = %e, "rejected request body");
            Err(AuthError::InvalidInput("Invalid request body"))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    services::register(&state, body(payload)?).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    services::login(&state, body(payload)?).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    services::admin_login(&state, body(payload)?).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    services::forgot_password(&state, body(payload)?).await.map(Json)
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse>> {
    services::get_profile(&state, user).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    services::change_password(&state, user, body(payload)?).await.map(Json)
}
