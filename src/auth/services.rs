use tracing::{info, warn};

use crate::{
    auth::{
        dto::{ApiResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{
            generate_temporary_password, hash_password, is_strong_password, is_valid_email,
            verify_password,
        },
    },
    error::{AuthError, Result},
    mail::password_reset_email,
    state::AppState,
};

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<ApiResponse> {
    if state.users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AuthError::AlreadyExists("User already exists"));
    }

    if !is_valid_email(&req.email) {
        warn!(email = %req.email, "invalid email");
        return Err(AuthError::InvalidInput("Please enter a valid email"));
    }
    if !is_strong_password(&req.password) {
        warn!("password too short");
        return Err(AuthError::InvalidInput("Please enter a strong password"));
    }

    let hash = hash_password(&req.password)?;
    // A concurrent registration can win between the lookup and the insert.
    let Some(user) = state.users.create(&req.name, &req.email, &hash).await? else {
        warn!(email = %req.email, "email registered concurrently");
        return Err(AuthError::AlreadyExists("User already exists"));
    };
    let token = JwtKeys::from(&state.config.jwt).sign_user(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(ApiResponse::with_token(token))
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<ApiResponse> {
    let Some(user) = state.users.find_by_email(&req.email).await? else {
        warn!(email = %req.email, "login unknown email");
        return Err(AuthError::NotFound("User doesn't exists"));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials("Invalid credentials"));
    }

    let token = JwtKeys::from(&state.config.jwt).sign_user(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::with_token(token))
}

pub async fn admin_login(state: &AppState, req: LoginRequest) -> Result<ApiResponse> {
    let Some(admin) = state.config.admin.as_ref() else {
        warn!("admin login attempted but no admin is configured");
        return Err(AuthError::InvalidCredentials("Invalid credentials"));
    };

    if !admin.matches(&req.email, &req.password) {
        warn!(email = %req.email, "admin login rejected");
        return Err(AuthError::InvalidCredentials("Invalid credentials"));
    }

    let token = JwtKeys::from(&state.config.jwt).sign_admin(&admin.email)?;
    info!("admin logged in");
    Ok(ApiResponse::with_token(token))
}

/// Stores a fresh temporary password, then mails it. A failed send leaves
/// the new hash in place.
pub async fn forgot_password(state: &AppState, req: ForgotPasswordRequest) -> Result<ApiResponse> {
    let Some(user) = state.users.find_by_email(&req.email).await? else {
        warn!(email = %req.email, "password reset for unknown email");
        return Err(AuthError::NotFound("User not found with this email."));
    };

    let temp_password = generate_temporary_password();
    let hash = hash_password(&temp_password)?;
    state.users.update_password(user.id, &hash).await?;

    let (subject, html) = password_reset_email(&state.config.mail.brand, &temp_password);
    state.mailer.send_html(&user.email, &subject, &html).await?;

    info!(user_id = %user.id, "temporary password issued");
    Ok(ApiResponse::with_message("Temporary password sent to your email."))
}

pub async fn get_profile(state: &AppState, AuthUser(user_id): AuthUser) -> Result<ApiResponse> {
    let Some(user) = state.users.find_by_id(user_id).await? else {
        warn!(%user_id, "profile for missing user");
        return Err(AuthError::NotFound("User not found"));
    };
    Ok(ApiResponse::with_user(user.into()))
}

pub async fn change_password(
    state: &AppState,
    AuthUser(user_id): AuthUser,
    req: ChangePasswordRequest,
) -> Result<ApiResponse> {
    if req.current.is_empty() || req.new_pass.is_empty() {
        return Err(AuthError::InvalidInput(
            "Please provide both current and new password.",
        ));
    }
    // Input checks all run before the lookup, so a short `newPass` is
    // reported even when `current` is also wrong.
    if !is_strong_password(&req.new_pass) {
        return Err(AuthError::InvalidInput(
            "New password must be at least 8 characters long.",
        ));
    }

    let Some(user) = state.users.find_by_id(user_id).await? else {
        warn!(%user_id, "password change for missing user");
        return Err(AuthError::NotFound("User not found."));
    };

    if !verify_password(&req.current, &user.password_hash)? {
        warn!(%user_id, "password change with wrong current password");
        return Err(AuthError::InvalidCredentials("Current password is incorrect."));
    }

    let hash = hash_password(&req.new_pass)?;
    state.users.update_password(user.id, &hash).await?;

    info!(%user_id, "password changed");
    Ok(ApiResponse::with_message("Password updated successfully."))
}
