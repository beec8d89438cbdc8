// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::{
        activity::ActivityAction,
        user::{ChangePasswordRequest, LoginRequest, RegisterRequest, User},
    },
    repo::UserRepo,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
        rate_limit::RateLimiter,
    },
};

/// Registers a new account.
///
/// Hashes the password using Argon2 before storing it, initializes the
/// profile and stats rows, and records the 'Joined' activity.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password) VALUES ($1, $2) \
         RETURNING id, email, password, created_at",
    )
    .bind(&payload.email)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("An account with this email already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    // Profile + stats rows. Sign-in re-runs this, so an interruption
    // here only delays initialization rather than losing it.
    UserRepo::get_or_create(&pool, user.id, &user.email, payload.username.as_deref()).await?;

    // Welcome entry for the activity feed; not worth failing the sign-up over.
    if let Err(e) = sqlx::query("INSERT INTO user_activities (user_id, action) VALUES ($1, $2)")
        .bind(user.id)
        .bind(ActivityAction::Joined.as_str())
        .execute(&pool)
        .await
    {
        tracing::warn!("Failed to record join activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// The attempt counter runs before any credential work so a guessing
/// loop is cut off whether or not the email exists. Unknown email and
/// wrong password produce the same generic 401.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(rate_limiter): State<RateLimiter>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if rate_limiter.check(&payload.email) {
        return Err(AppError::RateLimited(
            "Too many sign-in attempts. Try again in a minute.".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError(
        "Invalid email or password".to_string(),
    ))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError(
            "Invalid email or password".to_string(),
        ));
    }

    // Repairs accounts whose initialization was interrupted at sign-up.
    UserRepo::get_or_create(&pool, user.id, &user.email, None).await?;

    let token = sign_jwt(
        user.id,
        &user.email,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Changes the signed-in user's password (security settings form).
pub async fn change_password(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.user_id()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.current_password, &user.password)? {
        return Err(AppError::AuthError(
            "Current password is incorrect".to_string(),
        ));
    }

    let hashed = hash_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(&hashed)
        .bind(user_id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
