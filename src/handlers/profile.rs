use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::profile::{MeResponse, Profile, UpdateProfileRequest},
    repo::UserRepo,
    utils::{html::clean_html, jwt::Claims},
};

/// Get current user's profile and statistics.
///
/// Goes through the repository rather than a bare select: a missing
/// profile or stats row is recreated here instead of surfacing as an
/// empty profile.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let data = UserRepo::get_or_create(&pool, user_id, &claims.email, None).await?;

    Ok(Json(MeResponse {
        id: data.profile.id,
        email: claims.email.clone(),
        username: data.profile.username,
        full_name: data.profile.full_name,
        avatar_url: data.profile.avatar_url,
        stats: data.stats,
    }))
}

/// Apply the settings form. Only submitted fields change.
pub async fn update_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    // Guarantees the row exists before the partial update below.
    UserRepo::get_or_create(&pool, user_id, &claims.email, None).await?;

    let full_name = payload.full_name.as_deref().map(clean_html);

    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET \
            username = COALESCE($2, username), \
            full_name = COALESCE($3, full_name), \
            avatar_url = COALESCE($4, avatar_url), \
            updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, username, full_name, avatar_url, updated_at",
    )
    .bind(user_id)
    .bind(&payload.username)
    .bind(&full_name)
    .bind(&payload.avatar_url)
    .fetch_one(&pool)
    .await?;

    Ok(Json(profile))
}
