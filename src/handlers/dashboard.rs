// src/handlers/dashboard.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::{ACTIVITY_FEED_LIMIT, RECOMMENDATION_LIMIT},
    error::AppError,
    models::{
        activity::{ActivityAction, UserActivity},
        problem::{PROBLEM_COLUMNS, ProblemResponse, ProblemRow},
    },
    repo::UserRepo,
    utils::jwt::Claims,
};

/// Helper struct for fetching the activity-feed fields of a problem.
#[derive(sqlx::FromRow)]
struct ProblemLabel {
    title: String,
    difficulty: String,
}

/// Current user's stats card. Creates the zeroed row on first access.
pub async fn get_stats(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let data = UserRepo::get_or_create(&pool, user_id, &claims.email, None).await?;

    Ok(Json(data.stats))
}

/// The user's most recent activity entries, newest first.
pub async fn get_activity(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let activities = sqlx::query_as::<_, UserActivity>(
        "SELECT id, user_id, problem_id, action, problem_title, difficulty, created_at \
         FROM user_activities \
         WHERE user_id = $1 \
         ORDER BY created_at DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(ACTIVITY_FEED_LIMIT)
    .fetch_all(&pool)
    .await?;

    Ok(Json(activities))
}

/// Up to three active, public problems the user has not completed.
///
/// An empty list is a valid answer (new catalogue, or the user finished
/// everything); the client shows an explicit empty state for it.
pub async fn get_recommendations(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let query = format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems \
         WHERE is_active AND visibility = 'public' \
           AND id NOT IN (SELECT problem_id FROM problem_completions WHERE user_id = $1) \
         ORDER BY id \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, ProblemRow>(&query)
        .bind(user_id)
        .bind(RECOMMENDATION_LIMIT)
        .fetch_all(&pool)
        .await?;

    let recommendations: Vec<ProblemResponse> = rows
        .into_iter()
        .map(|row| ProblemResponse::from_row(row, Vec::new()))
        .collect();

    Ok(Json(serde_json::json!({ "recommendations": recommendations })))
}

/// Toggle completion status for a problem.
///
/// First call marks the problem solved (activity entry + completion
/// record), the next call un-marks it, and so on. Re-marking a problem
/// that already has a completion record is treated as already-completed
/// rather than an error, so retries and double-clicks are no-ops.
pub async fn toggle_completion(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(problem_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let problem = sqlx::query_as::<_, ProblemLabel>(
        "SELECT title, difficulty FROM problems \
         WHERE id = $1 AND is_active AND visibility = 'public'",
    )
    .bind(problem_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Problem not found".to_string()))?;

    let mut tx = pool.begin().await?;

    // 1. Check if already marked solved
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM user_activities \
         WHERE user_id = $1 AND problem_id = $2 AND action = $3",
    )
    .bind(user_id)
    .bind(problem_id)
    .bind(ActivityAction::Solved.as_str())
    .fetch_optional(&mut *tx)
    .await?;

    let completed = existing.is_none();

    if let Some(activity_id) = existing {
        // Un-complete
        sqlx::query("DELETE FROM user_activities WHERE id = $1")
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM problem_completions WHERE user_id = $1 AND problem_id = $2")
            .bind(user_id)
            .bind(problem_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "INSERT INTO user_activities (user_id, problem_id, action, problem_title, difficulty) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(ActivityAction::Solved.as_str())
        .bind(&problem.title)
        .bind(&problem.difficulty)
        .execute(&mut *tx)
        .await?;

        // A concurrent duplicate mark must read as "already completed",
        // so the insert absorbs the conflict instead of erroring.
        sqlx::query(
            "INSERT INTO problem_completions (user_id, problem_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, problem_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(problem_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "completed": completed })))
}
