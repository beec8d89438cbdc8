// src/repo.rs

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{profile::Profile, stats::UserStats},
};

/// A guaranteed-complete user aggregate: both lazily-created rows exist
/// once this is returned.
#[derive(Debug, Clone)]
pub struct UserData {
    pub profile: Profile,
    pub stats: UserStats,
}

/// Provides the lazy profile/stats initialization shared by sign-up,
/// sign-in and the profile read path.
pub struct UserRepo;

impl UserRepo {
    /// Returns the profile and stats rows for `user_id`, creating either
    /// one that is missing.
    ///
    /// Idempotent and safe under concurrent calls for the same new user:
    /// the inserts use ON CONFLICT DO NOTHING, so a race between sign-up
    /// and an immediately following sign-in resolves to a single row pair.
    /// The two inserts are not wrapped in a transaction; a failure in
    /// between leaves a partial user that the next call repairs.
    ///
    /// The default username is the email local-part ("alice" for
    /// "alice@example.com"); `requested_username` overrides it at sign-up.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: i64,
        email: &str,
        requested_username: Option<&str>,
    ) -> Result<UserData, AppError> {
        let username = requested_username
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email));

        sqlx::query("INSERT INTO profiles (id, username) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .bind(username)
            .execute(pool)
            .await?;

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, username, full_name, avatar_url, updated_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let stats = sqlx::query_as::<_, UserStats>(
            "SELECT id, user_id, problems_solved, current_streak, achievement_points, \
             created_at, updated_at FROM user_stats WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(UserData { profile, stats })
    }
}
