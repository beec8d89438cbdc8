// src/models/stats.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'user_stats' table: one row per account, created lazily
/// with zero defaults. Counters are maintained by completion tracking and
/// are never negative (enforced by CHECK constraints).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserStats {
    pub id: i64,
    pub user_id: i64,
    pub problems_solved: i32,
    pub current_streak: i32,
    pub achievement_points: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
