// src/models/activity.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What a user did; stored as text in 'user_activities.action'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Solved,
    Attempted,
    Reviewed,
    Joined,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Solved => "Solved",
            ActivityAction::Attempted => "Attempted",
            ActivityAction::Reviewed => "Reviewed",
            ActivityAction::Joined => "Joined",
        }
    }
}

/// Represents the 'user_activities' table.
///
/// Append-only log; served newest-first. `problem_id` is null for
/// activities that are not tied to a problem (e.g. Joined), and the title
/// and difficulty are denormalized so the feed survives problem deletion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: Option<i64>,
    pub action: String,
    pub problem_title: String,
    pub difficulty: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
