// src/models/solution.rs

use sqlx::FromRow;

/// Represents the 'solutions' table: at most one row per problem.
///
/// `approaches` and `complexity_analysis` share the catalogue's legacy
/// JSONB encoding quirks and go through the normalizer on read.
#[derive(Debug, Clone, FromRow)]
pub struct SolutionRow {
    pub id: i64,
    pub problem_id: i64,
    pub approaches: Option<serde_json::Value>,
    pub complexity_analysis: Option<serde_json::Value>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
