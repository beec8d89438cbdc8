// src/models/problem.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use crate::utils::normalize::{self, Approach, InsightValue, UseCase};

/// Represents the 'problems' table in the database.
///
/// The JSONB columns are kept raw here; `ProblemResponse` is the only
/// place they are decoded into canonical shapes.
#[derive(Debug, Clone, FromRow)]
pub struct ProblemRow {
    pub id: i64,
    pub title: String,

    /// Short card text, searched together with the title.
    pub summary: String,
    pub detailed_description: String,

    /// 'Easy', 'Medium' or 'Hard'.
    pub difficulty: String,

    // Heterogeneous legacy columns: native array, JSON-encoded string,
    // or (use_cases) array of bare strings.
    pub category: Option<serde_json::Value>,
    pub use_cases: Option<serde_json::Value>,
    pub supported_languages: Option<serde_json::Value>,
    pub key_insights: Option<serde_json::Value>,

    pub is_active: bool,

    /// 'public' or 'private'. Only public problems are served.
    pub visibility: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Column list shared across queries to avoid repetition.
pub const PROBLEM_COLUMNS: &str = "id, title, summary, detailed_description, difficulty, \
     category, use_cases, supported_languages, key_insights, \
     is_active, visibility, created_at, updated_at";

/// A problem as served to clients, with every stored shape reconciled.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemResponse {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub detailed_description: String,
    pub difficulty: String,
    pub category: Vec<String>,
    pub use_cases: Vec<UseCase>,
    pub supported_languages: Vec<String>,
    pub key_insights: BTreeMap<String, InsightValue>,
    pub approaches: Vec<Approach>,
}

impl ProblemResponse {
    /// Normalizes a stored row, attaching the solution approaches for it
    /// (empty when the problem has no solutions row).
    pub fn from_row(row: ProblemRow, approaches: Vec<Approach>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            summary: row.summary,
            detailed_description: row.detailed_description,
            difficulty: row.difficulty,
            category: normalize::string_list(row.category.as_ref()),
            use_cases: normalize::use_case_list(row.use_cases.as_ref()),
            supported_languages: normalize::string_list(row.supported_languages.as_ref()),
            key_insights: normalize::key_insights(row.key_insights.as_ref()),
            approaches,
        }
    }
}

/// Query parameters for the problem catalogue.
#[derive(Debug, Default, Deserialize)]
pub struct ProblemListParams {
    /// 1-based page number. Out-of-range values are passed through to the
    /// database unvalidated and simply yield an empty page.
    pub page: Option<i64>,

    /// Case-insensitive substring match against title or summary.
    pub q: Option<String>,

    /// Exact-match difficulty filter.
    pub difficulty: Option<String>,

    /// Keeps problems whose category list contains this entry.
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProblemListResponse {
    pub problems: Vec<ProblemResponse>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Serialize)]
pub struct PageMetadata {
    pub total_count: i64,
    pub page: i64,
    pub total_pages: i64,
}
