// src/models/profile.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::models::stats::UserStats;
use crate::models::user::USERNAME_RE;

/// Represents the 'profiles' table: one row per account, created lazily.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the owning account id.
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated profile + stats data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub stats: UserStats,
}

/// DTO for the settings form. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(regex(path = *USERNAME_RE, message = "Username must be 3-50 word characters."))]
    pub username: Option<String>,

    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub full_name: Option<String>,

    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub avatar_url: Option<String>,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
