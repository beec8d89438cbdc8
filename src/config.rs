// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Problems returned per catalogue page. The pager is server-driven;
/// search/difficulty/category filters only narrow the loaded page.
pub const PROBLEMS_PER_PAGE: i64 = 6;

/// Dashboard recommendation count.
pub const RECOMMENDATION_LIMIT: i64 = 3;

/// Recent-activity entries shown on the dashboard.
pub const ACTIVITY_FEED_LIMIT: i64 = 5;

/// Sign-in attempts allowed per identifier inside one window.
pub const RATE_LIMIT_ATTEMPTS: u32 = 5;

/// Length of the sliding rate-limit window, in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Upper bound on identifiers tracked by the in-memory limiter.
pub const RATE_LIMIT_MAX_TRACKED: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
        }
    }
}
