// tests/dashboard_tests.rs

use codetrack::config::{
    Config, PROBLEMS_PER_PAGE, RATE_LIMIT_ATTEMPTS, RATE_LIMIT_MAX_TRACKED,
    RATE_LIMIT_WINDOW_SECS,
};
use codetrack::routes;
use codetrack::state::AppState;
use codetrack::utils::rate_limit::RateLimiter;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "dashboard_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
    };

    let rate_limiter = RateLimiter::new(
        RATE_LIMIT_ATTEMPTS,
        Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        RATE_LIMIT_MAX_TRACKED,
    );

    let state = AppState {
        pool,
        config,
        rate_limiter,
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

async fn register_and_login(client: &reqwest::Client, address: &str, email: &str) -> String {
    client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();

    let body = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    body["token"].as_str().unwrap().to_string()
}

fn unique_email(prefix: &str) -> String {
    format!(
        "{}_{}@example.com",
        prefix,
        &uuid::Uuid::new_v4().to_string()[..8]
    )
}

/// Seeds one public problem; JSONB columns are passed through verbatim so
/// tests can exercise the legacy shapes.
async fn seed_problem(
    pool: &PgPool,
    title: &str,
    difficulty: &str,
    category: serde_json::Value,
    use_cases: serde_json::Value,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO problems \
            (title, summary, detailed_description, difficulty, category, use_cases, supported_languages) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(title)
    .bind(format!("Summary of {}", title))
    .bind("Given an input, produce the required output.")
    .bind(difficulty)
    .bind(category)
    .bind(use_cases)
    .bind(serde_json::json!(["python", "rust"]))
    .fetch_one(pool)
    .await
    .expect("Failed to seed problem")
}

async fn toggle(client: &reqwest::Client, address: &str, token: &str, problem_id: i64) -> serde_json::Value {
    client
        .post(&format!(
            "{}/api/dashboard/problems/{}/complete",
            address, problem_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_completion_toggles_back_and_forth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let problem_id = seed_problem(
        &pool,
        "Toggle Target",
        "Easy",
        serde_json::json!(["Arrays"]),
        serde_json::json!([]),
    )
    .await;
    let token = register_and_login(&client, &address, &unique_email("toggler")).await;

    let first = toggle(&client, &address, &token, problem_id).await;
    assert_eq!(first["completed"], true);

    let second = toggle(&client, &address, &token, problem_id).await;
    assert_eq!(second["completed"], false);

    let third = toggle(&client, &address, &token, problem_id).await;
    assert_eq!(third["completed"], true);

    // The solve counter follows the completion rows
    let stats = client
        .get(&format!("{}/api/dashboard/stats", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(stats["problems_solved"], 1);
}

#[tokio::test]
async fn test_toggling_unknown_problem_is_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, &unique_email("lost")).await;

    let response = client
        .post(&format!(
            "{}/api/dashboard/problems/{}/complete",
            address, 999_999_999
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_completion_shows_up_in_the_activity_feed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let problem_id = seed_problem(
        &pool,
        "Feed Entry",
        "Medium",
        serde_json::json!(["Trees"]),
        serde_json::json!([]),
    )
    .await;
    let token = register_and_login(&client, &address, &unique_email("feed")).await;

    toggle(&client, &address, &token, problem_id).await;

    let feed = client
        .get(&format!("{}/api/dashboard/activity", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();

    // Newest first: the Solved entry precedes the Joined entry from sign-up
    assert_eq!(feed[0]["action"], "Solved");
    assert_eq!(feed[0]["problem_title"], "Feed Entry");
    assert_eq!(feed[0]["difficulty"], "Medium");
    assert_eq!(feed.last().unwrap()["action"], "Joined");
}

#[tokio::test]
async fn test_activity_feed_is_capped_at_five_entries() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let token = register_and_login(&client, &address, &unique_email("busy")).await;

    for i in 0..6 {
        let id = seed_problem(
            &pool,
            &format!("Busy Problem {}", i),
            "Easy",
            serde_json::json!([]),
            serde_json::json!([]),
        )
        .await;
        toggle(&client, &address, &token, id).await;
    }

    let feed = client
        .get(&format!("{}/api/dashboard/activity", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();

    assert_eq!(feed.len(), 5);
    assert!(feed.iter().all(|entry| entry["action"] == "Solved"));
}

#[tokio::test]
async fn test_recommendations_exclude_completed_problems() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let mut seeded = Vec::new();
    for i in 0..4 {
        seeded.push(
            seed_problem(
                &pool,
                &format!("Rec Problem {}", i),
                "Easy",
                serde_json::json!([]),
                serde_json::json!([]),
            )
            .await,
        );
    }

    let token = register_and_login(&client, &address, &unique_email("rec")).await;
    toggle(&client, &address, &token, seeded[0]).await;
    toggle(&client, &address, &token, seeded[1]).await;

    let body = client
        .get(&format!("{}/api/dashboard/recommendations", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(recommendations.len() <= 3);

    let recommended_ids: Vec<i64> = recommendations
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(!recommended_ids.contains(&seeded[0]));
    assert!(!recommended_ids.contains(&seeded[1]));
}

#[tokio::test]
async fn test_lazy_initialization_is_idempotent() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let email = unique_email("once");
    let token = register_and_login(&client, &address, &email).await;

    // Hit both lazily-initializing endpoints repeatedly
    for _ in 0..2 {
        client
            .get(&format!("{}/api/dashboard/stats", address))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        client
            .get(&format!("{}/api/profile/me", address))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
    }

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();

    let profile_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let stats_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_stats WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(profile_count, 1);
    assert_eq!(stats_count, 1);
}

#[tokio::test]
async fn test_problem_listing_reports_page_arithmetic() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = client
        .get(&format!("{}/api/problems?page=1", address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let total_count = body["metadata"]["total_count"].as_i64().unwrap();
    let total_pages = body["metadata"]["total_pages"].as_i64().unwrap();
    let expected = (total_count + PROBLEMS_PER_PAGE - 1) / PROBLEMS_PER_PAGE;

    assert_eq!(total_pages, expected);
    assert!(body["problems"].as_array().unwrap().len() <= PROBLEMS_PER_PAGE as usize);
}

#[tokio::test]
async fn test_legacy_shapes_are_normalized_on_read() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    // category stored as a JSON-encoded string, use_cases as bare strings
    let problem_id = seed_problem(
        &pool,
        "Legacy Shapes",
        "Hard",
        serde_json::json!("[\"Graphs\",\"Dynamic Programming\"]"),
        serde_json::json!(["Routing networks", "Cost planning"]),
    )
    .await;

    let body = client
        .get(&format!("{}/api/problems/{}", address, problem_id))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    assert_eq!(
        body["category"],
        serde_json::json!(["Graphs", "Dynamic Programming"])
    );
    assert_eq!(body["use_cases"][0]["name"], "Use Case");
    assert_eq!(body["use_cases"][0]["description"], "Routing networks");
    assert_eq!(body["supported_languages"], serde_json::json!(["python", "rust"]));
}

#[tokio::test]
async fn test_problem_detail_includes_solution_approaches() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let problem_id = seed_problem(
        &pool,
        "With Solution",
        "Medium",
        serde_json::json!(["Arrays"]),
        serde_json::json!([]),
    )
    .await;

    sqlx::query("INSERT INTO solutions (problem_id, approaches) VALUES ($1, $2)")
        .bind(problem_id)
        .bind(serde_json::json!([
            { "title": "Brute force", "description": "Try every pair" },
            { "description": "Hash map lookup" }
        ]))
        .execute(&pool)
        .await
        .unwrap();

    let body = client
        .get(&format!("{}/api/problems/{}", address, problem_id))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let approaches = body["approaches"].as_array().unwrap();
    assert_eq!(approaches.len(), 2);
    assert_eq!(approaches[0]["title"], "Brute force");
    assert!(approaches[1]["title"].is_null());
}
