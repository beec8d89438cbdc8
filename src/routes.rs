// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, dashboard, problems, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, problems, dashboard, profile).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, sign-in rate limiter).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Protected: password change requires a valid session
        .merge(
            Router::new()
                .route("/password", put(auth::change_password))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let problem_routes = Router::new()
        .route("/", get(problems::list_problems))
        .route("/{id}", get(problems::get_problem));

    let dashboard_routes = Router::new()
        .route("/stats", get(dashboard::get_stats))
        .route("/activity", get(dashboard::get_activity))
        .route("/recommendations", get(dashboard::get_recommendations))
        .route(
            "/problems/{id}/complete",
            post(dashboard::toggle_completion),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me).put(profile::update_me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/problems", problem_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/profile", profile_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
