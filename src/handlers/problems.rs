// src/handlers/problems.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::PROBLEMS_PER_PAGE,
    error::AppError,
    models::{
        problem::{
            PROBLEM_COLUMNS, PageMetadata, ProblemListParams, ProblemListResponse,
            ProblemResponse, ProblemRow,
        },
        solution::SolutionRow,
    },
    utils::normalize::{self, Approach},
};

/// Lists one catalogue page of active, public problems.
///
/// The page window is fixed server-side at six problems ordered by id.
/// The q/difficulty/category filters narrow the fetched page only; they
/// never widen the window or re-run the query, so a filter can empty the
/// visible page while later pages still hold matches. That is the
/// intended behavior of the card grid, not something to compensate for
/// here.
pub async fn list_problems(
    State(pool): State<PgPool>,
    Query(params): Query<ProblemListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1);

    let query = format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems \
         WHERE is_active AND visibility = 'public' \
         ORDER BY id LIMIT $1 OFFSET $2"
    );
    let rows = sqlx::query_as::<_, ProblemRow>(&query)
        .bind(PROBLEMS_PER_PAGE)
        .bind((page - 1) * PROBLEMS_PER_PAGE)
        .fetch_all(&pool)
        .await?;

    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM problems WHERE is_active AND visibility = 'public'",
    )
    .fetch_one(&pool)
    .await?;

    let mut approaches = approaches_for(&pool, rows.iter().map(|r| r.id).collect()).await?;

    let problems: Vec<ProblemResponse> = rows
        .into_iter()
        .map(|row| {
            let row_approaches = approaches.remove(&row.id).unwrap_or_default();
            ProblemResponse::from_row(row, row_approaches)
        })
        .collect();

    Ok(Json(ProblemListResponse {
        problems: apply_filters(problems, &params),
        metadata: PageMetadata {
            total_count,
            page,
            total_pages: total_pages(total_count),
        },
    }))
}

/// Retrieves a single public problem with its solution approaches.
pub async fn get_problem(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let query = format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems \
         WHERE id = $1 AND is_active AND visibility = 'public'"
    );
    let row = sqlx::query_as::<_, ProblemRow>(&query)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Problem not found".to_string()))?;

    let approaches = approaches_for(&pool, vec![row.id])
        .await?
        .remove(&row.id)
        .unwrap_or_default();

    Ok(Json(ProblemResponse::from_row(row, approaches)))
}

/// Solution approaches for a set of problems, keyed by problem id.
async fn approaches_for(
    pool: &PgPool,
    ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<Approach>>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let solutions = sqlx::query_as::<_, SolutionRow>(
        "SELECT id, problem_id, approaches, complexity_analysis, created_at \
         FROM solutions WHERE problem_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    Ok(solutions
        .into_iter()
        .map(|s| (s.problem_id, normalize::approach_list(s.approaches.as_ref())))
        .collect())
}

fn total_pages(total_count: i64) -> i64 {
    (total_count + PROBLEMS_PER_PAGE - 1) / PROBLEMS_PER_PAGE
}

/// Narrows the loaded page, in order: search text against title or
/// summary (case-insensitive), exact difficulty, category membership.
fn apply_filters(
    problems: Vec<ProblemResponse>,
    params: &ProblemListParams,
) -> Vec<ProblemResponse> {
    let search = params
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    problems
        .into_iter()
        .filter(|p| match &search {
            Some(q) => {
                p.title.to_lowercase().contains(q) || p.summary.to_lowercase().contains(q)
            }
            None => true,
        })
        .filter(|p| {
            params
                .difficulty
                .as_ref()
                .is_none_or(|d| &p.difficulty == d)
        })
        .filter(|p| {
            params
                .category
                .as_ref()
                .is_none_or(|c| p.category.iter().any(|entry| entry == c))
        })
        .collect()
}
