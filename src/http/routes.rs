use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    article::Article,
    error::RestError,
    image::{
        best_guess,
        placeholder::{placeholder_seed, Placeholder},
        ImageResolver, Resolution,
    },
};

pub const MAX_BATCH_SIZE: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ImageResolver>,
    pub batch_concurrency: usize,
}

impl AppState {
    pub fn new(resolver: ImageResolver, batch_concurrency: usize) -> Self {
        Self {
            resolver: Arc::new(resolver),
            batch_concurrency,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub previous: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderParams {
    pub category: Option<String>,
    pub seed: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resolve", post(resolve))
        .route("/resolve/batch", post(resolve_batch))
        .route("/best-guess", post(guess))
        .route("/placeholder", get(placeholder))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
    payload: Result<Json<Article>, JsonRejection>,
) -> Result<Json<Resolution>, RestError> {
    let Json(article) = payload?;

    let resolution = state
        .resolver
        .resolve_detailed(&article, params.previous.as_deref())
        .await;
    debug!("Resolved {} -> {}", article.display_title(), resolution.url);

    Ok(Json(resolution))
}

async fn resolve_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Article>>, JsonRejection>,
) -> Result<Json<Vec<Resolution>>, RestError> {
    let Json(articles) = payload?;

    if articles.len() > MAX_BATCH_SIZE {
        return Err(RestError::BatchTooLarge {
            size: articles.len(),
            max: MAX_BATCH_SIZE,
        });
    }

    let resolutions = state
        .resolver
        .resolve_many(&articles, state.batch_concurrency)
        .await;

    Ok(Json(resolutions))
}

async fn guess(payload: Result<Json<Article>, JsonRejection>) -> Result<impl IntoResponse, RestError> {
    let Json(article) = payload?;

    Ok(Json(json!({ "url": best_guess(&article) })))
}

async fn placeholder(Query(params): Query<PlaceholderParams>) -> Json<Placeholder> {
    let seed = params
        .seed
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| placeholder_seed(&Article::default()));

    Json(Placeholder::new(params.category.as_deref(), &seed))
}
