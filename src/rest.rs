use crate::catalog::Catalog;
use crate::pipeline::ConditionsService;
use crate::query::{ConditionsQuery, OutputFormat, QueryError};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "map-conditions-api";

#[derive(Debug, Deserialize)]
pub struct FormatParams {
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveParams {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    major_only: Option<String>,
}

pub fn router(service: Arc<ConditionsService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/docs", get(docs))
        .route("/api/v1/conditions", get(all_conditions))
        .route("/api/v1/conditions/active", get(active_conditions))
        .route("/api/v1/conditions/upcoming", get(upcoming_conditions))
        .route("/api/v1/conditions/:zone", get(zone_condition))
        .layer(cors)
        .with_state(service)
}

pub async fn serve(bind: &str, service: Arc<ConditionsService>) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %bind, "rest api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn docs(State(service): State<Arc<ConditionsService>>) -> Json<Value> {
    Json(docs_body(service.catalog()))
}

async fn all_conditions(
    State(service): State<Arc<ConditionsService>>,
    Query(params): Query<FormatParams>,
) -> Response {
    respond(service, ConditionsQuery::All, params.format).await
}

async fn active_conditions(
    State(service): State<Arc<ConditionsService>>,
    Query(params): Query<ActiveParams>,
) -> Response {
    let major_only = params
        .major_only
        .as_deref()
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    respond(service, ConditionsQuery::Active { major_only }, params.format).await
}

async fn upcoming_conditions(
    State(service): State<Arc<ConditionsService>>,
    Query(params): Query<FormatParams>,
) -> Response {
    respond(service, ConditionsQuery::Upcoming, params.format).await
}

async fn zone_condition(
    State(service): State<Arc<ConditionsService>>,
    Path(zone): Path<String>,
    Query(params): Query<FormatParams>,
) -> Response {
    respond(service, ConditionsQuery::Zone(zone), params.format).await
}

async fn respond(
    service: Arc<ConditionsService>,
    query: ConditionsQuery,
    format: Option<String>,
) -> Response {
    let format = match format.as_deref().unwrap_or("json").parse::<OutputFormat>() {
        Ok(format) => format,
        Err(err) => return error_response(&err),
    };

    let task = {
        let query = query.clone();
        tokio::task::spawn_blocking(move || service.answer(&query, format))
    };

    match task.await {
        Ok(Ok(output)) => Json(json!({
            "success": true,
            "format": format.as_str(),
            "data": output.into_value(),
        }))
        .into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(join_err) => {
            error!(error = %join_err, query = query.label(), "scrape task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("scrape task failed: {join_err}") })),
            )
                .into_response()
        }
    }
}

pub fn status_for(err: &QueryError) -> StatusCode {
    match err {
        QueryError::UnknownZone(_) => StatusCode::NOT_FOUND,
        QueryError::InvalidFormat(_) | QueryError::UnsupportedFormat { .. } => {
            StatusCode::BAD_REQUEST
        }
        QueryError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &QueryError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn docs_body(catalog: &Catalog) -> Value {
    let slugs: Vec<&str> = catalog.entries().iter().map(|e| e.slug.as_str()).collect();
    json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /health": "Health check",
            "GET /api/v1/conditions": "All zone conditions",
            "GET /api/v1/conditions/{zone}": "One zone, by name or slug",
            "GET /api/v1/conditions/active": "Zones with an active condition (major_only=true to narrow)",
            "GET /api/v1/conditions/upcoming": "Upcoming conditions ordered by start time",
        },
        "zones": slugs,
        "formats": ["json", "text", "summary"],
    })
}
