use anyhow::Result;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use mapcond::catalog::Catalog;
use mapcond::config::{BodyKind, FetchConfig};
use mapcond::fetch::Fetcher;
use mapcond::pipeline::ConditionsService;
use mapcond::rest::router;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn app_for(page: &str) -> Result<Router> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data").join(page);
    let fetcher = Fetcher::from_config(&FetchConfig::file(path, BodyKind::Html))?;
    Ok(router(Arc::new(ConditionsService::new(fetcher, Catalog::default()))))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn health_reports_service() -> Result<()> {
    let (status, body) = get(app_for("conditions.html")?, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "map-conditions-api");
    Ok(())
}

#[tokio::test]
async fn docs_list_zone_slugs() -> Result<()> {
    let (status, body) = get(app_for("conditions.html")?, "/api/v1/docs").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zones"][0], "dam-battlegrounds");
    assert_eq!(body["zones"].as_array().map(Vec::len), Some(6));
    Ok(())
}

#[tokio::test]
async fn all_conditions_default_to_json() -> Result<()> {
    let (status, body) = get(app_for("conditions.html")?, "/api/v1/conditions").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["format"], "json");
    assert_eq!(body["data"]["zones"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["data"]["time_info"]["timezone"], "America/New_York");
    Ok(())
}

#[tokio::test]
async fn summary_format_is_a_string() -> Result<()> {
    let (status, body) = get(
        app_for("conditions.html")?,
        "/api/v1/conditions?format=summary",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        "3/6 zones have active conditions (2 major conditions)"
    );
    Ok(())
}

#[tokio::test]
async fn zone_route_accepts_slug() -> Result<()> {
    let (status, body) = get(
        app_for("conditions.html")?,
        "/api/v1/conditions/the-blue-gate",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "The Blue Gate");
    assert_eq!(body["data"]["current_condition"], "LUSH BLOOMS");
    Ok(())
}

#[tokio::test]
async fn request_errors_map_to_client_statuses() -> Result<()> {
    // The page file is missing, so these must be rejected without a fetch.
    let (status, body) = get(app_for("missing.html")?, "/api/v1/conditions/atlantis").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Map 'atlantis' not found");

    let (status, _) = get(
        app_for("missing.html")?,
        "/api/v1/conditions/buried-city?format=summary",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app_for("missing.html")?, "/api/v1/conditions?format=xml").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("xml")));
    Ok(())
}

#[tokio::test]
async fn fetch_failure_is_a_server_error() -> Result<()> {
    let (status, body) = get(app_for("missing.html")?, "/api/v1/conditions").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("failed to fetch map conditions"))
    );
    Ok(())
}

#[tokio::test]
async fn active_route_filters_major_only() -> Result<()> {
    let (status, body) = get(
        app_for("conditions.html")?,
        "/api/v1/conditions/active?major_only=true",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_active"], 1);
    assert_eq!(body["data"]["filter"], "major_only");

    let (_, body) = get(app_for("conditions.html")?, "/api/v1/conditions/active").await?;
    assert_eq!(body["data"]["total_active"], 3);
    assert_eq!(body["data"]["filter"], "all_active");
    Ok(())
}

#[tokio::test]
async fn upcoming_route_orders_by_start_time() -> Result<()> {
    let (status, body) = get(app_for("conditions.html")?, "/api/v1/conditions/upcoming").await?;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]["upcoming_conditions"]
        .as_array()
        .map(|zones| zones.iter().filter_map(|z| z["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Buried City", "Dam Battlegrounds", "The Spaceport"]);
    Ok(())
}
