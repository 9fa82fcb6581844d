use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use airgrid_core::{normalize_all, ReadingSource, UpstreamError};
use airgrid_ingest::HttpReadingSource;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn messages(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    // Echo the requested limit in the topic so the test can see it
    let limit = params.get("limit").cloned().unwrap_or_default();
    Json(json!([
        {
            "topic": format!("air/{limit}"),
            "payload": {"ppm": 640, "temperature": 21.5, "humidity": "38"},
            "timestamp": "2024-05-01T10:00:30.000Z"
        },
        {
            "topic": format!("air/{limit}"),
            "payload": {"aqi": 610, "temperature": 21.4, "humidity": 39},
            "timestamp": "2024-05-01 10:00:00"
        },
        {
            "topic": format!("air/{limit}"),
            "payload": {"raw": "boot"},
            "timestamp": 1714557570000_i64
        },
        "garbage"
    ]))
}

#[tokio::test]
async fn test_fetch_readings_from_backend() {
    let addr = spawn(Router::new().route("/messages", get(messages))).await;
    let source =
        HttpReadingSource::new(&format!("http://{addr}"), 1000, Duration::from_secs(5)).unwrap();

    let readings = source.fetch_readings().await.unwrap();

    assert_eq!(readings.len(), 3);
    assert!(readings.iter().all(|r| r.topic == "air/1000"));

    let points = normalize_all(&readings);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].timestamp, 1_714_557_600_000);
    assert_eq!(points[0].concentration, 610.0);
    assert_eq!(points[1].humidity, 38.0);
}

#[tokio::test]
async fn test_backend_error_status_is_unavailable() {
    let app = Router::new().route(
        "/messages",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let addr = spawn(app).await;
    let source =
        HttpReadingSource::new(&format!("http://{addr}/"), 10, Duration::from_secs(5)).unwrap();

    let err = source.fetch_readings().await.unwrap_err();

    match err {
        UpstreamError::Unavailable(msg) => {
            assert!(msg.contains("503"));
            assert!(msg.contains("maintenance"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_array_body_is_format_error() {
    let app = Router::new().route(
        "/messages",
        get(|| async { Json(json!({"error": "wrong shape"})) }),
    );
    let addr = spawn(app).await;
    let source =
        HttpReadingSource::new(&format!("http://{addr}"), 10, Duration::from_secs(5)).unwrap();

    let err = source.fetch_readings().await.unwrap_err();
    assert!(matches!(err, UpstreamError::Format(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_unavailable() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source =
        HttpReadingSource::new(&format!("http://{addr}"), 10, Duration::from_secs(2)).unwrap();
    let err = source.fetch_readings().await.unwrap_err();
    assert!(matches!(err, UpstreamError::Unavailable(_)));
}
