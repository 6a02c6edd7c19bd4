mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use dbarena::api::BenchApi;
use dbarena::backend::BenchBackend;
use dbarena::testutil::{MockBackend, MockCluster};
use dbarena::topology::ShardedCluster;

fn create_test_router() -> Router {
    let backends: Vec<Arc<dyn BenchBackend>> = vec![
        Arc::new(MockBackend::new("cassandra").with_latency(Duration::from_millis(2))),
        Arc::new(MockBackend::new("mongodb").with_latency(Duration::from_millis(3))),
        Arc::new(MockBackend::new("redis")),
    ];
    let cluster: Arc<dyn ShardedCluster> = Arc::new(MockCluster::new());
    BenchApi::new(common::service(backends, Some(cluster))).router()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = create_test_router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(
        json["backends"],
        serde_json::json!(["cassandra", "mongodb", "redis"])
    );
}

#[tokio::test]
async fn test_benchmark_info() {
    let response = create_test_router()
        .oneshot(get("/api/v1/benchmark/info"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["seed"], 42);
    assert_eq!(json["total_operations_per_backend"], 150);
    assert_eq!(json["phases"][0]["kind"], "insert");
    assert_eq!(json["phases"][0]["count"], 100);
}

#[tokio::test(start_paused = true)]
async fn test_run_single() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/redis", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["backend"], "redis");
    assert_eq!(json["total_queries"], 150);
    assert_eq!(json["failed_queries"], 0);
    assert_eq!(json["avg_time"], 1.0);
    assert!(json["timestamp"].is_string());
    assert!(json.get("detailed_results").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_run_single_detailed_with_workload_override() {
    let response = create_test_router()
        .oneshot(post(
            "/api/v1/benchmark/mongodb?detailed=true",
            r#"{"seed": 7, "phases": [{"kind": "filter_query", "count": 4}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_queries"], 4);
    let samples = json["detailed_results"].as_array().unwrap();
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[0]["operation"], "filter_query");
    assert_eq!(samples[0]["query_num"], 1);
    assert_eq!(samples[0]["time"], 3.0);
}

#[tokio::test]
async fn test_run_single_unknown_backend() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/oracle", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["code"], "UNKNOWN_BACKEND");
    assert!(json["error"].as_str().unwrap().contains("oracle"));
}

#[tokio::test]
async fn test_invalid_workload_body() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/redis", r#"{"phases": "lots"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_WORKLOAD");
}

#[tokio::test]
async fn test_empty_workload_rejected() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/all", r#"{"phases": []}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overflowing_phase_counts_rejected() {
    let response = create_test_router()
        .oneshot(post(
            "/api/v1/benchmark/redis",
            r#"{"phases": [{"kind": "scan", "count": 18446744073709551615}, {"kind": "scan", "count": 1}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_WORKLOAD");
}

#[tokio::test(start_paused = true)]
async fn test_run_all_rankings() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/all", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["benchmarks"]["cassandra"]["total_queries"], 150);
    assert_eq!(
        json["ranking_by_latency"],
        serde_json::json!(["redis", "cassandra", "mongodb"])
    );
    assert_eq!(
        json["ranking_by_throughput"],
        serde_json::json!(["redis", "cassandra", "mongodb"])
    );
    assert!(json["total_duration"].as_f64().unwrap() > 0.0);
    assert!(json.get("errors").is_none());

    let redis = json["detailed_results"]["redis"].as_array().unwrap();
    assert_eq!(redis.len(), 150);
    assert_eq!(redis[0]["operation"], "insert");
    assert_eq!(redis[149]["query_num"], 150);
    assert_eq!(json["detailed_results"]["mongodb"][0]["time"], 3.0);
}

#[tokio::test(start_paused = true)]
async fn test_run_all_without_details() {
    let response = create_test_router()
        .oneshot(post("/api/v1/benchmark/all?detailed=false", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["benchmarks"]["redis"]["total_queries"], 150);
    assert!(json.get("detailed_results").is_none());
}

#[tokio::test]
async fn test_enable_sharding_reports_outcome_when_status_unreadable() {
    let cluster: Arc<dyn ShardedCluster> =
        Arc::new(MockCluster::unreadable_once_sharded("config server unreachable"));
    let router = BenchApi::new(common::service(vec![], Some(cluster))).router();

    let response = router.oneshot(post("/api/v1/sharding/enable", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["outcome"], "enabled");
    assert!(json.get("sharding_status").is_none());
}

#[tokio::test]
async fn test_sharding_status_and_enable() {
    let router = create_test_router();

    let response = router
        .clone()
        .oneshot(get("/api/v1/sharding/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_sharded"], false);

    let response = router
        .clone()
        .oneshot(post("/api/v1/sharding/enable", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["outcome"], "enabled");
    assert_eq!(json["sharding_status"]["is_sharded"], true);
    assert_eq!(json["sharding_status"]["shard_key"], serde_json::json!(["species"]));

    let response = router
        .oneshot(post("/api/v1/sharding/enable", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["outcome"], "already_sharded");
}

#[tokio::test(start_paused = true)]
async fn test_sharding_comparison() {
    let response = create_test_router()
        .oneshot(post("/api/v1/sharding/comparison", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["sharding"], "enabled");
    assert_eq!(json["before_sharding"]["backend"], "mongodb");
    assert_eq!(json["after_sharding"]["total_queries"], 150);
    assert!(json["improvement"]["avg_time_percent"].is_number());
    assert!(json["timestamp"].is_string());
}
