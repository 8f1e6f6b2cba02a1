/// Router tests: HTML form and JSON API
///
/// Run with: cargo test --test http_tests -- --nocapture

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use scour_predictor::{
    web::{router, AppState},
    ArtifactPaths, Artifacts, InputBounds,
};
use std::{path::Path, sync::Arc};
use tower::ServiceExt;

fn app_with(artifacts: Artifacts) -> Router {
    router(AppState {
        artifacts: Arc::new(artifacts),
        bounds: InputBounds::default(),
    })
}

fn app() -> Router {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    let paths = ArtifactPaths::in_dir(dir, "scaler.json", "rf_model.json", "gpr_model.json");
    app_with(Artifacts::load(&paths).unwrap())
}

async fn body_text(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_form_page_renders_defaults() {
    println!("\n=== Test: Form Page ===");
    let res = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("Predict Scour Depth"));
    assert!(html.contains("name=\"d50\" min=\"0.00001\""));
    assert!(html.contains("value=\"1.5\""));
    assert!(html.contains("H/D = 2.000"));
    assert!(html.contains("D/d50 = 300.000"));
    println!("✓ form rendered ({} bytes)", html.len());
}

#[tokio::test]
async fn test_form_submit_gpr_shows_uncertainty() {
    println!("\n=== Test: Form Submit (GPR) ===");
    let res = app()
        .oneshot(form_post(
            "u=1.5&h=0.6&d=0.3&fr=0.5&d50=0.001&model=gaussian_process",
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("Predicted Scour Depth (GPR) = "));
    assert!(html.contains("Uncertainty (±1σ) = "));
    assert!(html.contains("<option value=\"gaussian_process\" selected>"));
    println!("✓ GPR result rendered");
}

#[tokio::test]
async fn test_form_submit_out_of_range_shows_error() {
    println!("\n=== Test: Form Submit Out Of Range ===");
    let res = app()
        .oneshot(form_post("u=1.5&h=0.6&d=0&fr=0.5&d50=0.001&model=rf"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("D = 0 is below the minimum of 0.01"));
    assert!(!html.contains("Predicted Scour Depth ("));
    println!("✓ error block rendered");
}

#[tokio::test]
async fn test_api_predict_random_forest() {
    println!("\n=== Test: API Predict (RF) ===");
    let res = app()
        .oneshot(json_post(
            "/api/predict",
            serde_json::json!({ "u": 1.5, "h": 0.6, "d": 0.3, "fr": 0.5, "d50": 0.001, "model": "Random Forest" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(v["model"], "random_forest");
    assert!((v["h_d"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    assert!((v["d_d50"].as_f64().unwrap() - 300.0).abs() < 1e-9);
    assert!(v.get("uncertainty").is_none());
    assert_eq!(v["display"].as_array().unwrap().len(), 1);
    println!("✓ {}", v["display"][0]);
}

#[tokio::test]
async fn test_api_out_of_range_is_422() {
    println!("\n=== Test: API Out Of Range ===");
    let res = app()
        .oneshot(json_post(
            "/api/predict",
            serde_json::json!({ "u": 1.5, "h": 0.6, "d": 0.3, "fr": 0.5, "d50": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert!(v["error"].as_str().unwrap().contains("d50"));
    println!("✓ {}", v["error"]);
}

#[tokio::test]
async fn test_api_missing_model_is_500() {
    println!("\n=== Test: API Missing Model ===");
    let res = app_with(Artifacts::default())
        .oneshot(json_post(
            "/api/predict",
            serde_json::json!({ "u": 1.5, "h": 0.6, "d": 0.3, "fr": 0.5, "d50": 0.001, "model": "gpr" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(v["error"], "scaler is not loaded");
    println!("✓ {}", v["error"]);
}

#[tokio::test]
async fn test_healthz_lists_feature_order() {
    let res = app()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(
        v["features"],
        serde_json::json!(["U", "H", "D", "Fr", "d50", "H_D", "D_d50"])
    );
}
