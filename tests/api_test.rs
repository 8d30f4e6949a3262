//! End-to-end test of the HTTP surface over the local snapshot store:
//! sign in, manage suppliers and trips, run reports, export CSV.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tanchoice_backend::{config::AppState, db::LocalStore, router};

fn test_app(dir: &tempfile::TempDir) -> Router {
    let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
    let state = AppState::with_store(
        store,
        "test-secret".to_string(),
        "./fonts".to_string(),
        "Roboto".to_string(),
    );
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({"email": "staff@tanchoice.com", "password": "anything"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/suppliers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn full_flow_from_sign_in_to_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let token = sign_in(&app).await;

    // The demo store comes seeded with two suppliers.
    let response = app.clone().oneshot(get("/api/suppliers", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let suppliers = body_json(response).await;
    assert_eq!(suppliers.as_array().unwrap().len(), 2);
    let s1_id = suppliers[1]["id"].as_str().unwrap().to_string(); // Mwanga (Manyara)
    let s2_id = suppliers[0]["id"].as_str().unwrap().to_string(); // Kilimanjaro (Arusha)

    // Create a trip with one line item per supplier.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/trips",
            Some(&token),
            json!({
                "date": "2024-03-05",
                "region": "Manyara",
                "truck_no": "T 456 DEF",
                "form_no": "F-002",
                "driver_name": "Juma",
                "escort_name": "Asha",
                "animals": [
                    {"supplier_id": s1_id, "mark": "M1", "goats_count": 3, "sheep_count": 2},
                    {"supplier_id": s2_id, "goats_count": 1, "sheep_count": 0}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let trip = body_json(response).await;
    let trip_id = trip["id"].as_str().unwrap().to_string();
    assert_eq!(trip["animals"][0]["total_animals"], 5);
    // The blank mark fell back to the supplier default.
    assert_eq!(trip["animals"][1]["mark"], "KG");

    // The list view carries the totals.
    let response = app.clone().oneshot(get("/api/trips", &token)).await.unwrap();
    let trips = body_json(response).await;
    assert_eq!(trips[0]["total_animals"], 6);

    // Cross-supplier report for March.
    let response = app
        .clone()
        .oneshot(get(
            "/api/reports/suppliers?from=2024-03-01&to=2024-03-31",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["rows"].as_array().unwrap().len(), 2);
    assert_eq!(report["totals"], json!({"goats": 4, "sheep": 2, "total": 6}));

    // Filtering on a region the trip is not in yields an empty report.
    let response = app
        .clone()
        .oneshot(get(
            "/api/reports/suppliers?from=2024-03-01&to=2024-03-31&region=Arusha",
            &token,
        ))
        .await
        .unwrap();
    let report = body_json(response).await;
    assert!(report["rows"].as_array().unwrap().is_empty());

    // CSV export of the summary.
    let response = app
        .clone()
        .oneshot(get(
            "/api/reports/suppliers/export.csv?from=2024-03-01&to=2024-03-31",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"supplier-report-2024-03-01-2024-03-31.csv\""
    );
    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Supplier Name,Total Goats,Total Sheep,Total Animals");
    assert!(lines.contains(&"Mwanga Livestock Traders,3,2,5"));
    assert!(lines.contains(&"Kilimanjaro Goats,1,0,1"));

    // Single-supplier detail CSV.
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/reports/suppliers/{s1_id}/export.csv?from=2024-03-01&to=2024-03-31"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csv = body_text(response).await;
    assert!(csv.lines().nth(1).unwrap().starts_with("2024-03-05,Manyara"));

    // Editing the trip replaces its line items wholesale.
    let response = app
        .clone()
        .oneshot({
            let mut request = post_json(
                &format!("/api/trips/{trip_id}"),
                Some(&token),
                json!({
                    "animals": [
                        {"supplier_id": s1_id, "mark": "M1", "goats_count": 0, "sheep_count": 1}
                    ]
                }),
            );
            *request.method_mut() = axum::http::Method::PUT;
            request
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["animals"].as_array().unwrap().len(), 1);
    assert_eq!(updated["animals"][0]["total_animals"], 1);
}

#[tokio::test]
async fn trip_validation_rejects_bad_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let token = sign_in(&app).await;

    // No line items at all.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/trips",
            Some(&token),
            json!({
                "date": "2024-03-05",
                "region": "Manyara",
                "truck_no": "T 456 DEF",
                "form_no": "F-002",
                "driver_name": "Juma",
                "escort_name": "Asha",
                "animals": []
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["animals"].is_array());

    // Negative counts.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/trips",
            Some(&token),
            json!({
                "date": "2024-03-05",
                "region": "Manyara",
                "truck_no": "T 456 DEF",
                "form_no": "F-002",
                "driver_name": "Juma",
                "escort_name": "Asha",
                "animals": [
                    {"supplier_id": uuid::Uuid::new_v4(), "goats_count": -1, "sheep_count": 0}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let token = sign_in(&app).await;

    let missing = uuid::Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(get(&format!("/api/trips/{missing}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/reports/suppliers/{missing}?from=2024-03-01&to=2024-03-31"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
