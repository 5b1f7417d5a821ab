use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use barber_cell::router::catalog_routes;
use barber_cell::state::CatalogState;
use barber_cell::store::InMemoryCatalogStore;
use shared_utils::clock::SystemClock;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn app() -> (Router, String) {
    let config = TestConfig::default();
    let state = CatalogState::new(
        config.to_arc(),
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(SystemClock),
    );
    let token = JwtTestUtils::create_test_token(&TestUser::staff("front@barbearia.com"), &config.jwt_secret, None);
    (catalog_routes(state), token)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn staff_routes_require_token() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/admin/barbers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let customer = JwtTestUtils::create_test_token(
        &TestUser::new("cliente@example.com", "authenticated"),
        &TestConfig::default().jwt_secret,
        None,
    );
    let (status, _) = send(&app, Method::GET, "/admin/barbers", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_builds_catalog_and_public_reads_it() {
    let (app, token) = app();

    let (status, barber) = send(
        &app,
        Method::POST,
        "/admin/barbers",
        Some(&token),
        Some(json!({ "name": "Ana", "bio": "Cortes clássicos" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let barber_id = barber["id"].as_str().unwrap().to_string();

    let (status, service) = send(
        &app,
        Method::POST,
        &format!("/admin/barbers/{}/services", barber_id),
        Some(&token),
        Some(json!({ "name": "Corte", "duration_minutes": 30, "price": 50.0, "discount_price": 45.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(service["barber_id"], barber_id.as_str());

    let (status, schedule) = send(
        &app,
        Method::PUT,
        &format!("/admin/barbers/{}/schedule/monday", barber_id),
        Some(&token),
        Some(json!({ "start_time": "09:00", "end_time": "18:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["start_time"], "09:00");
    assert_eq!(schedule["is_active"], true);

    let (status, listing) = send(&app, Method::GET, "/barbers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);

    let (_, services) = send(&app, Method::GET, &format!("/barbers/{}/services", barber_id), None, None).await;
    assert_eq!(services["services"].as_array().unwrap().len(), 1);

    let (_, week) = send(&app, Method::GET, &format!("/barbers/{}/schedule", barber_id), None, None).await;
    assert_eq!(week["schedule"][0]["day_of_week"], "monday");
}

#[tokio::test]
async fn validation_and_not_found_map_to_status_codes() {
    let (app, token) = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/services",
        Some(&token),
        Some(json!({ "name": "Corte", "duration_minutes": 30, "price": 40.0, "discount_price": 40.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, &format!("/barbers/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/admin/barbers/{}/schedule/funday", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "start_time": "09:00", "end_time": "18:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivated_barber_disappears_from_public_routes() {
    let (app, token) = app();

    let (_, barber) = send(&app, Method::POST, "/admin/barbers", Some(&token), Some(json!({ "name": "Bruno" }))).await;
    let barber_id = barber["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/admin/barbers/{}", barber_id),
        Some(&token),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);

    let (status, _) = send(&app, Method::GET, &format!("/barbers/{}", barber_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = send(&app, Method::GET, "/admin/barbers", Some(&token), None).await;
    assert_eq!(all["total"], 1);
}

#[tokio::test]
async fn global_service_delete_returns_no_content() {
    let (app, token) = app();

    let (_, service) = send(
        &app,
        Method::POST,
        "/admin/services",
        Some(&token),
        Some(json!({ "name": "Sobrancelha", "duration_minutes": 15, "price": 20.0 })),
    )
    .await;
    let service_id = service["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::DELETE, &format!("/admin/services/{}", service_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, services) = send(&app, Method::GET, "/services", None, None).await;
    assert!(services["services"].as_array().unwrap().is_empty());
}
