use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use organize_server::domain::{
    Employee, Establishment, OfferedService, User, Webhook, WebhookEvent,
};
use organize_server::repository::{InMemoryStore, Repositories};
use organize_server::service::AppointmentService;
use organize_server::workers::RecordingDispatcher;
use organize_server::{App, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    dispatcher: RecordingDispatcher,
    client_id: Uuid,
    owner_id: Uuid,
    establishment_id: Uuid,
    employee_id: Uuid,
    service_id: Uuid,
}

async fn setup() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let dispatcher = RecordingDispatcher::new();

    let client = User {
        id: Uuid::new_v4(),
        name: "Ana Souza".into(),
        email: "ana@example.com".into(),
        created_at: Utc::now(),
    };
    let owner = User {
        id: Uuid::new_v4(),
        name: "Bruno Lima".into(),
        email: "bruno@example.com".into(),
        created_at: Utc::now(),
    };
    let establishment = Establishment {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name: "Barbearia Central".into(),
        created_at: Utc::now(),
    };
    let employee = Employee {
        id: Uuid::new_v4(),
        establishment_id: establishment.id,
        name: "Carla".into(),
        created_at: Utc::now(),
    };
    let service = OfferedService {
        id: Uuid::new_v4(),
        establishment_id: establishment.id,
        name: "Beard trim".into(),
        price_cents: 5000,
        created_at: Utc::now(),
    };

    let app = TestApp {
        router: Router::new(),
        store: store.clone(),
        dispatcher: dispatcher.clone(),
        client_id: client.id,
        owner_id: owner.id,
        establishment_id: establishment.id,
        employee_id: employee.id,
        service_id: service.id,
    };

    store.insert_user(client).await;
    store.insert_user(owner).await;
    store.insert_establishment(establishment).await;
    store.insert_employee(employee).await;
    store.insert_service(service).await;

    let state = AppState {
        appointments: AppointmentService::new(
            Repositories::from_store(store),
            Arc::new(dispatcher),
        ),
        db: None,
    };

    TestApp {
        router: App::with_state(state).router(),
        ..app
    }
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    user_id: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.to_string());
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let res = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn booking(app: &TestApp, start: &str, end: &str) -> Value {
    json!({
        "service_id": app.service_id,
        "establishment_id": app.establishment_id,
        "employee_id": app.employee_id,
        "start_time": start,
        "end_time": end,
        "client_notes": "first visit"
    })
}

async fn book(app: &TestApp, start: &str, end: &str) -> Value {
    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        Some(app.client_id),
        Some(booking(app, start, end)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

// =============================================================================
// CREATION
// =============================================================================

#[tokio::test]
async fn test_create_appointment() {
    let app = setup().await;
    app.store
        .insert_webhook(Webhook::new(
            app.owner_id,
            WebhookEvent::AppointmentCreated,
            "https://hooks.example.com/created",
        ))
        .await;

    let body = book(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z").await;

    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["client_id"], json!(app.client_id));
    assert_eq!(body["client_notes"], "first visit");

    let calls = app.dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].webhooks.len(), 1);
    assert_eq!(calls[0].payload["appointmentId"], body["id"]);
    assert_eq!(calls[0].payload["clientName"], "Ana Souza");
}

#[tokio::test]
async fn test_create_with_explicit_status() {
    let app = setup().await;
    let mut req = booking(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z");
    req["status"] = json!("CONFIRMED");

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        Some(app.client_id),
        Some(req),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "CONFIRMED");
}

#[tokio::test]
async fn test_create_conflicting_appointment() {
    let app = setup().await;
    book(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z").await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        Some(app.client_id),
        Some(booking(&app, "2026-03-02T09:30:00Z", "2026-03-02T10:30:00Z")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "employee_unavailable");
    assert_eq!(body["error"]["details"]["employee_id"], json!(app.employee_id));
    assert_eq!(app.store.appointments().await.len(), 1);
}

#[tokio::test]
async fn test_create_with_unknown_employee() {
    let app = setup().await;
    let mut req = booking(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z");
    req["employee_id"] = json!(Uuid::new_v4());

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        Some(app.client_id),
        Some(req),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "employee_not_found");
    assert!(app.store.appointments().await.is_empty());
}

#[tokio::test]
async fn test_create_for_unknown_user() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        Some(Uuid::new_v4()),
        Some(booking(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "user_not_found");
}

#[tokio::test]
async fn test_requests_without_identity_are_rejected() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/appointments",
        None,
        Some(booking(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");
    assert!(app.store.appointments().await.is_empty());
}

// =============================================================================
// STATUS UPDATES
// =============================================================================

#[tokio::test]
async fn test_complete_appointment_records_transaction() {
    let app = setup().await;
    let created = book(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        "PATCH",
        &format!("/v1/appointments/{id}/status"),
        Some(app.owner_id),
        Some(json!({ "status": "completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    let transactions = app.store.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount_cents, 5000);
    assert_eq!(transactions[0].description, "Beard trim");
}

#[tokio::test]
async fn test_invalid_status_is_rejected() {
    let app = setup().await;
    let created = book(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        "PATCH",
        &format!("/v1/appointments/{id}/status"),
        Some(app.owner_id),
        Some(json!({ "status": "archived" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_status");
    assert_eq!(app.store.appointments().await[0].status.as_str(), "PENDING");
}

#[tokio::test]
async fn test_update_unknown_appointment() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        "PATCH",
        &format!("/v1/appointments/{}/status", Uuid::new_v4()),
        Some(app.owner_id),
        Some(json!({ "status": "CONFIRMED" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "appointment_not_found");
}

// =============================================================================
// QUERIES
// =============================================================================

#[tokio::test]
async fn test_list_client_and_establishment_appointments() {
    let app = setup().await;
    book(&app, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z").await;
    book(&app, "2026-03-03T09:00:00Z", "2026-03-03T10:00:00Z").await;

    let range = "start=2026-03-02T00:00:00Z&end=2026-03-03T00:00:00Z";

    let (status, mine) = send(
        &app.router,
        "GET",
        &format!("/v1/appointments?{range}"),
        Some(app.client_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, schedule) = send(
        &app.router,
        "GET",
        &format!("/v1/establishment/appointments?{range}"),
        Some(app.owner_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule, mine);
}

#[tokio::test]
async fn test_schedule_for_user_without_establishment() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        "GET",
        "/v1/establishment/appointments?start=2026-03-02T00:00:00Z&end=2026-03-03T00:00:00Z",
        Some(app.client_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "establishment_not_found");
}

// =============================================================================
// PROBES
// =============================================================================

#[tokio::test]
async fn test_health_and_fallback() {
    let app = setup().await;

    let (status, body) = send(&app.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app.router, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = send(&app.router, "GET", "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}
