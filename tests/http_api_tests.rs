#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use semester_grid::{
    Entry, EntryDraft, MeetingDetail, MemoryPlanStore, PlanEditor, SemesterHalf, SemesterPlan,
    SharedPlanStore, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let store: SharedPlanStore = Box::new(MemoryPlanStore::new());
    let editor = PlanEditor::open_or_create(store, || {
        SemesterPlan::for_half(SemesterHalf::First, "2024/2025")
    })
    .unwrap();
    http_api::router(http_api::AppState::new(editor))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn block_lifecycle_via_http_api() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/blocks",
            json!({ "period": 2, "slot": 3, "type": "holiday", "label": "HUT RI" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let block = read_json(response).await;
    assert_eq!(block["id"], 1);
    assert_eq!(block["color"], "#ef4444");

    // Same cell again
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/blocks",
            json!({ "period": 2, "slot": 3, "type": "exam", "label": "PTS" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "conflict");

    // Unknown type
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/blocks",
            json!({ "period": 1, "slot": 1, "type": "vacation", "label": "Libur" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/blocks/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app.oneshot(empty_request("GET", "/plan")).await.unwrap();
    let plan = read_json(response).await;
    assert_eq!(plan["blockedWeeks"], json!([]));
    assert_eq!(plan["semesterHalf"], 1);
}

#[tokio::test]
async fn entry_lifecycle_via_http_api() {
    let app = new_router();
    let draft = EntryDraft::new(
        "Bilangan",
        vec![MeetingDetail::new(1, 1, 3), MeetingDetail::new(2, 2, 2)],
    );

    let response = app
        .clone()
        .oneshot(json_request("POST", "/entries", serde_json::to_value(&draft).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Entry = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.meeting_no(), "P1/P2");

    for slot in 1..=3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/entries/1/plot",
                json!({ "period": 2, "slot": slot }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["outcome"], "added");
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/entries/1"))
        .await
        .unwrap();
    let fetched: Entry = serde_json::from_value(read_json(response).await).unwrap();
    let shares: Vec<u32> = fetched.plot_weeks.iter().map(|p| p.jp).collect();
    assert_eq!(shares, vec![2, 2, 1]);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/entries/1/meetings"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let grown: Entry = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(grown.meeting_no(), "P1/P2/P3");
    assert_eq!(grown.plotted_jp(), 7);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/entries/1/meetings/3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/entries/1/meetings/99"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/entries/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/entries/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_entry_is_rejected() {
    let response = new_router()
        .oneshot(json_request(
            "POST",
            "/entries",
            json!({ "chapter": "", "meetingDetails": [{ "id": 1, "number": 1, "jp": 2 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn plotting_a_blocked_week_is_reported_not_failed() {
    let app = new_router();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/blocks",
            json!({ "period": 1, "slot": 2, "type": "religious", "label": "Maulid" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/entries",
            json!({ "chapter": "Bab 1", "meetingDetails": [{ "id": 1, "number": 1, "jp": 2 }] }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/entries/1/plot", json!({ "period": 1, "slot": 2 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;
    assert_eq!(outcome["outcome"], "rejected");
    assert_eq!(outcome["conflict"]["reason"], "blocked");

    let response = app
        .oneshot(json_request("POST", "/entries/9/plot", json!({ "period": 1, "slot": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn suggestion_and_exports_are_served() {
    let app = new_router();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/entries",
            json!({
                "chapter": "Bab 1",
                "dateRange": { "start": "2024-08-05", "end": "2024-08-09" },
                "meetingDetails": [{ "id": 1, "number": 4, "jp": 2 }]
            }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/suggestions/entry"))
        .await
        .unwrap();
    let draft = read_json(response).await;
    assert_eq!(draft["meetingDetails"][0]["number"], 5);
    assert_eq!(draft["dateRange"]["start"], "2024-08-12");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/export/csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).starts_with("Meeting,Chapter"));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/export/print"))
        .await
        .unwrap();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<table>"));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/export/sheet"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = read_json(response).await;
    assert_eq!(sheet["rows"][0][0], "Meeting");
    assert!(!sheet["merges"].as_array().unwrap().is_empty());

    let response = app.oneshot(empty_request("GET", "/layout")).await.unwrap();
    let layout = read_json(response).await;
    assert_eq!(layout["periods"][1]["name"], "Agustus");
    assert_eq!(layout["rows"][0]["entry"]["meetingNo"], "P4");
}

#[tokio::test]
async fn unknown_block_type_is_a_bad_request() {
    let response = new_router()
        .oneshot(json_request(
            "POST",
            "/blocks",
            json!({ "period": 1, "slot": 1, "type": "tape", "label": "X" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("unknown block type"));
}
