use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::post,
};
use jmd_backoffice_api::{
    dto::{bills::GenerateBillRequest, orders::UpdateStatusRequest},
    error::AppResult,
    extract::ApiJson,
};
use serde_json::Value;
use tower::ServiceExt;

async fn set_status(ApiJson(body): ApiJson<UpdateStatusRequest>) -> AppResult<Json<Value>> {
    Ok(Json(serde_json::json!({ "status": body.status })))
}

async fn bill(payload: Option<ApiJson<GenerateBillRequest>>) -> AppResult<Json<Value>> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    Ok(Json(serde_json::json!({ "notes": payload.notes })))
}

fn app() -> Router {
    Router::new()
        .route("/status", post(set_status))
        .route("/bill", post(bill))
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_enum_value_is_a_validation_error() {
    let response = app()
        .oneshot(json_post("/status", r#"{"status":"bogus"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["data"]["code"], "validation_error");
    assert!(
        body["data"]["error"]
            .as_str()
            .unwrap()
            .contains("unknown variant")
    );
}

#[tokio::test]
async fn malformed_json_uses_the_error_envelope() {
    let response = app()
        .oneshot(json_post("/status", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["data"]["code"], "validation_error");
}

#[tokio::test]
async fn well_formed_body_reaches_the_handler() {
    let response = app()
        .oneshot(json_post("/status", r#"{"status":"in_progress"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "in_progress");
}

#[tokio::test]
async fn optional_body_may_be_omitted_but_not_broken() {
    let empty = Request::post("/bill").body(Body::empty()).unwrap();
    let response = app().oneshot(empty).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["notes"], Value::Null);

    let response = app()
        .oneshot(json_post("/bill", r#"{"due_date":"soon"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
