// Proxy routes against an in-process fake backend

use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use curriculum_console::{app_state::AppState, config::Config, proxy::create_api_router};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    authorization: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn fake_backend(State(log): State<Log>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        uri: uri.to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    match (method.as_str(), uri.path()) {
        ("GET", "/api/v1/topics") => Json(json!({
            "data": [{ "id": "1", "name": "Linear Equations", "courseId": "1" }],
            "pagination": { "totalItems": 1, "totalPages": 1, "currentPage": 1 }
        }))
        .into_response(),
        ("GET", "/api/v1/subjects") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("POST", "/api/v1/questions") => (StatusCode::CREATED, Json(json!({ "id": "q1" }))).into_response(),
        ("PUT", "/api/v1/questions/q1") => Json(body).into_response(),
        (_, "/api/v1/sub-topics/3/question/q1") => StatusCode::NO_CONTENT.into_response(),
        (_, "/api/v1/sub-topics/9/question/q1") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("DELETE", "/api/v1/countries/2") => StatusCode::NO_CONTENT.into_response(),
        ("GET", "/api/v1/reports/summary") => Json(json!({ "questions": 2 })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_backend() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(fake_backend).with_state(log.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/v1/", addr), log)
}

async fn proxy() -> (Router, Log) {
    let (base_url, log) = spawn_backend().await;
    let config = Config::for_backend(&base_url).unwrap();
    (create_api_router(AppState::new(config)), log)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_list_requires_paging_params() {
    let (app, log) = proxy().await;

    let (status, body) = read(app.clone().oneshot(request(Method::GET, "/api/topics", None)).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Page Number is required");

    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/topics?page_number=1", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Page Size is required");
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_forwards_bearer_and_query() {
    let (app, log) = proxy().await;

    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/topics?page_number=1&page_size=10&name=", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Linear Equations");

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].uri, "/api/v1/topics?page_number=1&page_size=10");
    assert_eq!(log[0].authorization.as_deref(), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_backend_failure_collapses_to_500_with_context() {
    let (app, _log) = proxy().await;

    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/subjects?page_number=1&page_size=10", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Subjects GET: Failed to fetch subjects");
}

#[tokio::test]
async fn test_unreachable_backend_is_500() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::for_backend(&format!("http://{}/api/v1/", addr)).unwrap();
    let app = create_api_router(AppState::new(config));
    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/topics?page_number=1&page_size=10", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Topics GET: "));
}

#[tokio::test]
async fn test_question_create_validates_then_forwards() {
    let (app, log) = proxy().await;

    let (status, body) = read(
        app.clone()
            .oneshot(request(Method::POST, "/api/questions", Some(json!({ "content": "2 + 2?" }))))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, body) = read(
        app.oneshot(request(
            Method::POST,
            "/api/questions",
            Some(json!({ "title": "Sum", "content": "2 + 2?" })),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "q1");
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_question_update_unwraps_details() {
    let (app, log) = proxy().await;

    let (status, body) = read(
        app.oneshot(request(
            Method::PUT,
            "/api/questions",
            Some(json!({ "id": "q1", "questionDetails": { "title": "Renamed" } })),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, Method::PUT);
    assert_eq!(log[0].uri, "/api/v1/questions/q1");
    assert_eq!(log[0].body, json!({ "title": "Renamed" }));
}

#[tokio::test]
async fn test_link_and_unlink_return_empty_200() {
    let (app, log) = proxy().await;

    for method in [Method::POST, Method::DELETE] {
        let response = app
            .clone()
            .oneshot(request(method, "/api/sub-topics/3/question/q1", None))
            .await
            .unwrap();
        let (status, body) = read(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].method, Method::DELETE);
    assert_eq!(log[1].uri, "/api/v1/sub-topics/3/question/q1");
}

#[tokio::test]
async fn test_failed_link_reports_link_context_without_method() {
    let (app, log) = proxy().await;

    for method in [Method::POST, Method::DELETE] {
        let (status, body) = read(
            app.clone()
                .oneshot(request(method, "/api/sub-topics/9/question/q1", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Link Question: Failed to link question to subtopic");
    }
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_record_delete_and_bad_segment() {
    let (app, log) = proxy().await;

    let (status, _) = read(
        app.clone()
            .oneshot(request(Method::DELETE, "/api/countries/2", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/countries/a.b", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid country id");
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generic_proxy_relays_backend_status() {
    let (app, _log) = proxy().await;

    let (status, body) = read(
        app.clone()
            .oneshot(request(Method::GET, "/api/proxy/reports/summary", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"], 2);

    let (status, body) = read(
        app.oneshot(request(Method::GET, "/api/proxy/reports/missing", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Backend responded with status: 404");
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let (base_url, _log) = spawn_backend().await;
    let mut config = Config::for_backend(&base_url).unwrap();
    config.rate_limit.requests_per_minute = Some(1);
    let app = create_api_router(AppState::new(config));

    let (status, _) = read(app.clone().oneshot(request(Method::GET, "/api/health", None)).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = read(app.oneshot(request(Method::GET, "/api/health", None)).await.unwrap()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests, please try again later.");
}
