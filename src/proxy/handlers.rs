// Proxy handlers - validate the minimal required input, attach the caller's
// authorization and forward to the backend. Any backend failure collapses to
// 500 {"error": "<Context> <METHOD>: <message>"}.

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{BackendResponse, BearerToken, ForwardRequest};
use crate::listing::QueryParams;

static PATH_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("path segment pattern is valid"));

pub const PAGE_NUMBER_REQUIRED: &str = "Page Number is required";
pub const PAGE_SIZE_REQUIRED: &str = "Page Size is required";

/// One backend collection exposed under `/api/{route}`.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub route: &'static str,
    /// Error context of collection routes, e.g. `"Topics"`.
    pub plural: &'static str,
    /// Error context of record routes, e.g. `"Topic"`.
    pub singular: &'static str,
    /// Body fields checked on create, with their messages. Empty disables POST.
    pub required_on_create: &'static [(&'static str, &'static str)],
}

pub const TOPICS: Resource = Resource {
    route: "topics",
    plural: "Topics",
    singular: "Topic",
    required_on_create: &[],
};

pub const SUB_TOPICS: Resource = Resource {
    route: "sub-topics",
    plural: "Subtopics",
    singular: "Subtopic",
    required_on_create: &[],
};

pub const QUESTIONS: Resource = Resource {
    route: "questions",
    plural: "Questions",
    singular: "Question",
    required_on_create: &[("title", "Title is required"), ("content", "Content is required")],
};

pub const SUBJECTS: Resource = Resource {
    route: "subjects",
    plural: "Subjects",
    singular: "Subject",
    required_on_create: &[("name", "Name is required")],
};

pub const COURSES: Resource = Resource {
    route: "courses",
    plural: "Courses",
    singular: "Course",
    required_on_create: &[("name", "Name is required")],
};

pub const COUNTRIES: Resource = Resource {
    route: "countries",
    plural: "Countries",
    singular: "Country",
    required_on_create: &[("name", "Name is required")],
};

pub const SCHOOLS: Resource = Resource {
    route: "schools",
    plural: "Schools",
    singular: "School",
    required_on_create: &[("name", "Name is required")],
};

/// Many-to-many link routes `{parent}/{id}/{child}/{id}`.
#[derive(Debug, Clone, Copy)]
pub struct LinkRoute {
    pub parent: &'static str,
    pub child: &'static str,
    pub context: &'static str,
    pub failure: &'static str,
}

pub const SUBTOPIC_QUESTION: LinkRoute = LinkRoute {
    parent: "sub-topics",
    child: "question",
    context: "Link Question",
    failure: "Failed to link question to subtopic",
};

pub const SUBJECT_COURSE: LinkRoute = LinkRoute {
    parent: "subjects",
    child: "course",
    context: "Link subject",
    failure: "Failed to link course to subject",
};

pub(crate) fn valid_segment(raw: &str) -> bool {
    PATH_SEGMENT.is_match(raw)
}

fn segment<'a>(raw: &'a str, what: &str) -> AppResult<&'a str> {
    if valid_segment(raw) {
        Ok(raw)
    } else {
        Err(AppError::BadRequest(format!("Invalid {} id", what)))
    }
}

fn parse_body(body: &Bytes) -> AppResult<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))
}

/// A required body field counts as present when it is neither null, false nor
/// an empty string.
fn has_field(body: &Value, field: &str) -> bool {
    match body.get(field) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn require_fields(body: &Value, fields: &[(&str, &str)]) -> AppResult<()> {
    for (field, message) in fields {
        if !has_field(body, field) {
            return Err(AppError::BadRequest(message.to_string()));
        }
    }
    Ok(())
}

fn require_paging(query: &QueryParams) -> AppResult<()> {
    let present = |key: &str| query.first(key).is_some_and(|v| !v.is_empty());
    if !present("page_number") {
        return Err(AppError::BadRequest(PAGE_NUMBER_REQUIRED.to_string()));
    }
    if !present("page_size") {
        return Err(AppError::BadRequest(PAGE_SIZE_REQUIRED.to_string()));
    }
    Ok(())
}

/// Success body: the backend's JSON, or nothing when it sent nothing.
fn relay(status: StatusCode, response: &BackendResponse) -> AppResult<Response> {
    match response.json_value()? {
        Value::Null => Ok(status.into_response()),
        value => Ok((status, Json(value)).into_response()),
    }
}

/// Forward with errors prefixed `"{context} {METHOD}: "`.
async fn forward(
    state: &AppState,
    request: ForwardRequest,
    context: &str,
    failure: &str,
) -> AppResult<BackendResponse> {
    let context = format!("{} {}", context, request.method);
    forward_as(state, request, &context, failure).await
}

/// Forward with errors prefixed by `context` verbatim.
async fn forward_as(
    state: &AppState,
    request: ForwardRequest,
    context: &str,
    failure: &str,
) -> AppResult<BackendResponse> {
    info!("{} /api/{}", request.method, request.path);
    state
        .backend
        .forward(request, failure)
        .await
        .map_err(|e| e.with_context(context))
}

pub async fn list_handler(
    state: AppState,
    resource: Resource,
    auth: BearerToken,
    raw_query: Option<String>,
) -> AppResult<Response> {
    let query = QueryParams::parse(raw_query.as_deref().unwrap_or_default());
    require_paging(&query)?;

    let request = ForwardRequest::get(resource.route)
        .query(query.pairs().to_vec())
        .authorization(auth.into_header());
    let failure = format!("Failed to fetch {}", resource.route);
    let response = forward(&state, request, resource.plural, &failure).await?;
    relay(StatusCode::OK, &response)
}

pub async fn create_handler(
    state: AppState,
    resource: Resource,
    auth: BearerToken,
    body: Bytes,
) -> AppResult<Response> {
    let body = parse_body(&body)?;
    require_fields(&body, resource.required_on_create)?;

    let request = ForwardRequest::new(Method::POST, resource.route)
        .json(body)
        .authorization(auth.into_header());
    let response = forward(&state, request, resource.plural, "Failed to create").await?;
    relay(StatusCode::CREATED, &response)
}

pub async fn get_record_handler(
    state: AppState,
    resource: Resource,
    auth: BearerToken,
    id: String,
) -> AppResult<Response> {
    let id = segment(&id, &resource.singular.to_lowercase())?;
    let request = ForwardRequest::get(format!("{}/{}", resource.route, id)).authorization(auth.into_header());
    let failure = format!("Failed to fetch {}", resource.singular.to_lowercase());
    let response = forward(&state, request, resource.singular, &failure).await?;
    relay(StatusCode::OK, &response)
}

pub async fn update_record_handler(
    state: AppState,
    resource: Resource,
    auth: BearerToken,
    id: String,
    body: Bytes,
) -> AppResult<Response> {
    let id = segment(&id, &resource.singular.to_lowercase())?;
    let body = parse_body(&body)?;
    let request = ForwardRequest::new(Method::PUT, format!("{}/{}", resource.route, id))
        .json(body)
        .authorization(auth.into_header());
    let failure = format!("Failed to update {}", resource.singular.to_lowercase());
    let response = forward(&state, request, resource.singular, &failure).await?;
    relay(StatusCode::OK, &response)
}

pub async fn delete_record_handler(
    state: AppState,
    resource: Resource,
    auth: BearerToken,
    id: String,
) -> AppResult<Response> {
    let id = segment(&id, &resource.singular.to_lowercase())?;
    let request = ForwardRequest::new(Method::DELETE, format!("{}/{}", resource.route, id))
        .authorization(auth.into_header());
    let failure = format!("Failed to delete {}", resource.singular.to_lowercase());
    forward(&state, request, resource.singular, &failure).await?;
    Ok(StatusCode::OK.into_response())
}

/// `PUT /api/questions` with `{id, questionDetails}`; forwarded as
/// `PUT questions/{id}` carrying the details only.
pub async fn update_question_handler(
    State(state): State<AppState>,
    auth: BearerToken,
    body: Bytes,
) -> AppResult<Response> {
    let body = parse_body(&body)?;
    let id = match body.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(AppError::BadRequest("Question id is required".to_string())),
    };
    let id = segment(&id, "question")?;
    let details = body.get("questionDetails").cloned().unwrap_or(Value::Null);

    let request = ForwardRequest::new(Method::PUT, format!("questions/{}", id))
        .json(details)
        .authorization(auth.into_header());
    let response = forward(&state, request, QUESTIONS.plural, "Failed to update").await?;
    relay(StatusCode::OK, &response)
}

pub async fn link_handler(
    state: AppState,
    link: LinkRoute,
    method: Method,
    auth: BearerToken,
    parent: String,
    child: String,
) -> AppResult<Response> {
    let child = segment(&child, link.child)?;
    let parent = segment(&parent, link.parent.trim_end_matches('s'))?;
    let request = ForwardRequest::new(method, format!("{}/{}/{}/{}", link.parent, parent, link.child, child))
        .authorization(auth.into_header());
    forward_as(&state, request, link.context, link.failure).await?;
    Ok(StatusCode::OK.into_response())
}

/// Catch-all pass-through to `{backend}/{path}`. Unlike the typed routes, a
/// backend error status is relayed as is.
pub async fn passthrough_handler(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(raw_query): RawQuery,
    auth: BearerToken,
    body: Bytes,
) -> AppResult<Response> {
    if path.split('/').any(|part| !valid_segment(part)) {
        return Err(AppError::BadRequest(format!("Invalid proxy path: {}", path)));
    }
    let query = QueryParams::parse(raw_query.as_deref().unwrap_or_default());

    let mut request = ForwardRequest::new(method.clone(), path.clone())
        .query(query.pairs().to_vec())
        .authorization(auth.into_header());
    if matches!(method, Method::POST | Method::PUT | Method::PATCH) && !body.is_empty() {
        request = request.json(parse_body(&body)?);
    }

    info!("Proxying {} /{}", method, path);
    let response = match state.backend.send(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("API proxy error: {}", e);
            return Err(AppError::Upstream("Failed to proxy request to backend".to_string()));
        }
    };

    if !response.is_success() {
        let status = response.status;
        warn!("Backend error: {}", status);
        let body = json!({
            "error": format!("Backend responded with status: {}", status.as_u16()),
            "message": status.canonical_reason().unwrap_or_default(),
        });
        return Ok((status, Json(body)).into_response());
    }

    match response.json_value() {
        Ok(Value::Null) => Ok(StatusCode::OK.into_response()),
        Ok(value) => Ok((StatusCode::OK, Json(value)).into_response()),
        Err(_) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(response.body.clone()))
            .map_err(|e| AppError::Internal(e.to_string()))?),
    }
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_pattern() {
        assert!(valid_segment("abc-123_X"));
        assert!(!valid_segment("../etc"));
        assert!(!valid_segment(""));
        assert!(!valid_segment("a b"));
    }

    #[test]
    fn test_paging_checks_page_number_first() {
        let err = require_paging(&QueryParams::parse("page_size=5")).unwrap_err();
        assert_eq!(err.message(), PAGE_NUMBER_REQUIRED);
        let err = require_paging(&QueryParams::parse("page_number=1")).unwrap_err();
        assert_eq!(err.message(), PAGE_SIZE_REQUIRED);
        assert!(require_paging(&QueryParams::parse("page_number=1&page_size=5")).is_ok());
    }

    #[test]
    fn test_required_fields_in_order() {
        let body = json!({ "content": "What is 2 + 2?" });
        let err = require_fields(&body, QUESTIONS.required_on_create).unwrap_err();
        assert_eq!(err.message(), "Title is required");

        let body = json!({ "title": "Sum", "content": "" });
        let err = require_fields(&body, QUESTIONS.required_on_create).unwrap_err();
        assert_eq!(err.message(), "Content is required");
    }

    #[test]
    fn test_invalid_json_is_bad_request() {
        let err = parse_body(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(&Bytes::new()).unwrap(), Value::Null);
    }
}
