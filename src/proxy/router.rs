// Proxy router - every `/api/...` route, wrapped in rate limiting, request
// tracing and CORS

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::Method,
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{self, LinkRoute, Resource};
use crate::app_state::AppState;
use crate::infrastructure::{rate_limit_middleware, BearerToken};

/// `GET` (+ `POST` when the resource accepts creates) on the collection and
/// `GET`/`PUT`/`DELETE` on `/{id}`.
fn resource_routes(resource: Resource) -> Router<AppState> {
    let mut collection = get(
        move |State(state): State<AppState>, auth: BearerToken, RawQuery(query): RawQuery| {
            handlers::list_handler(state, resource, auth, query)
        },
    );
    if !resource.required_on_create.is_empty() {
        collection = collection.post(move |State(state): State<AppState>, auth: BearerToken, body: Bytes| {
            handlers::create_handler(state, resource, auth, body)
        });
    }

    let record = get(
        move |State(state): State<AppState>, auth: BearerToken, Path(id): Path<String>| {
            handlers::get_record_handler(state, resource, auth, id)
        },
    )
    .delete(
        move |State(state): State<AppState>, auth: BearerToken, Path(id): Path<String>| {
            handlers::delete_record_handler(state, resource, auth, id)
        },
    );

    // Questions are updated through the collection route with `{id, questionDetails}`.
    let (collection, record) = if resource.route == handlers::QUESTIONS.route {
        (collection.put(handlers::update_question_handler), record)
    } else {
        let record = record.put(
            move |State(state): State<AppState>, auth: BearerToken, Path(id): Path<String>, body: Bytes| {
                handlers::update_record_handler(state, resource, auth, id, body)
            },
        );
        (collection, record)
    };

    Router::new()
        .route(&format!("/{}", resource.route), collection)
        .route(&format!("/{}/{{id}}", resource.route), record)
}

fn link_routes(link: LinkRoute) -> Router<AppState> {
    let handler = move |State(state): State<AppState>,
                        method: Method,
                        auth: BearerToken,
                        Path((parent, child)): Path<(String, String)>| {
        handlers::link_handler(state, link, method, auth, parent, child)
    };
    Router::new().route(
        &format!("/{}/{{id}}/{}/{{child_id}}", link.parent, link.child),
        post(handler).delete(handler),
    )
}

pub fn api_routes() -> Router<AppState> {
    let resources = [
        handlers::TOPICS,
        handlers::SUB_TOPICS,
        handlers::QUESTIONS,
        handlers::SUBJECTS,
        handlers::COURSES,
        handlers::COUNTRIES,
        handlers::SCHOOLS,
    ];

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/proxy/{*path}", any(handlers::passthrough_handler));
    for resource in resources {
        router = router.merge(resource_routes(resource));
    }
    router
        .merge(link_routes(handlers::SUBTOPIC_QUESTION))
        .merge(link_routes(handlers::SUBJECT_COURSE))
}

pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
