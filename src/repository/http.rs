// Backend-authoritative repositories. Search, sort and paging are delegated to
// the backend through list query parameters.

use std::marker::PhantomData;

use async_trait::async_trait;
use axum::http::Method;
use serde_json::Value;
use tracing::{info, instrument};

use super::traits::{EntityRepository, LinkRepository, ListRequest};
use crate::core::RecordId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{BackendClient, BackendResponse, ForwardRequest};
use crate::listing::PageSlice;
use crate::models::{Entity, ListResponse};
use crate::proxy::handlers::valid_segment;
use crate::session::Session;

pub struct HttpRepository<T> {
    client: BackendClient,
    session: Session,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> HttpRepository<T> {
    pub fn new(client: BackendClient, session: Session) -> Self {
        Self {
            client,
            session,
            _entity: PhantomData,
        }
    }

    fn request(&self, method: Method, path: String) -> ForwardRequest {
        ForwardRequest::new(method, path).authorization(Some(self.session.bearer()))
    }

    fn record_path(id: &RecordId) -> AppResult<String> {
        if id.is_empty() {
            return Err(AppError::Validation(format!("{} id is required", T::LABEL)));
        }
        if !valid_segment(id.as_str()) {
            return Err(AppError::Validation(format!("Invalid {} id", T::LABEL.to_lowercase())));
        }
        Ok(format!("{}/{}", T::RESOURCE, id))
    }
}

/// Single-record bodies come either bare or wrapped in `{"data": ...}`.
fn record_from<T: Entity>(response: &BackendResponse, fallback: Option<T>) -> AppResult<T> {
    let value = match response.json_value()? {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    match (value, fallback) {
        (Value::Null, Some(record)) => Ok(record),
        (Value::Null, None) => Err(AppError::Upstream(format!("Empty {} response", T::LABEL))),
        (value, _) => Ok(serde_json::from_value(value)?),
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for HttpRepository<T> {
    #[instrument(skip(self, request), fields(resource = T::RESOURCE))]
    async fn list(&self, request: &ListRequest) -> AppResult<PageSlice<T>> {
        let call = self
            .request(Method::GET, T::RESOURCE.to_string())
            .query(request.to_params::<T>());
        let response = self
            .client
            .forward(call, &format!("Failed to fetch {}", T::RESOURCE))
            .await?;
        let envelope: ListResponse<T> = response.json()?;
        Ok(envelope.into_page(request.query.current_page, request.page_size))
    }

    async fn get(&self, id: &RecordId) -> AppResult<T> {
        let call = self.request(Method::GET, Self::record_path(id)?);
        let response = self
            .client
            .forward(call, &format!("Failed to fetch {}", T::LABEL))
            .await?;
        record_from(&response, None)
    }

    #[instrument(skip(self, record), fields(resource = T::RESOURCE))]
    async fn create(&self, record: T) -> AppResult<T> {
        record.validate()?;
        let call = self
            .request(Method::POST, T::RESOURCE.to_string())
            .json(serde_json::to_value(&record)?);
        let response = self
            .client
            .forward(call, &format!("Failed to create {}", T::LABEL))
            .await?;
        info!("Created {}", T::LABEL);
        record_from(&response, Some(record))
    }

    #[instrument(skip(self, record), fields(resource = T::RESOURCE))]
    async fn update(&self, record: T) -> AppResult<T> {
        record.validate()?;
        Self::record_path(record.id())?;
        let (path, body) = record.update_request()?;
        let call = self.request(Method::PUT, path).json(body);
        let response = self
            .client
            .forward(call, &format!("Failed to update {}", T::LABEL))
            .await?;
        record_from(&response, Some(record))
    }

    #[instrument(skip(self), fields(resource = T::RESOURCE))]
    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        let call = self.request(Method::DELETE, Self::record_path(id)?);
        self.client
            .forward(call, &format!("Failed to delete {}", T::LABEL))
            .await?;
        info!("Deleted {} {}", T::LABEL, id);
        Ok(())
    }
}

/// Link routes shaped `{parent}/{parent_id}/{child}/{child_id}`.
pub struct HttpLinks {
    client: BackendClient,
    session: Session,
    parent: &'static str,
    child: &'static str,
}

impl HttpLinks {
    pub fn new(client: BackendClient, session: Session, parent: &'static str, child: &'static str) -> Self {
        Self {
            client,
            session,
            parent,
            child,
        }
    }

    /// `sub-topics/{id}/question/{id}`
    pub fn subtopic_questions(client: BackendClient, session: Session) -> Self {
        Self::new(client, session, "sub-topics", "question")
    }

    /// `subjects/{id}/course/{id}`
    pub fn subject_courses(client: BackendClient, session: Session) -> Self {
        Self::new(client, session, "subjects", "course")
    }

    pub fn path(&self, parent: &RecordId, child: &RecordId) -> AppResult<String> {
        if parent.is_empty() || child.is_empty() {
            return Err(AppError::Validation("Both ids are required to link records".to_string()));
        }
        if !valid_segment(parent.as_str()) || !valid_segment(child.as_str()) {
            return Err(AppError::Validation(format!("Invalid {} link id", self.child)));
        }
        Ok(format!("{}/{}/{}/{}", self.parent, parent, self.child, child))
    }

    async fn call(&self, method: Method, parent: &RecordId, child: &RecordId, failure: &str) -> AppResult<()> {
        let request =
            ForwardRequest::new(method, self.path(parent, child)?).authorization(Some(self.session.bearer()));
        self.client.forward(request, failure).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for HttpLinks {
    async fn link(&self, parent: &RecordId, child: &RecordId) -> AppResult<()> {
        self.call(Method::POST, parent, child, &format!("Failed to link {}", self.child))
            .await
    }

    async fn unlink(&self, parent: &RecordId, child: &RecordId) -> AppResult<()> {
        self.call(Method::DELETE, parent, child, &format!("Failed to unlink {}", self.child))
            .await
    }
}
