// Entity records of the curriculum hierarchy and the backend list envelope

pub mod curriculum;
pub mod geography;
pub mod page;
pub mod question;

pub use curriculum::{Course, Subject, Subtopic, Topic};
pub use geography::{Country, School};
pub use page::{ListResponse, PageInfo};
pub use question::{Question, QuestionOption, QuestionType, SubtopicRef};

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::core::{RecordId, Timestamp};
use crate::error::{AppError, AppResult};
use crate::listing::Listable;

/// A record managed by one admin list page and one backend resource.
pub trait Entity:
    Listable + Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Backend collection, e.g. `"sub-topics"`.
    const RESOURCE: &'static str;
    /// Human readable singular, used in notices.
    const LABEL: &'static str;
    /// Backend query parameter carrying the free-text search.
    const SEARCH_PARAM: &'static str = "name";

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn created_at(&self) -> Option<Timestamp>;
    fn set_created_at(&mut self, at: Timestamp);

    /// Required-field checks run before anything is sent.
    fn validate(&self) -> AppResult<()>;

    /// Backend query parameter for a list filter key. `None` keeps the key.
    fn filter_param(_key: &str) -> Option<&'static str> {
        None
    }

    /// Path and body of an update call, relative to the API root.
    fn update_request(&self) -> AppResult<(String, serde_json::Value)> {
        Ok((
            format!("{}/{}", Self::RESOURCE, self.id()),
            serde_json::to_value(self)?,
        ))
    }
}

pub(crate) fn require(value: &str, message: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

pub(crate) fn require_id(id: &RecordId, message: &str) -> AppResult<()> {
    if id.is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}
