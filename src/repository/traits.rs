use async_trait::async_trait;

use crate::core::RecordId;
use crate::error::AppResult;
use crate::listing::{ListQuery, PageSlice};
use crate::models::Entity;

/// One page request: the list state plus the page size.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub query: ListQuery,
    pub page_size: usize,
}

impl ListRequest {
    pub fn new(query: ListQuery, page_size: usize) -> Self {
        Self {
            query,
            page_size: page_size.max(1),
        }
    }

    /// Backend query parameters for `T`'s list route.
    pub fn to_params<T: Entity>(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page_number".to_string(), self.query.current_page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if !self.query.search_query.trim().is_empty() {
            params.push((T::SEARCH_PARAM.to_string(), self.query.search_query.trim().to_string()));
        }
        if !self.query.sort_column.is_empty() {
            params.push(("sort_column".to_string(), self.query.sort_column.clone()));
            params.push((
                "sort_direction".to_string(),
                self.query.sort_direction.as_str().to_string(),
            ));
        }
        for (key, values) in self.query.active_filters() {
            let param = T::filter_param(key).unwrap_or(key);
            params.push((param.to_string(), values.join(",")));
        }
        params
    }
}

/// CRUD over one entity collection.
#[async_trait]
pub trait EntityRepository<T: Entity>: Send + Sync {
    async fn list(&self, request: &ListRequest) -> AppResult<PageSlice<T>>;
    async fn get(&self, id: &RecordId) -> AppResult<T>;
    async fn create(&self, record: T) -> AppResult<T>;
    async fn update(&self, record: T) -> AppResult<T>;
    async fn delete(&self, id: &RecordId) -> AppResult<()>;
}

/// Many-to-many links, e.g. subtopic ↔ question.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn link(&self, parent: &RecordId, child: &RecordId) -> AppResult<()>;
    async fn unlink(&self, parent: &RecordId, child: &RecordId) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortDirection;
    use crate::models::{Question, Subtopic};

    #[test]
    fn test_params_map_filters_to_backend_names() {
        let mut query = ListQuery::new("name").sorted(SortDirection::Desc);
        query.set_search(" limits ");
        query.set_filter("topic", vec!["7".to_string()]);
        let params = ListRequest::new(query, 10).to_params::<Subtopic>();

        assert!(params.contains(&("page_number".to_string(), "1".to_string())));
        assert!(params.contains(&("page_size".to_string(), "10".to_string())));
        assert!(params.contains(&("name".to_string(), "limits".to_string())));
        assert!(params.contains(&("topic_id".to_string(), "7".to_string())));
        assert!(params.contains(&("sort_direction".to_string(), "desc".to_string())));
    }

    #[test]
    fn test_question_search_uses_title() {
        let mut query = ListQuery::new("title");
        query.set_search("capital");
        query.set_filter("subtopic", vec!["3".to_string(), "4".to_string()]);
        let params = ListRequest::new(query, 5).to_params::<Question>();
        assert!(params.contains(&("title".to_string(), "capital".to_string())));
        assert!(params.contains(&("sub_topic_id".to_string(), "3,4".to_string())));
    }
}
