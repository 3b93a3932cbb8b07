// In-memory repositories - client-authoritative filtering over a seeded set

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::traits::{EntityRepository, LinkRepository, ListRequest};
use crate::core::{RecordId, Timestamp};
use crate::error::{AppError, AppResult};
use crate::listing::{list_page, ListSpec, PageSlice};
use crate::models::Entity;

#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    records: Arc<RwLock<Vec<T>>>,
    spec: ListSpec,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            spec: ListSpec::default(),
        }
    }

    /// Lookup columns used when sorting; the page size always comes from the request.
    pub fn with_spec(mut self, spec: ListSpec) -> Self {
        self.spec = spec;
        self
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for InMemoryRepository<T> {
    #[instrument(skip(self, request), fields(resource = T::RESOURCE))]
    async fn list(&self, request: &ListRequest) -> AppResult<PageSlice<T>> {
        let spec = ListSpec {
            page_size: request.page_size.max(1),
            ..self.spec.clone()
        };
        let records = self.records.read().await;
        Ok(list_page(&records, &request.query, &spec))
    }

    async fn get(&self, id: &RecordId) -> AppResult<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }

    #[instrument(skip(self, record), fields(resource = T::RESOURCE))]
    async fn create(&self, mut record: T) -> AppResult<T> {
        record.validate()?;
        if record.id().is_empty() {
            record.set_id(RecordId::generate());
        }
        if record.created_at().is_none() {
            record.set_created_at(Timestamp::now());
        }

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(AppError::Validation(format!("{} {} already exists", T::LABEL, record.id())));
        }
        records.push(record.clone());
        debug!("Created {} {}", T::LABEL, record.id());
        Ok(record)
    }

    #[instrument(skip(self, record), fields(resource = T::RESOURCE))]
    async fn update(&self, mut record: T) -> AppResult<T> {
        record.validate()?;
        let mut records = self.records.write().await;
        let existing = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::LABEL, record.id())))?;
        if record.created_at().is_none() {
            if let Some(at) = existing.created_at() {
                record.set_created_at(at);
            }
        }
        *existing = record.clone();
        Ok(record)
    }

    #[instrument(skip(self), fields(resource = T::RESOURCE))]
    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("{} {} not found", T::LABEL, id)));
        }
        debug!("Deleted {} {}", T::LABEL, id);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLinks {
    links: Arc<RwLock<BTreeSet<(RecordId, RecordId)>>>,
}

impl InMemoryLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, parent: &RecordId, child: &RecordId) -> bool {
        self.links
            .read()
            .await
            .contains(&(parent.clone(), child.clone()))
    }

    pub async fn children_of(&self, parent: &RecordId) -> Vec<RecordId> {
        self.links
            .read()
            .await
            .iter()
            .filter(|(p, _)| p == parent)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub async fn parents_of(&self, child: &RecordId) -> Vec<RecordId> {
        self.links
            .read()
            .await
            .iter()
            .filter(|(_, c)| c == child)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn link(&self, parent: &RecordId, child: &RecordId) -> AppResult<()> {
        self.links.write().await.insert((parent.clone(), child.clone()));
        Ok(())
    }

    async fn unlink(&self, parent: &RecordId, child: &RecordId) -> AppResult<()> {
        if !self.links.write().await.remove(&(parent.clone(), child.clone())) {
            return Err(AppError::NotFound(format!("No link between {} and {}", parent, child)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ListQuery, SortDirection};
    use crate::models::Country;

    fn countries() -> InMemoryRepository<Country> {
        InMemoryRepository::new(vec![
            Country { id: RecordId::new("1"), name: "United States".into(), created_at: Timestamp::parse("2025-01-15") },
            Country { id: RecordId::new("2"), name: "Canada".into(), created_at: Timestamp::parse("2025-01-16") },
            Country { id: RecordId::new("3"), name: "United Kingdom".into(), created_at: Timestamp::parse("2025-01-17") },
        ])
    }

    #[tokio::test]
    async fn test_list_sorts_and_pages() {
        let repo = countries();
        let query = ListQuery::new("name").sorted(SortDirection::Desc);
        let page = repo.list(&ListRequest::new(query, 2)).await.unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(
            page.items.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["United States", "United Kingdom"]
        );
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let repo = countries();
        let created = repo.create(Country::new("Peru")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.created_at.is_some());
        assert_eq!(repo.len().await, 4);
        assert!(repo.create(Country::new("")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_keeps_creation_time() {
        let repo = countries();
        let mut edited = Country::new("Canada (edited)");
        edited.id = RecordId::new("2");
        let saved = repo.update(edited).await.unwrap();
        assert_eq!(saved.created_at, Timestamp::parse("2025-01-16"));
        assert_eq!(repo.get(&RecordId::new("2")).await.unwrap().name, "Canada (edited)");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = countries();
        repo.delete(&RecordId::new("1")).await.unwrap();
        let err = repo.delete(&RecordId::new("1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_links() {
        let links = InMemoryLinks::new();
        let (s, q) = (RecordId::new("3"), RecordId::new("q1"));
        links.link(&s, &q).await.unwrap();
        assert!(links.contains(&s, &q).await);
        assert_eq!(links.parents_of(&q).await, vec![s.clone()]);
        links.unlink(&s, &q).await.unwrap();
        assert!(links.unlink(&s, &q).await.is_err());
    }
}
