// End-to-end list page and question authoring flows over the demo store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use curriculum_console::config::ListingConfig;
use curriculum_console::console::{DataManagementLayout, ListPage};
use curriculum_console::core::RecordId;
use curriculum_console::data_seeder::{self, seed_demo_store};
use curriculum_console::error::AppResult;
use curriculum_console::listing::{ChoiceOption, Column, DataTable, ListQuery, PageSlice, QueryParams};
use curriculum_console::models::{Country, Entity, Question, QuestionType, Subtopic};
use curriculum_console::question::{QuestionAuthoring, QuestionDraft};
use curriculum_console::repository::{EntityRepository, InMemoryLinks, InMemoryRepository, ListRequest};

/// Counts mutating calls before delegating to an in-memory store.
struct CountingRepository<T: Entity> {
    inner: InMemoryRepository<T>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
}

impl<T: Entity> CountingRepository<T> {
    fn new(records: Vec<T>) -> Self {
        Self {
            inner: InMemoryRepository::new(records),
            creates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for CountingRepository<T> {
    async fn list(&self, request: &ListRequest) -> AppResult<PageSlice<T>> {
        self.inner.list(request).await
    }

    async fn get(&self, id: &RecordId) -> AppResult<T> {
        self.inner.get(id).await
    }

    async fn create(&self, record: T) -> AppResult<T> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(record).await
    }

    async fn update(&self, record: T) -> AppResult<T> {
        self.inner.update(record).await
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }
}

fn countries_page(repo: Arc<dyn EntityRepository<Country>>) -> ListPage<Country> {
    let table = DataTable::new(
        vec![Column::new("name", "Name", |c: &Country| c.name.clone()).sortable()],
        |c: &Country| c.id.to_string(),
    );
    let layout = DataManagementLayout::new("Countries", "Manage countries", Duration::from_millis(500))
        .with_add_new("Add Country")
        .with_sort_options(
            vec![
                ChoiceOption::new("Name (A-Z)", "name_asc"),
                ChoiceOption::new("Name (Z-A)", "name_desc"),
            ],
            None,
        );
    ListPage::new(repo, table, layout, ListQuery::new("name"), &ListingConfig::default())
}

fn subtopics_page(repo: Arc<dyn EntityRepository<Subtopic>>) -> ListPage<Subtopic> {
    let table = DataTable::new(
        vec![Column::new("name", "Name", |s: &Subtopic| s.name.clone()).sortable()],
        |s: &Subtopic| s.id.to_string(),
    );
    let layout = DataManagementLayout::new("Subtopics", "Manage subtopics", Duration::from_millis(500));
    ListPage::new(repo, table, layout, ListQuery::new("name"), &ListingConfig::default())
}

#[tokio::test]
async fn test_countries_sort_dropdown_rewrites_url() {
    let store = seed_demo_store(10).await.unwrap();
    let mut page = countries_page(store.countries.clone());
    page.open("/admin/countries", &QueryParams::parse("sort=name_asc")).await;

    let names: Vec<&str> = page.rows().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Australia", "Canada", "Germany", "United Kingdom", "United States"]
    );

    let nav = page.select_sort_option("name_desc").await.unwrap().unwrap();
    assert_eq!(nav.query.first("sortColumn"), Some("name"));
    assert_eq!(nav.query.first("sortDirection"), Some("desc"));
    assert!(!nav.query.contains("sort"));

    let names: Vec<&str> = page.rows().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["United States", "United Kingdom", "Germany", "Canada", "Australia"]
    );
}

#[tokio::test]
async fn test_subtopic_deleted_only_after_confirm() {
    let repo = Arc::new(CountingRepository::new(data_seeder::subtopics()));
    let mut page = subtopics_page(repo.clone());
    page.open("/admin/topics/subtopics", &QueryParams::new()).await;

    assert!(page.request_delete(RecordId::new("3")));
    assert!(page.delete_dialog().is_open());
    assert_eq!(repo.deletes.load(Ordering::SeqCst), 0);

    assert!(page.dismiss_delete());
    assert!(!page.delete_dialog().is_open());
    assert_eq!(repo.deletes.load(Ordering::SeqCst), 0);

    assert!(page.request_delete(RecordId::new("3")));
    assert!(page.confirm_delete().await);
    assert_eq!(repo.deletes.load(Ordering::SeqCst), 1);
    assert!(page.rows().iter().all(|s| s.id.as_str() != "3"));
    assert_eq!(
        page.notices().last().and_then(|n| n.description.as_deref()),
        Some("Subtopic deleted successfully")
    );
}

fn draft() -> QuestionDraft {
    let mut draft = QuestionDraft::new();
    draft.title = "Largest planet".to_string();
    draft.content = "Which planet is the largest?".to_string();
    draft.add_subtopic(RecordId::new("3"));
    for (id, text) in [("1", "Jupiter"), ("2", "Mars"), ("3", "Venus"), ("4", "Earth")] {
        draft.set_option_content(id, text);
    }
    draft
}

#[tokio::test]
async fn test_multiple_choice_without_correct_option_is_blocked() {
    let questions = Arc::new(CountingRepository::<Question>::new(Vec::new()));
    let authoring = QuestionAuthoring::new(questions.clone(), Arc::new(InMemoryLinks::new()));

    let outcome = authoring.create(&draft()).await;
    assert!(outcome.question.is_none());
    assert_eq!(outcome.notice.title, "Missing required fields");
    assert_eq!(
        outcome.notice.description.as_deref(),
        Some("Please mark at least one option as correct")
    );
    assert_eq!(questions.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_true_false_with_both_correct_is_invalid() {
    let questions = Arc::new(CountingRepository::<Question>::new(Vec::new()));
    let authoring = QuestionAuthoring::new(questions.clone(), Arc::new(InMemoryLinks::new()));

    let mut draft = draft();
    draft.set_type(QuestionType::TrueFalse);
    draft.toggle_correct("1");
    draft.toggle_correct("2");

    let outcome = authoring.create(&draft).await;
    assert_eq!(outcome.notice.title, "Invalid Options");
    assert_eq!(questions.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_created_question_is_linked_in_demo_store() {
    let store = seed_demo_store(10).await.unwrap();
    let authoring = QuestionAuthoring::new(store.questions.clone(), store.subtopic_questions.clone());

    let mut draft = draft();
    draft.toggle_correct("1");
    let outcome = authoring.create(&draft).await;
    assert!(outcome.is_complete());

    let question = outcome.question.unwrap();
    assert!(store.subtopic_questions.contains(&RecordId::new("3"), &question.id).await);
    assert_eq!(store.questions.len().await, 3);
}
