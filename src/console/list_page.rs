// List page controller: one admin page for one entity. Owns the URL state,
// list state, table, layout chrome, filter panel, form drawer and delete
// dialog, and talks to the store only through its repository.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use super::confirm::DeleteConfirmation;
use super::drawer::FormDrawer;
use super::layout::DataManagementLayout;
use super::notice::{Notice, Notices};
use crate::config::ListingConfig;
use crate::core::RecordId;
use crate::error::{AppError, AppResult};
use crate::listing::{
    DataTable, FilterInput, FilterPanel, ListQuery, Navigation, PageSlice, PaginationState, QueryParams,
    RenderedTable, RequestTicket, SortState, SyncEvent, SyncMachine, UrlState,
};
use crate::models::Entity;
use crate::repository::{EntityRepository, ListRequest};
use crate::session::{AuthGate, AuthStatus};

pub const AUTH_TIMEOUT_TITLE: &str = "Authentication Error";
pub const AUTH_TIMEOUT_DETAIL: &str = "Session is not ready. Reload the page or sign in again.";

/// Whether the page may talk to its repository yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Waiting for the session before the first load.
    AwaitingAuth,
    Ready,
    /// No session arrived in time; [`ListPage::reload`] tries again.
    AuthTimedOut,
}

pub struct ListPage<T: Entity> {
    repository: Arc<dyn EntityRepository<T>>,
    auth: Option<AuthGate>,
    status: PageStatus,
    path: String,
    defaults: ListQuery,
    query: ListQuery,
    url: UrlState,
    sync: SyncMachine,
    page_size: usize,
    table: DataTable<T>,
    layout: DataManagementLayout,
    filters: FilterPanel,
    drawer: FormDrawer,
    editing: Option<T>,
    confirm: DeleteConfirmation<RecordId>,
    notices: Notices,
    rows: Vec<T>,
    pagination: PaginationState,
    total_items: usize,
    last_navigation: Option<Navigation>,
}

impl<T: Entity> ListPage<T> {
    pub fn new(
        repository: Arc<dyn EntityRepository<T>>,
        table: DataTable<T>,
        mut layout: DataManagementLayout,
        defaults: ListQuery,
        listing: &ListingConfig,
    ) -> Self {
        layout.set_search_debounce(listing.search_debounce());
        let filters = FilterPanel::new(Vec::new(), listing.search_debounce());
        let url = defaults.url_state(&[]);
        let label = T::LABEL.to_lowercase();
        Self {
            repository,
            auth: None,
            status: PageStatus::Ready,
            path: String::new(),
            query: defaults.clone(),
            defaults,
            url,
            sync: SyncMachine::new(),
            page_size: listing.page_size.max(1),
            table,
            layout,
            filters,
            drawer: FormDrawer::new(&format!("Add {}", T::LABEL)),
            editing: None,
            confirm: DeleteConfirmation::new(&format!("Delete {}", T::LABEL), &label),
            notices: Notices::default(),
            rows: Vec::new(),
            pagination: PaginationState {
                current_page: 1,
                total_pages: 1,
            },
            total_items: 0,
            last_navigation: None,
        }
    }

    /// Filter controls of this page. Their query parameters become part of
    /// the URL state.
    pub fn with_filters(mut self, filters: FilterPanel) -> Self {
        self.filters = filters;
        self.filters.set_debounce_delay(self.layout.search_debounce());
        self.url = self.defaults.url_state(&self.filters.params());
        self.layout = self.layout.with_filters();
        self
    }

    /// Hold every load until the gate yields a session.
    pub fn with_auth_gate(mut self, gate: AuthGate) -> Self {
        self.auth = Some(gate);
        self.status = PageStatus::AwaitingAuth;
        self
    }

    pub fn with_drawer(mut self, drawer: FormDrawer) -> Self {
        self.drawer = drawer;
        self
    }

    fn filter_keys(&self) -> Vec<String> {
        self.filters.params()
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn layout(&self) -> &DataManagementLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut DataManagementLayout {
        &mut self.layout
    }

    pub fn filters(&self) -> &FilterPanel {
        &self.filters
    }

    pub fn drawer(&self) -> &FormDrawer {
        &self.drawer
    }

    pub fn editing(&self) -> Option<&T> {
        self.editing.as_ref()
    }

    pub fn delete_dialog(&self) -> &DeleteConfirmation<RecordId> {
        &self.confirm
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn sync(&self) -> &SyncMachine {
        &self.sync
    }

    /// Last URL rewrite requested by the page.
    pub fn last_navigation(&self) -> Option<&Navigation> {
        self.last_navigation.as_ref()
    }

    pub fn render(&self) -> RenderedTable {
        self.table.render(&self.rows)
    }

    /// Routing is ready (first load or back/forward). Rebuilds every piece of
    /// state from the query string, then loads the page.
    #[instrument(skip(self, query), fields(resource = T::RESOURCE))]
    pub async fn open(&mut self, path: &str, query: &QueryParams) {
        let _ = self.sync.handle(SyncEvent::UrlChanged);
        self.path = path.to_string();
        self.url.hydrate(path, query);
        self.layout.hydrate(query);
        self.filters.hydrate(query);
        self.query = ListQuery::from_url(&self.defaults, &self.url, &self.filter_keys());
        self.sync_table_sort();
        self.layout.sync_sort(&self.query.sort_option());
        if self.authorize().await {
            self.fetch().await;
        }
    }

    /// Refresh button. Loads only once the session is ready.
    pub async fn refresh(&mut self) {
        if self.status == PageStatus::Ready {
            self.fetch().await;
        }
    }

    /// Reload after an auth timeout: wait for the session again, then load.
    pub async fn reload(&mut self) -> PageStatus {
        if self.authorize().await {
            self.fetch().await;
        }
        self.status
    }

    async fn authorize(&mut self) -> bool {
        let Some(gate) = self.auth.clone() else {
            self.status = PageStatus::Ready;
            return true;
        };
        self.status = PageStatus::AwaitingAuth;
        self.layout.set_loading(true);
        match gate.wait().await {
            AuthStatus::Ready(_) => {
                self.status = PageStatus::Ready;
                true
            }
            AuthStatus::TimedOut => {
                warn!("{} page gave up waiting for a session", T::RESOURCE);
                self.status = PageStatus::AuthTimedOut;
                self.layout.set_loading(false);
                self.notices
                    .push(Notice::error(AUTH_TIMEOUT_TITLE).with_description(AUTH_TIMEOUT_DETAIL));
                false
            }
        }
    }

    fn sync_table_sort(&mut self) {
        self.table.set_sort(Some(SortState {
            column: self.query.sort_column.clone(),
            direction: self.query.sort_direction,
        }));
    }

    fn begin_change(&mut self) -> AppResult<()> {
        self.sync
            .handle(SyncEvent::FilterChanged)
            .map(|_| ())
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }

    /// Write the list state to the URL. The combined legacy `sort` key is
    /// dropped on every write.
    fn navigate(&mut self) -> Option<Navigation> {
        let navigation = self.url.update(self.query.url_update(&self.filter_keys()));
        if let Some(nav) = &navigation {
            debug!("Navigating to {}", nav.href());
            self.last_navigation = Some(nav.clone());
        }
        navigation
    }

    async fn apply_change(&mut self) -> Option<Navigation> {
        let navigation = self.navigate();
        self.fetch().await;
        navigation
    }

    /// Keystroke in the search box; nothing is fetched until [`tick`](Self::tick).
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.layout.search_input(text, now);
    }

    /// Commit debounced search text and free-text filters whose delay has elapsed.
    pub async fn tick(&mut self, now: Instant) -> AppResult<Option<Navigation>> {
        let search = self.layout.poll_search(now);
        let updates = self.filters.poll(now);
        if search.is_none() && updates.is_empty() {
            return Ok(None);
        }
        self.begin_change()?;
        if let Some(text) = search {
            self.query.set_search(&text);
        }
        for update in updates {
            self.query.set_filter(&update.param, update.values);
        }
        Ok(self.apply_change().await)
    }

    pub async fn clear_search(&mut self) -> AppResult<Option<Navigation>> {
        self.begin_change()?;
        let text = self.layout.clear_search();
        self.query.set_search(&text);
        Ok(self.apply_change().await)
    }

    pub async fn set_filter(&mut self, id: &str, input: FilterInput, now: Instant) -> AppResult<Option<Navigation>> {
        let Some(update) = self.filters.change(id, input, now)? else {
            return Ok(None);
        };
        self.begin_change()?;
        self.query.set_filter(&update.param, update.values);
        Ok(self.apply_change().await)
    }

    pub async fn reset_filters(&mut self) -> AppResult<Option<Navigation>> {
        self.begin_change()?;
        self.filters.reset();
        self.query.clear_filters();
        Ok(self.apply_change().await)
    }

    /// Show or hide the filter panel. Only the URL changes.
    pub fn toggle_filters(&mut self) -> Option<Navigation> {
        self.query.show_filters = self.layout.toggle_filters();
        self.navigate()
    }

    /// Table header clicked.
    pub async fn sort_by_header(&mut self, column_id: &str) -> AppResult<Option<Navigation>> {
        let Some(sort) = self.table.header_click(column_id) else {
            return Ok(None);
        };
        self.begin_change()?;
        self.query.set_sort(&sort.column, sort.direction);
        self.table.set_sort(Some(sort));
        self.layout.sync_sort(&self.query.sort_option());
        Ok(self.apply_change().await)
    }

    /// Sort dropdown changed, e.g. `name_desc`.
    pub async fn select_sort_option(&mut self, value: &str) -> AppResult<Option<Navigation>> {
        let option = self.layout.select_sort(value)?;
        self.begin_change()?;
        self.query.set_sort(&option.column, option.direction);
        self.sync_table_sort();
        Ok(self.apply_change().await)
    }

    pub async fn go_to_page(&mut self, page: usize) -> AppResult<Option<Navigation>> {
        let page = page.clamp(1, self.pagination.total_pages.max(1));
        if page == self.query.current_page {
            return Ok(None);
        }
        self.begin_change()?;
        self.query.current_page = page;
        Ok(self.apply_change().await)
    }

    /// Start a load for the current state. The ticket must be handed back to
    /// [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self) -> (RequestTicket, ListRequest) {
        let ticket = self.sync.begin_fetch();
        self.layout.set_loading(true);
        (ticket, ListRequest::new(self.query.clone(), self.page_size))
    }

    /// Apply a load result unless a newer load has started since. Returns
    /// whether the result was applied.
    pub fn finish_load(&mut self, ticket: RequestTicket, result: AppResult<PageSlice<T>>) -> bool {
        if !self.sync.settle(ticket) {
            debug!("Dropping stale {} response {}", T::RESOURCE, ticket.id());
            return false;
        }
        self.layout.set_loading(false);
        match result {
            Ok(page) => {
                self.query.current_page = page.current_page;
                self.pagination = PaginationState {
                    current_page: page.current_page,
                    total_pages: page.total_pages.max(1),
                };
                self.table.set_pagination(Some(self.pagination));
                self.total_items = page.total_items;
                self.rows = page.items;
            }
            Err(e) => {
                warn!("Loading {} failed: {}", T::RESOURCE, e);
                self.notices.push(
                    Notice::error(&format!("Error fetching {}", T::RESOURCE)).with_description(e.message()),
                );
            }
        }
        true
    }

    async fn fetch(&mut self) {
        if self.status != PageStatus::Ready {
            debug!("Skipping {} load until the session is ready", T::RESOURCE);
            return;
        }
        let (ticket, request) = self.begin_load();
        let result = self.repository.list(&request).await;
        self.finish_load(ticket, result);
    }

    pub fn add_new(&mut self) {
        self.editing = None;
        self.drawer.set_title(&format!("Add {}", T::LABEL));
        self.drawer.open();
    }

    /// Open the drawer on a row of the current page.
    pub fn edit(&mut self, id: &RecordId) -> Option<&T> {
        let record = self.rows.iter().find(|r| r.id() == id)?.clone();
        self.drawer.set_title(&format!("Edit {}", T::LABEL));
        self.drawer.open();
        self.editing = Some(record);
        self.editing.as_ref()
    }

    pub fn close_drawer(&mut self) {
        self.drawer.close();
        self.editing = None;
    }

    /// Save the drawer's record. Local validation failures never reach the
    /// repository. Returns whether the record was saved.
    #[instrument(skip(self, record), fields(resource = T::RESOURCE))]
    pub async fn submit_form(&mut self, mut record: T) -> bool {
        if let Err(e) = record.validate() {
            self.notices
                .push(Notice::error("Validation Error").with_description(e.message()));
            return false;
        }
        if !self.drawer.begin_submit() {
            return false;
        }

        let (verb, result) = match &self.editing {
            Some(existing) => {
                record.set_id(existing.id().clone());
                ("updating", self.repository.update(record).await)
            }
            None => ("creating", self.repository.create(record).await),
        };

        match result {
            Ok(saved) => {
                let done = if verb == "updating" { "updated" } else { "created" };
                info!("{} {} {}", T::LABEL, saved.id(), done);
                self.notices.push(
                    Notice::success("Success").with_description(format!("{} {} successfully", T::LABEL, done)),
                );
                self.drawer.finish_submit(true);
                self.editing = None;
                self.fetch().await;
                true
            }
            Err(e) => {
                self.notices.push(
                    Notice::error(&format!("Error {} {}", verb, T::LABEL.to_lowercase()))
                        .with_description(e.message()),
                );
                self.drawer.finish_submit(false);
                false
            }
        }
    }

    /// Delete button on a row: only opens the dialog.
    pub fn request_delete(&mut self, id: RecordId) -> bool {
        self.confirm.request(id)
    }

    pub fn dismiss_delete(&mut self) -> bool {
        self.confirm.dismiss()
    }

    /// Dialog confirmed: delete the target, then reload.
    #[instrument(skip(self), fields(resource = T::RESOURCE))]
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(target) = self.confirm.confirm() else {
            return false;
        };
        match self.repository.delete(&target).await {
            Ok(()) => {
                self.confirm.finish(true);
                self.notices.push(
                    Notice::success("Success").with_description(format!("{} deleted successfully", T::LABEL)),
                );
                self.fetch().await;
                true
            }
            Err(e) => {
                self.confirm.finish(false);
                self.notices.push(
                    Notice::error(&format!("Error deleting {}", T::LABEL.to_lowercase()))
                        .with_description(e.message()),
                );
                false
            }
        }
    }
}
