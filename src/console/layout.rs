// Data Management Layout - page chrome shared by every admin list page:
// header, debounced search box, sort dropdown, refresh and filter placement

use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};
use crate::listing::query::{LEGACY_SORT_KEY, SEARCH_KEY, SHOW_FILTERS_KEY, SORT_COLUMN_KEY, SORT_DIRECTION_KEY};
use crate::listing::{ChoiceOption, Debouncer, QueryParams, SortOption};

/// Widths below this are treated as mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Mobile,
    Desktop,
}

impl Viewport {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            Viewport::Mobile
        } else {
            Viewport::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == Viewport::Mobile
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub title: String,
    pub description: String,
    /// `None` hides the add button.
    pub add_new_label: Option<String>,
    pub secondary_actions: Vec<String>,
}

/// Where the filter controls currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPlacement {
    /// The page has no filter controls.
    None,
    InlineCollapsed,
    InlineExpanded,
    SheetClosed,
    SheetOpen,
}

#[derive(Debug, Clone)]
pub struct DataManagementLayout {
    header: PageHeader,
    search_placeholder: String,
    search_value: String,
    search_debounce: Debouncer<String>,
    sort_options: Vec<ChoiceOption>,
    sort_value: String,
    has_filters: bool,
    show_filters: bool,
    sheet_open: bool,
    is_loading: bool,
    viewport: Viewport,
}

impl DataManagementLayout {
    pub fn new(title: &str, description: &str, search_debounce: Duration) -> Self {
        Self {
            header: PageHeader {
                title: title.to_string(),
                description: description.to_string(),
                add_new_label: None,
                secondary_actions: Vec::new(),
            },
            search_placeholder: "Search...".to_string(),
            search_value: String::new(),
            search_debounce: Debouncer::new(search_debounce),
            sort_options: Vec::new(),
            sort_value: String::new(),
            has_filters: false,
            show_filters: false,
            sheet_open: false,
            is_loading: false,
            viewport: Viewport::Desktop,
        }
    }

    pub fn with_add_new(mut self, label: &str) -> Self {
        self.header.add_new_label = Some(label.to_string());
        self
    }

    pub fn with_secondary_action(mut self, label: &str) -> Self {
        self.header.secondary_actions.push(label.to_string());
        self
    }

    pub fn with_search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Sort dropdown entries; the first one is selected unless `default` is given.
    pub fn with_sort_options(mut self, options: Vec<ChoiceOption>, default: Option<&str>) -> Self {
        self.sort_value = default
            .map(str::to_string)
            .or_else(|| options.first().map(|o| o.value.clone()))
            .unwrap_or_default();
        self.sort_options = options;
        self
    }

    /// Replace the search delay; anything pending is dropped.
    pub fn set_search_debounce(&mut self, delay: Duration) {
        self.search_debounce = Debouncer::new(delay);
    }

    pub fn with_filters(mut self) -> Self {
        self.has_filters = true;
        self
    }

    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    pub fn search_debounce(&self) -> Duration {
        self.search_debounce.delay()
    }

    pub fn search_placeholder(&self) -> &str {
        &self.search_placeholder
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    /// The clear button is shown only while there is text.
    pub fn shows_clear_button(&self) -> bool {
        !self.search_value.is_empty()
    }

    pub fn sort_options(&self) -> &[ChoiceOption] {
        &self.sort_options
    }

    pub fn sort_value(&self) -> &str {
        &self.sort_value
    }

    pub fn show_filters(&self) -> bool {
        self.show_filters
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Re-read search, sort and filter visibility once routing is ready.
    pub fn hydrate(&mut self, query: &QueryParams) {
        self.search_value = query.first(SEARCH_KEY).unwrap_or_default().to_string();
        self.search_debounce.cancel();

        let explicit = match (query.first(SORT_COLUMN_KEY), query.first(SORT_DIRECTION_KEY)) {
            (Some(column), Some(direction)) => Some(format!("{}_{}", column, direction)),
            _ => None,
        };
        if let Some(value) = explicit.or_else(|| query.first(LEGACY_SORT_KEY).map(str::to_string)) {
            if self.sort_options.iter().any(|o| o.value == value) {
                self.sort_value = value;
            }
        }

        self.show_filters = query.first(SHOW_FILTERS_KEY) == Some("true");
        self.sheet_open = self.viewport.is_mobile() && self.show_filters;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.sheet_open = viewport.is_mobile() && self.show_filters;
    }

    /// Keystroke in the search box. The text is committed after the debounce delay.
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.search_value = text.to_string();
        self.search_debounce.push(text.to_string(), now);
    }

    /// Search text whose debounce delay has elapsed.
    pub fn poll_search(&mut self, now: Instant) -> Option<String> {
        self.search_debounce.poll(now)
    }

    pub fn has_pending_search(&self) -> bool {
        self.search_debounce.is_pending()
    }

    /// Clearing commits immediately.
    pub fn clear_search(&mut self) -> String {
        self.search_debounce.cancel();
        self.search_value.clear();
        String::new()
    }

    pub fn select_sort(&mut self, value: &str) -> AppResult<SortOption> {
        if !self.sort_options.iter().any(|o| o.value == value) {
            return Err(AppError::Validation(format!("Unknown sort option: {}", value)));
        }
        let option = SortOption::parse(value)?;
        self.sort_value = value.to_string();
        Ok(option)
    }

    /// Keep the dropdown in step with a sort chosen elsewhere (table headers).
    pub fn sync_sort(&mut self, option: &SortOption) {
        let value = option.value();
        if self.sort_options.iter().any(|o| o.value == value) {
            self.sort_value = value;
        }
    }

    /// Toggle the filter panel; returns the new visibility.
    pub fn toggle_filters(&mut self) -> bool {
        self.show_filters = !self.show_filters;
        if self.viewport.is_mobile() {
            self.sheet_open = self.show_filters;
        }
        self.show_filters
    }

    /// Sheet opened or dismissed on mobile. Returns the new visibility when it changed.
    pub fn sheet_open_change(&mut self, open: bool) -> Option<bool> {
        self.sheet_open = open;
        if self.show_filters != open {
            self.show_filters = open;
            Some(open)
        } else {
            None
        }
    }

    pub fn filter_placement(&self) -> FilterPlacement {
        match (self.has_filters, self.viewport, self.show_filters, self.sheet_open) {
            (false, ..) => FilterPlacement::None,
            (true, Viewport::Mobile, _, true) => FilterPlacement::SheetOpen,
            (true, Viewport::Mobile, _, false) => FilterPlacement::SheetClosed,
            (true, Viewport::Desktop, true, _) => FilterPlacement::InlineExpanded,
            (true, Viewport::Desktop, false, _) => FilterPlacement::InlineCollapsed,
        }
    }

    pub fn filter_toggle_label(&self) -> &'static str {
        match (self.viewport, self.show_filters) {
            (Viewport::Mobile, _) => "Filters",
            (Viewport::Desktop, true) => "Hide Filters",
            (Viewport::Desktop, false) => "Show Filters",
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Refresh is disabled and spinning while loading.
    pub fn refresh_enabled(&self) -> bool {
        !self.is_loading
    }

    /// The body is replaced by the loading indicator while a fetch runs.
    pub fn body_visible(&self) -> bool {
        !self.is_loading
    }
}
