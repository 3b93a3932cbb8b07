// Filter / sort / search state of a list page and its URL encoding

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::url_state::{UrlState, UrlValue};
use crate::error::{AppError, AppResult};

pub const PAGE_KEY: &str = "page";
pub const SORT_COLUMN_KEY: &str = "sortColumn";
pub const SORT_DIRECTION_KEY: &str = "sortDirection";
pub const SEARCH_KEY: &str = "search";
pub const SHOW_FILTERS_KEY: &str = "showFilters";
/// Combined `column_direction` key written by the sort dropdown of older pages.
pub const LEGACY_SORT_KEY: &str = "sort";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sort dropdown value such as `name_desc` or `createdAt_asc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub column: String,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }

    /// Split at the last underscore so columns may contain underscores.
    pub fn parse(value: &str) -> AppResult<Self> {
        let (column, direction) = value
            .rsplit_once('_')
            .ok_or_else(|| AppError::Validation(format!("Invalid sort option: {}", value)))?;
        let direction = SortDirection::parse(direction)
            .ok_or_else(|| AppError::Validation(format!("Invalid sort direction: {}", value)))?;
        if column.is_empty() {
            return Err(AppError::Validation(format!("Invalid sort option: {}", value)));
        }
        Ok(Self::new(column, direction))
    }

    pub fn value(&self) -> String {
        format!("{}_{}", self.column, self.direction)
    }
}

/// In-memory list-page state, seeded from the URL and mirrored back into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub sort_column: String,
    pub sort_direction: SortDirection,
    /// 1-based.
    pub current_page: usize,
    pub search_query: String,
    /// Active filter values per filter key; absent keys are inactive.
    pub filters: BTreeMap<String, Vec<String>>,
    pub show_filters: bool,
}

impl ListQuery {
    pub fn new(sort_column: &str) -> Self {
        Self {
            sort_column: sort_column.to_string(),
            sort_direction: SortDirection::Asc,
            current_page: 1,
            search_query: String::new(),
            filters: BTreeMap::new(),
            show_filters: false,
        }
    }

    pub fn sorted(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_query = text.to_string();
        self.current_page = 1;
    }

    /// Replace a filter's values. Blank values are dropped; an empty result
    /// deactivates the filter.
    pub fn set_filter(&mut self, key: &str, values: Vec<String>) {
        let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), values);
        }
        self.current_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.current_page = 1;
    }

    pub fn set_sort(&mut self, column: &str, direction: SortDirection) {
        self.sort_column = column.to_string();
        self.sort_direction = direction;
    }

    pub fn sort_option(&self) -> SortOption {
        SortOption::new(&self.sort_column, self.sort_direction)
    }

    pub fn filter(&self, key: &str) -> Option<&[String]> {
        self.filters.get(key).map(Vec::as_slice)
    }

    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// URL state owned by a list page whose filters are `filter_keys`.
    pub fn url_state(&self, filter_keys: &[String]) -> UrlState {
        let mut initial = self.url_entries(filter_keys);
        initial.push((LEGACY_SORT_KEY.to_string(), UrlValue::text("")));
        UrlState::new(initial)
    }

    /// This state as URL entries. Inactive filters are emitted as empty lists
    /// so the keys get removed from the query string.
    pub fn url_entries(&self, filter_keys: &[String]) -> Vec<(String, UrlValue)> {
        let mut entries = vec![
            (PAGE_KEY.to_string(), UrlValue::Number(self.current_page as f64)),
            (SORT_COLUMN_KEY.to_string(), UrlValue::text(self.sort_column.clone())),
            (
                SORT_DIRECTION_KEY.to_string(),
                UrlValue::text(self.sort_direction.as_str()),
            ),
            (SEARCH_KEY.to_string(), UrlValue::text(self.search_query.clone())),
            (
                SHOW_FILTERS_KEY.to_string(),
                if self.show_filters { UrlValue::Bool(true) } else { UrlValue::Null },
            ),
        ];
        for key in filter_keys {
            let values = self.filters.get(key).cloned().unwrap_or_default();
            entries.push((key.clone(), UrlValue::List(values)));
        }
        entries
    }

    /// Same as [`url_entries`](Self::url_entries) plus removal of the legacy
    /// combined sort key, which is superseded once the page writes the URL.
    pub fn url_update(&self, filter_keys: &[String]) -> Vec<(String, UrlValue)> {
        let mut entries = self.url_entries(filter_keys);
        entries.push((LEGACY_SORT_KEY.to_string(), UrlValue::Null));
        entries
    }

    /// Rebuild the state from a hydrated [`UrlState`], falling back to
    /// `defaults` for anything the URL does not carry.
    pub fn from_url(defaults: &ListQuery, url: &UrlState, filter_keys: &[String]) -> ListQuery {
        let mut query = defaults.clone();

        if let Some(option) = url
            .get(LEGACY_SORT_KEY)
            .and_then(UrlValue::as_text)
            .filter(|s| !s.is_empty())
            .and_then(|s| SortOption::parse(s).ok())
        {
            query.set_sort(&option.column, option.direction);
        }

        if url.came_from_url(SORT_COLUMN_KEY) {
            if let Some(column) = url.get(SORT_COLUMN_KEY).and_then(UrlValue::as_text) {
                if !column.is_empty() {
                    query.sort_column = column.to_string();
                }
            }
        }
        if url.came_from_url(SORT_DIRECTION_KEY) {
            if let Some(direction) = url
                .get(SORT_DIRECTION_KEY)
                .and_then(UrlValue::as_text)
                .and_then(SortDirection::parse)
            {
                query.sort_direction = direction;
            }
        }

        if let Some(page) = url.get(PAGE_KEY).and_then(UrlValue::as_number) {
            if page >= 1.0 {
                query.current_page = page.trunc() as usize;
            }
        }

        if let Some(search) = url.get(SEARCH_KEY).and_then(UrlValue::as_text) {
            query.search_query = search.to_string();
        }

        query.show_filters = match url.get(SHOW_FILTERS_KEY) {
            Some(UrlValue::Bool(flag)) => *flag,
            Some(UrlValue::Text(raw)) => raw == "true",
            _ => defaults.show_filters,
        };

        for key in filter_keys {
            if let Some(values) = url.get(key).and_then(UrlValue::as_list) {
                let values: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
                if values.is_empty() {
                    query.filters.remove(key);
                } else {
                    query.filters.insert(key.clone(), values);
                }
            }
        }

        query
    }
}
