// Client-side filter / sort / paginate over an in-memory record set

use std::cmp::Ordering;
use std::collections::HashMap;

use super::query::{ListQuery, SortDirection};

/// A single cell value as seen by the comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    /// Milliseconds since the epoch.
    Date(i64),
    Missing,
}

/// Anything that can be shown in a list view.
pub trait Listable {
    fn record_key(&self) -> &str;

    /// Value of a sortable column. Unknown columns are `Missing`.
    fn field(&self, column: &str) -> FieldValue<'_>;

    /// Fields matched by the free-text search box.
    fn search_fields(&self) -> Vec<&str>;

    /// Foreign key (or other discrete attribute) addressed by a filter key such
    /// as `"country"` or `"topic"`.
    fn filter_key(&self, _key: &str) -> Option<&str> {
        None
    }

    /// Whether the record passes an active filter. `values` is never empty and
    /// is matched any-of.
    fn matches_filter(&self, key: &str, values: &[String]) -> bool {
        match self.filter_key(key) {
            Some(own) => values.iter().any(|v| v == own),
            None => false,
        }
    }
}

/// Resolves a foreign key to a display name through a joined reference table,
/// e.g. sorting courses by their subject's name.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    pub foreign_key: String,
    pub names: HashMap<String, String>,
}

impl Lookup {
    pub fn new(foreign_key: &str) -> Self {
        Self {
            foreign_key: foreign_key.to_string(),
            names: HashMap::new(),
        }
    }

    pub fn with_names<I, K, V>(foreign_key: &str, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            foreign_key: foreign_key.to_string(),
            names: names.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    fn resolve<'a, T: Listable>(&'a self, item: &T) -> Option<&'a str> {
        item.filter_key(&self.foreign_key)
            .and_then(|key| self.names.get(key))
            .map(String::as_str)
    }
}

/// Per-page listing setup: page size and lookup columns.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub page_size: usize,
    pub lookups: HashMap<String, Lookup>,
}

impl Default for ListSpec {
    fn default() -> Self {
        Self {
            page_size: 10,
            lookups: HashMap::new(),
        }
    }
}

impl ListSpec {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn lookup(mut self, column: &str, lookup: Lookup) -> Self {
        self.lookups.insert(column.to_string(), lookup);
        self
    }
}

/// Text ordering used for every string column: case-insensitive first, exact
/// bytes as the tie-break so distinct strings never compare equal.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_fields(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => compare_text(x, y),
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
        (FieldValue::Missing, _) => Ordering::Greater,
        (_, FieldValue::Missing) => Ordering::Less,
        // Mixed kinds only happen on malformed data; order them by kind.
        (x, y) => kind_rank(x).cmp(&kind_rank(y)),
    }
}

fn kind_rank(value: &FieldValue<'_>) -> u8 {
    match value {
        FieldValue::Number(_) => 0,
        FieldValue::Date(_) => 1,
        FieldValue::Text(_) => 2,
        FieldValue::Missing => 3,
    }
}

fn sort_value<'a, T: Listable>(item: &'a T, column: &str, spec: &'a ListSpec) -> FieldValue<'a> {
    match spec.lookups.get(column) {
        Some(lookup) => lookup
            .resolve(item)
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        None => item.field(column),
    }
}

fn matches_search<T: Listable>(item: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Recompute the visible result set for `query`: search, filter, then a stable
/// sort. Ties keep their input order.
pub fn apply_filters<'a, T: Listable>(items: &'a [T], query: &ListQuery, spec: &ListSpec) -> Vec<&'a T> {
    let needle = query.search_query.trim().to_lowercase();

    let mut visible: Vec<&T> = items
        .iter()
        .filter(|item| matches_search(*item, &needle))
        .filter(|item| {
            query
                .active_filters()
                .all(|(key, values)| item.matches_filter(key, values))
        })
        .collect();

    if !query.sort_column.is_empty() {
        let column = query.sort_column.as_str();
        visible.sort_by(|a, b| {
            let ordering = compare_fields(&sort_value(*a, column, spec), &sort_value(*b, column, spec));
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    visible
}

/// `max(1, ceil(count / page_size))`.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Clamp a 1-based page number into `[1, total_pages]`.
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// Items of the (clamped) requested page.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let page = clamp_page(page, items.len(), page_size);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    &items[start.min(items.len())..end]
}

/// A computed page of results, as handed to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Filter, sort and cut one page in a single call.
pub fn list_page<T: Listable + Clone>(items: &[T], query: &ListQuery, spec: &ListSpec) -> PageSlice<T> {
    let visible = apply_filters(items, query, spec);
    let current_page = clamp_page(query.current_page, visible.len(), spec.page_size);
    let page = paginate(&visible, current_page, spec.page_size);

    PageSlice {
        items: page.iter().map(|item| (*item).clone()).collect(),
        current_page,
        total_pages: total_pages(visible.len(), spec.page_size),
        total_items: visible.len(),
    }
}
