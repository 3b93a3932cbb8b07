// Generic data table - column descriptors, sort-header behaviour and the
// numbered pagination control, independent of any renderer

use std::fmt;

use super::query::SortDirection;

pub const DEFAULT_EMPTY_STATE: &str = "No results found.";

type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type KeyFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

pub struct Column<T> {
    pub id: String,
    pub header: String,
    cell: CellFn<T>,
    pub sortable: bool,
    pub class_name: Option<String>,
}

impl<T> Column<T> {
    pub fn new<F>(id: &str, header: &str, cell: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            header: header.to_string(),
            cell: Box::new(cell),
            sortable: false,
            class_name: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn render_cell(&self, item: &T) -> String {
        (self.cell)(item)
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIcon {
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    /// `None` for columns that cannot be sorted.
    pub sort_icon: Option<SortIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: String,
    pub cells: Vec<String>,
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<RenderedRow>),
    /// A single full-width cell spanning `colspan` columns.
    Empty { message: String, colspan: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    Previous { disabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { disabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    pub pagination: Option<Vec<PageItem>>,
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    key_extractor: KeyFn<T>,
    sort: Option<SortState>,
    pagination: Option<PaginationState>,
    empty_state: Option<String>,
    rows_clickable: bool,
}

impl<T> DataTable<T> {
    pub fn new<K>(columns: Vec<Column<T>>, key_extractor: K) -> Self
    where
        K: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            columns,
            key_extractor: Box::new(key_extractor),
            sort: None,
            pagination: None,
            empty_state: None,
            rows_clickable: false,
        }
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_empty_state(mut self, message: &str) -> Self {
        self.empty_state = Some(message.to_string());
        self
    }

    pub fn clickable_rows(mut self) -> Self {
        self.rows_clickable = true;
        self
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    pub fn set_pagination(&mut self, pagination: Option<PaginationState>) {
        self.pagination = pagination;
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn key_of(&self, item: &T) -> String {
        (self.key_extractor)(item)
    }

    /// Sort requested by clicking a header: the active ascending column flips
    /// to descending, anything else starts ascending. Unsortable or unknown
    /// columns produce nothing.
    pub fn header_click(&self, column_id: &str) -> Option<SortState> {
        let column = self.columns.iter().find(|c| c.id == column_id)?;
        if !column.sortable {
            return None;
        }
        let direction = match &self.sort {
            Some(current) if current.column == column_id && current.direction == SortDirection::Asc => {
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        Some(SortState {
            column: column_id.to_string(),
            direction,
        })
    }

    fn sort_icon(&self, column: &Column<T>) -> Option<SortIcon> {
        if !column.sortable {
            return None;
        }
        Some(match &self.sort {
            Some(current) if current.column == column.id => match current.direction {
                SortDirection::Asc => SortIcon::Ascending,
                SortDirection::Desc => SortIcon::Descending,
            },
            _ => SortIcon::Unsorted,
        })
    }

    pub fn render(&self, rows: &[T]) -> RenderedTable {
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                id: column.id.clone(),
                label: column.header.clone(),
                sort_icon: self.sort_icon(column),
            })
            .collect();

        let body = if rows.is_empty() {
            TableBody::Empty {
                message: self
                    .empty_state
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMPTY_STATE.to_string()),
                colspan: self.columns.len(),
            }
        } else {
            TableBody::Rows(
                rows.iter()
                    .map(|item| RenderedRow {
                        key: self.key_of(item),
                        cells: self.columns.iter().map(|c| c.render_cell(item)).collect(),
                        clickable: self.rows_clickable,
                    })
                    .collect(),
            )
        };

        let pagination = self
            .pagination
            .filter(|p| p.total_pages > 1)
            .map(|p| page_items(p.current_page, p.total_pages));

        RenderedTable {
            headers,
            body,
            pagination,
        }
    }
}

/// Pagination control: first, last, current ± 1, one ellipsis per gap,
/// bracketed by previous/next which are disabled at the boundaries.
pub fn page_items(current: usize, total: usize) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let mut items = vec![PageItem::Previous { disabled: current <= 1 }];

    let mut candidates = vec![1, current.saturating_sub(1), current, current.saturating_add(1), total];
    candidates.retain(|page| (1..=total).contains(page));
    candidates.sort_unstable();
    candidates.dedup();

    let mut previous = 0;
    for page in candidates {
        if page > previous + 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page {
            number: page,
            active: page == current,
        });
        previous = page;
    }

    items.push(PageItem::Next { disabled: current >= total });
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Country {
        id: String,
        name: String,
    }

    fn table() -> DataTable<Country> {
        DataTable::new(
            vec![
                Column::new("id", "ID", |c: &Country| c.id.clone()).sortable(),
                Column::new("name", "Country Name", |c: &Country| c.name.clone()).sortable(),
                Column::new("actions", "", |_c: &Country| String::new()),
            ],
            |c: &Country| c.id.clone(),
        )
    }

    fn pages(items: &[PageItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                PageItem::Previous { disabled } => if *disabled { "<x".to_string() } else { "<".to_string() },
                PageItem::Next { disabled } => if *disabled { "x>".to_string() } else { ">".to_string() },
                PageItem::Ellipsis => "...".to_string(),
                PageItem::Page { number, active: true } => format!("[{}]", number),
                PageItem::Page { number, .. } => number.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_header_click_toggles_active_column() {
        let table = table().with_sort(SortState {
            column: "name".to_string(),
            direction: SortDirection::Asc,
        });
        assert_eq!(table.header_click("name").unwrap().direction, SortDirection::Desc);
        let other = table.header_click("id").unwrap();
        assert_eq!(other.column, "id");
        assert_eq!(other.direction, SortDirection::Asc);
        assert!(table.header_click("actions").is_none());
        assert!(table.header_click("missing").is_none());
    }

    #[test]
    fn test_header_click_on_descending_resets_to_ascending() {
        let table = table().with_sort(SortState {
            column: "name".to_string(),
            direction: SortDirection::Desc,
        });
        assert_eq!(table.header_click("name").unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn test_render_rows_and_icons() {
        let table = table().clickable_rows().with_sort(SortState {
            column: "name".to_string(),
            direction: SortDirection::Desc,
        });
        let rows = vec![Country { id: "1".into(), name: "Canada".into() }];
        let rendered = table.render(&rows);

        assert_eq!(rendered.headers[0].sort_icon, Some(SortIcon::Unsorted));
        assert_eq!(rendered.headers[1].sort_icon, Some(SortIcon::Descending));
        assert_eq!(rendered.headers[2].sort_icon, None);
        match rendered.body {
            TableBody::Rows(rows) => {
                assert_eq!(rows[0].key, "1");
                assert_eq!(rows[0].cells, vec!["1", "Canada", ""]);
                assert!(rows[0].clickable);
            }
            other => panic!("unexpected body {:?}", other),
        }
        assert!(rendered.pagination.is_none());
    }

    #[test]
    fn test_empty_state() {
        let rendered = table().render(&[]);
        assert_eq!(
            rendered.body,
            TableBody::Empty { message: DEFAULT_EMPTY_STATE.to_string(), colspan: 3 }
        );
        let custom = table().with_empty_state("No countries yet").render(&[]);
        assert!(matches!(custom.body, TableBody::Empty { ref message, .. } if message == "No countries yet"));
    }

    #[test]
    fn test_pagination_hidden_for_single_page() {
        let rendered = table()
            .with_pagination(PaginationState { current_page: 1, total_pages: 1 })
            .render(&[]);
        assert!(rendered.pagination.is_none());
    }

    #[test]
    fn test_page_items_window() {
        assert_eq!(pages(&page_items(1, 2)), "<x [1] 2 >");
        assert_eq!(pages(&page_items(1, 10)), "<x [1] 2 ... 10 >");
        assert_eq!(pages(&page_items(5, 10)), "< 1 ... 4 [5] 6 ... 10 >");
        assert_eq!(pages(&page_items(10, 10)), "< 1 ... 9 [10] x>");
        assert_eq!(pages(&page_items(3, 5)), "< 1 2 [3] 4 5 >");
    }

    #[test]
    fn test_page_items_ignore_huge_totals() {
        assert_eq!(pages(&page_items(1, 2_000_000_000)), "<x [1] 2 ... 2000000000 >");
        assert_eq!(
            pages(&page_items(usize::MAX, usize::MAX)),
            format!("< 1 ... {} [{}] x>", usize::MAX - 1, usize::MAX)
        );
    }
}
