use serde::{Deserialize, Serialize};

use crate::listing::PageSlice;

/// Pagination block of a backend list response. Keys stay snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_size: usize,
    pub page_number: usize,
    pub total_pages: usize,
}

/// `{data, amount, pagination}` envelope returned by every list route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub amount: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}

impl<T> ListResponse<T> {
    pub fn from_page(page: PageSlice<T>, page_size: usize) -> Self {
        Self {
            amount: page.total_items,
            pagination: Some(PageInfo {
                page_size,
                page_number: page.current_page,
                total_pages: page.total_pages,
            }),
            data: page.items,
        }
    }

    /// Normalise into the shape the table consumes. Backends that omit the
    /// pagination block are treated as a single page.
    pub fn into_page(self, requested_page: usize, page_size: usize) -> PageSlice<T> {
        let total_items = if self.amount == 0 { self.data.len() } else { self.amount };
        let (current_page, total_pages) = match self.pagination {
            Some(info) => (info.page_number.max(1), info.total_pages.max(1)),
            None => (
                requested_page.max(1),
                crate::listing::total_pages(total_items, page_size),
            ),
        };
        PageSlice {
            items: self.data,
            current_page,
            total_pages,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_backend_shape() {
        let raw = r#"{"data":[1,2],"amount":12,"pagination":{"page_size":2,"page_number":3,"total_pages":6}}"#;
        let response: ListResponse<u32> = serde_json::from_str(raw).unwrap();
        let page = response.into_page(1, 10);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.total_items, 12);
    }

    #[test]
    fn test_missing_pagination_is_derived() {
        let response: ListResponse<u32> = serde_json::from_str(r#"{"data":[1,2,3]}"#).unwrap();
        let page = response.into_page(2, 2);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
    }
}
