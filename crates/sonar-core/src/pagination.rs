//! Pagination types
//!
//! A [`PaginatedResult`] pairs one decoded page with the total count the
//! backend reported. The page number, page size and base path are echoed
//! from the request, never read back from the response.

use serde::{Deserialize, Serialize};

use crate::error::{SonarError, SonarResult};

pub const DEFAULT_PER_PAGE: u32 = 25;

/// Page metadata as returned in `page_info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageInfo {
    pub total_count: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub records_per_page: Option<u32>,
}

/// A requested page: size, number, and the path used for link generation.
///
/// Only [`PageRequest::new`] and `Default` build one, so page and page
/// size are always positive:
///
/// ```compile_fail
/// use sonar_core::PageRequest;
///
/// let request = PageRequest { per_page: 5, page: 0, base_path: "/".into() };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    per_page: u32,
    page: u32,
    base_path: String,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            base_path: "/".to_string(),
        }
    }
}

impl PageRequest {
    /// Both `per_page` and `page` must be positive
    pub fn new(per_page: u32, page: u32, base_path: impl Into<String>) -> SonarResult<Self> {
        if per_page == 0 {
            return Err(SonarError::invalid_argument("per_page must be positive"));
        }
        if page == 0 {
            return Err(SonarError::invalid_argument("page must be positive (pages are 1-indexed)"));
        }
        Ok(Self {
            per_page,
            page,
            base_path: base_path.into(),
        })
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// 1-indexed page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

/// One page of decoded resources
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
    pub base_path: String,
}

/// Navigation links for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page,
            per_page: request.per_page,
            base_path: request.base_path.clone(),
        }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Last page number; at least 1 even for an empty result
    pub fn last_page(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        let pages = self.total_count.div_ceil(per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn on_first_page(&self) -> bool {
        self.page <= 1
    }

    pub fn has_more_pages(&self) -> bool {
        self.page < self.last_page()
    }

    /// 1-based position of the first item on this page
    pub fn first_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page) + 1)
    }

    /// 1-based position of the last item on this page
    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first + self.items.len() as u64 - 1)
    }

    /// URL for a given page number
    pub fn url(&self, page: u32) -> String {
        let separator = if self.base_path.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.base_path, separator, page.max(1))
    }

    pub fn next_page_url(&self) -> Option<String> {
        self.has_more_pages().then(|| self.url(self.page + 1))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        (!self.on_first_page()).then(|| self.url(self.page - 1))
    }

    pub fn links(&self) -> PageLinks {
        PageLinks {
            first: self.url(1),
            last: self.url(self.last_page()),
            prev: self.previous_page_url(),
            next: self.next_page_url(),
        }
    }

    /// Map the items, keeping the page metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            per_page: self.per_page,
            base_path: self.base_path,
        }
    }
}

impl<T> IntoIterator for PaginatedResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PaginatedResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: usize, total: u64, per_page: u32, page: u32) -> PaginatedResult<usize> {
        let request = PageRequest::new(per_page, page, "/tickets").unwrap();
        PaginatedResult::new((0..items).collect(), total, &request)
    }

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(0, 1, "/").is_err());
        assert!(PageRequest::new(5, 0, "/").is_err());

        let default = PageRequest::default();
        assert_eq!(default.per_page(), 25);
        assert_eq!(default.page(), 1);
        assert_eq!(default.base_path(), "/");
    }

    #[test]
    fn test_first_item_on_page_zero() {
        let result = PaginatedResult {
            items: vec![1, 2],
            total_count: 2,
            page: 0,
            per_page: 5,
            base_path: "/".to_string(),
        };
        assert_eq!(result.first_item(), Some(1));
        assert_eq!(result.last_item(), Some(2));
        assert!(result.on_first_page());
        assert_eq!(result.previous_page_url(), None);
    }

    #[test]
    fn test_middle_page() {
        let result = page(5, 17, 5, 2);
        assert_eq!(result.len(), 5);
        assert_eq!(result.last_page(), 4);
        assert!(result.has_more_pages());
        assert!(!result.on_first_page());
        assert_eq!(result.first_item(), Some(6));
        assert_eq!(result.last_item(), Some(10));
        assert_eq!(result.next_page_url().as_deref(), Some("/tickets?page=3"));
        assert_eq!(result.previous_page_url().as_deref(), Some("/tickets?page=1"));
    }

    #[test]
    fn test_last_page() {
        let result = page(2, 17, 5, 4);
        assert!(!result.has_more_pages());
        assert_eq!(result.next_page_url(), None);
        assert_eq!(result.last_item(), Some(17));
    }

    #[test]
    fn test_empty_result() {
        let result = page(0, 0, 5, 1);
        assert!(result.is_empty());
        assert_eq!(result.last_page(), 1);
        assert_eq!(result.first_item(), None);
        assert_eq!(result.last_item(), None);

        let links = result.links();
        assert_eq!(links.first, "/tickets?page=1");
        assert_eq!(links.last, "/tickets?page=1");
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
    }

    #[test]
    fn test_url_with_existing_query() {
        let request = PageRequest::new(5, 1, "/tickets?status=OPEN").unwrap();
        let result = PaginatedResult::new(vec![1], 10, &request);
        assert_eq!(result.url(2), "/tickets?status=OPEN&page=2");
    }

    #[test]
    fn test_map_keeps_metadata() {
        let result = page(3, 3, 5, 1).map(|i| i.to_string());
        assert_eq!(result.items, vec!["0", "1", "2"]);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.base_path, "/tickets");
    }

    #[test]
    fn test_page_info_deserialize() {
        let info: PageInfo = serde_json::from_value(serde_json::json!({
            "total_count": 17,
            "page": 2,
            "records_per_page": 5
        }))
        .unwrap();
        assert_eq!(info.total_count, 17);
        assert_eq!(info.page, Some(2));
    }
}
