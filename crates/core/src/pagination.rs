//! Generic pagination engine
//!
//! Every list command drives a [`PageFetcher`] through the [`Paginator`]. The
//! fetcher knows how to ask one endpoint for one page; the paginator owns the
//! continuation token, the page count and the stopping rules, so all list
//! commands report the same metadata.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Error, Result};

/// Hard upper bound on pages fetched in one run, even with `fetch_all`
pub const MAX_PAGES_SAFETY_LIMIT: usize = 10_000;

/// Paging knobs for one list invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationConfig {
    page_size: Option<u32>,
    max_pages: Option<usize>,
    fetch_all: bool,
    page_token: Option<String>,
}

impl PaginationConfig {
    /// Build a validated configuration
    ///
    /// A zero `page_size` or `max_pages` is rejected.
    pub fn new(page_size: Option<u32>, max_pages: Option<usize>, fetch_all: bool) -> Result<Self> {
        if page_size == Some(0) {
            return Err(Error::Config("page_size must be a positive integer".into()));
        }
        if max_pages == Some(0) {
            return Err(Error::Config("max_pages must be a positive integer".into()));
        }
        Ok(Self {
            page_size,
            max_pages,
            fetch_all,
            page_token: None,
        })
    }

    /// Resume from a continuation token returned by an earlier run
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.page_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    pub fn fetch_all(&self) -> bool {
        self.fetch_all
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    /// Page limit actually applied; `None` means fetch until exhausted
    ///
    /// `fetch_all` takes precedence over any `max_pages`.
    pub fn effective_max_pages(&self) -> Option<usize> {
        if self.fetch_all {
            None
        } else {
            self.max_pages
        }
    }

    /// Whether a run may span enough pages to deserve a progress indicator
    pub fn should_show_progress(&self) -> bool {
        self.effective_max_pages().is_none_or(|max| max > 1)
    }
}

/// Request for a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

/// One page returned by a fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Final page
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    /// Page followed by more data behind `token`
    pub fn more(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: Some(token.into()),
        }
    }

    /// Whether the endpoint reported more data
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// A stateless source of pages for one list endpoint
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Item type produced by the endpoint
    type Item: Send;

    /// Human readable operation name used in error context, e.g. "list spaces"
    fn operation(&self) -> &str;

    /// Page size to request when the configuration does not set one
    fn default_page_size(&self) -> Option<u32> {
        None
    }

    /// Fetch one page
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Item>>;
}

/// Summary of a pagination run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMetadata {
    /// Number of the last page fetched (1-based)
    pub page: usize,
    /// Items returned across all fetched pages
    #[serde(rename = "items_count")]
    pub items_fetched: usize,
    pub has_more: bool,
    pub total_pages_fetched: usize,
    /// Token to resume from when `has_more` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Items plus metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationResult<T> {
    pub data: Vec<T>,
    #[serde(rename = "pagination")]
    pub metadata: PaginationMetadata,
}

/// Drives a fetcher according to a [`PaginationConfig`]
#[derive(Debug, Clone)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Collect pages until a stopping condition is met
    pub async fn collect<F: PageFetcher>(&self, fetcher: &F) -> Result<PaginationResult<F::Item>> {
        self.collect_with_progress(fetcher, |_, _| {}).await
    }

    /// Collect pages, reporting `(pages_fetched, items_fetched)` after each page
    ///
    /// A fetch failure is wrapped with the operation name and page number and
    /// returned; items gathered before the failure are dropped.
    pub async fn collect_with_progress<F, P>(
        &self,
        fetcher: &F,
        mut progress: P,
    ) -> Result<PaginationResult<F::Item>>
    where
        F: PageFetcher,
        P: FnMut(usize, usize),
    {
        let page_size = self.config.page_size.or_else(|| fetcher.default_page_size());
        let max_pages = self.config.effective_max_pages();

        let mut data = Vec::new();
        let mut pages_fetched = 0usize;
        let mut page_token = self.config.page_token.clone();

        loop {
            let request = PageRequest {
                page_size,
                page_token: page_token.take(),
            };
            let page_number = pages_fetched + 1;

            let page = fetcher.fetch_page(request).await.map_err(|e| {
                Error::upstream(fetcher.operation(), format!("page {page_number}"), e)
            })?;

            pages_fetched = page_number;
            let has_more = page.has_more();
            tracing::debug!(
                operation = fetcher.operation(),
                page = pages_fetched,
                items = page.items.len(),
                has_more,
                "fetched page"
            );

            data.extend(page.items);
            page_token = page.next_page_token;
            progress(pages_fetched, data.len());

            if !has_more {
                break;
            }
            if max_pages.is_some_and(|max| pages_fetched >= max) {
                break;
            }
            if pages_fetched >= MAX_PAGES_SAFETY_LIMIT {
                tracing::warn!(
                    operation = fetcher.operation(),
                    limit = MAX_PAGES_SAFETY_LIMIT,
                    "stopped at page safety limit; more data is available"
                );
                break;
            }
        }

        Ok(PaginationResult {
            metadata: PaginationMetadata {
                page: pages_fetched,
                items_fetched: data.len(),
                has_more: page_token.is_some(),
                total_pages_fetched: pages_fetched,
                next_page_token: page_token,
            },
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves numbered pages of `per_page` items; `pages = None` never ends
    struct NumberFetcher {
        per_page: usize,
        pages: Option<usize>,
        fail_on: Option<usize>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl NumberFetcher {
        fn new(per_page: usize, pages: Option<usize>) -> Self {
            Self {
                per_page,
                pages,
                fail_on: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for NumberFetcher {
        type Item = usize;

        fn operation(&self) -> &str {
            "list numbers"
        }

        fn default_page_size(&self) -> Option<u32> {
            Some(50)
        }

        async fn fetch_page(&self, request: PageRequest) -> Result<Page<usize>> {
            self.requests.lock().unwrap().push(request.clone());
            let index: usize = request
                .page_token
                .as_deref()
                .map(|t| t.parse().unwrap())
                .unwrap_or(0);

            if self.fail_on == Some(index + 1) {
                return Err(Error::Network("connection reset".into()));
            }

            let items = (index * self.per_page..(index + 1) * self.per_page).collect();
            match self.pages {
                Some(total) if index + 1 >= total => Ok(Page::last(items)),
                _ => Ok(Page::more(items, (index + 1).to_string())),
            }
        }
    }

    #[test]
    fn test_config_rejects_zero_values() {
        assert!(matches!(
            PaginationConfig::new(Some(0), None, false),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PaginationConfig::new(None, Some(0), true),
            Err(Error::Config(_))
        ));
        assert!(PaginationConfig::new(Some(10), Some(2), false).is_ok());
    }

    #[test]
    fn test_effective_max_pages() {
        let bounded = PaginationConfig::new(None, Some(3), false).unwrap();
        assert_eq!(bounded.effective_max_pages(), Some(3));
        assert!(bounded.should_show_progress());

        let all = PaginationConfig::new(None, Some(3), true).unwrap();
        assert_eq!(all.effective_max_pages(), None);
        assert!(all.should_show_progress());

        let single = PaginationConfig::new(None, Some(1), false).unwrap();
        assert!(!single.should_show_progress());
    }

    #[tokio::test]
    async fn test_bounded_fetch_stops_at_max_pages() {
        for max in [1, 2, 5] {
            let fetcher = NumberFetcher::new(3, None);
            let config = PaginationConfig::new(Some(3), Some(max), false).unwrap();

            let result = Paginator::new(config).collect(&fetcher).await.unwrap();

            assert_eq!(fetcher.requests().len(), max);
            assert_eq!(result.metadata.total_pages_fetched, max);
            assert_eq!(result.metadata.items_fetched, max * 3);
            assert!(result.metadata.has_more);
            assert_eq!(result.metadata.next_page_token, Some(max.to_string()));
        }
    }

    #[tokio::test]
    async fn test_fetch_all_runs_to_exhaustion() {
        let fetcher = NumberFetcher::new(2, Some(7));
        let config = PaginationConfig::new(None, Some(2), true).unwrap();

        let result = Paginator::new(config).collect(&fetcher).await.unwrap();

        assert_eq!(result.metadata.total_pages_fetched, 7);
        assert!(!result.metadata.has_more);
        assert_eq!(result.data, (0..14).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_exhaustion_before_max_pages() {
        let fetcher = NumberFetcher::new(4, Some(2));
        let config = PaginationConfig::new(None, Some(10), false).unwrap();

        let result = Paginator::new(config).collect(&fetcher).await.unwrap();
        assert_eq!(result.metadata.total_pages_fetched, 2);
        assert!(!result.metadata.has_more);
        assert!(result.metadata.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let fetcher = NumberFetcher::new(0, Some(1));
        let result = Paginator::new(PaginationConfig::default())
            .collect(&fetcher)
            .await
            .unwrap();

        assert!(result.data.is_empty());
        assert_eq!(result.metadata.items_fetched, 0);
        assert!(!result.metadata.has_more);
        assert_eq!(result.metadata.total_pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_page_size_and_token_passed_through() {
        let fetcher = NumberFetcher::new(1, Some(5));
        let config = PaginationConfig::new(None, Some(2), false)
            .unwrap()
            .with_page_token("2");

        let result = Paginator::new(config).collect(&fetcher).await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests[0].page_size, Some(50));
        assert_eq!(requests[0].page_token.as_deref(), Some("2"));
        assert_eq!(requests[1].page_token.as_deref(), Some("3"));
        assert_eq!(result.data, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_wrapped_without_partial_data() {
        let mut fetcher = NumberFetcher::new(2, None);
        fetcher.fail_on = Some(3);
        let config = PaginationConfig::new(None, None, true).unwrap();

        let err = Paginator::new(config).collect(&fetcher).await.unwrap_err();

        match &err {
            Error::Upstream {
                operation, target, ..
            } => {
                assert_eq!(operation, "list numbers");
                assert_eq!(target, "page 3");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_progress_callback() {
        let fetcher = NumberFetcher::new(2, Some(3));
        let mut seen = Vec::new();

        Paginator::new(PaginationConfig::new(None, None, true).unwrap())
            .collect_with_progress(&fetcher, |pages, items| seen.push((pages, items)))
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 4), (3, 6)]);
    }

    #[test]
    fn test_metadata_json_shape() {
        let result = PaginationResult {
            data: vec!["a", "b"],
            metadata: PaginationMetadata {
                page: 1,
                items_fetched: 2,
                has_more: true,
                total_pages_fetched: 1,
                next_page_token: Some("t1".into()),
            },
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "data": ["a", "b"],
                "pagination": {
                    "page": 1,
                    "items_count": 2,
                    "has_more": true,
                    "total_pages_fetched": 1,
                    "next_page_token": "t1"
                }
            })
        );
    }
}
