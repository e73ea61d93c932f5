//! Paged list endpoints
//!
//! Every v2 list endpoint answers `{ "data": [...], "nextPageToken": ... }` and
//! accepts `pageSize` / `pageToken` query parameters, so one fetcher serves
//! them all.

use std::marker::PhantomData;

use async_trait::async_trait;
use fc_core::{Page, PageFetcher, PageRequest, Result};
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::FoundryClient;
use crate::models::ListResponse;

/// Default page size requested from the platform
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A [`PageFetcher`] over one list endpoint
///
/// `W` is the wire item type; items are converted into `T` as pages arrive.
pub struct ListEndpoint<'a, W, T = W> {
    client: &'a FoundryClient,
    operation: String,
    url: Url,
    _items: PhantomData<fn(W) -> T>,
}

impl<'a, W, T> ListEndpoint<'a, W, T> {
    pub(crate) fn new(client: &'a FoundryClient, operation: impl Into<String>, url: Url) -> Self {
        Self {
            client,
            operation: operation.into(),
            url,
            _items: PhantomData,
        }
    }

    /// URL of the first page, without paging parameters
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Append paging parameters to an endpoint URL
pub(crate) fn page_url(base: &Url, request: &PageRequest) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        if let Some(size) = request.page_size {
            query.append_pair("pageSize", &size.to_string());
        }
        if let Some(token) = &request.page_token {
            query.append_pair("pageToken", token);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    url
}

#[async_trait]
impl<W, T> PageFetcher for ListEndpoint<'_, W, T>
where
    W: DeserializeOwned + Send,
    T: From<W> + Send,
{
    type Item = T;

    fn operation(&self) -> &str {
        &self.operation
    }

    fn default_page_size(&self) -> Option<u32> {
        Some(DEFAULT_PAGE_SIZE)
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>> {
        let url = page_url(&self.url, &request);
        let response: ListResponse<W> = self.client.get_json(url).await?;

        Ok(Page {
            items: response.data.into_iter().map(T::from).collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_adds_paging_parameters() {
        let base = Url::parse("https://foundry.example.com/api/v2/datasets/ri.x/files?branchName=master").unwrap();
        let url = page_url(
            &base,
            &PageRequest {
                page_size: Some(25),
                page_token: Some("v1 next".into()),
            },
        );
        assert_eq!(
            url.as_str(),
            "https://foundry.example.com/api/v2/datasets/ri.x/files?branchName=master&pageSize=25&pageToken=v1+next"
        );
    }

    #[test]
    fn test_page_url_without_parameters() {
        let base = Url::parse("https://foundry.example.com/api/v2/filesystem/spaces").unwrap();
        let url = page_url(
            &base,
            &PageRequest {
                page_size: None,
                page_token: None,
            },
        );
        assert_eq!(url.as_str(), "https://foundry.example.com/api/v2/filesystem/spaces");
    }
}
