//! Foundry REST client
//!
//! Wraps reqwest and implements the collaborator traits from fc-core.

use async_trait::async_trait;
use fc_core::{
    AuthMethod, Credentials, DatasetFile, DatasetStore, Error, FolderStore, PageFetcher,
    PaginationConfig, Paginator, ResourceDescriptor, ResourceLookup, ResourceType, Result, TransactionType,
    UploadTarget,
};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use url::Url;

use crate::list::ListEndpoint;
use crate::models::{
    CreateDatasetRequest, CreateFolderRequest, CreateTransactionRequest, DatasetDto, FileDto,
    PutSchemaRequest, ResourceDto, SchemaResponse, Space, TokenResponse, TransactionDto,
};

/// Path of the OAuth2 token endpoint, relative to the host
const TOKEN_PATH: [&str; 4] = ["multipass", "api", "oauth2", "token"];

/// Page size used when enumerating everything for a copy
const BULK_PAGE_SIZE: u32 = 1000;

/// Client for one platform host
pub struct FoundryClient {
    http: Client,
    base: Url,
    auth: AuthMethod,
    token: OnceCell<String>,
}

impl FoundryClient {
    /// Create a client from resolved credentials
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("fc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: base_url(&credentials.host)?,
            auth: credentials.auth,
            token: OnceCell::new(),
        })
    }

    /// Host this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `<host>/api/v2/<segments...>`, percent-encoding each segment
    pub fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["api", "v2"];
        all.extend_from_slice(segments);
        join_segments(&self.base, &all)
    }

    /// Files of a dataset branch
    pub fn dataset_files(&self, dataset_rid: &str, branch: &str) -> Result<ListEndpoint<'_, FileDto, DatasetFile>> {
        let mut url = self.api_url(&["datasets", dataset_rid, "files"])?;
        url.query_pairs_mut().append_pair("branchName", branch);
        Ok(ListEndpoint::new(self, "list dataset files", url))
    }

    /// Children of a folder
    pub fn folder_children(&self, folder_rid: &str) -> Result<ListEndpoint<'_, ResourceDto, ResourceDescriptor>> {
        let url = self.api_url(&["filesystem", "folders", folder_rid, "children"])?;
        Ok(ListEndpoint::new(self, "list folder children", url))
    }

    /// Spaces visible to the caller
    pub fn spaces(&self) -> Result<ListEndpoint<'_, Space>> {
        let url = self.api_url(&["filesystem", "spaces"])?;
        Ok(ListEndpoint::new(self, "list spaces", url))
    }

    /// Bearer token, exchanging client credentials on first use
    async fn bearer_token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                match &self.auth {
                    AuthMethod::Token { token } => Ok(token.clone()),
                    AuthMethod::OAuth {
                        client_id,
                        client_secret,
                        scopes,
                    } => self.exchange_client_credentials(client_id, client_secret, scopes).await,
                }
            })
            .await?;
        Ok(token.as_str())
    }

    async fn exchange_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> Result<String> {
        let url = join_segments(&self.base, &TOKEN_PATH)?;
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
        ];
        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        tracing::debug!(url = %url, client_id, "requesting OAuth token");
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Token request failed: {e}")))?;
        let response = check_status(response).await.map_err(|e| match e {
            Error::Auth(msg) | Error::NotFound(msg) => {
                Error::Auth(format!("OAuth token exchange rejected: {msg}"))
            }
            other => other,
        })?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Malformed token response: {e}")))?;
        Ok(token.access_token)
    }

    /// Send an authenticated request and check its status
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.bearer_token().await?;
        let request = request
            .bearer_auth(token)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build request: {e}")))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "request");
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))?;
        check_status(response).await
    }

    /// GET a JSON document
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.request(method, url).json(body)).await?;
        read_json(response).await
    }

    async fn post_empty(&self, url: Url) -> Result<()> {
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn collect_all<F>(&self, fetcher: &F) -> Result<Vec<F::Item>>
    where
        F: PageFetcher,
    {
        collect_complete(fetcher).await
    }
}

/// Fetch every page of a listing, failing rather than returning a partial one
///
/// Copies enumerate with this; a truncated file list would commit an
/// incomplete snapshot.
pub(crate) async fn collect_complete<F: PageFetcher>(fetcher: &F) -> Result<Vec<F::Item>> {
    let config = PaginationConfig::new(Some(BULK_PAGE_SIZE), None, true)?;
    let result = Paginator::new(config).collect(fetcher).await?;
    if result.metadata.has_more {
        return Err(Error::General(format!(
            "{} stopped after {} pages with more data available",
            fetcher.operation(),
            result.metadata.total_pages_fetched
        )));
    }
    Ok(result.data)
}

/// Normalize a configured host into a base URL
///
/// A bare host name is assumed to be HTTPS. Any trailing slash is dropped.
pub fn base_url(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::Config("Host cannot be empty".into()));
    }

    let url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("https://{host}"))?
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Unsupported URL scheme '{}' in host {host}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map an unsuccessful HTTP status to an error
pub fn map_status(status: StatusCode, body: &str) -> Error {
    let detail = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no details").to_string()
    } else {
        body.trim().to_string()
    };

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(detail),
        StatusCode::CONFLICT => Error::Conflict(detail),
        _ => Error::Network(format!("HTTP {}: {detail}", status.as_u16())),
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(map_status(status, &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;

    if text.is_empty() {
        serde_json::from_str("null").map_err(Error::Json)
    } else {
        serde_json::from_str(&text).map_err(Error::Json)
    }
}

#[async_trait]
impl ResourceLookup for FoundryClient {
    async fn get_resource(&self, rid: &str) -> Result<ResourceDescriptor> {
        let url = self.api_url(&["filesystem", "resources", rid])?;
        let resource: ResourceDto = self.get_json(url).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound(format!("resource {rid}")),
            other => other,
        })?;
        Ok(resource.into())
    }
}

#[async_trait]
impl DatasetStore for FoundryClient {
    async fn create_dataset(&self, parent_folder_rid: &str, name: &str) -> Result<ResourceDescriptor> {
        let url = self.api_url(&["datasets"])?;
        let dataset: DatasetDto = self
            .send_json(
                Method::POST,
                url,
                &CreateDatasetRequest {
                    name,
                    parent_folder_rid,
                },
            )
            .await?;
        Ok(ResourceDescriptor::new(dataset.rid, dataset.name, ResourceType::Dataset))
    }

    async fn get_schema(&self, dataset_rid: &str, branch: &str) -> Result<Option<serde_json::Value>> {
        let mut url = self.api_url(&["datasets", dataset_rid, "getSchema"])?;
        url.query_pairs_mut()
            .append_pair("branchName", branch)
            .append_pair("preview", "true");

        match self.get_json::<Option<SchemaResponse>>(url).await {
            Ok(response) => Ok(response.and_then(|r| r.schema)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_schema(&self, dataset_rid: &str, branch: &str, schema: serde_json::Value) -> Result<()> {
        let mut url = self.api_url(&["datasets", dataset_rid, "putSchema"])?;
        url.query_pairs_mut().append_pair("preview", "true");

        let body = PutSchemaRequest {
            branch_name: branch,
            schema,
        };
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    async fn list_files(&self, dataset_rid: &str, branch: &str) -> Result<Vec<DatasetFile>> {
        let endpoint = self.dataset_files(dataset_rid, branch)?;
        self.collect_all(&endpoint).await
    }

    async fn download_file(&self, dataset_rid: &str, branch: &str, path: &str) -> Result<Vec<u8>> {
        let mut url = self.api_url(&["datasets", dataset_rid, "files", path, "content"])?;
        url.query_pairs_mut().append_pair("branchName", branch);

        let response = self.send(self.http.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read file {path}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn upload_file(
        &self,
        dataset_rid: &str,
        path: &str,
        content: Vec<u8>,
        target: UploadTarget,
    ) -> Result<()> {
        let mut url = self.api_url(&["datasets", dataset_rid, "files", path, "upload"])?;
        match &target {
            UploadTarget::Transaction(rid) => {
                url.query_pairs_mut().append_pair("transactionRid", rid);
            }
            UploadTarget::Branch(branch) => {
                url.query_pairs_mut().append_pair("branchName", branch);
            }
        }

        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        let header = HeaderValue::from_str(content_type.essence_str())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

        tracing::debug!(dataset = dataset_rid, path, bytes = content.len(), "uploading file");
        self.send(self.http.post(url).header(CONTENT_TYPE, header).body(content))
            .await?;
        Ok(())
    }

    async fn create_transaction(
        &self,
        dataset_rid: &str,
        branch: &str,
        transaction_type: TransactionType,
    ) -> Result<String> {
        let mut url = self.api_url(&["datasets", dataset_rid, "transactions"])?;
        url.query_pairs_mut().append_pair("branchName", branch);

        let transaction: TransactionDto = self
            .send_json(
                Method::POST,
                url,
                &CreateTransactionRequest {
                    transaction_type: transaction_type.as_str(),
                },
            )
            .await?;
        Ok(transaction.rid)
    }

    async fn commit_transaction(&self, dataset_rid: &str, transaction_rid: &str) -> Result<()> {
        let url = self.api_url(&["datasets", dataset_rid, "transactions", transaction_rid, "commit"])?;
        self.post_empty(url).await
    }

    async fn abort_transaction(&self, dataset_rid: &str, transaction_rid: &str) -> Result<()> {
        let url = self.api_url(&["datasets", dataset_rid, "transactions", transaction_rid, "abort"])?;
        self.post_empty(url).await
    }
}

#[async_trait]
impl FolderStore for FoundryClient {
    async fn create_folder(&self, parent_folder_rid: &str, name: &str) -> Result<ResourceDescriptor> {
        let url = self.api_url(&["filesystem", "folders"])?;
        let folder: ResourceDto = self
            .send_json(
                Method::POST,
                url,
                &CreateFolderRequest {
                    display_name: name,
                    parent_folder_rid,
                },
            )
            .await?;

        let mut descriptor: ResourceDescriptor = folder.into();
        descriptor.resource_type = ResourceType::Folder;
        Ok(descriptor)
    }

    async fn list_children(&self, folder_rid: &str) -> Result<Vec<ResourceDescriptor>> {
        let endpoint = self.folder_children(folder_rid)?;
        self.collect_all(&endpoint).await
    }
}
