//! Collaborator capabilities consumed by the core
//!
//! These traits decouple the copy orchestrator from the HTTP client so it can
//! be exercised against mocks. The remote adapter crate provides the real
//! implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a platform resource, as far as copying is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceType {
    Dataset,
    Folder,
    /// Any other resource type, keeping the platform's name for it
    Other(String),
}

impl ResourceType {
    /// Classify a platform type name, ignoring case
    pub fn from_type_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "foundry_dataset" | "dataset" => ResourceType::Dataset,
            "folder" | "compass_folder" => ResourceType::Folder,
            _ => ResourceType::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Dataset => "DATASET",
            ResourceType::Folder => "FOLDER",
            ResourceType::Other(name) => name,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ResourceType::from_type_name(&name))
    }
}

/// Identity and type of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub rid: String,
    pub display_name: String,
    pub resource_type: ResourceType,
}

impl ResourceDescriptor {
    pub fn new(
        rid: impl Into<String>,
        display_name: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            rid: rid.into(),
            display_name: display_name.into(),
            resource_type,
        }
    }

    /// Display name, falling back to the RID when the platform gave none
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.rid
        } else {
            &self.display_name
        }
    }
}

/// A file inside a dataset view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFile {
    /// Logical path within the dataset
    pub path: String,

    /// Size in bytes, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
}

impl DatasetFile {
    pub fn new(path: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            size_human: size_bytes.map(|s| humansize::format_size(s, humansize::BINARY)),
        }
    }
}

/// Transaction kinds used when writing datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Replaces the dataset view with the transaction's files
    Snapshot,
    /// Adds files on top of the current view
    Append,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Snapshot => "SNAPSHOT",
            TransactionType::Append => "APPEND",
        }
    }
}

/// Where an uploaded file lands
///
/// A transaction already pins its branch, so the two are never sent together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    Transaction(String),
    Branch(String),
}

/// Look up resources by RID
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Fetch the descriptor of a resource; unknown RIDs are `NotFound`
    async fn get_resource(&self, rid: &str) -> Result<ResourceDescriptor>;
}

/// Dataset operations needed to duplicate a dataset
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Create an empty dataset in a folder
    async fn create_dataset(&self, parent_folder_rid: &str, name: &str) -> Result<ResourceDescriptor>;

    /// Schema on a branch, `None` when the dataset has none
    async fn get_schema(&self, dataset_rid: &str, branch: &str) -> Result<Option<serde_json::Value>>;

    /// Replace the schema on a branch
    async fn put_schema(&self, dataset_rid: &str, branch: &str, schema: serde_json::Value) -> Result<()>;

    /// All files in the current view of a branch
    async fn list_files(&self, dataset_rid: &str, branch: &str) -> Result<Vec<DatasetFile>>;

    /// Read a file's content
    async fn download_file(&self, dataset_rid: &str, branch: &str, path: &str) -> Result<Vec<u8>>;

    /// Write a file
    async fn upload_file(
        &self,
        dataset_rid: &str,
        path: &str,
        content: Vec<u8>,
        target: UploadTarget,
    ) -> Result<()>;

    /// Open a transaction, returning its RID
    async fn create_transaction(
        &self,
        dataset_rid: &str,
        branch: &str,
        transaction_type: TransactionType,
    ) -> Result<String>;

    async fn commit_transaction(&self, dataset_rid: &str, transaction_rid: &str) -> Result<()>;

    async fn abort_transaction(&self, dataset_rid: &str, transaction_rid: &str) -> Result<()>;
}

/// Folder operations needed to duplicate a folder tree
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Create a folder inside a parent folder
    async fn create_folder(&self, parent_folder_rid: &str, name: &str) -> Result<ResourceDescriptor>;

    /// Direct children of a folder
    async fn list_children(&self, folder_rid: &str) -> Result<Vec<ResourceDescriptor>>;
}
