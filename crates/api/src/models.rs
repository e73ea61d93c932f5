//! Wire types for the platform's v2 REST API

use fc_core::{DatasetFile, ResourceDescriptor, ResourceType};
use serde::{Deserialize, Deserializer, Serialize};

/// One page of any list endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A filesystem resource (dataset, folder, report, ...)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    pub rid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
}

impl From<ResourceDto> for ResourceDescriptor {
    fn from(dto: ResourceDto) -> Self {
        ResourceDescriptor::new(
            dto.rid,
            dto.display_name,
            ResourceType::from_type_name(&dto.resource_type),
        )
    }
}

/// A file in a dataset view
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub transaction_rid: Option<String>,
    #[serde(default, deserialize_with = "size_from_string_or_number")]
    pub size_bytes: Option<u64>,
}

impl From<FileDto> for DatasetFile {
    fn from(dto: FileDto) -> Self {
        DatasetFile::new(dto.path, dto.size_bytes)
    }
}

/// Sizes arrive as JSON strings (64-bit longs) on some endpoints and as numbers on others
fn size_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Option::<Size>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Size::Number(n)) => Ok(Some(n)),
        Some(Size::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// A space, the top-level filesystem container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Space {
    pub rid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDto {
    pub rid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatasetRequest<'a> {
    pub name: &'a str,
    pub parent_folder_rid: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest<'a> {
    pub display_name: &'a str,
    pub parent_folder_rid: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest<'a> {
    pub transaction_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TransactionDto {
    pub rid: String,
}

#[derive(Debug, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutSchemaRequest<'a> {
    pub branch_name: &'a str,
    pub schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
