//! fc-core: Core library for the fc Foundry CLI client
//!
//! This crate provides the core functionality for the fc CLI, including:
//! - Configuration and credential profile management
//! - Command aliases with cycle detection
//! - The generic pagination engine behind every list command
//! - The resource copy orchestrator
//!
//! Nothing here speaks HTTP or writes to the console. Remote operations are
//! reached through the traits in [`traits`] and [`pagination::PageFetcher`].

pub mod alias;
pub mod config;
pub mod copy;
pub mod error;
pub mod pagination;
pub mod profile;
pub mod rid;
pub mod traits;

pub use alias::{Alias, AliasFile, AliasStorage, AliasStore, ImportMode};
pub use config::{Config, ConfigManager};
pub use copy::{CopyOptions, CopyOrchestrator, CopySummary};
pub use error::{Error, Result};
pub use pagination::{
    Page, PageFetcher, PageRequest, PaginationConfig, PaginationMetadata, PaginationResult,
    Paginator,
};
pub use profile::{AuthMethod, CredentialSource, Credentials, Profile, ProfileManager};
pub use rid::Rid;
pub use traits::{
    DatasetFile, DatasetStore, FolderStore, ResourceDescriptor, ResourceLookup, ResourceType,
    TransactionType, UploadTarget,
};
