//! Alias persistence
//!
//! The store hands the whole ordered mapping to storage after every mutation.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::Alias;
use crate::config::{config_dir, write_private};
use crate::error::{Error, Result};

/// Current alias file schema version
pub const ALIAS_SCHEMA_VERSION: u32 = 1;

/// Backing storage for command aliases
pub trait AliasStorage: Send + Sync {
    /// Load the full ordered alias list
    fn load(&self) -> Result<Vec<Alias>>;

    /// Replace the stored alias list
    fn store(&self, aliases: &[Alias]) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct AliasDocument {
    schema_version: u32,
    #[serde(default)]
    aliases: Vec<Alias>,
}

/// Alias list persisted as TOML, by default at ~/.config/fc/aliases.toml
#[derive(Debug, Clone)]
pub struct AliasFile {
    path: PathBuf,
}

impl AliasFile {
    /// Alias file in the default config directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: config_dir()?.join("aliases.toml"),
        })
    }

    /// Alias file at a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the alias file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl AliasStorage for AliasFile {
    fn load(&self) -> Result<Vec<Alias>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let document: AliasDocument = toml::from_str(&content)?;

        if document.schema_version > ALIAS_SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Alias file version {} is newer than supported version {}. Please upgrade fc.",
                document.schema_version, ALIAS_SCHEMA_VERSION
            )));
        }

        Ok(document.aliases)
    }

    fn store(&self, aliases: &[Alias]) -> Result<()> {
        let document = AliasDocument {
            schema_version: ALIAS_SCHEMA_VERSION,
            aliases: aliases.to_vec(),
        };
        let content = toml::to_string_pretty(&document)?;
        write_private(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), count = aliases.len(), "saved aliases");
        Ok(())
    }
}

/// In-memory alias storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    aliases: Mutex<Vec<Alias>>,
}

impl MemoryStorage {
    /// Storage pre-populated with aliases
    pub fn with_aliases(aliases: Vec<Alias>) -> Self {
        Self {
            aliases: Mutex::new(aliases),
        }
    }

    /// Snapshot of the currently stored aliases
    pub fn snapshot(&self) -> Vec<Alias> {
        self.aliases
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl AliasStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Alias>> {
        Ok(self.snapshot())
    }

    fn store(&self, aliases: &[Alias]) -> Result<()> {
        let mut guard = self
            .aliases
            .lock()
            .map_err(|_| Error::General("alias storage lock poisoned".into()))?;
        *guard = aliases.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = AliasFile::with_path(temp_dir.path().join("aliases.toml"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let file = AliasFile::with_path(temp_dir.path().join("nested").join("aliases.toml"));

        let aliases = vec![
            Alias::new("zz", "space list"),
            Alias::new("aa", "dataset files"),
        ];
        file.store(&aliases).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded, aliases);
    }

    #[test]
    fn test_file_rejects_newer_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aliases.toml");
        std::fs::write(
            &path,
            format!("schema_version = {}\n", ALIAS_SCHEMA_VERSION + 1),
        )
        .unwrap();

        let err = AliasFile::with_path(path).load().unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::default();
        storage.store(&[Alias::new("ds", "dataset files")]).unwrap();
        assert_eq!(storage.load().unwrap(), vec![Alias::new("ds", "dataset files")]);
    }
}
