//! Alias management
//!
//! Aliases are user-defined shorthands that expand to a longer fc command line.
//! The store keeps them in insertion order, validates names against the
//! built-in command names, and refuses any mutation that would make the alias
//! chain cyclic. Every successful mutation writes the full list back to storage.

mod resolver;
mod storage;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use resolver::{check_acyclic, resolve, split_command};
pub use storage::{ALIAS_SCHEMA_VERSION, AliasFile, AliasStorage, MemoryStorage};

/// A named shorthand for a command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Token typed in place of a command
    pub name: String,

    /// Command string the token expands to
    pub command: String,
}

impl Alias {
    /// Create a new alias
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// How imported aliases combine with the existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing aliases; imported entries win on name collision
    Merge,
    /// Drop existing aliases before loading the imported ones
    Replace,
}

/// Ordered alias mapping with write-through persistence
pub struct AliasStore<S: AliasStorage = AliasFile> {
    storage: S,
    aliases: Vec<Alias>,
    reserved: Vec<String>,
}

impl AliasStore<AliasFile> {
    /// Open the alias file in the default config directory
    pub fn open<I, N>(reserved: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::load(AliasFile::new()?, reserved)
    }
}

impl<S: AliasStorage> AliasStore<S> {
    /// Load aliases from storage
    ///
    /// `reserved` lists command names that may not be used as alias names.
    pub fn load<I, N>(storage: S, reserved: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let aliases = storage.load()?;
        Ok(Self {
            storage,
            aliases,
            reserved: reserved.into_iter().map(Into::into).collect(),
        })
    }

    /// Get the command an alias expands to
    pub fn get(&self, name: &str) -> Result<&str> {
        self.aliases
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.command.as_str())
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Check whether an alias exists
    pub fn contains(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.name == name)
    }

    /// All aliases in insertion order
    pub fn list(&self) -> &[Alias] {
        &self.aliases
    }

    /// Number of defined aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no aliases are defined
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Add a new alias
    ///
    /// Fails if the name is taken or if the new alias would close a cycle.
    pub fn add(&mut self, name: &str, command: &str) -> Result<()> {
        self.validate(name, command)?;
        if self.contains(name) {
            return Err(Error::AliasExists(name.to_string()));
        }

        let mut candidate = self.aliases.clone();
        candidate.push(Alias::new(name, command.trim()));
        self.commit(candidate, [name])
    }

    /// Change the command of an existing alias
    pub fn edit(&mut self, name: &str, command: &str) -> Result<()> {
        self.validate(name, command)?;
        let mut candidate = self.aliases.clone();
        let entry = candidate
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))?;
        entry.command = command.trim().to_string();
        self.commit(candidate, [name])
    }

    /// Add an alias or overwrite an existing one
    ///
    /// Returns true when an existing alias was replaced.
    pub fn set(&mut self, name: &str, command: &str) -> Result<bool> {
        if self.contains(name) {
            self.edit(name, command)?;
            Ok(true)
        } else {
            self.add(name, command)?;
            Ok(false)
        }
    }

    /// Remove an alias, returning the command it expanded to
    pub fn remove(&mut self, name: &str) -> Result<String> {
        let index = self
            .aliases
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))?;

        let mut candidate = self.aliases.clone();
        let removed = candidate.remove(index);
        self.commit(candidate, [])?;
        Ok(removed.command)
    }

    /// Remove every alias, returning how many were removed
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.aliases.len();
        self.commit(Vec::new(), [])?;
        Ok(count)
    }

    /// Ordered copy of all aliases
    pub fn export(&self) -> Vec<Alias> {
        self.aliases.clone()
    }

    /// Load a batch of aliases
    ///
    /// All entries are validated and cycle-checked together; on any failure
    /// nothing changes. Returns the number of imported entries.
    pub fn import(&mut self, entries: Vec<Alias>, mode: ImportMode) -> Result<usize> {
        for entry in &entries {
            self.validate(&entry.name, &entry.command)?;
        }

        let mut candidate = match mode {
            ImportMode::Merge => self.aliases.clone(),
            ImportMode::Replace => Vec::new(),
        };

        let mut names = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = Alias::new(entry.name, entry.command.trim());
            names.push(entry.name.clone());
            match candidate.iter_mut().find(|a| a.name == entry.name) {
                Some(existing) => existing.command = entry.command,
                None => candidate.push(entry),
            }
        }

        let count = names.len();
        self.commit(candidate, names.iter().map(String::as_str))?;
        Ok(count)
    }

    /// Resolve a token to the command it stands for
    ///
    /// Tokens that are not aliases are returned unchanged.
    pub fn resolve(&self, token: &str) -> Result<String> {
        resolver::resolve(&self.aliases, token)
    }

    /// Expand an alias in the first position of an argument list
    ///
    /// The resolved command is split into words and spliced in front of the
    /// remaining arguments. Lists whose first argument is not an alias come
    /// back unchanged.
    pub fn expand_args(&self, args: &[String]) -> Result<Vec<String>> {
        let Some((first, rest)) = args.split_first() else {
            return Ok(Vec::new());
        };

        if !self.contains(first) {
            return Ok(args.to_vec());
        }

        let mut expanded = split_command(&self.resolve(first)?)?;
        expanded.extend(rest.iter().cloned());
        Ok(expanded)
    }

    fn validate(&self, name: &str, command: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Config("Alias name cannot be empty".into()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!(
                "Alias name '{name}' cannot contain whitespace"
            )));
        }
        if name.starts_with('-') {
            return Err(Error::Config(format!(
                "Alias name '{name}' cannot start with '-'"
            )));
        }
        if self.reserved.iter().any(|r| r == name) {
            return Err(Error::ReservedAlias(name.to_string()));
        }
        if command.trim().is_empty() {
            return Err(Error::Config(format!(
                "Command for alias '{name}' cannot be empty"
            )));
        }
        Ok(())
    }

    /// Persist a candidate mapping and adopt it
    ///
    /// Chains starting at any of `changed` must be acyclic. A cycle can only
    /// appear through a changed entry, so the rest of the mapping is not
    /// re-checked.
    fn commit<'a>(
        &mut self,
        candidate: Vec<Alias>,
        changed: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        check_acyclic(&candidate, changed)?;
        self.storage.store(&candidate)?;
        self.aliases = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RESERVED: &[&str] = &["alias", "cp", "dataset"];

    fn store() -> AliasStore<MemoryStorage> {
        AliasStore::load(MemoryStorage::default(), RESERVED.iter().copied()).unwrap()
    }

    fn store_with(pairs: &[(&str, &str)]) -> AliasStore<MemoryStorage> {
        let aliases = pairs.iter().map(|(n, c)| Alias::new(*n, *c)).collect();
        AliasStore::load(MemoryStorage::with_aliases(aliases), RESERVED.iter().copied()).unwrap()
    }

    #[test]
    fn test_add_and_resolve() {
        let mut store = store();
        store.add("ds", "dataset get").unwrap();

        assert_eq!(store.resolve("ds").unwrap(), "dataset get");
        assert_eq!(store.resolve("dataset get").unwrap(), "dataset get");
        assert_eq!(store.get("ds").unwrap(), "dataset get");
    }

    #[test]
    fn test_resolve_cycle_from_storage() {
        let store = store_with(&[("a", "b"), ("b", "a")]);
        assert!(matches!(
            store.resolve("a"),
            Err(Error::AliasCycle { .. })
        ));
    }

    #[test]
    fn test_add_target_mentioning_own_name() {
        let mut store = store();
        store.add("x", "y x").unwrap();
        assert_eq!(store.resolve("x").unwrap(), "y x");
    }

    #[test]
    fn test_add_rejects_cycle_without_persisting() {
        let mut store = store_with(&[("a", "b")]);
        let err = store.add("b", "a --json").unwrap_err();

        match err {
            Error::AliasCycle { path } => assert_eq!(path, vec!["b", "a", "b"]),
            other => panic!("expected cycle, got {other:?}"),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.storage.snapshot(), vec![Alias::new("a", "b")]);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut store = store_with(&[("ds", "dataset files")]);
        assert!(matches!(
            store.add("ds", "space list"),
            Err(Error::AliasExists(_))
        ));
    }

    #[test]
    fn test_add_validates_name() {
        let mut store = store();
        assert!(matches!(
            store.add("cp", "dataset files"),
            Err(Error::ReservedAlias(_))
        ));
        assert!(matches!(store.add("", "space list"), Err(Error::Config(_))));
        assert!(matches!(store.add("a b", "space list"), Err(Error::Config(_))));
        assert!(matches!(store.add("--x", "space list"), Err(Error::Config(_))));
        assert!(matches!(store.add("ok", "   "), Err(Error::Config(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_edit_and_set() {
        let mut store = store_with(&[("ds", "dataset files")]);

        store.edit("ds", "dataset files --all").unwrap();
        assert_eq!(store.get("ds").unwrap(), "dataset files --all");

        assert!(matches!(
            store.edit("missing", "space list"),
            Err(Error::AliasNotFound(_))
        ));

        assert!(store.set("ds", "space list").unwrap());
        assert!(!store.set("sp", "space list").unwrap());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_edit_into_cycle_keeps_old_command() {
        let mut store = store_with(&[("a", "b"), ("b", "space list")]);
        assert!(store.edit("b", "a").is_err());
        assert_eq!(store.get("b").unwrap(), "space list");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = store_with(&[("a", "space list"), ("b", "folder children")]);

        assert_eq!(store.remove("a").unwrap(), "space list");
        assert!(matches!(store.remove("a"), Err(Error::AliasNotFound(_))));

        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.is_empty());
        assert!(store.storage.snapshot().is_empty());
    }

    #[test]
    fn test_import_merge_new_entries_win() {
        let mut store = store_with(&[("a", "space list"), ("b", "folder children")]);

        let count = store
            .import(
                vec![Alias::new("b", "dataset files"), Alias::new("c", "a --all")],
                ImportMode::Merge,
            )
            .unwrap();

        assert_eq!(count, 2);
        let names: Vec<_> = store.list().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(store.get("b").unwrap(), "dataset files");
        assert_eq!(store.resolve("c").unwrap(), "space list --all");
    }

    #[test]
    fn test_import_replace_clears_first() {
        let mut store = store_with(&[("a", "space list")]);
        store
            .import(vec![Alias::new("z", "folder children")], ImportMode::Replace)
            .unwrap();

        assert_eq!(store.export(), vec![Alias::new("z", "folder children")]);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut store = store_with(&[("a", "space list")]);

        let result = store.import(
            vec![Alias::new("p", "q"), Alias::new("q", "p")],
            ImportMode::Merge,
        );
        assert!(matches!(result, Err(Error::AliasCycle { .. })));

        let result = store.import(
            vec![Alias::new("ok", "space list"), Alias::new("dataset", "x")],
            ImportMode::Replace,
        );
        assert!(matches!(result, Err(Error::ReservedAlias(_))));

        assert_eq!(store.export(), vec![Alias::new("a", "space list")]);
    }

    #[test]
    fn test_expand_args() {
        let store = store_with(&[("q", "sql run \"select 1\""), ("ls", "q --json")]);
        let args: Vec<String> = ["ls", "--limit", "5"].iter().map(|s| s.to_string()).collect();

        assert_eq!(
            store.expand_args(&args).unwrap(),
            vec!["sql", "run", "select 1", "--json", "--limit", "5"]
        );

        let plain: Vec<String> = vec!["space".into(), "list".into()];
        assert_eq!(store.expand_args(&plain).unwrap(), plain);
        assert!(store.expand_args(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_expand_args_with_quoted_alias_head() {
        let store = store_with(&[("q", r#""ds" --json"#), ("ds", "dataset files")]);
        let args = vec!["q".to_string(), "--all".to_string()];
        assert_eq!(
            store.expand_args(&args).unwrap(),
            vec!["dataset", "files", "--json", "--all"]
        );
    }

    #[test]
    fn test_file_backed_store_writes_through() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aliases.toml");

        let mut store =
            AliasStore::load(AliasFile::with_path(path.clone()), RESERVED.iter().copied())
                .unwrap();
        store.add("ds", "dataset files").unwrap();
        store.add("sp", "space list").unwrap();

        let reopened =
            AliasStore::load(AliasFile::with_path(path), RESERVED.iter().copied()).unwrap();
        assert_eq!(reopened.export(), store.export());
    }
}
