//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations, the shared
//! pagination flags, and the alias expansion that runs before argument parsing.

use clap::{CommandFactory, Parser, Subcommand};
use fc_api::FoundryClient;
use fc_core::{AliasStore, ConfigManager, PaginationConfig, ProfileManager, Result};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod alias;
mod completions;
pub mod cp;
mod dataset;
mod folder;
mod list;
mod profile;
mod space;

/// fc - Foundry platform CLI client
///
/// Lists, copies and manages resources on a Foundry platform host.
#[derive(Parser, Debug)]
#[command(name = "fc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Credential profile to use instead of the default one
    #[arg(long, global = true, env = "FC_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage command aliases
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// Manage credential profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Copy a dataset or folder into another folder
    Cp(cp::CpArgs),

    /// Work with datasets
    #[command(subcommand)]
    Dataset(dataset::DatasetCommands),

    /// Work with folders
    #[command(subcommand)]
    Folder(folder::FolderCommands),

    /// Work with spaces
    #[command(subcommand)]
    Space(space::SpaceCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Global options every command receives
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputConfig,
    pub profile: Option<String>,
}

impl Context {
    /// Resolve credentials and build an API client
    pub fn connect(&self) -> Result<FoundryClient> {
        let credentials = ProfileManager::new()?.resolve(self.profile.as_deref())?;
        tracing::debug!(host = %credentials.host, source = ?credentials.source, "using credentials");
        FoundryClient::new(credentials)
    }
}

/// Paging flags shared by list commands
#[derive(clap::Args, Debug, Clone)]
pub struct PaginationArgs {
    /// Items per page (defaults to the configured page size or the endpoint's own)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Maximum number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub max_pages: usize,

    /// Fetch every page, ignoring --max-pages
    #[arg(long)]
    pub all: bool,

    /// Resume from a page token printed by an earlier run
    #[arg(long)]
    pub page_token: Option<String>,
}

impl PaginationArgs {
    /// Build a validated configuration, falling back to the configured page size
    pub fn to_config(&self, configured_page_size: Option<u32>) -> Result<PaginationConfig> {
        let page_size = self.page_size.or(configured_page_size);
        let config = PaginationConfig::new(page_size, Some(self.max_pages), self.all)?;
        Ok(match &self.page_token {
            Some(token) => config.with_page_token(token.clone()),
            None => config,
        })
    }
}

/// Page size from the config file, if any
pub(crate) fn configured_page_size() -> Option<u32> {
    ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.defaults.page_size)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read configuration");
            None
        })
}

/// Names that can never be used as aliases
pub fn reserved_names() -> Vec<String> {
    let mut names: Vec<String> = Cli::command()
        .get_subcommands()
        .map(|cmd| cmd.get_name().to_string())
        .collect();
    names.push("help".to_string());
    names
}

/// Index of the command word in `args` (program name at index 0)
///
/// Global flags may precede the command; `--profile` consumes a value.
pub fn command_position(args: &[String]) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let arg = args[index].as_str();
        match arg {
            "--" => return (index + 1 < args.len()).then_some(index + 1),
            "--profile" => index += 2,
            a if a.starts_with('-') => index += 1,
            _ => return Some(index),
        }
    }
    None
}

/// Expand a user alias in the command position
///
/// The alias file is only read when the command word is not a built-in.
pub fn expand_aliases(args: Vec<String>) -> Result<Vec<String>> {
    let Some(position) = command_position(&args) else {
        return Ok(args);
    };

    let reserved = reserved_names();
    if reserved.iter().any(|name| *name == args[position]) {
        return Ok(args);
    }

    let store = AliasStore::open(reserved)?;
    let expanded = store.expand_args(&args[position..])?;

    let mut result = args[..position].to_vec();
    result.extend(expanded);
    Ok(result)
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let ctx = Context {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color,
            no_progress: cli.no_progress,
            quiet: cli.quiet,
        },
        profile: cli.profile,
    };

    match cli.command {
        Commands::Alias(cmd) => alias::execute(cmd, &ctx),
        Commands::Profile(cmd) => profile::execute(cmd, &ctx),
        Commands::Cp(args) => cp::execute(args, &ctx).await,
        Commands::Dataset(cmd) => dataset::execute(cmd, &ctx).await,
        Commands::Folder(cmd) => folder::execute(cmd, &ctx).await,
        Commands::Space(cmd) => space::execute(cmd, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}
