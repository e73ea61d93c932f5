//! Alias management commands
//!
//! Aliases are shorthands for longer fc command lines, e.g.
//! `fc alias add ll space list --all`. They are expanded before argument
//! parsing, so an alias can stand in for any command and its flags.

use std::path::PathBuf;

use clap::Subcommand;
use fc_core::{Alias, AliasStorage, AliasStore, Error, ImportMode, Result};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Alias subcommands
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Define a new alias
    Add(AddArgs),

    /// Change the command of an existing alias
    Edit(EditArgs),

    /// Remove an alias
    Remove(NameArgs),

    /// List all aliases in definition order
    List,

    /// Show the command an alias is defined as
    Show(NameArgs),

    /// Remove every alias
    Clear,

    /// Write all aliases as a JSON object
    Export(ExportArgs),

    /// Load aliases from a JSON object of name to command
    Import(ImportArgs),

    /// Follow an alias chain to the final command
    Resolve(NameArgs),
}

/// Arguments for the `alias add` command
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Overwrite an existing alias of the same name
    #[arg(short, long)]
    pub force: bool,

    /// Alias name
    pub name: String,

    /// Command the alias expands to, either as one quoted string or as words
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for the `alias edit` command
#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Alias name
    pub name: String,

    /// New command
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Alias name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// JSON file to read
    pub file: PathBuf,

    /// Keep existing aliases instead of replacing them
    #[arg(long)]
    pub merge: bool,
}

#[derive(Serialize)]
struct AliasOperationOutput<'a> {
    success: bool,
    operation: &'a str,
    alias: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
}

#[derive(Serialize)]
struct CountOutput<'a> {
    success: bool,
    operation: &'a str,
    count: usize,
}

/// Execute an alias subcommand
pub fn execute(cmd: AliasCommands, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());

    let mut store = match AliasStore::open(super::reserved_names()) {
        Ok(store) => store,
        Err(e) => return formatter.fail(&e),
    };

    match run(cmd, &mut store, &formatter) {
        Ok(()) => ExitCode::Success,
        Err(e) => formatter.fail(&e),
    }
}

fn run<S: AliasStorage>(
    cmd: AliasCommands,
    store: &mut AliasStore<S>,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        AliasCommands::Add(args) => {
            let command = join_command(&args.command);
            let replaced = if args.force {
                store.set(&args.name, &command)?
            } else {
                store.add(&args.name, &command)?;
                false
            };
            let verb = if replaced { "updated" } else { "added" };
            report(formatter, verb, &args.name, Some(&command));
        }
        AliasCommands::Edit(args) => {
            let command = join_command(&args.command);
            store.edit(&args.name, &command)?;
            report(formatter, "updated", &args.name, Some(&command));
        }
        AliasCommands::Remove(args) => {
            let command = store.remove(&args.name)?;
            report(formatter, "removed", &args.name, Some(&command));
        }
        AliasCommands::List => list(store, formatter),
        AliasCommands::Show(args) => {
            let command = store.get(&args.name)?;
            if formatter.is_json() {
                formatter.json(&Alias::new(&args.name, command));
            } else {
                formatter.println(command);
            }
        }
        AliasCommands::Clear => {
            let count = store.clear()?;
            if formatter.is_json() {
                formatter.json(&CountOutput {
                    success: true,
                    operation: "clear",
                    count,
                });
            } else {
                formatter.success(&format!("Removed {count} alias(es)."));
            }
        }
        AliasCommands::Export(args) => {
            let document = serde_json::to_string_pretty(&to_object(&store.export()))?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, format!("{document}\n"))?;
                    if !formatter.is_json() {
                        formatter.success(&format!(
                            "Exported {} alias(es) to {}.",
                            store.len(),
                            path.display()
                        ));
                    }
                }
                None => println!("{document}"),
            }
        }
        AliasCommands::Import(args) => {
            let content = std::fs::read_to_string(&args.file)?;
            let entries = from_object(&content)?;
            let mode = if args.merge {
                ImportMode::Merge
            } else {
                ImportMode::Replace
            };
            let count = store.import(entries, mode)?;
            if formatter.is_json() {
                formatter.json(&CountOutput {
                    success: true,
                    operation: "import",
                    count,
                });
            } else {
                formatter.success(&format!("Imported {count} alias(es)."));
            }
        }
        AliasCommands::Resolve(args) => {
            // Resolving a non-alias is allowed and echoes the token back.
            let command = store.resolve(&args.name)?;
            if formatter.is_json() {
                formatter.json(&Alias::new(&args.name, &command));
            } else {
                formatter.println(&command);
            }
        }
    }
    Ok(())
}

fn list<S: AliasStorage>(store: &AliasStore<S>, formatter: &Formatter) {
    if formatter.is_json() {
        formatter.json(&store.list());
        return;
    }

    if store.is_empty() {
        formatter.println("No aliases defined.");
        return;
    }

    let rows = store
        .list()
        .iter()
        .map(|alias| vec![alias.name.clone(), alias.command.clone()])
        .collect();
    formatter.table(&["NAME", "COMMAND"], rows);
}

fn report(formatter: &Formatter, operation: &str, name: &str, command: Option<&str>) {
    if formatter.is_json() {
        formatter.json(&AliasOperationOutput {
            success: true,
            operation,
            alias: name,
            command,
        });
    } else {
        formatter.success(&format!("Alias '{name}' {operation}."));
    }
}

/// Build the stored command string from command-line words
///
/// A single word is taken verbatim so `fc alias add ll "space list --all"`
/// works; several words are joined, quoting any that would otherwise split.
fn join_command(words: &[String]) -> String {
    if let [single] = words {
        return single.trim().to_string();
    }

    words
        .iter()
        .map(|word| {
            let needs_quotes = word.is_empty()
                || word
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
            if needs_quotes {
                let escaped = word.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            } else {
                word.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_object(aliases: &[Alias]) -> serde_json::Map<String, serde_json::Value> {
    aliases
        .iter()
        .map(|alias| (alias.name.clone(), serde_json::Value::from(alias.command.clone())))
        .collect()
}

fn from_object(content: &str) -> Result<Vec<Alias>> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
    object
        .into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(command) => Ok(Alias::new(name, command)),
            other => Err(Error::Config(format!(
                "Alias '{name}' must map to a string, found {other}"
            ))),
        })
        .collect()
}
