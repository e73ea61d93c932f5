//! cp command - Copy datasets and folders
//!
//! Copies a dataset, or with `--recursive` a whole folder tree, into a
//! destination folder. Copies get the source name plus a suffix.

use clap::Args;
use fc_core::{CopyOptions, CopyOrchestrator, CopySummary, Rid};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

/// Copy a dataset or folder into another folder
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source dataset or folder RID
    pub source: String,

    /// Destination folder RID
    pub target: String,

    /// Copy folders and everything below them
    #[arg(short, long)]
    pub recursive: bool,

    /// Report what would be copied without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Branch to read from and write to
    #[arg(long, default_value = "master")]
    pub branch: String,

    /// Suffix appended to copied resource names
    #[arg(long, default_value = "-copy")]
    pub name_suffix: String,

    /// Do not copy dataset schemas
    #[arg(long)]
    pub no_schema: bool,

    /// Stop at the first failing child instead of continuing
    #[arg(long)]
    pub fail_fast: bool,
}

impl CpArgs {
    fn options(&self) -> CopyOptions {
        CopyOptions {
            branch: self.branch.clone(),
            name_suffix: self.name_suffix.clone(),
            copy_schema: !self.no_schema,
            fail_fast: self.fail_fast,
        }
    }
}

#[derive(Serialize)]
struct CpOutput<'a> {
    source: &'a str,
    target: &'a str,
    dry_run: bool,
    summary: &'a CopySummary,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());

    for rid in [&args.source, &args.target] {
        if let Err(e) = Rid::parse(rid) {
            return formatter.fail(&e);
        }
    }

    let client = match ctx.connect() {
        Ok(client) => client,
        Err(e) => return formatter.fail(&e),
    };

    let orchestrator = CopyOrchestrator::new(&client, &client, &client, args.options());

    let spinner = Spinner::start(
        formatter.config(),
        &format!("Copying {} to {}", args.source, args.target),
    );
    let result = orchestrator
        .copy_resource(&args.source, &args.target, args.recursive, args.dry_run)
        .await;
    spinner.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return formatter.fail(&e),
    };

    if formatter.is_json() {
        formatter.json(&CpOutput {
            source: &args.source,
            target: &args.target,
            dry_run: args.dry_run,
            summary: &summary,
        });
    } else {
        print_summary(&formatter, &summary, args.dry_run);
    }

    match summary.partial_failure() {
        Some(e) => formatter.fail(&e),
        None => ExitCode::Success,
    }
}

fn print_summary(formatter: &Formatter, summary: &CopySummary, dry_run: bool) {
    let prefix = if dry_run { "Would copy" } else { "Copied" };
    formatter.success(&format!(
        "{prefix} {} dataset(s), {} folder(s), {} file(s) ({})",
        summary.datasets_copied,
        summary.folders_copied,
        summary.files_copied,
        humansize::format_size(summary.bytes_copied, humansize::BINARY),
    ));
    if summary.skipped > 0 {
        formatter.warning(&format!("Skipped {} item(s)", summary.skipped));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CpArgs,
    }

    #[test]
    fn test_defaults_map_to_copy_options() {
        let harness = Harness::parse_from(["cp", "ri.a.b.dataset.1", "ri.a.b.folder.2"]);
        assert_eq!(harness.args.options(), CopyOptions::default());
        assert!(!harness.args.recursive);
    }

    #[test]
    fn test_flags_map_to_copy_options() {
        let harness = Harness::parse_from([
            "cp",
            "-r",
            "--no-schema",
            "--fail-fast",
            "--branch",
            "develop",
            "--name-suffix",
            "_bak",
            "ri.a.b.folder.1",
            "ri.a.b.folder.2",
        ]);
        let options = harness.args.options();
        assert!(harness.args.recursive);
        assert_eq!(options.branch, "develop");
        assert_eq!(options.name_suffix, "_bak");
        assert!(!options.copy_schema);
        assert!(options.fail_fast);
    }
}
