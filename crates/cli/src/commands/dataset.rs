//! dataset commands
//!
//! Listing files, plus single-file download and upload. Uploads here go
//! straight to a branch, without a transaction.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use fc_core::{DatasetFile, DatasetStore as _, Error, Rid, UploadTarget};
use serde::Serialize;

use super::{Context, PaginationArgs, list};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// List the files of a dataset branch
    Files(FilesArgs),

    /// Download one file from a dataset
    Download(DownloadArgs),

    /// Upload a local file into a dataset branch
    Upload(UploadArgs),
}

#[derive(clap::Args, Debug)]
pub struct FilesArgs {
    /// Dataset RID
    pub rid: String,

    /// Branch to list
    #[arg(long, default_value = "master")]
    pub branch: String,

    #[command(flatten)]
    pub pagination: PaginationArgs,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Dataset RID
    pub rid: String,

    /// File path inside the dataset
    pub path: String,

    /// Branch to read
    #[arg(long, default_value = "master")]
    pub branch: String,

    /// Local destination (defaults to the file name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// Dataset RID
    pub rid: String,

    /// Local file to upload
    pub file: PathBuf,

    /// Path inside the dataset (defaults to the local file name)
    #[arg(long)]
    pub path: Option<String>,

    /// Branch to write
    #[arg(long, default_value = "master")]
    pub branch: String,
}

#[derive(Debug, Serialize)]
struct TransferOutput {
    status: &'static str,
    dataset: String,
    path: String,
    local: String,
    size_bytes: u64,
    size_human: String,
}

pub async fn execute(cmd: DatasetCommands, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());

    let rid = match &cmd {
        DatasetCommands::Files(args) => &args.rid,
        DatasetCommands::Download(args) => &args.rid,
        DatasetCommands::Upload(args) => &args.rid,
    };
    if let Err(e) = Rid::parse(rid) {
        return formatter.fail(&e);
    }

    let client = match ctx.connect() {
        Ok(client) => client,
        Err(e) => return formatter.fail(&e),
    };

    let result = match cmd {
        DatasetCommands::Files(args) => {
            let endpoint = match client.dataset_files(&args.rid, &args.branch) {
                Ok(endpoint) => endpoint,
                Err(e) => return formatter.fail(&e),
            };
            return list::run(
                &endpoint,
                &args.pagination,
                &formatter,
                &["PATH", "SIZE"],
                file_row,
            )
            .await;
        }
        DatasetCommands::Download(args) => download(&client, args).await,
        DatasetCommands::Upload(args) => upload(&client, args).await,
    };

    match result {
        Ok(output) => {
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                let verb = if output.status == "downloaded" {
                    format!("{} -> {}", output.path, output.local)
                } else {
                    format!("{} -> {}", output.local, output.path)
                };
                formatter.success(&format!("{verb} ({})", output.size_human));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&e),
    }
}

async fn download(client: &fc_api::FoundryClient, args: DownloadArgs) -> Result<TransferOutput, Error> {
    let local = args
        .output
        .unwrap_or_else(|| PathBuf::from(file_name(&args.path)));

    let content = client
        .download_file(&args.rid, &args.branch, &args.path)
        .await?;
    if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&local, &content)?;

    Ok(transfer_output("downloaded", &args.rid, &args.path, &local, content.len()))
}

async fn upload(client: &fc_api::FoundryClient, args: UploadArgs) -> Result<TransferOutput, Error> {
    let content = std::fs::read(&args.file)?;
    let size = content.len();
    let path = match args.path {
        Some(path) => path,
        None => args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::General(format!("{} has no file name", args.file.display())))?,
    };

    client
        .upload_file(&args.rid, &path, content, UploadTarget::Branch(args.branch))
        .await?;

    Ok(transfer_output("uploaded", &args.rid, &path, &args.file, size))
}

fn transfer_output(status: &'static str, rid: &str, path: &str, local: &Path, size: usize) -> TransferOutput {
    TransferOutput {
        status,
        dataset: rid.to_string(),
        path: path.to_string(),
        local: local.display().to_string(),
        size_bytes: size as u64,
        size_human: humansize::format_size(size as u64, humansize::BINARY),
    }
}

/// Last segment of a dataset path
fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
}

fn file_row(file: &DatasetFile) -> Vec<String> {
    vec![
        file.path.clone(),
        file.size_human.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("spark/part-0.parquet"), "part-0.parquet");
        assert_eq!(file_name("a.csv"), "a.csv");
        assert_eq!(file_name("/"), "download");
    }

    #[test]
    fn test_file_row_without_size() {
        let row = file_row(&DatasetFile::new("a.csv", None));
        assert_eq!(row, vec!["a.csv".to_string(), "-".to_string()]);
    }
}
