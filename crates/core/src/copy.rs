//! Resource copy orchestration
//!
//! Duplicates a dataset, or a folder tree, into a destination folder. Dataset
//! files are transferred one at a time into a single snapshot transaction that
//! is committed once every file has been attempted. Failures of individual
//! files or folder children are counted in the summary and do not stop their
//! siblings.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::traits::{
    DatasetStore, FolderStore, ResourceDescriptor, ResourceLookup, ResourceType, TransactionType,
    UploadTarget,
};

/// Destination placeholder used while walking a folder in dry-run mode
const DRY_RUN_FOLDER: &str = "<dry-run>";

/// Knobs for a copy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Branch read from the source and written on the copy
    pub branch: String,
    /// Appended to copied resource names
    pub name_suffix: String,
    /// Copy the dataset schema along with the files
    pub copy_schema: bool,
    /// Stop at the first failing folder child
    pub fail_fast: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            name_suffix: "-copy".to_string(),
            copy_schema: true,
            fail_fast: false,
        }
    }
}

/// Counters describing what a copy run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopySummary {
    pub datasets_copied: usize,
    pub folders_copied: usize,
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub skipped: usize,
    pub errors: usize,
}

impl CopySummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// The run as a `PartialFailure` error, when anything failed
    pub fn partial_failure(&self) -> Option<Error> {
        self.has_errors().then(|| Error::PartialFailure {
            errors: self.errors,
        })
    }
}

/// State of one top-level copy invocation
#[derive(Debug)]
pub struct CopyJob {
    pub source_rid: String,
    pub destination_folder_rid: String,
    pub recursive: bool,
    pub dry_run: bool,
    pub summary: CopySummary,
}

impl CopyJob {
    fn new(source_rid: &str, destination_folder_rid: &str, recursive: bool, dry_run: bool) -> Self {
        Self {
            source_rid: source_rid.to_string(),
            destination_folder_rid: destination_folder_rid.to_string(),
            recursive,
            dry_run,
            summary: CopySummary::default(),
        }
    }
}

/// Copies datasets and folders through the collaborator traits
pub struct CopyOrchestrator<'a> {
    resources: &'a dyn ResourceLookup,
    datasets: &'a dyn DatasetStore,
    folders: &'a dyn FolderStore,
    options: CopyOptions,
}

impl<'a> CopyOrchestrator<'a> {
    pub fn new(
        resources: &'a dyn ResourceLookup,
        datasets: &'a dyn DatasetStore,
        folders: &'a dyn FolderStore,
        options: CopyOptions,
    ) -> Self {
        Self {
            resources,
            datasets,
            folders,
            options,
        }
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Copy a dataset or folder into `destination_folder_rid`
    ///
    /// Folders require `recursive`. In dry-run mode nothing is created or
    /// transferred; the summary reports what would have been copied.
    pub async fn copy_resource(
        &self,
        source_rid: &str,
        destination_folder_rid: &str,
        recursive: bool,
        dry_run: bool,
    ) -> Result<CopySummary> {
        let mut job = CopyJob::new(source_rid, destination_folder_rid, recursive, dry_run);

        let source = self
            .resources
            .get_resource(source_rid)
            .await
            .map_err(|e| match e {
                Error::NotFound(_) | Error::InvalidRid(_) => e,
                other => Error::upstream("get resource", source_rid, other),
            })?;

        match &source.resource_type {
            ResourceType::Dataset => {
                tracing::info!(
                    source = %source.rid,
                    destination = destination_folder_rid,
                    name = source.name(),
                    "copying dataset"
                );
                self.copy_dataset(&source, destination_folder_rid, &mut job)
                    .await?;
            }
            ResourceType::Folder => {
                if !job.recursive {
                    return Err(Error::RecursiveRequired(source.rid));
                }
                tracing::info!(
                    source = %source.rid,
                    destination = destination_folder_rid,
                    name = source.name(),
                    "copying folder"
                );
                self.copy_folder(&source, destination_folder_rid, &mut job)
                    .await?;
            }
            ResourceType::Other(kind) => {
                return Err(unsupported(&source.rid, kind));
            }
        }

        tracing::info!(
            datasets = job.summary.datasets_copied,
            folders = job.summary.folders_copied,
            files = job.summary.files_copied,
            skipped = job.summary.skipped,
            errors = job.summary.errors,
            "copy finished"
        );
        Ok(job.summary)
    }

    async fn copy_dataset(
        &self,
        source: &ResourceDescriptor,
        destination: &str,
        job: &mut CopyJob,
    ) -> Result<()> {
        let new_name = derive_name(source.name(), &self.options.name_suffix);

        if job.dry_run {
            tracing::info!(
                source = %source.rid,
                destination,
                name = %new_name,
                "[dry-run] would copy dataset"
            );
            job.summary.datasets_copied += 1;
            return Ok(());
        }

        let created = self
            .datasets
            .create_dataset(destination, &new_name)
            .await
            .map_err(|e| Error::upstream("create dataset", destination, e))?;
        tracing::info!(rid = %created.rid, name = %new_name, "created dataset");

        if self.options.copy_schema {
            self.copy_schema(&source.rid, &created.rid).await;
        }

        self.copy_files(&source.rid, &created.rid, job).await?;
        job.summary.datasets_copied += 1;
        Ok(())
    }

    /// Schema problems never fail the dataset copy
    async fn copy_schema(&self, source_rid: &str, target_rid: &str) {
        let branch = &self.options.branch;
        let schema = match self.datasets.get_schema(source_rid, branch).await {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                tracing::debug!(source = source_rid, "source dataset has no schema");
                return;
            }
            Err(e) => {
                tracing::warn!(source = source_rid, error = %e, "could not read schema");
                return;
            }
        };

        match self.datasets.put_schema(target_rid, branch, schema).await {
            Ok(()) => tracing::debug!(target = target_rid, "copied schema"),
            Err(e) => tracing::warn!(target = target_rid, error = %e, "could not write schema"),
        }
    }

    async fn copy_files(&self, source_rid: &str, target_rid: &str, job: &mut CopyJob) -> Result<()> {
        let branch = &self.options.branch;
        let files = self
            .datasets
            .list_files(source_rid, branch)
            .await
            .map_err(|e| Error::upstream("list dataset files", source_rid, e))?;

        if files.is_empty() {
            tracing::info!(source = source_rid, branch = %branch, "source dataset has no files");
            return Ok(());
        }

        let transaction = self
            .datasets
            .create_transaction(target_rid, branch, TransactionType::Snapshot)
            .await
            .map_err(|e| Error::upstream("create transaction", target_rid, e))?;
        tracing::debug!(target = target_rid, transaction = %transaction, "opened transaction");

        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            if file.path.is_empty() {
                tracing::warn!(source = source_rid, "skipping file without a path");
                job.summary.skipped += 1;
                continue;
            }

            let result = self
                .transfer_file(source_rid, target_rid, &file.path, &transaction)
                .await
                .map_err(|e| {
                    Error::upstream(
                        "copy file",
                        format!("{} (file {} of {total})", file.path, index + 1),
                        e,
                    )
                });

            match result {
                Ok(bytes) => {
                    job.summary.files_copied += 1;
                    job.summary.bytes_copied += bytes;
                    tracing::debug!(path = %file.path, bytes, "copied file");
                }
                Err(e) => {
                    job.summary.errors += 1;
                    tracing::warn!(error = %e, "file copy failed");
                }
            }
        }

        if let Err(e) = self
            .datasets
            .commit_transaction(target_rid, &transaction)
            .await
        {
            match self
                .datasets
                .abort_transaction(target_rid, &transaction)
                .await
            {
                Ok(()) => tracing::warn!(transaction = %transaction, "rolled back transaction"),
                Err(abort) => tracing::warn!(
                    transaction = %transaction,
                    error = %abort,
                    "failed to roll back transaction"
                ),
            }
            return Err(Error::upstream("commit transaction", transaction, e));
        }

        tracing::debug!(target = target_rid, transaction = %transaction, "committed transaction");
        Ok(())
    }

    async fn transfer_file(
        &self,
        source_rid: &str,
        target_rid: &str,
        path: &str,
        transaction: &str,
    ) -> Result<u64> {
        let remote_path = normalize_remote_path(path)?;
        let content = self
            .datasets
            .download_file(source_rid, &self.options.branch, path)
            .await?;
        let bytes = content.len() as u64;

        self.datasets
            .upload_file(
                target_rid,
                &remote_path,
                content,
                UploadTarget::Transaction(transaction.to_string()),
            )
            .await?;
        Ok(bytes)
    }

    fn copy_folder<'s>(
        &'s self,
        source: &'s ResourceDescriptor,
        destination: &'s str,
        job: &'s mut CopyJob,
    ) -> BoxFuture<'s, Result<()>> {
        async move {
            let new_name = derive_name(source.name(), &self.options.name_suffix);

            let new_folder = if job.dry_run {
                tracing::info!(
                    source = %source.rid,
                    destination,
                    name = %new_name,
                    "[dry-run] would copy folder"
                );
                None
            } else {
                let created = self
                    .folders
                    .create_folder(destination, &new_name)
                    .await
                    .map_err(|e| Error::upstream("create folder", destination, e))?;
                tracing::info!(rid = %created.rid, name = %new_name, "created folder");
                Some(created.rid)
            };
            job.summary.folders_copied += 1;

            let children = self
                .folders
                .list_children(&source.rid)
                .await
                .map_err(|e| Error::upstream("list folder children", &source.rid, e))?;

            let child_destination = new_folder.as_deref().unwrap_or(DRY_RUN_FOLDER);
            for child in &children {
                let result = match &child.resource_type {
                    ResourceType::Folder => self.copy_folder(child, child_destination, job).await,
                    ResourceType::Dataset => {
                        self.copy_dataset(child, child_destination, job).await
                    }
                    ResourceType::Other(kind) => Err(unsupported(&child.rid, kind)),
                };

                if let Err(e) = result {
                    job.summary.errors += 1;
                    tracing::warn!(child = %child.rid, error = %e, "failed to copy child");
                    if self.options.fail_fast {
                        return Err(e);
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }
}

fn unsupported(rid: &str, kind: &str) -> Error {
    Error::UnsupportedFeature(format!(
        "Copy is only supported for datasets and folders. Resource {rid} is of type '{kind}'."
    ))
}

/// Name given to a copied resource
///
/// The suffix is not appended twice, and an empty suffix keeps the name.
pub fn derive_name(base_name: &str, suffix: &str) -> String {
    if suffix.is_empty() || base_name.ends_with(suffix) {
        base_name.to_string()
    } else {
        format!("{base_name}{suffix}")
    }
}

/// Turn a dataset file path into a relative resource path
///
/// Leading separators, empty segments and `.` segments are dropped. Paths with
/// `..` segments, or nothing left after cleaning, are rejected.
pub fn normalize_remote_path(path: &str) -> Result<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(Error::General(format!(
                    "Path traversal detected: {path}"
                )));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(Error::General(format!("Invalid file path: '{path}'")));
    }
    Ok(segments.join("/"))
}
