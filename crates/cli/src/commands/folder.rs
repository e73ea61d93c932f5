//! folder commands

use clap::Subcommand;
use fc_core::{ResourceDescriptor, ResourceLookup as _, Rid};

use super::{Context, PaginationArgs, list};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// List the direct children of a folder
    Children(ChildrenArgs),

    /// Show a resource's name and type
    Info(InfoArgs),
}

#[derive(clap::Args, Debug)]
pub struct ChildrenArgs {
    /// Folder RID
    pub rid: String,

    #[command(flatten)]
    pub pagination: PaginationArgs,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Resource RID
    pub rid: String,
}

pub async fn execute(cmd: FolderCommands, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());

    let rid = match &cmd {
        FolderCommands::Children(args) => &args.rid,
        FolderCommands::Info(args) => &args.rid,
    };
    if let Err(e) = Rid::parse(rid) {
        return formatter.fail(&e);
    }

    let client = match ctx.connect() {
        Ok(client) => client,
        Err(e) => return formatter.fail(&e),
    };

    match cmd {
        FolderCommands::Children(args) => {
            let endpoint = match client.folder_children(&args.rid) {
                Ok(endpoint) => endpoint,
                Err(e) => return formatter.fail(&e),
            };
            list::run(
                &endpoint,
                &args.pagination,
                &formatter,
                &["RID", "NAME", "TYPE"],
                resource_row,
            )
            .await
        }
        FolderCommands::Info(args) => match client.get_resource(&args.rid).await {
            Ok(resource) => {
                if formatter.is_json() {
                    formatter.json(&resource);
                } else {
                    formatter.table(&["RID", "NAME", "TYPE"], vec![resource_row(&resource)]);
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail(&e),
        },
    }
}

fn resource_row(resource: &ResourceDescriptor) -> Vec<String> {
    vec![
        resource.rid.clone(),
        resource.display_name.clone(),
        resource.resource_type.to_string(),
    ]
}
