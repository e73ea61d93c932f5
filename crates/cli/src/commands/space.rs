//! space commands

use clap::Subcommand;
use fc_api::Space;

use super::{Context, PaginationArgs, list};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum SpaceCommands {
    /// List spaces
    List(SpaceListArgs),
}

#[derive(clap::Args, Debug)]
pub struct SpaceListArgs {
    #[command(flatten)]
    pub pagination: PaginationArgs,
}

pub async fn execute(cmd: SpaceCommands, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(e) => return formatter.fail(&e),
    };

    match cmd {
        SpaceCommands::List(args) => {
            let endpoint = match client.spaces() {
                Ok(endpoint) => endpoint,
                Err(e) => return formatter.fail(&e),
            };
            list::run(
                &endpoint,
                &args.pagination,
                &formatter,
                &["RID", "NAME", "DESCRIPTION"],
                space_row,
            )
            .await
        }
    }
}

fn space_row(space: &Space) -> Vec<String> {
    vec![
        space.rid.clone(),
        space.display_name.clone(),
        space.description.clone().unwrap_or_default(),
    ]
}
