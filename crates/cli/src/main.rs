//! fc - Foundry platform CLI client
//!
//! Aliases are expanded before clap sees the arguments, so an alias can stand
//! in for any command together with its flags.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use foundry_cli::commands::{self, Cli};
use foundry_cli::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let args = match commands::expand_aliases(std::env::args().collect()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(ExitCode::from_error(&e).as_i32());
        }
    };

    let cli = Cli::parse_from(args);
    init_tracing(cli.debug);

    let exit_code = commands::execute(cli).await;
    std::process::exit(exit_code.as_i32());
}

/// Log to stderr; `--debug` wins over `RUST_LOG`
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
