//! Credential profile commands
//!
//! Profiles are stored in config.toml. Secrets are written to disk but never
//! printed; listings show only the host and the kind of authentication.

use clap::Subcommand;
use fc_core::{AuthMethod, Error, Profile, ProfileManager, Result};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List profiles
    List,

    /// Show one profile without its secrets
    Show(NameArgs),

    /// Remove a profile
    Remove(NameArgs),

    /// Make a profile the default
    Default(NameArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name
    pub name: String,

    /// Platform host, e.g. example.palantirfoundry.com
    #[arg(long)]
    pub host: String,

    /// Static bearer token
    #[arg(long, conflicts_with_all = ["client_id", "client_secret"])]
    pub token: Option<String>,

    /// OAuth client id
    #[arg(long, requires = "client_secret")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, requires = "client_id")]
    pub client_secret: Option<String>,

    /// OAuth scope to request (repeatable)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Also make this the default profile
    #[arg(long)]
    pub default: bool,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Profile name
    pub name: String,
}

#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    host: String,
    auth_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    scopes: Vec<String>,
    default: bool,
}

impl ProfileInfo {
    fn new(profile: &Profile, default: Option<&str>) -> Self {
        let scopes = match &profile.auth {
            AuthMethod::OAuth { scopes, .. } => scopes.clone(),
            AuthMethod::Token { .. } => Vec::new(),
        };
        Self {
            name: profile.name.clone(),
            host: profile.host.clone(),
            auth_type: profile.auth.kind(),
            scopes,
            default: default == Some(profile.name.as_str()),
        }
    }
}

/// Execute a profile subcommand
pub fn execute(cmd: ProfileCommands, ctx: &Context) -> ExitCode {
    let formatter = Formatter::new(ctx.output.clone());

    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => return formatter.fail(&e),
    };

    match run(cmd, &manager, &formatter) {
        Ok(()) => ExitCode::Success,
        Err(e) => formatter.fail(&e),
    }
}

fn run(cmd: ProfileCommands, manager: &ProfileManager, formatter: &Formatter) -> Result<()> {
    match cmd {
        ProfileCommands::Set(args) => {
            let name = args.name.clone();
            let make_default = args.default;
            manager.set(profile_from_args(args)?)?;
            if make_default {
                manager.set_default(&name)?;
            }
            formatter.success(&format!("Profile '{name}' saved."));
        }
        ProfileCommands::List => {
            let default = manager.default_profile()?;
            let infos: Vec<ProfileInfo> = manager
                .list()?
                .iter()
                .map(|p| ProfileInfo::new(p, default.as_deref()))
                .collect();

            if formatter.is_json() {
                formatter.json(&infos);
            } else if infos.is_empty() {
                formatter.println("No profiles configured. Add one with `fc profile set`.");
            } else {
                let rows = infos
                    .into_iter()
                    .map(|info| {
                        let marker = if info.default { "*" } else { "" };
                        vec![
                            format!("{}{marker}", info.name),
                            info.host,
                            info.auth_type.to_string(),
                        ]
                    })
                    .collect();
                formatter.table(&["NAME", "HOST", "AUTH"], rows);
            }
        }
        ProfileCommands::Show(args) => {
            let profile = manager.get(&args.name)?;
            let default = manager.default_profile()?;
            let info = ProfileInfo::new(&profile, default.as_deref());
            if formatter.is_json() {
                formatter.json(&info);
            } else {
                formatter.println(&format!("Name:    {}", info.name));
                formatter.println(&format!("Host:    {}", info.host));
                formatter.println(&format!("Auth:    {}", info.auth_type));
                if !info.scopes.is_empty() {
                    formatter.println(&format!("Scopes:  {}", info.scopes.join(" ")));
                }
                formatter.println(&format!("Default: {}", info.default));
            }
        }
        ProfileCommands::Remove(args) => {
            manager.remove(&args.name)?;
            formatter.success(&format!("Profile '{}' removed.", args.name));
        }
        ProfileCommands::Default(args) => {
            manager.set_default(&args.name)?;
            formatter.success(&format!("Default profile is now '{}'.", args.name));
        }
    }
    Ok(())
}

fn profile_from_args(args: SetArgs) -> Result<Profile> {
    if args.host.trim().is_empty() {
        return Err(Error::Config("Host cannot be empty".into()));
    }

    let auth = match (args.token, args.client_id, args.client_secret) {
        (Some(token), None, None) => AuthMethod::Token { token },
        (None, Some(client_id), Some(client_secret)) => AuthMethod::OAuth {
            client_id,
            client_secret,
            scopes: args.scopes,
        },
        _ => {
            return Err(Error::Config(
                "Provide either --token or both --client-id and --client-secret".into(),
            ));
        }
    };

    Ok(Profile::new(args.name, args.host.trim(), auth))
}
