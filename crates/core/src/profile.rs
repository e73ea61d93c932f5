//! Credential profiles
//!
//! A profile is a named platform host plus the credentials used to talk to it.
//! Profiles live in the config file; environment variables override their fields
//! at resolution time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};

/// Environment variable holding the platform host
pub const ENV_HOST: &str = "FOUNDRY_HOST";
/// Environment variable holding a bearer token
pub const ENV_TOKEN: &str = "FOUNDRY_TOKEN";
/// Environment variable holding an OAuth client id
pub const ENV_CLIENT_ID: &str = "FOUNDRY_CLIENT_ID";
/// Environment variable holding an OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "FOUNDRY_CLIENT_SECRET";

/// How a client authenticates against the platform
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "auth_type", rename_all = "lowercase")]
pub enum AuthMethod {
    /// Static bearer token
    Token {
        /// Bearer token
        token: String,
    },
    /// OAuth2 client credentials grant
    OAuth {
        /// Client id
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Requested scopes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        scopes: Vec<String>,
    },
}

impl AuthMethod {
    /// Short name used in listings
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::Token { .. } => "token",
            AuthMethod::OAuth { .. } => "oauth",
        }
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Token { .. } => f.debug_struct("Token").field("token", &"***").finish(),
            AuthMethod::OAuth {
                client_id, scopes, ..
            } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// A named platform connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Platform host URL, e.g. https://example.palantirfoundry.com
    pub host: String,

    /// Credentials
    #[serde(flatten)]
    pub auth: AuthMethod,
}

impl Profile {
    /// Create a new profile
    pub fn new(name: impl Into<String>, host: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            auth,
        }
    }
}

/// Where resolved credentials came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Entirely from a stored profile
    Profile(String),
    /// Entirely from environment variables
    Environment,
    /// A stored profile with some fields overridden by the environment
    ProfileWithOverrides(String),
}

/// Fully resolved connection details
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Platform host URL
    pub host: String,
    /// Authentication method
    pub auth: AuthMethod,
    /// Origin of these credentials
    pub source: CredentialSource,
}

/// Manager for profile operations
#[derive(Debug, Clone)]
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::NotFound(format!("profile '{name}'")))
    }

    /// Add or update a profile
    ///
    /// The first profile ever added becomes the default.
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut config = self.config_manager.load()?;

        if config.default_profile.is_none() {
            config.default_profile = Some(profile.name.clone());
        }

        if let Some(existing) = config.profiles.iter_mut().find(|p| p.name == profile.name) {
            *existing = profile;
        } else {
            config.profiles.push(profile);
        }

        self.config_manager.save(&config)
    }

    /// Remove a profile, clearing the default if it pointed at it
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::NotFound(format!("profile '{name}'")));
        }

        if config.default_profile.as_deref() == Some(name) {
            config.default_profile = None;
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }

    /// Mark an existing profile as the default
    pub fn set_default(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        if !config.profiles.iter().any(|p| p.name == name) {
            return Err(Error::NotFound(format!("profile '{name}'")));
        }
        config.default_profile = Some(name.to_string());
        self.config_manager.save(&config)
    }

    /// Name of the default profile, if any
    pub fn default_profile(&self) -> Result<Option<String>> {
        Ok(self.config_manager.load()?.default_profile)
    }

    /// Resolve credentials from the process environment and stored profiles
    pub fn resolve(&self, profile: Option<&str>) -> Result<Credentials> {
        self.resolve_with_env(profile, |key| std::env::var(key).ok())
    }

    /// Resolve credentials with an explicit environment lookup
    ///
    /// The named profile (or the default profile) is loaded first; any of
    /// `FOUNDRY_HOST`, `FOUNDRY_TOKEN`, `FOUNDRY_CLIENT_ID` and
    /// `FOUNDRY_CLIENT_SECRET` present in the environment override its fields.
    pub fn resolve_with_env<F>(&self, profile: Option<&str>, env: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let base = match profile {
            Some(name) => Some(self.get(name)?),
            None => match self.default_profile()? {
                Some(name) => Some(self.get(&name)?),
                None => None,
            },
        };

        let env_host = env(ENV_HOST);
        let env_token = env(ENV_TOKEN);
        let env_client_id = env(ENV_CLIENT_ID);
        let env_client_secret = env(ENV_CLIENT_SECRET);
        let overridden = env_host.is_some()
            || env_token.is_some()
            || env_client_id.is_some()
            || env_client_secret.is_some();

        let host = env_host
            .or_else(|| base.as_ref().map(|p| p.host.clone()))
            .ok_or_else(|| {
                Error::Auth(format!(
                    "No host configured. Set {ENV_HOST} or add a profile with `fc profile set`."
                ))
            })?;

        let base_auth = base.as_ref().map(|p| p.auth.clone());
        let auth = match (env_token, env_client_id, env_client_secret, base_auth) {
            (Some(token), _, _, _) => AuthMethod::Token { token },
            (None, Some(client_id), Some(client_secret), previous) => AuthMethod::OAuth {
                client_id,
                client_secret,
                scopes: match previous {
                    Some(AuthMethod::OAuth { scopes, .. }) => scopes,
                    _ => Vec::new(),
                },
            },
            (
                None,
                id,
                secret,
                Some(AuthMethod::OAuth {
                    client_id,
                    client_secret,
                    scopes,
                }),
            ) => AuthMethod::OAuth {
                client_id: id.unwrap_or(client_id),
                client_secret: secret.unwrap_or(client_secret),
                scopes,
            },
            (None, _, _, Some(auth)) => auth,
            (None, _, _, None) => {
                return Err(Error::Auth(format!(
                    "No credentials configured. Set {ENV_TOKEN} (or {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET}) or add a profile with `fc profile set`."
                )));
            }
        };

        let source = match (base, overridden) {
            (Some(p), false) => CredentialSource::Profile(p.name),
            (Some(p), true) => CredentialSource::ProfileWithOverrides(p.name),
            (None, _) => CredentialSource::Environment,
        };

        tracing::debug!(host = %host, auth = auth.kind(), source = ?source, "resolved credentials");

        Ok(Credentials { host, auth, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        (ProfileManager::with_config_manager(config_manager), temp_dir)
    }

    fn token_profile(name: &str, host: &str, token: &str) -> Profile {
        Profile::new(
            name,
            host,
            AuthMethod::Token {
                token: token.to_string(),
            },
        )
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_first_profile_becomes_default() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager
            .set(token_profile("dev", "https://dev.example.com", "a"))
            .unwrap();
        manager
            .set(token_profile("prod", "https://prod.example.com", "b"))
            .unwrap();

        assert_eq!(manager.default_profile().unwrap().as_deref(), Some("dev"));
        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_set_default_and_remove() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager
            .set(token_profile("dev", "https://dev.example.com", "a"))
            .unwrap();
        manager
            .set(token_profile("staging", "https://staging.example.com", "b"))
            .unwrap();

        manager.set_default("staging").unwrap();
        assert_eq!(
            manager.default_profile().unwrap().as_deref(),
            Some("staging")
        );

        manager.remove("staging").unwrap();
        assert!(manager.default_profile().unwrap().is_none());
        assert!(!manager.exists("staging").unwrap());
        assert!(manager.exists("dev").unwrap());
    }

    #[test]
    fn test_set_default_unknown_profile() {
        let (manager, _temp_dir) = temp_profile_manager();
        let result = manager.set_default("missing");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_update_existing_profile_keeps_position() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager
            .set(token_profile("a", "https://old.example.com", "x"))
            .unwrap();
        manager
            .set(token_profile("b", "https://b.example.com", "y"))
            .unwrap();
        manager
            .set(token_profile("a", "https://new.example.com", "z"))
            .unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "a");
        assert_eq!(profiles[0].host, "https://new.example.com");
    }

    #[test]
    fn test_oauth_profile_round_trips_through_toml() {
        let (manager, _temp_dir) = temp_profile_manager();
        let profile = Profile::new(
            "oauth",
            "https://oauth.example.com",
            AuthMethod::OAuth {
                client_id: "client".into(),
                client_secret: "secret".into(),
                scopes: vec!["api:read".into()],
            },
        );
        manager.set(profile.clone()).unwrap();

        assert_eq!(manager.get("oauth").unwrap(), profile);
    }

    #[test]
    fn test_resolve_uses_default_profile() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager
            .set(token_profile("dev", "https://dev.example.com", "dev-token"))
            .unwrap();

        let creds = manager.resolve_with_env(None, env_of(&[])).unwrap();
        assert_eq!(creds.host, "https://dev.example.com");
        assert_eq!(
            creds.auth,
            AuthMethod::Token {
                token: "dev-token".into()
            }
        );
        assert_eq!(creds.source, CredentialSource::Profile("dev".into()));
    }

    #[test]
    fn test_environment_overrides_profile() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager
            .set(token_profile(
                "default",
                "https://profile.example.com",
                "profile-token",
            ))
            .unwrap();

        let env = env_of(&[
            (ENV_TOKEN, "env-token"),
            (ENV_HOST, "https://env.example.com"),
        ]);
        let creds = manager.resolve_with_env(None, env).unwrap();

        assert_eq!(creds.host, "https://env.example.com");
        assert_eq!(
            creds.auth,
            AuthMethod::Token {
                token: "env-token".into()
            }
        );
        assert_eq!(
            creds.source,
            CredentialSource::ProfileWithOverrides("default".into())
        );
    }

    #[test]
    fn test_environment_only() {
        let (manager, _temp_dir) = temp_profile_manager();
        let env = env_of(&[
            (ENV_HOST, "https://env.example.com"),
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
        ]);

        let creds = manager.resolve_with_env(None, env).unwrap();
        assert_eq!(creds.source, CredentialSource::Environment);
        assert_eq!(creds.auth.kind(), "oauth");
    }

    #[test]
    fn test_explicit_profile_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();
        let result = manager.resolve_with_env(Some("nope"), env_of(&[]));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_credentials() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.resolve_with_env(None, env_of(&[]));
        assert!(matches!(result, Err(Error::Auth(_))));

        let result =
            manager.resolve_with_env(None, env_of(&[(ENV_HOST, "https://env.example.com")]));
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains(ENV_TOKEN));
    }

    #[test]
    fn test_blank_environment_values_are_ignored() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager
            .set(token_profile("dev", "https://dev.example.com", "dev-token"))
            .unwrap();

        let creds = manager
            .resolve_with_env(None, env_of(&[(ENV_TOKEN, "  ")]))
            .unwrap();
        assert_eq!(creds.source, CredentialSource::Profile("dev".into()));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = AuthMethod::Token {
            token: "super-secret".into(),
        };
        assert!(!format!("{auth:?}").contains("super-secret"));
    }
}
