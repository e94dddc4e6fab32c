use crate::api::constants::DEFAULT_PLATFORM_URL;
use crate::api::ConnectionSettings;
use crate::enhance::DEFAULT_GEMINI_MODEL;
use anyhow::{Context, Result};
use clap::ValueEnum;
use is_terminal::IsTerminal;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const ACCESS_TOKEN_VAR: &str = "COVEO_ACCESS_TOKEN";

/// Coveo platform region
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    Us,
    Ca,
    Eu,
}

impl Region {
    pub fn platform_url(&self) -> &'static str {
        match self {
            Self::Us => DEFAULT_PLATFORM_URL,
            Self::Ca => "https://platform-ca.cloud.coveo.com",
            Self::Eu => "https://platform-eu.cloud.coveo.com",
        }
    }
}

/// A stored organization profile; the access token is never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub organization_id: String,
    pub tracking_id: String,
    #[serde(default = "default_platform_url")]
    pub platform_url: String,
}

fn default_platform_url() -> String {
    DEFAULT_PLATFORM_URL.to_string()
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_environment: Option<String>,
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
}

fn default_page_size() -> u32 {
    100
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            gemini_model: default_gemini_model(),
        }
    }
}

/// Values given on the command line, each winning over the stored profile
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub environment: Option<String>,
    pub organization_id: Option<String>,
    pub tracking_id: Option<String>,
    pub platform_url: Option<String>,
    pub access_token: Option<String>,
}

/// Strip whitespace and trailing slashes from a platform URL
pub fn normalize_platform_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("merch-hub")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".merch-hub")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        Self::from_toml(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        debug!(
            "Loaded config with {} environments",
            config.environments.len()
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    /// Insert or replace a profile; the first one becomes current
    pub fn add_environment(&mut self, name: String, mut environment: Environment) {
        info!("Adding environment: {}", name);
        environment.platform_url = normalize_platform_url(&environment.platform_url);
        self.environments.insert(name.clone(), environment);

        if self.current_environment.is_none() {
            info!("Set {} as current environment", name);
            self.current_environment = Some(name);
        }
    }

    pub fn get_current_environment(&self) -> Option<&Environment> {
        let current_env = self.current_environment.as_ref()?;
        self.environments.get(current_env)
    }

    pub fn set_current_environment(&mut self, name: String) -> Result<()> {
        if !self.environments.contains_key(&name) {
            anyhow::bail!("Environment '{}' not found", name);
        }

        info!("Setting current environment to: {}", name);
        self.current_environment = Some(name);
        Ok(())
    }

    /// Profile names, sorted
    pub fn list_environments(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.environments.keys().collect();
        names.sort();
        names
    }

    pub fn remove_environment(&mut self, name: &str) -> Result<()> {
        if self.environments.remove(name).is_none() {
            anyhow::bail!("Environment '{}' not found", name);
        }
        info!("Removing environment: {}", name);

        if self.current_environment.as_deref() == Some(name) {
            warn!("Removed current environment, clearing current selection");
            self.current_environment = None;
        }
        Ok(())
    }

    fn selected_profile(&self, overrides: &ConnectionOverrides) -> Result<Option<&Environment>> {
        match &overrides.environment {
            Some(name) => self
                .environments
                .get(name)
                .map(Some)
                .with_context(|| format!("Environment '{}' not found", name)),
            None => Ok(self.get_current_environment()),
        }
    }

    /// Tracking id alone, for work that never reaches the API
    pub fn resolve_tracking_id(&self, overrides: &ConnectionOverrides) -> Result<String> {
        let profile = self.selected_profile(overrides)?;
        overrides
            .tracking_id
            .clone()
            .or_else(|| profile.map(|p| p.tracking_id.clone()))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .context("No tracking id. Pass --tracking-id or configure one with `merch-hub env add`")
    }

    /// Merge the selected profile with command-line overrides
    ///
    /// The token is taken from the overrides, then `COVEO_ACCESS_TOKEN`,
    /// then a hidden prompt when stdin is a terminal.
    pub fn resolve_connection(&self, overrides: &ConnectionOverrides) -> Result<ConnectionSettings> {
        let profile = self.selected_profile(overrides)?;
        let organization_id = overrides
            .organization_id
            .clone()
            .or_else(|| profile.map(|p| p.organization_id.clone()))
            .filter(|v| !v.trim().is_empty())
            .context("No organization id. Pass --org or configure one with `merch-hub env add`")?;
        let tracking_id = self.resolve_tracking_id(overrides)?;
        let platform_url = overrides
            .platform_url
            .clone()
            .or_else(|| profile.map(|p| p.platform_url.clone()))
            .unwrap_or_else(default_platform_url);

        Ok(ConnectionSettings {
            organization_id: organization_id.trim().to_string(),
            tracking_id,
            access_token: resolve_access_token(overrides.access_token.as_deref())?,
            platform_url: normalize_platform_url(&platform_url),
        })
    }
}

fn resolve_access_token(explicit: Option<&str>) -> Result<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    if let Some(token) = std::env::var(ACCESS_TOKEN_VAR)
        .ok()
        .filter(|t| !t.trim().is_empty())
    {
        debug!("Using access token from {}", ACCESS_TOKEN_VAR);
        return Ok(token.trim().to_string());
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "No access token. Pass --token or set {}",
            ACCESS_TOKEN_VAR
        );
    }

    let token = rpassword::prompt_password("Coveo access token: ")
        .context("Failed to read access token")?;
    if token.trim().is_empty() {
        anyhow::bail!("Access token cannot be empty");
    }
    Ok(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(org: &str) -> Environment {
        Environment {
            organization_id: org.to_string(),
            tracking_id: "store".to_string(),
            platform_url: "https://platform-eu.cloud.coveo.com/".to_string(),
        }
    }

    fn with_token() -> ConnectionOverrides {
        ConnectionOverrides {
            access_token: Some("xx-token".to_string()),
            ..ConnectionOverrides::default()
        }
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml(
            r#"
current_environment = "prod"

[environments.prod]
organization_id = "acme"
tracking_id = "store"
"#,
        )
        .unwrap();

        let env = config.get_current_environment().unwrap();
        assert_eq!(env.platform_url, DEFAULT_PLATFORM_URL);
        assert_eq!(config.settings.page_size, 100);
        assert_eq!(config.settings.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_first_environment_becomes_current() {
        let mut config = Config::default();
        config.add_environment("prod".into(), environment("acme"));
        config.add_environment("dev".into(), environment("acme-dev"));

        assert_eq!(config.current_environment.as_deref(), Some("prod"));
        assert_eq!(
            config.environments["dev"].platform_url,
            "https://platform-eu.cloud.coveo.com"
        );
        assert_eq!(config.list_environments(), vec!["dev", "prod"]);
    }

    #[test]
    fn test_remove_current_clears_selection() {
        let mut config = Config::default();
        config.add_environment("prod".into(), environment("acme"));
        config.remove_environment("prod").unwrap();
        assert!(config.current_environment.is_none());
        assert!(config.remove_environment("prod").is_err());
        assert!(config.set_current_environment("prod".into()).is_err());
    }

    #[test]
    fn test_overrides_win_over_profile() {
        let mut config = Config::default();
        config.add_environment("prod".into(), environment("acme"));

        let overrides = ConnectionOverrides {
            tracking_id: Some("outlet".into()),
            ..with_token()
        };
        let settings = config.resolve_connection(&overrides).unwrap();
        assert_eq!(settings.organization_id, "acme");
        assert_eq!(settings.tracking_id, "outlet");
        assert_eq!(settings.platform_url, "https://platform-eu.cloud.coveo.com");
        assert_eq!(settings.access_token, "xx-token");
    }

    #[test]
    fn test_missing_org_is_an_error() {
        let config = Config::default();
        let err = config.resolve_connection(&with_token()).unwrap_err();
        assert!(err.to_string().contains("organization id"));
    }

    #[test]
    fn test_region_urls() {
        assert_eq!(Region::Us.platform_url(), "https://platform.cloud.coveo.com");
        assert_eq!(Region::Ca.platform_url(), "https://platform-ca.cloud.coveo.com");
    }
}
