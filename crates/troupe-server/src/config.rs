//! Server configuration.
//!
//! TOML configuration with embedded defaults. The default configuration
//! binds every preset persona to a scripted backend so the server comes up
//! without any keys configured; real deployments point `[backends.*]` at
//! API-keyed backends and adjust `[bindings]` accordingly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use troupe_core::persona::{PersonaCatalog, get_default_presets};
use troupe_core::session::RetryPolicy;
use troupe_core::{Result, TroupeError};
use troupe_interaction::{BackendConfig, BackendKind, InteractionConfig};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7700
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// The socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Default retry budget for submitted task batches
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Optional persona catalog file; presets are used when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Backend definitions and persona bindings
    #[serde(flatten)]
    pub interaction: InteractionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Every preset persona runs against a scripted backend until the
        // operator binds something real. The binding is still explicit:
        // an unlisted persona cannot create sessions.
        let mut backends = HashMap::new();
        backends.insert(
            "scripted".to_string(),
            BackendConfig {
                kind: BackendKind::Scripted,
                model: None,
                base_url: None,
                system: None,
                max_tokens: None,
            },
        );
        let bindings = get_default_presets()
            .into_iter()
            .map(|persona| (persona.name, "scripted".to_string()))
            .collect();

        Self {
            server: ServerConfig::default(),
            retry: RetryPolicy::default(),
            catalog_path: None,
            interaction: InteractionConfig { backends, bindings },
        }
    }
}

impl AppConfig {
    /// Default config file location (`~/.config/troupe/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("troupe").join("config.toml"))
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from an explicit path, the default location, or
    /// the embedded defaults, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error when a config file exists but cannot be read or
    /// parsed. A missing file is not an error.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let candidate = path.or_else(Self::default_path);
        match candidate {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration");
                let text = std::fs::read_to_string(&path)?;
                Self::from_toml_str(&text)
            }
            _ => {
                warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Builds the persona catalog: the configured catalog file when set,
    /// the built-in presets otherwise.
    pub fn load_catalog(&self) -> Result<PersonaCatalog> {
        match &self.catalog_path {
            Some(path) => Self::catalog_from_file(path),
            None => Ok(PersonaCatalog::with_presets()),
        }
    }

    fn catalog_from_file(path: &Path) -> Result<PersonaCatalog> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            TroupeError::config(format!(
                "cannot read persona catalog '{}': {err}",
                path.display()
            ))
        })?;
        PersonaCatalog::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_binds_presets_to_scripted() {
        let config = AppConfig::default();
        assert_eq!(
            config.interaction.bindings.get("Tester"),
            Some(&"scripted".to_string())
        );
        assert!(config.interaction.backends.contains_key("scripted"));
    }

    #[test]
    fn test_from_toml_str() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [retry]
            max_retries = 1
            interval_secs = 2

            [backends.local]
            kind = "scripted"

            [bindings]
            Tester = "local"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.interaction.bindings["Tester"], "local");
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [[persona]]
            name = "Scribe"
            role = "Documentation Writer"
            description = "Writes things down"
            "#
        )
        .unwrap();

        let config = AppConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..AppConfig::default()
        };
        let catalog = config.load_catalog().unwrap();
        assert!(catalog.contains("Scribe"));
        assert!(!catalog.contains("Tester"));
    }

    #[test]
    fn test_missing_catalog_file_is_a_config_error() {
        let config = AppConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.toml")),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.load_catalog().unwrap_err(),
            TroupeError::Config(_)
        ));
    }
}
