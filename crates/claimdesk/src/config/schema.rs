use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// SQLite file; defaults to `~/.claimdesk/data/claimdesk.db`.
    #[serde(default)]
    pub database_path: Option<String>,
    /// Staff id whose commissioner decisions are recorded as the chief's.
    pub chief_commissioner_staff_id: i64,
    /// Where certificates and exports are written.
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    /// Prefix for public attachment URLs; empty leaves stored paths as-is.
    #[serde(default)]
    pub storage_public_base_url: String,
    #[serde(default = "default_page_size")]
    pub worker_search_page_size: u64,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_page_size() -> u64 {
    10
}

impl Config {
    /// A config with defaults for everything but the chief commissioner.
    pub fn with_chief_commissioner(staff_id: i64) -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            chief_commissioner_staff_id: staff_id,
            output_directory: default_output_directory(),
            storage_public_base_url: String::new(),
            worker_search_page_size: default_page_size(),
            assets: AssetsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.database_path {
            Some(path) => Some(PathBuf::from(path)),
            None => crate::db::default_database_path(),
        }
    }

    /// Resolves a stored attachment path to its public URL.
    pub fn public_url(&self, stored_path: &str) -> String {
        let base = self.storage_public_base_url.trim_end_matches('/');
        if base.is_empty() {
            stored_path.to_string()
        } else {
            format!("{}/{}", base, stored_path.trim_start_matches('/'))
        }
    }
}

/// Image references are file paths or `data:` URIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default)]
    pub crest: Option<String>,
    /// Stamped and signed onto the certificate issued at registrar acceptance.
    #[serde(default)]
    pub registrar: SignatoryAssets,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatoryAssets {
    #[serde(default)]
    pub stamp: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_once() {
        let mut config = Config::with_chief_commissioner(1);
        assert_eq!(config.public_url("a/b.pdf"), "a/b.pdf");

        config.storage_public_base_url = "https://files.example.org/public/".into();
        assert_eq!(
            config.public_url("/a/b.pdf"),
            "https://files.example.org/public/a/b.pdf"
        );
    }

    #[test]
    fn test_explicit_database_path() {
        let mut config = Config::with_chief_commissioner(1);
        config.database_path = Some("/tmp/claims.db".into());
        assert_eq!(config.database_path(), Some(PathBuf::from("/tmp/claims.db")));
    }
}
