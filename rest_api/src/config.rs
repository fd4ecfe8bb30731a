// rest_api/src/config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_DATA_DIRECTORY: &str = "./data/documents";
pub const DEFAULT_OBJECT_ROOT: &str = "./data/objects";

/// The admin API server's own listen address.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where the document store and object store live on disk, and the base URL
/// object download links are issued against.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub data_directory: String,
    pub object_store_root: String,
    pub object_store_base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_directory: DEFAULT_DATA_DIRECTORY.to_string(),
            object_store_root: DEFAULT_OBJECT_ROOT.to_string(),
            object_store_base_url: format!("http://{}:{}/objects", DEFAULT_HOST, DEFAULT_PORT),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminApiConfig {
    pub server: ServerConfig,
    pub storage: StorageSettings,
}

// Mirrors the YAML file's top-level keys; both sections are optional.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    server: Option<ServerConfig>,
    storage: Option<StorageSettings>,
}

/// Loads the admin API configuration from a YAML file. A missing file means
/// defaults; a present-but-unparsable file is an error.
pub fn load_config(config_file_path: Option<PathBuf>) -> Result<AdminApiConfig> {
    let default_path = PathBuf::from("admin_config.yaml");
    let path = config_file_path.unwrap_or(default_path);

    if !path.exists() {
        warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(AdminApiConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let file: ConfigFile = serde_yaml2::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(AdminApiConfig {
        server: file.server.unwrap_or_default(),
        storage: file.storage.unwrap_or_default(),
    })
}

/// The JWT signing secret, from the environment (a `.env` file is honored by
/// the binary). Falls back to a development-only secret with a warning.
pub fn jwt_secret() -> Vec<u8> {
    match std::env::var("ADMIN_JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            warn!("ADMIN_JWT_SECRET not set, using development secret");
            b"dispatch-admin-dev-secret".to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Some(PathBuf::from("/nonexistent/admin.yaml"))).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.storage.data_directory, DEFAULT_DATA_DIRECTORY);
    }

    #[test]
    fn partial_files_fill_in_the_missing_section() {
        let dir = std::env::temp_dir().join("dispatch_admin_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("admin_config.yaml");
        std::fs::write(&path, "server:\n  host: 0.0.0.0\n  port: 9090\n").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.object_store_root, DEFAULT_OBJECT_ROOT);
    }
}
