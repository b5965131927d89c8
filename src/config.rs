//! Configuration management for notekeeper.
//!
//! This module handles loading and saving service configuration to/from
//! a JSON file (`config.json`) in a configurable directory.
//!
//! Settings:
//! - data_dir / notes_file / admin_file: where the two JSON documents live
//! - base_path: where the note routes are mounted
//! - server: bind address and port
//! - auth: how the authorization header is checked

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NoteError, NoteResult};

/// How the auth gate treats the authorization header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "server", derive(clap::ValueEnum))]
pub enum AuthMode {
    /// Any non-empty header passes
    #[default]
    Presence,
    /// The header value must be listed in the admin file
    #[cfg_attr(feature = "server", value(name = "admin_list"))]
    AdminList,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Presence => "presence",
            AuthMode::AdminList => "admin_list",
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presence" => Ok(AuthMode::Presence),
            "admin_list" => Ok(AuthMode::AdminList),
            other => Err(NoteError::config(format!("Unknown auth mode: {}", other))),
        }
    }
}

/// Auth configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_server_port(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_notes_file() -> String {
    "notes.json".to_string()
}

fn default_admin_file() -> String {
    "admin.json".to_string()
}

fn default_base_path() -> String {
    "/notes".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    /// Directory holding the notes and admin documents (relative to the config dir)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_notes_file")]
    pub notes_file: String,
    #[serde(default = "default_admin_file")]
    pub admin_file: String,
    /// Mount point of the note routes
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            notes_file: default_notes_file(),
            admin_file: default_admin_file(),
            base_path: default_base_path(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Configuration manager
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    config_file: PathBuf,
    data: ConfigData,
}

impl Config {
    /// Create a new configuration manager
    ///
    /// Without a `config_dir` the current directory is used. A missing
    /// config file is written with defaults; an unreadable one is replaced
    /// by defaults in memory only.
    pub fn new(config_dir: Option<PathBuf>) -> NoteResult<Self> {
        let config_dir = config_dir.unwrap_or_else(|| PathBuf::from("."));

        fs::create_dir_all(&config_dir)?;
        let config_file = config_dir.join("config.json");

        let data = if config_file.exists() {
            match fs::read_to_string(&config_file) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!(
                        "Ignoring malformed config {}: {}",
                        config_file.display(),
                        e
                    );
                    ConfigData::default()
                }),
                Err(e) => {
                    tracing::warn!("Cannot read config {}: {}", config_file.display(), e);
                    ConfigData::default()
                }
            }
        } else {
            ConfigData::default()
        };

        let config = Self {
            config_dir,
            config_file,
            data,
        };

        // Save default config if it doesn't exist
        if !config.config_file.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> NoteResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the data directory, resolved against the config directory
    pub fn data_dir(&self) -> PathBuf {
        let dir = PathBuf::from(&self.data.data_dir);
        if dir.is_absolute() {
            dir
        } else {
            self.config_dir.join(dir)
        }
    }

    /// Full path of the notes document
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir().join(&self.data.notes_file)
    }

    /// Full path of the admin document
    pub fn admin_path(&self) -> PathBuf {
        self.data_dir().join(&self.data.admin_file)
    }

    /// Mount point of the note routes, always starting with `/` and never ending with one
    pub fn base_path(&self) -> String {
        let trimmed = self.data.base_path.trim_matches('/');
        format!("/{}", trimmed)
    }

    pub fn bind_address(&self) -> &str {
        &self.data.server.bind_address
    }

    pub fn server_port(&self) -> u16 {
        self.data.server.port
    }

    /// Address the server should listen on
    pub fn socket_addr(&self) -> NoteResult<SocketAddr> {
        let ip: IpAddr = self.data.server.bind_address.parse().map_err(|e| {
            NoteError::config(format!(
                "Invalid bind_address {}: {}",
                self.data.server.bind_address, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.data.server.port))
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.data.auth.mode
    }

    /// Apply command-line overrides for this run without touching the file
    pub fn apply_overrides(
        &mut self,
        port: Option<u16>,
        bind_address: Option<String>,
        auth_mode: Option<AuthMode>,
    ) {
        if let Some(port) = port {
            self.data.server.port = port;
        }
        if let Some(bind_address) = bind_address {
            self.data.server.bind_address = bind_address;
        }
        if let Some(mode) = auth_mode {
            self.data.auth.mode = mode;
        }
    }

    /// Get a configuration value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data.data_dir.clone()),
            "notes_file" => Some(self.data.notes_file.clone()),
            "admin_file" => Some(self.data.admin_file.clone()),
            "base_path" => Some(self.data.base_path.clone()),
            "bind_address" => Some(self.data.server.bind_address.clone()),
            "port" => Some(self.data.server.port.to_string()),
            "auth_mode" => Some(self.data.auth.mode.as_str().to_string()),
            _ => None,
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: &str) -> NoteResult<()> {
        match key {
            "data_dir" => self.data.data_dir = value.to_string(),
            "notes_file" => self.data.notes_file = value.to_string(),
            "admin_file" => self.data.admin_file = value.to_string(),
            "base_path" => self.data.base_path = value.to_string(),
            "bind_address" => self.data.server.bind_address = value.to_string(),
            "port" => {
                self.data.server.port = value
                    .parse()
                    .map_err(|_| NoteError::config(format!("Invalid port: {}", value)))?
            }
            "auth_mode" => self.data.auth.mode = value.parse()?,
            _ => return Err(NoteError::config(format!("Unknown config key: {}", key))),
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.bind_address(), "0.0.0.0");
        assert_eq!(config.base_path(), "/notes");
        assert_eq!(config.auth_mode(), AuthMode::Presence);
        assert_eq!(config.notes_path(), temp_dir.path().join("data").join("notes.json"));
        assert_eq!(config.admin_path(), temp_dir.path().join("data").join("admin.json"));
        assert!(temp_dir.path().join("config.json").exists());
    }

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
            config.set("port", "8080").unwrap();
            config.set("auth_mode", "admin_list").unwrap();
        }

        {
            let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
            assert_eq!(config.server_port(), 8080);
            assert_eq!(config.auth_mode(), AuthMode::AdminList);
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.json"),
            r#"{"auth": {"mode": "admin_list"}}"#,
        )
        .unwrap();

        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(config.auth_mode(), AuthMode::AdminList);
        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.base_path(), "/notes");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.json"), "{ not json").unwrap();

        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(config.server_port(), 3000);
    }

    #[test]
    fn test_absolute_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        config
            .set("data_dir", data_dir.path().to_str().unwrap())
            .unwrap();
        assert_eq!(config.notes_path(), data_dir.path().join("notes.json"));
    }

    #[test]
    fn test_base_path_normalization() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        config.set("base_path", "api/notes/").unwrap();
        assert_eq!(config.base_path(), "/api/notes");
    }

    #[test]
    fn test_overrides_are_not_saved() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
            config.apply_overrides(Some(9999), Some("127.0.0.1".to_string()), None);
            assert_eq!(config.server_port(), 9999);
            assert_eq!(
                config.socket_addr().unwrap(),
                "127.0.0.1:9999".parse().unwrap()
            );
        }

        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(config.server_port(), 3000);
    }

    #[test]
    fn test_get_set() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        config.set("port", "4000").unwrap();
        assert_eq!(config.get("port"), Some("4000".to_string()));

        config.set("auth_mode", "admin_list").unwrap();
        assert_eq!(config.get("auth_mode"), Some("admin_list".to_string()));

        assert!(config.set("port", "not-a-port").is_err());
        assert!(config.set("auth_mode", "everyone").is_err());
        assert!(config.set("unknown", "x").is_err());
        assert!(config.get("unknown").is_none());
    }

    #[test]
    fn test_invalid_bind_address() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        config.set("bind_address", "localhost:80").unwrap();
        assert!(matches!(config.socket_addr(), Err(NoteError::Config(_))));
    }
}
