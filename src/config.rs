//! Configuration loading and validation.
//!
//! The configuration file is TOML with four sections:
//! - `[filenames]` input CSV and output flat file names
//! - `[data]` static values written verbatim into every user record
//! - `[sftp]` transfer settings, only needed when uploading
//! - `[archive]` retention of timestamped copies of previous runs
//!
//! The file is read once per run into a [`Config`] value which is then passed
//! by reference to every stage.

use crate::app::services::record_transformer::layout;
use crate::constants::{
    APP_DIR_NAME, DEFAULT_ARCHIVE_DIR, DEFAULT_ARCHIVE_KEEP, DEFAULT_KNOWN_HOSTS,
    DEFAULT_REMOTE_DIR, DEFAULT_SFTP_PORT, LOCAL_CONFIG_DIR, LOCAL_CONFIG_FILE, USER_CONFIG_FILE,
};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Input and output file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenamesConfig {
    /// Student export to read
    pub csv_name: PathBuf,
    /// Flat file to write (overwritten every run)
    pub ascii_name: PathBuf,
}

/// Values applied identically to every user record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticFields {
    /// Prefix prepended to the student id to form USER_ID
    #[serde(default)]
    pub id_prefix: String,

    /// MMDD appended to the graduation year to form USER_PRIV_EXPIRES
    pub expire_day: String,

    /// Symphony field values keyed by field name, e.g. `USER_PROFILE`
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl StaticFields {
    /// Value for a static Symphony field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Host key verification policy for the SFTP server
///
/// Verification is on unless the configuration explicitly spells out
/// `host_key_check = "disabled"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKeyCheck {
    /// Host key must match an entry in the known hosts file
    #[default]
    Strict,
    /// Accept any host key. Unsafe.
    Disabled,
}

/// SFTP transfer settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpConfig {
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub user: String,

    pub password: String,

    /// Directory on the server that receives the file
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    /// Known hosts file, relative to the config directory
    #[serde(default = "default_host_file")]
    pub host_file: PathBuf,

    #[serde(default)]
    pub host_key_check: HostKeyCheck,
}

fn default_port() -> u16 {
    DEFAULT_SFTP_PORT
}

fn default_remote_dir() -> String {
    DEFAULT_REMOTE_DIR.to_string()
}

fn default_host_file() -> PathBuf {
    PathBuf::from(DEFAULT_KNOWN_HOSTS)
}

impl fmt::Debug for SftpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("remote_dir", &self.remote_dir)
            .field("host_file", &self.host_file)
            .field("host_key_check", &self.host_key_check)
            .finish()
    }
}

/// Archive of timestamped copies of generated flat files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_dir")]
    pub dir: PathBuf,

    /// Number of copies kept; 0 disables archiving
    #[serde(default = "default_archive_keep")]
    pub keep: usize,
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARCHIVE_DIR)
}

fn default_archive_keep() -> usize {
    DEFAULT_ARCHIVE_KEEP
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: default_archive_dir(),
            keep: default_archive_keep(),
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub filenames: FilenamesConfig,

    pub data: StaticFields,

    #[serde(default)]
    pub sftp: Option<SftpConfig>,

    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Directory the config file was read from
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Directory relative data paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Load and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config = Self::from_toml_str(&text, &config_dir)?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    ///
    /// When `config_dir` is itself a directory named `config`, data files are
    /// resolved against its parent, matching the layout
    /// `<base>/config/symphony.toml` + `<base>/students.csv`.
    pub fn from_toml_str(text: &str, config_dir: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;

        config.config_dir = config_dir.to_path_buf();
        config.base_dir = match config_dir.file_name() {
            Some(name) if name == LOCAL_CONFIG_DIR => config_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config_dir.to_path_buf()),
            _ => config_dir.to_path_buf(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that every static field the record layout needs is present
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = layout::static_keys()
            .filter(|key| self.data.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::configuration(format!(
                "[data] is missing required keys: {}",
                missing.join(", ")
            )));
        }

        let mmdd = Regex::new(r"^(0[1-9]|1[0-2])(0[1-9]|[12][0-9]|3[01])$")
            .map_err(|e| Error::configuration(format!("invalid expire_day pattern: {}", e)))?;
        if !mmdd.is_match(&self.data.expire_day) {
            return Err(Error::configuration(format!(
                "[data] expire_day must be MMDD, got '{}'",
                self.data.expire_day
            )));
        }

        if self.filenames.csv_name.as_os_str().is_empty()
            || self.filenames.ascii_name.as_os_str().is_empty()
        {
            return Err(Error::configuration(
                "[filenames] csv_name and ascii_name must not be empty",
            ));
        }

        if let Some(sftp) = &self.sftp {
            if sftp.server.trim().is_empty() {
                return Err(Error::configuration("[sftp] server must not be empty"));
            }
            if sftp.host_key_check == HostKeyCheck::Disabled {
                warn!(
                    "Host key verification is disabled for {}; the server identity will not be checked",
                    sftp.server
                );
            }
        }

        Ok(())
    }

    /// Transfer settings, required when uploading
    pub fn require_sftp(&self) -> Result<&SftpConfig> {
        self.sftp
            .as_ref()
            .ok_or_else(|| Error::configuration("upload requested but [sftp] section is missing"))
    }

    /// Resolved path of the input CSV
    pub fn input_path(&self) -> PathBuf {
        self.base_dir.join(&self.filenames.csv_name)
    }

    /// Resolved path of the output flat file
    pub fn output_path(&self) -> PathBuf {
        self.base_dir.join(&self.filenames.ascii_name)
    }

    /// Resolved archive directory
    pub fn archive_dir(&self) -> PathBuf {
        self.base_dir.join(&self.archive.dir)
    }

    /// Resolved known hosts file for the configured SFTP server
    pub fn known_hosts_path(&self) -> Option<PathBuf> {
        self.sftp
            .as_ref()
            .map(|sftp| self.config_dir.join(&sftp.host_file))
    }

    /// Find the configuration file to use when none is given on the command line
    ///
    /// Looks for `./config/symphony.toml` first, then the per-user config
    /// directory.
    pub fn default_config_path() -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        let local = PathBuf::from(LOCAL_CONFIG_DIR).join(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }

        let config_dir = dirs::config_dir().context("Could not determine user config directory")?;
        let user = config_dir.join(APP_DIR_NAME).join(USER_CONFIG_FILE);
        if !user.exists() {
            anyhow::bail!(
                "No configuration file found at {} or {}. Pass one with --config.",
                local.display(),
                user.display()
            );
        }

        Ok(user)
    }
}
