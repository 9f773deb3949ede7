//! Slingshot Settings
//!
//! Finds, loads and validates the [`RollupConfig`] a run starts from.
//!
//! An explicit `--config` file must already exist. Without one the per-user
//! file under [`config_dir`] is used, and written out with defaults the
//! first time. Every load is validated, so a bad threshold fails at startup
//! and names the file it came from.

mod paths;

pub use paths::{config_dir, default_settings_path, expand_path};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use slingshot_rollup::{RollupConfig, RollupError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings file '{0}' does not exist")]
    Missing(PathBuf),
    #[error("no config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: RollupError,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Where the settings of this run were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// `--config`.
    Explicit,
    /// The per-user default file, already present.
    Default,
    /// The per-user default file, written with defaults by this run.
    Created,
}

/// A validated rollup configuration and the file behind it.
#[derive(Debug, Clone)]
pub struct RollupSettings {
    config: RollupConfig,
    path: PathBuf,
    origin: Origin,
}

impl RollupSettings {
    /// Load `explicit` if given, else the per-user default.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = default_settings_path().ok_or(SettingsError::NoConfigDir)?;
                Self::load_or_create(&path)
            }
        }
    }

    /// Load a file that has to exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SettingsError::Missing(path.to_path_buf()));
        }
        Self::read(path, Origin::Explicit)
    }

    /// Load `path`, writing the default configuration there first if absent.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::read(path, Origin::Default);
        }
        let settings = Self {
            config: RollupConfig::default(),
            path: path.to_path_buf(),
            origin: Origin::Created,
        };
        settings.save()?;
        info!(path = %path.display(), "wrote default rollup settings");
        Ok(settings)
    }

    fn read(path: &Path, origin: Origin) -> Result<Self> {
        debug!(path = %path.display(), "loading rollup settings");
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RollupConfig =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate().map_err(|source| SettingsError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            config,
            path: path.to_path_buf(),
            origin,
        })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.path, content + "\n").map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    pub fn into_config(self) -> RollupConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}
