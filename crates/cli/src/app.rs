//! Unified initialization: logging + settings.

use std::path::{Path, PathBuf};

use slingshot_logging::LogLevel;
use slingshot_settings::RollupSettings;
use tracing::{debug, info};

use crate::Result;

/// Initialized application context
pub struct App {
    pub service: String,
    pub settings: RollupSettings,
}

/// Builder for constructing an App with configurable options.
pub struct AppBuilder {
    service: String,
    log_level: LogLevel,
    skip_logging: bool,
    skip_banner: bool,
    config_path: Option<PathBuf>,
}

impl AppBuilder {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            log_level: LogLevel::Info,
            skip_logging: false,
            skip_banner: false,
            config_path: None,
        }
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.log_level = LogLevel::from_verbose(verbose);
        self
    }

    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    /// Settings file to use instead of the per-user default. It must exist.
    pub fn config_path(mut self, path: &Path) -> Self {
        self.config_path = Some(path.to_path_buf());
        self
    }

    pub fn build(self) -> Result<App> {
        if !self.skip_logging {
            // a subscriber may already be installed (tests, embedding)
            let _ = slingshot_logging::try_init(self.log_level);
        }

        let settings = RollupSettings::resolve(self.config_path.as_deref())?;
        debug!(
            path = %settings.path().display(),
            origin = ?settings.origin(),
            "settings loaded"
        );

        if !self.skip_banner {
            info!(
                "{} {} starting (log level {})",
                self.service,
                env!("CARGO_PKG_VERSION"),
                self.log_level,
            );
        }

        Ok(App {
            service: self.service,
            settings,
        })
    }
}
