// Run settings
// Loaded from --config, else ~/.config/tapfare/settings.toml when present

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tapfare_io::OutputFormat;
use tapfare_recon::ReconConfig;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Invalid { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "cannot parse {}: {message}", path.display()),
            Self::Invalid { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Trip CSV rendering
    pub output: OutputFormat,

    /// Reconciliation policy
    pub recon: ReconConfig,
}

impl Settings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tapfare");
        config_dir.join("settings.toml")
    }

    pub fn from_toml(input: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.output.validate().map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(settings)
    }

    /// Load an explicitly requested settings file. Any failure is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents, path)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load the explicit file if given, else the default location if it
    /// exists, else defaults. A broken default-location file falls back to
    /// defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        Ok(Self::load_default_at(&Self::config_path()))
    }

    fn load_default_at(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}");
                log::warn!("using default settings");
                Self::default()
            }
        }
    }
}
