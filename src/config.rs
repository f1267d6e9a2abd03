use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_ARTIFACT_PATH: &str = "tmpfiltered.wav";

/// Application configuration (persistent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where "play processed" writes the processed signal; overwritten every time
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// PCM bit depth of the artifact and of saved files (16 or 24)
    #[serde(default = "default_bit_depth")]
    pub artifact_bit_depth: u16,

    /// Depth of the controller -> audio thread command queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// env_logger filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_PATH)
}

fn default_bit_depth() -> u16 {
    16
}

fn default_queue_capacity() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            artifact_bit_depth: default_bit_depth(),
            queue_capacity: default_queue_capacity(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`, or the standard location when `None`
    ///
    /// A missing file yields the default config.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::try_load_from(path),
            None => Self::try_load_from(&Self::config_path()?),
        }
    }

    /// Try to load config, returning an error if something goes wrong
    pub fn try_load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.artifact_bit_depth, 16 | 24) {
            return Err(Error::Config(format!(
                "artifact_bit_depth must be 16 or 24, got {}",
                self.artifact_bit_depth
            )));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Save config atomically (write to temp, then rename)
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(io_err)?;
        std::fs::rename(&temp_path, path).map_err(io_err)?;

        Ok(())
    }

    /// Get cross-platform config file path
    pub fn config_path() -> Result<PathBuf> {
        use directories::ProjectDirs;

        let proj_dirs = ProjectDirs::from("", "", "wavefx")
            .ok_or_else(|| Error::Config("failed to determine config directory".to_string()))?;

        Ok(proj_dirs.config_dir().join("config.json"))
    }
}
