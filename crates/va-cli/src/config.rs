//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use va_core::TaskConfig;
use va_store::SessionPaths;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the per-video session files.
    pub data_dir: PathBuf,
    /// Write DEBUG lines to the audit log.
    pub debug: bool,
    /// Frames shown on each side of the window center.
    pub context_size: usize,
    /// Distance between window frames.
    pub context_step_ms: i64,
    /// The annotation task.
    pub task: TaskConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs_data_path().unwrap_or_else(|| PathBuf::from(".")),
            debug: false,
            context_size: 5,
            context_step_ms: 100,
            task: TaskConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // VA_DATA_DIR, VA_TASK__NAME, ...
        figment = figment.merge(Env::prefixed("VA_").split("__"));

        figment.extract()
    }

    /// Session files for a video.
    pub fn session_paths(&self, video: &Path) -> SessionPaths {
        SessionPaths::for_video(&self.data_dir, video)
    }

    /// Directory searched for pre-extracted frames of a video,
    /// `<data_dir>/<stem>-frames`.
    pub fn frames_dir(&self, video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map_or_else(|| "annotations".into(), |s| s.to_string_lossy());
        self.data_dir.join(format!("{stem}-frames"))
    }
}

/// Returns the platform-specific config directory for va.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("va"))
}

/// Returns the platform-specific data directory for va.
///
/// On Linux: `~/.local/share/va`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("va"))
}
