//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! User-editable settings for the file manager, loaded and saved as TOML
//! from the proper cross-platform config path using the
//! [`directories`](https://docs.rs/directories) crate. Falls back to
//! defaults (and writes them out) when no config file exists.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use tokio::fs as TokioFs;

/// Extensions treated as binary for preview classification. Lowercase,
/// without the leading dot. Purely extension-based: a text-looking
/// extension on binary content is misclassified, by contract.
pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "tif", "svg", "mp3", "mp4", "mkv",
    "avi", "mov", "flac", "wav", "ogg", "webm", "zip", "tar", "gz", "bz2", "xz", "zst", "7z",
    "rar", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "so", "dylib", "dll", "exe", "o",
    "a", "pyc", "pyo", "woff", "woff2", "ttf", "otf", "eot", "db", "sqlite", "sqlite3", "bin",
    "dat", "iso", "img",
];

/// Bounds for the text preview pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Maximum number of lines shown.
    pub max_lines: usize,

    /// Maximum characters per line before truncation.
    pub max_line_len: usize,

    /// Files larger than this are not read at all.
    pub max_bytes: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_lines: 80,
            max_line_len: 200,
            max_bytes: 64 * 1024,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whether dotfiles are visible at startup.
    pub show_hidden: bool,

    /// External editor command; `$EDITOR` wins over the saved value.
    pub editor_cmd: String,

    /// Extension set fed to the entry classifier.
    pub binary_extensions: Vec<String>,

    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_hidden: false,
            editor_cmd: default_editor(),
            binary_extensions: DEFAULT_BINARY_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            preview: PreviewConfig::default(),
        }
    }
}

/// Editor selection: `$EDITOR`, read once at startup, else `vi`.
fn default_editor() -> String {
    std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string())
}

impl Config {
    /// Loads config from the XDG-compliant app config dir, or returns
    /// defaults (creating the file for next time).
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config as TOML at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "triptych", "Triptych")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Directory for log files, under the platform data dir.
    pub fn log_dir() -> PathBuf {
        ProjectDirs::from("org", "triptych", "Triptych")
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}
