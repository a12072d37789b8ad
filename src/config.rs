use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the exif-bridge library.
///
/// Holds the exiftool location, the default tag query for reads, and the
/// preview generation options.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_bridge::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.tool.path = "/opt/local/bin/exiftool".into();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the exiftool executable lives.
    pub tool: ToolConfig,
    /// Default tag query for read operations.
    pub read: ReadConfig,
    /// Preview generation options.
    pub preview: PreviewConfig,
}

/// Location of the external exiftool executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub path: String,
}

/// Default tags requested when no explicit query is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadConfig {
    pub tags: Vec<String>,
}

/// Options for scaled, re-encoded preview images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// The longer dimension of the scaled preview, in pixels.
    pub long_edge: u32,
    /// Fractional compression quality (0.0–1.0) where the format supports it.
    pub quality: f32,
    /// Output format extension ("jpg", "png", "webp").
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig {
                path: "/usr/bin/exiftool".to_string(),
            },
            read: ReadConfig {
                tags: vec![
                    "Make".to_string(),
                    "Model".to_string(),
                    "DateTimeOriginal".to_string(),
                    "ImageWidth".to_string(),
                    "ImageHeight".to_string(),
                    "Orientation".to_string(),
                ],
            },
            preview: PreviewConfig {
                long_edge: 1024,
                quality: 0.85,
                format: "jpg".to_string(),
            },
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.tool.path = "/opt/exiftool".to_string();
        config.preview.long_edge = 512;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.tool.path, "/opt/exiftool");
        assert_eq!(loaded.preview.long_edge, 512);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(loaded.tool.path, Config::default().tool.path);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
