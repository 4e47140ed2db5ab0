use crate::config::types::{Config, RenderPaths, RenderSettings};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;

const SETTINGS_FILE: &str = "settings.json";

impl Config {
    /// 讀取目前工作目錄的 settings.json，不存在或無法解析時使用預設值
    pub fn new(root: &Path) -> Result<Self> {
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("設定檔無法使用，改用預設值: {e:#}");
                RenderSettings::default()
            }
        };
        Ok(Self::with_settings(root, settings))
    }

    #[must_use]
    pub fn with_settings(root: &Path, settings: RenderSettings) -> Self {
        Self {
            settings,
            paths: RenderPaths::new(root),
        }
    }

    pub fn load_settings(path: &Path) -> Result<RenderSettings> {
        if !path.exists() {
            debug!("找不到 {}，使用預設設定", path.display());
            return Ok(RenderSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Config::load_settings(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "ffmpeg_path": "/opt/ffmpeg", "process_timeout_secs": 600 }"#)
            .unwrap();

        let settings = Config::load_settings(&path).unwrap();
        assert_eq!(settings.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(settings.process_timeout_secs, Some(600));
        assert_eq!(settings.ffprobe_path, "ffprobe");
        assert_eq!(settings.output_frame_rate, 30);
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_settings(&path).is_err());
    }
}
