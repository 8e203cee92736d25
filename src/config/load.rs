use crate::config::types::{Config, JoinerSettings};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// 設定檔名稱，放在目前工作目錄
pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("讀取設定失敗，改用預設值: {e:#}");
                JoinerSettings::default()
            }
        };

        Ok(Self { settings })
    }

    pub fn load_settings(path: &Path) -> Result<JoinerSettings> {
        if !path.exists() {
            return Ok(JoinerSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        info!("已載入設定檔: {}", path.display());

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Config::load_settings(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, JoinerSettings::default());
    }

    #[test]
    fn test_load_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "fail_on_nonzero_exit": false, "video_extensions": [".mp4"] }"#,
        )
        .unwrap();

        let settings = Config::load_settings(&path).unwrap();
        assert!(!settings.fail_on_nonzero_exit);
        assert_eq!(settings.video_extensions, vec![".mp4".to_string()]);
    }

    #[test]
    fn test_invalid_settings_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_settings(&path).is_err());
    }
}
