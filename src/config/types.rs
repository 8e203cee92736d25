use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 預設可辨識的影片副檔名（含前導點，大小寫需完全相符）
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".mkv", ".avi", ".wmv"];

/// 預設的多段命名標記，依序為 part 1 到 part 9
pub const DEFAULT_PART_MARKERS: [&str; 9] = [
    "part 1", "part 2", "part 3", "part 4", "part 5", "part 6", "part 7", "part 8", "part 9",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinerSettings {
    /// ffmpeg 執行檔路徑，預設從 PATH 尋找
    pub ffmpeg_path: PathBuf,
    pub video_extensions: Vec<String>,
    pub part_markers: Vec<String>,
    /// 合併清單檔存放位置，未設定時使用系統暫存資料夾
    pub list_directory: Option<PathBuf>,
    /// ffmpeg 非零結束代碼是否視為失敗
    pub fail_on_nonzero_exit: bool,
}

impl Default for JoinerSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            part_markers: DEFAULT_PART_MARKERS.iter().map(ToString::to_string).collect(),
            list_directory: None,
            fail_on_nonzero_exit: true,
        }
    }
}

impl JoinerSettings {
    #[must_use]
    pub fn list_directory(&self) -> PathBuf {
        self.list_directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// 副檔名需完全相符（區分大小寫）
    #[must_use]
    pub fn is_video_extension(&self, extension: &str) -> bool {
        self.video_extensions.iter().any(|ext| ext == extension)
    }

    /// 檔名是否包含任一個分段標記（不區分大小寫）
    #[must_use]
    pub fn has_part_marker(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        self.part_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    }

    #[must_use]
    pub fn is_multi_part_video(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        self.is_video_extension(&extension) && self.has_part_marker(file_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: JoinerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = JoinerSettings::default();
        assert_eq!(settings.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(settings.video_extensions.len(), 4);
        assert_eq!(settings.part_markers.len(), 9);
        assert!(settings.fail_on_nonzero_exit);
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let settings = JoinerSettings::default();
        assert!(settings.is_video_extension(".mp4"));
        assert!(!settings.is_video_extension(".MP4"));
        assert!(!settings.is_video_extension(".mov"));
    }

    #[test]
    fn test_part_marker_is_case_insensitive() {
        let settings = JoinerSettings::default();
        assert!(settings.has_part_marker("Movie - Part 2.mp4"));
        assert!(settings.has_part_marker("movie part 9.mkv"));
        assert!(!settings.has_part_marker("Movie - part1.mp4"));
        assert!(!settings.has_part_marker("Movie.mp4"));
    }

    #[test]
    fn test_is_multi_part_video() {
        let settings = JoinerSettings::default();
        assert!(settings.is_multi_part_video(Path::new("/v/Movie - part 1.mp4")));
        assert!(!settings.is_multi_part_video(Path::new("/v/Movie - part 1.txt")));
        assert!(!settings.is_multi_part_video(Path::new("/v/Movie.mp4")));
        assert!(!settings.is_multi_part_video(Path::new("/v/Movie - part 1")));
    }

    #[test]
    fn test_partial_settings_json_uses_defaults() {
        let settings: JoinerSettings =
            serde_json::from_str(r#"{ "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg" }"#).unwrap();
        assert_eq!(settings.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(settings.part_markers.len(), 9);
        assert!(settings.list_directory.is_none());
    }
}
