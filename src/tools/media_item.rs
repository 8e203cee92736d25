use std::path::{Path, PathBuf};

/// 掃描到的多段影片檔案
///
/// 以 (directory, name) 作為識別；建立後不可變，重新掃描時整批替換。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaItem {
    /// 檔名（含副檔名，不含路徑）
    pub name: String,
    /// 所在資料夾
    pub directory: PathBuf,
    /// 副檔名（含前導點，例如 ".mp4"）
    pub extension: String,
}

impl MediaItem {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    /// 從檔案路徑建立，沒有檔名時回傳 None
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let directory = path.parent().unwrap_or(Path::new("")).to_path_buf();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        Some(Self {
            name,
            directory,
            extension,
        })
    }

    #[must_use]
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}
