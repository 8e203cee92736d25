//! ffmpeg concat demuxer 使用的清單檔
//!
//! 每個分段一行 `file '<path>'`，以換行結尾的 UTF-8 文字

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 產生清單內容
///
/// 路徑中的單引號依 concat 語法寫成 `'\''`
#[must_use]
pub fn format_concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|part| {
            let escaped = part.to_string_lossy().replace('\'', r"'\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

/// 單次合併專用的清單檔，離開作用域時自動刪除
#[derive(Debug)]
pub struct ConcatListFile {
    path: PathBuf,
}

impl ConcatListFile {
    /// 在指定資料夾建立唯一命名的清單檔
    pub fn create(directory: &Path, parts: &[PathBuf]) -> io::Result<Self> {
        let path = directory.join(format!("concat-list-{}.txt", Uuid::new_v4()));
        fs::write(&path, format_concat_list(parts))?;
        debug!("已建立合併清單: {}", path.display());
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ConcatListFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("無法刪除合併清單 {}: {e}", self.path.display());
        }
    }
}
