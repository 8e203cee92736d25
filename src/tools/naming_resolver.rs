//! 輸出檔名推導
//!
//! 從 "Movie - part 1.mp4" 這類檔名去掉 part 之後的部分，得到 "Movie.mp4"

use crate::error::{JoinError, JoinResult};
use crate::tools::MediaItem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static REGEX_PART_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)part").expect("Invalid regex"));

/// 名稱與 part 之間的分隔字元，只移除一次
static REGEX_TRAILING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s*[-_.]\s*|\s+)$").expect("Invalid regex"));

/// 取得去掉分段標記後的基本名稱（不含副檔名）
pub fn base_name(file_name: &str) -> JoinResult<String> {
    let marker = REGEX_PART_MARKER
        .find_iter(file_name)
        .last()
        .ok_or_else(|| JoinError::MalformedName(file_name.to_string()))?;

    let before = &file_name[..marker.start()];
    let base = REGEX_TRAILING_SEPARATOR.replace(before, "");

    if base.trim().is_empty() {
        return Err(JoinError::MalformedName(file_name.to_string()));
    }

    Ok(base.into_owned())
}

/// 合併後的輸出檔名，例如 "Movie.mp4"
pub fn output_file_name(item: &MediaItem) -> JoinResult<String> {
    Ok(format!("{}{}", base_name(&item.name)?, item.extension))
}

/// 組合輸出資料夾與推導出的檔名
pub fn destination_path(output_dir: &Path, item: &MediaItem) -> JoinResult<PathBuf> {
    Ok(output_dir.join(output_file_name(item)?))
}
