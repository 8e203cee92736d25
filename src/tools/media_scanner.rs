use crate::config::JoinerSettings;
use crate::tools::{MediaItem, folder_exists};
use log::debug;
use std::path::Path;
use walkdir::WalkDir;

/// 列出資料夾內（不遞迴）符合影片副檔名與分段標記的檔案
///
/// 路徑空白、不存在或不是資料夾時回傳空列表，不會回傳錯誤。
/// 結果保留檔案系統列舉順序，不保證依分段編號排序。
#[must_use]
pub fn scan_media_parts(directory: &Path, settings: &JoinerSettings) -> Vec<MediaItem> {
    if !folder_exists(directory) {
        return Vec::new();
    }

    let items: Vec<MediaItem> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| settings.is_multi_part_video(entry.path()))
        .filter_map(|entry| MediaItem::from_path(entry.path()))
        .collect();

    debug!("掃描 {} 找到 {} 個分段檔案", directory.display(), items.len());
    items
}
