//! 依輸出檔名將分段分組，組內依分段編號排序

use crate::error::JoinResult;
use crate::tools::{JoinRequest, MediaItem, destination_path, output_file_name};
use log::warn;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static REGEX_PART_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)part\s*(\d+)").expect("Invalid regex"));

/// 同一部影片的所有分段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartGroup {
    /// 合併後的檔名（含副檔名）
    pub output_name: String,
    /// 依分段編號排序的分段
    pub parts: Vec<MediaItem>,
}

impl PartGroup {
    /// 至少兩個分段才需要合併
    #[must_use]
    pub fn is_joinable(&self) -> bool {
        self.parts.len() >= 2
    }

    pub fn to_request(&self, output_dir: &Path) -> JoinResult<JoinRequest> {
        let destination = match self.parts.first() {
            Some(first) => destination_path(output_dir, first)?,
            None => output_dir.join(&self.output_name),
        };
        Ok(JoinRequest::new(
            self.parts.iter().map(MediaItem::full_path).collect(),
            destination,
        ))
    }
}

/// 從檔名取得分段編號，例如 "Movie - part 3.mp4" 為 3
#[must_use]
pub fn part_number(file_name: &str) -> Option<u32> {
    REGEX_PART_NUMBER
        .captures_iter(file_name)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 將掃描結果分組
///
/// 群組保留第一次出現的順序；無法推導輸出檔名的項目會被略過。
#[must_use]
pub fn group_parts(items: &[MediaItem]) -> Vec<PartGroup> {
    let mut groups: Vec<PartGroup> = Vec::new();
    let mut index_by_key: HashMap<(PathBuf, String), usize> = HashMap::new();

    for item in items {
        let output_name = match output_file_name(item) {
            Ok(name) => name,
            Err(e) => {
                warn!("略過無法分組的檔案: {e}");
                continue;
            }
        };

        let key = (item.directory.clone(), output_name.clone());
        match index_by_key.get(&key) {
            Some(&index) => groups[index].parts.push(item.clone()),
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(PartGroup {
                    output_name,
                    parts: vec![item.clone()],
                });
            }
        }
    }

    for group in &mut groups {
        group
            .parts
            .sort_by_key(|item| part_number(&item.name).unwrap_or(u32::MAX));
    }

    groups
}
