use crate::error::{JoinError, JoinResult};
use std::path::{Path, PathBuf};

/// 一次合併工作：依序的分段路徑與輸出路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub parts: Vec<PathBuf>,
    pub destination_path: PathBuf,
}

impl JoinRequest {
    #[must_use]
    pub fn new(parts: Vec<PathBuf>, destination_path: PathBuf) -> Self {
        Self {
            parts,
            destination_path,
        }
    }

    /// 在啟動任何程序之前檢查請求
    ///
    /// 只有一個分段仍然合法（等同複製），分段數量由呼叫端把關。
    pub fn validate(&self) -> JoinResult<()> {
        if self.parts.is_empty() {
            return Err(JoinError::InvalidRequest("沒有任何分段".to_string()));
        }

        if is_blank(&self.destination_path) {
            return Err(JoinError::InvalidRequest("未指定輸出路徑".to_string()));
        }

        let parent = self
            .destination_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !parent.is_dir() {
            return Err(JoinError::InvalidRequest(format!(
                "輸出資料夾不存在: {}",
                parent.display()
            )));
        }

        Ok(())
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_parts_is_invalid() {
        let request = JoinRequest::new(Vec::new(), PathBuf::from("out.mp4"));
        assert!(matches!(
            request.validate(),
            Err(JoinError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_blank_destination_is_invalid() {
        for destination in ["", "   "] {
            let request =
                JoinRequest::new(vec![PathBuf::from("a.mp4")], PathBuf::from(destination));
            assert!(matches!(
                request.validate(),
                Err(JoinError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_missing_destination_parent_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let request = JoinRequest::new(
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
            temp_dir.path().join("missing").join("out.mp4"),
        );
        assert!(matches!(
            request.validate(),
            Err(JoinError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_relative_destination_uses_current_directory() {
        let request = JoinRequest::new(
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
            PathBuf::from("out.mp4"),
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_single_part_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let request = JoinRequest::new(
            vec![PathBuf::from("a.mp4")],
            temp_dir.path().join("out.mp4"),
        );
        assert!(request.validate().is_ok());
    }
}
