use anyhow::{Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 路徑非空白且為已存在的資料夾
#[must_use]
pub fn folder_exists(path: &Path) -> bool {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return false;
    }
    path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_folder_exists() {
        let temp_dir = TempDir::new().unwrap();
        assert!(folder_exists(temp_dir.path()));
        assert!(!folder_exists(&temp_dir.path().join("missing")));
        assert!(!folder_exists(Path::new("")));
        assert!(!folder_exists(Path::new("   ")));
    }

    #[test]
    fn test_folder_exists_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(!folder_exists(&file));
        assert!(validate_directory_exists(&file).is_err());
    }

    #[test]
    fn test_validate_directory_exists() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_directory_exists(temp_dir.path()).is_ok());
        assert!(validate_directory_exists(&temp_dir.path().join("missing")).is_err());
    }
}
