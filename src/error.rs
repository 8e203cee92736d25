use std::path::PathBuf;
use thiserror::Error;

/// 合併流程的錯誤類型
#[derive(Error, Debug)]
pub enum JoinError {
    /// 請求內容不完整（沒有分段、沒有輸出路徑、輸出資料夾不存在）
    #[error("無效的合併請求: {0}")]
    InvalidRequest(String),

    /// 檔名中找不到 "part" 標記，無法推導輸出檔名
    #[error("檔名格式不正確，找不到 part 標記: {0}")]
    MalformedName(String),

    /// 無法啟動外部程序（執行檔不存在或沒有權限）
    #[error("無法啟動 {program}: {source}")]
    ProcessFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 外部程序執行後以非零狀態結束
    #[error("ffmpeg 執行失敗 ({}): {}", exit_code_label(.exit_code), .destination.display())]
    ExternalTool {
        destination: PathBuf,
        exit_code: Option<i32>,
    },

    /// 已有合併任務在執行中
    #[error("已有合併任務正在執行")]
    Busy,

    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "被信號終止".to_string(), |c| format!("結束代碼 {c}"))
}

pub type JoinResult<T> = std::result::Result<T, JoinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_message_with_code() {
        let err = JoinError::ExternalTool {
            destination: PathBuf::from("/out/Movie.mp4"),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "ffmpeg 執行失敗 (結束代碼 1): /out/Movie.mp4");
    }

    #[test]
    fn test_external_tool_message_without_code() {
        let err = JoinError::ExternalTool {
            destination: PathBuf::from("/out/Movie.mp4"),
            exit_code: None,
        };
        assert!(err.to_string().contains("被信號終止"));
    }
}
