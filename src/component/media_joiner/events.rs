//! 合併過程中送回呼叫端的事件與日誌

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

/// 日誌來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Stdout,
    Stderr,
    /// 由合併流程本身產生的訊息
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub source: LogSource,
    pub text: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(source: LogSource, text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            source,
            text: text.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// ffmpeg 結束後的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub destination: PathBuf,
    /// 被信號終止時為 None
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// 合併事件
///
/// 通過驗證的合併一定以 `Completed` 或 `Failed` 其中之一結束，且在所有輸出行之後。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinEvent {
    Started { destination: PathBuf },
    Log(LogEntry),
    Completed(JoinOutcome),
    Failed { destination: PathBuf, message: String },
}

impl JoinEvent {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry::new(LogSource::Stderr, "frame=  100");
        let shown = entry.to_string();
        assert!(shown.starts_with('['));
        assert!(shown.ends_with("] frame=  100"));
    }

    #[test]
    fn test_terminal_events() {
        let outcome = JoinOutcome {
            destination: PathBuf::from("out.mp4"),
            exit_code: Some(0),
            success: true,
        };
        assert!(JoinEvent::Completed(outcome).is_terminal());
        assert!(
            JoinEvent::Failed {
                destination: PathBuf::from("out.mp4"),
                message: "boom".to_string(),
            }
            .is_terminal()
        );
        assert!(!JoinEvent::Log(LogEntry::new(LogSource::Stdout, "x")).is_terminal());
        assert!(
            !JoinEvent::Started {
                destination: PathBuf::from("out.mp4")
            }
            .is_terminal()
        );
    }
}
