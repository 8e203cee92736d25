//! 多段影片合併元件
//!
//! 掃描來源資料夾中依 "part N" 命名的影片，以 ffmpeg 串流複製合併為單一檔案

mod concat_engine;
mod events;
mod join_session;
mod main;

pub use concat_engine::{ConcatEngine, MediaConcat};
pub use events::{JoinEvent, JoinOutcome, LogEntry, LogSource};
pub use join_session::{JoinSession, SessionChange};
pub use main::MediaJoiner;
