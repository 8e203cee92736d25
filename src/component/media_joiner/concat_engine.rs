//! 呼叫 ffmpeg concat demuxer 合併分段
//!
//! 每次合併建立獨立的清單檔，同一個引擎上的合併依序執行。

use super::events::{JoinEvent, JoinOutcome, LogEntry, LogSource};
use crate::config::JoinerSettings;
use crate::error::{JoinError, JoinResult};
use crate::tools::{ConcatListFile, FfmpegConcatCommand, JoinRequest};
use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// 媒體合併介面
pub trait MediaConcat: Send + Sync {
    /// 合併一個請求，過程中的事件送到 `events`
    fn join(&self, request: &JoinRequest, events: &Sender<JoinEvent>) -> JoinResult<JoinOutcome>;

    /// 依序合併多個請求，遇到第一個錯誤即中止，之後的請求不會執行
    fn join_multiple(
        &self,
        requests: &[JoinRequest],
        events: &Sender<JoinEvent>,
    ) -> JoinResult<Vec<JoinOutcome>> {
        if requests.is_empty() {
            return Err(JoinError::InvalidRequest("沒有任何合併請求".to_string()));
        }

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            outcomes.push(self.join(request, events)?);
        }
        Ok(outcomes)
    }
}

pub struct ConcatEngine {
    ffmpeg_path: PathBuf,
    list_directory: PathBuf,
    fail_on_nonzero_exit: bool,
    lock: Mutex<()>,
}

impl ConcatEngine {
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<PathBuf>, list_directory: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            list_directory: list_directory.into(),
            fail_on_nonzero_exit: true,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &JoinerSettings) -> Self {
        Self::new(&settings.ffmpeg_path, settings.list_directory())
            .with_fail_on_nonzero_exit(settings.fail_on_nonzero_exit)
    }

    #[must_use]
    pub const fn with_fail_on_nonzero_exit(mut self, enabled: bool) -> Self {
        self.fail_on_nonzero_exit = enabled;
        self
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    fn run_process(
        &self,
        request: &JoinRequest,
        events: &Sender<JoinEvent>,
    ) -> JoinResult<JoinOutcome> {
        // concat demuxer 以清單檔所在資料夾解析相對路徑
        let parts = request
            .parts
            .iter()
            .map(std::path::absolute)
            .collect::<io::Result<Vec<PathBuf>>>()?;
        let list_file = ConcatListFile::create(&self.list_directory, &parts)?;
        let ffmpeg_cmd = FfmpegConcatCommand::new(
            &self.ffmpeg_path,
            list_file.path(),
            &request.destination_path,
        );

        let mut child = ffmpeg_cmd
            .build_command()
            .spawn()
            .map_err(|source| JoinError::ProcessFailure {
                program: self.ffmpeg_path.display().to_string(),
                source,
            })?;

        info!(
            "啟動合併 [{}]: {} 個分段 -> {}",
            child.id(),
            request.parts.len(),
            request.destination_path.display()
        );

        let readers: Vec<JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|stdout| spawn_line_reader(stdout, LogSource::Stdout, events.clone())),
            child
                .stderr
                .take()
                .map(|stderr| spawn_line_reader(stderr, LogSource::Stderr, events.clone())),
        ]
        .into_iter()
        .flatten()
        .collect();

        let status = finish_process(&mut child, readers, Child::wait)?;

        let outcome = JoinOutcome {
            destination: request.destination_path.clone(),
            exit_code: status.code(),
            success: status.success(),
        };

        if outcome.success {
            info!("合併完成: {}", outcome.destination.display());
        } else if self.fail_on_nonzero_exit {
            return Err(JoinError::ExternalTool {
                destination: outcome.destination,
                exit_code: outcome.exit_code,
            });
        } else {
            warn!(
                "ffmpeg 以非零狀態結束 ({:?})，仍視為完成: {}",
                outcome.exit_code,
                outcome.destination.display()
            );
        }

        Ok(outcome)
    }
}

impl MediaConcat for ConcatEngine {
    fn join(&self, request: &JoinRequest, events: &Sender<JoinEvent>) -> JoinResult<JoinOutcome> {
        request.validate()?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let destination = request.destination_path.clone();
        emit(
            events,
            JoinEvent::Started {
                destination: destination.clone(),
            },
        );

        match self.run_process(request, events) {
            Ok(outcome) => {
                emit(events, JoinEvent::Completed(outcome.clone()));
                Ok(outcome)
            }
            Err(e) => {
                warn!("合併失敗: {e}");
                emit(
                    events,
                    JoinEvent::Failed {
                        destination,
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }
}

/// 等待程序結束並收回輸出讀取執行緒
///
/// 等待失敗時先終止程序，讀取執行緒結束後才回傳，終止事件一定排在所有輸出之後。
fn finish_process<W>(
    child: &mut Child,
    readers: Vec<JoinHandle<()>>,
    wait: W,
) -> io::Result<ExitStatus>
where
    W: FnOnce(&mut Child) -> io::Result<ExitStatus>,
{
    let status = wait(child);

    if let Err(e) = &status {
        warn!("等待 ffmpeg 結束失敗，終止程序 [{}]: {e}", child.id());
        if let Err(kill_err) = child.kill() {
            warn!("無法終止程序 [{}]: {kill_err}", child.id());
        }
        if let Err(wait_err) = child.wait() {
            warn!("無法回收程序 [{}]: {wait_err}", child.id());
        }
    }

    for reader in readers {
        if reader.join().is_err() {
            warn!("輸出讀取執行緒異常結束");
        }
    }

    status
}

fn emit(events: &Sender<JoinEvent>, event: JoinEvent) {
    if events.send(event).is_err() {
        debug!("事件接收端已關閉");
    }
}

/// 逐行讀取程序輸出並轉成日誌事件
fn spawn_line_reader<R>(stream: R, source: LogSource, events: Sender<JoinEvent>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    for text in split_output_lines(&buffer) {
                        emit(&events, JoinEvent::Log(LogEntry::new(source, text)));
                    }
                }
                Err(e) => {
                    warn!("讀取 ffmpeg 輸出失敗: {e}");
                    break;
                }
            }
        }
    })
}

/// ffmpeg 的進度行以 `\r` 分隔，兩種換行都視為一行結束
fn split_output_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split(['\r', '\n'])
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn test_split_output_lines() {
        assert_eq!(split_output_lines(b"hello\n"), vec!["hello"]);
        assert_eq!(
            split_output_lines(b"frame=1\rframe=2\r\n"),
            vec!["frame=1", "frame=2"]
        );
        assert!(split_output_lines(b"   \n").is_empty());
    }

    #[test]
    fn test_split_output_lines_invalid_utf8() {
        let lines = split_output_lines(b"bad \xff byte\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("bad "));
    }

    #[test]
    fn test_from_settings() {
        let settings = JoinerSettings {
            ffmpeg_path: PathBuf::from("/opt/ffmpeg"),
            ..JoinerSettings::default()
        };
        let engine = ConcatEngine::from_settings(&settings);
        assert_eq!(engine.ffmpeg_path(), Path::new("/opt/ffmpeg"));
        assert!(engine.fail_on_nonzero_exit);
    }

    #[test]
    fn test_invalid_request_emits_no_events() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ConcatEngine::new("ffmpeg", temp_dir.path());
        let (tx, rx) = mpsc::channel();

        let request = JoinRequest::new(Vec::new(), temp_dir.path().join("out.mp4"));
        let result = engine.join(&request, &tx);

        assert!(matches!(result, Err(JoinError::InvalidRequest(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(fs_entries(temp_dir.path()), 0);
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ConcatEngine::new("ffmpeg", temp_dir.path());
        let (tx, _rx) = mpsc::channel();

        assert!(matches!(
            engine.join_multiple(&[], &tx),
            Err(JoinError::InvalidRequest(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_wait_kills_child_and_drains_readers() {
        use std::process::{Command, Stdio};

        let mut child = Command::new("sh")
            .args(["-c", "echo started; exec sleep 30"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        let (tx, rx) = mpsc::channel();
        let readers = vec![spawn_line_reader(
            child.stdout.take().unwrap(),
            LogSource::Stdout,
            tx.clone(),
        )];
        drop(tx);

        let result = finish_process(&mut child, readers, |_| {
            Err(io::Error::other("wait failed"))
        });

        assert!(result.is_err());
        assert!(child.try_wait().unwrap().is_some(), "程序應該已被終止並回收");
        // 讀取執行緒已結束，之後不會再有任何事件
        let _ = rx.try_iter().count();
        assert!(matches!(
            rx.recv_timeout(std::time::Duration::from_millis(10)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    fn fs_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }
}
