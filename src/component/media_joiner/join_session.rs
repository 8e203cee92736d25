//! 合併流程的狀態：候選檔案、依序的已選分段、日誌與按鈕啟用條件
//!
//! 所有狀態只在擁有 `JoinSession` 的執行緒上修改；背景合併只透過 channel 送回事件。

use super::concat_engine::MediaConcat;
use super::events::{JoinEvent, JoinOutcome, LogEntry, LogSource};
use crate::config::JoinerSettings;
use crate::error::{JoinError, JoinResult};
use crate::tools::{
    JoinRequest, MediaItem, destination_path, folder_exists, group_parts, scan_media_parts,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 狀態變更通知的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Sources,
    Selection,
    Highlight,
    Destination,
    Log,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    /// 由已選分段建立的單次合併，完成後清空選取
    Selection,
    /// 依分組一次合併多部影片
    Batch,
}

struct ActiveJob {
    kind: JobKind,
    worker: JoinHandle<JoinResult<Vec<JoinOutcome>>>,
}

type Observer = Box<dyn FnMut(SessionChange)>;

pub struct JoinSession {
    settings: JoinerSettings,
    engine: Arc<dyn MediaConcat>,
    source_directory: PathBuf,
    destination_directory: PathBuf,
    sources: Vec<MediaItem>,
    selected_parts: Vec<MediaItem>,
    selected_source: Option<MediaItem>,
    selected_part: Option<MediaItem>,
    log: Vec<LogEntry>,
    active_job: Option<ActiveJob>,
    event_sender: Sender<JoinEvent>,
    event_receiver: Receiver<JoinEvent>,
    observer: Option<Observer>,
}

impl JoinSession {
    #[must_use]
    pub fn new(settings: JoinerSettings, engine: Arc<dyn MediaConcat>) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();
        Self {
            settings,
            engine,
            source_directory: PathBuf::new(),
            destination_directory: PathBuf::new(),
            sources: Vec::new(),
            selected_parts: Vec::new(),
            selected_source: None,
            selected_part: None,
            log: Vec::new(),
            active_job: None,
            event_sender,
            event_receiver,
            observer: None,
        }
    }

    /// 設定狀態變更後呼叫的通知函式
    pub fn set_observer(&mut self, observer: impl FnMut(SessionChange) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&mut self, change: SessionChange) {
        if let Some(observer) = self.observer.as_mut() {
            observer(change);
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[MediaItem] {
        &self.sources
    }

    #[must_use]
    pub fn selected_parts(&self) -> &[MediaItem] {
        &self.selected_parts
    }

    #[must_use]
    pub const fn selected_source(&self) -> Option<&MediaItem> {
        self.selected_source.as_ref()
    }

    #[must_use]
    pub const fn selected_part(&self) -> Option<&MediaItem> {
        self.selected_part.as_ref()
    }

    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    #[must_use]
    pub fn last_log_text(&self) -> Option<&str> {
        self.log.last().map(|entry| entry.text.as_str())
    }

    #[must_use]
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    #[must_use]
    pub fn destination_directory(&self) -> &Path {
        &self.destination_directory
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.active_job.is_some()
    }

    pub fn can_add_selected_source(&self) -> bool {
        !self.is_busy()
            && self
                .selected_source
                .as_ref()
                .is_some_and(|item| !self.selected_parts.contains(item))
    }

    pub const fn can_remove_selected_part(&self) -> bool {
        !self.is_busy() && self.selected_part.is_some()
    }

    pub fn can_join(&self) -> bool {
        !self.is_busy()
            && self.selected_parts.len() >= 2
            && folder_exists(&self.destination_directory)
    }

    /// 變更來源資料夾並重新掃描，合併進行中時不做任何變更
    pub fn set_source_directory(&mut self, path: impl Into<PathBuf>) -> bool {
        if self.is_busy() {
            return false;
        }
        self.source_directory = path.into();
        self.rescan()
    }

    /// 重新掃描來源資料夾，移除已不存在於掃描結果的選取項目
    ///
    /// 合併進行中時已選分段不可變動，回傳 `false`。
    pub fn rescan(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.sources = scan_media_parts(&self.source_directory, &self.settings);
        info!(
            "來源資料夾 {} 找到 {} 個分段",
            self.source_directory.display(),
            self.sources.len()
        );
        self.notify(SessionChange::Sources);

        let before = self.selected_parts.len();
        let sources = &self.sources;
        self.selected_parts.retain(|item| sources.contains(item));
        if self.selected_parts.len() != before {
            self.notify(SessionChange::Selection);
        }

        let stale_source = self
            .selected_source
            .as_ref()
            .is_some_and(|item| !self.sources.contains(item));
        let stale_part = self
            .selected_part
            .as_ref()
            .is_some_and(|item| !self.selected_parts.contains(item));
        if stale_source {
            self.selected_source = None;
        }
        if stale_part {
            self.selected_part = None;
        }
        if stale_source || stale_part {
            self.notify(SessionChange::Highlight);
        }
        true
    }

    pub fn set_destination_directory(&mut self, path: impl Into<PathBuf>) {
        self.destination_directory = path.into();
        self.notify(SessionChange::Destination);
    }

    /// 標示候選清單中的項目，不在候選清單中的項目會被忽略
    pub fn select_source(&mut self, item: Option<MediaItem>) -> bool {
        let accepted = item.as_ref().is_none_or(|i| self.sources.contains(i));
        if accepted {
            self.selected_source = item;
            self.notify(SessionChange::Highlight);
        }
        accepted
    }

    /// 標示已選分段中的項目
    pub fn select_part(&mut self, item: Option<MediaItem>) -> bool {
        let accepted = item
            .as_ref()
            .is_none_or(|i| self.selected_parts.contains(i));
        if accepted {
            self.selected_part = item;
            self.notify(SessionChange::Highlight);
        }
        accepted
    }

    /// 把標示中的候選項目加到已選分段尾端
    pub fn add_selected_source(&mut self) -> bool {
        if !self.can_add_selected_source() {
            return false;
        }
        match self.selected_source.clone() {
            Some(item) => self.add_to_selection(item),
            None => false,
        }
    }

    /// 加到已選分段尾端；重複或不在最近一次掃描結果中的項目會被拒絕
    pub fn add_to_selection(&mut self, item: MediaItem) -> bool {
        if self.is_busy() || self.selected_parts.contains(&item) || !self.sources.contains(&item) {
            return false;
        }
        self.selected_parts.push(item);
        self.notify(SessionChange::Selection);
        true
    }

    pub fn remove_selected_part(&mut self) -> bool {
        match self.selected_part.clone() {
            Some(item) => self.remove_from_selection(&item),
            None => false,
        }
    }

    pub fn remove_from_selection(&mut self, item: &MediaItem) -> bool {
        if self.is_busy() {
            return false;
        }
        let Some(index) = self.selected_parts.iter().position(|i| i == item) else {
            return false;
        };
        self.selected_parts.remove(index);
        self.notify(SessionChange::Selection);

        if self.selected_part.as_ref() == Some(item) {
            self.selected_part = None;
            self.notify(SessionChange::Highlight);
        }
        true
    }

    /// 調整已選分段的順序
    pub fn move_part(&mut self, from: usize, to: usize) -> bool {
        let len = self.selected_parts.len();
        if self.is_busy() || from >= len || to >= len {
            return false;
        }
        if from != to {
            let item = self.selected_parts.remove(from);
            self.selected_parts.insert(to, item);
            self.notify(SessionChange::Selection);
        }
        true
    }

    /// 以已選分段建立合併請求並在背景執行
    ///
    /// 輸出檔名由第一個分段推導。驗證失敗時不會啟動任何背景工作。
    pub fn trigger_join(&mut self) -> JoinResult<JoinRequest> {
        if self.is_busy() {
            return Err(JoinError::Busy);
        }
        if self.selected_parts.len() < 2 {
            return Err(JoinError::InvalidRequest("至少需要選取兩個分段".to_string()));
        }
        self.ensure_destination_exists()?;

        let destination = destination_path(&self.destination_directory, &self.selected_parts[0])?;
        let request = JoinRequest::new(
            self.selected_parts.iter().map(MediaItem::full_path).collect(),
            destination,
        );
        request.validate()?;

        let engine = Arc::clone(&self.engine);
        let events = self.event_sender.clone();
        let job_request = request.clone();
        let worker = thread::spawn(move || {
            engine
                .join(&job_request, &events)
                .map(|outcome| vec![outcome])
        });

        self.start_job(JobKind::Selection, worker);
        Ok(request)
    }

    /// 將候選清單依輸出檔名分組，每組兩個以上分段時依序合併
    pub fn trigger_join_all(&mut self) -> JoinResult<Vec<JoinRequest>> {
        if self.is_busy() {
            return Err(JoinError::Busy);
        }
        self.ensure_destination_exists()?;

        let requests = group_parts(&self.sources)
            .iter()
            .filter(|group| group.is_joinable())
            .map(|group| group.to_request(&self.destination_directory))
            .collect::<JoinResult<Vec<_>>>()?;

        if requests.is_empty() {
            return Err(JoinError::InvalidRequest(
                "找不到可合併的分段群組".to_string(),
            ));
        }

        let engine = Arc::clone(&self.engine);
        let events = self.event_sender.clone();
        let job_requests = requests.clone();
        let worker = thread::spawn(move || engine.join_multiple(&job_requests, &events));

        self.start_job(JobKind::Batch, worker);
        Ok(requests)
    }

    fn ensure_destination_exists(&self) -> JoinResult<()> {
        if folder_exists(&self.destination_directory) {
            Ok(())
        } else {
            Err(JoinError::InvalidRequest(format!(
                "輸出資料夾不存在: {}",
                self.destination_directory.display()
            )))
        }
    }

    fn start_job(&mut self, kind: JobKind, worker: JoinHandle<JoinResult<Vec<JoinOutcome>>>) {
        self.active_job = Some(ActiveJob { kind, worker });
        self.notify(SessionChange::Busy);
    }

    /// 處理目前已送達的事件，回傳處理的事件數
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
            handled += 1;
        }

        let finished = self
            .active_job
            .as_ref()
            .is_some_and(|job| job.worker.is_finished());
        if finished {
            // 背景工作結束後可能還有剛送出的事件
            while let Ok(event) = self.event_receiver.try_recv() {
                self.handle_event(event);
                handled += 1;
            }
            self.finish_job();
        }

        handled
    }

    /// 最多等待 `timeout` 直到有事件送達，然後處理所有已送達的事件
    pub fn wait_for_event(&mut self, timeout: Duration) -> usize {
        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                1 + self.process_events()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                self.process_events()
            }
        }
    }

    /// 阻塞直到背景合併結束
    pub fn wait_until_idle(&mut self) {
        while self.is_busy() {
            self.wait_for_event(Duration::from_millis(100));
        }
    }

    fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        self.notify(SessionChange::Log);
    }

    fn handle_event(&mut self, event: JoinEvent) {
        match event {
            JoinEvent::Started { destination } => {
                self.push_log(LogEntry::new(
                    LogSource::Session,
                    format!("開始合併: {}", destination.display()),
                ));
            }
            JoinEvent::Log(entry) => self.push_log(entry),
            JoinEvent::Completed(outcome) => {
                let text = if outcome.success {
                    format!("完成: {}", outcome.destination.display())
                } else {
                    format!(
                        "完成（ffmpeg 結束代碼 {:?}）: {}",
                        outcome.exit_code,
                        outcome.destination.display()
                    )
                };
                self.push_log(LogEntry::new(LogSource::Session, text));

                let clears_selection = self
                    .active_job
                    .as_ref()
                    .is_some_and(|job| job.kind == JobKind::Selection);
                if clears_selection {
                    self.selected_parts.clear();
                    self.selected_part = None;
                    self.notify(SessionChange::Selection);
                    self.notify(SessionChange::Highlight);
                }
            }
            JoinEvent::Failed {
                destination,
                message,
            } => {
                self.push_log(LogEntry::new(
                    LogSource::Session,
                    format!("失敗: {} ({message})", destination.display()),
                ));
            }
        }
    }

    fn finish_job(&mut self) {
        let Some(job) = self.active_job.take() else {
            return;
        };

        match job.worker.join() {
            Ok(Ok(outcomes)) => {
                info!("合併工作結束，共完成 {} 個", outcomes.len());
            }
            // 驗證錯誤不會產生 Failed 事件，需要在這裡記錄
            Ok(Err(e @ (JoinError::InvalidRequest(_) | JoinError::MalformedName(_)))) => {
                error!("合併工作中止: {e}");
                self.push_log(LogEntry::new(LogSource::Session, format!("已中止: {e}")));
            }
            Ok(Err(e)) => {
                error!("合併工作失敗: {e}");
            }
            Err(_) => {
                error!("合併執行緒異常結束");
                self.push_log(LogEntry::new(
                    LogSource::Session,
                    "合併執行緒異常結束".to_string(),
                ));
            }
        }

        self.notify(SessionChange::Busy);
    }
}
