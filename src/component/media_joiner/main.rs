//! 多段影片合併的互動介面
//!
//! 以選單操作 `JoinSession`，背景合併時顯示 spinner 與最新一行日誌

use super::concat_engine::ConcatEngine;
use super::join_session::JoinSession;
use crate::config::Config;
use crate::tools::{MediaItem, group_parts, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 手動合併畫面的動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddPart,
    RemovePart,
    MoveUp,
    MoveDown,
    ChangeDestination,
    Join,
    ShowLog,
    Back,
}

impl Action {
    const fn label(self) -> &'static str {
        match self {
            Self::AddPart => "加入分段",
            Self::RemovePart => "移除分段",
            Self::MoveUp => "分段上移",
            Self::MoveDown => "分段下移",
            Self::ChangeDestination => "變更輸出資料夾",
            Self::Join => "開始合併",
            Self::ShowLog => "顯示日誌",
            Self::Back => "返回",
        }
    }
}

pub struct MediaJoiner {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl MediaJoiner {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    fn new_session(&self) -> JoinSession {
        let engine = Arc::new(ConcatEngine::from_settings(&self.config.settings));
        JoinSession::new(self.config.settings.clone(), engine)
    }

    /// 手動選取分段並合併
    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 合併多段影片 ===").cyan().bold());

        let mut session = self.new_session();
        let source = self.prompt_directory("請輸入來源資料夾路徑")?;
        validate_directory_exists(&source)?;
        session.set_source_directory(source);

        if session.sources().is_empty() {
            println!("{}", style("找不到任何多段影片檔案").yellow());
            return Ok(());
        }

        let destination = self.prompt_directory("請輸入輸出資料夾路徑")?;
        session.set_destination_directory(destination);

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                println!("{}", style("操作已取消").yellow());
                return Ok(());
            }

            self.print_state(&session);

            let actions = Self::available_actions(&session);
            let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("請選擇動作")
                .items(&labels)
                .default(0)
                .interact_opt()?;

            let Some(index) = selection else {
                return Ok(());
            };

            match actions[index] {
                Action::AddPart => self.add_part(&mut session)?,
                Action::RemovePart => self.remove_part(&mut session)?,
                Action::MoveUp => self.move_part(&mut session, true)?,
                Action::MoveDown => self.move_part(&mut session, false)?,
                Action::ChangeDestination => {
                    let destination = self.prompt_directory("請輸入輸出資料夾路徑")?;
                    session.set_destination_directory(destination);
                }
                Action::Join => self.join_selection(&mut session)?,
                Action::ShowLog => self.print_log(&session, 0),
                Action::Back => return Ok(()),
            }
        }
    }

    /// 將來源資料夾中所有分組依序合併
    pub fn run_batch(&self) -> Result<()> {
        println!("{}", style("=== 自動合併所有分組 ===").cyan().bold());

        let mut session = self.new_session();
        let source = self.prompt_directory("請輸入來源資料夾路徑")?;
        validate_directory_exists(&source)?;
        session.set_source_directory(source);

        let groups: Vec<_> = group_parts(session.sources())
            .into_iter()
            .filter(|g| g.is_joinable())
            .collect();

        if groups.is_empty() {
            println!("{}", style("找不到可合併的分段群組").yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(format!("找到 {} 組可合併的影片：", groups.len())).green()
        );
        for group in &groups {
            println!("  {} ({} 個分段)", group.output_name, group.parts.len());
            for part in &group.parts {
                println!("    {}", style(&part.name).dim());
            }
        }

        let destination = self.prompt_directory("請輸入輸出資料夾路徑")?;
        session.set_destination_directory(destination);

        if !Confirm::new()
            .with_prompt("確定要合併這些影片嗎？")
            .default(false)
            .interact()?
        {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        if self.shutdown_signal.load(Ordering::SeqCst) {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        let requests = session.trigger_join_all()?;
        info!("開始批次合併，共 {} 組", requests.len());
        let log_start = session.log().len();
        self.wait_with_spinner(&mut session);
        self.print_log(&session, log_start);

        Ok(())
    }

    fn available_actions(session: &JoinSession) -> Vec<Action> {
        let mut actions = Vec::new();
        if session.selected_parts().len() < session.sources().len() {
            actions.push(Action::AddPart);
        }
        if !session.selected_parts().is_empty() {
            actions.push(Action::RemovePart);
        }
        if session.selected_parts().len() >= 2 {
            actions.push(Action::MoveUp);
            actions.push(Action::MoveDown);
        }
        actions.push(Action::ChangeDestination);
        if session.can_join() {
            actions.push(Action::Join);
        }
        actions.push(Action::ShowLog);
        actions.push(Action::Back);
        actions
    }

    fn prompt_directory(&self, prompt: &str) -> Result<PathBuf> {
        let path: String = Input::new().with_prompt(prompt).interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn pick_item(prompt: &str, items: &[MediaItem]) -> Result<Option<usize>> {
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&names)
            .default(0)
            .interact_opt()?;
        Ok(selection)
    }

    fn add_part(&self, session: &mut JoinSession) -> Result<()> {
        let candidates: Vec<MediaItem> = session
            .sources()
            .iter()
            .filter(|item| !session.selected_parts().contains(item))
            .cloned()
            .collect();

        if let Some(index) = Self::pick_item("選擇要加入的分段", &candidates)? {
            session.select_source(Some(candidates[index].clone()));
            if session.can_add_selected_source() {
                session.add_selected_source();
            }
        }
        Ok(())
    }

    fn remove_part(&self, session: &mut JoinSession) -> Result<()> {
        let parts = session.selected_parts().to_vec();
        if let Some(index) = Self::pick_item("選擇要移除的分段", &parts)? {
            session.select_part(Some(parts[index].clone()));
            if session.can_remove_selected_part() {
                session.remove_selected_part();
            }
        }
        Ok(())
    }

    fn move_part(&self, session: &mut JoinSession, up: bool) -> Result<()> {
        let parts = session.selected_parts().to_vec();
        let prompt = if up { "選擇要上移的分段" } else { "選擇要下移的分段" };
        if let Some(index) = Self::pick_item(prompt, &parts)? {
            let target = if up {
                index.saturating_sub(1)
            } else {
                (index + 1).min(parts.len() - 1)
            };
            session.move_part(index, target);
        }
        Ok(())
    }

    fn join_selection(&self, session: &mut JoinSession) -> Result<()> {
        let log_start = session.log().len();
        let request = session.trigger_join()?;
        println!(
            "{}",
            style(format!("輸出: {}", request.destination_path.display())).dim()
        );

        self.wait_with_spinner(session);
        self.print_log(session, log_start);
        Ok(())
    }

    fn wait_with_spinner(&self, session: &mut JoinSession) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress bar template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));

        while session.is_busy() {
            session.wait_for_event(Duration::from_millis(100));
            if let Some(text) = session.last_log_text() {
                spinner.set_message(text.to_string());
            }
        }

        spinner.finish_and_clear();
    }

    fn print_state(&self, session: &JoinSession) {
        println!();
        println!(
            "{} {}",
            style("來源:").dim(),
            session.source_directory().display()
        );
        println!(
            "{} {}",
            style("輸出:").dim(),
            session.destination_directory().display()
        );
        println!("{}", style("已選分段（依合併順序）：").cyan());
        if session.selected_parts().is_empty() {
            println!("  {}", style("（尚未選取）").dim());
        }
        for (i, part) in session.selected_parts().iter().enumerate() {
            println!("  {}. {}", i + 1, part.name);
        }
        println!();
    }

    fn print_log(&self, session: &JoinSession, from: usize) {
        println!();
        println!("{}", style("=== 日誌 ===").cyan().bold());
        for entry in session.log().iter().skip(from) {
            println!("  {entry}");
        }
    }
}
