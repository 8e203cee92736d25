use crate::config::Config;
use crate::menu::handlers::{run_batch_join, run_manual_join};
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<bool> {
    if shutdown_signal.load(Ordering::SeqCst) {
        return Ok(false);
    }

    term.clear_screen()?;

    println!("{}", style("=== 多段影片合併工具 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());
    println!(
        "{}",
        style(format!("ffmpeg: {}", config.settings.ffmpeg_path.display())).dim()
    );

    let options = vec!["手動選取分段合併", "自動合併所有分組", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_manual_join(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_batch_join(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false),
        _ => unreachable!(),
    }
}
