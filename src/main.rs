use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use video_part_joiner::config::Config;
use video_part_joiner::init;
use video_part_joiner::menu::show_main_menu;
use video_part_joiner::signal::setup_shutdown_signal;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();
    let config = Config::new()?;

    loop {
        match show_main_menu(&term, &shutdown_signal, &config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style("再見！").green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style("錯誤:").red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
