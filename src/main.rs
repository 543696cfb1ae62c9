mod bus;
mod cli;
mod config;
mod error;
mod logging;
mod models;
mod screens;
mod store;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use screens::{AppEvent, NoticeLevel, ScreenOrchestrator};
use store::{FileStore, PersistenceGateway};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its log goes to a file. Set up before the
    // config is read so warnings about its values are kept.
    let log_file = match cli.command {
        None => Some(AppConfig::log_path()?),
        Some(_) => None,
    };
    logging::init(log_file.as_deref())?;

    let mut config = AppConfig::load().context("Loading config")?;
    if let Some(path) = cli.data.clone() {
        config.storage.data_file = Some(path);
    }

    if config.storage.data_file.is_none() {
        AppConfig::ensure_data_dir()?;
    }
    let entries_path = config.entries_path()?;
    let gateway = PersistenceGateway::new(FileStore::new(&entries_path));
    let (mut orch, report) = ScreenOrchestrator::start(gateway, config.storage.capacity)
        .with_context(|| format!("Loading goals from {:?}", entries_path))?;
    log::debug!(
        "{} saved goals, {} bound to {} slots",
        report.loaded,
        report.bound,
        config.storage.capacity
    );

    match cli.command {
        // No subcommand → launch TUI
        None => {
            tui::app::run(config, orch, report.notices())?;
        }

        Some(cmd) => {
            for notice in report.notices() {
                handlers::report_notice(&notice);
            }
            // Refusals come back as errors; only failed saves need printing here
            orch.subscribe(|event| {
                if let AppEvent::Notice(notice) = event {
                    if notice.level == NoticeLevel::Error {
                        handlers::report_notice(notice);
                    }
                }
            });

            match cmd {
                Commands::List => handlers::handle_list(&orch, &config)?,
                Commands::Show { slot } => handlers::handle_show(&orch, &config, slot)?,
                Commands::Add {
                    name,
                    goal,
                    details,
                    rating,
                    date,
                } => handlers::handle_add(&mut orch, &name, &goal, &details, rating, date.as_deref())?,
                Commands::Edit {
                    slot,
                    name,
                    goal,
                    details,
                    rating,
                    date,
                } => handlers::handle_edit(
                    &mut orch,
                    slot,
                    name.as_deref(),
                    goal.as_deref(),
                    details.as_deref(),
                    rating,
                    date.as_deref(),
                )?,
                Commands::Progress {
                    slot,
                    label,
                    rating,
                    date,
                } => handlers::handle_progress(&mut orch, slot, &label, rating, date.as_deref())?,
                Commands::Delete { slot } => handlers::handle_delete(&mut orch, slot)?,
                Commands::Path => handlers::handle_path(&orch)?,
            }
        }
    }

    Ok(())
}
