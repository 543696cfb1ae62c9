use anyhow::{anyhow, Context, Result};
use chrono::Local;

use crate::config::AppConfig;
use crate::models::{display_percentage, Entry};
use crate::screens::{Action, EntryDraft, Notice, NoticeLevel, ProgressDraft, Screen, ScreenOrchestrator};
use crate::store::SlotIndex;
use crate::utils::format::{parse_date, progress_bar, relative_days, truncate_to_width};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;86;182;170m";

// ─── Shared helpers ──────────────────────────────────────────────────────────

fn slot_arg(number: usize) -> Result<SlotIndex> {
    SlotIndex::from_number(number).ok_or_else(|| anyhow!("Slot numbers start at 1"))
}

/// Feed actions to the orchestrator in order, stopping at the first refusal.
fn drive(orch: &mut ScreenOrchestrator, actions: Vec<Action>) -> Result<Screen> {
    let mut screen = orch.screen();
    for action in actions {
        let name = action.name();
        screen = orch
            .dispatch(action)
            .with_context(|| format!("Could not {}", name))?;
    }
    Ok(screen)
}

fn percent_color(percent: u8) -> &'static str {
    match percent {
        80..=u8::MAX => GREEN,
        40..=79 => AMBER,
        _ => DIM,
    }
}

fn due_text(entry: &Entry, config: &AppConfig) -> String {
    match entry.target_date {
        Some(date) => format!(
            "due {} ({})",
            date.format(&config.ui.date_format),
            relative_days(date, Local::now().date_naive())
        ),
        None => "no target date".to_string(),
    }
}

/// Print a notice on stderr; CLI runs have no status bar.
pub fn report_notice(notice: &Notice) {
    let color = match notice.level {
        NoticeLevel::Info => TEAL,
        NoticeLevel::Warning => AMBER,
        NoticeLevel::Error => RED,
    };
    eprintln!("{}{}\x1b[0m", color, notice.message);
}

// ─── List ────────────────────────────────────────────────────────────────────

pub fn handle_list(orch: &ScreenOrchestrator, config: &AppConfig) -> Result<()> {
    let slots = orch.slots();
    println!();
    if slots.is_empty() {
        println_colored!(DIM, "  No goals yet. Add one with `goalpost add`.");
        println!();
        return Ok(());
    }

    println_colored!(
        TEAL,
        "  Goals ({}/{} slots)",
        slots.occupied_count(),
        slots.capacity()
    );
    println!();
    for (index, entry) in slots.occupied() {
        let percent = display_percentage(entry);
        println_colored!(
            percent_color(percent),
            "  {:>3}  {:<20}  {}  {:>3}%  {}",
            index.to_string(),
            truncate_to_width(&entry.name, 20),
            progress_bar(percent as u32, 100, 10),
            percent,
            due_text(entry, config)
        );
    }
    println!();
    Ok(())
}

// ─── Show ────────────────────────────────────────────────────────────────────

pub fn handle_show(orch: &ScreenOrchestrator, config: &AppConfig, slot: usize) -> Result<()> {
    let index = slot_arg(slot)?;
    let entry = orch
        .slots()
        .get(index)
        .ok_or_else(|| anyhow!("No goal in slot {}", index))?;
    let percent = display_percentage(entry);

    println!();
    println_colored!(TEAL, "  {} {}", index, entry.name);
    println!();
    println_colored!(
        BOLD,
        "  {}  {}%",
        progress_bar(percent as u32, 100, 20),
        percent
    );
    println_colored!(DIM, "  {}", due_text(entry, config));
    println!();
    println_colored!(DIM, "  Achievement goal");
    println!("  {}", entry.goal);
    println!();
    println_colored!(DIM, "  Details");
    println!("  {}", entry.details);
    println!();

    if entry.progress_records.is_empty() {
        println_colored!(DIM, "  No progress recorded yet");
    } else {
        println_colored!(DIM, "  Progress");
        for record in &entry.progress_records {
            println!(
                "  {}  {}  {:>2}/10  {}",
                record.date.format(&config.ui.date_format),
                progress_bar(record.rating as u32, 10, 10),
                record.rating,
                record.label
            );
        }
    }
    println!();
    Ok(())
}

// ─── Add ─────────────────────────────────────────────────────────────────────

pub fn handle_add(
    orch: &mut ScreenOrchestrator,
    name: &str,
    goal: &str,
    details: &str,
    rating: u8,
    date: Option<&str>,
) -> Result<()> {
    let draft = EntryDraft {
        name: name.to_string(),
        goal: goal.to_string(),
        details: details.to_string(),
        target_date: parse_date(date.unwrap_or(""))?,
    };

    let before: Vec<SlotIndex> = orch.slots().occupied().map(|(i, _)| i).collect();
    drive(
        orch,
        vec![
            Action::AddTapped,
            Action::SelectRating(rating - 1),
            Action::SaveEntry(draft),
        ],
    )?;

    let added = orch
        .slots()
        .occupied()
        .find(|(i, _)| !before.contains(i))
        .map(|(i, e)| (i, display_percentage(e)));
    if let Some((index, percent)) = added {
        println_colored!(GREEN, "  ✓ Added '{}' in slot {} ({}%)", name.trim(), index, percent);
    }
    Ok(())
}

// ─── Edit ────────────────────────────────────────────────────────────────────

pub fn handle_edit(
    orch: &mut ScreenOrchestrator,
    slot: usize,
    name: Option<&str>,
    goal: Option<&str>,
    details: Option<&str>,
    rating: Option<u8>,
    date: Option<&str>,
) -> Result<()> {
    let index = slot_arg(slot)?;
    drive(orch, vec![Action::OpenEntry(index), Action::EditTapped])?;

    let current = orch
        .slots()
        .get(index)
        .ok_or_else(|| anyhow!("No goal in slot {}", index))?;
    let mut draft = EntryDraft::from_entry(current);
    if let Some(name) = name {
        draft.name = name.to_string();
    }
    if let Some(goal) = goal {
        draft.goal = goal.to_string();
    }
    if let Some(details) = details {
        draft.details = details.to_string();
    }
    if let Some(date) = date {
        draft.target_date = parse_date(date)?;
    }

    let mut actions = Vec::new();
    if let Some(rating) = rating {
        actions.push(Action::SelectRating(rating - 1));
    }
    actions.push(Action::SaveEdit(draft));
    actions.push(Action::Back);
    drive(orch, actions)?;

    let percent = orch.percentage(index).unwrap_or(0);
    println_colored!(GREEN, "  ✓ Updated slot {} ({}%)", index, percent);
    Ok(())
}

// ─── Progress ────────────────────────────────────────────────────────────────

pub fn handle_progress(
    orch: &mut ScreenOrchestrator,
    slot: usize,
    label: &str,
    rating: u8,
    date: Option<&str>,
) -> Result<()> {
    let index = slot_arg(slot)?;
    let draft = ProgressDraft {
        label: label.to_string(),
        date: parse_date(date.unwrap_or(""))?,
    };

    drive(
        orch,
        vec![
            Action::OpenEntry(index),
            Action::AddProgressTapped,
            Action::SelectRating(rating - 1),
            Action::SaveProgress(draft),
            Action::Back,
        ],
    )?;

    let percent = orch.percentage(index).unwrap_or(0);
    println_colored!(
        GREEN,
        "  ✓ Progress recorded for slot {}, now at {}%",
        index,
        percent
    );
    Ok(())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

pub fn handle_delete(orch: &mut ScreenOrchestrator, slot: usize) -> Result<()> {
    let index = slot_arg(slot)?;
    let name = orch
        .slots()
        .get(index)
        .map(|e| e.name.clone())
        .ok_or_else(|| anyhow!("No goal in slot {}", index))?;

    drive(orch, vec![Action::OpenEntry(index), Action::DeleteTapped])?;
    println_colored!(AMBER, "  Deleted '{}' from slot {}", name, index);
    Ok(())
}

// ─── Path ────────────────────────────────────────────────────────────────────

pub fn handle_path(orch: &ScreenOrchestrator) -> Result<()> {
    println!("config:  {}", AppConfig::config_path()?.display());
    println!("entries: {}", orch.gateway().location());
    println!("log:     {}", AppConfig::log_path()?.display());
    Ok(())
}
