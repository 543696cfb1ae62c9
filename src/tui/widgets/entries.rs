use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::models::display_percentage;
use crate::store::EntrySlotStore;
use crate::tui::theme;
use crate::utils::format::{progress_bar, relative_days, truncate_to_width};

/// Goal list on the main screen, one line per occupied slot.
pub fn render(frame: &mut Frame, area: Rect, slots: &EntrySlotStore, selected: usize, today: NaiveDate) {
    let block = theme::panel(
        &format!("Goals {}/{}", slots.occupied_count(), slots.capacity()),
        true,
    );

    if slots.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("No goals yet", theme::bold())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", theme::dim()),
                Span::styled("[a]", theme::accent()),
                Span::styled(" to add your first one", theme::dim()),
            ]),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(40).clamp(8, 32);

    let items: Vec<ListItem> = slots
        .occupied()
        .enumerate()
        .map(|(row, (index, entry))| {
            let percent = display_percentage(entry);
            let is_selected = row == selected;

            let marker = if is_selected { "▸ " } else { "  " };
            let name_style = if is_selected {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let due = entry
                .target_date
                .map(|d| relative_days(d, today))
                .unwrap_or_default();

            let line = Line::from(vec![
                Span::styled(marker, theme::accent()),
                Span::styled(format!("{:<4}", index.to_string()), theme::dim()),
                Span::styled(
                    format!("{:<width$}  ", truncate_to_width(&entry.name, name_width), width = name_width),
                    name_style,
                ),
                Span::styled(progress_bar(percent as u32, 100, 10), theme::percent(percent)),
                Span::styled(format!(" {:>3}%", percent), theme::percent(percent)),
                Span::styled(format!("  {}", due), theme::dim()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
