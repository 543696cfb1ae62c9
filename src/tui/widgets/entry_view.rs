use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::models::{display_percentage, fill_ratio, Entry};
use crate::store::SlotIndex;
use crate::tui::theme;
use crate::utils::format::{format_date, progress_bar, relative_days};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    index: SlotIndex,
    entry: &Entry,
    date_format: &str,
    today: NaiveDate,
) {
    let block = theme::panel(&format!("{} {}", index, entry.name), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // gauge
            Constraint::Length(1), // due
            Constraint::Length(1),
            Constraint::Min(4),    // goal + details
            Constraint::Min(3),    // history
        ])
        .split(inner);

    let percent = display_percentage(entry);
    let gauge = Gauge::default()
        .gauge_style(theme::percent(percent).bg(theme::EMPTY))
        .ratio(fill_ratio(entry))
        .label(Span::styled(format!("{percent}%"), theme::bold()));
    frame.render_widget(gauge, chunks[0]);

    let due = match entry.target_date {
        Some(d) => format!(
            "  Target {}  ·  {}",
            format_date(Some(d), date_format),
            relative_days(d, today)
        ),
        None => "  No target date".to_string(),
    };
    frame.render_widget(Paragraph::new(Span::styled(due, theme::dim())), chunks[1]);

    let text = vec![
        Line::from(Span::styled("  Achievement goal", theme::dim())),
        Line::from(Span::styled(format!("  {}", entry.goal), theme::bold())),
        Line::from(""),
        Line::from(Span::styled("  Details", theme::dim())),
        Line::from(format!("  {}", entry.details)),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), chunks[3]);

    let mut items = vec![ListItem::new(Line::from(Span::styled(
        format!("  Progress ({})", entry.progress_records.len()),
        theme::accent(),
    )))];
    if entry.progress_records.is_empty() {
        items.push(ListItem::new(Span::styled(
            "  Nothing recorded yet, press [p] to add progress",
            theme::dim(),
        )));
    }
    // Newest first
    for record in entry.progress_records.iter().rev() {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!("  {}  ", record.date.format(date_format)),
                theme::dim(),
            ),
            Span::styled(
                progress_bar(record.rating as u32, 10, 10),
                theme::percent(record.rating.saturating_mul(10)),
            ),
            Span::styled(
                format!(" {:>2}  ", record.rating),
                theme::bold().add_modifier(Modifier::DIM),
            ),
            Span::raw(record.label.clone()),
        ])));
    }
    frame.render_widget(List::new(items), chunks[4]);
}
