use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::week_of;

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub fn render(frame: &mut Frame, area: Rect, today: NaiveDate) {
    let title_line = Line::from(vec![
        Span::styled("  ◎ ", theme::accent()),
        Span::styled("goalpost", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  ·  {}", today.format("%A, %B %-d, %Y")),
            theme::dim(),
        ),
    ]);

    // Monday-first strip of the current week, today highlighted
    let mut names = Vec::new();
    let mut days = Vec::new();
    for (name, day) in WEEKDAYS.iter().zip(week_of(today)) {
        let style = if day == today {
            theme::accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            theme::dim()
        };
        names.push(Span::styled(format!(" {name} "), style));
        days.push(Span::styled(format!(" {:>2} ", day.day()), style));
        names.push(Span::raw(" "));
        days.push(Span::raw(" "));
    }

    let text = vec![title_line, Line::from(names), Line::from(days)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
