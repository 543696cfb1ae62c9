use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::models::RatingSelector;
use crate::tui::form::{Field, FormState};
use crate::tui::theme;
use crate::tui::widgets::rating;

/// Draw a form panel. Used both full-screen and as a popup, so the area is
/// cleared first.
pub fn render(frame: &mut Frame, area: Rect, title: &str, form: &FormState, selector: &RatingSelector) {
    frame.render_widget(Clear, area);

    let focused = form.focused();
    let mut lines = vec![Line::from("")];

    for (field, value) in form.fields() {
        let has_focus = field == focused;
        let label_style = if has_focus {
            theme::accent().add_modifier(Modifier::BOLD)
        } else {
            theme::dim()
        };
        let mut label = vec![
            Span::styled(if has_focus { "  ▸ " } else { "    " }, theme::accent()),
            Span::styled(field.label(), label_style),
        ];
        if has_focus && !field.hint().is_empty() {
            label.push(Span::styled(format!("  ({})", field.hint()), theme::dim()));
        }
        lines.push(Line::from(label));

        if field == Field::Rating {
            lines.push(rating::line(selector, has_focus));
        } else {
            let mut input = vec![Span::styled(format!("    {value}"), theme::bold())];
            if has_focus {
                input.push(Span::styled("█", theme::amber()));
            }
            lines.push(Line::from(input));
        }
        lines.push(Line::from(""));
    }

    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(format!("  ✗ {err}"), theme::red())));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [Tab]", theme::accent()),
        Span::styled(" next  ", theme::dim()),
        Span::styled("[Ctrl+S]", theme::accent()),
        Span::styled(" save  ", theme::dim()),
        Span::styled("[Esc]", theme::accent()),
        Span::styled(" back", theme::dim()),
    ]));

    let mut block = theme::panel(title, true);
    if form.error.is_some() {
        block = block.border_style(theme::red());
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Rows a form needs, borders included.
pub fn height(form: &FormState) -> u16 {
    let rows = 1 + form.fields().count() * 3 + 1;
    let error = if form.error.is_some() { 2 } else { 0 };
    (rows + error + 2) as u16
}
