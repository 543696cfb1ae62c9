use ratatui::{
    style::Modifier,
    text::{Line, Span},
};

use crate::models::RatingSelector;
use crate::tui::theme;

/// One row of rating marks. Committed positions are filled, a hover preview
/// is drawn on top without changing them.
pub fn line(selector: &RatingSelector, focused: bool) -> Line<'static> {
    let preview = if focused { selector.preview_position() } else { None };
    let mut spans = vec![Span::raw("  ")];

    for position in 0..selector.positions() {
        let selected = selector.is_selected(position);
        let hovered = preview.is_some_and(|p| position <= p);
        let (mark, style) = match (selected, hovered) {
            (_, true) if preview == Some(position) => {
                ("◆", theme::amber().add_modifier(Modifier::BOLD))
            }
            (_, true) => ("◆", theme::amber()),
            (true, false) => ("◆", theme::accent()),
            (false, false) => ("◇", theme::empty()),
        };
        spans.push(Span::styled(mark, style));
        spans.push(Span::raw(" "));
    }

    let rating = selector.current_rating();
    let value = match selector.preview_rating().filter(|_| focused) {
        Some(hover) if hover != rating => format!(" {rating}/{} → {hover}", selector.positions()),
        _ if rating == 0 => " not set".to_string(),
        _ => format!(" {rating}/{}", selector.positions()),
    };
    spans.push(Span::styled(value, theme::dim()));
    Line::from(spans)
}
