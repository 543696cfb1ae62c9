use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::screens::{Notice, Screen};
use crate::tui::theme;

/// Key hints for the active screen, or the latest notice while it is fresh.
pub fn render(frame: &mut Frame, area: Rect, screen: Screen, notice: Option<&Notice>) {
    if let Some(notice) = notice {
        let line = Line::from(Span::styled(notice.message.as_str(), theme::notice(notice.level)));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        return;
    }

    let hints: &[(&str, &str)] = match screen {
        Screen::Main => &[
            ("[a]", " add  "),
            ("[↑ ↓]", " select  "),
            ("[Enter]", " open  "),
            ("[Esc]", " quit"),
        ],
        Screen::ViewEntry(_) => &[
            ("[p]", " progress  "),
            ("[e]", " edit  "),
            ("[D]", " delete  "),
            ("[Esc]", " back"),
        ],
        Screen::AddEntry | Screen::EditEntry(_) | Screen::AddProgress(_) => &[
            ("[Tab]", " next field  "),
            ("[← →]", " rating  "),
            ("[Ctrl+S]", " save  "),
            ("[Esc]", " back"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(*key, theme::accent()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
