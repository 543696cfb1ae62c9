use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders};

use crate::screens::NoticeLevel;

pub const BG: Color = Color::Rgb(15, 18, 20);
pub const SURFACE: Color = Color::Rgb(23, 28, 31);
pub const BORDER: Color = Color::Rgb(46, 58, 62);
pub const TEXT: Color = Color::Rgb(218, 226, 224);
pub const TEXT_DIM: Color = Color::Rgb(112, 128, 130);
pub const TEAL: Color = Color::Rgb(86, 182, 170);
pub const GREEN: Color = Color::Rgb(110, 170, 96);
pub const AMBER: Color = Color::Rgb(214, 160, 72);
pub const RED: Color = Color::Rgb(196, 88, 72);
pub const EMPTY: Color = Color::Rgb(44, 52, 56);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(TEAL)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn empty() -> Style {
    Style::default().fg(EMPTY)
}

/// Colour for a completion percentage.
pub fn percent(percent: u8) -> Style {
    match percent {
        80..=u8::MAX => green(),
        40..=79 => amber(),
        _ => dim(),
    }
}

pub fn notice(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => accent(),
        NoticeLevel::Warning => amber(),
        NoticeLevel::Error => red().add_modifier(Modifier::BOLD),
    }
}

/// Rounded panel with a title, highlighted when it has focus.
pub fn panel(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {title} "), accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            accent()
        } else {
            Style::default().fg(BORDER)
        })
        .style(surface())
}
