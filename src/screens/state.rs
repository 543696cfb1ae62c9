use crate::models::RatingChanged;
use crate::screens::forms::{EntryDraft, ProgressDraft};
use crate::store::SlotIndex;

/// The foreground screen. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    AddEntry,
    EditEntry(SlotIndex),
    ViewEntry(SlotIndex),
    /// Drawn over the entry view it was opened from.
    AddProgress(SlotIndex),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Main => "main",
            Screen::AddEntry => "add entry",
            Screen::EditEntry(_) => "edit entry",
            Screen::ViewEntry(_) => "view entry",
            Screen::AddProgress(_) => "add progress",
        }
    }

    /// Slot of the entry this screen is about, if any.
    pub fn entry_ref(&self) -> Option<SlotIndex> {
        match self {
            Screen::Main | Screen::AddEntry => None,
            Screen::EditEntry(i) | Screen::ViewEntry(i) | Screen::AddProgress(i) => Some(*i),
        }
    }

    /// Screen kept visible but inactive behind an overlay.
    pub fn backdrop(&self) -> Option<Screen> {
        match self {
            Screen::AddProgress(i) => Some(Screen::ViewEntry(*i)),
            _ => None,
        }
    }
}

/// User intents the orchestrator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddTapped,
    OpenEntry(SlotIndex),
    EditTapped,
    AddProgressTapped,
    DeleteTapped,
    Back,
    SelectRating(u8),
    PreviewRating(u8),
    ClearPreview,
    SaveEntry(EntryDraft),
    SaveEdit(EntryDraft),
    SaveProgress(ProgressDraft),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddTapped => "add",
            Action::OpenEntry(_) => "open",
            Action::EditTapped => "edit",
            Action::AddProgressTapped => "add progress",
            Action::DeleteTapped => "delete",
            Action::Back => "back",
            Action::SelectRating(_) => "select rating",
            Action::PreviewRating(_) => "preview rating",
            Action::ClearPreview => "clear preview",
            Action::SaveEntry(_) => "save entry",
            Action::SaveEdit(_) => "save edit",
            Action::SaveProgress(_) => "save progress",
        }
    }
}

/// Which rating row a rating change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingForm {
    Goal,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message for the user that does not stop the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[allow(dead_code)]
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything views can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenChanged { from: Screen, to: Screen },
    EntriesChanged,
    RatingChanged { form: RatingForm, change: RatingChanged },
    Notice(Notice),
}
