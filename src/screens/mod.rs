pub mod forms;
pub mod orchestrator;
pub mod state;

pub use forms::{EntryDraft, ProgressDraft};
pub use orchestrator::{ScreenOrchestrator, StartupReport};
pub use state::{Action, AppEvent, Notice, NoticeLevel, RatingForm, Screen};
