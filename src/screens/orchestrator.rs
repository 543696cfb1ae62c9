use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};

use crate::bus::{EventBus, SubscriptionId};
use crate::error::{CoreError, CoreResult};
use crate::models::{display_percentage, Entry, RatingChanged, RatingSelector, MAX_RATING};
use crate::screens::state::{Action, AppEvent, Notice, RatingForm, Screen};
use crate::store::{EntrySlotStore, PersistenceGateway, SlotIndex};

/// What happened while binding saved entries to slots at startup.
#[derive(Debug)]
pub struct StartupReport {
    pub loaded: usize,
    pub bound: usize,
    /// Saved entries that did not fit into the configured slots.
    pub dropped: usize,
    /// Where the full document was copied before anything could overwrite it.
    pub overflow_copy: Option<String>,
    /// Load failure that was recovered from by starting empty.
    pub problem: Option<CoreError>,
}

impl StartupReport {
    /// Messages the user should see after startup.
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(problem) = &self.problem {
            notices.push(Notice::error(format!(
                "Saved goals could not be read, starting empty: {problem}"
            )));
        }
        if self.dropped > 0 {
            let kept = match &self.overflow_copy {
                Some(copy) => format!(" (full list kept at {copy})"),
                None => String::new(),
            };
            notices.push(Notice::warning(format!(
                "{} saved goals did not fit into {} slots{kept}",
                self.dropped, self.bound
            )));
        }
        notices
    }
}

/// Navigation state machine over the five screens. Owns the slot store and
/// both rating rows, and persists after every change to the entries.
pub struct ScreenOrchestrator {
    screen: Screen,
    slots: EntrySlotStore,
    gateway: PersistenceGateway,
    goal_rating: RatingSelector,
    progress_rating: RatingSelector,
    events: EventBus<AppEvent>,
    today: Box<dyn Fn() -> NaiveDate>,
}

impl ScreenOrchestrator {
    /// Load saved entries and bind them to slots in order. Entries past the
    /// capacity are left out.
    pub fn start(gateway: PersistenceGateway, capacity: usize) -> CoreResult<(Self, StartupReport)> {
        let loaded = gateway.load()?;
        let total = loaded.entries.len();

        let mut slots = EntrySlotStore::with_capacity(capacity);
        let mut bound = 0;
        for entry in loaded.entries {
            if slots.allocate(entry).is_err() {
                break;
            }
            bound += 1;
        }

        let dropped = total - bound;
        let overflow_copy = if dropped > 0 {
            warn!("{dropped} saved entries exceed the {capacity} slots and were not loaded");
            gateway.preserve("overflow")?
        } else {
            None
        };
        info!("started with {bound} entries from {}", gateway.location());

        let orchestrator = ScreenOrchestrator {
            screen: Screen::Main,
            slots,
            gateway,
            goal_rating: RatingSelector::new(MAX_RATING),
            progress_rating: RatingSelector::new(MAX_RATING),
            events: EventBus::new(),
            today: Box::new(|| Local::now().date_naive()),
        };
        let report = StartupReport {
            loaded: total,
            bound,
            dropped,
            overflow_copy,
            problem: loaded.problem,
        };
        Ok((orchestrator, report))
    }

    /// Replace the clock used to date progress records saved without a date.
    #[allow(dead_code)]
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn slots(&self) -> &EntrySlotStore {
        &self.slots
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// The entry the foreground screen refers to.
    #[allow(dead_code)]
    pub fn current_entry(&self) -> Option<(SlotIndex, &Entry)> {
        let index = self.screen.entry_ref()?;
        self.slots.get(index).map(|e| (index, e))
    }

    pub fn percentage(&self, index: SlotIndex) -> Option<u8> {
        self.slots.get(index).map(display_percentage)
    }

    pub fn goal_rating(&self) -> &RatingSelector {
        &self.goal_rating
    }

    pub fn progress_rating(&self) -> &RatingSelector {
        &self.progress_rating
    }

    /// Rating row of the form on screen, if the screen has one.
    pub fn active_rating(&self) -> Option<&RatingSelector> {
        match self.screen {
            Screen::AddEntry | Screen::EditEntry(_) => Some(&self.goal_rating),
            Screen::AddProgress(_) => Some(&self.progress_rating),
            Screen::Main | Screen::ViewEntry(_) => None,
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&AppEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    #[allow(dead_code)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Apply one user action and return the resulting foreground screen.
    ///
    /// A rejected action leaves the screen as it was. Save failures are not
    /// rejections: the transition completes and an error notice goes out.
    pub fn dispatch(&mut self, action: Action) -> CoreResult<Screen> {
        let from = self.screen;
        let name = action.name();

        if let Err(e) = self.apply(action) {
            debug_assert_eq!(self.screen, from);
            match &e {
                CoreError::NoCapacity { .. } | CoreError::EmptySlot(_) => {
                    warn!("{name} on {} refused: {e}", from.name());
                    self.events.publish(&AppEvent::Notice(Notice::warning(e.to_string())));
                }
                CoreError::Validation(_) => debug!("{name} blocked: {e}"),
                _ => warn!("{name} on {} refused: {e}", from.name()),
            }
            return Err(e);
        }

        if self.screen != from {
            debug!("{} -> {}", from.name(), self.screen.name());
            self.events.publish(&AppEvent::ScreenChanged {
                from,
                to: self.screen,
            });
        }
        Ok(self.screen)
    }

    fn apply(&mut self, action: Action) -> CoreResult<()> {
        match (self.screen, action) {
            (Screen::Main, Action::AddTapped) => {
                if self.slots.is_full() {
                    return Err(CoreError::NoCapacity {
                        capacity: self.slots.capacity(),
                    });
                }
                self.reset_rating(RatingForm::Goal);
                self.screen = Screen::AddEntry;
            }
            (Screen::Main, Action::OpenEntry(index)) => {
                self.entry(index)?;
                self.screen = Screen::ViewEntry(index);
            }

            (Screen::AddEntry, Action::SaveEntry(draft)) => {
                let rating = self.goal_rating.current_rating();
                draft.validate(rating)?;
                let index = self.slots.allocate(draft.into_entry(rating))?;
                info!("added entry in slot {index}");
                self.reset_rating(RatingForm::Goal);
                self.entries_changed();
                self.screen = Screen::Main;
            }
            (Screen::AddEntry, Action::Back) => {
                self.goal_rating.clear_preview();
                self.screen = Screen::Main;
            }

            (Screen::ViewEntry(_), Action::Back) => self.screen = Screen::Main,
            (Screen::ViewEntry(index), Action::EditTapped) => {
                let base = self.entry(index)?.base_rating;
                self.goal_rating.clear_preview();
                self.set_rating(RatingForm::Goal, base);
                self.screen = Screen::EditEntry(index);
            }
            (Screen::ViewEntry(index), Action::AddProgressTapped) => {
                self.entry(index)?;
                self.reset_rating(RatingForm::Progress);
                self.screen = Screen::AddProgress(index);
            }
            (Screen::ViewEntry(index), Action::DeleteTapped) => {
                let removed = self.slots.release(index).ok_or(CoreError::EmptySlot(index))?;
                info!("deleted '{}' from slot {index}", removed.name);
                self.entries_changed();
                self.screen = Screen::Main;
            }

            (Screen::EditEntry(index), Action::SaveEdit(draft)) => {
                let rating = self.goal_rating.current_rating();
                draft.validate_text()?;
                let entry = self
                    .slots
                    .get_mut(index)
                    .ok_or(CoreError::EmptySlot(index))?;
                draft.apply_to(entry, rating);
                info!("edited entry in slot {index}");
                self.entries_changed();
                self.screen = Screen::ViewEntry(index);
            }
            (Screen::EditEntry(index), Action::Back) => {
                self.goal_rating.clear_preview();
                self.screen = Screen::ViewEntry(index);
            }

            (Screen::AddProgress(index), Action::SaveProgress(draft)) => {
                let rating = self.progress_rating.current_rating();
                draft.validate(rating)?;
                let record = draft.into_record(rating, (self.today)());
                let entry = self
                    .slots
                    .get_mut(index)
                    .ok_or(CoreError::EmptySlot(index))?;
                entry.progress_records.push(record);
                info!(
                    "progress {rating} added to slot {index}, now at {}%",
                    display_percentage(entry)
                );
                self.reset_rating(RatingForm::Progress);
                self.entries_changed();
                self.screen = Screen::ViewEntry(index);
            }
            (Screen::AddProgress(index), Action::Back) => {
                self.progress_rating.clear_preview();
                self.screen = Screen::ViewEntry(index);
            }

            (screen, Action::SelectRating(position)) => {
                let form = Self::rating_form(screen, "select rating")?;
                let change = self.selector_mut(form).select(position);
                self.publish_rating(form, change);
            }
            (screen, Action::PreviewRating(position)) => {
                let form = Self::rating_form(screen, "preview rating")?;
                self.selector_mut(form).preview_hover(position);
            }
            (screen, Action::ClearPreview) => {
                let form = Self::rating_form(screen, "clear preview")?;
                self.selector_mut(form).clear_preview();
            }

            (screen, action) => {
                return Err(CoreError::InvalidTransition {
                    screen: screen.name(),
                    action: action.name(),
                });
            }
        }
        Ok(())
    }

    fn entry(&self, index: SlotIndex) -> CoreResult<&Entry> {
        self.slots.get(index).ok_or(CoreError::EmptySlot(index))
    }

    fn rating_form(screen: Screen, action: &'static str) -> CoreResult<RatingForm> {
        match screen {
            Screen::AddEntry | Screen::EditEntry(_) => Ok(RatingForm::Goal),
            Screen::AddProgress(_) => Ok(RatingForm::Progress),
            Screen::Main | Screen::ViewEntry(_) => Err(CoreError::InvalidTransition {
                screen: screen.name(),
                action,
            }),
        }
    }

    fn selector_mut(&mut self, form: RatingForm) -> &mut RatingSelector {
        match form {
            RatingForm::Goal => &mut self.goal_rating,
            RatingForm::Progress => &mut self.progress_rating,
        }
    }

    fn reset_rating(&mut self, form: RatingForm) {
        let change = self.selector_mut(form).reset();
        self.publish_rating(form, change);
    }

    fn set_rating(&mut self, form: RatingForm, rating: u8) {
        let change = self.selector_mut(form).set_rating(rating);
        self.publish_rating(form, change);
    }

    fn publish_rating(&mut self, form: RatingForm, change: Option<RatingChanged>) {
        if let Some(change) = change {
            self.events.publish(&AppEvent::RatingChanged { form, change });
        }
    }

    /// Persist the active entries and tell views to redraw. A failed save is
    /// reported but never undoes the in-memory change.
    fn entries_changed(&mut self) {
        if let Err(e) = self.gateway.save(&self.slots.active_entries()) {
            error!("saving entries failed: {e}");
            self.events.publish(&AppEvent::Notice(Notice::error(format!(
                "Changes kept for this session but not saved: {e}"
            ))));
        }
        self.events.publish(&AppEvent::EntriesChanged);
    }
}

impl std::fmt::Debug for ScreenOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenOrchestrator")
            .field("screen", &self.screen)
            .field("slots", &self.slots.occupied_count())
            .field("gateway", &self.gateway)
            .finish()
    }
}
