use crate::config::{ConfigStore, Settings};
use crate::constants::TOAST_PULSES;
use crate::modal::Modal;
use crate::outcome::Outcome;
use crate::session::{OperationStatus, SessionSummary};
use crate::wizard::WizardState;

/// The dashboard rows plus the cursor. `None` means nothing to select.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionList {
    pub entries: Vec<SessionSummary>,
    pub cursor: Option<usize>,
}

impl SessionList {
    pub fn new(entries: Vec<SessionSummary>) -> Self {
        let cursor = if entries.is_empty() { None } else { Some(0) };
        Self { entries, cursor }
    }

    pub fn selected(&self) -> Option<&SessionSummary> {
        self.cursor.and_then(|idx| self.entries.get(idx))
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if self.entries.is_empty() {
            self.cursor = None;
            return;
        }
        let current = self.cursor.unwrap_or(0);
        let max = self.entries.len() - 1;
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            current.saturating_add(delta as usize).min(max)
        };
        self.cursor = Some(next);
    }

    /// Swaps in a fresh enumeration. The cursor follows the selected
    /// session by name; if it is gone the cursor resets to the top,
    /// and an empty list clears it.
    pub fn replace(&mut self, entries: Vec<SessionSummary>) {
        let selected_name = self.selected().map(|session| session.name.clone());
        self.entries = entries;

        if self.entries.is_empty() {
            self.cursor = None;
            return;
        }
        self.cursor = selected_name
            .and_then(|name| {
                self.entries
                    .iter()
                    .position(|session| session.name == name)
            })
            .or(Some(0));
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Transient status-bar notice, expired by pulse ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub remaining: u8,
}

impl Toast {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, ToastKind::Info)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, ToastKind::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, ToastKind::Error)
    }

    fn new(text: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            text: text.into(),
            kind,
            remaining: TOAST_PULSES,
        }
    }
}

/// Session list carried across an external handoff so the next TUI
/// entry draws instantly instead of starting from an empty table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub sessions: Vec<SessionSummary>,
    pub cursor: Option<usize>,
}

/// Everything the update loop reads and writes. Owned by the single
/// runtime thread; background tasks only ever see messages.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionList,
    pub modal: Option<Modal>,
    pub wizard: Option<WizardState>,
    pub status: OperationStatus,
    pub loading: bool,
    pub initial_load_done: bool,
    /// Bumped for every enumeration; older completions are dropped.
    pub list_generation: u64,
    pub toast: Option<Toast>,
    pub spinner_frame: usize,
    pub pulse_frame: u64,
    /// A spinner tick chain is already in flight.
    pub spinner_scheduled: bool,
    pub daemon_running: bool,
    pub width: u16,
    pub height: u16,
    pub outcome: Option<Outcome>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        wizard: Option<WizardState>,
        snapshot: Option<Snapshot>,
    ) -> Self {
        let (sessions, initial_load_done) = match snapshot {
            Some(snapshot) => {
                let mut list = SessionList::new(snapshot.sessions);
                if let Some(cursor) = snapshot.cursor {
                    list.cursor = Some(cursor.min(list.entries.len().saturating_sub(1)));
                }
                if list.entries.is_empty() {
                    list.cursor = None;
                }
                (list, true)
            }
            None => (SessionList::default(), false),
        };

        Self {
            settings,
            sessions,
            modal: None,
            wizard,
            status: OperationStatus::Ready,
            loading: false,
            initial_load_done,
            list_generation: 0,
            toast: None,
            spinner_frame: 0,
            pulse_frame: 0,
            spinner_scheduled: false,
            daemon_running: false,
            width: 0,
            height: 0,
            outcome: None,
        }
    }

    pub fn operation_in_flight(&self) -> bool {
        self.status != OperationStatus::Ready
    }

    /// Background refreshes hold off while anything interactive or
    /// already-loading is going on.
    pub fn refresh_allowed(&self) -> bool {
        self.modal.is_none()
            && self.wizard.is_none()
            && !self.loading
            && !self.operation_in_flight()
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            sessions: self.sessions.entries.clone(),
            cursor: self.sessions.cursor,
        }
    }
}

/// Decides whether onboarding runs, and from which entry point.
pub fn wizard_entry(store: &dyn ConfigStore, settings: &Settings) -> Option<WizardState> {
    let has_credentials = store.credentials_exist();
    if settings.wizard.resume_after_auth {
        return Some(WizardState::resumed(has_credentials));
    }
    if settings.wizard.always_run || !store.config_exists() || !has_credentials {
        return Some(WizardState::fresh(has_credentials));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::session::SessionState;

    fn session(name: &str) -> SessionSummary {
        SessionSummary {
            name: name.to_string(),
            state: SessionState::Running,
            branch: None,
            last_activity: "Up 1 hour".to_string(),
        }
    }

    #[test]
    fn test_session_list_cursor_motion() {
        let mut list = SessionList::new(vec![session("a"), session("b"), session("c")]);
        assert_eq!(list.cursor, Some(0));

        list.move_cursor(1);
        list.move_cursor(1);
        list.move_cursor(1);
        assert_eq!(list.cursor, Some(2));

        list.move_cursor(-1);
        assert_eq!(list.cursor, Some(1));
    }

    #[test]
    fn test_empty_list_has_no_cursor() {
        let mut list = SessionList::new(vec![]);
        assert_eq!(list.cursor, None);
        list.move_cursor(1);
        assert_eq!(list.cursor, None);
    }

    #[test]
    fn test_replace_follows_selection_by_name() {
        let mut list = SessionList::new(vec![session("a"), session("b"), session("c")]);
        list.move_cursor(1);
        assert_eq!(list.selected().unwrap().name, "b");

        list.replace(vec![session("b"), session("c")]);
        assert_eq!(list.selected().unwrap().name, "b");
        assert_eq!(list.cursor, Some(0));
    }

    #[test]
    fn test_replace_resets_when_selection_gone() {
        let mut list = SessionList::new(vec![session("a"), session("b")]);
        list.move_cursor(1);

        list.replace(vec![session("a"), session("c")]);
        assert_eq!(list.cursor, Some(0));

        list.replace(vec![]);
        assert_eq!(list.cursor, None);
    }

    #[test]
    fn test_state_from_snapshot_marks_loaded() {
        let snapshot = Snapshot {
            sessions: vec![session("a"), session("b")],
            cursor: Some(1),
        };
        let state = AppState::new(Settings::default(), None, Some(snapshot));
        assert!(state.initial_load_done);
        assert_eq!(state.sessions.selected().unwrap().name, "b");
    }

    #[test]
    fn test_snapshot_cursor_clamped() {
        let snapshot = Snapshot {
            sessions: vec![session("a")],
            cursor: Some(5),
        };
        let state = AppState::new(Settings::default(), None, Some(snapshot));
        assert_eq!(state.sessions.cursor, Some(0));
    }

    #[test]
    fn test_refresh_allowed() {
        let mut state = AppState::new(Settings::default(), None, None);
        assert!(state.refresh_allowed());

        state.loading = true;
        assert!(!state.refresh_allowed());
        state.loading = false;

        state.status = crate::session::OperationStatus::Deleting;
        assert!(!state.refresh_allowed());
        state.status = crate::session::OperationStatus::Ready;

        state.modal = Some(crate::modal::help_modal());
        assert!(!state.refresh_allowed());
    }

    #[test]
    fn test_wizard_entry_resume_wins() {
        let store = MemoryConfigStore::default();
        *store.has_config.lock().unwrap() = true;
        *store.has_credentials.lock().unwrap() = true;

        let mut settings = Settings::default();
        settings.wizard.resume_after_auth = true;

        let wizard = wizard_entry(&store, &settings).unwrap();
        assert_eq!(wizard.step, crate::wizard::WizardStep::Auth);
    }

    #[test]
    fn test_wizard_entry_first_run_triggers() {
        let store = MemoryConfigStore::default();
        let settings = Settings::default();

        // Missing config and credentials.
        assert!(wizard_entry(&store, &settings).is_some());

        *store.has_config.lock().unwrap() = true;
        *store.has_credentials.lock().unwrap() = true;
        assert!(wizard_entry(&store, &settings).is_none());

        let mut always = Settings::default();
        always.wizard.always_run = true;
        assert!(wizard_entry(&store, &always).is_some());
    }
}
