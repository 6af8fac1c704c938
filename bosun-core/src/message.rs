use crossterm::event::KeyEvent;

use crate::config::Settings;
use crate::prereq::PrereqReport;
use crate::session::{OperationKind, SessionDetails, SessionSummary};
use crate::task::TickKind;

/// Payload of a completed session enumeration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionsPayload {
    pub sessions: Vec<SessionSummary>,
    pub daemon_running: bool,
}

/// Every input the state machine can receive. Terminal events, timer
/// ticks and task completions all arrive through this one type.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Resized { width: u16, height: u16 },
    Tick(TickKind),

    SessionsLoaded {
        generation: u64,
        result: Result<SessionsPayload, String>,
    },
    DetailsLoaded {
        name: String,
        result: Result<SessionDetails, String>,
    },
    OperationFinished {
        op: OperationKind,
        name: String,
        result: Result<(), String>,
    },
    PrereqChecked(PrereqReport),
    /// Carries the persisted settings back so they are only applied
    /// once the write actually succeeded.
    SettingsSaved {
        result: Result<Settings, String>,
    },
    FirewallSaved {
        added: usize,
        result: Result<Settings, String>,
    },
    WizardConfigSaved {
        run_auth_now: bool,
        result: Result<(), String>,
    },

    // Intents emitted by modal actions rather than typed directly.
    ShowActionsMenu { name: String },
    RequestOperation { op: OperationKind, name: String },
    ConfirmOperation { op: OperationKind, name: String },
    Connect { name: String },
    Quit,

    WizardNext,
    WizardPrev,
    WizardSkip,
    /// Finish the wizard and drop straight into the auth flow.
    WizardAuthNow,
    WizardFinish,
}
