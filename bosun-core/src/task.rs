use crate::config::Settings;
use crate::session::OperationKind;

/// Periodic timers driving the UI. Each tick task sleeps for its
/// interval and then delivers exactly one `Message::Tick`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickKind {
    /// Slow heartbeat used for toast expiry and the header pulse.
    Pulse,
    /// Background reload of the session list.
    Refresh,
    /// Spinner frame advance while work is in flight.
    Spinner,
    /// Column-by-column banner reveal during onboarding.
    Reveal,
}

/// Work requested by the state machine. Every task completes by
/// delivering exactly one message back to the loop, success or not.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    /// Enumerate sessions. `generation` is echoed back in the
    /// completion so stale results can be discarded.
    LoadSessions { generation: u64 },
    LoadDetails { name: String },
    RunOperation { op: OperationKind, name: String },
    CheckPrereqs,
    SaveSettings { settings: Settings },
    /// Persist firewall config and push `added` domains into every
    /// running session.
    ApplyFirewall {
        settings: Settings,
        added: Vec<String>,
    },
    SaveWizardConfig {
        memory: String,
        cpus: String,
        domains: Vec<String>,
        resume_after_auth: bool,
    },
    Tick(TickKind),
}
