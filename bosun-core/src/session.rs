use serde::{Deserialize, Serialize};

/// One row of the dashboard: the registry's summary of a managed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub name: String,
    pub state: SessionState,
    pub branch: Option<String>,
    /// Human-readable activity text straight from the registry,
    /// e.g. "Up 3 hours" or "Exited (0) 2 days ago".
    pub last_activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Running,
    Exited,
    Other(String),
}

impl SessionState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "running" | "up" => Self::Running,
            "exited" | "stopped" => Self::Exited,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Exited => "exited",
            Self::Other(raw) => raw,
        }
    }
}

/// Expanded view of a single session, shown in the details modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub name: String,
    pub image: String,
    pub state: SessionState,
    pub created: String,
    pub branch: Option<String>,
    pub memory: Option<String>,
    pub cpus: Option<String>,
}

/// The mutating registry operations a user can trigger from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Stop,
    Restart,
    Delete,
    RefreshTokens,
}

impl OperationKind {
    /// Stop and Delete are destructive enough to warrant a confirmation
    /// modal; Restart and RefreshTokens run directly.
    pub fn needs_confirmation(self) -> bool {
        matches!(self, Self::Stop | Self::Delete)
    }

    pub fn status(self) -> OperationStatus {
        match self {
            Self::Stop => OperationStatus::Stopping,
            Self::Restart => OperationStatus::Restarting,
            Self::Delete => OperationStatus::Deleting,
            Self::RefreshTokens => OperationStatus::RefreshingTokens,
        }
    }

    /// Past-tense verb for success toasts.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Stop => "stopped",
            Self::Restart => "restarted",
            Self::Delete => "removed",
            Self::RefreshTokens => "tokens refreshed for",
        }
    }

    pub fn gerund(self) -> &'static str {
        match self {
            Self::Stop => "Stopping",
            Self::Restart => "Restarting",
            Self::Delete => "Deleting",
            Self::RefreshTokens => "Refreshing tokens for",
        }
    }
}

/// What the controller is currently doing, shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationStatus {
    #[default]
    Ready,
    Syncing,
    Deleting,
    Stopping,
    Restarting,
    RefreshingTokens,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Ready => "Ready",
            Self::Syncing => "Syncing...",
            Self::Deleting => "Deleting...",
            Self::Stopping => "Stopping...",
            Self::Restarting => "Restarting...",
            Self::RefreshingTokens => "Refreshing tokens...",
        };
        write!(f, "{label}")
    }
}
