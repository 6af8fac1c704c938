pub mod config;
pub mod constants;
pub mod daemon;
pub mod message;
pub mod modal;
pub mod outcome;
pub mod paths;
pub mod prereq;
pub mod registry;
pub mod session;
pub mod state;
pub mod task;
pub mod update;
pub mod wizard;

pub use config::{ConfigStore, Settings};
pub use message::Message;
pub use modal::{Modal, ModalKind};
pub use outcome::{CreateParams, Outcome};
pub use registry::Registry;
pub use session::{OperationKind, OperationStatus, SessionDetails, SessionState, SessionSummary};
pub use state::{AppState, SessionList, Snapshot};
pub use task::{Task, TickKind};
pub use wizard::{WizardState, WizardStep};
