use anyhow::Result;

use crate::session::{SessionDetails, SessionSummary};

/// Container engine boundary. Background tasks hold this as
/// `Arc<dyn Registry>` so tests can swap in a mock.
pub trait Registry: Send + Sync {
    /// All managed sessions whose name carries `prefix`, running or
    /// not, sorted by name.
    fn list_sessions(&self, prefix: &str) -> Result<Vec<SessionSummary>>;
    fn describe(&self, name: &str) -> Result<SessionDetails>;
    fn stop(&self, name: &str) -> Result<()>;
    fn restart(&self, name: &str) -> Result<()>;
    fn delete(&self, name: &str) -> Result<()>;
    /// Copy the host credentials file into the session.
    fn refresh_tokens(&self, name: &str) -> Result<()>;
    /// Allow outbound traffic to `domain` inside a running session.
    fn add_domain(&self, name: &str, domain: &str) -> Result<()>;
}
