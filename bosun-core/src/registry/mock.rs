use super::provider::Registry;
use crate::session::{OperationKind, SessionDetails, SessionState, SessionSummary};
use anyhow::Result;
use std::sync::Mutex;

/// In-memory registry for tests. Records every mutating call and can
/// be told to fail a specific operation.
#[derive(Default)]
pub struct MockRegistry {
    pub sessions: Mutex<Vec<SessionSummary>>,
    pub details: Mutex<Vec<SessionDetails>>,
    /// Operations that should report failure instead of succeeding.
    pub failing: Vec<OperationKind>,
    pub fail_list: bool,
    pub operations: Mutex<Vec<(OperationKind, String)>>,
    pub added_domains: Mutex<Vec<(String, String)>>,
}

impl MockRegistry {
    pub fn with_sessions(sessions: Vec<SessionSummary>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            ..Default::default()
        }
    }

    fn record(&self, op: OperationKind, name: &str) -> Result<()> {
        self.operations.lock().unwrap().push((op, name.to_string()));
        if self.failing.contains(&op) {
            anyhow::bail!("simulated {op:?} failure for {name}");
        }
        Ok(())
    }
}

impl Registry for MockRegistry {
    fn list_sessions(&self, prefix: &str) -> Result<Vec<SessionSummary>> {
        if self.fail_list {
            anyhow::bail!("simulated list failure");
        }
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|session| session.name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn describe(&self, name: &str) -> Result<SessionDetails> {
        self.details
            .lock()
            .unwrap()
            .iter()
            .find(|details| details.name == name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such session: {name}"))
    }

    fn stop(&self, name: &str) -> Result<()> {
        self.record(OperationKind::Stop, name)?;
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|session| session.name == name) {
            session.state = SessionState::Exited;
        }
        Ok(())
    }

    fn restart(&self, name: &str) -> Result<()> {
        self.record(OperationKind::Restart, name)?;
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|session| session.name == name) {
            session.state = SessionState::Running;
        }
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.record(OperationKind::Delete, name)?;
        self.sessions
            .lock()
            .unwrap()
            .retain(|session| session.name != name);
        Ok(())
    }

    fn refresh_tokens(&self, name: &str) -> Result<()> {
        self.record(OperationKind::RefreshTokens, name)
    }

    fn add_domain(&self, name: &str, domain: &str) -> Result<()> {
        self.added_domains
            .lock()
            .unwrap()
            .push((name.to_string(), domain.to_string()));
        Ok(())
    }
}
