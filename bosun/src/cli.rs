use bosun_core::registry::Registry;
use bosun_core::session::SessionSummary;
use serde::Serialize;
use std::fmt::Write;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone)]
pub struct CliError {
    message: String,
    code: i32,
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 2,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(value: anyhow::Error) -> Self {
        Self::system(format!("{value:#}"))
    }
}

#[derive(Debug, Serialize)]
struct SessionOutput {
    name: String,
    state: String,
    branch: Option<String>,
    activity: String,
}

impl From<SessionSummary> for SessionOutput {
    fn from(session: SessionSummary) -> Self {
        Self {
            name: session.name,
            state: session.state.label().to_string(),
            branch: session.branch,
            activity: session.last_activity,
        }
    }
}

pub fn cmd_list(registry: &dyn Registry, prefix: &str, json: bool) -> CliResult<()> {
    let sessions = registry
        .list_sessions(prefix)
        .map_err(|e| CliError::system(format!("{e:#}")))?;
    let output: Vec<SessionOutput> = sessions.into_iter().map(SessionOutput::from).collect();

    if json {
        print_json(&output)?;
    } else {
        print!("{}", format_session_table(&output));
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| CliError::system(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn format_session_table(sessions: &[SessionOutput]) -> String {
    if sessions.is_empty() {
        return "No sessions found.\n".to_string();
    }

    let name_width = sessions
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let state_width = sessions
        .iter()
        .map(|s| s.state.len())
        .max()
        .unwrap_or(0)
        .max("STATE".len());
    let branch_width = sessions
        .iter()
        .map(|s| s.branch.as_deref().unwrap_or("-").len())
        .max()
        .unwrap_or(0)
        .max("BRANCH".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<state_width$}  {:<branch_width$}  ACTIVITY",
        "NAME", "STATE", "BRANCH"
    );
    for session in sessions {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<state_width$}  {:<branch_width$}  {}",
            session.name,
            session.state,
            session.branch.as_deref().unwrap_or("-"),
            session.activity
        );
    }
    out
}

pub fn print_error(error: &CliError, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": error.message() });
        eprintln!("{payload}");
    } else {
        eprintln!("{}", error.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_core::registry::MockRegistry;
    use bosun_core::session::SessionState;

    fn output(name: &str, state: &str, branch: Option<&str>) -> SessionOutput {
        SessionOutput {
            name: name.to_string(),
            state: state.to_string(),
            branch: branch.map(String::from),
            activity: "Up 5 minutes".to_string(),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CliError::user("bad name").code(), 1);
        assert_eq!(CliError::system("docker exploded").code(), 2);
    }

    #[test]
    fn test_table_has_header_and_alignment() {
        let table = format_session_table(&[
            output("bosun-api", "running", Some("feat/auth")),
            output("bosun-web", "exited", None),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].contains("bosun-api"));
        assert!(lines[2].contains('-'), "missing branch shown as dash");
        // Columns line up: STATE starts at the same offset everywhere.
        let offset = lines[0].find("STATE").unwrap();
        assert_eq!(&lines[1][offset..offset + 7], "running");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_session_table(&[]), "No sessions found.\n");
    }

    #[test]
    fn test_session_output_serializes_label() {
        let session = SessionSummary {
            name: "bosun-api".to_string(),
            state: SessionState::Running,
            branch: None,
            last_activity: "Up 1 hour".to_string(),
        };
        let rendered = serde_json::to_string(&SessionOutput::from(session)).unwrap();
        assert!(rendered.contains("\"state\":\"running\""));
        assert!(rendered.contains("\"branch\":null"));
    }

    #[test]
    fn test_cmd_list_surfaces_registry_failure() {
        let registry = MockRegistry {
            fail_list: true,
            ..Default::default()
        };
        let error = cmd_list(&registry, "bosun-", false).unwrap_err();
        assert_eq!(error.code(), 2);
        assert!(error.message().contains("simulated list failure"));
    }
}
