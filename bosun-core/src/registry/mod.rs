pub mod cli;
pub mod mock;
pub mod provider;

pub use cli::DockerRegistry;
pub use mock::MockRegistry;
pub use provider::Registry;

use crate::session::{SessionDetails, SessionState, SessionSummary};

/// Parses one line of `docker ps` output in our tab-separated format:
/// `name\tstate\tstatus\tbranch-label`.
pub(crate) fn parse_ps_line(line: &str) -> Option<SessionSummary> {
    let mut parts = line.split('\t');
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let state = SessionState::parse(parts.next()?);
    let last_activity = parts.next()?.trim().to_string();
    let branch = parts
        .next()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .map(String::from);

    Some(SessionSummary {
        name: name.to_string(),
        state,
        branch,
        last_activity,
    })
}

/// Extracts the fields we show in the details modal from
/// `docker inspect` JSON output.
pub(crate) fn parse_inspect(raw: &str) -> anyhow::Result<SessionDetails> {
    let parsed: serde_json::Value = serde_json::from_str(raw)?;
    let entry = parsed
        .get(0)
        .ok_or_else(|| anyhow::anyhow!("docker inspect returned no entries"))?;

    let name = entry
        .pointer("/Name")
        .and_then(serde_json::Value::as_str)
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_default();
    let image = entry
        .pointer("/Config/Image")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let state = entry
        .pointer("/State/Status")
        .and_then(serde_json::Value::as_str)
        .map_or(SessionState::Other("unknown".to_string()), |raw| {
            SessionState::parse(raw)
        });
    let created = entry
        .pointer("/Created")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let branch = entry
        .pointer("/Config/Labels")
        .and_then(|labels| labels.get(crate::constants::BRANCH_LABEL))
        .and_then(serde_json::Value::as_str)
        .filter(|branch| !branch.is_empty())
        .map(String::from);
    let memory = entry
        .pointer("/HostConfig/Memory")
        .and_then(serde_json::Value::as_i64)
        .filter(|bytes| *bytes > 0)
        .map(format_memory_bytes);
    let cpus = entry
        .pointer("/HostConfig/NanoCpus")
        .and_then(serde_json::Value::as_i64)
        .filter(|nanos| *nanos > 0)
        .map(format_nano_cpus);

    Ok(SessionDetails {
        name,
        image,
        state,
        created,
        branch,
        memory,
        cpus,
    })
}

const GIB: i64 = 1 << 30;
const MIB: i64 = 1 << 20;

fn format_memory_bytes(bytes: i64) -> String {
    if bytes % GIB == 0 {
        format!("{}g", bytes / GIB)
    } else if bytes % MIB == 0 {
        format!("{}m", bytes / MIB)
    } else {
        format!("{bytes}b")
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "cpu counts are tiny relative to f64 precision"
)]
fn format_nano_cpus(nanos: i64) -> String {
    let cpus = nanos as f64 / 1e9;
    if (cpus - cpus.round()).abs() < f64::EPSILON {
        format!("{}", cpus.round() as i64)
    } else {
        format!("{cpus:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_line() {
        let summary = parse_ps_line("bosun-api\trunning\tUp 3 hours\tfeat/login").unwrap();
        assert_eq!(summary.name, "bosun-api");
        assert_eq!(summary.state, SessionState::Running);
        assert_eq!(summary.last_activity, "Up 3 hours");
        assert_eq!(summary.branch.as_deref(), Some("feat/login"));
    }

    #[test]
    fn test_parse_ps_line_without_branch() {
        let summary = parse_ps_line("bosun-api\texited\tExited (0) 2 days ago\t").unwrap();
        assert_eq!(summary.state, SessionState::Exited);
        assert_eq!(summary.branch, None);
    }

    #[test]
    fn test_parse_ps_line_rejects_blank() {
        assert_eq!(parse_ps_line(""), None);
        assert_eq!(parse_ps_line("\t\t\t"), None);
    }

    #[test]
    fn test_parse_inspect() {
        let raw = r#"[{
            "Name": "/bosun-api",
            "Created": "2025-11-02T10:30:00Z",
            "State": {"Status": "running"},
            "Config": {
                "Image": "bosun-workspace:latest",
                "Labels": {"bosun.branch": "main", "bosun.managed": "true"}
            },
            "HostConfig": {"Memory": 4294967296, "NanoCpus": 2000000000}
        }]"#;

        let details = parse_inspect(raw).unwrap();
        assert_eq!(details.name, "bosun-api");
        assert_eq!(details.image, "bosun-workspace:latest");
        assert_eq!(details.state, SessionState::Running);
        assert_eq!(details.branch.as_deref(), Some("main"));
        assert_eq!(details.memory.as_deref(), Some("4g"));
        assert_eq!(details.cpus.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_inspect_missing_limits() {
        let raw = r#"[{
            "Name": "/bosun-x",
            "Created": "2025-11-02T10:30:00Z",
            "State": {"Status": "exited"},
            "Config": {"Image": "img", "Labels": {}},
            "HostConfig": {"Memory": 0, "NanoCpus": 0}
        }]"#;

        let details = parse_inspect(raw).unwrap();
        assert_eq!(details.memory, None);
        assert_eq!(details.cpus, None);
        assert_eq!(details.branch, None);
    }

    #[test]
    fn test_parse_inspect_empty_array() {
        assert!(parse_inspect("[]").is_err());
    }

    #[test]
    fn test_format_memory_bytes() {
        assert_eq!(format_memory_bytes(4 * GIB), "4g");
        assert_eq!(format_memory_bytes(512 * MIB), "512m");
        assert_eq!(format_memory_bytes(1000), "1000b");
    }

    #[test]
    fn test_format_nano_cpus() {
        assert_eq!(format_nano_cpus(2_000_000_000), "2");
        assert_eq!(format_nano_cpus(1_500_000_000), "1.5");
    }
}
