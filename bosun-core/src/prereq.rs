use std::process::Command;
use std::sync::Mutex;

/// Result of probing a single host requirement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrereqCheck {
    pub tool: String,
    pub available: bool,
    /// Version string on success, failure reason otherwise.
    pub message: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrereqReport {
    pub checks: Vec<PrereqCheck>,
}

impl PrereqReport {
    pub fn all_available(&self) -> bool {
        self.checks.iter().all(|check| check.available)
    }
}

pub trait PrereqChecker: Send + Sync {
    fn check_all(&self) -> PrereqReport;
}

/// Probes host tooling by shelling out to `--version`.
pub struct CliPrereqChecker;

impl CliPrereqChecker {
    fn probe(command: &str, display: &str) -> PrereqCheck {
        let output = Command::new(command).arg("--version").output();
        match output {
            Ok(output) if output.status.success() => PrereqCheck {
                tool: display.to_owned(),
                available: true,
                message: String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_owned(),
            },
            Ok(output) => PrereqCheck {
                tool: display.to_owned(),
                available: false,
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            },
            Err(_) => PrereqCheck {
                tool: display.to_owned(),
                available: false,
                message: format!("{command} not found on PATH"),
            },
        }
    }
}

impl PrereqChecker for CliPrereqChecker {
    fn check_all(&self) -> PrereqReport {
        PrereqReport {
            checks: vec![
                Self::probe("docker", "Docker"),
                Self::probe("git", "Git"),
            ],
        }
    }
}

pub struct MockPrereqChecker {
    pub report: PrereqReport,
    pub calls: Mutex<usize>,
}

impl MockPrereqChecker {
    pub fn passing() -> Self {
        Self::with_report(PrereqReport {
            checks: vec![
                PrereqCheck {
                    tool: "Docker".to_owned(),
                    available: true,
                    message: "Docker version 27.0.1".to_owned(),
                },
                PrereqCheck {
                    tool: "Git".to_owned(),
                    available: true,
                    message: "git version 2.45.0".to_owned(),
                },
            ],
        })
    }

    pub fn with_report(report: PrereqReport) -> Self {
        Self {
            report,
            calls: Mutex::new(0),
        }
    }
}

impl PrereqChecker for MockPrereqChecker {
    fn check_all(&self) -> PrereqReport {
        *self.calls.lock().unwrap() += 1;
        self.report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_all_available() {
        let report = MockPrereqChecker::passing().check_all();
        assert!(report.all_available());

        let mut failing = report.clone();
        failing.checks[1].available = false;
        assert!(!failing.all_available());
    }

    #[test]
    fn test_empty_report_is_available() {
        assert!(PrereqReport::default().all_available());
    }
}
