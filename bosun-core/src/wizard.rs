use crossterm::event::KeyCode;

use crate::constants::{DEFAULT_CPUS, DEFAULT_DOMAINS, DEFAULT_MEMORY};
use crate::message::Message;
use crate::modal::{Field, Form, FormKind, Modal, ModalAction, ModalTag};
use crate::prereq::PrereqReport;

/// Onboarding steps in order. `Prev` never goes below `Prereqs`; only
/// a resume after the external auth handoff jumps backwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum WizardStep {
    Animation,
    Prereqs,
    Welcome,
    Auth,
    Firewall,
    Defaults,
    Complete,
}

impl WizardStep {
    pub fn next(self) -> Self {
        match self {
            Self::Animation => Self::Prereqs,
            Self::Prereqs => Self::Welcome,
            Self::Welcome => Self::Auth,
            Self::Auth => Self::Firewall,
            Self::Firewall => Self::Defaults,
            Self::Defaults | Self::Complete => Self::Complete,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Animation | Self::Prereqs | Self::Welcome => Self::Prereqs,
            Self::Auth => Self::Welcome,
            Self::Firewall => Self::Auth,
            Self::Defaults => Self::Firewall,
            Self::Complete => Self::Defaults,
        }
    }

    fn number(self) -> u8 {
        match self {
            Self::Animation => 0,
            Self::Prereqs => 1,
            Self::Welcome => 2,
            Self::Auth => 3,
            Self::Firewall => 4,
            Self::Defaults => 5,
            Self::Complete => 6,
        }
    }
}

/// Collected onboarding answers plus animation progress.
#[derive(Clone, Debug, PartialEq)]
pub struct WizardState {
    pub step: WizardStep,
    /// Banner columns revealed so far.
    pub reveal_column: u16,
    pub reveal_done: bool,
    pub memory: String,
    pub cpus: String,
    pub domains: Vec<String>,
    pub has_credentials: bool,
    pub last_report: Option<PrereqReport>,
}

impl WizardState {
    pub fn fresh(has_credentials: bool) -> Self {
        Self {
            step: WizardStep::Animation,
            reveal_column: 0,
            reveal_done: false,
            memory: DEFAULT_MEMORY.to_string(),
            cpus: DEFAULT_CPUS.to_string(),
            domains: DEFAULT_DOMAINS.iter().map(|d| (*d).to_string()).collect(),
            has_credentials,
            last_report: None,
        }
    }

    /// Restart after the external auth handoff: straight to the Auth
    /// step with the banner already shown.
    pub fn resumed(has_credentials: bool) -> Self {
        Self {
            step: WizardStep::Auth,
            reveal_done: true,
            ..Self::fresh(has_credentials)
        }
    }

    pub fn commit_firewall(&mut self, domains: Vec<String>) {
        self.domains = domains;
    }

    pub fn commit_defaults(&mut self, memory: String, cpus: String) {
        self.memory = memory;
        self.cpus = cpus;
    }

    /// The read-only placeholder shown while `CheckPrereqs` runs.
    pub fn checking_modal(&self) -> Modal {
        Modal::info("Prerequisites", "Checking for required tools...")
            .disable_esc()
            .tag(ModalTag::PrereqPending)
    }

    /// Replaces the placeholder once the report arrives. All tools
    /// present continues; anything missing only offers exit.
    pub fn report_modal(&self, report: &PrereqReport) -> Modal {
        let mut body = String::new();
        for check in &report.checks {
            let mark = if check.available { "ok" } else { "missing" };
            body.push_str(&format!("[{mark}] {}: {}\n", check.tool, check.message));
        }
        body.push('\n');

        let modal = if report.all_available() {
            body.push_str("All prerequisites found.");
            Modal::info("Prerequisites", &with_footer(&body, WizardStep::Prereqs)).action(
                ModalAction::primary("Continue", KeyCode::Enter, Message::WizardNext),
            )
        } else {
            body.push_str("Install the missing tools and run bosun again.");
            Modal::info("Prerequisites", &with_footer(&body, WizardStep::Prereqs))
                .action(ModalAction::primary("Exit", KeyCode::Enter, Message::Quit))
        };
        modal.disable_esc()
    }

    pub fn welcome_modal(&self) -> Modal {
        let body = "Welcome to bosun!\n\n\
            bosun runs each piece of work in its own disposable container \
            session: isolated filesystem, isolated network, its own branch. \
            The next steps collect a few defaults; everything can be changed \
            later from the dashboard.";
        Modal::info("Welcome", &with_footer(body, WizardStep::Welcome))
            .disable_esc()
            .action(ModalAction::primary(
                "Continue",
                KeyCode::Enter,
                Message::WizardNext,
            ))
            .action(ModalAction::new(
                "Back",
                KeyCode::Char('b'),
                Message::WizardPrev,
            ))
            .action(ModalAction::new(
                "Skip setup",
                KeyCode::Char('s'),
                Message::WizardSkip,
            ))
    }

    pub fn auth_modal(&self) -> Modal {
        let modal = if self.has_credentials {
            let body = "Credentials found on this machine.\n\n\
                New sessions will pick them up automatically.";
            Modal::info("Authentication", &with_footer(body, WizardStep::Auth)).action(
                ModalAction::primary("Continue", KeyCode::Enter, Message::WizardNext),
            )
        } else {
            let body = "No credentials were found on this machine.\n\n\
                Authenticate now to let sessions reach the API, or skip and \
                run `bosun auth` at any point later.";
            Modal::info("Authentication", &with_footer(body, WizardStep::Auth))
                .action(ModalAction::primary(
                    "Authenticate now",
                    KeyCode::Enter,
                    Message::WizardAuthNow,
                ))
                .action(ModalAction::new(
                    "Skip for now",
                    KeyCode::Char('s'),
                    Message::WizardNext,
                ))
        };
        modal
            .disable_esc()
            .action(ModalAction::new(
                "Back",
                KeyCode::Char('b'),
                Message::WizardPrev,
            ))
    }

    pub fn firewall_modal(&self) -> Modal {
        let form = Form::new(
            FormKind::WizardFirewall,
            vec![Field::multiline(
                "Allowed domains (one per line)",
                &self.domains.join("\n"),
            )],
        );
        Modal::form(
            &format!("Firewall - step {} of 6", WizardStep::Firewall.number()),
            form,
        )
        .width(70)
        .disable_esc()
        .action(
            ModalAction::new("Back", KeyCode::Char('b'), Message::WizardPrev).with_ctrl(),
        )
    }

    pub fn defaults_modal(&self) -> Modal {
        let form = Form::new(
            FormKind::WizardDefaults,
            vec![
                Field::text("Memory limit", &self.memory),
                Field::text("CPU limit", &self.cpus),
            ],
        );
        Modal::form(
            &format!("Session defaults - step {} of 6", WizardStep::Defaults.number()),
            form,
        )
        .disable_esc()
        .action(
            ModalAction::new("Back", KeyCode::Char('b'), Message::WizardPrev).with_ctrl(),
        )
    }

    pub fn complete_modal(&self) -> Modal {
        let body = format!(
            "Setup complete.\n\n\
             Memory limit:     {}\n\
             CPU limit:        {}\n\
             Allowed domains:  {}\n\n\
             Finish writes the configuration and opens the dashboard.",
            self.memory,
            self.cpus,
            self.domains.len(),
        );
        Modal::info("All set", &with_footer(&body, WizardStep::Complete))
            .disable_esc()
            .action(ModalAction::primary(
                "Finish",
                KeyCode::Enter,
                Message::WizardFinish,
            ))
            .action(ModalAction::new(
                "Back",
                KeyCode::Char('b'),
                Message::WizardPrev,
            ))
    }

    /// Modal for the step just entered. Animation has no modal; the
    /// prereq placeholder is paired with a `CheckPrereqs` task by the
    /// update loop.
    pub fn modal_for_step(&self) -> Option<Modal> {
        match self.step {
            WizardStep::Animation => None,
            WizardStep::Prereqs => Some(self.checking_modal()),
            WizardStep::Welcome => Some(self.welcome_modal()),
            WizardStep::Auth => Some(self.auth_modal()),
            WizardStep::Firewall => Some(self.firewall_modal()),
            WizardStep::Defaults => Some(self.defaults_modal()),
            WizardStep::Complete => Some(self.complete_modal()),
        }
    }
}

fn with_footer(body: &str, step: WizardStep) -> String {
    format!("{body}\n\nStep {} of 6", step.number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prereq::PrereqCheck;

    #[test]
    fn test_step_order() {
        let mut step = WizardStep::Animation;
        let mut seen = vec![step];
        while step != WizardStep::Complete {
            step = step.next();
            seen.push(step);
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_prev_floors_at_prereqs() {
        assert_eq!(WizardStep::Welcome.prev(), WizardStep::Prereqs);
        assert_eq!(WizardStep::Prereqs.prev(), WizardStep::Prereqs);
        assert_eq!(WizardStep::Complete.prev(), WizardStep::Defaults);
    }

    #[test]
    fn test_fresh_state_seeds_defaults() {
        let wizard = WizardState::fresh(false);
        assert_eq!(wizard.step, WizardStep::Animation);
        assert_eq!(wizard.memory, DEFAULT_MEMORY);
        assert_eq!(wizard.cpus, DEFAULT_CPUS);
        assert_eq!(wizard.domains.len(), DEFAULT_DOMAINS.len());
    }

    #[test]
    fn test_resumed_state_starts_at_auth() {
        let wizard = WizardState::resumed(true);
        assert_eq!(wizard.step, WizardStep::Auth);
        assert!(wizard.reveal_done);
    }

    #[test]
    fn test_report_modal_continue_vs_exit() {
        let wizard = WizardState::fresh(false);

        let ok = PrereqReport {
            checks: vec![PrereqCheck {
                tool: "Docker".into(),
                available: true,
                message: "Docker version 27".into(),
            }],
        };
        let modal = wizard.report_modal(&ok);
        assert!(modal.actions.iter().any(|a| a.label == "Continue"));

        let missing = PrereqReport {
            checks: vec![PrereqCheck {
                tool: "Docker".into(),
                available: false,
                message: "not found".into(),
            }],
        };
        let modal = wizard.report_modal(&missing);
        assert!(modal.actions.iter().any(|a| a.label == "Exit"));
        assert!(modal.actions.iter().all(|a| a.label != "Continue"));
    }

    #[test]
    fn test_auth_modal_depends_on_credentials() {
        let without = WizardState::fresh(false);
        assert!(without
            .auth_modal()
            .actions
            .iter()
            .any(|a| a.label == "Authenticate now"));

        let with = WizardState::fresh(true);
        assert!(with
            .auth_modal()
            .actions
            .iter()
            .all(|a| a.label != "Authenticate now"));
    }

    #[test]
    fn test_all_wizard_modals_pin_esc() {
        let wizard = WizardState {
            step: WizardStep::Welcome,
            ..WizardState::fresh(false)
        };
        for step in [
            WizardStep::Prereqs,
            WizardStep::Welcome,
            WizardStep::Auth,
            WizardStep::Firewall,
            WizardStep::Defaults,
            WizardStep::Complete,
        ] {
            let state = WizardState {
                step,
                ..wizard.clone()
            };
            let modal = state.modal_for_step().unwrap();
            assert!(modal.disable_esc, "step {step:?} must pin Esc");
        }
    }

    #[test]
    fn test_complete_modal_summarizes_answers() {
        let mut wizard = WizardState::fresh(true);
        wizard.commit_defaults("8g".into(), "4".into());
        wizard.commit_firewall(vec!["a.com".into(), "b.org".into()]);

        let modal = wizard.complete_modal();
        assert!(modal.body.contains("8g"));
        assert!(modal.body.contains("Allowed domains:  2"));
    }
}
