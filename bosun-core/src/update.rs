use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::constants::{REVEAL_COLUMNS, SPINNER_FRAME_COUNT};
use crate::message::Message;
use crate::modal::{
    self, Modal, ModalAction, ModalKind, ModalResponse, ModalTag,
};
use crate::outcome::Outcome;
use crate::prereq::PrereqReport;
use crate::session::{OperationKind, OperationStatus};
use crate::state::{AppState, Toast};
use crate::task::{Task, TickKind};
use crate::wizard::WizardStep;

/// The initial schedule. Onboarding starts the banner reveal (or the
/// step a resume landed on); the dashboard starts its tick chains and
/// the first enumeration.
pub fn startup_tasks(state: &mut AppState) -> Vec<Task> {
    if let Some(wizard) = &state.wizard {
        let mut tasks = Vec::new();
        if wizard.step == WizardStep::Animation {
            tasks.push(Task::Tick(TickKind::Reveal));
        } else {
            enter_wizard_step(state, &mut tasks);
        }
        return tasks;
    }

    let mut tasks = vec![Task::Tick(TickKind::Pulse), Task::Tick(TickKind::Refresh)];
    schedule_load(state, &mut tasks);
    tasks
}

/// The single transition function: state + message in, tasks out.
/// No I/O happens here; everything observable is in the returned
/// tasks or the mutated state.
pub fn handle(state: &mut AppState, message: Message) -> Vec<Task> {
    match message {
        Message::Tick(kind) => handle_tick(state, kind),
        Message::Resized { width, height } => {
            state.width = width;
            state.height = height;
            Vec::new()
        }
        Message::Key(key) => handle_key(state, key),

        Message::SessionsLoaded { generation, result } => {
            sessions_loaded(state, generation, result)
        }
        Message::DetailsLoaded { name, result } => details_loaded(state, &name, result),
        Message::OperationFinished { op, name, result } => {
            operation_finished(state, op, &name, result)
        }
        Message::PrereqChecked(report) => prereq_checked(state, &report),
        Message::SettingsSaved { result } => {
            // Applied only now; a failed write must not leave the
            // in-memory settings ahead of the file.
            match result {
                Ok(settings) => {
                    state.settings = settings;
                    state.show_toast(Toast::success("Settings saved"));
                }
                Err(err) => {
                    state.modal = Some(modal::error_modal("Save Failed", &err));
                }
            }
            Vec::new()
        }
        Message::FirewallSaved { added, result } => {
            match result {
                Ok(settings) => {
                    state.settings = settings;
                    state.show_toast(Toast::success(format!(
                        "Firewall updated ({added} domains added)"
                    )));
                }
                Err(err) => {
                    state.modal = Some(modal::error_modal("Firewall Update Failed", &err));
                }
            }
            Vec::new()
        }
        Message::WizardConfigSaved {
            run_auth_now,
            result,
        } => wizard_config_saved(state, run_auth_now, result),

        Message::ShowActionsMenu { name } => {
            if let Some(session) = state
                .sessions
                .entries
                .iter()
                .find(|session| session.name == name)
            {
                state.modal = Some(modal::actions_menu(session));
            }
            Vec::new()
        }
        Message::RequestOperation { op, name } => {
            if op.needs_confirmation() {
                state.modal = Some(modal::confirm_operation_modal(op, &name));
                Vec::new()
            } else {
                start_operation(state, op, name)
            }
        }
        Message::ConfirmOperation { op, name } => start_operation(state, op, name),
        Message::Connect { name } => {
            state.modal = None;
            state.outcome = Some(Outcome::Connect { name });
            Vec::new()
        }
        Message::Quit => {
            state.outcome = Some(Outcome::Quit);
            Vec::new()
        }

        Message::WizardNext => wizard_goto(state, WizardStep::next),
        Message::WizardPrev => wizard_goto(state, WizardStep::prev),
        Message::WizardSkip => wizard_skip(state),
        Message::WizardAuthNow => wizard_save(state, true),
        Message::WizardFinish => wizard_save(state, false),
    }
}

fn handle_tick(state: &mut AppState, kind: TickKind) -> Vec<Task> {
    match kind {
        TickKind::Pulse => {
            state.pulse_frame = state.pulse_frame.wrapping_add(1);
            if let Some(toast) = &mut state.toast {
                toast.remaining = toast.remaining.saturating_sub(1);
                if toast.remaining == 0 {
                    state.toast = None;
                }
            }
            vec![Task::Tick(TickKind::Pulse)]
        }
        TickKind::Refresh => {
            let mut tasks = Vec::new();
            if state.refresh_allowed() {
                schedule_load(state, &mut tasks);
            }
            tasks.push(Task::Tick(TickKind::Refresh));
            tasks
        }
        TickKind::Spinner => {
            if state.loading || state.operation_in_flight() {
                state.spinner_frame = (state.spinner_frame + 1) % SPINNER_FRAME_COUNT;
                vec![Task::Tick(TickKind::Spinner)]
            } else {
                state.spinner_scheduled = false;
                Vec::new()
            }
        }
        TickKind::Reveal => {
            let Some(wizard) = &mut state.wizard else {
                return Vec::new();
            };
            if wizard.step != WizardStep::Animation || wizard.reveal_done {
                return Vec::new();
            }
            wizard.reveal_column += 1;
            if wizard.reveal_column >= REVEAL_COLUMNS {
                wizard.reveal_done = true;
                Vec::new()
            } else {
                vec![Task::Tick(TickKind::Reveal)]
            }
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Task> {
    if state.wizard.is_some() {
        return handle_wizard_key(state, key);
    }
    // An open modal owns the keyboard; even ctrl+c goes to it.
    if state.modal.is_some() {
        return handle_modal_key(state, key);
    }
    handle_dashboard_key(state, key)
}

fn handle_wizard_key(state: &mut AppState, key: KeyEvent) -> Vec<Task> {
    // Onboarding can always be abandoned, modal or not. q does the
    // same unless a form field is taking text.
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let in_form = state.modal.as_ref().is_some_and(Modal::is_form);
    if (ctrl && key.code == KeyCode::Char('c'))
        || (key.code == KeyCode::Char('q') && !in_form)
    {
        state.outcome = Some(Outcome::Quit);
        return Vec::new();
    }

    let on_animation = state
        .wizard
        .as_ref()
        .is_some_and(|wizard| wizard.step == WizardStep::Animation);
    if on_animation {
        if key.code == KeyCode::Enter {
            let wizard = state.wizard.as_mut().expect("wizard checked above");
            if wizard.reveal_done {
                return wizard_goto(state, WizardStep::next);
            }
            wizard.reveal_column = REVEAL_COLUMNS;
            wizard.reveal_done = true;
        }
        return Vec::new();
    }

    handle_modal_key(state, key)
}

fn handle_modal_key(state: &mut AppState, key: KeyEvent) -> Vec<Task> {
    let Some(modal) = state.modal.as_mut() else {
        return Vec::new();
    };
    match modal.handle_key(key) {
        ModalResponse::Consumed => Vec::new(),
        ModalResponse::Close => {
            state.modal = None;
            Vec::new()
        }
        ModalResponse::Emit(message) => handle(state, message),
        ModalResponse::Submit => submit_form(state),
    }
}

fn handle_dashboard_key(state: &mut AppState, key: KeyEvent) -> Vec<Task> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            state.outcome = Some(Outcome::Quit);
        }
        return Vec::new();
    }
    match key.code {
        KeyCode::Char('q') => {
            state.outcome = Some(Outcome::Quit);
        }
        KeyCode::Up | KeyCode::Char('k') => state.sessions.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => state.sessions.move_cursor(1),
        KeyCode::Enter => {
            if let Some(session) = state.sessions.selected() {
                state.outcome = Some(Outcome::Connect {
                    name: session.name.clone(),
                });
            }
        }
        KeyCode::Char('n') => state.modal = Some(modal::create_modal()),
        KeyCode::Char('a') => {
            if let Some(session) = state.sessions.selected() {
                state.modal = Some(modal::actions_menu(session));
            }
        }
        KeyCode::Char('i') => {
            if let Some(session) = state.sessions.selected() {
                let name = session.name.clone();
                state.modal = Some(modal::details_pending_modal(&name));
                return vec![Task::LoadDetails { name }];
            }
        }
        KeyCode::Char('s') => state.modal = Some(modal::settings_modal(&state.settings)),
        KeyCode::Char('f') => state.modal = Some(modal::firewall_modal(&state.settings)),
        KeyCode::Char('?') => state.modal = Some(modal::help_modal()),
        _ => {}
    }
    Vec::new()
}

fn submit_form(state: &mut AppState) -> Vec<Task> {
    let Some(mut taken) = state.modal.take() else {
        return Vec::new();
    };
    let ModalKind::Form(form) = &mut taken.kind else {
        state.modal = Some(taken);
        return Vec::new();
    };

    match form.kind {
        modal::FormKind::Create => match form.create_params() {
            Ok(params) => {
                state.outcome = Some(Outcome::Create(params));
                Vec::new()
            }
            Err(err) => {
                form.error = Some(err);
                state.modal = Some(taken);
                Vec::new()
            }
        },
        modal::FormKind::Settings => match form.settings_values(&state.settings) {
            // The new settings travel with the task and come back in
            // SettingsSaved, so nothing changes if the write fails.
            Ok(settings) => vec![Task::SaveSettings { settings }],
            Err(err) => {
                form.error = Some(err);
                state.modal = Some(taken);
                Vec::new()
            }
        },
        modal::FormKind::Firewall => {
            let domains = form.domain_lines();
            let added: Vec<String> = domains
                .iter()
                .filter(|domain| !state.settings.firewall.domains.contains(domain))
                .cloned()
                .collect();
            let mut settings = state.settings.clone();
            settings.firewall.domains = domains;
            vec![Task::ApplyFirewall { settings, added }]
        }
        modal::FormKind::WizardFirewall => {
            let domains = form.domain_lines();
            if let Some(wizard) = &mut state.wizard {
                wizard.commit_firewall(domains);
            }
            wizard_goto(state, WizardStep::next)
        }
        modal::FormKind::WizardDefaults => match form.defaults_values() {
            Ok((memory, cpus)) => {
                if let Some(wizard) = &mut state.wizard {
                    wizard.commit_defaults(memory, cpus);
                }
                wizard_goto(state, WizardStep::next)
            }
            Err(err) => {
                form.error = Some(err);
                state.modal = Some(taken);
                Vec::new()
            }
        },
    }
}

fn start_operation(state: &mut AppState, op: OperationKind, name: String) -> Vec<Task> {
    state.modal = None;
    state.status = op.status();
    let mut tasks = vec![Task::RunOperation { op, name }];
    ensure_spinner(state, &mut tasks);
    tasks
}

fn operation_finished(
    state: &mut AppState,
    op: OperationKind,
    name: &str,
    result: Result<(), String>,
) -> Vec<Task> {
    match result {
        Ok(()) => {
            let text = match op {
                OperationKind::RefreshTokens => format!("Tokens refreshed for {name}"),
                _ => format!("Session {name} {}", op.past_tense()),
            };
            state.show_toast(Toast::success(text));
        }
        Err(err) => {
            state.modal = Some(modal::error_modal("Operation Failed", &err));
        }
    }

    // The list is stale either way; reload and let the newest
    // enumeration win. schedule_load flips the status to Syncing
    // until that enumeration lands.
    let mut tasks = Vec::new();
    schedule_load(state, &mut tasks);
    tasks
}

fn sessions_loaded(
    state: &mut AppState,
    generation: u64,
    result: Result<crate::message::SessionsPayload, String>,
) -> Vec<Task> {
    if generation != state.list_generation {
        debug!("dropping stale enumeration (generation {generation})");
        return Vec::new();
    }
    state.loading = false;
    // An in-flight operation keeps its own status; only a sync ends here.
    if state.status == OperationStatus::Syncing {
        state.status = OperationStatus::Ready;
    }

    match result {
        Ok(payload) => {
            state.daemon_running = payload.daemon_running;
            let count = payload.sessions.len();
            state.sessions.replace(payload.sessions);
            if !state.initial_load_done {
                state.initial_load_done = true;
                state.show_toast(Toast::info(format!("Loaded {count} sessions")));
            }
        }
        Err(err) => {
            if state.initial_load_done {
                debug!("background refresh failed: {err}");
            } else {
                state.show_toast(Toast::error(format!("Failed to load sessions: {err}")));
            }
        }
    }
    Vec::new()
}

fn details_loaded(
    state: &mut AppState,
    name: &str,
    result: Result<crate::session::SessionDetails, String>,
) -> Vec<Task> {
    let pending = matches!(
        state.modal.as_ref().map(|modal| &modal.tag),
        Some(ModalTag::DetailsPending { name: pending }) if pending == name
    );
    if !pending {
        debug!("dropping orphaned details for {name}");
        return Vec::new();
    }

    state.modal = Some(match result {
        Ok(details) => modal::details_modal(&details),
        Err(err) => modal::error_modal("Details Unavailable", &err),
    });
    Vec::new()
}

fn prereq_checked(state: &mut AppState, report: &PrereqReport) -> Vec<Task> {
    let on_step = state
        .wizard
        .as_ref()
        .is_some_and(|wizard| wizard.step == WizardStep::Prereqs);
    let pending = matches!(
        state.modal.as_ref().map(|modal| &modal.tag),
        Some(ModalTag::PrereqPending)
    );
    if !on_step || !pending {
        debug!("dropping orphaned prerequisite report");
        return Vec::new();
    }

    let wizard = state.wizard.as_mut().expect("wizard checked above");
    wizard.last_report = Some(report.clone());
    state.modal = Some(wizard.report_modal(report));
    Vec::new()
}

fn wizard_goto(state: &mut AppState, transition: fn(WizardStep) -> WizardStep) -> Vec<Task> {
    let Some(wizard) = &mut state.wizard else {
        return Vec::new();
    };
    wizard.step = transition(wizard.step);
    let mut tasks = Vec::new();
    enter_wizard_step(state, &mut tasks);
    tasks
}

/// Installs the modal for the wizard's current step, kicking off the
/// prerequisite probe when that step is entered (in either direction).
fn enter_wizard_step(state: &mut AppState, tasks: &mut Vec<Task>) {
    let Some(wizard) = &state.wizard else {
        return;
    };
    state.modal = wizard.modal_for_step();
    if wizard.step == WizardStep::Prereqs {
        tasks.push(Task::CheckPrereqs);
    }
}

fn wizard_skip(state: &mut AppState) -> Vec<Task> {
    let Some(wizard) = state.wizard.take() else {
        return Vec::new();
    };
    state.modal = None;
    apply_wizard_answers(state, &wizard.memory, &wizard.cpus, &wizard.domains, false);

    let mut tasks = vec![
        Task::SaveWizardConfig {
            memory: wizard.memory,
            cpus: wizard.cpus,
            domains: wizard.domains,
            resume_after_auth: false,
        },
        Task::Tick(TickKind::Pulse),
        Task::Tick(TickKind::Refresh),
    ];
    schedule_load(state, &mut tasks);
    tasks
}

fn wizard_save(state: &mut AppState, run_auth_now: bool) -> Vec<Task> {
    let Some(wizard) = &state.wizard else {
        return Vec::new();
    };
    let (memory, cpus, domains) = (
        wizard.memory.clone(),
        wizard.cpus.clone(),
        wizard.domains.clone(),
    );
    apply_wizard_answers(state, &memory, &cpus, &domains, run_auth_now);
    vec![Task::SaveWizardConfig {
        memory,
        cpus,
        domains,
        resume_after_auth: run_auth_now,
    }]
}

fn apply_wizard_answers(
    state: &mut AppState,
    memory: &str,
    cpus: &str,
    domains: &[String],
    resume_after_auth: bool,
) {
    state.settings.session.memory = memory.to_string();
    state.settings.session.cpus = cpus.to_string();
    state.settings.firewall.domains = domains.to_vec();
    state.settings.wizard.resume_after_auth = resume_after_auth;
}

fn wizard_config_saved(
    state: &mut AppState,
    run_auth_now: bool,
    result: Result<(), String>,
) -> Vec<Task> {
    match result {
        Ok(()) => {
            if run_auth_now {
                state.outcome = Some(Outcome::RunAuth);
                return Vec::new();
            }
            if state.wizard.is_none() {
                // Skip path: the dashboard is already running.
                return Vec::new();
            }
            state.wizard = None;
            state.modal = None;
            state.show_toast(Toast::success("Setup complete"));

            let mut tasks = vec![Task::Tick(TickKind::Pulse), Task::Tick(TickKind::Refresh)];
            schedule_load(state, &mut tasks);
            tasks
        }
        Err(err) => {
            if state.wizard.is_some() {
                state.modal = Some(
                    Modal::info(
                        "Configuration Error",
                        &format!("Could not write the configuration file:\n\n{err}"),
                    )
                    .disable_esc()
                    .action(ModalAction::primary("Exit", KeyCode::Enter, Message::Quit)),
                );
            } else {
                state.show_toast(Toast::error(format!("Failed to save configuration: {err}")));
            }
            Vec::new()
        }
    }
}

fn schedule_load(state: &mut AppState, tasks: &mut Vec<Task>) {
    state.loading = true;
    state.status = OperationStatus::Syncing;
    state.list_generation += 1;
    tasks.push(Task::LoadSessions {
        generation: state.list_generation,
    });
    ensure_spinner(state, tasks);
}

fn ensure_spinner(state: &mut AppState, tasks: &mut Vec<Task>) {
    if !state.spinner_scheduled {
        state.spinner_scheduled = true;
        tasks.push(Task::Tick(TickKind::Spinner));
    }
}
