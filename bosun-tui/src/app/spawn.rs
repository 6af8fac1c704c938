use bosun_core::{
    Message, Task, TickKind,
    config::{ConfigStore, Settings},
    constants,
    daemon,
    message::SessionsPayload,
    prereq::PrereqChecker,
    registry::Registry,
    session::{OperationKind, SessionState},
};
use std::{
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

/// Cloneable handle background threads use to report back to the loop.
#[derive(Clone)]
pub(super) struct MessageSender {
    tx: mpsc::Sender<Message>,
}

impl MessageSender {
    pub(super) fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    pub(super) fn send(&self, message: Message) {
        // A closed receiver means the loop already exited.
        let _ = self.tx.send(message);
    }
}

/// Executes tasks requested by the state machine, one thread per task.
/// Every task delivers exactly one completion message.
pub(super) struct TaskRunner {
    registry: Arc<dyn Registry>,
    config: Arc<dyn ConfigStore>,
    prereqs: Arc<dyn PrereqChecker>,
    sender: MessageSender,
}

impl TaskRunner {
    pub(super) fn new(
        registry: &Arc<dyn Registry>,
        config: &Arc<dyn ConfigStore>,
        prereqs: &Arc<dyn PrereqChecker>,
        sender: MessageSender,
    ) -> Self {
        Self {
            registry: Arc::clone(registry),
            config: Arc::clone(config),
            prereqs: Arc::clone(prereqs),
            sender,
        }
    }

    pub(super) fn run_all(&self, tasks: Vec<Task>) {
        for task in tasks {
            self.run(task);
        }
    }

    pub(super) fn run(&self, task: Task) {
        match task {
            Task::LoadSessions { generation } => self.load_sessions(generation),
            Task::LoadDetails { name } => self.load_details(name),
            Task::RunOperation { op, name } => self.run_operation(op, name),
            Task::CheckPrereqs => self.check_prereqs(),
            Task::SaveSettings { settings } => self.save_settings(settings),
            Task::ApplyFirewall { settings, added } => self.apply_firewall(settings, added),
            Task::SaveWizardConfig {
                memory,
                cpus,
                domains,
                resume_after_auth,
            } => self.save_wizard_config(memory, cpus, domains, resume_after_auth),
            Task::Tick(kind) => self.tick(kind),
        }
    }

    fn load_sessions(&self, generation: u64) {
        let registry = Arc::clone(&self.registry);
        let config = Arc::clone(&self.config);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let prefix = config.load().session.prefix;
            let result = registry
                .list_sessions(&prefix)
                .map(|sessions| SessionsPayload {
                    sessions,
                    daemon_running: daemon::is_running(),
                })
                .map_err(|e| format!("{e:#}"));
            sender.send(Message::SessionsLoaded { generation, result });
        });
    }

    fn load_details(&self, name: String) {
        let registry = Arc::clone(&self.registry);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = registry.describe(&name).map_err(|e| format!("{e:#}"));
            sender.send(Message::DetailsLoaded { name, result });
        });
    }

    fn run_operation(&self, op: OperationKind, name: String) {
        let registry = Arc::clone(&self.registry);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = match op {
                OperationKind::Stop => registry.stop(&name),
                OperationKind::Restart => registry.restart(&name),
                OperationKind::Delete => registry.delete(&name),
                OperationKind::RefreshTokens => registry.refresh_tokens(&name),
            }
            .map_err(|e| format!("{e:#}"));
            sender.send(Message::OperationFinished { op, name, result });
        });
    }

    fn check_prereqs(&self) {
        let prereqs = Arc::clone(&self.prereqs);
        let sender = self.sender.clone();
        thread::spawn(move || {
            sender.send(Message::PrereqChecked(prereqs.check_all()));
        });
    }

    fn save_settings(&self, settings: Settings) {
        let config = Arc::clone(&self.config);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = config
                .store(&settings)
                .map(|()| settings)
                .map_err(|e| format!("{e:#}"));
            sender.send(Message::SettingsSaved { result });
        });
    }

    fn apply_firewall(&self, settings: Settings, added: Vec<String>) {
        let registry = Arc::clone(&self.registry);
        let config = Arc::clone(&self.config);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = (|| -> anyhow::Result<Settings> {
                config.store(&settings)?;
                let sessions = registry.list_sessions(&settings.session.prefix)?;
                for session in sessions
                    .iter()
                    .filter(|session| session.state == SessionState::Running)
                {
                    for domain in &added {
                        registry.add_domain(&session.name, domain)?;
                    }
                }
                Ok(settings)
            })()
            .map_err(|e| format!("{e:#}"));
            sender.send(Message::FirewallSaved {
                added: added.len(),
                result,
            });
        });
    }

    fn save_wizard_config(
        &self,
        memory: String,
        cpus: String,
        domains: Vec<String>,
        resume_after_auth: bool,
    ) {
        let config = Arc::clone(&self.config);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let mut settings = config.load();
            settings.session.memory = memory;
            settings.session.cpus = cpus;
            settings.firewall.domains = domains;
            settings.wizard.resume_after_auth = resume_after_auth;
            let result = config.store(&settings).map_err(|e| format!("{e:#}"));
            sender.send(Message::WizardConfigSaved {
                run_auth_now: resume_after_auth,
                result,
            });
        });
    }

    fn tick(&self, kind: TickKind) {
        let sender = self.sender.clone();
        thread::spawn(move || {
            thread::sleep(tick_interval(kind));
            sender.send(Message::Tick(kind));
        });
    }
}

fn tick_interval(kind: TickKind) -> Duration {
    match kind {
        TickKind::Pulse => constants::PULSE_INTERVAL,
        TickKind::Refresh => constants::REFRESH_INTERVAL,
        TickKind::Spinner => constants::SPINNER_INTERVAL,
        TickKind::Reveal => constants::REVEAL_INTERVAL,
    }
}
