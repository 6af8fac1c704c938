mod spawn;

use crate::{components, theme::Theme};
use bosun_core::{
    AppState, Message, Outcome, Snapshot,
    config::ConfigStore,
    prereq::PrereqChecker,
    registry::Registry,
    update,
};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use spawn::{MessageSender, TaskRunner};
use std::{sync::{Arc, mpsc}, time::Duration};

/// Runs the dashboard until the state machine produces a terminal
/// outcome. The returned snapshot lets the caller re-enter the loop
/// without a visible reload after an external handoff.
pub fn run(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    registry: &Arc<dyn Registry>,
    config: &Arc<dyn ConfigStore>,
    prereqs: &Arc<dyn PrereqChecker>,
    theme: &Theme,
) -> anyhow::Result<(Outcome, Snapshot)> {
    let (tx, rx) = mpsc::channel::<Message>();
    let runner = TaskRunner::new(registry, config, prereqs, MessageSender::new(tx));

    runner.run_all(update::startup_tasks(state));

    loop {
        terminal.draw(|f| draw(f, state, theme))?;

        if let Some(outcome) = state.outcome.take() {
            log::debug!("leaving dashboard loop: {outcome:?}");
            return Ok((outcome, state.snapshot()));
        }

        // Drain task completions before blocking on input, redrawing
        // between batches so progress stays visible.
        let mut dispatched = false;
        while let Ok(message) = rx.try_recv() {
            runner.run_all(update::handle(state, message));
            dispatched = true;
        }
        if dispatched {
            continue;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    runner.run_all(update::handle(state, Message::Key(key)));
                }
                Event::Resize(width, height) => {
                    runner.run_all(update::handle(state, Message::Resized { width, height }));
                }
                _ => {}
            }
        }
    }
}

fn draw(f: &mut Frame, state: &AppState, theme: &Theme) {
    if let Some(wizard) = &state.wizard {
        components::banner::render(
            f,
            f.area(),
            wizard.reveal_column,
            wizard.reveal_done,
            theme,
        );
    } else {
        components::dashboard::render(f, f.area(), state, theme);
    }
    if let Some(modal) = &state.modal {
        components::modal::render(f, f.area(), modal, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_core::config::{MemoryConfigStore, Settings};
    use bosun_core::session::{SessionState, SessionSummary};
    use bosun_core::state::wizard_entry;
    use bosun_core::{Task, WizardState};
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_to_string(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render_state(state: &AppState) -> String {
        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::from_config(&Settings::default().theme);
        terminal.draw(|f| draw(f, state, &theme)).unwrap();
        buffer_to_string(&terminal)
    }

    #[test]
    fn test_draw_dashboard_with_sessions() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.sessions.replace(vec![SessionSummary {
            name: "bosun-api".to_string(),
            state: SessionState::Running,
            branch: Some("main".to_string()),
            last_activity: "Up 3 hours".to_string(),
        }]);
        let rendered = render_state(&state);
        assert!(rendered.contains("bosun-api"));
        assert!(rendered.contains("running"));
    }

    #[test]
    fn test_draw_dashboard_with_modal_overlay() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.modal = Some(bosun_core::modal::help_modal());
        let rendered = render_state(&state);
        assert!(rendered.contains("Keyboard shortcuts"));
    }

    #[test]
    fn test_draw_wizard_shows_banner_not_dashboard() {
        let state = AppState::new(Settings::default(), Some(WizardState::fresh(false)), None);
        let rendered = render_state(&state);
        assert!(!rendered.contains("session controller"));
    }

    #[test]
    fn test_wizard_entry_skipped_when_configured() {
        let store = MemoryConfigStore::default();
        *store.has_config.lock().unwrap() = true;
        *store.has_credentials.lock().unwrap() = true;
        assert!(wizard_entry(&store, &Settings::default()).is_none());
    }

    #[test]
    fn test_startup_schedules_initial_load() {
        let mut state = AppState::new(Settings::default(), None, None);
        let tasks = update::startup_tasks(&mut state);
        assert!(
            tasks
                .iter()
                .any(|task| matches!(task, Task::LoadSessions { .. }))
        );
    }
}
