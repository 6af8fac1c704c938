use bosun_core::state::AppState;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::theme::Theme;

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draws the main dashboard: header, session table, status bar and
/// key hints. Modals and toasts are layered on top by the caller.
pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [header, table, status, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(f, header, state, theme);
    if state.sessions.entries.is_empty() {
        render_empty(f, table, state, theme);
    } else {
        render_table(f, table, state, theme);
    }
    render_status(f, status, state, theme);
    if state.settings.ui.show_tips {
        render_footer(f, footer, theme);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let daemon = if state.daemon_running {
        Span::styled("daemon ●", Style::default().fg(theme.success))
    } else {
        Span::styled("daemon ○", Style::default().fg(theme.muted))
    };
    let line = Line::from(vec![
        Span::styled(
            " bosun ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("· session controller  ", Style::default().fg(theme.muted)),
        daemon,
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_empty(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let text = if state.loading && !state.initial_load_done {
        "Loading sessions..."
    } else {
        "No sessions yet. Press n to create one."
    };
    let vertical_center = Rect {
        y: area.y + area.height / 2,
        height: 1,
        ..area
    };
    f.render_widget(
        Paragraph::new(Line::styled(text, Style::default().fg(theme.muted)))
            .alignment(Alignment::Center),
        vertical_center,
    );
}

fn render_table(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let header = Row::new(["NAME", "STATE", "BRANCH", "ACTIVITY"])
        .style(Style::default().fg(theme.hint).add_modifier(Modifier::BOLD));

    let rows = state.sessions.entries.iter().map(|session| {
        let state_style = Style::default().fg(theme.session_state(&session.state));
        Row::new(vec![
            Cell::from(session.name.clone()),
            Cell::from(session.state.label().to_string()).style(state_style),
            Cell::from(session.branch.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(session.last_activity.clone()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .bg(theme.accent)
            .fg(theme.highlight_fg)
            .add_modifier(Modifier::BOLD),
    );

    let mut table_state = TableState::default().with_selected(state.sessions.cursor);
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_status(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let dot = if state.pulse_frame % 2 == 0 { "●" } else { "○" };
    let mut spans = vec![
        Span::styled(format!(" {dot} "), Style::default().fg(theme.accent)),
        Span::raw(state.status.to_string()),
    ];
    if state.loading || state.operation_in_flight() {
        let frame = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!(" {frame}"),
            Style::default().fg(theme.accent),
        ));
    }
    if let Some(toast) = &state.toast {
        let color = theme.toast(toast.kind);
        spans.push(Span::raw("  "));
        spans.push(Span::styled(toast.text.clone(), Style::default().fg(color)));
    }

    let right = Line::styled(
        format!(
            "{} sessions  v{} ",
            state.sessions.entries.len(),
            env!("CARGO_PKG_VERSION"),
        ),
        Style::default().fg(theme.muted),
    )
    .alignment(Alignment::Right);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
    f.render_widget(Paragraph::new(right), area);
}

fn render_footer(f: &mut Frame, area: Rect, theme: &Theme) {
    let hints =
        " enter connect · n new · a actions · i details · s settings · f firewall · ? help · q quit";
    f.render_widget(
        Paragraph::new(Line::styled(hints, Style::default().fg(theme.muted))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_core::config::Settings;
    use bosun_core::session::{SessionState, SessionSummary};
    use bosun_core::state::{SessionList, Toast};
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

    fn session(name: &str, state: SessionState) -> SessionSummary {
        SessionSummary {
            name: name.to_string(),
            state,
            branch: Some("main".to_string()),
            last_activity: "Up 2 hours".to_string(),
        }
    }

    fn draw(state: &AppState) -> String {
        let backend = TestBackend::new(90, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::from_config(&state.settings.theme);
        terminal.draw(|f| render(f, f.area(), state, &theme)).unwrap();
        buffer_to_string(&terminal)
    }

    #[test]
    fn test_renders_session_rows() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.sessions = SessionList::new(vec![
            session("bosun-api", SessionState::Running),
            session("bosun-web", SessionState::Exited),
        ]);

        let rendered = draw(&state);
        assert!(rendered.contains("bosun-api"));
        assert!(rendered.contains("bosun-web"));
        assert!(rendered.contains("running"));
        assert!(rendered.contains("exited"));
        assert!(rendered.contains("2 sessions"));
    }

    #[test]
    fn test_empty_list_hint() {
        let state = AppState::new(Settings::default(), None, None);
        let rendered = draw(&state);
        assert!(rendered.contains("No sessions yet"));
    }

    #[test]
    fn test_loading_placeholder_before_first_load() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.loading = true;
        let rendered = draw(&state);
        assert!(rendered.contains("Loading sessions..."));
    }

    #[test]
    fn test_toast_in_status_bar() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.show_toast(Toast::success("Session bosun-x removed"));
        let rendered = draw(&state);
        assert!(rendered.contains("Session bosun-x removed"));
    }

    #[test]
    fn test_footer_hidden_without_tips() {
        let mut state = AppState::new(Settings::default(), None, None);
        state.settings.ui.show_tips = false;
        let rendered = draw(&state);
        assert!(!rendered.contains("? help"));
    }
}
