use bosun_core::modal::{Field, FieldKind, Form, Modal, ModalAction, ModalKind};
use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::dialog::Dialog;
use crate::theme::Theme;

const CURSOR_MARK: &str = "▏";

/// Renders any modal over the current frame. Layout comes from the
/// modal's pure description; this module only turns it into text.
pub fn render(f: &mut Frame, area: Rect, modal: &Modal, theme: &Theme) {
    let mut lines: Vec<Line> = Vec::new();

    match &modal.kind {
        ModalKind::Info | ModalKind::Confirm => {
            lines.extend(modal.body.lines().map(|line| Line::from(line.to_string())));
        }
        ModalKind::Form(form) => lines.extend(form_lines(form, theme)),
        ModalKind::Menu { selected, .. } => {
            lines.extend(menu_lines(&modal.actions, *selected, theme));
        }
    }

    if !modal.actions.is_empty() && !matches!(modal.kind, ModalKind::Menu { .. }) {
        lines.push(Line::from(""));
        lines.push(action_bar(&modal.actions, theme));
    }

    let border = match modal.kind {
        ModalKind::Confirm => theme.warning,
        _ => theme.border,
    };

    Dialog::new(lines)
        .title(&modal.title)
        .width(modal.width)
        .border_color(border)
        .scroll(modal.scroll)
        .render(f, area);
}

fn form_lines<'a>(form: &'a Form, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        lines.extend(field_lines(field, focused, theme));
        lines.push(Line::from(""));
    }
    if let Some(error) = &form.error {
        lines.push(Line::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        ));
        lines.push(Line::from(""));
    }
    lines.push(Line::styled(
        "tab next field · ctrl+s save",
        Style::default().fg(theme.muted),
    ));
    lines
}

fn field_lines<'a>(field: &'a Field, focused: bool, theme: &Theme) -> Vec<Line<'a>> {
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };

    match &field.kind {
        FieldKind::Checkbox(value) => {
            let check = if *value { "[x]" } else { "[ ]" };
            vec![Line::from(vec![
                Span::styled(marker, label_style),
                Span::raw(format!("{check} ")),
                Span::styled(field.label.as_str(), label_style),
            ])]
        }
        FieldKind::Text(input) => {
            let mut lines = vec![Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(field.label.as_str(), label_style),
            ])];

            let shown = if focused {
                let cursor = input.cursor.min(input.value.len());
                format!(
                    "{}{CURSOR_MARK}{}",
                    &input.value[..cursor],
                    &input.value[cursor..]
                )
            } else {
                input.value.clone()
            };
            for value_line in shown.split('\n') {
                lines.push(Line::from(format!("    {value_line}")));
            }
            lines
        }
    }
}

fn menu_lines<'a>(actions: &'a [ModalAction], selected: usize, theme: &Theme) -> Vec<Line<'a>> {
    actions
        .iter()
        .enumerate()
        .map(|(idx, action)| {
            let key = key_hint(action);
            let line = Line::from(vec![
                Span::styled(format!(" {key:<5}"), Style::default().fg(theme.hint)),
                Span::raw(action.label.as_str()),
            ]);
            if idx == selected {
                line.style(
                    Style::default()
                        .bg(theme.accent)
                        .fg(theme.highlight_fg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                line
            }
        })
        .collect()
}

fn action_bar<'a>(actions: &'a [ModalAction], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    for (idx, action) in actions.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if action.primary {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.hint)
        };
        spans.push(Span::styled(
            format!("{} ({})", action.label, key_hint(action)),
            style,
        ));
    }
    Line::from(spans)
}

fn key_hint(action: &ModalAction) -> String {
    let key = match action.key {
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{other:?}").to_lowercase(),
    };
    if action.ctrl { format!("ctrl+{key}") } else { key }
}
