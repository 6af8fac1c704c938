use bosun_core::constants::REVEAL_COLUMNS;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
};

use crate::theme::Theme;

const BANNER: &[&str] = &[
    "███████   ██████   ███████ ██    ██ ██    ██",
    "██    ██ ██    ██ ██       ██    ██ ███   ██",
    "███████  ██    ██  ██████  ██    ██ ██ ██ ██",
    "██    ██ ██    ██       ██ ██    ██ ██   ███",
    "███████   ██████  ███████   ██████  ██    ██",
];

/// Draws the onboarding banner revealed up to `columns`, centered in
/// `area`, with the hint line once the reveal has finished.
pub fn render(f: &mut Frame, area: Rect, columns: u16, done: bool, theme: &Theme) {
    let revealed = usize::from(columns.min(REVEAL_COLUMNS));

    let mut lines: Vec<Line> = BANNER
        .iter()
        .map(|row| {
            let visible: String = row.chars().take(revealed).collect();
            Line::styled(visible, Style::default().fg(theme.accent))
        })
        .collect();
    lines.push(Line::from(""));
    if done {
        lines.push(Line::styled(
            "press enter to begin setup",
            Style::default().fg(theme.muted),
        ));
    }

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let top = area.y + area.height.saturating_sub(height) / 2;
    let banner_area = Rect {
        x: area.x,
        y: top.min(area.y + area.height.saturating_sub(1)),
        width: area.width,
        height: height.min(area.height),
    };

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        banner_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_rows_match_reveal_width() {
        for row in BANNER {
            assert_eq!(row.chars().count(), usize::from(REVEAL_COLUMNS));
        }
    }
}
