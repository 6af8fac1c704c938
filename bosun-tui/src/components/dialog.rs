use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::centered_fixed_rect;

/// A centered popup with width-aware height estimation. Modal chrome,
/// toasts and the blocking error dialog all go through this.
pub struct Dialog<'a> {
    lines: Vec<Line<'a>>,
    width: u16,
    border_color: Color,
    title: Option<&'a str>,
    padding: Padding,
    alignment: Alignment,
    scroll: u16,
}

impl<'a> Dialog<'a> {
    #[must_use]
    pub fn new(lines: Vec<Line<'a>>) -> Self {
        Self {
            lines,
            width: 60,
            border_color: Color::White,
            title: None,
            padding: Padding::horizontal(1),
            alignment: Alignment::Left,
            scroll: 0,
        }
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn h_chrome(&self) -> u16 {
        2 + self.padding.left + self.padding.right
    }

    fn v_chrome(&self) -> u16 {
        2 + self.padding.top + self.padding.bottom
    }

    /// `(width, height)` once wrapped into `area`.
    pub fn size(&self, area: Rect) -> (u16, u16) {
        let width = self.width.min(area.width);
        let text_width = width.saturating_sub(self.h_chrome()).max(1);

        let content_height: u16 = self
            .lines
            .iter()
            .map(|line| word_wrapped_line_count(line, text_width))
            .sum();

        (width, (content_height + self.v_chrome()).min(area.height))
    }

    /// Renders centered on `area`, clearing the background first.
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (width, height) = self.size(area);
        let centered = centered_fixed_rect(width, height, area);

        f.render_widget(Clear, centered);

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .padding(self.padding);
        if let Some(title) = self.title {
            block = block.title(title);
        }

        let paragraph = Paragraph::new(self.lines.clone())
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(self.alignment)
            .scroll((self.scroll, 0));

        f.render_widget(paragraph, centered);
    }
}

/// Visual line count for a `Line` word-wrapped to `max_width` columns,
/// measured in display columns via `unicode-width`.
pub fn word_wrapped_line_count(line: &Line, max_width: u16) -> u16 {
    let max_w = usize::from(max_width);
    if max_w == 0 {
        return 1;
    }

    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    if text.is_empty() {
        return 1;
    }

    let mut lines: u16 = 1;
    let mut col: usize = 0;

    for (i, word) in text.split(' ').enumerate() {
        let w = word.width();
        let needed = if i == 0 || col == 0 { w } else { w + 1 };

        if col + needed <= max_w {
            col += needed;
        } else if w <= max_w {
            lines += 1;
            col = w;
        } else {
            // A word longer than the line hard-wraps.
            if col > 0 {
                lines += 1;
            }
            col = w;
            while col > max_w {
                lines += 1;
                col -= max_w;
            }
        }
    }

    lines
}
