use bosun_core::config::{NamedColor, ThemeColor, ThemeConfig};
use bosun_core::session::SessionState;
use bosun_core::state::ToastKind;
use ratatui::style::Color;

/// Resolved palette handed to every renderer. Widgets never look at
/// the raw config colors.
pub struct Theme {
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub muted: Color,
    pub border: Color,
    pub hint: Color,
    pub highlight_fg: Color,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            accent: resolve(&config.accent),
            success: resolve(&config.success),
            error: resolve(&config.error),
            warning: resolve(&config.warning),
            muted: resolve(&config.muted),
            border: resolve(&config.border),
            hint: resolve(&config.hint),
            highlight_fg: resolve(&config.highlight_fg),
        }
    }

    /// Session rows: running is positive, exited fades out, anything
    /// transitional stands out.
    pub fn session_state(&self, state: &SessionState) -> Color {
        match state {
            SessionState::Running => self.success,
            SessionState::Exited => self.muted,
            SessionState::Other(_) => self.warning,
        }
    }

    pub fn toast(&self, kind: ToastKind) -> Color {
        match kind {
            ToastKind::Info => self.hint,
            ToastKind::Success => self.success,
            ToastKind::Error => self.error,
        }
    }
}

fn resolve(color: &ThemeColor) -> Color {
    match color {
        ThemeColor::Rgb(r, g, b) => Color::Rgb(*r, *g, *b),
        ThemeColor::Named(named) => match named {
            NamedColor::Black => Color::Black,
            NamedColor::Red => Color::Red,
            NamedColor::Green => Color::Green,
            NamedColor::Yellow => Color::Yellow,
            NamedColor::Blue => Color::Blue,
            NamedColor::Magenta => Color::Magenta,
            NamedColor::Cyan => Color::Cyan,
            NamedColor::White => Color::White,
            NamedColor::Gray => Color::Gray,
            NamedColor::DarkGray => Color::DarkGray,
        },
    }
}
