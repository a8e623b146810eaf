//! Light/dark theme preference and the palettes the widgets draw with.

use ratatui::style::{Color, Modifier, Style};

/// Environment variable that forces a theme (`light` or `dark`).
pub const THEME_ENV: &str = "TRELLIS_THEME";

/// Light or dark color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl ThemeMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Whether this is [`ThemeMode::Dark`].
    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    /// Read the host's color-scheme preference from the process environment.
    ///
    /// Widgets call this once, at construction.
    pub fn detect() -> Self {
        Self::detect_from(|name| std::env::var(name).ok())
    }

    /// Resolve the preference through `lookup`: [`THEME_ENV`] wins, then the
    /// terminal's `COLORFGBG` background, then [`ThemeMode::Light`].
    pub fn detect_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(mode) = lookup(THEME_ENV).as_deref().and_then(Self::parse) {
            return mode;
        }
        lookup("COLORFGBG")
            .as_deref()
            .and_then(Self::from_colorfgbg)
            .unwrap_or_default()
    }

    /// Parse `"light"` / `"dark"` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    /// Interpret a `COLORFGBG` value such as `"15;0"` or `"0;default;15"`.
    ///
    /// The last field is the background palette index; 0-6 and 8 are dark.
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(if bg <= 6 || bg == 8 {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        })
    }

    /// Label shown on the theme toggle hint.
    pub fn switch_label(self) -> &'static str {
        match self {
            ThemeMode::Light => "Dark mode",
            ThemeMode::Dark => "Light mode",
        }
    }
}

/// Styles derived from a [`ThemeMode`].
#[derive(Debug, Clone)]
pub struct Palette {
    /// Accent for the current step, active sort, focused borders.
    pub primary: Style,
    /// Completed steps.
    pub success: Style,
    /// Validation errors.
    pub error: Style,
    /// Secondary text, inactive items, disabled controls.
    pub muted: Style,
    /// Body text.
    pub text: Style,
    /// Borders.
    pub border: Style,
    /// Skeleton placeholder blocks.
    pub skeleton: Style,
    /// Background of selected rows.
    pub selected_row: Style,
}

impl Palette {
    /// Palette for `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                primary: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                success: Style::default().fg(Color::Green),
                error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                muted: Style::default().fg(Color::DarkGray),
                text: Style::default().fg(Color::Black),
                border: Style::default().fg(Color::Gray),
                skeleton: Style::default().fg(Color::Gray),
                selected_row: Style::default().bg(Color::Gray),
            },
            ThemeMode::Dark => Self {
                primary: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                success: Style::default().fg(Color::LightGreen),
                error: Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                muted: Style::default().fg(Color::Gray),
                text: Style::default().fg(Color::White),
                border: Style::default().fg(Color::DarkGray),
                skeleton: Style::default().fg(Color::DarkGray),
                selected_row: Style::default().bg(Color::DarkGray),
            },
        }
    }
}
