//! Key binding definitions shared by the widgets, plus help-line formatting.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One or more key combinations mapped to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// Human-readable description of the action.
    pub description: String,
    /// Disabled bindings never match and are left out of help lines.
    pub enabled: bool,
}

/// A single key press with modifier keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key code.
    pub code: KeyCode,
    /// Modifier keys that must be held alongside the base key.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Binding for a single key combination.
    pub fn new(key: KeyCombination, description: impl Into<String>) -> Self {
        Self::with_keys(vec![key], description)
    }

    /// Binding for several key combinations.
    pub fn with_keys(keys: Vec<KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    /// Whether `event` matches any of the key combinations.
    ///
    /// Required modifiers must be held; a Ctrl/Alt binding never matches a
    /// plain key and a plain binding never matches a Ctrl/Alt chord.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let chord = KeyModifiers::CONTROL | KeyModifiers::ALT;
        self.keys.iter().any(|k| {
            k.code == event.code
                && event.modifiers.contains(k.modifiers)
                && (event.modifiers & chord) == (k.modifiers & chord)
        })
    }

    /// Enable or disable the binding.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Label of the first key combination, e.g. `"Ctrl+S"`.
    pub fn help_key(&self) -> String {
        self.keys.first().map(KeyCombination::label).unwrap_or_default()
    }
}

impl KeyCombination {
    /// Key combination with no modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self::with_modifiers(code, KeyModifiers::NONE)
    }

    /// Key combination with Ctrl.
    pub fn ctrl(code: KeyCode) -> Self {
        Self::with_modifiers(code, KeyModifiers::CONTROL)
    }

    /// Key combination with Shift.
    pub fn shift(code: KeyCode) -> Self {
        Self::with_modifiers(code, KeyModifiers::SHIFT)
    }

    /// Key combination with an explicit modifier set.
    pub fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Display label, e.g. `"Enter"`, `"Ctrl+T"`, `"space"`.
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            other => format!("{other:?}"),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", key.to_uppercase())
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            format!("Alt+{key}")
        } else {
            key
        }
    }
}

/// Types that define key bindings and can describe them for a help line.
pub trait KeyMap {
    /// The most important bindings, for a one-line hint.
    fn short_help(&self) -> Vec<&Binding>;
    /// All bindings grouped by category.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

/// Join bindings into a hint line: `"Enter: Next  │  Esc: Previous"`.
///
/// Disabled bindings are skipped.
pub fn hint_line(bindings: &[&Binding]) -> String {
    bindings
        .iter()
        .filter(|b| b.enabled)
        .map(|b| format!("{}: {}", b.help_key(), b.description))
        .collect::<Vec<_>>()
        .join("  │  ")
}
