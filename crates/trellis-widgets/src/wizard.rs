//! Multi-step wizard with per-step validation, optional steps and a
//! light/dark theme toggle.
//!
//! Steps are trait objects that render themselves, may consume keys, and
//! validate synchronously or asynchronously. The wizard tracks the current
//! step, the completed steps and a [`Phase`]; while a validator or the
//! async-step hook is in flight the wizard is busy and ignores navigation.
//!
//! # Example
//!
//! ```ignore
//! use trellis_widgets::wizard::{Step, Verdict, Wizard};
//!
//! let wizard = Wizard::new(vec![
//!     Box::new(Step::new("Account").with_validator(move || {
//!         if name_is_empty() { Verdict::fail("Name required") } else { Verdict::Pass }
//!     })),
//!     Box::new(Step::new("Profile").optional()),
//!     Box::new(Step::new("Confirm").with_async_validator(|| async { check().await })),
//! ])
//! .with_show_skip(true)
//! .with_simulated_latency(Duration::from_millis(800));
//! ```

use crate::key::{hint_line, Binding, KeyCombination, KeyMap};
use crate::theme::{Palette, ThemeMode};
use crossterm::event::{KeyCode, KeyEvent};
use futures::future::BoxFuture;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use trellis_core::command::Command;
use trellis_core::component::Component;

/// Message shown when a validator fails without saying why.
pub const GENERIC_FAILURE: &str = "Validation failed";

/// The classic fixed pause, for [`Wizard::with_simulated_latency`].
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(800);

/// Outcome of a step validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The step may be left.
    Pass,
    /// The step stays; the message (or [`GENERIC_FAILURE`]) is shown.
    Fail(Option<String>),
}

impl Verdict {
    /// Failure with a message.
    pub fn fail(message: impl Into<String>) -> Self {
        Verdict::Fail(Some(message.into()))
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail(None)
        }
    }
}

/// A validator that could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The validator gave up with a reason.
    #[error("{0}")]
    Rejected(String),
    /// The validator's backing service could not be reached.
    #[error("validator unavailable")]
    Unavailable,
}

/// Future produced by an asynchronous validator.
pub type PendingVerdict = BoxFuture<'static, Result<Verdict, ValidationError>>;

/// Result of [`WizardStep::validate`].
pub enum Validation {
    /// Decided on the spot.
    Ready(Verdict),
    /// Decided later; the wizard waits in [`Phase::Validating`].
    Pending(PendingVerdict),
}

impl Validation {
    /// Wrap a validation future.
    pub fn pending(
        future: impl Future<Output = Result<Verdict, ValidationError>> + Send + 'static,
    ) -> Self {
        Validation::Pending(Box::pin(future))
    }
}

/// Transition requested by a step's own key handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    /// Stay on the current step.
    Stay,
    /// Same as [`Wizard::next`].
    Next,
    /// Same as [`Wizard::prev`].
    Back,
    /// Same as [`Wizard::skip`].
    Skip,
}

/// A single wizard step.
///
/// Each step owns its own state (text fields, toggles) and handles its own
/// keys and rendering.
pub trait WizardStep: Send {
    /// Title shown in the step list.
    fn title(&self) -> &str;

    /// Whether the step may be skipped.
    fn optional(&self) -> bool {
        false
    }

    /// Handle a key the wizard did not claim.
    fn handle_key(&mut self, _key: KeyEvent) -> StepTransition {
        StepTransition::Stay
    }

    /// Render the step content.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// Decide whether the step may be left.
    fn validate(&self) -> Validation {
        Validation::Ready(Verdict::Pass)
    }
}

type SyncValidator = Arc<dyn Fn() -> Verdict + Send + Sync>;
type AsyncValidator = Arc<dyn Fn() -> PendingVerdict + Send + Sync>;

enum Validator {
    Sync(SyncValidator),
    Async(AsyncValidator),
}

/// A ready-made step: static text plus an optional validator closure.
pub struct Step {
    title: String,
    content: String,
    optional: bool,
    validator: Option<Validator>,
}

impl Step {
    /// Step with a title and no content.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            optional: false,
            validator: None,
        }
    }

    /// Body text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Mark the step optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Validate synchronously.
    pub fn with_validator(mut self, validator: impl Fn() -> Verdict + Send + Sync + 'static) -> Self {
        self.validator = Some(Validator::Sync(Arc::new(validator)));
        self
    }

    /// Validate asynchronously.
    pub fn with_async_validator<F, Fut>(mut self, validator: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verdict, ValidationError>> + Send + 'static,
    {
        self.validator = Some(Validator::Async(Arc::new(move || -> PendingVerdict {
            Box::pin(validator())
        })));
        self
    }
}

impl WizardStep for Step {
    fn title(&self) -> &str {
        &self.title
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Paragraph::new(self.content.as_str()).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn validate(&self) -> Validation {
        match &self.validator {
            None => Validation::Ready(Verdict::Pass),
            Some(Validator::Sync(f)) => Validation::Ready(f()),
            Some(Validator::Async(f)) => Validation::Pending(f()),
        }
    }
}

/// Where the wizard is in its step lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input.
    #[default]
    Idle,
    /// An async validator is running.
    Validating,
    /// The last `next()` failed with this message.
    Error(String),
    /// Validation passed; the async-step hook is running.
    Advancing,
    /// The last step was finished.
    Complete,
}

impl Phase {
    /// Whether work is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Validating | Phase::Advancing)
    }
}

/// Messages for the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press.
    KeyPress(KeyEvent),
    /// Validate and advance.
    Next,
    /// Go back one step.
    Prev,
    /// Skip an optional step.
    Skip,
    /// Flip light/dark.
    ToggleTheme,
    /// An async validator for `step` finished.
    Validated {
        /// Step the validator ran for.
        step: usize,
        /// Its outcome.
        result: Result<Verdict, ValidationError>,
    },
    /// The async-step hook for `step` finished.
    StepSettled {
        /// Step being left.
        step: usize,
    },

    /// Emitted: the current step changed.
    StepChanged(usize),
    /// Emitted: the last step was finished.
    Completed,
    /// Emitted: the theme was toggled.
    ThemeChanged(ThemeMode),
}

/// Configurable key bindings for the wizard.
#[derive(Debug, Clone)]
pub struct WizardKeyBindings {
    /// Validate and advance. Default: Enter
    pub next: Binding,
    /// Previous step. Default: Esc
    pub prev: Binding,
    /// Skip an optional step. Default: Ctrl+S
    pub skip: Binding,
    /// Toggle theme. Default: Ctrl+T
    pub theme: Binding,
}

impl Default for WizardKeyBindings {
    fn default() -> Self {
        Self {
            next: Binding::new(KeyCombination::new(KeyCode::Enter), "Next"),
            prev: Binding::new(KeyCombination::new(KeyCode::Esc), "Previous"),
            skip: Binding::new(KeyCombination::ctrl(KeyCode::Char('s')), "Skip"),
            theme: Binding::new(KeyCombination::ctrl(KeyCode::Char('t')), "Theme"),
        }
    }
}

impl KeyMap for WizardKeyBindings {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.prev, &self.skip, &self.next]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![vec![&self.prev, &self.skip, &self.next], vec![&self.theme]]
    }
}

/// Style configuration for the wizard.
#[derive(Debug, Clone)]
pub struct WizardStyle {
    /// Border.
    pub border: Style,
    /// Title in the border.
    pub title: Style,
    /// Current step in the step list.
    pub current: Style,
    /// Completed steps.
    pub completed: Style,
    /// Steps not yet reached.
    pub pending: Style,
    /// "(Optional)" tag.
    pub optional_tag: Style,
    /// "Loading..." placeholder.
    pub loading: Style,
    /// Validation error line.
    pub error: Style,
    /// Navigation hint line.
    pub nav_hint: Style,
}

impl WizardStyle {
    /// Style derived from the palette of `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let palette = Palette::for_mode(mode);
        Self {
            border: palette.border,
            title: palette.text.add_modifier(Modifier::BOLD),
            current: palette.primary,
            completed: palette.success,
            pending: palette.text,
            optional_tag: palette.muted,
            loading: palette.primary,
            error: palette.error,
            nav_hint: palette.muted,
        }
    }
}

impl Default for WizardStyle {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

enum AsyncStep {
    Hook(Arc<dyn Fn(usize) -> BoxFuture<'static, ()> + Send + Sync>),
    Latency(Duration),
}

/// Multi-step wizard component.
pub struct Wizard {
    steps: Vec<Box<dyn WizardStep>>,
    current: usize,
    completed: BTreeSet<usize>,
    phase: Phase,
    loading: bool,
    async_step: Option<AsyncStep>,
    show_skip: bool,
    theme: ThemeMode,
    style: WizardStyle,
    key_bindings: WizardKeyBindings,
}

impl Wizard {
    /// Wizard over `steps`, starting at the first one.
    ///
    /// The theme comes from the environment (see [`ThemeMode::detect`]).
    pub fn new(steps: Vec<Box<dyn WizardStep>>) -> Self {
        let theme = ThemeMode::detect();
        Self {
            steps,
            current: 0,
            completed: BTreeSet::new(),
            phase: Phase::Idle,
            loading: false,
            async_step: None,
            show_skip: false,
            theme,
            style: WizardStyle::for_mode(theme),
            key_bindings: WizardKeyBindings::default(),
        }
    }

    /// Start at `index`, clamped to the last step.
    pub fn with_initial_step(mut self, index: usize) -> Self {
        self.current = index.min(self.steps.len().saturating_sub(1));
        self
    }

    /// Start with the external loading flag set.
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// After a step validates, run `hook(step)` and only move on once it
    /// resolves.
    pub fn with_async_step<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.async_step = Some(AsyncStep::Hook(Arc::new(
            move |step| -> BoxFuture<'static, ()> { Box::pin(hook(step)) },
        )));
        self
    }

    /// After a step validates, pause for `delay` before moving on.
    pub fn with_simulated_latency(mut self, delay: Duration) -> Self {
        self.async_step = Some(AsyncStep::Latency(delay));
        self
    }

    /// Offer skipping on optional steps.
    pub fn with_show_skip(mut self, show: bool) -> Self {
        self.show_skip = show;
        self
    }

    /// Override the detected theme.
    pub fn with_theme(mut self, mode: ThemeMode) -> Self {
        self.theme = mode;
        self.style = WizardStyle::for_mode(mode);
        self
    }

    /// Custom style. Replaced by the palette style on the next theme toggle.
    pub fn with_style(mut self, style: WizardStyle) -> Self {
        self.style = style;
        self
    }

    /// Custom key bindings.
    pub fn with_key_bindings(mut self, bindings: WizardKeyBindings) -> Self {
        self.key_bindings = bindings;
        self
    }

    /// Set the external loading flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Current step index.
    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Title of the current step.
    pub fn current_title(&self) -> &str {
        self.steps
            .get(self.current)
            .map(|s| s.title())
            .unwrap_or("")
    }

    /// Indices of completed steps.
    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Validation error on the current step.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Whether a validator or the async-step hook is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Whether the last step was finished.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// External loading flag.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current theme.
    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Key bindings.
    pub fn key_bindings(&self) -> &WizardKeyBindings {
        &self.key_bindings
    }

    /// Whether the current step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    fn blocked(&self) -> bool {
        self.steps.is_empty() || self.loading || self.is_busy()
    }

    /// Whether [`next`](Wizard::next) would do anything.
    pub fn can_next(&self) -> bool {
        !self.blocked() && !self.is_complete()
    }

    /// Whether [`prev`](Wizard::prev) would do anything.
    pub fn can_prev(&self) -> bool {
        !self.blocked() && self.current > 0
    }

    /// Whether [`skip`](Wizard::skip) would do anything.
    pub fn can_skip(&self) -> bool {
        self.can_next()
            && self.show_skip
            && self.steps.get(self.current).is_some_and(|s| s.optional())
    }

    // ── operations ──

    /// Validate the current step and advance when it passes.
    pub fn next(&mut self) -> Command<Message> {
        if !self.can_next() {
            return Command::none();
        }
        self.phase = Phase::Idle;
        let step = self.current;
        let Some(current) = self.steps.get(step) else {
            return Command::none();
        };
        match current.validate() {
            Validation::Ready(verdict) => self.on_validated(step, Ok(verdict)),
            Validation::Pending(future) => {
                tracing::debug!(step, "validating");
                self.phase = Phase::Validating;
                Command::perform(future, move |result| Message::Validated { step, result })
            }
        }
    }

    /// Go back one step, clearing any error.
    pub fn prev(&mut self) -> Command<Message> {
        if self.blocked() {
            return Command::none();
        }
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
        if self.current == 0 {
            return Command::none();
        }
        self.current -= 1;
        self.phase = Phase::Idle;
        tracing::debug!(step = self.current, "moved back");
        Command::message(Message::StepChanged(self.current))
    }

    /// Mark an optional step completed without validating and advance.
    pub fn skip(&mut self) -> Command<Message> {
        if !self.can_skip() {
            return Command::none();
        }
        tracing::debug!(step = self.current, "skipped");
        self.finish_step(self.current)
    }

    /// Flip light/dark.
    pub fn toggle_theme(&mut self) -> Command<Message> {
        self.theme = self.theme.toggled();
        self.style = WizardStyle::for_mode(self.theme);
        Command::message(Message::ThemeChanged(self.theme))
    }

    fn on_validated(
        &mut self,
        step: usize,
        result: Result<Verdict, ValidationError>,
    ) -> Command<Message> {
        match result {
            Ok(Verdict::Pass) => self.advance(step),
            Ok(Verdict::Fail(message)) => {
                let message = message.unwrap_or_else(|| GENERIC_FAILURE.to_string());
                tracing::debug!(step, %message, "validation failed");
                self.phase = Phase::Error(message);
                Command::none()
            }
            Err(err) => {
                tracing::warn!(step, error = %err, "validator rejected");
                self.phase = Phase::Error(format!("{GENERIC_FAILURE}: {err}"));
                Command::none()
            }
        }
    }

    fn advance(&mut self, step: usize) -> Command<Message> {
        let settle = match &self.async_step {
            None => return self.finish_step(step),
            Some(AsyncStep::Hook(hook)) => {
                Command::perform(hook(step), move |()| Message::StepSettled { step })
            }
            Some(AsyncStep::Latency(delay)) => {
                Command::tick(*delay, move |_| Message::StepSettled { step })
            }
        };
        self.phase = Phase::Advancing;
        settle
    }

    fn finish_step(&mut self, step: usize) -> Command<Message> {
        self.completed.insert(step);
        if step + 1 < self.steps.len() {
            self.current = step + 1;
            self.phase = Phase::Idle;
            tracing::debug!(step = self.current, "advanced");
            Command::message(Message::StepChanged(self.current))
        } else {
            self.phase = Phase::Complete;
            tracing::debug!("wizard complete");
            Command::message(Message::Completed)
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        if self.key_bindings.theme.matches(&key) {
            return self.toggle_theme();
        }
        if self.key_bindings.next.matches(&key) {
            return self.next();
        }
        if self.key_bindings.prev.matches(&key) {
            return self.prev();
        }
        if self.key_bindings.skip.matches(&key) {
            return self.skip();
        }
        if !self.can_next() {
            return Command::none();
        }
        let transition = match self.steps.get_mut(self.current) {
            Some(step) => step.handle_key(key),
            None => StepTransition::Stay,
        };
        match transition {
            StepTransition::Stay => Command::none(),
            StepTransition::Next => self.next(),
            StepTransition::Back => self.prev(),
            StepTransition::Skip => self.skip(),
        }
    }

    // ── rendering ──

    fn render_step_list(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ─  ", self.style.optional_tag));
            }
            let (marker, style) = if self.completed.contains(&i) {
                ("✓".to_string(), self.style.completed)
            } else if i == self.current {
                ("●".to_string(), self.style.current)
            } else {
                ((i + 1).to_string(), self.style.pending)
            };
            let style = if i == self.current {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            spans.push(Span::styled(format!("{marker} {}", step.title()), style));
            if step.optional() {
                spans.push(Span::styled(" (Optional)", self.style.optional_tag));
            }
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }

    fn render_nav_hints(&self, frame: &mut Frame, area: Rect) {
        let kb = &self.key_bindings;
        let prev = kb.prev.clone().enabled(self.can_prev());
        let skip = kb.skip.clone().enabled(self.can_skip());
        let mut next = kb.next.clone().enabled(self.can_next());
        if self.is_last_step() {
            next.description = "Finish".to_string();
        }
        let theme = Binding {
            description: self.theme.switch_label().to_string(),
            ..kb.theme.clone()
        };
        let text = hint_line(&[&prev, &skip, &next, &theme]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, self.style.nav_hint)))
                .alignment(Alignment::Center),
            area,
        );
    }
}

impl Component for Wizard {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::Next => self.next(),
            Message::Prev => self.prev(),
            Message::Skip => self.skip(),
            Message::ToggleTheme => self.toggle_theme(),
            Message::Validated { step, result } => {
                if self.phase != Phase::Validating || step != self.current {
                    tracing::debug!(step, "stale validation result ignored");
                    return Command::none();
                }
                self.phase = Phase::Idle;
                self.on_validated(step, result)
            }
            Message::StepSettled { step } => {
                if self.phase != Phase::Advancing || step != self.current {
                    tracing::debug!(step, "stale step completion ignored");
                    return Command::none();
                }
                self.finish_step(step)
            }
            Message::StepChanged(_) | Message::Completed | Message::ThemeChanged(_) => {
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if self.steps.is_empty() {
            return;
        }
        let block = Block::default()
            .title(Span::styled(self.current_title(), self.style.title))
            .title(
                Line::from(Span::styled(
                    format!(" Step {}/{} ", self.current + 1, self.steps.len()),
                    self.style.nav_hint,
                ))
                .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_style(self.style.border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [list, _, content, error, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_step_list(frame, list);

        if self.loading || self.is_busy() {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading...", self.style.loading))
                    .alignment(Alignment::Center),
                content,
            );
        } else if self.is_complete() {
            frame.render_widget(
                Paragraph::new(Span::styled("All steps complete.", self.style.completed))
                    .alignment(Alignment::Center),
                content,
            );
        } else if let Some(step) = self.steps.get(self.current) {
            step.render(frame, content);
        }

        if let Some(message) = self.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(message, self.style.error)).alignment(Alignment::Center),
                error,
            );
        }

        self.render_nav_hints(frame, hints);
    }

    fn focused(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use trellis_core::testing::{render_component, TestProgram};
    use trellis_core::Model;

    fn key(code: KeyCode) -> Message {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Message {
        Message::KeyPress(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn plain(titles: &[&str]) -> Wizard {
        let steps = titles
            .iter()
            .map(|t| Box::new(Step::new(*t)) as Box<dyn WizardStep>)
            .collect();
        Wizard::new(steps).with_theme(ThemeMode::Light)
    }

    #[test]
    fn prev_at_first_step_is_noop() {
        let mut wiz = plain(&["A", "B"]);
        assert!(wiz.prev().is_none());
        assert_eq!(wiz.current_step(), 0);
    }

    #[test]
    fn prev_at_first_step_still_clears_error() {
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("Name").with_validator(|| Verdict::fail("Name required"))),
            Box::new(Step::new("B")),
        ]);
        wiz.next();
        assert_eq!(wiz.error(), Some("Name required"));
        assert!(wiz.prev().is_none());
        assert_eq!(wiz.error(), None);
        assert_eq!(wiz.current_step(), 0);
    }

    #[test]
    fn next_advances_and_marks_completed() {
        let mut wiz = plain(&["A", "B", "C"]);
        assert_eq!(wiz.next().into_message(), Some(Message::StepChanged(1)));
        assert_eq!(wiz.current_step(), 1);
        assert!(wiz.completed().contains(&0));
    }

    #[test]
    fn completion_emitted_exactly_once() {
        let mut wiz = plain(&["A", "B"]);
        wiz.next();
        assert_eq!(wiz.next().into_message(), Some(Message::Completed));
        assert!(wiz.is_complete());
        assert_eq!(wiz.current_step(), 1);
        assert!(wiz.next().is_none());
        assert!(wiz.update(key(KeyCode::Enter)).is_none());
        assert_eq!(wiz.current_step(), 1);
    }

    #[test]
    fn prev_leaves_complete_without_touching_completed_set() {
        let mut wiz = plain(&["A", "B"]);
        wiz.next();
        wiz.next();
        assert_eq!(wiz.prev().into_message(), Some(Message::StepChanged(0)));
        assert_eq!(wiz.phase(), &Phase::Idle);
        assert_eq!(wiz.completed().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn name_required_scenario() {
        let name = Arc::new(Mutex::new(String::new()));
        let check = name.clone();
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("Name").with_validator(move || {
                if check.lock().unwrap().is_empty() {
                    Verdict::fail("Name required")
                } else {
                    Verdict::Pass
                }
            })),
            Box::new(Step::new("Done")),
        ]);

        assert!(wiz.next().is_none());
        assert_eq!(wiz.error(), Some("Name required"));
        assert_eq!(wiz.current_step(), 0);

        *name.lock().unwrap() = "Ada".to_string();
        assert_eq!(wiz.next().into_message(), Some(Message::StepChanged(1)));
        assert_eq!(wiz.current_step(), 1);
        assert_eq!(wiz.error(), None);
    }

    #[test]
    fn failure_without_message_uses_generic_text() {
        let mut wiz = Wizard::new(vec![Box::new(Step::new("A").with_validator(|| false.into()))]);
        wiz.next();
        assert_eq!(wiz.error(), Some(GENERIC_FAILURE));
    }

    #[test]
    fn prev_clears_error() {
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("A")),
            Box::new(Step::new("B").with_validator(|| Verdict::fail("nope"))),
        ]);
        wiz.next();
        wiz.next();
        assert_eq!(wiz.error(), Some("nope"));
        wiz.prev();
        assert_eq!(wiz.error(), None);
    }

    #[test]
    fn skip_rejected_on_required_step() {
        let mut wiz = plain(&["A", "B"]).with_show_skip(true);
        assert!(wiz.skip().is_none());
        assert_eq!(wiz.current_step(), 0);
        assert!(wiz.completed().is_empty());
    }

    #[test]
    fn skip_requires_show_skip() {
        let mut wiz = Wizard::new(vec![Box::new(Step::new("A").optional()), Box::new(Step::new("B"))]);
        assert!(wiz.skip().is_none());
    }

    #[test]
    fn skip_bypasses_validation() {
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("A").optional().with_validator(|| Verdict::fail("never"))),
            Box::new(Step::new("B")),
        ])
        .with_show_skip(true)
        .with_simulated_latency(Duration::from_secs(60));
        assert_eq!(wiz.update(ctrl('s')).into_message(), Some(Message::StepChanged(1)));
        assert!(wiz.completed().contains(&0));
        assert_eq!(wiz.error(), None);
    }

    #[test]
    fn loading_blocks_navigation() {
        let mut wiz = plain(&["A", "B"]).with_loading(true);
        assert!(wiz.next().is_none());
        wiz.set_loading(false);
        assert!(!wiz.next().is_none());
        wiz.set_loading(true);
        assert!(wiz.prev().is_none());
        assert_eq!(wiz.current_step(), 1);
    }

    #[test]
    fn initial_step_is_clamped() {
        let wiz = plain(&["A", "B"]).with_initial_step(7);
        assert_eq!(wiz.current_step(), 1);
    }

    #[test]
    fn empty_wizard_ignores_everything() {
        let mut wiz = Wizard::new(Vec::new());
        assert!(wiz.next().is_none());
        assert!(wiz.prev().is_none());
        assert!(wiz.skip().is_none());
        assert_eq!(render_component(&wiz, 20, 5).trim(), "");
    }

    #[test]
    fn toggle_theme_emits_new_mode() {
        let mut wiz = plain(&["A"]);
        assert_eq!(
            wiz.update(ctrl('t')).into_message(),
            Some(Message::ThemeChanged(ThemeMode::Dark))
        );
        assert_eq!(wiz.theme(), ThemeMode::Dark);
        wiz.toggle_theme();
        assert_eq!(wiz.theme(), ThemeMode::Light);
    }

    struct Confirm {
        agreed: bool,
    }

    impl WizardStep for Confirm {
        fn title(&self) -> &str {
            "Confirm"
        }

        fn handle_key(&mut self, key: KeyEvent) -> StepTransition {
            match key.code {
                KeyCode::Char('y') => {
                    self.agreed = true;
                    StepTransition::Next
                }
                _ => StepTransition::Stay,
            }
        }

        fn render(&self, _frame: &mut Frame, _area: Rect) {}

        fn validate(&self) -> Validation {
            Validation::Ready(self.agreed.into())
        }
    }

    #[test]
    fn step_key_handler_can_request_next() {
        let mut wiz = Wizard::new(vec![Box::new(Confirm { agreed: false })]);
        assert!(wiz.update(key(KeyCode::Char('n'))).is_none());
        assert_eq!(wiz.update(key(KeyCode::Char('y'))).into_message(), Some(Message::Completed));
    }

    // ── async ──

    #[tokio::test]
    async fn pending_validator_blocks_until_result() {
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("A").with_async_validator(|| async { Ok(Verdict::Pass) })),
            Box::new(Step::new("B")),
        ]);
        let cmd = wiz.next();
        assert_eq!(wiz.phase(), &Phase::Validating);
        assert!(wiz.next().is_none());
        assert!(wiz.prev().is_none());

        let msg = cmd.into_future().expect("validator future").await;
        assert_eq!(wiz.update(msg).into_message(), Some(Message::StepChanged(1)));
        assert_eq!(wiz.current_step(), 1);
    }

    #[tokio::test]
    async fn rejected_validator_surfaces_error() {
        let mut wiz = Wizard::new(vec![Box::new(Step::new("A").with_async_validator(|| async {
            Err(ValidationError::Rejected("timeout".into()))
        }))]);
        let msg = wiz.next().into_future().expect("validator future").await;
        assert!(wiz.update(msg).is_none());
        assert_eq!(wiz.error(), Some("Validation failed: timeout"));
        assert_eq!(wiz.current_step(), 0);
    }

    #[tokio::test]
    async fn async_step_hook_gates_the_transition() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let mut wiz = plain(&["A", "B"]).with_async_step(move |_step| {
            let flag = flag.clone();
            async move { flag.store(true, Ordering::SeqCst) }
        });
        let cmd = wiz.next();
        assert_eq!(wiz.phase(), &Phase::Advancing);
        assert_eq!(wiz.current_step(), 0);

        let msg = cmd.into_future().expect("hook future").await;
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(wiz.update(msg).into_message(), Some(Message::StepChanged(1)));
    }

    #[tokio::test]
    async fn simulated_latency_settles_via_timer() {
        let mut wiz = plain(&["A"]).with_simulated_latency(Duration::from_millis(5));
        let msg = wiz.next().into_future().expect("timer").await;
        assert_eq!(msg, Message::StepSettled { step: 0 });
        assert_eq!(wiz.update(msg).into_message(), Some(Message::Completed));
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut wiz = plain(&["A", "B"]);
        assert!(wiz
            .update(Message::Validated { step: 0, result: Ok(Verdict::Pass) })
            .is_none());
        assert!(wiz.update(Message::StepSettled { step: 0 }).is_none());
        assert_eq!(wiz.current_step(), 0);
    }

    struct Host {
        wizard: Wizard,
        log: Vec<String>,
    }

    #[derive(Debug)]
    enum HostMsg {
        Wizard(Message),
    }

    impl Model for Host {
        type Message = HostMsg;
        type Flags = ();

        fn init(_: ()) -> (Self, Command<HostMsg>) {
            let wizard = Wizard::new(vec![
                Box::new(Step::new("A").with_async_validator(|| async { Ok(Verdict::Pass) })),
                Box::new(Step::new("B")),
            ]);
            (Host { wizard, log: Vec::new() }, Command::none())
        }

        fn update(&mut self, msg: HostMsg) -> Command<HostMsg> {
            let HostMsg::Wizard(msg) = msg;
            match &msg {
                Message::StepChanged(i) => self.log.push(format!("step {i}")),
                Message::Completed => self.log.push("done".into()),
                _ => {}
            }
            self.wizard.update(msg).map(HostMsg::Wizard)
        }

        fn view(&self, frame: &mut Frame) {
            self.wizard.view(frame, frame.area());
        }
    }

    #[tokio::test]
    async fn host_sees_events_after_settle() {
        let mut prog = TestProgram::<Host>::new(());
        prog.send(HostMsg::Wizard(Message::Next));
        assert!(prog.render_string(60, 8).contains("Loading..."));
        prog.settle().await;
        assert_eq!(prog.model().log, vec!["step 1"]);
        prog.send(HostMsg::Wizard(Message::Next));
        prog.drain_messages();
        assert_eq!(prog.model().log, vec!["step 1", "done"]);
    }

    // ── rendering ──

    #[test]
    fn renders_step_list_error_and_hints() {
        let mut wiz = Wizard::new(vec![
            Box::new(Step::new("Account").with_content("Pick a name")),
            Box::new(Step::new("Profile").optional().with_validator(|| Verdict::fail("Bio too short"))),
        ])
        .with_show_skip(true)
        .with_theme(ThemeMode::Light);
        let out = render_component(&wiz, 80, 8);
        assert!(out.contains("● Account"));
        assert!(out.contains("2 Profile (Optional)"));
        assert!(out.contains("Pick a name"));
        assert!(out.contains("Enter: Next"));
        assert!(!out.contains("Esc: Previous"));
        assert!(out.contains("Ctrl+T: Dark mode"));

        wiz.next();
        wiz.next();
        let out = render_component(&wiz, 80, 8);
        assert!(out.contains("✓ Account"));
        assert!(out.contains("Bio too short"));
        assert!(out.contains("Esc: Previous"));
        assert!(out.contains("Ctrl+S: Skip"));
        assert!(out.contains("Enter: Finish"));
    }

    #[test]
    fn loading_flag_replaces_content() {
        let wiz = Wizard::new(vec![Box::new(Step::new("A").with_content("body"))]).with_loading(true);
        let out = render_component(&wiz, 40, 8);
        assert!(out.contains("Loading..."));
        assert!(!out.contains("body"));
    }
}
