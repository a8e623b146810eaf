//! # Sign-up wizard demo
//!
//! Three steps exercising the wizard's validation paths:
//! - **Account**: a custom step with its own text input; an empty name
//!   fails synchronously, a reserved name fails after a simulated lookup
//! - **Profile**: optional, skippable with Ctrl+S
//! - **Confirm**: an async check before the account is "created"
//!
//! Leaving a step pauses briefly (simulated latency) to show the busy state.
//! Ctrl+T toggles the theme.
//!
//! Run with: `cargo run --example wizard`

use std::path::PathBuf;
use std::time::Duration;

use trellis::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use trellis::ratatui::layout::{Constraint, Layout, Rect};
use trellis::ratatui::text::{Line, Span};
use trellis::ratatui::widgets::Paragraph;
use trellis::ratatui::Frame;
use trellis::widgets::theme::{Palette, ThemeMode};
use trellis::widgets::wizard::{
    self, Step, StepTransition, Validation, Verdict, Wizard, WizardStep,
    DEFAULT_SIMULATED_LATENCY,
};
use trellis::{Command, Component, Model, ProgramOptions, TerminalEvent};

const RESERVED: &[&str] = &["admin", "root", "trellis"];

struct AccountStep {
    name: String,
    palette: Palette,
}

impl WizardStep for AccountStep {
    fn title(&self) -> &str {
        "Account"
    }

    fn handle_key(&mut self, key: KeyEvent) -> StepTransition {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.name.push(c);
            }
            KeyCode::Backspace => {
                self.name.pop();
            }
            _ => {}
        }
        StepTransition::Stay
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("Choose a username:"),
            Line::from(vec![
                Span::styled("> ", self.palette.primary),
                Span::styled(self.name.as_str(), self.palette.text),
                Span::styled("▏", self.palette.primary),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("Reserved: {}", RESERVED.join(", ")),
                self.palette.muted,
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn validate(&self) -> Validation {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Validation::Ready(Verdict::fail("Name required"));
        }
        Validation::pending(async move {
            trellis::tokio::time::sleep(Duration::from_millis(500)).await;
            if RESERVED.contains(&name.to_lowercase().as_str()) {
                Ok(Verdict::fail(format!("\"{name}\" is already taken")))
            } else {
                Ok(Verdict::Pass)
            }
        })
    }
}

struct SignUp {
    wizard: Wizard,
    palette: Palette,
    done: bool,
}

#[derive(Debug)]
enum Msg {
    Wizard(wizard::Message),
    Quit,
}

impl Model for SignUp {
    type Message = Msg;
    type Flags = ();

    fn init(_: ()) -> (Self, Command<Msg>) {
        let theme = ThemeMode::detect();
        let wizard = Wizard::new(vec![
            Box::new(AccountStep {
                name: String::new(),
                palette: Palette::for_mode(theme),
            }),
            Box::new(
                Step::new("Profile")
                    .optional()
                    .with_content("Tell us about yourself. This step is optional; press Ctrl+S to skip it."),
            ),
            Box::new(
                Step::new("Confirm")
                    .with_content("Press Enter to create your account.")
                    .with_async_validator(|| async {
                        trellis::tokio::time::sleep(Duration::from_millis(300)).await;
                        Ok(Verdict::Pass)
                    }),
            ),
        ])
        .with_theme(theme)
        .with_show_skip(true)
        .with_simulated_latency(DEFAULT_SIMULATED_LATENCY);

        (
            SignUp {
                wizard,
                palette: Palette::for_mode(theme),
                done: false,
            },
            Command::none(),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Wizard(m) => {
                match &m {
                    wizard::Message::Completed => self.done = true,
                    wizard::Message::StepChanged(_) => self.done = false,
                    wizard::Message::ThemeChanged(mode) => self.palette = Palette::for_mode(*mode),
                    _ => {}
                }
                self.wizard.update(m).map(Msg::Wizard)
            }
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [_, body, status, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(frame.area());
        let [_, body, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Max(90),
            Constraint::Fill(1),
        ])
        .areas(body);

        self.wizard.view(frame, body);

        let text = if self.done {
            Span::styled("Account created. Press q to quit.", self.palette.success)
        } else {
            Span::styled("Ctrl+C to quit", self.palette.muted)
        };
        frame.render_widget(Paragraph::new(text).centered(), status);
    }

    fn event(&self, event: TerminalEvent) -> Option<Msg> {
        let TerminalEvent::Key(key) = event else {
            return None;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Msg::Quit);
        }
        if self.done && key.code == KeyCode::Char('q') {
            return Some(Msg::Quit);
        }
        Some(Msg::Wizard(wizard::Message::KeyPress(key)))
    }
}

#[trellis::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = ProgramOptions {
        title: Some("trellis sign-up".to_string()),
        log_file: std::env::var_os("TRELLIS_LOG").map(PathBuf::from),
        ..ProgramOptions::default()
    };
    trellis::run_with::<SignUp>((), options).await?;
    Ok(())
}
