//! **trellis**: data table and wizard widgets for [`ratatui`] applications.
//!
//! This is the umbrella crate that re-exports everything needed to build a
//! trellis application from a single dependency:
//!
//! ```toml
//! [dependencies]
//! trellis = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`trellis_core`] are available at the crate root
//!   ([`Model`], [`Component`], [`Command`], [`Program`], [`run`],
//!   [`run_with`], etc.).
//! * The [`widgets`] module re-exports everything from [`trellis_widgets`]
//!   (data table, pager, wizard, theme and key helpers).
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use trellis::widgets::wizard::{self, Step, Wizard};
//! use trellis::{Command, Component, Model, TerminalEvent};
//! use ratatui::Frame;
//!
//! struct App { wizard: Wizard }
//! enum Msg { Wizard(wizard::Message) }
//!
//! impl Model for App {
//!     type Message = Msg;
//!     type Flags = ();
//!
//!     fn init(_: ()) -> (Self, Command<Msg>) {
//!         let wizard = Wizard::new(vec![Box::new(Step::new("Hello"))]);
//!         (App { wizard }, Command::none())
//!     }
//!     fn update(&mut self, msg: Msg) -> Command<Msg> {
//!         match msg {
//!             Msg::Wizard(wizard::Message::Completed) => Command::quit(),
//!             Msg::Wizard(m) => self.wizard.update(m).map(Msg::Wizard),
//!         }
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         self.wizard.view(frame, frame.area());
//!     }
//!     fn event(&self, event: TerminalEvent) -> Option<Msg> {
//!         match event {
//!             TerminalEvent::Key(key) => Some(Msg::Wizard(wizard::Message::KeyPress(key))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     trellis::run::<App>(()).await.unwrap();
//! }
//! ```

pub use trellis_core::*;
pub mod widgets {
    pub use trellis_widgets::*;
}

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use tokio;
