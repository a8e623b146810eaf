//! Core runtime for **trellis**.
//!
//! `trellis-core` provides the Elm-style plumbing the trellis widgets are
//! built on: a [`Component`] renders into a [`ratatui::layout::Rect`] and
//! reacts to messages by returning [`Command`]s, which is how widgets report
//! events (selection changed, step completed) to whoever embeds them.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application trait (init / update / view / event) |
//! | [`Component`] | Reusable sub-model that renders into a given area |
//! | [`Command`] | Message to emit, future to await, or quit request |
//! | [`Program`] | Runs a [`Model`] against a real terminal |
//! | [`TestProgram`](testing::TestProgram) | Headless harness for tests |
//!
//! Logging goes through [`tracing`]; call [`log_to_file`] (or set
//! [`ProgramOptions::log_file`]) to capture it while the terminal is in use.

pub mod command;
pub mod component;
pub mod event;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod testing;

pub use command::Command;
pub use component::Component;
pub use event::TerminalEvent;
pub use logging::log_to_file;
pub use model::Model;
pub use runtime::{Program, ProgramError, ProgramOptions};

/// Run a trellis application with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
