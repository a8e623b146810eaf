//! Headless harnesses for exercising models and components in tests.

use crate::command::{Command, CommandInner};
use crate::component::Component;
use crate::model::Model;
use futures::future::BoxFuture;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

/// Drives a [`Model`] without a terminal.
///
/// Immediate messages produced by [`Command::message`] are queued and
/// processed by [`drain_messages`](TestProgram::drain_messages).  Futures
/// produced by [`Command::perform`] are parked until
/// [`settle`](TestProgram::settle) awaits them, which lets a test observe the
/// intermediate "pending" state of a model before its async work completes.
///
/// ```rust,ignore
/// let mut prog = TestProgram::<SignUp>::new(());
/// prog.send(Msg::Wizard(wizard::Message::Next));
/// assert!(prog.model().wizard.is_busy());
/// prog.settle().await;
/// assert_eq!(prog.model().wizard.current_step(), 1);
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    pending_futures: Vec<BoxFuture<'static, M::Message>>,
    quit: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            pending_futures: Vec::new(),
            quit: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Process queued immediate messages until none remain.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                self.send(msg);
            }
        }
    }

    /// Await every parked future and process its output, repeating until no
    /// work (immediate or async) remains.
    pub async fn settle(&mut self) {
        loop {
            self.drain_messages();
            if self.pending_futures.is_empty() {
                break;
            }
            let futures: Vec<_> = self.pending_futures.drain(..).collect();
            for fut in futures {
                let msg = fut.await;
                self.send(msg);
            }
        }
    }

    /// Number of futures waiting for [`settle`](TestProgram::settle).
    pub fn pending_futures(&self) -> usize {
        self.pending_futures.len()
    }

    /// Whether the model has returned [`Command::quit`].
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model and return the screen as text, one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        let mut terminal = test_terminal(width, height);
        let _ = terminal.draw(|frame| self.model.view(frame));
        buffer_to_string(terminal.backend().buffer())
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Message(msg) => self.pending_messages.push(msg),
            CommandInner::Quit => self.quit = true,
            CommandInner::Future(fut) => self.pending_futures.push(fut),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
        }
    }
}

/// Render a single component into a `width` x `height` area and return the
/// screen as text, one line per row.
pub fn render_component<C: Component>(component: &C, width: u16, height: u16) -> String {
    let mut terminal = test_terminal(width, height);
    let _ = terminal.draw(|frame| component.view(frame, frame.area()));
    buffer_to_string(terminal.backend().buffer())
}

fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).unwrap()
}

fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}
