use crate::command::Command;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` mirrors [`Model`](crate::Model) except that
/// [`view`](Component::view) receives the area to draw into, so a parent can
/// place several components inside one layout.
///
/// Events a component wants its parent to see (a selection change, a wizard
/// completion) are returned from [`update`](Component::update) as
/// [`Command::message`]s of the component's own message type.  The parent
/// wraps that type in one of its own variants and lifts commands with
/// [`Command::map`]:
///
/// ```rust,ignore
/// use trellis_core::{Command, Component, Model};
/// use trellis_widgets::data_table::{self, DataTable, Record};
///
/// enum AppMsg { Table(data_table::Message<Record>) }
///
/// fn update(&mut self, msg: AppMsg) -> Command<AppMsg> {
///     match msg {
///         AppMsg::Table(data_table::Message::PageChanged(page)) => {
///             self.load_page(page);
///             Command::none()
///         }
///         AppMsg::Table(m) => self.table.update(m).map(AppMsg::Table),
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into a specific `area` of the [`Frame`].
    ///
    /// Implementations should confine all rendering to the given rectangle.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Whether this component currently has focus.
    ///
    /// A parent can query `focused()` to decide which child receives keyboard
    /// events.  The default implementation returns `false`.
    fn focused(&self) -> bool {
        false
    }
}
