//! Prev / Next page controls for a parent-paginated data set.
//!
//! The page number is owned by the parent: the pager only asks for a new page
//! by emitting [`Message::PageChanged`], and the parent answers with
//! [`Pager::set_page`] once it has loaded the rows.

use crate::theme::{Palette, ThemeMode};
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use trellis_core::command::Command;
use trellis_core::component::Component;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Messages for the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Ask for the previous page.
    PrevPage,
    /// Ask for the next page.
    NextPage,
    /// Emitted: the parent should show this (1-based) page.
    PageChanged(usize),
}

/// Page controls.
///
/// Without a total count, "Next" is available only while the current page
/// is full. That guess is wrong when the last page happens to be exactly
/// full; supply [`with_total_count`](Pager::with_total_count) to avoid it.
#[derive(Debug, Clone)]
pub struct Pager {
    page: usize,
    page_size: usize,
    total_count: Option<usize>,
    visible_rows: usize,
    palette: Palette,
}

impl Pager {
    /// Pager on page 1 with [`DEFAULT_PAGE_SIZE`].
    pub fn new() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: None,
            visible_rows: 0,
            palette: Palette::for_mode(ThemeMode::Light),
        }
    }

    /// Set the page size (minimum 1).
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }

    /// Set the total number of rows across all pages.
    pub fn with_total_count(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total row count, if known.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Show `page` (1-based; 0 is treated as 1).
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Set or clear the total row count.
    pub fn set_total_count(&mut self, total: Option<usize>) {
        self.total_count = total;
    }

    /// Number of rows on the current page, used by the "Next" heuristic.
    pub fn set_visible_rows(&mut self, n: usize) {
        self.visible_rows = n;
    }

    /// Palette used for the controls.
    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.palette = Palette::for_mode(mode);
    }

    /// Whether "Prev" is enabled.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether "Next" is enabled.
    pub fn has_next(&self) -> bool {
        match self.total_count {
            Some(total) => self.page.saturating_mul(self.page_size) < total,
            None => self.visible_rows >= self.page_size,
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Pager {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::PrevPage if self.has_prev() => {
                Command::message(Message::PageChanged(self.page - 1))
            }
            Message::NextPage if self.has_next() => {
                Command::message(Message::PageChanged(self.page.saturating_add(1)))
            }
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let control = |label: &'static str, enabled: bool| {
            let style = if enabled {
                self.palette.primary
            } else {
                self.palette.muted
            };
            Span::styled(format!("[ {label} ]"), style)
        };
        let line = Line::from(vec![
            control("Prev", self.has_prev()),
            Span::styled(format!("  Page {}  ", self.page), self.palette.text),
            control("Next", self.has_next()),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::testing::render_component;

    #[test]
    fn prev_disabled_on_first_page() {
        let mut p = Pager::new();
        assert!(!p.has_prev());
        assert!(p.update(Message::PrevPage).is_none());
    }

    #[test]
    fn prev_emits_previous_page() {
        let mut p = Pager::new();
        p.set_page(3);
        assert_eq!(p.update(Message::PrevPage).into_message(), Some(Message::PageChanged(2)));
        // Page is owned by the parent.
        assert_eq!(p.page(), 3);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let mut p = Pager::new().with_page_size(10).with_total_count(50);
        p.set_page(usize::MAX);
        assert!(!p.has_next());
        p.set_total_count(None);
        p.set_visible_rows(10);
        assert_eq!(
            p.update(Message::NextPage).into_message(),
            Some(Message::PageChanged(usize::MAX))
        );
    }

    #[test]
    fn next_disabled_on_short_page() {
        let mut p = Pager::new().with_page_size(10);
        p.set_visible_rows(7);
        assert!(!p.has_next());
        assert!(p.update(Message::NextPage).is_none());
    }

    #[test]
    fn next_enabled_on_full_page_without_total() {
        let mut p = Pager::new().with_page_size(5);
        p.set_visible_rows(5);
        assert_eq!(p.update(Message::NextPage).into_message(), Some(Message::PageChanged(2)));
    }

    #[test]
    fn total_count_fixes_exactly_full_last_page() {
        let mut p = Pager::new().with_page_size(5).with_total_count(10);
        p.set_page(2);
        p.set_visible_rows(5);
        assert!(!p.has_next());
    }

    #[test]
    fn page_zero_clamps_to_one() {
        let mut p = Pager::new();
        p.set_page(0);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn renders_page_number() {
        let mut p = Pager::new();
        p.set_page(4);
        let out = render_component(&p, 40, 1);
        assert!(out.contains("Page 4"));
        assert!(out.contains("[ Prev ]"));
        assert!(out.contains("[ Next ]"));
    }
}
