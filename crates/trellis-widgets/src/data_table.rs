//! Data table with header sorting, per-column filters, row selection,
//! expandable rows, a loading skeleton and page controls.
//!
//! The table never reorders, filters or pages its rows itself. It renders
//! whatever rows the parent supplies and reports what the user asked for
//! (`SortChanged`, `FiltersChanged`, `PageChanged`, ...) as messages; the
//! parent applies the request and feeds the result back through the setters.

use crate::key::{Binding, KeyCombination, KeyMap};
use crate::pager::{self, Pager};
use crate::table_state::{
    next_sort, Coverage, ExpandedRows, Filters, Ownership, RowId, Selection, SelectionMode,
    SortDirection, SortState, SORTABLE_INDICATOR,
};
use crate::theme::{Palette, ThemeMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell as RatatuiCell, Clear, Paragraph, Row, Table as RatatuiTable, TableState,
};
use ratatui::Frame;
use std::collections::BTreeMap;
use std::sync::Arc;
use trellis_core::command::Command;
use trellis_core::component::Component;
use unicode_width::UnicodeWidthStr;

/// Number of placeholder rows drawn while loading.
pub const SKELETON_ROWS: usize = 5;

const SKELETON_CELL: &str = "░░░░░░";
const FILTER_MARKER: &str = "⏷";

/// A record the table can display.
pub trait TableRow: Clone + Send + 'static {
    /// Text for the column `key`, or `None` when the record has no such field.
    fn field(&self, key: &str) -> Option<String>;

    /// Stable identity of the record, if it has one.
    ///
    /// Records without one are identified by their position on the page.
    fn row_id(&self) -> Option<RowId> {
        None
    }
}

/// A ready-made row backed by an ordered string map.
///
/// The `"id"` field, when present, is the row's identity: an integer if it
/// parses as one, otherwise the text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Record::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Read a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TableRow for Record {
    fn field(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn row_id(&self) -> Option<RowId> {
        self.get("id").map(|v| match v.parse::<i64>() {
            Ok(n) => RowId::Int(n),
            Err(_) => RowId::Str(v.to_string()),
        })
    }
}

type CellFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;
type RowIdFn<R> = Arc<dyn Fn(&R) -> RowId + Send + Sync>;

/// A table column.
pub struct Column<R> {
    key: String,
    header: String,
    sortable: bool,
    filterable: bool,
    render: Option<CellFn<R>>,
    width: Option<Constraint>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            render: self.render.clone(),
            width: self.width,
        }
    }
}

impl<R: TableRow> Column<R> {
    /// Column showing the field `key` under `header`.
    ///
    /// `key` may also name a virtual column whose cells come from
    /// [`with_render`](Column::with_render).
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            filterable: false,
            render: None,
            width: None,
        }
    }

    /// Allow sorting by this column.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Allow filtering by this column.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Compute cell text from the whole record instead of a single field.
    pub fn with_render(mut self, render: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Fix the column width. Otherwise it is sized to its widest cell.
    pub fn with_width(mut self, width: Constraint) -> Self {
        self.width = Some(width);
        self
    }

    /// Column key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Header label.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether the column can be sorted.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Whether the column can be filtered.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Cell text for `row`.
    pub fn cell(&self, row: &R) -> String {
        match &self.render {
            Some(render) => render(row),
            None => row.field(&self.key).unwrap_or_default(),
        }
    }
}

/// Messages for the data table.
///
/// The first group drives the table; the second group is emitted for the
/// parent and ignored if fed back in.
#[derive(Debug, Clone)]
pub enum Message<R> {
    /// A key press forwarded to the table.
    KeyPress(KeyEvent),
    /// Request a sort by the column with this key.
    ToggleSort(String),
    /// Select or deselect a row.
    ToggleRowSelection(RowId),
    /// Select every visible row, or clear when all are selected.
    ToggleSelectAll,
    /// Expand or collapse the row at this index.
    ToggleRowExpansion(usize),
    /// Set the filter text of a column.
    SetFilter {
        /// Column key.
        key: String,
        /// New filter text.
        text: String,
    },
    /// Ask for the previous page.
    PrevPage,
    /// Ask for the next page.
    NextPage,

    /// Emitted: the user asked for this (1-based) page.
    PageChanged(usize),
    /// Emitted: the user asked for this sort.
    SortChanged {
        /// Column key.
        key: String,
        /// Requested direction.
        direction: SortDirection,
    },
    /// Emitted (controlled selection only): the proposed selection.
    SelectionChanged(Vec<RowId>),
    /// Emitted: a row was expanded or collapsed.
    RowExpanded {
        /// Row index on the current page.
        index: usize,
        /// The row itself.
        row: R,
        /// New state.
        expanded: bool,
    },
    /// Emitted (controlled filters only): the full proposed filter map.
    FiltersChanged(BTreeMap<String, String>),
}

/// Configurable key bindings for the data table.
#[derive(Debug, Clone)]
pub struct TableKeyBindings {
    /// Cursor up. Default: Up, k
    pub up: Binding,
    /// Cursor down. Default: Down, j
    pub down: Binding,
    /// First row. Default: Home, g
    pub first: Binding,
    /// Last row. Default: End, G
    pub last: Binding,
    /// Previous column. Default: Left, h
    pub col_left: Binding,
    /// Next column. Default: Right, l
    pub col_right: Binding,
    /// Sort by the active column. Default: s
    pub sort: Binding,
    /// Edit the active column's filter. Default: f, /
    pub filter: Binding,
    /// Select the row under the cursor. Default: space
    pub select: Binding,
    /// Select all visible rows. Default: a
    pub select_all: Binding,
    /// Expand the row under the cursor. Default: Enter, e
    pub expand: Binding,
    /// Previous page. Default: [, PageUp
    pub prev_page: Binding,
    /// Next page. Default: ], PageDown
    pub next_page: Binding,
}

impl Default for TableKeyBindings {
    fn default() -> Self {
        let keys = |codes: &[KeyCode]| -> Vec<KeyCombination> {
            codes.iter().copied().map(KeyCombination::new).collect()
        };
        Self {
            up: Binding::with_keys(keys(&[KeyCode::Up, KeyCode::Char('k')]), "Up"),
            down: Binding::with_keys(keys(&[KeyCode::Down, KeyCode::Char('j')]), "Down"),
            first: Binding::with_keys(keys(&[KeyCode::Home, KeyCode::Char('g')]), "First"),
            last: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::End),
                    KeyCombination::new(KeyCode::Char('G')),
                    KeyCombination::shift(KeyCode::Char('G')),
                ],
                "Last",
            ),
            col_left: Binding::with_keys(keys(&[KeyCode::Left, KeyCode::Char('h')]), "Column left"),
            col_right: Binding::with_keys(
                keys(&[KeyCode::Right, KeyCode::Char('l')]),
                "Column right",
            ),
            sort: Binding::new(KeyCombination::new(KeyCode::Char('s')), "Sort"),
            filter: Binding::with_keys(keys(&[KeyCode::Char('f'), KeyCode::Char('/')]), "Filter"),
            select: Binding::new(KeyCombination::new(KeyCode::Char(' ')), "Select"),
            select_all: Binding::new(KeyCombination::new(KeyCode::Char('a')), "Select all"),
            expand: Binding::with_keys(keys(&[KeyCode::Enter, KeyCode::Char('e')]), "Expand"),
            prev_page: Binding::with_keys(
                keys(&[KeyCode::Char('['), KeyCode::PageUp]),
                "Prev page",
            ),
            next_page: Binding::with_keys(
                keys(&[KeyCode::Char(']'), KeyCode::PageDown]),
                "Next page",
            ),
        }
    }
}

impl KeyMap for TableKeyBindings {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.sort,
            &self.filter,
            &self.select,
            &self.expand,
            &self.prev_page,
            &self.next_page,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.up, &self.down, &self.first, &self.last],
            vec![&self.col_left, &self.col_right, &self.sort, &self.filter],
            vec![&self.select, &self.select_all, &self.expand],
            vec![&self.prev_page, &self.next_page],
        ]
    }
}

/// Style configuration for the data table.
#[derive(Debug, Clone)]
pub struct TableStyle {
    /// Header cells.
    pub header: Style,
    /// Header of the column that sort / filter keys act on.
    pub active_header: Style,
    /// Unselected data rows.
    pub normal: Style,
    /// Rows whose id is selected.
    pub selected: Style,
    /// The row under the cursor.
    pub cursor: Style,
    /// Expanded row content.
    pub expanded: Style,
    /// Skeleton placeholders.
    pub skeleton: Style,
    /// Border when focused.
    pub focused_border: Style,
    /// Border when not focused.
    pub unfocused_border: Style,
    /// Symbol left of the cursor row.
    pub highlight_symbol: String,
}

impl TableStyle {
    /// Style derived from the palette of `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let palette = Palette::for_mode(mode);
        Self {
            header: palette.text.add_modifier(Modifier::BOLD),
            active_header: palette.primary.add_modifier(Modifier::UNDERLINED),
            normal: palette.text,
            selected: palette.selected_row,
            cursor: palette.primary,
            expanded: palette.muted,
            skeleton: palette.skeleton,
            focused_border: palette.primary.remove_modifier(Modifier::BOLD),
            unfocused_border: palette.border,
            highlight_symbol: "▸ ".to_string(),
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

/// A data table over rows of type `R`.
///
/// # Example
///
/// ```ignore
/// let table = DataTable::new(vec![
///     Column::new("name", "Name").sortable().filterable(),
///     Column::new("age", "Age").sortable(),
/// ])
/// .with_rows(rows)
/// .with_controlled_selection(SelectionMode::Multiple, vec![])
/// .with_expandable(|r: &Record| format!("Email: {}", r.get("email").unwrap_or("-")));
/// ```
pub struct DataTable<R: TableRow> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    row_id: Option<RowIdFn<R>>,
    selection: Selection,
    expanded: ExpandedRows,
    expandable: Option<CellFn<R>>,
    sort: Option<SortState>,
    filters: Filters,
    filter_editor: Option<String>,
    pager: Pager,
    loading: bool,
    cursor: usize,
    active_col: usize,
    focus: bool,
    title: String,
    style: TableStyle,
    theme: ThemeMode,
    key_bindings: TableKeyBindings,
}

impl<R: TableRow> DataTable<R> {
    /// Table with the given columns and no rows.
    pub fn new(columns: Vec<Column<R>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_id: None,
            selection: Selection::default(),
            expanded: ExpandedRows::default(),
            expandable: None,
            sort: None,
            filters: Filters::default(),
            filter_editor: None,
            pager: Pager::new(),
            loading: false,
            cursor: 0,
            active_col: 0,
            focus: false,
            title: String::new(),
            style: TableStyle::default(),
            theme: ThemeMode::default(),
            key_bindings: TableKeyBindings::default(),
        }
    }

    /// Initial rows (the current page).
    pub fn with_rows(mut self, rows: Vec<R>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Selection owned by the table.
    pub fn with_selection(mut self, mode: SelectionMode) -> Self {
        self.selection = Selection::new(mode, Ownership::Uncontrolled, Vec::new());
        self
    }

    /// Selection owned by the parent, starting from `selected`.
    ///
    /// Toggles emit [`Message::SelectionChanged`]; feed the value back with
    /// [`set_selected`](DataTable::set_selected).
    pub fn with_controlled_selection(mut self, mode: SelectionMode, selected: Vec<RowId>) -> Self {
        self.selection = Selection::new(mode, Ownership::Controlled, selected);
        self
    }

    /// Filters owned by the parent.
    ///
    /// Without this the filter editor still opens but its edits go nowhere.
    pub fn with_controlled_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = Filters::new(Ownership::Controlled, filters);
        self
    }

    /// The active sort, as applied by the parent.
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Current page (1-based).
    pub fn with_page(mut self, page: usize) -> Self {
        self.pager.set_page(page);
        self
    }

    /// Rows per page.
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.pager = self.pager.with_page_size(n);
        self
    }

    /// Total rows across all pages, which makes "Next" exact.
    pub fn with_total_count(mut self, total: usize) -> Self {
        self.pager.set_total_count(Some(total));
        self
    }

    /// Start in the loading state.
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Make rows expandable, showing `content(row)` under an expanded row.
    pub fn with_expandable(mut self, content: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.expandable = Some(Arc::new(content));
        self
    }

    /// Identify rows with `id` instead of [`TableRow::row_id`].
    pub fn with_row_id(mut self, id: impl Fn(&R) -> RowId + Send + Sync + 'static) -> Self {
        self.row_id = Some(Arc::new(id));
        self
    }

    /// Colors for `mode`.
    pub fn with_theme(mut self, mode: ThemeMode) -> Self {
        self.set_theme(mode);
        self
    }

    /// Border title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Custom style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Custom key bindings.
    pub fn with_key_bindings(mut self, bindings: TableKeyBindings) -> Self {
        self.key_bindings = bindings;
        self
    }

    // ── parent feedback ──

    /// Replace the rows. Expanded indices past the new length are dropped.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.expanded.truncate(self.rows.len());
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        self.pager.set_visible_rows(self.rows.len());
    }

    /// Feed back a controlled selection.
    pub fn set_selected(&mut self, ids: Vec<RowId>) {
        self.selection.set_ids(ids);
    }

    /// Feed back controlled filters.
    pub fn set_filters(&mut self, filters: BTreeMap<String, String>) {
        self.filters.set_values(filters);
    }

    /// Feed back the applied sort (`None` for unsorted).
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    /// Feed back the current page.
    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page);
    }

    /// Set or clear the total row count.
    pub fn set_total_count(&mut self, total: Option<usize>) {
        self.pager.set_total_count(total);
    }

    /// Enter or leave the loading state.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Switch colors.
    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.theme = mode;
        self.style = TableStyle::for_mode(mode);
        self.pager.set_theme(mode);
    }

    /// Give the table keyboard focus.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    // ── accessors ──

    /// Columns.
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Rows on the current page.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Selected ids, in selection order.
    pub fn selected(&self) -> &[RowId] {
        self.selection.ids()
    }

    /// Selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Expanded row indices.
    pub fn expanded(&self) -> &ExpandedRows {
        &self.expanded
    }

    /// The applied sort.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Filter values.
    pub fn filters(&self) -> &BTreeMap<String, String> {
        self.filters.values()
    }

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.pager.page()
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Whether the table is loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Index of the row under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Key of the column that sort / filter keys act on.
    pub fn active_column(&self) -> Option<&str> {
        self.columns.get(self.active_col).map(Column::key)
    }

    /// Key of the column whose filter is being edited.
    pub fn filter_editor(&self) -> Option<&str> {
        self.filter_editor.as_deref()
    }

    /// Current theme.
    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Key bindings.
    pub fn key_bindings(&self) -> &TableKeyBindings {
        &self.key_bindings
    }

    /// Identity of the row at `index`.
    pub fn row_id_at(&self, index: usize) -> Option<RowId> {
        let row = self.rows.get(index)?;
        Some(self.identify(index, row))
    }

    /// Identities of every row on the current page.
    pub fn visible_ids(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.identify(i, row))
            .collect()
    }

    fn identify(&self, index: usize, row: &R) -> RowId {
        match &self.row_id {
            Some(id) => id(row),
            None => row.row_id().unwrap_or_else(|| RowId::positional(index)),
        }
    }

    fn column(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    // ── operations ──

    /// Request a sort by `key`.
    ///
    /// Emits [`Message::SortChanged`]; the table keeps showing the old sort
    /// until the parent calls [`set_sort`](DataTable::set_sort).
    pub fn toggle_sort(&mut self, key: &str) -> Command<Message<R>> {
        if !self.column(key).is_some_and(Column::is_sortable) {
            return Command::none();
        }
        let next = next_sort(self.sort.as_ref(), key);
        tracing::debug!(key = %next.key, direction = %next.direction, "sort requested");
        Command::message(Message::SortChanged {
            key: next.key,
            direction: next.direction,
        })
    }

    /// Select or deselect `id`.
    pub fn toggle_row_selection(&mut self, id: RowId) -> Command<Message<R>> {
        if self.loading {
            return Command::none();
        }
        match self.selection.toggled(&id) {
            Some(ids) => self.commit_selection(ids),
            None => Command::none(),
        }
    }

    /// Select every visible row, or clear the selection when all of them
    /// are already selected. Multiple-selection mode only.
    pub fn toggle_select_all(&mut self) -> Command<Message<R>> {
        let visible = self.visible_ids();
        match self.selection.all_toggled(&visible) {
            Some(ids) => self.commit_selection(ids),
            None => Command::none(),
        }
    }

    fn commit_selection(&mut self, ids: Vec<RowId>) -> Command<Message<R>> {
        tracing::debug!(selected = ids.len(), "selection changed");
        match self.selection.commit(ids) {
            Some(ids) => Command::message(Message::SelectionChanged(ids)),
            None => Command::none(),
        }
    }

    /// Expand or collapse the row at `index`.
    pub fn toggle_row_expansion(&mut self, index: usize) -> Command<Message<R>> {
        if self.loading || self.expandable.is_none() {
            return Command::none();
        }
        let Some(row) = self.rows.get(index).cloned() else {
            return Command::none();
        };
        let expanded = self.expanded.toggle(index);
        tracing::debug!(index, expanded, "row expansion toggled");
        Command::message(Message::RowExpanded {
            index,
            row,
            expanded,
        })
    }

    /// Set the filter text for `key`.
    ///
    /// Emits the whole updated map as [`Message::FiltersChanged`] when the
    /// filters are controlled; does nothing otherwise.
    pub fn set_filter_value(&mut self, key: &str, text: impl Into<String>) -> Command<Message<R>> {
        if !self.column(key).is_some_and(Column::is_filterable) {
            return Command::none();
        }
        match self.filters.with_value(key, text) {
            Some(values) => {
                tracing::debug!(key, "filter changed");
                Command::message(Message::FiltersChanged(values))
            }
            None => Command::none(),
        }
    }

    fn page_command(&mut self, msg: pager::Message) -> Command<Message<R>> {
        self.pager.update(msg).map(|m| match m {
            pager::Message::PrevPage => Message::PrevPage,
            pager::Message::NextPage => Message::NextPage,
            pager::Message::PageChanged(page) => Message::PageChanged(page),
        })
    }

    // ── keys ──

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message<R>> {
        if self.filter_editor.is_some() {
            return self.handle_filter_key(key);
        }
        let last_row = self.rows.len().saturating_sub(1);
        if self.key_bindings.up.matches(&key) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if self.key_bindings.down.matches(&key) {
            self.cursor = (self.cursor + 1).min(last_row);
        } else if self.key_bindings.first.matches(&key) {
            self.cursor = 0;
        } else if self.key_bindings.last.matches(&key) {
            self.cursor = last_row;
        } else if self.key_bindings.col_left.matches(&key) {
            self.active_col = self.active_col.saturating_sub(1);
        } else if self.key_bindings.col_right.matches(&key) {
            self.active_col = (self.active_col + 1).min(self.columns.len().saturating_sub(1));
        } else if self.key_bindings.sort.matches(&key) {
            if let Some(key) = self.active_column().map(str::to_string) {
                return self.toggle_sort(&key);
            }
        } else if self.key_bindings.filter.matches(&key) {
            if let Some(col) = self.columns.get(self.active_col).filter(|c| c.filterable) {
                self.filter_editor = Some(col.key.clone());
            }
        } else if self.key_bindings.select.matches(&key) {
            if let Some(id) = self.row_id_at(self.cursor) {
                return self.toggle_row_selection(id);
            }
        } else if self.key_bindings.select_all.matches(&key) {
            return self.toggle_select_all();
        } else if self.key_bindings.expand.matches(&key) {
            return self.toggle_row_expansion(self.cursor);
        } else if self.key_bindings.prev_page.matches(&key) {
            return self.page_command(pager::Message::PrevPage);
        } else if self.key_bindings.next_page.matches(&key) {
            return self.page_command(pager::Message::NextPage);
        }
        Command::none()
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Command<Message<R>> {
        let Some(col) = self.filter_editor.clone() else {
            return Command::none();
        };
        let mut text = self.filters.get(&col).to_string();
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.filter_editor = None;
                return Command::none();
            }
            KeyCode::Backspace => {
                if text.pop().is_none() {
                    return Command::none();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                text.push(c);
            }
            _ => return Command::none(),
        }
        self.set_filter_value(&col, text)
    }

    // ── rendering ──

    fn header_label(&self, col: &Column<R>) -> String {
        let mut label = col.header.clone();
        if col.sortable {
            let indicator = match &self.sort {
                Some(s) if s.key == col.key => s.direction.indicator(),
                _ => SORTABLE_INDICATOR,
            };
            label.push(' ');
            label.push_str(indicator);
        }
        if col.filterable {
            label.push(' ');
            label.push_str(FILTER_MARKER);
        }
        label
    }

    fn selection_marker(&self, id: &RowId) -> &'static str {
        let on = self.selection.contains(id);
        match (self.selection.mode(), on) {
            (SelectionMode::Single, true) => "(•)",
            (SelectionMode::Single, false) => "( )",
            (_, true) => "[x]",
            (_, false) => "[ ]",
        }
    }

    fn select_all_marker(&self) -> &'static str {
        if self.selection.mode() != SelectionMode::Multiple {
            return "";
        }
        match self.selection.coverage(&self.visible_ids()) {
            Coverage::All => "[x]",
            Coverage::Partial => "[-]",
            Coverage::None => "[ ]",
        }
    }

    /// Rendered cell count: data columns plus the selection and expansion columns.
    fn cell_count(&self) -> usize {
        self.columns.len()
            + usize::from(self.selection.mode() != SelectionMode::None)
            + usize::from(self.expandable.is_some())
    }

    fn widths(&self) -> Vec<Constraint> {
        let mut widths = Vec::with_capacity(self.cell_count());
        if self.selection.mode() != SelectionMode::None {
            widths.push(Constraint::Length(3));
        }
        for col in &self.columns {
            let width = col.width.unwrap_or_else(|| {
                let header = self.header_label(col).width();
                let widest = if self.loading {
                    SKELETON_CELL.width()
                } else {
                    self.rows.iter().map(|r| col.cell(r).width()).max().unwrap_or(0)
                };
                Constraint::Length(u16::try_from(header.max(widest)).unwrap_or(u16::MAX))
            });
            widths.push(width);
        }
        if self.expandable.is_some() {
            widths.push(Constraint::Length(1));
        }
        widths
    }

    fn header_row(&self) -> Row<'_> {
        let mut cells = Vec::with_capacity(self.columns.len() + 2);
        if self.selection.mode() != SelectionMode::None {
            cells.push(RatatuiCell::from(self.select_all_marker()).style(self.style.header));
        }
        for (i, col) in self.columns.iter().enumerate() {
            let style = if self.focus && i == self.active_col {
                self.style.active_header
            } else {
                self.style.header
            };
            cells.push(RatatuiCell::from(self.header_label(col)).style(style));
        }
        if self.expandable.is_some() {
            cells.push(RatatuiCell::from(""));
        }
        Row::new(cells).height(1).bottom_margin(1)
    }

    fn skeleton_rows(&self) -> Vec<Row<'_>> {
        let width = self.cell_count();
        (0..SKELETON_ROWS)
            .map(|_| {
                let cells = (0..width)
                    .map(|_| RatatuiCell::from(SKELETON_CELL).style(self.style.skeleton));
                Row::new(cells)
            })
            .collect()
    }

    fn data_rows(&self) -> Vec<Row<'_>> {
        let mut out = Vec::with_capacity(self.rows.len() + self.expanded.len());
        for (i, row) in self.rows.iter().enumerate() {
            let id = self.identify(i, row);
            let mut cells = Vec::with_capacity(self.columns.len() + 2);
            if self.selection.mode() != SelectionMode::None {
                cells.push(RatatuiCell::from(self.selection_marker(&id)));
            }
            cells.extend(self.columns.iter().map(|c| RatatuiCell::from(c.cell(row))));
            if self.expandable.is_some() {
                cells.push(RatatuiCell::from(if self.expanded.contains(i) { "▾" } else { "▸" }));
            }
            let style = if self.selection.contains(&id) {
                self.style.normal.patch(self.style.selected)
            } else {
                self.style.normal
            };
            out.push(Row::new(cells).style(style));
            if self.expanded.contains(i) {
                // Placeholder; the content is drawn across the full width afterwards.
                out.push(Row::new(vec![RatatuiCell::from("")]));
            }
        }
        out
    }

    /// Position of data row `index` among the rendered rows.
    fn display_index(&self, index: usize) -> usize {
        index + self.expanded.iter().filter(|&i| i < index).count()
    }

    fn render_expanded(&self, frame: &mut Frame, area: Rect, offset: usize) {
        let Some(content) = &self.expandable else {
            return;
        };
        // Header line plus its bottom margin.
        let top = area.y.saturating_add(2);
        for index in self.expanded.iter() {
            let Some(row) = self.rows.get(index) else {
                continue;
            };
            let line = self.display_index(index) + 1;
            let Some(y) = line
                .checked_sub(offset)
                .and_then(|d| u16::try_from(d).ok())
                .and_then(|d| top.checked_add(d))
            else {
                continue;
            };
            if y >= area.bottom() {
                continue;
            }
            let text = Line::from(Span::styled(format!("    ↳ {}", content(row)), self.style.expanded));
            frame.render_widget(Paragraph::new(text), Rect::new(area.x, y, area.width, 1));
        }
    }

    fn render_filter_editor(&self, frame: &mut Frame, area: Rect) {
        let Some(col) = self.filter_editor.as_deref().and_then(|k| self.column(k)) else {
            return;
        };
        if area.height < 4 || area.width < 10 {
            return;
        }
        let popup = Rect::new(area.x, area.y + 1, area.width.min(36), 3);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.focused_border)
            .title(format!("Filter {}", col.header))
            .title_bottom("Enter: Apply");
        let text = Line::from(vec![
            Span::styled(self.filters.get(&col.key).to_string(), self.style.normal),
            Span::styled("▏", self.style.cursor),
        ]);
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(text).block(block), popup);
    }
}

impl<R: TableRow> Component for DataTable<R> {
    type Message = Message<R>;

    fn update(&mut self, msg: Message<R>) -> Command<Message<R>> {
        match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::ToggleSort(key) => self.toggle_sort(&key),
            Message::ToggleRowSelection(id) => self.toggle_row_selection(id),
            Message::ToggleSelectAll => self.toggle_select_all(),
            Message::ToggleRowExpansion(index) => self.toggle_row_expansion(index),
            Message::SetFilter { key, text } => self.set_filter_value(&key, text),
            Message::PrevPage => self.page_command(pager::Message::PrevPage),
            Message::NextPage => self.page_command(pager::Message::NextPage),
            Message::PageChanged(_)
            | Message::SortChanged { .. }
            | Message::SelectionChanged(_)
            | Message::RowExpanded { .. }
            | Message::FiltersChanged(_) => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus {
            self.style.focused_border
        } else {
            self.style.unfocused_border
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);
        if !self.title.is_empty() {
            block = block.title(self.title.as_str());
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [table_area, pager_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let rows = if self.loading {
            self.skeleton_rows()
        } else {
            self.data_rows()
        };
        let table = RatatuiTable::new(rows, self.widths())
            .header(self.header_row())
            .row_highlight_style(self.style.cursor)
            .highlight_symbol(self.style.highlight_symbol.as_str());

        let mut state = TableState::default();
        if self.focus && !self.loading && !self.rows.is_empty() {
            state.select(Some(self.display_index(self.cursor)));
        }
        frame.render_stateful_widget(table, table_area, &mut state);

        if !self.loading {
            self.render_expanded(frame, table_area, state.offset());
        }
        self.pager.view(frame, pager_area);
        self.render_filter_editor(frame, table_area);
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::testing::render_component;

    fn key(code: KeyCode) -> Message<Record> {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn person(id: i64, name: &str, age: u32) -> Record {
        Record::new()
            .with("id", id.to_string())
            .with("name", name)
            .with("age", age.to_string())
    }

    fn people() -> Vec<Record> {
        vec![person(1, "Alice", 30), person(2, "Bob", 25), person(3, "Carol", 41)]
    }

    fn columns() -> Vec<Column<Record>> {
        vec![
            Column::new("name", "Name").sortable().filterable(),
            Column::new("age", "Age").sortable(),
            Column::new("label", "Label").with_render(|r: &Record| {
                format!("{} ({})", r.get("name").unwrap_or("?"), r.get("age").unwrap_or("?"))
            }),
        ]
    }

    fn table() -> DataTable<Record> {
        DataTable::new(columns()).with_rows(people())
    }

    fn ids(v: &[i64]) -> Vec<RowId> {
        v.iter().copied().map(RowId::Int).collect()
    }

    // ── identity ──

    #[test]
    fn record_id_parses_int_or_string() {
        assert_eq!(person(4, "D", 1).row_id(), Some(RowId::Int(4)));
        assert_eq!(Record::new().with("id", "u-7").row_id(), Some(RowId::from("u-7")));
        assert_eq!(Record::new().row_id(), None);
    }

    #[test]
    fn rows_without_id_fall_back_to_position() {
        let rows = vec![Record::new().with("name", "x"), Record::new().with("name", "y")];
        let t = DataTable::new(columns()).with_rows(rows);
        assert_eq!(t.visible_ids(), ids(&[0, 1]));
    }

    #[test]
    fn explicit_row_id_accessor_wins() {
        let t = table().with_row_id(|r: &Record| RowId::from(r.get("name").unwrap_or_default()));
        assert_eq!(t.row_id_at(1), Some(RowId::from("Bob")));
    }

    #[test]
    fn render_fn_overrides_field() {
        let t = table();
        assert_eq!(t.columns()[2].cell(&t.rows()[0]), "Alice (30)");
        assert_eq!(t.columns()[0].cell(&t.rows()[0]), "Alice");
    }

    // ── sort ──

    #[test]
    fn sort_emits_without_reordering() {
        let mut t = table();
        match t.toggle_sort("name").into_message() {
            Some(Message::SortChanged { key, direction }) => {
                assert_eq!(key, "name");
                assert_eq!(direction, SortDirection::Asc);
            }
            other => panic!("expected SortChanged, got {other:?}"),
        }
        assert!(t.sort().is_none());
        assert_eq!(t.rows()[0].get("name"), Some("Alice"));
    }

    #[test]
    fn sort_alternates_after_feedback() {
        let mut t = table().with_sort(SortState::new("name", SortDirection::Asc));
        let Some(Message::SortChanged { direction, .. }) = t.toggle_sort("name").into_message()
        else {
            panic!("expected SortChanged");
        };
        assert_eq!(direction, SortDirection::Desc);
        t.set_sort(Some(SortState::new("name", direction)));
        let Some(Message::SortChanged { direction, .. }) = t.toggle_sort("name").into_message()
        else {
            panic!("expected SortChanged");
        };
        assert_eq!(direction, SortDirection::Asc);
    }

    #[test]
    fn unsortable_or_unknown_column_is_ignored() {
        let mut t = table();
        assert!(t.toggle_sort("label").is_none());
        assert!(t.toggle_sort("missing").is_none());
    }

    #[test]
    fn sort_key_acts_on_active_column() {
        let mut t = table();
        t.update(key(KeyCode::Right));
        assert_eq!(t.active_column(), Some("age"));
        let cmd = t.update(key(KeyCode::Char('s')));
        assert!(matches!(cmd.into_message(), Some(Message::SortChanged { key, .. }) if key == "age"));
    }

    // ── selection ──

    #[test]
    fn multi_select_scenario() {
        let mut t = table().with_selection(SelectionMode::Multiple);
        assert!(t.toggle_row_selection(RowId::Int(1)).is_none());
        assert_eq!(t.selected(), ids(&[1]).as_slice());
        t.toggle_row_selection(RowId::Int(2));
        assert_eq!(t.selected(), ids(&[1, 2]).as_slice());
        t.toggle_select_all();
        assert_eq!(t.selected(), ids(&[1, 2, 3]).as_slice());
        t.toggle_select_all();
        assert!(t.selected().is_empty());
    }

    #[test]
    fn single_select_replaces() {
        let mut t = table().with_selection(SelectionMode::Single);
        t.toggle_row_selection(RowId::Int(1));
        t.toggle_row_selection(RowId::Int(3));
        assert_eq!(t.selected(), ids(&[3]).as_slice());
        // Select-all only exists in multiple mode.
        assert!(t.toggle_select_all().is_none());
        assert_eq!(t.selected(), ids(&[3]).as_slice());
    }

    #[test]
    fn controlled_selection_emits_and_waits_for_feedback() {
        let mut t = table().with_controlled_selection(SelectionMode::Multiple, ids(&[2]));
        let cmd = t.update(Message::ToggleRowSelection(RowId::Int(1)));
        match cmd.into_message() {
            Some(Message::SelectionChanged(sel)) => assert_eq!(sel, ids(&[2, 1])),
            other => panic!("expected SelectionChanged, got {other:?}"),
        }
        assert_eq!(t.selected(), ids(&[2]).as_slice());
        t.set_selected(ids(&[2, 1]));
        assert_eq!(t.selected(), ids(&[2, 1]).as_slice());
    }

    #[test]
    fn space_selects_row_under_cursor() {
        let mut t = table().with_selection(SelectionMode::Multiple);
        t.update(key(KeyCode::Down));
        t.update(key(KeyCode::Char(' ')));
        assert_eq!(t.selected(), ids(&[2]).as_slice());
    }

    #[test]
    fn no_selection_mode_ignores_toggles() {
        let mut t = table();
        assert!(t.toggle_row_selection(RowId::Int(1)).is_none());
        assert!(t.selected().is_empty());
    }

    // ── expansion ──

    #[test]
    fn expansion_emits_row_payload() {
        let mut t = table().with_expandable(|r: &Record| format!("age {}", r.get("age").unwrap_or("")));
        match t.toggle_row_expansion(1).into_message() {
            Some(Message::RowExpanded { index, row, expanded }) => {
                assert_eq!(index, 1);
                assert_eq!(row.get("name"), Some("Bob"));
                assert!(expanded);
            }
            other => panic!("expected RowExpanded, got {other:?}"),
        }
        assert!(t.expanded().contains(1));
        t.toggle_row_expansion(1);
        assert!(t.expanded().is_empty());
    }

    #[test]
    fn expansion_ignored_when_disabled_or_out_of_range() {
        let mut t = table();
        assert!(t.toggle_row_expansion(0).is_none());
        let mut t = table().with_expandable(|_: &Record| String::new());
        assert!(t.toggle_row_expansion(9).is_none());
    }

    #[test]
    fn set_rows_drops_stale_expansion() {
        let mut t = table().with_expandable(|_: &Record| String::new());
        t.toggle_row_expansion(2);
        t.toggle_row_expansion(0);
        t.set_rows(people().into_iter().take(2).collect());
        assert_eq!(t.expanded().iter().collect::<Vec<_>>(), vec![0]);
    }

    // ── loading ──

    #[test]
    fn loading_disables_row_operations() {
        let mut t = table()
            .with_selection(SelectionMode::Multiple)
            .with_expandable(|_: &Record| String::new())
            .with_loading(true);
        assert!(t.toggle_row_selection(RowId::Int(1)).is_none());
        assert!(t.toggle_row_expansion(0).is_none());
        assert!(t.selected().is_empty());
        assert!(t.expanded().is_empty());
    }

    #[test]
    fn loading_renders_five_skeleton_rows() {
        let t = table().with_loading(true);
        let out = render_component(&t, 60, 14);
        assert_eq!(out.lines().filter(|l| l.contains(SKELETON_CELL)).count(), SKELETON_ROWS);
        assert!(!out.contains("Alice"));
    }

    #[test]
    fn skeleton_fills_every_column_when_expandable() {
        let t = table()
            .with_selection(SelectionMode::Multiple)
            .with_expandable(|r: &Record| r.get("name").unwrap_or("").to_string())
            .with_loading(true);
        assert_eq!(t.cell_count(), t.columns.len() + 2);
        assert_eq!(t.cell_count(), t.widths().len());
    }

    #[test]
    fn oversized_cell_width_saturates() {
        let wide = "x".repeat(usize::from(u16::MAX) + 10);
        let t = DataTable::new(vec![Column::new("name", "Name")])
            .with_rows(vec![Record::new().with("name", wide)]);
        assert_eq!(t.widths(), vec![Constraint::Length(u16::MAX)]);
    }

    // ── filters ──

    #[test]
    fn controlled_filter_typing_emits_full_map() {
        let mut start = BTreeMap::new();
        start.insert("name".to_string(), "a".to_string());
        let mut t = table().with_controlled_filters(start);
        t.update(key(KeyCode::Char('f')));
        assert_eq!(t.filter_editor(), Some("name"));
        let cmd = t.update(key(KeyCode::Char('l')));
        match cmd.into_message() {
            Some(Message::FiltersChanged(map)) => {
                assert_eq!(map.get("name").map(String::as_str), Some("al"));
            }
            other => panic!("expected FiltersChanged, got {other:?}"),
        }
        t.update(key(KeyCode::Enter));
        assert_eq!(t.filter_editor(), None);
    }

    #[test]
    fn uncontrolled_filter_is_inert() {
        let mut t = table();
        assert!(t.set_filter_value("name", "x").is_none());
        assert!(t.filters().is_empty());
    }

    #[test]
    fn filter_on_unfilterable_column_is_ignored() {
        let mut t = table().with_controlled_filters(BTreeMap::new());
        assert!(t.set_filter_value("age", "3").is_none());
        t.update(key(KeyCode::Right));
        t.update(key(KeyCode::Char('f')));
        assert_eq!(t.filter_editor(), None);
    }

    // ── paging ──

    #[test]
    fn paging_emits_requested_page() {
        let mut t = table().with_page_size(3).with_page(2);
        assert!(matches!(
            t.update(key(KeyCode::Char('['))).into_message(),
            Some(Message::PageChanged(1))
        ));
        assert!(matches!(
            t.update(Message::NextPage).into_message(),
            Some(Message::PageChanged(3))
        ));
        assert_eq!(t.page(), 2);
    }

    #[test]
    fn next_disabled_on_short_page() {
        let mut t = table().with_page_size(10);
        assert!(t.update(Message::NextPage).is_none());
        assert!(t.update(Message::PrevPage).is_none());
    }

    #[test]
    fn emitted_messages_fed_back_are_ignored() {
        let mut t = table();
        assert!(t.update(Message::PageChanged(4)).is_none());
        assert!(t.update(Message::SelectionChanged(ids(&[1]))).is_none());
    }

    // ── rendering ──

    #[test]
    fn renders_headers_indicators_and_rows() {
        let t = table()
            .with_sort(SortState::new("age", SortDirection::Desc))
            .with_title("People");
        let out = render_component(&t, 70, 10);
        assert!(out.contains("People"));
        assert!(out.contains("Name ↕ ⏷"));
        assert!(out.contains("Age ▼"));
        assert!(out.contains("Carol (41)"));
        assert!(out.contains("Page 1"));
    }

    #[test]
    fn select_all_indicator_is_tri_state() {
        let mut t = table().with_selection(SelectionMode::Multiple);
        assert!(render_component(&t, 70, 10).lines().nth(1).is_some_and(|l| l.contains("[ ]")));
        t.toggle_row_selection(RowId::Int(1));
        assert!(render_component(&t, 70, 10).lines().nth(1).is_some_and(|l| l.contains("[-]")));
        t.toggle_select_all();
        assert!(render_component(&t, 70, 10).lines().nth(1).is_some_and(|l| l.contains("[x]")));
    }

    #[test]
    fn expanded_content_spans_the_row() {
        let mut t = table().with_expandable(|r: &Record| {
            format!("{} is {} years old", r.get("name").unwrap_or(""), r.get("age").unwrap_or(""))
        });
        t.toggle_row_expansion(0);
        let out = render_component(&t, 70, 12);
        assert!(out.contains("↳ Alice is 30 years old"));
        assert!(out.contains("▾"));
        let lines: Vec<&str> = out.lines().collect();
        let alice = lines.iter().position(|l| l.contains("Alice (30)")).unwrap();
        assert!(lines[alice + 1].contains("years old"));
        assert!(lines[alice + 2].contains("Bob"));
    }

    #[test]
    fn filter_editor_popup_renders() {
        let mut t = table().with_controlled_filters(BTreeMap::new());
        t.update(key(KeyCode::Char('f')));
        let out = render_component(&t, 70, 12);
        assert!(out.contains("Filter Name"));
    }
}
