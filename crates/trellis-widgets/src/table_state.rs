//! View-state for [`DataTable`](crate::data_table::DataTable): row identity,
//! selection, expansion, sort and filters.
//!
//! Everything here is plain data plus transition functions. The table decides
//! which messages to emit from the values these functions return.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identity of a row.
///
/// Records without an identity fall back to `Int(position)`, which is only
/// stable while the row order is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// Numeric identifier (also used for the positional fallback).
    Int(i64),
    /// Textual identifier.
    Str(String),
}

impl RowId {
    /// Identity for the row at `index` when the record has none.
    pub fn positional(index: usize) -> Self {
        RowId::Int(index as i64)
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        RowId::Int(v)
    }
}

impl From<i32> for RowId {
    fn from(v: i32) -> Self {
        RowId::Int(v.into())
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId::Str(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        RowId::Str(v)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{n}"),
            RowId::Str(s) => f.write_str(s),
        }
    }
}

/// Who owns a piece of table state.
///
/// Fixed when the table is configured and never re-inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// The parent owns the value. The table emits the proposed value and
    /// waits for the parent to feed it back.
    Controlled,
    /// The table owns and mutates the value itself.
    #[default]
    Uncontrolled,
}

/// How many rows may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection column.
    #[default]
    None,
    /// At most one row (radio buttons).
    Single,
    /// Any number of rows (checkboxes, with select-all).
    Multiple,
}

/// How much of the visible row set is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// No visible row is selected.
    None,
    /// Some, but not all, visible rows are selected.
    Partial,
    /// Every visible row is selected (and there is at least one).
    All,
}

/// Selected row ids in selection order.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    ownership: Ownership,
    ids: Vec<RowId>,
}

impl Selection {
    /// Selection in `mode`, owned as `ownership`, starting from `ids`.
    pub fn new(mode: SelectionMode, ownership: Ownership, ids: Vec<RowId>) -> Self {
        Self {
            mode,
            ownership,
            ids,
        }
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Who owns the selected ids.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Currently selected ids.
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// Replace the ids (the feedback path for controlled selection).
    pub fn set_ids(&mut self, ids: Vec<RowId>) {
        self.ids = ids;
    }

    /// The selection after toggling `id`, or `None` in [`SelectionMode::None`].
    ///
    /// A selected id is removed. Otherwise `Single` replaces the whole
    /// selection and `Multiple` appends.
    pub fn toggled(&self, id: &RowId) -> Option<Vec<RowId>> {
        match self.mode {
            SelectionMode::None => None,
            _ if self.contains(id) => Some(self.ids.iter().filter(|i| *i != id).cloned().collect()),
            SelectionMode::Single => Some(vec![id.clone()]),
            SelectionMode::Multiple => {
                let mut ids = self.ids.clone();
                ids.push(id.clone());
                Some(ids)
            }
        }
    }

    /// The selection after select-all over `visible`, or `None` unless in
    /// [`SelectionMode::Multiple`].
    ///
    /// Clears when every visible row is already selected, otherwise selects
    /// exactly the visible set. Ids outside `visible` are dropped either way.
    pub fn all_toggled(&self, visible: &[RowId]) -> Option<Vec<RowId>> {
        if self.mode != SelectionMode::Multiple {
            return None;
        }
        match self.coverage(visible) {
            Coverage::All => Some(Vec::new()),
            _ => Some(visible.to_vec()),
        }
    }

    /// How much of `visible` is selected.
    pub fn coverage(&self, visible: &[RowId]) -> Coverage {
        let selected = visible.iter().filter(|id| self.contains(id)).count();
        if selected == 0 {
            Coverage::None
        } else if selected == visible.len() {
            Coverage::All
        } else {
            Coverage::Partial
        }
    }

    /// Commit a proposed selection.
    ///
    /// Uncontrolled: stored locally, returns `None`. Controlled: left
    /// untouched and returned for the caller to emit.
    pub fn commit(&mut self, ids: Vec<RowId>) -> Option<Vec<RowId>> {
        match self.ownership {
            Ownership::Controlled => Some(ids),
            Ownership::Uncontrolled => {
                self.ids = ids;
                None
            }
        }
    }
}

/// Indices of expanded rows.
///
/// Keyed by position, so re-ordering the rows moves the expansion with the
/// position rather than the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedRows(BTreeSet<usize>);

impl ExpandedRows {
    /// Flip `index` and return its new state.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    /// Whether `index` is expanded.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Forget indices at or beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        self.0.retain(|&i| i < len);
    }

    /// Expanded indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Number of expanded rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no row is expanded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Header indicator for an active sort.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Header indicator for a sortable column that is not the active sort.
pub const SORTABLE_INDICATOR: &str = "↕";

/// The active sort, owned by the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    /// Column key.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Sort by `key` in `direction`.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// The sort requested by activating the header of `key`.
///
/// A different column starts ascending. The same column flips between
/// ascending and descending; toggling never returns to "unsorted".
pub fn next_sort(current: Option<&SortState>, key: &str) -> SortState {
    let direction = match current {
        Some(s) if s.key == key && s.direction == SortDirection::Asc => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    SortState::new(key, direction)
}

/// Per-column filter text. Filtering itself is the parent's job.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    ownership: Ownership,
    values: BTreeMap<String, String>,
}

impl Filters {
    /// Filters owned as `ownership`, starting from `values`.
    pub fn new(ownership: Ownership, values: BTreeMap<String, String>) -> Self {
        Self { ownership, values }
    }

    /// Who owns the filter map.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Filter text for `key` (empty when unset).
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// The whole map.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Replace the map (the feedback path for controlled filters).
    pub fn set_values(&mut self, values: BTreeMap<String, String>) {
        self.values = values;
    }

    /// The full map after setting `key` to `text`, or `None` when the
    /// filters are uncontrolled (typing into an uncontrolled filter has no
    /// effect).
    pub fn with_value(&self, key: &str, text: impl Into<String>) -> Option<BTreeMap<String, String>> {
        match self.ownership {
            Ownership::Uncontrolled => None,
            Ownership::Controlled => {
                let mut values = self.values.clone();
                values.insert(key.to_string(), text.into());
                Some(values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[i64]) -> Vec<RowId> {
        v.iter().copied().map(RowId::Int).collect()
    }

    // ── sort ──

    #[test]
    fn first_sort_is_ascending() {
        assert_eq!(next_sort(None, "name"), SortState::new("name", SortDirection::Asc));
    }

    #[test]
    fn same_column_alternates() {
        let mut sort = next_sort(None, "name");
        for expected in [SortDirection::Desc, SortDirection::Asc, SortDirection::Desc] {
            sort = next_sort(Some(&sort), "name");
            assert_eq!(sort.direction, expected);
        }
    }

    #[test]
    fn other_column_resets_to_ascending() {
        let current = SortState::new("name", SortDirection::Desc);
        assert_eq!(
            next_sort(Some(&current), "age"),
            SortState::new("age", SortDirection::Asc)
        );
    }

    // ── selection ──

    #[test]
    fn select_then_deselect_round_trips() {
        let mut sel = Selection::new(SelectionMode::Multiple, Ownership::Uncontrolled, ids(&[2]));
        let before = sel.ids().to_vec();
        let id = RowId::Int(5);
        let added = sel.toggled(&id).unwrap();
        sel.commit(added);
        assert!(sel.contains(&id));
        let removed = sel.toggled(&id).unwrap();
        sel.commit(removed);
        assert_eq!(sel.ids(), before.as_slice());
    }

    #[test]
    fn single_mode_replaces() {
        let sel = Selection::new(SelectionMode::Single, Ownership::Uncontrolled, ids(&[1]));
        assert_eq!(sel.toggled(&RowId::Int(2)), Some(ids(&[2])));
    }

    #[test]
    fn none_mode_ignores_toggles() {
        let sel = Selection::new(SelectionMode::None, Ownership::Uncontrolled, vec![]);
        assert_eq!(sel.toggled(&RowId::Int(1)), None);
        assert_eq!(sel.all_toggled(&ids(&[1, 2])), None);
    }

    #[test]
    fn select_all_toggle_law() {
        let visible = ids(&[1, 2, 3]);
        let mut sel = Selection::new(SelectionMode::Multiple, Ownership::Uncontrolled, ids(&[2]));
        let all = sel.all_toggled(&visible).unwrap();
        sel.commit(all);
        assert_eq!(sel.ids(), visible.as_slice());
        let none = sel.all_toggled(&visible).unwrap();
        sel.commit(none);
        assert!(sel.ids().is_empty());
    }

    #[test]
    fn select_all_discards_ids_outside_visible_page() {
        let sel = Selection::new(SelectionMode::Multiple, Ownership::Uncontrolled, ids(&[99]));
        assert_eq!(sel.all_toggled(&ids(&[1, 2])), Some(ids(&[1, 2])));
    }

    #[test]
    fn select_all_on_empty_visible_set_is_empty() {
        let sel = Selection::new(SelectionMode::Multiple, Ownership::Uncontrolled, vec![]);
        assert_eq!(sel.all_toggled(&[]), Some(vec![]));
        assert_eq!(sel.coverage(&[]), Coverage::None);
    }

    #[test]
    fn coverage_is_tri_state() {
        let sel = Selection::new(SelectionMode::Multiple, Ownership::Uncontrolled, ids(&[1]));
        assert_eq!(sel.coverage(&ids(&[1])), Coverage::All);
        assert_eq!(sel.coverage(&ids(&[1, 2])), Coverage::Partial);
        assert_eq!(sel.coverage(&ids(&[3])), Coverage::None);
    }

    #[test]
    fn controlled_commit_does_not_mutate() {
        let mut sel = Selection::new(SelectionMode::Multiple, Ownership::Controlled, vec![]);
        let proposed = sel.toggled(&RowId::Int(1)).unwrap();
        assert_eq!(sel.commit(proposed), Some(ids(&[1])));
        assert!(sel.ids().is_empty());
    }

    // ── expansion ──

    #[test]
    fn expand_then_collapse_round_trips() {
        let mut rows = ExpandedRows::default();
        rows.toggle(0);
        let before = rows.clone();
        assert!(rows.toggle(3));
        assert!(!rows.toggle(3));
        assert_eq!(rows, before);
    }

    #[test]
    fn truncate_drops_out_of_range() {
        let mut rows = ExpandedRows::default();
        rows.toggle(1);
        rows.toggle(4);
        rows.truncate(3);
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![1]);
    }

    // ── filters ──

    #[test]
    fn controlled_filters_propose_full_map() {
        let mut start = BTreeMap::new();
        start.insert("city".to_string(), "NY".to_string());
        let filters = Filters::new(Ownership::Controlled, start);
        let next = filters.with_value("name", "al").unwrap();
        assert_eq!(next.get("city").map(String::as_str), Some("NY"));
        assert_eq!(next.get("name").map(String::as_str), Some("al"));
        assert_eq!(filters.get("name"), "");
    }

    #[test]
    fn uncontrolled_filters_are_inert() {
        let filters = Filters::default();
        assert_eq!(filters.with_value("name", "al"), None);
    }

    #[test]
    fn row_id_display() {
        assert_eq!(RowId::from(7i64).to_string(), "7");
        assert_eq!(RowId::from("a-1").to_string(), "a-1");
    }
}
