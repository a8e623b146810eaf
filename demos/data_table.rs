//! # Data table demo
//!
//! A people directory showing the parent side of the data table:
//! - the table only *requests* a sort, filter or page; this model applies it
//!   and feeds the visible rows back with `set_rows`
//! - selection and filters are controlled, so the model owns them too
//! - `r` simulates a slow reload to show the loading skeleton
//!
//! Set `TRELLIS_LOG=/tmp/trellis.log` to capture the widget's trace output.
//!
//! Run with: `cargo run --example data_table`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use trellis::crossterm::event::{KeyCode, KeyModifiers};
use trellis::ratatui::layout::{Constraint, Layout};
use trellis::ratatui::text::{Line, Span};
use trellis::ratatui::widgets::Paragraph;
use trellis::ratatui::Frame;
use trellis::widgets::data_table::{self, Column, DataTable, Record};
use trellis::widgets::key::{hint_line, KeyMap};
use trellis::widgets::table_state::{RowId, SelectionMode, SortDirection, SortState};
use trellis::widgets::theme::{Palette, ThemeMode};
use trellis::{Command, Component, Model, ProgramOptions, TerminalEvent};

const PAGE_SIZE: usize = 8;

const PEOPLE: &[(&str, u32, &str, &str)] = &[
    ("Ada Lovelace", 36, "London", "Engineering"),
    ("Alan Turing", 41, "Wilmslow", "Research"),
    ("Grace Hopper", 85, "Arlington", "Engineering"),
    ("Edsger Dijkstra", 72, "Nuenen", "Research"),
    ("Barbara Liskov", 84, "Boston", "Research"),
    ("Ken Thompson", 81, "Menlo Park", "Engineering"),
    ("Margaret Hamilton", 87, "Boston", "Operations"),
    ("Donald Knuth", 86, "Stanford", "Research"),
    ("Frances Allen", 88, "Peru", "Engineering"),
    ("John McCarthy", 84, "Stanford", "Research"),
    ("Radia Perlman", 73, "Seattle", "Networking"),
    ("Dennis Ritchie", 70, "Berkeley Heights", "Engineering"),
    ("Leslie Lamport", 83, "Mountain View", "Research"),
    ("Hedy Lamarr", 85, "Vienna", "Networking"),
    ("Katherine Johnson", 101, "Newport News", "Operations"),
    ("Tim Berners-Lee", 69, "London", "Networking"),
    ("Niklaus Wirth", 89, "Zurich", "Research"),
    ("Adele Goldberg", 79, "Cleveland", "Engineering"),
    ("Bjarne Stroustrup", 74, "Aarhus", "Engineering"),
    ("Shafi Goldwasser", 66, "New York", "Research"),
];

struct Directory {
    people: Vec<Record>,
    table: DataTable<Record>,
    sort: Option<SortState>,
    filters: BTreeMap<String, String>,
    selected: Vec<RowId>,
    page: usize,
    palette: Palette,
    status: String,
}

#[derive(Debug)]
enum Msg {
    Table(data_table::Message<Record>),
    Reload,
    Reloaded,
    Quit,
}

impl Directory {
    /// Rows matching every filter, sorted.
    fn matching(&self) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .people
            .iter()
            .filter(|r| {
                self.filters.iter().all(|(key, needle)| {
                    r.get(key)
                        .unwrap_or("")
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                })
            })
            .cloned()
            .collect();
        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| {
                let (a, b) = (a.get(&sort.key).unwrap_or(""), b.get(&sort.key).unwrap_or(""));
                // Numeric columns compare as numbers.
                let ord = match (a.parse::<u32>(), b.parse::<u32>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => a.cmp(b),
                };
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        rows
    }

    fn refresh(&mut self) {
        let rows = self.matching();
        let total = rows.len();
        let pages = total.div_ceil(PAGE_SIZE).max(1);
        self.page = self.page.clamp(1, pages);
        let start = (self.page - 1) * PAGE_SIZE;
        let visible = rows.into_iter().skip(start).take(PAGE_SIZE).collect();
        self.table.set_rows(visible);
        self.table.set_page(self.page);
        self.table.set_total_count(Some(total));
        self.table.set_sort(self.sort.clone());
        self.table.set_filters(self.filters.clone());
    }
}

impl Model for Directory {
    type Message = Msg;
    type Flags = ThemeMode;

    fn init(theme: ThemeMode) -> (Self, Command<Msg>) {
        let people = PEOPLE
            .iter()
            .enumerate()
            .map(|(i, (name, age, city, team))| {
                Record::new()
                    .with("id", (i + 1).to_string())
                    .with("name", *name)
                    .with("age", age.to_string())
                    .with("city", *city)
                    .with("team", *team)
            })
            .collect();
        let mut table = DataTable::new(vec![
            Column::new("name", "Name").sortable().filterable(),
            Column::new("age", "Age").sortable(),
            Column::new("city", "City").sortable().filterable(),
            Column::new("team", "Team").filterable(),
        ])
        .with_title(" People ")
        .with_page_size(PAGE_SIZE)
        .with_controlled_selection(SelectionMode::Multiple, Vec::new())
        .with_controlled_filters(BTreeMap::new())
        .with_expandable(|r: &Record| {
            format!(
                "{} works in {} from {}.",
                r.get("name").unwrap_or("?"),
                r.get("team").unwrap_or("?"),
                r.get("city").unwrap_or("?")
            )
        })
        .with_theme(theme);
        table.focus();

        let mut app = Directory {
            people,
            table,
            sort: None,
            filters: BTreeMap::new(),
            selected: Vec::new(),
            page: 1,
            palette: Palette::for_mode(theme),
            status: String::new(),
        };
        app.refresh();
        (app, Command::none())
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Table(data_table::Message::SortChanged { key, direction }) => {
                self.status = format!("sorted by {key} {direction}");
                self.sort = Some(SortState::new(key, direction));
                self.refresh();
            }
            Msg::Table(data_table::Message::FiltersChanged(filters)) => {
                self.filters = filters;
                self.filters.retain(|_, v| !v.is_empty());
                self.page = 1;
                self.refresh();
            }
            Msg::Table(data_table::Message::PageChanged(page)) => {
                self.page = page;
                self.refresh();
            }
            Msg::Table(data_table::Message::SelectionChanged(ids)) => {
                self.status = format!("{} selected", ids.len());
                self.selected = ids.clone();
                self.table.set_selected(ids);
            }
            Msg::Table(data_table::Message::RowExpanded { row, expanded, .. }) => {
                let verb = if expanded { "expanded" } else { "collapsed" };
                self.status = format!("{verb} {}", row.get("name").unwrap_or("?"));
            }
            Msg::Table(m) => return self.table.update(m).map(Msg::Table),
            Msg::Reload => {
                self.table.set_loading(true);
                self.status = "reloading...".to_string();
                return Command::tick(Duration::from_millis(1200), |_| Msg::Reloaded);
            }
            Msg::Reloaded => {
                self.table.set_loading(false);
                self.status = "reloaded".to_string();
                self.refresh();
            }
            Msg::Quit => return Command::quit(),
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame) {
        let [table, status, hints] = Layout::vertical([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.table.view(frame, table);

        let selected = self
            .selected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let line = Line::from(vec![
            Span::styled(format!(" {} ", self.status), self.palette.primary),
            Span::styled(format!(" selected ids: [{selected}]"), self.palette.muted),
        ]);
        frame.render_widget(Paragraph::new(line), status);

        let mut help = hint_line(&self.table.key_bindings().short_help());
        help.push_str("  │  r: Reload  │  q: Quit");
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {help}"), self.palette.muted)),
            hints,
        );
    }

    fn event(&self, event: TerminalEvent) -> Option<Msg> {
        let TerminalEvent::Key(key) = event else {
            return None;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Msg::Quit);
        }
        if self.table.filter_editor().is_none() {
            match key.code {
                KeyCode::Char('q') => return Some(Msg::Quit),
                KeyCode::Char('r') => return Some(Msg::Reload),
                _ => {}
            }
        }
        Some(Msg::Table(data_table::Message::KeyPress(key)))
    }
}

#[trellis::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = ProgramOptions {
        title: Some("trellis data table".to_string()),
        log_file: std::env::var_os("TRELLIS_LOG").map(PathBuf::from),
        ..ProgramOptions::default()
    };
    trellis::run_with::<Directory>(ThemeMode::detect(), options).await?;
    Ok(())
}
