//! Core application state and mode management

use chrono::NaiveDateTime;
use triagectl_core::{PatientRecord, QueueCounts, QueueEntry};

use super::form::PatientForm;

/// Input mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigate rows, call/serve patients, switch tabs
    #[default]
    Normal,
    /// Typing into the filter (queue tab) or search query (search tab)
    Filter,
    /// Add-patient form is open
    Form,
    /// Waiting for y/n before clearing the queue
    ConfirmClear,
}

/// Active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Waiting patients in severity order
    #[default]
    Queue,
    /// Every record, most recent visit first
    History,
    /// Name search across all records
    Search,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Queue, Tab::History, Tab::Search];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Queue => "Queue",
            Tab::History => "History",
            Tab::Search => "Search",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Queue => 0,
            Tab::History => 1,
            Tab::Search => 2,
        }
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct App {
    /// Current input mode
    pub mode: Mode,
    /// Active tab
    pub tab: Tab,
    /// Live name filter applied to the queue tab
    pub queue_filter: String,
    /// Query for the search tab (runs on Enter)
    pub search_query: String,
    /// Queue rows (already filtered)
    pub queue_rows: Vec<QueueEntry>,
    pub history_rows: Vec<PatientRecord>,
    pub search_rows: Vec<PatientRecord>,
    pub counts: QueueCounts,
    /// Selected row in the active tab
    pub selected_index: usize,
    /// Add-patient form
    pub form: PatientForm,
    /// Status message (shown in status bar)
    pub status_message: Option<String>,
    /// Clock for the "Waited" column, refreshed before every frame
    pub now: Option<NaiveDateTime>,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    /// Create a new App instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Switch to a tab
    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected_index = 0;
    }

    /// Rows shown on the active tab
    pub fn row_count(&self) -> usize {
        match self.tab {
            Tab::Queue => self.queue_rows.len(),
            Tab::History => self.history_rows.len(),
            Tab::Search => self.search_rows.len(),
        }
    }

    /// Select next row (wraps)
    pub fn select_next(&mut self) {
        let len = self.row_count();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    /// Select previous row (wraps)
    pub fn select_prev(&mut self) {
        let len = self.row_count();
        if len > 0 {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(len - 1);
        }
    }

    /// Keep the selection inside the current row count after a reload
    pub fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// Queue entry under the cursor (queue tab only)
    pub fn selected_entry(&self) -> Option<&QueueEntry> {
        match self.tab {
            Tab::Queue => self.queue_rows.get(self.selected_index),
            _ => None,
        }
    }

    /// Text buffer the filter mode edits for the active tab
    pub fn filter_input_mut(&mut self) -> &mut String {
        match self.tab {
            Tab::Search => &mut self.search_query,
            _ => &mut self.queue_filter,
        }
    }

    pub fn filter_input(&self) -> &str {
        match self.tab {
            Tab::Search => &self.search_query,
            _ => &self.queue_filter,
        }
    }

    /// Open the add-patient form with default values
    pub fn open_form(&mut self) {
        self.form.reset();
        self.mode = Mode::Form;
    }

    /// Exit current mode back to normal
    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triagectl_core::{PatientRecord, Status};

    fn entry(position: usize, name: &str) -> QueueEntry {
        QueueEntry {
            position,
            est_wait_minutes: position as u32 * 7,
            record: PatientRecord {
                id: position as i64 + 1,
                name: name.to_string(),
                age: 30,
                severity: 3,
                checkup: String::new(),
                visit_time: "2026-03-01 09:00:00".to_string(),
                status: Status::Waiting,
            },
        }
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = App::new();
        app.queue_rows = vec![entry(0, "a"), entry(1, "b"), entry(2, "c")];

        app.select_prev();
        assert_eq!(app.selected_index, 2);
        app.select_next();
        assert_eq!(app.selected_index, 0);
        app.select_next();
        assert_eq!(app.selected_entry().unwrap().record.name, "b");
    }

    #[test]
    fn test_clamp_selection_after_rows_shrink() {
        let mut app = App::new();
        app.queue_rows = vec![entry(0, "a"), entry(1, "b")];
        app.selected_index = 1;

        app.queue_rows.pop();
        app.clamp_selection();
        assert_eq!(app.selected_index, 0);

        app.queue_rows.clear();
        app.clamp_selection();
        assert_eq!(app.selected_index, 0);
        assert!(app.selected_entry().is_none());
    }

    #[test]
    fn test_filter_input_follows_tab() {
        let mut app = App::new();
        app.filter_input_mut().push_str("an");
        assert_eq!(app.queue_filter, "an");

        app.switch_tab(Tab::Search);
        app.filter_input_mut().push_str("juan");
        assert_eq!(app.search_query, "juan");
        assert_eq!(app.filter_input(), "juan");
    }
}
