//! Event handling for the TUI

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Mode, Tab};

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running
    Continue,
    /// Quit the application
    Quit,
    /// Serve the head of the queue
    CallNext,
    /// Serve the selected queue row
    ServeSelected,
    /// Serve every waiting patient (already confirmed)
    ClearQueue,
    /// Insert the patient in the form
    SubmitForm,
    /// Run the search tab query
    RunSearch,
    /// Filter text changed; recompute queue rows
    UpdateFilter,
    /// Reload the current tab from the store
    Refresh,
    /// Switch tab and load its rows
    SwitchTab(Tab),
}

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> HandleResult {
    // Ignore key release/repeat events reported by some terminals
    if key.kind != KeyEventKind::Press {
        return HandleResult::Continue;
    }

    // Global quit shortcuts (Ctrl+C, Ctrl+Q)
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => return HandleResult::Quit,
            _ => {}
        }
    }

    // Mode-specific handling
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Filter => handle_filter_mode(app, key),
        Mode::Form => handle_form_mode(app, key),
        Mode::ConfirmClear => handle_confirm_clear(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Char('q') => HandleResult::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            HandleResult::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            HandleResult::Continue
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.selected_index = 0;
            HandleResult::Continue
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.selected_index = app.row_count().saturating_sub(1);
            HandleResult::Continue
        }

        // Tab switching
        KeyCode::Char('1') => HandleResult::SwitchTab(Tab::Queue),
        KeyCode::Char('2') => HandleResult::SwitchTab(Tab::History),
        KeyCode::Char('3') => HandleResult::SwitchTab(Tab::Search),
        KeyCode::Tab => {
            let next = Tab::ALL[(app.tab.index() + 1) % Tab::ALL.len()];
            HandleResult::SwitchTab(next)
        }

        // Filter / search input
        KeyCode::Char('/') => {
            if app.tab == Tab::History {
                app.switch_tab(Tab::Search);
            }
            app.mode = Mode::Filter;
            HandleResult::Continue
        }

        // Queue actions
        KeyCode::Char('a') => {
            app.open_form();
            HandleResult::Continue
        }
        KeyCode::Char('n') if app.tab == Tab::Queue => HandleResult::CallNext,
        KeyCode::Char('s') | KeyCode::Enter if app.tab == Tab::Queue => {
            HandleResult::ServeSelected
        }
        KeyCode::Char('C') if app.tab == Tab::Queue => {
            app.mode = Mode::ConfirmClear;
            HandleResult::Continue
        }

        KeyCode::Esc => {
            if app.tab == Tab::Queue && !app.queue_filter.is_empty() {
                app.queue_filter.clear();
                HandleResult::UpdateFilter
            } else {
                app.clear_status();
                HandleResult::Continue
            }
        }

        KeyCode::Char('r') => HandleResult::Refresh,

        _ => HandleResult::Continue,
    }
}

/// Handle keys while typing a filter or search query
fn handle_filter_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    let live = app.tab == Tab::Queue;

    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            app.filter_input_mut().clear();
            if live {
                HandleResult::UpdateFilter
            } else {
                HandleResult::Continue
            }
        }
        KeyCode::Enter => {
            app.exit_mode();
            if live {
                HandleResult::UpdateFilter
            } else {
                HandleResult::RunSearch
            }
        }
        KeyCode::Backspace => {
            app.filter_input_mut().pop();
            if live {
                HandleResult::UpdateFilter
            } else {
                HandleResult::Continue
            }
        }
        KeyCode::Char(c) => {
            app.filter_input_mut().push(c);
            if live {
                HandleResult::UpdateFilter
            } else {
                HandleResult::Continue
            }
        }
        _ => HandleResult::Continue,
    }
}

/// Handle keys in the add-patient form
fn handle_form_mode(app: &mut App, key: KeyEvent) -> HandleResult {
    use super::form::FormField;

    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            HandleResult::Continue
        }
        KeyCode::Enter => HandleResult::SubmitForm,
        KeyCode::Tab | KeyCode::Down => {
            app.form.next_field();
            HandleResult::Continue
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.prev_field();
            HandleResult::Continue
        }
        KeyCode::Left if app.form.field == FormField::Severity => {
            app.form.adjust_severity(-1);
            HandleResult::Continue
        }
        KeyCode::Right if app.form.field == FormField::Severity => {
            app.form.adjust_severity(1);
            HandleResult::Continue
        }
        KeyCode::Backspace => {
            app.form.backspace();
            HandleResult::Continue
        }
        KeyCode::Char(c) => {
            app.form.insert(c);
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}

/// Handle the clear-queue confirmation prompt
fn handle_confirm_clear(app: &mut App, key: KeyEvent) -> HandleResult {
    app.exit_mode();
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => HandleResult::ClearQueue,
        _ => {
            app.set_status("Clear cancelled");
            HandleResult::Continue
        }
    }
}
