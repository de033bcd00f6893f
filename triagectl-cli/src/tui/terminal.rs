//! Terminal management and main run loop

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use triagectl_core::{Queue, TriageError};

use super::app::{App, Tab};
use super::event::{handle_key, poll_event, HandleResult};
use super::ui;

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the TUI application against an open queue
pub fn run(queue: &mut Queue, history_limit: Option<usize>) -> Result<()> {
    let mut terminal = init_terminal()?;

    let mut app = App::new();
    load_tab_data(&mut app, queue, history_limit);

    info!("queue view started");
    let result = run_loop(&mut terminal, &mut app, queue, history_limit);

    // Restore terminal (even if loop failed)
    restore_terminal(&mut terminal)?;
    info!("queue view closed");

    result
}

/// Main event loop
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    queue: &mut Queue,
    history_limit: Option<usize>,
) -> Result<()> {
    loop {
        app.now = Some(Local::now().naive_local());
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events (with 100ms timeout for responsive UI)
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            let result = handle_key(app, key);
            apply(app, queue, result, history_limit);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Carry out the effect of a handled key against the queue
pub fn apply(app: &mut App, queue: &mut Queue, result: HandleResult, history_limit: Option<usize>) {
    match result {
        HandleResult::Continue => {}
        HandleResult::Quit => app.should_quit = true,
        HandleResult::CallNext => {
            match queue.call_next() {
                Ok(Some(patient)) => app.set_status(format!("Calling: {}", patient.name)),
                Ok(None) => app.set_status("Queue is empty"),
                Err(e) => report(app, "call next", e),
            }
            load_tab_data(app, queue, history_limit);
        }
        HandleResult::ServeSelected => {
            if let Some(entry) = app.selected_entry().cloned() {
                match queue.serve(entry.record.id) {
                    Ok(true) => app.set_status(format!("Served: {}", entry.record.name)),
                    Ok(false) => app.set_status(format!("{} is no longer waiting", entry.record.name)),
                    Err(e) => report(app, "serve", e),
                }
                load_tab_data(app, queue, history_limit);
            }
        }
        HandleResult::ClearQueue => {
            match queue.clear() {
                Ok(count) => app.set_status(format!("Cleared {} waiting patient(s)", count)),
                Err(e) => report(app, "clear queue", e),
            }
            load_tab_data(app, queue, history_limit);
        }
        HandleResult::SubmitForm => match app.form.to_new_patient() {
            Err(msg) => app.set_status(msg),
            Ok(patient) => {
                let name = patient.name.clone();
                match queue.admit(patient) {
                    Ok(id) => {
                        app.set_status(format!("Added {} (#{})", name, id));
                        app.form.reset();
                        app.exit_mode();
                        load_tab_data(app, queue, history_limit);
                    }
                    Err(e) => report(app, "add patient", e),
                }
            }
        },
        HandleResult::RunSearch => {
            load_tab_data(app, queue, history_limit);
            let query = app.search_query.trim();
            if !query.is_empty() {
                let message = format!("Search '{}': {} result(s)", query, app.search_rows.len());
                app.set_status(message);
            }
        }
        HandleResult::UpdateFilter => load_tab_data(app, queue, history_limit),
        HandleResult::Refresh => {
            // Other processes may have written to the same database file
            queue.invalidate();
            load_tab_data(app, queue, history_limit);
        }
        HandleResult::SwitchTab(tab) => {
            app.switch_tab(tab);
            load_tab_data(app, queue, history_limit);
        }
    }
}

/// Load rows for the current tab, plus the status bar counts
pub fn load_tab_data(app: &mut App, queue: &mut Queue, history_limit: Option<usize>) {
    match app.tab {
        Tab::Queue => match queue.filtered(&app.queue_filter) {
            Ok(rows) => app.queue_rows = rows,
            Err(e) => report(app, "load queue", e),
        },
        Tab::History => match queue.history(history_limit) {
            Ok(rows) => app.history_rows = rows,
            Err(e) => report(app, "load history", e),
        },
        Tab::Search => {
            if app.search_query.trim().is_empty() {
                app.search_rows.clear();
            } else {
                match queue.search(app.search_query.trim()) {
                    Ok(rows) => app.search_rows = rows,
                    Err(e) => report(app, "search", e),
                }
            }
        }
    }

    match queue.store().counts() {
        Ok(counts) => app.counts = counts,
        Err(e) => report(app, "count patients", e),
    }

    app.clamp_selection();
}

fn report(app: &mut App, action: &str, err: TriageError) {
    error!(action, error = %err, "queue action failed");
    app.set_status(format!("Failed to {}: {}", action, err));
}
