//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! feed snapshots and deliveries, background task events, and periodic ticks.

use crate::app::{App, AppEvent};
use crate::feed::ApiStatus;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::{handle_app_event, handle_delivery, observe_frame};
use super::helpers::{spawn_fetch, spawn_seen_flush};
use super::input::{handle_input, handle_mouse};
use super::render::render;

/// Result of handling a key press event.
///
/// Returned by input handlers to signal whether the application should
/// continue running or terminate gracefully.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex five event sources:
/// - **Terminal input**: keys, mouse and resizes from crossterm's event stream
/// - **Feed snapshots**: the client's published [`FeedData`](crate::feed::FeedData)
/// - **Deliveries**: newly arrived notifications, shown as toasts
/// - **Background tasks**: command results via the `AppEvent` channel
/// - **Periodic tick**: 250ms timer for seen flushes, throttled fetches,
///   toast and status expiry
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
///
/// # Returns
///
/// Returns `Ok(())` on graceful exit (user quit), or an error if terminal
/// setup fails.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();

    let mut snapshots = app.client.subscribe();
    let mut deliveries = app.client.deliveries();
    let mut snapshots_open = true;
    let mut deliveries_open = true;
    app.apply_snapshot(snapshots.borrow_and_update().clone());

    // PERF-012: Use interval instead of sleep for consistent periodic ticks
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    // Signal handlers for graceful shutdown (Unix only)
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        // PERF-010: Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
            observe_frame(app, &event_tx);
        }

        app.clear_expired_status();

        // PERF-013: Drain all pending app events before handling more input
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(app, key.code, key.modifiers, &event_tx) {
                            break;
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        if mouse.kind != MouseEventKind::Moved {
                            app.needs_redraw = true;
                        }
                        handle_mouse(app, mouse, &event_tx);
                    }
                    Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    _ => {}
                }
            }

            changed = snapshots.changed(), if snapshots_open => {
                match changed {
                    Ok(()) => {
                        let data = snapshots.borrow_and_update().clone();
                        app.apply_snapshot(data);
                    }
                    Err(_) => {
                        tracing::warn!("Feed client dropped its snapshot channel");
                        snapshots_open = false;
                    }
                }
            }

            delivered = deliveries.recv(), if deliveries_open => {
                match delivered {
                    Ok(notification) => handle_delivery(app, notification),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Toast deliveries lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        deliveries_open = false;
                    }
                }
            }

            // Background task events (blocking recv for when queue was empty)
            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event);
            }

            _ = tick_interval.tick() => {
                handle_tick(app, &event_tx);
            }
        }
    }

    app.teardown();
    restore_terminal(terminal)?;
    Ok(())
}

/// Periodic work: flush seen batches, fire throttled fetches, expire toasts
/// and status, animate spinners.
pub(super) fn handle_tick(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(batch) = app.seen.poll_flush() {
        spawn_seen_flush(app, batch, event_tx.clone());
    }

    let has_more = app.has_more();
    let metrics = app.list_view.as_ref().map(|view| view.metrics);
    if let Some(ticket) = app.pager.on_tick(metrics, has_more) {
        spawn_fetch(app, ticket, event_tx.clone());
        app.needs_redraw = true;
    }

    app.expire_toasts();
    app.clear_expired_status();

    let loading = app.feed.api_status == ApiStatus::Loading || app.pager.is_loading();
    if loading && app.popover.is_open() {
        app.advance_spinner();
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
