//! Application event handling.
//!
//! This module processes background task completion events and feeds each
//! drawn frame back into the seen tracker, the pager and the avatar cache.

use crate::app::{App, AppEvent, Navigation};
use crate::feed::Notification;
use crate::tracking::{intersects, visible_ratio};
use tokio::sync::mpsc;

use super::helpers::{open_link, spawn_avatar_probe, spawn_fetch};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PageFetched { ticket, result } => {
            app.pager.finish(ticket);
            match result {
                // Re-check the initial fill against whatever the page added
                Ok(()) => app.invalidate_list_change(),
                Err(e) => tracing::debug!(error = %e, "Next page fetch failed"),
            }
            app.needs_redraw = true;
        }
        AppEvent::SeenFlushed { batch, result } => {
            if let Err(e) = &result {
                tracing::debug!(error = %e, count = batch.len(), "Dropping failed seen batch");
            }
            app.seen.complete(&batch);
        }
        AppEvent::CommandDone { command, result } => {
            if let Err(e) = result {
                tracing::debug!(command, error = %e, "Feed command failed");
            }
        }
        AppEvent::Interacted {
            notification,
            navigation,
            result,
        } => {
            if let Err(e) = &result {
                tracing::debug!(id = %notification.n_id, error = %e, "Mark interacted failed");
            }
            navigate(app, &notification, navigation);
        }
        AppEvent::AvatarProbed { url, result } => {
            app.avatars.record(&url, &result);
            app.needs_redraw = true;
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

fn navigate(app: &mut App, notification: &Notification, navigation: Navigation) {
    match navigation {
        Navigation::Hook(kind) => {
            if let Some(hook) = app.hooks.get(kind).cloned() {
                tracing::debug!(id = %notification.n_id, ?kind, "Running click hook");
                hook(notification);
            }
        }
        Navigation::Open { url, new_tab } => open_link(app, &url, new_tab),
        Navigation::Nothing => {}
    }
}

/// A notification arrived from the client's delivery stream.
pub(super) fn handle_delivery(app: &mut App, notification: Notification) {
    tracing::debug!(id = %notification.n_id, "Showing toast");
    app.push_toast(notification);
}

/// Feed the list layout of the frame just drawn to the instrumentation.
///
/// - mounts and releases seen observations for the rendered rows
/// - reports each row's visibility ratio
/// - starts avatar probes for rows in view
/// - lets the pager fill a viewport the list does not overflow
pub(super) fn observe_frame(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let mut probes = Vec::new();
    match app.list_view.as_ref() {
        Some(view) => {
            app.seen
                .sync_mounted(view.rows.iter().map(|row| (&row.id, row.seen)));
            for row in &view.rows {
                if app.seen.is_observing(&row.id) {
                    let ratio = visible_ratio(row.extent, &view.metrics);
                    app.seen.on_visibility(&row.id, ratio, row.seen);
                }
                if app.config.hide_avatar || !intersects(row.extent, &view.metrics) {
                    continue;
                }
                if let Some(url) = &row.avatar_url {
                    if app.avatars.begin_probe(url) {
                        probes.push(url.clone());
                    }
                }
            }
        }
        None => app.seen.sync_mounted(std::iter::empty()),
    }

    for url in probes {
        spawn_avatar_probe(app, url, event_tx.clone());
    }

    if let Some(metrics) = app.take_list_change() {
        let has_more = app.has_more();
        if let Some(ticket) = app.pager.on_list_changed(metrics, has_more) {
            spawn_fetch(app, ticket, event_tx.clone());
        }
    }
}
