//! Helper functions for UI operations.
//!
//! Background work (client commands, avatar probes) is spawned from here and
//! reports back through the app event channel. Link opening lives here too.

use crate::app::{App, AppEvent, Navigation};
use crate::avatar::probe_image;
use crate::feed::{FeedError, FeedResult, Notification};
use crate::tracking::{FetchTicket, SeenBatch};
use crate::util::{resolve_link, LinkTarget};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing, the panic message comes
/// back as `Err(String)`.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run a client command, turning a panic into a failed result.
///
/// A panic is also reported as `AppEvent::TaskPanicked`.
async fn run_guarded(
    task: &'static str,
    command: BoxFuture<'static, FeedResult>,
    tx: &mpsc::Sender<AppEvent>,
) -> FeedResult {
    match catch_task_panic(command).await {
        Ok(result) => result,
        Err(panic_msg) => {
            tracing::error!(task, error = %panic_msg, "Background task panicked");
            let _ = tx
                .send(AppEvent::TaskPanicked {
                    task,
                    error: panic_msg.clone(),
                })
                .await;
            Err(FeedError::Request(format!("task panicked: {}", panic_msg)))
        }
    }
}

async fn send(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Spawn a fire-and-forget client command.
pub(super) fn spawn_command(
    command: &'static str,
    future: BoxFuture<'static, FeedResult>,
    tx: mpsc::Sender<AppEvent>,
) {
    tokio::spawn(async move {
        let result = run_guarded(command, future, &tx).await;
        send(&tx, AppEvent::CommandDone { command, result }, "CommandDone").await;
    });
}

/// Spawn the next-page fetch a pager ticket was issued for.
///
/// The ticket always comes back, so the pager's loading flag is cleared
/// even when the task panics.
pub(super) fn spawn_fetch(app: &App, ticket: FetchTicket, tx: mpsc::Sender<AppEvent>) {
    let future = app.client.fetch_next_page();
    tokio::spawn(async move {
        let result = run_guarded("fetch_next_page", future, &tx).await;
        send(&tx, AppEvent::PageFetched { ticket, result }, "PageFetched").await;
    });
}

/// Spawn the bulk mark-seen call for a flushed batch.
pub(super) fn spawn_seen_flush(app: &App, batch: SeenBatch, tx: mpsc::Sender<AppEvent>) {
    let future = app.client.mark_bulk_seen(batch.ids().to_vec());
    tokio::spawn(async move {
        let result = run_guarded("mark_bulk_seen", future, &tx).await;
        send(&tx, AppEvent::SeenFlushed { batch, result }, "SeenFlushed").await;
    });
}

/// Mark `notification` interacted, then navigate once the call returns.
pub(super) fn spawn_interaction(
    app: &App,
    notification: Notification,
    navigation: Navigation,
    tx: mpsc::Sender<AppEvent>,
) {
    let future = app.client.mark_interacted(notification.n_id.clone());
    tokio::spawn(async move {
        let result = run_guarded("mark_interacted", future, &tx).await;
        send(
            &tx,
            AppEvent::Interacted {
                notification: Box::new(notification),
                navigation,
                result,
            },
            "Interacted",
        )
        .await;
    });
}

/// Probe an avatar URL in the background.
pub(super) fn spawn_avatar_probe(app: &App, url: String, tx: mpsc::Sender<AppEvent>) {
    let client = app.http_client.clone();
    tokio::spawn(async move {
        match catch_task_panic(probe_image(&client, &url)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::debug!(url = %url, error = %e, "Avatar probe failed");
                }
                send(&tx, AppEvent::AvatarProbed { url, result }, "AvatarProbed").await;
            }
            Err(panic_msg) => {
                tracing::error!(task = "avatar_probe", error = %panic_msg, "Background task panicked");
                send(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "avatar_probe",
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
            }
        }
    });
}

/// Open a notification link.
///
/// Web links go to the system browser. Site-relative links only make sense
/// inside the embedding application, so they are reported in the status bar.
pub(super) fn open_link(app: &mut App, link: &str, new_tab: bool) {
    match resolve_link(link) {
        Ok(LinkTarget::Web(url)) => {
            // SEC: only http/https reach open::that()
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                tracing::debug!(url = %url, new_tab, "Opened link");
                app.set_status(format!("Opening {}...", url.host_str().unwrap_or("link")));
            }
        }
        Ok(LinkTarget::Relative(path)) => {
            tracing::debug!(path = %path, "Relative link without a host router");
            app.set_status(format!("Link: {}", path));
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::{Fixture, MemoryFeed};
    use crate::tracking::ScrollPager;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_catch_task_panic_returns_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result.unwrap_err(), "boom");

        let ok = catch_task_panic(async { 7 }).await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_spawn_fetch_returns_ticket() {
        let feed = MemoryFeed::new(Fixture::default());
        let app = App::new(Config::default(), Arc::new(feed)).unwrap();
        let mut pager = ScrollPager::new();
        let ticket = pager
            .on_list_changed(
                crate::tracking::ScrollMetrics {
                    scroll_top: 0,
                    client_height: 10,
                    scroll_height: 0,
                },
                true,
            )
            .unwrap();
        assert!(pager.is_loading());

        let (tx, mut rx) = mpsc::channel(4);
        spawn_fetch(&app, ticket, tx);
        match rx.recv().await {
            Some(AppEvent::PageFetched { ticket, result }) => {
                assert!(result.is_ok());
                pager.finish(ticket);
            }
            _ => panic!("expected PageFetched"),
        }
        assert!(!pager.is_loading());
    }

    #[tokio::test]
    async fn test_relative_link_goes_to_status() {
        let feed = MemoryFeed::new(Fixture::default());
        let mut app = App::new(Config::default(), Arc::new(feed)).unwrap();
        open_link(&mut app, "/settings", false);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "Link: /settings");

        open_link(&mut app, "httpx://example.com", false);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("unsupported scheme"));

        open_link(&mut app, "  ", false);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "empty link");
    }
}
