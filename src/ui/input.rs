//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry in the context of the
//! topmost overlay (card menu, feed panel, or nothing). Mouse presses go
//! through the popover controller first, then to the region hit in the last
//! frame.

use crate::app::{App, AppEvent, Hit, MenuItem};
use crate::feed::NotificationId;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::popover::{PointerOutcome, PopoverState};
use crate::tracking::ScrollMetrics;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use super::helpers::{spawn_command, spawn_fetch, spawn_interaction};
use super::slots::{CardRegion, HeaderIntent};
use super::Action;

/// Rows scrolled per mouse wheel notch.
const WHEEL_STEP: i64 = 3;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Handle help overlay input first (captures all keys when visible)
    if app.show_help {
        return handle_help_input(app, code);
    }

    let context = app.input_context();
    let action = app.keybindings.action_for_key(code, modifiers, context);
    if context == KbContext::CardMenu {
        if let Some(handled) = handle_menu_input(app, action, event_tx) {
            return handled;
        }
    }

    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::ToggleInbox) => toggle_inbox(app, event_tx),
        Some(KbAction::CycleTheme) => app.cycle_theme(),
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
            app.needs_redraw = true;
        }
        Some(action) if app.popover.is_open() => handle_feed_action(app, action, event_tx),
        _ => {}
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    app.needs_redraw = true;
    Action::Continue
}

/// Keys of the open card menu. `None` falls through to the global bindings.
fn handle_menu_input(
    app: &mut App,
    action: Option<KbAction>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Option<Action> {
    match action? {
        KbAction::Back => app.close_card_menu(),
        KbAction::NavDown => app.menu_move(true),
        KbAction::NavUp => app.menu_move(false),
        KbAction::OpenNotification => {
            let selected = app.card_menu.as_ref().map_or(0, |m| m.selected);
            match app.menu_items().get(selected).copied() {
                Some(item) => apply_menu_item(app, item, event_tx),
                None => app.close_card_menu(),
            }
        }
        _ => return None,
    }
    Some(Action::Continue)
}

/// Feed panel keys.
fn handle_feed_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::Back => app.close_inbox(),
        KbAction::NavDown => {
            app.select_next();
            if let Some(metrics) = app.ensure_selected_visible() {
                report_scroll(app, metrics, event_tx);
            }
        }
        KbAction::NavUp => {
            app.select_prev();
            if let Some(metrics) = app.ensure_selected_visible() {
                report_scroll(app, metrics, event_tx);
            }
        }
        KbAction::PageDown | KbAction::PageUp => {
            if let Some(metrics) = app.page(action == KbAction::PageDown) {
                report_scroll(app, metrics, event_tx);
            }
        }
        KbAction::OpenNotification => click_selected(app, CardRegion::Body, event_tx),
        KbAction::PrimaryAction => click_action(app, 0, event_tx),
        KbAction::SecondaryAction => click_action(app, 1, event_tx),
        KbAction::OpenAvatar => click_selected(app, CardRegion::Avatar, event_tx),
        KbAction::OpenSubtext => click_selected(app, CardRegion::Subtext, event_tx),
        KbAction::ToggleRead => {
            if let Some(n) = app.selected_notification() {
                let item = if n.is_read() {
                    MenuItem::MarkUnread
                } else {
                    MenuItem::MarkRead
                };
                let id = n.n_id.clone();
                run_menu_item(app, id, item, event_tx);
            }
        }
        KbAction::Archive => {
            if let Some(n) = app.selected_notification().filter(|n| !n.archived) {
                let id = n.n_id.clone();
                run_menu_item(app, id, MenuItem::Archive, event_tx);
            }
        }
        KbAction::MarkAllRead => mark_all_read(app, event_tx),
        KbAction::NextStore => cycle_store(app, true, event_tx),
        KbAction::PrevStore => cycle_store(app, false, event_tx),
        KbAction::OpenMenu => {
            if let Some(id) = app.selected_notification().map(|n| n.n_id.clone()) {
                app.open_card_menu(id);
            }
        }
        // Global actions are handled before the panel sees the key
        KbAction::Quit | KbAction::ToggleInbox | KbAction::CycleTheme | KbAction::ShowHelp => {}
    }
}

/// Handle a mouse event.
pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent, event_tx: &mpsc::Sender<AppEvent>) {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_help {
                return;
            }
            let target = app.popover.hit_test(column, row);
            app.popover.pointer_down(target);
            app.pressed = app.hit_at(column, row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if app.show_help {
                app.show_help = false;
                app.needs_redraw = true;
                return;
            }
            let target = app.popover.hit_test(column, row);
            let outcome = app.popover.pointer_up(target);
            let pressed = app.pressed.take();
            let released = app.hit_at(column, row);

            match outcome {
                Some(PointerOutcome::TriggerActivated(state)) => {
                    inbox_activated(app, state, event_tx);
                    return;
                }
                Some(PointerOutcome::Dismissed) => {
                    tracing::debug!("Inbox dismissed by outside click");
                    app.inbox_toggled(PopoverState::Closed);
                }
                None => {}
            }

            // A click inside the panel but away from the open menu closes it
            let on_menu = matches!(
                released,
                Some(Hit::MenuItem(_))
                    | Some(Hit::Card {
                        region: CardRegion::Menu,
                        ..
                    })
            );
            if !on_menu {
                app.close_card_menu();
            }

            if let Some(hit) = released.filter(|hit| pressed.as_ref() == Some(hit)) {
                dispatch_hit(app, hit, event_tx);
            }
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let over_list = app.list_view.as_ref().is_some_and(|v| {
                let a = v.area;
                column >= a.x && column < a.right() && row >= a.y && row < a.bottom()
            });
            if !over_list || app.card_menu.is_some() {
                return;
            }
            let delta = if mouse.kind == MouseEventKind::ScrollDown {
                WHEEL_STEP
            } else {
                -WHEEL_STEP
            };
            if let Some(metrics) = app.scroll_by(delta) {
                report_scroll(app, metrics, event_tx);
            }
        }
        _ => {}
    }
}

/// Act on a clicked region.
pub(super) fn dispatch_hit(app: &mut App, hit: Hit, event_tx: &mpsc::Sender<AppEvent>) {
    match hit {
        Hit::Card {
            id,
            region: CardRegion::Menu,
        } => {
            let already_open = app.card_menu.as_ref().is_some_and(|m| m.id == id);
            if already_open {
                app.close_card_menu();
            } else {
                app.select_id(&id);
                app.open_card_menu(id);
            }
        }
        Hit::Card { id, region } => {
            app.select_id(&id);
            click(app, &id, region, event_tx);
        }
        Hit::Toast { id, region } => {
            click(app, &id, region, event_tx);
            app.dismiss_toast(&id);
        }
        Hit::Tab(store_id) => change_store(app, store_id, event_tx),
        Hit::Header(HeaderIntent::MarkAllRead) => mark_all_read(app, event_tx),
        Hit::Header(HeaderIntent::CloseInbox) => app.close_inbox(),
        Hit::MenuItem(item) => apply_menu_item(app, item, event_tx),
    }
}

// ============================================================================
// Intents
// ============================================================================

fn toggle_inbox(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let state = app.popover.toggle();
    inbox_activated(app, state, event_tx);
}

/// The bell was activated: the popover already toggled, the badge resets.
fn inbox_activated(app: &mut App, state: PopoverState, event_tx: &mpsc::Sender<AppEvent>) {
    app.inbox_toggled(state);
    spawn_command(
        "reset_badge_count",
        app.client.reset_badge_count(),
        event_tx.clone(),
    );
}

/// Mark interacted, then navigate.
fn click(app: &mut App, id: &NotificationId, region: CardRegion, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(notification) = app.find_notification(id).cloned() else {
        return;
    };
    let navigation = app.navigation_for(&notification, &region);
    tracing::debug!(id = %id, ?region, ?navigation, "Notification clicked");
    spawn_interaction(app, notification, navigation, event_tx.clone());
}

fn click_selected(app: &mut App, region: CardRegion, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(id) = app.selected_notification().map(|n| n.n_id.clone()) {
        click(app, &id, region, event_tx);
    }
}

/// Click an action button of the selected card, if it has that many.
fn click_action(app: &mut App, index: usize, event_tx: &mpsc::Sender<AppEvent>) {
    let has_button = app
        .selected_notification()
        .is_some_and(|n| index < n.message.actions.len().min(super::card::MAX_ACTIONS));
    if has_button {
        click_selected(app, CardRegion::Action(index), event_tx);
    }
}

fn apply_menu_item(app: &mut App, item: MenuItem, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(menu) = app.card_menu.take() {
        app.needs_redraw = true;
        run_menu_item(app, menu.id, item, event_tx);
    }
}

fn run_menu_item(app: &mut App, id: NotificationId, item: MenuItem, event_tx: &mpsc::Sender<AppEvent>) {
    let (command, future) = match item {
        MenuItem::MarkRead => ("mark_read", app.client.mark_read(id)),
        MenuItem::MarkUnread => ("mark_unread", app.client.mark_unread(id)),
        MenuItem::Archive => ("mark_archived", app.client.mark_archived(id)),
    };
    spawn_command(command, future, event_tx.clone());
}

fn mark_all_read(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    spawn_command("mark_all_read", app.client.mark_all_read(), event_tx.clone());
}

fn change_store(app: &mut App, store_id: String, event_tx: &mpsc::Sender<AppEvent>) {
    if app.feed.active_store.as_deref() == Some(store_id.as_str()) {
        return;
    }
    tracing::debug!(store = %store_id, "Changing active store");
    app.close_card_menu();
    spawn_command(
        "change_active_store",
        app.client.change_active_store(store_id),
        event_tx.clone(),
    );
}

fn cycle_store(app: &mut App, forward: bool, event_tx: &mpsc::Sender<AppEvent>) {
    let count = app.feed.stores.len();
    if count < 2 {
        return;
    }
    let current = app.feed.active_store_index().unwrap_or(0);
    let next = if forward {
        (current + 1) % count
    } else {
        (current + count - 1) % count
    };
    let store_id = app.feed.stores[next].store_id.clone();
    change_store(app, store_id, event_tx);
}

/// Hand a scroll to the pager.
fn report_scroll(app: &mut App, metrics: ScrollMetrics, event_tx: &mpsc::Sender<AppEvent>) {
    let has_more = app.has_more();
    if let Some(ticket) = app.pager.on_scroll(metrics, has_more) {
        spawn_fetch(app, ticket, event_tx.clone());
    }
}
