//! Integration tests for the popover: click sequences and panel placement.

use belltower::popover::{
    compute_position, Offset, Placement, PointerOutcome, PointerTarget, PopoverController,
    PopoverState,
};
use pretty_assertions::assert_eq;
use ratatui::layout::Rect;

const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 100,
    height: 40,
};

/// Bell in the top right corner.
const BELL: Rect = Rect {
    x: 90,
    y: 0,
    width: 4,
    height: 1,
};

fn controller() -> PopoverController {
    let mut popover = PopoverController::new(Placement::BottomEnd);
    popover.set_layout(BELL, (40, 20), SCREEN);
    popover
}

fn click(popover: &mut PopoverController, down: (u16, u16), up: (u16, u16)) -> Option<PointerOutcome> {
    let target = popover.hit_test(down.0, down.1);
    popover.pointer_down(target);
    let target = popover.hit_test(up.0, up.1);
    popover.pointer_up(target)
}

// ============================================================================
// Click sequences
// ============================================================================

#[test]
fn test_trigger_click_opens_then_inside_click_keeps_open() {
    let mut popover = controller();
    assert_eq!(
        click(&mut popover, (91, 0), (91, 0)),
        Some(PointerOutcome::TriggerActivated(PopoverState::Open))
    );
    let panel = popover.position().unwrap();

    let inside = (panel.x + 2, panel.y + 2);
    assert_eq!(popover.hit_test(inside.0, inside.1), PointerTarget::Panel);
    assert_eq!(click(&mut popover, inside, inside), None);
    assert!(popover.is_open());
}

#[test]
fn test_press_inside_release_outside_keeps_open() {
    let mut popover = controller();
    popover.toggle();
    let panel = popover.position().unwrap();
    assert_eq!(click(&mut popover, (panel.x + 1, panel.y + 1), (5, 35)), None);
    assert!(popover.is_open());
}

#[test]
fn test_outside_click_dismisses() {
    let mut popover = controller();
    popover.toggle();
    assert_eq!(
        click(&mut popover, (5, 35), (5, 35)),
        Some(PointerOutcome::Dismissed)
    );
    assert_eq!(popover.state(), PopoverState::Closed);
    assert_eq!(popover.position(), None);
}

#[test]
fn test_press_outside_release_on_trigger_does_not_toggle() {
    let mut popover = controller();
    popover.toggle();
    // Press outside, release on the bell: the release is "inside", no dismiss
    assert_eq!(click(&mut popover, (5, 35), (91, 0)), None);
    assert!(popover.is_open());
}

#[test]
fn test_press_before_open_is_not_a_dismissal() {
    let mut popover = controller();
    // Press outside while closed, then the panel opens by keyboard
    popover.pointer_down(PointerTarget::Outside);
    popover.toggle();
    assert_eq!(popover.pointer_up(PointerTarget::Outside), None);
    assert!(popover.is_open());
}

#[test]
fn test_unmounted_controller_ignores_input() {
    let mut popover = controller();
    popover.toggle();
    popover.unmount();
    assert!(!popover.is_open());
    assert_eq!(popover.toggle(), PopoverState::Closed);
    assert_eq!(click(&mut popover, (91, 0), (91, 0)), None);
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_bottom_end_aligns_right_edges() {
    let mut popover = controller();
    popover.toggle();
    let panel = popover.position().unwrap();
    assert_eq!(panel.right(), BELL.right());
    // One cell gap under the bell
    assert_eq!(panel.y, BELL.bottom() + 1);
    assert_eq!((panel.width, panel.height), (40, 20));
}

#[test]
fn test_flips_to_top_when_bottom_does_not_fit() {
    let anchor = Rect::new(50, 35, 4, 1);
    let panel = compute_position(anchor, (20, 10), SCREEN, Placement::Bottom, Offset::default());
    assert_eq!(panel.bottom(), anchor.y - 1);
    assert_eq!(panel.x, 42);
}

#[test]
fn test_panel_clamped_inside_screen() {
    let panel = compute_position(BELL, (40, 20), SCREEN, Placement::BottomStart, Offset::default());
    assert!(panel.right() <= SCREEN.right());
    assert_eq!(panel.x, SCREEN.right() - 40);
}

#[test]
fn test_oversized_panel_shrinks_to_screen() {
    let screen = Rect::new(0, 0, 30, 10);
    let panel = compute_position(Rect::new(25, 0, 2, 1), (56, 30), screen, Placement::Bottom, Offset::default());
    assert_eq!((panel.width, panel.height), (30, 10));
    assert_eq!((panel.x, panel.y), (0, 0));
}

#[test]
fn test_layout_change_moves_open_panel() {
    let mut popover = controller();
    popover.toggle();
    let before = popover.position().unwrap();
    popover.set_layout(Rect::new(60, 0, 4, 1), (40, 20), SCREEN);
    let after = popover.position().unwrap();
    assert_eq!(after.right(), 64);
    assert_ne!(before, after);
}
