//! Open/closed state and placement of the floating feed panel.
//!
//! The panel is anchored to the bell. Activating the bell toggles it; a
//! pointer press and release that both land outside the bell and the panel
//! dismisses it. A press that starts inside either one never dismisses, even
//! when released outside.

use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopoverState {
    #[default]
    Closed,
    Open,
}

/// Where a pointer event landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Trigger,
    Panel,
    Outside,
}

impl PointerTarget {
    fn is_inside(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Result of a completed pointer click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// The bell was clicked; the panel is now in this state.
    TriggerActivated(PopoverState),
    /// Click outside closed the panel.
    Dismissed,
}

// ============================================================================
// Placement
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

/// Preferred side of the anchor, with alignment along that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    #[default]
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
    Right,
    RightStart,
    RightEnd,
}

impl Placement {
    pub fn side(self) -> Side {
        match self {
            Self::Top | Self::TopStart | Self::TopEnd => Side::Top,
            Self::Bottom | Self::BottomStart | Self::BottomEnd => Side::Bottom,
            Self::Left | Self::LeftStart | Self::LeftEnd => Side::Left,
            Self::Right | Self::RightStart | Self::RightEnd => Side::Right,
        }
    }

    pub fn align(self) -> Align {
        match self {
            Self::TopStart | Self::BottomStart | Self::LeftStart | Self::RightStart => Align::Start,
            Self::TopEnd | Self::BottomEnd | Self::LeftEnd | Self::RightEnd => Align::End,
            _ => Align::Center,
        }
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let placement = match s.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "top-start" => Self::TopStart,
            "top-end" => Self::TopEnd,
            "bottom" => Self::Bottom,
            "bottom-start" => Self::BottomStart,
            "bottom-end" => Self::BottomEnd,
            "left" => Self::Left,
            "left-start" => Self::LeftStart,
            "left-end" => Self::LeftEnd,
            "right" => Self::Right,
            "right-start" => Self::RightStart,
            "right-end" => Self::RightEnd,
            other => return Err(format!("unknown placement '{}'", other)),
        };
        Ok(placement)
    }
}

/// Panel offset from the anchor, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Shift along the anchor's edge.
    pub skidding: i32,
    /// Gap between anchor and panel.
    pub distance: i32,
}

impl Default for Offset {
    fn default() -> Self {
        Self {
            skidding: 0,
            distance: 1,
        }
    }
}

/// Main-axis start of the panel on `side`, or `None` when it does not fit.
fn main_axis(side: Side, anchor: Rect, size: (u16, u16), screen: Rect, gap: i32) -> Option<i32> {
    let (w, h) = (i32::from(size.0), i32::from(size.1));
    let (pos, fits) = match side {
        Side::Bottom => {
            let y = i32::from(anchor.bottom()) + gap;
            (y, y + h <= i32::from(screen.bottom()))
        }
        Side::Top => {
            let y = i32::from(anchor.y) - gap - h;
            (y, y >= i32::from(screen.y))
        }
        Side::Right => {
            let x = i32::from(anchor.right()) + gap;
            (x, x + w <= i32::from(screen.right()))
        }
        Side::Left => {
            let x = i32::from(anchor.x) - gap - w;
            (x, x >= i32::from(screen.x))
        }
    };
    fits.then_some(pos)
}

fn cross_axis(start: u16, len: u16, panel: u16, align: Align, skidding: i32) -> i32 {
    let (start, len, panel) = (i32::from(start), i32::from(len), i32::from(panel));
    let base = match align {
        Align::Start => start,
        Align::Center => start + len / 2 - panel / 2,
        Align::End => start + len - panel,
    };
    base + skidding
}

fn clamp_axis(pos: i32, len: u16, lo: u16, hi: u16) -> u16 {
    let max = (i32::from(hi) - i32::from(len)).max(i32::from(lo));
    u16::try_from(pos.clamp(i32::from(lo), max)).unwrap_or(lo)
}

/// Place a panel of `size` next to `anchor` inside `screen`.
///
/// Tries the preferred side, then the opposite side; if neither fits the
/// preferred side is kept. The result is clamped inside `screen` and shrunk
/// to it when larger.
pub fn compute_position(
    anchor: Rect,
    size: (u16, u16),
    screen: Rect,
    placement: Placement,
    offset: Offset,
) -> Rect {
    let size = (size.0.min(screen.width), size.1.min(screen.height));
    let preferred = placement.side();
    let (side, main) = match main_axis(preferred, anchor, size, screen, offset.distance) {
        Some(pos) => (preferred, Some(pos)),
        None => {
            let flipped = preferred.opposite();
            match main_axis(flipped, anchor, size, screen, offset.distance) {
                Some(pos) => (flipped, Some(pos)),
                None => (preferred, None),
            }
        }
    };
    let (w, h) = size;
    let (x, y) = match side {
        Side::Top | Side::Bottom => {
            let fallback = if side == Side::Bottom {
                i32::from(anchor.bottom()) + offset.distance
            } else {
                i32::from(anchor.y) - offset.distance - i32::from(h)
            };
            let y = main.unwrap_or(fallback);
            let x = cross_axis(anchor.x, anchor.width, w, placement.align(), offset.skidding);
            (x, y)
        }
        Side::Left | Side::Right => {
            let fallback = if side == Side::Right {
                i32::from(anchor.right()) + offset.distance
            } else {
                i32::from(anchor.x) - offset.distance - i32::from(w)
            };
            let x = main.unwrap_or(fallback);
            let y = cross_axis(anchor.y, anchor.height, h, placement.align(), offset.skidding);
            (x, y)
        }
    };
    Rect {
        x: clamp_axis(x, w, screen.x, screen.right()),
        y: clamp_axis(y, h, screen.y, screen.bottom()),
        width: w,
        height: h,
    }
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    anchor: Rect,
    size: (u16, u16),
    screen: Rect,
}

#[derive(Debug, Clone)]
pub struct PopoverController {
    state: PopoverState,
    placement: Placement,
    offset: Offset,
    mounted: bool,
    /// Where the current press started, if it started while open.
    press: Option<PointerTarget>,
    layout: Option<Layout>,
    position: Option<Rect>,
}

impl PopoverController {
    pub fn new(placement: Placement) -> Self {
        Self {
            state: PopoverState::Closed,
            placement,
            offset: Offset::default(),
            mounted: true,
            press: None,
            layout: None,
            position: None,
        }
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    pub fn state(&self) -> PopoverState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PopoverState::Open
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Current panel rectangle while open.
    pub fn position(&self) -> Option<Rect> {
        if self.is_open() {
            self.position
        } else {
            None
        }
    }

    fn recompute(&mut self) {
        self.position = self.layout.map(|l| {
            compute_position(l.anchor, l.size, l.screen, self.placement, self.offset)
        });
    }

    fn set_state(&mut self, state: PopoverState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.press = None;
        if state == PopoverState::Open {
            self.recompute();
        }
        tracing::debug!(?state, "Popover transition");
    }

    /// Bell activated. Returns the new state.
    pub fn toggle(&mut self) -> PopoverState {
        if !self.mounted {
            return self.state;
        }
        let next = match self.state {
            PopoverState::Closed => PopoverState::Open,
            PopoverState::Open => PopoverState::Closed,
        };
        self.set_state(next);
        self.state
    }

    pub fn close(&mut self) {
        if self.mounted {
            self.set_state(PopoverState::Closed);
        }
    }

    /// Report anchor, desired panel size and screen bounds. Recomputes the
    /// panel position when open and anything changed.
    pub fn set_layout(&mut self, anchor: Rect, size: (u16, u16), screen: Rect) {
        let layout = Layout {
            anchor,
            size,
            screen,
        };
        if self.layout == Some(layout) {
            return;
        }
        self.layout = Some(layout);
        if self.is_open() {
            self.recompute();
        }
    }

    /// Classify a cell against the bell and the open panel.
    pub fn hit_test(&self, column: u16, row: u16) -> PointerTarget {
        let contains = |r: Rect| {
            column >= r.x && column < r.right() && row >= r.y && row < r.bottom()
        };
        if self.layout.is_some_and(|l| contains(l.anchor)) {
            PointerTarget::Trigger
        } else if self.position().is_some_and(contains) {
            PointerTarget::Panel
        } else {
            PointerTarget::Outside
        }
    }

    pub fn pointer_down(&mut self, target: PointerTarget) {
        if !self.mounted {
            return;
        }
        // A press only counts when the panel was open at press time
        self.press = match self.state {
            PopoverState::Open => Some(target),
            PopoverState::Closed if target == PointerTarget::Trigger => Some(target),
            PopoverState::Closed => None,
        };
    }

    pub fn pointer_up(&mut self, target: PointerTarget) -> Option<PointerOutcome> {
        if !self.mounted {
            return None;
        }
        let press = self.press.take()?;
        if press == PointerTarget::Trigger && target == PointerTarget::Trigger {
            return Some(PointerOutcome::TriggerActivated(self.toggle()));
        }
        if self.is_open() && !press.is_inside() && !target.is_inside() {
            self.set_state(PopoverState::Closed);
            return Some(PointerOutcome::Dismissed);
        }
        None
    }

    /// Stop reacting to input. The panel is closed and listeners released.
    pub fn unmount(&mut self) {
        self.state = PopoverState::Closed;
        self.press = None;
        self.position = None;
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl Default for PopoverController {
    fn default() -> Self {
        Self::new(Placement::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn bell_top_right() -> Rect {
        Rect::new(76, 0, 3, 1)
    }

    #[test]
    fn test_placement_parse() {
        assert_eq!("bottom-end".parse::<Placement>(), Ok(Placement::BottomEnd));
        assert_eq!("TOP".parse::<Placement>(), Ok(Placement::Top));
        assert!("middle".parse::<Placement>().is_err());
    }

    #[test]
    fn test_bottom_position_clamped_to_screen() {
        let rect = compute_position(
            bell_top_right(),
            (40, 10),
            SCREEN,
            Placement::Bottom,
            Offset::default(),
        );
        // One cell below the bell, pushed left to stay on screen
        assert_eq!(rect, Rect::new(40, 2, 40, 10));
    }

    #[test]
    fn test_flips_to_top_without_room_below() {
        let anchor = Rect::new(10, 20, 3, 1);
        let rect = compute_position(anchor, (20, 8), SCREEN, Placement::Bottom, Offset::default());
        assert_eq!(rect.y, 11);
        assert_eq!(rect.x, 1);
    }

    #[test]
    fn test_oversized_panel_shrinks() {
        let rect = compute_position(
            bell_top_right(),
            (200, 100),
            SCREEN,
            Placement::Bottom,
            Offset::default(),
        );
        assert_eq!(rect, SCREEN);
    }

    #[test]
    fn test_start_and_end_alignment() {
        let anchor = Rect::new(30, 2, 4, 1);
        let start = compute_position(anchor, (10, 5), SCREEN, Placement::BottomStart, Offset::default());
        let end = compute_position(anchor, (10, 5), SCREEN, Placement::BottomEnd, Offset::default());
        assert_eq!(start.x, 30);
        assert_eq!(end.x, 24);
    }

    fn open_controller() -> PopoverController {
        let mut popover = PopoverController::default();
        popover.set_layout(bell_top_right(), (40, 10), SCREEN);
        assert_eq!(popover.toggle(), PopoverState::Open);
        popover
    }

    #[test]
    fn test_trigger_toggles() {
        let mut popover = PopoverController::default();
        popover.pointer_down(PointerTarget::Trigger);
        assert_eq!(
            popover.pointer_up(PointerTarget::Trigger),
            Some(PointerOutcome::TriggerActivated(PopoverState::Open))
        );
        popover.pointer_down(PointerTarget::Trigger);
        assert_eq!(
            popover.pointer_up(PointerTarget::Trigger),
            Some(PointerOutcome::TriggerActivated(PopoverState::Closed))
        );
    }

    #[test]
    fn test_inside_click_stays_open() {
        let mut popover = open_controller();
        popover.pointer_down(PointerTarget::Panel);
        assert_eq!(popover.pointer_up(PointerTarget::Panel), None);
        assert!(popover.is_open());
    }

    #[test]
    fn test_press_inside_release_outside_stays_open() {
        let mut popover = open_controller();
        popover.pointer_down(PointerTarget::Panel);
        assert_eq!(popover.pointer_up(PointerTarget::Outside), None);
        assert!(popover.is_open());
    }

    #[test]
    fn test_outside_click_dismisses() {
        let mut popover = open_controller();
        popover.pointer_down(PointerTarget::Outside);
        assert_eq!(
            popover.pointer_up(PointerTarget::Outside),
            Some(PointerOutcome::Dismissed)
        );
        assert!(!popover.is_open());
        assert_eq!(popover.position(), None);
    }

    #[test]
    fn test_hit_test() {
        let popover = open_controller();
        assert_eq!(popover.hit_test(77, 0), PointerTarget::Trigger);
        assert_eq!(popover.hit_test(50, 5), PointerTarget::Panel);
        assert_eq!(popover.hit_test(5, 20), PointerTarget::Outside);
    }

    #[test]
    fn test_layout_change_recomputes_when_open() {
        let mut popover = open_controller();
        let before = popover.position();
        popover.set_layout(Rect::new(0, 0, 3, 1), (40, 10), SCREEN);
        assert_ne!(popover.position(), before);
        assert_eq!(popover.position().map(|r| r.x), Some(0));
    }

    #[test]
    fn test_unmounted_ignores_input() {
        let mut popover = open_controller();
        popover.unmount();
        assert_eq!(popover.toggle(), PopoverState::Closed);
        popover.pointer_down(PointerTarget::Trigger);
        assert_eq!(popover.pointer_up(PointerTarget::Trigger), None);
    }
}
