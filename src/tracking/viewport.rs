//! Scroll and visibility geometry for the notification list.
//!
//! Units are terminal rows. Row extents are in content coordinates (row 0 is
//! the top of the first card); the viewport is the window
//! `[scroll_top, scroll_top + client_height)` over that content.

/// Vertical extent of one rendered row in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowExtent {
    pub top: u32,
    pub height: u32,
}

impl RowExtent {
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Scroll state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub client_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    /// True once the bottom of the viewport reaches `fraction` of the content.
    pub fn reached(&self, fraction: f64) -> bool {
        let position = f64::from(self.scroll_top) + f64::from(self.client_height);
        position >= f64::from(self.scroll_height) * fraction
    }

    /// True when the content does not overflow the viewport.
    pub fn fits_viewport(&self) -> bool {
        self.scroll_height <= self.client_height
    }

    /// Largest valid `scroll_top` for this content.
    pub fn max_scroll_top(&self) -> u32 {
        self.scroll_height.saturating_sub(self.client_height)
    }
}

/// Fraction of `row` inside the viewport, in `0.0..=1.0`. Zero root margin.
pub fn visible_ratio(row: RowExtent, metrics: &ScrollMetrics) -> f64 {
    if row.height == 0 {
        return 0.0;
    }
    let view_top = metrics.scroll_top;
    let view_bottom = metrics.scroll_top.saturating_add(metrics.client_height);
    let top = row.top.max(view_top);
    let bottom = row.bottom().min(view_bottom);
    if bottom <= top {
        return 0.0;
    }
    f64::from(bottom - top) / f64::from(row.height)
}

/// True when any part of `row` is inside the viewport.
pub fn intersects(row: RowExtent, metrics: &ScrollMetrics) -> bool {
    visible_ratio(row, metrics) > 0.0
}

/// Lay rows of the given heights out top to bottom.
pub fn stack(heights: impl IntoIterator<Item = u32>) -> Vec<RowExtent> {
    let mut top = 0u32;
    heights
        .into_iter()
        .map(|height| {
            let row = RowExtent { top, height };
            top = top.saturating_add(height);
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: u32, client_height: u32, scroll_height: u32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    #[test]
    fn test_ratio_fully_inside() {
        let row = RowExtent { top: 2, height: 4 };
        assert_eq!(visible_ratio(row, &metrics(0, 10, 40)), 1.0);
    }

    #[test]
    fn test_ratio_partially_clipped() {
        let row = RowExtent { top: 8, height: 4 };
        assert_eq!(visible_ratio(row, &metrics(0, 10, 40)), 0.5);
    }

    #[test]
    fn test_ratio_outside() {
        let row = RowExtent { top: 12, height: 4 };
        assert_eq!(visible_ratio(row, &metrics(0, 10, 40)), 0.0);
        assert!(!intersects(row, &metrics(0, 10, 40)));
        assert!(intersects(row, &metrics(5, 10, 40)));
    }

    #[test]
    fn test_ratio_zero_height() {
        let row = RowExtent { top: 1, height: 0 };
        assert_eq!(visible_ratio(row, &metrics(0, 10, 40)), 0.0);
    }

    #[test]
    fn test_reached_threshold() {
        // 30 + 10 = 40 >= 0.8 * 50
        assert!(metrics(30, 10, 50).reached(0.8));
        assert!(!metrics(29, 10, 50).reached(0.8));
    }

    #[test]
    fn test_fits_viewport() {
        assert!(metrics(0, 20, 20).fits_viewport());
        assert!(!metrics(0, 20, 21).fits_viewport());
        assert_eq!(metrics(0, 20, 50).max_scroll_top(), 30);
    }

    #[test]
    fn test_stack() {
        let rows = stack([3, 5, 2]);
        assert_eq!(rows[1], RowExtent { top: 3, height: 5 });
        assert_eq!(rows[2].bottom(), 10);
    }
}
