//! Viewport policy: swarm capacity, font ranges, overlay display fit.
//!
//! The host owns the container; the engine only reads its bounding box and
//! reacts to resize notifications. Everything here is a pure function of
//! that box, so resize handling stays trivially re-entrant.

use std::ops::RangeInclusive;

/// Host container bounding box in logical pixels (or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A container that hasn't been laid out yet measures as zero; resize
    /// handling treats it as a logged no-op.
    pub fn is_measurable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Maximum concurrently live flying items for a viewport width.
///
/// Narrow viewports carry fewer items so the wall stays readable. Recomputed
/// on resize and applied to subsequent spawns only — live items are never
/// evicted.
pub fn swarm_capacity(width: u32) -> usize {
    if width <= 480 {
        15
    } else if width <= 768 {
        18
    } else {
        20
    }
}

/// Font-size range rolled per spawn, narrower on small widths.
pub fn font_size_range(width: u32) -> RangeInclusive<u32> {
    if width <= 480 {
        14..=28
    } else if width <= 768 {
        15..=34
    } else {
        16..=42
    }
}

/// Overlay aspect ratio (width / height).
pub const OVERLAY_ASPECT: f64 = 4.0 / 3.0;

/// Smallest legible cell size; the fit never goes below this.
pub const MIN_CELL_SIZE: f64 = 6.0;

/// Derived overlay geometry for one container box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    /// Fitted overlay width.
    pub width: f64,
    /// Fitted overlay height.
    pub height: f64,
    /// Cell (font) size for the character grid.
    pub cell_size: f64,
}

/// Fit a fixed 4:3 overlay into `container`, deriving the cell size from the
/// grid column count. Returns `None` for an unmeasurable container.
pub fn fit_display(container: Viewport, grid_cols: u32) -> Option<DisplayScale> {
    if !container.is_measurable() || grid_cols == 0 {
        return None;
    }

    let cw = container.width as f64;
    let ch = container.height as f64;

    let mut width = cw;
    let mut height = cw / OVERLAY_ASPECT;
    if height > ch {
        height = ch;
        width = height * OVERLAY_ASPECT;
    }

    let cell_size = (width / grid_cols as f64).max(MIN_CELL_SIZE);
    Some(DisplayScale {
        width,
        height,
        cell_size,
    })
}
