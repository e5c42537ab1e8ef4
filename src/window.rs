//! Row-windowing arithmetic for the thumbnail grid.
//!
//! Only the rows that intersect the viewport, plus a small lookahead buffer,
//! are drawn; the rest of the scroll height is empty space.

use std::ops::Range;

/// Fixed per-row height estimate, including the gap between rows.
pub const ROW_HEIGHT: f32 = 280.0;
/// Extra rows drawn past the last row that starts inside the viewport.
pub const BUFFER_ROWS: usize = 1;
/// Below this width the grid drops windowing and lays everything out.
pub const SMALL_VIEWPORT_WIDTH: f32 = 640.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub column_count: usize,
    pub row_height: f32,
}

impl GridMetrics {
    /// Responsive column count: 2, then 3 from 768 px, 4 from 1024 px.
    pub fn for_width(width: f32) -> Self {
        let column_count = if width >= 1024.0 {
            4
        } else if width >= 768.0 {
            3
        } else {
            2
        };
        Self {
            column_count,
            row_height: ROW_HEIGHT,
        }
    }

    fn usable(&self) -> bool {
        self.column_count > 0 && self.row_height.is_finite() && self.row_height > 0.0
    }

    pub fn total_rows(&self, len: usize) -> usize {
        if self.column_count == 0 {
            return 0;
        }
        len.div_ceil(self.column_count)
    }

    /// Height of the full, mostly empty, scroll content.
    pub fn total_height(&self, len: usize) -> f32 {
        self.total_rows(len) as f32 * self.row_height
    }
}

/// Half-open index interval into the filtered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Vertical translation of the drawn block inside the full-height content.
    pub fn offset_y(&self, metrics: &GridMetrics) -> f32 {
        if !metrics.usable() {
            return 0.0;
        }
        (self.start / metrics.column_count) as f32 * metrics.row_height
    }

    /// Items just past the window whose bytes are fetched ahead of time.
    pub fn prefetch_range(&self, len: usize, metrics: &GridMetrics) -> Range<usize> {
        let start = self.end.min(len);
        let end = (self.end + 2 * metrics.column_count).min(len);
        start..end
    }
}

/// Computes which items a viewport at `scroll_offset` needs drawn.
///
/// Returns an empty range when the dimensions are not known yet.
pub fn visible_range(
    scroll_offset: f32,
    viewport_height: f32,
    metrics: &GridMetrics,
    len: usize,
) -> VisibleRange {
    if !metrics.usable() || !viewport_height.is_finite() || viewport_height <= 0.0 {
        return VisibleRange::default();
    }
    let scroll_offset = if scroll_offset.is_finite() {
        scroll_offset.max(0.0)
    } else {
        0.0
    };

    let total_rows = metrics.total_rows(len);
    let start_row = ((scroll_offset / metrics.row_height).floor() as usize).min(total_rows);
    let rows_in_view = (viewport_height / metrics.row_height).ceil() as usize;
    let end_row = (start_row + rows_in_view + BUFFER_ROWS).min(total_rows);

    let start = (start_row * metrics.column_count).min(len);
    let end = (end_row * metrics.column_count).min(len);
    VisibleRange { start, end }
}

/// A scroll position and viewport size observed during a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub offset: f32,
    pub viewport_height: f32,
}

/// Single-slot holder for the next window recomputation.
///
/// A newer request replaces an unconsumed one; nothing is queued.
#[derive(Debug, Default)]
pub struct PendingRecompute {
    slot: Option<ScrollSample>,
}

impl PendingRecompute {
    pub fn request(&mut self, sample: ScrollSample) {
        self.slot = Some(sample);
    }

    pub fn take(&mut self) -> Option<ScrollSample> {
        self.slot.take()
    }
}
