//! Responsive column sizing.
//!
//! The container adapts to the viewport through a small breakpoint table:
//! narrow viewports get a single wide column, wide viewports get up to five.
//! The resolved [`LayoutConfig`] is recomputed from scratch on every pass
//! and is a pure function of the viewport width and the options.

use super::Options;

/// One row of the resolved breakpoint table.
///
/// Matched against the viewport width, inclusive upper bound, narrowest
/// row first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub max_viewport: f64,
    pub columns: usize,
    pub gap: f64,
}

/// Sizing derived for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Number of columns, at least 1.
    pub columns: usize,
    /// Card width in whole pixels.
    ///
    /// Floored, never ceiled: a card a fraction of a pixel too wide would
    /// overflow the container.
    pub item_width: f64,
    /// Horizontal and vertical spacing between cards.
    pub gap: f64,
    /// Effective container width after the maximum-width cap.
    pub container_width: f64,
}

impl LayoutConfig {
    pub fn compute(viewport_width: f64, options: &Options) -> Self {
        let container_width = viewport_width.min(options.max_container_width);
        let (columns, gap) = options.columns_for(viewport_width);

        let item_width = if columns == 1 {
            container_width - options.single_column_padding
        } else {
            let gaps = (columns - 1) as f64 * gap;
            (container_width - options.multi_column_padding - gaps) / columns as f64
        };
        let item_width = item_width.floor().max(1.);

        Self {
            columns,
            item_width,
            gap,
            container_width,
        }
    }

    /// Horizontal span actually occupied by the columns.
    pub fn used_width(&self) -> f64 {
        self.columns as f64 * self.item_width + (self.columns - 1) as f64 * self.gap
    }
}
