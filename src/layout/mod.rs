//! Waterfall card layout logic.
//!
//! The gallery shows a directory listing as a masonry grid: fixed-width
//! cards of varying height packed into columns, each new card going to the
//! currently shortest column so the columns stay balanced. Card heights are
//! awkward because image cards don't know their height until the bitmap has
//! loaded, which can be long after the grid is first laid out.
//!
//! The engine deals with that by working in *passes*. A pass snapshots the
//! ordered item sequence, derives the column sizing from the viewport width
//! and assigns every item a position. Folder cards and already-settled
//! images measure immediately; still-loading images leave a hole that is
//! filled when their load-or-error event arrives. Placement, unlike
//! measurement, is serialized: items commit strictly in document order, one
//! at a time, so the shortest-column choice always sees fully up-to-date
//! column heights and the resulting geometry is reproducible no matter in
//! which order the bitmaps settle.
//!
//! Passes are throwaway values. Navigating, switching views or resizing
//! starts a fresh pass with fresh column heights; nothing layout-related
//! survives from one pass to the next. In-flight measurements from an
//! abandoned pass are not cancelled, they are discarded on arrival by
//! comparing their generation token against the live pass.

use std::rc::Rc;
use std::time::Duration;

use cascade_config::Config;
use tracing::{debug, trace, warn};

pub mod columns;
mod pass;
pub mod sizing;
pub mod types;

#[cfg(test)]
mod tests;

pub use pass::LayoutPass;
use sizing::{Breakpoint, LayoutConfig};
pub use types::{
    BitmapSize, BitmapState, Caption, ItemContent, LoadError, PassGeneration, Placement,
};

/// One positionable unit in the grid.
///
/// Implementations describe what the card is; the engine computes where it
/// goes. Items are immutable for the duration of a pass.
pub trait LayoutItem {
    /// Type that can be used as a unique ID of this item.
    type Id: PartialEq + std::fmt::Debug + Clone;

    /// Unique ID of this item.
    fn id(&self) -> &Self::Id;

    /// The card's content classification.
    fn content(&self) -> ItemContent;
}

/// Configurable properties of the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Cap on the effective container width.
    pub max_container_width: f64,
    /// Side padding allowance in single-column layouts.
    pub single_column_padding: f64,
    /// Total side padding allowance in multi-column layouts.
    pub multi_column_padding: f64,
    /// Column table, narrowest inclusive bound first.
    pub breakpoints: Vec<Breakpoint>,
    /// Columns for viewports wider than every breakpoint.
    pub fallback_columns: usize,
    /// Gap for viewports wider than every breakpoint.
    pub fallback_gap: f64,
    /// Height of the filename-and-rating caption.
    pub caption_info_height: f64,
    /// Height of the deletion-time caption.
    pub caption_deleted_height: f64,
    pub folder_preview_height: f64,
    pub folder_caption_height: f64,
    /// Extra height over the card width for unmeasurable cards.
    pub fallback_extra_height: f64,
    /// Quiet period before a resize triggers a relayout.
    pub resize_debounce: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let layout = &config.layout;
        let cards = &config.cards;

        let breakpoints = layout
            .breakpoint_table()
            .iter()
            .map(|bp| Breakpoint {
                max_viewport: f64::from(bp.max_viewport),
                columns: bp.columns.max(1) as usize,
                gap: f64::from(bp.gap),
            })
            .collect();

        Self {
            max_container_width: f64::from(layout.max_container_width),
            single_column_padding: f64::from(layout.single_column_padding),
            multi_column_padding: f64::from(layout.multi_column_padding),
            breakpoints,
            fallback_columns: layout.fallback.columns.max(1) as usize,
            fallback_gap: f64::from(layout.fallback.gap),
            caption_info_height: f64::from(cards.caption_info_height),
            caption_deleted_height: f64::from(cards.caption_deleted_height),
            folder_preview_height: f64::from(cards.folder_preview_height),
            folder_caption_height: f64::from(cards.folder_caption_height),
            fallback_extra_height: f64::from(cards.fallback_extra_height),
            resize_debounce: Duration::from_millis(u64::from(config.resize.debounce_ms)),
        }
    }

    /// Column count and gap for a viewport width.
    pub(crate) fn columns_for(&self, viewport_width: f64) -> (usize, f64) {
        for bp in &self.breakpoints {
            if viewport_width <= bp.max_viewport {
                return (bp.columns, bp.gap);
            }
        }
        (self.fallback_columns, self.fallback_gap)
    }

    pub(crate) fn caption_height(&self, caption: Caption) -> f64 {
        match caption {
            Caption::None => 0.,
            Caption::Info => self.caption_info_height,
            Caption::DeletedAt => self.caption_deleted_height,
        }
    }

    pub(crate) fn folder_height(&self) -> f64 {
        self.folder_preview_height + self.folder_caption_height
    }

    pub(crate) fn fallback_height(&self, item_width: f64) -> f64 {
        item_width + self.fallback_extra_height
    }
}

/// Outcome of delivering one settled measurement to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The measurement belonged to a superseded pass and was discarded.
    Stale,
    /// The live pass holds no item with that ID.
    UnknownItem,
    /// The measurement was recorded.
    Measured {
        /// Whether this measurement completed the pass.
        pass_complete: bool,
    },
}

/// The waterfall layout engine.
///
/// Owns the current item sequence and at most one live pass. All methods
/// are synchronous; asynchronous image loading lives in the runtime, which
/// calls [`Waterfall::resolve_image`] as bitmaps settle.
#[derive(Debug)]
pub struct Waterfall<W: LayoutItem> {
    options: Rc<Options>,
    items: Vec<W>,
    /// Generation of the newest pass ever begun.
    generation: u64,
    pass: Option<LayoutPass<W::Id>>,
}

impl<W: LayoutItem> Waterfall<W> {
    pub fn new(options: Rc<Options>) -> Self {
        Self {
            options,
            items: Vec::new(),
            generation: 0,
            pass: None,
        }
    }

    pub fn options(&self) -> &Rc<Options> {
        &self.options
    }

    pub fn items(&self) -> &[W] {
        &self.items
    }

    /// Replaces the item sequence, dropping any live pass.
    ///
    /// The caller is expected to begin a fresh pass afterwards; stale
    /// measurements from the dropped pass will be discarded by generation.
    pub fn set_items(&mut self, items: Vec<W>) {
        self.items = items;
        self.pass = None;
    }

    /// Starts a fresh layout pass against the current viewport width.
    ///
    /// Supersedes any pass still in flight. Items measurable up front are
    /// placed before this returns; the rest wait on
    /// [`Waterfall::resolve_image`].
    pub fn begin_pass(&mut self, viewport_width: f64) -> PassGeneration {
        self.generation += 1;
        let generation = PassGeneration(self.generation);

        let config = LayoutConfig::compute(viewport_width, &self.options);
        debug!(
            "pass {generation}: {} items, {} columns of {} px",
            self.items.len(),
            config.columns,
            config.item_width,
        );

        let pass = LayoutPass::new(generation, config, self.options.clone(), &self.items);
        self.pass = Some(pass);
        generation
    }

    /// The live pass, if any.
    pub fn pass(&self) -> Option<&LayoutPass<W::Id>> {
        self.pass.as_ref()
    }

    /// Delivers a settled bitmap measurement.
    ///
    /// `generation` is the token returned by the [`Waterfall::begin_pass`]
    /// that scheduled the load; outcomes from superseded passes are
    /// discarded so they cannot corrupt the live pass's column heights.
    pub fn resolve_image(
        &mut self,
        generation: PassGeneration,
        id: &W::Id,
        outcome: Result<BitmapSize, LoadError>,
    ) -> Resolution {
        let Some(pass) = &mut self.pass else {
            trace!("discarding measurement {generation} with no live pass");
            return Resolution::Stale;
        };

        if pass.generation() != generation {
            trace!(
                "discarding measurement {generation} superseded by pass {}",
                pass.generation(),
            );
            return Resolution::Stale;
        }

        if !pass.resolve(id, outcome) {
            warn!("measurement {generation} for unknown item {id:?}");
            return Resolution::UnknownItem;
        }

        Resolution::Measured {
            pass_complete: pass.is_complete(),
        }
    }
}
