//! Gallery client configuration.
//!
//! The config file is KDL. Every section and value is optional; omitted
//! values fall back to the built-in defaults, which reproduce the stock
//! gallery appearance:
//!
//! ```kdl
//! layout {
//!     max-container-width 1400
//!     single-column-padding 40
//!     multi-column-padding 60
//!     breakpoint max-viewport=480 columns=1 gap=12
//!     breakpoint max-viewport=768 columns=2 gap=12
//!     breakpoint max-viewport=1024 columns=3 gap=14
//!     breakpoint max-viewport=1200 columns=4 gap=16
//!     fallback columns=5 gap=16
//! }
//! cards {
//!     caption-info-height 50
//!     caption-deleted-height 30
//!     folder-preview-height 220
//!     folder-caption-height 60
//!     fallback-extra-height 50
//! }
//! resize {
//!     debounce-ms 300
//! }
//! ```
//!
//! Breakpoint nodes are matched top to bottom against the viewport width;
//! the `fallback` node applies when no `max-viewport` bound matches. An
//! explicit breakpoint list replaces the default table wholesale rather
//! than merging with it.

use std::path::Path;

use miette::{Context, IntoDiagnostic};
use tracing::debug;

#[derive(knuffel::Decode, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[knuffel(child, default)]
    pub layout: LayoutSection,
    #[knuffel(child, default)]
    pub cards: CardsSection,
    #[knuffel(child, default)]
    pub resize: ResizeSection,
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct LayoutSection {
    #[knuffel(child, unwrap(argument), default = Self::default().max_container_width)]
    pub max_container_width: u32,
    #[knuffel(child, unwrap(argument), default = Self::default().single_column_padding)]
    pub single_column_padding: u32,
    #[knuffel(child, unwrap(argument), default = Self::default().multi_column_padding)]
    pub multi_column_padding: u32,
    #[knuffel(children(name = "breakpoint"))]
    pub breakpoints: Vec<Breakpoint>,
    #[knuffel(child, default)]
    pub fallback: FallbackColumns,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            max_container_width: 1400,
            single_column_padding: 40,
            multi_column_padding: 60,
            breakpoints: vec![],
            fallback: FallbackColumns::default(),
        }
    }
}

impl LayoutSection {
    /// The breakpoint table in effect, narrowest bound first.
    ///
    /// An empty `breakpoints` list (no `breakpoint` nodes in the config)
    /// means the default table.
    pub fn breakpoint_table(&self) -> Vec<Breakpoint> {
        let mut table = if self.breakpoints.is_empty() {
            Self::default_breakpoints()
        } else {
            self.breakpoints.clone()
        };
        table.sort_by_key(|bp| bp.max_viewport);
        table
    }

    pub fn default_breakpoints() -> Vec<Breakpoint> {
        vec![
            Breakpoint { max_viewport: 480, columns: 1, gap: 12 },
            Breakpoint { max_viewport: 768, columns: 2, gap: 12 },
            Breakpoint { max_viewport: 1024, columns: 3, gap: 14 },
            Breakpoint { max_viewport: 1200, columns: 4, gap: 16 },
        ]
    }
}

/// One row of the responsive column table.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    /// Inclusive upper bound on the viewport width, in pixels.
    #[knuffel(property)]
    pub max_viewport: u32,
    #[knuffel(property)]
    pub columns: u32,
    #[knuffel(property)]
    pub gap: u32,
}

/// Column count and gap for viewports wider than every breakpoint.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackColumns {
    #[knuffel(property, default = Self::default().columns)]
    pub columns: u32,
    #[knuffel(property, default = Self::default().gap)]
    pub gap: u32,
}

impl Default for FallbackColumns {
    fn default() -> Self {
        Self { columns: 5, gap: 16 }
    }
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct CardsSection {
    /// Height of the filename-and-rating caption under browse-view cards.
    #[knuffel(child, unwrap(argument), default = Self::default().caption_info_height)]
    pub caption_info_height: u32,
    /// Height of the deletion-time caption under recycle-bin cards.
    #[knuffel(child, unwrap(argument), default = Self::default().caption_deleted_height)]
    pub caption_deleted_height: u32,
    #[knuffel(child, unwrap(argument), default = Self::default().folder_preview_height)]
    pub folder_preview_height: u32,
    #[knuffel(child, unwrap(argument), default = Self::default().folder_caption_height)]
    pub folder_caption_height: u32,
    /// Extra height added to the item width for cards that could not be
    /// measured.
    #[knuffel(child, unwrap(argument), default = Self::default().fallback_extra_height)]
    pub fallback_extra_height: u32,
}

impl Default for CardsSection {
    fn default() -> Self {
        Self {
            caption_info_height: 50,
            caption_deleted_height: 30,
            folder_preview_height: 220,
            folder_caption_height: 60,
            fallback_extra_height: 50,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct ResizeSection {
    #[knuffel(child, unwrap(argument), default = Self::default().debounce_ms)]
    pub debounce_ms: u32,
}

impl Default for ResizeSection {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let filename = path.file_name().map(|name| name.to_string_lossy());
        let config = Self::parse(filename.as_deref().unwrap_or("config.kdl"), &contents)
            .map_err(miette::Report::new)?;

        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }
}
