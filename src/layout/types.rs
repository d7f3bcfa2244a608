//! Shared types used across the layout modules.

use std::fmt;

/// Natural pixel dimensions of a decoded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

impl BitmapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height over width. Zero-sized bitmaps have no usable ratio.
    pub fn aspect(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(f64::from(self.height) / f64::from(self.width))
    }
}

/// Load state of an image card's bitmap at the time a pass begins.
///
/// Loading and failing are terminal, mutually exclusive events; a pass
/// observes each bitmap in exactly one of these states and `Pending` ones
/// are settled through [`Waterfall::resolve_image`].
///
/// [`Waterfall::resolve_image`]: super::Waterfall::resolve_image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapState {
    Loaded(BitmapSize),
    Pending,
    Failed,
}

/// Caption rows carried by a card, which add fixed height under the
/// picture area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caption {
    /// No caption rows.
    None,
    /// Filename and rating rows shown in browse view.
    Info,
    /// Deletion-time row shown in the recycle bin.
    DeletedAt,
}

/// What a layout item is, as far as placement is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemContent {
    /// Folder card with a fixed-height preview area and caption.
    Folder,
    /// Image card whose height follows the bitmap's aspect ratio.
    Image {
        bitmap: BitmapState,
        caption: Caption,
    },
}

/// Absolute position and size assigned to one item by a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge, relative to the container.
    pub x: f64,
    /// Top edge, relative to the container.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Identifies which layout pass an in-flight measurement belongs to.
///
/// Monotonically increasing; measurements settling against anything but
/// the newest generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassGeneration(pub(super) u64);

impl fmt::Display for PassGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why an image bitmap could not be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// The load errored out.
    Failed,
    /// The item carries no bitmap at all.
    MissingBitmap,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "image failed to load"),
            Self::MissingBitmap => write!(f, "item has no bitmap"),
        }
    }
}

impl std::error::Error for LoadError {}
