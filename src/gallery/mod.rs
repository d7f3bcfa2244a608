//! From backend listings to layout items.
//!
//! A browse response renders as folder cards followed by image cards; a
//! recycle-bin response renders as image cards only. The caption under a
//! card depends on the view: browse cards show filename and rating,
//! recycle-bin cards show when the image was deleted. Those captions have
//! different fixed heights, which is all the layout engine cares about.
//!
//! Image dimensions often ride along in the listing's EXIF metadata, in
//! which case a card is measurable before its thumbnail ever loads. Cards
//! without known dimensions defer to a thumbnail loader injected by the
//! embedder; a card with neither dimensions nor a loader counts as a failed
//! load and takes the fallback height.

use std::fmt;
use std::rc::Rc;

use cascade_api::{BrowseResponse, FolderEntry, ImageEntry, SortBy, SortOrder, TrashResponse};
use futures_util::future::{ready, LocalBoxFuture};
use futures_util::FutureExt;

use crate::layout::{BitmapSize, BitmapState, Caption, ItemContent, LayoutItem, LoadError};
use crate::runtime::ImageSource;


/// Which listing the grid is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Browse,
    RecycleBin,
}

impl ViewMode {
    fn image_caption(self) -> Caption {
        match self {
            Self::Browse => Caption::Info,
            Self::RecycleBin => Caption::DeletedAt,
        }
    }
}

/// Fetches the natural size of an image's thumbnail by path.
pub type ThumbnailLoader =
    Rc<dyn Fn(&str) -> LocalBoxFuture<'static, Result<BitmapSize, LoadError>>>;

/// One card in the grid, backed by a listing entry.
#[derive(Clone)]
pub struct GalleryCard {
    /// Backend path of the entry, unique within a listing.
    path: String,
    content: ItemContent,
    loader: Option<ThumbnailLoader>,
}

impl fmt::Debug for GalleryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryCard")
            .field("path", &self.path)
            .field("content", &self.content)
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

impl GalleryCard {
    pub fn folder(entry: &FolderEntry) -> Self {
        Self {
            path: entry.path.clone(),
            content: ItemContent::Folder,
            loader: None,
        }
    }

    pub fn image(entry: &ImageEntry, mode: ViewMode, loader: Option<ThumbnailLoader>) -> Self {
        let bitmap = match entry.metadata.pixel_size() {
            Some((width, height)) => BitmapState::Loaded(BitmapSize::new(width, height)),
            None => BitmapState::Pending,
        };

        Self {
            path: entry.file_path.clone(),
            content: ItemContent::Image {
                bitmap,
                caption: mode.image_caption(),
            },
            loader,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LayoutItem for GalleryCard {
    type Id = String;

    fn id(&self) -> &String {
        &self.path
    }

    fn content(&self) -> ItemContent {
        self.content
    }
}

impl ImageSource for GalleryCard {
    fn decoded(&self) -> LocalBoxFuture<'static, Result<BitmapSize, LoadError>> {
        match self.content {
            ItemContent::Image { bitmap: BitmapState::Loaded(size), .. } => {
                ready(Ok(size)).boxed_local()
            }
            ItemContent::Image { bitmap: BitmapState::Pending, .. } => match &self.loader {
                Some(loader) => loader(&self.path),
                None => ready(Err(LoadError::MissingBitmap)).boxed_local(),
            },
            ItemContent::Image { bitmap: BitmapState::Failed, .. } => {
                ready(Err(LoadError::Failed)).boxed_local()
            }
            ItemContent::Folder => ready(Err(LoadError::MissingBitmap)).boxed_local(),
        }
    }
}

/// Cards for a browse listing, in render order: folders first, then the
/// page's images.
pub fn browse_cards(
    response: &BrowseResponse,
    loader: Option<ThumbnailLoader>,
) -> Vec<GalleryCard> {
    let folders = response.subdirectories.iter().map(GalleryCard::folder);
    let images = response
        .images
        .iter()
        .map(|entry| GalleryCard::image(entry, ViewMode::Browse, loader.clone()));
    folders.chain(images).collect()
}

/// Cards for a recycle-bin listing.
pub fn trash_cards(
    response: &TrashResponse,
    loader: Option<ThumbnailLoader>,
) -> Vec<GalleryCard> {
    response
        .images
        .iter()
        .map(|trashed| GalleryCard::image(&trashed.entry, ViewMode::RecycleBin, loader.clone()))
        .collect()
}

/// Reorders images the way the backend does, for client-side re-sorts
/// that skip a refetch.
///
/// The sort is stable, so equal keys keep their listing order. Images
/// without an EXIF capture time sort before dated ones under `Date`.
pub fn sort_images(images: &mut [ImageEntry], sort_by: SortBy, order: SortOrder) {
    images.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Name => a.metadata.filename.cmp(&b.metadata.filename),
            SortBy::Date => a
                .metadata
                .exif_datetime()
                .unwrap_or("")
                .cmp(b.metadata.exif_datetime().unwrap_or("")),
            SortBy::Rating => a.metadata.rating.cmp(&b.metadata.rating),
            SortBy::Modified => a.metadata.modified_time.total_cmp(&b.metadata.modified_time),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// The slice of `items` on a 1-based page, or an empty slice past the end.
pub fn page_slice<T>(items: &[T], page: u32, per_page: u32) -> &[T] {
    let start = (page.max(1) as usize - 1).saturating_mul(per_page as usize);
    let end = start.saturating_add(per_page as usize);
    if start >= items.len() {
        return &[];
    }
    &items[start..end.min(items.len())]
}

/// How many pages `total` items make at `per_page`.
pub fn total_pages(total: usize, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as usize;
    (total.div_ceil(per_page)) as u32
}
