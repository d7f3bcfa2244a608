//! Types of the gallery backend REST payloads.
//!
//! The client talks to the backend over a handful of JSON endpoints:
//! directory browsing, recycle-bin listing, metadata retrieval and rating
//! updates. This crate holds the serde model of those payloads so the rest
//! of the workspace never touches raw JSON.

#![warn(missing_docs)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of the directory browse endpoint.
///
/// Subdirectories are always returned in full; images are paginated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseResponse {
    /// Child folders of the requested directory.
    pub subdirectories: Vec<FolderEntry>,
    /// Images on the requested page, in the requested sort order.
    pub images: Vec<ImageEntry>,
    /// Total image count in the directory before pagination.
    pub total: u64,
    /// 1-based page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub per_page: u32,
    /// Total page count for `per_page`.
    pub total_pages: u32,
    /// Absolute path of the directory that was listed.
    pub current_directory: String,
}

/// One child folder in a browse response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Folder basename.
    pub name: String,
    /// Absolute folder path.
    pub path: String,
    /// Number of images directly inside the folder.
    pub image_count: u64,
    /// Path of the image used as the folder preview, if any. The backend
    /// falls back to an image from a subdirectory when the folder itself
    /// holds none.
    #[serde(default)]
    pub preview_image: Option<String>,
}

/// One image in a browse response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Absolute path of the displayed file.
    pub file_path: String,
    /// Path relative to the listed directory.
    pub relative_path: String,
    /// Cached metadata for the file.
    pub metadata: ImageMetadata,
    /// Whether a RAW sibling of this file exists.
    #[serde(default)]
    pub has_raw: bool,
    /// Whether a JPEG sibling of this file exists.
    #[serde(default)]
    pub has_jpg: bool,
}

/// Metadata the backend extracts and caches per image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// File basename.
    pub filename: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Modification time, seconds since the epoch.
    pub modified_time: f64,
    /// Star rating, 0 to 5.
    #[serde(default)]
    pub rating: u8,
    /// Raw EXIF tags, stringified by the backend.
    #[serde(default)]
    pub exif: HashMap<String, String>,
}

impl ImageMetadata {
    /// EXIF capture time, used by the date sort order.
    pub fn exif_datetime(&self) -> Option<&str> {
        self.exif.get("DateTime").map(String::as_str)
    }

    /// Natural pixel dimensions, when the EXIF tags carry them.
    ///
    /// The backend stringifies every tag, so the values are parsed back
    /// here. Zero dimensions are treated as absent.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        let parse = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| self.exif.get(*key))
                .and_then(|value| value.parse::<u32>().ok())
        };

        let width = parse(&["ExifImageWidth", "ImageWidth"])?;
        let height = parse(&["ExifImageHeight", "ImageLength"])?;
        (width > 0 && height > 0).then_some((width, height))
    }
}

/// Response of the recycle-bin listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashResponse {
    /// Deleted images, most recently deleted first.
    pub images: Vec<TrashEntry>,
    /// Total count of entries in the recycle bin.
    pub total: u64,
}

/// One deleted image in the recycle bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashEntry {
    /// The image as it was listed before deletion.
    #[serde(flatten)]
    pub entry: ImageEntry,
    /// Deletion time, seconds since the epoch.
    pub deleted_at: f64,
    /// Directory the image was deleted from, for restore.
    pub original_directory: String,
}

/// Sort key of the browse endpoint, `sort_by` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// By filename.
    #[default]
    Name,
    /// By EXIF capture time.
    Date,
    /// By star rating.
    Rating,
    /// By file modification time.
    Modified,
}

/// Sort direction of the browse endpoint, `sort_order` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Body of the rating update endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRating {
    /// Absolute path of the image to rate.
    pub file_path: String,
    /// New star rating, 0 to 5. Zero clears the rating.
    pub rating: u8,
}
