mod classify;
mod gallery_dl;
mod source;
mod types;

pub use gallery_dl::{GalleryDlSource, DEFAULT_PROGRAM};
pub use source::MediaSource;
pub use types::{MediaItem, MediaKind, MEDIA_GROUP_LIMIT};

use crate::utils::chunk;
use classify::to_media_item;

/// Classifies scraper locators and groups them for delivery.
///
/// At most `limit` locators are considered. Unsupported or malformed ones are
/// dropped, and the rest are split into media groups of at most
/// [`MEDIA_GROUP_LIMIT`] items, keeping the scraper's order.
pub fn build_batches(locators: &[String], limit: usize) -> Vec<Vec<MediaItem>> {
    let items: Vec<MediaItem> = locators
        .iter()
        .take(limit)
        .filter_map(|locator| to_media_item(locator))
        .collect();

    chunk(items, MEDIA_GROUP_LIMIT)
}
