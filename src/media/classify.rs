use super::types::{MediaItem, MediaKind};
use tracing::{debug, warn};
use url::Url;

/// Returns the file extension of the last path component, without the dot.
///
/// Works on the raw locator, so a query string stays part of the extension.
pub fn extension(locator: &str) -> Option<&str> {
    let name = locator.rsplit('/').next().unwrap_or(locator);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Maps a locator to the kind of media it points at. Case-sensitive.
pub fn classify(locator: &str) -> Option<MediaKind> {
    match extension(locator)? {
        "jpg" | "jpeg" | "png" => Some(MediaKind::Photo),
        "mp4" | "mov" => Some(MediaKind::Video),
        "gif" => Some(MediaKind::Animation),
        _ => None,
    }
}

/// Makes a scraper locator absolute by prefixing `https://` when it has no scheme.
pub fn absolutize(locator: &str) -> String {
    if locator.contains("://") {
        locator.to_string()
    } else if let Some(rest) = locator.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{locator}")
    }
}

/// Classifies a raw locator, dropping unsupported kinds and unusable addresses.
pub fn to_media_item(locator: &str) -> Option<MediaItem> {
    let absolute = absolutize(locator);

    let Some(kind) = classify(&absolute) else {
        debug!("Skipping unsupported media: {}", absolute);
        return None;
    };

    match Url::parse(&absolute) {
        Ok(url) => Some(MediaItem::new(kind, url)),
        Err(e) => {
            warn!("Skipping malformed media locator {}: {}", absolute, e);
            None
        }
    }
}
