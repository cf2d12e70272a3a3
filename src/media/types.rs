use url::Url;

/// Maximum number of items Telegram accepts in one media group.
pub const MEDIA_GROUP_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: Url,
}

impl MediaItem {
    pub fn new(kind: MediaKind, url: Url) -> Self {
        Self { kind, url }
    }
}
