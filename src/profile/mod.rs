use std::fmt;
use url::Url;

/// Host serving public VSCO profiles.
pub const MEDIA_HOST: &str = "vsco.co";

/// A validated VSCO profile name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileHandle(String);

impl ProfileHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn gallery_url(&self) -> String {
        format!("https://{}/{}/gallery", MEDIA_HOST, self.as_str())
    }
}

impl fmt::Display for ProfileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// An absolute URL that does not point at a VSCO profile.
    InvalidLink,
    /// Plain text that is not a valid profile name.
    InvalidUsername,
}

fn is_handle(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Turns the text of an inbound message into a profile handle.
///
/// Absolute URLs are accepted only for the VSCO host, taking the first path
/// segment as the handle. Anything else has to be a bare handle.
pub fn resolve(text: &str) -> Result<ProfileHandle, Rejection> {
    if let Ok(url) = Url::parse(text) {
        if let Some(host) = url.host_str() {
            if host != MEDIA_HOST {
                return Err(Rejection::InvalidLink);
            }

            let segment = url
                .path_segments()
                .and_then(|mut segments| segments.next())
                .unwrap_or("");

            // The segment ends up in the scraper's URL, so it has to be a handle too.
            if !is_handle(segment) {
                return Err(Rejection::InvalidLink);
            }

            return Ok(ProfileHandle(segment.to_string()));
        }
    }

    if is_handle(text) {
        Ok(ProfileHandle(text.to_string()))
    } else {
        Err(Rejection::InvalidUsername)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_handle() {
        for text in ["johndoe", "john_doe", "john-doe", "JD2024", "_", "-"] {
            assert_eq!(resolve(text).unwrap().as_str(), text);
        }
    }

    #[test]
    fn test_resolve_profile_link() {
        let handle = resolve("https://vsco.co/johndoe/gallery").unwrap();
        assert_eq!(handle.as_str(), "johndoe");

        let handle = resolve("http://vsco.co/johndoe").unwrap();
        assert_eq!(handle.as_str(), "johndoe");

        let handle = resolve("https://vsco.co/johndoe/media/5f1e").unwrap();
        assert_eq!(handle.as_str(), "johndoe");
    }

    #[test]
    fn test_resolve_foreign_link() {
        assert_eq!(
            resolve("https://example.com/johndoe"),
            Err(Rejection::InvalidLink)
        );
        assert_eq!(
            resolve("https://www.vsco.co/johndoe"),
            Err(Rejection::InvalidLink)
        );
    }

    #[test]
    fn test_resolve_link_without_handle() {
        assert_eq!(resolve("https://vsco.co/"), Err(Rejection::InvalidLink));
        assert_eq!(resolve("https://vsco.co"), Err(Rejection::InvalidLink));
        assert_eq!(
            resolve("https://vsco.co/john.doe"),
            Err(Rejection::InvalidLink)
        );
    }

    #[test]
    fn test_resolve_invalid_username() {
        for text in ["", "john doe", "vsco.co/johndoe", "john!", "/start", "jöhn"] {
            assert_eq!(resolve(text), Err(Rejection::InvalidUsername), "{text}");
        }
    }

    #[test]
    fn test_gallery_url() {
        let handle = resolve("johndoe").unwrap();
        assert_eq!(handle.gallery_url(), "https://vsco.co/johndoe/gallery");
        assert_eq!(handle.to_string(), "johndoe");
    }
}
