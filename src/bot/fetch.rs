use super::transport::{ChatTransport, Destination, PlatformError};
use crate::media::{build_batches, MediaSource};
use crate::profile::ProfileHandle;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0:#}")]
    Source(anyhow::Error),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Fetches a profile's recent media and sends it as media groups.
///
/// Groups are sent one after another in scraper order. The first failure stops
/// delivery; groups already sent stay sent. Returns the number of groups sent.
pub async fn fetch_and_deliver(
    source: &dyn MediaSource,
    transport: &dyn ChatTransport,
    handle: &ProfileHandle,
    limit: usize,
    to: Destination,
) -> Result<usize, FetchError> {
    let locators = source
        .get_media(handle, limit)
        .await
        .map_err(FetchError::Source)?;
    debug!(
        "{} returned {} locators for {}",
        source.name(),
        locators.len(),
        handle
    );

    let batches = build_batches(&locators, limit);
    for batch in &batches {
        transport.send_media_group(to, batch).await?;
    }

    info!("Delivered {} media groups for {}", batches.len(), handle);
    Ok(batches.len())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;
    use crate::bot::transport::fake::FakeTransport;
    use crate::media::MediaKind;
    use crate::profile::resolve;

    #[tokio::test]
    async fn test_delivers_in_groups_of_ten() {
        let source = FakeSource::photos(25);
        let transport = FakeTransport::default();
        let handle = resolve("johndoe").unwrap();

        let sent = fetch_and_deliver(&source, &transport, &handle, 20, Destination::reply(1, 7))
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let groups = transport.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 10);
        assert_eq!(groups[1].len(), 10);
        assert_eq!(
            groups[0][0].url.as_str(),
            "https://im.vsco.co/aws-us-west-2/0.jpg"
        );
        assert_eq!(
            source.requests.lock().unwrap().clone(),
            vec![("johndoe".to_string(), 20)]
        );
    }

    #[tokio::test]
    async fn test_unsupported_items_are_skipped() {
        let source = FakeSource::returning(vec![
            "im.vsco.co/a/1.jpg".to_string(),
            "im.vsco.co/a/2.txt".to_string(),
            "im.vsco.co/a/3.gif".to_string(),
        ]);
        let transport = FakeTransport::default();
        let handle = resolve("johndoe").unwrap();

        let sent = fetch_and_deliver(&source, &transport, &handle, 10, Destination::chat(1))
            .await
            .unwrap();

        assert_eq!(sent, 1);
        let groups = transport.groups();
        assert_eq!(
            groups[0].iter().map(|i| i.kind).collect::<Vec<_>>(),
            vec![MediaKind::Photo, MediaKind::Animation]
        );
    }

    #[tokio::test]
    async fn test_nothing_supported_sends_nothing() {
        let source = FakeSource::returning(vec!["im.vsco.co/a/1.webp".to_string()]);
        let transport = FakeTransport::default();
        let handle = resolve("johndoe").unwrap();

        let sent = fetch_and_deliver(&source, &transport, &handle, 10, Destination::chat(1))
            .await
            .unwrap();

        assert_eq!(sent, 0);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_source_failure() {
        let source = FakeSource::failing("No media found for this profile");
        let transport = FakeTransport::default();
        let handle = resolve("nobody").unwrap();

        let err = fetch_and_deliver(&source, &transport, &handle, 10, Destination::chat(1))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Source(_)));
        assert_eq!(err.to_string(), "No media found for this profile");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_stops_delivery() {
        let source = FakeSource::photos(30);
        let transport = FakeTransport::default();
        *transport.fail_group.lock().unwrap() = Some((
            1,
            PlatformError::SendFailed {
                method: "sendMediaGroup",
                description: "Too Many Requests".to_string(),
            },
        ));
        let handle = resolve("johndoe").unwrap();

        let err = fetch_and_deliver(&source, &transport, &handle, 30, Destination::chat(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Platform(PlatformError::SendFailed { .. })
        ));
        // the first group went out before the failure
        assert_eq!(transport.groups().len(), 1);
    }
}
