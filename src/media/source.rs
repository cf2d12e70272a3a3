use crate::profile::ProfileHandle;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Human-readable name of the source
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` media locators for the profile, most recent first
    async fn get_media(&self, handle: &ProfileHandle, limit: usize) -> Result<Vec<String>>;

    /// Test if this source is available on the system
    async fn test_availability(&self) -> bool;
}
