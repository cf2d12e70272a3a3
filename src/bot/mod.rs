mod fetch;
mod handler;
mod messages;
mod telegram;
mod transport;

use crate::config::Config;
use anyhow::Result;

pub async fn run(token: String, config: Config) -> Result<()> {
    telegram::run(token, config).await
}
