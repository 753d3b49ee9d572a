//! Producers of daily records.
//!
//! A fetcher performs its HTTP requests, picks the interesting bits out of the
//! page and hands back a flat [`Record`], or `None` when the page did not have
//! what it was looking for.

pub mod crossword;
pub mod headline;

pub use crossword::CrosswordFetcher;
pub use headline::HeadlineFetcher;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use daystore::Record;
use std::time::Duration;

#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &str;

    /// One observation, or `Ok(None)` when there is nothing to record today.
    async fn fetch(&self) -> Result<Option<Record>>;
}

/// Which page the `run` command observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Source {
    /// Author and publish time of the latest crossword
    #[default]
    Crossword,
    /// Top headline on the front page
    Headline,
}

impl Source {
    pub fn fetcher(self, config: &Config) -> Result<Box<dyn Fetcher>> {
        let client = http_client(config.timeout)?;
        Ok(match self {
            Source::Crossword => Box::new(CrosswordFetcher::new(client)),
            Source::Headline => Box::new(HeadlineFetcher::new(client)),
        })
    }
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dpwatch/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GETs `url`, returning the body on a success status and `None` otherwise.
pub(crate) async fn get_page(client: &reqwest::Client, url: &str) -> Result<Option<String>> {
    let response = client.get(url).send().await?;
    tracing::info!("Request URL: {}", response.url());
    tracing::info!("Request status code: {}", response.status());

    if !response.status().is_success() {
        tracing::error!(
            "Failed to retrieve page content, status code: {}",
            response.status()
        );
        return Ok(None);
    }

    Ok(Some(response.text().await?))
}
