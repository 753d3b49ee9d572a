use crate::error::{Error, Result};
use crate::fetch::{get_page, Fetcher};
use crate::html;
use async_trait::async_trait;
use daystore::Record;
use reqwest::Url;

pub const CROSSWORD_SECTION_URL: &str = "https://www.thedp.com/section/crosswords";

pub const NO_AUTHOR: &str = "No author found";
pub const NO_PUBLISH_TIME: &str = "No publish time found";

/// Records who wrote the latest crossword and when it went up.
pub struct CrosswordFetcher {
    client: reqwest::Client,
    section_url: String,
}

impl CrosswordFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_section_url(client, CROSSWORD_SECTION_URL)
    }

    pub fn with_section_url(client: reqwest::Client, section_url: impl Into<String>) -> Self {
        Self {
            client,
            section_url: section_url.into(),
        }
    }

    async fn latest_crossword_url(&self) -> Result<Option<String>> {
        let Some(page) = get_page(&self.client, &self.section_url).await? else {
            return Ok(None);
        };

        let link = crossword_link(&page, &self.section_url)?;
        if link.is_none() {
            tracing::info!("Crossword link not found.");
        }
        Ok(link)
    }
}

#[async_trait]
impl Fetcher for CrosswordFetcher {
    fn name(&self) -> &str {
        "crossword"
    }

    async fn fetch(&self) -> Result<Option<Record>> {
        let Some(url) = self.latest_crossword_url().await? else {
            tracing::error!("Failed to get the latest crossword URL.");
            return Ok(None);
        };

        let Some(page) = get_page(&self.client, &url).await? else {
            tracing::error!("Failed to retrieve the page.");
            return Ok(None);
        };

        let record = article_record(&page);
        tracing::info!("Data: {:?}", record);
        Ok(Some(record))
    }
}

/// Absolute URL of the first `h3.standard-link` anchor on the section page.
pub fn crossword_link(section_page: &str, base_url: &str) -> Result<Option<String>> {
    let href = html::find_element(section_page, "h3", Some("standard-link"))
        .and_then(|h3| h3.find("a", None))
        .and_then(|a| a.attr("href").map(str::to_string));

    let Some(href) = href else {
        return Ok(None);
    };

    let base = Url::parse(base_url).map_err(|e| Error::Fetch(format!("{base_url}: {e}")))?;
    let resolved = base
        .join(&href)
        .map_err(|e| Error::Fetch(format!("{href}: {e}")))?;
    Ok(Some(resolved.to_string()))
}

/// `{author, publish_time}` from an article page, with placeholders for missing parts.
pub fn article_record(article_page: &str) -> Record {
    let author = html::find_element(article_page, "a", Some("author-name"))
        .map(|e| e.text())
        .unwrap_or_else(|| NO_AUTHOR.to_string());
    let publish_time = html::find_element(article_page, "span", Some("dateline"))
        .map(|e| e.text())
        .unwrap_or_else(|| NO_PUBLISH_TIME.to_string());

    Record::new()
        .with("author", author)
        .with("publish_time", publish_time)
}
