use crate::error::Result;
use crate::fetch::{get_page, Fetcher};
use crate::html;
use async_trait::async_trait;
use daystore::Record;

pub const FRONT_PAGE_URL: &str = "https://www.thedp.com";

/// Records the top headline on the front page.
pub struct HeadlineFetcher {
    client: reqwest::Client,
    url: String,
}

impl HeadlineFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, FRONT_PAGE_URL)
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Fetcher for HeadlineFetcher {
    fn name(&self) -> &str {
        "headline"
    }

    async fn fetch(&self) -> Result<Option<Record>> {
        let Some(page) = get_page(&self.client, &self.url).await? else {
            return Ok(None);
        };

        let record = headline_record(&page);
        match &record {
            Some(record) => tracing::info!("Data: {:?}", record),
            None => tracing::info!("Headline not found."),
        }
        Ok(record)
    }
}

/// `{headline}` from the first `a.frontpage-link`; `None` if absent or blank.
pub fn headline_record(front_page: &str) -> Option<Record> {
    let headline = html::find_element(front_page, "a", Some("frontpage-link"))?.text();
    if headline.is_empty() {
        return None;
    }
    Some(Record::from([("headline", headline)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_record() {
        let page = r#"
            <a class="nav" href="/">Home</a>
            <a class="frontpage-link standard-link" href="/article/1">
              Penn&#39;s budget &amp; you
            </a>
            <a class="frontpage-link" href="/article/2">Second story</a>
        "#;
        let record = headline_record(page).unwrap();
        assert_eq!(record.get("headline"), Some("Penn's budget & you"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_headline_missing_or_blank() {
        assert!(headline_record("<a class=\"nav\">Home</a>").is_none());
        assert!(headline_record("<a class=\"frontpage-link\">  </a>").is_none());
    }
}
