//! One invocation of the job: prepare the data directory, open the store,
//! fetch, record, save.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::tree;
use daystore::{Clock, DailyEventStore, DateKey, LocalClock};

/// How a run ended when the store could be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recorded { date: DateKey, replaced: bool },
    /// The fetcher produced nothing; the store file was not touched.
    NoData,
    /// Today's record was built but could not be written.
    SaveFailed { date: DateKey },
}

pub async fn run<F: Fetcher + ?Sized>(config: &Config, fetcher: &F) -> Result<Outcome> {
    run_with_clock(config, fetcher, LocalClock).await
}

pub async fn run_with_clock<F, C>(config: &Config, fetcher: &F, clock: C) -> Result<Outcome>
where
    F: Fetcher + ?Sized,
    C: Clock,
{
    tracing::info!("Creating data directory if it does not exist");
    std::fs::create_dir_all(&config.data_dir).map_err(|e| {
        Error::Setup(format!(
            "failed to create data directory {}: {}",
            config.data_dir.display(),
            e
        ))
    })?;

    tracing::info!("Loading daily event monitor");
    let mut store = DailyEventStore::open_locked_with_clock(config.store_file(), clock)?;

    tracing::info!("Starting scrape ({})", fetcher.name());
    let record = match fetcher.fetch().await {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            tracing::warn!("No data point produced; store left unchanged");
            None
        }
        Err(e) => {
            tracing::error!("Failed to scrape data point: {}", e);
            None
        }
    };

    let outcome = match record {
        None => Outcome::NoData,
        Some(record) => {
            let upsert = store.upsert_today(record);
            let date = upsert.date();
            match store.save() {
                Ok(()) => {
                    tracing::info!("Saved daily event monitor ({})", date);
                    Outcome::Recorded {
                        date,
                        replaced: upsert.is_replacement(),
                    }
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    Outcome::SaveFailed { date }
                }
            }
        }
    };

    if let Some(root) = &config.tree_root {
        tree::log_tree(root);
        log_store_contents(&store);
    }

    tracing::info!("Scrape complete");
    Ok(outcome)
}

fn log_store_contents<C: Clock>(store: &DailyEventStore<C>) {
    tracing::info!("Printing contents of data file {}", store.path().display());
    match std::fs::read_to_string(store.path()) {
        Ok(text) => tracing::info!("{}", text),
        Err(e) => tracing::info!("Data file not readable: {}", e),
    }
}
