use crate::cli::output::{OutputFormat, OutputWriter};
use crate::config::Config;
use crate::driver::{self, Outcome};
use crate::error::Result;
use crate::fetch::Source;
use daystore::DailyEventStore;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub async fn run(config: &Config, source: Source) -> Result<Outcome> {
    let fetcher = source.fetcher(config)?;
    let outcome = driver::run(config, fetcher.as_ref()).await?;

    match &outcome {
        Outcome::Recorded { date, replaced } => {
            let verb = if *replaced { "Replaced" } else { "Recorded" };
            tracing::info!("{} observation for {}", verb, date);
        }
        Outcome::NoData => tracing::info!("Nothing recorded this run"),
        Outcome::SaveFailed { date } => {
            tracing::warn!("Observation for {} was not saved", date)
        }
    }
    Ok(outcome)
}

pub fn show(config: &Config, format: OutputFormat) -> Result<()> {
    let store = DailyEventStore::load(config.store_file())?;
    let mut writer = OutputWriter::new(std::io::stdout().lock(), format);
    writer.write_history(store.history())
}

pub fn export(config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let store = DailyEventStore::load(config.store_file())?;

    match output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            OutputWriter::new(file, format).write_history(store.history())?;
            tracing::info!("Exported {} days to {}", store.len(), path.display());
        }
        None => {
            OutputWriter::new(std::io::stdout().lock(), format).write_history(store.history())?;
        }
    }
    Ok(())
}
