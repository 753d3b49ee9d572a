//! dpwatch - record one Daily Pennsylvanian observation per day
//!
//! Wires a [`fetch::Fetcher`] to a [`daystore::DailyEventStore`]: each run
//! fetches today's value and upserts it under today's date in a JSON file.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod fetch;
pub mod html;
pub mod logging;
pub mod tree;

pub use config::Config;
pub use driver::Outcome;
pub use error::{Error, Result};
