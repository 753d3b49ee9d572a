//! # daystore
//!
//! A crash-safe store that keeps at most one observation per local calendar
//! day in a single JSON file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use daystore::{DailyEventStore, Record, Result};
//!
//! fn main() -> Result<()> {
//!     let mut store = DailyEventStore::load("data/headlines.json")?;
//!     store.upsert_today(Record::from([("headline", "Quakers win")]));
//!     store.save()?;
//!
//!     for (date, record) in store.entries_chronological() {
//!         println!("{date}: {:?}", record.get("headline"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The backing file is a JSON object keyed by `YYYY-MM-DD`, each value an
//! object of string fields. Saving writes a temporary file in the same
//! directory and renames it over the old one.

mod atomic;
pub mod date;
pub mod document;
pub mod error;
pub mod lock;
pub mod record;
pub mod store;

pub use date::{Clock, DateKey, FixedClock, LocalClock, ParseDateKeyError};
pub use document::{DocumentFormat, SCHEMA_VERSION};
pub use error::{Result, StoreError};
pub use lock::StoreLock;
pub use record::{Entries, History, Record};
pub use store::{DailyEventStore, Upsert};
