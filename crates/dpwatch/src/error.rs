use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Setup error: {0}")]
    Setup(String),

    #[error(transparent)]
    Store(#[from] daystore::StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
