use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STORE_NAME: &str = "daily_pennsylvanian_headlines.json";
pub const DEFAULT_LOG_FILE: &str = "scrape.log";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub store_name: String,
    /// Directory whose tree is logged after a run; `None` skips the listing.
    pub tree_root: Option<PathBuf>,
    pub timeout: Duration,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            store_name: DEFAULT_STORE_NAME.to_string(),
            tree_root: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    pub fn with_tree_root(mut self, root: Option<PathBuf>) -> Self {
        self.tree_root = root;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join(&self.store_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_DATA_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_file() {
        let config = Config::default();
        assert_eq!(
            config.store_file(),
            PathBuf::from("data").join("daily_pennsylvanian_headlines.json")
        );
        assert!(config.tree_root.is_none());
    }

    #[test]
    fn test_builders() {
        let config = Config::new(PathBuf::from("/tmp/dp"))
            .with_store_name("crosswords.json")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.store_file(), PathBuf::from("/tmp/dp/crosswords.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
