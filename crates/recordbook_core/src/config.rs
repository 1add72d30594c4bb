//! Application configuration.
//!
//! Everything is derived from one data directory; there are no config files
//! or environment variables.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

/// File name of the contacts flat file inside the data directory.
pub const CONTACTS_FILE_NAME: &str = "contacts.txt";
/// File name of the finance ledger database inside the data directory.
pub const FINANCE_DB_FILE_NAME: &str = "finance.db";
/// Directory name for rolling log files inside the data directory.
pub const LOG_DIR_NAME: &str = "logs";
/// Opening bank balance used until the user sets one.
pub const DEFAULT_INITIAL_BALANCE: f64 = 1_000_000.00;

/// Resolved locations and defaults for both applications.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
    pub initial_balance: f64,
}

impl AppConfig {
    /// Builds the default configuration rooted at `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            log_level: default_log_level(),
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join(CONTACTS_FILE_NAME)
    }

    pub fn finance_db_path(&self) -> PathBuf {
        self.data_dir.join(FINANCE_DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_INITIAL_BALANCE};
    use std::path::Path;

    #[test]
    fn paths_are_rooted_in_data_dir() {
        let config = AppConfig::in_dir("/srv/book");
        assert_eq!(config.contacts_path(), Path::new("/srv/book/contacts.txt"));
        assert_eq!(config.finance_db_path(), Path::new("/srv/book/finance.db"));
        assert_eq!(config.log_dir, Path::new("/srv/book/logs"));
        assert_eq!(config.initial_balance, DEFAULT_INITIAL_BALANCE);
    }
}
