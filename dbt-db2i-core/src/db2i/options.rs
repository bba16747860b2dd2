//! Connection and execution options.

use std::time::Duration;

/// Options controlling how connections are opened and statements are logged.
#[derive(Debug, Clone)]
pub struct Db2iConnectOptions {
    /// Login timeout passed to the driver
    pub(crate) login_timeout: Option<Duration>,
    /// Statement logging level
    pub(crate) log_statements: log::LevelFilter,
    /// Slow statement threshold
    pub(crate) log_slow_statements: (log::LevelFilter, Duration),
    /// Number of characters of SQL kept when a statement log is abridged
    pub(crate) abridged_log_length: usize,
    /// Maximum size in bytes of a single text cell (None = unlimited)
    pub(crate) max_text_size: Option<usize>,
}

impl Default for Db2iConnectOptions {
    fn default() -> Self {
        Self {
            login_timeout: Some(Duration::from_secs(30)),
            log_statements: log::LevelFilter::Debug,
            log_slow_statements: (log::LevelFilter::Warn, Duration::from_secs(1)),
            abridged_log_length: 512,
            max_text_size: None,
        }
    }
}

impl Db2iConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the login timeout
    pub fn login_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Set the level statements are logged at
    pub fn log_statements(mut self, level: log::LevelFilter) -> Self {
        self.log_statements = level;
        self
    }

    /// Log statements slower than `duration` at `level`
    pub fn log_slow_statements(mut self, level: log::LevelFilter, duration: Duration) -> Self {
        self.log_slow_statements = (level, duration);
        self
    }

    pub fn abridged_log_length(mut self, length: usize) -> Self {
        self.abridged_log_length = length;
        self
    }

    /// Set the maximum text cell size. Reading a larger cell fails the fetch
    /// instead of returning a cut value.
    pub fn max_text_size(mut self, size: Option<usize>) -> Self {
        self.max_text_size = size;
        self
    }

    pub fn get_login_timeout(&self) -> Option<Duration> {
        self.login_timeout
    }

    pub fn get_max_text_size(&self) -> Option<usize> {
        self.max_text_size
    }
}
