//! Statement status reported back to the host engine.

use std::fmt;

/// Status of one executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterResponse {
    pub(crate) message: String,
    pub(crate) rows_affected: i64,
}

impl AdapterResponse {
    pub fn new(message: impl Into<String>, rows_affected: i64) -> Self {
        Self {
            message: message.into(),
            rows_affected,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rows affected as reported by the driver; `-1` when it does not know.
    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }
}

impl fmt::Display for AdapterResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
