//! Error types for the Db2 for i adapter.
//!
//! Failures reported by the native driver arrive as [`NativeError`]. They are
//! turned into a [`Db2iError`] in exactly one place, the exception handler
//! around statement execution, which is why there is no `From<NativeError>`
//! conversion here.

use sqlx_core::error::{BoxDynError, DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which layer of the native stack produced a [`NativeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeErrorKind {
    /// The database rejected the request (syntax, constraint, permission).
    Database,
    /// The driver layer failed before or after talking to the database
    /// (parameter binding, buffer sizing, invalid handle use).
    Interface,
}

/// An error returned from the native ODBC driver.
#[derive(Debug, Clone)]
pub struct NativeError {
    pub(crate) kind: NativeErrorKind,
    pub(crate) message: String,
    pub(crate) sqlstate: Option<String>,
}

impl NativeError {
    /// A diagnostic raised by the database itself.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(NativeErrorKind::Database, message)
    }

    /// A failure raised by the driver layer.
    pub fn interface(message: impl Into<String>) -> Self {
        Self::new(NativeErrorKind::Interface, message)
    }

    fn new(kind: NativeErrorKind, message: impl Into<String>) -> Self {
        let message = message.into().trim().to_string();
        let sqlstate = extract_sqlstate(&message);
        Self {
            kind,
            message,
            sqlstate,
        }
    }

    pub fn kind(&self) -> NativeErrorKind {
        self.kind
    }

    /// Get the SQLSTATE code if available
    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    pub fn is_database_error(&self) -> bool {
        self.kind == NativeErrorKind::Database
    }
}

impl Display for NativeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.message)
    }
}

impl StdError for NativeError {}

impl DatabaseError for NativeError {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        self.sqlstate.as_ref().map(|s| Cow::Borrowed(s.as_str()))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> BoxDynError {
        self
    }

    fn kind(&self) -> ErrorKind {
        error_kind(self.sqlstate.as_deref())
    }

    fn is_transient_in_connect_phase(&self) -> bool {
        match self.sqlstate.as_deref() {
            Some(s) if s.starts_with("08") => true,
            Some("HYT00") | Some("HYT01") => true,
            _ => false,
        }
    }
}

impl From<odbc_api::Error> for NativeError {
    fn from(error: odbc_api::Error) -> Self {
        match error {
            odbc_api::Error::Diagnostics { .. } => NativeError::database(error.to_string()),
            other => NativeError::interface(other.to_string()),
        }
    }
}

fn error_kind(sqlstate: Option<&str>) -> ErrorKind {
    match sqlstate {
        Some("23505") => ErrorKind::UniqueViolation,
        Some("23503") => ErrorKind::ForeignKeyViolation,
        Some("23514") => ErrorKind::CheckViolation,
        Some("23502") => ErrorKind::NotNullViolation,
        _ => ErrorKind::Other,
    }
}

/// Extract SQLSTATE from a driver message. Drivers format diagnostics as
/// `... [SQLSTATE] ...`, e.g. `State: 42704` or `[42S02]`.
fn extract_sqlstate(msg: &str) -> Option<String> {
    let mut rest = msg;
    while let Some(start) = rest.find('[') {
        let tail = &rest[start + 1..];
        let Some(end) = tail.find(']') else {
            break;
        };
        let state = &tail[..end];
        if state.len() == 5 && state.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Some(state.to_string());
        }
        rest = &tail[end..];
    }

    // odbc-api renders diagnostics as "State: XXXXX, Native error: ..."
    msg.find("State: ").and_then(|pos| {
        let state = msg.get(pos + 7..pos + 12)?;
        state
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
            .then(|| state.to_string())
    })
}

/// Errors surfaced by the adapter to the host engine.
#[derive(Debug, thiserror::Error)]
pub enum Db2iError {
    /// The native handle could not be established. `transient` marks
    /// failures worth retrying later, such as a dropped link or a timeout.
    #[error("connection failed: {message}")]
    Connection { message: String, transient: bool },

    /// The database rejected a statement.
    #[error("database error: {message}")]
    QueryExecution {
        message: String,
        sqlstate: Option<String>,
    },

    /// A non-database failure while executing a statement.
    #[error("runtime error: {message}")]
    InternalExecution { message: String },

    /// Closing a handle during cancellation failed.
    #[error("cancellation failed: {message}")]
    Cancellation { message: String },

    /// Credential or option values could not be accepted.
    #[error("config: {message}")]
    Config { message: String },

    /// No usable connection is available for this worker.
    #[error("invalid connection: {message}")]
    InvalidConnection { message: String },
}

impl Db2iError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Db2iError::InternalExecution {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Db2iError::Config {
            message: message.into(),
        }
    }

    /// The message carried by this error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Db2iError::Connection { message, .. }
            | Db2iError::QueryExecution { message, .. }
            | Db2iError::InternalExecution { message }
            | Db2iError::Cancellation { message }
            | Db2iError::Config { message }
            | Db2iError::InvalidConnection { message } => message,
        }
    }

    /// Whether the caller may retry with corrected input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Db2iError::QueryExecution { .. })
    }

    /// Whether a failed connect may succeed if attempted again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Db2iError::Connection { transient: true, .. })
    }

    /// The constraint class of a database error, from its SQLSTATE.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Db2iError::QueryExecution { sqlstate, .. } => Some(error_kind(sqlstate.as_deref())),
            _ => None,
        }
    }
}

pub type Db2iResult<T> = Result<T, Db2iError>;
