//! The seam between the adapter and the native ODBC driver.
//!
//! Everything that touches a native handle goes through these traits. The
//! production implementation is [`OdbcDriver`]; tests substitute scripted
//! drivers.

use crate::db2i::error::NativeError;
use crate::db2i::type_info::Db2iTypeInfo;
use crate::db2i::value::Db2iBinding;
use crate::db2i::Db2iConnectOptions;
use std::sync::Arc;

mod odbc;

pub use odbc::OdbcDriver;

/// Column metadata of the current result set.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeColumn {
    pub name: String,
    pub type_info: Db2iTypeInfo,
}

impl NativeColumn {
    pub fn new(name: impl Into<String>, type_info: Db2iTypeInfo) -> Self {
        Self {
            name: name.into(),
            type_info,
        }
    }
}

/// Establishes native connections.
pub trait Driver: Send + Sync {
    /// Connect with auto-commit enabled.
    fn connect(
        &self,
        connection_string: &str,
        options: &Db2iConnectOptions,
    ) -> Result<Box<dyn NativeConnection>, NativeError>;
}

/// An open native handle.
pub trait NativeConnection: Send {
    /// Execute without parameters.
    fn execute(&mut self, sql: &str) -> Result<Box<dyn NativeCursor>, NativeError>;

    /// Execute with positional parameters. An empty slice is still a
    /// parameterised call.
    fn execute_with(
        &mut self,
        sql: &str,
        bindings: &[Db2iBinding],
    ) -> Result<Box<dyn NativeCursor>, NativeError>;

    /// A token that interrupts whatever this connection is executing. It
    /// stays valid, and harmless, after the connection is closed.
    fn cancel_token(&self) -> Arc<dyn NativeCancel>;

    /// Disconnect and free the handle.
    fn close(self: Box<Self>) -> Result<(), NativeError>;
}

/// Interrupts a running statement from another thread. The interrupted call
/// fails on its own thread with the driver's diagnostic.
pub trait NativeCancel: Send + Sync {
    fn cancel(&self) -> Result<(), NativeError>;
}

/// The outcome of one executed statement, positioned on its first result set.
pub trait NativeCursor: Send {
    /// Rows affected as reported by the driver after execution; `-1` when the
    /// driver does not know, which is usual for queries.
    fn row_count(&self) -> i64;

    /// Column metadata of the current result set, `None` if it has none.
    fn description(&self) -> Option<&[NativeColumn]>;

    /// Read every remaining row of the current result set as text cells.
    /// Rows are only read when this is called.
    fn fetch_all(&mut self) -> Result<Vec<Vec<Option<String>>>, NativeError>;

    /// Advance to the next result set. `Ok(false)` once there are no more.
    fn next_set(&mut self) -> Result<bool, NativeError>;
}

/// Decode one text cell read from the driver. A cell longer than
/// `max_text_size` bytes is an error rather than being cut.
pub fn decode_text_cell(raw: &[u8], max_text_size: Option<usize>) -> Result<String, NativeError> {
    if let Some(max) = max_text_size {
        if raw.len() > max {
            return Err(NativeError::interface(format!(
                "text cell of {} bytes exceeds the maximum text size of {} bytes",
                raw.len(),
                max
            )));
        }
    }
    Ok(String::from_utf8_lossy(raw).into_owned())
}
