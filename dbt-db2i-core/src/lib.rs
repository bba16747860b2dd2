//! Db2 for i dialect adapter.
//!
//! This crate lets a SQL-transformation engine target Db2 for i over ODBC:
//! connection lifecycle, statement execution with error classification,
//! column type mapping, identifier rendering and row-diff SQL.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbt_db2i_core::{AdapterLogger, Db2iConnectionManager, Db2iCredentials, OdbcDriver};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), dbt_db2i_core::Db2iError> {
//! let credentials = Db2iCredentials::new("IBM i Access ODBC Driver", "myibmi", "MYDB")
//!     .user("user")
//!     .password("secret");
//! let mut manager = Db2iConnectionManager::new(
//!     Arc::new(credentials),
//!     Arc::new(OdbcDriver),
//!     AdapterLogger::global(),
//! );
//! manager.set_connection_name("master");
//! manager.execute("select 1 as one from sysibm.sysdummy1", false, false)?;
//! # Ok(())
//! # }
//! ```

pub mod db2i;

// Re-export main types at crate root for convenience
pub use db2i::{
    AdapterLogger, AdapterResponse, ColumnType, ConnectionState, ConnectionString, Db2iAdapter,
    Db2iBinding, Db2iCancelHandle, Db2iColumn, Db2iConnectOptions, Db2iConnection,
    Db2iConnectionManager, Db2iCredentials, Db2iError, Db2iRelation, Db2iResult, Db2iTypeInfo,
    Db2iValue, Driver, NativeCancel, NativeColumn, NativeConnection, NativeCursor, NativeError,
    OdbcDriver, Policy, TabularColumn, TabularResult,
};

// Re-export sqlx_core and rust_decimal for downstream use
pub use rust_decimal;
pub use sqlx_core;
