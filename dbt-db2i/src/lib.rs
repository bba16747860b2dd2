//! Db2 for i dialect adapter
//!
//! This crate lets a SQL-transformation engine run models against Db2 for i
//! (IBM i) through the IBM i Access ODBC driver.
//!
//! ## Features
//!
//! - **Connection lifecycle** - Lazy open, release, cancel and a terminal failed state
//! - **Error classification** - Database errors are kept apart from driver and adapter failures
//! - **Type mapping** - Native types for sampled data and catalog columns
//! - **Identifier policy** - Quoted or unquoted, with optional database qualification
//! - **Row diffs** - SQL comparing the contents of two relations
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbt_db2i::{AdapterLogger, Db2iAdapter, Db2iConnectionManager, Db2iCredentials, OdbcDriver};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), dbt_db2i::Db2iError> {
//! let credentials = Db2iCredentials::from_pairs([
//!     ("driver", "IBM i Access ODBC Driver"),
//!     ("system", "myibmi"),
//!     ("database", "MYDB"),
//!     ("user", "dbtuser"),
//!     ("password", "secret"),
//!     ("library", "ANALYTICS"),
//! ])?;
//! let mut manager = Db2iConnectionManager::new(
//!     Arc::new(credentials),
//!     Arc::new(OdbcDriver),
//!     AdapterLogger::global(),
//! );
//! manager.set_connection_name("master");
//! let mut adapter = Db2iAdapter::new(manager);
//! adapter.debug_query()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export everything from dbt-db2i-core
pub use dbt_db2i_core::*;
