//! Db2 for i dialect adapter.
//!
//! Connects to IBM i through the IBM i Access ODBC driver and gives a host
//! SQL-transformation engine a uniform contract for opening connections,
//! running statements, mapping column types and rendering identifiers.
//!
//! ## Connection Strings
//!
//! Connection strings are built from [`Db2iCredentials`]:
//!
//! ```text
//! DRIVER={IBM i Access ODBC Driver};SYSTEM=myibmi;DATABASE=MYDB;NAM=0;UID=user;PWD=secret
//! ```
//!
//! Only the redacted form, with the password replaced by `PWD=****`, is
//! ever logged.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbt_db2i_core::db2i::{AdapterLogger, Db2iConnectionManager, Db2iCredentials, OdbcDriver};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), dbt_db2i_core::db2i::Db2iError> {
//! let credentials = Db2iCredentials::new("IBM i Access ODBC Driver", "myibmi", "MYDB")
//!     .user("user")
//!     .password("secret");
//! let mut manager = Db2iConnectionManager::new(
//!     Arc::new(credentials),
//!     Arc::new(OdbcDriver),
//!     AdapterLogger::global(),
//! );
//! manager.set_connection_name("model.my_model");
//! let (response, table) = manager.execute("select 1 as one from sysibm.sysdummy1", false, true)?;
//! # Ok(())
//! # }
//! ```

mod adapter;
mod column;
mod connection;
mod connection_string;
mod credentials;
pub mod diff;
pub mod driver;
mod error;
mod logger;
mod options;
mod query_result;
mod relation;
mod table;
mod type_info;
pub mod types;
mod value;

pub use adapter::Db2iAdapter;
pub use column::{ColumnKind, Db2iColumn, TYPE_LABELS, numeric_type, string_type, translate_type};
pub use connection::{
    ConnectionState, Db2iCancelHandle, Db2iConnection, Db2iConnectionManager, TYPE,
};
pub use connection_string::{ConnectionString, redact};
pub use credentials::{CREDENTIAL_ALIASES, Db2iCredentials, canonical_key};
pub use driver::{
    Driver, NativeCancel, NativeColumn, NativeConnection, NativeCursor, OdbcDriver,
    decode_text_cell,
};
pub use error::{Db2iError, Db2iResult, NativeError, NativeErrorKind};
pub use logger::{AdapterLogger, DEFAULT_TARGET};
pub use options::Db2iConnectOptions;
pub use query_result::AdapterResponse;
pub use relation::{Db2iRelation, EPHEMERAL_PREFIX, Policy, quote_identifier};
pub use table::{TabularColumn, TabularResult};
pub use type_info::{ColumnType, DataTypeExt, Db2iTypeInfo, SQL_DECFLOAT, data_type_name};
pub use value::{Db2iBinding, Db2iValue};
