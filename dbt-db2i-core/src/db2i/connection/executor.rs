//! Statement execution and failure classification.

use super::{Db2iConnection, Db2iConnectionManager, TYPE};
use crate::db2i::driver::NativeCursor;
use crate::db2i::error::{Db2iError, Db2iResult, NativeError};
use crate::db2i::value::Db2iBinding;
use crate::db2i::{AdapterResponse, TabularResult};
use std::time::Instant;

/// A failure inside an exception-handled block, before classification.
pub(crate) enum ExecutionFailure {
    Native(NativeError),
    Adapter(Db2iError),
}

impl From<NativeError> for ExecutionFailure {
    fn from(error: NativeError) -> Self {
        ExecutionFailure::Native(error)
    }
}

impl From<Db2iError> for ExecutionFailure {
    fn from(error: Db2iError) -> Self {
        ExecutionFailure::Adapter(error)
    }
}

impl Db2iConnectionManager {
    /// Run `body`, releasing the connection and classifying the error if it
    /// fails. This is the only place a [`NativeError`] becomes a
    /// [`Db2iError`].
    fn exception_handler<T>(
        &mut self,
        sql: &str,
        body: impl FnOnce(&mut Self) -> Result<T, ExecutionFailure>,
    ) -> Db2iResult<T> {
        let failure = match body(self) {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        match failure {
            ExecutionFailure::Native(e) if e.is_database_error() => {
                self.ctx
                    .logger
                    .debug(format_args!("Database error: {} {}", e, sql));
                if self.release().is_err() {
                    self.ctx
                        .logger
                        .debug(format_args!("Failed to release connection!"));
                }
                Err(Db2iError::QueryExecution {
                    message: e.message,
                    sqlstate: e.sqlstate,
                })
            }
            other => {
                self.ctx
                    .logger
                    .debug(format_args!("Error running SQL: {}", sql));
                self.ctx
                    .logger
                    .debug(format_args!("Rolling back transaction."));
                if self.release().is_err() {
                    self.ctx
                        .logger
                        .debug(format_args!("Failed to release connection!"));
                }
                Err(match other {
                    ExecutionFailure::Native(e) => Db2iError::internal(e.message),
                    ExecutionFailure::Adapter(e) => e,
                })
            }
        }
    }

    /// Submit `sql` on this worker's connection.
    ///
    /// `bindings: None` runs the statement without parameters; `Some(&[])`
    /// still takes the parameterised path. With `abridge_sql_log` only a
    /// prefix of the statement is logged.
    pub fn add_query(
        &mut self,
        sql: &str,
        auto_begin: bool,
        bindings: Option<&[Db2iBinding]>,
        abridge_sql_log: bool,
    ) -> Db2iResult<(&mut Db2iConnection, Box<dyn NativeCursor>)> {
        let connection = self.get_thread_connection()?;
        if auto_begin && !connection.transaction_open {
            self.begin()?;
        }

        let name = self
            .connection
            .as_ref()
            .map(|connection| connection.name.clone())
            .unwrap_or_default();
        self.ctx
            .logger
            .debug(format_args!("Using {} connection \"{}\".", TYPE, name));

        let cursor = self.exception_handler(sql, |this| {
            this.log_statement(&name, sql, abridge_sql_log);
            let start = Instant::now();

            let handle = this
                .connection
                .as_mut()
                .and_then(|connection| connection.handle.as_mut())
                .ok_or_else(|| Db2iError::InvalidConnection {
                    message: format!("connection \"{}\" has no open handle", name),
                })?;

            let cursor = match bindings {
                None => handle.execute(sql)?,
                Some(bindings) => handle.execute_with(sql, bindings)?,
            };

            let elapsed = start.elapsed();
            this.ctx.logger.debug(format_args!(
                "SQL status: {} in {:.2} seconds",
                Self::get_response(&*cursor),
                elapsed.as_secs_f64()
            ));
            let (slow_level, threshold) = this.ctx.options.log_slow_statements;
            if elapsed >= threshold {
                if let Some(level) = slow_level.to_level() {
                    this.ctx.logger.log(
                        level,
                        format_args!(
                            "slow statement on {}: execution time exceeded alert threshold ({:.2}s > {:.2}s)",
                            name,
                            elapsed.as_secs_f64(),
                            threshold.as_secs_f64()
                        ),
                    );
                }
            }
            Ok(cursor)
        })?;

        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| Db2iError::InvalidConnection {
                message: "connection was never set for this worker".to_string(),
            })?;
        Ok((connection, cursor))
    }

    fn log_statement(&self, name: &str, sql: &str, abridge: bool) {
        let Some(level) = self.ctx.options.log_statements.to_level() else {
            return;
        };
        if abridge {
            let prefix: String = sql.chars().take(self.ctx.options.abridged_log_length).collect();
            self.ctx
                .logger
                .log(level, format_args!("On {}: {}....", name, prefix));
        } else {
            self.ctx.logger.log(level, format_args!("On {}: {}", name, sql));
        }
    }

    /// The status of a statement whose cursor is `cursor`.
    pub fn get_response(cursor: &dyn NativeCursor) -> AdapterResponse {
        AdapterResponse::new("OK", cursor.row_count())
    }

    /// Read the current result set of `cursor` into a table.
    fn get_result_from_cursor(cursor: &mut dyn NativeCursor) -> Result<TabularResult, NativeError> {
        let Some(columns) = cursor.description().map(<[_]>::to_vec) else {
            return Ok(TabularResult::empty());
        };
        let rows = cursor.fetch_all()?;
        Ok(TabularResult::from_native(&columns, rows))
    }

    /// Execute `sql` and, when `fetch` is set, return its first result set
    /// that has columns.
    ///
    /// Every result set is consumed before returning, so an error carried by
    /// a later set is raised rather than dropped.
    pub fn execute(
        &mut self,
        sql: &str,
        auto_begin: bool,
        fetch: bool,
    ) -> Db2iResult<(AdapterResponse, TabularResult)> {
        let (_, mut cursor) = self.add_query(sql, auto_begin, None, false)?;
        let response = Self::get_response(&*cursor);

        let table = self.exception_handler(sql, |_| {
            let table = if fetch {
                while cursor.description().is_none() {
                    if !cursor.next_set()? {
                        break;
                    }
                }
                Self::get_result_from_cursor(&mut *cursor)?
            } else {
                TabularResult::empty()
            };

            while cursor.next_set()? {}
            Ok(table)
        })?;

        Ok((response, table))
    }
}
