//! [`Driver`] implementation over `odbc-api`.

use super::{Driver, NativeCancel, NativeColumn, NativeConnection, NativeCursor, decode_text_cell};
use crate::db2i::error::NativeError;
use crate::db2i::type_info::Db2iTypeInfo;
use crate::db2i::value::Db2iBinding;
use crate::db2i::Db2iConnectOptions;
use odbc_api::handles::{AsStatementRef, Statement, StatementConnection};
use odbc_api::parameter::VarCharBox;
use odbc_api::sys::{self, HStmt, SqlReturn};
use odbc_api::{
    ConnectionOptions, ConnectionTransitions, Cursor, CursorImpl, Environment,
    ParameterCollectionRef, ResultSetMetadata, SharedConnection,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

// Process-wide ODBC environment
static ODBC_ENV: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, NativeError> {
    if let Some(env) = ODBC_ENV.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    Ok(ODBC_ENV.get_or_init(|| env))
}

/// A cursor that owns its statement, which in turn shares the connection.
type OwnedCursor = CursorImpl<StatementConnection<SharedConnection<'static>>>;

/// Connects through the system ODBC driver manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcDriver;

impl OdbcDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for OdbcDriver {
    fn connect(
        &self,
        connection_string: &str,
        options: &Db2iConnectOptions,
    ) -> Result<Box<dyn NativeConnection>, NativeError> {
        let env = environment()?;
        let connect_options = ConnectionOptions {
            login_timeout_sec: options
                .get_login_timeout()
                .map(|timeout| timeout.as_secs().min(u32::MAX as u64) as u32),
            ..Default::default()
        };
        let conn = env.connect_with_connection_string(connection_string, connect_options)?;
        conn.set_autocommit(true)?;
        Ok(Box::new(OdbcHandle {
            conn: Arc::new(Mutex::new(conn)),
            running: Arc::new(RunningStatement::default()),
            max_text_size: options.get_max_text_size(),
        }))
    }
}

struct OdbcHandle {
    conn: SharedConnection<'static>,
    running: Arc<RunningStatement>,
    max_text_size: Option<usize>,
}

impl OdbcHandle {
    fn run(
        &mut self,
        sql: &str,
        params: impl ParameterCollectionRef,
    ) -> Result<Box<dyn NativeCursor>, NativeError> {
        let mut statement = Arc::clone(&self.conn).into_preallocated()?;
        let registration = Registration::new(&self.running, statement.as_stmt_ref().as_sys());

        let has_cursor = statement
            .execute(sql, params)?
            .map(CursorImpl::into_stmt)
            .is_some();
        let row_count = match statement.row_count() {
            Ok(Some(count)) => count as i64,
            _ => -1,
        };

        if !has_cursor {
            return Ok(Box::new(OdbcCursor::exhausted(
                Arc::clone(&self.running),
                row_count,
            )));
        }

        // SAFETY: execute just left the statement positioned on a result set,
        // and the borrowed cursor was released without closing it
        let cursor = unsafe { CursorImpl::new(statement.into_handle()) };
        let mut cursor = OdbcCursor {
            registration: Some(registration),
            cursor: Some(cursor),
            columns: None,
            row_count,
            running: Arc::clone(&self.running),
            max_text_size: self.max_text_size,
        };
        cursor.describe_current()?;
        Ok(Box::new(cursor))
    }
}

impl NativeConnection for OdbcHandle {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn NativeCursor>, NativeError> {
        self.run(sql, ())
    }

    fn execute_with(
        &mut self,
        sql: &str,
        bindings: &[Db2iBinding],
    ) -> Result<Box<dyn NativeCursor>, NativeError> {
        let params: Vec<VarCharBox> = bindings
            .iter()
            .map(|binding| match binding.to_text() {
                Some(text) => VarCharBox::from_string(text),
                None => VarCharBox::null(),
            })
            .collect();
        self.run(sql, params.as_slice())
    }

    fn cancel_token(&self) -> Arc<dyn NativeCancel> {
        self.running.clone()
    }

    fn close(self: Box<Self>) -> Result<(), NativeError> {
        // odbc-api disconnects when the last owner drops and panics if the
        // driver refuses
        let handle = *self;
        panic::catch_unwind(AssertUnwindSafe(move || drop(handle)))
            .map_err(|_| NativeError::interface("failed to disconnect the ODBC connection"))
    }
}

struct StatementPtr(HStmt);

// Only ever handed to SQLCancel, which ODBC allows from any thread
unsafe impl Send for StatementPtr {}

/// The statement handle a connection is currently executing or reading.
#[derive(Default)]
struct RunningStatement {
    handle: Mutex<Option<StatementPtr>>,
}

impl RunningStatement {
    fn set(&self, handle: Option<HStmt>) {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = handle.map(StatementPtr);
    }
}

impl NativeCancel for RunningStatement {
    fn cancel(&self) -> Result<(), NativeError> {
        let guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(StatementPtr(handle)) = guard.as_ref() else {
            return Ok(());
        };
        // SAFETY: a handle is deregistered under this lock before it is freed
        match unsafe { sys::SQLCancel(*handle) } {
            SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => Ok(()),
            SqlReturn(code) => Err(NativeError::interface(format!(
                "SQLCancel failed with return code {}",
                code
            ))),
        }
    }
}

/// Keeps a statement handle registered for cancellation while it is alive.
/// Must be dropped before the handle is freed.
struct Registration(Arc<RunningStatement>);

impl Registration {
    fn new(running: &Arc<RunningStatement>, handle: HStmt) -> Self {
        running.set(Some(handle));
        Self(Arc::clone(running))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.0.set(None);
    }
}

/// A lazily read statement result. Rows of a set are only fetched from the
/// driver by `fetch_all`; `next_set` skips whatever was not read.
struct OdbcCursor {
    // Declared before `cursor` so it is dropped first
    registration: Option<Registration>,
    cursor: Option<OwnedCursor>,
    columns: Option<Vec<NativeColumn>>,
    row_count: i64,
    running: Arc<RunningStatement>,
    max_text_size: Option<usize>,
}

impl OdbcCursor {
    fn exhausted(running: Arc<RunningStatement>, row_count: i64) -> Self {
        Self {
            registration: None,
            cursor: None,
            columns: None,
            row_count,
            running,
            max_text_size: None,
        }
    }

    /// Read the column metadata of the set the cursor is positioned on.
    fn describe_current(&mut self) -> Result<(), NativeError> {
        self.columns = None;
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(());
        };
        let num_cols = cursor.num_result_cols()?;
        if num_cols <= 0 {
            return Ok(());
        }

        let mut columns = Vec::with_capacity(num_cols as usize);
        for i in 1..=num_cols as u16 {
            let name = cursor.col_name(i)?;
            let data_type = cursor.col_data_type(i)?;
            columns.push(NativeColumn::new(name, Db2iTypeInfo::new(data_type)));
        }
        self.columns = Some(columns);
        Ok(())
    }
}

impl NativeCursor for OdbcCursor {
    fn row_count(&self) -> i64 {
        self.row_count
    }

    fn description(&self) -> Option<&[NativeColumn]> {
        self.columns.as_deref()
    }

    fn fetch_all(&mut self) -> Result<Vec<Vec<Option<String>>>, NativeError> {
        let (Some(cursor), Some(columns)) = (self.cursor.as_mut(), self.columns.as_ref()) else {
            return Ok(Vec::new());
        };

        let num_cols = columns.len() as u16;
        let mut rows = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row()? {
            let mut values = Vec::with_capacity(num_cols as usize);
            for i in 1..=num_cols {
                buf.clear();
                let value = if row.get_text(i, &mut buf)? {
                    Some(decode_text_cell(&buf, self.max_text_size)?)
                } else {
                    None
                };
                values.push(value);
            }
            rows.push(values);
        }
        Ok(rows)
    }

    fn next_set(&mut self) -> Result<bool, NativeError> {
        let Some(cursor) = self.cursor.take() else {
            return Ok(false);
        };
        self.columns = None;
        // more_results frees the statement once the sets run out
        self.registration = None;

        match cursor.more_results()? {
            Some(mut next) => {
                self.registration = Some(Registration::new(
                    &self.running,
                    next.as_stmt_ref().as_sys(),
                ));
                self.cursor = Some(next);
                self.describe_current()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
