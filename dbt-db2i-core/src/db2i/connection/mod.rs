//! Connection lifecycle.
//!
//! A [`Db2iConnectionManager`] is owned by one worker thread and holds that
//! worker's single [`Db2iConnection`]. Nothing here is shared between
//! threads except the credentials, the driver and the [`Db2iCancelHandle`]
//! another thread uses to interrupt a running statement.

use crate::db2i::driver::{Driver, NativeCancel, NativeConnection};
use crate::db2i::error::{Db2iError, Db2iResult};
use sqlx_core::error::DatabaseError;
use crate::db2i::{AdapterLogger, ConnectionString, Db2iConnectOptions, Db2iCredentials};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

mod executor;

/// Dialect tag used in log lines and by the host engine.
pub const TYPE: &str = "db2_for_i";

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created but never opened.
    Init,
    Open,
    /// The last connect attempt failed. Terminal.
    Fail,
    /// Released or cancelled; may be opened again with a fresh handle.
    Closed,
}

/// Cancel token of the native handle a connection currently holds.
type CancelSlot = Arc<Mutex<Option<Arc<dyn NativeCancel>>>>;

/// One logical connection to the target database.
pub struct Db2iConnection {
    pub(crate) name: String,
    pub(crate) state: ConnectionState,
    /// Present iff `state == Open`
    pub(crate) handle: Option<Box<dyn NativeConnection>>,
    pub(crate) transaction_open: bool,
    cancel_slot: CancelSlot,
}

impl Db2iConnection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ConnectionState::Init,
            handle: None,
            transaction_open: false,
            cancel_slot: Arc::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn transaction_open(&self) -> bool {
        self.transaction_open
    }

    /// A handle that interrupts this connection's running statement from
    /// another thread. It follows the connection across reopens.
    pub(crate) fn cancel_handle(&self, logger: &AdapterLogger) -> Db2iCancelHandle {
        Db2iCancelHandle {
            name: self.name.clone(),
            slot: Arc::clone(&self.cancel_slot),
            logger: logger.clone(),
        }
    }

    fn set_handle(&mut self, handle: Box<dyn NativeConnection>) {
        *self.cancel_slot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(handle.cancel_token());
        self.handle = Some(handle);
        self.state = ConnectionState::Open;
    }

    /// Drop the native handle and mark the connection closed.
    fn take_handle(&mut self) -> Option<Box<dyn NativeConnection>> {
        self.state = ConnectionState::Closed;
        self.transaction_open = false;
        *self.cancel_slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.handle.take()
    }
}

impl fmt::Debug for Db2iConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2iConnection")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("has_handle", &self.handle.is_some())
            .field("transaction_open", &self.transaction_open)
            .finish()
    }
}

/// What every connection attempt needs, shared by all workers.
#[derive(Clone)]
struct ConnectContext {
    credentials: Arc<Db2iCredentials>,
    driver: Arc<dyn Driver>,
    options: Db2iConnectOptions,
    logger: AdapterLogger,
}

impl ConnectContext {
    fn open(&self, connection: &mut Db2iConnection) -> Db2iResult<()> {
        match connection.state {
            ConnectionState::Open => {
                self.logger
                    .debug(format_args!("Connection is already open, skipping open."));
                return Ok(());
            }
            ConnectionState::Fail => {
                return Err(Db2iError::InvalidConnection {
                    message: format!(
                        "connection \"{}\" previously failed to open",
                        connection.name
                    ),
                });
            }
            ConnectionState::Init | ConnectionState::Closed => {}
        }

        let connection_string = ConnectionString::build(&self.credentials);
        self.logger.debug(format_args!(
            "Using connection string: {}",
            connection_string.redacted()
        ));

        match self.driver.connect(connection_string.full(), &self.options) {
            Ok(handle) => {
                connection.set_handle(handle);
                self.logger.debug(format_args!(
                    "Connected to db: {}",
                    self.credentials.database()
                ));
                Ok(())
            }
            Err(e) => {
                self.logger
                    .debug(format_args!("Could not connect to db: {}", e));
                connection.handle = None;
                connection.state = ConnectionState::Fail;
                Err(Db2iError::Connection {
                    transient: e.is_transient_in_connect_phase(),
                    message: e.message,
                })
            }
        }
    }
}

/// Opens, tracks and releases the connection of one worker.
pub struct Db2iConnectionManager {
    ctx: ConnectContext,
    connection: Option<Db2iConnection>,
}

impl Db2iConnectionManager {
    pub fn new(
        credentials: Arc<Db2iCredentials>,
        driver: Arc<dyn Driver>,
        logger: AdapterLogger,
    ) -> Self {
        Self {
            ctx: ConnectContext {
                credentials,
                driver,
                options: Db2iConnectOptions::default(),
                logger,
            },
            connection: None,
        }
    }

    pub fn with_options(mut self, options: Db2iConnectOptions) -> Self {
        self.ctx.options = options;
        self
    }

    /// A manager for another worker, sharing credentials, driver and options.
    pub fn for_worker(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            connection: None,
        }
    }

    pub fn credentials(&self) -> &Db2iCredentials {
        &self.ctx.credentials
    }

    pub fn options(&self) -> &Db2iConnectOptions {
        &self.ctx.options
    }

    pub fn logger(&self) -> &AdapterLogger {
        &self.ctx.logger
    }

    /// Create this worker's connection, or rename the existing one.
    pub fn set_connection_name(&mut self, name: &str) -> &mut Db2iConnection {
        let connection = self
            .connection
            .get_or_insert_with(|| Db2iConnection::new(name));
        if connection.name != name {
            self.ctx.logger.debug(format_args!(
                "Re-using an available connection from the pool (formerly {}, now {})",
                connection.name, name
            ));
            connection.name = name.to_string();
        }
        connection
    }

    /// The worker's connection, without opening it.
    pub fn connection(&self) -> Option<&Db2iConnection> {
        self.connection.as_ref()
    }

    /// The worker's connection, opened on first use and reopened after a
    /// release.
    pub fn get_thread_connection(&mut self) -> Db2iResult<&mut Db2iConnection> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| Db2iError::InvalidConnection {
                message: "connection was never set for this worker".to_string(),
            })?;
        if connection.state != ConnectionState::Open {
            self.ctx.open(connection)?;
        }
        Ok(connection)
    }

    /// Open `connection`. A connection that is already open is left as is.
    pub fn open(&self, connection: &mut Db2iConnection) -> Db2iResult<()> {
        self.ctx.open(connection)
    }

    /// Mark a transaction open. The driver runs in auto-commit mode so no
    /// statement is sent.
    pub fn begin(&mut self) -> Db2iResult<()> {
        let connection = self.get_thread_connection()?;
        if connection.transaction_open {
            return Err(Db2iError::internal(format!(
                "Tried to begin a new transaction on connection \"{}\", but it already had one open!",
                connection.name
            )));
        }
        connection.transaction_open = true;
        Ok(())
    }

    pub fn commit(&mut self) -> Db2iResult<()> {
        let connection = self.get_thread_connection()?;
        if !connection.transaction_open {
            return Err(Db2iError::internal(format!(
                "Tried to commit transaction on connection \"{}\", but it does not have one open!",
                connection.name
            )));
        }
        let name = connection.name.clone();
        connection.transaction_open = false;
        self.ctx.logger.debug(format_args!("On {}: COMMIT", name));
        Ok(())
    }

    /// Close the worker's native handle, keeping the connection record.
    pub fn release(&mut self) -> Db2iResult<()> {
        let Some(connection) = self.connection.as_mut() else {
            return Ok(());
        };
        match connection.take_handle() {
            Some(handle) => handle.close().map_err(|e| {
                Db2iError::internal(format!("failed to release connection: {}", e))
            }),
            None => Ok(()),
        }
    }

    /// Forcibly close `connection`'s handle to interrupt whatever it is running.
    ///
    /// The native handle cannot be reused afterwards; the connection is left
    /// `Closed` and must be opened again. To interrupt a statement that is
    /// blocking the owning worker, use a [`Db2iCancelHandle`] from
    /// [`cancel_handle`](Self::cancel_handle) on another thread.
    pub fn cancel(&self, connection: &mut Db2iConnection) -> Db2iResult<()> {
        cancel_with(&self.ctx, connection)
    }

    /// A cancel handle for the worker's connection, `None` until a
    /// connection name is set.
    pub fn cancel_handle(&self) -> Option<Db2iCancelHandle> {
        self.connection
            .as_ref()
            .map(|connection| connection.cancel_handle(&self.ctx.logger))
    }

    /// Cancel the worker's connection if it is open, returning its name.
    pub fn cancel_open(&mut self) -> Db2iResult<Option<String>> {
        let ctx = &self.ctx;
        match self.connection.as_mut() {
            Some(connection) if connection.is_open() => {
                let name = connection.name.clone();
                cancel_with(ctx, connection)?;
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }
}

fn cancel_with(ctx: &ConnectContext, connection: &mut Db2iConnection) -> Db2iResult<()> {
    ctx.logger.debug(format_args!("Cancel query"));
    let Some(handle) = connection.take_handle() else {
        return Ok(());
    };
    handle
        .cancel_token()
        .cancel()
        .and_then(|()| handle.close())
        .map_err(|e| {
            ctx.logger
                .debug(format_args!("Failed to cancel query on \"{}\": {}", connection.name, e));
            Db2iError::Cancellation { message: e.message }
        })
}

/// Interrupts the statement a connection is running, from any thread.
///
/// The interrupted statement fails on its owning worker with a classified
/// error and the connection is released there, leaving it `Closed`.
#[derive(Clone)]
pub struct Db2iCancelHandle {
    name: String,
    slot: CancelSlot,
    logger: AdapterLogger,
}

impl Db2iCancelHandle {
    /// Name of the connection when the handle was taken.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interrupt the running statement. A connection with no open handle has
    /// nothing to interrupt.
    pub fn cancel(&self) -> Db2iResult<()> {
        let token = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(token) = token else {
            return Ok(());
        };
        self.logger.debug(format_args!("Cancel query"));
        token.cancel().map_err(|e| {
            self.logger
                .debug(format_args!("Failed to cancel query on \"{}\": {}", self.name, e));
            Db2iError::Cancellation { message: e.message }
        })
    }
}

impl fmt::Debug for Db2iCancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2iCancelHandle")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Debug for Db2iConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2iConnectionManager")
            .field("credentials", &self.ctx.credentials)
            .field("connection", &self.connection)
            .finish()
    }
}
