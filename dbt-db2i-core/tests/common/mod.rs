//! Scripted driver and capturing logger shared by the integration tests.
#![allow(dead_code)]

use dbt_db2i_core::db2i::decode_text_cell;
use dbt_db2i_core::{
    AdapterLogger, Db2iBinding, Db2iConnectOptions, Db2iConnectionManager, Db2iCredentials,
    Db2iTypeInfo, Driver, NativeCancel, NativeColumn, NativeConnection, NativeCursor, NativeError,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// What a statement interrupted by a cancel reports.
pub const CANCELLED_MESSAGE: &str = "[IBM][System i Access ODBC Driver]Operation canceled. [HY008]";

/// How a statement reached the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Plain(String),
    WithParams(String, Vec<Db2iBinding>),
}

/// One scripted result set, or an error raised when stepping to it.
#[derive(Debug, Clone)]
pub enum ScriptedSet {
    Rows {
        columns: Vec<NativeColumn>,
        rows: Vec<Vec<Option<String>>>,
    },
    NoColumns,
    Error(NativeError),
}

impl ScriptedSet {
    pub fn rows(columns: &[(&str, Db2iTypeInfo)], rows: &[&[Option<&str>]]) -> Self {
        ScriptedSet::Rows {
            columns: columns
                .iter()
                .map(|(name, type_info)| NativeColumn::new(*name, type_info.clone()))
                .collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
                .collect(),
        }
    }
}

/// What the next statement should produce.
#[derive(Debug, Clone)]
pub enum Outcome {
    Sets { row_count: i64, sets: Vec<ScriptedSet> },
    Fail(NativeError),
    /// Run until cancelled, then fail with [`CANCELLED_MESSAGE`].
    Block,
}

impl Outcome {
    pub fn ok(row_count: i64) -> Self {
        Outcome::Sets {
            row_count,
            sets: vec![ScriptedSet::NoColumns],
        }
    }

    pub fn sets(sets: Vec<ScriptedSet>) -> Self {
        Outcome::Sets { row_count: -1, sets }
    }
}

/// Everything the scripted driver saw, shared with the test body.
#[derive(Debug, Default)]
pub struct DriverState {
    pub connect_strings: Vec<String>,
    pub calls: Vec<Call>,
    pub closes: usize,
    pub outcomes: VecDeque<Outcome>,
    pub connect_error: Option<NativeError>,
    pub close_error: Option<NativeError>,
    pub sets_stepped: usize,
    pub fetches: usize,
    pub in_flight: bool,
    pub cancelled: bool,
    pub cancels: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    pub state: Arc<Mutex<DriverState>>,
    pub signal: Arc<Condvar>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: Outcome) -> &Self {
        self.state.lock().unwrap().outcomes.push_back(outcome);
        self
    }

    pub fn fail_connect(&self, error: NativeError) {
        self.state.lock().unwrap().connect_error = Some(error);
    }

    pub fn fail_close(&self, error: NativeError) {
        self.state.lock().unwrap().close_error = Some(error);
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connect_strings.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn connect_strings(&self) -> Vec<String> {
        self.state.lock().unwrap().connect_strings.clone()
    }

    pub fn sets_stepped(&self) -> usize {
        self.state.lock().unwrap().sets_stepped
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().unwrap().cancels
    }

    /// Block until a statement scripted with [`Outcome::Block`] is running.
    pub fn wait_until_in_flight(&self) {
        let mut state = self.state.lock().unwrap();
        while !state.in_flight {
            state = self.signal.wait(state).unwrap();
        }
    }
}

impl Driver for ScriptedDriver {
    fn connect(
        &self,
        connection_string: &str,
        options: &Db2iConnectOptions,
    ) -> Result<Box<dyn NativeConnection>, NativeError> {
        let mut state = self.state.lock().unwrap();
        state.connect_strings.push(connection_string.to_string());
        if let Some(e) = state.connect_error.clone() {
            return Err(e);
        }
        Ok(Box::new(ScriptedConnection {
            driver: self.clone(),
            max_text_size: options.get_max_text_size(),
        }))
    }
}

struct ScriptedConnection {
    driver: ScriptedDriver,
    max_text_size: Option<usize>,
}

impl ScriptedConnection {
    fn run(&mut self, call: Call) -> Result<Box<dyn NativeCursor>, NativeError> {
        let mut state = self.driver.state.lock().unwrap();
        state.calls.push(call);
        let outcome = state.outcomes.pop_front().unwrap_or_else(|| Outcome::ok(-1));
        match outcome {
            Outcome::Fail(e) => Err(e),
            Outcome::Block => {
                state.in_flight = true;
                state.cancelled = false;
                self.driver.signal.notify_all();
                while !state.cancelled {
                    state = self.driver.signal.wait(state).unwrap();
                }
                state.in_flight = false;
                Err(NativeError::database(CANCELLED_MESSAGE))
            }
            Outcome::Sets { row_count, sets } => {
                let mut sets: VecDeque<ScriptedSet> = sets.into();
                let current = sets.pop_front().unwrap_or(ScriptedSet::NoColumns);
                if let ScriptedSet::Error(e) = current {
                    return Err(e);
                }
                Ok(Box::new(ScriptedCursor {
                    state: Arc::clone(&self.driver.state),
                    max_text_size: self.max_text_size,
                    row_count,
                    current,
                    remaining: sets,
                }))
            }
        }
    }
}

impl NativeConnection for ScriptedConnection {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn NativeCursor>, NativeError> {
        self.run(Call::Plain(sql.to_string()))
    }

    fn execute_with(
        &mut self,
        sql: &str,
        bindings: &[Db2iBinding],
    ) -> Result<Box<dyn NativeCursor>, NativeError> {
        self.run(Call::WithParams(sql.to_string(), bindings.to_vec()))
    }

    fn cancel_token(&self) -> Arc<dyn NativeCancel> {
        Arc::new(ScriptedCancel {
            driver: self.driver.clone(),
        })
    }

    fn close(self: Box<Self>) -> Result<(), NativeError> {
        let mut state = self.driver.state.lock().unwrap();
        state.closes += 1;
        match state.close_error.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Wakes a blocked statement, as a native cancel would.
struct ScriptedCancel {
    driver: ScriptedDriver,
}

impl NativeCancel for ScriptedCancel {
    fn cancel(&self) -> Result<(), NativeError> {
        let mut state = self.driver.state.lock().unwrap();
        state.cancels += 1;
        if state.in_flight {
            state.cancelled = true;
            self.driver.signal.notify_all();
        }
        Ok(())
    }
}

struct ScriptedCursor {
    state: Arc<Mutex<DriverState>>,
    max_text_size: Option<usize>,
    row_count: i64,
    current: ScriptedSet,
    remaining: VecDeque<ScriptedSet>,
}

impl NativeCursor for ScriptedCursor {
    fn row_count(&self) -> i64 {
        self.row_count
    }

    fn description(&self) -> Option<&[NativeColumn]> {
        match &self.current {
            ScriptedSet::Rows { columns, .. } => Some(columns.as_slice()),
            _ => None,
        }
    }

    fn fetch_all(&mut self) -> Result<Vec<Vec<Option<String>>>, NativeError> {
        self.state.lock().unwrap().fetches += 1;
        let max_text_size = self.max_text_size;
        match &mut self.current {
            ScriptedSet::Rows { rows, .. } => std::mem::take(rows)
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| {
                            cell.map(|text| decode_text_cell(text.as_bytes(), max_text_size))
                                .transpose()
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect(),
            ScriptedSet::NoColumns => Ok(Vec::new()),
            ScriptedSet::Error(e) => Err(e.clone()),
        }
    }

    fn next_set(&mut self) -> Result<bool, NativeError> {
        self.state.lock().unwrap().sets_stepped += 1;
        match self.remaining.pop_front() {
            None => Ok(false),
            Some(ScriptedSet::Error(e)) => Err(e),
            Some(set) => {
                self.current = set;
                Ok(true)
            }
        }
    }
}

/// A `log::Log` that keeps every record it receives.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<(Level, String, String)>>,
}

impl CapturingLogger {
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    pub fn records(&self) -> Vec<(Level, String, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|message| message.contains(needle))
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records.lock().unwrap().push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

pub const PASSWORD: &str = "s3cr3t-pw";

pub fn credentials() -> Db2iCredentials {
    Db2iCredentials::new("IBM i Access ODBC Driver", "myibmi", "MYDB")
        .user("dbtuser")
        .password(PASSWORD)
        .schema("ANALYTICS")
}

/// Options that never flag a statement as slow.
pub fn quiet_options() -> Db2iConnectOptions {
    Db2iConnectOptions::new().log_slow_statements(LevelFilter::Off, Duration::from_secs(3600))
}

/// A manager over a scripted driver with a capturing logger and a named
/// connection.
pub fn manager() -> (Db2iConnectionManager, ScriptedDriver, Arc<CapturingLogger>) {
    let driver = ScriptedDriver::new();
    let logger = Arc::new(CapturingLogger::default());
    let mut manager = Db2iConnectionManager::new(
        Arc::new(credentials()),
        Arc::new(driver.clone()),
        AdapterLogger::new(logger.clone()),
    )
    .with_options(quiet_options());
    manager.set_connection_name("model.jaffle.orders");
    (manager, driver, logger)
}
