//! Injected logging for adapter components.

use log::{Level, Log, Metadata, Record};
use std::fmt::{self, Arguments};
use std::sync::Arc;

/// Target used for every record emitted by the adapter unless overridden.
pub const DEFAULT_TARGET: &str = "db2_for_i";

/// Forwards to whatever logger is installed through the `log` facade.
struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

/// A logger handed to each component at construction.
///
/// Cloning is cheap; clones share the same sink.
#[derive(Clone)]
pub struct AdapterLogger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl AdapterLogger {
    /// Log through a specific sink.
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// Log through the process-wide `log` logger.
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalSink))
    }

    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn log(&self, level: Level, args: Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn debug(&self, args: Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    pub fn info(&self, args: Arguments<'_>) {
        self.log(Level::Info, args)
    }

    pub fn warn(&self, args: Arguments<'_>) {
        self.log(Level::Warn, args)
    }
}

impl fmt::Debug for AdapterLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterLogger")
            .field("target", &self.target)
            .finish()
    }
}
