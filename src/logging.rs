//! Call and outcome logging.
//!
//! A [`LogHook`] emits a `CALL` record when the layers beneath it start and
//! a `DONE` or `FAIL` record when they finish. The hook hands the callable's
//! name, arguments, and outcome to its formatters as opaque data; what the
//! records look like is entirely the formatters' business. Each of the three
//! records can be suppressed independently.

use crate::meta::FnMeta;
use crate::wrap::{CallHook, Callable, Wrapped};
use log::Level;
use std::fmt;

type CallFormatter<A> = Box<dyn Fn(&FnMeta, &A) -> String + Send + Sync>;
type DoneFormatter<T> = Box<dyn Fn(&FnMeta, &T) -> String + Send + Sync>;
type FailFormatter<E> = Box<dyn Fn(&FnMeta, &E) -> String + Send + Sync>;

/// `CALL <name>(<args>)`
pub fn format_call<A: fmt::Debug>(meta: &FnMeta, args: &A) -> String {
    format!("CALL {}({:?})", meta.name(), args)
}

/// `DONE <name> -> <value>`
pub fn format_done<T: fmt::Debug>(meta: &FnMeta, value: &T) -> String {
    format!("DONE {} -> {:?}", meta.name(), value)
}

/// `FAIL <name>: <error>`
pub fn format_fail<E: fmt::Display>(meta: &FnMeta, error: &E) -> String {
    format!("FAIL {}: {}", meta.name(), error)
}

/// Logs a record when a call starts and when it completes.
///
/// # Example
/// ```ignore
/// // default records at info level:
/// //   CALL resize(("avatar.png", 64))
/// //   DONE resize -> 4096
/// let resize = wrap(meta, resize_impl).with_logging();
///
/// // custom: drop the CALL record, log failures at warn level
/// let hook = LogHook::new()
///     .without_call()
///     .with_level(Level::Warn)
///     .without_done();
/// let resize = wrap(meta, resize_impl).with_log_hook(hook);
/// ```
pub struct LogHook<A, T, E> {
    target: String,
    level: Level,
    fmt_call: Option<CallFormatter<A>>,
    fmt_done: Option<DoneFormatter<T>>,
    fmt_fail: Option<FailFormatter<E>>,
}

impl<A, T, E> LogHook<A, T, E>
where
    A: fmt::Debug + 'static,
    T: fmt::Debug + 'static,
    E: fmt::Display + 'static,
{
    /// Hook with the default `CALL`/`DONE`/`FAIL` formatters.
    pub fn new() -> Self {
        Self {
            target: module_path!().to_string(),
            level: Level::Info,
            fmt_call: Some(Box::new(format_call::<A>)),
            fmt_done: Some(Box::new(format_done::<T>)),
            fmt_fail: Some(Box::new(format_fail::<E>)),
        }
    }
}

impl<A, T, E> Default for LogHook<A, T, E>
where
    A: fmt::Debug + 'static,
    T: fmt::Debug + 'static,
    E: fmt::Display + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> LogHook<A, T, E> {
    /// Logger target for the emitted records (this module's path by
    /// default).
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_call_format<F>(mut self, f: F) -> Self
    where
        F: Fn(&FnMeta, &A) -> String + Send + Sync + 'static,
    {
        self.fmt_call = Some(Box::new(f));
        self
    }

    pub fn with_done_format<F>(mut self, f: F) -> Self
    where
        F: Fn(&FnMeta, &T) -> String + Send + Sync + 'static,
    {
        self.fmt_done = Some(Box::new(f));
        self
    }

    pub fn with_fail_format<F>(mut self, f: F) -> Self
    where
        F: Fn(&FnMeta, &E) -> String + Send + Sync + 'static,
    {
        self.fmt_fail = Some(Box::new(f));
        self
    }

    /// Emit no record on call start.
    pub fn without_call(mut self) -> Self {
        self.fmt_call = None;
        self
    }

    /// Emit no record on success.
    pub fn without_done(mut self) -> Self {
        self.fmt_done = None;
        self
    }

    /// Emit no record on failure.
    pub fn without_fail(mut self) -> Self {
        self.fmt_fail = None;
        self
    }

    fn emit(&self, message: String) {
        log::log!(target: self.target.as_str(), self.level, "{message}");
    }
}

impl<A, T, E> CallHook<A, T, E> for LogHook<A, T, E> {
    fn before(&self, meta: &FnMeta, args: &A) {
        if let Some(fmt_call) = &self.fmt_call {
            self.emit(fmt_call(meta, args));
        }
    }

    fn after(&self, meta: &FnMeta, outcome: &Result<T, E>) {
        match outcome {
            Ok(value) => {
                if let Some(fmt_done) = &self.fmt_done {
                    self.emit(fmt_done(meta, value));
                }
            }
            Err(error) => {
                if let Some(fmt_fail) = &self.fmt_fail {
                    self.emit(fmt_fail(meta, error));
                }
            }
        }
    }
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
    A: fmt::Debug + 'static,
    C::Ok: fmt::Debug + 'static,
    C::Error: fmt::Display + 'static,
{
    /// Log every call and outcome with the default formatters.
    pub fn with_logging(self) -> Self {
        self.layer(LogHook::new())
    }
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
    A: 'static,
    C::Ok: 'static,
    C::Error: 'static,
{
    pub fn with_log_hook(self, hook: LogHook<A, C::Ok, C::Error>) -> Self {
        self.layer(hook)
    }
}
