//! Elapsed-time instrumentation.
//!
//! A [`TimingHook`] takes one clock reading before the layers beneath it run
//! and one after, then emits a single log record per call. Stacked outside a
//! retry layer it times the whole invocation, backoff delays included;
//! stacked inside, it times each attempt.

use crate::meta::FnMeta;
use crate::wrap::{CallHook, Callable, Wrapped};
use log::Level;
use std::time::{Duration, Instant};

/// Monotonic time source.
///
/// Readings are offsets from an arbitrary fixed origin; only differences are
/// meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Default clock: offsets from the moment the clock was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

type TimeFormatter = Box<dyn Fn(&FnMeta, Duration) -> String + Send + Sync>;

/// `TIME <name> <secs>s`
fn format_time(meta: &FnMeta, elapsed: Duration) -> String {
    format!("TIME {} {:.2}s", meta.name(), elapsed.as_secs_f64())
}

/// Logs the wall time taken by each call.
pub struct TimingHook {
    target: String,
    level: Level,
    clock: Box<dyn Clock>,
    format: TimeFormatter,
}

impl TimingHook {
    pub fn new() -> Self {
        Self {
            target: module_path!().to_string(),
            level: Level::Info,
            clock: Box::new(MonotonicClock::default()),
            format: Box::new(format_time),
        }
    }

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

    pub fn with_clock<K>(mut self, clock: K) -> Self
    where
        K: Clock + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&FnMeta, Duration) -> String + Send + Sync + 'static,
    {
        self.format = Box::new(format);
        self
    }
}

impl Default for TimingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> CallHook<A, T, E> for TimingHook {
    fn around(&self, meta: &FnMeta, next: &mut dyn FnMut() -> Result<T, E>) -> Result<T, E> {
        let start = self.clock.now();
        let outcome = next();
        let elapsed = self.clock.now().saturating_sub(start);
        let message = (self.format)(meta, elapsed);
        log::log!(target: self.target.as_str(), self.level, "{message}");
        outcome
    }
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
{
    /// Time each call with the default clock and message shape.
    pub fn with_timing(self) -> Self {
        self.layer(TimingHook::new())
    }

    pub fn with_timing_hook(self, hook: TimingHook) -> Self {
        self.layer(hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FnMeta;
    use crate::wrap::wrap;
    use std::sync::{Arc, Mutex};

    /// Clock that steps forward a fixed amount on every reading.
    struct SteppingClock {
        step: Duration,
        reading: Mutex<Duration>,
    }

    impl SteppingClock {
        fn new(step: Duration) -> Self {
            Self {
                step,
                reading: Mutex::new(Duration::ZERO),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Duration {
            let mut reading = self.reading.lock().unwrap();
            let current = *reading;
            *reading += self.step;
            current
        }
    }

    #[test]
    fn reports_elapsed_between_two_readings() {
        let elapsed_seen = Arc::new(Mutex::new(Vec::new()));
        let e = elapsed_seen.clone();

        let f = wrap(FnMeta::new("work"), |_: ()| Ok::<(), anyhow::Error>(()))
            .with_timing_hook(
                TimingHook::new()
                    .with_clock(SteppingClock::new(Duration::from_millis(250)))
                    .with_format(move |meta, elapsed| {
                        e.lock().unwrap().push(elapsed);
                        format_time(meta, elapsed)
                    }),
            );

        f.call(()).unwrap();
        assert_eq!(*elapsed_seen.lock().unwrap(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn times_failed_calls_too() {
        let formatted = Arc::new(Mutex::new(Vec::new()));
        let m = formatted.clone();

        let f = wrap(FnMeta::new("doomed"), |_: ()| {
            Err::<(), anyhow::Error>(anyhow::anyhow!("broken"))
        })
        .with_timing_hook(
            TimingHook::new()
                .with_clock(SteppingClock::new(Duration::from_millis(10)))
                .with_format(move |meta, elapsed| {
                    let msg = format_time(meta, elapsed);
                    m.lock().unwrap().push(msg.clone());
                    msg
                }),
        );

        assert!(f.call(()).is_err());
        assert_eq!(*formatted.lock().unwrap(), vec!["TIME doomed 0.01s"]);
    }

    #[test]
    fn default_message_shape() {
        let meta = FnMeta::new("sync_repos");
        assert_eq!(
            format_time(&meta, Duration::from_millis(750)),
            "TIME sync_repos 0.75s"
        );
    }

    #[test]
    fn monotonic_clock_advances() {
        let clock = MonotonicClock::default();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
