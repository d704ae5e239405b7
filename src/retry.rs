//! Bounded re-invocation of a callable on failure.
//!
//! The retry controller attaches to a [`Wrapped`] callable as an `around`
//! hook. Each invocation runs its own attempt loop: invoke the layers
//! beneath, classify a failure as retryable or fatal, wait out the computed
//! backoff delay, and re-attempt up to the configured bound. Attempt
//! accounting is strictly per-call; exhausting retries on one call never
//! affects the next.
//!
//! By default **every** failure is classified retryable. That default is
//! deliberately permissive and can mask programming errors: a bug that
//! fails deterministically will be retried `max_attempts` times before it
//! surfaces. Narrow it with [`Wrapped::with_retry_if`] or
//! [`RetryHook::retry_if`] when the failure type distinguishes transient
//! from permanent conditions.

use crate::meta::FnMeta;
use crate::wrap::{CallHook, Callable, Wrapped};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

// ─── Backoff ───────────────────────────────────────────────────────────────────

/// Delay rule applied between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backoff {
    /// Same delay before every re-attempt. Zero is legal and re-attempts
    /// immediately, with no suspension.
    Constant(Duration),
    /// `base * factor^(attempt-1)` where `attempt` is the 1-based number of
    /// the attempt that just failed, optionally clamped to `cap`.
    #[serde(rename_all = "kebab-case")]
    Exponential {
        base: Duration,
        factor: f64,
        #[serde(default)]
        cap: Option<Duration>,
    },
}

impl Backoff {
    /// No delay between attempts.
    pub fn none() -> Self {
        Self::Constant(Duration::ZERO)
    }

    pub fn constant(delay: Duration) -> Self {
        Self::Constant(delay)
    }

    /// Exponential backoff starting at `base`, multiplying by `factor`
    /// after each failed attempt.
    pub fn exponential(base: Duration, factor: f64) -> Self {
        Self::Exponential {
            base,
            factor,
            cap: None,
        }
    }

    /// Clamp exponential delays to `cap`. No-op for constant backoff.
    pub fn with_cap(self, cap: Duration) -> Self {
        match self {
            Self::Exponential { base, factor, .. } => Self::Exponential {
                base,
                factor,
                cap: Some(cap),
            },
            other => other,
        }
    }

    /// Delay to wait after `attempt` (1-based) has failed, before the next
    /// attempt starts.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::Constant(delay) => *delay,
            Self::Exponential { base, factor, cap } => {
                let exp = attempt.saturating_sub(1);
                let mut secs = base.as_secs_f64() * factor.powi(exp as i32);
                if let Some(cap) = cap {
                    secs = secs.min(cap.as_secs_f64());
                }
                Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
            }
        }
    }
}

// ─── Retry Policy ──────────────────────────────────────────────────────────────

/// Configuration for retry behavior.
///
/// Immutable once a callable is constructed; shared read-only across all
/// invocations, including concurrent ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. A value of 1 means no
    /// retry: any failure is immediately terminal. Treated as at least 1.
    pub max_attempts: u32,

    /// Delay rule applied between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// 4 attempts, exponential backoff from 100ms doubling up to 10s.
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff: Backoff::exponential(Duration::from_millis(100), 2.0)
                .with_cap(Duration::from_secs(10)),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

// ─── Retry Hook ────────────────────────────────────────────────────────────────

type Classifier<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type RetryObserver<E> = Box<dyn Fn(&E, u32, Duration) + Send + Sync>;

/// The retry controller, attached to a callable as an `around` hook.
///
/// The controller itself logs nothing and never wraps or translates the
/// failure: on exhaustion or a fatal classification the caller sees exactly
/// the error of the final attempt. Observability goes through [`on_retry`]
/// or an outer logging layer.
///
/// [`on_retry`]: RetryHook::on_retry
///
/// # Example
/// ```ignore
/// let hook = RetryHook::new(RetryPolicy::default())
///     .retry_if(|e: &GatewayError| matches!(e, GatewayError::Connection))
///     .on_retry(|err, attempt, delay| {
///         warn!("attempt {attempt} failed ({err}), retrying in {delay:?}")
///     });
/// let fetch = wrap(meta, fetch_impl).layer(hook);
/// ```
pub struct RetryHook<E> {
    policy: RetryPolicy,
    classify: Classifier<E>,
    on_retry: Option<RetryObserver<E>>,
}

impl<E> RetryHook<E> {
    /// Every failure is considered retryable until [`retry_if`] narrows it.
    ///
    /// [`retry_if`]: RetryHook::retry_if
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            classify: Box::new(|_| true),
            on_retry: None,
        }
    }

    /// Classify failures: `true` is retryable, `false` is fatal. The
    /// predicate must be a pure function of the failure; it is consulted
    /// once per failed attempt.
    pub fn retry_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.classify = Box::new(predicate);
        self
    }

    /// Observe each scheduled re-attempt. Receives the failure, the 1-based
    /// number of the attempt that just failed, and the delay about to be
    /// waited.
    pub fn on_retry<C>(mut self, callback: C) -> Self
    where
        C: Fn(&E, u32, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Box::new(callback));
        self
    }
}

impl<A, T, E> CallHook<A, T, E> for RetryHook<E> {
    fn around(&self, _meta: &FnMeta, next: &mut dyn FnMut() -> Result<T, E>) -> Result<T, E> {
        let bound = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match next() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !(self.classify)(&e) || attempt >= bound {
                        return Err(e);
                    }
                    let delay = self.policy.backoff.delay_for_attempt(attempt);
                    if let Some(cb) = &self.on_retry {
                        cb(&e, attempt, delay);
                    }
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
    C::Error: 'static,
{
    /// Retry every failure per `policy` (the permissive default classifier;
    /// see the module docs for the risk this carries).
    pub fn with_retry(self, policy: RetryPolicy) -> Self {
        self.layer(RetryHook::new(policy))
    }

    /// Retry only failures for which `predicate` returns true; everything
    /// else is fatal and propagates on the first occurrence.
    pub fn with_retry_if<P>(self, policy: RetryPolicy, predicate: P) -> Self
    where
        P: Fn(&C::Error) -> bool + Send + Sync + 'static,
    {
        self.layer(RetryHook::new(policy).retry_if(predicate))
    }
}
