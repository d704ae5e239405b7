//! Composable call instrumentation.
//!
//! A wrapping primitive plus a set of hooks that add cross-cutting behavior
//! (retry with backoff, execution timing, call/outcome logging,
//! environment-driven defaults, and doc-template filling) to arbitrary
//! callables without modifying their bodies.
//!
//! # Wrapping
//!
//! [`wrap`] pairs a function with an explicit [`FnMeta`] record (name,
//! documentation, parameter descriptors) standing in for the introspection a
//! reflective runtime would provide. The result forwards arguments and the
//! return value unchanged:
//!
//! ```ignore
//! use garnish::{FnMeta, wrap};
//!
//! let resize = wrap(
//!     FnMeta::new("resize").with_doc("Resize an image to a square"),
//!     |(path, px): (String, u32)| thumbnailer.resize(&path, px),
//! );
//! let bytes = resize.call(("avatar.png".to_string(), 64))?;
//! ```
//!
//! # Retry
//!
//! The retry controller attaches as an `around` hook and re-invokes the
//! layers beneath it on retryable failures, with constant or exponential
//! backoff:
//!
//! ```ignore
//! use garnish::{Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! let resize = resize.with_retry_if(
//!     RetryPolicy::new(3, Backoff::exponential(Duration::from_millis(50), 2.0)),
//!     |e: &IoError| e.kind() == ErrorKind::Interrupted,
//! );
//! ```
//!
//! # Stacking
//!
//! Hooks compose in a predictable order: the newest layer is the outermost,
//! and every layer reports the innermost target's metadata, however deep the
//! stack:
//!
//! ```ignore
//! let resize = resize.with_logging().with_timing();
//! assert_eq!(resize.metadata().name(), "resize");
//! ```

pub mod doc;
mod env;
mod logging;
mod meta;
mod retry;
mod timing;
mod wrap;


pub use env::*;
pub use logging::*;
pub use meta::*;
pub use retry::*;
pub use timing::*;
pub use wrap::*;
