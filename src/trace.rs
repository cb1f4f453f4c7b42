//! Logging hooks.
//!
//! With the `tracing` feature the macros forward to the `tracing` crate.
//! Without it they expand to nothing, so the default build carries no logging
//! cost. Nothing on the push/pop path logs either way.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! trace_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {debug_noop as debug, trace_noop as trace, warn_noop as warn};
