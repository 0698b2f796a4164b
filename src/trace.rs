//! Logging macros that forward to `tracing` when the feature is on.
//!
//! Without the `tracing` feature every macro only evaluates its field values,
//! so call sites never need `cfg` attributes.

/// Opens an info-level span around one pipeline stage.
///
/// Use as `let _span = trace_span!("decode", rows = n).entered();`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits a named event at the given `tracing` level.
#[cfg(feature = "tracing")]
macro_rules! trace_at {
    ($level:ident, $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::$level!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_at {
    ($level:ident, $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

/// Stage counters (info).
macro_rules! trace_event {
    ($name:expr, $($field:tt)+) => {
        $crate::trace::trace_at!(info, $name, $($field)+)
    };
}

/// Tolerated oddities such as a zero-area union (debug).
macro_rules! trace_debug {
    ($name:expr, $($field:tt)+) => {
        $crate::trace::trace_at!(debug, $name, $($field)+)
    };
}

/// Frames that produce no output because of an error (warn).
macro_rules! trace_warn {
    ($name:expr, $($field:tt)+) => {
        $crate::trace::trace_at!(warn, $name, $($field)+)
    };
}

pub(crate) use trace_at;
pub(crate) use trace_debug;
pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_warn;

/// Stand-in for `tracing::Span` when the feature is off.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
