//! # GUI Error Types
//!
//! Failures are split the way the engine treats them: misuse errors surface
//! synchronously from the call that caused them; widget-internal faults are
//! isolated per widget and logged by the tick pass.

use aurora_protocol::{CodecError, WidgetId};
use thiserror::Error;

/// Programmer-misuse errors raised by composition operations.
///
/// These fail fast and synchronously. Cases the original system guarded with
/// null checks are unrepresentable here; what remains are the structural
/// mistakes the type system cannot rule out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// A composite was attached to itself.
    #[error("widget {0} cannot be attached to itself")]
    AttachToSelf(WidgetId),
}

/// Faults raised inside a widget's own hooks or encoding.
///
/// A hook fault never propagates past the widget that raised it: the tick
/// pass logs it and continues with the remaining widgets.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// A per-widget update or animate hook failed.
    #[error("widget hook failed: {0}")]
    Hook(String),

    /// Widget state could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
