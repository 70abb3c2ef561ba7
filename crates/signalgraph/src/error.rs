//! Error and warning types for the signal-graph engine.

use thiserror::Error;

use crate::signal::Signal;
use crate::variant::VariableId;

/// Fatal conditions raised by the engine.
///
/// These are never caught internally; they propagate to the caller of
/// whichever entry point produced them, per the crate's propagation policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// A model backend failed its support check at engine construction time.
    #[error("backend type `{backend_type}` is not supported by this engine")]
    UnsupportedBackend {
        /// The concrete type name of the rejected backend.
        backend_type: &'static str,
    },

    /// A required backend or processor method was not implemented.
    #[error("`{method}` is not implemented for `{type_name}`")]
    InterfaceNotImplemented {
        /// The method that was called.
        method: &'static str,
        /// The concrete type that was missing it.
        type_name: &'static str,
    },

    /// `compute` was called on a signal that is not pending, without `force`.
    #[error("compute() called on non-pending signal {signal:?} without force")]
    ComputeOnNonPending {
        /// The signal that was not pending.
        signal: Signal,
    },

    /// Dispatch encountered a variant with no matching processor rule
    /// (including `Unspecified`).
    #[error("no processor rule for the variant of signal {signal:?}")]
    UnknownVariant {
        /// The signal whose variant could not be dispatched.
        signal: Signal,
    },

    /// A caller asked the driver for a variable id the backend has no
    /// variable for.
    #[error("no variable with id {variable_id} in this backend")]
    UnknownVariableId {
        /// The id that was requested.
        variable_id: VariableId,
    },
}

/// A non-fatal observation recorded during a run.
///
/// Warnings are appended to [`crate::graph::SignalGraph::warnings`] and do
/// not stop inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineWarning {
    /// Human-readable description of what was observed.
    pub message: String,
    /// The signal the warning pertains to, if any.
    pub signal: Option<Signal>,
}

impl EngineWarning {
    /// Creates a warning not tied to any particular signal.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            signal: None,
        }
    }

    /// Creates a warning tied to `signal`.
    pub fn for_signal(message: impl Into<String>, signal: Signal) -> Self {
        Self {
            message: message.into(),
            signal: Some(signal),
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
