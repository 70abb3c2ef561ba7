//! The model-side interface: how an engine reaches into the caller's
//! factor graph to discover structure, per spec.md §6.
//!
//! `Signal` handles live in the engine's arena, never in the backend. The
//! backend only ever speaks in [`VariableId`]/[`FactorId`] — opaque keys
//! it defines the meaning of.

use crate::error::EngineError;
use crate::request::Engine;
use crate::signal::Signal;
use crate::variant::{FactorId, VariableId};

/// Read access to one variable node of the model.
pub trait VariableAccess {
    /// The variable's identifier, as the backend assigned it.
    fn id(&self) -> VariableId;
    /// Display name, for diagnostics.
    fn name(&self) -> &str;
    /// Number of discrete states this variable ranges over.
    fn cardinality(&self) -> usize;
    /// This variable's `IndividualMarginal` signal.
    fn marginal(&self) -> Signal;
    /// Every signal linked to this variable (messages and joint marginals
    /// that mention it), in link order.
    fn linked_signals(&self) -> &[Signal];
}

/// Read access to one factor node of the model.
pub trait FactorAccess {
    /// The factor's identifier, as the backend assigned it.
    fn id(&self) -> FactorId;
    /// This factor's local (single-factor) marginal signals.
    fn local_marginals(&self) -> &[Signal];
}

/// Read access to one variable-factor connection (an edge of the
/// underlying bipartite factor graph).
pub trait ConnectionAccess {
    /// The variable end of the edge.
    fn variable_id(&self) -> VariableId;
    /// The factor end of the edge.
    fn factor_id(&self) -> FactorId;
    /// This edge's variable→factor message signal.
    fn message_to_factor(&self) -> Signal;
    /// This edge's factor→variable message signal.
    fn message_to_variable(&self) -> Signal;
}

/// The model a [`crate::request::Engine`] runs inference over.
///
/// Implementors own the factor graph's structure; the engine never
/// mutates it, only queries it while wiring up signals.
pub trait ModelBackend {
    type Variable: VariableAccess;
    type Factor: FactorAccess;
    type Connection: ConnectionAccess;

    /// Checked once at [`crate::request::Engine::new`]. A backend that
    /// returns `false` here causes construction to fail with
    /// [`EngineError::UnsupportedBackend`].
    fn is_supported(&self) -> bool {
        true
    }

    /// The concrete backend type's name, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Every variable id in the model, in a stable but unspecified order.
    fn variable_ids(&self) -> Vec<VariableId>;

    /// Every factor id in the model, in a stable but unspecified order.
    fn factor_ids(&self) -> Vec<FactorId>;

    fn get_variable(&self, id: VariableId) -> Option<&Self::Variable>;

    fn get_factor(&self, id: FactorId) -> Option<&Self::Factor>;

    fn get_connection(&self, variable_id: VariableId, factor_id: FactorId)
        -> Option<&Self::Connection>;

    /// Factors touching `variable_id`, in a fixed order the backend must
    /// keep stable across calls (message ordering depends on it).
    fn connected_factor_ids(&self, variable_id: VariableId) -> Vec<FactorId>;

    /// Variables touching `factor_id`, in a fixed order the backend must
    /// keep stable across calls.
    fn connected_variable_ids(&self, factor_id: FactorId) -> Vec<VariableId>;

    /// Records that `signal` is linked to `variable_id` (appends to that
    /// variable's `linked_signals`).
    fn link_variable(&mut self, variable_id: VariableId, signal: Signal) -> Result<(), EngineError>;

    /// Records `signal` as one of `factor_id`'s local marginals.
    fn add_factor_local_marginal(
        &mut self,
        factor_id: FactorId,
        signal: Signal,
    ) -> Result<(), EngineError>;
}

/// Wires dependency edges between an engine's signals (spec.md §6's
/// "DependencyResolver").
///
/// Split out from `ModelBackend` so a caller can supply resolution logic
/// (e.g. caching, or a derived ordering) without reimplementing the whole
/// backend. The engine never calls this itself — populating the DAG
/// initially is the caller's responsibility; this trait exists only so a
/// resolver and the engine's types can be named together at call sites.
pub trait DependencyResolver<B: ModelBackend> {
    /// Wires whatever edges are missing from `engine`'s signal graph,
    /// using structural information read from `engine.backend()`.
    ///
    /// Must be idempotent: calling `resolve` again on an already-wired
    /// engine must not duplicate or corrupt existing edges.
    fn resolve<V, M>(&self, engine: &mut Engine<B, V, M>) -> Result<(), EngineError> {
        let _ = engine;
        Ok(())
    }
}
