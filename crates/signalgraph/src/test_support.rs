//! A minimal in-memory [`ModelBackend`] used only by this crate's own
//! test suite to exercise the driver end to end.

#![cfg(test)]

use rustc_hash::FxHashMap;

use crate::backend::{ConnectionAccess, DependencyResolver, FactorAccess, ModelBackend, VariableAccess};
use crate::error::EngineError;
use crate::signal::Signal;
use crate::variant::{FactorId, VariableId};

pub struct MockVariable {
    id: VariableId,
    name: String,
    cardinality: usize,
    marginal: Signal,
    linked: Vec<Signal>,
}

impl VariableAccess for MockVariable {
    fn id(&self) -> VariableId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn cardinality(&self) -> usize {
        self.cardinality
    }
    fn marginal(&self) -> Signal {
        self.marginal
    }
    fn linked_signals(&self) -> &[Signal] {
        &self.linked
    }
}

pub struct MockFactor {
    id: FactorId,
    local_marginals: Vec<Signal>,
}

impl FactorAccess for MockFactor {
    fn id(&self) -> FactorId {
        self.id
    }
    fn local_marginals(&self) -> &[Signal] {
        &self.local_marginals
    }
}

pub struct MockConnection {
    variable_id: VariableId,
    factor_id: FactorId,
    message_to_variable: Signal,
    message_to_factor: Signal,
}

impl ConnectionAccess for MockConnection {
    fn variable_id(&self) -> VariableId {
        self.variable_id
    }
    fn factor_id(&self) -> FactorId {
        self.factor_id
    }
    fn message_to_factor(&self) -> Signal {
        self.message_to_factor
    }
    fn message_to_variable(&self) -> Signal {
        self.message_to_variable
    }
}

/// A hand-wired model backend: callers populate variables/factors
/// directly rather than through a parser.
#[derive(Default)]
pub struct MockBackend {
    supported: bool,
    variables: FxHashMap<VariableId, MockVariable>,
    factors: FxHashMap<FactorId, MockFactor>,
    connections: FxHashMap<(VariableId, FactorId), MockConnection>,
    adjacency: FxHashMap<VariableId, Vec<FactorId>>,
    reverse_adjacency: FxHashMap<FactorId, Vec<VariableId>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            supported: true,
            ..Default::default()
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Default::default()
        }
    }

    pub fn add_variable(&mut self, id: VariableId, name: &str, cardinality: usize, marginal: Signal) {
        self.variables.insert(
            id,
            MockVariable {
                id,
                name: name.to_string(),
                cardinality,
                marginal,
                linked: Vec::new(),
            },
        );
    }

    pub fn add_factor(&mut self, id: FactorId) {
        self.factors.insert(
            id,
            MockFactor {
                id,
                local_marginals: Vec::new(),
            },
        );
    }

    pub fn add_connection(
        &mut self,
        variable_id: VariableId,
        factor_id: FactorId,
        message_to_variable: Signal,
        message_to_factor: Signal,
    ) {
        self.connections.insert(
            (variable_id, factor_id),
            MockConnection {
                variable_id,
                factor_id,
                message_to_variable,
                message_to_factor,
            },
        );
        self.adjacency.entry(variable_id).or_default().push(factor_id);
        self.reverse_adjacency.entry(factor_id).or_default().push(variable_id);
    }
}

impl ModelBackend for MockBackend {
    type Variable = MockVariable;
    type Factor = MockFactor;
    type Connection = MockConnection;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn type_name(&self) -> &'static str {
        "MockBackend"
    }

    fn variable_ids(&self) -> Vec<VariableId> {
        let mut ids: Vec<_> = self.variables.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn factor_ids(&self) -> Vec<FactorId> {
        let mut ids: Vec<_> = self.factors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn get_variable(&self, id: VariableId) -> Option<&MockVariable> {
        self.variables.get(&id)
    }

    fn get_factor(&self, id: FactorId) -> Option<&MockFactor> {
        self.factors.get(&id)
    }

    fn get_connection(&self, variable_id: VariableId, factor_id: FactorId) -> Option<&MockConnection> {
        self.connections.get(&(variable_id, factor_id))
    }

    fn connected_factor_ids(&self, variable_id: VariableId) -> Vec<FactorId> {
        self.adjacency.get(&variable_id).cloned().unwrap_or_default()
    }

    fn connected_variable_ids(&self, factor_id: FactorId) -> Vec<VariableId> {
        self.reverse_adjacency.get(&factor_id).cloned().unwrap_or_default()
    }

    fn link_variable(&mut self, variable_id: VariableId, signal: Signal) -> Result<(), EngineError> {
        self.variables
            .get_mut(&variable_id)
            .expect("unknown variable id")
            .linked
            .push(signal);
        Ok(())
    }

    fn add_factor_local_marginal(&mut self, factor_id: FactorId, signal: Signal) -> Result<(), EngineError> {
        self.factors
            .get_mut(&factor_id)
            .expect("unknown factor id")
            .local_marginals
            .push(signal);
        Ok(())
    }
}

/// A no-op resolver; this backend's tests wire edges by hand.
pub struct NullResolver;
impl DependencyResolver<MockBackend> for NullResolver {}

/// Installs a `tracing` subscriber once so `cargo test -- --nocapture`
/// surfaces the engine's `debug!`/`warn!` events, mirroring
/// `blinc_test_suite`'s own registry setup.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
            .with_test_writer()
            .try_init();
    });
}
