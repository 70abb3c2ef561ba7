//! Ties a [`ModelBackend`] to a [`SignalGraph`] and drives inference
//! requests to a fixed point, per spec.md §4.7.

use smallvec::SmallVec;
use tracing::debug;

use crate::backend::ModelBackend;
use crate::error::EngineError;
use crate::graph::SignalGraph;
use crate::processor::{dispatch, InferenceRequestProcessor};
use crate::signal::Signal;
use crate::variant::VariableId;

/// Bundles a caller's model with the engine's own signal arena.
pub struct Engine<B, V, M> {
    backend: B,
    graph: SignalGraph<V, M>,
}

impl<B, V, M> Engine<B, V, M>
where
    B: ModelBackend,
{
    /// Fails with [`EngineError::UnsupportedBackend`] if
    /// `backend.is_supported()` is false.
    pub fn new(backend: B) -> Result<Self, EngineError> {
        if !backend.is_supported() {
            return Err(EngineError::UnsupportedBackend {
                backend_type: backend.type_name(),
            });
        }
        Ok(Self {
            backend,
            graph: SignalGraph::new(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn graph(&self) -> &SignalGraph<V, M> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SignalGraph<V, M> {
        &mut self.graph
    }
}

/// An in-flight request for a set of variables' marginals.
pub struct InferenceRequest {
    variable_ids: Vec<VariableId>,
    marginals: Vec<Signal>,
    readiness: Vec<bool>,
}

impl InferenceRequest {
    pub fn variable_ids(&self) -> &[VariableId] {
        &self.variable_ids
    }

    pub fn marginals(&self) -> &[Signal] {
        &self.marginals
    }

    /// Whether each requested variable's marginal has become pending
    /// during the sweep (not yet computed — merely unblocked).
    pub fn readiness(&self) -> &[bool] {
        &self.readiness
    }

    /// Marks index `i` ready. Exposed for [`crate::tracer`]'s
    /// reimplementation of the sweep loop.
    pub(crate) fn mark_ready(&mut self, i: usize) {
        self.readiness[i] = true;
    }
}

/// Creates a request for `variable_ids` and primes the pending protocol:
/// every direct dependency of each marginal, and every signal linked to
/// each requested variable, is marked potentially-pending so the first
/// sweep round has somewhere to start.
///
/// Fails with [`EngineError::UnknownVariableId`] if any id has no
/// variable in `engine`'s backend.
pub fn request_inference_for<B, V, M>(
    engine: &mut Engine<B, V, M>,
    variable_ids: &[VariableId],
) -> Result<InferenceRequest, EngineError>
where
    B: ModelBackend,
{
    debug!(count = variable_ids.len(), "requesting inference");

    let mut marginals = Vec::with_capacity(variable_ids.len());
    for &id in variable_ids {
        let variable = engine
            .backend
            .get_variable(id)
            .ok_or(EngineError::UnknownVariableId { variable_id: id })?;
        marginals.push(variable.marginal());
    }

    for &marginal in &marginals {
        let deps: SmallVec<[Signal; 4]> = engine.graph.get_dependencies(marginal).into();
        for dep in deps {
            engine.graph.mark_potentially_pending(dep);
        }
    }

    for &id in variable_ids {
        let linked: Vec<Signal> = engine
            .backend
            .get_variable(id)
            .expect("variable id already validated above")
            .linked_signals()
            .to_vec();
        for signal in linked {
            engine.graph.mark_potentially_pending(signal);
        }
    }

    Ok(InferenceRequest {
        variable_ids: variable_ids.to_vec(),
        marginals,
        readiness: vec![false; variable_ids.len()],
    })
}

/// Runs `process_dependencies` for one requested marginal: a pending
/// dependency is dispatched and computed; anything else is left alone
/// for a later round.
fn process_inference_request<V, M, P>(
    processor: &mut P,
    graph: &mut SignalGraph<V, M>,
    marginal: Signal,
) -> Result<bool, EngineError>
where
    P: InferenceRequestProcessor<V, M>,
{
    crate::traversal::process_dependencies(graph, marginal, true, &mut |graph, dep| {
        if graph.is_pending(dep) {
            dispatch(processor, graph, dep)
        } else {
            Ok(false)
        }
    })
}

/// Drives `request` to completion: alternating forward/reverse sweeps
/// until a round makes no progress, then one final round that
/// force-computes any marginal (and any linked signal of any requested
/// variable) still pending. See spec.md §4.7 for the exact algorithm;
/// the final round's "every linked signal regardless of whether its
/// marginal was just recomputed" behavior is preserved verbatim (see
/// the open question recorded in DESIGN.md).
pub fn update_marginals<B, V, M, P>(
    engine: &mut Engine<B, V, M>,
    processor: &mut P,
    request: &mut InferenceRequest,
) -> Result<(), EngineError>
where
    B: ModelBackend,
    P: InferenceRequestProcessor<V, M>,
{
    let n = request.variable_ids.len();
    let mut is_reverse = false;

    loop {
        let mut made_progress = false;
        let order: SmallVec<[usize; 16]> = if is_reverse {
            (0..n).rev().collect()
        } else {
            (0..n).collect()
        };

        for i in order {
            if request.readiness[i] {
                continue;
            }
            let marginal = request.marginals[i];
            let did_work = process_inference_request(processor, &mut engine.graph, marginal)?;
            if engine.graph.is_pending(marginal) {
                request.readiness[i] = true;
            }
            made_progress |= did_work;
        }

        debug!(is_reverse, made_progress, "inference sweep round complete");
        is_reverse = !is_reverse;
        if !made_progress {
            break;
        }
    }

    for i in 0..n {
        let marginal = request.marginals[i];
        if engine.graph.is_pending(marginal) {
            dispatch(processor, &mut engine.graph, marginal)?;
        }

        let linked: Vec<Signal> = engine
            .backend
            .get_variable(request.variable_ids[i])
            .expect("variable id already validated in request_inference_for")
            .linked_signals()
            .to_vec();
        for signal in linked {
            if engine.graph.is_pending(signal) {
                dispatch(processor, &mut engine.graph, signal)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DependencyResolver;
    use crate::test_support::{MockBackend, NullResolver};
    use crate::variant::Variant;

    struct Identity;
    impl InferenceRequestProcessor<i64, ()> for Identity {
        fn process_individual_marginal(
            &mut self,
            graph: &mut SignalGraph<i64, ()>,
            signal: Signal,
            _variable_id: VariableId,
        ) -> Result<bool, EngineError> {
            graph.compute(signal, true, |inner, deps| {
                Ok(deps.first().and_then(|&d| inner.get_value(d)).copied().unwrap_or(0))
            })?;
            Ok(true)
        }
    }

    #[test]
    fn unsupported_backend_fails_construction() {
        let backend = MockBackend::unsupported();
        let err = Engine::<_, i64, ()>::new(backend).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnsupportedBackend {
                backend_type: "MockBackend"
            }
        );
    }

    #[test]
    fn request_for_unknown_variable_id_errors() {
        let backend = MockBackend::new();
        let mut engine: Engine<_, i64, ()> = Engine::new(backend).unwrap();
        let err = request_inference_for(&mut engine, &[42]).unwrap_err();
        assert_eq!(err, EngineError::UnknownVariableId { variable_id: 42 });
    }

    fn chain_engine() -> (Engine<MockBackend, i64, ()>, Vec<Signal>) {
        let backend = MockBackend::new();
        let mut engine = Engine::new(backend).unwrap();

        let mut signals = Vec::new();
        for i in 0..5u64 {
            let s = engine
                .graph
                .create_signal(None, Variant::IndividualMarginal { variable_id: i + 1 }, None);
            signals.push(s);
        }
        for (i, &s) in signals.iter().enumerate() {
            engine.backend_mut().add_variable(i as u64 + 1, "m", 2, s);
        }
        // Mi depends on M(i-1); all but the first link are intermediate,
        // so one top-level process_dependencies call on M5 can cascade
        // all the way down to M1 in a single sweep round.
        for i in 1..5 {
            engine
                .graph
                .add_dependency(signals[i], signals[i - 1], false, true, true, true);
        }
        engine.graph.set_value(signals[0], 1);
        (engine, signals)
    }

    #[test]
    fn sweep_alternation_single_forward_pass_s4() {
        crate::test_support::init_tracing();
        let (mut engine, signals) = chain_engine();
        let mut request = request_inference_for(&mut engine, &[5]).unwrap();
        let mut processor = Identity;
        update_marginals(&mut engine, &mut processor, &mut request).unwrap();

        for &s in &signals {
            assert_eq!(engine.graph().get_value(s).copied(), Some(1));
        }
    }

    #[test]
    fn default_resolver_is_a_no_op() {
        let (mut engine, signals) = chain_engine();
        NullResolver.resolve(&mut engine).unwrap();
        // Wiring untouched: still exactly the hand-built chain.
        for i in 1..5 {
            assert_eq!(engine.graph().get_dependencies(signals[i]), &[signals[i - 1]]);
        }
    }

    #[test]
    fn update_marginals_terminates_p9() {
        let (mut engine, _signals) = chain_engine();
        let mut request = request_inference_for(&mut engine, &[5]).unwrap();
        let mut processor = Identity;
        let result = update_marginals(&mut engine, &mut processor, &mut request);
        assert!(result.is_ok());
    }
}
