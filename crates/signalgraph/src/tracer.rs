//! Optional per-request/per-round/per-execution timing, gated behind the
//! `trace` feature so the "zero overhead when disabled" claim in
//! spec.md §4.8 is literally true: none of this code exists otherwise.

use std::time::{Duration, Instant};

use crate::error::EngineError;
use crate::graph::SignalGraph;
use crate::processor::{dispatch, InferenceRequestProcessor};
use crate::signal::Signal;
use crate::variant::VariableId;

/// One dispatched compute, with the signal's value immediately before and
/// after.
#[derive(Debug, Clone)]
pub struct TracedInferenceExecution<V> {
    pub variable_id: VariableId,
    pub signal: Signal,
    pub total: Duration,
    pub value_before: Option<V>,
    pub value_after: Option<V>,
}

/// One non-empty sweep iteration. Empty rounds (zero executions) are
/// never constructed — the caller discards them before pushing.
#[derive(Debug, Clone)]
pub struct TracedInferenceRound<V> {
    pub total: Duration,
    pub executions: Vec<TracedInferenceExecution<V>>,
}

/// One `update_marginals` call.
#[derive(Debug, Clone)]
pub struct TracedInferenceRequest<V> {
    pub total: Duration,
    pub rounds: Vec<TracedInferenceRound<V>>,
}

/// Decorates an [`InferenceRequestProcessor`], recording a
/// [`TracedInferenceExecution`] around every dispatched compute.
///
/// `V` must be `Clone` to capture before/after snapshots; this is the one
/// place in the crate that requires it.
pub struct TracingProcessor<'p, V, M, P> {
    inner: &'p mut P,
    current_round: Vec<TracedInferenceExecution<V>>,
    _marker: std::marker::PhantomData<M>,
}

impl<'p, V, M, P> TracingProcessor<'p, V, M, P> {
    pub fn new(inner: &'p mut P) -> Self {
        Self {
            inner,
            current_round: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Drains executions recorded since the last call, wrapping them as a
    /// round if any occurred (empty rounds are discarded per spec.md
    /// §4.8).
    fn take_round(&mut self, elapsed: Duration) -> Option<TracedInferenceRound<V>> {
        if self.current_round.is_empty() {
            return None;
        }
        Some(TracedInferenceRound {
            total: elapsed,
            executions: std::mem::take(&mut self.current_round),
        })
    }
}

fn trace_call<V, M, P>(
    tracer: &mut TracingProcessor<'_, V, M, P>,
    graph: &mut SignalGraph<V, M>,
    signal: Signal,
    variable_id: VariableId,
    mut run: impl FnMut(&mut P, &mut SignalGraph<V, M>, Signal) -> Result<bool, EngineError>,
) -> Result<bool, EngineError>
where
    V: Clone,
{
    let value_before = graph.get_value(signal).cloned();
    let start = Instant::now();
    let handled = run(&mut *tracer.inner, graph, signal)?;
    let total = start.elapsed();
    let value_after = graph.get_value(signal).cloned();
    tracer.current_round.push(TracedInferenceExecution {
        variable_id,
        signal,
        total,
        value_before,
        value_after,
    });
    Ok(handled)
}

impl<'p, V, M, P> InferenceRequestProcessor<V, M> for TracingProcessor<'p, V, M, P>
where
    V: Clone,
    P: InferenceRequestProcessor<V, M>,
{
    fn process_message_to_variable(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        factor_id: crate::variant::FactorId,
    ) -> Result<bool, EngineError> {
        trace_call(self, graph, signal, variable_id, |p, g, s| {
            p.process_message_to_variable(g, s, variable_id, factor_id)
        })
    }

    fn process_message_to_factor(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        factor_id: crate::variant::FactorId,
    ) -> Result<bool, EngineError> {
        trace_call(self, graph, signal, variable_id, |p, g, s| {
            p.process_message_to_factor(g, s, variable_id, factor_id)
        })
    }

    fn process_product_of_messages(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        range: (usize, usize),
        connected_factors: &[crate::variant::FactorId],
    ) -> Result<bool, EngineError> {
        let factors = connected_factors.to_vec();
        trace_call(self, graph, signal, variable_id, |p, g, s| {
            p.process_product_of_messages(g, s, variable_id, range, &factors)
        })
    }

    fn process_individual_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
    ) -> Result<bool, EngineError> {
        trace_call(self, graph, signal, variable_id, |p, g, s| {
            p.process_individual_marginal(g, s, variable_id)
        })
    }

    fn process_joint_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        factor_id: crate::variant::FactorId,
        variable_ids: &[VariableId],
    ) -> Result<bool, EngineError> {
        let ids = variable_ids.to_vec();
        // A joint marginal has no single owning variable; the first
        // participant is recorded for the trace's `variable_id` field.
        let variable_id = ids.first().copied().unwrap_or(0);
        trace_call(self, graph, signal, variable_id, |p, g, s| {
            p.process_joint_marginal(g, s, factor_id, &ids)
        })
    }
}

/// Runs `update_marginals` through `processor` wrapped in a
/// [`TracingProcessor`], returning both the normal result and the
/// collected trace. See [`crate::request::update_marginals`] for the
/// untraced driver this wraps.
pub fn update_marginals_traced<B, V, M, P>(
    engine: &mut crate::request::Engine<B, V, M>,
    processor: &mut P,
    request: &mut crate::request::InferenceRequest,
) -> Result<TracedInferenceRequest<V>, EngineError>
where
    B: crate::backend::ModelBackend,
    V: Clone,
    P: InferenceRequestProcessor<V, M>,
{
    let request_start = Instant::now();
    let mut tracer = TracingProcessor::new(processor);
    let mut rounds = Vec::new();

    // Re-implemented (rather than calling `update_marginals` directly) so
    // a round boundary can be captured as soon as its sweep pass ends.
    let n = request.variable_ids().len();
    let mut is_reverse = false;
    loop {
        let mut made_progress = false;
        let round_start = Instant::now();
        let order: Vec<usize> = if is_reverse { (0..n).rev().collect() } else { (0..n).collect() };
        for i in order {
            if request.readiness()[i] {
                continue;
            }
            let marginal = request.marginals()[i];
            let did_work = crate::traversal::process_dependencies(
                engine.graph_mut(),
                marginal,
                true,
                &mut |graph, dep| {
                    if graph.is_pending(dep) {
                        dispatch(&mut tracer, graph, dep)
                    } else {
                        Ok(false)
                    }
                },
            )?;
            if engine.graph_mut().is_pending(marginal) {
                request_mark_ready(request, i);
            }
            made_progress |= did_work;
        }
        if let Some(round) = tracer.take_round(round_start.elapsed()) {
            rounds.push(round);
        }
        is_reverse = !is_reverse;
        if !made_progress {
            break;
        }
    }

    let final_round_start = Instant::now();
    for i in 0..n {
        let marginal = request.marginals()[i];
        if engine.graph_mut().is_pending(marginal) {
            dispatch(&mut tracer, engine.graph_mut(), marginal)?;
        }
        let variable_id = request.variable_ids()[i];
        let linked: Vec<Signal> = engine
            .backend()
            .get_variable(variable_id)
            .expect("variable id already validated in request_inference_for")
            .linked_signals()
            .to_vec();
        for signal in linked {
            if engine.graph_mut().is_pending(signal) {
                dispatch(&mut tracer, engine.graph_mut(), signal)?;
            }
        }
    }
    if let Some(round) = tracer.take_round(final_round_start.elapsed()) {
        rounds.push(round);
    }

    Ok(TracedInferenceRequest {
        total: request_start.elapsed(),
        rounds,
    })
}

fn request_mark_ready(request: &mut crate::request::InferenceRequest, i: usize) {
    request.mark_ready(i);
}
