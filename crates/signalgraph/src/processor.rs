//! Dispatch of a pending signal to whichever rule computes its value,
//! keyed off its [`Variant`], per spec.md §4.6/§6.

use crate::error::EngineError;
use crate::graph::SignalGraph;
use crate::signal::Signal;
use crate::variant::{FactorId, VariableId, Variant};

/// One computation rule per [`Variant`] case.
///
/// Every method defaults to [`EngineError::InterfaceNotImplemented`] — a
/// processor only needs to override the variants it actually produces.
/// This mirrors a dynamic "missing handler" failure without requiring
/// every implementor to enumerate all five.
pub trait InferenceRequestProcessor<V, M> {
    fn process_message_to_variable(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        factor_id: FactorId,
    ) -> Result<bool, EngineError> {
        let _ = (graph, signal, variable_id, factor_id);
        Err(EngineError::InterfaceNotImplemented {
            method: "process_message_to_variable",
            type_name: std::any::type_name::<Self>(),
        })
    }

    fn process_message_to_factor(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        factor_id: FactorId,
    ) -> Result<bool, EngineError> {
        let _ = (graph, signal, variable_id, factor_id);
        Err(EngineError::InterfaceNotImplemented {
            method: "process_message_to_factor",
            type_name: std::any::type_name::<Self>(),
        })
    }

    fn process_product_of_messages(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
        range: (usize, usize),
        connected_factors: &[FactorId],
    ) -> Result<bool, EngineError> {
        let _ = (graph, signal, variable_id, range, connected_factors);
        Err(EngineError::InterfaceNotImplemented {
            method: "process_product_of_messages",
            type_name: std::any::type_name::<Self>(),
        })
    }

    fn process_individual_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        variable_id: VariableId,
    ) -> Result<bool, EngineError> {
        let _ = (graph, signal, variable_id);
        Err(EngineError::InterfaceNotImplemented {
            method: "process_individual_marginal",
            type_name: std::any::type_name::<Self>(),
        })
    }

    fn process_joint_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        factor_id: FactorId,
        variable_ids: &[VariableId],
    ) -> Result<bool, EngineError> {
        let _ = (graph, signal, factor_id, variable_ids);
        Err(EngineError::InterfaceNotImplemented {
            method: "process_joint_marginal",
            type_name: std::any::type_name::<Self>(),
        })
    }
}

/// Routes `signal` to the processor method matching its variant.
///
/// Returns whatever the matched method returns. [`Variant::Unspecified`]
/// is always an [`EngineError::UnknownVariant`] — it means a signal was
/// wired up without ever being assigned a role.
pub fn dispatch<V, M, P>(
    processor: &mut P,
    graph: &mut SignalGraph<V, M>,
    signal: Signal,
) -> Result<bool, EngineError>
where
    P: InferenceRequestProcessor<V, M>,
{
    match graph.get_variant(signal).clone() {
        Variant::Unspecified => Err(EngineError::UnknownVariant { signal }),
        Variant::MessageToVariable {
            variable_id,
            factor_id,
        } => processor.process_message_to_variable(graph, signal, variable_id, factor_id),
        Variant::MessageToFactor {
            variable_id,
            factor_id,
        } => processor.process_message_to_factor(graph, signal, variable_id, factor_id),
        Variant::ProductOfMessages {
            variable_id,
            range,
            connected_factors,
        } => processor.process_product_of_messages(graph, signal, variable_id, range, &connected_factors),
        Variant::IndividualMarginal { variable_id } => {
            processor.process_individual_marginal(graph, signal, variable_id)
        }
        Variant::JointMarginal {
            factor_id,
            variable_ids,
        } => processor.process_joint_marginal(graph, signal, factor_id, &variable_ids),
    }
}

/// Wraps an arbitrary closure as an [`InferenceRequestProcessor`] that
/// handles every variant the same way — useful for callers who already
/// dispatch on `graph.get_variant(signal)` themselves and just want a
/// single processing entry point.
pub struct FnProcessor<F>(pub F);

impl<F> FnProcessor<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<V, M, F> InferenceRequestProcessor<V, M> for FnProcessor<F>
where
    F: FnMut(&mut SignalGraph<V, M>, Signal) -> Result<bool, EngineError>,
{
    fn process_message_to_variable(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        _variable_id: VariableId,
        _factor_id: FactorId,
    ) -> Result<bool, EngineError> {
        (self.0)(graph, signal)
    }

    fn process_message_to_factor(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        _variable_id: VariableId,
        _factor_id: FactorId,
    ) -> Result<bool, EngineError> {
        (self.0)(graph, signal)
    }

    fn process_product_of_messages(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        _variable_id: VariableId,
        _range: (usize, usize),
        _connected_factors: &[FactorId],
    ) -> Result<bool, EngineError> {
        (self.0)(graph, signal)
    }

    fn process_individual_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        _variable_id: VariableId,
    ) -> Result<bool, EngineError> {
        (self.0)(graph, signal)
    }

    fn process_joint_marginal(
        &mut self,
        graph: &mut SignalGraph<V, M>,
        signal: Signal,
        _factor_id: FactorId,
        _variable_ids: &[VariableId],
    ) -> Result<bool, EngineError> {
        (self.0)(graph, signal)
    }
}
