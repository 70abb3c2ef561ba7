//! `SignalGraph`: the arena owning every [`Signal`] and the operations
//! specified for it in spec.md §4.2–§4.4.

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::dep_props::Flag;
use crate::error::{EngineError, EngineWarning};
use crate::signal::{PendingState, Signal, SignalNode};
use crate::variant::Variant;

/// The arena of all signals for one inference engine instance.
///
/// `V` is the computed value type; `M` is caller-defined metadata,
/// independent of `V` because it is debug/bookkeeping payload rather than
/// inference data.
pub struct SignalGraph<V, M> {
    slots: SlotMap<Signal, SignalNode<V, M>>,
    warnings: Vec<EngineWarning>,
}

impl<V, M> Default for SignalGraph<V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, M> SignalGraph<V, M> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        debug!("creating new signal graph");
        Self {
            slots: SlotMap::with_key(),
            warnings: Vec::new(),
        }
    }

    /// Creates a new signal with an initial (usually undefined) value.
    pub fn create_signal(
        &mut self,
        value: Option<V>,
        variant: Variant,
        metadata: Option<M>,
    ) -> Signal {
        self.slots.insert(SignalNode::new(value, variant, metadata))
    }

    fn node(&self, signal: Signal) -> &SignalNode<V, M> {
        &self.slots[signal]
    }

    fn node_mut(&mut self, signal: Signal) -> &mut SignalNode<V, M> {
        &mut self.slots[signal]
    }

    /// True iff `signal` has ever produced a value.
    pub fn is_computed(&self, signal: Signal) -> bool {
        self.node(signal).is_computed()
    }

    /// Lazily resolves and returns whether `signal` is pending, per the
    /// two-phase protocol in spec.md §4.3.
    pub fn is_pending(&mut self, signal: Signal) -> bool {
        let potentially_pending = {
            let node = self.node(signal);
            if node.props.is_pending {
                return true;
            }
            node.props.is_potentially_pending
        };
        if !potentially_pending {
            return false;
        }
        let meets = self.node(signal).dependencies_props.meets_pending_criteria();
        let node = self.node_mut(signal);
        node.props = PendingState {
            is_potentially_pending: false,
            is_pending: meets,
        };
        meets
    }

    /// Primes `signal` for a fresh pending check — used by the driver to
    /// mark root dependencies at request time (spec.md §4.7 steps 2/3).
    /// Overwrites both fields of `props` rather than only setting
    /// `is_potentially_pending`, so a signal left authoritatively pending
    /// from an earlier, incomplete run (e.g. after a propagated compute
    /// error) is forced back through the lazy `meets_pending_criteria`
    /// recheck instead of short-circuiting on its stale `is_pending`.
    pub fn mark_potentially_pending(&mut self, signal: Signal) {
        self.node_mut(signal).props = PendingState {
            is_potentially_pending: true,
            is_pending: false,
        };
    }

    pub fn get_value(&self, signal: Signal) -> Option<&V> {
        self.node(signal).value.as_ref()
    }

    pub fn get_metadata(&self, signal: Signal) -> Option<&M> {
        self.node(signal).metadata.as_ref()
    }

    pub fn get_variant(&self, signal: Signal) -> &Variant {
        &self.node(signal).variant
    }

    /// A short, stable name for `signal`'s variant, for `tracing` fields
    /// and error messages — delegates to [`Variant::kind_name`], since a
    /// bare `Signal` handle carries no variant of its own outside the
    /// arena that owns it.
    pub fn kind_name(&self, signal: Signal) -> &'static str {
        self.node(signal).variant.kind_name()
    }

    pub fn get_dependencies(&self, signal: Signal) -> &[Signal] {
        &self.node(signal).dependencies
    }

    pub fn get_listeners(&self, signal: Signal) -> &[(Signal, bool)] {
        &self.node(signal).listeners
    }

    /// Tests a dependency-slot flag belonging to `signal`'s own
    /// `dependencies_props`, by 1-based slot index. Used by the traversal
    /// to decide whether a dependency is intermediate.
    pub(crate) fn dependency_flag(&self, signal: Signal, index: usize, flag: Flag) -> bool {
        self.node(signal).dependencies_props.test_flag(index, flag)
    }

    /// Appends the edge `signal -> dep`. No-op if `dep == signal` (I2).
    #[allow(clippy::too_many_arguments)]
    pub fn add_dependency(
        &mut self,
        signal: Signal,
        dep: Signal,
        weak: bool,
        intermediate: bool,
        listen: bool,
        check_computed: bool,
    ) {
        if dep == signal {
            return;
        }

        let idx = {
            let node = self.node_mut(signal);
            let idx = node.dependencies_props.push();
            node.dependencies.push(dep);
            if weak {
                node.dependencies_props.set_flag(idx, Flag::Weak);
            }
            if intermediate {
                node.dependencies_props.set_flag(idx, Flag::Intermediate);
            }
            idx
        };

        self.node_mut(dep).listeners.push((signal, listen));

        if check_computed {
            if self.node(dep).is_computed() {
                self.node_mut(signal)
                    .dependencies_props
                    .set_flag(idx, Flag::Computed);
                if !self.node(signal).is_computed() {
                    self.node_mut(signal)
                        .dependencies_props
                        .set_flag(idx, Flag::Fresh);
                    self.node_mut(signal).props.is_potentially_pending = true;
                }
            } else {
                self.node_mut(signal).props = PendingState::default();
            }
        }
    }

    /// Writes `v` into `signal` and propagates freshness to active
    /// listeners, per I5/I6.
    pub fn set_value(&mut self, signal: Signal, v: V) {
        {
            let node = self.node_mut(signal);
            node.value = Some(v);
            node.dependencies_props.unset_all_fresh();
            node.props = PendingState::default();
        }

        let listeners: smallvec::SmallVec<[(Signal, bool); 4]> =
            self.node(signal).listeners.clone();
        for (listener, active) in listeners {
            if !active {
                continue;
            }
            self.node_mut(listener).props.is_potentially_pending = true;

            let slot = self
                .node(listener)
                .dependencies
                .iter()
                .position(|&d| d == signal);
            if let Some(zero_based) = slot {
                let idx = zero_based + 1;
                let listener_node = self.node_mut(listener);
                listener_node.dependencies_props.set_flag(idx, Flag::Computed);
                listener_node.dependencies_props.set_flag(idx, Flag::Fresh);
            }
        }
    }

    /// Runs `rule` and writes its result via [`Self::set_value`]. Requires
    /// `is_pending(signal)` unless `force` is set.
    pub fn compute<F>(&mut self, signal: Signal, force: bool, rule: F) -> Result<(), EngineError>
    where
        F: FnOnce(&Self, &[Signal]) -> Result<V, EngineError>,
    {
        if !force && !self.is_pending(signal) {
            return Err(EngineError::ComputeOnNonPending { signal });
        }
        let deps: smallvec::SmallVec<[Signal; 4]> = self.node(signal).dependencies.clone();
        let value = rule(self, &deps)?;
        self.set_value(signal, value);
        Ok(())
    }

    /// Records a non-fatal observation; also emits a `tracing::warn!`.
    pub fn push_warning(&mut self, warning: EngineWarning) {
        warn!(message = %warning.message, signal = ?warning.signal, "engine warning");
        self.warnings.push(warning);
    }

    /// All warnings accumulated so far.
    pub fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }
}
