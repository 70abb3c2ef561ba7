//! The reactive cell: [`Signal`] (an arena handle) and its backing node.

use std::fmt;

use slotmap::{new_key_type, Key};
use smallvec::SmallVec;

use crate::dep_props::DepProps;
use crate::variant::Variant;

new_key_type! {
    /// A cheap, `Copy` handle into a [`crate::graph::SignalGraph`].
    ///
    /// Equality is arena-slot identity, not value equality.
    pub struct Signal;
}

impl fmt::Display for Signal {
    /// Prints the arena slot as a raw integer, for `tracing`/error
    /// messages — never meant to be parsed back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal#{}", self.data().as_ffi())
    }
}

/// The two-phase pending flags, packed for cheap read/replace.
///
/// `is_pending` is the authoritative answer; `is_potentially_pending` is a
/// cheap upstream hint that the authoritative answer needs rechecking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingState {
    pub is_potentially_pending: bool,
    pub is_pending: bool,
}

/// Backing storage for one [`Signal`], owned by a `SignalGraph`.
pub(crate) struct SignalNode<V, M> {
    pub value: Option<V>,
    pub metadata: Option<M>,
    pub variant: Variant,
    pub dependencies: SmallVec<[Signal; 4]>,
    pub dependencies_props: DepProps,
    /// `(listener, is_active)` pairs, in insertion order. An inactive
    /// listener is present (the edge exists) but will not be notified.
    pub listeners: SmallVec<[(Signal, bool); 4]>,
    pub props: PendingState,
}

impl<V, M> SignalNode<V, M> {
    pub fn new(value: Option<V>, variant: Variant, metadata: Option<M>) -> Self {
        Self {
            value,
            metadata,
            variant,
            dependencies: SmallVec::new(),
            dependencies_props: DepProps::new(),
            listeners: SmallVec::new(),
            props: PendingState::default(),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.value.is_some()
    }
}
