//! The tagged union labeling a signal's role in message passing.

/// Opaque identifiers supplied by the model backend. The engine never
/// interprets these beyond equality/hashing for bookkeeping in variants.
pub type VariableId = u64;
/// Opaque factor identifier, see [`VariableId`].
pub type FactorId = u64;

/// The role a [`crate::signal::Signal`] plays in message passing.
///
/// Assigned once, at graph-construction time. `Unspecified` is a
/// programming error if it ever reaches dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Variant {
    /// No role has been assigned yet.
    #[default]
    Unspecified,
    /// A message flowing from a variable to one of its connected factors.
    MessageToVariable {
        /// The variable this message targets.
        variable_id: VariableId,
        /// The factor this message originates from.
        factor_id: FactorId,
    },
    /// A message flowing from a factor to one of its connected variables.
    MessageToFactor {
        /// The variable this message originates from.
        variable_id: VariableId,
        /// The factor this message targets.
        factor_id: FactorId,
    },
    /// The product of incoming messages for a variable over a range of
    /// connected factors.
    ProductOfMessages {
        /// The variable the product is computed for.
        variable_id: VariableId,
        /// Half-open range into `connected_factors` this product covers.
        range: (usize, usize),
        /// The factors connected to `variable_id`, in a fixed order.
        connected_factors: Vec<FactorId>,
    },
    /// A single variable's marginal.
    IndividualMarginal {
        /// The variable this marginal belongs to.
        variable_id: VariableId,
    },
    /// A joint marginal anchored at a factor over a set of variables.
    JointMarginal {
        /// The anchoring factor.
        factor_id: FactorId,
        /// The variables participating in the joint marginal.
        variable_ids: Vec<VariableId>,
    },
}

impl Variant {
    /// A short, stable name for diagnostics (`tracing` fields, error
    /// messages) — never used for dispatch.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Variant::Unspecified => "Unspecified",
            Variant::MessageToVariable { .. } => "MessageToVariable",
            Variant::MessageToFactor { .. } => "MessageToFactor",
            Variant::ProductOfMessages { .. } => "ProductOfMessages",
            Variant::IndividualMarginal { .. } => "IndividualMarginal",
            Variant::JointMarginal { .. } => "JointMarginal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unspecified() {
        assert_eq!(Variant::default(), Variant::Unspecified);
    }

    #[test]
    fn kind_name_matches_variant() {
        assert_eq!(
            Variant::IndividualMarginal { variable_id: 1 }.kind_name(),
            "IndividualMarginal"
        );
        assert_eq!(
            Variant::JointMarginal {
                factor_id: 1,
                variable_ids: vec![1, 2]
            }
            .kind_name(),
            "JointMarginal"
        );
    }
}
