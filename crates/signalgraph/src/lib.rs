//! Reactive dependency-DAG scheduling for message-passing inference.
//!
//! A [`graph::SignalGraph`] holds every message, marginal, and
//! intermediate product as a [`signal::Signal`] — a cheap arena handle
//! carrying a value, a bit-packed record of its dependencies' liveness,
//! and a listener list. An [`request::Engine`] wires a caller's
//! [`backend::ModelBackend`] into a graph and drives a set of requested
//! marginals to a fixed point with [`request::update_marginals`],
//! dispatching each pending signal to a caller-supplied
//! [`processor::InferenceRequestProcessor`] by [`variant::Variant`].
//!
//! # Example
//!
//! ```rust
//! use signalgraph::error::EngineError;
//! use signalgraph::graph::SignalGraph;
//! use signalgraph::variant::Variant;
//!
//! let mut graph: SignalGraph<i64, ()> = SignalGraph::new();
//! let a = graph.create_signal(None, Variant::Unspecified, None);
//! let b = graph.create_signal(None, Variant::Unspecified, None);
//! graph.add_dependency(b, a, false, false, true, true);
//!
//! graph.set_value(a, 1);
//! assert!(graph.is_pending(b));
//!
//! graph
//!     .compute(b, false, |g, deps| -> Result<i64, EngineError> {
//!         Ok(g.get_value(deps[0]).copied().unwrap_or(0) + 10)
//!     })
//!     .unwrap();
//! assert_eq!(graph.get_value(b).copied(), Some(11));
//! ```

pub mod backend;
pub mod dep_props;
pub mod error;
pub mod graph;
pub mod processor;
pub mod request;
pub mod signal;
#[cfg(test)]
mod test_support;
#[cfg(feature = "trace")]
pub mod tracer;
pub mod traversal;
pub mod variant;

pub use backend::{ConnectionAccess, DependencyResolver, FactorAccess, ModelBackend, VariableAccess};
pub use dep_props::{DepProps, Flag};
pub use error::{EngineError, EngineWarning, Result};
pub use graph::SignalGraph;
pub use processor::{dispatch, FnProcessor, InferenceRequestProcessor};
pub use request::{request_inference_for, update_marginals, Engine, InferenceRequest};
pub use signal::{PendingState, Signal};
pub use traversal::process_dependencies;
pub use variant::{FactorId, Variant, VariableId};
