//! `process_dependencies` — one-level-deep expansion of intermediate
//! dependencies with an optional retry, per spec.md §4.5.

use crate::dep_props::Flag;
use crate::error::EngineError;
use crate::graph::SignalGraph;
use crate::signal::Signal;

/// Visits every direct dependency of `signal` with `f`. If `f` did not
/// handle a dependency and that dependency's slot is marked intermediate,
/// recurses one level into *its* dependencies; if that recursion did any
/// work and `retry` is set, `f` is given a second chance at the
/// dependency itself.
///
/// Returns whether any call to `f` anywhere in the expansion returned
/// `true` (P8). No cycle detection is performed — the dependency graph is
/// acyclic by construction.
pub fn process_dependencies<V, M, F>(
    graph: &mut SignalGraph<V, M>,
    signal: Signal,
    retry: bool,
    f: &mut F,
) -> Result<bool, EngineError>
where
    F: FnMut(&mut SignalGraph<V, M>, Signal) -> Result<bool, EngineError>,
{
    let deps: smallvec::SmallVec<[Signal; 4]> = graph.get_dependencies(signal).into();
    let mut any = false;

    for (zero_based, dep) in deps.into_iter().enumerate() {
        let idx = zero_based + 1;
        let handled = f(graph, dep)?;
        if handled {
            any = true;
            continue;
        }
        if graph.dependency_flag(signal, idx, Flag::Intermediate) {
            let sub_did_work = process_dependencies(graph, dep, retry, f)?;
            if sub_did_work {
                any = true;
                if retry && f(graph, dep)? {
                    any = true;
                }
            }
        }
    }

    Ok(any)
}
