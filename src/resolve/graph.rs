//! The output of resolution: a per-injector dependency DAG in deterministic topological order,
//! ready for the emitter to walk straight through (`spec.md` §4.3, §4.4).

use crate::model::Provider;
use crate::type_token::TypeToken;
use syn::Ident;

/// Where a resolved node's value comes from.
#[derive(Debug, Clone)]
pub enum ResolvedSource {
    /// Produced by calling a provider.
    Provider(Provider),
    /// Supplied directly as one of the injector's parameters.
    InjectorInput(Ident),
    /// A bound interface type: its value is the already-resolved concrete type's node, used
    /// where the interface type is expected. The emitter coerces the concrete value to the
    /// interface type at the binding site (`spec.md` §9 Design Notes; see DESIGN.md).
    Alias(TypeToken),
    /// The pointer-to-value form of a struct provider (`spec.md` §3 "Struct provider"): its value
    /// is a shared reference to the already-resolved pointee's node.
    Reference(TypeToken),
}

#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub output: TypeToken,
    pub source: ResolvedSource,
    /// The types this node's construction depends on, in the order they must already be bound.
    pub depends_on: Vec<TypeToken>,
}

/// One injector's fully resolved dependency graph, in an order where every node appears after
/// everything it depends on (`spec.md` §4.3 step 5 "deterministic topological sort").
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    pub nodes: Vec<ResolvedNode>,
    /// The injector's declared value outputs, i.e. the subset of `nodes` the generated function
    /// must actually return.
    pub roots: Vec<TypeToken>,
}

impl ResolvedGraph {
    /// Builds a graph from its nodes and roots, re-checking `spec.md` §3's invariants 1-3 that
    /// the resolver's worklist walk should already guarantee. Belt-and-suspenders, in the
    /// teacher's style of validating both at parse time and again structurally
    /// (`probe_discovery::get_probes`): these are `debug_assert!`s, not diagnostics, because a
    /// failure here means the resolver itself is broken, not that the user's input was bad.
    pub fn new(nodes: Vec<ResolvedNode>, roots: Vec<TypeToken>) -> Self {
        let graph = ResolvedGraph { nodes, roots };
        graph.debug_check_invariants();
        graph
    }

    pub fn node(&self, ty: &TypeToken) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|n| &n.output == ty)
    }

    fn debug_check_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            use std::collections::HashSet;
            let mut seen = HashSet::new();
            for node in &self.nodes {
                // Invariant 1: exactly one provider chosen per output type.
                debug_assert!(
                    seen.insert(node.output.to_string()),
                    "duplicate node for `{}` in resolved graph",
                    node.output
                );
                // Invariant 2: acyclic -- every dependency must already have appeared earlier.
                for dep in &node.depends_on {
                    debug_assert!(
                        seen.contains(&dep.to_string()),
                        "`{}` depends on `{}`, which has not been resolved yet (cycle?)",
                        node.output,
                        dep
                    );
                }
            }
        }
    }
}
