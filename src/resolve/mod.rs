//! The Resolver (`spec.md` §4.3): turns one injector's flattened provider set into a dependency
//! DAG, by working backward from its declared outputs.
//!
//! The algorithm is a worklist-driven depth-first search with memoization, seeded from the
//! injector's value outputs. For each requested type it, in order: checks whether an injector
//! input already supplies it; applies at most one binding rewrite; special-cases the context
//! type; and otherwise looks up candidate providers by output type, requiring exactly one.
//! Recursion order gives "discovery order" a precise meaning: a node is appended to the resolved
//! graph only once every type it depends on has itself been fully resolved, which is exactly a
//! topological sort, and is deterministic because the flattened provider list and the injector's
//! declared inputs are both already in a fixed, source-derived order.

mod graph;

pub use graph::{ResolvedGraph, ResolvedNode, ResolvedSource};

use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::flatten::{FlatEntry, FlatMember};
use crate::model::{Binding, InjectorStub, Provider};
use crate::type_token::TypeToken;
use proc_macro2::Span;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    InProgress,
    Done,
    Failed,
}

/// A candidate paired with the chain of set names (outermost first) it was flattened through, so
/// a conflict or missing-provider diagnostic can show where each candidate came from
/// (`spec.md` §4.3 step 2).
type Candidate<'a, T> = (&'a T, &'a [String]);

struct ResolveCtx<'a> {
    injector: &'a InjectorStub,
    providers_by_output: HashMap<TypeToken, Vec<Candidate<'a, Provider>>>,
    bindings_by_interface: HashMap<TypeToken, Vec<Candidate<'a, Binding>>>,
    state: HashMap<TypeToken, NodeState>,
    stack: Vec<TypeToken>,
    order: Vec<ResolvedNode>,
    diags: &'a mut Diagnostics,
}

/// Resolves one injector against an already-flattened provider list, producing its dependency
/// graph, or `None` if any of its declared outputs could not be resolved (diagnostics for every
/// failure are still pushed onto `diags`, even when `None` is returned).
pub fn resolve_injector(
    injector: &InjectorStub,
    flat: &[FlatEntry],
    diags: &mut Diagnostics,
) -> Option<ResolvedGraph> {
    let mut providers_by_output: HashMap<TypeToken, Vec<Candidate<Provider>>> = HashMap::new();
    let mut bindings_by_interface: HashMap<TypeToken, Vec<Candidate<Binding>>> = HashMap::new();
    for entry in flat {
        match &entry.member {
            FlatMember::Provider(p) => providers_by_output
                .entry(p.output().clone())
                .or_default()
                .push((p, &entry.provenance)),
            FlatMember::Binding(b) => bindings_by_interface
                .entry(b.interface.clone())
                .or_default()
                .push((b, &entry.provenance)),
        }
    }

    let mut ctx = ResolveCtx {
        injector,
        providers_by_output,
        bindings_by_interface,
        state: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
        diags,
    };

    let mut all_ok = true;
    for root in injector.value_outputs() {
        let requested_by = format!("injector `{}`", injector.name);
        if !resolve_type(root, &requested_by, &mut ctx) {
            all_ok = false;
        }
    }

    if !validate_capabilities(injector, &ctx.order, ctx.diags) {
        all_ok = false;
    }

    if all_ok {
        Some(ResolvedGraph::new(ctx.order, injector.value_outputs().to_vec()))
    } else {
        None
    }
}

fn resolve_type(ty: &TypeToken, requested_by: &str, ctx: &mut ResolveCtx) -> bool {
    match ctx.state.get(ty) {
        Some(NodeState::Done) => return true,
        Some(NodeState::Failed) => return false,
        Some(NodeState::InProgress) => {
            let mut path: Vec<String> = ctx.stack.iter().map(|t| t.to_string()).collect();
            path.push(ty.to_string());
            ctx.diags.push(Diagnostic::new(
                DiagnosticKind::Cycle { path },
                ctx.injector.span,
            ));
            return false;
        }
        None => {}
    }

    ctx.state.insert(ty.clone(), NodeState::InProgress);
    ctx.stack.push(ty.clone());
    let ok = resolve_type_uncached(ty, requested_by, ctx);
    ctx.stack.pop();
    ctx.state
        .insert(ty.clone(), if ok { NodeState::Done } else { NodeState::Failed });
    ok
}

fn resolve_type_uncached(ty: &TypeToken, requested_by: &str, ctx: &mut ResolveCtx) -> bool {
    if let Some(name) = ctx.injector.input_type(ty) {
        ctx.order.push(ResolvedNode {
            output: ty.clone(),
            source: ResolvedSource::InjectorInput(name.clone()),
            depends_on: Vec::new(),
        });
        return true;
    }

    // An interface binding is registered under the bare interface type (`Bind::<dyn Fooer,
    // Bar>()`), but an injector idiomatically asks for it behind a reference (`-> &dyn Fooer`),
    // since a bare `dyn Trait` can't be returned by value. Try the type as requested first, then
    // fall back to its referent so both spellings reach the same binding.
    let binding_lookup = if ctx.bindings_by_interface.contains_key(ty) {
        Some(ty.clone())
    } else {
        ty.reference_pointee().filter(|p| ctx.bindings_by_interface.contains_key(p))
    };
    if let Some(lookup) = binding_lookup {
        let bindings = ctx.bindings_by_interface.get(&lookup).cloned().unwrap();
        if bindings.len() > 1 {
            let mut diag = Diagnostic::new(
                DiagnosticKind::ConflictingProviders {
                    type_name: ty.to_string(),
                    count: bindings.len(),
                },
                bindings[0].0.span,
            );
            for (binding, provenance) in &bindings {
                diag = diag.with_related(candidate_label(provenance), binding.span);
            }
            ctx.diags.push(diag);
            return false;
        }
        let concrete = bindings[0].0.concrete.clone();
        if !resolve_type(&concrete, requested_by, ctx) {
            return false;
        }
        ctx.order.push(ResolvedNode {
            output: ty.clone(),
            source: ResolvedSource::Alias(concrete.clone()),
            depends_on: vec![concrete],
        });
        return true;
    }

    if ty.is_context_type() {
        ctx.diags.push(Diagnostic::new(
            DiagnosticKind::MissingContextInput {
                func_name: requested_by.to_string(),
                injector_name: ctx.injector.name.to_string(),
            },
            ctx.injector.span,
        ));
        return false;
    }

    let candidates = match ctx.providers_by_output.get(ty) {
        Some(c) if c.len() == 1 => c[0].0,
        Some(c) => {
            let mut diag = Diagnostic::new(
                DiagnosticKind::ConflictingProviders {
                    type_name: ty.to_string(),
                    count: c.len(),
                },
                c[0].0.span(),
            );
            for (provider, provenance) in c {
                diag = diag.with_related(candidate_label(provenance), provider.span());
            }
            ctx.diags.push(diag);
            return false;
        }
        None => {
            // The pointer-to-value form of a struct provider (`spec.md` §3 "Struct provider"):
            // `&FooBar` has no provider of its own, but if `FooBar` is produced by exactly one
            // struct provider, that's enough to satisfy a request for `&FooBar` too.
            if let Some(pointee) = ty.reference_pointee() {
                if matches!(
                    ctx.providers_by_output.get(&pointee).map(Vec::as_slice),
                    Some([(Provider::Struct(_), _)])
                ) {
                    let requested_by = format!("the pointer form of `{}`", ty);
                    if !resolve_type(&pointee, &requested_by, ctx) {
                        return false;
                    }
                    ctx.order.push(ResolvedNode {
                        output: ty.clone(),
                        source: ResolvedSource::Reference(pointee.clone()),
                        depends_on: vec![pointee],
                    });
                    return true;
                }
            }
            let mut diag = Diagnostic::new(
                DiagnosticKind::MissingProvider {
                    type_name: ty.to_string(),
                },
                ctx.injector.span,
            );
            for (label, span) in provenance_chain_to_build_call(ctx) {
                diag = diag.with_related(label, span);
            }
            ctx.diags.push(diag);
            return false;
        }
    };

    let inputs = candidates.inputs();
    let provider_label = provider_label(candidates);
    let mut inputs_ok = true;
    for input_ty in &inputs {
        if !resolve_type(input_ty, &provider_label, ctx) {
            inputs_ok = false;
        }
    }
    if !inputs_ok {
        return false;
    }

    ctx.order.push(ResolvedNode {
        output: ty.clone(),
        source: ResolvedSource::Provider(candidates.clone()),
        depends_on: inputs,
    });
    true
}

/// Renders a candidate's set-provenance chain for a `ConflictingProviders` diagnostic's related
/// locations (`spec.md` §4.3 step 2 "listing all candidates with their set-provenance").
fn candidate_label(provenance: &[String]) -> String {
    if provenance.is_empty() {
        "declared directly in the injector's set".to_string()
    } else {
        format!("via {}", provenance.join(" -> "))
    }
}

/// Builds the chain of related locations from the type currently being resolved back up to the
/// injector's `build` call, for a `MissingProvider` diagnostic (`spec.md` §8 scenario 6). Walks
/// `ctx.stack`'s ancestors (everything above the type that just failed to resolve) innermost
/// first, using the requesting provider's own span where one is known and falling back to the
/// build call's span for the root request, which came from the call itself rather than a
/// provider.
fn provenance_chain_to_build_call(ctx: &ResolveCtx) -> Vec<(String, Span)> {
    let build_call_span = ctx.injector.set.span;
    let mut related = Vec::new();
    let ancestors = &ctx.stack[..ctx.stack.len().saturating_sub(1)];
    for ancestor in ancestors.iter().rev() {
        let span = ctx
            .providers_by_output
            .get(ancestor)
            .and_then(|candidates| candidates.first())
            .map(|(provider, _)| provider.span())
            .unwrap_or(build_call_span);
        related.push((format!("required by `{}`", ancestor), span));
    }
    related.push(("requested by the injector's `build` call".to_string(), build_call_span));
    related
}

fn provider_label(provider: &Provider) -> String {
    match provider {
        Provider::Function(f) => {
            let path = &f.func;
            format!("provider `{}`", quote::quote! { #path })
        }
        Provider::Struct(s) => format!("struct provider `{}`", s.ty),
        Provider::Value(v) => format!("value provider for `{}`", v.output),
    }
}

/// Checks that every provider actually reachable in the resolved graph is compatible with what
/// the injector promises to return (`spec.md` §4.3 step 6 "error/cleanup capability check"): an
/// injector that does not return an error must not depend, even transitively, on a fallible
/// provider, and likewise for cleanup.
fn validate_capabilities(injector: &InjectorStub, nodes: &[ResolvedNode], diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    for node in nodes {
        if let ResolvedSource::Provider(provider) = &node.source {
            if provider.has_error() && !injector.has_error {
                diags.push(Diagnostic::new(
                    DiagnosticKind::BadInjectorReturn {
                        injector_name: injector.name.to_string(),
                        reason: format!(
                            "`{}` can fail, but `{}` does not return an error",
                            node.output, injector.name
                        ),
                    },
                    injector.span,
                ));
                ok = false;
            }
            if provider.has_cleanup() && !injector.has_cleanup {
                diags.push(Diagnostic::new(
                    DiagnosticKind::BadInjectorReturn {
                        injector_name: injector.name.to_string(),
                        reason: format!(
                            "`{}` produces a cleanup function, but `{}` does not return one",
                            node.output, injector.name
                        ),
                    },
                    injector.span,
                ));
                ok = false;
            }
        }
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionProvider, InjectorStub, ProviderSet};
    use proc_macro2::Span;
    use syn::parse_quote;

    fn ty(s: &str) -> TypeToken {
        TypeToken::new(syn::parse_str(s).unwrap())
    }

    fn function_provider(name: &str, output: &str, params: Vec<&str>) -> Provider {
        Provider::Function(FunctionProvider {
            func: syn::parse_str(name).unwrap(),
            params: params.into_iter().map(ty).collect(),
            output: ty(output),
            has_error: false,
            has_cleanup: false,
            span: Span::call_site(),
        })
    }

    fn struct_provider(output: &str, fields: Vec<(&str, &str)>) -> Provider {
        use crate::model::StructProvider;
        Provider::Struct(StructProvider {
            ty: ty(output),
            fields: fields
                .into_iter()
                .map(|(name, field_ty)| (syn::parse_str(name).unwrap(), ty(field_ty)))
                .collect(),
            span: Span::call_site(),
        })
    }

    fn injector(outputs: Vec<&str>, members: Vec<FlatMember>) -> (InjectorStub, Vec<FlatEntry>) {
        let set = ProviderSet::new(None, Span::call_site(), Vec::new());
        let stub = InjectorStub {
            name: parse_quote!(initialize_app),
            inputs: Vec::new(),
            outputs: outputs.into_iter().map(ty).collect(),
            has_error: false,
            has_cleanup: false,
            set,
            span: Span::call_site(),
        };
        let flat = members
            .into_iter()
            .map(|m| FlatEntry {
                member: m,
                provenance: Vec::new(),
            })
            .collect();
        (stub, flat)
    }

    #[test]
    fn resolves_a_simple_chain() {
        let (stub, flat) = injector(
            vec!["Baz"],
            vec![
                FlatMember::Provider(function_provider("provide_baz", "Baz", vec!["Bar"])),
                FlatMember::Provider(function_provider("provide_bar", "Bar", vec!["Foo"])),
                FlatMember::Provider(function_provider("provide_foo", "Foo", vec![])),
            ],
        );
        let mut diags = Diagnostics::new();
        let graph = resolve_injector(&stub, &flat, &mut diags).expect("should resolve");
        assert!(diags.is_empty());
        let order: Vec<String> = graph.nodes.iter().map(|n| n.output.to_string()).collect();
        assert_eq!(order, vec!["Foo", "Bar", "Baz"]);
    }

    #[test]
    fn reports_missing_provider() {
        let (stub, flat) = injector(vec!["Baz"], vec![]);
        let mut diags = Diagnostics::new();
        assert!(resolve_injector(&stub, &flat, &mut diags).is_none());
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        // The provenance chain back to the build call (`spec.md` §8 scenario 6): `Baz` was
        // requested with no intermediate providers in between, so the chain is just the call
        // itself.
        assert!(diag
            .related
            .iter()
            .any(|(label, _)| label.contains("the injector's `build` call")));
    }

    #[test]
    fn reports_conflicting_providers() {
        let (stub, flat) = injector(
            vec!["Foo"],
            vec![
                FlatMember::Provider(function_provider("provide_foo_a", "Foo", vec![])),
                FlatMember::Provider(function_provider("provide_foo_b", "Foo", vec![])),
            ],
        );
        let mut diags = Diagnostics::new();
        assert!(resolve_injector(&stub, &flat, &mut diags).is_none());
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        // Both candidates are listed as related locations, not just the first (`spec.md` §4.3
        // step 2 "listing all candidates with their set-provenance").
        assert_eq!(diag.related.len(), 2);
    }

    /// A conflict whose two candidates were reached through two different nested sets names both
    /// set-provenance chains, not just the bare fact that there are two.
    #[test]
    fn conflicting_provider_diagnostic_names_each_candidates_provenance() {
        let (stub, _) = injector(vec!["Foo"], vec![]);
        let flat = vec![
            FlatEntry {
                member: FlatMember::Provider(function_provider("provide_foo_a", "Foo", vec![])),
                provenance: vec!["A".to_string()],
            },
            FlatEntry {
                member: FlatMember::Provider(function_provider("provide_foo_b", "Foo", vec![])),
                provenance: vec!["B".to_string()],
            },
        ];
        let mut diags = Diagnostics::new();
        assert!(resolve_injector(&stub, &flat, &mut diags).is_none());
        let diag = diags.iter().next().unwrap();
        assert!(diag.related.iter().any(|(label, _)| label.contains('A')));
        assert!(diag.related.iter().any(|(label, _)| label.contains('B')));
    }

    #[test]
    fn resolves_the_pointer_form_of_a_struct_provider() {
        let (stub, flat) = injector(
            vec!["&FooBar"],
            vec![
                FlatMember::Provider(function_provider("provide_foo", "Foo", vec![])),
                FlatMember::Provider(function_provider("provide_bar", "Bar", vec![])),
                FlatMember::Provider(struct_provider("FooBar", vec![("foo", "Foo"), ("bar", "Bar")])),
            ],
        );
        let mut diags = Diagnostics::new();
        let graph = resolve_injector(&stub, &flat, &mut diags).expect("should resolve");
        assert!(diags.is_empty());
        let reference_node = graph.node(&ty("&FooBar")).expect("reference node present");
        assert!(matches!(&reference_node.source, ResolvedSource::Reference(inner) if inner == &ty("FooBar")));
        assert!(graph.node(&ty("FooBar")).is_some(), "the struct value itself must also be bound");
    }

    /// An injector asking for `&dyn Fooer` reaches a binding registered under the bare `dyn
    /// Fooer`, since a bare trait object can't be requested by value.
    #[test]
    fn resolves_an_interface_binding_through_its_reference_form() {
        let (stub, flat) = injector(
            vec!["&dyn Fooer"],
            vec![
                FlatMember::Provider(function_provider("provide_bar", "Bar", vec![])),
                FlatMember::Binding(Binding {
                    interface: ty("dyn Fooer"),
                    concrete: ty("Bar"),
                    span: Span::call_site(),
                }),
            ],
        );
        let mut diags = Diagnostics::new();
        let graph = resolve_injector(&stub, &flat, &mut diags).expect("should resolve");
        assert!(diags.is_empty());
        let alias_node = graph.node(&ty("&dyn Fooer")).expect("alias node present");
        assert!(matches!(&alias_node.source, ResolvedSource::Alias(concrete) if concrete == &ty("Bar")));
        assert!(graph.node(&ty("Bar")).is_some());
    }

    #[test]
    fn reports_cycle() {
        let (stub, flat) = injector(
            vec!["A"],
            vec![
                FlatMember::Provider(function_provider("provide_a", "A", vec!["B"])),
                FlatMember::Provider(function_provider("provide_b", "B", vec!["A"])),
            ],
        );
        let mut diags = Diagnostics::new();
        assert!(resolve_injector(&stub, &flat, &mut diags).is_none());
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::Cycle { .. })));
    }

    /// A fallible provider reached by an injector that does not itself return an error is a
    /// `BadInjectorReturn` diagnostic, and -- unlike a diagnostic that is merely informational --
    /// it must also suppress emission: otherwise the emitter would be handed a graph whose error
    /// path can't type-check against the injector's declared (non-`Result`) return type.
    #[test]
    fn cannot_propagate_error_suppresses_emission() {
        let mut foo = match function_provider("provide_foo", "Foo", vec![]) {
            Provider::Function(f) => f,
            _ => unreachable!(),
        };
        foo.has_error = true;
        let (stub, flat) = injector(vec!["Foo"], vec![FlatMember::Provider(Provider::Function(foo))]);
        let mut diags = Diagnostics::new();
        assert!(resolve_injector(&stub, &flat, &mut diags).is_none());
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::BadInjectorReturn { .. })));
    }

    /// `spec.md` §8 "Soundness"/"Deterministic topological sort": whatever the chain length, a
    /// linear dependency chain `T0 <- T1 <- ... <- Tn` (`Ti` depends on `T(i-1)`) must resolve
    /// with every node appearing strictly after everything it depends on -- here, in exactly
    /// ascending chain order, since that's the only order discovery can produce for a linear
    /// chain walked from its single root.
    #[derive(Clone, Debug)]
    struct ChainLength(usize);

    impl quickcheck::Arbitrary for ChainLength {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            ChainLength((<usize as quickcheck::Arbitrary>::arbitrary(g) % 12) + 1)
        }
    }

    #[quickcheck_macros::quickcheck]
    fn resolves_any_length_linear_chain_in_dependency_order(len: ChainLength) -> bool {
        let n = len.0;
        let members: Vec<FlatMember> = (0..n)
            .map(|i| {
                let output = format!("T{}", i);
                let params = if i == 0 { vec![] } else { vec![format!("T{}", i - 1)] };
                FlatMember::Provider(Provider::Function(FunctionProvider {
                    func: syn::parse_str(&format!("provide_t{}", i)).unwrap(),
                    params: params.iter().map(|p| ty(p)).collect(),
                    output: ty(&output),
                    has_error: false,
                    has_cleanup: false,
                    span: Span::call_site(),
                }))
            })
            .collect();
        let root = format!("T{}", n - 1);
        let (stub, flat) = injector(vec![&root], members);
        let mut diags = Diagnostics::new();
        let graph = match resolve_injector(&stub, &flat, &mut diags) {
            Some(g) => g,
            None => return false,
        };
        let order: Vec<String> = graph.nodes.iter().map(|node| node.output.to_string()).collect();
        let expected: Vec<String> = (0..n).map(|i| format!("T{}", i)).collect();
        diags.is_empty() && order == expected
    }
}
