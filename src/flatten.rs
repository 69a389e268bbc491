//! The Set Flattener (`spec.md` §4.2): inlines nested provider sets, depth-first, into one flat
//! list of providers and bindings, recording the chain of set names each member was reached
//! through so later diagnostics can show provenance ("via `FooSet` via `BarSet`").
//!
//! A provider or binding referenced by more than one path to the same set (a diamond of nested
//! sets sharing a common dependency) is included exactly once: flattening deduplicates identical
//! references, but never collapses two *distinct* providers or bindings that merely happen to
//! produce/bind the same type -- that ambiguity is a resolver concern (`spec.md` §4.3), not a
//! flattening one.

use crate::model::{Binding, Provider, ProviderSet, SetMember};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub enum FlatMember {
    Provider(Provider),
    Binding(Binding),
}

/// One entry in the flattened list, together with the chain of set names (outermost first) it
/// was inlined through.
#[derive(Debug, Clone)]
pub struct FlatEntry {
    pub member: FlatMember,
    pub provenance: Vec<String>,
}

pub fn flatten_set(set: &ProviderSet) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = Vec::new();
    flatten_into(set, &mut stack, &mut out, &mut seen);
    out
}

fn flatten_into(
    set: &ProviderSet,
    stack: &mut Vec<String>,
    out: &mut Vec<FlatEntry>,
    seen: &mut HashSet<String>,
) {
    stack.push(set.display_name());
    for member in &set.members {
        match member {
            SetMember::Nested(nested) => flatten_into(nested, stack, out, seen),
            SetMember::Provider(provider) => {
                if seen.insert(provider_identity(provider)) {
                    out.push(FlatEntry {
                        member: FlatMember::Provider(provider.clone()),
                        provenance: stack.clone(),
                    });
                }
            }
            SetMember::Binding(binding) => {
                if seen.insert(binding_identity(binding)) {
                    out.push(FlatEntry {
                        member: FlatMember::Binding(binding.clone()),
                        provenance: stack.clone(),
                    });
                }
            }
        }
    }
    stack.pop();
}

/// A key identifying "the same provider declaration", used only to dedup identical references
/// reached via more than one nesting path. Distinct providers that happen to produce the same
/// output type hash to different keys here and are left for the resolver to flag as conflicting.
///
/// Prefixed so it can share a `seen` set with [`binding_identity`] without an unrelated provider
/// and binding ever colliding on the same key.
fn provider_identity(provider: &Provider) -> String {
    match provider {
        Provider::Function(f) => format!("fn:{}", render(&f.func)),
        Provider::Struct(s) => format!("struct:{}", s.ty),
        Provider::Value(v) => format!("value:{}:{}", v.output, render(&v.expr)),
    }
}

/// The binding analogue of [`provider_identity`]: a key identifying "the same `Bind` declaration",
/// used to collapse one binding reached via more than one nesting path (the diamond case of
/// `spec.md` §4.2 / Open Question 3) the same way repeated providers are collapsed. Two *distinct*
/// bindings for the same interface still hash to different keys and are left for the resolver's
/// conflict check.
fn binding_identity(binding: &Binding) -> String {
    format!("binding:{}:{}", binding.interface, binding.concrete)
}

fn render(tokens: impl quote::ToTokens) -> String {
    quote::quote! { #tokens }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionProvider, ProviderSet};
    use crate::type_token::TypeToken;
    use proc_macro2::Span;
    use syn::parse_quote;

    fn function_provider(name: &str, output: &str) -> Provider {
        Provider::Function(FunctionProvider {
            func: syn::parse_str(name).unwrap(),
            params: Vec::new(),
            output: TypeToken::new(syn::parse_str(output).unwrap()),
            has_error: false,
            has_cleanup: false,
            span: Span::call_site(),
        })
    }

    #[test]
    fn inlines_nested_sets_depth_first() {
        let inner = ProviderSet::new(
            Some(parse_quote!(InnerSet)),
            Span::call_site(),
            vec![SetMember::Provider(function_provider("provide_bar", "Bar"))],
        );
        let outer = ProviderSet::new(
            None,
            Span::call_site(),
            vec![
                SetMember::Provider(function_provider("provide_foo", "Foo")),
                SetMember::Nested(inner),
            ],
        );
        let flat = flatten_set(&outer);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].provenance, vec!["<anonymous set>", "InnerSet"]);
    }

    #[test]
    fn deduplicates_identical_provider_reached_twice() {
        let inner_a = ProviderSet::new(
            Some(parse_quote!(A)),
            Span::call_site(),
            vec![SetMember::Provider(function_provider("provide_shared", "Shared"))],
        );
        let inner_b = ProviderSet::new(
            Some(parse_quote!(B)),
            Span::call_site(),
            vec![SetMember::Provider(function_provider("provide_shared", "Shared"))],
        );
        let outer = ProviderSet::new(
            None,
            Span::call_site(),
            vec![SetMember::Nested(inner_a), SetMember::Nested(inner_b)],
        );
        let flat = flatten_set(&outer);
        assert_eq!(flat.len(), 1);
    }

    /// A single `Bind` reached through two nested sets (the diamond case of Open Question 3) must
    /// collapse to one flattened entry, the same way a repeated provider does -- otherwise the
    /// resolver would see two candidates for the interface and report a spurious conflict.
    #[test]
    fn deduplicates_identical_binding_reached_twice() {
        use crate::model::Binding;

        let binding = || {
            SetMember::Binding(Binding {
                interface: TypeToken::new(syn::parse_str("dyn Fooer").unwrap()),
                concrete: TypeToken::new(syn::parse_str("Bar").unwrap()),
                span: Span::call_site(),
            })
        };
        let inner_a = ProviderSet::new(Some(parse_quote!(A)), Span::call_site(), vec![binding()]);
        let inner_b = ProviderSet::new(Some(parse_quote!(B)), Span::call_site(), vec![binding()]);
        let outer = ProviderSet::new(
            None,
            Span::call_site(),
            vec![SetMember::Nested(inner_a), SetMember::Nested(inner_b)],
        );
        let flat = flatten_set(&outer);
        assert_eq!(flat.len(), 1);
    }
}
