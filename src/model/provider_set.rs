//! `ProviderSet`: a named collection of providers and bindings, possibly including other sets
//! (`spec.md` §3 "Provider Set"). Sets may nest arbitrarily but must not be cyclically nested;
//! a cycle is structurally unconstructable rather than explicitly rejected. `reader::read_package`
//! builds named sets in one forward pass over the file (`reader::collect_named_sets`), inserting
//! each into its registry only once fully parsed, and a nested-set reference
//! (`reader::parse_set_member`'s `Expr::Path` arm) can only resolve against sets already in that
//! registry -- a set can never see itself or a set declared after it, so no reference chain can
//! loop back on itself by construction.

use crate::model::{Binding, Provider};
use proc_macro2::Span;
use syn::Ident;

/// One entry in a set's argument list: a provider, a binding, or another set inlined by
/// reference. Each variant keeps the source location it was declared at so diagnostics can show
/// provenance chains back through nested sets (`spec.md` §4.2).
#[derive(Debug, Clone)]
pub enum SetMember {
    Provider(Provider),
    Binding(Binding),
    Nested(ProviderSet),
}

#[derive(Debug, Clone)]
pub struct ProviderSet {
    pub name: Option<Ident>,
    pub span: Span,
    pub members: Vec<SetMember>,
}

impl ProviderSet {
    pub fn new(name: Option<Ident>, span: Span, members: Vec<SetMember>) -> Self {
        ProviderSet { name, span, members }
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "<anonymous set>".to_string())
    }
}
