//! Canonical type identity.
//!
//! A *type token* is how this crate talks about a host-language type without re-implementing a
//! type-checker: it wraps the `syn::Type` the reader found at a use site together with a
//! canonicalized string key good enough for equality, hashing, and rendering back to source.
//! Equality is nominal, matching `spec.md`'s requirement that a named type is distinct from its
//! underlying structural type: `TypeToken` compares the rendered path/type text, never structural
//! shape, so `struct Foo(i32)` and a bare `i32` never unify just because one wraps the other.

use heck::MixedCase;
use quote::ToTokens;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A canonical, equality-comparable identifier for a type reachable from the provider set or
/// injector signature currently being processed.
#[derive(Debug, Clone)]
pub struct TypeToken {
    ty: syn::Type,
    key: String,
}

impl TypeToken {
    pub fn new(ty: syn::Type) -> Self {
        let key = canonical_key(&ty);
        TypeToken { ty, key }
    }

    /// The `syn::Type` this token carries, for emitting it back into generated source.
    pub fn syn_type(&self) -> &syn::Type {
        &self.ty
    }

    /// True if this token names the host language's cancellation/context type, i.e. it is
    /// exactly the path `Context` (optionally qualified). Resolution treats this type
    /// specially: it is satisfied only by an injector input, never by a provider (`spec.md`
    /// §4.3 "Context").
    pub fn is_context_type(&self) -> bool {
        self.key == "Context" || self.key.ends_with("::Context")
    }

    /// If this token names a shared reference type (`&T`), the token for `T` -- used to resolve
    /// the "pointer-to-value form" of a struct provider (`spec.md` §3 "Struct provider", end-to-end
    /// scenario 3) without the struct provider itself needing a second registration under `&T`.
    pub fn reference_pointee(&self) -> Option<TypeToken> {
        match &self.ty {
            syn::Type::Reference(r) => Some(TypeToken::new((*r.elem).clone())),
            _ => None,
        }
    }

    /// A lowerCamelCase, identifier-safe stem derived from this type's name, used as the basis
    /// for a generated variable name (`spec.md` §4.4 step 1).
    pub fn variable_stem(&self) -> String {
        let last_segment = self
            .key
            .rsplit("::")
            .next()
            .unwrap_or(&self.key)
            .trim_start_matches(['&', '*'])
            .trim_end_matches(['<', '>'].as_ref());
        let cleaned: String = last_segment
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let stem = cleaned.to_mixed_case();
        if stem.is_empty() {
            "value".to_string()
        } else {
            stem
        }
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl ToTokens for TypeToken {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        self.ty.to_tokens(tokens)
    }
}

/// Renders a `syn::Type` into a stable string key. This intentionally uses the same textual
/// rendering `quote` would produce for the type, normalized by collapsing whitespace, so that
/// two occurrences of the same written type (regardless of surrounding trivia) compare equal,
/// while distinct named types -- even ones with identical fields -- never do.
fn canonical_key(ty: &syn::Type) -> String {
    let rendered = ty.to_token_stream().to_string();
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}
