//! Variable name synthesis and disambiguation (`spec.md` §4.4 step 1).
//!
//! Each resolved node needs a Rust identifier to bind its value to. The base name is the type's
//! lower-camel stem ([`TypeToken::variable_stem`]); a type requested more than once down
//! different paths reuses the same binding (`Namer` memoizes by type), and a stem that collides
//! with an unrelated type's stem (e.g. two distinct types both named `Config` in different
//! modules) is disambiguated with a numeric suffix. Injector inputs keep their declared parameter
//! names rather than a synthesized stem, since they're already bound by the function signature.

use crate::type_token::TypeToken;
use proc_macro2::Span;
use std::collections::HashMap;
use syn::Ident;

#[derive(Debug, Default)]
pub struct Namer {
    counts: HashMap<String, u32>,
    assigned: HashMap<TypeToken, Ident>,
}

impl Namer {
    pub fn new() -> Self {
        Namer::default()
    }

    /// Registers an injector input's declared name as the binding for its type, so that
    /// references to that type elsewhere in the graph resolve to the parameter itself rather
    /// than a freshly synthesized variable.
    pub fn seed_input(&mut self, ty: &TypeToken, ident: &Ident) {
        self.assigned.insert(ty.clone(), ident.clone());
        self.counts.insert(ident.to_string(), 1);
    }

    /// The variable name bound to `ty`'s resolved value, synthesizing and disambiguating one on
    /// first request and reusing it on every subsequent request for the same type.
    pub fn name_for(&mut self, ty: &TypeToken) -> Ident {
        if let Some(existing) = self.assigned.get(ty) {
            return existing.clone();
        }
        let stem = ty.variable_stem();
        let count = self.counts.entry(stem.clone()).or_insert(0);
        let name = if *count == 0 {
            stem.clone()
        } else {
            format!("{}{}", stem, count)
        };
        *count += 1;
        let ident = Ident::new(&name, Span::call_site());
        self.assigned.insert(ty.clone(), ident.clone());
        ident
    }

    /// The name of the cleanup function bound alongside `output_ident`'s value.
    pub fn cleanup_name_for(&mut self, output_ident: &Ident) -> Ident {
        Ident::new(&format!("{}_cleanup", output_ident), Span::call_site())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn reuses_name_for_same_type() {
        let mut namer = Namer::new();
        let ty = TypeToken::new(parse_quote!(Foo));
        let a = namer.name_for(&ty);
        let b = namer.name_for(&ty);
        assert_eq!(a, b);
    }

    #[test]
    fn disambiguates_colliding_stems() {
        let mut namer = Namer::new();
        let a = TypeToken::new(parse_quote!(Config));
        let b = TypeToken::new(parse_quote!(other::Config));
        let name_a = namer.name_for(&a);
        let name_b = namer.name_for(&b);
        assert_ne!(name_a, name_b);
    }

    #[test]
    fn keeps_injector_input_name() {
        let mut namer = Namer::new();
        let ty = TypeToken::new(parse_quote!(Context));
        namer.seed_input(&ty, &parse_quote!(ctx));
        assert_eq!(namer.name_for(&ty), parse_quote!(ctx));
    }
}
