//! Shared `#[cfg(test)]` fixtures: small [`TableOracle`] instances and the `syn::File` snippets
//! they describe, reused across `reader`, `resolve`, and the end-to-end tests rather than
//! rebuilt ad hoc in each one.
#![cfg(test)]

use crate::type_oracle::{TableOracle, TypeKind};
use syn::parse_quote;

/// An oracle describing a three-link provider chain: `Foo -> Bar -> Baz`, each produced by a
/// plain (non-fallible, non-cleanup) function provider, with one value provider thrown in for
/// `Quux` to exercise that shape in the same fixture.
pub fn simple_chain_oracle() -> TableOracle {
    TableOracle::new()
        .with_fq_name("weld :: Set", "weld :: Set")
        .with_fq_name("weld :: Bind", "weld :: Bind")
        .with_fq_name("weld :: Value", "weld :: Value")
        .with_fq_name("weld :: build", "weld :: build")
        .with_fn_signature("provide_foo", vec![], parse_quote!(Foo))
        .with_fn_signature("provide_bar", vec![parse_quote!(Foo)], parse_quote!(Bar))
        .with_fn_signature("provide_baz", vec![parse_quote!(Bar)], parse_quote!(Baz))
}

/// An oracle for a provider-set that binds an interface (`dyn Fooer`) to a concrete type (`Bar`)
/// produced by a struct provider, exercising both `Bind` and the struct-provider shape.
pub fn interface_binding_oracle() -> TableOracle {
    TableOracle::new()
        .with_fq_name("weld :: Set", "weld :: Set")
        .with_fq_name("weld :: Bind", "weld :: Bind")
        .with_fq_name("weld :: Value", "weld :: Value")
        .with_fq_name("weld :: build", "weld :: build")
        .with_kind(
            "Bar",
            TypeKind::Struct {
                fields: vec![(parse_quote!(name), crate::type_token::TypeToken::new(parse_quote!(String)))],
            },
        )
        .with_satisfies("Bar", "dyn Fooer")
}

/// A provider whose function returns `Result<(Conn, Cleanup), ConnError>`, exercising the
/// fallible-and-cleanup provider shape end to end.
pub fn cleanup_oracle() -> TableOracle {
    TableOracle::new()
        .with_fq_name("weld :: Set", "weld :: Set")
        .with_fq_name("weld :: Bind", "weld :: Bind")
        .with_fq_name("weld :: Value", "weld :: Value")
        .with_fq_name("weld :: build", "weld :: build")
        .with_fn_signature(
            "open_conn",
            vec![],
            parse_quote!(Result<(Conn, Cleanup), ConnError>),
        )
}
