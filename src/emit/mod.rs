//! The Emitter (`spec.md` §4.4): turns one injector's resolved dependency graph into the
//! function that replaces its stub, and assembles the whole generated file.
//!
//! Grounded in the same shape as the teacher's code generators (`tracers-codegen`'s
//! `CodeGenerator::handle_provider_trait` and friends): build a `syn` item with `quote`, never a
//! raw string, so the result is always syntactically valid by construction; formatting to text is
//! a final, separate step (here, `prettyplease`, since unlike the teacher this crate must hand
//! back real file contents rather than a `TokenStream` consumed immediately by `rustc`).

pub mod body;
pub mod cleanup;
pub mod imports;
pub mod naming;

use crate::model::InjectorStub;
use crate::resolve::ResolvedGraph;
use crate::type_token::TypeToken;
use naming::Namer;
use syn::{parse_quote, Ident, Item, ItemFn};

/// Emits the generated replacement for one injector stub.
pub fn emit_injector(stub: &InjectorStub, graph: &ResolvedGraph) -> ItemFn {
    let mut namer = Namer::new();
    let body::BodyResult {
        mut statements,
        cleanup_vars,
    } = body::build_statements(graph, stub, &mut namer);

    if stub.has_cleanup {
        let cleanup_ident = Ident::new("cleanup", proc_macro2::Span::call_site());
        statements.push(cleanup::combined_cleanup_stmt(&cleanup_ident, &cleanup_vars));
    }

    let root_idents: Vec<Ident> = graph.roots.iter().map(|r| namer.name_for(r)).collect();
    let value_expr: syn::Expr = if root_idents.len() == 1 {
        let r = &root_idents[0];
        parse_quote! { #r }
    } else {
        parse_quote! { ( #(#root_idents),* ) }
    };

    let return_stmt: syn::Stmt = match (stub.has_error, stub.has_cleanup) {
        (true, true) => parse_quote! { Ok((#value_expr, cleanup)) },
        (true, false) => parse_quote! { Ok(#value_expr) },
        (false, true) => parse_quote! { (#value_expr, cleanup) },
        (false, false) => parse_quote! { #value_expr },
    };
    statements.push(return_stmt);

    build_fn_item(stub, statements)
}

fn build_fn_item(stub: &InjectorStub, statements: Vec<syn::Stmt>) -> ItemFn {
    let name = &stub.name;
    let inputs: Vec<syn::FnArg> = stub
        .inputs
        .iter()
        .map(|(ident, ty)| -> syn::FnArg { parse_quote! { #ident: #ty } })
        .collect();
    let output_type = render_injector_return_type(stub);
    parse_quote! {
        pub fn #name(#(#inputs),*) -> #output_type {
            #(#statements)*
        }
    }
}

/// Rebuilds the injector's declared return type from its decomposed `outputs`/`has_error`/
/// `has_cleanup` fields -- the inverse of `reader::classify_injector_outputs`.
fn render_injector_return_type(stub: &InjectorStub) -> syn::Type {
    let mut end = stub.outputs.len();
    let error_ty: Option<&TypeToken> = if stub.has_error {
        end -= 1;
        Some(&stub.outputs[end])
    } else {
        None
    };
    let cleanup_ty: Option<&TypeToken> = if stub.has_cleanup {
        end -= 1;
        Some(&stub.outputs[end])
    } else {
        None
    };
    let value_types = &stub.outputs[..end];

    let inner: syn::Type = if let Some(cleanup_ty) = cleanup_ty {
        parse_quote! { ( #(#value_types),*, #cleanup_ty ) }
    } else if value_types.len() == 1 {
        let t = &value_types[0];
        parse_quote! { #t }
    } else {
        parse_quote! { ( #(#value_types),* ) }
    };

    match error_ty {
        Some(err) => parse_quote! { Result<#inner, #err> },
        None => inner,
    }
}

/// Assembles the final generated file: copy-through items (deduplicated imports first), followed
/// by every generated injector function, in the order the reader found the stubs.
pub fn emit_package(copy_through: Vec<Item>, generated_fns: Vec<ItemFn>) -> syn::File {
    let mut items = imports::dedup_imports(&copy_through);
    items.extend(generated_fns.into_iter().map(Item::Fn));
    syn::File {
        shebang: None,
        attrs: Vec::new(),
        items,
    }
}
