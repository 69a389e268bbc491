//! Straight-line body assembly (`spec.md` §4.4 steps 1-3): walks a resolved graph in topological
//! order and emits one binding statement per node, threading the running list of acquired
//! cleanups through so a fallible provider's `Err` arm can unwind everything acquired before it.

use super::cleanup::prior_cleanup_calls;
use super::naming::Namer;
use crate::model::{InjectorStub, Provider};
use crate::resolve::{ResolvedGraph, ResolvedSource};
use syn::{parse_quote, Ident, Stmt};

pub struct BodyResult {
    pub statements: Vec<Stmt>,
    /// The cleanup-variable idents bound so far, in creation order -- the basis for the
    /// injector's final combined cleanup closure (`emit::cleanup::combined_cleanup_stmt`).
    pub cleanup_vars: Vec<Ident>,
}

pub fn build_statements(graph: &ResolvedGraph, injector: &InjectorStub, namer: &mut Namer) -> BodyResult {
    for (ident, ty) in &injector.inputs {
        namer.seed_input(ty, ident);
    }

    let mut statements = Vec::new();
    let mut cleanup_vars: Vec<Ident> = Vec::new();

    for node in &graph.nodes {
        match &node.source {
            ResolvedSource::InjectorInput(_) => {
                // Already bound by the function's own parameter list; nothing to emit.
            }
            ResolvedSource::Alias(concrete) => {
                let name = namer.name_for(&node.output);
                let concrete_name = namer.name_for(concrete);
                // `node.output` is whatever the caller actually asked for -- usually the
                // reference form (`&dyn Fooer`), sometimes the bare interface itself. Either
                // way the annotation needs the bare interface, since this statement supplies
                // its own leading `&`.
                let interface_ty = node.output.reference_pointee().unwrap_or_else(|| node.output.clone());
                statements.push(parse_quote! {
                    let #name: &#interface_ty = &#concrete_name;
                });
            }
            ResolvedSource::Reference(pointee) => {
                // The pointer-to-value form of a struct provider (`spec.md` §4.4 step 7): take
                // the address of the already-bound struct value rather than calling anything.
                let name = namer.name_for(&node.output);
                let pointee_name = namer.name_for(pointee);
                statements.push(parse_quote! {
                    let #name = &#pointee_name;
                });
            }
            ResolvedSource::Provider(provider) => {
                let name = namer.name_for(&node.output);
                let stmt = match provider {
                    Provider::Struct(s) => {
                        let ty_path = &s.ty;
                        let field_inits: Vec<proc_macro2::TokenStream> = s
                            .fields
                            .iter()
                            .map(|(field_name, field_ty)| {
                                let arg = namer.name_for(field_ty);
                                quote::quote! { #field_name: #arg }
                            })
                            .collect();
                        parse_quote! {
                            let #name = #ty_path { #(#field_inits),* };
                        }
                    }
                    Provider::Value(v) => {
                        let expr = &v.expr;
                        parse_quote! { let #name = #expr; }
                    }
                    Provider::Function(f) => {
                        let func_path = &f.func;
                        let args: Vec<Ident> = f.params.iter().map(|p| namer.name_for(p)).collect();
                        let prior_cleanup = prior_cleanup_calls(&cleanup_vars);
                        match (f.has_error, f.has_cleanup) {
                            (false, false) => parse_quote! {
                                let #name = #func_path(#(#args),*);
                            },
                            (true, false) => parse_quote! {
                                let #name = match #func_path(#(#args),*) {
                                    Ok(value) => value,
                                    Err(error) => {
                                        #(#prior_cleanup)*
                                        return Err(error.into());
                                    }
                                };
                            },
                            (false, true) => {
                                let cleanup_name = namer.cleanup_name_for(&name);
                                let stmt: Stmt = parse_quote! {
                                    let (#name, #cleanup_name) = #func_path(#(#args),*);
                                };
                                cleanup_vars.push(cleanup_name);
                                stmt
                            }
                            (true, true) => {
                                let cleanup_name = namer.cleanup_name_for(&name);
                                let stmt: Stmt = parse_quote! {
                                    let (#name, #cleanup_name) = match #func_path(#(#args),*) {
                                        Ok(value) => value,
                                        Err(error) => {
                                            #(#prior_cleanup)*
                                            return Err(error.into());
                                        }
                                    };
                                };
                                cleanup_vars.push(cleanup_name);
                                stmt
                            }
                        }
                    }
                };
                statements.push(stmt);
            }
        }
    }

    BodyResult { statements, cleanup_vars }
}
