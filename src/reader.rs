//! AST Reader (`spec.md` §4.1): recognizes the four DSL marker forms (`Set`, `Bind`, `Value`,
//! `Build`) and injector stubs in an already-parsed `syn::File`, and produces the Provider Model.
//!
//! Recognition is always by fully-qualified symbol reference, via [`TypeOracle::fq_name_of_path`],
//! never by comparing the last path segment's text -- so an aliased import (`use weld::Set as
//! Providers;`) is still recognized. This mirrors the teacher's `probe_discovery` module, which
//! likewise turns a raw `syn` item into a validated spec one field at a time, accumulating a
//! diagnostic and bailing out of just that one item rather than the whole file on any problem.

use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::{Binding, FunctionProvider, InjectorStub, Provider, ProviderSet, SetMember, StructProvider, ValueProvider};
use crate::type_oracle::{TypeKind, TypeOracle};
use crate::type_token::TypeToken;
use std::collections::HashMap;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Expr, ExprCall, Item, ItemConst, ItemFn, ItemStatic};

const FQ_SET: &str = "weld :: Set";
const FQ_BIND: &str = "weld :: Bind";
const FQ_VALUE: &str = "weld :: Value";
const FQ_BUILD: &str = "weld :: build";

/// Everything the reader produced from one file: the injector stubs ready for resolution, and
/// every other top-level declaration, to be copied verbatim into the generated file
/// (`spec.md` §4.1 "Copy-through").
pub struct ReadResult {
    pub injectors: Vec<InjectorStub>,
    pub copy_through: Vec<Item>,
}

/// Reads one package's AST and produces its Provider Model and injector stubs.
pub fn read_package(file: &syn::File, oracle: &dyn TypeOracle, diags: &mut Diagnostics) -> ReadResult {
    let set_registry = collect_named_sets(file, oracle, diags);

    let mut injectors = Vec::new();
    let mut copy_through = Vec::new();

    for item in &file.items {
        if let Item::Fn(item_fn) = item {
            if let Some(build_call) = find_build_call(&item_fn.block) {
                if let Some(stub) = build_injector_stub(item_fn, build_call, oracle, &set_registry, diags) {
                    injectors.push(stub);
                    continue;
                }
            }
        }
        copy_through.push(item.clone());
    }

    ReadResult { injectors, copy_through }
}

/// First pass: find every top-level `const`/`static` item whose initializer is a `Set(...)`
/// call, so that later references to it by name (as a nested set, or as a `Build` argument) can
/// be resolved. This is how `spec.md`'s "another set reference (nested set)" is realized without
/// a full symbol table: a named set must be declared at package level to be referenced by name.
fn collect_named_sets(
    file: &syn::File,
    oracle: &dyn TypeOracle,
    diags: &mut Diagnostics,
) -> HashMap<String, ProviderSet> {
    let mut registry = HashMap::new();
    for item in &file.items {
        let (name, expr) = match item {
            Item::Const(ItemConst { ident, expr, .. }) => (ident.clone(), expr.as_ref()),
            Item::Static(ItemStatic { ident, expr, .. }) => (ident.clone(), expr.as_ref()),
            _ => continue,
        };
        if let Expr::Call(call) = expr {
            if path_fq(&call.func, oracle).as_deref() == Some(FQ_SET) {
                if let Some(set) = parse_set_call(call, Some(name.clone()), oracle, &registry, diags) {
                    registry.insert(name.to_string(), set);
                }
            }
        }
    }
    registry
}

/// A symbol's fully-qualified identity never depends on what it was instantiated with, so
/// `Bind::<dyn Fooer, Bar>`'s generic arguments are stripped before asking the oracle -- otherwise
/// every distinct instantiation of `Bind` would need its own registration.
fn path_fq(expr: &Expr, oracle: &dyn TypeOracle) -> Option<String> {
    match expr {
        Expr::Path(p) => {
            let mut bare = p.path.clone();
            if let Some(last) = bare.segments.last_mut() {
                last.arguments = syn::PathArguments::None;
            }
            oracle.fq_name_of_path(&bare)
        }
        _ => None,
    }
}

/// Looks for the `Build(...)` call that marks a function as an injector stub: either the sole
/// statement of the body (`spec.md` "build-call-plus-return", where the return is whatever
/// follow-on statements exist), or nested as the argument of a panicking wrapper
/// (`spec.md` "panic-of-build"). Both forms are equivalent; only the `Build` call itself matters.
fn find_build_call(block: &syn::Block) -> Option<ExprCall> {
    for stmt in &block.stmts {
        let expr = match stmt {
            syn::Stmt::Expr(e) | syn::Stmt::Semi(e, _) => e,
            _ => continue,
        };
        if let Some(call) = as_build_call(expr) {
            return Some(call.clone());
        }
        // panic-of-build: the build call is the sole argument of some other call
        // (a panicking helper, or the `panic!` macro's contents parsed as an expression).
        if let Expr::Call(outer) = expr {
            if outer.args.len() == 1 {
                if let Some(call) = as_build_call(&outer.args[0]) {
                    return Some(call.clone());
                }
            }
        }
        if let Expr::Macro(mac) = expr {
            if mac.mac.path.is_ident("panic") {
                if let Ok(inner) = syn::parse2::<Expr>(mac.mac.tokens.clone()) {
                    if let Some(call) = as_build_call(&inner) {
                        return Some(call.clone());
                    }
                }
            }
        }
    }
    None
}

fn as_build_call(expr: &Expr) -> Option<&ExprCall> {
    if let Expr::Call(call) = expr {
        if let Expr::Path(p) = call.func.as_ref() {
            // Recognized textually here (no oracle available yet in this narrow helper); the
            // fully-qualified check happens again, authoritatively, in `build_injector_stub`.
            if p.path.segments.last().map(|s| s.ident == "build").unwrap_or(false) {
                return Some(call);
            }
        }
    }
    None
}

fn build_injector_stub(
    item_fn: &ItemFn,
    build_call: ExprCall,
    oracle: &dyn TypeOracle,
    set_registry: &HashMap<String, ProviderSet>,
    diags: &mut Diagnostics,
) -> Option<InjectorStub> {
    if path_fq(&build_call.func, oracle).as_deref() != Some(FQ_BUILD) {
        return None;
    }

    let span = item_fn.sig.span();
    let mut inputs = Vec::new();
    for arg in &item_fn.sig.inputs {
        match arg {
            syn::FnArg::Typed(pat_type) => {
                if let syn::Pat::Ident(pat_ident) = pat_type.pat.as_ref() {
                    inputs.push((pat_ident.ident.clone(), TypeToken::new((*pat_type.ty).clone())));
                } else {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::DslMisuse {
                            form: "injector stub".to_string(),
                            reason: "input parameters must be simple identifiers".to_string(),
                        },
                        pat_type.span(),
                    ));
                    return None;
                }
            }
            syn::FnArg::Receiver(_) => {
                diags.push(Diagnostic::new(
                    DiagnosticKind::DslMisuse {
                        form: "injector stub".to_string(),
                        reason: "an injector stub must not take `self`".to_string(),
                    },
                    arg.span(),
                ));
                return None;
            }
        }
    }

    let (outputs, has_error, has_cleanup) = match &item_fn.sig.output {
        syn::ReturnType::Type(_, ty) => classify_injector_outputs(ty),
        syn::ReturnType::Default => {
            diags.push(Diagnostic::new(
                DiagnosticKind::BadInjectorReturn {
                    injector_name: item_fn.sig.ident.to_string(),
                    reason: "an injector stub must declare at least one output type".to_string(),
                },
                span,
            ));
            return None;
        }
    };

    let set = match resolve_set_arguments(&build_call.args, oracle, set_registry, diags, "Build") {
        Some(members) => ProviderSet::new(None, build_call.span(), members),
        None => return None,
    };

    Some(InjectorStub {
        name: item_fn.sig.ident.clone(),
        inputs,
        outputs,
        has_error,
        has_cleanup,
        set,
        span,
    })
}

/// Decomposes an injector's declared return type into its full return-position list plus
/// error/cleanup flags. Unlike a provider, an injector may request more than one top-level value
/// type at once, so its return type is the more general `T`, `(A, B, ...)`, `Result<_, E>`, or a
/// tuple ending in a `Cleanup`, in any combination. `outputs` holds one [`TypeToken`] per return
/// position in source order -- the value types, then the cleanup type if present, then the error
/// type if present -- which is exactly what [`crate::model::InjectorStub::value_outputs`] trims
/// from the end.
fn classify_injector_outputs(ty: &syn::Type) -> (Vec<TypeToken>, bool, bool) {
    let (inner, error_ty) = match extract_result(ty) {
        Some((ok, err)) => (ok, Some(err)),
        None => (ty.clone(), None),
    };

    let mut outputs = Vec::new();
    let has_cleanup;
    match &inner {
        syn::Type::Tuple(tup) if !tup.elems.is_empty() => {
            let mut elems: Vec<syn::Type> = tup.elems.iter().cloned().collect();
            if elems.last().map(is_cleanup_shaped).unwrap_or(false) {
                has_cleanup = true;
                let cleanup_ty = elems.pop().expect("checked non-empty above");
                outputs.extend(elems.into_iter().map(TypeToken::new));
                outputs.push(TypeToken::new(cleanup_ty));
            } else {
                has_cleanup = false;
                outputs.extend(elems.into_iter().map(TypeToken::new));
            }
        }
        single => {
            has_cleanup = false;
            outputs.push(TypeToken::new(single.clone()));
        }
    }

    let has_error = error_ty.is_some();
    if let Some(err_ty) = error_ty {
        outputs.push(TypeToken::new(err_ty));
    }
    (outputs, has_error, has_cleanup)
}

/// If `ty` is `Result<Ok, Err>`, returns its two generic arguments.
fn extract_result(ty: &syn::Type) -> Option<(syn::Type, syn::Type)> {
    let type_path = match ty {
        syn::Type::Path(p) => p,
        _ => return None,
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Result" {
        return None;
    }
    let args = match &seg.arguments {
        syn::PathArguments::AngleBracketed(a) => a,
        _ => return None,
    };
    let mut type_args = args.args.iter().filter_map(|a| match a {
        syn::GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    });
    let ok = type_args.next()?;
    let err = type_args.next()?;
    Some((ok, err))
}

/// Structurally decomposes a provider's raw return type into its primary output, whether it
/// carries an error, and whether it carries a cleanup. This never needs the oracle: the shapes
/// (`spec.md` §6) are syntactic -- `T`, `Result<T, E>`, `(T, Cleanup)`, `Result<(T, Cleanup), E>`
/// -- where `Cleanup` is either the literal bare-fn type `fn()` or any named type whose last path
/// segment is `Cleanup` (see Open Question resolution in DESIGN.md for why this realizes the
/// "pointer-to-zero"-style shape contract more natural to Rust than Go's bare multi-return).
pub(crate) fn classify_return_type(ty: &syn::Type) -> Result<(TypeToken, bool, bool), String> {
    if let syn::Type::Path(type_path) = ty {
        if let Some(seg) = type_path.path.segments.last() {
            if seg.ident == "Result" {
                let ok_ty = match &seg.arguments {
                    syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|a| match a {
                        syn::GenericArgument::Type(t) => Some(t),
                        _ => None,
                    }),
                    _ => None,
                };
                let ok_ty = ok_ty.ok_or_else(|| "Result must be parameterized with an Ok type".to_string())?;
                if let syn::Type::Tuple(tup) = ok_ty {
                    if tup.elems.len() == 2 && is_cleanup_shaped(&tup.elems[1]) {
                        return Ok((TypeToken::new(tup.elems[0].clone()), true, true));
                    }
                    return Err("a tuple Ok type must be exactly (T, Cleanup)".to_string());
                }
                return Ok((TypeToken::new(ok_ty.clone()), true, false));
            }
        }
    }
    if let syn::Type::Tuple(tup) = ty {
        if tup.elems.is_empty() {
            return Err("`()` is not a valid provider output".to_string());
        }
        if tup.elems.len() == 2 && is_cleanup_shaped(&tup.elems[1]) {
            return Ok((TypeToken::new(tup.elems[0].clone()), false, true));
        }
    }
    Ok((TypeToken::new(ty.clone()), false, false))
}

fn is_cleanup_shaped(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::BareFn(f) => f.inputs.is_empty() && matches!(f.output, syn::ReturnType::Default),
        syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident == "Cleanup").unwrap_or(false),
        _ => false,
    }
}

/// Recognizes a `Set(args...)` call (`spec.md` §4.1 "Set constructor"), whether it is the
/// top-level set passed to `Build` or a named set being declared for later reference.
fn parse_set_call(
    call: &ExprCall,
    name: Option<syn::Ident>,
    oracle: &dyn TypeOracle,
    set_registry: &HashMap<String, ProviderSet>,
    diags: &mut Diagnostics,
) -> Option<ProviderSet> {
    let members = resolve_set_arguments(&call.args, oracle, set_registry, diags, "Set")?;
    Some(ProviderSet::new(name, call.span(), members))
}

fn resolve_set_arguments(
    args: &syn::punctuated::Punctuated<Expr, syn::token::Comma>,
    oracle: &dyn TypeOracle,
    set_registry: &HashMap<String, ProviderSet>,
    diags: &mut Diagnostics,
    form: &str,
) -> Option<Vec<SetMember>> {
    let mut members = Vec::new();
    let mut ok = true;
    for arg in args {
        match parse_set_member(arg, oracle, set_registry, diags, form) {
            Some(member) => members.push(member),
            None => ok = false,
        }
    }
    if ok {
        Some(members)
    } else {
        None
    }
}

fn parse_set_member(
    expr: &Expr,
    oracle: &dyn TypeOracle,
    set_registry: &HashMap<String, ProviderSet>,
    diags: &mut Diagnostics,
    form: &str,
) -> Option<SetMember> {
    match expr {
        Expr::Call(call) => {
            let fq = path_fq(&call.func, oracle);
            match fq.as_deref() {
                Some(FQ_SET) => parse_set_call(call, None, oracle, set_registry, diags).map(SetMember::Nested),
                Some(FQ_BIND) => parse_binding(call, oracle, diags).map(SetMember::Binding),
                Some(FQ_VALUE) => parse_value(call, oracle, diags).map(|v| SetMember::Provider(Provider::Value(v))),
                _ => {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::DslMisuse {
                            form: form.to_string(),
                            reason: format!(
                                "`{}` is not a recognized `Set`, `Bind`, or `Value` call",
                                quote::quote! { #call }
                            ),
                        },
                        call.span(),
                    ));
                    None
                }
            }
        }
        Expr::Path(p) => {
            if let Some(set) = set_registry.get(&path_text(&p.path)) {
                Some(SetMember::Nested(set.clone()))
            } else {
                parse_function_provider(&p.path, oracle, diags).map(Provider::Function).map(SetMember::Provider)
            }
        }
        Expr::Struct(s) => parse_struct_provider(s, oracle, diags).map(Provider::Struct).map(SetMember::Provider),
        _ => {
            diags.push(Diagnostic::new(
                DiagnosticKind::DslMisuse {
                    form: form.to_string(),
                    reason: "each argument must be a function reference, a struct literal, a nested set, a `Bind(...)`, or a `Value(...)`".to_string(),
                },
                expr.span(),
            ));
            None
        }
    }
}

fn path_text(path: &syn::Path) -> String {
    quote::quote! { #path }.to_string()
}

/// `Bind::<Interface, Concrete>()` -- the Rust realization of `spec.md`'s "pointer-to-zero as
/// type token carrier" pattern (§9 Design Notes), using explicit generic type parameters instead
/// of smuggling a type through a `(*T)(nil)` value, exactly as that section invites for a
/// language with first-class generics.
fn parse_binding(call: &ExprCall, oracle: &dyn TypeOracle, diags: &mut Diagnostics) -> Option<Binding> {
    if !call.args.is_empty() {
        diags.push(Diagnostic::new(
            DiagnosticKind::DslMisuse {
                form: "Bind".to_string(),
                reason: "`Bind` takes no value arguments; the interface and concrete types are given as generic parameters, e.g. `Bind::<dyn Fooer, Bar>()`".to_string(),
            },
            call.span(),
        ));
        return None;
    }
    let path = match call.func.as_ref() {
        Expr::Path(p) => &p.path,
        _ => {
            diags.push(Diagnostic::new(
                DiagnosticKind::DslMisuse {
                    form: "Bind".to_string(),
                    reason: "expected a path expression".to_string(),
                },
                call.span(),
            ));
            return None;
        }
    };
    let seg = path.segments.last()?;
    let type_args: Vec<&syn::Type> = match &seg.arguments {
        syn::PathArguments::AngleBracketed(a) => a
            .args
            .iter()
            .filter_map(|g| match g {
                syn::GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    if type_args.len() != 2 {
        diags.push(Diagnostic::new(
            DiagnosticKind::BadBinding {
                interface: "?".to_string(),
                concrete: "?".to_string(),
                reason: "`Bind` requires exactly two generic type arguments: the interface and the concrete type".to_string(),
            },
            call.span(),
        ));
        return None;
    }
    let interface = TypeToken::new(type_args[0].clone());
    let concrete = TypeToken::new(type_args[1].clone());

    // `spec.md` §3 invariant 4 / §9 "struct provider participating in interface binding": the
    // concrete's method set must satisfy the interface. Whether a struct provider may itself be
    // the concrete of a binding is the Open Question §9 leaves unresolved; this crate takes the
    // answer it already proposes -- allowed iff `satisfies` says so -- which requires no special
    // casing here at all, since `satisfies` doesn't care how `concrete` ends up with a provider.
    if !oracle.satisfies(&concrete, &interface) {
        diags.push(Diagnostic::new(
            DiagnosticKind::BadBinding {
                interface: interface.to_string(),
                concrete: concrete.to_string(),
                reason: format!("`{}` does not implement `{}`", concrete, interface),
            },
            call.span(),
        ));
        return None;
    }

    Some(Binding { interface, concrete, span: call.span() })
}

struct CallFinder {
    found: bool,
}

impl<'ast> Visit<'ast> for CallFinder {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        self.found = true;
        visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        self.found = true;
        visit::visit_expr_method_call(self, node);
    }
}

fn contains_call(expr: &Expr) -> bool {
    let mut finder = CallFinder { found: false };
    finder.visit_expr(expr);
    finder.found
}

/// `Value(expr)` (`spec.md` §4.1 "Value expression"): the expression must be free of calls.
fn parse_value(call: &ExprCall, oracle: &dyn TypeOracle, diags: &mut Diagnostics) -> Option<ValueProvider> {
    if call.args.len() != 1 {
        diags.push(Diagnostic::new(
            DiagnosticKind::DslMisuse {
                form: "Value".to_string(),
                reason: "`Value` takes exactly one argument".to_string(),
            },
            call.span(),
        ));
        return None;
    }
    let expr = &call.args[0];
    if contains_call(expr) {
        diags.push(Diagnostic::new(
            DiagnosticKind::BadValueExpr {
                type_name: "<unknown>".to_string(),
                reason: "value provider expressions must not contain any function or method call"
                    .to_string(),
            },
            expr.span(),
        ));
        return None;
    }
    let output = match oracle.type_of_expr(expr) {
        Some(ty) => ty,
        None => {
            diags.push(Diagnostic::new(
                DiagnosticKind::BadValueExpr {
                    type_name: "<unknown>".to_string(),
                    reason: "could not determine the type of this expression".to_string(),
                },
                expr.span(),
            ));
            return None;
        }
    };
    Some(ValueProvider {
        output,
        expr: expr.clone(),
        span: call.span(),
    })
}

/// A struct-type literal in a `Set`'s argument list (`spec.md` §4.1) registers that struct as a
/// provider: the struct's field list, in declaration order, becomes the provider's required
/// inputs.
fn parse_struct_provider(
    expr_struct: &syn::ExprStruct,
    oracle: &dyn TypeOracle,
    diags: &mut Diagnostics,
) -> Option<StructProvider> {
    let ty = match oracle.type_of_path(&expr_struct.path) {
        Some(ty) => ty,
        None => {
            diags.push(Diagnostic::new(
                DiagnosticKind::DslMisuse {
                    form: "Set".to_string(),
                    reason: format!("could not resolve the type of `{}`", path_text(&expr_struct.path)),
                },
                expr_struct.span(),
            ));
            return None;
        }
    };
    let fields = match oracle.kind_of(&ty) {
        Some(TypeKind::Struct { fields }) => fields,
        _ => {
            diags.push(Diagnostic::new(
                DiagnosticKind::BadShape {
                    func_name: ty.to_string(),
                    reason: "a struct provider must name a struct type".to_string(),
                },
                expr_struct.span(),
            ));
            return None;
        }
    };
    Some(StructProvider {
        ty,
        fields,
        span: expr_struct.span(),
    })
}

/// A bare function reference in a `Set`'s argument list (`spec.md` §4.1) registers that function
/// as a provider, validating its signature matches one of the four permitted shapes
/// (`spec.md` §6 "Provider shape contract").
fn parse_function_provider(
    path: &syn::Path,
    oracle: &dyn TypeOracle,
    diags: &mut Diagnostics,
) -> Option<FunctionProvider> {
    let sig = match oracle.fn_signature(path) {
        Some(sig) => sig,
        None => {
            diags.push(Diagnostic::new(
                DiagnosticKind::DslMisuse {
                    form: "Set".to_string(),
                    reason: format!("`{}` does not resolve to a known function", path_text(path)),
                },
                path.span(),
            ));
            return None;
        }
    };
    let (output, has_error, has_cleanup) = match classify_return_type(&sig.return_type) {
        Ok(triple) => triple,
        Err(reason) => {
            diags.push(Diagnostic::new(
                DiagnosticKind::BadShape {
                    func_name: path_text(path),
                    reason,
                },
                path.span(),
            ));
            return None;
        }
    };
    Some(FunctionProvider {
        func: path.clone(),
        params: sig.params,
        output,
        has_error,
        has_cleanup,
        span: path.span(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use syn::parse_quote;

    /// `Bind`'s turbofish must not defeat fully-qualified symbol recognition: every instantiation
    /// of `weld::Bind::<_, _>` is the same symbol.
    #[test]
    fn path_fq_ignores_generic_arguments() {
        let oracle = testdata::interface_binding_oracle();
        let expr: Expr = parse_quote!(weld::Bind::<dyn Fooer, Bar>());
        let call = match &expr {
            Expr::Call(c) => c,
            _ => unreachable!(),
        };
        assert_eq!(path_fq(&call.func, &oracle).as_deref(), Some(FQ_BIND));
    }

    #[test]
    fn recognizes_injector_stub_with_return_form() {
        let item_fn: ItemFn = parse_quote! {
            fn initialize_app(ctx: Context) -> Result<Baz, MyError> {
                weld::build(FooSet);
                unreachable!()
            }
        };
        assert!(find_build_call(&item_fn.block).is_some());
    }

    #[test]
    fn recognizes_injector_stub_with_panic_form() {
        let item_fn: ItemFn = parse_quote! {
            fn initialize_app(ctx: Context) -> Baz {
                panic!(weld::build(FooSet))
            }
        };
        assert!(find_build_call(&item_fn.block).is_some());
    }

    #[test]
    fn classifies_plain_output() {
        let ty: syn::Type = parse_quote!(Foo);
        let (output, has_error, has_cleanup) = classify_return_type(&ty).unwrap();
        assert_eq!(output.to_string(), "Foo");
        assert!(!has_error);
        assert!(!has_cleanup);
    }

    #[test]
    fn classifies_fallible_output() {
        let ty: syn::Type = parse_quote!(Result<Baz, MyError>);
        let (output, has_error, has_cleanup) = classify_return_type(&ty).unwrap();
        assert_eq!(output.to_string(), "Baz");
        assert!(has_error);
        assert!(!has_cleanup);
    }

    #[test]
    fn classifies_cleanup_output() {
        let ty: syn::Type = parse_quote!((File, Cleanup));
        let (output, has_error, has_cleanup) = classify_return_type(&ty).unwrap();
        assert_eq!(output.to_string(), "File");
        assert!(!has_error);
        assert!(has_cleanup);
    }

    #[test]
    fn classifies_fallible_cleanup_output() {
        let ty: syn::Type = parse_quote!(Result<(File, Cleanup), MyError>);
        let (output, has_error, has_cleanup) = classify_return_type(&ty).unwrap();
        assert_eq!(output.to_string(), "File");
        assert!(has_error);
        assert!(has_cleanup);
    }

    #[test]
    fn rejects_calls_in_value_expressions() {
        let oracle = testdata::simple_chain_oracle();
        let mut diags = Diagnostics::new();
        let call: ExprCall = parse_quote!(weld::Value(compute_it()));
        assert!(parse_value(&call, &oracle, &mut diags).is_none());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn parses_binding_generic_form() {
        let oracle = testdata::interface_binding_oracle();
        let mut diags = Diagnostics::new();
        let call: ExprCall = parse_quote!(Bind::<dyn Fooer, Bar>());
        let binding = parse_binding(&call, &oracle, &mut diags).expect("should parse");
        assert_eq!(binding.interface.to_string(), "dyn Fooer");
        assert_eq!(binding.concrete.to_string(), "Bar");
        assert!(diags.is_empty());
    }

    #[test]
    fn rejects_binding_whose_concrete_does_not_satisfy_the_interface() {
        let oracle = testdata::simple_chain_oracle();
        let mut diags = Diagnostics::new();
        let call: ExprCall = parse_quote!(Bind::<dyn Fooer, Bar>());
        assert!(parse_binding(&call, &oracle, &mut diags).is_none());
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags.iter().next().unwrap().kind, DiagnosticKind::BadBinding { .. }));
    }
}
