//! Cleanup composition (`spec.md` §4.4 step 3): every provider that hands back a cleanup handle
//! needs it invoked, in the exact reverse of the order its resource was acquired in, whether the
//! injector is unwinding early on an error mid-construction or tearing down normally once its
//! caller is done with it.

use syn::{parse_quote, Ident, Stmt};

/// The statements that invoke every cleanup acquired so far, in reverse creation order -- spliced
/// into an `Err` arm right before propagating the error.
pub fn prior_cleanup_calls(cleanup_vars_so_far: &[Ident]) -> Vec<Stmt> {
    cleanup_vars_so_far
        .iter()
        .rev()
        .map(|c| -> Stmt { parse_quote! { #c(); } })
        .collect()
}

/// The single combined cleanup closure an injector that declares a cleanup output returns: a
/// closure that, when called, invokes every acquired cleanup in reverse creation order.
pub fn combined_cleanup_stmt(cleanup_var: &Ident, cleanup_vars: &[Ident]) -> Stmt {
    let calls: Vec<Stmt> = prior_cleanup_calls(cleanup_vars);
    parse_quote! {
        let #cleanup_var = move || {
            #(#calls)*
        };
    }
}
