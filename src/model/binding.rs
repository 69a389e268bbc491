//! `Bind(ptr-to-interface-zero, ptr-to-concrete-zero)`: not a provider on its own, but a rewrite
//! rule that redirects requests for an interface type to its bound concrete type during
//! resolution (`spec.md` §3, §4.3 step 2).

use crate::type_token::TypeToken;
use proc_macro2::Span;

#[derive(Debug, Clone)]
pub struct Binding {
    pub interface: TypeToken,
    pub concrete: TypeToken,
    pub span: Span,
}
