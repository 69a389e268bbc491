//! `InjectorStub`: the function signature that drives generation of one injector (`spec.md` §3).

use crate::model::ProviderSet;
use crate::type_token::TypeToken;
use proc_macro2::Span;
use syn::Ident;

#[derive(Debug, Clone)]
pub struct InjectorStub {
    pub name: Ident,
    pub inputs: Vec<(Ident, TypeToken)>,
    pub outputs: Vec<TypeToken>,
    /// Whether the last declared output is an error return.
    pub has_error: bool,
    /// Whether the penultimate declared output (before the error, if any) is a cleanup handle.
    pub has_cleanup: bool,
    pub set: ProviderSet,
    pub span: Span,
}

impl InjectorStub {
    /// The declared outputs excluding the trailing error and cleanup positions -- the types the
    /// resolver actually needs to seed its worklist with (`spec.md` §4.3 step 1).
    pub fn value_outputs(&self) -> &[TypeToken] {
        let mut end = self.outputs.len();
        if self.has_error {
            end -= 1;
        }
        if self.has_cleanup {
            end -= 1;
        }
        &self.outputs[..end]
    }

    pub fn input_type(&self, ty: &TypeToken) -> Option<&Ident> {
        self.inputs
            .iter()
            .find(|(_, input_ty)| input_ty == ty)
            .map(|(name, _)| name)
    }
}
