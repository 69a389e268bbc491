//! The `Provider` variants of `spec.md` §3: a function reference, a struct literal, or a value
//! expression. Modeled on the teacher's `ProbeSpecification`, which likewise turns a single
//! `syn` item (there, a trait method; here, a `Set` argument) into a small, validated struct
//! carrying just the fields downstream code needs, with the original `syn` fragment kept around
//! for faithful re-emission.

use crate::type_token::TypeToken;
use proc_macro2::Span;
use syn::{Expr, Ident, Path};

/// A reference to a named function that produces one output type, in one of the four shapes
/// `spec.md` §3/§6 permits: `(params) T`, `(params) (T, error)`, `(params) (T, func())`,
/// `(params) (T, func(), error)`.
#[derive(Debug, Clone)]
pub struct FunctionProvider {
    pub func: Path,
    pub params: Vec<TypeToken>,
    pub output: TypeToken,
    pub has_error: bool,
    pub has_cleanup: bool,
    pub span: Span,
}

/// A struct type registered as its own provider: the reader records the struct's fields in
/// declaration order so the emitter can assign each one from the resolved input with the same
/// type, and so both the value and pointer-to-value forms of the output can be requested.
#[derive(Debug, Clone)]
pub struct StructProvider {
    pub ty: TypeToken,
    pub fields: Vec<(Ident, TypeToken)>,
    pub span: Span,
}

/// An output type paired with a captured expression that is lifted verbatim into the generated
/// code. The expression must be free of function calls; the reader enforces this before a
/// `ValueProvider` is ever constructed; see `reader::parse_value`.
#[derive(Debug, Clone)]
pub struct ValueProvider {
    pub output: TypeToken,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Provider {
    Function(FunctionProvider),
    Struct(StructProvider),
    Value(ValueProvider),
}

impl Provider {
    /// The primary output type this provider produces, used as the key during resolution and
    /// conflict detection (`spec.md` §3 invariant 3).
    pub fn output(&self) -> &TypeToken {
        match self {
            Provider::Function(f) => &f.output,
            Provider::Struct(s) => &s.ty,
            Provider::Value(v) => &v.output,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Provider::Function(f) => f.span,
            Provider::Struct(s) => s.span,
            Provider::Value(v) => v.span,
        }
    }

    /// The types this provider needs as inputs, in order. Struct providers need one input per
    /// field (in field-declaration order); function providers need one per parameter; value
    /// providers need none, since their expression is lifted verbatim.
    pub fn inputs(&self) -> Vec<TypeToken> {
        match self {
            Provider::Function(f) => f.params.clone(),
            Provider::Struct(s) => s.fields.iter().map(|(_, ty)| ty.clone()).collect(),
            Provider::Value(_) => Vec::new(),
        }
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Provider::Function(f) if f.has_error)
    }

    pub fn has_cleanup(&self) -> bool {
        matches!(self, Provider::Function(f) if f.has_cleanup)
    }
}
