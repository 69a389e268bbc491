//! The type-resolution oracle: the external collaborator this crate never implements itself.
//!
//! `spec.md` §6 is explicit that the host-language type-checker is out of scope; the core only
//! consumes "a type-resolution oracle providing, for any expression, its canonical type token;
//! for any symbol, its fully-qualified identity; for any type, its underlying kind". This trait
//! is that seam. A caller backed by a real compiler front end (or, for tests, a small canned
//! table) implements it; nothing in `reader`, `flatten`, `resolve`, or `emit` ever inspects types
//! except through this interface.

use crate::type_token::TypeToken;
use syn::{Expr, Path};

/// The structural kind of a type, as needed to decide whether a concrete type satisfies an
/// interface binding and whether a struct provider's fields are well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Struct { fields: Vec<(syn::Ident, TypeToken)> },
    Interface,
    Named,
    Pointer { pointee: TypeToken },
    Function,
}

/// The parameter and return types of a function the reader found referenced by path in a `Set`.
/// The return type is handed back raw (e.g. `Result<Baz, MyError>` or `(Foo, Cleanup)`); the
/// reader itself is responsible for structurally decomposing it into an output type plus
/// error/cleanup flags (`reader::classify_return_type`), since that decomposition is purely
/// syntactic and does not require the oracle.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<TypeToken>,
    pub return_type: syn::Type,
}

/// Supplied by the caller; never implemented inside this crate's resolution logic.
///
/// A minimal in-memory implementation, [`crate::type_oracle::TableOracle`], is provided for
/// tests and for callers happy to declare their types up front rather than wiring up a full
/// compiler front end.
pub trait TypeOracle {
    /// The canonical type token of an arbitrary expression (used for `Value(expr)` providers).
    fn type_of_expr(&self, expr: &Expr) -> Option<TypeToken>;

    /// The canonical type token a path resolves to, e.g. the type named by a struct-literal
    /// path or a `Bind` argument's pointee.
    fn type_of_path(&self, path: &Path) -> Option<TypeToken>;

    /// The fully-qualified identity of a symbol, used to recognize `Set`/`Bind`/`Value`/`Build`
    /// by reference rather than by textual name, so import aliasing is handled correctly.
    fn fq_name_of_path(&self, path: &Path) -> Option<String>;

    /// The structural kind underlying a type token.
    fn kind_of(&self, ty: &TypeToken) -> Option<TypeKind>;

    /// True if `concrete`'s method set satisfies `interface`. Only meaningful when
    /// `kind_of(interface)` is `TypeKind::Interface`.
    fn satisfies(&self, concrete: &TypeToken, interface: &TypeToken) -> bool;

    /// The signature of the function a `Set` member path refers to, used to build a
    /// [`crate::model::FunctionProvider`]. `None` means the path does not refer to a function
    /// the oracle knows about.
    fn fn_signature(&self, path: &Path) -> Option<FunctionSignature>;
}

/// A simple oracle backed by caller-supplied tables, sufficient for tests and for small
/// generated-from-annotations use cases that don't need a full type-checker.
#[derive(Debug, Default)]
pub struct TableOracle {
    fq_names: std::collections::HashMap<String, String>,
    kinds: std::collections::HashMap<String, TypeKind>,
    satisfactions: std::collections::HashSet<(String, String)>,
    signatures: std::collections::HashMap<String, FunctionSignature>,
}

impl TableOracle {
    pub fn new() -> Self {
        TableOracle::default()
    }

    pub fn with_fq_name(mut self, path_text: impl Into<String>, fq_name: impl Into<String>) -> Self {
        self.fq_names.insert(path_text.into(), fq_name.into());
        self
    }

    pub fn with_kind(mut self, type_text: impl Into<String>, kind: TypeKind) -> Self {
        self.kinds.insert(type_text.into(), kind);
        self
    }

    pub fn with_satisfies(
        mut self,
        concrete_text: impl Into<String>,
        interface_text: impl Into<String>,
    ) -> Self {
        self.satisfactions
            .insert((concrete_text.into(), interface_text.into()));
        self
    }

    pub fn with_fn_signature(
        mut self,
        func_path_text: impl Into<String>,
        params: Vec<syn::Type>,
        return_type: syn::Type,
    ) -> Self {
        self.signatures.insert(
            func_path_text.into(),
            FunctionSignature {
                params: params.into_iter().map(TypeToken::new).collect(),
                return_type,
            },
        );
        self
    }

    fn render(tokens: impl quote::ToTokens) -> String {
        tokens
            .to_token_stream()
            .to_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TypeOracle for TableOracle {
    fn type_of_expr(&self, expr: &Expr) -> Option<TypeToken> {
        // The table oracle has no inference; it only recognizes struct-literal expressions by
        // their path, which covers the `Value(Foo{X:42})` shape used throughout the test suite.
        if let Expr::Struct(s) = expr {
            Some(TypeToken::new(syn::Type::Path(syn::TypePath {
                qself: None,
                path: s.path.clone(),
            })))
        } else {
            None
        }
    }

    fn type_of_path(&self, path: &Path) -> Option<TypeToken> {
        Some(TypeToken::new(syn::Type::Path(syn::TypePath {
            qself: None,
            path: path.clone(),
        })))
    }

    fn fq_name_of_path(&self, path: &Path) -> Option<String> {
        let text = Self::render(path);
        self.fq_names
            .get(&text)
            .cloned()
            .or_else(|| Some(text))
    }

    fn kind_of(&self, ty: &TypeToken) -> Option<TypeKind> {
        let text = Self::render(ty.syn_type());
        self.kinds.get(&text).cloned().or(Some(TypeKind::Named))
    }

    fn satisfies(&self, concrete: &TypeToken, interface: &TypeToken) -> bool {
        let c = Self::render(concrete.syn_type());
        let i = Self::render(interface.syn_type());
        self.satisfactions.contains(&(c, i))
    }

    fn fn_signature(&self, path: &Path) -> Option<FunctionSignature> {
        self.signatures.get(&Self::render(path)).cloned()
    }
}
