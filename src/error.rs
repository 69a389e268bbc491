//! Defines the diagnostic type the rest of the crate reports failures through.
//!
//! Unlike a typical `Result`-based pipeline, the resolver and reader do not stop at the first
//! problem: a single invocation can surface many independent diagnostics (one missing provider
//! here, one conflicting pair there), all of which the caller wants reported together. This
//! module provides `Diagnostic` for a single finding and `Diagnostics` as the accumulating sink
//! described in the design as a component any stage can write to.

use proc_macro2::Span;
use std::fmt;
use thiserror::Error;

/// One of the nine ways a `weld` package can fail to resolve or generate.
///
/// These are *kinds*, not a single catch-all error type: each variant carries exactly the data
/// needed to render the corresponding message and, where applicable, the related locations a
/// caller's editor integration would want to show (the other half of a conflict, the path of a
/// cycle, the provenance chain back to a `Build` call).
#[derive(Debug, Error)]
pub enum DiagnosticKind {
    #[error("no provider for `{type_name}` and no matching injector input")]
    MissingProvider { type_name: String },

    #[error("{count} providers produce `{type_name}`; exactly one is required")]
    ConflictingProviders { type_name: String, count: usize },

    #[error("dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("provider `{func_name}` has an unsupported signature: {reason}")]
    BadShape { func_name: String, reason: String },

    #[error("value provider for `{type_name}` is not a constant expression: {reason}")]
    BadValueExpr { type_name: String, reason: String },

    #[error("binding of `{interface}` to `{concrete}` is invalid: {reason}")]
    BadBinding {
        interface: String,
        concrete: String,
        reason: String,
    },

    #[error("injector `{injector_name}` cannot propagate this result: {reason}")]
    BadInjectorReturn {
        injector_name: String,
        reason: String,
    },

    #[error("provider `{func_name}` requires a context input, but injector `{injector_name}` declares none")]
    MissingContextInput {
        func_name: String,
        injector_name: String,
    },

    #[error("malformed `{form}` call: {reason}")]
    DslMisuse { form: String, reason: String },
}

/// A single reported problem: its kind, where it occurred, and any related locations that help
/// explain it (the second conflicting provider, the chain through nested sets, and so on).
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub primary_span: Span,
    pub related: Vec<(String, Span)>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, primary_span: Span) -> Self {
        Diagnostic {
            kind,
            primary_span,
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, label: impl Into<String>, span: Span) -> Self {
        self.related.push((label.into(), span));
        self
    }

    /// Renders this diagnostic as a `syn::Error` spanning `self.primary_span`, so a caller that
    /// is itself running inside a proc-macro (out of scope for this crate, but a common way to
    /// drive it) can turn it into a compile error with `syn::Error::into_compile_error`.
    pub fn into_syn_error(self) -> syn::Error {
        let mut err = syn::Error::new(self.primary_span, self.kind.to_string());
        for (label, span) in self.related {
            err.combine(syn::Error::new(span, label));
        }
        err
    }
}

/// An accumulating collection of [`Diagnostic`]s produced by one generation invocation.
///
/// Every component that can fail takes a `&mut Diagnostics` rather than returning a `Result`,
/// so that, for example, resolving ten injectors with independent problems reports all ten
/// failures in one pass instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d.kind)?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
