//! A static dependency-injection code generator.
//!
//! Given the already-parsed AST of one source file and a [`TypeOracle`] standing in for the host
//! compiler's type-checker, [`generate_package`] finds every injector stub in the file, resolves
//! each one's dependency graph from its provider set, and emits the generated replacement file as
//! a `String` -- or, if anything along the way doesn't check out, every [`Diagnostic`] describing
//! why, accumulated rather than stopping at the first.
//!
//! The pipeline is read (`reader`) -> flatten (`flatten`) -> resolve (`resolve`) -> emit
//! (`emit`), mirroring the stages `spec.md` lays out; each stage's module doc explains its piece.
//! Nothing past the reader ever looks at a raw `syn` AST node except the fragments (expressions,
//! paths, types) the Provider Model carries along for faithful re-emission.

#![deny(warnings)]

pub mod emit;
pub mod error;
pub mod flatten;
pub mod model;
pub mod reader;
pub mod resolve;
pub mod type_oracle;
pub mod type_token;

#[cfg(test)]
mod testdata;

pub use error::{Diagnostic, DiagnosticKind, Diagnostics};
pub use type_oracle::TypeOracle;
pub use type_token::TypeToken;

use tracing::{debug, info, instrument, warn};

/// The literal header `spec.md` §5 requires every generated file to begin with, verbatim and
/// stable across runs so diffs between successive generations are never just this line churning.
const GENERATED_HEADER: &str = "// Code generated by weld. DO NOT EDIT.\n";

/// The build-tag convention stubs are written under; the generated file carries its negation, so
/// a stub-bearing file and its generated counterpart are never compiled in the same build
/// (`spec.md` §5 "Build directive convention").
const GENERATED_DIRECTIVE: &str = "#![cfg(not(weld_inject))]\n";

/// Reads one file's injector stubs, resolves and emits each one, and returns the complete text of
/// the file that should replace it, plus every diagnostic encountered along the way.
///
/// Following `spec.md` §7's propagation policy, a problem with one injector never stops another,
/// unrelated injector in the same file from being emitted: `diags` in the returned tuple may be
/// non-empty even on `Ok`, and `generated_package` still contains whatever injectors *did*
/// resolve. Generation fails outright -- returning `Err` instead -- only when `strict` is set and
/// not a single injector could be emitted (`spec.md` §7 "A package-level failure is reported only
/// if zero injectors could be emitted successfully and the caller requested strict mode").
/// A file with no injector stubs at all is not a failure under either mode: it has trivially
/// "emitted" everything it was asked to (nothing), so copy-through still comes back as `Ok`.
#[instrument(skip(file, oracle))]
pub fn generate_package(
    file: &syn::File,
    oracle: &dyn TypeOracle,
    strict: bool,
) -> Result<(String, Diagnostics), Diagnostics> {
    let mut diags = Diagnostics::new();
    let read = reader::read_package(file, oracle, &mut diags);
    info!(injector_count = read.injectors.len(), "found injector stubs");

    let mut generated_fns = Vec::new();
    for stub in &read.injectors {
        let flat = flatten::flatten_set(&stub.set);
        debug!(injector = %stub.name, member_count = flat.len(), "flattened provider set");
        if let Some(graph) = resolve::resolve_injector(stub, &flat, &mut diags) {
            generated_fns.push(emit::emit_injector(stub, &graph));
        }
    }

    if strict && generated_fns.is_empty() && !diags.is_empty() {
        warn!(count = diags.len(), "strict mode: no injector could be emitted, aborting generation");
        return Err(diags);
    }

    let emitted_count = generated_fns.len();
    let output_file = emit::emit_package(read.copy_through, generated_fns);
    let body = prettyplease::unparse(&output_file);
    let text = format!("{}{}\n{}", GENERATED_HEADER, GENERATED_DIRECTIVE, body);
    if !diags.is_empty() {
        warn!(count = diags.len(), emitted = emitted_count, "generation completed with diagnostics");
    }
    Ok((text, diags))
}
