//! The Provider Model: a typed in-memory representation of providers, sets, bindings, values,
//! and injector stubs (`spec.md` §3). This is the output of the AST Reader and the input to the
//! Set Flattener and Resolver; nothing downstream of this module ever looks at a `syn` AST node
//! except the fragments (expressions, paths) each model type carries for later emission.

mod binding;
mod injector;
mod provider;
mod provider_set;

pub use binding::Binding;
pub use injector::InjectorStub;
pub use provider::{FunctionProvider, Provider, StructProvider, ValueProvider};
pub use provider_set::{ProviderSet, SetMember};
