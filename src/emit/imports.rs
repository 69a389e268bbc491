//! Import block handling for the generated file (`spec.md` §4.4 step 4: "an import block: exactly
//! the imports needed ... deduplicated, sorted").
//!
//! Everything this crate generates lives in the same file as the stub it replaces, so no new
//! `use` items are ever synthesized; copy-through already carries whatever imports the stub file
//! declared. What's left to do here is deduplicate them -- a stub-bearing file that itself
//! results from a previous generation run (re-running generation on its own output) can otherwise
//! accumulate repeated `use` items across runs -- and sort them, so the import block never churns
//! just because two imports changed relative order in the source.
//!
//! `use` items are moved to the front of the file, ahead of every other copy-through declaration,
//! matching where an import block conventionally lives; non-`use` items keep their relative
//! order.

use std::collections::HashSet;
use syn::Item;

pub fn dedup_imports(items: &[Item]) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut uses: Vec<(String, Item)> = Vec::new();
    let mut rest = Vec::new();
    for item in items {
        match item {
            Item::Use(u) => {
                let key = render(u);
                if seen.insert(key.clone()) {
                    uses.push((key, item.clone()));
                }
            }
            other => rest.push(other.clone()),
        }
    }
    uses.sort_by(|a, b| a.0.cmp(&b.0));
    uses.into_iter().map(|(_, item)| item).chain(rest).collect()
}

fn render(item: &syn::ItemUse) -> String {
    quote::quote! { #item }.to_string()
}
