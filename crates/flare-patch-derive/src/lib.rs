//! Derive macro for the flare-patch `PatchTarget` trait.
//!
//! `#[derive(PatchTarget)]` turns a named struct into a patchable record:
//! path segments resolve against its declared fields, and whole-struct
//! assignment decodes through serde.
//!
//! # Attributes
//!
//! - `#[flare(rename = "json_name")]`: resolve a different segment name
//! - `#[flare(skip)]`: field is not addressable by patches
//!
//! The deriving type must implement `Default` and `serde::Deserialize`, and
//! every non-skipped field must implement `PatchTarget`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod parse;

/// Derive `PatchTarget` for a struct with named fields.
///
/// ```ignore
/// use flare_patch::PatchTarget;
/// use serde::Deserialize;
///
/// #[derive(Default, Deserialize, PatchTarget)]
/// struct Address {
///     street: String,
///     #[flare(rename = "zip")]
///     postal_code: String,
/// }
/// ```
#[proc_macro_derive(PatchTarget, attributes(flare))]
pub fn derive_patch_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
