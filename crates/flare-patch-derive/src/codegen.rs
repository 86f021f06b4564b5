//! Code generation for the PatchTarget derive.

use crate::parse::TargetInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = TargetInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    let ident = &parsed.ident;
    let arms = parsed
        .fields()
        .iter()
        .filter(|field| !field.skip)
        .map(|field| {
            let name = field.segment_name();
            let field = field.ident();
            quote! {
                #name => Ok(&mut self.#field as &mut dyn ::flare_patch::PatchTarget),
            }
        })
        .collect::<Vec<_>>();

    Ok(quote! {
        #[automatically_derived]
        impl ::flare_patch::PatchTarget for #ident {
            fn container(&self) -> ::flare_patch::Container {
                ::flare_patch::Container::Record
            }

            fn field_mut(
                &mut self,
                segment: &str,
            ) -> ::flare_patch::NodeResult<&mut dyn ::flare_patch::PatchTarget> {
                match segment {
                    #(#arms)*
                    _ => Err(::flare_patch::NodeError::unknown_field(
                        segment,
                        stringify!(#ident),
                    )),
                }
            }

            fn assign(
                &mut self,
                _op: ::flare_patch::PatchOp,
                data: ::core::option::Option<&str>,
            ) -> ::flare_patch::NodeResult<()> {
                ::flare_patch::assign_from_json(self, data)
            }
        }
    })
}
