//! Input parsing for the PatchTarget derive.

use darling::{ast, FromDeriveInput, FromField};
use syn::{Ident, Type};

/// Parsed struct-level input.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(flare), supports(struct_named))]
pub struct TargetInput {
    /// The struct identifier.
    pub ident: Ident,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,
}

impl TargetInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }
}

/// Parsed field-level input.
#[derive(Debug, FromField)]
#[darling(attributes(flare))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    #[allow(dead_code)]
    pub ty: Type,

    /// Resolve a different segment name for this field.
    #[darling(default)]
    pub rename: Option<String>,

    /// Exclude this field from patch resolution.
    #[darling(default)]
    pub skip: bool,
}

impl FieldInput {
    /// Get the field identifier (panics if None).
    pub fn ident(&self) -> &Ident {
        self.ident.as_ref().expect("named field required")
    }

    /// The path segment name this field resolves under.
    pub fn segment_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    #[test]
    fn test_parse_basic_struct() {
        let input: syn::DeriveInput = parse_quote! {
            struct User {
                name: String,
                age: u32,
            }
        };

        let parsed = TargetInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.ident.to_string(), "User");

        let fields = parsed.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].segment_name(), "name");
        assert_eq!(fields[1].segment_name(), "age");
    }

    #[test]
    fn test_parse_with_attributes() {
        let input: syn::DeriveInput = parse_quote! {
            struct User {
                #[flare(rename = "userName")]
                name: String,
                #[flare(skip)]
                internal: String,
            }
        };

        let parsed = TargetInput::from_derive_input(&input).unwrap();
        let fields = parsed.fields();

        assert_eq!(fields[0].segment_name(), "userName");
        assert!(fields[1].skip);
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: syn::DeriveInput = parse_quote! {
            struct Pair(String, String);
        };

        assert!(TargetInput::from_derive_input(&input).is_err());
    }
}
