//! Procedural macros for the tiller control model.
//!
//! Provides `#[derive(ControlPoint)]` for the fieldless enums that label
//! control points in a control flow. The derived label is the snake_case
//! rendering of the variant name, and variants tagged with
//! `#[control_point(meta)]` are reported as meta (cyclic-control) points.

use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields};

/// Derive `tiller::ControlPoint` for a fieldless enum.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ControlPoint)]
/// enum Cp {
///     Initialize,
///     Advance,
///     Analyze,
///     #[control_point(meta)]
///     CycleControl,
///     Finalize,
/// }
/// ```
///
/// `Cp::Initialize.label()` yields `"initialize"`, and
/// `Cp::CycleControl.meta()` yields `true`. The enum must also derive the
/// `Copy`, `Ord`, `Hash` and `Debug` bounds required by the trait.
#[proc_macro_error]
#[proc_macro_derive(ControlPoint, attributes(control_point))]
pub fn derive_control_point(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => abort!(
            input.ident,
            "ControlPoint can only be derived for enums"
        ),
    };

    let mut label_arms = Vec::new();
    let mut meta_arms = Vec::new();

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            abort!(
                variant.ident,
                "ControlPoint variants must be fieldless";
                help = "control points are plain labels; carry state in the control policy instead"
            );
        }

        let ident = &variant.ident;
        let label = to_snake_case(&ident.to_string());
        let meta = variant.attrs.iter().any(is_meta_attribute);

        label_arms.push(quote! { Self::#ident => #label });
        meta_arms.push(quote! { Self::#ident => #meta });
    }

    let expanded = quote! {
        impl ::tiller::control::ControlPoint for #name {
            fn label(&self) -> &'static str {
                match *self {
                    #(#label_arms,)*
                }
            }

            fn meta(&self) -> bool {
                match *self {
                    #(#meta_arms,)*
                }
            }
        }
    };

    expanded.into()
}

/// Recognize `#[control_point(meta)]` on a variant.
fn is_meta_attribute(attr: &Attribute) -> bool {
    if !attr.path().is_ident("control_point") {
        return false;
    }

    let mut meta = false;
    let _ = attr.parse_nested_meta(|nested| {
        if nested.path.is_ident("meta") {
            meta = true;
        }
        Ok(())
    });
    meta
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
