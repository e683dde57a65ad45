use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::DeriveInput;

#[derive(deluxe::ExtractAttributes)]
#[deluxe(attributes(valued))]
struct ReciprocalField(TokenStream);

/// `ClosedEnum` + `FieldValue` for a fieldless enum whose variants each carry `#[valued(raw)]`
pub fn closed_enum_impl(item: TokenStream) -> deluxe::Result<TokenStream> {
    let mut ast: DeriveInput = syn::parse2(item)?;
    let ident = ast.ident.clone();

    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&ast.generics, "derive(ClosedEnum) does not support generic enums"));
    }

    let values = if let syn::Data::Enum(e) = &mut ast.data {
        let values: Result<Vec<(Ident, TokenStream)>, syn::Error> = e
            .variants
            .iter_mut()
            .map(|variant| {
                if !matches!(variant.fields, syn::Fields::Unit) {
                    return Err(syn::Error::new_spanned(&variant.ident, "ClosedEnum variants cannot carry data"));
                }
                let ident = variant.ident.clone();
                let attr: ReciprocalField = deluxe::extract_attributes(variant)?;

                Ok((ident, attr.0))
            })
            .collect();

        Ok(values?)
    } else {
        Err(syn::Error::new_spanned(&ast, "derive(ClosedEnum) is only supported on type `enum`"))
    }?;

    if values.is_empty() {
        return Err(syn::Error::new_spanned(&ident, "ClosedEnum needs at least one variant"));
    }

    // Written the same way twice; numerically equal spellings are caught when the layout is built
    for (index, (variant, value)) in values.iter().enumerate() {
        let raw = value.to_string();
        if let Some((first, _)) = values[..index].iter().find(|(_, earlier)| earlier.to_string() == raw) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("`{variant}` has the same raw value as `{first}`"),
            ));
        }
    }

    let raw_values: Vec<TokenStream> = values
        .iter()
        .map(|(_, value)| quote! { (#value) as u64 })
        .collect();

    let from_matches: Vec<TokenStream> = values
        .iter()
        .map(|(variant, value)| {
            quote! {
                if raw == (#value) as u64 {
                    return Some(Self::#variant);
                }
            }
        })
        .collect();

    let into_matches: Vec<TokenStream> = values
        .iter()
        .map(|(variant, value)| {
            quote! {
                Self::#variant => (#value) as u64,
            }
        })
        .collect();

    Ok(quote! {
        impl ::register_layout::ClosedEnum for #ident {
            const RAW_VALUES: &'static [u64] = &[#(#raw_values),*];

            fn from_raw_value(raw: u64) -> Option<Self> {
                #(#from_matches)*
                None
            }

            fn raw_value(self) -> u64 {
                match self {
                    #(#into_matches)*
                }
            }
        }

        impl ::register_layout::FieldValue for #ident {
            fn kind() -> ::register_layout::FieldKind {
                <Self as ::register_layout::ClosedEnum>::cases()
            }

            fn to_raw(self) -> i128 {
                <Self as ::register_layout::ClosedEnum>::raw_value(self) as i128
            }

            fn from_raw(raw: i128) -> Option<Self> {
                <u64 as ::core::convert::TryFrom<i128>>::try_from(raw)
                    .ok()
                    .and_then(<Self as ::register_layout::ClosedEnum>::from_raw_value)
            }
        }
    })
}
