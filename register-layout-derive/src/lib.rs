use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// You know when you shove all your mess in a cupboard when someone says their coming over?
/// Thats what this is...
mod background;
use background::*;

mod reciprocal_enum;
use reciprocal_enum::*;

/// [`Register`] implementation and the companion `<Name>Layout` type
fn register_impl(meta: StructMetadata, field_attrs: Vec<ParsedRegisterFieldAttribute>) -> TokenStream {
    let StructMetadata {
        ident: struct_ident,
        vis,
        address,
        length,
    } = meta;
    let layout_ident = format_ident!("{}Layout", struct_ident);

    let field_defs: Vec<TokenStream> = field_attrs.iter().map(unpack_field_def).collect();

    let accessors: Vec<TokenStream> = field_attrs
        .iter()
        .map(|ParsedRegisterFieldAttribute { ident, ty, vis, .. }| {
            let name = ident.to_string();
            let getter = format_ident!("get_{}", ident);
            let setter = format_ident!("set_{}", ident);
            let saturating = if is_integer(ty) {
                let saturating_setter = format_ident!("set_{}_saturating", ident);
                quote! {
                    /// Clips values that do not fit the field.
                    #vis fn #saturating_setter(&mut self, value: #ty) -> ::register_layout::RegisterResult<()> {
                        self.layout.set_saturating::<#ty>(#name, value)
                    }
                }
            } else {
                quote! {}
            };

            quote! {
                #vis fn #getter(&self) -> ::register_layout::RegisterResult<#ty> {
                    self.layout.get::<#ty>(#name)
                }

                #vis fn #setter(&mut self, value: #ty) -> ::register_layout::RegisterResult<()> {
                    self.layout.set::<#ty>(#name, value)
                }

                #saturating
            }
        })
        .collect();

    let addressed = address.map(|address| {
        quote! {
            impl ::register_layout::AddressedRegister for #struct_ident {
                const ADDRESS: u8 = #address;
            }
        }
    });

    let layout_doc = format!("Live buffer for [`{struct_ident}`] with typed field accessors.");

    quote! {
        impl ::register_layout::Register for #struct_ident {
            const LENGTH: usize = #length;

            fn field_defs() -> ::register_layout::__private::Vec<::register_layout::FieldDef> {
                ::register_layout::__private::Vec::from([
                    #(#field_defs),*
                ])
            }
        }

        #addressed

        #[doc = #layout_doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        #vis struct #layout_ident {
            layout: ::register_layout::RegisterLayout,
        }

        #[allow(dead_code)]
        impl #layout_ident {
            /// Every field at its reset value.
            pub fn new() -> ::register_layout::RegisterResult<Self> {
                Ok(Self {
                    layout: <#struct_ident as ::register_layout::Register>::layout()?,
                })
            }

            /// Bytes to hand to a transport.
            pub fn bytes(&self) -> &[u8] {
                self.layout.bytes()
            }

            /// Replace the buffer with bytes read from a transport.
            pub fn load(&mut self, bytes: &[u8]) -> ::register_layout::RegisterResult<()> {
                self.layout.load(bytes)
            }

            pub fn layout(&self) -> &::register_layout::RegisterLayout {
                &self.layout
            }

            #(#accessors)*
        }

        impl ::core::convert::AsRef<::register_layout::RegisterLayout> for #layout_ident {
            fn as_ref(&self) -> &::register_layout::RegisterLayout {
                &self.layout
            }
        }

        impl ::core::convert::AsMut<::register_layout::RegisterLayout> for #layout_ident {
            fn as_mut(&mut self) -> &mut ::register_layout::RegisterLayout {
                &mut self.layout
            }
        }
    }
}

/// [`ReadableRegister`] Implementation
fn readable_register_impl(meta: StructMetadata, field_attrs: Vec<ParsedRegisterFieldAttribute>) -> TokenStream {
    let struct_ident = meta.ident;
    let layout_ident = format_ident!("{}Layout", struct_ident);

    let readable_register_attrs: Vec<TokenStream> = field_attrs
        .iter()
        .map(|ParsedRegisterFieldAttribute { ident, ty, .. }| {
            let name = ident.to_string();

            quote! {
                #ident: layout.get::<#ty>(#name)?
            }
        })
        .collect();

    quote! {
        impl ::register_layout::ReadableRegister for #struct_ident {
            fn from_layout(layout: &::register_layout::RegisterLayout) -> ::register_layout::RegisterResult<Self> {
                Ok(Self {
                    #(#readable_register_attrs),*
                })
            }
        }

        impl #layout_ident {
            /// Decode every field at once.
            pub fn snapshot(&self) -> ::register_layout::RegisterResult<#struct_ident> {
                <#struct_ident as ::register_layout::ReadableRegister>::from_layout(&self.layout)
            }
        }
    }
}

/// [`WriteableRegister`] Implementation
fn writeable_register_impl(meta: StructMetadata, field_attrs: Vec<ParsedRegisterFieldAttribute>) -> TokenStream {
    let struct_ident = meta.ident;

    let writeable_register_attrs: Vec<TokenStream> = field_attrs
        .iter()
        .map(|ParsedRegisterFieldAttribute { ident, ty, .. }| {
            let name = ident.to_string();

            quote! {
                layout.set::<#ty>(#name, self.#ident)?;
            }
        })
        .collect();

    quote! {
        impl ::register_layout::WriteableRegister for #struct_ident {
            fn to_layout(&self) -> ::register_layout::RegisterResult<::register_layout::RegisterLayout> {
                let mut layout = <Self as ::register_layout::Register>::layout()?;

                #(#writeable_register_attrs)*

                Ok(layout)
            }
        }
    }
}

type FnImpl = fn(StructMetadata, Vec<ParsedRegisterFieldAttribute>) -> TokenStream;
/// Little helper to take care of repetitious `to_compile_error`
fn wrapped_macro_processing(item: proc_macro::TokenStream, with: FnImpl) -> proc_macro::TokenStream {
    match common_macro_processing(item.into()) {
        Ok((meta, field_attrs)) => with(meta, field_attrs).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Describe a register as a struct of typed fields.
///
/// ```ignore
/// #[derive(Register, ReadableRegister, WriteableRegister)]
/// #[register(shape = "word")]
/// pub struct AmbientTemperature {
///     #[register(bit = 15)]
///     pub critical: bool,
///     #[register(bits = "12..0", sign_extend)]
///     pub sixteenth_celsius: i16,
/// }
/// ```
#[proc_macro_derive(Register, attributes(register))]
pub fn register_derive_macro(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    wrapped_macro_processing(item, register_impl)
}

#[proc_macro_derive(ReadableRegister, attributes(register))]
pub fn readable_register_derive_macro(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    wrapped_macro_processing(item, readable_register_impl)
}

#[proc_macro_derive(WriteableRegister, attributes(register))]
pub fn writeable_register_derive_macro(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    wrapped_macro_processing(item, writeable_register_impl)
}

#[proc_macro_derive(ClosedEnum, attributes(valued))]
pub fn closed_enum_derive_macro(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    match closed_enum_impl(item.into()) {
        Ok(item) => item.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
