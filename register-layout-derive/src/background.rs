use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Type, Visibility};

/// Interpret the struct and do all the fun processing and error handling here
pub fn common_macro_processing(item: TokenStream) -> deluxe::Result<(StructMetadata, Vec<ParsedRegisterFieldAttribute>)> {
    let mut ast: DeriveInput = syn::parse2(item)?;

    let register_meta: RegisterStructAttributes = deluxe::extract_attributes(&mut ast)?;
    let ident = ast.ident.clone();
    let shape = Shape::parse(register_meta.shape.as_str())
        .ok_or_else(|| syn::Error::new_spanned(&ast.ident, "Must specify `shape = \"byte\" | \"word\" | \"array\"`"))?;

    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&ast.generics, "derive(Register) does not support generic registers"));
    }

    // Parse the structs inner attributes
    let attrs = if let syn::Data::Struct(s) = &mut ast.data {
        let attrs: Result<Vec<(Ident, Type, Visibility, RegisterFieldAttribute)>, syn::Error> = s
            .fields
            .iter_mut()
            .map(|field| {
                let ident = field
                    .ident
                    .clone()
                    .ok_or_else(|| syn::Error::new_spanned(&field.ty, "Register fields must be named"))?;
                let attr: RegisterFieldAttribute = deluxe::extract_attributes(field)?;

                Ok((ident, field.ty.clone(), field.vis.clone(), attr))
            })
            .collect();

        Ok(attrs?)
    } else {
        Err(syn::Error::new_spanned(&ast, "derive(Register) is only supported on type `struct`"))
    }?;

    let field_attrs: Result<Vec<ParsedRegisterFieldAttribute>, syn::Error> = attrs
        .into_iter()
        .map(|(ident, ty, vis, attr)| {
            let bits = parse_bits(&ident, &attr)?;
            let span = match shape {
                Shape::Byte | Shape::Word => {
                    if attr.byte.is_some() || attr.bytes.is_some() {
                        return Err(syn::Error::new_spanned(
                            &ident,
                            "`byte`/`bytes` only apply to `shape = \"array\"`; byte and word registers number bits across the whole register",
                        ));
                    }
                    relocate_bits(bits, shape.length_hint())
                        .map_err(|msg| syn::Error::new_spanned(&ident, msg))?
                }
                Shape::Array => {
                    let (first, last) = match (attr.byte, &attr.bytes) {
                        (Some(byte), None) => (byte, byte),
                        (None, Some(bytes)) => parse_range(&ident, bytes)?,
                        _ => {
                            return Err(syn::Error::new_spanned(
                                &ident,
                                "Must have one of `register(byte = ...)` or `register(bytes = \"...\")` set",
                            ))
                        }
                    };
                    array_span(first, last, bits).map_err(|msg| syn::Error::new_spanned(&ident, msg))?
                }
            };

            Ok(ParsedRegisterFieldAttribute {
                reset: attr.reset,
                sign_extend: attr.sign_extend,
                span,
                ident,
                ty,
                vis,
            })
        })
        .collect();
    let field_attrs = field_attrs?;

    let length = match shape {
        Shape::Array => field_attrs.iter().map(|field| field.span.minor_byte).max().unwrap_or(0),
        other => other.length_hint(),
    };
    if length == 0 {
        return Err(syn::Error::new_spanned(&ast.ident, "Register has no fields"));
    }

    let wrapped_meta = StructMetadata {
        ident,
        vis: ast.vis,
        address: register_meta.address,
        length,
    };

    Ok((wrapped_meta, field_attrs))
}

fn parse_bits(ident: &Ident, attr: &RegisterFieldAttribute) -> syn::Result<BitRange> {
    match (&attr.bit, &attr.bits) {
        (Some(bit), None) => Ok(BitRange { msb: *bit, lsb: *bit }),
        (None, Some(bits)) => {
            let (msb, lsb) = parse_range(ident, bits)?;
            Ok(BitRange { msb, lsb })
        }
        _ => Err(syn::Error::new_spanned(
            ident,
            "Must have one of `register(bit = ...)` or `register(bits = \"...\")` set",
        )),
    }
}

fn parse_range(ident: &Ident, range: &str) -> syn::Result<(usize, usize)> {
    let parts: Vec<&str> = range.split("..").collect();

    if parts.len() == 2 {
        let first: usize = parts[0].trim().parse().map_err(|_| syn::Error::new_spanned(ident, "Unable to parse number"))?;
        let second: usize = parts[1].trim().parse().map_err(|_| syn::Error::new_spanned(ident, "Unable to parse number"))?;

        Ok((first, second))
    } else {
        Err(syn::Error::new_spanned(ident, "Range must be in format `start..end`"))
    }
}

#[derive(Clone, Copy)]
pub enum Shape {
    Byte,
    Word,
    Array,
}

impl Shape {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "byte" => Some(Shape::Byte),
            "word" => Some(Shape::Word),
            "array" => Some(Shape::Array),
            _ => None,
        }
    }

    fn length_hint(&self) -> usize {
        match self {
            Shape::Byte => 1,
            Shape::Word => 2,
            Shape::Array => 0,
        }
    }
}

/// Bit numbers as written in the attribute, most significant first
#[derive(Clone, Copy)]
pub struct BitRange {
    msb: usize,
    lsb: usize,
}

/// Datasheet position of a field: significant byte/bit down to minor byte/bit, bytes 1-based
#[derive(Clone, Copy)]
pub struct ByteSpan {
    pub significant_byte: usize,
    pub msb: u8,
    pub minor_byte: usize,
    pub lsb: u8,
}

/// Map register-relative bit numbers (`8 * length - 1` down to 0) onto bytes, first byte most
/// significant.
pub fn relocate_bits(bits: BitRange, length: usize) -> Result<ByteSpan, &'static str> {
    // Within one register either order names the same bits
    let (msb, lsb) = if bits.msb >= bits.lsb {
        (bits.msb, bits.lsb)
    } else {
        (bits.lsb, bits.msb)
    };
    if msb >= length * 8 {
        return Err("Bit number is past the end of the register");
    }

    Ok(ByteSpan {
        significant_byte: length - msb / 8,
        msb: (msb % 8) as u8,
        minor_byte: length - lsb / 8,
        lsb: (lsb % 8) as u8,
    })
}

/// Per-byte numbering used by byte arrays: bits are 7..0 within each byte.
pub fn array_span(first: usize, last: usize, bits: BitRange) -> Result<ByteSpan, &'static str> {
    if first == 0 || last == 0 {
        return Err("Byte numbers start at 1");
    }
    if last < first {
        return Err("Bytes must be given significant first, e.g. `bytes = \"1..2\"`");
    }
    if bits.msb > 7 || bits.lsb > 7 {
        return Err("Bit numbers within a byte run from 7 down to 0");
    }
    let (msb, lsb) = if first == last && bits.msb < bits.lsb {
        (bits.lsb, bits.msb)
    } else {
        (bits.msb, bits.lsb)
    };

    Ok(ByteSpan {
        significant_byte: first,
        msb: msb as u8,
        minor_byte: last,
        lsb: lsb as u8,
    })
}

/// Generate the `Position` for a [`ByteSpan`]
pub fn unpack_span(span: ByteSpan) -> TokenStream {
    let ByteSpan {
        significant_byte,
        msb,
        minor_byte,
        lsb,
    } = span;

    quote! { ::register_layout::Position::span(#significant_byte, #msb, #minor_byte, #lsb) }
}

/// Generate the `FieldDef` for a field
pub fn unpack_field_def(field: &ParsedRegisterFieldAttribute) -> TokenStream {
    let ParsedRegisterFieldAttribute {
        ident,
        ty,
        reset,
        sign_extend,
        span,
        ..
    } = field;
    let name = ident.to_string();
    let position = unpack_span(*span);
    let reset = match reset {
        Some(reset) => quote! { #reset },
        None => quote! { ::core::default::Default::default() },
    };
    let sign_extend = if *sign_extend {
        quote! { .sign_extended() }
    } else {
        quote! {}
    };

    quote! {
        ::register_layout::FieldDef::new::<#ty>(#name, #position, { let reset: #ty = #reset; reset }) #sign_extend
    }
}

/// Integer field types get a saturating setter as well
pub fn is_integer(ty: &Type) -> bool {
    const INTEGERS: [&str; 10] = ["u8", "u16", "u32", "u64", "usize", "i8", "i16", "i32", "i64", "isize"];

    match ty {
        Type::Path(path) => path.qself.is_none() && INTEGERS.iter().any(|name| path.path.is_ident(name)),
        _ => false,
    }
}

#[derive(deluxe::ExtractAttributes)]
#[deluxe(attributes(register))]
struct RegisterStructAttributes {
    #[deluxe(default = "byte".into())]
    shape: String,
    #[deluxe(default = None)]
    address: Option<TokenStream>,
}

#[derive(deluxe::ExtractAttributes)]
#[deluxe(attributes(register))]
struct RegisterFieldAttribute {
    #[deluxe(default = None)]
    reset: Option<TokenStream>,
    #[deluxe(default = None)]
    bit: Option<usize>,
    #[deluxe(default = None)]
    bits: Option<String>,
    #[deluxe(default = None)]
    byte: Option<usize>,
    #[deluxe(default = None)]
    bytes: Option<String>,
    #[deluxe(default = false)]
    sign_extend: bool,
}

pub struct ParsedRegisterFieldAttribute {
    pub reset: Option<TokenStream>,
    pub sign_extend: bool,
    pub span: ByteSpan,
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
}

/// Metadata for the struct
pub struct StructMetadata {
    pub ident: Ident,
    pub vis: Visibility,
    pub address: Option<TokenStream>,
    pub length: usize,
}
