//! `write!` and `P!` for `nano-fmt`.
//!
//! Literal text is emitted as NUL terminated statics in program memory, so a
//! log line costs flash, not RAM. Supported placeholders are `{}` (decimal or
//! any `NanoDisplay`), `{:x}` and `{:b}` (zero padded hex and binary).

use std::{cmp::Ordering, mem};

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse::{Error, Parse, ParseStream},
    parse_macro_input,
    spanned::Spanned,
    Expr, Ident, LitByteStr, LitStr, Token,
};

/// `writer, "literal", args...`
struct WriteInput {
    writer: Expr,
    literal: LitStr,
    args: Vec<Expr>,
}

impl Parse for WriteInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let writer = input.parse()?;
        input.parse::<Token![,]>()?;
        let literal = input.parse()?;

        let mut args = Vec::new();
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            args.push(input.parse()?);
        }

        Ok(Self {
            writer,
            literal,
            args,
        })
    }
}

#[derive(Debug, PartialEq)]
enum Piece {
    Text(String),
    Display,
    Hex,
    Binary,
}

impl Piece {
    fn takes_argument(&self) -> bool {
        !matches!(self, Piece::Text(_))
    }
}

fn parse(format: &str, span: Span) -> syn::Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '}' => {
                return Err(Error::new(
                    span,
                    "format string contains an unmatched right brace",
                ));
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => placeholder.push(c),
                        None => {
                            return Err(Error::new(
                                span,
                                "format string contains an unmatched left brace",
                            ));
                        }
                    }
                }

                let piece = match placeholder.as_str() {
                    "" => Piece::Display,
                    ":x" => Piece::Hex,
                    ":b" => Piece::Binary,
                    _ => {
                        return Err(Error::new(
                            span,
                            format!("unsupported placeholder `{{{placeholder}}}`, expected `{{}}`, `{{:x}}` or `{{:b}}`"),
                        ));
                    }
                };

                if !text.is_empty() {
                    pieces.push(Piece::Text(mem::take(&mut text)));
                }
                pieces.push(piece);
            }
            c => text.push(c),
        }
    }

    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }

    Ok(pieces)
}

fn mk_pstr(s: &str) -> proc_macro2::TokenStream {
    let mut data = s.as_bytes().to_vec();
    data.push(0);
    let size = data.len();
    let data = LitByteStr::new(&data, Span::call_site());

    // `__S` is NUL terminated and placed in program memory on AVR, which is
    // what `PStr::new` requires.
    quote!({
        #[cfg_attr(target_arch = "avr", unsafe(link_section = ".progmem.data"))]
        static __S: [u8; #size] = *#data;
        unsafe { nano_fmt::PStr::new(__S.as_ptr()) }
    })
}

/// Place a string literal in program memory and return it as `PStr`.
#[proc_macro]
#[allow(non_snake_case)]
pub fn P(input: TokenStream) -> TokenStream {
    let s = parse_macro_input!(input as LitStr);
    mk_pstr(&s.value()).into()
}

/// Format arguments into a `NanoWrite`.
#[proc_macro]
pub fn write(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as WriteInput);

    let pieces = match parse(&input.literal.value(), input.literal.span()) {
        Ok(pieces) => pieces,
        Err(e) => return e.to_compile_error().into(),
    };

    let required = pieces.iter().filter(|p| p.takes_argument()).count();
    let supplied = input.args.len();

    match supplied.cmp(&required) {
        Ordering::Less => {
            let plural = if required == 1 { "" } else { "s" };
            return Error::new(
                input.literal.span(),
                format!("format string takes {required} argument{plural}, {supplied} supplied"),
            )
            .to_compile_error()
            .into();
        }
        Ordering::Greater => {
            return Error::new(input.args[required].span(), "argument never used")
                .to_compile_error()
                .into();
        }
        Ordering::Equal => {}
    }

    let writer = &input.writer;
    let args = &input.args;
    let bindings: Vec<Ident> = (0..supplied)
        .map(|i| Ident::new(&format!("__arg{i}"), Span::call_site()))
        .collect();

    let mut bound = bindings.iter();
    let mut stmts = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        let value = match piece {
            Piece::Text(s) => mk_pstr(s),
            Piece::Display => {
                let arg = bound.next();
                quote!(#arg)
            }
            Piece::Hex => {
                let arg = bound.next();
                quote!(nano_fmt::Hex(#arg))
            }
            Piece::Binary => {
                let arg = bound.next();
                quote!(nano_fmt::Bin(#arg))
            }
        };
        stmts.push(quote!(nano_fmt::NanoDisplay::fmt(#value, #writer);));
    }

    quote!(match (#(#args,)*) {
        (#(#bindings,)*) => {
            #(#stmts)*
        }
    })
    .into()
}
