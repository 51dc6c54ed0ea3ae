//! Proc macro for deriving parsers from PEG grammars.
//!
//! ```ignore
//! #[derive(Parser)]
//! #[peg_inline = "list <- 'c' a+ 'd'\na <- 'a' / list"]
//! struct List;
//! ```
//!
//! The grammar is compiled while the macro expands, so grammar errors show up
//! as compile errors on the deriving type.

use syn::{parse_macro_input, DeriveInput};

mod error;
mod generate;

#[proc_macro_derive(Parser, attributes(peg_file, peg_inline))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let span = ast.ident.span();

    let expanded = match generate::generate(ast) {
        Ok(ts) => ts,
        Err(e) => syn::Error::new(span, e.to_string()).to_compile_error(),
    };

    proc_macro::TokenStream::from(expanded)
}
