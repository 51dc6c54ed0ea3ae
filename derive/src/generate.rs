use proc_macro2::TokenStream;
use quote::quote;
use std::env;
use std::fs;
use std::path::Path;
use syn::{Attribute, DeriveInput, Generics, Ident, Lit, Meta};

use peg::Grammar;

use crate::error::{DeriveError, Result};

const PEG_FILE_ATTR: &str = "peg_file";
const PEG_INLINE_ATTR: &str = "peg_inline";

/// Where the grammar text came from.
#[derive(Debug, Clone, PartialEq)]
enum GrammarSource {
    Inline(String),
    /// Absolute path of the file, and its contents at expansion time.
    File { path: String, text: String },
}

impl GrammarSource {
    fn text(&self) -> &str {
        match self {
            GrammarSource::Inline(text) => text,
            GrammarSource::File { text, .. } => text,
        }
    }

    /// Expression evaluating to the grammar text in the generated code. Files
    /// go through `include_str!` so editing the grammar triggers a rebuild.
    fn expr(&self) -> TokenStream {
        match self {
            GrammarSource::Inline(text) => quote! { #text },
            GrammarSource::File { path, .. } => quote! { ::std::include_str!(#path) },
        }
    }
}

pub fn generate(ast: DeriveInput) -> Result<TokenStream> {
    let source = source_from_ast(&ast)?;
    // Compiled here only to surface grammar errors at build time.
    Grammar::compile(source.text())?;
    Ok(generate_impl(&ast.ident, &ast.generics, &source))
}

/// Load the grammar source from a derive attribute.
///
/// There must be exactly 1 attribute specifying the grammar source. The source
/// may either be written inline, or a path to a grammar file relative to the
/// crate root.
fn source_from_ast(ast: &DeriveInput) -> Result<GrammarSource> {
    let sources: Vec<&Attribute> = ast
        .attrs
        .iter()
        .filter(|attr| attr.path.is_ident(PEG_FILE_ATTR) || attr.path.is_ident(PEG_INLINE_ATTR))
        .collect();

    let source_attr = match sources.len() {
        0 => return Err(DeriveError::MissingGrammarSource),
        1 => sources[0],
        _ => return Err(DeriveError::MultipleGrammarSources),
    };

    match source_attr.parse_meta()? {
        Meta::NameValue(val) => match val.lit {
            Lit::Str(s) => {
                if val.path.is_ident(PEG_FILE_ATTR) {
                    let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
                    let path = Path::new(&root).join(s.value());
                    let path = path.to_string_lossy().into_owned();
                    let text = fs::read_to_string(&path).map_err(|e| DeriveError::ReadFile {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                    Ok(GrammarSource::File { path, text })
                } else {
                    Ok(GrammarSource::Inline(s.value()))
                }
            }
            _ => Err(DeriveError::InvalidAttribute("attribute not a string".to_owned())),
        },
        _ => Err(DeriveError::InvalidAttribute(
            "attribute not a name value".to_owned(),
        )),
    }
}

/// Generate the `Parser` implementation. The grammar is compiled on first use
/// and shared by every later call.
fn generate_impl(name: &Ident, generics: &Generics, source: &GrammarSource) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let text = source.expr();

    quote! {
        impl #impl_generics ::pegc::Parser for #name #ty_generics #where_clause {
            fn grammar() -> &'static ::pegc::Grammar {
                static GRAMMAR: ::std::sync::OnceLock<::pegc::Grammar> =
                    ::std::sync::OnceLock::new();
                GRAMMAR.get_or_init(|| match ::pegc::Grammar::compile(#text) {
                    ::std::result::Result::Ok(grammar) => grammar,
                    ::std::result::Result::Err(err) => {
                        ::std::panic!("grammar failed to compile: {}", err)
                    }
                })
            }
        }
    }
}
