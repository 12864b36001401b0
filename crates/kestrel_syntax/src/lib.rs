//! Shared syntax frontend for the kestrel analyzer: sources, scanner, parser, AST, diagnostics.
//!
//! This crate turns source text into an error-tolerant, arena-allocated syntax tree. It never
//! fails on malformed input: lexical and syntactic problems are reported to an
//! [`ErrorListener`](diagnostics::ErrorListener) and the caller always receives a complete
//! token stream and tree.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not do name resolution or type inference.
//! - Keyword and operator identity comes from the registries in [`scanner::keywords`] and
//!   [`scanner::tokens`].
//!
//! ## Examples
//! ```rust
//! use kestrel_syntax::diagnostics::GatheringErrorListener;
//! use kestrel_syntax::{parser, scanner};
//!
//! let mut listener = GatheringErrorListener::new();
//! let tokens = scanner::scan("class A {}", &mut listener);
//! let unit = parser::parse(&tokens, &mut listener);
//! listener.assert_no_errors();
//! assert_eq!(unit.declarations().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostics;
pub mod parser;
pub mod scanner;
pub mod source;
