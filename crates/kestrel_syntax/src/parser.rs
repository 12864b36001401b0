//! Parser: converts a [`TokenStream`] into an [`Ast`].
//!
//! Recursive descent over the token stream, one method per grammar production. The parser is total:
//! every input yields a tree. Problems are reported to an [`ErrorListener`] and repaired in place,
//! by inserting synthetic zero-length tokens for missing punctuation and synthetic identifiers for
//! missing names, or by skipping tokens that cannot start anything.
//!
//! ## Examples
//!
//! ```rust
//! use kestrel_syntax::diagnostics::GatheringErrorListener;
//! use kestrel_syntax::{parser, scanner};
//!
//! let mut listener = GatheringErrorListener::new();
//! let tokens = scanner::scan("int add(int a, int b) => a + b;", &mut listener);
//! let ast = parser::parse(&tokens, &mut listener);
//! listener.assert_no_errors();
//! assert_eq!(ast.declarations().len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::{AnalysisError, ErrorCode, ErrorListener};
use crate::scanner::keywords::KeywordId;
use crate::scanner::{
    CommentKind, OperatorId, Precedence, PunctuationId, Token, TokenId, TokenKind, TokenStream,
};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module while avoiding a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/lookahead.rs");
include!("parser/directives.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/strings.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
