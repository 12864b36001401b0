#![forbid(unsafe_code)]
//! Kestrel: incremental, error-tolerant semantic analysis for a class-based language.
//!
//! Syntax lives in [`kestrel_syntax`]; this crate adds the semantic layer on top of it: the
//! element model, types, resolution, hints, and the [`AnalysisContext`] that caches all of it per
//! source.
//!
//! ## Error Policy
//!
//! - **Problems in analyzed code** never fail an operation. They are reported as
//!   [`AnalysisError`](kestrel_syntax::diagnostics::AnalysisError)s and analysis continues with a
//!   complete tree.
//! - **Misuse and environment failures** (no core library, unreadable source, a part used as a
//!   library) are returned as [`AnalysisException`].
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## Examples
//! ```rust
//! use std::collections::HashMap;
//!
//! use kestrel::element::create_core_library;
//! use kestrel::source_factory::SourceFactory;
//! use kestrel::{AnalysisContext, AnalysisOptions};
//! use kestrel_syntax::source::Source;
//!
//! let context = AnalysisContext::new(AnalysisOptions::default(), SourceFactory::default());
//! let core = create_core_library();
//! context.record_library_elements(HashMap::from([(core.source().clone(), core)]))?;
//!
//! let source = Source::for_file("/main.dart");
//! context.source_factory().set_contents(&source, Some("int twice(int x) => x * 2;".to_string()));
//! assert!(context.errors(&source)?.is_empty());
//! # Ok::<(), kestrel::AnalysisException>(())
//! ```

pub mod context;
pub mod element;
pub mod error;
pub mod hint;
pub mod locator;
pub mod options;
pub mod resolver;
pub mod source_factory;
pub mod types;

pub use context::AnalysisContext;
pub use error::{AnalysisException, AnalysisResult};
pub use locator::{ElementLocator, LocateResult, Region};
pub use options::AnalysisOptions;
pub use resolver::ResolvedUnit;

pub use kestrel_syntax::{ast, diagnostics, parser, scanner, source};
