//! Internal errors.
//!
//! Problems in analyzed source text are never errors in the Rust sense: they are reported as
//! [`AnalysisError`](kestrel_syntax::diagnostics::AnalysisError)s and analysis carries on. The
//! [`AnalysisException`] type covers the remaining cases, where the API itself was misused or
//! the environment cannot supply what was asked for.

use kestrel_syntax::source::Source;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_factory::SourceError;

/// Failure that analysis cannot recover from locally.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AnalysisException {
    /// Resolution needs the core library, but it was neither installed nor found.
    #[diagnostic(
        code(kestrel::missing_core_library),
        help("call `record_library_elements` with `create_core_library()` or set `dart_sdk_directory`")
    )]
    #[error("the core library `{0}` is not available; install a bootstrap library or configure an SDK")]
    MissingCoreLibrary(String),

    /// The content of a source could not be obtained.
    #[diagnostic(code(kestrel::unreadable))]
    #[error(transparent)]
    Unreadable(#[from] SourceError),

    /// An installed bootstrap library map is inconsistent.
    #[diagnostic(code(kestrel::malformed_bootstrap))]
    #[error("malformed bootstrap library: {0}")]
    MalformedBootstrap(String),

    /// A source used as a library is a part (`part of`).
    #[diagnostic(code(kestrel::not_a_library))]
    #[error("{0} is not a library")]
    NotALibrary(Source),

    /// A compilation unit was resolved against a library that does not include it.
    #[diagnostic(code(kestrel::not_a_part_of))]
    #[error("{unit} is not part of the library {library}")]
    NotAPartOf { unit: Source, library: Source },
}

/// Result alias for operations that can fail with an [`AnalysisException`].
pub type AnalysisResult<T> = Result<T, AnalysisException>;
