use std::collections::HashMap;
use std::sync::Arc;

use kestrel_syntax::ast::Ast;
use kestrel_syntax::diagnostics::AnalysisError;
use kestrel_syntax::scanner::TokenStream;
use kestrel_syntax::source::Source;

use crate::element::LibraryElement;
use crate::resolver::ResolvedUnit;

/// A value derived from other sources, valid only while the context epoch it was computed in is
/// current.
#[derive(Debug, Clone)]
pub(super) struct Epoched<T> {
    pub(super) epoch: u64,
    pub(super) value: T,
}

/// Everything the context derived from one source.
///
/// Tokens and tree depend only on the source itself. The library element and resolved units also
/// depend on other sources and carry the epoch they were computed in.
#[derive(Debug, Default)]
pub(super) struct SourceEntry {
    /// Bumped on every invalidation. A result computed outside the lock is only stored when the
    /// generation it started from is still current.
    pub(super) generation: u64,
    /// Stamp of the content the tokens were scanned from.
    pub(super) stamp: Option<u64>,
    pub(super) tokens: Option<Arc<TokenStream>>,
    pub(super) scan_errors: Vec<AnalysisError>,
    pub(super) ast: Option<Arc<Ast>>,
    pub(super) parse_errors: Vec<AnalysisError>,
    /// Library element, when the source is the defining unit of a library.
    pub(super) library: Option<Epoched<Arc<LibraryElement>>>,
    /// Resolution of this unit keyed by the library it was resolved in.
    pub(super) resolved: HashMap<Source, Epoched<Arc<ResolvedUnit>>>,
}

impl SourceEntry {
    /// Drop everything derived from the current content.
    pub(super) fn invalidate(&mut self) {
        *self = SourceEntry {
            generation: self.generation + 1,
            ..SourceEntry::default()
        };
    }

    pub(super) fn library(&self, epoch: u64) -> Option<Arc<LibraryElement>> {
        self.library
            .as_ref()
            .filter(|cached| cached.epoch == epoch)
            .map(|cached| cached.value.clone())
    }

    pub(super) fn resolved(&self, library: &Source, epoch: u64) -> Option<Arc<ResolvedUnit>> {
        self.resolved
            .get(library)
            .filter(|cached| cached.epoch == epoch)
            .map(|cached| cached.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::create_core_library;

    #[test]
    fn test_invalidate_clears_and_bumps_generation() {
        let mut entry = SourceEntry {
            stamp: Some(3),
            library: Some(Epoched {
                epoch: 1,
                value: Arc::new(create_core_library()),
            }),
            ..SourceEntry::default()
        };
        assert!(entry.library(1).is_some());
        assert!(entry.library(2).is_none());

        entry.invalidate();
        assert_eq!(entry.generation, 1);
        assert_eq!(entry.stamp, None);
        assert!(entry.library(1).is_none());
    }
}
