//! Source factory: maps URIs to [`Source`]s and sources to their current content.
//!
//! The analysis core never touches the file system itself. Content comes either from the
//! factory's [`ContentCache`] (an editor overlay) or from the first [`UriResolver`] willing to
//! read the source.
//!
//! ## Notes
//! - Overlay stamps come from one counter and only increase, so replacing an overlay always
//!   changes the stamp the analysis context compares against.
//! - Disk stamps are file modification times in milliseconds.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use kestrel_syntax::source::{LIBRARY_SCHEME, Source, UriKind};
use parking_lot::RwLock;
use thiserror::Error;

/// Why the content of a source is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("{0} does not exist")]
    NotFound(Source),
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("no resolver can read {0}")]
    Unresolvable(Source),
}

/// Text of a source together with the stamp it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contents {
    pub text: Arc<str>,
    pub modification_stamp: u64,
}

// ============================================================================
// Resolvers
// ============================================================================

/// Knows how to address and read one family of URIs.
pub trait UriResolver: Send + Sync + fmt::Debug {
    /// Map an absolute URI to a source, or `None` when the URI is not handled here.
    fn resolve_absolute(&self, uri: &str) -> Option<Source>;

    /// Read `source`, or `None` when the source is not handled here.
    fn contents(&self, source: &Source) -> Option<Result<Contents, SourceError>>;

    /// Stamp of `source` without reading it, or `None` when it is not handled here.
    fn modification_stamp(&self, source: &Source) -> Option<Result<u64, SourceError>> {
        self.contents(source)
            .map(|contents| contents.map(|c| c.modification_stamp))
    }
}

/// Resolver for `dart:` library URIs, mapped into an SDK directory.
///
/// `dart:core` maps to `<sdk>/lib/core/core.dart` and `dart:core/list.dart` to
/// `<sdk>/lib/core/list.dart`.
#[derive(Debug, Clone, Default)]
pub struct DartUriResolver {
    sdk_directory: Option<PathBuf>,
}

impl DartUriResolver {
    pub fn new(sdk_directory: Option<PathBuf>) -> Self {
        Self { sdk_directory }
    }

    fn path_for(&self, source: &Source) -> Option<PathBuf> {
        let sdk = self.sdk_directory.as_ref()?;
        let rest = source.full_name().strip_prefix(LIBRARY_SCHEME)?.strip_prefix(':')?;
        let (library, file) = match rest.split_once('/') {
            Some((library, file)) => (library, file.to_string()),
            None => (rest, format!("{rest}.dart")),
        };
        Some(sdk.join("lib").join(library).join(file))
    }
}

impl UriResolver for DartUriResolver {
    fn resolve_absolute(&self, uri: &str) -> Option<Source> {
        Source::for_library_uri(uri)
    }

    fn contents(&self, source: &Source) -> Option<Result<Contents, SourceError>> {
        if source.kind() != UriKind::Library {
            return None;
        }
        Some(match self.path_for(source) {
            Some(path) => read_file(source, &path),
            None => Err(SourceError::NotFound(source.clone())),
        })
    }

    fn modification_stamp(&self, source: &Source) -> Option<Result<u64, SourceError>> {
        if source.kind() != UriKind::Library {
            return None;
        }
        Some(match self.path_for(source) {
            Some(path) => file_stamp(source, &path),
            None => Err(SourceError::NotFound(source.clone())),
        })
    }
}

/// Resolver for file paths and `file://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUriResolver;

impl UriResolver for FileUriResolver {
    fn resolve_absolute(&self, uri: &str) -> Option<Source> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Some(Source::for_file(path));
        }
        (!uri.contains(':')).then(|| Source::for_file(uri))
    }

    fn contents(&self, source: &Source) -> Option<Result<Contents, SourceError>> {
        let path = source.path()?;
        Some(read_file(source, &path))
    }

    fn modification_stamp(&self, source: &Source) -> Option<Result<u64, SourceError>> {
        let path = source.path()?;
        Some(file_stamp(source, &path))
    }
}

fn read_file(source: &Source, path: &Path) -> Result<Contents, SourceError> {
    let modification_stamp = file_stamp(source, path)?;
    let text = std::fs::read_to_string(path).map_err(|err| SourceError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(Contents {
        text: Arc::from(text),
        modification_stamp,
    })
}

fn file_stamp(source: &Source, path: &Path) -> Result<u64, SourceError> {
    let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(source.clone()),
        _ => SourceError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        },
    })?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_millis() as u64)
        .unwrap_or(0);
    Ok(modified)
}

// ============================================================================
// Content overlay
// ============================================================================

/// Overlay of source contents that takes precedence over every resolver.
#[derive(Debug, Default)]
pub struct ContentCache {
    contents: RwLock<HashMap<Source, Contents>>,
    next_stamp: AtomicU64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the overlay for `source`; `None` removes it. Returns the previous overlay text.
    pub fn set_contents(&self, source: &Source, text: Option<String>) -> Option<Arc<str>> {
        let mut contents = self.contents.write();
        let previous = match text {
            Some(text) => {
                let modification_stamp = self.next_stamp.fetch_add(1, Ordering::Relaxed) + 1;
                contents.insert(
                    source.clone(),
                    Contents {
                        text: Arc::from(text),
                        modification_stamp,
                    },
                )
            }
            None => contents.remove(source),
        };
        previous.map(|c| c.text)
    }

    pub fn contents(&self, source: &Source) -> Option<Contents> {
        self.contents.read().get(source).cloned()
    }

    pub fn modification_stamp(&self, source: &Source) -> Option<u64> {
        self.contents.read().get(source).map(|c| c.modification_stamp)
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Entry point for addressing and reading sources.
#[derive(Debug)]
pub struct SourceFactory {
    resolvers: Vec<Box<dyn UriResolver>>,
    content_cache: ContentCache,
}

impl SourceFactory {
    /// Factory consulting `resolvers` in order.
    pub fn new(resolvers: Vec<Box<dyn UriResolver>>) -> Self {
        Self {
            resolvers,
            content_cache: ContentCache::new(),
        }
    }

    /// Factory with a library-scheme resolver for `sdk_directory` followed by a file resolver.
    pub fn standard(sdk_directory: Option<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(DartUriResolver::new(sdk_directory)),
            Box::new(FileUriResolver),
        ])
    }

    /// Source for an absolute URI (`dart:core`, `file:///a/b.dart`, `/a/b.dart`).
    pub fn for_uri(&self, uri: &str) -> Option<Source> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve_absolute(uri))
    }

    pub fn for_file(&self, path: impl AsRef<Path>) -> Source {
        Source::for_file(path)
    }

    /// Resolve a directive URI written inside `containing`.
    pub fn resolve_uri(&self, containing: Option<&Source>, uri: &str) -> Option<Source> {
        match containing {
            Some(source) => source.resolve_relative(uri),
            None => self.for_uri(uri),
        }
    }

    /// Set or clear the overlay for `source`.
    ///
    /// The analysis context must be told separately (`source_changed`) so it drops what it
    /// derived from the old content.
    pub fn set_contents(&self, source: &Source, text: Option<String>) {
        self.content_cache.set_contents(source, text);
    }

    pub fn contents(&self, source: &Source) -> Result<Contents, SourceError> {
        if let Some(contents) = self.content_cache.contents(source) {
            return Ok(contents);
        }
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.contents(source))
            .unwrap_or_else(|| Err(SourceError::Unresolvable(source.clone())))
    }

    /// Current stamp of `source`, or `None` when it cannot be read.
    pub fn modification_stamp(&self, source: &Source) -> Option<u64> {
        if let Some(stamp) = self.content_cache.modification_stamp(source) {
            return Some(stamp);
        }
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.modification_stamp(source))
            .and_then(Result::ok)
    }

    pub fn exists(&self, source: &Source) -> bool {
        self.modification_stamp(source).is_some()
    }
}

impl Default for SourceFactory {
    fn default() -> Self {
        Self::standard(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_wins_and_stamps_increase() {
        let factory = SourceFactory::default();
        let source = Source::for_file("/nowhere/a.dart");
        assert!(!factory.exists(&source));

        factory.set_contents(&source, Some("class A {}".to_string()));
        let first = factory.contents(&source).unwrap();
        assert_eq!(&*first.text, "class A {}");

        factory.set_contents(&source, Some("class B {}".to_string()));
        let second = factory.contents(&source).unwrap();
        assert!(second.modification_stamp > first.modification_stamp);

        factory.set_contents(&source, None);
        assert!(matches!(factory.contents(&source), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_for_uri_classifies_schemes() {
        let factory = SourceFactory::default();
        let core = factory.for_uri("dart:core").unwrap();
        assert_eq!(core.kind(), UriKind::Library);
        let file = factory.for_uri("file:///lib/a.dart").unwrap();
        assert_eq!(file.kind(), UriKind::File);
        assert_eq!(file.full_name(), "/lib/a.dart");
        assert!(factory.for_uri("http://example.com/a.dart").is_none());
    }

    #[test]
    fn test_library_without_sdk_is_not_found() {
        let factory = SourceFactory::default();
        let core = Source::for_library_uri("dart:core").unwrap();
        assert!(matches!(factory.contents(&core), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_sdk_paths() {
        let resolver = DartUriResolver::new(Some(PathBuf::from("/sdk")));
        let core = Source::for_library_uri("dart:core").unwrap();
        assert_eq!(resolver.path_for(&core), Some(PathBuf::from("/sdk/lib/core/core.dart")));
        let part = core.resolve_relative("list.dart").unwrap();
        assert_eq!(resolver.path_for(&part), Some(PathBuf::from("/sdk/lib/core/list.dart")));
    }

    #[test]
    fn test_resolve_uri_relative_to_containing_source() {
        let factory = SourceFactory::default();
        let main = Source::for_file("/project/lib/main.dart");
        let util = factory.resolve_uri(Some(&main), "src/util.dart").unwrap();
        assert_eq!(util.full_name(), "/project/lib/src/util.dart");
    }
}
