//! Source identity.
//!
//! A [`Source`] names a unit of input text. It does not own the text: content and modification
//! stamps are supplied by a source factory so that an editor overlay can replace what is on disk.
//! Two sources are equal when they name the same URI, regardless of content.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a source was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UriKind {
    /// A library URI such as `dart:core`.
    Library,
    /// A file on disk (or in an overlay) addressed by path.
    File,
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct SourceId {
    kind: UriKind,
    full_name: String,
}

/// Cheap-to-clone handle identifying one unit of source text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Source(Arc<SourceId>);

/// URI scheme used for library sources.
pub const LIBRARY_SCHEME: &str = "dart";

impl Source {
    /// Create a source for a file path.
    pub fn for_file(path: impl AsRef<Path>) -> Self {
        Source(Arc::new(SourceId {
            kind: UriKind::File,
            full_name: normalize(&path.as_ref().to_string_lossy()),
        }))
    }

    /// Create a source for a library URI (`dart:core`).
    ///
    /// Returns `None` when `uri` does not use the library scheme.
    pub fn for_library_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(LIBRARY_SCHEME)?.strip_prefix(':')?;
        if rest.is_empty() {
            return None;
        }
        Some(Self::library(rest))
    }

    /// Source of the system library `name` (`core` gives `dart:core`).
    pub fn library(name: &str) -> Self {
        Source(Arc::new(SourceId {
            kind: UriKind::Library,
            full_name: format!("{LIBRARY_SCHEME}:{name}"),
        }))
    }

    pub fn kind(&self) -> UriKind {
        self.0.kind
    }

    /// Full name: the library URI or the normalized file path.
    pub fn full_name(&self) -> &str {
        &self.0.full_name
    }

    /// Last path segment, used in diagnostics.
    pub fn short_name(&self) -> &str {
        let name = self.full_name();
        match self.kind() {
            UriKind::Library => name,
            UriKind::File => name.rsplit('/').next().unwrap_or(name),
        }
    }

    /// The URI form of this source (`dart:core`, `file:///a/b.dart`).
    pub fn uri(&self) -> String {
        match self.kind() {
            UriKind::Library => self.full_name().to_string(),
            UriKind::File => format!("file://{}", self.full_name()),
        }
    }

    /// Return `true` for sources addressed through the library scheme.
    pub fn is_in_system_library(&self) -> bool {
        self.kind() == UriKind::Library
    }

    /// Path of a file source.
    pub fn path(&self) -> Option<PathBuf> {
        match self.kind() {
            UriKind::File => Some(PathBuf::from(self.full_name())),
            UriKind::Library => None,
        }
    }

    /// Resolve a URI that appears in a directive inside this source.
    ///
    /// Library URIs resolve to themselves. Relative URIs resolve against the directory of this
    /// source; for a library source they resolve inside the library (`dart:core/list.dart`).
    pub fn resolve_relative(&self, uri: &str) -> Option<Source> {
        if uri.is_empty() {
            return None;
        }
        if uri.starts_with(&format!("{LIBRARY_SCHEME}:")) {
            return Source::for_library_uri(uri);
        }
        if let Some(path) = uri.strip_prefix("file://") {
            return Some(Source::for_file(path));
        }
        if uri.contains(':') {
            // Unsupported scheme.
            return None;
        }
        match self.kind() {
            UriKind::File => {
                if uri.starts_with('/') {
                    return Some(Source::for_file(uri));
                }
                // The directory keeps its trailing separator, so `/a.dart` resolves against `/`.
                let name = self.full_name();
                let dir = name.rfind('/').map_or("", |idx| &name[..=idx]);
                Some(Source::for_file(format!("{dir}{uri}")))
            }
            UriKind::Library => {
                let library = self.full_name().split('/').next().unwrap_or(self.full_name());
                Some(Source(Arc::new(SourceId {
                    kind: UriKind::Library,
                    full_name: normalize(&format!("{library}/{uri}")),
                })))
            }
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.uri())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// Collapse `.` and `..` segments and duplicate separators.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_identity() {
        let a = Source::for_file("/lib/a.dart");
        let b = Source::for_file("/lib/./a.dart");
        assert_eq!(a, b);
        assert_ne!(a, Source::for_file("/lib/b.dart"));
    }

    #[test]
    fn test_library_uri() {
        let core = Source::for_library_uri("dart:core").unwrap();
        assert_eq!(core.kind(), UriKind::Library);
        assert_eq!(core.uri(), "dart:core");
        assert!(core.is_in_system_library());
        assert!(Source::for_library_uri("package:x").is_none());
        assert!(Source::for_library_uri("dart:").is_none());
    }

    #[test]
    fn test_resolve_relative_file() {
        let lib = Source::for_file("/app/lib/main.dart");
        assert_eq!(lib.resolve_relative("src/a.dart"), Some(Source::for_file("/app/lib/src/a.dart")));
        assert_eq!(lib.resolve_relative("../b.dart"), Some(Source::for_file("/app/b.dart")));
        assert_eq!(lib.resolve_relative("dart:core"), Source::for_library_uri("dart:core"));
        assert_eq!(lib.resolve_relative("http://x"), None);
        assert_eq!(lib.short_name(), "main.dart");
    }

    #[test]
    fn test_resolve_relative_from_root_and_bare_names() {
        let root = Source::for_file("/main.dart");
        assert_eq!(root.resolve_relative("b.dart"), Some(Source::for_file("/b.dart")));
        assert_eq!(root.resolve_relative("src/p.dart").unwrap().uri(), Source::for_file("/src/p.dart").uri());
        let bare = Source::for_file("main.dart");
        assert_eq!(bare.resolve_relative("b.dart"), Some(Source::for_file("b.dart")));
    }

    #[test]
    fn test_resolve_relative_library() {
        let core = Source::for_library_uri("dart:core").unwrap();
        let part = core.resolve_relative("list.dart").unwrap();
        assert_eq!(part.full_name(), "dart:core/list.dart");
        assert_eq!(part.kind(), UriKind::Library);
    }
}
