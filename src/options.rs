//! Analysis options.
//!
//! One [`AnalysisOptions`] value configures an [`AnalysisContext`](crate::context::AnalysisContext) for its
//! whole lifetime. Options are plain data: build them with [`Default`] and the `with_*` methods.
//!
//! ## Examples
//! ```rust
//! use kestrel::options::AnalysisOptions;
//!
//! let options = AnalysisOptions::default().with_hints(false).with_max_errors_per_source(Some(50));
//! assert!(!options.hints);
//! assert!(options.analyze_function_bodies);
//! ```

use std::path::PathBuf;

/// Knobs controlling what the analysis context computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Run the hint generator (missing return, dead code) after resolution.
    pub hints: bool,
    /// Resolve statements and expressions inside function bodies. When `false` only declarations
    /// and signatures are resolved.
    pub analyze_function_bodies: bool,
    /// Root of the SDK that `dart:` library URIs map into. Without it, library sources only exist
    /// as installed bootstrap libraries or content overlays.
    pub dart_sdk_directory: Option<PathBuf>,
    /// Cap on the number of errors reported per source by `errors`; `None` reports all of them.
    pub max_errors_per_source: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            hints: true,
            analyze_function_bodies: true,
            dart_sdk_directory: None,
            max_errors_per_source: None,
        }
    }
}

impl AnalysisOptions {
    pub fn with_hints(mut self, hints: bool) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_analyze_function_bodies(mut self, analyze: bool) -> Self {
        self.analyze_function_bodies = analyze;
        self
    }

    pub fn with_dart_sdk_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.dart_sdk_directory = Some(directory.into());
        self
    }

    pub fn with_max_errors_per_source(mut self, max: Option<usize>) -> Self {
        self.max_errors_per_source = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_defaults() {
        let options = AnalysisOptions::default()
            .with_hints(false)
            .with_analyze_function_bodies(false)
            .with_dart_sdk_directory("/sdk")
            .with_max_errors_per_source(Some(3));
        assert!(!options.hints);
        assert!(!options.analyze_function_bodies);
        assert_eq!(options.dart_sdk_directory, Some(PathBuf::from("/sdk")));
        assert_eq!(options.max_errors_per_source, Some(3));
    }
}
