//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Once;

use kestrel::element::create_core_library;
use kestrel::source::Source;
use kestrel::source_factory::SourceFactory;
use kestrel::{AnalysisContext, AnalysisOptions};

static TRACING: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG=kestrel=debug` shows cache activity.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Context over overlay-only sources with the bootstrap core library installed.
pub fn context_with_core(options: AnalysisOptions) -> AnalysisContext {
    init_tracing();
    let context = AnalysisContext::new(options, SourceFactory::default());
    let core = create_core_library();
    context
        .record_library_elements(HashMap::from([(core.source().clone(), core)]))
        .expect("bootstrap core library is well formed");
    context
}

/// Put `text` into the overlay for `path` and return its source.
pub fn add_source(context: &AnalysisContext, path: &str, text: &str) -> Source {
    let source = Source::for_file(path);
    context.source_factory().set_contents(&source, Some(text.to_string()));
    source
}
