//! Analysis context: the incremental cache in front of scanning, parsing and resolution.
//!
//! An [`AnalysisContext`] owns a [`SourceFactory`] and memoizes, per [`Source`], the token
//! stream, the tree, the library element and the resolved units derived from it. Every public
//! operation is safe to call from several threads at once.
//!
//! ## Invalidation
//! - [`AnalysisContext::source_changed`] drops everything derived from that source. A content
//!   stamp that moved without notification has the same effect on the next access.
//! - Library elements and resolved units also depend on other sources. They are tagged with the
//!   context epoch they were computed in, and every invalidation starts a new epoch, so they are
//!   recomputed lazily instead of being walked and dropped eagerly.
//! - Results are computed outside the entry lock. One is stored only if its entry was not
//!   invalidated in the meantime; an in-flight caller may still return the stale value.
//!
//! ## Module Structure
//!
//! - `entry` - per-source cache entry

mod entry;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kestrel_syntax::ast::Ast;
use kestrel_syntax::diagnostics::{AnalysisError, ErrorListener, LineInfo};
use kestrel_syntax::parser;
use kestrel_syntax::scanner::{self, TokenStream};
use kestrel_syntax::source::Source;
use parking_lot::{Mutex, RwLock};

use crate::element::{Element, ElementLocation, LibraryElement};
use crate::error::{AnalysisException, AnalysisResult};
use crate::options::AnalysisOptions;
use crate::resolver::{LibraryClosure, ResolvedUnit, UnitProvider, build_library_closure, is_part, resolve_unit};
use crate::source_factory::{SourceError, SourceFactory};
use entry::{Epoched, SourceEntry};

type SharedEntry = Arc<Mutex<SourceEntry>>;

/// Shared, incrementally maintained analysis state for a set of sources.
#[derive(Debug)]
pub struct AnalysisContext {
    options: AnalysisOptions,
    factory: SourceFactory,
    entries: RwLock<HashMap<Source, SharedEntry>>,
    /// Bootstrap libraries; never invalidated.
    installed: RwLock<HashMap<Source, Arc<LibraryElement>>>,
    epoch: AtomicU64,
}

impl AnalysisContext {
    pub fn new(options: AnalysisOptions, factory: SourceFactory) -> Self {
        Self {
            options,
            factory,
            entries: RwLock::new(HashMap::new()),
            installed: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn source_factory(&self) -> &SourceFactory {
        &self.factory
    }

    // ========================================================================
    // Scan and parse
    // ========================================================================

    pub fn scan(&self, source: &Source) -> AnalysisResult<Arc<TokenStream>> {
        Ok(self.scanned(source)?.0)
    }

    /// Scan `source`, reporting its lexical errors to `listener`, cached or not.
    pub fn scan_with_errors(
        &self,
        source: &Source,
        listener: &mut dyn ErrorListener,
    ) -> AnalysisResult<Arc<TokenStream>> {
        let (tokens, errors) = self.scanned(source)?;
        report(listener, errors);
        Ok(tokens)
    }

    pub fn parse(&self, source: &Source) -> AnalysisResult<Arc<Ast>> {
        Ok(self.parsed(source)?.0)
    }

    /// Parse `source`, reporting its lexical and syntactic errors to `listener`.
    pub fn parse_with_errors(&self, source: &Source, listener: &mut dyn ErrorListener) -> AnalysisResult<Arc<Ast>> {
        let (ast, errors) = self.parsed(source)?;
        report(listener, errors);
        Ok(ast)
    }

    pub fn compute_line_info(&self, source: &Source) -> AnalysisResult<LineInfo> {
        Ok(self.scan(source)?.line_info.clone())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
    fn scanned(&self, source: &Source) -> AnalysisResult<(Arc<TokenStream>, Vec<AnalysisError>)> {
        let (entry, generation) = self.validated(source);
        {
            let cached = entry.lock();
            if let Some(tokens) = &cached.tokens {
                tracing::trace!("tokens cached");
                return Ok((tokens.clone(), cached.scan_errors.clone()));
            }
        }

        let contents = self.factory.contents(source)?;
        let mut errors = Vec::new();
        let tokens = Arc::new(scanner::scan_source(source, &contents.text, &mut errors));
        tracing::debug!(tokens = tokens.tokens.len(), errors = errors.len(), "scanned");

        let mut cached = entry.lock();
        if cached.generation == generation && cached.tokens.is_none() {
            cached.stamp = Some(contents.modification_stamp);
            cached.tokens = Some(tokens.clone());
            cached.scan_errors = errors.clone();
        }
        Ok((tokens, errors))
    }

    /// Tree of `source` with its lexical and syntactic errors.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
    fn parsed(&self, source: &Source) -> AnalysisResult<(Arc<Ast>, Vec<AnalysisError>)> {
        let (entry, generation) = self.validated(source);
        {
            let cached = entry.lock();
            if let Some(ast) = &cached.ast {
                tracing::trace!("tree cached");
                let mut errors = cached.scan_errors.clone();
                errors.extend(cached.parse_errors.iter().cloned());
                return Ok((ast.clone(), errors));
            }
        }

        let (tokens, mut errors) = self.scanned(source)?;
        let mut parse_errors = Vec::new();
        let ast = Arc::new(parser::parse(&tokens, &mut parse_errors));
        tracing::debug!(nodes = ast.len(), errors = parse_errors.len(), "parsed");

        let mut cached = entry.lock();
        if cached.generation == generation && cached.ast.is_none() {
            cached.ast = Some(ast.clone());
            cached.parse_errors = parse_errors.clone();
        }
        errors.extend(parse_errors);
        Ok((ast, errors))
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    pub fn resolve(&self, unit: &Source, library: &Source) -> AnalysisResult<Arc<ResolvedUnit>> {
        self.resolve_with_errors(unit, library, &mut kestrel_syntax::diagnostics::NullErrorListener)
    }

    /// Resolve `unit` as a compilation unit of `library`, reporting the unit's declaration,
    /// resolution and hint errors to `listener`.
    ///
    /// Fails when the core library is neither installed nor readable, when `library` is a part,
    /// or when `unit` does not belong to `library`.
    #[tracing::instrument(skip_all, fields(unit = %unit, library = %library))]
    pub fn resolve_with_errors(
        &self,
        unit: &Source,
        library: &Source,
        listener: &mut dyn ErrorListener,
    ) -> AnalysisResult<Arc<ResolvedUnit>> {
        self.validated(library);
        let (entry, generation) = self.validated(unit);
        let epoch = self.current_epoch();
        if let Some(resolved) = entry.lock().resolved(library, epoch) {
            tracing::trace!("resolution cached");
            report(listener, resolved.errors.clone());
            return Ok(resolved);
        }

        let ast = self.parse(unit)?;
        let closure = self.closure(library, epoch)?;
        let resolved = Arc::new(resolve_unit(&closure, library, unit, ast, &self.options)?);

        let mut cached = entry.lock();
        if cached.generation == generation && self.current_epoch() == epoch {
            cached.resolved.insert(
                library.clone(),
                Epoched {
                    epoch,
                    value: resolved.clone(),
                },
            );
        }
        drop(cached);
        report(listener, resolved.errors.clone());
        Ok(resolved)
    }

    /// Every error of `source`: lexical, syntactic, then those found while resolving it.
    ///
    /// A library is resolved on its own. A part is resolved within the cached library that
    /// includes it; when no such library has been built yet only syntactic errors are known.
    pub fn errors(&self, source: &Source) -> AnalysisResult<Vec<AnalysisError>> {
        let (ast, mut errors) = self.parsed(source)?;
        let library = if is_part(&ast) {
            self.including_library(source)
        } else {
            Some(source.clone())
        };
        if let Some(library) = library {
            errors.extend(self.resolve(source, &library)?.errors.iter().cloned());
        }
        errors.sort_by_key(|e| e.offset);
        if let Some(max) = self.options.max_errors_per_source {
            errors.truncate(max);
        }
        Ok(errors)
    }

    /// [`errors`](Self::errors) of `source` rendered against its current content.
    pub fn reports(&self, source: &Source) -> AnalysisResult<Vec<miette::Report>> {
        let errors = self.errors(source)?;
        let contents = self.factory.contents(source)?;
        Ok(errors.iter().map(|e| e.to_report(&contents.text)).collect())
    }

    fn including_library(&self, part: &Source) -> Option<Source> {
        let epoch = self.current_epoch();
        let entries: Vec<SharedEntry> = self.entries.read().values().cloned().collect();
        entries
            .iter()
            .filter_map(|entry| entry.lock().library(epoch))
            .chain(self.installed.read().values().cloned())
            .find(|library| library.unit_for(part).is_some())
            .map(|library| library.source().clone())
    }

    /// Library closure of `root`, caching every library it had to build.
    fn closure(&self, root: &Source, epoch: u64) -> AnalysisResult<LibraryClosure> {
        let closure = build_library_closure(&ContextUnits { context: self, epoch }, root)?;
        for library in &closure.built {
            let entry = self.entry(library.source());
            let mut cached = entry.lock();
            if self.current_epoch() == epoch {
                cached.library = Some(Epoched {
                    epoch,
                    value: library.clone(),
                });
            }
        }
        tracing::debug!(built = closure.built.len(), "library elements cached");
        Ok(closure)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Install precomputed library elements, keyed by their defining unit.
    ///
    /// Installed libraries take precedence over anything parsed from source, which lets
    /// resolution run against a bootstrap core library without an SDK.
    pub fn record_library_elements(&self, libraries: HashMap<Source, LibraryElement>) -> AnalysisResult<()> {
        if let Some((source, library)) = libraries.iter().find(|(source, library)| library.source() != *source) {
            return Err(AnalysisException::MalformedBootstrap(format!(
                "library defined by {} is recorded under {source}",
                library.source()
            )));
        }
        let count = libraries.len();
        self.installed
            .write()
            .extend(libraries.into_iter().map(|(source, library)| (source, Arc::new(library))));
        self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(libraries = count, "library elements recorded");
        Ok(())
    }

    /// Library element defined by `source`, building it when needed.
    ///
    /// `Ok(None)` when the source does not exist or is a part.
    pub fn library_element(&self, source: &Source) -> AnalysisResult<Option<Arc<LibraryElement>>> {
        let epoch = self.current_epoch();
        let units = ContextUnits { context: self, epoch };
        if let Some(library) = units.library(source) {
            return Ok(Some(library));
        }
        match units.unit(source)? {
            Some(ast) if !is_part(&ast) => {
                let closure = self.closure(source, epoch)?;
                Ok(closure.graph.library_for(source).cloned())
            }
            _ => Ok(None),
        }
    }

    /// Element at `location`, looked up in the installed and cached libraries first and then in
    /// the library its first component names.
    pub fn element(&self, location: &ElementLocation) -> Option<Element> {
        let uri = location.library_uri()?;
        let epoch = self.current_epoch();
        let entries: Vec<SharedEntry> = self.entries.read().values().cloned().collect();
        let known = self
            .installed
            .read()
            .values()
            .cloned()
            .chain(entries.iter().filter_map(|entry| entry.lock().library(epoch)))
            .find(|library| library.source().uri() == uri);
        let library = match known {
            Some(library) => library,
            None => {
                let source = self.factory.for_uri(uri)?;
                match self.library_element(&source) {
                    Ok(library) => library?,
                    Err(err) => {
                        tracing::debug!(%err, "element location not resolvable");
                        return None;
                    }
                }
            }
        };
        let id = library.find(location)?;
        library.element(id).cloned()
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Drop everything derived from the content of `source` and start a new epoch.
    pub fn source_changed(&self, source: &Source) {
        let entry = self.entry(source);
        entry.lock().invalidate();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(source = %source, "source invalidated");
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn entry(&self, source: &Source) -> SharedEntry {
        if let Some(entry) = self.entries.read().get(source) {
            return entry.clone();
        }
        self.entries.write().entry(source.clone()).or_default().clone()
    }

    /// Entry of `source` and its generation, after dropping the entry if the content stamp moved
    /// since it was scanned.
    fn validated(&self, source: &Source) -> (SharedEntry, u64) {
        let entry = self.entry(source);
        let stamp = self.factory.modification_stamp(source);
        let mut cached = entry.lock();
        if cached.stamp.is_some() && cached.stamp != stamp {
            cached.invalidate();
            self.epoch.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(source = %source, "content changed since it was scanned");
        }
        let generation = cached.generation;
        (entry.clone(), generation)
    }
}

fn report(listener: &mut dyn ErrorListener, errors: Vec<AnalysisError>) {
    for error in errors {
        listener.on_error(error);
    }
}

/// Feeds library resolution from the context's caches.
struct ContextUnits<'a> {
    context: &'a AnalysisContext,
    epoch: u64,
}

impl UnitProvider for ContextUnits<'_> {
    fn unit(&self, source: &Source) -> AnalysisResult<Option<Arc<Ast>>> {
        match self.context.parse(source) {
            Ok(ast) => Ok(Some(ast)),
            Err(AnalysisException::Unreadable(SourceError::NotFound(_) | SourceError::Unresolvable(_))) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn library(&self, source: &Source) -> Option<Arc<LibraryElement>> {
        if let Some(library) = self.context.installed.read().get(source) {
            return Some(library.clone());
        }
        let entry = self.context.entries.read().get(source).cloned()?;
        let library = entry.lock().library(self.epoch);
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, create_core_library};
    use kestrel_syntax::ast::NodeKind;
    use kestrel_syntax::diagnostics::{ErrorCode, GatheringErrorListener};

    fn context() -> AnalysisContext {
        AnalysisContext::new(AnalysisOptions::default(), SourceFactory::default())
    }

    fn with_core(context: &AnalysisContext) {
        let core = create_core_library();
        context
            .record_library_elements(HashMap::from([(core.source().clone(), core)]))
            .unwrap();
    }

    fn add(context: &AnalysisContext, path: &str, text: &str) -> Source {
        let source = Source::for_file(path);
        context.source_factory().set_contents(&source, Some(text.to_string()));
        source
    }

    fn first_declaration_name(ast: &Ast) -> String {
        match ast.kind(ast.declarations()[0]) {
            NodeKind::ClassDeclaration(declaration) => ast.name_of(declaration.name),
            other => panic!("expected a class, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_is_cached_until_source_changes() {
        let context = context();
        let source = add(&context, "/test.dart", "class A {}");
        let first = context.parse(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &context.parse(&source).unwrap()));
        assert_eq!(first_declaration_name(&first), "A");

        context.source_factory().set_contents(&source, Some("class B {}".to_string()));
        context.source_changed(&source);
        assert_eq!(first_declaration_name(&context.parse(&source).unwrap()), "B");
    }

    #[test]
    fn test_unnotified_content_change_is_noticed() {
        let context = context();
        let source = add(&context, "/test.dart", "class A {}");
        context.parse(&source).unwrap();
        context.source_factory().set_contents(&source, Some("class B {}".to_string()));
        assert_eq!(first_declaration_name(&context.parse(&source).unwrap()), "B");
    }

    #[test]
    fn test_errors_are_reported_for_cached_results_too() {
        let context = context();
        let source = add(&context, "/test.dart", "class A {");
        for _ in 0..2 {
            let mut listener = GatheringErrorListener::new();
            context.parse_with_errors(&source, &mut listener).unwrap();
            assert!(listener.has_errors());
        }
    }

    #[test]
    fn test_resolve_binds_to_installed_core() {
        let context = context();
        with_core(&context);
        let source = add(&context, "/test.dart", "class A { int x; String s; List<bool> flags; }");
        let mut listener = GatheringErrorListener::new();
        let unit = context.resolve_with_errors(&source, &source, &mut listener).unwrap();
        listener.assert_no_errors();

        let core = context.library_element(&Source::library("core")).unwrap().unwrap();
        let ast = &unit.ast;
        let int = ast
            .node_ids()
            .find(|id| ast.identifier_name(*id) == Some("int"))
            .and_then(|id| unit.element_id(id))
            .unwrap();
        assert_eq!(Some(int), core.class_named("int"));
        let again = context.resolve(&source, &source).unwrap();
        assert!(Arc::ptr_eq(&unit, &again));
    }

    #[test]
    fn test_resolve_without_core_fails() {
        let context = context();
        let source = add(&context, "/test.dart", "class A {}");
        let err = context.resolve(&source, &source).unwrap_err();
        assert!(matches!(err, AnalysisException::MissingCoreLibrary(_)));
    }

    #[test]
    fn test_missing_source_is_unreadable() {
        let context = context();
        let err = context.parse(&Source::for_file("/missing.dart")).unwrap_err();
        assert!(matches!(err, AnalysisException::Unreadable(SourceError::NotFound(_))));
    }

    #[test]
    fn test_malformed_bootstrap_is_rejected() {
        let context = context();
        let core = create_core_library();
        let err = context
            .record_library_elements(HashMap::from([(Source::library("async"), core)]))
            .unwrap_err();
        assert!(matches!(err, AnalysisException::MalformedBootstrap(_)));
    }

    #[test]
    fn test_errors_of_a_part_come_from_its_library() {
        let context = context();
        with_core(&context);
        let library = add(&context, "/lib.dart", "library lib; part 'part.dart'; class A {}");
        let part = add(&context, "/part.dart", "part of lib; f() { undefined; }");
        assert!(context.errors(&part).unwrap().is_empty());

        context.library_element(&library).unwrap().unwrap();
        let codes: Vec<ErrorCode> = context.errors(&part).unwrap().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::UndefinedIdentifier]);
    }

    #[test]
    fn test_errors_are_truncated() {
        let options = AnalysisOptions::default().with_max_errors_per_source(Some(1));
        let context = AnalysisContext::new(options, SourceFactory::default());
        with_core(&context);
        let source = add(&context, "/test.dart", "f() { a; b; c; }");
        assert_eq!(context.errors(&source).unwrap().len(), 1);
    }

    #[test]
    fn test_element_by_location() {
        let context = context();
        with_core(&context);
        let source = add(&context, "/test.dart", "class A { m() {} }");
        let library = context.library_element(&source).unwrap().unwrap();
        let method = library
            .elements()
            .find(|(_, e)| e.kind == ElementKind::Method && e.name == "m")
            .map(|(id, _)| id)
            .unwrap();
        let location = library.location(method).unwrap();
        assert_eq!(context.element(&location).map(|e| e.name), Some("m".to_string()));

        let to_string = ElementLocation::parse("dart:core;dart:core;Object;toString");
        assert_eq!(context.element(&to_string).map(|e| e.kind), Some(ElementKind::Method));
    }

    #[test]
    fn test_reports_render_source_context() {
        let context = context();
        with_core(&context);
        let source = add(&context, "/test.dart", "f() { missing; }");
        let reports = context.reports(&source).unwrap();
        assert_eq!(reports.len(), 1);
        let code = reports[0].code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("UNDEFINED_IDENTIFIER"));
    }

    #[test]
    fn test_line_info() {
        let context = context();
        let source = add(&context, "/test.dart", "class A {\n}\n");
        assert_eq!(context.compute_line_info(&source).unwrap().line_count(), 3);
    }
}
