use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use kestrel_syntax::ast::{Ast, NodeKind};
use kestrel_syntax::source::Source;

use super::type_resolver::resolve_library_types;
use crate::element::{CORE_LIBRARY_URI, ElementBuilder, ElementGraph, LibraryElement};
use crate::error::{AnalysisException, AnalysisResult};
use crate::types::TypeProvider;

/// Where library resolution gets its inputs from.
pub trait UnitProvider {
    /// Parsed unit for `source`; `Ok(None)` when the source does not exist.
    fn unit(&self, source: &Source) -> AnalysisResult<Option<Arc<Ast>>>;

    /// Library already built for `source` (installed or cached), reused as is.
    fn library(&self, source: &Source) -> Option<Arc<LibraryElement>>;
}

/// A library together with every library it reaches through imports and exports, plus the
/// core library.
#[derive(Debug, Clone)]
pub struct LibraryClosure {
    pub graph: ElementGraph,
    pub type_provider: TypeProvider,
    /// Libraries built by this call, in need of caching.
    pub built: Vec<Arc<LibraryElement>>,
    /// Sources that were reached but are parts rather than libraries.
    pub non_libraries: HashSet<Source>,
}

/// Return `true` if `ast` is a part (`part of ...`).
pub fn is_part(ast: &Ast) -> bool {
    ast.directives()
        .iter()
        .any(|d| matches!(ast.kind(*d), NodeKind::PartOfDirective(_)))
}

/// Build the elements of `root` and of everything it depends on.
///
/// Libraries the provider already has are reused; the others are built in two phases: elements
/// for every library first, then declared types, so a type annotation may name a class from any
/// library of the closure.
#[tracing::instrument(skip_all, fields(root = %root))]
pub fn build_library_closure(provider: &dyn UnitProvider, root: &Source) -> AnalysisResult<LibraryClosure> {
    let core_source = Source::library("core");
    let mut graph = ElementGraph::new();
    let mut non_libraries = HashSet::new();
    let mut pending = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root.clone(), core_source.clone()]);

    while let Some(source) = queue.pop_front() {
        if !visited.insert(source.clone()) {
            continue;
        }
        let library = match provider.library(&source) {
            Some(library) => library,
            None => {
                let Some(ast) = provider.unit(&source)? else {
                    if source == core_source {
                        return Err(AnalysisException::MissingCoreLibrary(CORE_LIBRARY_URI.to_string()));
                    }
                    continue;
                };
                if is_part(&ast) {
                    if source == *root {
                        return Err(AnalysisException::NotALibrary(source));
                    }
                    non_libraries.insert(source);
                    continue;
                }
                let mut units = vec![(source.clone(), ast.clone())];
                for &directive in ast.directives() {
                    let NodeKind::PartDirective(part) = ast.kind(directive) else {
                        continue;
                    };
                    let Some(part_source) = ast.string_value(part.uri).and_then(|uri| source.resolve_relative(&uri))
                    else {
                        continue;
                    };
                    if let Some(part_ast) = provider.unit(&part_source)? {
                        units.push((part_source, part_ast));
                    }
                }
                let library = Arc::new(ElementBuilder::new(&source).build(&units));
                pending.push((library.id(), units));
                library
            }
        };
        let dependencies = library
            .imports()
            .iter()
            .filter_map(|i| i.source.clone())
            .chain(library.exports().iter().filter_map(|e| e.source.clone()));
        queue.extend(dependencies);
        graph.insert(library);
    }

    let core = graph
        .library_for(&core_source)
        .ok_or_else(|| AnalysisException::MissingCoreLibrary(CORE_LIBRARY_URI.to_string()))?;
    let type_provider = TypeProvider::from_core(core)?;

    // Dependencies were queued after their importers; resolving in reverse lets a typedef from an
    // imported library be complete before it is used.
    for (id, units) in pending.iter().rev() {
        resolve_library_types(&mut graph, &type_provider, *id, units);
    }
    let built = pending
        .iter()
        .filter_map(|(id, _)| graph.library(*id).cloned())
        .collect();
    tracing::debug!(libraries = graph.libraries().count(), "library closure ready");
    Ok(LibraryClosure {
        graph,
        type_provider,
        built,
        non_libraries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::create_core_library;
    use crate::types::Type;
    use kestrel_syntax::diagnostics::NullErrorListener;
    use kestrel_syntax::{parser, scanner};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Units {
        units: HashMap<Source, Arc<Ast>>,
        libraries: HashMap<Source, Arc<LibraryElement>>,
    }

    impl Units {
        fn with_core() -> Self {
            let mut units = Self::default();
            units
                .libraries
                .insert(Source::library("core"), Arc::new(create_core_library()));
            units
        }

        fn add(&mut self, path: &str, text: &str) -> Source {
            let source = Source::for_file(path);
            let tokens = scanner::scan_source(&source, text, &mut NullErrorListener);
            let ast = parser::parse(&tokens, &mut NullErrorListener);
            self.units.insert(source.clone(), Arc::new(ast));
            source
        }
    }

    impl UnitProvider for Units {
        fn unit(&self, source: &Source) -> AnalysisResult<Option<Arc<Ast>>> {
            Ok(self.units.get(source).cloned())
        }

        fn library(&self, source: &Source) -> Option<Arc<LibraryElement>> {
            self.libraries.get(source).cloned()
        }
    }

    #[test]
    fn test_closure_follows_imports_and_resolves_types() {
        let mut units = Units::with_core();
        let main = units.add("/main.dart", "import 'b.dart'; class A extends B { int x; }");
        units.add("/b.dart", "class B { List<String> names; }");
        let closure = build_library_closure(&units, &main).unwrap();
        assert_eq!(closure.built.len(), 2);

        let graph = &closure.graph;
        let library = graph.library_for(&main).unwrap();
        let a = library.class_named("A").unwrap();
        let b = graph.library_for(&Source::for_file("/b.dart")).unwrap().class_named("B").unwrap();
        assert_eq!(graph.supertype(a).and_then(Type::element), Some(b));
        let x = graph.declared_member(a, "x").unwrap();
        assert_eq!(graph.element(x).ty, closure.type_provider.int_type());
        let names = graph.declared_member(b, "names").unwrap();
        assert_eq!(graph.element(names).ty.display(graph), "List<String>");
    }

    #[test]
    fn test_field_formals_take_the_field_type() {
        let mut units = Units::with_core();
        let main = units.add("/main.dart", "class P { P(this.x, [int y]); double x; }");
        let closure = build_library_closure(&units, &main).unwrap();
        let graph = &closure.graph;
        let p = graph.library_for(&main).unwrap().class_named("P").unwrap();
        let constructor = graph.lookup_constructor(p, "").unwrap();
        assert_eq!(graph.element(constructor).ty.display(graph), "(double, [int]) -> P");
    }

    #[test]
    fn test_missing_core_and_parts() {
        let mut units = Units::default();
        let main = units.add("/main.dart", "class A {}");
        let err = build_library_closure(&units, &main).unwrap_err();
        assert!(matches!(err, AnalysisException::MissingCoreLibrary(_)));

        let mut units = Units::with_core();
        let part = units.add("/part.dart", "part of a;");
        let err = build_library_closure(&units, &part).unwrap_err();
        assert_eq!(err, AnalysisException::NotALibrary(part.clone()));

        let main = units.add("/main.dart", "import 'part.dart';");
        let closure = build_library_closure(&units, &main).unwrap();
        assert!(closure.non_libraries.contains(&part));
    }
}
