use std::collections::{HashMap, HashSet};

use kestrel_syntax::source::Source;

use crate::element::{CORE_LIBRARY_URI, Combinator, ElementGraph, ElementId, LibraryElement};

/// Names visible through a library boundary.
pub type Namespace = HashMap<String, ElementId>;

/// Public names `library` makes available to importers: its own public top-level declarations
/// plus everything it re-exports, filtered by the export combinators.
pub fn export_namespace(graph: &ElementGraph, library: &LibraryElement) -> Namespace {
    let mut visited = HashSet::new();
    exported(graph, library, &mut visited)
}

fn exported(graph: &ElementGraph, library: &LibraryElement, visited: &mut HashSet<Source>) -> Namespace {
    if !visited.insert(library.source().clone()) {
        return Namespace::new();
    }
    let mut namespace: Namespace = library
        .definitions()
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, id)| (name.clone(), *id))
        .collect();
    for export in library.exports() {
        let Some(target) = export.source.as_ref().and_then(|s| graph.library_for(s)) else {
            continue;
        };
        for (name, id) in exported(graph, target, visited) {
            if Combinator::admits(&export.combinators, &name) {
                namespace.entry(name).or_insert(id);
            }
        }
    }
    namespace
}

/// The names visible at the top of every unit of one library.
///
/// Own declarations come first and shadow imported names; earlier imports win over later ones.
/// Names imported with an `as` prefix are only reachable through the prefix.
#[derive(Debug, Clone, Default)]
pub struct LibraryScope {
    names: Namespace,
    prefixes: HashMap<String, (ElementId, Namespace)>,
}

impl LibraryScope {
    pub fn new(graph: &ElementGraph, library: &LibraryElement) -> Self {
        let mut scope = Self {
            names: library.definitions().clone(),
            prefixes: HashMap::new(),
        };
        let core = Source::for_library_uri(CORE_LIBRARY_URI);
        let imports_core = library.imports().iter().any(|i| i.source == core);
        for import in library.imports() {
            let Some(imported) = import.source.as_ref().and_then(|s| graph.library_for(s)) else {
                continue;
            };
            let names = export_namespace(graph, imported)
                .into_iter()
                .filter(|(name, _)| Combinator::admits(&import.combinators, name));
            match import.prefix {
                Some(prefix) => {
                    let prefix_name = graph.element(prefix).name.clone();
                    let (_, namespace) = scope
                        .prefixes
                        .entry(prefix_name)
                        .or_insert_with(|| (prefix, Namespace::new()));
                    for (name, id) in names {
                        namespace.entry(name).or_insert(id);
                    }
                }
                None => {
                    for (name, id) in names {
                        scope.names.entry(name).or_insert(id);
                    }
                }
            }
        }
        if !imports_core && Some(library.source()) != core.as_ref() {
            if let Some(core) = core.as_ref().and_then(|s| graph.library_for(s)) {
                for (name, id) in export_namespace(graph, core) {
                    scope.names.entry(name).or_insert(id);
                }
            }
        }
        scope
    }

    pub fn lookup(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    /// Prefix element declared by `import ... as name`.
    pub fn prefix(&self, name: &str) -> Option<ElementId> {
        self.prefixes.get(name).map(|(id, _)| *id)
    }

    /// `name` reached through the import prefix `prefix`.
    pub fn lookup_prefixed(&self, prefix: &str, name: &str) -> Option<ElementId> {
        self.prefixes.get(prefix)?.1.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind, ExportSpec, ImportSpec, create_core_library};
    use std::sync::Arc;

    fn library(path: &str, names: &[&str]) -> LibraryElement {
        let mut library = LibraryElement::new(Source::for_file(path), path);
        for name in names {
            let mut element = Element::new(ElementKind::Class, *name);
            element.enclosing = Some(library.library_element());
            let id = library.add(element);
            library.define(name.to_string(), id);
        }
        library
    }

    #[test]
    fn test_exports_follow_combinators_and_skip_private() {
        let mut a = library("/a.dart", &["A", "_hidden"]);
        let b = library("/b.dart", &["B", "C"]);
        a.add_export(ExportSpec {
            uri: "b.dart".to_string(),
            source: Some(Source::for_file("/b.dart")),
            combinators: vec![Combinator::Hide(vec!["C".to_string()])],
        });
        let mut graph = ElementGraph::new();
        graph.insert(Arc::new(b));
        let namespace = export_namespace(&graph, &a);
        let mut names: Vec<&str> = namespace.keys().map(String::as_str).collect();
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_library_scope_precedence() {
        let core = create_core_library();
        let mut main = library("/main.dart", &["int"]);
        let prefix = {
            let mut element = Element::new(ElementKind::ImportPrefix, "p");
            element.enclosing = Some(main.library_element());
            main.add(element)
        };
        main.add_import(ImportSpec {
            uri: "b.dart".to_string(),
            source: Some(Source::for_file("/b.dart")),
            prefix: Some(prefix),
            combinators: vec![Combinator::Show(vec!["B".to_string()])],
            implicit: false,
        });
        let b = library("/b.dart", &["B", "C"]);
        let mut graph = ElementGraph::new();
        let core = Arc::new(core);
        graph.insert(core.clone());
        graph.insert(Arc::new(b));
        let main = Arc::new(main);
        graph.insert(main.clone());

        let scope = LibraryScope::new(&graph, &main);
        assert_eq!(scope.lookup("int"), main.definitions().get("int").copied());
        assert_eq!(scope.lookup("String"), core.class_named("String"));
        assert!(scope.lookup("B").is_none());
        assert_eq!(scope.prefix("p"), Some(prefix));
        assert!(scope.lookup_prefixed("p", "B").is_some());
        assert!(scope.lookup_prefixed("p", "C").is_none());
    }
}
