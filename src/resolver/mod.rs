//! Semantic resolution.
//!
//! Resolution runs in explicit phases. For a library and everything it imports, elements are
//! first built for every unit (so forward references across files resolve), then declared types
//! are resolved, and only then is each unit walked by the [`ResolverVisitor`](visitor), which
//! binds every reference to an element and infers a static type for every expression.
//!
//! ## Module Structure
//!
//! - `library` - closure of libraries reachable from a root, built in dependency order
//! - `namespace` - export namespaces and the top-level scope of a library
//! - `type_resolver` - declared types of classes, members and variables
//! - `scope` - lexical scopes used while walking a unit
//! - `visitor` - the scoped walk and its resolution context
//! - `element_resolver` - binding identifiers, members, operators and directives
//! - `static_type_analyzer` - expression types and type checks

mod element_resolver;
mod library;
mod namespace;
mod scope;
mod static_type_analyzer;
mod type_resolver;
mod visitor;

use std::sync::Arc;

use kestrel_syntax::ast::{Ast, NodeId};
use kestrel_syntax::diagnostics::AnalysisError;
use kestrel_syntax::source::Source;

pub use library::{LibraryClosure, UnitProvider, build_library_closure, is_part};
pub use namespace::{LibraryScope, Namespace, export_namespace};

use crate::element::{Element, ElementGraph, ElementId, LibraryId};
use crate::error::{AnalysisException, AnalysisResult};
use crate::hint::HintGenerator;
use crate::options::AnalysisOptions;
use crate::types::Type;
use visitor::ResolverVisitor;

/// Element and static type bound to each node of one tree, indexed by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    elements: Vec<Option<ElementId>>,
    types: Vec<Option<Type>>,
}

impl Annotations {
    pub fn new(len: usize) -> Self {
        Self {
            elements: vec![None; len],
            types: vec![None; len],
        }
    }

    pub fn element(&self, id: NodeId) -> Option<ElementId> {
        self.elements.get(id.index()).copied().flatten()
    }

    pub fn static_type(&self, id: NodeId) -> Option<&Type> {
        self.types.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn set_element(&mut self, id: NodeId, element: ElementId) {
        if let Some(slot) = self.elements.get_mut(id.index()) {
            *slot = Some(element);
        }
    }

    pub(crate) fn set_type(&mut self, id: NodeId, ty: Type) {
        if let Some(slot) = self.types.get_mut(id.index()) {
            *slot = Some(ty);
        }
    }
}

/// A compilation unit with every node bound and typed.
#[derive(Debug, Clone)]
pub struct ResolvedUnit {
    pub source: Source,
    /// Library the unit belongs to.
    pub library: LibraryId,
    pub ast: Arc<Ast>,
    pub annotations: Annotations,
    /// Declaration, resolution and (when enabled) hint errors of this unit.
    pub errors: Vec<AnalysisError>,
    /// Elements of the library and everything it depends on.
    pub graph: ElementGraph,
}

impl ResolvedUnit {
    pub fn element_id(&self, node: NodeId) -> Option<ElementId> {
        self.annotations.element(node)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.element_id(node).and_then(|id| self.graph.try_element(id))
    }

    pub fn static_type(&self, node: NodeId) -> Option<&Type> {
        self.annotations.static_type(node)
    }
}

/// Resolve `ast`, the unit `unit_source` of the library `library_source`, against a closure that
/// contains that library.
#[tracing::instrument(skip_all, fields(unit = %unit_source))]
pub fn resolve_unit(
    closure: &LibraryClosure,
    library_source: &Source,
    unit_source: &Source,
    ast: Arc<Ast>,
    options: &AnalysisOptions,
) -> AnalysisResult<ResolvedUnit> {
    let graph = &closure.graph;
    let library = graph
        .library_for(library_source)
        .ok_or_else(|| AnalysisException::NotALibrary(library_source.clone()))?;
    if library.unit_for(unit_source).is_none() {
        return Err(AnalysisException::NotAPartOf {
            unit: unit_source.clone(),
            library: library_source.clone(),
        });
    }

    let scope = LibraryScope::new(graph, library);
    let visitor = ResolverVisitor::new(
        &ast,
        unit_source,
        graph,
        library,
        &scope,
        &closure.type_provider,
        &closure.non_libraries,
        options.analyze_function_bodies,
    );
    let (annotations, resolution_errors) = visitor.resolve();

    let mut errors: Vec<AnalysisError> = library
        .build_errors()
        .iter()
        .filter(|e| e.source.as_ref() == Some(unit_source))
        .cloned()
        .collect();
    errors.extend(resolution_errors);
    if options.hints {
        errors.extend(HintGenerator::new(&ast, unit_source).generate());
    }
    tracing::debug!(errors = errors.len(), "unit resolved");

    Ok(ResolvedUnit {
        source: unit_source.clone(),
        library: library.id(),
        ast,
        annotations,
        errors,
        graph: graph.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, LibraryElement, create_core_library};
    use kestrel_syntax::ast::NodeKind;
    use kestrel_syntax::diagnostics::{ErrorCode, NullErrorListener};
    use kestrel_syntax::{parser, scanner};
    use std::collections::HashMap;

    struct Units {
        units: HashMap<Source, Arc<Ast>>,
        core: Arc<LibraryElement>,
    }

    impl UnitProvider for Units {
        fn unit(&self, source: &Source) -> AnalysisResult<Option<Arc<Ast>>> {
            Ok(self.units.get(source).cloned())
        }

        fn library(&self, source: &Source) -> Option<Arc<LibraryElement>> {
            (*source == Source::library("core")).then(|| self.core.clone())
        }
    }

    fn closure(text: &str) -> (Source, Arc<Ast>, LibraryClosure) {
        let source = Source::for_file("/test.dart");
        let tokens = scanner::scan_source(&source, text, &mut NullErrorListener);
        let ast = Arc::new(parser::parse(&tokens, &mut NullErrorListener));
        let units = Units {
            units: HashMap::from([(source.clone(), ast.clone())]),
            core: Arc::new(create_core_library()),
        };
        let closure = build_library_closure(&units, &source).unwrap();
        (source, ast, closure)
    }

    fn resolve(text: &str) -> ResolvedUnit {
        let (source, ast, closure) = closure(text);
        resolve_unit(&closure, &source, &source, ast, &AnalysisOptions::default().with_hints(false)).unwrap()
    }

    fn codes(unit: &ResolvedUnit) -> Vec<ErrorCode> {
        unit.errors.iter().map(|e| e.code).collect()
    }

    /// Static type of the initializer of the variable named `name`.
    fn initializer_type(unit: &ResolvedUnit, name: &str) -> String {
        let ast = &unit.ast;
        let initializer = ast
            .node_ids()
            .find_map(|id| match ast.kind(id) {
                NodeKind::VariableDeclaration(v) if ast.name_of(v.name) == name => v.initializer,
                _ => None,
            })
            .unwrap();
        unit.static_type(initializer).unwrap().display(&unit.graph)
    }

    #[test]
    fn test_literals_and_numeric_promotion() {
        let unit = resolve(
            "f() { var a = 1 + 2; var b = 1 + 2.0; var c = 4 / 2; var d = 7 ~/ 2; var e = 1 < 2; var s = 'x$a'; }",
        );
        assert_eq!(codes(&unit), vec![]);
        assert_eq!(initializer_type(&unit, "a"), "int");
        assert_eq!(initializer_type(&unit, "b"), "double");
        assert_eq!(initializer_type(&unit, "c"), "double");
        assert_eq!(initializer_type(&unit, "d"), "int");
        assert_eq!(initializer_type(&unit, "e"), "bool");
        assert_eq!(initializer_type(&unit, "s"), "String");
    }

    #[test]
    fn test_members_substitute_type_arguments() {
        let unit = resolve("f(List<String> names) { var first = names[0]; var n = names.length; }");
        assert_eq!(codes(&unit), vec![]);
        assert_eq!(initializer_type(&unit, "first"), "String");
        assert_eq!(initializer_type(&unit, "n"), "int");
    }

    #[test]
    fn test_forward_references_and_locals() {
        let unit = resolve("class A { m() { return helper(x); } int x; } helper(v) => v;");
        assert_eq!(codes(&unit), vec![]);
        let ast = &unit.ast;
        let reference = ast
            .node_ids()
            .find(|id| {
                ast.identifier_name(*id) == Some("x")
                    && matches!(ast.parent(*id).map(|p| ast.kind(p)), Some(NodeKind::ArgumentList(_)))
            })
            .unwrap();
        assert_eq!(unit.element(reference).map(|e| e.kind), Some(ElementKind::Field));
        assert_eq!(unit.static_type(reference).unwrap().display(&unit.graph), "int");
    }

    #[test]
    fn test_binding_errors() {
        let unit = resolve("f() { g(); y; this; while (true) { continue missing; } break; }");
        let mut found = codes(&unit);
        found.sort_by_key(|c| c.name());
        let mut expected = vec![
            ErrorCode::UndefinedIdentifier,
            ErrorCode::UndefinedIdentifier,
            ErrorCode::InvalidReferenceToThis,
            ErrorCode::LabelUndefined,
            ErrorCode::BreakOutsideLoop,
        ];
        expected.sort_by_key(|c| c.name());
        assert_eq!(found, expected);
    }

    #[test]
    fn test_type_errors() {
        let unit = resolve("int f(String s) { if (s) {} int i = s; s.nope; return s; }");
        let mut found = codes(&unit);
        found.sort_by_key(|c| c.name());
        let mut expected = vec![
            ErrorCode::NonBoolCondition,
            ErrorCode::InvalidAssignment,
            ErrorCode::UndefinedGetter,
            ErrorCode::ReturnOfInvalidType,
        ];
        expected.sort_by_key(|c| c.name());
        assert_eq!(found, expected);
    }

    #[test]
    fn test_this_has_the_class_type() {
        let unit = resolve("class A { int x; m() { this.nope; var t = this; var y = this.x; } }");
        assert_eq!(codes(&unit), vec![ErrorCode::UndefinedGetter]);
        assert_eq!(initializer_type(&unit, "t"), "A");
        assert_eq!(initializer_type(&unit, "y"), "int");
    }

    #[test]
    fn test_var_locals_take_the_initializer_type() {
        let unit = resolve(
            "f() { var n = 1; bool flag = n; var s = 'a'; s = 2; var x = null; x.anything; n.nope; var m = n; }",
        );
        let mut found = codes(&unit);
        found.sort_by_key(|c| c.name());
        assert_eq!(found, vec![ErrorCode::InvalidAssignment, ErrorCode::UndefinedGetter]);
        assert_eq!(initializer_type(&unit, "m"), "int");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let text = "class A<T> { T value; A(this.value); T read() => value; } f() => new A<int>(1).read() + 1;";
        let (source, ast, closure) = closure(text);
        let options = AnalysisOptions::default();
        let first = resolve_unit(&closure, &source, &source, ast.clone(), &options).unwrap();
        let second = resolve_unit(&closure, &source, &source, ast, &options).unwrap();
        assert_eq!(first.annotations, second.annotations);
        assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn test_unit_outside_library_is_rejected() {
        let (source, ast, closure) = closure("class A {}");
        let other = Source::for_file("/other.dart");
        let err = resolve_unit(&closure, &source, &other, ast, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisException::NotAPartOf { .. }));
    }
}
