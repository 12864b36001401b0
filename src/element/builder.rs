use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kestrel_syntax::ast::{Ast, FormalParameterList, NodeId, NodeKind, ParameterKind, VariableDeclarationList};
use kestrel_syntax::diagnostics::{AnalysisError, ErrorCode};
use kestrel_syntax::scanner::TokenId;
use kestrel_syntax::scanner::keywords::KeywordId;
use kestrel_syntax::source::Source;

use super::{Combinator, Element, ElementId, ElementKind, ExportSpec, ImportSpec, LibraryElement, Modifiers};
use crate::types::Type;

/// One unit being walked.
#[derive(Clone, Copy)]
struct Unit<'a> {
    ast: &'a Ast,
    source: &'a Source,
}

/// Names declared so far in each open block, innermost last.
type LocalScopes = Vec<HashSet<String>>;

/// Collects every declaration of a library into a [`LibraryElement`].
///
/// This is the first resolution phase: it runs over all units of the library (defining unit
/// first, then parts) before any unit is resolved, so a reference in one part can see a
/// declaration in another regardless of order. Types are not resolved here; classes get their
/// own interface type and everything else `dynamic` until the type resolver runs.
///
/// ## Notes
/// - Local variables, local and anonymous functions, labels and catch parameters are built too,
///   so every declaration in the library has a stable element and location.
/// - Duplicate names in one namespace (library, class, parameter list, block) are reported as
///   `DuplicateDefinition` and kept in the build errors of the library.
pub(crate) struct ElementBuilder {
    library: LibraryElement,
    prefixes: HashMap<String, ElementId>,
    errors: Vec<AnalysisError>,
}

impl ElementBuilder {
    pub(crate) fn new(source: &Source) -> Self {
        Self {
            library: LibraryElement::new(source.clone(), ""),
            prefixes: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Build from `units`, defining unit first.
    #[tracing::instrument(skip_all, fields(library = %self.library.source(), units = units.len()))]
    pub(crate) fn build(mut self, units: &[(Source, Arc<Ast>)]) -> LibraryElement {
        for (index, (source, ast)) in units.iter().enumerate() {
            let unit = Unit { ast, source };
            let mut element = Element::new(ElementKind::CompilationUnit, source.short_name());
            element.enclosing = Some(self.library.library_element());
            element.source = Some(source.clone());
            let unit_id = self.library.add(element);
            if index == 0 {
                self.directives(unit, unit_id);
            }
            for &declaration in ast.declarations() {
                self.declaration(unit, unit_id, declaration);
            }
        }
        tracing::debug!(
            elements = self.library.elements().count(),
            errors = self.errors.len(),
            "built library elements"
        );
        self.library.set_build_errors(self.errors);
        self.library
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add(&mut self, unit: Unit<'_>, kind: ElementKind, name: String, offset: usize, parent: ElementId) -> ElementId {
        let mut element = Element::new(kind, name);
        element.enclosing = Some(parent);
        element.source = Some(unit.source.clone());
        element.name_offset = Some(offset);
        self.library.add(element)
    }

    fn add_named(&mut self, unit: Unit<'_>, kind: ElementKind, name: NodeId, parent: ElementId) -> ElementId {
        self.add(unit, kind, unit.ast.name_of(name), unit.ast.offset(name), parent)
    }

    fn modify(&mut self, id: ElementId, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.library.element_mut(id) {
            f(element);
        }
    }

    fn duplicate(&mut self, unit: Unit<'_>, name: NodeId) {
        let text = unit.ast.name_of(name);
        self.errors.push(AnalysisError::new(
            Some(unit.source.clone()),
            unit.ast.offset(name),
            unit.ast.length(name),
            ErrorCode::DuplicateDefinition,
            &[&text],
        ));
    }

    /// Record `key` in `seen`, reporting a duplicate at `name` when it is already there.
    fn check_unique(&mut self, unit: Unit<'_>, seen: &mut HashSet<String>, key: String, name: NodeId) {
        if key.is_empty() || key == "=" {
            return;
        }
        if !seen.insert(key) {
            self.duplicate(unit, name);
        }
    }

    fn check_local(&mut self, unit: Unit<'_>, scopes: &mut LocalScopes, name: NodeId) {
        if let Some(scope) = scopes.last_mut() {
            self.check_unique(unit, scope, unit.ast.name_of(name), name);
        }
    }

    /// Make a top-level element visible library-wide under `key`.
    fn define(&mut self, unit: Unit<'_>, key: String, id: ElementId, name: NodeId) {
        if key.is_empty() || key == "=" {
            return;
        }
        if self.library.definitions().contains_key(&key) {
            self.duplicate(unit, name);
            return;
        }
        self.library.define(key, id);
    }

    fn keyword_modifiers(unit: Unit<'_>, keyword: Option<TokenId>) -> Modifiers {
        let keyword = keyword.and_then(|t| unit.ast.token(t).keyword());
        Modifiers {
            is_final: keyword == Some(KeywordId::Final),
            is_const: keyword == Some(KeywordId::Const),
            ..Modifiers::default()
        }
    }

    // ========================================================================
    // Directives
    // ========================================================================

    fn directives(&mut self, unit: Unit<'_>, unit_id: ElementId) {
        let ast = unit.ast;
        for &directive in ast.directives() {
            match ast.kind(directive) {
                NodeKind::LibraryDirective(library) => {
                    let name = ast.name_of(library.name);
                    let library_element = self.library.library_element();
                    self.modify(library_element, |e| e.name = name);
                }
                NodeKind::ImportDirective(import) => {
                    let uri = ast.string_value(import.uri).unwrap_or_default();
                    let prefix = import.prefix.map(|prefix| self.import_prefix(unit, unit_id, prefix));
                    self.library.add_import(ImportSpec {
                        source: unit.source.resolve_relative(&uri),
                        uri,
                        prefix,
                        combinators: combinators(ast, &import.combinators),
                        implicit: false,
                    });
                }
                NodeKind::ExportDirective(export) => {
                    let uri = ast.string_value(export.uri).unwrap_or_default();
                    self.library.add_export(ExportSpec {
                        source: unit.source.resolve_relative(&uri),
                        uri,
                        combinators: combinators(ast, &export.combinators),
                    });
                }
                _ => {}
            }
        }
    }

    /// Prefix element for `prefix`; imports sharing a prefix share the element.
    fn import_prefix(&mut self, unit: Unit<'_>, unit_id: ElementId, prefix: NodeId) -> ElementId {
        let name = unit.ast.name_of(prefix);
        if let Some(id) = self.prefixes.get(&name) {
            return *id;
        }
        let id = self.add_named(unit, ElementKind::ImportPrefix, prefix, unit_id);
        self.prefixes.insert(name, id);
        id
    }

    // ========================================================================
    // Top-level declarations
    // ========================================================================

    fn declaration(&mut self, unit: Unit<'_>, unit_id: ElementId, declaration: NodeId) {
        let ast = unit.ast;
        match ast.kind(declaration) {
            NodeKind::ClassDeclaration(declaration) => {
                let id = self.add_named(unit, ElementKind::Class, declaration.name, unit_id);
                let is_abstract = declaration.abstract_keyword.is_some();
                self.modify(id, |e| e.modifiers.is_abstract = is_abstract);
                self.define(unit, ast.name_of(declaration.name), id, declaration.name);
                self.type_parameters(unit, declaration.type_parameters, id);

                let mut members = HashSet::new();
                let mut constructors = HashSet::new();
                for &member in &declaration.members {
                    self.class_member(unit, id, member, &mut members, &mut constructors);
                }
                if constructors.is_empty() {
                    let mut constructor = Element::new(ElementKind::Constructor, "");
                    constructor.enclosing = Some(id);
                    constructor.source = Some(unit.source.clone());
                    constructor.modifiers.is_synthetic = true;
                    self.library.add(constructor);
                }
            }
            NodeKind::TypeAlias(alias) => {
                let id = self.add_named(unit, ElementKind::TypeAlias, alias.name, unit_id);
                self.define(unit, ast.name_of(alias.name), id, alias.name);
                self.type_parameters(unit, alias.type_parameters, id);
                let mut scopes = vec![HashSet::new()];
                self.parameters(unit, Some(alias.parameters), id, &mut scopes);
            }
            NodeKind::FunctionDeclaration(function) => {
                let kind = accessor_kind(ast, function.property_keyword).unwrap_or(ElementKind::Function);
                let id = self.add_named(unit, kind, function.name, unit_id);
                let is_external = function.external_keyword.is_some();
                self.modify(id, |e| e.modifiers.is_external = is_external);
                let key = self.lookup_name(id);
                self.define(unit, key, id, function.name);
                let mut scopes = LocalScopes::new();
                self.function_expression(unit, function.function_expression, id, &mut scopes);
            }
            NodeKind::TopLevelVariableDeclaration(declaration) => {
                if let NodeKind::VariableDeclarationList(list) = ast.kind(declaration.variables) {
                    self.variables(unit, list, ElementKind::TopLevelVariable, unit_id, false, None);
                }
            }
            _ => {}
        }
    }

    fn lookup_name(&self, id: ElementId) -> String {
        self.library.element(id).map(Element::lookup_name).unwrap_or_default()
    }

    /// Declare the type parameters of `owner`. A class gets its interface type here, generic or
    /// not.
    fn type_parameters(&mut self, unit: Unit<'_>, list: Option<NodeId>, owner: ElementId) {
        let parameters: &[NodeId] = match list.map(|l| unit.ast.kind(l)) {
            Some(NodeKind::TypeParameterList(list)) => list.parameters.as_slice(),
            _ => &[],
        };
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for &parameter in parameters {
            let NodeKind::TypeParameter(parameter) = unit.ast.kind(parameter) else {
                continue;
            };
            let id = self.add_named(unit, ElementKind::TypeParameter, parameter.name, owner);
            self.modify(id, |e| e.ty = Type::Parameter(id));
            self.check_unique(unit, &mut seen, unit.ast.name_of(parameter.name), parameter.name);
            ids.push(id);
        }
        self.modify(owner, |e| {
            if e.kind == ElementKind::Class {
                e.ty = Type::interface(owner, ids.iter().map(|p| Type::Parameter(*p)).collect());
            }
            e.type_parameters = ids;
        });
    }

    /// Field, top-level or local variables of one declaration list.
    ///
    /// Initializers are walked with the variable itself as the enclosing element, except for
    /// locals whose initializer belongs to the enclosing executable.
    fn variables(
        &mut self,
        unit: Unit<'_>,
        list: &VariableDeclarationList,
        kind: ElementKind,
        parent: ElementId,
        is_static: bool,
        mut class_members: Option<&mut HashSet<String>>,
    ) {
        let ast = unit.ast;
        let modifiers = Modifiers {
            is_static,
            ..Self::keyword_modifiers(unit, list.keyword)
        };
        for &variable in &list.variables {
            let NodeKind::VariableDeclaration(declaration) = ast.kind(variable) else {
                continue;
            };
            let id = self.add_named(unit, kind, declaration.name, parent);
            self.modify(id, |e| e.modifiers = modifiers);
            let name = ast.name_of(declaration.name);
            match class_members.as_deref_mut() {
                Some(members) => self.check_unique(unit, members, name, declaration.name),
                None => self.define(unit, name, id, declaration.name),
            }
            if let Some(initializer) = declaration.initializer {
                let mut scopes = LocalScopes::new();
                self.walk(unit, initializer, id, &mut scopes);
            }
        }
    }

    // ========================================================================
    // Class members
    // ========================================================================

    fn class_member(
        &mut self,
        unit: Unit<'_>,
        owner: ElementId,
        member: NodeId,
        members: &mut HashSet<String>,
        constructors: &mut HashSet<String>,
    ) {
        let ast = unit.ast;
        match ast.kind(member) {
            NodeKind::FieldDeclaration(field) => {
                if let NodeKind::VariableDeclarationList(list) = ast.kind(field.fields) {
                    let is_static = field.static_keyword.is_some();
                    self.variables(unit, list, ElementKind::Field, owner, is_static, Some(members));
                }
            }
            NodeKind::MethodDeclaration(method) => {
                let kind = accessor_kind(ast, method.property_keyword).unwrap_or(ElementKind::Method);
                let mut name = ast.name_of(method.name);
                if method.operator_keyword.is_some() && name == "-" && parameter_count(ast, method.parameters) == 0 {
                    name = "unary-".to_string();
                }
                let id = self.add(unit, kind, name, ast.offset(method.name), owner);
                let modifier = method.modifier_keyword.and_then(|t| ast.token(t).keyword());
                let is_external = method.external_keyword.is_some();
                let has_body = !matches!(ast.kind(method.body), NodeKind::EmptyFunctionBody(_));
                self.modify(id, |e| {
                    e.modifiers.is_static = modifier == Some(KeywordId::Static);
                    e.modifiers.is_abstract = modifier == Some(KeywordId::Abstract) || (!has_body && !is_external);
                    e.modifiers.is_external = is_external;
                });
                let key = self.lookup_name(id);
                self.check_unique(unit, members, key, method.name);
                let mut scopes = vec![HashSet::new()];
                self.parameters(unit, method.parameters, id, &mut scopes);
                self.walk(unit, method.body, id, &mut scopes);
            }
            NodeKind::ConstructorDeclaration(constructor) => {
                let (name, offset) = match constructor.name {
                    Some(name) => (ast.name_of(name), ast.offset(name)),
                    None => (String::new(), ast.offset(constructor.return_type)),
                };
                let id = self.add(unit, ElementKind::Constructor, name.clone(), offset, owner);
                let is_factory = constructor.factory_keyword.is_some();
                let is_const = constructor.const_keyword.is_some();
                let is_external = constructor.external_keyword.is_some();
                self.modify(id, |e| {
                    e.modifiers.is_factory = is_factory;
                    e.modifiers.is_const = is_const;
                    e.modifiers.is_external = is_external;
                });
                if !constructors.insert(name) {
                    self.duplicate(unit, constructor.name.unwrap_or(constructor.return_type));
                }
                let mut scopes = vec![HashSet::new()];
                self.parameters(unit, Some(constructor.parameters), id, &mut scopes);
                for &initializer in &constructor.initializers {
                    self.walk(unit, initializer, id, &mut scopes);
                }
                self.walk(unit, constructor.body, id, &mut scopes);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Executables and locals
    // ========================================================================

    fn parameters(&mut self, unit: Unit<'_>, list: Option<NodeId>, owner: ElementId, scopes: &mut LocalScopes) {
        let ast = unit.ast;
        let Some(NodeKind::FormalParameterList(FormalParameterList { parameters, .. })) = list.map(|l| ast.kind(l))
        else {
            return;
        };
        for &parameter in parameters {
            let (inner, kind, default_value) = match ast.kind(parameter) {
                NodeKind::DefaultFormalParameter(d) => (d.parameter, d.kind, d.default_value),
                _ => (parameter, ParameterKind::Required, None),
            };
            let (name, keyword, initializing) = match ast.kind(inner) {
                NodeKind::SimpleFormalParameter(p) => (p.name, p.keyword, false),
                NodeKind::FieldFormalParameter(p) => (p.name, p.keyword, true),
                _ => continue,
            };
            if let Some(default_value) = default_value {
                self.walk(unit, default_value, owner, scopes);
            }
            let id = self.add_named(unit, ElementKind::Parameter, name, owner);
            let modifiers = Modifiers {
                is_initializing_formal: initializing,
                ..Self::keyword_modifiers(unit, keyword)
            };
            self.modify(id, |e| {
                e.parameter_kind = Some(kind);
                e.modifiers = modifiers;
            });
            self.check_local(unit, scopes, name);
        }
    }

    fn function_expression(&mut self, unit: Unit<'_>, expression: NodeId, owner: ElementId, scopes: &mut LocalScopes) {
        let NodeKind::FunctionExpression(function) = unit.ast.kind(expression) else {
            return;
        };
        scopes.push(HashSet::new());
        self.parameters(unit, function.parameters, owner, scopes);
        self.walk(unit, function.body, owner, scopes);
        scopes.pop();
    }

    fn local(&mut self, unit: Unit<'_>, name: NodeId, modifiers: Modifiers, parent: ElementId, scopes: &mut LocalScopes) {
        let id = self.add_named(unit, ElementKind::LocalVariable, name, parent);
        self.modify(id, |e| e.modifiers = modifiers);
        self.check_local(unit, scopes, name);
    }

    /// Build the local declarations below `id`, owned by the executable `parent`.
    fn walk(&mut self, unit: Unit<'_>, id: NodeId, parent: ElementId, scopes: &mut LocalScopes) {
        let ast = unit.ast;
        match ast.kind(id) {
            NodeKind::Block(block) => {
                scopes.push(HashSet::new());
                for &statement in &block.statements {
                    self.walk(unit, statement, parent, scopes);
                }
                scopes.pop();
            }
            NodeKind::VariableDeclarationList(list) => {
                let modifiers = Self::keyword_modifiers(unit, list.keyword);
                for &variable in &list.variables {
                    let NodeKind::VariableDeclaration(declaration) = ast.kind(variable) else {
                        continue;
                    };
                    if let Some(initializer) = declaration.initializer {
                        self.walk(unit, initializer, parent, scopes);
                    }
                    self.local(unit, declaration.name, modifiers, parent, scopes);
                }
            }
            NodeKind::FunctionDeclaration(function) => {
                let function_id = self.add_named(unit, ElementKind::Function, function.name, parent);
                self.check_local(unit, scopes, function.name);
                self.function_expression(unit, function.function_expression, function_id, scopes);
            }
            NodeKind::FunctionExpression(_) => {
                let function_id = self.add(unit, ElementKind::Function, String::new(), ast.offset(id), parent);
                self.function_expression(unit, id, function_id, scopes);
            }
            NodeKind::ForStatement(_) | NodeKind::SwitchStatement(_) => {
                scopes.push(HashSet::new());
                for child in ast.children(id) {
                    self.walk(unit, child, parent, scopes);
                }
                scopes.pop();
            }
            NodeKind::ForEachStatement(each) => {
                self.walk(unit, each.iterator, parent, scopes);
                scopes.push(HashSet::new());
                if let NodeKind::DeclaredIdentifier(declared) = ast.kind(each.loop_variable) {
                    let modifiers = Self::keyword_modifiers(unit, declared.keyword);
                    self.local(unit, declared.identifier, modifiers, parent, scopes);
                }
                self.walk(unit, each.body, parent, scopes);
                scopes.pop();
            }
            NodeKind::CatchClause(clause) => {
                scopes.push(HashSet::new());
                for name in [clause.exception_parameter, clause.stack_trace_parameter].into_iter().flatten() {
                    self.local(unit, name, Modifiers::default(), parent, scopes);
                }
                self.walk(unit, clause.body, parent, scopes);
                scopes.pop();
            }
            NodeKind::Label(label) => {
                self.add_named(unit, ElementKind::Label, label.label, parent);
            }
            NodeKind::NamedExpression(named) => self.walk(unit, named.expression, parent, scopes),
            _ => {
                for child in ast.children(id) {
                    self.walk(unit, child, parent, scopes);
                }
            }
        }
    }
}

/// `Getter` or `Setter` for a `get`/`set` keyword.
fn accessor_kind(ast: &Ast, keyword: Option<TokenId>) -> Option<ElementKind> {
    match keyword.and_then(|t| ast.token(t).keyword())? {
        KeywordId::Get => Some(ElementKind::Getter),
        KeywordId::Set => Some(ElementKind::Setter),
        _ => None,
    }
}

fn parameter_count(ast: &Ast, list: Option<NodeId>) -> usize {
    match list.map(|l| ast.kind(l)) {
        Some(NodeKind::FormalParameterList(list)) => list.parameters.len(),
        _ => 0,
    }
}

fn combinators(ast: &Ast, nodes: &[NodeId]) -> Vec<Combinator> {
    nodes
        .iter()
        .filter_map(|node| {
            let names = |list: &[NodeId]| list.iter().map(|n| ast.name_of(*n)).collect();
            match ast.kind(*node) {
                NodeKind::ShowCombinator(show) => Some(Combinator::Show(names(&show.names))),
                NodeKind::HideCombinator(hide) => Some(Combinator::Hide(names(&hide.names))),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_syntax::diagnostics::GatheringErrorListener;
    use kestrel_syntax::{parser, scanner};

    fn build(units: &[(&str, &str)]) -> LibraryElement {
        let units: Vec<(Source, Arc<Ast>)> = units
            .iter()
            .map(|(path, text)| {
                let source = Source::for_file(path);
                let mut listener = GatheringErrorListener::new();
                let tokens = scanner::scan_source(&source, text, &mut listener);
                let ast = parser::parse(&tokens, &mut listener);
                listener.assert_no_errors();
                (source, Arc::new(ast))
            })
            .collect();
        ElementBuilder::new(&units[0].0).build(&units)
    }

    fn names(library: &LibraryElement, kind: ElementKind) -> Vec<String> {
        library
            .elements()
            .filter(|(_, e)| e.kind == kind)
            .map(|(_, e)| e.name.clone())
            .collect()
    }

    #[test]
    fn test_collects_declarations_across_parts() {
        let library = build(&[
            ("/lib/a.dart", "library a; part 'b.dart'; class A extends B {} int x = 1;"),
            ("/lib/b.dart", "part of a; class B {} get y => 2; set y(v) {}"),
        ]);
        assert_eq!(library.name(), "a");
        assert_eq!(library.units().len(), 2);
        for key in ["A", "B", "x", "y", "y="] {
            assert!(library.definitions().contains_key(key), "missing {key}");
        }
        assert!(library.build_errors().is_empty());
    }

    #[test]
    fn test_class_members() {
        let library = build(&[(
            "/a.dart",
            "class P<T> { final T x; static int n; P(this.x); P.origin() : x = null; get g => x; \
             set g(v) {} operator -() => this; operator -(o) => this; operator [](i) => x; }",
        )]);
        let p = library.class_named("P").unwrap();
        let element = library.element(p).unwrap();
        assert_eq!(element.type_parameters.len(), 1);
        let member_names: Vec<String> = element
            .children
            .iter()
            .map(|c| library.element(*c).unwrap().lookup_name())
            .collect();
        assert_eq!(member_names, vec!["T", "x", "n", "", "origin", "g", "g=", "unary-", "-", "[]"]);
        let this_x = library
            .elements()
            .find(|(_, e)| e.kind == ElementKind::Parameter && e.name == "x")
            .unwrap()
            .1;
        assert!(this_x.modifiers.is_initializing_formal);
        assert!(library.build_errors().is_empty());
    }

    #[test]
    fn test_synthetic_default_constructor() {
        let library = build(&[("/a.dart", "class A {}")]);
        let a = library.class_named("A").unwrap();
        let constructor = library.element(a).unwrap().children[0];
        let constructor = library.element(constructor).unwrap();
        assert_eq!(constructor.kind, ElementKind::Constructor);
        assert!(constructor.modifiers.is_synthetic);
    }

    #[test]
    fn test_locals_labels_and_closures() {
        let library = build(&[(
            "/a.dart",
            "f(p) { var a = 1; outer: for (var i in p) { try {} catch (e, s) {} } g() {} var h = (q) => q; }",
        )]);
        assert_eq!(names(&library, ElementKind::LocalVariable), vec!["a", "i", "e", "s", "h"]);
        assert_eq!(names(&library, ElementKind::Label), vec!["outer"]);
        assert_eq!(names(&library, ElementKind::Function), vec!["f", "g", ""]);
        assert_eq!(names(&library, ElementKind::Parameter), vec!["p", "q"]);
    }

    #[test]
    fn test_imports_and_prefixes() {
        let library = build(&[(
            "/lib/a.dart",
            "import 'b.dart' as p show X; import 'c.dart' as p hide Y; export 'd.dart';",
        )]);
        assert_eq!(library.imports().len(), 2);
        assert_eq!(library.imports()[0].prefix, library.imports()[1].prefix);
        assert_eq!(library.imports()[0].combinators, vec![Combinator::Show(vec!["X".to_string()])]);
        assert_eq!(library.imports()[1].source, Some(Source::for_file("/lib/c.dart")));
        assert_eq!(library.exports()[0].uri, "d.dart");
    }

    #[test]
    fn test_duplicate_definitions() {
        let library = build(&[
            ("/a.dart", "part 'b.dart'; class A { m() {} m() {} } f(x, x) { var y; var y; }"),
            ("/b.dart", "part of a; var A;"),
        ]);
        let codes: Vec<ErrorCode> = library.build_errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::DuplicateDefinition; 4]);
        let last = &library.build_errors()[3];
        assert_eq!(last.source, Some(Source::for_file("/b.dart")));
        assert_eq!(last.offset, "part of a; var ".len());
    }
}
