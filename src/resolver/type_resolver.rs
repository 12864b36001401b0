//! Declared types.
//!
//! [`TypeNames`] turns a `TypeName` node into a [`Type`]; both the library-wide declaration pass
//! below and the per-unit resolver go through it, so a type annotation means the same thing
//! wherever it is read. [`resolve_library_types`] is the second resolution phase: once every
//! library of a closure has its elements, it fills in supertypes, bounds and the declared types
//! of variables, parameters and executables.

use std::sync::Arc;

use kestrel_syntax::ast::{Ast, ClassDeclaration, NodeId, NodeKind, ParameterKind};
use kestrel_syntax::diagnostics::{AnalysisError, ErrorCode};
use kestrel_syntax::scanner::keywords::KeywordId;
use kestrel_syntax::source::Source;

use super::namespace::LibraryScope;
use crate::element::{ElementGraph, ElementId, ElementKind, LibraryElement, LibraryId};
use crate::types::{FunctionType, Type, TypeProvider};

// ============================================================================
// Type names
// ============================================================================

/// Side results of resolving one type name: the element of every identifier in it, the type of
/// every nested `TypeName` and the problems found.
#[derive(Debug, Default)]
pub(crate) struct TypeNameBindings {
    pub(crate) elements: Vec<(NodeId, ElementId)>,
    pub(crate) types: Vec<(NodeId, Type)>,
    pub(crate) errors: Vec<AnalysisError>,
}

/// Resolves `TypeName` nodes of one unit against a library scope.
pub(crate) struct TypeNames<'a> {
    pub(crate) graph: &'a ElementGraph,
    pub(crate) scope: &'a LibraryScope,
    pub(crate) source: &'a Source,
    pub(crate) ast: &'a Ast,
}

enum Target {
    Void,
    Dynamic,
    Element(ElementId),
    Undefined,
}

impl TypeNames<'_> {
    /// Type written by the `TypeName` node `id`. `local` answers names declared between the
    /// annotation and the library scope (type parameters, local scopes).
    pub(crate) fn resolve(
        &self,
        id: NodeId,
        local: &dyn Fn(&str) -> Option<ElementId>,
        out: &mut TypeNameBindings,
    ) -> Type {
        let NodeKind::TypeName(type_name) = self.ast.kind(id) else {
            return Type::Dynamic;
        };
        let arguments: Vec<Type> = match type_name.type_arguments.map(|a| self.ast.kind(a)) {
            Some(NodeKind::TypeArgumentList(list)) => {
                list.arguments.iter().map(|a| self.resolve(*a, local, out)).collect()
            }
            _ => Vec::new(),
        };
        let name = type_name.name;
        let ty = match self.target(name, local, out) {
            Target::Void => Type::Void,
            Target::Dynamic => Type::Dynamic,
            Target::Element(element) => {
                out.elements.push((name, element));
                self.element_type(name, element, arguments, out)
            }
            Target::Undefined => {
                self.report(out, name, ErrorCode::UndefinedClass, &[&self.ast.name_of(name)]);
                out.elements.push((name, ElementId::ERROR));
                Type::Error
            }
        };
        out.types.push((id, ty.clone()));
        ty
    }

    fn target(&self, name: NodeId, local: &dyn Fn(&str) -> Option<ElementId>, out: &mut TypeNameBindings) -> Target {
        match self.ast.kind(name) {
            NodeKind::SimpleIdentifier(identifier) => {
                let token = self.ast.token(identifier.token);
                match token.keyword() {
                    Some(KeywordId::Void) => return Target::Void,
                    Some(KeywordId::Dynamic) => return Target::Dynamic,
                    _ => {}
                }
                local(&token.lexeme)
                    .or_else(|| self.scope.lookup(&token.lexeme))
                    .map_or(Target::Undefined, Target::Element)
            }
            NodeKind::PrefixedIdentifier(prefixed) => {
                let prefix = self.ast.name_of(prefixed.prefix);
                let Some(prefix_element) = self.scope.prefix(&prefix) else {
                    return Target::Undefined;
                };
                out.elements.push((prefixed.prefix, prefix_element));
                match self.scope.lookup_prefixed(&prefix, &self.ast.name_of(prefixed.identifier)) {
                    Some(element) => {
                        out.elements.push((prefixed.identifier, element));
                        Target::Element(element)
                    }
                    None => Target::Undefined,
                }
            }
            _ => Target::Undefined,
        }
    }

    fn element_type(&self, name: NodeId, element: ElementId, arguments: Vec<Type>, out: &mut TypeNameBindings) -> Type {
        let declaration = self.graph.element(element);
        match declaration.kind {
            ElementKind::Class => {
                let declared = declaration.type_parameters.len();
                let arguments = if arguments.len() == declared {
                    arguments
                } else {
                    if !arguments.is_empty() {
                        self.report(
                            out,
                            name,
                            ErrorCode::WrongNumberOfTypeArguments,
                            &[&self.ast.name_of(name), &declared.to_string(), &arguments.len().to_string()],
                        );
                    }
                    vec![Type::Dynamic; declared]
                };
                Type::interface(element, arguments)
            }
            ElementKind::TypeAlias => declaration.ty.clone(),
            ElementKind::TypeParameter => Type::Parameter(element),
            ElementKind::Dynamic => Type::Dynamic,
            _ => {
                self.report(out, name, ErrorCode::NotAType, &[&self.ast.name_of(name)]);
                Type::Error
            }
        }
    }

    fn report(&self, out: &mut TypeNameBindings, node: NodeId, code: ErrorCode, arguments: &[&str]) {
        out.errors.push(AnalysisError::new(
            Some(self.source.clone()),
            self.ast.offset(node),
            self.ast.length(node),
            code,
            arguments,
        ));
    }
}

// ============================================================================
// Declaration types
// ============================================================================

/// One change to an element's type information.
#[derive(Debug)]
enum TypeUpdate {
    Ty(Type),
    Supertype(Option<Type>),
    Interfaces(Vec<Type>),
    Mixins(Vec<Type>),
    Bound(Type),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Typedefs first: every later annotation may name one.
    Aliases,
    /// Class hierarchy, bounds and variable types.
    Hierarchy,
    /// Executables, parameters and locals; field formals read the field types set before.
    Executables,
}

/// Fill in the declared types of every element of `library`. Problems are not reported here;
/// the unit resolver reports them when it reaches the same annotations.
#[tracing::instrument(skip_all, fields(library = library.0))]
pub(crate) fn resolve_library_types(
    graph: &mut ElementGraph,
    provider: &TypeProvider,
    library: LibraryId,
    units: &[(Source, Arc<Ast>)],
) {
    let Some(element) = graph.library(library).cloned() else {
        return;
    };
    let scope = LibraryScope::new(graph, &element);
    for phase in [Phase::Aliases, Phase::Hierarchy, Phase::Executables] {
        let mut collector = DeclarationTypes {
            graph,
            provider,
            scope: &scope,
            library: &element,
            updates: Vec::new(),
        };
        for (source, ast) in units {
            collector.unit(phase, source, ast);
        }
        let updates = collector.updates;
        tracing::trace!(?phase, updates = updates.len(), "declaration types");
        apply(graph, library, updates);
    }
}

fn apply(graph: &mut ElementGraph, library: LibraryId, updates: Vec<(ElementId, TypeUpdate)>) {
    let Some(library) = graph.library_mut(library) else {
        return;
    };
    for (id, update) in updates {
        let Some(element) = library.element_mut(id) else {
            continue;
        };
        match update {
            TypeUpdate::Ty(ty) => element.ty = ty,
            TypeUpdate::Supertype(ty) => element.supertype = ty,
            TypeUpdate::Interfaces(types) => element.interfaces = types,
            TypeUpdate::Mixins(types) => element.mixins = types,
            TypeUpdate::Bound(ty) => element.bound = Some(ty),
        }
    }
}

/// Where a declaration sits: the unit and the class and type parameters around it.
#[derive(Clone, Copy)]
struct Site<'a> {
    source: &'a Source,
    ast: &'a Ast,
    class: Option<ElementId>,
    type_parameters: &'a [ElementId],
}

struct DeclarationTypes<'a> {
    graph: &'a ElementGraph,
    provider: &'a TypeProvider,
    scope: &'a LibraryScope,
    library: &'a LibraryElement,
    updates: Vec<(ElementId, TypeUpdate)>,
}

impl DeclarationTypes<'_> {
    fn unit(&mut self, phase: Phase, source: &Source, ast: &Ast) {
        let top = Site {
            source,
            ast,
            class: None,
            type_parameters: &[],
        };
        for &declaration in ast.declarations() {
            match (phase, ast.kind(declaration)) {
                (Phase::Aliases, NodeKind::TypeAlias(alias)) => {
                    let Some(element) = self.declared(top, alias.name) else {
                        continue;
                    };
                    let parameters = self.graph.element(element).type_parameters.clone();
                    let site = Site {
                        type_parameters: &parameters,
                        ..top
                    };
                    let function = self.function_type(site, alias.return_type, Some(alias.parameters), Type::Dynamic);
                    self.set(element, TypeUpdate::Ty(Type::function(function)));
                }
                (_, NodeKind::ClassDeclaration(declaration)) => {
                    let Some(element) = self.declared(top, declaration.name) else {
                        continue;
                    };
                    let parameters = self.graph.element(element).type_parameters.clone();
                    let site = Site {
                        class: Some(element),
                        type_parameters: &parameters,
                        ..top
                    };
                    match phase {
                        Phase::Aliases => {}
                        Phase::Hierarchy => {
                            self.hierarchy(site, element, declaration);
                            for &member in &declaration.members {
                                if let NodeKind::FieldDeclaration(field) = ast.kind(member) {
                                    self.variables(site, field.fields);
                                }
                            }
                        }
                        Phase::Executables => {
                            for &member in &declaration.members {
                                self.class_member(site, member);
                            }
                        }
                    }
                }
                (Phase::Hierarchy, NodeKind::TopLevelVariableDeclaration(declaration)) => {
                    self.variables(top, declaration.variables);
                }
                (Phase::Executables, NodeKind::TopLevelVariableDeclaration(declaration)) => {
                    self.initializers(top, declaration.variables);
                }
                (Phase::Executables, NodeKind::FunctionDeclaration(_)) => self.function_declaration(top, declaration),
                _ => {}
            }
        }
    }

    fn set(&mut self, element: ElementId, update: TypeUpdate) {
        self.updates.push((element, update));
    }

    fn declared(&self, site: Site<'_>, name: NodeId) -> Option<ElementId> {
        self.library.declared_at(site.source, site.ast.offset(name))
    }

    fn resolve(&self, site: Site<'_>, type_name: Option<NodeId>) -> Type {
        let Some(type_name) = type_name else {
            return Type::Dynamic;
        };
        let names = TypeNames {
            graph: self.graph,
            scope: self.scope,
            source: site.source,
            ast: site.ast,
        };
        let local = |name: &str| {
            site.type_parameters
                .iter()
                .copied()
                .find(|p| self.graph.element(*p).name == name)
        };
        names.resolve(type_name, &local, &mut TypeNameBindings::default())
    }

    fn interface_types(&self, site: Site<'_>, type_names: &[NodeId]) -> Vec<Type> {
        type_names
            .iter()
            .map(|t| self.resolve(site, Some(*t)))
            .filter(|t| matches!(t, Type::Interface(_)))
            .collect()
    }

    fn hierarchy(&mut self, site: Site<'_>, element: ElementId, declaration: &ClassDeclaration) {
        let ast = site.ast;
        if let Some(NodeKind::TypeParameterList(list)) = declaration.type_parameters.map(|l| ast.kind(l)) {
            for &parameter in &list.parameters {
                let NodeKind::TypeParameter(parameter) = ast.kind(parameter) else {
                    continue;
                };
                if let (Some(id), Some(bound)) = (self.declared(site, parameter.name), parameter.bound) {
                    let bound = self.resolve(site, Some(bound));
                    self.set(id, TypeUpdate::Bound(bound));
                }
            }
        }

        let supertype = if element == self.provider.object_element() {
            None
        } else {
            let written = match declaration.extends_clause.map(|c| ast.kind(c)) {
                Some(NodeKind::ExtendsClause(clause)) => Some(self.resolve(site, Some(clause.superclass))),
                _ => None,
            };
            match written {
                Some(ty @ Type::Interface(_)) => Some(ty),
                _ => Some(self.provider.object_type()),
            }
        };
        self.set(element, TypeUpdate::Supertype(supertype));

        if let Some(NodeKind::WithClause(clause)) = declaration.with_clause.map(|c| ast.kind(c)) {
            let mixins = self.interface_types(site, &clause.mixins);
            self.set(element, TypeUpdate::Mixins(mixins));
        }
        if let Some(NodeKind::ImplementsClause(clause)) = declaration.implements_clause.map(|c| ast.kind(c)) {
            let interfaces = self.interface_types(site, &clause.interfaces);
            self.set(element, TypeUpdate::Interfaces(interfaces));
        }
    }

    /// Declared type of every variable of a declaration list.
    fn variables(&mut self, site: Site<'_>, list: NodeId) {
        let NodeKind::VariableDeclarationList(list) = site.ast.kind(list) else {
            return;
        };
        let ty = self.resolve(site, list.type_name);
        for &variable in &list.variables {
            if let NodeKind::VariableDeclaration(variable) = site.ast.kind(variable) {
                if let Some(element) = self.declared(site, variable.name) {
                    self.set(element, TypeUpdate::Ty(ty.clone()));
                }
            }
        }
    }

    /// Locals declared inside the initializers of a declaration list (closures).
    fn initializers(&mut self, site: Site<'_>, list: NodeId) {
        let NodeKind::VariableDeclarationList(list) = site.ast.kind(list) else {
            return;
        };
        for &variable in &list.variables {
            if let NodeKind::VariableDeclaration(variable) = site.ast.kind(variable) {
                if let Some(initializer) = variable.initializer {
                    self.walk(site, initializer);
                }
            }
        }
    }

    fn class_member(&mut self, site: Site<'_>, member: NodeId) {
        let ast = site.ast;
        match ast.kind(member) {
            NodeKind::FieldDeclaration(field) => self.initializers(site, field.fields),
            NodeKind::MethodDeclaration(method) => {
                let Some(element) = self.declared(site, method.name) else {
                    return;
                };
                let function = self.function_type(site, method.return_type, method.parameters, Type::Dynamic);
                self.set(element, TypeUpdate::Ty(Type::function(function)));
                if let Some(parameters) = method.parameters {
                    self.walk(site, parameters);
                }
                self.walk(site, method.body);
            }
            NodeKind::ConstructorDeclaration(constructor) => {
                let Some(element) = self.declared(site, constructor.name.unwrap_or(constructor.return_type)) else {
                    return;
                };
                let class_type = site.class.map(|c| self.graph.element(c).ty.clone()).unwrap_or_default();
                let function = self.function_type(site, None, Some(constructor.parameters), class_type);
                self.set(element, TypeUpdate::Ty(Type::function(function)));
                self.walk(site, constructor.parameters);
                for &initializer in &constructor.initializers {
                    self.walk(site, initializer);
                }
                self.walk(site, constructor.body);
            }
            _ => {}
        }
    }

    fn function_declaration(&mut self, site: Site<'_>, declaration: NodeId) {
        let ast = site.ast;
        let NodeKind::FunctionDeclaration(function) = ast.kind(declaration) else {
            return;
        };
        let NodeKind::FunctionExpression(expression) = ast.kind(function.function_expression) else {
            return;
        };
        if let Some(element) = self.declared(site, function.name) {
            let ty = self.function_type(site, function.return_type, expression.parameters, Type::Dynamic);
            self.set(element, TypeUpdate::Ty(Type::function(ty)));
        }
        if let Some(parameters) = expression.parameters {
            self.walk(site, parameters);
        }
        self.walk(site, expression.body);
    }

    /// Function type of an executable, setting the type of each of its parameters on the way.
    fn function_type(
        &mut self,
        site: Site<'_>,
        return_type: Option<NodeId>,
        parameters: Option<NodeId>,
        default_return: Type,
    ) -> FunctionType {
        let ast = site.ast;
        let return_type = match return_type {
            Some(_) => self.resolve(site, return_type),
            None => default_return,
        };
        let mut function = FunctionType::returning(return_type);
        let Some(NodeKind::FormalParameterList(list)) = parameters.map(|p| ast.kind(p)) else {
            return function;
        };
        for &parameter in &list.parameters {
            let (inner, kind) = match ast.kind(parameter) {
                NodeKind::DefaultFormalParameter(default) => (default.parameter, default.kind),
                _ => (parameter, ParameterKind::Required),
            };
            let (name, ty) = match ast.kind(inner) {
                NodeKind::SimpleFormalParameter(p) => (p.name, self.resolve(site, p.type_name)),
                NodeKind::FieldFormalParameter(p) => {
                    let ty = match p.type_name {
                        Some(_) => self.resolve(site, p.type_name),
                        None => self.field_type(site, &ast.name_of(p.name)),
                    };
                    (p.name, ty)
                }
                _ => continue,
            };
            if let Some(element) = self.declared(site, name) {
                self.set(element, TypeUpdate::Ty(ty.clone()));
            }
            match kind {
                ParameterKind::Required => function.required.push(ty),
                ParameterKind::Positional => function.positional.push(ty),
                ParameterKind::Named => function.named.push((ast.name_of(name), ty)),
            }
        }
        function
    }

    fn field_type(&self, site: Site<'_>, name: &str) -> Type {
        site.class
            .and_then(|class| self.graph.declared_member(class, name))
            .map(|field| self.graph.element(field))
            .filter(|field| field.kind == ElementKind::Field)
            .map(|field| field.ty.clone())
            .unwrap_or_default()
    }

    /// Types of the local declarations below `id`.
    fn walk(&mut self, site: Site<'_>, id: NodeId) {
        let ast = site.ast;
        match ast.kind(id) {
            NodeKind::VariableDeclarationList(_) => {
                self.variables(site, id);
                self.initializers(site, id);
            }
            NodeKind::DeclaredIdentifier(declared) => {
                if let Some(element) = self.declared(site, declared.identifier) {
                    let ty = self.resolve(site, declared.type_name);
                    self.set(element, TypeUpdate::Ty(ty));
                }
            }
            NodeKind::CatchClause(clause) => {
                if let Some(element) = clause.exception_parameter.and_then(|p| self.declared(site, p)) {
                    let ty = self.resolve(site, clause.exception_type);
                    self.set(element, TypeUpdate::Ty(ty));
                }
                if let Some(element) = clause.stack_trace_parameter.and_then(|p| self.declared(site, p)) {
                    self.set(element, TypeUpdate::Ty(self.provider.stack_trace_type()));
                }
                self.walk(site, clause.body);
            }
            NodeKind::FunctionDeclaration(_) => self.function_declaration(site, id),
            NodeKind::FunctionExpression(expression) => {
                if let Some(element) = self.library.declared_at(site.source, ast.offset(id)) {
                    let ty = self.function_type(site, None, expression.parameters, Type::Dynamic);
                    self.set(element, TypeUpdate::Ty(Type::function(ty)));
                }
                if let Some(parameters) = expression.parameters {
                    self.walk(site, parameters);
                }
                self.walk(site, expression.body);
            }
            _ => {
                for child in ast.children(id) {
                    self.walk(site, child);
                }
            }
        }
    }
}
