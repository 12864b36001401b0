use std::collections::{HashMap, HashSet};

use kestrel_syntax::ast::{Ast, NodeId, NodeKind};
use kestrel_syntax::diagnostics::{AnalysisError, ErrorCode};
use kestrel_syntax::scanner::keywords::KeywordId;
use kestrel_syntax::source::Source;

use super::Annotations;
use super::namespace::LibraryScope;
use super::scope::{ScopeId, Scopes};
use super::type_resolver::{TypeNameBindings, TypeNames};
use crate::element::{ElementGraph, ElementId, ElementKind, LibraryElement};
use crate::types::{Type, TypeProvider, TypeSystem};

/// Lexical position of the node being resolved.
///
/// Passed by value down the walk: entering a class or function produces a new context and
/// leaving it simply drops back to the caller's copy.
#[derive(Debug, Clone, Copy)]
pub(super) struct ResolutionContext {
    pub(super) scope: ScopeId,
    pub(super) enclosing_class: Option<ElementId>,
    pub(super) enclosing_function: Option<ElementId>,
    pub(super) in_loop: bool,
    pub(super) in_switch: bool,
    /// Inside a static method or factory: `this` is unavailable.
    pub(super) in_static: bool,
}

/// Resolves one compilation unit.
///
/// The walk is bottom-up per node: children first, then element binding
/// ([`bind`](Self::bind)), then type inference ([`infer`](Self::infer)), so a node's inference
/// can rely on the types of its operands. Problems are collected, never raised; a node that
/// cannot be bound gets the error element and type.
pub(super) struct ResolverVisitor<'a> {
    pub(super) ast: &'a Ast,
    pub(super) source: &'a Source,
    pub(super) graph: &'a ElementGraph,
    pub(super) library: &'a LibraryElement,
    pub(super) scope: &'a LibraryScope,
    pub(super) provider: &'a TypeProvider,
    pub(super) non_libraries: &'a HashSet<Source>,
    pub(super) analyze_function_bodies: bool,
    pub(super) scopes: Scopes,
    pub(super) annotations: Annotations,
    /// Static types of `var` locals, taken from their initializers.
    pub(super) inferred_locals: HashMap<ElementId, Type>,
    pub(super) errors: Vec<AnalysisError>,
}

impl<'a> ResolverVisitor<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        ast: &'a Ast,
        source: &'a Source,
        graph: &'a ElementGraph,
        library: &'a LibraryElement,
        scope: &'a LibraryScope,
        provider: &'a TypeProvider,
        non_libraries: &'a HashSet<Source>,
        analyze_function_bodies: bool,
    ) -> Self {
        Self {
            ast,
            source,
            graph,
            library,
            scope,
            provider,
            non_libraries,
            analyze_function_bodies,
            scopes: Scopes::new(),
            annotations: Annotations::new(ast.len()),
            inferred_locals: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub(super) fn resolve(mut self) -> (Annotations, Vec<AnalysisError>) {
        let context = ResolutionContext {
            scope: self.scopes.root(),
            enclosing_class: None,
            enclosing_function: None,
            in_loop: false,
            in_switch: false,
            in_static: false,
        };
        self.visit(self.ast.root(), context);
        (self.annotations, self.errors)
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    pub(super) fn types(&self) -> TypeSystem<'a> {
        TypeSystem::new(self.graph, self.provider)
    }

    pub(super) fn report(&mut self, node: NodeId, code: ErrorCode, arguments: &[&str]) {
        self.errors.push(AnalysisError::new(
            Some(self.source.clone()),
            self.ast.offset(node),
            self.ast.length(node),
            code,
            arguments,
        ));
    }

    /// Element declared by the name at `node`.
    pub(super) fn declared(&self, node: NodeId) -> Option<ElementId> {
        self.library.declared_at(self.source, self.ast.offset(node))
    }

    pub(super) fn static_type(&self, node: NodeId) -> Type {
        self.annotations.static_type(node).cloned().unwrap_or_default()
    }

    /// Display form of a type for messages.
    pub(super) fn display(&self, ty: &Type) -> String {
        ty.display(self.graph)
    }

    /// Element of the function a `FunctionExpression` belongs to: the declaring function, or the
    /// anonymous function element declared at the expression.
    pub(super) fn function_element(&self, expression: NodeId) -> Option<ElementId> {
        match self.ast.parent(expression).map(|p| self.ast.kind(p)) {
            Some(NodeKind::FunctionDeclaration(declaration)) if declaration.function_expression == expression => {
                self.declared(declaration.name)
            }
            _ => self.declared(expression),
        }
    }

    // ========================================================================
    // Walk
    // ========================================================================

    pub(super) fn visit(&mut self, id: NodeId, context: ResolutionContext) {
        let ast = self.ast;
        match ast.kind(id) {
            // Library names are not references; type names are resolved as a whole.
            NodeKind::Comment(_) | NodeKind::LibraryIdentifier(_) => return,
            NodeKind::TypeName(_) => {
                self.type_name(id, context);
                return;
            }
            NodeKind::ClassDeclaration(declaration) => {
                let class = self.declared(declaration.name).unwrap_or(ElementId::ERROR);
                let scope = self.scopes.push_class(context.scope, class);
                for &parameter in &self.graph.element(class).type_parameters {
                    let name = self.graph.element(parameter).name.clone();
                    self.scopes.define(scope, name, parameter);
                }
                let inner = ResolutionContext {
                    scope,
                    enclosing_class: Some(class),
                    enclosing_function: None,
                    in_loop: false,
                    in_switch: false,
                    in_static: false,
                };
                self.visit_children(id, inner);
            }
            NodeKind::MethodDeclaration(method) => {
                let is_static = method
                    .modifier_keyword
                    .is_some_and(|t| ast.token(t).keyword() == Some(KeywordId::Static));
                let inner = self.function_context(context, self.declared(method.name), is_static);
                self.visit_executable(id, method.body, inner);
            }
            NodeKind::ConstructorDeclaration(constructor) => {
                let element = self.declared(constructor.name.unwrap_or(constructor.return_type));
                let inner = self.function_context(context, element, constructor.factory_keyword.is_some());
                for child in ast.children(id) {
                    let is_body = child == constructor.body || constructor.initializers.contains(&child);
                    if !is_body || self.analyze_function_bodies {
                        self.visit(child, inner);
                    }
                }
            }
            NodeKind::FunctionExpression(function) => {
                let inner = self.function_context(context, self.function_element(id), context.in_static);
                self.visit_executable(id, function.body, inner);
            }
            NodeKind::Block(_) | NodeKind::CatchClause(_) => {
                let inner = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    ..context
                };
                self.visit_children(id, inner);
            }
            NodeKind::ForStatement(statement) => {
                let inner = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    ..context
                };
                for child in ast.children(id) {
                    let context = if child == statement.body { loop_body(inner) } else { inner };
                    self.visit(child, context);
                }
            }
            NodeKind::WhileStatement(_) | NodeKind::DoStatement(_) => {
                let body = match ast.kind(id) {
                    NodeKind::WhileStatement(statement) => statement.body,
                    NodeKind::DoStatement(statement) => statement.body,
                    _ => id,
                };
                for child in ast.children(id) {
                    let context = if child == body { loop_body(context) } else { context };
                    self.visit(child, context);
                }
            }
            NodeKind::ForEachStatement(statement) => {
                self.visit(statement.iterator, context);
                let inner = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    ..context
                };
                self.visit(statement.loop_variable, inner);
                self.visit(statement.body, loop_body(inner));
            }
            NodeKind::SwitchStatement(statement) => {
                self.visit(statement.expression, context);
                let inner = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    in_switch: true,
                    ..context
                };
                // Case labels are visible from every case, so `continue` may jump forward.
                for &member in &statement.members {
                    let labels = match ast.kind(member) {
                        NodeKind::SwitchCase(case) => &case.labels,
                        NodeKind::SwitchDefault(default) => &default.labels,
                        _ => continue,
                    };
                    for &label in labels {
                        if let NodeKind::Label(label) = ast.kind(label) {
                            if let Some(element) = self.declared(label.label) {
                                self.scopes.define_label(inner.scope, ast.name_of(label.label), element);
                            }
                        }
                    }
                }
                for &member in &statement.members {
                    self.visit(member, inner);
                }
            }
            NodeKind::SwitchCase(_) | NodeKind::SwitchDefault(_) => {
                let statements = match ast.kind(id) {
                    NodeKind::SwitchCase(case) => &case.statements,
                    NodeKind::SwitchDefault(default) => &default.statements,
                    _ => return,
                };
                let body = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    ..context
                };
                for child in ast.children(id) {
                    let context = if statements.contains(&child) { body } else { context };
                    self.visit(child, context);
                }
            }
            NodeKind::LabeledStatement(_) => {
                let inner = ResolutionContext {
                    scope: self.scopes.push(context.scope),
                    ..context
                };
                self.visit_children(id, inner);
            }
            _ => self.visit_children(id, context),
        }
        self.bind(id, context);
        self.infer(id, context);
    }

    fn visit_children(&mut self, id: NodeId, context: ResolutionContext) {
        for child in self.ast.children(id) {
            self.visit(child, context);
        }
    }

    /// Children of a method or function, skipping `body` unless bodies are analyzed.
    fn visit_executable(&mut self, id: NodeId, body: NodeId, context: ResolutionContext) {
        for child in self.ast.children(id) {
            if child != body || self.analyze_function_bodies {
                self.visit(child, context);
            }
        }
    }

    fn function_context(
        &mut self,
        outer: ResolutionContext,
        function: Option<ElementId>,
        in_static: bool,
    ) -> ResolutionContext {
        ResolutionContext {
            scope: self.scopes.push_function(outer.scope),
            enclosing_function: function,
            in_loop: false,
            in_switch: false,
            in_static,
            ..outer
        }
    }

    // ========================================================================
    // Type names
    // ========================================================================

    fn type_name(&mut self, id: NodeId, context: ResolutionContext) {
        if let Some(ty) = self.constructor_type_name(id, context) {
            self.annotations.set_type(id, ty);
            return;
        }
        let names = TypeNames {
            graph: self.graph,
            scope: self.scope,
            source: self.source,
            ast: self.ast,
        };
        let scopes = &self.scopes;
        let local = |name: &str| scopes.lookup(context.scope, name, |_, _| None);
        let mut bindings = TypeNameBindings::default();
        names.resolve(id, &local, &mut bindings);
        for (node, element) in bindings.elements {
            self.annotations.set_element(node, element);
        }
        for (node, ty) in bindings.types {
            self.annotations.set_type(node, ty);
        }
        self.errors.extend(bindings.errors);
    }

    /// `new A.named()` parses the class and constructor names as one prefixed type name. When the
    /// prefix names a class rather than an import prefix, the type is that class.
    fn constructor_type_name(&mut self, id: NodeId, context: ResolutionContext) -> Option<Type> {
        let ast = self.ast;
        let parent = ast.parent(id)?;
        if !matches!(ast.kind(parent), NodeKind::ConstructorName(_)) {
            return None;
        }
        let NodeKind::TypeName(type_name) = ast.kind(id) else {
            return None;
        };
        let NodeKind::PrefixedIdentifier(prefixed) = ast.kind(type_name.name) else {
            return None;
        };
        let prefix = ast.name_of(prefixed.prefix);
        if self.scope.prefix(&prefix).is_some() {
            return None;
        }
        let class = self
            .scopes
            .lookup(context.scope, &prefix, |_, _| None)
            .or_else(|| self.scope.lookup(&prefix))
            .filter(|c| self.graph.kind(*c) == ElementKind::Class)?;
        self.annotations.set_element(prefixed.prefix, class);
        let arguments = vec![Type::Dynamic; self.graph.element(class).type_parameters.len()];
        Some(Type::interface(class, arguments))
    }
}

fn loop_body(context: ResolutionContext) -> ResolutionContext {
    ResolutionContext {
        in_loop: true,
        ..context
    }
}
