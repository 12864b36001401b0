//! Element binding.
//!
//! Every identifier, member access, operator and directive URI is annotated with the element it
//! denotes. Binding runs after a node's children, so receivers already carry their static types
//! when a member is looked up on them.

use kestrel_syntax::ast::{NodeId, NodeKind};
use kestrel_syntax::diagnostics::ErrorCode;
use kestrel_syntax::scanner::{OperatorId, TokenId, TokenKind};

use super::namespace::export_namespace;
use super::visitor::{ResolutionContext, ResolverVisitor};
use crate::element::{ElementId, ElementKind};
use crate::types::Type;

/// How an identifier is used, decided by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Names the element declared by the parent.
    Declaration,
    /// The class name written before a constructor name.
    ConstructorClass,
    /// `as p` in an import.
    ImportPrefix,
    /// A name in `show`/`hide`.
    Combinator,
    /// Target of `break`/`continue`.
    Label,
    /// Bound together with its parent (member names, named arguments).
    Bound,
    Reference,
}

/// Direction of a member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
    Read,
    Write,
    Call,
}

impl ResolverVisitor<'_> {
    pub(super) fn bind(&mut self, id: NodeId, context: ResolutionContext) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::SimpleIdentifier(_) => self.identifier(id, context),
            NodeKind::PrefixedIdentifier(prefixed) => {
                let access = self.access_of(id);
                self.member(id, Some(prefixed.prefix), prefixed.identifier, access);
            }
            NodeKind::PropertyAccess(property) => {
                let access = self.access_of(id);
                self.member(id, property.target, property.property_name, access);
            }
            NodeKind::MethodInvocation(invocation) => {
                if invocation.target.is_some() || invocation.period.is_some() {
                    self.member(id, invocation.target, invocation.method_name, Access::Call);
                } else {
                    self.unqualified_call(id, invocation.method_name);
                }
            }
            NodeKind::IndexExpression(index) => self.index(id, index.target),
            NodeKind::BinaryExpression(binary) => {
                let Some(operator) = self.operator_id(binary.operator) else {
                    return;
                };
                match operator {
                    OperatorId::AmpAmp | OperatorId::BarBar => {}
                    OperatorId::BangEq => self.bind_operator(id, binary.left_operand, "=="),
                    _ => self.bind_operator(id, binary.left_operand, operator.as_str()),
                }
            }
            NodeKind::PrefixExpression(prefix) => match self.operator_id(prefix.operator) {
                Some(OperatorId::Minus) => self.bind_operator(id, prefix.operand, "unary-"),
                Some(OperatorId::Tilde) => self.bind_operator(id, prefix.operand, "~"),
                Some(OperatorId::PlusPlus) => self.bind_operator(id, prefix.operand, "+"),
                Some(OperatorId::MinusMinus) => self.bind_operator(id, prefix.operand, "-"),
                _ => {}
            },
            NodeKind::PostfixExpression(postfix) => match self.operator_id(postfix.operator) {
                Some(OperatorId::PlusPlus) => self.bind_operator(id, postfix.operand, "+"),
                Some(OperatorId::MinusMinus) => self.bind_operator(id, postfix.operand, "-"),
                _ => {}
            },
            NodeKind::AssignmentExpression(assignment) => {
                if let Some(binary) = self.operator_id(assignment.operator).and_then(OperatorId::binary_of_assignment) {
                    self.bind_operator(id, assignment.left_hand_side, binary.as_str());
                }
            }
            NodeKind::ConstructorName(_) => self.constructor_name(id),
            NodeKind::InstanceCreationExpression(creation) => {
                if let Some(constructor) = self.annotations.element(creation.constructor_name) {
                    self.annotations.set_element(id, constructor);
                }
            }
            NodeKind::SuperConstructorInvocation(invocation) => {
                let Some(owner) = context.enclosing_class else {
                    return;
                };
                let Some(superclass) = self.graph.supertype(owner).and_then(Type::element) else {
                    return;
                };
                let name = invocation.constructor_name.map(|n| ast.name_of(n)).unwrap_or_default();
                match self.graph.lookup_constructor(superclass, &name) {
                    Some(constructor) => {
                        self.annotations.set_element(id, constructor);
                        if let Some(name_node) = invocation.constructor_name {
                            self.annotations.set_element(name_node, constructor);
                        }
                    }
                    None => {
                        let class_name = self.graph.element(superclass).name.clone();
                        self.report(
                            invocation.constructor_name.unwrap_or(id),
                            ErrorCode::UndefinedConstructor,
                            &[&class_name, &name],
                        );
                    }
                }
            }
            NodeKind::ConstructorFieldInitializer(initializer) => {
                let name = ast.name_of(initializer.field_name);
                let field = context
                    .enclosing_class
                    .and_then(|owner| self.graph.declared_member(owner, &name))
                    .filter(|f| self.graph.kind(*f) == ElementKind::Field);
                match field {
                    Some(field) => {
                        let ty = self.graph.element(field).ty.clone();
                        self.annotations.set_element(initializer.field_name, field);
                        self.annotations.set_type(initializer.field_name, ty);
                    }
                    None => {
                        self.report(initializer.field_name, ErrorCode::UndefinedIdentifier, &[&name]);
                        self.annotations.set_element(initializer.field_name, ElementId::ERROR);
                    }
                }
            }
            NodeKind::ImportDirective(directive) => self.library_uri(directive.uri),
            NodeKind::ExportDirective(directive) => self.library_uri(directive.uri),
            NodeKind::PartDirective(directive) => self.part_uri(directive.uri),
            NodeKind::ThisExpression(_) | NodeKind::SuperExpression(_) => {
                if context.enclosing_class.is_none() || context.in_static {
                    self.report(id, ErrorCode::InvalidReferenceToThis, &[]);
                }
            }
            NodeKind::BreakStatement(statement) => {
                if statement.label.is_none() && !context.in_loop && !context.in_switch {
                    self.report(id, ErrorCode::BreakOutsideLoop, &[]);
                }
            }
            NodeKind::ContinueStatement(statement) => {
                if statement.label.is_none() && !context.in_loop {
                    self.report(id, ErrorCode::ContinueOutsideLoop, &[]);
                }
            }
            NodeKind::VariableDeclaration(variable) => {
                if let Some(element) = self.declared(variable.name) {
                    if self.graph.kind(element) == ElementKind::LocalVariable {
                        self.scopes.define(context.scope, ast.name_of(variable.name), element);
                    }
                }
            }
            NodeKind::ClassDeclaration(declaration) => self.check_hierarchy(declaration.name),
            NodeKind::ExtendsClause(clause) => {
                let NodeKind::TypeName(type_name) = ast.kind(clause.superclass) else {
                    return;
                };
                let Some(element) = self.annotations.element(type_name.name) else {
                    return;
                };
                if !element.is_error() && self.graph.kind(element) != ElementKind::Class {
                    self.report(clause.superclass, ErrorCode::ExtendsNonClass, &[]);
                }
            }
            _ => {}
        }
    }

    pub(super) fn operator_id(&self, token: TokenId) -> Option<OperatorId> {
        match self.ast.token(token).kind {
            TokenKind::Operator(operator) => Some(operator),
            _ => None,
        }
    }

    /// `Write` for the left-hand side of a plain `=`, `Read` otherwise. Compound assignments read
    /// their target first, so they count as reads.
    pub(super) fn access_of(&self, node: NodeId) -> Access {
        match self.ast.parent(node).map(|p| self.ast.kind(p)) {
            Some(NodeKind::AssignmentExpression(assignment))
                if assignment.left_hand_side == node
                    && self.ast.token_is(assignment.operator, TokenKind::Operator(OperatorId::Eq)) =>
            {
                Access::Write
            }
            _ => Access::Read,
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn role(&self, id: NodeId) -> Role {
        let ast = self.ast;
        let Some(parent) = ast.parent(id) else {
            return Role::Reference;
        };
        match ast.kind(parent) {
            NodeKind::ClassDeclaration(d) if d.name == id => Role::Declaration,
            NodeKind::TypeParameter(d) if d.name == id => Role::Declaration,
            NodeKind::TypeAlias(d) if d.name == id => Role::Declaration,
            NodeKind::FunctionDeclaration(d) if d.name == id => Role::Declaration,
            NodeKind::VariableDeclaration(d) if d.name == id => Role::Declaration,
            NodeKind::MethodDeclaration(d) if d.name == id => Role::Declaration,
            NodeKind::ConstructorDeclaration(d) if d.name == Some(id) => Role::Declaration,
            NodeKind::ConstructorDeclaration(d) if d.return_type == id => Role::ConstructorClass,
            NodeKind::SimpleFormalParameter(d) if d.name == id => Role::Declaration,
            NodeKind::FieldFormalParameter(d) if d.name == id => Role::Declaration,
            NodeKind::DeclaredIdentifier(d) if d.identifier == id => Role::Declaration,
            NodeKind::CatchClause(_) => Role::Declaration,
            NodeKind::Label(_) => match ast.parent(parent).map(|g| ast.kind(g)) {
                Some(NodeKind::NamedExpression(_)) => Role::Bound,
                _ => Role::Declaration,
            },
            NodeKind::ImportDirective(d) if d.prefix == Some(id) => Role::ImportPrefix,
            NodeKind::ShowCombinator(_) | NodeKind::HideCombinator(_) => Role::Combinator,
            NodeKind::BreakStatement(_) | NodeKind::ContinueStatement(_) => Role::Label,
            NodeKind::PrefixedIdentifier(p) if p.identifier == id => Role::Bound,
            NodeKind::PropertyAccess(p) if p.property_name == id => Role::Bound,
            NodeKind::MethodInvocation(m) if m.method_name == id && (m.target.is_some() || m.period.is_some()) => {
                Role::Bound
            }
            NodeKind::ConstructorName(_)
            | NodeKind::SuperConstructorInvocation(_)
            | NodeKind::ConstructorFieldInitializer(_) => Role::Bound,
            _ => Role::Reference,
        }
    }

    fn identifier(&mut self, id: NodeId, context: ResolutionContext) {
        match self.role(id) {
            Role::Declaration => self.declaration(id, context),
            Role::ConstructorClass => {
                if let Some(owner) = context.enclosing_class {
                    self.annotations.set_element(id, owner);
                }
            }
            Role::ImportPrefix => {
                if let Some(prefix) = self.scope.prefix(&self.ast.name_of(id)) {
                    self.annotations.set_element(id, prefix);
                }
            }
            Role::Combinator => self.combinator_name(id),
            Role::Label => {
                let name = self.ast.name_of(id);
                match self.scopes.lookup_label(context.scope, &name) {
                    Some(label) => self.annotations.set_element(id, label),
                    None => {
                        self.report(id, ErrorCode::LabelUndefined, &[&name]);
                        self.annotations.set_element(id, ElementId::ERROR);
                    }
                }
            }
            Role::Bound => {}
            Role::Reference => self.reference(id, context),
        }
    }

    /// Binds a declaring name and makes locals visible from here on.
    fn declaration(&mut self, id: NodeId, context: ResolutionContext) {
        let Some(element) = self.declared(id) else {
            return;
        };
        self.annotations.set_element(id, element);
        let name = self.ast.name_of(id);
        let declared = self.graph.element(element);
        let enclosing_kind = declared.enclosing.map(|e| self.graph.kind(e));
        // Variables become visible once their whole declaration is bound.
        let in_variable = matches!(
            self.ast.parent(id).map(|p| self.ast.kind(p)),
            Some(NodeKind::VariableDeclaration(_))
        );
        match declared.kind {
            ElementKind::Label => self.scopes.define_label(context.scope, name, element),
            ElementKind::LocalVariable if !in_variable => self.scopes.define(context.scope, name, element),
            ElementKind::Parameter if enclosing_kind != Some(ElementKind::TypeAlias) => {
                self.scopes.define(context.scope, name, element)
            }
            ElementKind::Function if enclosing_kind.is_some_and(ElementKind::is_executable) => {
                self.scopes.define(context.scope, name, element)
            }
            _ => {}
        }
    }

    fn lookup(&self, context: ResolutionContext, name: &str) -> Option<ElementId> {
        let graph = self.graph;
        self.scopes
            .lookup(context.scope, name, |owner, name| graph.lookup_member(owner, name))
            .or_else(|| self.scope.lookup(name))
    }

    fn reference(&mut self, id: NodeId, context: ResolutionContext) {
        let name = self.ast.name_of(id);
        let mut found = self.lookup(context, &name);
        let readonly = found.is_none_or(|e| self.graph.kind(e) == ElementKind::Getter);
        if readonly && self.access_of(id) == Access::Write {
            found = self.lookup(context, &format!("{name}=")).or(found);
        }
        match found.or_else(|| self.scope.prefix(&name)) {
            Some(element) => self.annotations.set_element(id, element),
            None => {
                self.report(id, ErrorCode::UndefinedIdentifier, &[&name]);
                self.annotations.set_element(id, ElementId::ERROR);
            }
        }
    }

    /// A `show`/`hide` name is bound when the library exports it; unknown names are ignored.
    fn combinator_name(&mut self, id: NodeId) {
        let ast = self.ast;
        let directive = ast.ancestors(id).find_map(|a| match ast.kind(a) {
            NodeKind::ImportDirective(d) => Some(d.uri),
            NodeKind::ExportDirective(d) => Some(d.uri),
            _ => None,
        });
        let library = directive
            .and_then(|uri| ast.string_value(uri))
            .and_then(|uri| self.source.resolve_relative(&uri))
            .and_then(|source| self.graph.library_for(&source));
        let Some(library) = library else {
            return;
        };
        if let Some(element) = export_namespace(self.graph, library).get(&ast.name_of(id)) {
            self.annotations.set_element(id, *element);
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Binds `target.name` (or a cascade section when `target` is absent).
    fn member(&mut self, node: NodeId, target: Option<NodeId>, name_node: NodeId, access: Access) {
        let name = self.ast.name_of(name_node);
        if let Some(target) = target {
            if let Some(element) = self.annotations.element(target) {
                match self.graph.kind(element) {
                    ElementKind::ImportPrefix => return self.prefixed(node, target, name_node, &name, access),
                    ElementKind::Class => return self.static_member(node, element, name_node, &name, access),
                    _ => {}
                }
            }
        }

        let receiver = self.receiver(node, target);
        let is_super = target.is_some_and(|t| matches!(self.ast.kind(t), NodeKind::SuperExpression(_)));
        let types = self.types();
        let member = match access {
            Access::Write => types.lookup_setter(&receiver, &name),
            Access::Read | Access::Call => types.lookup_member(&receiver, &name),
        };
        match member {
            Some(member) => {
                let read = types.read_type(&member);
                let ty = match access {
                    Access::Read => read.clone(),
                    Access::Write => types.write_type(&member),
                    Access::Call => self.invocation_type(&read, name_node),
                };
                self.bind_member(node, name_node, member.element, ty, read);
            }
            None if types.receiver_interface(&receiver).is_some() => {
                let code = match access {
                    _ if is_super => ErrorCode::UndefinedSuperMethod,
                    Access::Read => ErrorCode::UndefinedGetter,
                    Access::Write => ErrorCode::UndefinedSetter,
                    Access::Call => ErrorCode::UndefinedMethod,
                };
                let receiver = self.display(&receiver);
                self.report(name_node, code, &[&name, &receiver]);
                self.bind_member(node, name_node, ElementId::ERROR, Type::Error, Type::Error);
            }
            None => {
                let ty = if receiver.is_error() { Type::Error } else { Type::Dynamic };
                self.annotations.set_type(node, ty.clone());
                self.annotations.set_type(name_node, ty);
            }
        }
    }

    /// `p.name` through an import prefix.
    fn prefixed(&mut self, node: NodeId, prefix_node: NodeId, name_node: NodeId, name: &str, access: Access) {
        let prefix = self.ast.name_of(prefix_node);
        let mut found = self.scope.lookup_prefixed(&prefix, name);
        if access == Access::Write {
            found = self.scope.lookup_prefixed(&prefix, &format!("{name}=")).or(found);
        }
        match found {
            Some(element) => {
                let read = self.reference_type(element);
                let ty = match access {
                    Access::Call => self.invocation_type(&read, name_node),
                    Access::Write => self.write_type(element),
                    Access::Read => read.clone(),
                };
                self.bind_member(node, name_node, element, ty, read);
            }
            None => {
                self.report(name_node, ErrorCode::UndefinedIdentifier, &[&format!("{prefix}.{name}")]);
                self.bind_member(node, name_node, ElementId::ERROR, Type::Error, Type::Error);
            }
        }
    }

    /// `C.name` naming a static member of class `C`.
    fn static_member(&mut self, node: NodeId, owner: ElementId, name_node: NodeId, name: &str, access: Access) {
        let found = match access {
            Access::Write => self
                .graph
                .declared_member(owner, &format!("{name}="))
                .or_else(|| self.graph.declared_member(owner, name)),
            Access::Read | Access::Call => self.graph.declared_member(owner, name),
        };
        match found {
            Some(element) => {
                let read = self.reference_type(element);
                let ty = match access {
                    Access::Call => self.invocation_type(&read, name_node),
                    Access::Write => self.write_type(element),
                    Access::Read => read.clone(),
                };
                self.bind_member(node, name_node, element, ty, read);
            }
            None => {
                let code = match access {
                    Access::Read => ErrorCode::UndefinedGetter,
                    Access::Write => ErrorCode::UndefinedSetter,
                    Access::Call => ErrorCode::UndefinedMethod,
                };
                let owner_name = self.graph.element(owner).name.clone();
                self.report(name_node, code, &[name, &owner_name]);
                self.bind_member(node, name_node, ElementId::ERROR, Type::Error, Type::Error);
            }
        }
    }

    fn bind_member(&mut self, node: NodeId, name_node: NodeId, element: ElementId, ty: Type, name_ty: Type) {
        self.annotations.set_element(node, element);
        self.annotations.set_element(name_node, element);
        self.annotations.set_type(node, ty);
        self.annotations.set_type(name_node, name_ty);
    }

    /// Static type of the explicit target, or of the enclosing cascade's target.
    fn receiver(&self, node: NodeId, target: Option<NodeId>) -> Type {
        match target {
            Some(target) => self.static_type(target),
            None => self
                .ast
                .ancestors(node)
                .find_map(|a| match self.ast.kind(a) {
                    NodeKind::CascadeExpression(cascade) => Some(self.static_type(cascade.target)),
                    _ => None,
                })
                .unwrap_or_default(),
        }
    }

    /// Result of calling a value of type `callee`.
    pub(super) fn invocation_type(&mut self, callee: &Type, name_node: NodeId) -> Type {
        match callee {
            Type::Function(function) => function.return_type.clone(),
            Type::Error => Type::Error,
            Type::Interface(interface) if self.graph.element(interface.element).name == "Function" => Type::Dynamic,
            Type::Interface(_) | Type::Void => {
                let name = self.ast.name_of(name_node);
                self.report(name_node, ErrorCode::InvocationOfNonFunction, &[&name]);
                Type::Dynamic
            }
            _ => Type::Dynamic,
        }
    }

    /// Type of naming `element` in an expression.
    pub(super) fn reference_type(&self, element: ElementId) -> Type {
        if element.is_error() {
            return Type::Error;
        }
        if let Some(inferred) = self.inferred_locals.get(&element) {
            return inferred.clone();
        }
        let declared = self.graph.element(element);
        match declared.kind {
            ElementKind::Getter => declared.ty.as_function().map(|f| f.return_type.clone()).unwrap_or_default(),
            ElementKind::Setter => declared.ty.as_function().and_then(|f| f.first_parameter().cloned()).unwrap_or_default(),
            ElementKind::Class | ElementKind::TypeAlias | ElementKind::TypeParameter => self.provider.type_type(),
            kind if kind.is_variable() || kind.is_executable() => declared.ty.clone(),
            _ => Type::Dynamic,
        }
    }

    fn write_type(&self, element: ElementId) -> Type {
        match self.graph.kind(element) {
            ElementKind::Setter => self.reference_type(element),
            _ => self.graph.element(element).ty.clone(),
        }
    }

    fn unqualified_call(&mut self, node: NodeId, method_name: NodeId) {
        let Some(element) = self.annotations.element(method_name) else {
            self.annotations.set_type(node, Type::Dynamic);
            return;
        };
        if element.is_error() {
            self.annotations.set_type(node, Type::Error);
            return;
        }
        let callee = self.static_type(method_name);
        let ty = self.invocation_type(&callee, method_name);
        self.annotations.set_element(node, element);
        self.annotations.set_type(node, ty);
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Binds a user-definable operator `name` on the type of `operand`.
    fn bind_operator(&mut self, node: NodeId, operand: NodeId, name: &str) {
        let receiver = self.static_type(operand);
        let types = self.types();
        match types.lookup_member(&receiver, name) {
            Some(member) => self.annotations.set_element(node, member.element),
            None if types.receiver_interface(&receiver).is_some() => {
                let receiver = self.display(&receiver);
                self.report(node, ErrorCode::UndefinedOperator, &[name.trim_start_matches("unary"), &receiver]);
            }
            None => {}
        }
    }

    fn index(&mut self, node: NodeId, target: Option<NodeId>) {
        let receiver = self.receiver(node, target);
        let write = self.access_of(node) == Access::Write;
        let name = if write { "[]=" } else { "[]" };
        let types = self.types();
        match types.lookup_member(&receiver, name) {
            Some(member) => {
                let signature = types.member_type(&member);
                let ty = signature
                    .as_function()
                    .and_then(|f| {
                        if write {
                            f.required.get(1).cloned()
                        } else {
                            Some(f.return_type.clone())
                        }
                    })
                    .unwrap_or_default();
                self.annotations.set_element(node, member.element);
                self.annotations.set_type(node, ty);
            }
            None if types.receiver_interface(&receiver).is_some() => {
                let receiver = self.display(&receiver);
                self.report(node, ErrorCode::UndefinedOperator, &[name, &receiver]);
                self.annotations.set_type(node, Type::Error);
            }
            None => self.annotations.set_type(node, Type::Dynamic),
        }
    }

    // ========================================================================
    // Constructors, directives, hierarchy
    // ========================================================================

    fn constructor_name(&mut self, id: NodeId) {
        let ast = self.ast;
        let NodeKind::ConstructorName(constructor) = ast.kind(id) else {
            return;
        };
        let NodeKind::TypeName(type_name) = ast.kind(constructor.type_name) else {
            return;
        };
        // `new A.named()` arrives as the type name `A.named`.
        let class_prefix = match ast.kind(type_name.name) {
            NodeKind::PrefixedIdentifier(prefixed) => self
                .annotations
                .element(prefixed.prefix)
                .filter(|e| self.graph.kind(*e) == ElementKind::Class)
                .map(|owner| (owner, prefixed.identifier)),
            _ => None,
        };
        let (owner, name_node) = match class_prefix {
            Some((owner, name_node)) => (Some(owner), Some(name_node)),
            None => (self.static_type(constructor.type_name).element(), constructor.name),
        };
        let Some(owner) = owner.filter(|c| self.graph.kind(*c) == ElementKind::Class) else {
            return;
        };
        let name = name_node.map(|n| ast.name_of(n)).unwrap_or_default();
        match self.graph.lookup_constructor(owner, &name) {
            Some(element) => {
                self.annotations.set_element(id, element);
                if let Some(name_node) = name_node {
                    self.annotations.set_element(name_node, element);
                }
            }
            None => {
                let owner_name = self.graph.element(owner).name.clone();
                self.report(
                    name_node.unwrap_or(constructor.type_name),
                    ErrorCode::UndefinedConstructor,
                    &[&owner_name, &name],
                );
            }
        }
    }

    fn library_uri(&mut self, uri_node: NodeId) {
        let Some(uri) = self.ast.string_value(uri_node) else {
            return;
        };
        let target = self.source.resolve_relative(&uri);
        let library = target.as_ref().and_then(|s| self.graph.library_for(s));
        match library {
            Some(library) => {
                let element = library.library_element();
                self.annotations.set_element(uri_node, element);
            }
            None if target.as_ref().is_some_and(|s| self.non_libraries.contains(s)) => {
                self.report(uri_node, ErrorCode::ImportOfNonLibrary, &[&uri]);
            }
            None => self.report(uri_node, ErrorCode::UriDoesNotExist, &[&uri]),
        }
    }

    fn part_uri(&mut self, uri_node: NodeId) {
        let Some(uri) = self.ast.string_value(uri_node) else {
            return;
        };
        let unit = self
            .source
            .resolve_relative(&uri)
            .and_then(|s| self.library.unit_for(&s));
        match unit {
            Some(unit) => self.annotations.set_element(uri_node, unit),
            None => self.report(uri_node, ErrorCode::UriDoesNotExist, &[&uri]),
        }
    }

    /// A class must not reach itself through `extends`, `with` or `implements`.
    fn check_hierarchy(&mut self, name: NodeId) {
        let Some(owner) = self.declared(name) else {
            return;
        };
        let graph = self.graph;
        let direct: Vec<ElementId> = graph
            .supertype(owner)
            .into_iter()
            .chain(graph.mixins(owner))
            .chain(graph.interfaces(owner))
            .filter_map(Type::element)
            .collect();
        let cyclic = direct
            .iter()
            .any(|s| *s == owner || graph.all_supertypes(*s).contains(&owner));
        if cyclic {
            let owner_name = graph.element(owner).name.clone();
            self.report(name, ErrorCode::RecursiveInterfaceInheritance, &[&owner_name]);
        }
    }
}
