//! Static type inference and the checks that depend on it.
//!
//! Runs after [`bind`](super::visitor::ResolverVisitor::bind) for each node. Member accesses and
//! invocations already received their types while being bound; the remaining expressions get
//! theirs here, and statements check their conditions and returned values.

use kestrel_syntax::ast::{NodeId, NodeKind};
use kestrel_syntax::diagnostics::ErrorCode;
use kestrel_syntax::scanner::{OperatorId, TokenId, TokenKind};

use super::visitor::{ResolutionContext, ResolverVisitor};
use crate::element::{ElementId, ElementKind};
use crate::types::{Member, Type};

impl ResolverVisitor<'_> {
    pub(super) fn infer(&mut self, id: NodeId, context: ResolutionContext) {
        let ast = self.ast;
        let provider = self.provider;
        let ty = match ast.kind(id) {
            NodeKind::IntegerLiteral(_) => provider.int_type(),
            NodeKind::DoubleLiteral(_) => provider.double_type(),
            NodeKind::BooleanLiteral(_) => provider.bool_type(),
            NodeKind::NullLiteral(_) => Type::Bottom,
            NodeKind::SimpleStringLiteral(_) | NodeKind::StringInterpolation(_) | NodeKind::AdjacentStrings(_) => {
                provider.string_type()
            }
            NodeKind::ListLiteral(list) => {
                let mut arguments = self.type_arguments(list.type_arguments);
                provider.list_type(arguments.pop().unwrap_or_default())
            }
            NodeKind::MapLiteral(map) => {
                let mut arguments = self.type_arguments(map.type_arguments).into_iter();
                let key = arguments.next().unwrap_or_default();
                let value = arguments.next().unwrap_or_default();
                provider.map_type(key, value)
            }
            NodeKind::SimpleIdentifier(_) => {
                if self.annotations.static_type(id).is_some() {
                    return;
                }
                let Some(element) = self.annotations.element(id) else {
                    return;
                };
                if !element.is_error()
                    && matches!(
                        self.graph.kind(element),
                        ElementKind::ImportPrefix
                            | ElementKind::Label
                            | ElementKind::Library
                            | ElementKind::CompilationUnit
                    )
                {
                    return;
                }
                self.reference_type(element)
            }
            NodeKind::ParenthesizedExpression(inner) => self.static_type(inner.expression),
            NodeKind::NamedExpression(named) => self.static_type(named.expression),
            NodeKind::ThisExpression(_) => match context.enclosing_class {
                Some(owner) if !context.in_static => self.graph.element(owner).ty.clone(),
                _ => Type::Error,
            },
            NodeKind::SuperExpression(_) => match context.enclosing_class {
                Some(owner) if !context.in_static => self.graph.supertype(owner).cloned().unwrap_or_default(),
                _ => Type::Error,
            },
            NodeKind::AssignmentExpression(assignment) => {
                if ast.token_is(assignment.operator, TokenKind::Operator(OperatorId::Eq)) {
                    let value = self.static_type(assignment.right_hand_side);
                    let target = self.assignment_target_type(assignment.left_hand_side);
                    self.check_assignable(assignment.right_hand_side, &value, &target);
                    value
                } else {
                    self.method_result(id).unwrap_or_default()
                }
            }
            NodeKind::ConditionalExpression(conditional) => {
                self.check_condition(conditional.condition);
                let then_type = self.static_type(conditional.then_expression);
                let else_type = self.static_type(conditional.else_expression);
                self.types().least_upper_bound(&then_type, &else_type)
            }
            NodeKind::BinaryExpression(binary) => self.binary(id, binary.left_operand, binary.operator, binary.right_operand),
            NodeKind::PrefixExpression(prefix) => {
                let operand = self.static_type(prefix.operand);
                match self.operator_id(prefix.operator) {
                    Some(OperatorId::Bang) => {
                        self.check_operand(prefix.operand, "!");
                        provider.bool_type()
                    }
                    Some(OperatorId::Minus) if provider.is_numeric(&operand) => operand,
                    Some(OperatorId::PlusPlus | OperatorId::MinusMinus) => operand,
                    _ => self.method_result(id).unwrap_or_default(),
                }
            }
            NodeKind::PostfixExpression(postfix) => self.static_type(postfix.operand),
            NodeKind::IsExpression(_) => provider.bool_type(),
            NodeKind::AsExpression(cast) => self.static_type(cast.type_name),
            NodeKind::FunctionExpressionInvocation(invocation) => {
                let callee = self.static_type(invocation.function);
                match &callee {
                    Type::Function(function) => function.return_type.clone(),
                    Type::Interface(_) => {
                        self.report(invocation.function, ErrorCode::InvocationOfNonFunction, &["call"]);
                        Type::Dynamic
                    }
                    other if other.is_error() => Type::Error,
                    _ => Type::Dynamic,
                }
            }
            NodeKind::InstanceCreationExpression(creation) => match ast.kind(creation.constructor_name) {
                NodeKind::ConstructorName(name) => self.static_type(name.type_name),
                _ => Type::Dynamic,
            },
            NodeKind::CascadeExpression(cascade) => self.static_type(cascade.target),
            NodeKind::ThrowExpression(_) | NodeKind::RethrowExpression(_) => Type::Bottom,
            NodeKind::FunctionExpression(_) => match self.function_element(id) {
                Some(function) => self.graph.element(function).ty.clone(),
                None => Type::Dynamic,
            },
            NodeKind::IfStatement(statement) => return self.check_condition(statement.condition),
            NodeKind::WhileStatement(statement) => return self.check_condition(statement.condition),
            NodeKind::DoStatement(statement) => return self.check_condition(statement.condition),
            NodeKind::AssertStatement(statement) => return self.check_condition(statement.condition),
            NodeKind::ForStatement(statement) => {
                if let Some(condition) = statement.condition {
                    self.check_condition(condition);
                }
                return;
            }
            NodeKind::ReturnStatement(statement) => {
                if let Some(expression) = statement.expression {
                    self.check_return(expression, context);
                }
                return;
            }
            NodeKind::ExpressionFunctionBody(body) => return self.check_return(body.expression, context),
            NodeKind::VariableDeclaration(variable) => {
                if let (Some(initializer), Some(element)) = (variable.initializer, self.declared(variable.name)) {
                    let declared = self.graph.element(element).ty.clone();
                    let value = self.static_type(initializer);
                    self.check_assignable(initializer, &value, &declared);
                    if self.is_untyped_local(id, element) && !value.is_unknown() && !value.is_bottom() && !value.is_void() {
                        self.inferred_locals.insert(element, value);
                    }
                }
                return;
            }
            NodeKind::ConstructorFieldInitializer(initializer) => {
                let field = self.static_type(initializer.field_name);
                let value = self.static_type(initializer.expression);
                self.check_assignable(initializer.expression, &value, &field);
                return;
            }
            _ => return,
        };
        self.annotations.set_type(id, ty);
    }

    fn type_arguments(&self, list: Option<NodeId>) -> Vec<Type> {
        match list.map(|l| self.ast.kind(l)) {
            Some(NodeKind::TypeArgumentList(arguments)) => {
                arguments.arguments.iter().map(|a| self.static_type(*a)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// A local declared with `var` or `final` and no type annotation.
    fn is_untyped_local(&self, declaration: NodeId, element: ElementId) -> bool {
        if self.graph.kind(element) != ElementKind::LocalVariable {
            return false;
        }
        match self.ast.parent(declaration).map(|list| self.ast.kind(list)) {
            Some(NodeKind::VariableDeclarationList(list)) => list.type_name.is_none(),
            _ => false,
        }
    }

    /// What an `=` assignment stores into: a `var` local still accepts any value.
    fn assignment_target_type(&self, target: NodeId) -> Type {
        match self.annotations.element(target) {
            Some(element) if self.inferred_locals.contains_key(&element) => self.graph.element(element).ty.clone(),
            _ => self.static_type(target),
        }
    }

    /// Return type of the user-defined operator bound to `node`.
    fn method_result(&self, node: NodeId) -> Option<Type> {
        let element = self.annotations.element(node)?;
        let operand = match self.ast.kind(node) {
            NodeKind::BinaryExpression(binary) => binary.left_operand,
            NodeKind::PrefixExpression(prefix) => prefix.operand,
            NodeKind::AssignmentExpression(assignment) => assignment.left_hand_side,
            _ => return None,
        };
        let receiver = self.static_type(operand);
        let types = self.types();
        let owner = types.receiver_interface(&receiver)?;
        let owner = types.as_instance_of(&owner, self.graph.element(element).enclosing?)?;
        let member = Member { element, owner };
        types.member_type(&member).as_function().map(|f| f.return_type.clone())
    }

    fn binary(&mut self, id: NodeId, left: NodeId, operator: TokenId, right: NodeId) -> Type {
        let provider = self.provider;
        let Some(operator) = self.operator_id(operator) else {
            return Type::Dynamic;
        };
        let left_type = self.static_type(left);
        let right_type = self.static_type(right);
        let numeric = provider.is_numeric(&left_type) && provider.is_numeric(&right_type);
        match operator {
            OperatorId::AmpAmp | OperatorId::BarBar => {
                self.check_operand(left, operator.as_str());
                self.check_operand(right, operator.as_str());
                provider.bool_type()
            }
            OperatorId::EqEq | OperatorId::BangEq => provider.bool_type(),
            OperatorId::Lt | OperatorId::Gt | OperatorId::LtEq | OperatorId::GtEq if numeric => provider.bool_type(),
            OperatorId::Slash if numeric => provider.double_type(),
            OperatorId::TildeSlash if numeric => provider.int_type(),
            OperatorId::Plus | OperatorId::Minus | OperatorId::Star | OperatorId::Percent if numeric => {
                if provider.is_int(&left_type) && provider.is_int(&right_type) {
                    provider.int_type()
                } else if provider.is_double(&left_type) || provider.is_double(&right_type) {
                    provider.double_type()
                } else {
                    provider.num_type()
                }
            }
            _ => self.method_result(id).unwrap_or_default(),
        }
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn check_condition(&mut self, condition: NodeId) {
        let ty = self.static_type(condition);
        if !self.types().is_assignable(&ty, &self.provider.bool_type()) {
            self.report(condition, ErrorCode::NonBoolCondition, &[]);
        }
    }

    fn check_operand(&mut self, operand: NodeId, operator: &str) {
        let ty = self.static_type(operand);
        if !self.types().is_assignable(&ty, &self.provider.bool_type()) {
            self.report(operand, ErrorCode::NonBoolOperand, &[operator]);
        }
    }

    fn check_assignable(&mut self, node: NodeId, from: &Type, to: &Type) {
        if !self.types().is_assignable(from, to) {
            let from = self.display(from);
            let to = self.display(to);
            self.report(node, ErrorCode::InvalidAssignment, &[&from, &to]);
        }
    }

    /// A returned value must be assignable to the declared return type of the enclosing function.
    /// Constructors and functions declared `void` or without a return type are not checked.
    fn check_return(&mut self, expression: NodeId, context: ResolutionContext) {
        let Some(function) = context.enclosing_function else {
            return;
        };
        let element = self.graph.element(function);
        if element.kind == ElementKind::Constructor {
            return;
        }
        let Some(declared) = element.ty.as_function().map(|f| f.return_type.clone()) else {
            return;
        };
        if declared.is_unknown() || declared.is_void() {
            return;
        }
        let name = element.name.clone();
        let actual = self.static_type(expression);
        if !self.types().is_assignable(&actual, &declared) {
            let actual = self.display(&actual);
            let declared = self.display(&declared);
            self.report(expression, ErrorCode::ReturnOfInvalidType, &[&actual, &declared, &name]);
        }
    }
}
