// ============================================================================
// Visitor trait for syntax tree traversal
// ============================================================================

use super::{Ast, NodeId, NodeKind};

/// Pre-order traversal over an [`Ast`].
///
/// [`Visitor::visit_node`] dispatches on the node's category; every hook defaults to visiting the
/// node's children, so an implementation only overrides the hooks it cares about and calls
/// [`walk_children`] when it wants to keep descending.
pub trait Visitor {
    fn visit_unit(&mut self, ast: &Ast) {
        self.visit_node(ast, ast.root());
    }

    fn visit_node(&mut self, ast: &Ast, id: NodeId) {
        let kind = ast.kind(id);
        if kind.is_directive() {
            self.visit_directive(ast, id);
        } else if kind.is_statement() {
            self.visit_statement(ast, id);
        } else if kind.is_expression() {
            self.visit_expression(ast, id);
        } else {
            match kind {
                NodeKind::ClassDeclaration(_)
                | NodeKind::TypeAlias(_)
                | NodeKind::FunctionDeclaration(_)
                | NodeKind::TopLevelVariableDeclaration(_) => self.visit_declaration(ast, id),
                NodeKind::FieldDeclaration(_) | NodeKind::MethodDeclaration(_) | NodeKind::ConstructorDeclaration(_) => {
                    self.visit_class_member(ast, id)
                }
                NodeKind::TypeName(_) => self.visit_type_name(ast, id),
                NodeKind::Comment(_) => self.visit_comment(ast, id),
                _ => walk_children(self, ast, id),
            }
        }
    }

    fn visit_directive(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_declaration(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_class_member(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_statement(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_expression(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_type_name(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_comment(&mut self, _ast: &Ast, _id: NodeId) {}
}

/// Visit every child of `id` in source order.
pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, id: NodeId) {
    for child in ast.children(id) {
        visitor.visit_node(ast, child);
    }
}
