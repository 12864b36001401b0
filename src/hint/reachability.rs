use kestrel_syntax::ast::{Ast, NodeId, NodeKind};

/// Return `true` if control can never fall through `id`: every path through it returns, throws
/// or evaluates a sub-expression that does.
///
/// The analysis is purely structural. Loops only count when their condition is the literal
/// `true` (or absent, for `for`) and their body exits, since nothing tracks `break`. A `switch`
/// needs a `default` member; `try` depends on its body or its `finally` block, never on the
/// catch clauses.
pub fn always_exits(ast: &Ast, id: NodeId) -> bool {
    let exits = |node: NodeId| always_exits(ast, node);
    let any = |nodes: &[NodeId]| nodes.iter().any(|n| always_exits(ast, *n));
    match ast.kind(id) {
        NodeKind::ReturnStatement(_) | NodeKind::ThrowExpression(_) | NodeKind::RethrowExpression(_) => true,
        NodeKind::Block(block) => any(&block.statements),
        NodeKind::IfStatement(statement) => {
            exits(statement.condition)
                || statement
                    .else_statement
                    .is_some_and(|otherwise| exits(statement.then_statement) && exits(otherwise))
        }
        NodeKind::ConditionalExpression(conditional) => {
            exits(conditional.condition) || (exits(conditional.then_expression) && exits(conditional.else_expression))
        }
        NodeKind::WhileStatement(statement) => {
            exits(statement.condition) || (is_true_literal(ast, statement.condition) && exits(statement.body))
        }
        NodeKind::DoStatement(statement) => exits(statement.body) || exits(statement.condition),
        NodeKind::ForStatement(statement) => {
            let header = statement.variables.is_some_and(exits)
                || statement.initialization.is_some_and(exits)
                || statement.condition.is_some_and(exits)
                || any(&statement.updaters);
            let unconditional = statement.condition.is_none_or(|c| is_true_literal(ast, c));
            header || (unconditional && exits(statement.body))
        }
        NodeKind::ForEachStatement(statement) => exits(statement.iterator),
        NodeKind::SwitchStatement(statement) => exits(statement.expression) || switch_exits(ast, &statement.members),
        NodeKind::TryStatement(statement) => exits(statement.body) || statement.finally_block.is_some_and(exits),
        NodeKind::LabeledStatement(statement) => exits(statement.statement),
        // Bodies of nested functions run later, if at all.
        NodeKind::FunctionExpression(_) | NodeKind::FunctionDeclarationStatement(_) => false,
        NodeKind::ListLiteral(_) | NodeKind::MapLiteral(_) | NodeKind::StringInterpolation(_) => false,
        NodeKind::BreakStatement(_) | NodeKind::ContinueStatement(_) | NodeKind::EmptyStatement(_) => false,
        // Operands, targets, arguments and initializers are all evaluated on the way through.
        _ => ast.children(id).into_iter().any(exits),
    }
}

/// Every member must exit and one of them must be `default`. An empty member falls through
/// into the next one, except at the end of the switch.
fn switch_exits(ast: &Ast, members: &[NodeId]) -> bool {
    let mut has_default = false;
    for (index, &member) in members.iter().enumerate() {
        let statements = match ast.kind(member) {
            NodeKind::SwitchCase(case) => &case.statements,
            NodeKind::SwitchDefault(default) => {
                has_default = true;
                &default.statements
            }
            _ => continue,
        };
        if statements.is_empty() && index + 1 < members.len() {
            continue;
        }
        if !statements.iter().any(|s| always_exits(ast, *s)) {
            return false;
        }
    }
    has_default
}

fn is_true_literal(ast: &Ast, id: NodeId) -> bool {
    matches!(ast.kind(id), NodeKind::BooleanLiteral(literal) if literal.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_syntax::diagnostics::NullErrorListener;
    use kestrel_syntax::{parser, scanner};

    fn exits(text: &str) -> bool {
        let tokens = scanner::scan(text, &mut NullErrorListener);
        let ast = parser::parse_statement(&tokens, &mut NullErrorListener);
        always_exits(&ast, ast.root())
    }

    #[test]
    fn test_blocks_exit_on_any_statement() {
        assert!(exits("{ return 0; }"));
        assert!(exits("{ throw 0; x = null; }"));
        assert!(!exits("{ int i = 0; }"));
    }

    #[test]
    fn test_switch_requires_default() {
        assert!(!exits("switch (i) { case 0: return 0; }"));
        assert!(exits("switch (i) { case 0: case 1: return 0; default: return 1; }"));
        assert!(!exits("switch (i) { case 0: return 0; default: }"));
    }

    #[test]
    fn test_unconditional_for_behaves_like_while_true() {
        assert!(!exits("for (;;) {}"));
        assert!(exits("for (;;) { return 1; }"));
        assert!(exits("for (; true;) { throw ''; }"));
        assert!(!exits("for (; c;) { return 1; }"));
    }
}
