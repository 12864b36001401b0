use kestrel_syntax::ast::{Ast, NodeId, NodeKind, Visitor, walk_children};
use kestrel_syntax::diagnostics::{AnalysisError, ErrorCode};
use kestrel_syntax::scanner::TokenId;
use kestrel_syntax::scanner::keywords::KeywordId;
use kestrel_syntax::source::Source;

use super::reachability::always_exits;

/// Produces the hints of one unit: missing returns and dead code.
///
/// Hints only look at structure, so they can run on any parsed unit, resolved or not.
pub struct HintGenerator<'a> {
    ast: &'a Ast,
    source: &'a Source,
    hints: Vec<AnalysisError>,
}

impl<'a> HintGenerator<'a> {
    pub fn new(ast: &'a Ast, source: &'a Source) -> Self {
        Self {
            ast,
            source,
            hints: Vec::new(),
        }
    }

    pub fn generate(mut self) -> Vec<AnalysisError> {
        let ast = self.ast;
        self.visit_unit(ast);
        self.hints
    }

    fn hint(&mut self, offset: usize, length: usize, code: ErrorCode, arguments: &[&str]) {
        self.hints
            .push(AnalysisError::new(Some(self.source.clone()), offset, length, code, arguments));
    }

    /// A block body that can complete normally under a declared, non-`void` return type.
    fn check_return(&mut self, return_type: Option<NodeId>, body: NodeId) {
        let ast = self.ast;
        let Some(return_type) = return_type else {
            return;
        };
        let name = ast.name_of(return_type);
        if name == "void" || name == "dynamic" {
            return;
        }
        let NodeKind::BlockFunctionBody(body) = ast.kind(body) else {
            return;
        };
        if !always_exits(ast, body.block) {
            self.hint(ast.offset(return_type), ast.length(return_type), ErrorCode::MissingReturn, &[&name]);
        }
    }

    /// Statements after one that always exits are reported as a single dead region.
    fn check_dead_code(&mut self, statements: &[NodeId]) {
        let ast = self.ast;
        let Some(exit) = statements.iter().position(|s| always_exits(ast, *s)) else {
            return;
        };
        let dead = &statements[exit + 1..];
        if let (Some(first), Some(last)) = (dead.first(), dead.last()) {
            let offset = ast.offset(*first);
            self.hint(offset, ast.end(*last) - offset, ErrorCode::DeadCode, &[]);
        }
    }
}

impl Visitor for HintGenerator<'_> {
    fn visit_node(&mut self, ast: &Ast, id: NodeId) {
        match ast.kind(id) {
            NodeKind::FunctionDeclaration(function) => {
                if !is_setter(ast, function.property_keyword) {
                    if let NodeKind::FunctionExpression(expression) = ast.kind(function.function_expression) {
                        self.check_return(function.return_type, expression.body);
                    }
                }
            }
            NodeKind::MethodDeclaration(method) => {
                if !is_setter(ast, method.property_keyword) {
                    self.check_return(method.return_type, method.body);
                }
            }
            NodeKind::Block(block) => self.check_dead_code(&block.statements),
            NodeKind::SwitchCase(case) => self.check_dead_code(&case.statements),
            NodeKind::SwitchDefault(default) => self.check_dead_code(&default.statements),
            _ => {}
        }
        walk_children(self, ast, id);
    }
}

fn is_setter(ast: &Ast, property_keyword: Option<TokenId>) -> bool {
    property_keyword.is_some_and(|t| ast.token(t).keyword() == Some(KeywordId::Set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_syntax::diagnostics::NullErrorListener;
    use kestrel_syntax::{parser, scanner};

    fn hints(text: &str) -> Vec<(ErrorCode, String)> {
        let source = Source::for_file("/hints.dart");
        let tokens = scanner::scan_source(&source, text, &mut NullErrorListener);
        let ast = parser::parse(&tokens, &mut NullErrorListener);
        HintGenerator::new(&ast, &source)
            .generate()
            .into_iter()
            .map(|h| (h.code, text[h.offset..h.offset + h.length].to_string()))
            .collect()
    }

    #[test]
    fn test_missing_return() {
        assert_eq!(hints("int f() {}"), vec![(ErrorCode::MissingReturn, "int".to_string())]);
        assert_eq!(hints("int f() { if (c) return 1; else return 2; }"), vec![]);
        assert_eq!(hints("void f() {} g() {} int h() => 1;"), vec![]);
        assert_eq!(
            hints("class A { String get name {} set name(String v) {} }"),
            vec![(ErrorCode::MissingReturn, "String".to_string())]
        );
    }

    #[test]
    fn test_local_functions_are_checked() {
        assert_eq!(
            hints("f() { int g() { } }"),
            vec![(ErrorCode::MissingReturn, "int".to_string())]
        );
    }

    #[test]
    fn test_dead_code_spans_following_statements() {
        assert_eq!(
            hints("f() { return; a(); b(); }"),
            vec![(ErrorCode::DeadCode, "a(); b();".to_string())]
        );
        assert_eq!(hints("f(x) { switch (x) { case 1: throw x; x++; } }").len(), 1);
    }
}
