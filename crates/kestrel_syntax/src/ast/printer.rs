//! Canonical source reprinting.
//!
//! Prints the tokens of a subtree in order with normalized spacing: one space between tokens unless
//! the pair is punctuation-tight (`f(x)`, `a.b`, `List<int>`, `-x`, `'a${b}'`). Synthetic tokens
//! and comments are omitted, and list separators are restored from the owning node's kind.

use super::{Ast, NodeId, NodeKind, Part};
use crate::scanner::keywords::KeywordId;
use crate::scanner::{OperatorId, PunctuationId, TokenId, TokenKind};

/// Reprint the subtree rooted at `id`.
pub fn to_source(ast: &Ast, id: NodeId) -> String {
    let mut printer = Printer {
        ast,
        out: String::new(),
        prev: None,
        after_comma: false,
    };
    printer.print(id);
    printer.out
}

struct Printer<'a> {
    ast: &'a Ast,
    out: String,
    /// Last emitted token and the node that owns it.
    prev: Option<(TokenId, NodeId)>,
    after_comma: bool,
}

impl Printer<'_> {
    fn print(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Comment(_) => {}
            NodeKind::FormalParameterList(list) => {
                self.emit(list.left_paren, id);
                let mut opened = false;
                for (i, param) in list.parameters.iter().enumerate() {
                    let optional = matches!(
                        ast.kind(*param),
                        NodeKind::DefaultFormalParameter(p) if p.kind != super::ParameterKind::Required
                    );
                    if i > 0 {
                        self.separator(",");
                    }
                    if optional && !opened {
                        if let Some(delimiter) = list.left_delimiter {
                            self.emit(delimiter, id);
                        }
                        opened = true;
                    }
                    self.print(*param);
                }
                if let Some(delimiter) = list.right_delimiter {
                    self.emit(delimiter, id);
                }
                self.emit(list.right_paren, id);
            }
            _ => {
                for part in ast.parts(id) {
                    match part {
                        Part::Token(token) => self.emit(token, id),
                        Part::Node(child) => self.print(child),
                        Part::List(members) => self.print_list(id, &members),
                    }
                }
            }
        }
    }

    fn print_list(&mut self, owner: NodeId, members: &[NodeId]) {
        let ast = self.ast;
        let separator = match ast.kind(owner) {
            NodeKind::ArgumentList(_)
            | NodeKind::TypeArgumentList(_)
            | NodeKind::TypeParameterList(_)
            | NodeKind::ShowCombinator(_)
            | NodeKind::HideCombinator(_)
            | NodeKind::WithClause(_)
            | NodeKind::ImplementsClause(_)
            | NodeKind::ListLiteral(_)
            | NodeKind::MapLiteral(_)
            | NodeKind::VariableDeclarationList(_)
            | NodeKind::ForStatement(_)
            | NodeKind::ConstructorDeclaration(_) => Some(","),
            NodeKind::LibraryIdentifier(_) => Some("."),
            _ => None,
        };
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                if let Some(separator) = separator {
                    self.separator(separator);
                }
            }
            self.print(*member);
        }
    }

    /// Emit a list separator that has no token of its own.
    fn separator(&mut self, text: &str) {
        self.out.push_str(text);
        self.prev = None;
        self.after_comma = text == ",";
    }

    fn emit(&mut self, token: TokenId, owner: NodeId) {
        let ast = self.ast;
        let lexeme = &ast.token(token).lexeme;
        if lexeme.is_empty() {
            return;
        }
        let space = match self.prev {
            Some((prev, prev_owner)) => self.needs_space(prev, prev_owner, token, owner),
            None => self.after_comma,
        };
        if space && !self.out.is_empty() {
            self.out.push(' ');
        }
        self.out.push_str(lexeme);
        self.prev = Some((token, owner));
        self.after_comma = false;
    }

    fn needs_space(&self, prev: TokenId, prev_owner: NodeId, token: TokenId, owner: NodeId) -> bool {
        let ast = self.ast;
        let p = ast.token(prev).kind;
        let n = ast.token(token).kind;
        let owner_kind = ast.kind(owner);
        let prev_owner_kind = ast.kind(prev_owner);

        // String literal pieces.
        if matches!(
            n,
            TokenKind::StringPart | TokenKind::StringInterpolationExpression | TokenKind::StringInterpolationIdentifier
        ) {
            return false;
        }
        if matches!(
            p,
            TokenKind::StringInterpolationExpression | TokenKind::StringInterpolationIdentifier
        ) {
            return false;
        }
        if n == TokenKind::Punctuation(PunctuationId::CloseCurly)
            && matches!(owner_kind, NodeKind::InterpolationExpression(_))
        {
            return false;
        }

        // Tight punctuation.
        match n {
            TokenKind::Punctuation(
                PunctuationId::Comma
                | PunctuationId::Semicolon
                | PunctuationId::CloseParen
                | PunctuationId::CloseSquare
                | PunctuationId::Period
                | PunctuationId::PeriodPeriod,
            ) => return false,
            TokenKind::Punctuation(PunctuationId::Colon) => {
                return matches!(
                    owner_kind,
                    NodeKind::ConditionalExpression(_) | NodeKind::ConstructorDeclaration(_)
                );
            }
            TokenKind::Punctuation(PunctuationId::CloseCurly)
                if p == TokenKind::Punctuation(PunctuationId::OpenCurly) =>
            {
                return false;
            }
            _ => {}
        }
        if matches!(
            p,
            TokenKind::Punctuation(
                PunctuationId::OpenParen
                    | PunctuationId::OpenSquare
                    | PunctuationId::Period
                    | PunctuationId::PeriodPeriod
            )
        ) {
            return false;
        }
        let braced = |kind: &NodeKind| matches!(kind, NodeKind::FormalParameterList(_) | NodeKind::MapLiteral(_));
        if p == TokenKind::Punctuation(PunctuationId::OpenCurly) && braced(prev_owner_kind) {
            return false;
        }
        if n == TokenKind::Punctuation(PunctuationId::CloseCurly) && braced(owner_kind) {
            return false;
        }

        // Prefix and postfix operators bind to their operand.
        if is_operator(p) && matches!(prev_owner_kind, NodeKind::PrefixExpression(_)) {
            return false;
        }
        if matches!(owner_kind, NodeKind::PostfixExpression(_)) && is_operator(n) {
            return false;
        }
        if n == TokenKind::Operator(OperatorId::Bang) && matches!(owner_kind, NodeKind::IsExpression(_)) {
            return false;
        }

        // Angle brackets of type argument and parameter lists.
        let in_type_list = |kind: &NodeKind| matches!(kind, NodeKind::TypeArgumentList(_) | NodeKind::TypeParameterList(_));
        if p == TokenKind::Operator(OperatorId::Lt) && in_type_list(prev_owner_kind) {
            return false;
        }
        if n == TokenKind::Operator(OperatorId::Gt) && in_type_list(owner_kind) {
            return false;
        }

        // Argument, parameter and type lists directly after what they apply to.
        let opens_list = matches!(
            n,
            TokenKind::Punctuation(PunctuationId::OpenParen | PunctuationId::OpenSquare)
                | TokenKind::Operator(OperatorId::Lt)
        ) && matches!(
            owner_kind,
            NodeKind::ArgumentList(_)
                | NodeKind::FormalParameterList(_)
                | NodeKind::TypeArgumentList(_)
                | NodeKind::TypeParameterList(_)
                | NodeKind::IndexExpression(_)
        );
        let literal_after_type_arguments = matches!(
            n,
            TokenKind::Punctuation(PunctuationId::OpenSquare | PunctuationId::OpenCurly)
        ) && matches!(owner_kind, NodeKind::ListLiteral(_) | NodeKind::MapLiteral(_))
            && p == TokenKind::Operator(OperatorId::Gt);
        if literal_after_type_arguments {
            return false;
        }
        if opens_list {
            let applies = ast.token(prev).is_identifier()
                || matches!(
                    p,
                    TokenKind::Keyword(KeywordId::This | KeywordId::Super)
                        | TokenKind::String
                        | TokenKind::StringPart
                        | TokenKind::Punctuation(PunctuationId::CloseParen | PunctuationId::CloseSquare)
                        | TokenKind::Operator(OperatorId::Gt)
                )
                || (is_operator(p) && matches!(prev_owner_kind, NodeKind::SimpleIdentifier(_)));
            if applies {
                return false;
            }
        }
        true
    }
}

fn is_operator(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Operator(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::GatheringErrorListener;
    use crate::parser;
    use crate::scanner;

    fn reprint(text: &str) -> String {
        let mut listener = GatheringErrorListener::new();
        let tokens = scanner::scan(text, &mut listener);
        let ast = parser::parse(&tokens, &mut listener);
        listener.assert_no_errors();
        to_source(&ast, ast.root())
    }

    #[test]
    fn test_directives() {
        insta::assert_snapshot!(
            reprint("library a.b;\nimport 'x.dart' as p show A, B hide C;\nexport \"y.dart\";\npart 'z.dart';"),
            @r#"library a.b; import 'x.dart' as p show A, B hide C; export "y.dart"; part 'z.dart';"#
        );
    }

    #[test]
    fn test_class_with_members() {
        insta::assert_snapshot!(
            reprint("abstract class A<T extends Object> extends B with C implements D, E {\n  static int x = 1, y;\n  A(this.x, [int z = 0]) : super();\n  int get length => 0;\n  operator [](int i) => i;\n  void m();\n}"),
            @"abstract class A<T extends Object> extends B with C implements D, E { static int x = 1, y; A(this.x, [int z = 0]) : super(); int get length => 0; operator [](int i) => i; void m(); }"
        );
    }

    #[test]
    fn test_statements_and_expressions() {
        insta::assert_snapshot!(
            reprint("f(a, {b: 2}) {\n  for (var i = 0; i < 10; i++) { if (!a) continue; else break; }\n  var m = <String, List<int>>{'k': [1, 2]};\n  return a is! int ? -a : m['k']..add(1)..length;\n}"),
            @"f(a, {b: 2}) { for (var i = 0; i < 10; i++) { if (!a) continue; else break; } var m = <String, List<int>>{'k': [1, 2]}; return a is! int ? -a : m['k']..add(1)..length; }"
        );
    }

    #[test]
    fn test_interpolation_is_glued() {
        insta::assert_snapshot!(
            reprint("var s = 'a${b + 1}c$d' 'e';"),
            @"var s = 'a${b + 1}c$d' 'e';"
        );
    }
}
