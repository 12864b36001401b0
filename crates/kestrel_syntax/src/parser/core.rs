/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type and its top-level `parse_compilation_unit()`.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module.
/// - The parser owns a copy of the token table. Error recovery may insert synthetic tokens at the
///   current position or split and merge the current token; nodes only ever refer to tokens that
///   were already consumed, so those edits never invalidate a recorded [`TokenId`].
/// Deepest nesting of statements, expressions and type arguments the parser descends into.
const MAX_NESTING: usize = 64;

pub struct Parser<'l> {
    ast: Ast,
    pos: usize,
    /// Real tokens consumed so far. Synthetic insertions move `pos` but not this, so loops use it
    /// to detect lack of progress.
    consumed: usize,
    /// Current statement, expression and type nesting.
    depth: usize,
    /// Set after [`MAX_NESTING`] was exceeded; errors are dropped until the nest is left.
    unwinding: bool,
    listener: &'l mut dyn ErrorListener,
}

impl<'l> Parser<'l> {
    /// Create a parser over `tokens`, reporting to `listener`.
    pub fn new(tokens: &TokenStream, listener: &'l mut dyn ErrorListener) -> Self {
        let ast = Ast::new(
            tokens.source.clone(),
            tokens.tokens.clone(),
            tokens.comments.clone(),
            tokens.line_info.clone(),
        );
        Self {
            ast,
            pos: 0,
            consumed: 0,
            depth: 0,
            unwinding: false,
            listener,
        }
    }

    /// Parse the whole stream as a compilation unit.
    pub fn parse_compilation_unit(mut self) -> Ast {
        let begin = self.current();
        let mut directives = Vec::new();
        let mut declarations = Vec::new();
        let mut seen_declaration = false;

        while !self.is_at_end() {
            let start = self.consumed;
            let comment = self.doc_comment();
            if self.is_directive_start() {
                let directive = self.parse_directive(comment);
                if seen_declaration {
                    let offset = self.ast.offset(directive);
                    let length = self.ast.length(directive);
                    self.report_span(ErrorCode::DirectiveAfterDeclaration, offset, length, &[]);
                }
                directives.push(directive);
            } else if let Some(declaration) = self.parse_compilation_unit_member(comment) {
                seen_declaration = true;
                declarations.push(declaration);
            }
            if self.consumed == start {
                self.report_current(ErrorCode::ExpectedExecutable, &[]);
                self.skip_to_declaration_boundary();
            }
        }

        let root = self.ast.alloc(
            CompilationUnit {
                directives,
                declarations,
            },
            begin,
            self.current(),
        );
        self.ast.set_root(root);
        self.ast
    }

    /// Parse the whole stream as a single statement.
    pub fn parse_single_statement(mut self) -> Ast {
        let statement = self.parse_statement();
        self.expect_end();
        self.ast.set_root(statement);
        self.ast
    }

    /// Parse the whole stream as a single expression.
    pub fn parse_single_expression(mut self) -> Ast {
        let expression = self.parse_expression();
        self.expect_end();
        self.ast.set_root(expression);
        self.ast
    }

    fn expect_end(&mut self) {
        if !self.is_at_end() {
            let lexeme = self.peek().lexeme.clone();
            self.report_current(ErrorCode::UnexpectedToken, &[&lexeme]);
        }
    }
}
