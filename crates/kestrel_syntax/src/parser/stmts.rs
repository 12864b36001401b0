/// Statement parsing methods.
///
/// This chunk implements statement-level grammar:
/// - Blocks, labeled statements and expression statements
/// - Local variable and local function declarations
/// - Control flow: `if`, `while`, `do`, `for`, `for-in`, `switch`, `try`
/// - Jumps: `return`, `break`, `continue`, and `assert`
impl<'l> Parser<'l> {
    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> NodeId {
        let begin = self.current();
        let left_brace = self.expect_punct(PunctuationId::OpenCurly);
        let mut statements = Vec::new();
        while !self.check_punct(PunctuationId::CloseCurly) && !self.is_at_end() {
            let start = self.consumed;
            statements.push(self.parse_statement());
            if self.consumed == start {
                let lexeme = self.peek().lexeme.clone();
                self.report_current(ErrorCode::UnexpectedToken, &[&lexeme]);
                self.advance();
            }
        }
        let right_brace = self.expect_punct(PunctuationId::CloseCurly);
        self.finish(
            Block {
                left_brace,
                statements,
                right_brace,
            },
            begin,
        )
    }

    fn parse_statement(&mut self) -> NodeId {
        self.nested(Self::synthetic_empty_statement, Self::parse_statement_unguarded)
    }

    fn parse_statement_unguarded(&mut self) -> NodeId {
        let begin = self.current();
        let labels = self.parse_labels();
        let statement = self.parse_non_labeled_statement();
        if labels.is_empty() {
            return statement;
        }
        self.finish(LabeledStatement { labels, statement }, begin)
    }

    /// `name:` prefixes of a statement or switch member.
    fn parse_labels(&mut self) -> NodeList {
        let mut labels = Vec::new();
        while self.check_identifier() && self.peek_at(1).kind.is_punctuation(PunctuationId::Colon) {
            let begin = self.current();
            let label = self.parse_simple_identifier();
            let colon = self.advance();
            labels.push(self.finish(Label { label, colon }, begin));
        }
        labels
    }

    fn parse_non_labeled_statement(&mut self) -> NodeId {
        match self.peek_kind() {
            TokenKind::Punctuation(PunctuationId::OpenCurly) => return self.parse_block(),
            TokenKind::Punctuation(PunctuationId::Semicolon) => {
                let begin = self.current();
                let semicolon = self.advance();
                return self.finish(EmptyStatement { semicolon }, begin);
            }
            TokenKind::Keyword(KeywordId::If) => return self.parse_if_statement(),
            TokenKind::Keyword(KeywordId::While) => return self.parse_while_statement(),
            TokenKind::Keyword(KeywordId::Do) => return self.parse_do_statement(),
            TokenKind::Keyword(KeywordId::For) => return self.parse_for_statement(),
            TokenKind::Keyword(KeywordId::Switch) => return self.parse_switch_statement(),
            TokenKind::Keyword(KeywordId::Try) => return self.parse_try_statement(),
            TokenKind::Keyword(KeywordId::Return) => return self.parse_return_statement(),
            TokenKind::Keyword(KeywordId::Break) => return self.parse_break_statement(),
            TokenKind::Keyword(KeywordId::Continue) => return self.parse_continue_statement(),
            TokenKind::Keyword(KeywordId::Assert) => return self.parse_assert_statement(),
            TokenKind::Keyword(KeywordId::Var | KeywordId::Final) => return self.parse_variable_declaration_statement(),
            TokenKind::Keyword(KeywordId::Const) if self.is_const_declaration() => {
                return self.parse_variable_declaration_statement();
            }
            TokenKind::Keyword(KeywordId::Void) => return self.parse_local_function(),
            _ => {}
        }

        if self.is_type_then_name() {
            let after = self.skip_type(self.pos).unwrap_or(self.pos);
            if self.is_function_at(after + 1) {
                return self.parse_local_function();
            }
            return self.parse_variable_declaration_statement();
        }
        if self.is_declared_name_at(self.pos) && self.is_function_at(self.pos + 1) {
            return self.parse_local_function();
        }
        if self.is_at_expression_start() {
            let begin = self.current();
            let expression = self.parse_expression();
            let semicolon = self.expect_punct(PunctuationId::Semicolon);
            return self.finish(ExpressionStatement { expression, semicolon }, begin);
        }

        self.report_current(ErrorCode::MissingStatement, &[]);
        if !self.check_punct(PunctuationId::CloseCurly) && !self.is_at_end() {
            self.advance();
        }
        let begin = self.current();
        let semicolon = self.insert_synthetic(TokenKind::Punctuation(PunctuationId::Semicolon));
        self.finish(EmptyStatement { semicolon }, begin)
    }

    /// `const` starting a declaration rather than `const T(...)` or a const collection.
    fn is_const_declaration(&self) -> bool {
        let at = self.pos + 1;
        self.is_type_then_name_at(at)
            || (self.is_declared_name_at(at)
                && !matches!(
                    self.kind_at(at + 1),
                    TokenKind::Punctuation(PunctuationId::OpenParen | PunctuationId::Period)
                        | TokenKind::Operator(OperatorId::Lt)
                ))
    }

    fn parse_variable_declaration_statement(&mut self) -> NodeId {
        let begin = self.current();
        let variables = self.parse_variable_declaration_list();
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(VariableDeclarationStatement { variables, semicolon }, begin)
    }

    fn parse_local_function(&mut self) -> NodeId {
        let begin = self.current();
        let has_return_type = self.check_keyword(KeywordId::Void) || self.is_type_then_name();
        let return_type = has_return_type.then(|| self.parse_return_type());
        let function_declaration = self.parse_function_declaration(None, None, return_type, begin);
        self.finish(FunctionDeclarationStatement { function_declaration }, begin)
    }

    fn parse_if_statement(&mut self) -> NodeId {
        let begin = self.current();
        let if_keyword = self.advance();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let condition = self.parse_expression();
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let then_statement = self.parse_statement();
        let (else_keyword, else_statement) = match self.match_keyword(KeywordId::Else) {
            Some(keyword) => (Some(keyword), Some(self.parse_statement())),
            None => (None, None),
        };
        self.finish(
            IfStatement {
                if_keyword,
                left_paren,
                condition,
                right_paren,
                then_statement,
                else_keyword,
                else_statement,
            },
            begin,
        )
    }

    fn parse_while_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let condition = self.parse_expression();
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let body = self.parse_statement();
        self.finish(
            WhileStatement {
                keyword,
                left_paren,
                condition,
                right_paren,
                body,
            },
            begin,
        )
    }

    fn parse_do_statement(&mut self) -> NodeId {
        let begin = self.current();
        let do_keyword = self.advance();
        let body = self.parse_statement();
        let while_keyword = self.expect_keyword(KeywordId::While);
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let condition = self.parse_expression();
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            DoStatement {
                do_keyword,
                body,
                while_keyword,
                left_paren,
                condition,
                right_paren,
                semicolon,
            },
            begin,
        )
    }

    fn parse_for_statement(&mut self) -> NodeId {
        let begin = self.current();
        let for_keyword = self.advance();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);

        if self.is_for_each() {
            let variable_begin = self.current();
            let keyword = if self.check_keyword(KeywordId::Var)
                || self.check_keyword(KeywordId::Final)
                || self.check_keyword(KeywordId::Const)
            {
                Some(self.advance())
            } else {
                None
            };
            let type_name = self.is_type_then_name().then(|| self.parse_type_name());
            let identifier = self.parse_simple_identifier();
            let loop_variable = if keyword.is_some() || type_name.is_some() {
                self.finish(
                    DeclaredIdentifier {
                        keyword,
                        type_name,
                        identifier,
                    },
                    variable_begin,
                )
            } else {
                identifier
            };
            let in_keyword = self.expect_keyword(KeywordId::In);
            let iterator = self.parse_expression();
            let right_paren = self.expect_punct(PunctuationId::CloseParen);
            let body = self.parse_statement();
            return self.finish(
                ForEachStatement {
                    for_keyword,
                    left_paren,
                    loop_variable,
                    in_keyword,
                    iterator,
                    right_paren,
                    body,
                },
                begin,
            );
        }

        let mut variables = None;
        let mut initialization = None;
        if self.check_keyword(KeywordId::Var)
            || self.check_keyword(KeywordId::Final)
            || self.check_keyword(KeywordId::Const)
            || self.is_type_then_name()
        {
            variables = Some(self.parse_variable_declaration_list());
        } else if !self.check_punct(PunctuationId::Semicolon) {
            initialization = Some(self.parse_expression());
        }
        let left_separator = self.expect_punct(PunctuationId::Semicolon);
        let condition = (!self.check_punct(PunctuationId::Semicolon)).then(|| self.parse_expression());
        let right_separator = self.expect_punct(PunctuationId::Semicolon);
        let mut updaters = Vec::new();
        if !self.check_punct(PunctuationId::CloseParen) {
            loop {
                updaters.push(self.parse_expression());
                if self.match_punct(PunctuationId::Comma).is_none() {
                    break;
                }
            }
        }
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let body = self.parse_statement();
        self.finish(
            ForStatement {
                for_keyword,
                left_paren,
                variables,
                initialization,
                left_separator,
                condition,
                right_separator,
                updaters,
                right_paren,
                body,
            },
            begin,
        )
    }

    /// After `for (`: `[var|final|const] [T] name in`.
    fn is_for_each(&self) -> bool {
        let mut idx = self.pos;
        if matches!(
            self.kind_at(idx),
            TokenKind::Keyword(KeywordId::Var | KeywordId::Final | KeywordId::Const)
        ) {
            idx += 1;
        }
        if self.is_type_then_name_at(idx) {
            idx = self.skip_type(idx).unwrap_or(idx);
        }
        self.is_declared_name_at(idx) && self.kind_at(idx + 1).is_keyword(KeywordId::In)
    }

    fn parse_switch_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let expression = self.parse_expression();
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let left_brace = self.expect_punct(PunctuationId::OpenCurly);

        let mut members = Vec::new();
        let mut default_seen = false;
        while !self.check_punct(PunctuationId::CloseCurly) && !self.is_at_end() {
            let member_begin = self.current();
            let labels = self.parse_labels();
            if let Some(case_keyword) = self.match_keyword(KeywordId::Case) {
                if default_seen {
                    self.report(ErrorCode::SwitchHasCaseAfterDefaultCase, case_keyword, &[]);
                }
                let case_expression = self.parse_expression();
                let colon = self.expect_punct(PunctuationId::Colon);
                let statements = self.parse_switch_statements();
                members.push(self.finish(
                    SwitchCase {
                        labels,
                        keyword: case_keyword,
                        expression: case_expression,
                        colon,
                        statements,
                    },
                    member_begin,
                ));
            } else if let Some(default_keyword) = self.match_keyword(KeywordId::Default) {
                if default_seen {
                    self.report(ErrorCode::SwitchHasMultipleDefaultCases, default_keyword, &[]);
                }
                default_seen = true;
                let colon = self.expect_punct(PunctuationId::Colon);
                let statements = self.parse_switch_statements();
                members.push(self.finish(
                    SwitchDefault {
                        labels,
                        keyword: default_keyword,
                        colon,
                        statements,
                    },
                    member_begin,
                ));
            } else {
                self.report_current(ErrorCode::ExpectedCaseOrDefault, &[]);
                while !self.is_at_end()
                    && !self.check_keyword(KeywordId::Case)
                    && !self.check_keyword(KeywordId::Default)
                    && !self.check_punct(PunctuationId::CloseCurly)
                {
                    self.advance();
                }
            }
        }
        let right_brace = self.expect_punct(PunctuationId::CloseCurly);
        self.finish(
            SwitchStatement {
                keyword,
                left_paren,
                expression,
                right_paren,
                left_brace,
                members,
                right_brace,
            },
            begin,
        )
    }

    /// Statements of one switch member, up to the next `case`, `default`, label or `}`.
    fn parse_switch_statements(&mut self) -> NodeList {
        let mut statements = Vec::new();
        loop {
            if self.is_at_end()
                || self.check_keyword(KeywordId::Case)
                || self.check_keyword(KeywordId::Default)
                || self.check_punct(PunctuationId::CloseCurly)
            {
                return statements;
            }
            if self.is_switch_member_label() {
                return statements;
            }
            let start = self.consumed;
            statements.push(self.parse_statement());
            if self.consumed == start {
                let lexeme = self.peek().lexeme.clone();
                self.report_current(ErrorCode::UnexpectedToken, &[&lexeme]);
                self.advance();
            }
        }
    }

    /// `label: case` or `label: default` (possibly several labels).
    fn is_switch_member_label(&self) -> bool {
        let mut idx = self.pos;
        while self.token_at(idx).is_identifier() && self.kind_at(idx + 1).is_punctuation(PunctuationId::Colon) {
            idx += 2;
        }
        idx > self.pos
            && matches!(
                self.kind_at(idx),
                TokenKind::Keyword(KeywordId::Case | KeywordId::Default)
            )
    }

    fn parse_try_statement(&mut self) -> NodeId {
        let begin = self.current();
        let try_keyword = self.advance();
        let body = self.parse_block();
        let mut catch_clauses = Vec::new();
        while self.check_keyword(KeywordId::On) || self.check_keyword(KeywordId::Catch) {
            catch_clauses.push(self.parse_catch_clause());
        }
        let (finally_keyword, finally_block) = match self.match_keyword(KeywordId::Finally) {
            Some(keyword) => (Some(keyword), Some(self.parse_block())),
            None => (None, None),
        };
        if catch_clauses.is_empty() && finally_block.is_none() {
            self.report_current(ErrorCode::MissingCatchOrFinally, &[]);
        }
        self.finish(
            TryStatement {
                try_keyword,
                body,
                catch_clauses,
                finally_keyword,
                finally_block,
            },
            begin,
        )
    }

    /// `on T [catch (e[, s])] { }` or `catch (e[, s]) { }`.
    fn parse_catch_clause(&mut self) -> NodeId {
        let begin = self.current();
        let (on_keyword, exception_type) = match self.match_keyword(KeywordId::On) {
            Some(keyword) => (Some(keyword), Some(self.parse_type_name())),
            None => (None, None),
        };
        let mut catch_keyword = None;
        let mut left_paren = None;
        let mut exception_parameter = None;
        let mut comma = None;
        let mut stack_trace_parameter = None;
        let mut right_paren = None;
        if let Some(keyword) = self.match_keyword(KeywordId::Catch) {
            catch_keyword = Some(keyword);
            left_paren = Some(self.expect_punct(PunctuationId::OpenParen));
            exception_parameter = Some(self.parse_simple_identifier());
            comma = self.match_punct(PunctuationId::Comma);
            if comma.is_some() {
                stack_trace_parameter = Some(self.parse_simple_identifier());
            }
            right_paren = Some(self.expect_punct(PunctuationId::CloseParen));
        }
        let body = self.parse_block();
        self.finish(
            CatchClause {
                on_keyword,
                exception_type,
                catch_keyword,
                left_paren,
                exception_parameter,
                comma,
                stack_trace_parameter,
                right_paren,
                body,
            },
            begin,
        )
    }

    fn parse_return_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let expression = (!self.check_punct(PunctuationId::Semicolon)).then(|| self.parse_expression());
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            ReturnStatement {
                keyword,
                expression,
                semicolon,
            },
            begin,
        )
    }

    fn parse_break_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let label = self.check_identifier().then(|| self.parse_simple_identifier());
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            BreakStatement {
                keyword,
                label,
                semicolon,
            },
            begin,
        )
    }

    fn parse_continue_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let label = self.check_identifier().then(|| self.parse_simple_identifier());
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            ContinueStatement {
                keyword,
                label,
                semicolon,
            },
            begin,
        )
    }

    fn parse_assert_statement(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let condition = self.parse_expression();
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            AssertStatement {
                keyword,
                left_paren,
                condition,
                right_paren,
                semicolon,
            },
            begin,
        )
    }
}
