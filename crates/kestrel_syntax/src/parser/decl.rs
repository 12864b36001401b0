/// Declaration parsing methods.
///
/// This chunk handles top-level declarations (classes, typedefs, functions, getters, setters and
/// variables), class members (fields, methods, operators, constructors), formal parameter lists
/// and function bodies.
impl<'l> Parser<'l> {
    // ========================================================================
    // Top-level declarations
    // ========================================================================

    /// Parse one top-level declaration, or return `None` without consuming anything.
    fn parse_compilation_unit_member(&mut self, comment: Option<NodeId>) -> Option<NodeId> {
        let begin = self.current();
        if self.check_keyword(KeywordId::Class)
            || (self.check_keyword(KeywordId::Abstract) && self.peek_at(1).kind.is_keyword(KeywordId::Class))
        {
            return Some(self.parse_class_declaration(comment));
        }
        if self.check_keyword(KeywordId::Typedef) && !self.peek_at(1).kind.is_punctuation(PunctuationId::OpenParen)
        {
            return Some(self.parse_type_alias(comment));
        }

        let external_keyword = if self.check_keyword(KeywordId::External)
            && (self.peek_at(1).is_identifier() || self.peek_at(1).kind.is_keyword(KeywordId::Void))
        {
            Some(self.advance())
        } else {
            None
        };

        if self.check_keyword(KeywordId::Var)
            || self.check_keyword(KeywordId::Final)
            || self.check_keyword(KeywordId::Const)
        {
            let variables = self.parse_variable_declaration_list();
            let semicolon = self.expect_punct(PunctuationId::Semicolon);
            return Some(self.finish(
                TopLevelVariableDeclaration {
                    comment,
                    variables,
                    semicolon,
                },
                begin,
            ));
        }

        let after_type = if self.check_keyword(KeywordId::Void) {
            Some(self.pos + 1)
        } else {
            self.skip_type(self.pos)
                .filter(|after| self.is_declared_name_at(*after) && !self.is_property_keyword_at(self.pos))
        };
        let name_at = after_type.unwrap_or(self.pos);

        // `void` only ever starts a function; anything else after it is recovered there.
        let is_function = self.check_keyword(KeywordId::Void)
            || self.is_property_keyword_at(name_at)
            || (self.is_declared_name_at(name_at)
                && self.kind_at(name_at + 1).is_punctuation(PunctuationId::OpenParen));
        if is_function {
            let return_type = after_type.map(|_| self.parse_return_type());
            return Some(self.parse_function_declaration(comment, external_keyword, return_type, begin));
        }
        if after_type.is_some() {
            let variables = self.parse_variable_declaration_list();
            let semicolon = self.expect_punct(PunctuationId::Semicolon);
            return Some(self.finish(
                TopLevelVariableDeclaration {
                    comment,
                    variables,
                    semicolon,
                },
                begin,
            ));
        }
        if external_keyword.is_some() {
            // `external` consumed; report here so the outer loop still sees progress.
            self.report_current(ErrorCode::ExpectedExecutable, &[]);
        }
        None
    }

    /// `[get|set] name [(params)] body` after an optional return type.
    fn parse_function_declaration(
        &mut self,
        comment: Option<NodeId>,
        external_keyword: Option<TokenId>,
        return_type: Option<NodeId>,
        begin: TokenId,
    ) -> NodeId {
        let property_keyword = if self.is_property_keyword_at(self.pos) {
            Some(self.advance())
        } else {
            None
        };
        let is_getter = property_keyword.is_some_and(|t| self.ast.token(t).kind.is_keyword(KeywordId::Get));
        let name = self.parse_simple_identifier();
        let expression_begin = self.current();
        let parameters = if is_getter {
            None
        } else if self.check_punct(PunctuationId::OpenParen) {
            Some(self.parse_formal_parameter_list())
        } else {
            self.report_current(ErrorCode::MissingFunctionParameters, &[]);
            None
        };
        let body = self.parse_function_body(external_keyword.is_some(), false);
        let function_expression = self.finish(FunctionExpression { parameters, body }, expression_begin);
        self.finish(
            FunctionDeclaration {
                comment,
                external_keyword,
                return_type,
                property_keyword,
                name,
                function_expression,
            },
            begin,
        )
    }

    /// `typedef [R] Name[<T>](params);`
    fn parse_type_alias(&mut self, comment: Option<NodeId>) -> NodeId {
        let begin = self.current();
        let keyword = self.expect_keyword(KeywordId::Typedef);
        let has_return_type = self.check_keyword(KeywordId::Void) || self.is_type_then_name();
        let return_type = has_return_type.then(|| self.parse_return_type());
        let name = self.parse_simple_identifier();
        let type_parameters = self
            .check_op(OperatorId::Lt)
            .then(|| self.parse_type_parameters());
        let parameters = if self.check_punct(PunctuationId::OpenParen) {
            self.parse_formal_parameter_list()
        } else {
            self.report_current(ErrorCode::MissingTypedefParameters, &[]);
            let params_begin = self.current();
            let left_paren = self.insert_synthetic(TokenKind::Punctuation(PunctuationId::OpenParen));
            let right_paren = self.insert_synthetic(TokenKind::Punctuation(PunctuationId::CloseParen));
            self.finish(
                FormalParameterList {
                    left_paren,
                    parameters: Vec::new(),
                    left_delimiter: None,
                    right_delimiter: None,
                    right_paren,
                },
                params_begin,
            )
        };
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            TypeAlias {
                comment,
                keyword,
                return_type,
                name,
                type_parameters,
                parameters,
                semicolon,
            },
            begin,
        )
    }

    /// `[var|final|const] [T] a [= e], b [= e]` without the terminator.
    fn parse_variable_declaration_list(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = if self.check_keyword(KeywordId::Var)
            || self.check_keyword(KeywordId::Final)
            || self.check_keyword(KeywordId::Const)
        {
            Some(self.advance())
        } else {
            None
        };
        let is_var = keyword.is_some_and(|k| self.ast.token(k).kind.is_keyword(KeywordId::Var));
        let type_name = (!is_var && self.is_type_then_name()).then(|| self.parse_type_name());
        if keyword.is_none() && type_name.is_none() {
            // Callers only get here with a type or keyword in front; recover with a bare name list.
            self.report_current(ErrorCode::ExpectedTypeName, &[]);
        }
        let mut variables = Vec::new();
        loop {
            let var_begin = self.current();
            let name = self.parse_simple_identifier();
            let (equals, initializer) = match self.match_op(OperatorId::Eq) {
                Some(equals) => (Some(equals), Some(self.parse_expression())),
                None => (None, None),
            };
            variables.push(self.finish(
                VariableDeclaration {
                    name,
                    equals,
                    initializer,
                },
                var_begin,
            ));
            if self.match_punct(PunctuationId::Comma).is_none() {
                break;
            }
        }
        self.finish(
            VariableDeclarationList {
                keyword,
                type_name,
                variables,
            },
            begin,
        )
    }

    // ========================================================================
    // Classes
    // ========================================================================

    fn parse_class_declaration(&mut self, comment: Option<NodeId>) -> NodeId {
        let begin = self.current();
        let abstract_keyword = self.match_keyword(KeywordId::Abstract);
        let class_keyword = self.expect_keyword(KeywordId::Class);
        let name = self.parse_simple_identifier();
        let class_name = self.ast.name_of(name);
        let type_parameters = self
            .check_op(OperatorId::Lt)
            .then(|| self.parse_type_parameters());

        let mut extends_clause: Option<NodeId> = None;
        let mut with_clause: Option<NodeId> = None;
        let mut implements_clause: Option<NodeId> = None;
        loop {
            let clause_begin = self.current();
            if let Some(keyword) = self.match_keyword(KeywordId::Extends) {
                let superclass = self.parse_type_name();
                let clause = self.finish(ExtendsClause { keyword, superclass }, clause_begin);
                if extends_clause.is_some() {
                    self.report(ErrorCode::MultipleExtendsClauses, keyword, &[]);
                } else {
                    if with_clause.is_some() {
                        self.report(ErrorCode::WithBeforeExtends, keyword, &[]);
                    } else if implements_clause.is_some() {
                        self.report(ErrorCode::ImplementsBeforeExtends, keyword, &[]);
                    }
                    extends_clause = Some(clause);
                }
            } else if let Some(keyword) = self.match_keyword(KeywordId::With) {
                let mixins = self.parse_type_name_list();
                let clause = self.finish(WithClause { keyword, mixins }, clause_begin);
                if with_clause.is_some() {
                    self.report(ErrorCode::MultipleWithClauses, keyword, &[]);
                } else {
                    with_clause = Some(clause);
                }
            } else if let Some(keyword) = self.match_keyword(KeywordId::Implements) {
                let interfaces = self.parse_type_name_list();
                let clause = self.finish(ImplementsClause { keyword, interfaces }, clause_begin);
                if implements_clause.is_some() {
                    self.report(ErrorCode::MultipleImplementsClauses, keyword, &[]);
                } else {
                    implements_clause = Some(clause);
                }
            } else {
                break;
            }
        }

        let left_brace = self.expect_punct(PunctuationId::OpenCurly);
        let mut members = Vec::new();
        while !self.check_punct(PunctuationId::CloseCurly) && !self.is_at_end() {
            let start = self.consumed;
            if let Some(member) = self.parse_class_member(&class_name) {
                members.push(member);
            }
            if self.consumed == start {
                self.report_current(ErrorCode::ExpectedClassMember, &[]);
                self.advance();
            }
        }
        let right_brace = self.expect_punct(PunctuationId::CloseCurly);
        self.finish(
            ClassDeclaration {
                comment,
                abstract_keyword,
                class_keyword,
                name,
                type_parameters,
                extends_clause,
                with_clause,
                implements_clause,
                left_brace,
                members,
                right_brace,
            },
            begin,
        )
    }

    fn parse_type_name_list(&mut self) -> NodeList {
        let mut names = vec![self.parse_type_name()];
        while self.match_punct(PunctuationId::Comma).is_some() {
            names.push(self.parse_type_name());
        }
        names
    }

    /// Parse one class member, or return `None` without consuming anything.
    fn parse_class_member(&mut self, class_name: &str) -> Option<NodeId> {
        let comment = self.doc_comment();
        let begin = self.current();
        let external_keyword = self.match_keyword(KeywordId::External);

        // Constructors: `[const|factory] C[.name](...)`.
        let ctor_at = if self.check_keyword(KeywordId::Const) || self.check_keyword(KeywordId::Factory) {
            self.pos + 1
        } else {
            self.pos
        };
        if self.is_constructor_at(ctor_at, class_name) {
            return Some(self.parse_constructor(comment, external_keyword, begin));
        }

        let modifier_keyword = if self.check_keyword(KeywordId::Static) || self.check_keyword(KeywordId::Abstract) {
            Some(self.advance())
        } else {
            None
        };

        if self.check_keyword(KeywordId::Var)
            || self.check_keyword(KeywordId::Final)
            || self.check_keyword(KeywordId::Const)
        {
            return Some(self.parse_field(comment, modifier_keyword, begin));
        }

        let after_type = if self.check_keyword(KeywordId::Void) {
            Some(self.pos + 1)
        } else {
            self.skip_type(self.pos).filter(|after| {
                let named = self.is_declared_name_at(*after) || self.is_operator_declaration_at(*after);
                named
                    && !(self.is_property_keyword_at(self.pos)
                        || self.is_operator_declaration_at(self.pos)
                        || self.kind_at(self.pos + 1).is_punctuation(PunctuationId::OpenParen))
            })
        };
        let name_at = after_type.unwrap_or(self.pos);
        let is_method = self.check_keyword(KeywordId::Void)
            || self.is_operator_declaration_at(name_at)
            || self.is_property_keyword_at(name_at)
            || (self.is_declared_name_at(name_at) && self.kind_at(name_at + 1).is_punctuation(PunctuationId::OpenParen));

        if is_method {
            let return_type = after_type.map(|_| self.parse_return_type());
            return Some(self.parse_method(comment, external_keyword, modifier_keyword, return_type, begin));
        }
        if after_type.is_some() {
            return Some(self.parse_field(comment, modifier_keyword, begin));
        }
        if external_keyword.is_some() || modifier_keyword.is_some() {
            self.report_current(ErrorCode::ExpectedClassMember, &[]);
        }
        None
    }

    fn is_constructor_at(&self, idx: usize, class_name: &str) -> bool {
        let token = self.token_at(idx);
        if !token.is_identifier() || token.lexeme != class_name {
            return false;
        }
        match self.kind_at(idx + 1) {
            TokenKind::Punctuation(PunctuationId::OpenParen) => true,
            TokenKind::Punctuation(PunctuationId::Period) => {
                self.token_at(idx + 2).is_identifier()
                    && self.kind_at(idx + 3).is_punctuation(PunctuationId::OpenParen)
            }
            _ => false,
        }
    }

    fn parse_field(&mut self, comment: Option<NodeId>, modifier_keyword: Option<TokenId>, begin: TokenId) -> NodeId {
        let static_keyword =
            modifier_keyword.filter(|k| self.ast.token(*k).kind.is_keyword(KeywordId::Static));
        let fields = self.parse_variable_declaration_list();
        let semicolon = self.expect_punct(PunctuationId::Semicolon);
        self.finish(
            FieldDeclaration {
                comment,
                static_keyword,
                fields,
                semicolon,
            },
            begin,
        )
    }

    fn parse_method(
        &mut self,
        comment: Option<NodeId>,
        external_keyword: Option<TokenId>,
        modifier_keyword: Option<TokenId>,
        return_type: Option<NodeId>,
        begin: TokenId,
    ) -> NodeId {
        let mut property_keyword = None;
        let mut operator_keyword = None;
        let name = if self.is_operator_declaration_at(self.pos) {
            operator_keyword = Some(self.advance());
            let token = self.operator_name_token();
            self.simple_identifier(token)
        } else {
            if self.is_property_keyword_at(self.pos) {
                property_keyword = Some(self.advance());
            }
            self.parse_simple_identifier()
        };
        let is_getter = property_keyword.is_some_and(|t| self.ast.token(t).kind.is_keyword(KeywordId::Get));
        let parameters = if is_getter {
            None
        } else if self.check_punct(PunctuationId::OpenParen) {
            Some(self.parse_formal_parameter_list())
        } else {
            self.report_current(ErrorCode::MissingFunctionParameters, &[]);
            None
        };
        let body = self.parse_function_body(true, false);
        self.finish(
            MethodDeclaration {
                comment,
                external_keyword,
                modifier_keyword,
                return_type,
                property_keyword,
                operator_keyword,
                name,
                parameters,
                body,
            },
            begin,
        )
    }

    /// Consume the operator after `operator`, merging `[` `]` (and a following `=`) into one token.
    fn operator_name_token(&mut self) -> TokenId {
        if self.check_punct(PunctuationId::OpenSquare) {
            let pos = self.pos;
            let offset = self.peek().offset;
            let close_end = self.peek_at(1).end();
            let eq = self.peek_at(2);
            let with_eq = eq.kind.is_operator(OperatorId::Eq) && eq.offset == close_end;
            let tokens = self.ast.tokens_mut();
            let (kind, lexeme, drop) = if with_eq {
                (OperatorId::IndexEq, "[]=", 2)
            } else {
                (OperatorId::Index, "[]", 1)
            };
            tokens[pos] = Token::new(TokenKind::Operator(kind), lexeme, offset);
            tokens.drain(pos + 1..pos + 1 + drop);
        }
        self.advance()
    }

    /// `[const|factory] C[.name](params) [: initializers] body`
    fn parse_constructor(&mut self, comment: Option<NodeId>, external_keyword: Option<TokenId>, begin: TokenId) -> NodeId {
        let const_keyword = self.match_keyword(KeywordId::Const);
        let factory_keyword = self.match_keyword(KeywordId::Factory);
        let return_type = self.parse_simple_identifier();
        let (period, name) = match self.match_punct(PunctuationId::Period) {
            Some(period) => (Some(period), Some(self.parse_simple_identifier())),
            None => (None, None),
        };
        let parameters = self.parse_formal_parameter_list();
        let mut initializers = Vec::new();
        let separator = self.match_punct(PunctuationId::Colon);
        if separator.is_some() {
            loop {
                initializers.push(self.parse_constructor_initializer());
                if self.match_punct(PunctuationId::Comma).is_none() {
                    break;
                }
            }
        }
        let body = self.parse_function_body(true, false);
        self.finish(
            ConstructorDeclaration {
                comment,
                external_keyword,
                const_keyword,
                factory_keyword,
                return_type,
                period,
                name,
                parameters,
                separator,
                initializers,
                body,
            },
            begin,
        )
    }

    fn parse_constructor_initializer(&mut self) -> NodeId {
        let begin = self.current();
        if let Some(keyword) = self.match_keyword(KeywordId::Super) {
            let (period, constructor_name) = match self.match_punct(PunctuationId::Period) {
                Some(period) => (Some(period), Some(self.parse_simple_identifier())),
                None => (None, None),
            };
            let argument_list = self.parse_argument_list();
            return self.finish(
                SuperConstructorInvocation {
                    keyword,
                    period,
                    constructor_name,
                    argument_list,
                },
                begin,
            );
        }
        let (this_keyword, period) = match self.match_keyword(KeywordId::This) {
            Some(this) => (Some(this), Some(self.expect_punct(PunctuationId::Period))),
            None => (None, None),
        };
        let field_name = self.parse_simple_identifier();
        let equals = self.expect_op(OperatorId::Eq);
        let expression = self.parse_conditional_expression();
        self.finish(
            ConstructorFieldInitializer {
                this_keyword,
                period,
                field_name,
                equals,
                expression,
            },
            begin,
        )
    }

    // ========================================================================
    // Parameters and bodies
    // ========================================================================

    /// `(a, T b, this.c, [d = 1])` or `(a, {b: 2})`.
    fn parse_formal_parameter_list(&mut self) -> NodeId {
        let begin = self.current();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let mut parameters = Vec::new();
        let mut left_delimiter = None;
        let mut right_delimiter = None;

        if !self.check_punct(PunctuationId::CloseParen) {
            loop {
                let open = self
                    .match_punct(PunctuationId::OpenSquare)
                    .or_else(|| self.match_punct(PunctuationId::OpenCurly));
                if let Some(open) = open {
                    let named = self.ast.token(open).kind.is_punctuation(PunctuationId::OpenCurly);
                    left_delimiter = Some(open);
                    loop {
                        parameters.push(self.parse_default_formal_parameter(named));
                        if self.match_punct(PunctuationId::Comma).is_none()
                            || self.check_punct(PunctuationId::CloseSquare)
                            || self.check_punct(PunctuationId::CloseCurly)
                        {
                            break;
                        }
                    }
                    right_delimiter = Some(if named {
                        self.expect_punct(PunctuationId::CloseCurly)
                    } else {
                        self.expect_punct(PunctuationId::CloseSquare)
                    });
                    break;
                }
                parameters.push(self.parse_normal_formal_parameter());
                if self.match_punct(PunctuationId::Comma).is_none() || self.check_punct(PunctuationId::CloseParen) {
                    break;
                }
            }
        }
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        self.finish(
            FormalParameterList {
                left_paren,
                parameters,
                left_delimiter,
                right_delimiter,
                right_paren,
            },
            begin,
        )
    }

    fn parse_normal_formal_parameter(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = if self.check_keyword(KeywordId::Var)
            || self.check_keyword(KeywordId::Final)
            || self.check_keyword(KeywordId::Const)
        {
            Some(self.advance())
        } else {
            None
        };
        let typed = match self.skip_type(self.pos) {
            Some(after) => self.is_declared_name_at(after) || self.kind_at(after).is_keyword(KeywordId::This),
            None => false,
        };
        let type_name = typed.then(|| self.parse_type_name());
        if let Some(this_keyword) = self.match_keyword(KeywordId::This) {
            let period = self.expect_punct(PunctuationId::Period);
            let name = self.parse_simple_identifier();
            return self.finish(
                FieldFormalParameter {
                    keyword,
                    type_name,
                    this_keyword,
                    period,
                    name,
                },
                begin,
            );
        }
        let name = self.parse_simple_identifier();
        self.finish(
            SimpleFormalParameter {
                keyword,
                type_name,
                name,
            },
            begin,
        )
    }

    fn parse_default_formal_parameter(&mut self, named: bool) -> NodeId {
        let begin = self.current();
        let parameter = self.parse_normal_formal_parameter();
        let separator = if named {
            self.match_punct(PunctuationId::Colon)
                .or_else(|| self.match_op(OperatorId::Eq))
        } else {
            self.match_op(OperatorId::Eq)
        };
        let default_value = separator.map(|_| self.parse_expression());
        let kind = if named {
            ParameterKind::Named
        } else {
            ParameterKind::Positional
        };
        self.finish(
            DefaultFormalParameter {
                parameter,
                kind,
                separator,
                default_value,
            },
            begin,
        )
    }

    /// Parse a function body.
    ///
    /// `allow_empty` accepts `;` (abstract and external members); `in_expression` drops the `;`
    /// after `=> e` for function expressions.
    fn parse_function_body(&mut self, allow_empty: bool, in_expression: bool) -> NodeId {
        let begin = self.current();
        if self.check_punct(PunctuationId::Semicolon) {
            if !allow_empty {
                self.report_current(ErrorCode::MissingFunctionBody, &[]);
            }
            let semicolon = self.advance();
            return self.finish(EmptyFunctionBody { semicolon }, begin);
        }
        if let Some(arrow) = self.match_punct(PunctuationId::FatArrow) {
            let expression = self.parse_expression();
            let semicolon = (!in_expression).then(|| self.expect_punct(PunctuationId::Semicolon));
            return self.finish(
                ExpressionFunctionBody {
                    arrow,
                    expression,
                    semicolon,
                },
                begin,
            );
        }
        if self.check_punct(PunctuationId::OpenCurly) {
            let block = self.parse_block();
            return self.finish(BlockFunctionBody { block }, begin);
        }
        self.report_current(ErrorCode::MissingFunctionBody, &[]);
        let semicolon = self.insert_synthetic(TokenKind::Punctuation(PunctuationId::Semicolon));
        self.finish(EmptyFunctionBody { semicolon }, begin)
    }
}
