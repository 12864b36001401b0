/// Expression parsing methods.
///
/// Precedence, lowest first:
/// - `throw`, assignment and cascades
/// - conditional `?:`
/// - binary operators, by [`Precedence`] level (`is`/`as` sit at the relational level)
/// - prefix operators, then selectors (`.name`, `[index]`, `(args)`) and postfix `++`/`--`
/// - primaries
impl<'l> Parser<'l> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> NodeId {
        self.nested(Self::synthetic_identifier, Self::parse_expression_unguarded)
    }

    fn parse_expression_unguarded(&mut self) -> NodeId {
        let begin = self.current();
        if let Some(keyword) = self.match_keyword(KeywordId::Throw) {
            let expression = self.parse_expression();
            return self.finish(ThrowExpression { keyword, expression }, begin);
        }
        if let Some(keyword) = self.match_keyword(KeywordId::Rethrow) {
            return self.finish(RethrowExpression { keyword }, begin);
        }

        let expression = self.parse_conditional_expression();
        if let Some(operator) = self.match_assignment_operator() {
            let right_hand_side = self.parse_expression();
            return self.finish(
                AssignmentExpression {
                    left_hand_side: expression,
                    operator,
                    right_hand_side,
                },
                begin,
            );
        }
        if !self.check_punct(PunctuationId::PeriodPeriod) {
            return expression;
        }

        let mut cascade_sections = Vec::new();
        while self.check_punct(PunctuationId::PeriodPeriod) {
            cascade_sections.push(self.parse_cascade_section());
        }
        self.finish(
            CascadeExpression {
                target: expression,
                cascade_sections,
            },
            begin,
        )
    }

    /// An expression that may not contain a cascade at its top level.
    fn parse_expression_without_cascade(&mut self) -> NodeId {
        self.nested(Self::synthetic_identifier, Self::parse_expression_without_cascade_unguarded)
    }

    fn parse_expression_without_cascade_unguarded(&mut self) -> NodeId {
        let begin = self.current();
        if let Some(keyword) = self.match_keyword(KeywordId::Throw) {
            let expression = self.parse_expression_without_cascade();
            return self.finish(ThrowExpression { keyword, expression }, begin);
        }
        let expression = self.parse_conditional_expression();
        if let Some(operator) = self.match_assignment_operator() {
            let right_hand_side = self.parse_expression_without_cascade();
            return self.finish(
                AssignmentExpression {
                    left_hand_side: expression,
                    operator,
                    right_hand_side,
                },
                begin,
            );
        }
        expression
    }

    fn match_assignment_operator(&mut self) -> Option<TokenId> {
        match self.peek_kind() {
            TokenKind::Operator(op) if op.is_assignment() => Some(self.advance()),
            _ => None,
        }
    }

    /// `..name`, `..name(args)` or `..[index]`, then further selectors and an optional assignment.
    fn parse_cascade_section(&mut self) -> NodeId {
        let begin = self.current();
        let period = self.advance();
        let section = if let Some(left_bracket) = self.match_punct(PunctuationId::OpenSquare) {
            let index = self.parse_expression();
            let right_bracket = self.expect_punct(PunctuationId::CloseSquare);
            self.finish(
                IndexExpression {
                    target: None,
                    period: Some(period),
                    left_bracket,
                    index,
                    right_bracket,
                },
                begin,
            )
        } else {
            let name = self.parse_simple_identifier();
            if self.check_punct(PunctuationId::OpenParen) {
                let argument_list = self.parse_argument_list();
                self.finish(
                    MethodInvocation {
                        target: None,
                        period: Some(period),
                        method_name: name,
                        argument_list,
                    },
                    begin,
                )
            } else {
                self.finish(
                    PropertyAccess {
                        target: None,
                        operator: period,
                        property_name: name,
                    },
                    begin,
                )
            }
        };
        let section = self.parse_selectors(section);
        match self.match_assignment_operator() {
            Some(operator) => {
                let right_hand_side = self.parse_expression_without_cascade();
                self.finish(
                    AssignmentExpression {
                        left_hand_side: section,
                        operator,
                        right_hand_side,
                    },
                    begin,
                )
            }
            None => section,
        }
    }

    fn parse_conditional_expression(&mut self) -> NodeId {
        let begin = self.current();
        let condition = self.parse_binary_expression(Precedence::LogicalOr);
        let Some(question) = self.match_punct(PunctuationId::Question) else {
            return condition;
        };
        let then_expression = self.parse_expression_without_cascade();
        let colon = self.expect_punct(PunctuationId::Colon);
        let else_expression = self.parse_expression_without_cascade();
        self.finish(
            ConditionalExpression {
                condition,
                question,
                then_expression,
                colon,
                else_expression,
            },
            begin,
        )
    }

    /// Left-associative binary expressions at `level` and tighter.
    fn parse_binary_expression(&mut self, level: Precedence) -> NodeId {
        let begin = self.current();
        let mut left = self.parse_binary_operand(level);
        loop {
            if level == Precedence::Relational {
                if let Some(is_operator) = self.match_keyword(KeywordId::Is) {
                    let not_operator = self.match_op(OperatorId::Bang);
                    let type_name = self.parse_type_name();
                    left = self.finish(
                        IsExpression {
                            expression: left,
                            is_operator,
                            not_operator,
                            type_name,
                        },
                        begin,
                    );
                    continue;
                }
                if let Some(as_operator) = self.match_keyword(KeywordId::As) {
                    let type_name = self.parse_type_name();
                    left = self.finish(
                        AsExpression {
                            expression: left,
                            as_operator,
                            type_name,
                        },
                        begin,
                    );
                    continue;
                }
            }
            match self.peek_kind() {
                TokenKind::Operator(op) if op.precedence() == level => {
                    let operator = self.advance();
                    let right_operand = self.parse_binary_operand(level);
                    left = self.finish(
                        BinaryExpression {
                            left_operand: left,
                            operator,
                            right_operand,
                        },
                        begin,
                    );
                }
                _ => return left,
            }
        }
    }

    fn parse_binary_operand(&mut self, level: Precedence) -> NodeId {
        match tighter_precedence(level) {
            Some(next) => self.parse_binary_expression(next),
            None => self.parse_unary_expression(),
        }
    }

    fn parse_unary_expression(&mut self) -> NodeId {
        self.nested(Self::synthetic_identifier, Self::parse_unary_expression_unguarded)
    }

    fn parse_unary_expression_unguarded(&mut self) -> NodeId {
        let begin = self.current();
        match self.peek_kind() {
            TokenKind::Operator(
                OperatorId::Minus | OperatorId::Bang | OperatorId::Tilde | OperatorId::PlusPlus | OperatorId::MinusMinus,
            ) => {
                let operator = self.advance();
                let operand = self.parse_unary_expression();
                self.finish(PrefixExpression { operator, operand }, begin)
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> NodeId {
        let begin = self.current();
        let primary = self.parse_primary_expression();
        let operand = self.parse_selectors(primary);
        match self.peek_kind() {
            TokenKind::Operator(OperatorId::PlusPlus | OperatorId::MinusMinus) => {
                let operator = self.advance();
                self.finish(PostfixExpression { operand, operator }, begin)
            }
            _ => operand,
        }
    }

    /// Apply `.name`, `.name(args)`, `[index]` and `(args)` selectors to `target`.
    fn parse_selectors(&mut self, mut target: NodeId) -> NodeId {
        loop {
            let begin = self.begin_of(target);
            if self.check_punct(PunctuationId::Period) {
                let period = self.advance();
                let name = self.parse_simple_identifier();
                target = if self.check_punct(PunctuationId::OpenParen) {
                    let argument_list = self.parse_argument_list();
                    self.finish(
                        MethodInvocation {
                            target: Some(target),
                            period: Some(period),
                            method_name: name,
                            argument_list,
                        },
                        begin,
                    )
                } else if matches!(self.ast.kind(target), NodeKind::SimpleIdentifier(_)) {
                    self.finish(
                        PrefixedIdentifier {
                            prefix: target,
                            period,
                            identifier: name,
                        },
                        begin,
                    )
                } else {
                    self.finish(
                        PropertyAccess {
                            target: Some(target),
                            operator: period,
                            property_name: name,
                        },
                        begin,
                    )
                };
            } else if let Some(left_bracket) = self.match_punct(PunctuationId::OpenSquare) {
                let index = self.parse_expression();
                let right_bracket = self.expect_punct(PunctuationId::CloseSquare);
                target = self.finish(
                    IndexExpression {
                        target: Some(target),
                        period: None,
                        left_bracket,
                        index,
                        right_bracket,
                    },
                    begin,
                );
            } else if self.check_punct(PunctuationId::OpenParen) {
                let argument_list = self.parse_argument_list();
                target = if matches!(self.ast.kind(target), NodeKind::SimpleIdentifier(_)) {
                    self.finish(
                        MethodInvocation {
                            target: None,
                            period: None,
                            method_name: target,
                            argument_list,
                        },
                        begin,
                    )
                } else {
                    self.finish(
                        FunctionExpressionInvocation {
                            function: target,
                            argument_list,
                        },
                        begin,
                    )
                };
            } else {
                return target;
            }
        }
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn parse_primary_expression(&mut self) -> NodeId {
        let begin = self.current();
        match self.peek_kind() {
            TokenKind::Keyword(KeywordId::This) => {
                let keyword = self.advance();
                self.finish(ThisExpression { keyword }, begin)
            }
            TokenKind::Keyword(KeywordId::Super) => {
                let keyword = self.advance();
                self.finish(SuperExpression { keyword }, begin)
            }
            TokenKind::Keyword(KeywordId::Null) => {
                let literal = self.advance();
                self.finish(NullLiteral { literal }, begin)
            }
            TokenKind::Keyword(KeywordId::True | KeywordId::False) => {
                let value = self.check_keyword(KeywordId::True);
                let literal = self.advance();
                self.finish(BooleanLiteral { literal, value }, begin)
            }
            TokenKind::Int | TokenKind::HexInt => {
                let value = parse_integer(&self.peek().lexeme);
                let literal = self.advance();
                self.finish(IntegerLiteral { literal, value }, begin)
            }
            TokenKind::Double => {
                let value = self.peek().lexeme.parse::<f64>().unwrap_or(f64::NAN);
                let literal = self.advance();
                self.finish(DoubleLiteral { literal, value }, begin)
            }
            TokenKind::String => self.parse_string_literal(),
            TokenKind::Keyword(KeywordId::New) => self.parse_instance_creation(),
            TokenKind::Keyword(KeywordId::Const) => {
                if self.peek_at(1).is_identifier() {
                    self.parse_instance_creation()
                } else {
                    let const_keyword = self.advance();
                    self.parse_collection_literal(Some(const_keyword), begin)
                }
            }
            TokenKind::Operator(OperatorId::Lt)
            | TokenKind::Punctuation(PunctuationId::OpenSquare | PunctuationId::OpenCurly) => {
                self.parse_collection_literal(None, begin)
            }
            TokenKind::Punctuation(PunctuationId::OpenParen) => {
                if self.is_function_at(self.pos) {
                    let parameters = Some(self.parse_formal_parameter_list());
                    let body = self.parse_function_body(false, true);
                    return self.finish(FunctionExpression { parameters, body }, begin);
                }
                let left_paren = self.advance();
                let expression = self.parse_expression();
                let right_paren = self.expect_punct(PunctuationId::CloseParen);
                self.finish(
                    ParenthesizedExpression {
                        left_paren,
                        expression,
                        right_paren,
                    },
                    begin,
                )
            }
            _ if self.check_identifier() => self.parse_simple_identifier(),
            _ => {
                self.report_current(ErrorCode::MissingExpression, &[]);
                self.synthetic_identifier()
            }
        }
    }

    /// `new T(args)`, `new T.name(args)` or `const T(args)`.
    ///
    /// `new A.b()` is ambiguous between a prefixed type and a named constructor; the type name keeps
    /// `A.b` as a prefixed identifier and name resolution splits it.
    fn parse_instance_creation(&mut self) -> NodeId {
        let begin = self.current();
        let keyword = self.advance();
        let name_begin = self.current();
        let type_name = self.parse_type_name();
        let (period, name) = match self.match_punct(PunctuationId::Period) {
            Some(period) => (Some(period), Some(self.parse_simple_identifier())),
            None => (None, None),
        };
        let constructor_name = self.finish(
            ConstructorName {
                type_name,
                period,
                name,
            },
            name_begin,
        );
        let argument_list = self.parse_argument_list();
        self.finish(
            InstanceCreationExpression {
                keyword,
                constructor_name,
                argument_list,
            },
            begin,
        )
    }

    /// `[const] [<T>] [a, b]` or `[const] [<K, V>] {k: v}`.
    fn parse_collection_literal(&mut self, const_keyword: Option<TokenId>, begin: TokenId) -> NodeId {
        let type_arguments = self
            .check_op(OperatorId::Lt)
            .then(|| self.parse_type_arguments());

        if let Some(left_bracket) = self.match_punct(PunctuationId::OpenCurly) {
            let mut entries = Vec::new();
            while !self.check_punct(PunctuationId::CloseCurly) && !self.is_at_end() {
                let entry_begin = self.current();
                let key = self.parse_expression();
                let separator = self.expect_punct(PunctuationId::Colon);
                let value = self.parse_expression();
                entries.push(self.finish(MapLiteralEntry { key, separator, value }, entry_begin));
                if self.match_punct(PunctuationId::Comma).is_none() {
                    break;
                }
            }
            let right_bracket = self.expect_punct(PunctuationId::CloseCurly);
            return self.finish(
                MapLiteral {
                    const_keyword,
                    type_arguments,
                    left_bracket,
                    entries,
                    right_bracket,
                },
                begin,
            );
        }

        let left_bracket = self.expect_punct(PunctuationId::OpenSquare);
        let mut elements = Vec::new();
        while !self.check_punct(PunctuationId::CloseSquare) && !self.is_at_end() {
            elements.push(self.parse_expression());
            if self.match_punct(PunctuationId::Comma).is_none() {
                break;
            }
        }
        let right_bracket = self.expect_punct(PunctuationId::CloseSquare);
        self.finish(
            ListLiteral {
                const_keyword,
                type_arguments,
                left_bracket,
                elements,
                right_bracket,
            },
            begin,
        )
    }

    /// `(a, b, name: c)`; a trailing comma is accepted.
    fn parse_argument_list(&mut self) -> NodeId {
        let begin = self.current();
        let left_paren = self.expect_punct(PunctuationId::OpenParen);
        let mut arguments = Vec::new();
        while !self.check_punct(PunctuationId::CloseParen) && !self.is_at_end() {
            arguments.push(self.parse_argument());
            if self.match_punct(PunctuationId::Comma).is_none() {
                break;
            }
        }
        let right_paren = self.expect_punct(PunctuationId::CloseParen);
        self.finish(
            ArgumentList {
                left_paren,
                arguments,
                right_paren,
            },
            begin,
        )
    }

    fn parse_argument(&mut self) -> NodeId {
        if !(self.check_identifier() && self.peek_at(1).kind.is_punctuation(PunctuationId::Colon)) {
            return self.parse_expression();
        }
        let begin = self.current();
        let label = self.parse_simple_identifier();
        let colon = self.advance();
        let name = self.finish(Label { label, colon }, begin);
        let expression = self.parse_expression();
        self.finish(NamedExpression { name, expression }, begin)
    }
}

/// The binary level binding tighter than `level`; `None` past multiplicative.
fn tighter_precedence(level: Precedence) -> Option<Precedence> {
    use Precedence::*;
    Some(match level {
        None | Assignment => LogicalOr,
        LogicalOr => LogicalAnd,
        LogicalAnd => Equality,
        Equality => Relational,
        Relational => BitwiseOr,
        BitwiseOr => BitwiseXor,
        BitwiseXor => BitwiseAnd,
        BitwiseAnd => Shift,
        Shift => Additive,
        Additive => Multiplicative,
        Multiplicative => return Option::None,
    })
}

/// Decimal or `0x` hexadecimal value; `None` when it overflows 64 bits.
fn parse_integer(lexeme: &str) -> Option<i64> {
    match lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        Some(digits) => i64::from_str_radix(digits, 16).ok(),
        None => lexeme.parse().ok(),
    }
}
