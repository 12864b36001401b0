/// Type parsing: type names, type arguments and type parameters.
impl<'l> Parser<'l> {
    // ========================================================================
    // Types
    // ========================================================================

    /// `T`, `p.T`, `T<A, B>`.
    fn parse_type_name(&mut self) -> NodeId {
        self.nested(Self::synthetic_type_name, Self::parse_type_name_unguarded)
    }

    fn parse_type_name_unguarded(&mut self) -> NodeId {
        let begin = self.current();
        let name = if self.check_identifier() {
            let prefix = self.parse_simple_identifier();
            if self.check_punct(PunctuationId::Period) && self.peek_at(1).is_identifier() {
                let period = self.advance();
                let identifier = self.parse_simple_identifier();
                self.finish(
                    PrefixedIdentifier {
                        prefix,
                        period,
                        identifier,
                    },
                    begin,
                )
            } else {
                prefix
            }
        } else {
            self.report_current(ErrorCode::ExpectedTypeName, &[]);
            self.synthetic_identifier()
        };
        let type_arguments = self
            .check_op(OperatorId::Lt)
            .then(|| self.parse_type_arguments());
        self.finish(TypeName { name, type_arguments }, begin)
    }

    /// `void` or a type name.
    fn parse_return_type(&mut self) -> NodeId {
        if self.check_keyword(KeywordId::Void) {
            let token = self.advance();
            let name = self.simple_identifier(token);
            return self.ast.alloc(
                TypeName {
                    name,
                    type_arguments: None,
                },
                token,
                token,
            );
        }
        self.parse_type_name()
    }

    fn parse_type_arguments(&mut self) -> NodeId {
        let begin = self.current();
        let left_bracket = self.expect_op(OperatorId::Lt);
        let mut arguments = vec![self.parse_type_name()];
        while self.match_punct(PunctuationId::Comma).is_some() {
            arguments.push(self.parse_type_name());
        }
        let right_bracket = self.expect_closing_angle();
        self.finish(
            TypeArgumentList {
                left_bracket,
                arguments,
                right_bracket,
            },
            begin,
        )
    }

    /// `<T, U extends B>`.
    fn parse_type_parameters(&mut self) -> NodeId {
        let begin = self.current();
        let left_bracket = self.expect_op(OperatorId::Lt);
        let mut parameters = Vec::new();
        loop {
            let param_begin = self.current();
            let name = self.parse_simple_identifier();
            let (extends_keyword, bound) = match self.match_keyword(KeywordId::Extends) {
                Some(keyword) => (Some(keyword), Some(self.parse_type_name())),
                None => (None, None),
            };
            parameters.push(self.finish(
                TypeParameter {
                    name,
                    extends_keyword,
                    bound,
                },
                param_begin,
            ));
            if self.match_punct(PunctuationId::Comma).is_none() {
                break;
            }
        }
        let right_bracket = self.expect_closing_angle();
        self.finish(
            TypeParameterList {
                left_bracket,
                parameters,
                right_bracket,
            },
            begin,
        )
    }
}
