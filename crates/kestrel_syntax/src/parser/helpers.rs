/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation
/// - Synthetic token insertion and `>>` splitting
/// - Node allocation and documentation comment lookup
impl<'l> Parser<'l> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn tokens(&self) -> &[Token] {
        self.ast.tokens()
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Return the token `n` positions ahead, clamped to EOF.
    fn peek_at(&self, n: usize) -> &Token {
        let tokens = self.tokens();
        let idx = (self.pos + n).min(tokens.len() - 1);
        &tokens[idx]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn current(&self) -> TokenId {
        TokenId(self.pos as u32)
    }

    /// The most recently consumed token, or the current one before anything was consumed.
    fn previous(&self) -> TokenId {
        TokenId(self.pos.saturating_sub(1) as u32)
    }

    /// Consume the current token and return its id. EOF is never consumed.
    fn advance(&mut self) -> TokenId {
        let id = self.current();
        if !self.is_at_end() {
            self.pos += 1;
            self.consumed += 1;
        }
        id
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    /// Identifiers, including built-in and pseudo keywords.
    fn check_identifier(&self) -> bool {
        self.peek().is_identifier()
    }

    fn match_keyword(&mut self, id: KeywordId) -> Option<TokenId> {
        self.check_keyword(id).then(|| self.advance())
    }

    fn match_punct(&mut self, id: PunctuationId) -> Option<TokenId> {
        self.check_punct(id).then(|| self.advance())
    }

    fn match_op(&mut self, id: OperatorId) -> Option<TokenId> {
        self.check_op(id).then(|| self.advance())
    }

    fn expect_keyword(&mut self, id: KeywordId) -> TokenId {
        self.expect_kind(TokenKind::Keyword(id))
    }

    fn expect_punct(&mut self, id: PunctuationId) -> TokenId {
        self.expect_kind(TokenKind::Punctuation(id))
    }

    fn expect_op(&mut self, id: OperatorId) -> TokenId {
        self.expect_kind(TokenKind::Operator(id))
    }

    /// Consume a token of `kind`, or report it missing and insert a synthetic one.
    fn expect_kind(&mut self, kind: TokenKind) -> TokenId {
        if self.peek_kind() == kind {
            return self.advance();
        }
        self.report_current(ErrorCode::ExpectedToken, &[kind.describe()]);
        self.insert_synthetic(kind)
    }

    /// Insert a zero-length token at the current position and consume it.
    fn insert_synthetic(&mut self, kind: TokenKind) -> TokenId {
        let offset = match self.pos.checked_sub(1) {
            Some(prev) => self.tokens()[prev].end(),
            None => self.peek().offset,
        };
        let pos = self.pos;
        self.ast.tokens_mut().insert(pos, Token::synthetic(kind, offset));
        self.pos += 1;
        TokenId(pos as u32)
    }

    /// Consume a `>` closing a type argument or parameter list, splitting `>>`, `>>=` and `>=`.
    fn expect_closing_angle(&mut self) -> TokenId {
        let token = self.peek().clone();
        let remainder = match token.kind {
            TokenKind::Operator(OperatorId::GtGt) => Some(TokenKind::Operator(OperatorId::Gt)),
            TokenKind::Operator(OperatorId::GtGtEq) => Some(TokenKind::Operator(OperatorId::GtEq)),
            TokenKind::Operator(OperatorId::GtEq) => Some(TokenKind::Operator(OperatorId::Eq)),
            _ => None,
        };
        if let Some(rest) = remainder {
            let pos = self.pos;
            let tokens = self.ast.tokens_mut();
            tokens[pos] = Token::new(TokenKind::Operator(OperatorId::Gt), ">", token.offset);
            tokens.insert(pos + 1, Token::new(rest, &token.lexeme[1..], token.offset + 1));
        }
        self.expect_op(OperatorId::Gt)
    }

    // ========================================================================
    // Error reporting and recovery
    // ========================================================================

    fn report(&mut self, code: ErrorCode, token: TokenId, args: &[&str]) {
        let (offset, length) = {
            let token = self.ast.token(token);
            (token.offset, token.len())
        };
        self.report_span(code, offset, length, args);
    }

    fn report_current(&mut self, code: ErrorCode, args: &[&str]) {
        self.report(code, self.current(), args);
    }

    fn report_span(&mut self, code: ErrorCode, offset: usize, length: usize, args: &[&str]) {
        if self.unwinding {
            return;
        }
        let source = self.ast.source().cloned();
        self.listener
            .on_error(AnalysisError::new(source, offset, length, code, args));
    }

    /// Run `parse` one nesting level deeper.
    ///
    /// Past [`MAX_NESTING`] the rest of the construct is skipped up to the next `;` or `}` and
    /// `placeholder` stands in for it. Only the first such error is reported; the enclosing
    /// productions then close with synthetic tokens silently.
    fn nested(&mut self, placeholder: fn(&mut Self) -> NodeId, parse: fn(&mut Self) -> NodeId) -> NodeId {
        if self.depth >= MAX_NESTING {
            if !self.unwinding {
                self.report_current(ErrorCode::NestingTooDeep, &[]);
                self.unwinding = true;
            }
            while !self.is_at_end()
                && !self.check_punct(PunctuationId::Semicolon)
                && !self.check_punct(PunctuationId::CloseCurly)
            {
                self.advance();
            }
            return placeholder(self);
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        if self.depth == 0 {
            self.unwinding = false;
        }
        node
    }

    /// Skip tokens until just after a `;` or `}`, or until a token that starts a declaration.
    fn skip_to_declaration_boundary(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }
            if self.advance_is_boundary() {
                return;
            }
            if self.is_directive_start()
                || self.check_keyword(KeywordId::Class)
                || self.check_keyword(KeywordId::Typedef)
                || self.check_keyword(KeywordId::Abstract)
            {
                return;
            }
        }
    }

    /// Consume one token; return `true` if it was a `;` or `}`.
    fn advance_is_boundary(&mut self) -> bool {
        let kind = self.peek_kind();
        self.advance();
        matches!(
            kind,
            TokenKind::Punctuation(PunctuationId::Semicolon | PunctuationId::CloseCurly)
        )
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    /// Allocate a node spanning from `begin` through the last consumed token.
    fn finish(&mut self, kind: impl Into<NodeKind>, begin: TokenId) -> NodeId {
        let end = self.previous().max(begin);
        self.ast.alloc(kind, begin, end)
    }

    fn begin_of(&self, node: NodeId) -> TokenId {
        self.ast.begin_token(node)
    }

    fn simple_identifier(&mut self, token: TokenId) -> NodeId {
        self.ast.alloc(SimpleIdentifier { token }, token, token)
    }

    /// Parse an identifier, or report one missing and return a synthetic identifier.
    fn parse_simple_identifier(&mut self) -> NodeId {
        if self.check_identifier() {
            let token = self.advance();
            return self.simple_identifier(token);
        }
        self.report_current(ErrorCode::MissingIdentifier, &[]);
        self.synthetic_identifier()
    }

    fn synthetic_identifier(&mut self) -> NodeId {
        let token = self.insert_synthetic(TokenKind::Identifier);
        self.simple_identifier(token)
    }

    fn synthetic_type_name(&mut self) -> NodeId {
        let name = self.synthetic_identifier();
        let token = self.previous();
        self.ast.alloc(
            TypeName {
                name,
                type_arguments: None,
            },
            token,
            token,
        )
    }

    fn synthetic_empty_statement(&mut self) -> NodeId {
        let semicolon = self.insert_synthetic(TokenKind::Punctuation(PunctuationId::Semicolon));
        self.ast.alloc(EmptyStatement { semicolon }, semicolon, semicolon)
    }

    /// Documentation comment immediately preceding the current token.
    ///
    /// A run of `///` lines forms one comment; a `/** */` block stands alone. Comments separated from
    /// the token by a non-documentation comment do not attach.
    fn doc_comment(&mut self) -> Option<NodeId> {
        let token = self.current();
        let token_offset = self.peek().offset;
        let lower = match self.pos.checked_sub(1) {
            Some(prev) => self.tokens()[prev].end(),
            None => 0,
        };
        let comments = self.ast.comments();
        let end = comments.partition_point(|c| c.offset < token_offset);
        let start = comments.partition_point(|c| c.offset < lower);
        let candidates = &comments[start..end];
        let last = candidates.last()?;
        if last.kind != CommentKind::Documentation {
            return None;
        }
        let mut ids = vec![CommentId((start + candidates.len() - 1) as u32)];
        if last.lexeme.starts_with("///") {
            for (i, comment) in candidates.iter().enumerate().rev().skip(1) {
                if comment.kind == CommentKind::Documentation && comment.lexeme.starts_with("///") {
                    ids.push(CommentId((start + i) as u32));
                } else {
                    break;
                }
            }
            ids.reverse();
        }
        Some(self.ast.alloc(
            Comment {
                kind: CommentKind::Documentation,
                comments: ids,
            },
            token,
            token,
        ))
    }
}
