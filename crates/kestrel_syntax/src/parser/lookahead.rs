/// Non-consuming lookahead used to choose between productions.
///
/// All functions here take and return absolute token indices and never modify the stream.
impl<'l> Parser<'l> {
    // ========================================================================
    // Lookahead
    // ========================================================================

    fn token_at(&self, idx: usize) -> &Token {
        let tokens = self.tokens();
        &tokens[idx.min(tokens.len() - 1)]
    }

    fn kind_at(&self, idx: usize) -> TokenKind {
        self.token_at(idx).kind
    }

    /// If a type name starts at `idx`, return the index just past it.
    ///
    /// Accepts `T`, `p.T` and either followed by type arguments; `>>` closes two levels at once.
    fn skip_type(&self, idx: usize) -> Option<usize> {
        if !self.token_at(idx).is_identifier() {
            return None;
        }
        let mut i = idx + 1;
        if self.kind_at(i).is_punctuation(PunctuationId::Period) && self.token_at(i + 1).is_identifier() {
            i += 2;
        }
        if self.kind_at(i).is_operator(OperatorId::Lt) {
            let mut depth = 1usize;
            i += 1;
            while depth > 0 {
                match self.kind_at(i) {
                    TokenKind::Operator(OperatorId::Lt) => depth += 1,
                    TokenKind::Operator(OperatorId::Gt) => depth -= 1,
                    TokenKind::Operator(OperatorId::GtGt) => depth = depth.saturating_sub(2),
                    TokenKind::Punctuation(PunctuationId::Comma | PunctuationId::Period) => {}
                    TokenKind::Identifier | TokenKind::Keyword(_) if self.token_at(i).is_identifier() => {}
                    _ => return None,
                }
                i += 1;
            }
        }
        Some(i)
    }

    /// Return `true` if the current position holds a type followed by a declared name.
    fn is_type_then_name(&self) -> bool {
        self.is_type_then_name_at(self.pos)
    }

    fn is_type_then_name_at(&self, idx: usize) -> bool {
        match self.skip_type(idx) {
            Some(after) => self.is_declared_name_at(after),
            None => false,
        }
    }

    /// An identifier usable as a declared name (`as` would read as a cast).
    fn is_declared_name_at(&self, idx: usize) -> bool {
        let token = self.token_at(idx);
        token.is_identifier() && !token.kind.is_keyword(KeywordId::As)
    }

    /// Index just past the `)` matching the `(` at `idx`.
    fn skip_parens(&self, idx: usize) -> Option<usize> {
        if !self.kind_at(idx).is_punctuation(PunctuationId::OpenParen) {
            return None;
        }
        let mut depth = 0usize;
        let mut i = idx;
        loop {
            match self.kind_at(i) {
                TokenKind::Punctuation(PunctuationId::OpenParen) => depth += 1,
                TokenKind::Punctuation(PunctuationId::CloseParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            i += 1;
        }
    }

    /// Return `true` if a parameter list at `idx` is followed by a function body.
    fn is_function_at(&self, idx: usize) -> bool {
        match self.skip_parens(idx) {
            Some(after) => matches!(
                self.kind_at(after),
                TokenKind::Punctuation(PunctuationId::OpenCurly | PunctuationId::FatArrow)
            ),
            None => false,
        }
    }

    /// `get`/`set` at `idx` followed by a name.
    fn is_property_keyword_at(&self, idx: usize) -> bool {
        let kind = self.kind_at(idx);
        (kind.is_keyword(KeywordId::Get) || kind.is_keyword(KeywordId::Set)) && self.is_declared_name_at(idx + 1)
    }

    /// `operator` at `idx` followed by an operator that can be declared.
    fn is_operator_declaration_at(&self, idx: usize) -> bool {
        if !self.kind_at(idx).is_keyword(KeywordId::Operator) {
            return false;
        }
        match self.kind_at(idx + 1) {
            TokenKind::Operator(op) => op.is_user_definable(),
            TokenKind::Punctuation(PunctuationId::OpenSquare) => {
                self.kind_at(idx + 2).is_punctuation(PunctuationId::CloseSquare)
            }
            _ => false,
        }
    }

    /// `import`, `export`, `library` or `part` in directive position.
    fn is_directive_start(&self) -> bool {
        let next = self.kind_at(self.pos + 1);
        match self.peek_kind() {
            TokenKind::Keyword(KeywordId::Import | KeywordId::Export) => {
                next == TokenKind::String
                    || (self.token_at(self.pos + 1).is_identifier()
                        && self.kind_at(self.pos + 2).is_punctuation(PunctuationId::Semicolon))
            }
            TokenKind::Keyword(KeywordId::Part) => next == TokenKind::String || next.is_keyword(KeywordId::Of),
            TokenKind::Keyword(KeywordId::Library) => self.token_at(self.pos + 1).is_identifier(),
            _ => false,
        }
    }

    /// Return `true` if the current token can begin an expression.
    fn is_at_expression_start(&self) -> bool {
        let token = self.peek();
        if token.is_identifier() {
            return true;
        }
        match token.kind {
            TokenKind::Int | TokenKind::HexInt | TokenKind::Double | TokenKind::String => true,
            TokenKind::Keyword(k) => matches!(
                k,
                KeywordId::This
                    | KeywordId::Super
                    | KeywordId::Null
                    | KeywordId::True
                    | KeywordId::False
                    | KeywordId::New
                    | KeywordId::Const
                    | KeywordId::Throw
                    | KeywordId::Rethrow
            ),
            TokenKind::Punctuation(p) => matches!(
                p,
                PunctuationId::OpenParen | PunctuationId::OpenSquare | PunctuationId::OpenCurly
            ),
            TokenKind::Operator(o) => matches!(
                o,
                OperatorId::Lt
                    | OperatorId::Minus
                    | OperatorId::Bang
                    | OperatorId::Tilde
                    | OperatorId::PlusPlus
                    | OperatorId::MinusMinus
            ),
            _ => false,
        }
    }
}
