/// Directive parsing: `library`, `import`, `export`, `part` and `part of`.
impl<'l> Parser<'l> {
    // ========================================================================
    // Directives
    // ========================================================================

    fn parse_directive(&mut self, comment: Option<NodeId>) -> NodeId {
        let begin = self.current();
        match self.peek_kind() {
            TokenKind::Keyword(KeywordId::Library) => {
                let keyword = self.advance();
                let name = self.parse_library_identifier();
                let semicolon = self.expect_punct(PunctuationId::Semicolon);
                self.finish(
                    LibraryDirective {
                        comment,
                        keyword,
                        name,
                        semicolon,
                    },
                    begin,
                )
            }
            TokenKind::Keyword(KeywordId::Import) => {
                let keyword = self.advance();
                let uri = self.parse_uri();
                let (as_token, prefix) = match self.match_keyword(KeywordId::As) {
                    Some(as_token) => (Some(as_token), Some(self.parse_simple_identifier())),
                    None => (None, None),
                };
                let combinators = self.parse_combinators();
                let semicolon = self.expect_punct(PunctuationId::Semicolon);
                self.finish(
                    ImportDirective {
                        comment,
                        keyword,
                        uri,
                        as_token,
                        prefix,
                        combinators,
                        semicolon,
                    },
                    begin,
                )
            }
            TokenKind::Keyword(KeywordId::Export) => {
                let keyword = self.advance();
                let uri = self.parse_uri();
                let combinators = self.parse_combinators();
                let semicolon = self.expect_punct(PunctuationId::Semicolon);
                self.finish(
                    ExportDirective {
                        comment,
                        keyword,
                        uri,
                        combinators,
                        semicolon,
                    },
                    begin,
                )
            }
            _ => {
                let part_keyword = self.expect_keyword(KeywordId::Part);
                if let Some(of_keyword) = self.match_keyword(KeywordId::Of) {
                    let library_name = self.parse_library_identifier();
                    let semicolon = self.expect_punct(PunctuationId::Semicolon);
                    return self.finish(
                        PartOfDirective {
                            comment,
                            part_keyword,
                            of_keyword,
                            library_name,
                            semicolon,
                        },
                        begin,
                    );
                }
                let uri = self.parse_uri();
                let semicolon = self.expect_punct(PunctuationId::Semicolon);
                self.finish(
                    PartDirective {
                        comment,
                        keyword: part_keyword,
                        uri,
                        semicolon,
                    },
                    begin,
                )
            }
        }
    }

    /// A directive URI: a string literal, possibly adjacent strings.
    fn parse_uri(&mut self) -> NodeId {
        if self.peek_kind() == TokenKind::String {
            return self.parse_string_literal();
        }
        if self.check_identifier() {
            // `import foo;` - consume the name so recovery resumes at the semicolon.
            let token = self.advance();
            self.report(ErrorCode::NonStringLiteralAsUri, token, &[]);
            return self.simple_identifier(token);
        }
        self.report_current(ErrorCode::ExpectedStringLiteral, &[]);
        let literal = self.insert_synthetic(TokenKind::String);
        self.ast.alloc(
            SimpleStringLiteral {
                literal,
                value: String::new(),
            },
            literal,
            literal,
        )
    }

    fn parse_combinators(&mut self) -> NodeList {
        let mut combinators = Vec::new();
        loop {
            let begin = self.current();
            if let Some(keyword) = self.match_keyword(KeywordId::Show) {
                let names = self.parse_identifier_list();
                combinators.push(self.finish(ShowCombinator { keyword, names }, begin));
            } else if let Some(keyword) = self.match_keyword(KeywordId::Hide) {
                let names = self.parse_identifier_list();
                combinators.push(self.finish(HideCombinator { keyword, names }, begin));
            } else {
                return combinators;
            }
        }
    }

    fn parse_identifier_list(&mut self) -> NodeList {
        let mut names = vec![self.parse_simple_identifier()];
        while self.match_punct(PunctuationId::Comma).is_some() {
            names.push(self.parse_simple_identifier());
        }
        names
    }

    /// Dotted library name, `a.b.c`.
    fn parse_library_identifier(&mut self) -> NodeId {
        let begin = self.current();
        let mut components = vec![self.parse_simple_identifier()];
        while self.check_punct(PunctuationId::Period) && self.peek_at(1).is_identifier() {
            self.advance();
            components.push(self.parse_simple_identifier());
        }
        self.finish(LibraryIdentifier { components }, begin)
    }
}
