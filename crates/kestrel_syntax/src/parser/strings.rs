/// String literal parsing: simple strings, adjacent strings and interpolation.
///
/// Interpolated literals arrive from the scanner as an opening [`TokenKind::String`] segment,
/// interpolation markers with their embedded tokens, and [`TokenKind::StringPart`] continuation
/// segments. Empty continuation segments are never emitted, so two markers may be adjacent.
impl<'l> Parser<'l> {
    // ========================================================================
    // Strings
    // ========================================================================

    /// One string literal, or several adjacent ones as [`AdjacentStrings`].
    fn parse_string_literal(&mut self) -> NodeId {
        let begin = self.current();
        let mut strings = Vec::new();
        while self.peek_kind() == TokenKind::String {
            strings.push(self.parse_single_string());
        }
        if strings.len() == 1 {
            return strings[0];
        }
        self.finish(AdjacentStrings { strings }, begin)
    }

    fn parse_single_string(&mut self) -> NodeId {
        let begin = self.current();
        let style = StringStyle::of(&self.peek().lexeme);
        let literal = self.advance();
        if !self.is_at_interpolation() {
            let value = segment_value(&self.ast.token(literal).lexeme, style, true, true);
            return self.finish(SimpleStringLiteral { literal, value }, begin);
        }

        let value = segment_value(&self.ast.token(literal).lexeme, style, true, false);
        let mut elements = vec![self.finish(InterpolationString { contents: literal, value }, begin)];
        loop {
            let element_begin = self.current();
            match self.peek_kind() {
                TokenKind::StringInterpolationExpression => {
                    let left_bracket = self.advance();
                    let expression = self.parse_expression();
                    let right_bracket = Some(self.expect_punct(PunctuationId::CloseCurly));
                    elements.push(self.finish(
                        InterpolationExpression {
                            left_bracket,
                            expression,
                            right_bracket,
                        },
                        element_begin,
                    ));
                }
                TokenKind::StringInterpolationIdentifier => {
                    let left_bracket = self.advance();
                    let expression = match self.match_keyword(KeywordId::This) {
                        Some(keyword) => self.finish(ThisExpression { keyword }, self.previous()),
                        None => self.parse_simple_identifier(),
                    };
                    elements.push(self.finish(
                        InterpolationExpression {
                            left_bracket,
                            expression,
                            right_bracket: None,
                        },
                        element_begin,
                    ));
                }
                TokenKind::StringPart => {
                    let contents = self.advance();
                    let last = !self.is_at_interpolation();
                    let value = segment_value(&self.ast.token(contents).lexeme, style, false, last);
                    elements.push(self.finish(InterpolationString { contents, value }, element_begin));
                }
                _ => break,
            }
        }
        self.finish(StringInterpolation { elements }, begin)
    }

    fn is_at_interpolation(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::StringInterpolationExpression | TokenKind::StringInterpolationIdentifier
        )
    }
}

/// Quoting of a string literal, read from its opening segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StringStyle {
    quote: char,
    triple: bool,
    raw: bool,
}

impl StringStyle {
    fn of(lexeme: &str) -> Self {
        let raw = lexeme.starts_with('r');
        let body = if raw { &lexeme[1..] } else { lexeme };
        let quote = body.chars().next().unwrap_or('\'');
        let triple = body.len() >= 3 && body.chars().take(3).all(|c| c == quote);
        Self { quote, triple, raw }
    }

    fn delimiter_len(self) -> usize {
        if self.triple { 3 } else { 1 }
    }
}

/// Value of one string segment: delimiters removed (on the first and last segment) and escapes
/// applied unless the literal is raw.
fn segment_value(lexeme: &str, style: StringStyle, first: bool, last: bool) -> String {
    let mut text = lexeme;
    if first {
        let prefix = usize::from(style.raw) + style.delimiter_len();
        text = text.get(prefix..).unwrap_or("");
        if style.triple {
            text = strip_leading_blank_line(text);
        }
    }
    if last {
        let closing: String = std::iter::repeat_n(style.quote, style.delimiter_len()).collect();
        if let Some(stripped) = text.strip_suffix(closing.as_str()) {
            text = stripped;
        }
    }
    if style.raw {
        text.to_string()
    } else {
        unescape(text)
    }
}

/// A multi-line string ignores its first line when that line holds only whitespace.
fn strip_leading_blank_line(text: &str) -> &str {
    let Some(newline) = text.find('\n') else {
        return text;
    };
    if text[..newline].chars().all(|c| c == ' ' || c == '\t' || c == '\r') {
        &text[newline + 1..]
    } else {
        text
    }
}

/// Apply backslash escapes. Unknown escapes stand for the escaped character itself.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &digits, "\\x");
            }
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
                push_code_point(&mut out, &digits, "\\u");
            }
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                push_code_point(&mut out, &digits, "\\u");
            }
            other => out.push(other),
        }
    }
    out
}

fn push_code_point(out: &mut String, digits: &str, escape: &str) {
    match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push_str(escape);
            out.push_str(digits);
        }
    }
}
