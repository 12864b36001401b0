//! Scanner: converts source text into a [`TokenStream`].
//!
//! Handles:
//! - Keywords and identifiers (`$` is an identifier character)
//! - Integer, hexadecimal and double literals
//! - Single, double, triple-quoted and raw strings, including `$id` and `${expr}` interpolation
//! - Maximal-munch operators (`>>=` before `>>` before `>=` before `>`)
//! - Line, block (nesting) and documentation comments, kept beside the token stream
//!
//! ## Notes
//! - Scanning is total: every input yields a stream ending in exactly one EOF token. Illegal
//!   characters are reported and skipped, unterminated literals are reported and closed at the
//!   end of the line or file.
//! - `>>` is always one token; the parser splits it when it closes nested type arguments.
//!
//! ## Module Structure
//!
//! - `keywords` - keyword registry
//! - `tokens` - token types (TokenKind, Token, TokenStream)
//! - `strings` - string literal and interpolation scanning
//! - `numbers` - numeric literal scanning

pub mod keywords;
mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{
    CommentKind, CommentToken, OperatorId, Precedence, PunctuationId, Token, TokenId, TokenKind, TokenStream,
};

use crate::diagnostics::{AnalysisError, ErrorCode, ErrorListener, LineInfo};
use crate::source::Source;

/// Scan `text` without an owning source.
#[tracing::instrument(skip_all, fields(len = text.len()))]
pub fn scan(text: &str, listener: &mut dyn ErrorListener) -> TokenStream {
    Scanner::new(None, text, listener).tokenize()
}

/// Scan `text` as the content of `source`; reported errors carry the source.
#[tracing::instrument(skip_all, fields(source = %source, len = text.len()))]
pub fn scan_source(source: &Source, text: &str, listener: &mut dyn ErrorListener) -> TokenStream {
    Scanner::new(Some(source.clone()), text, listener).tokenize()
}

/// How the string currently being scanned is delimited.
#[derive(Debug, Clone, Copy)]
struct StringMode {
    quote: char,
    triple: bool,
    raw: bool,
}

/// An open `{` or `${`; `}` pops the innermost group.
#[derive(Debug, Clone, Copy)]
enum Group {
    Brace,
    Interpolation { mode: StringMode, offset: usize },
}

// ============================================================================
// SCANNER STATE
// ============================================================================

/// Scanner over one source text.
pub struct Scanner<'a, 'l> {
    source: &'a str,
    origin: Option<Source>,
    pos: usize,
    tokens: Vec<Token>,
    comments: Vec<CommentToken>,
    groups: Vec<Group>,
    listener: &'l mut dyn ErrorListener,
}

impl<'a, 'l> Scanner<'a, 'l> {
    pub fn new(origin: Option<Source>, source: &'a str, listener: &'l mut dyn ErrorListener) -> Self {
        Self {
            source,
            origin,
            pos: 0,
            tokens: Vec::new(),
            comments: Vec::new(),
            groups: Vec::new(),
            listener,
        }
    }

    /// Scan the whole text.
    pub fn tokenize(mut self) -> TokenStream {
        while let Some(c) = self.peek() {
            self.scan_token(c);
        }

        let open: Vec<usize> = self
            .groups
            .iter()
            .filter_map(|g| match g {
                Group::Interpolation { offset, .. } => Some(*offset),
                Group::Brace => None,
            })
            .collect();
        if let Some(offset) = open.first() {
            self.report(*offset, self.pos - offset, ErrorCode::UnterminatedStringLiteral, &[]);
        }

        self.tokens.push(Token::new(TokenKind::Eof, "", self.source.len()));
        TokenStream {
            source: self.origin,
            tokens: self.tokens,
            comments: self.comments,
            line_info: LineInfo::from_text(self.source),
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, &self.source[start..self.pos], start));
    }

    fn report(&mut self, offset: usize, length: usize, code: ErrorCode, args: &[&str]) {
        self.listener
            .on_error(AnalysisError::new(self.origin.clone(), offset, length, code, args));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self, c: char) {
        let start = self.pos;
        match c {
            ' ' | '\t' | '\n' | '\r' | '\u{feff}' => {
                self.advance();
            }
            'r' if matches!(self.peek_at(1), Some('\'' | '"')) => {
                self.advance();
                self.scan_string(start, true);
            }
            '\'' | '"' => self.scan_string(start, false),
            c if is_identifier_start(c) => self.scan_identifier_or_keyword(start, true),
            '0'..='9' => self.scan_number(start),
            '.' if matches!(self.peek_at(1), Some('0'..='9')) => self.scan_number(start),
            '/' => match self.peek_at(1) {
                Some('/') => self.scan_line_comment(start),
                Some('*') => self.scan_block_comment(start),
                _ => self.scan_operator(start),
            },
            '{' => {
                self.advance();
                self.groups.push(Group::Brace);
                self.push(TokenKind::Punctuation(PunctuationId::OpenCurly), start);
            }
            '}' => {
                self.advance();
                self.push(TokenKind::Punctuation(PunctuationId::CloseCurly), start);
                if let Some(Group::Interpolation { mode, .. }) = self.groups.pop() {
                    self.scan_string_body(self.pos, mode, TokenKind::StringPart);
                }
            }
            _ => self.scan_operator(start),
        }
    }

    pub(crate) fn scan_identifier_or_keyword(&mut self, start: usize, allow_dollar: bool) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || (allow_dollar && c == '$') {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.pos];
        let kind = match keywords::from_str(word) {
            Some(k) => TokenKind::Keyword(k),
            None => TokenKind::Identifier,
        };
        self.push(kind, start);
    }

    fn scan_operator(&mut self, start: usize) {
        use OperatorId as O;
        use PunctuationId as P;

        let rest = self.rest();
        let candidates: &[(&str, TokenKind)] = &[
            ("~/=", TokenKind::Operator(O::TildeSlashEq)),
            ("<<=", TokenKind::Operator(O::LtLtEq)),
            (">>=", TokenKind::Operator(O::GtGtEq)),
            ("~/", TokenKind::Operator(O::TildeSlash)),
            ("++", TokenKind::Operator(O::PlusPlus)),
            ("--", TokenKind::Operator(O::MinusMinus)),
            ("==", TokenKind::Operator(O::EqEq)),
            ("!=", TokenKind::Operator(O::BangEq)),
            ("<=", TokenKind::Operator(O::LtEq)),
            (">=", TokenKind::Operator(O::GtEq)),
            ("<<", TokenKind::Operator(O::LtLt)),
            (">>", TokenKind::Operator(O::GtGt)),
            ("&&", TokenKind::Operator(O::AmpAmp)),
            ("||", TokenKind::Operator(O::BarBar)),
            ("+=", TokenKind::Operator(O::PlusEq)),
            ("-=", TokenKind::Operator(O::MinusEq)),
            ("*=", TokenKind::Operator(O::StarEq)),
            ("/=", TokenKind::Operator(O::SlashEq)),
            ("%=", TokenKind::Operator(O::PercentEq)),
            ("&=", TokenKind::Operator(O::AmpEq)),
            ("|=", TokenKind::Operator(O::BarEq)),
            ("^=", TokenKind::Operator(O::CaretEq)),
            ("=>", TokenKind::Punctuation(P::FatArrow)),
            ("..", TokenKind::Punctuation(P::PeriodPeriod)),
            ("+", TokenKind::Operator(O::Plus)),
            ("-", TokenKind::Operator(O::Minus)),
            ("*", TokenKind::Operator(O::Star)),
            ("/", TokenKind::Operator(O::Slash)),
            ("%", TokenKind::Operator(O::Percent)),
            ("=", TokenKind::Operator(O::Eq)),
            ("<", TokenKind::Operator(O::Lt)),
            (">", TokenKind::Operator(O::Gt)),
            ("&", TokenKind::Operator(O::Amp)),
            ("|", TokenKind::Operator(O::Bar)),
            ("^", TokenKind::Operator(O::Caret)),
            ("~", TokenKind::Operator(O::Tilde)),
            ("!", TokenKind::Operator(O::Bang)),
            ("(", TokenKind::Punctuation(P::OpenParen)),
            (")", TokenKind::Punctuation(P::CloseParen)),
            ("[", TokenKind::Punctuation(P::OpenSquare)),
            ("]", TokenKind::Punctuation(P::CloseSquare)),
            (";", TokenKind::Punctuation(P::Semicolon)),
            (",", TokenKind::Punctuation(P::Comma)),
            (":", TokenKind::Punctuation(P::Colon)),
            (".", TokenKind::Punctuation(P::Period)),
            ("?", TokenKind::Punctuation(P::Question)),
            ("#", TokenKind::Punctuation(P::Hash)),
            ("@", TokenKind::Punctuation(P::At)),
        ];

        for (spelling, kind) in candidates {
            if rest.starts_with(spelling) {
                self.pos += spelling.len();
                self.push(*kind, start);
                return;
            }
        }

        // Nothing matched: report and skip the character.
        let c = self.advance().unwrap_or('\0');
        let text = c.to_string();
        self.report(start, c.len_utf8(), ErrorCode::IllegalCharacter, &[&text]);
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn scan_line_comment(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance();
        }
        let lexeme = &self.source[start..self.pos];
        let kind = if lexeme.starts_with("///") && !lexeme.starts_with("////") {
            CommentKind::Documentation
        } else {
            CommentKind::SingleLine
        };
        self.comments.push(CommentToken {
            kind,
            lexeme: lexeme.to_string(),
            offset: start,
        });
    }

    fn scan_block_comment(&mut self, start: usize) {
        // Skip the opening `/*`.
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            let rest = self.rest();
            if rest.is_empty() {
                self.report(start, self.pos - start, ErrorCode::UnterminatedMultiLineComment, &[]);
                break;
            }
            if rest.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
            } else {
                self.advance();
            }
        }
        let lexeme = &self.source[start..self.pos];
        let kind = if lexeme.starts_with("/**") && lexeme != "/**/" {
            CommentKind::Documentation
        } else {
            CommentKind::MultiLine
        };
        self.comments.push(CommentToken {
            kind,
            lexeme: lexeme.to_string(),
            offset: start,
        });
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests;
