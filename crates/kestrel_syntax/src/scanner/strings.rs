//! String literal scanning, including interpolation.
//!
//! `'a${b}c$d'` scans as: String `'a`, `${`, Identifier `b`, `}`, StringPart `c`, `$`,
//! Identifier `d`, StringPart `'`. Empty continuation segments are not emitted, so token
//! offsets stay strictly increasing.

use super::{Group, Scanner, StringMode, is_identifier_start};
use crate::diagnostics::ErrorCode;
use crate::scanner::tokens::TokenKind;

impl Scanner<'_, '_> {
    /// Scan a string literal whose opening quote is at the current position.
    ///
    /// `start` is the offset of the literal, including an `r` prefix for raw strings.
    pub(super) fn scan_string(&mut self, start: usize, raw: bool) {
        let quote = self.peek().unwrap_or('\'');
        let triple_quote: String = std::iter::repeat_n(quote, 3).collect();
        let triple = self.rest().starts_with(&triple_quote);
        self.pos += if triple { 3 } else { 1 };
        self.scan_string_body(start, StringMode { quote, triple, raw }, TokenKind::String);
    }

    /// Scan string content up to the closing quote or the next interpolation.
    pub(super) fn scan_string_body(&mut self, mut start: usize, mode: StringMode, mut kind: TokenKind) {
        loop {
            let Some(c) = self.peek() else {
                self.report(start, self.pos - start, ErrorCode::UnterminatedStringLiteral, &[]);
                self.push_segment(kind, start);
                return;
            };
            match c {
                c if c == mode.quote => {
                    if !mode.triple {
                        self.advance();
                        self.push_segment(kind, start);
                        return;
                    }
                    let closing: String = std::iter::repeat_n(mode.quote, 3).collect();
                    if self.rest().starts_with(&closing) {
                        self.pos += 3;
                        self.push_segment(kind, start);
                        return;
                    }
                    self.advance();
                }
                '\\' if !mode.raw => {
                    self.advance();
                    self.advance();
                }
                '\n' | '\r' if !mode.triple => {
                    self.report(start, self.pos - start, ErrorCode::UnterminatedStringLiteral, &[]);
                    self.push_segment(kind, start);
                    return;
                }
                '$' if !mode.raw => match self.peek_at(1) {
                    Some('{') => {
                        self.push_segment(kind, start);
                        let marker = self.pos;
                        self.pos += 2;
                        self.push(TokenKind::StringInterpolationExpression, marker);
                        self.groups.push(Group::Interpolation { mode, offset: marker });
                        return;
                    }
                    Some(next) if is_identifier_start(next) && next != '$' => {
                        self.push_segment(kind, start);
                        let marker = self.pos;
                        self.advance();
                        self.push(TokenKind::StringInterpolationIdentifier, marker);
                        self.scan_identifier_or_keyword(self.pos, false);
                        start = self.pos;
                        kind = TokenKind::StringPart;
                    }
                    _ => {
                        self.advance();
                    }
                },
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Emit a string segment unless it is an empty continuation.
    fn push_segment(&mut self, kind: TokenKind, start: usize) {
        if self.pos > start {
            self.push(kind, start);
        }
    }
}
