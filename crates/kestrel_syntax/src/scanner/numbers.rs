//! Numeric literal scanning.

use super::Scanner;
use crate::diagnostics::ErrorCode;
use crate::scanner::tokens::TokenKind;

impl Scanner<'_, '_> {
    /// Scan an integer, hexadecimal or double literal.
    ///
    /// `1.` followed by a non-digit scans as the integer `1` followed by a period, so that
    /// `1.toString()` is a method invocation.
    pub(super) fn scan_number(&mut self, start: usize) {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            let digits = self.eat_while(|c| c.is_ascii_hexdigit());
            if digits == 0 {
                self.report(start, self.pos - start, ErrorCode::MissingHexDigit, &[]);
            }
            self.push(TokenKind::HexInt, start);
            return;
        }

        let mut is_double = false;
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9')) {
            self.advance();
            self.eat_while(|c| c.is_ascii_digit());
            is_double = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_start = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.eat_while(|c| c.is_ascii_digit()) == 0 {
                self.report(exponent_start, self.pos - exponent_start, ErrorCode::MissingDigit, &[]);
            }
            is_double = true;
        }
        let kind = if is_double { TokenKind::Double } else { TokenKind::Int };
        self.push(kind, start);
    }

    /// Consume characters while `pred` holds; return how many were consumed.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }
}
