//! Token types produced by the scanner.
//!
//! Vocabulary tokens carry stable IDs:
//! - `Keyword(KeywordId)` for keywords (reserved, built-in and pseudo)
//! - `Operator(OperatorId)` for operators, including assignment operators
//! - `Punctuation(PunctuationId)` for brackets, separators and `=>`
//!
//! ## Notes
//! - A token's length is the byte length of its lexeme. Synthetic tokens inserted by the parser
//!   during error recovery have an empty lexeme and therefore zero length.
//! - String literals containing interpolation are split into several tokens: the opening
//!   [`TokenKind::String`] segment, interpolation markers, the embedded tokens, and
//!   [`TokenKind::StringPart`] continuation segments.

use crate::diagnostics::LineInfo;
use crate::source::Source;

use super::keywords::{self, KeywordCategory, KeywordId};

// ============================================================================
// OPERATORS AND PUNCTUATION
// ============================================================================

/// Stable identifier for operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    TildeSlash,
    PlusPlus,
    MinusMinus,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    LtLt,
    GtGt,
    Amp,
    Bar,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    BarBar,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    TildeSlashEq,
    LtLtEq,
    GtGtEq,
    AmpEq,
    BarEq,
    CaretEq,
    /// `[]`, only formed by the parser inside `operator` declarations.
    Index,
    /// `[]=`, only formed by the parser inside `operator` declarations.
    IndexEq,
}

/// Binary precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Assignment,
    LogicalOr,
    LogicalAnd,
    Equality,
    Relational,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Shift,
    Additive,
    Multiplicative,
}

impl OperatorId {
    pub fn as_str(self) -> &'static str {
        use OperatorId::*;
        match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            TildeSlash => "~/",
            PlusPlus => "++",
            MinusMinus => "--",
            Eq => "=",
            EqEq => "==",
            BangEq => "!=",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            LtLt => "<<",
            GtGt => ">>",
            Amp => "&",
            Bar => "|",
            Caret => "^",
            Tilde => "~",
            Bang => "!",
            AmpAmp => "&&",
            BarBar => "||",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            TildeSlashEq => "~/=",
            LtLtEq => "<<=",
            GtGtEq => ">>=",
            AmpEq => "&=",
            BarEq => "|=",
            CaretEq => "^=",
            Index => "[]",
            IndexEq => "[]=",
        }
    }

    /// Precedence when used as a binary operator.
    pub fn precedence(self) -> Precedence {
        use OperatorId::*;
        match self {
            Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | TildeSlashEq | LtLtEq | GtGtEq | AmpEq
            | BarEq | CaretEq => Precedence::Assignment,
            BarBar => Precedence::LogicalOr,
            AmpAmp => Precedence::LogicalAnd,
            EqEq | BangEq => Precedence::Equality,
            Lt | Gt | LtEq | GtEq => Precedence::Relational,
            Bar => Precedence::BitwiseOr,
            Caret => Precedence::BitwiseXor,
            Amp => Precedence::BitwiseAnd,
            LtLt | GtGt => Precedence::Shift,
            Plus | Minus => Precedence::Additive,
            Star | Slash | Percent | TildeSlash => Precedence::Multiplicative,
            PlusPlus | MinusMinus | Tilde | Bang | Index | IndexEq => Precedence::None,
        }
    }

    pub fn is_assignment(self) -> bool {
        self.precedence() == Precedence::Assignment
    }

    /// For compound assignments, the binary operator applied (`+=` -> `+`).
    pub fn binary_of_assignment(self) -> Option<OperatorId> {
        use OperatorId::*;
        Some(match self {
            PlusEq => Plus,
            MinusEq => Minus,
            StarEq => Star,
            SlashEq => Slash,
            PercentEq => Percent,
            TildeSlashEq => TildeSlash,
            LtLtEq => LtLt,
            GtGtEq => GtGt,
            AmpEq => Amp,
            BarEq => Bar,
            CaretEq => Caret,
            _ => return None,
        })
    }

    /// Operators a class may declare with `operator`.
    pub fn is_user_definable(self) -> bool {
        use OperatorId::*;
        matches!(
            self,
            Plus | Minus
                | Star
                | Slash
                | Percent
                | TildeSlash
                | EqEq
                | Lt
                | Gt
                | LtEq
                | GtEq
                | LtLt
                | GtGt
                | Amp
                | Bar
                | Caret
                | Tilde
                | Index
                | IndexEq
        )
    }
}

/// Stable identifier for punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationId {
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
    Semicolon,
    Comma,
    Colon,
    Period,
    PeriodPeriod,
    Question,
    Hash,
    At,
    FatArrow,
}

impl PunctuationId {
    pub fn as_str(self) -> &'static str {
        use PunctuationId::*;
        match self {
            OpenParen => "(",
            CloseParen => ")",
            OpenSquare => "[",
            CloseSquare => "]",
            OpenCurly => "{",
            CloseCurly => "}",
            Semicolon => ";",
            Comma => ",",
            Colon => ":",
            Period => ".",
            PeriodPeriod => "..",
            Question => "?",
            Hash => "#",
            At => "@",
            FatArrow => "=>",
        }
    }
}

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and literals ==========
    Identifier,
    Int,
    HexInt,
    Double,
    /// Opening segment of a string literal, starting at the quote (or `r` prefix).
    String,
    /// Segment of a string literal following an interpolation.
    StringPart,
    /// `${` inside a string literal.
    StringInterpolationExpression,
    /// `$` inside a string literal, followed by an identifier token.
    StringInterpolationIdentifier,

    // ========== Special ==========
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }

    /// Text used in "expected X" diagnostics and for synthetic tokens.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Keyword(k) => keywords::as_str(*k),
            TokenKind::Operator(o) => o.as_str(),
            TokenKind::Punctuation(p) => p.as_str(),
            TokenKind::Identifier => "identifier",
            TokenKind::Int | TokenKind::HexInt => "integer",
            TokenKind::Double => "double",
            TokenKind::String | TokenKind::StringPart => "string",
            TokenKind::StringInterpolationExpression => "${",
            TokenKind::StringInterpolationIdentifier => "$",
            TokenKind::Eof => "end of file",
        }
    }
}

/// Index of a token inside a [`TokenStream`] or a syntax tree's token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A token with its kind, text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            offset,
        }
    }

    /// A zero-length token standing in for a missing one.
    pub fn synthetic(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            lexeme: String::new(),
            offset,
        }
    }

    pub fn len(&self) -> usize {
        self.lexeme.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexeme.is_empty()
    }

    pub fn end(&self) -> usize {
        self.offset + self.len()
    }

    /// Synthetic tokens are the only empty tokens besides EOF.
    pub fn is_synthetic(&self) -> bool {
        self.lexeme.is_empty() && self.kind != TokenKind::Eof
    }

    pub fn keyword(&self) -> Option<KeywordId> {
        match self.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// Identifiers, plus built-in and pseudo keywords used in identifier position.
    pub fn is_identifier(&self) -> bool {
        match self.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword(k) => keywords::category(k) != KeywordCategory::Reserved,
            _ => false,
        }
    }
}

/// Kind of comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    SingleLine,
    MultiLine,
    /// `///` or `/** */`.
    Documentation,
}

/// A comment; comments live beside the token stream rather than in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentToken {
    pub kind: CommentKind,
    pub lexeme: String,
    pub offset: usize,
}

impl CommentToken {
    pub fn end(&self) -> usize {
        self.offset + self.lexeme.len()
    }
}

/// Output of the scanner: ordered tokens ending in one EOF token, plus comments and line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub source: Option<Source>,
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentToken>,
    pub line_info: LineInfo,
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn first(&self) -> TokenId {
        TokenId(0)
    }

    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        let next = id.index() + 1;
        (next < self.tokens.len()).then(|| TokenId(next as u32))
    }

    pub fn previous(&self, id: TokenId) -> Option<TokenId> {
        id.index().checked_sub(1).map(|i| TokenId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Token kinds in order, handy in tests.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    /// Lexemes in order, excluding EOF.
    pub fn lexemes(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.lexeme.as_str())
            .collect()
    }
}
