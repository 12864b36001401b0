//! Keyword vocabulary.
//!
//! This module is the single source of truth for keywords: a stable identifier ([`KeywordId`])
//! plus a const metadata table ([`KEYWORDS`]) recording the spelling and category of each.
//!
//! ## Notes
//! - Lookup via [`from_str`] is case-sensitive.
//! - Built-in identifiers and pseudo-keywords are keywords to the scanner but may still be used as
//!   identifiers; the parser consults [`KeywordCategory`] to decide.
//!
//! ## Examples
//! ```rust
//! use kestrel_syntax::scanner::keywords::{self, KeywordCategory, KeywordId};
//!
//! assert_eq!(keywords::from_str("class"), Some(KeywordId::Class));
//! assert_eq!(keywords::as_str(KeywordId::Class), "class");
//! assert_eq!(keywords::category(KeywordId::Show), KeywordCategory::Pseudo);
//! ```

/// Stable identifier for every keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordId {
    Abstract,
    As,
    Assert,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Dynamic,
    Else,
    Export,
    Extends,
    External,
    Factory,
    False,
    Final,
    Finally,
    For,
    Get,
    Hide,
    If,
    Implements,
    Import,
    In,
    Is,
    Library,
    New,
    Null,
    Of,
    On,
    Operator,
    Part,
    Rethrow,
    Return,
    Set,
    Show,
    Static,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typedef,
    Var,
    Void,
    While,
    With,
}

/// How strongly a keyword is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// Never usable as an identifier.
    Reserved,
    /// Usable as an identifier, but not as a type name.
    BuiltIn,
    /// Only meaningful in specific positions; otherwise an ordinary identifier.
    Pseudo,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub spelling: &'static str,
    pub category: KeywordCategory,
}

const fn info(id: KeywordId, spelling: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo { id, spelling, category }
}

use KeywordCategory::{BuiltIn, Pseudo, Reserved};

/// Registry of all keywords, in alphabetical order.
pub const KEYWORDS: &[KeywordInfo] = &[
    info(KeywordId::Abstract, "abstract", BuiltIn),
    info(KeywordId::As, "as", BuiltIn),
    info(KeywordId::Assert, "assert", Reserved),
    info(KeywordId::Break, "break", Reserved),
    info(KeywordId::Case, "case", Reserved),
    info(KeywordId::Catch, "catch", Reserved),
    info(KeywordId::Class, "class", Reserved),
    info(KeywordId::Const, "const", Reserved),
    info(KeywordId::Continue, "continue", Reserved),
    info(KeywordId::Default, "default", Reserved),
    info(KeywordId::Do, "do", Reserved),
    info(KeywordId::Dynamic, "dynamic", BuiltIn),
    info(KeywordId::Else, "else", Reserved),
    info(KeywordId::Export, "export", BuiltIn),
    info(KeywordId::Extends, "extends", Reserved),
    info(KeywordId::External, "external", BuiltIn),
    info(KeywordId::Factory, "factory", BuiltIn),
    info(KeywordId::False, "false", Reserved),
    info(KeywordId::Final, "final", Reserved),
    info(KeywordId::Finally, "finally", Reserved),
    info(KeywordId::For, "for", Reserved),
    info(KeywordId::Get, "get", BuiltIn),
    info(KeywordId::Hide, "hide", Pseudo),
    info(KeywordId::If, "if", Reserved),
    info(KeywordId::Implements, "implements", BuiltIn),
    info(KeywordId::Import, "import", BuiltIn),
    info(KeywordId::In, "in", Reserved),
    info(KeywordId::Is, "is", Reserved),
    info(KeywordId::Library, "library", BuiltIn),
    info(KeywordId::New, "new", Reserved),
    info(KeywordId::Null, "null", Reserved),
    info(KeywordId::Of, "of", Pseudo),
    info(KeywordId::On, "on", Pseudo),
    info(KeywordId::Operator, "operator", BuiltIn),
    info(KeywordId::Part, "part", BuiltIn),
    info(KeywordId::Rethrow, "rethrow", Reserved),
    info(KeywordId::Return, "return", Reserved),
    info(KeywordId::Set, "set", BuiltIn),
    info(KeywordId::Show, "show", Pseudo),
    info(KeywordId::Static, "static", BuiltIn),
    info(KeywordId::Super, "super", Reserved),
    info(KeywordId::Switch, "switch", Reserved),
    info(KeywordId::This, "this", Reserved),
    info(KeywordId::Throw, "throw", Reserved),
    info(KeywordId::True, "true", Reserved),
    info(KeywordId::Try, "try", Reserved),
    info(KeywordId::Typedef, "typedef", BuiltIn),
    info(KeywordId::Var, "var", Reserved),
    info(KeywordId::Void, "void", Reserved),
    info(KeywordId::While, "while", Reserved),
    info(KeywordId::With, "with", Reserved),
];

/// Look up the metadata for a keyword.
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    // The table is complete; a missing entry is a registry bug caught by the tests below.
    KEYWORDS.iter().find(|k| k.id == id).unwrap_or(&KEYWORDS[0])
}

/// Resolve a spelling to its keyword, if any.
pub fn from_str(word: &str) -> Option<KeywordId> {
    KEYWORDS
        .binary_search_by(|k| k.spelling.cmp(word))
        .ok()
        .map(|idx| KEYWORDS[idx].id)
}

/// Canonical spelling of a keyword.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).spelling
}

pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_sorted_and_complete() {
        for pair in KEYWORDS.windows(2) {
            assert!(pair[0].spelling < pair[1].spelling, "{} >= {}", pair[0].spelling, pair[1].spelling);
        }
        for keyword in KEYWORDS {
            assert_eq!(info_for(keyword.id).spelling, keyword.spelling);
            assert_eq!(from_str(keyword.spelling), Some(keyword.id));
        }
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(from_str("Class"), None);
        assert_eq!(from_str("foo"), None);
        assert_eq!(from_str(""), None);
    }
}
