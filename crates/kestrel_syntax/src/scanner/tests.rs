use super::*;
use crate::diagnostics::GatheringErrorListener;
use crate::scanner::keywords::KeywordId;

fn scan_str(text: &str) -> (TokenStream, GatheringErrorListener) {
    let mut listener = GatheringErrorListener::new();
    let tokens = scan(text, &mut listener);
    (tokens, listener)
}

fn kinds(text: &str) -> Vec<TokenKind> {
    let (tokens, listener) = scan_str(text);
    listener.assert_no_errors();
    tokens.kinds()
}

// ========================================
// Identifiers and keywords
// ========================================

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("class Foo extends _bar$"),
        vec![
            TokenKind::Keyword(KeywordId::Class),
            TokenKind::Identifier,
            TokenKind::Keyword(KeywordId::Extends),
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_builtin_keyword_is_identifier_token() {
    let (tokens, _) = scan_str("get show");
    assert!(tokens.tokens[0].is_identifier());
    assert!(tokens.tokens[1].is_identifier());
    let (tokens, _) = scan_str("class");
    assert!(!tokens.tokens[0].is_identifier());
}

// ========================================
// Operators
// ========================================

#[test]
fn test_maximal_munch() {
    use OperatorId as O;
    assert_eq!(
        kinds("a >>= b >> c >= d > e"),
        vec![
            TokenKind::Identifier,
            TokenKind::Operator(O::GtGtEq),
            TokenKind::Identifier,
            TokenKind::Operator(O::GtGt),
            TokenKind::Identifier,
            TokenKind::Operator(O::GtEq),
            TokenKind::Identifier,
            TokenKind::Operator(O::Gt),
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    let (tokens, _) = scan_str("x ~/= y ~/ z..w => !=");
    assert_eq!(tokens.lexemes(), vec!["x", "~/=", "y", "~/", "z", "..", "w", "=>", "!="]);
}

#[test]
fn test_nested_generic_close_is_one_token() {
    let (tokens, _) = scan_str("List<List<int>>");
    assert_eq!(tokens.lexemes(), vec!["List", "<", "List", "<", "int", ">>"]);
}

// ========================================
// Numbers
// ========================================

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("1 0x1F 1.5 .5 1e10 2.5E-3"),
        vec![
            TokenKind::Int,
            TokenKind::HexInt,
            TokenKind::Double,
            TokenKind::Double,
            TokenKind::Double,
            TokenKind::Double,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_int_followed_by_member_access() {
    let (tokens, _) = scan_str("1.toString()");
    assert_eq!(tokens.lexemes(), vec!["1", ".", "toString", "(", ")"]);
}

#[test]
fn test_missing_hex_digit() {
    let (tokens, listener) = scan_str("0x;");
    listener.assert_errors(&[ErrorCode::MissingHexDigit]);
    assert_eq!(tokens.lexemes(), vec!["0x", ";"]);
}

#[test]
fn test_missing_exponent_digit() {
    let (_, listener) = scan_str("1e+");
    listener.assert_errors(&[ErrorCode::MissingDigit]);
}

// ========================================
// Strings
// ========================================

#[test]
fn test_simple_strings() {
    let (tokens, listener) = scan_str(r#"'a' "b" r'c\d' '''x
y'''"#);
    listener.assert_no_errors();
    assert_eq!(tokens.lexemes(), vec!["'a'", "\"b\"", r"r'c\d'", "'''x\ny'''"]);
    assert!(tokens.tokens[..4].iter().all(|t| t.kind == TokenKind::String));
}

#[test]
fn test_expression_interpolation() {
    let (tokens, listener) = scan_str("'a${b + 1}c'");
    listener.assert_no_errors();
    assert_eq!(tokens.lexemes(), vec!["'a", "${", "b", "+", "1", "}", "c'"]);
    assert_eq!(tokens.tokens[0].kind, TokenKind::String);
    assert_eq!(tokens.tokens[1].kind, TokenKind::StringInterpolationExpression);
    assert_eq!(tokens.tokens[6].kind, TokenKind::StringPart);
}

#[test]
fn test_identifier_interpolation() {
    let (tokens, listener) = scan_str("'$a$b'");
    listener.assert_no_errors();
    assert_eq!(tokens.lexemes(), vec!["'", "$", "a", "$", "b", "'"]);
    assert_eq!(tokens.tokens[1].kind, TokenKind::StringInterpolationIdentifier);
    assert_eq!(tokens.tokens[5].kind, TokenKind::StringPart);
}

#[test]
fn test_nested_string_in_interpolation() {
    let (tokens, listener) = scan_str(r#"'${m["k"]}'"#);
    listener.assert_no_errors();
    assert_eq!(tokens.lexemes(), vec!["'", "${", "m", "[", "\"k\"", "]", "}", "'"]);
}

#[test]
fn test_raw_string_has_no_interpolation() {
    let (tokens, _) = scan_str("r'$a'");
    assert_eq!(tokens.lexemes(), vec!["r'$a'"]);
}

#[test]
fn test_unterminated_string() {
    let (tokens, listener) = scan_str("'abc\nx");
    listener.assert_errors(&[ErrorCode::UnterminatedStringLiteral]);
    assert_eq!(tokens.lexemes(), vec!["'abc", "x"]);
}

#[test]
fn test_unterminated_interpolation() {
    let (tokens, listener) = scan_str("'${a");
    listener.assert_errors(&[ErrorCode::UnterminatedStringLiteral]);
    assert_eq!(tokens.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}

// ========================================
// Comments and recovery
// ========================================

#[test]
fn test_comments_are_kept_aside() {
    let (tokens, listener) = scan_str("/// doc\n// line\n/* a /* nested */ b */ /** block doc */ x");
    listener.assert_no_errors();
    assert_eq!(tokens.lexemes(), vec!["x"]);
    let kinds: Vec<CommentKind> = tokens.comments.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CommentKind::Documentation,
            CommentKind::SingleLine,
            CommentKind::MultiLine,
            CommentKind::Documentation,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let (tokens, listener) = scan_str("a /* b");
    listener.assert_errors(&[ErrorCode::UnterminatedMultiLineComment]);
    assert_eq!(tokens.lexemes(), vec!["a"]);
}

#[test]
fn test_illegal_character_is_skipped() {
    let (tokens, listener) = scan_str("a ` b");
    listener.assert_errors(&[ErrorCode::IllegalCharacter]);
    assert_eq!(tokens.lexemes(), vec!["a", "b"]);
    assert_eq!(listener.errors()[0].offset, 2);
}

#[test]
fn test_empty_input_has_single_eof() {
    let (tokens, _) = scan_str("");
    assert_eq!(tokens.kinds(), vec![TokenKind::Eof]);
}

#[test]
fn test_line_starts_and_links() {
    let (tokens, _) = scan_str("a\nb\r\nc");
    assert_eq!(tokens.line_info.line_starts(), &[0, 2, 5]);
    let b = TokenId(1);
    assert_eq!(tokens.get(b).lexeme, "b");
    assert_eq!(tokens.previous(b), Some(TokenId(0)));
    assert_eq!(tokens.next(b), Some(TokenId(2)));
    assert_eq!(tokens.next(TokenId(3)), None);
}

#[test]
fn test_errors_carry_source() {
    let source = Source::for_file("/a.dart");
    let mut listener = GatheringErrorListener::new();
    scan_source(&source, "`", &mut listener);
    assert_eq!(listener.errors()[0].source, Some(source));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn prop_scanner_is_total(text in "[ -~\n\t\u{e9}\u{4e2d}]{0,80}") {
            let (tokens, _) = scan_str(&text);
            let kinds = tokens.kinds();
            prop_assert_eq!(kinds.last(), Some(&TokenKind::Eof));
            let mut previous = 0;
            for token in &tokens.tokens {
                prop_assert!(token.offset >= previous);
                prop_assert!(token.end() <= text.len());
                previous = token.offset;
            }
        }
    }
}
