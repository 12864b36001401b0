/// Parse a token stream into a compilation unit [`Ast`].
///
/// This is the main public entrypoint for parsing. It never fails: problems are reported to
/// `listener` and the returned tree covers every token.
///
/// ## Parameters
/// - `tokens`: Token stream produced by [`crate::scanner::scan`] or [`crate::scanner::scan_source`].
/// - `listener`: Receives syntax errors in source order.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &TokenStream, listener: &mut dyn ErrorListener) -> Ast {
    Parser::new(tokens, listener).parse_compilation_unit()
}

/// Parse a token stream holding exactly one statement; the statement is the tree's root.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse_statement(tokens: &TokenStream, listener: &mut dyn ErrorListener) -> Ast {
    Parser::new(tokens, listener).parse_single_statement()
}

/// Parse a token stream holding exactly one expression; the expression is the tree's root.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse_expression(tokens: &TokenStream, listener: &mut dyn ErrorListener) -> Ast {
    Parser::new(tokens, listener).parse_single_expression()
}
