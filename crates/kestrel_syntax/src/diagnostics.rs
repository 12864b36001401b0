//! Diagnostics: error codes, analysis errors, and error listeners.
//!
//! Every recoverable problem found while scanning, parsing, resolving or generating hints is an
//! [`AnalysisError`] delivered to an [`ErrorListener`]. Nothing in the pipeline returns `Err` for
//! malformed source text.
//!
//! ## Notes
//! - Codes are grouped in families (scanner, parser, compile-time, static-type, hint). Each code
//!   carries its [`ErrorSeverity`] and [`ErrorType`].
//! - Messages are templates with positional `{0}`, `{1}` placeholders filled at report time.

use std::fmt;

use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, Severity};

use crate::source::Source;

/// How serious a problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

/// Category of a problem, matching the pipeline stage that finds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Lexical,
    Syntactic,
    SemanticBinding,
    SemanticTyping,
    Hint,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::Lexical => write!(f, "lexical error"),
            ErrorType::Syntactic => write!(f, "syntax error"),
            ErrorType::SemanticBinding => write!(f, "binding error"),
            ErrorType::SemanticTyping => write!(f, "type error"),
            ErrorType::Hint => write!(f, "hint"),
        }
    }
}

/// Every error, warning and hint the analyzer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // ========== Scanner ==========
    IllegalCharacter,
    UnterminatedStringLiteral,
    UnterminatedMultiLineComment,
    MissingDigit,
    MissingHexDigit,

    // ========== Parser ==========
    ExpectedToken,
    ExpectedTypeName,
    ExpectedStringLiteral,
    ExpectedClassMember,
    ExpectedExecutable,
    ExpectedCaseOrDefault,
    MissingIdentifier,
    MissingExpression,
    MissingStatement,
    MissingFunctionBody,
    MissingFunctionParameters,
    MissingCatchOrFinally,
    MissingTypedefParameters,
    UnexpectedToken,
    NestingTooDeep,
    DirectiveAfterDeclaration,
    MultipleExtendsClauses,
    MultipleWithClauses,
    MultipleImplementsClauses,
    ImplementsBeforeExtends,
    WithBeforeExtends,
    NonStringLiteralAsUri,
    SwitchHasMultipleDefaultCases,
    SwitchHasCaseAfterDefaultCase,

    // ========== Compile-time (binding) ==========
    UndefinedIdentifier,
    UndefinedClass,
    DuplicateDefinition,
    UriDoesNotExist,
    ImportOfNonLibrary,
    NotAType,
    ExtendsNonClass,
    RecursiveInterfaceInheritance,
    InvalidReferenceToThis,
    LabelUndefined,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    UndefinedConstructor,

    // ========== Static type ==========
    NonBoolCondition,
    NonBoolOperand,
    InvalidAssignment,
    ReturnOfInvalidType,
    UndefinedMethod,
    UndefinedGetter,
    UndefinedSetter,
    UndefinedOperator,
    UndefinedSuperMethod,
    InvocationOfNonFunction,
    WrongNumberOfTypeArguments,

    // ========== Hints ==========
    MissingReturn,
    DeadCode,
}

impl ErrorCode {
    /// Stable, human-readable name (`UNDEFINED_IDENTIFIER`).
    pub fn name(self) -> &'static str {
        use ErrorCode::*;
        match self {
            IllegalCharacter => "ILLEGAL_CHARACTER",
            UnterminatedStringLiteral => "UNTERMINATED_STRING_LITERAL",
            UnterminatedMultiLineComment => "UNTERMINATED_MULTI_LINE_COMMENT",
            MissingDigit => "MISSING_DIGIT",
            MissingHexDigit => "MISSING_HEX_DIGIT",
            ExpectedToken => "EXPECTED_TOKEN",
            ExpectedTypeName => "EXPECTED_TYPE_NAME",
            ExpectedStringLiteral => "EXPECTED_STRING_LITERAL",
            ExpectedClassMember => "EXPECTED_CLASS_MEMBER",
            ExpectedExecutable => "EXPECTED_EXECUTABLE",
            ExpectedCaseOrDefault => "EXPECTED_CASE_OR_DEFAULT",
            MissingIdentifier => "MISSING_IDENTIFIER",
            MissingExpression => "MISSING_EXPRESSION",
            MissingStatement => "MISSING_STATEMENT",
            MissingFunctionBody => "MISSING_FUNCTION_BODY",
            MissingFunctionParameters => "MISSING_FUNCTION_PARAMETERS",
            MissingCatchOrFinally => "MISSING_CATCH_OR_FINALLY",
            MissingTypedefParameters => "MISSING_TYPEDEF_PARAMETERS",
            UnexpectedToken => "UNEXPECTED_TOKEN",
            NestingTooDeep => "NESTING_TOO_DEEP",
            DirectiveAfterDeclaration => "DIRECTIVE_AFTER_DECLARATION",
            MultipleExtendsClauses => "MULTIPLE_EXTENDS_CLAUSES",
            MultipleWithClauses => "MULTIPLE_WITH_CLAUSES",
            MultipleImplementsClauses => "MULTIPLE_IMPLEMENTS_CLAUSES",
            ImplementsBeforeExtends => "IMPLEMENTS_BEFORE_EXTENDS",
            WithBeforeExtends => "WITH_BEFORE_EXTENDS",
            NonStringLiteralAsUri => "NON_STRING_LITERAL_AS_URI",
            SwitchHasMultipleDefaultCases => "SWITCH_HAS_MULTIPLE_DEFAULT_CASES",
            SwitchHasCaseAfterDefaultCase => "SWITCH_HAS_CASE_AFTER_DEFAULT_CASE",
            UndefinedIdentifier => "UNDEFINED_IDENTIFIER",
            UndefinedClass => "UNDEFINED_CLASS",
            DuplicateDefinition => "DUPLICATE_DEFINITION",
            UriDoesNotExist => "URI_DOES_NOT_EXIST",
            ImportOfNonLibrary => "IMPORT_OF_NON_LIBRARY",
            NotAType => "NOT_A_TYPE",
            ExtendsNonClass => "EXTENDS_NON_CLASS",
            RecursiveInterfaceInheritance => "RECURSIVE_INTERFACE_INHERITANCE",
            InvalidReferenceToThis => "INVALID_REFERENCE_TO_THIS",
            LabelUndefined => "LABEL_UNDEFINED",
            BreakOutsideLoop => "BREAK_OUTSIDE_LOOP",
            ContinueOutsideLoop => "CONTINUE_OUTSIDE_LOOP",
            UndefinedConstructor => "UNDEFINED_CONSTRUCTOR",
            NonBoolCondition => "NON_BOOL_CONDITION",
            NonBoolOperand => "NON_BOOL_OPERAND",
            InvalidAssignment => "INVALID_ASSIGNMENT",
            ReturnOfInvalidType => "RETURN_OF_INVALID_TYPE",
            UndefinedMethod => "UNDEFINED_METHOD",
            UndefinedGetter => "UNDEFINED_GETTER",
            UndefinedSetter => "UNDEFINED_SETTER",
            UndefinedOperator => "UNDEFINED_OPERATOR",
            UndefinedSuperMethod => "UNDEFINED_SUPER_METHOD",
            InvocationOfNonFunction => "INVOCATION_OF_NON_FUNCTION",
            WrongNumberOfTypeArguments => "WRONG_NUMBER_OF_TYPE_ARGUMENTS",
            MissingReturn => "MISSING_RETURN",
            DeadCode => "DEAD_CODE",
        }
    }

    /// Message template; `{n}` is replaced by the n-th argument.
    pub fn message(self) -> &'static str {
        use ErrorCode::*;
        match self {
            IllegalCharacter => "Illegal character '{0}'",
            UnterminatedStringLiteral => "Unterminated string literal",
            UnterminatedMultiLineComment => "Unterminated multi-line comment",
            MissingDigit => "Decimal digit expected",
            MissingHexDigit => "Hexadecimal digit expected",
            ExpectedToken => "Expected to find '{0}'",
            ExpectedTypeName => "Expected a type name",
            ExpectedStringLiteral => "Expected a string literal",
            ExpectedClassMember => "Expected a class member",
            ExpectedExecutable => "Expected a method, getter, setter or operator declaration",
            ExpectedCaseOrDefault => "Expected 'case' or 'default'",
            MissingIdentifier => "Expected an identifier",
            MissingExpression => "Expected an expression",
            MissingStatement => "Expected a statement",
            MissingFunctionBody => "A function body must be provided",
            MissingFunctionParameters => "Functions must have an explicit list of parameters",
            MissingCatchOrFinally => "A try statement must have either a catch or finally clause",
            MissingTypedefParameters => "A typedef must have an explicit list of parameters",
            UnexpectedToken => "Unexpected token '{0}'",
            NestingTooDeep => "Expressions and statements are nested too deeply",
            DirectiveAfterDeclaration => "Directives must appear before any declarations",
            MultipleExtendsClauses => "Each class definition can have at most one extends clause",
            MultipleWithClauses => "Each class definition can have at most one with clause",
            MultipleImplementsClauses => "Each class definition can have at most one implements clause",
            ImplementsBeforeExtends => "The extends clause must be before the implements clause",
            WithBeforeExtends => "The extends clause must be before the with clause",
            NonStringLiteralAsUri => "The URI must be a string literal",
            SwitchHasMultipleDefaultCases => "The 'default' case can only be declared once",
            SwitchHasCaseAfterDefaultCase => "The 'default' case should be the last case in a switch statement",
            UndefinedIdentifier => "Undefined name '{0}'",
            UndefinedClass => "Undefined class '{0}'",
            DuplicateDefinition => "The name '{0}' is already defined",
            UriDoesNotExist => "Target of URI does not exist: '{0}'",
            ImportOfNonLibrary => "The imported library '{0}' must not have a part-of directive",
            NotAType => "{0} is not a type",
            ExtendsNonClass => "Classes can only extend other classes",
            RecursiveInterfaceInheritance => "'{0}' cannot be a superinterface of itself",
            InvalidReferenceToThis => "Invalid reference to 'this' expression",
            LabelUndefined => "Cannot reference undefined label '{0}'",
            BreakOutsideLoop => "A break statement can only be used within a loop or switch",
            ContinueOutsideLoop => "A continue statement can only be used within a loop",
            UndefinedConstructor => "The class '{0}' does not have a constructor '{1}'",
            NonBoolCondition => "Conditions must have a static type of 'bool'",
            NonBoolOperand => "The operands of the '{0}' operator must be assignable to 'bool'",
            InvalidAssignment => "A value of type '{0}' cannot be assigned to a variable of type '{1}'",
            ReturnOfInvalidType => "The return type '{0}' is not a '{1}', as defined by the method '{2}'",
            UndefinedMethod => "The method '{0}' is not defined for the class '{1}'",
            UndefinedGetter => "There is no such getter '{0}' in '{1}'",
            UndefinedSetter => "There is no such setter '{0}' in '{1}'",
            UndefinedOperator => "There is no such operator '{0}' in '{1}'",
            UndefinedSuperMethod => "There is no such method '{0}' in '{1}'",
            InvocationOfNonFunction => "'{0}' is not a method",
            WrongNumberOfTypeArguments => "The type '{0}' is declared with {1} type parameters, but {2} type arguments were given",
            MissingReturn => "This function declares a return type of '{0}', but does not end with a return statement",
            DeadCode => "Dead code",
        }
    }

    pub fn error_type(self) -> ErrorType {
        use ErrorCode::*;
        match self {
            IllegalCharacter | UnterminatedStringLiteral | UnterminatedMultiLineComment | MissingDigit
            | MissingHexDigit => ErrorType::Lexical,
            ExpectedToken | ExpectedTypeName | ExpectedStringLiteral | ExpectedClassMember | ExpectedExecutable
            | ExpectedCaseOrDefault | MissingIdentifier | MissingExpression | MissingStatement | MissingFunctionBody
            | MissingFunctionParameters | MissingCatchOrFinally | MissingTypedefParameters | UnexpectedToken
            | NestingTooDeep
            | DirectiveAfterDeclaration | MultipleExtendsClauses | MultipleWithClauses | MultipleImplementsClauses
            | ImplementsBeforeExtends | WithBeforeExtends | NonStringLiteralAsUri | SwitchHasMultipleDefaultCases
            | SwitchHasCaseAfterDefaultCase => ErrorType::Syntactic,
            UndefinedIdentifier | UndefinedClass | DuplicateDefinition | UriDoesNotExist | ImportOfNonLibrary
            | NotAType | ExtendsNonClass | RecursiveInterfaceInheritance | InvalidReferenceToThis | LabelUndefined
            | BreakOutsideLoop | ContinueOutsideLoop | UndefinedConstructor => ErrorType::SemanticBinding,
            NonBoolCondition | NonBoolOperand | InvalidAssignment | ReturnOfInvalidType | UndefinedMethod
            | UndefinedGetter | UndefinedSetter | UndefinedOperator | UndefinedSuperMethod
            | InvocationOfNonFunction | WrongNumberOfTypeArguments => ErrorType::SemanticTyping,
            MissingReturn | DeadCode => ErrorType::Hint,
        }
    }

    pub fn severity(self) -> ErrorSeverity {
        match self.error_type() {
            ErrorType::Lexical | ErrorType::Syntactic => ErrorSeverity::Error,
            ErrorType::SemanticBinding => match self {
                ErrorCode::UndefinedIdentifier | ErrorCode::UndefinedClass | ErrorCode::UndefinedConstructor => {
                    ErrorSeverity::Warning
                }
                _ => ErrorSeverity::Error,
            },
            ErrorType::SemanticTyping => ErrorSeverity::Warning,
            ErrorType::Hint => ErrorSeverity::Info,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisError {
    pub code: ErrorCode,
    pub source: Option<Source>,
    pub offset: usize,
    pub length: usize,
    pub message: String,
}

impl AnalysisError {
    /// Create an error, formatting the code's message template with `args`.
    pub fn new(source: Option<Source>, offset: usize, length: usize, code: ErrorCode, args: &[&str]) -> Self {
        let mut message = code.message().to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        Self {
            code,
            source,
            offset,
            length,
            message,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.code.severity()
    }

    pub fn error_type(&self) -> ErrorType {
        self.code.error_type()
    }

    /// Render this error with the offending text highlighted.
    pub fn to_report(&self, source_text: &str) -> Report {
        let severity = match self.severity() {
            ErrorSeverity::Error => Severity::Error,
            ErrorSeverity::Warning => Severity::Warning,
            ErrorSeverity::Info => Severity::Advice,
        };
        let offset = self.offset.min(source_text.len());
        let length = self.length.min(source_text.len() - offset);
        let diagnostic = MietteDiagnostic::new(self.message.clone())
            .with_code(self.code.name())
            .with_severity(severity)
            .with_label(LabeledSpan::at(offset..offset + length, self.error_type().to_string()));
        let name = self
            .source
            .as_ref()
            .map(|s| s.full_name().to_string())
            .unwrap_or_else(|| "<input>".to_string());
        Report::new(diagnostic).with_source_code(NamedSource::new(name, source_text.to_string()))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}..{}", self.message, self.code, self.offset, self.offset + self.length)
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Receiver for recoverable problems.
pub trait ErrorListener {
    fn on_error(&mut self, error: AnalysisError);
}

/// Listener that drops everything.
#[derive(Debug, Default)]
pub struct NullErrorListener;

impl ErrorListener for NullErrorListener {
    fn on_error(&mut self, _error: AnalysisError) {}
}

/// Listener that keeps every error in arrival order.
#[derive(Debug, Default, Clone)]
pub struct RecordingErrorListener {
    errors: Vec<AnalysisError>,
}

impl RecordingErrorListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[AnalysisError] {
        &self.errors
    }

    /// Errors reported against `source`.
    pub fn errors_for(&self, source: &Source) -> Vec<AnalysisError> {
        self.errors.iter().filter(|e| e.source.as_ref() == Some(source)).cloned().collect()
    }

    pub fn into_errors(self) -> Vec<AnalysisError> {
        self.errors
    }
}

impl ErrorListener for RecordingErrorListener {
    fn on_error(&mut self, error: AnalysisError) {
        self.errors.push(error);
    }
}

impl ErrorListener for Vec<AnalysisError> {
    fn on_error(&mut self, error: AnalysisError) {
        self.push(error);
    }
}

/// Listener used by tests to compare reported errors against expected codes.
#[derive(Debug, Default, Clone)]
pub struct GatheringErrorListener {
    errors: Vec<AnalysisError>,
}

impl GatheringErrorListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[AnalysisError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors at or above `severity`.
    pub fn errors_with_severity(&self, severity: ErrorSeverity) -> Vec<&AnalysisError> {
        self.errors.iter().filter(|e| e.severity() >= severity).collect()
    }

    /// Add errors delivered through some other channel.
    pub fn add_all(&mut self, errors: impl IntoIterator<Item = AnalysisError>) {
        self.errors.extend(errors);
    }

    /// Codes of all gathered errors, sorted.
    pub fn codes(&self) -> Vec<ErrorCode> {
        let mut codes: Vec<ErrorCode> = self.errors.iter().map(|e| e.code).collect();
        codes.sort();
        codes
    }

    /// Assert that exactly the `expected` codes were reported, ignoring order.
    ///
    /// # Panics
    /// Panics with the full error list when the multisets differ.
    pub fn assert_errors(&self, expected: &[ErrorCode]) {
        let mut expected = expected.to_vec();
        expected.sort();
        let actual = self.codes();
        if actual != expected {
            let listing: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            panic!("expected errors {expected:?} but found {actual:?}:\n{}", listing.join("\n"));
        }
    }

    /// Assert that no errors were reported.
    pub fn assert_no_errors(&self) {
        self.assert_errors(&[]);
    }

    /// Assert that the reported errors have exactly the given severities, ignoring order.
    pub fn assert_severities(&self, expected: &[ErrorSeverity]) {
        let mut expected = expected.to_vec();
        expected.sort();
        let mut actual: Vec<ErrorSeverity> = self.errors.iter().map(|e| e.severity()).collect();
        actual.sort();
        assert_eq!(actual, expected, "unexpected error severities: {:?}", self.errors);
    }
}

impl ErrorListener for GatheringErrorListener {
    fn on_error(&mut self, error: AnalysisError) {
        self.errors.push(error);
    }
}

// ============================================================================
// Line information
// ============================================================================

/// Offsets of line starts, used to translate offsets into line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineInfo {
    line_starts: Vec<usize>,
}

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl LineInfo {
    /// Create line information from line-start offsets; the first entry must be `0`.
    pub fn new(line_starts: Vec<usize>) -> Self {
        let line_starts = if line_starts.first() == Some(&0) { line_starts } else { vec![0] };
        Self { line_starts }
    }

    /// Compute line starts directly from text.
    pub fn from_text(text: &str) -> Self {
        let mut starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { line_starts: starts }
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn location(&self, offset: usize) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        Location {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_formatting() {
        let error = AnalysisError::new(None, 3, 1, ErrorCode::UndefinedIdentifier, &["foo"]);
        assert_eq!(error.message, "Undefined name 'foo'");
        assert_eq!(error.error_type(), ErrorType::SemanticBinding);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::IllegalCharacter.error_type(), ErrorType::Lexical);
        assert_eq!(ErrorCode::ExpectedToken.error_type(), ErrorType::Syntactic);
        assert_eq!(ErrorCode::InvalidAssignment.error_type(), ErrorType::SemanticTyping);
        assert_eq!(ErrorCode::MissingReturn.severity(), ErrorSeverity::Info);
        assert_eq!(ErrorCode::DuplicateDefinition.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_gathering_listener_is_order_insensitive() {
        let mut listener = GatheringErrorListener::new();
        listener.on_error(AnalysisError::new(None, 0, 1, ErrorCode::MissingIdentifier, &[]));
        listener.on_error(AnalysisError::new(None, 2, 1, ErrorCode::ExpectedToken, &[";"]));
        listener.assert_errors(&[ErrorCode::ExpectedToken, ErrorCode::MissingIdentifier]);
        assert_eq!(listener.errors_with_severity(ErrorSeverity::Warning).len(), 2);
    }

    #[test]
    #[should_panic(expected = "expected errors")]
    fn test_gathering_listener_reports_mismatch() {
        let mut listener = GatheringErrorListener::new();
        listener.on_error(AnalysisError::new(None, 0, 1, ErrorCode::MissingIdentifier, &[]));
        listener.assert_no_errors();
    }

    #[test]
    fn test_line_info() {
        let info = LineInfo::from_text("ab\ncd\r\nef\rg");
        assert_eq!(info.line_starts(), &[0, 3, 7, 10]);
        assert_eq!(info.location(0), Location { line: 1, column: 1 });
        assert_eq!(info.location(4), Location { line: 2, column: 2 });
        assert_eq!(info.location(10), Location { line: 4, column: 1 });
    }

    #[test]
    fn test_report_rendering_keeps_message() {
        let error = AnalysisError::new(None, 4, 3, ErrorCode::UndefinedIdentifier, &["foo"]);
        let report = error.to_report("var foo;");
        assert_eq!(report.to_string(), "Undefined name 'foo'");
    }
}
