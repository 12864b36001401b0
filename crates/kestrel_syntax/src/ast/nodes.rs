//! Node payloads.
//!
//! Each grammar production is one struct; [`NodeKind`] is the closed sum over all of them. Fields
//! are declared in source order, so the generated child and part enumerations (used by traversal
//! and by the printer) follow the text.

use super::{ChildSlot, NodeId, Part};
use crate::scanner::{CommentKind, TokenId};

/// Ordered, owning list of child nodes.
///
/// Members are owned by the node holding the list; the arena records that node as each member's
/// parent when the owner is allocated.
pub type NodeList = Vec<NodeId>;

/// Index into a syntax tree's comment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentId(pub u32);

/// Kind of a formal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Required,
    Positional,
    Named,
}

macro_rules! define_nodes {
    ($(
        $(#[$meta:meta])*
        $name:ident { $($(#[$fmeta:meta])* $field:ident : $ty:ty),+ $(,)? }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name {
                $($(#[$fmeta])* pub $field: $ty,)+
            }

            impl $name {
                fn push_children(&self, out: &mut Vec<NodeId>) {
                    $(ChildSlot::push_children(&self.$field, out);)+
                }

                fn push_parts(&self, out: &mut Vec<Part>) {
                    $(ChildSlot::push_parts(&self.$field, out);)+
                }

                fn detach(&mut self, child: NodeId, placeholder: Option<NodeId>) -> bool {
                    $(
                        if ChildSlot::detach(&mut self.$field, child, placeholder) {
                            return true;
                        }
                    )+
                    false
                }
            }

            impl From<$name> for NodeKind {
                fn from(node: $name) -> Self {
                    NodeKind::$name(node)
                }
            }
        )*

        /// Closed set of syntax node kinds.
        #[derive(Debug, Clone, PartialEq)]
        pub enum NodeKind {
            $($name($name),)*
        }

        impl NodeKind {
            /// Name of the production, e.g. `"IfStatement"`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(NodeKind::$name(_) => stringify!($name),)*
                }
            }

            pub(crate) fn push_children(&self, out: &mut Vec<NodeId>) {
                match self {
                    $(NodeKind::$name(node) => node.push_children(out),)*
                }
            }

            pub(crate) fn push_parts(&self, out: &mut Vec<Part>) {
                match self {
                    $(NodeKind::$name(node) => node.push_parts(out),)*
                }
            }

            pub(crate) fn detach(&mut self, child: NodeId, placeholder: Option<NodeId>) -> bool {
                match self {
                    $(NodeKind::$name(node) => node.detach(child, placeholder),)*
                }
            }
        }
    };
}

define_nodes! {
    // ========================================================================
    // Compilation unit and directives
    // ========================================================================

    CompilationUnit {
        directives: NodeList,
        declarations: NodeList,
    }

    /// A run of comments preceding a declaration.
    Comment {
        kind: CommentKind,
        comments: Vec<CommentId>,
    }

    LibraryDirective {
        comment: Option<NodeId>,
        keyword: TokenId,
        name: NodeId,
        semicolon: TokenId,
    }

    ImportDirective {
        comment: Option<NodeId>,
        keyword: TokenId,
        uri: NodeId,
        as_token: Option<TokenId>,
        prefix: Option<NodeId>,
        combinators: NodeList,
        semicolon: TokenId,
    }

    ExportDirective {
        comment: Option<NodeId>,
        keyword: TokenId,
        uri: NodeId,
        combinators: NodeList,
        semicolon: TokenId,
    }

    PartDirective {
        comment: Option<NodeId>,
        keyword: TokenId,
        uri: NodeId,
        semicolon: TokenId,
    }

    PartOfDirective {
        comment: Option<NodeId>,
        part_keyword: TokenId,
        of_keyword: TokenId,
        library_name: NodeId,
        semicolon: TokenId,
    }

    ShowCombinator {
        keyword: TokenId,
        names: NodeList,
    }

    HideCombinator {
        keyword: TokenId,
        names: NodeList,
    }

    /// Dotted library name, `a.b.c`.
    LibraryIdentifier {
        components: NodeList,
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    ClassDeclaration {
        comment: Option<NodeId>,
        abstract_keyword: Option<TokenId>,
        class_keyword: TokenId,
        name: NodeId,
        type_parameters: Option<NodeId>,
        extends_clause: Option<NodeId>,
        with_clause: Option<NodeId>,
        implements_clause: Option<NodeId>,
        left_brace: TokenId,
        members: NodeList,
        right_brace: TokenId,
    }

    ExtendsClause {
        keyword: TokenId,
        superclass: NodeId,
    }

    WithClause {
        keyword: TokenId,
        mixins: NodeList,
    }

    ImplementsClause {
        keyword: TokenId,
        interfaces: NodeList,
    }

    TypeParameterList {
        left_bracket: TokenId,
        parameters: NodeList,
        right_bracket: TokenId,
    }

    TypeParameter {
        name: NodeId,
        extends_keyword: Option<TokenId>,
        bound: Option<NodeId>,
    }

    /// `typedef R Name<T>(params);`
    TypeAlias {
        comment: Option<NodeId>,
        keyword: TokenId,
        return_type: Option<NodeId>,
        name: NodeId,
        type_parameters: Option<NodeId>,
        parameters: NodeId,
        semicolon: TokenId,
    }

    /// Top-level or local function, getter or setter.
    FunctionDeclaration {
        comment: Option<NodeId>,
        external_keyword: Option<TokenId>,
        return_type: Option<NodeId>,
        property_keyword: Option<TokenId>,
        name: NodeId,
        function_expression: NodeId,
    }

    /// Parameters and body; also an anonymous function when used as an expression.
    FunctionExpression {
        parameters: Option<NodeId>,
        body: NodeId,
    }

    TopLevelVariableDeclaration {
        comment: Option<NodeId>,
        variables: NodeId,
        semicolon: TokenId,
    }

    VariableDeclarationList {
        keyword: Option<TokenId>,
        type_name: Option<NodeId>,
        variables: NodeList,
    }

    VariableDeclaration {
        name: NodeId,
        equals: Option<TokenId>,
        initializer: Option<NodeId>,
    }

    FieldDeclaration {
        comment: Option<NodeId>,
        static_keyword: Option<TokenId>,
        fields: NodeId,
        semicolon: TokenId,
    }

    MethodDeclaration {
        comment: Option<NodeId>,
        external_keyword: Option<TokenId>,
        /// `static` or `abstract`.
        modifier_keyword: Option<TokenId>,
        return_type: Option<NodeId>,
        /// `get` or `set`.
        property_keyword: Option<TokenId>,
        operator_keyword: Option<TokenId>,
        name: NodeId,
        parameters: Option<NodeId>,
        body: NodeId,
    }

    ConstructorDeclaration {
        comment: Option<NodeId>,
        external_keyword: Option<TokenId>,
        const_keyword: Option<TokenId>,
        factory_keyword: Option<TokenId>,
        /// Name of the enclosing class as written.
        return_type: NodeId,
        period: Option<TokenId>,
        name: Option<NodeId>,
        parameters: NodeId,
        separator: Option<TokenId>,
        initializers: NodeList,
        body: NodeId,
    }

    ConstructorFieldInitializer {
        this_keyword: Option<TokenId>,
        period: Option<TokenId>,
        field_name: NodeId,
        equals: TokenId,
        expression: NodeId,
    }

    SuperConstructorInvocation {
        keyword: TokenId,
        period: Option<TokenId>,
        constructor_name: Option<NodeId>,
        argument_list: NodeId,
    }

    FormalParameterList {
        left_paren: TokenId,
        parameters: NodeList,
        /// `[` or `{` opening the optional group.
        left_delimiter: Option<TokenId>,
        right_delimiter: Option<TokenId>,
        right_paren: TokenId,
    }

    SimpleFormalParameter {
        keyword: Option<TokenId>,
        type_name: Option<NodeId>,
        name: NodeId,
    }

    /// `this.x` parameter of a constructor.
    FieldFormalParameter {
        keyword: Option<TokenId>,
        type_name: Option<NodeId>,
        this_keyword: TokenId,
        period: TokenId,
        name: NodeId,
    }

    /// Optional parameter wrapping a simple or field parameter.
    DefaultFormalParameter {
        parameter: NodeId,
        kind: ParameterKind,
        separator: Option<TokenId>,
        default_value: Option<NodeId>,
    }

    BlockFunctionBody {
        block: NodeId,
    }

    ExpressionFunctionBody {
        arrow: TokenId,
        expression: NodeId,
        semicolon: Option<TokenId>,
    }

    EmptyFunctionBody {
        semicolon: TokenId,
    }

    TypeName {
        name: NodeId,
        type_arguments: Option<NodeId>,
    }

    TypeArgumentList {
        left_bracket: TokenId,
        arguments: NodeList,
        right_bracket: TokenId,
    }

    // ========================================================================
    // Statements
    // ========================================================================

    Block {
        left_brace: TokenId,
        statements: NodeList,
        right_brace: TokenId,
    }

    VariableDeclarationStatement {
        variables: NodeId,
        semicolon: TokenId,
    }

    FunctionDeclarationStatement {
        function_declaration: NodeId,
    }

    ExpressionStatement {
        expression: NodeId,
        semicolon: TokenId,
    }

    EmptyStatement {
        semicolon: TokenId,
    }

    IfStatement {
        if_keyword: TokenId,
        left_paren: TokenId,
        condition: NodeId,
        right_paren: TokenId,
        then_statement: NodeId,
        else_keyword: Option<TokenId>,
        else_statement: Option<NodeId>,
    }

    WhileStatement {
        keyword: TokenId,
        left_paren: TokenId,
        condition: NodeId,
        right_paren: TokenId,
        body: NodeId,
    }

    DoStatement {
        do_keyword: TokenId,
        body: NodeId,
        while_keyword: TokenId,
        left_paren: TokenId,
        condition: NodeId,
        right_paren: TokenId,
        semicolon: TokenId,
    }

    ForStatement {
        for_keyword: TokenId,
        left_paren: TokenId,
        variables: Option<NodeId>,
        initialization: Option<NodeId>,
        left_separator: TokenId,
        condition: Option<NodeId>,
        right_separator: TokenId,
        updaters: NodeList,
        right_paren: TokenId,
        body: NodeId,
    }

    ForEachStatement {
        for_keyword: TokenId,
        left_paren: TokenId,
        /// A `DeclaredIdentifier` or a `SimpleIdentifier`.
        loop_variable: NodeId,
        in_keyword: TokenId,
        iterator: NodeId,
        right_paren: TokenId,
        body: NodeId,
    }

    DeclaredIdentifier {
        keyword: Option<TokenId>,
        type_name: Option<NodeId>,
        identifier: NodeId,
    }

    SwitchStatement {
        keyword: TokenId,
        left_paren: TokenId,
        expression: NodeId,
        right_paren: TokenId,
        left_brace: TokenId,
        members: NodeList,
        right_brace: TokenId,
    }

    SwitchCase {
        labels: NodeList,
        keyword: TokenId,
        expression: NodeId,
        colon: TokenId,
        statements: NodeList,
    }

    SwitchDefault {
        labels: NodeList,
        keyword: TokenId,
        colon: TokenId,
        statements: NodeList,
    }

    TryStatement {
        try_keyword: TokenId,
        body: NodeId,
        catch_clauses: NodeList,
        finally_keyword: Option<TokenId>,
        finally_block: Option<NodeId>,
    }

    CatchClause {
        on_keyword: Option<TokenId>,
        exception_type: Option<NodeId>,
        catch_keyword: Option<TokenId>,
        left_paren: Option<TokenId>,
        exception_parameter: Option<NodeId>,
        comma: Option<TokenId>,
        stack_trace_parameter: Option<NodeId>,
        right_paren: Option<TokenId>,
        body: NodeId,
    }

    ReturnStatement {
        keyword: TokenId,
        expression: Option<NodeId>,
        semicolon: TokenId,
    }

    BreakStatement {
        keyword: TokenId,
        label: Option<NodeId>,
        semicolon: TokenId,
    }

    ContinueStatement {
        keyword: TokenId,
        label: Option<NodeId>,
        semicolon: TokenId,
    }

    LabeledStatement {
        labels: NodeList,
        statement: NodeId,
    }

    Label {
        label: NodeId,
        colon: TokenId,
    }

    AssertStatement {
        keyword: TokenId,
        left_paren: TokenId,
        condition: NodeId,
        right_paren: TokenId,
        semicolon: TokenId,
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    SimpleIdentifier {
        token: TokenId,
    }

    PrefixedIdentifier {
        prefix: NodeId,
        period: TokenId,
        identifier: NodeId,
    }

    IntegerLiteral {
        literal: TokenId,
        /// `None` when the literal does not fit in 64 bits.
        value: Option<i64>,
    }

    DoubleLiteral {
        literal: TokenId,
        value: f64,
    }

    BooleanLiteral {
        literal: TokenId,
        value: bool,
    }

    NullLiteral {
        literal: TokenId,
    }

    SimpleStringLiteral {
        literal: TokenId,
        /// Contents with quotes removed and escapes applied.
        value: String,
    }

    StringInterpolation {
        elements: NodeList,
    }

    InterpolationString {
        contents: TokenId,
        value: String,
    }

    InterpolationExpression {
        /// `${` or `$`.
        left_bracket: TokenId,
        expression: NodeId,
        right_bracket: Option<TokenId>,
    }

    AdjacentStrings {
        strings: NodeList,
    }

    ListLiteral {
        const_keyword: Option<TokenId>,
        type_arguments: Option<NodeId>,
        left_bracket: TokenId,
        elements: NodeList,
        right_bracket: TokenId,
    }

    MapLiteral {
        const_keyword: Option<TokenId>,
        type_arguments: Option<NodeId>,
        left_bracket: TokenId,
        entries: NodeList,
        right_bracket: TokenId,
    }

    MapLiteralEntry {
        key: NodeId,
        separator: TokenId,
        value: NodeId,
    }

    ThisExpression {
        keyword: TokenId,
    }

    SuperExpression {
        keyword: TokenId,
    }

    ParenthesizedExpression {
        left_paren: TokenId,
        expression: NodeId,
        right_paren: TokenId,
    }

    AssignmentExpression {
        left_hand_side: NodeId,
        operator: TokenId,
        right_hand_side: NodeId,
    }

    ConditionalExpression {
        condition: NodeId,
        question: TokenId,
        then_expression: NodeId,
        colon: TokenId,
        else_expression: NodeId,
    }

    BinaryExpression {
        left_operand: NodeId,
        operator: TokenId,
        right_operand: NodeId,
    }

    PrefixExpression {
        operator: TokenId,
        operand: NodeId,
    }

    PostfixExpression {
        operand: NodeId,
        operator: TokenId,
    }

    IsExpression {
        expression: NodeId,
        is_operator: TokenId,
        not_operator: Option<TokenId>,
        type_name: NodeId,
    }

    AsExpression {
        expression: NodeId,
        as_operator: TokenId,
        type_name: NodeId,
    }

    /// `target[index]`; inside a cascade the target is absent and `period` is the `..` token.
    IndexExpression {
        target: Option<NodeId>,
        period: Option<TokenId>,
        left_bracket: TokenId,
        index: NodeId,
        right_bracket: TokenId,
    }

    /// `target.name`; inside a cascade the target is absent and `operator` is the `..` token.
    PropertyAccess {
        target: Option<NodeId>,
        operator: TokenId,
        property_name: NodeId,
    }

    MethodInvocation {
        target: Option<NodeId>,
        period: Option<TokenId>,
        method_name: NodeId,
        argument_list: NodeId,
    }

    FunctionExpressionInvocation {
        function: NodeId,
        argument_list: NodeId,
    }

    InstanceCreationExpression {
        keyword: TokenId,
        constructor_name: NodeId,
        argument_list: NodeId,
    }

    ConstructorName {
        type_name: NodeId,
        period: Option<TokenId>,
        name: Option<NodeId>,
    }

    ArgumentList {
        left_paren: TokenId,
        arguments: NodeList,
        right_paren: TokenId,
    }

    NamedExpression {
        name: NodeId,
        expression: NodeId,
    }

    CascadeExpression {
        target: NodeId,
        cascade_sections: NodeList,
    }

    ThrowExpression {
        keyword: TokenId,
        expression: NodeId,
    }

    RethrowExpression {
        keyword: TokenId,
    }
}

impl NodeKind {
    /// Return `true` for expression nodes.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::SimpleIdentifier(_)
                | NodeKind::PrefixedIdentifier(_)
                | NodeKind::IntegerLiteral(_)
                | NodeKind::DoubleLiteral(_)
                | NodeKind::BooleanLiteral(_)
                | NodeKind::NullLiteral(_)
                | NodeKind::SimpleStringLiteral(_)
                | NodeKind::StringInterpolation(_)
                | NodeKind::AdjacentStrings(_)
                | NodeKind::ListLiteral(_)
                | NodeKind::MapLiteral(_)
                | NodeKind::ThisExpression(_)
                | NodeKind::SuperExpression(_)
                | NodeKind::ParenthesizedExpression(_)
                | NodeKind::AssignmentExpression(_)
                | NodeKind::ConditionalExpression(_)
                | NodeKind::BinaryExpression(_)
                | NodeKind::PrefixExpression(_)
                | NodeKind::PostfixExpression(_)
                | NodeKind::IsExpression(_)
                | NodeKind::AsExpression(_)
                | NodeKind::IndexExpression(_)
                | NodeKind::PropertyAccess(_)
                | NodeKind::MethodInvocation(_)
                | NodeKind::FunctionExpressionInvocation(_)
                | NodeKind::InstanceCreationExpression(_)
                | NodeKind::NamedExpression(_)
                | NodeKind::CascadeExpression(_)
                | NodeKind::ThrowExpression(_)
                | NodeKind::RethrowExpression(_)
                | NodeKind::FunctionExpression(_)
        )
    }

    /// Return `true` for statement nodes.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block(_)
                | NodeKind::VariableDeclarationStatement(_)
                | NodeKind::FunctionDeclarationStatement(_)
                | NodeKind::ExpressionStatement(_)
                | NodeKind::EmptyStatement(_)
                | NodeKind::IfStatement(_)
                | NodeKind::WhileStatement(_)
                | NodeKind::DoStatement(_)
                | NodeKind::ForStatement(_)
                | NodeKind::ForEachStatement(_)
                | NodeKind::SwitchStatement(_)
                | NodeKind::TryStatement(_)
                | NodeKind::ReturnStatement(_)
                | NodeKind::BreakStatement(_)
                | NodeKind::ContinueStatement(_)
                | NodeKind::LabeledStatement(_)
                | NodeKind::AssertStatement(_)
        )
    }

    /// Return `true` for directives.
    pub fn is_directive(&self) -> bool {
        matches!(
            self,
            NodeKind::LibraryDirective(_)
                | NodeKind::ImportDirective(_)
                | NodeKind::ExportDirective(_)
                | NodeKind::PartDirective(_)
                | NodeKind::PartOfDirective(_)
        )
    }

    /// Documentation comment attached to a declaration or directive.
    pub fn comment(&self) -> Option<NodeId> {
        match self {
            NodeKind::LibraryDirective(n) => n.comment,
            NodeKind::ImportDirective(n) => n.comment,
            NodeKind::ExportDirective(n) => n.comment,
            NodeKind::PartDirective(n) => n.comment,
            NodeKind::PartOfDirective(n) => n.comment,
            NodeKind::ClassDeclaration(n) => n.comment,
            NodeKind::TypeAlias(n) => n.comment,
            NodeKind::FunctionDeclaration(n) => n.comment,
            NodeKind::TopLevelVariableDeclaration(n) => n.comment,
            NodeKind::FieldDeclaration(n) => n.comment,
            NodeKind::MethodDeclaration(n) => n.comment,
            NodeKind::ConstructorDeclaration(n) => n.comment,
            _ => None,
        }
    }
}
