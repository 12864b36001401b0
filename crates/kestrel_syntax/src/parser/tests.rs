#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on the shape of specific syntactic forms and on the parser's error recovery
/// (one clear error per problem, and a complete tree regardless).
mod tests {
    use super::*;
    use crate::diagnostics::GatheringErrorListener;
    use crate::scanner;
    use proptest::prelude::*;

    fn parse_str(source: &str) -> (Ast, GatheringErrorListener) {
        let mut listener = GatheringErrorListener::new();
        let tokens = scanner::scan(source, &mut listener);
        let ast = parse(&tokens, &mut listener);
        (ast, listener)
    }

    fn parse_clean(source: &str) -> Ast {
        let (ast, listener) = parse_str(source);
        listener.assert_no_errors();
        ast
    }

    fn parse_expr(source: &str) -> Ast {
        let mut listener = GatheringErrorListener::new();
        let tokens = scanner::scan(source, &mut listener);
        let ast = parse_expression(&tokens, &mut listener);
        listener.assert_no_errors();
        ast
    }

    /// First node of the given production, in allocation order.
    fn find(ast: &Ast, name: &str) -> NodeId {
        ast.node_ids()
            .find(|id| ast.kind(*id).name() == name)
            .unwrap_or_else(|| panic!("no {name} node"))
    }

    fn count(ast: &Ast, name: &str) -> usize {
        ast.node_ids().filter(|id| ast.kind(*id).name() == name).count()
    }

    // ========================================================================
    // Declarations and directives
    // ========================================================================

    #[test]
    fn test_parse_directives() {
        let ast = parse_clean("library a.b;\nimport 'x.dart' as p show A hide B;\nexport 'y.dart';\npart 'z.dart';\n");
        let kinds: Vec<&str> = ast.directives().iter().map(|d| ast.kind(*d).name()).collect();
        assert_eq!(
            kinds,
            vec!["LibraryDirective", "ImportDirective", "ExportDirective", "PartDirective"]
        );
        match ast.kind(ast.directives()[1]) {
            NodeKind::ImportDirective(import) => {
                assert_eq!(ast.string_value(import.uri).as_deref(), Some("x.dart"));
                assert_eq!(import.prefix.map(|p| ast.name_of(p)).as_deref(), Some("p"));
                assert_eq!(import.combinators.len(), 2);
            }
            other => panic!("expected import, got {}", other.name()),
        }
    }

    #[test]
    fn test_parse_part_of() {
        let ast = parse_clean("part of a.b;");
        match ast.kind(ast.directives()[0]) {
            NodeKind::PartOfDirective(part_of) => assert_eq!(ast.name_of(part_of.library_name), "a.b"),
            other => panic!("expected part of, got {}", other.name()),
        }
    }

    #[test]
    fn test_parse_class_with_members() {
        let ast = parse_clean(
            r#"
abstract class Shape<T> extends Base implements Comparable {
  static int count = 0;
  final String name;
  Shape(this.name) : super();
  Shape.unit() : name = 'unit';
  num get area;
  set label(String value) {}
  bool operator ==(other) => false;
  int operator [](int i) => i;
}
"#,
        );
        assert_eq!(ast.declarations().len(), 1);
        match ast.kind(ast.declarations()[0]) {
            NodeKind::ClassDeclaration(class) => {
                assert!(class.abstract_keyword.is_some());
                assert_eq!(ast.name_of(class.name), "Shape");
                assert!(class.type_parameters.is_some());
                assert!(class.extends_clause.is_some());
                assert!(class.implements_clause.is_some());
                let members: Vec<&str> = class.members.iter().map(|m| ast.kind(*m).name()).collect();
                assert_eq!(
                    members,
                    vec![
                        "FieldDeclaration",
                        "FieldDeclaration",
                        "ConstructorDeclaration",
                        "ConstructorDeclaration",
                        "MethodDeclaration",
                        "MethodDeclaration",
                        "MethodDeclaration",
                        "MethodDeclaration",
                    ]
                );
            }
            other => panic!("expected class, got {}", other.name()),
        }
    }

    #[test]
    fn test_parse_top_level_forms() {
        let ast = parse_clean(
            "typedef int Compare(a, b);\nint x = 1, y;\nvoid main() {}\nget answer => 42;\nexternal void halt();\n",
        );
        let kinds: Vec<&str> = ast.declarations().iter().map(|d| ast.kind(*d).name()).collect();
        assert_eq!(
            kinds,
            vec![
                "TypeAlias",
                "TopLevelVariableDeclaration",
                "FunctionDeclaration",
                "FunctionDeclaration",
                "FunctionDeclaration",
            ]
        );
    }

    #[test]
    fn test_doc_comment_attaches_to_declaration() {
        let ast = parse_clean("// plain\n/// First.\n/// Second.\nclass A {}\n");
        let comment = ast.kind(ast.declarations()[0]).comment().expect("doc comment");
        match ast.kind(comment) {
            NodeKind::Comment(c) => {
                assert_eq!(c.kind, CommentKind::Documentation);
                assert_eq!(c.comments.len(), 2);
            }
            other => panic!("expected comment, got {}", other.name()),
        }
    }

    #[test]
    fn test_plain_comment_does_not_attach() {
        let ast = parse_clean("/// Doc.\n// plain\nclass A {}\n");
        assert_eq!(ast.kind(ast.declarations()[0]).comment(), None);
    }

    #[test]
    fn test_nested_type_arguments_split_shift() {
        let ast = parse_clean("Map<String, List<int>> m;\nList<List<List<int>>> deep;\n");
        assert_eq!(ast.declarations().len(), 2);
        assert_eq!(count(&ast, "TypeArgumentList"), 5);
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn test_parse_statements() {
        let ast = parse_clean(
            r#"
f(items) {
  var total = 0;
  outer: for (var i = 0; i < 10; i++) {
    for (final item in items) {
      if (item == null) continue outer;
      total += item;
    }
  }
  while (total > 100) total--;
  do { total++; } while (total < 5);
  switch (total) {
    case 1:
    case 2: return 'small';
    default: break;
  }
  try { g(); } on StateError catch (e, s) { rethrow; } finally { total = 0; }
  assert(total >= 0);
  int local(int x) => x;
  return total;
}
"#,
        );
        assert_eq!(count(&ast, "LabeledStatement"), 1);
        assert_eq!(count(&ast, "ForStatement"), 1);
        assert_eq!(count(&ast, "ForEachStatement"), 1);
        assert_eq!(count(&ast, "SwitchCase"), 2);
        assert_eq!(count(&ast, "SwitchDefault"), 1);
        assert_eq!(count(&ast, "CatchClause"), 1);
        assert_eq!(count(&ast, "FunctionDeclarationStatement"), 1);
        assert_eq!(count(&ast, "AssertStatement"), 1);
    }

    #[test]
    fn test_for_each_loop_variable_forms() {
        let ast = parse_clean("f(xs) { for (var x in xs) {} for (x in xs) {} for (int y in xs) {} }");
        let variables: Vec<&str> = ast
            .node_ids()
            .filter_map(|id| match ast.kind(id) {
                NodeKind::ForEachStatement(s) => Some(ast.kind(s.loop_variable).name()),
                _ => None,
            })
            .collect();
        assert_eq!(variables, vec!["DeclaredIdentifier", "SimpleIdentifier", "DeclaredIdentifier"]);
    }

    #[test]
    fn test_single_statement_entrypoint() {
        let mut listener = GatheringErrorListener::new();
        let tokens = scanner::scan("if (a) b(); else { c = 1; }", &mut listener);
        let ast = parse_statement(&tokens, &mut listener);
        listener.assert_no_errors();
        assert_eq!(ast.kind(ast.root()).name(), "IfStatement");
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    #[test]
    fn test_binary_precedence() {
        let ast = parse_expr("a + b * c == d || e");
        let NodeKind::BinaryExpression(or) = ast.kind(ast.root()) else {
            panic!("expected ||");
        };
        assert_eq!(ast.token(or.operator).lexeme, "||");
        let NodeKind::BinaryExpression(eq) = ast.kind(or.left_operand) else {
            panic!("expected ==");
        };
        let NodeKind::BinaryExpression(plus) = ast.kind(eq.left_operand) else {
            panic!("expected +");
        };
        assert_eq!(ast.token(plus.operator).lexeme, "+");
        assert_eq!(ast.kind(plus.right_operand).name(), "BinaryExpression");
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        let ast = parse_expr("a - b - c");
        let NodeKind::BinaryExpression(outer) = ast.kind(ast.root()) else {
            panic!("expected binary");
        };
        assert_eq!(ast.kind(outer.left_operand).name(), "BinaryExpression");
        assert_eq!(ast.kind(outer.right_operand).name(), "SimpleIdentifier");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let ast = parse_expr("a = b += c");
        let NodeKind::AssignmentExpression(outer) = ast.kind(ast.root()) else {
            panic!("expected assignment");
        };
        assert_eq!(ast.kind(outer.right_hand_side).name(), "AssignmentExpression");
    }

    #[test]
    fn test_selectors() {
        let ast = parse_expr("a.b.c(1).d[0](2)");
        assert_eq!(ast.kind(ast.root()).name(), "FunctionExpressionInvocation");
        assert_eq!(count(&ast, "PrefixedIdentifier"), 1);
        assert_eq!(count(&ast, "MethodInvocation"), 1);
        assert_eq!(count(&ast, "PropertyAccess"), 1);
        assert_eq!(count(&ast, "IndexExpression"), 1);
    }

    #[test]
    fn test_unqualified_call_is_method_invocation() {
        let ast = parse_expr("print(x, sep: ' ')");
        let NodeKind::MethodInvocation(call) = ast.kind(ast.root()) else {
            panic!("expected invocation");
        };
        assert!(call.target.is_none());
        assert_eq!(ast.name_of(call.method_name), "print");
        assert_eq!(count(&ast, "NamedExpression"), 1);
    }

    #[test]
    fn test_cascade_sections() {
        let ast = parse_expr("list..add(1)..[0] = 2..length");
        let NodeKind::CascadeExpression(cascade) = ast.kind(ast.root()) else {
            panic!("expected cascade");
        };
        let sections: Vec<&str> = cascade
            .cascade_sections
            .iter()
            .map(|s| ast.kind(*s).name())
            .collect();
        assert_eq!(sections, vec!["MethodInvocation", "AssignmentExpression", "PropertyAccess"]);
    }

    #[test]
    fn test_type_tests_and_casts() {
        let ast = parse_expr("a is! int && (b as String).isEmpty");
        let is = find(&ast, "IsExpression");
        let NodeKind::IsExpression(is) = ast.kind(is) else { unreachable!() };
        assert!(is.not_operator.is_some());
        assert_eq!(count(&ast, "AsExpression"), 1);
    }

    #[test]
    fn test_conditional_and_prefix() {
        let ast = parse_expr("!a ? -b : ++c");
        let NodeKind::ConditionalExpression(cond) = ast.kind(ast.root()) else {
            panic!("expected conditional");
        };
        assert_eq!(ast.kind(cond.condition).name(), "PrefixExpression");
        assert_eq!(ast.kind(cond.else_expression).name(), "PrefixExpression");
    }

    #[test]
    fn test_instance_creation_keeps_dotted_name_as_type() {
        let ast = parse_expr("new A.named(1)");
        let NodeKind::InstanceCreationExpression(creation) = ast.kind(ast.root()) else {
            panic!("expected creation");
        };
        let NodeKind::ConstructorName(name) = ast.kind(creation.constructor_name) else {
            panic!("expected constructor name");
        };
        assert!(name.name.is_none());
        assert_eq!(ast.name_of(name.type_name), "A.named");
    }

    #[test]
    fn test_collection_literals() {
        let ast = parse_expr("const <String, List<int>>{'a': [1, 2,], 'b': <int>[]}");
        let NodeKind::MapLiteral(map) = ast.kind(ast.root()) else {
            panic!("expected map");
        };
        assert!(map.const_keyword.is_some());
        assert_eq!(map.entries.len(), 2);
        assert_eq!(count(&ast, "ListLiteral"), 2);
    }

    #[test]
    fn test_function_expression() {
        let ast = parse_expr("(a, [b]) => a");
        assert_eq!(ast.kind(ast.root()).name(), "FunctionExpression");
        let ast = parse_expr("(a)");
        assert_eq!(ast.kind(ast.root()).name(), "ParenthesizedExpression");
    }

    #[test]
    fn test_integer_literal_values() {
        let ast = parse_expr("[42, 0xFF, 9223372036854775808]");
        let values: Vec<Option<i64>> = ast
            .node_ids()
            .filter_map(|id| match ast.kind(id) {
                NodeKind::IntegerLiteral(lit) => Some(lit.value),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![Some(42), Some(255), None]);
    }

    // ========================================================================
    // Strings
    // ========================================================================

    #[test]
    fn test_string_values() {
        let value = |source: &str| {
            let ast = parse_expr(source);
            ast.string_value(ast.root())
        };
        assert_eq!(value(r"'a\nb'").as_deref(), Some("a\nb"));
        assert_eq!(value(r"r'a\nb'").as_deref(), Some("a\\nb"));
        assert_eq!(value("'''\nline'''").as_deref(), Some("line"));
        assert_eq!(value(r#""\u{1F600}\x41""#).as_deref(), Some("\u{1F600}A"));
        assert_eq!(value(r"'it\'s'").as_deref(), Some("it's"));
    }

    #[test]
    fn test_adjacent_strings() {
        let ast = parse_expr("'a' \"b\" '''c'''");
        assert_eq!(ast.kind(ast.root()).name(), "AdjacentStrings");
        assert_eq!(ast.string_value(ast.root()).as_deref(), Some("abc"));
    }

    #[test]
    fn test_interpolation_elements() {
        let ast = parse_expr("'a${b + 1}c$d'");
        let NodeKind::StringInterpolation(interpolation) = ast.kind(ast.root()) else {
            panic!("expected interpolation");
        };
        let elements: Vec<&str> = interpolation
            .elements
            .iter()
            .map(|e| ast.kind(*e).name())
            .collect();
        assert_eq!(
            elements,
            vec![
                "InterpolationString",
                "InterpolationExpression",
                "InterpolationString",
                "InterpolationExpression",
                "InterpolationString",
            ]
        );
        let values: Vec<&str> = interpolation
            .elements
            .iter()
            .filter_map(|e| match ast.kind(*e) {
                NodeKind::InterpolationString(s) => Some(s.value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec!["a", "c", ""]);
    }

    #[test]
    fn test_adjacent_interpolations() {
        let ast = parse_expr("'$a${b}'");
        assert_eq!(count(&ast, "InterpolationExpression"), 2);
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    #[test]
    fn test_missing_semicolon_is_single_error() {
        let (ast, listener) = parse_str("var x = 1\nclass A {}");
        listener.assert_errors(&[ErrorCode::ExpectedToken]);
        assert_eq!(ast.declarations().len(), 2);
        match ast.kind(ast.declarations()[0]) {
            NodeKind::TopLevelVariableDeclaration(decl) => assert!(ast.token(decl.semicolon).is_synthetic()),
            other => panic!("expected variable, got {}", other.name()),
        }
    }

    #[test]
    fn test_missing_expression_yields_synthetic_identifier() {
        let (ast, listener) = parse_str("var x = ;");
        listener.assert_errors(&[ErrorCode::MissingExpression]);
        let identifier = find(&ast, "VariableDeclaration");
        let NodeKind::VariableDeclaration(decl) = ast.kind(identifier) else { unreachable!() };
        let initializer = decl.initializer.expect("initializer");
        assert!(ast.is_synthetic(initializer));
    }

    #[test]
    fn test_switch_default_errors() {
        let (_, listener) = parse_str("f(x) { switch (x) { default: break; case 1: break; default: } }");
        listener.assert_errors(&[
            ErrorCode::SwitchHasCaseAfterDefaultCase,
            ErrorCode::SwitchHasMultipleDefaultCases,
        ]);
    }

    #[test]
    fn test_switch_junk_member() {
        let (ast, listener) = parse_str("f(x) { switch (x) { 1; case 2: break; } }");
        listener.assert_errors(&[ErrorCode::ExpectedCaseOrDefault]);
        assert_eq!(count(&ast, "SwitchCase"), 1);
    }

    #[test]
    fn test_try_without_handlers() {
        let (_, listener) = parse_str("f() { try {} }");
        listener.assert_errors(&[ErrorCode::MissingCatchOrFinally]);
    }

    #[test]
    fn test_directive_after_declaration() {
        let (ast, listener) = parse_str("class A {}\nimport 'a.dart';\n");
        listener.assert_errors(&[ErrorCode::DirectiveAfterDeclaration]);
        assert_eq!(ast.directives().len(), 1);
    }

    #[test]
    fn test_class_clause_order_errors() {
        let (_, listener) = parse_str("class A implements B extends C {}");
        listener.assert_errors(&[ErrorCode::ImplementsBeforeExtends]);
        let (_, listener) = parse_str("class A extends B extends C {}");
        listener.assert_errors(&[ErrorCode::MultipleExtendsClauses]);
    }

    #[test]
    fn test_non_string_uri() {
        let (ast, listener) = parse_str("import foo;");
        listener.assert_errors(&[ErrorCode::NonStringLiteralAsUri]);
        assert_eq!(ast.directives().len(), 1);
    }

    #[test]
    fn test_stray_tokens_at_top_level() {
        let (ast, listener) = parse_str("} ) class A {}");
        assert!(listener.codes().contains(&ErrorCode::ExpectedExecutable));
        assert_eq!(count(&ast, "ClassDeclaration"), 1);
    }

    #[test]
    fn test_lone_void_recovers_as_function() {
        for source in ["void", "void x", "void x;"] {
            let (ast, listener) = parse_str(source);
            assert_eq!(count(&ast, "FunctionDeclaration"), 1, "{source}");
            assert!(!listener.codes().is_empty(), "{source}");
            assert_well_formed(&ast);
        }
    }

    #[test]
    fn test_lone_void_class_member_recovers_as_method() {
        let (ast, listener) = parse_str("class A { void } class B {}");
        assert!(listener.codes().contains(&ErrorCode::MissingFunctionParameters));
        assert_eq!(count(&ast, "MethodDeclaration"), 1);
        assert_eq!(count(&ast, "ClassDeclaration"), 2);
    }

    #[test]
    fn test_deeply_nested_parentheses_report_once() {
        let source = format!("f() => {}1;\nclass A {{}}", "(".repeat(20_000));
        let (ast, listener) = parse_str(&source);
        listener.assert_errors(&[ErrorCode::NestingTooDeep]);
        assert_eq!(count(&ast, "ClassDeclaration"), 1);
        assert_well_formed(&ast);
    }

    #[test]
    fn test_deeply_nested_blocks_terminate() {
        let source = format!("f() {}{}", "{".repeat(5_000), "}".repeat(5_000));
        let (ast, listener) = parse_str(&source);
        let codes = listener.codes();
        assert_eq!(codes.iter().filter(|c| **c == ErrorCode::NestingTooDeep).count(), 1);
        assert_eq!(count(&ast, "FunctionDeclaration"), 1);
        assert_well_formed(&ast);
    }

    // ========================================================================
    // Totality
    // ========================================================================

    fn assert_well_formed(ast: &Ast) {
        let root = ast.root();
        assert_eq!(ast.kind(root).name(), "CompilationUnit");
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in ast.children(id) {
                assert_eq!(ast.parent(child), Some(id), "{} lost its parent", ast.kind(child).name());
                if !matches!(ast.kind(child), NodeKind::Comment(_)) {
                    assert!(ast.offset(child) >= ast.offset(id));
                }
                stack.push(child);
            }
        }
    }

    fn fragment() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "class", "A", "{", "}", "(", ")", "[", "]", ";", ",", "=", "var", "x", "1", "'s'", "'a$b'",
            "'${", "if", "else", "for", "in", "switch", "case", "default", ":", "return", "import", "<",
            ">", ">>", "..", ".", "?", "=>", "new", "try", "catch", "void", "get", "operator", "+", "!",
            "/// doc\n", "typedef", "this", "super",
        ])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_parser_is_total(fragments in prop::collection::vec(fragment(), 0..40)) {
            let source = fragments.join(" ");
            let (ast, _) = parse_str(&source);
            assert_well_formed(&ast);
        }
    }
}
