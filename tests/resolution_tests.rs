//! Resolution of whole files through the analysis context.

mod common;

use std::fs;
use std::path::Path;

use common::{add_source, context_with_core};
use kestrel::ast::NodeKind;
use kestrel::AnalysisOptions;

/// `CODE \`text\`` per error, in source order.
fn error_summary(text: &str) -> String {
    let context = context_with_core(AnalysisOptions::default());
    let source = add_source(&context, "/lib/test.dart", text);
    context
        .errors(&source)
        .unwrap()
        .iter()
        .map(|e| format!("{} `{}`", e.code.name(), &text[e.offset..e.offset + e.length]))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every fixture under `tests/fixtures/valid` resolves without errors or hints.
#[test]
fn test_valid_fixtures() {
    let fixtures_dir = Path::new("tests/fixtures/valid");
    let mut checked = 0;
    for entry in fs::read_dir(fixtures_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_none_or(|e| e != "dart") {
            continue;
        }
        let text = fs::read_to_string(&path).unwrap();
        let summary = error_summary(&text);
        assert!(summary.is_empty(), "{} has errors:\n{summary}", path.display());
        checked += 1;
    }
    assert!(checked > 0, "no fixtures found");
}

#[test]
fn test_binding_and_type_errors() {
    let summary = error_summary(
        "
class Point {
  num x;
  num y;
  Point(this.x, this.y);
  Point operator +(Point other) => new Point(x + other.x, y + other.y);
  num get length => x * x + y * y;
}

f(Point p, Point q) {
  var sum = p + q;
  var n = sum.length;
  var missing = p.z;
  bool flag = n;
  if (n) {}
  undefinedCall();
  String s = 1;
}
",
    );
    insta::assert_snapshot!(summary, @r"
    UNDEFINED_GETTER `z`
    INVALID_ASSIGNMENT `n`
    NON_BOOL_CONDITION `n`
    UNDEFINED_IDENTIFIER `undefinedCall`
    INVALID_ASSIGNMENT `1`
    ");
}

#[test]
fn test_unresolved_names_and_members() {
    let summary = error_summary(
        "
import 'missing.dart';

class Base {}

class Sub extends Base {
  m() => super.nope();
}

helper() {}

f(Base b, Unknown u, helper h) {
  b.grow();
  b - b;
}
",
    );
    insta::assert_snapshot!(summary, @r"
    URI_DOES_NOT_EXIST `'missing.dart'`
    UNDEFINED_SUPER_METHOD `nope`
    UNDEFINED_CLASS `Unknown`
    NOT_A_TYPE `helper`
    UNDEFINED_METHOD `grow`
    UNDEFINED_OPERATOR `b - b`
    ");
}

#[test]
fn test_hints() {
    let summary = error_summary(
        "
int sign(int x) {
  if (x < 0) return -1;
  if (x > 0) return 1;
}

int early(int x) {
  return x;
  x = 2;
  x = 3;
}

void nothing() {}
",
    );
    insta::assert_snapshot!(summary, @r"
    MISSING_RETURN `int`
    DEAD_CODE `x = 2;
      x = 3;`
    ");
}

#[test]
fn test_operators_resolve_to_core_methods() {
    let context = context_with_core(AnalysisOptions::default());
    let source = add_source(&context, "/lib/ops.dart", "f(int a, double b, String s) => [a + b, -a, s[0], a ~/ 2];");
    let unit = context.resolve(&source, &source).unwrap();
    assert!(unit.errors.is_empty());

    let ast = &unit.ast;
    let mut bound: Vec<String> = ast
        .node_ids()
        .filter(|id| {
            matches!(
                ast.kind(*id),
                NodeKind::BinaryExpression(_) | NodeKind::PrefixExpression(_) | NodeKind::IndexExpression(_)
            )
        })
        .filter_map(|id| unit.element(id))
        .map(|e| e.name.clone())
        .collect();
    bound.sort();
    assert_eq!(bound, vec!["+", "[]", "unary-", "~/"]);
}
