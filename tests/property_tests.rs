//! Property-based tests for resolution.
//!
//! Programs are assembled from well-formed statements over a small vocabulary, some of it
//! undefined, so that binding and type errors occur at random places.

mod common;

use common::{add_source, context_with_core};
use kestrel::AnalysisOptions;
use proptest::prelude::*;

fn statement() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "var a = 1;",
        "int b = a + 2;",
        "double c = b / 2;",
        "String s = 'x$b';",
        "s = s + 'y';",
        "b += 1;",
        "if (b > 1) { return b; }",
        "while (flag) { b--; }",
        "for (var item in items) { total = total + item; }",
        "items.add(b);",
        "missing(b);",
        "b.nope;",
        "int wrong = s;",
        "if (b) {}",
        "return s.length;",
        "throw 'stop';",
        "label: { break label; }",
        "switch (b) { case 1: return 1; default: b = 0; }",
        "var f = (int x) => x * 2;",
        "f(3);",
    ])
}

fn program(statements: &[&str]) -> String {
    format!(
        "class Box {{ int value; Box(this.value); int twice() => value * 2; }}\n\
         int run(bool flag, List<int> items, num total) {{\n{}\n}}\n",
        statements.join("\n")
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Resolving the same unit twice gives the same bindings, types and errors.
    #[test]
    fn prop_resolution_is_deterministic(statements in prop::collection::vec(statement(), 0..12)) {
        let text = program(&statements);
        let context = context_with_core(AnalysisOptions::default());
        let source = add_source(&context, "/lib/prop.dart", &text);
        let first = context.resolve(&source, &source).unwrap();
        context.source_changed(&source);
        let second = context.resolve(&source, &source).unwrap();
        prop_assert!(!std::sync::Arc::ptr_eq(&first, &second));
        prop_assert_eq!(&first.errors, &second.errors);
        for id in first.ast.node_ids() {
            prop_assert_eq!(
                first.element(id).map(|e| (&e.name, e.kind)),
                second.element(id).map(|e| (&e.name, e.kind))
            );
            prop_assert_eq!(
                first.static_type(id).map(|t| t.display(&first.graph)),
                second.static_type(id).map(|t| t.display(&second.graph))
            );
        }
    }

    /// Every reported error lies inside the text it was reported for.
    #[test]
    fn prop_errors_stay_in_bounds(statements in prop::collection::vec(statement(), 0..12)) {
        let text = program(&statements);
        let context = context_with_core(AnalysisOptions::default());
        let source = add_source(&context, "/lib/prop.dart", &text);
        for error in context.errors(&source).unwrap() {
            prop_assert!(error.offset + error.length <= text.len(), "{error}");
            prop_assert_eq!(error.source.as_ref(), Some(&source));
        }
    }
}
