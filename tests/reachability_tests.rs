//! Conformance of `always_exits` with the statement table.
//!
//! Each case is one statement parsed on its own; the expectation says whether control can never
//! complete normally through it.

use kestrel::diagnostics::NullErrorListener;
use kestrel::hint::always_exits;
use kestrel::{parser, scanner};

fn exits(source: &str) -> bool {
    let tokens = scanner::scan(source, &mut NullErrorListener);
    let statement = parser::parse_statement(&tokens, &mut NullErrorListener);
    always_exits(&statement, statement.root())
}

fn check(cases: &[(&str, bool)]) {
    let failures: Vec<String> = cases
        .iter()
        .filter(|(source, expected)| exits(source) != *expected)
        .map(|(source, expected)| format!("`{source}`: expected {expected}"))
        .collect();
    assert!(failures.is_empty(), "reachability mismatches:\n{}", failures.join("\n"));
}

#[test]
fn test_expressions() {
    check(&[
        ("a as Object;", false),
        ("throw '' as Object;", true),
        ("v = 1;", false),
        ("a[throw ''] = 0;", true),
        ("v = throw '';", true),
        ("a && b;", false),
        ("throw '' && b;", true),
        ("a && (throw '');", true),
        ("throw '' || b;", true),
        ("a || (throw '');", true),
        ("a..b(throw '');", true),
        ("a..[throw ''];", true),
        ("throw ''..b();", true),
        ("f(g);", false),
        ("f(throw '');", true),
        ("throw ''(g);", true),
        ("a.b;", false),
        ("a;", false),
        ("a[b];", false),
        ("a[throw ''];", true),
        ("throw ''[b];", true),
        ("new A(b);", false),
        ("new A(throw '');", true),
        ("A is B;", false),
        ("throw '' is B;", true),
        ("a.b(c);", false),
        ("a.b(throw '');", true),
        ("throw ''.b(c);", true),
        ("(a);", false),
        ("(throw '');", true),
        ("new Object().a;", false),
        ("(throw '').a;", true),
        ("super.a;", false),
        ("this.a;", false),
        ("throw new Object();", true),
        ("rethrow;", true),
    ]);
}

#[test]
fn test_literals_never_exit() {
    check(&[
        ("true;", false),
        ("1.1;", false),
        ("1;", false),
        ("null;", false),
        ("'str';", false),
    ]);
}

#[test]
fn test_conditional_expressions_need_both_arms() {
    check(&[
        ("c ? throw '' : throw '';", true),
        ("c ? i : throw '';", false),
        ("c ? i : j;", false),
        ("c ? throw '' : j;", false),
    ]);
}

#[test]
fn test_function_bodies_run_later() {
    check(&[("(){};", false), ("(int i) => throw '';", false)]);
}

#[test]
fn test_blocks_and_declarations() {
    check(&[
        ("{}", false),
        ("{ int i = 0; }", false),
        ("{ return 0; }", true),
        ("{ return 0; throw 'a'; }", true),
        ("{ throw 0; x = null; }", true),
        (";", false),
        ("label: a;", false),
        ("label: throw '';", true),
        ("return 0;", true),
        ("int i;", false),
        ("int i = 0;", false),
        ("int i = throw new Object();", true),
    ]);
}

#[test]
fn test_if_statements() {
    check(&[
        ("if (c) i++;", false),
        ("if (c) return 0;", false),
        ("if (c) return 0; else return 1;", true),
        ("if (c) i++; else return 1;", false),
        ("if (c) i++; else j++;", false),
        ("if (c) return 0; else j++;", false),
    ]);
}

#[test]
fn test_loops() {
    check(&[
        ("{ do { } while (false); }", false),
        ("{ do { } while (throw ''); }", true),
        ("{ do {} while (true); }", false),
        ("{ do { return null; } while (true);  }", true),
        ("for (element in list) {}", false),
        ("for (element in throw '') {}", true),
        ("for (;;) {}", false),
        ("for (; throw 0;) {}", true),
        ("for (i = throw 0;;) {}", true),
        ("for (;; i++, throw 0) {}", true),
        ("for (int i = throw 0;;) {}", true),
        ("{ while (false) {} }", false),
        ("{ while (throw '') {} }", true),
        ("{ while (true) {} }", false),
        ("{ while (true) { return null; } }", true),
        ("{ while (true) { throw ''; } }", true),
    ]);
}

/// A `for` loop with no condition, or a literal `true` one, is treated like `while (true)`.
#[test]
fn test_unconditional_for_loops() {
    check(&[
        ("for (;;) { return 0; }", true),
        ("for (; true;) { throw ''; }", true),
        ("for (; true;) {}", false),
        ("for (; c;) { return 0; }", false),
    ]);
}

#[test]
fn test_switch_statements() {
    check(&[
        ("switch (i) { case 0: return 0; default: return 1; }", true),
        ("switch (i) { case 0: return 0; }", false),
        ("switch (i) { case 0: i++; default: return 1; }", false),
        ("switch (throw '') { case 0: i++; }", true),
    ]);
}

#[test]
fn test_try_statements() {
    check(&[
        ("try {} catch (e, s) {} finally {}", false),
        ("try {} catch (e, s) { return 1; } finally {}", false),
        ("try {} catch (e, s) {} finally { return 1; }", true),
        ("try { return 1; } catch (e, s) {} finally {}", true),
    ]);
}
