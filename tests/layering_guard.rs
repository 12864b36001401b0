//! Layering guardrail: the syntax crate stays syntax-only.
//!
//! `kestrel_syntax` must not depend on the semantic crate. This test scans its `Cargo.toml` and
//! fails if `kestrel` appears in any dependency table.

#[test]
fn syntax_crate_does_not_depend_on_semantic_crate() {
    let manifest = include_str!("../crates/kestrel_syntax/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_dependencies = line.ends_with("dependencies]");
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let name = line.split(['=', ' ']).next().unwrap_or("").trim();
        if name == "kestrel" {
            panic!("`kestrel` must not appear in the dependencies of `kestrel_syntax`");
        }
    }
}
