//! Analysis context: caching, invalidation and bootstrap resolution end to end.

mod common;

use std::sync::Arc;
use std::thread;

use common::{add_source, context_with_core, init_tracing};
use kestrel::ast::{Ast, NodeKind};
use kestrel::diagnostics::{ErrorCode, GatheringErrorListener};
use kestrel::source::Source;
use kestrel::source_factory::SourceFactory;
use kestrel::{AnalysisContext, AnalysisException, AnalysisOptions};

fn first_class_name(ast: &Ast) -> Option<String> {
    ast.declarations().iter().find_map(|d| match ast.kind(*d) {
        NodeKind::ClassDeclaration(declaration) => Some(ast.name_of(declaration.name)),
        _ => None,
    })
}

#[test]
fn test_changed_source_is_reparsed() {
    let context = context_with_core(AnalysisOptions::default());
    let source = add_source(&context, "/lib/test.dart", "class A {}");
    assert_eq!(first_class_name(&context.parse(&source).unwrap()).as_deref(), Some("A"));

    context.source_factory().set_contents(&source, Some("class B {}".to_string()));
    context.source_changed(&source);
    assert_eq!(first_class_name(&context.parse(&source).unwrap()).as_deref(), Some("B"));
}

#[test]
fn test_bootstrap_names_bind_to_installed_elements() {
    let context = context_with_core(AnalysisOptions::default());
    let text = "
class Holder {
  Object o; bool b; num n; double d; int i; String s; StackTrace t; Type ty;
  List<int> list; Map<String, int> map;
}";
    let source = add_source(&context, "/lib/holder.dart", text);
    let mut listener = GatheringErrorListener::new();
    let unit = context.resolve_with_errors(&source, &source, &mut listener).unwrap();
    listener.assert_no_errors();

    let core = context.library_element(&Source::library("core")).unwrap().unwrap();
    let names = ["Object", "bool", "num", "double", "int", "String", "StackTrace", "Type", "List", "Map"];
    let ast = &unit.ast;
    for name in names {
        let reference = ast
            .node_ids()
            .find(|id| ast.identifier_name(*id) == Some(name))
            .unwrap_or_else(|| panic!("no reference to {name}"));
        assert_eq!(unit.element_id(reference), core.class_named(name), "{name}");
    }
}

#[test]
fn test_resolution_without_core_is_an_error() {
    init_tracing();
    let context = AnalysisContext::new(AnalysisOptions::default(), SourceFactory::default());
    let source = add_source(&context, "/lib/test.dart", "class A {}");
    // Scanning and parsing do not need the core library.
    context.parse(&source).unwrap();
    assert!(matches!(
        context.resolve(&source, &source),
        Err(AnalysisException::MissingCoreLibrary(_))
    ));
}

#[test]
fn test_part_resolves_within_its_library() {
    let context = context_with_core(AnalysisOptions::default());
    let library = add_source(
        &context,
        "/lib/shapes.dart",
        "library shapes; part 'circle.dart'; class Shape { num area() => 0; }",
    );
    let part = add_source(
        &context,
        "/lib/circle.dart",
        "part of shapes; class Circle extends Shape { num r; num area() => r * r * 3; }",
    );

    let mut listener = GatheringErrorListener::new();
    let unit = context.resolve_with_errors(&part, &library, &mut listener).unwrap();
    listener.assert_no_errors();
    let ast = &unit.ast;
    let shape = ast
        .node_ids()
        .find(|id| ast.identifier_name(*id) == Some("Shape"))
        .and_then(|id| unit.element(id))
        .unwrap();
    assert_eq!(shape.source.as_ref(), Some(&library));

    assert!(matches!(
        context.resolve(&part, &part),
        Err(AnalysisException::NotALibrary(_))
    ));
}

#[test]
fn test_imported_library_change_is_seen_by_importer() {
    let context = context_with_core(AnalysisOptions::default());
    let main = add_source(&context, "/lib/main.dart", "import 'util.dart'; f() => helper();");
    let util = add_source(&context, "/lib/util.dart", "helper() => 1;");
    assert!(context.errors(&main).unwrap().is_empty());

    context.source_factory().set_contents(&util, Some("other() => 1;".to_string()));
    context.source_changed(&util);
    let codes: Vec<ErrorCode> = context.errors(&main).unwrap().iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ErrorCode::UndefinedIdentifier]);
}

#[test]
fn test_hints_follow_options() {
    let text = "int f(bool c) { if (c) return 1; }";
    let with_hints = context_with_core(AnalysisOptions::default());
    let source = add_source(&with_hints, "/lib/a.dart", text);
    let codes: Vec<ErrorCode> = with_hints.errors(&source).unwrap().iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ErrorCode::MissingReturn]);

    let without = context_with_core(AnalysisOptions::default().with_hints(false));
    let source = add_source(&without, "/lib/a.dart", text);
    assert!(without.errors(&source).unwrap().is_empty());
}

#[test]
fn test_disk_sources_are_read_through_the_factory() {
    let directory = std::env::temp_dir().join(format!("kestrel-context-{}", std::process::id()));
    std::fs::create_dir_all(&directory).unwrap();
    let path = directory.join("disk.dart");
    std::fs::write(&path, "class OnDisk {}").unwrap();

    let context = context_with_core(AnalysisOptions::default());
    let source = context.source_factory().for_file(&path);
    assert_eq!(first_class_name(&context.parse(&source).unwrap()).as_deref(), Some("OnDisk"));

    std::fs::write(&path, "class Rewritten {}").unwrap();
    context.source_changed(&source);
    assert_eq!(first_class_name(&context.parse(&source).unwrap()).as_deref(), Some("Rewritten"));
    std::fs::remove_dir_all(&directory).unwrap();
}

#[test]
fn test_concurrent_requests_and_invalidations() {
    let context = Arc::new(context_with_core(AnalysisOptions::default()));
    let source = add_source(&context, "/lib/shared.dart", "class A { int x; m() => x + 1; }");

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let context = Arc::clone(&context);
            let source = source.clone();
            thread::spawn(move || {
                for round in 0..25 {
                    if (worker + round) % 5 == 0 {
                        context.source_changed(&source);
                    }
                    let unit = context.resolve(&source, &source).unwrap();
                    assert!(unit.errors.is_empty());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let unit = context.resolve(&source, &source).unwrap();
    assert!(Arc::ptr_eq(&unit, &context.resolve(&source, &source).unwrap()));
}
