//! Offset to element lookup for navigation.
//!
//! [`ElementLocator::locate`] maps a character range of a resolved unit to the element the
//! innermost node covering it refers to, together with the region of the word that was hit and
//! the region of the element's declaring name.

use kestrel_syntax::ast::{NodeId, NodeKind, NodeLocator};
use kestrel_syntax::scanner::TokenId;

use crate::element::ElementId;
use crate::resolver::ResolvedUnit;

/// A range of characters in a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
}

impl Region {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// What a range of a unit refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateResult {
    pub element: ElementId,
    /// Region of the located word in the searched unit.
    pub word_region: Region,
    /// Region of the element's declaring name in the element's own source; `None` for libraries,
    /// units, synthetic and bootstrap elements.
    pub candidate_region: Option<Region>,
}

/// Finds the element a range of a resolved unit refers to.
#[derive(Debug, Clone, Copy)]
pub struct ElementLocator {
    start: usize,
    end: usize,
}

impl ElementLocator {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Locate the element for `start..end` in `unit`.
    pub fn locate(unit: &ResolvedUnit, start: usize, end: usize) -> Option<LocateResult> {
        Self::new(start, end).search(unit)
    }

    pub fn search(&self, unit: &ResolvedUnit) -> Option<LocateResult> {
        let ast = &unit.ast;
        let node = NodeLocator::range(self.start, self.end).search(ast)?;
        // The innermost node may be a wrapper with no binding of its own (an argument list around
        // the operand); walk outwards until something answers.
        ast.ancestors(node).find_map(|id| self.located(unit, id))
    }

    fn located(&self, unit: &ResolvedUnit, id: NodeId) -> Option<LocateResult> {
        let ast = &unit.ast;
        let word_region = match ast.kind(id) {
            NodeKind::SimpleIdentifier(_) => node_region(unit, id),
            NodeKind::BinaryExpression(binary) => self.operator_region(unit, binary.operator)?,
            NodeKind::PrefixExpression(prefix) => self.operator_region(unit, prefix.operator)?,
            NodeKind::PostfixExpression(postfix) => self.operator_region(unit, postfix.operator)?,
            NodeKind::AssignmentExpression(assignment) => self.operator_region(unit, assignment.operator)?,
            NodeKind::SimpleStringLiteral(literal) if is_directive_uri(unit, id) => string_contents(unit, literal.literal),
            _ => return None,
        };
        let element = unit.element_id(id).filter(|e| !e.is_error() && *e != ElementId::DYNAMIC)?;
        let declared = unit.graph.element(element);
        let candidate_region = declared
            .name_offset
            .map(|offset| Region::new(offset, declared.name.len()));
        Some(LocateResult {
            element,
            word_region,
            candidate_region,
        })
    }

    /// Region of an operator token, only when the searched range lies inside it.
    fn operator_region(&self, unit: &ResolvedUnit, operator: TokenId) -> Option<Region> {
        let token = unit.ast.token(operator);
        let region = Region::new(token.offset, token.len());
        (region.offset <= self.start && self.end <= region.end()).then_some(region)
    }
}

fn node_region(unit: &ResolvedUnit, id: NodeId) -> Region {
    Region::new(unit.ast.offset(id), unit.ast.length(id))
}

fn is_directive_uri(unit: &ResolvedUnit, id: NodeId) -> bool {
    let ast = &unit.ast;
    match ast.parent(id).map(|p| ast.kind(p)) {
        Some(NodeKind::ImportDirective(d)) => d.uri == id,
        Some(NodeKind::ExportDirective(d)) => d.uri == id,
        Some(NodeKind::PartDirective(d)) => d.uri == id,
        _ => false,
    }
}

/// Region between the quotes of a string literal token; the whole token when it is unterminated.
fn string_contents(unit: &ResolvedUnit, literal: TokenId) -> Region {
    let token = unit.ast.token(literal);
    let lexeme = token.lexeme.as_str();
    let body = lexeme.strip_prefix('r').unwrap_or(lexeme);
    let quote = ["'''", "\"\"\"", "'", "\""]
        .into_iter()
        .find(|q| body.starts_with(q) && body.len() >= 2 * q.len() && body.ends_with(q));
    match quote {
        Some(quote) => {
            let start = lexeme.len() - body.len() + quote.len();
            Region::new(token.offset + start, lexeme.len() - start - quote.len())
        }
        None => Region::new(token.offset, lexeme.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AnalysisContext;
    use crate::element::{ElementKind, create_core_library};
    use crate::options::AnalysisOptions;
    use crate::source_factory::SourceFactory;
    use kestrel_syntax::source::Source;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn resolve(files: &[(&str, &str)]) -> (Arc<ResolvedUnit>, String) {
        let context = AnalysisContext::new(AnalysisOptions::default(), SourceFactory::default());
        let core = create_core_library();
        context
            .record_library_elements(HashMap::from([(core.source().clone(), core)]))
            .unwrap();
        for (path, text) in files {
            context
                .source_factory()
                .set_contents(&Source::for_file(path), Some(text.to_string()));
        }
        let source = Source::for_file(files[0].0);
        (context.resolve(&source, &source).unwrap(), files[0].1.to_string())
    }

    fn locate_at(unit: &ResolvedUnit, text: &str, needle: &str) -> Option<LocateResult> {
        let offset = text.find(needle).unwrap();
        ElementLocator::locate(unit, offset, offset)
    }

    #[test]
    fn test_reference_locates_declaration() {
        let text = "class A { int count; m() { return count; } }";
        let (unit, text) = resolve(&[("/a.dart", text)]);
        let usage = text.rfind("count").unwrap();
        let result = ElementLocator::locate(&unit, usage, usage + 2).unwrap();
        let declared = text.find("count").unwrap();
        assert_eq!(result.candidate_region, Some(Region::new(declared, 5)));
        assert_eq!(result.word_region, Region::new(usage, 5));
        assert_eq!(unit.graph.kind(result.element), ElementKind::Field);
    }

    #[test]
    fn test_operator_locates_method() {
        let text = "f(int a, int b) => a + b;";
        let (unit, text) = resolve(&[("/a.dart", text)]);
        let plus = text.find('+').unwrap();
        let result = ElementLocator::locate(&unit, plus, plus).unwrap();
        assert_eq!(result.word_region, Region::new(plus, 1));
        let element = unit.graph.element(result.element);
        assert_eq!((element.kind, element.name.as_str()), (ElementKind::Method, "+"));
        assert_eq!(result.candidate_region, None);
    }

    #[test]
    fn test_directive_uri_locates_library() {
        let main = "import 'b.dart'; f() => new B();";
        let (unit, text) = resolve(&[("/a.dart", main), ("/b.dart", "class B {}")]);
        let result = locate_at(&unit, &text, "b.dart").unwrap();
        assert_eq!(result.word_region, Region::new(text.find("b.dart").unwrap(), 6));
        assert_eq!(unit.graph.kind(result.element), ElementKind::Library);
    }

    #[test]
    fn test_whitespace_locates_nothing() {
        let (unit, _) = resolve(&[("/a.dart", "class A {}   ")]);
        assert_eq!(ElementLocator::locate(&unit, 11, 11), None);
    }

    #[test]
    fn test_double_quoted_contents() {
        let text = "import \"c.dart\";";
        let (unit, text) = resolve(&[("/a.dart", text), ("/c.dart", "library c;")]);
        let result = locate_at(&unit, &text, "c.dart").unwrap();
        assert_eq!(result.word_region, Region::new(text.find("c.dart").unwrap(), 6));
    }
}
