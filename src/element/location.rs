use std::fmt;

use super::{Element, ElementId, ElementKind, LibraryElement};

/// Stable, parse-independent identity of an element.
///
/// The components are the library URI, the compilation unit URI and then one component per
/// enclosing declaration down to the element, joined with `;` in the encoded form:
/// `dart:core;dart:core;Object;toString`.
///
/// ## Notes
/// - Setters end in `=`, unnamed constructors are the empty component.
/// - Locals, labels and anonymous functions are not unique by name, so their component carries
///   the declaring offset: `i@42`, `@17` for a function expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementLocation {
    components: Vec<String>,
}

impl ElementLocation {
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }

    /// Decode the `;`-separated form.
    pub fn parse(encoding: &str) -> Self {
        Self {
            components: encoding.split(';').map(str::to_string).collect(),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn library_uri(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    pub fn encoding(&self) -> String {
        self.components.join(";")
    }
}

impl fmt::Display for ElementLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoding())
    }
}

/// Location component naming `element` among its siblings.
fn component(element: &Element) -> String {
    match element.kind {
        ElementKind::LocalVariable | ElementKind::Label => {
            format!("{}@{}", element.name, element.name_offset.unwrap_or(0))
        }
        ElementKind::Function if element.name.is_empty() => format!("@{}", element.name_offset.unwrap_or(0)),
        ElementKind::CompilationUnit => element.source.as_ref().map(|s| s.uri()).unwrap_or_default(),
        _ => element.lookup_name(),
    }
}

impl LibraryElement {
    /// Location of `id`, or `None` when the element does not belong to this library.
    pub fn location(&self, id: ElementId) -> Option<ElementLocation> {
        let mut components = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let element = self.element(id)?;
            if element.kind == ElementKind::Library {
                break;
            }
            components.push(self.component_of(id, element));
            current = element.enclosing;
        }
        components.push(self.source().uri());
        components.reverse();
        Some(ElementLocation::new(components))
    }

    fn component_of(&self, id: ElementId, element: &Element) -> String {
        if element.kind == ElementKind::Function && !element.name.is_empty() && self.is_nested(id) {
            return format!("{}@{}", element.name, element.name_offset.unwrap_or(0));
        }
        component(element)
    }

    /// Return `true` if `id` sits inside an executable or variable rather than a unit or class.
    fn is_nested(&self, id: ElementId) -> bool {
        let parent = self.element(id).and_then(|e| e.enclosing).and_then(|p| self.element(p));
        parent.is_some_and(|p| !matches!(p.kind, ElementKind::CompilationUnit | ElementKind::Class))
    }

    /// Element at `location`, when it lies in this library.
    pub fn find(&self, location: &ElementLocation) -> Option<ElementId> {
        let mut components = location.components().iter();
        if components.next()? != &self.source().uri() {
            return None;
        }
        let Some(unit_uri) = components.next() else {
            return Some(self.library_element());
        };
        let mut current = self
            .units()
            .iter()
            .copied()
            .find(|unit| self.element(*unit).is_some_and(|e| component(e) == *unit_uri))?;
        for wanted in components {
            let element = self.element(current)?;
            current = element
                .children
                .iter()
                .copied()
                .find(|child| self.element(*child).is_some_and(|e| self.component_of(*child, e) == *wanted))?;
        }
        Some(current)
    }
}
