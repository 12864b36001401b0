//! Static types.
//!
//! [`Type`] is the closed set of types the analyzer assigns to expressions and declarations.
//! Interface types name their class by [`ElementId`]; generic classes carry their type
//! arguments, and a class's own type parameters appear as [`Type::Parameter`] until a concrete
//! receiver substitutes them.
//!
//! ## Module Structure
//!
//! - `provider` - the core types (`Object`, `bool`, `int`, `List<E>`, ...) of one core library
//! - `system` - subtyping, assignability, least upper bound and member lookup

mod provider;
mod system;

pub use provider::TypeProvider;
pub use system::{Member, TypeSystem};

use crate::element::{ElementGraph, ElementId};

/// A static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// Unknown, compatible with everything.
    #[default]
    Dynamic,
    Void,
    /// Type of `null` and of expressions that never complete (`throw`).
    Bottom,
    /// Sentinel attached where resolution failed; never reported twice.
    Error,
    Interface(InterfaceType),
    Parameter(ElementId),
    Function(Box<FunctionType>),
}

/// A class applied to type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceType {
    pub element: ElementId,
    pub arguments: Vec<Type>,
}

/// Signature of a function, method or accessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FunctionType {
    pub return_type: Type,
    pub required: Vec<Type>,
    pub positional: Vec<Type>,
    pub named: Vec<(String, Type)>,
}

impl Type {
    pub fn interface(element: ElementId, arguments: Vec<Type>) -> Self {
        Type::Interface(InterfaceType { element, arguments })
    }

    pub fn function(function: FunctionType) -> Self {
        Type::Function(Box::new(function))
    }

    /// Class of an interface type.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Type::Interface(interface) => Some(interface.element),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            Type::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, Type::Bottom)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// `dynamic` or the error sentinel: nothing can be checked against it.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Dynamic | Type::Error)
    }

    /// Replace each of `parameters` by the matching entry of `arguments` (`dynamic` when missing).
    pub fn substitute(&self, parameters: &[ElementId], arguments: &[Type]) -> Type {
        if parameters.is_empty() {
            return self.clone();
        }
        match self {
            Type::Parameter(id) => match parameters.iter().position(|p| p == id) {
                Some(index) => arguments.get(index).cloned().unwrap_or_default(),
                None => self.clone(),
            },
            Type::Interface(interface) => Type::interface(
                interface.element,
                interface
                    .arguments
                    .iter()
                    .map(|a| a.substitute(parameters, arguments))
                    .collect(),
            ),
            Type::Function(function) => Type::function(function.substitute(parameters, arguments)),
            Type::Dynamic | Type::Void | Type::Bottom | Type::Error => self.clone(),
        }
    }

    /// Render the type the way it is written in source (`List<int>`, `(int) -> String`).
    pub fn display(&self, graph: &ElementGraph) -> String {
        match self {
            Type::Dynamic => "dynamic".to_string(),
            Type::Void => "void".to_string(),
            Type::Bottom => "Bottom".to_string(),
            Type::Error => "<error>".to_string(),
            Type::Parameter(id) => graph.element(*id).name.clone(),
            Type::Interface(interface) => {
                let name = graph.element(interface.element).name.clone();
                if interface.arguments.is_empty() {
                    return name;
                }
                let arguments: Vec<String> = interface.arguments.iter().map(|a| a.display(graph)).collect();
                format!("{name}<{}>", arguments.join(", "))
            }
            Type::Function(function) => {
                let mut parameters: Vec<String> = function.required.iter().map(|t| t.display(graph)).collect();
                if !function.positional.is_empty() {
                    let optional: Vec<String> = function.positional.iter().map(|t| t.display(graph)).collect();
                    parameters.push(format!("[{}]", optional.join(", ")));
                }
                if !function.named.is_empty() {
                    let named: Vec<String> = function
                        .named
                        .iter()
                        .map(|(name, t)| format!("{name}: {}", t.display(graph)))
                        .collect();
                    parameters.push(format!("{{{}}}", named.join(", ")));
                }
                format!("({}) -> {}", parameters.join(", "), function.return_type.display(graph))
            }
        }
    }
}

impl FunctionType {
    pub fn returning(return_type: Type) -> Self {
        Self {
            return_type,
            ..Self::default()
        }
    }

    pub fn substitute(&self, parameters: &[ElementId], arguments: &[Type]) -> FunctionType {
        let each = |types: &[Type]| -> Vec<Type> { types.iter().map(|t| t.substitute(parameters, arguments)).collect() };
        FunctionType {
            return_type: self.return_type.substitute(parameters, arguments),
            required: each(&self.required),
            positional: each(&self.positional),
            named: self
                .named
                .iter()
                .map(|(name, t)| (name.clone(), t.substitute(parameters, arguments)))
                .collect(),
        }
    }

    /// Type of the first parameter, whichever group it is in.
    pub fn first_parameter(&self) -> Option<&Type> {
        self.required
            .first()
            .or_else(|| self.positional.first())
            .or_else(|| self.named.first().map(|(_, t)| t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind, LibraryElement};
    use kestrel_syntax::source::Source;
    use std::sync::Arc;

    #[test]
    fn test_substitute_and_display() {
        let mut library = LibraryElement::new(Source::for_file("/a.dart"), "a");
        let list = library.add(Element::new(ElementKind::Class, "List"));
        let mut e = Element::new(ElementKind::TypeParameter, "E");
        e.enclosing = Some(list);
        let e = library.add(e);
        let int = library.add(Element::new(ElementKind::Class, "int"));
        let mut graph = ElementGraph::new();
        graph.insert(Arc::new(library));

        let list_of_e = Type::interface(list, vec![Type::Parameter(e)]);
        assert_eq!(list_of_e.display(&graph), "List<E>");
        let list_of_int = list_of_e.substitute(&[e], &[Type::interface(int, vec![])]);
        assert_eq!(list_of_int.display(&graph), "List<int>");

        let getter = Type::function(FunctionType {
            return_type: Type::Parameter(e),
            required: vec![Type::interface(int, vec![])],
            positional: vec![],
            named: vec![("growable".to_string(), Type::Dynamic)],
        });
        assert_eq!(getter.display(&graph), "(int, {growable: dynamic}) -> E");
        assert_eq!(getter.substitute(&[e], &[]).display(&graph), "(int, {growable: dynamic}) -> dynamic");
    }
}
