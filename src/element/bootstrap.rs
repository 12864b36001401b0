//! Bootstrap core library.
//!
//! Resolution needs a handful of core classes before anything else can be typed. Parsing a full
//! SDK for that is out of reach for unit tests, so [`create_core_library`] builds the classes
//! directly as elements. Installing the result with
//! [`AnalysisContext::record_library_elements`](crate::context::AnalysisContext::record_library_elements)
//! lets every other library resolve against it.

use kestrel_syntax::ast::ParameterKind;
use kestrel_syntax::source::Source;

use super::{Element, ElementId, ElementKind, LibraryElement};
use crate::types::{FunctionType, Type};

/// URI of the core library every library imports implicitly.
pub const CORE_LIBRARY_URI: &str = "dart:core";

/// Build the minimal core library: `Object`; `bool`, `num`, `String`, `StackTrace` and `Type`
/// extending `Object`; `int` and `double` extending `num`; `List<E>` and `Map<K, V>`.
pub fn create_core_library() -> LibraryElement {
    let mut core = CoreBuilder::new();

    let object = core.declare_class("Object", &[], None);
    let object_type = Type::interface(object, vec![]);
    let bool_ = core.declare_class("bool", &[], Some(object_type.clone()));
    let num = core.declare_class("num", &[], Some(object_type.clone()));
    let int = core.declare_class("int", &[], Some(Type::interface(num, vec![])));
    let double = core.declare_class("double", &[], Some(Type::interface(num, vec![])));
    let string = core.declare_class("String", &[], Some(object_type.clone()));
    let stack_trace = core.declare_class("StackTrace", &[], Some(object_type.clone()));
    let type_ = core.declare_class("Type", &[], Some(object_type.clone()));
    let list = core.declare_class("List", &["E"], Some(object_type.clone()));
    let map = core.declare_class("Map", &["K", "V"], Some(object_type.clone()));

    let bool_t = Type::interface(bool_, vec![]);
    let num_t = Type::interface(num, vec![]);
    let int_t = Type::interface(int, vec![]);
    let double_t = Type::interface(double, vec![]);
    let string_t = Type::interface(string, vec![]);

    // Object
    core.method(object, "==", bool_t.clone(), &[object_type.clone()]);
    core.method(object, "toString", string_t.clone(), &[]);
    core.getter(object, "hashCode", int_t.clone());
    core.getter(object, "runtimeType", Type::interface(type_, vec![]));

    // num
    for op in ["+", "-", "*", "%", "~/"] {
        core.method(num, op, num_t.clone(), &[num_t.clone()]);
    }
    core.method(num, "/", double_t.clone(), &[num_t.clone()]);
    for op in ["<", ">", "<=", ">="] {
        core.method(num, op, bool_t.clone(), &[num_t.clone()]);
    }
    core.method(num, "unary-", num_t.clone(), &[]);
    core.method(num, "abs", num_t.clone(), &[]);
    core.method(num, "toInt", int_t.clone(), &[]);
    core.method(num, "toDouble", double_t.clone(), &[]);

    // int
    for op in ["&", "|", "^", "<<", ">>"] {
        core.method(int, op, int_t.clone(), &[int_t.clone()]);
    }
    core.method(int, "~", int_t.clone(), &[]);
    core.method(int, "unary-", int_t.clone(), &[]);
    core.getter(int, "isEven", bool_t.clone());

    // double
    core.method(double, "round", int_t.clone(), &[]);

    // String
    core.method(string, "+", string_t.clone(), &[string_t.clone()]);
    core.method(string, "[]", string_t.clone(), &[int_t.clone()]);
    core.getter(string, "length", int_t.clone());
    core.getter(string, "isEmpty", bool_t.clone());
    let substring = core.method(string, "substring", string_t.clone(), &[int_t.clone()]);
    core.optional_parameter(substring, "endIndex", int_t.clone());

    // List<E>
    let e = Type::Parameter(core.type_parameters(list)[0]);
    core.getter(list, "length", int_t.clone());
    core.getter(list, "isEmpty", bool_t.clone());
    core.method(list, "[]", e.clone(), &[int_t.clone()]);
    core.method(list, "[]=", Type::Void, &[int_t.clone(), e.clone()]);
    core.method(list, "add", Type::Void, &[e]);
    let list_new = core.constructor(list, "");
    core.optional_parameter(list_new, "length", int_t.clone());

    // Map<K, V>
    let [k, v] = [0, 1].map(|index| Type::Parameter(core.type_parameters(map)[index]));
    core.getter(map, "length", int_t.clone());
    core.getter(map, "isEmpty", bool_t.clone());
    core.method(map, "[]", v.clone(), &[object_type.clone()]);
    core.method(map, "[]=", Type::Void, &[k, v]);
    core.method(map, "containsKey", bool_t.clone(), &[object_type.clone()]);
    core.constructor(map, "");

    for id in [object, bool_, num, int, double, string, stack_trace, type_] {
        core.constructor(id, "");
    }

    core.function("print", Type::Void, &[object_type.clone()]);
    core.function("identical", bool_t, &[object_type.clone(), object_type]);

    core.finish()
}

/// Creates bootstrap elements inside one library, keeping executable types in step with their
/// parameters.
struct CoreBuilder {
    library: LibraryElement,
    unit: ElementId,
}

impl CoreBuilder {
    fn new() -> Self {
        let source = Source::library("core");
        let mut library = LibraryElement::new(source.clone(), CORE_LIBRARY_URI);
        let mut unit = Element::new(ElementKind::CompilationUnit, source.short_name());
        unit.enclosing = Some(library.library_element());
        unit.source = Some(source);
        let unit = library.add(unit);
        Self { library, unit }
    }

    fn finish(self) -> LibraryElement {
        self.library
    }

    fn element(&self, id: ElementId) -> &Element {
        self.library.element(id).unwrap_or_else(|| super::error_element())
    }

    fn type_parameters(&self, owner: ElementId) -> Vec<ElementId> {
        self.element(owner).type_parameters.clone()
    }

    fn class_type(&self, owner: ElementId) -> Type {
        self.element(owner).ty.clone()
    }

    fn child(&mut self, parent: ElementId, kind: ElementKind, name: &str, ty: Type) -> ElementId {
        let mut element = Element::new(kind, name);
        element.enclosing = Some(parent);
        element.source = self.element(parent).source.clone();
        element.ty = ty;
        self.library.add(element)
    }

    fn declare_class(&mut self, name: &str, type_parameters: &[&str], supertype: Option<Type>) -> ElementId {
        let id = self.child(self.unit, ElementKind::Class, name, Type::Dynamic);
        let parameters: Vec<ElementId> = type_parameters
            .iter()
            .map(|parameter| self.child(id, ElementKind::TypeParameter, parameter, Type::Dynamic))
            .collect();
        for parameter in &parameters {
            if let Some(element) = self.library.element_mut(*parameter) {
                element.ty = Type::Parameter(*parameter);
            }
        }
        if let Some(element) = self.library.element_mut(id) {
            element.ty = Type::interface(id, parameters.iter().map(|p| Type::Parameter(*p)).collect());
            element.type_parameters = parameters;
            element.supertype = supertype;
        }
        self.library.define(name.to_string(), id);
        id
    }

    fn executable(
        &mut self,
        parent: ElementId,
        kind: ElementKind,
        name: &str,
        return_type: Type,
        parameters: &[Type],
    ) -> ElementId {
        let function = FunctionType {
            return_type,
            required: parameters.to_vec(),
            ..FunctionType::default()
        };
        let id = self.child(parent, kind, name, Type::function(function));
        for (index, ty) in parameters.iter().enumerate() {
            let parameter = self.child(id, ElementKind::Parameter, &format!("p{index}"), ty.clone());
            if let Some(element) = self.library.element_mut(parameter) {
                element.parameter_kind = Some(ParameterKind::Required);
            }
        }
        id
    }

    fn method(&mut self, owner: ElementId, name: &str, return_type: Type, parameters: &[Type]) -> ElementId {
        self.executable(owner, ElementKind::Method, name, return_type, parameters)
    }

    fn getter(&mut self, owner: ElementId, name: &str, return_type: Type) -> ElementId {
        self.executable(owner, ElementKind::Getter, name, return_type, &[])
    }

    fn constructor(&mut self, owner: ElementId, name: &str) -> ElementId {
        let return_type = self.class_type(owner);
        let id = self.executable(owner, ElementKind::Constructor, name, return_type, &[]);
        if let Some(element) = self.library.element_mut(id) {
            element.modifiers.is_synthetic = true;
        }
        id
    }

    fn function(&mut self, name: &str, return_type: Type, parameters: &[Type]) -> ElementId {
        let id = self.executable(self.unit, ElementKind::Function, name, return_type, parameters);
        self.library.define(name.to_string(), id);
        id
    }

    /// Append an optional positional parameter to `executable`.
    fn optional_parameter(&mut self, executable: ElementId, name: &str, ty: Type) {
        let parameter = self.child(executable, ElementKind::Parameter, name, ty.clone());
        if let Some(element) = self.library.element_mut(parameter) {
            element.parameter_kind = Some(ParameterKind::Positional);
        }
        if let Some(element) = self.library.element_mut(executable) {
            if let Type::Function(function) = &mut element.ty {
                function.positional.push(ty);
            }
            element.modifiers.is_synthetic = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementGraph, ElementLocation};
    use std::sync::Arc;

    #[test]
    fn test_core_classes_are_rooted_at_object() {
        let core = create_core_library();
        let object = core.class_named("Object").unwrap();
        assert!(core.element(object).unwrap().supertype.is_none());
        for name in ["bool", "num", "String", "StackTrace", "Type", "List", "Map"] {
            let id = core.class_named(name).unwrap();
            assert_eq!(core.element(id).unwrap().supertype.as_ref().and_then(Type::element), Some(object));
        }
        let num = core.class_named("num").unwrap();
        for name in ["int", "double"] {
            let id = core.class_named(name).unwrap();
            assert_eq!(core.element(id).unwrap().supertype.as_ref().and_then(Type::element), Some(num));
        }
    }

    #[test]
    fn test_members_are_inherited() {
        let core = Arc::new(create_core_library());
        let int = core.class_named("int").unwrap();
        let mut graph = ElementGraph::new();
        graph.insert(core.clone());

        let plus = graph.lookup_member(int, "+").unwrap();
        assert_eq!(graph.element(plus).name, "+");
        assert_eq!(graph.element(graph.element(plus).enclosing.unwrap()).name, "num");
        let to_string = graph.lookup_member(int, "toString").unwrap();
        assert_eq!(graph.element(graph.element(to_string).enclosing.unwrap()).name, "Object");
        assert_eq!(graph.all_supertypes(int).len(), 2);
    }

    #[test]
    fn test_locations_round_trip() {
        let core = create_core_library();
        let object = core.class_named("Object").unwrap();
        let location = core.location(object).unwrap();
        assert_eq!(location.encoding(), "dart:core;dart:core;Object");
        assert_eq!(core.find(&ElementLocation::parse("dart:core;dart:core;Object")), Some(object));

        let list = core.class_named("List").unwrap();
        let add = core
            .element(list)
            .unwrap()
            .children
            .iter()
            .copied()
            .find(|c| core.element(*c).unwrap().name == "add")
            .unwrap();
        assert_eq!(core.find(&core.location(add).unwrap()), Some(add));
    }
}
