use crate::element::{ElementId, LibraryElement};
use crate::error::{AnalysisException, AnalysisResult};

use super::Type;

/// The core classes type inference relies on, taken from one core library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeProvider {
    object: ElementId,
    bool_: ElementId,
    num: ElementId,
    int: ElementId,
    double: ElementId,
    string: ElementId,
    stack_trace: ElementId,
    type_: ElementId,
    list: ElementId,
    map: ElementId,
}

impl TypeProvider {
    /// Look the core classes up in `core`.
    ///
    /// Fails with [`AnalysisException::MalformedBootstrap`] when a class is missing or `List` and
    /// `Map` do not declare one and two type parameters.
    pub fn from_core(core: &LibraryElement) -> AnalysisResult<Self> {
        let class = |name: &str| {
            core.class_named(name).ok_or_else(|| {
                AnalysisException::MalformedBootstrap(format!("{} does not declare class `{name}`", core.source()))
            })
        };
        let generic = |name: &str, arity: usize| {
            let id = class(name)?;
            let declared = core.element(id).map_or(0, |e| e.type_parameters.len());
            if declared != arity {
                return Err(AnalysisException::MalformedBootstrap(format!(
                    "`{name}` declares {declared} type parameters, expected {arity}"
                )));
            }
            Ok(id)
        };
        Ok(Self {
            object: class("Object")?,
            bool_: class("bool")?,
            num: class("num")?,
            int: class("int")?,
            double: class("double")?,
            string: class("String")?,
            stack_trace: class("StackTrace")?,
            type_: class("Type")?,
            list: generic("List", 1)?,
            map: generic("Map", 2)?,
        })
    }

    pub fn object_element(&self) -> ElementId {
        self.object
    }

    pub fn list_element(&self) -> ElementId {
        self.list
    }

    pub fn map_element(&self) -> ElementId {
        self.map
    }

    pub fn object_type(&self) -> Type {
        Type::interface(self.object, vec![])
    }

    pub fn bool_type(&self) -> Type {
        Type::interface(self.bool_, vec![])
    }

    pub fn num_type(&self) -> Type {
        Type::interface(self.num, vec![])
    }

    pub fn int_type(&self) -> Type {
        Type::interface(self.int, vec![])
    }

    pub fn double_type(&self) -> Type {
        Type::interface(self.double, vec![])
    }

    pub fn string_type(&self) -> Type {
        Type::interface(self.string, vec![])
    }

    pub fn stack_trace_type(&self) -> Type {
        Type::interface(self.stack_trace, vec![])
    }

    pub fn type_type(&self) -> Type {
        Type::interface(self.type_, vec![])
    }

    /// `List<element>`.
    pub fn list_type(&self, element: Type) -> Type {
        Type::interface(self.list, vec![element])
    }

    /// `Map<key, value>`.
    pub fn map_type(&self, key: Type, value: Type) -> Type {
        Type::interface(self.map, vec![key, value])
    }

    pub fn is_bool(&self, ty: &Type) -> bool {
        ty.element() == Some(self.bool_)
    }

    pub fn is_int(&self, ty: &Type) -> bool {
        ty.element() == Some(self.int)
    }

    pub fn is_double(&self, ty: &Type) -> bool {
        ty.element() == Some(self.double)
    }

    /// `num`, `int` or `double`.
    pub fn is_numeric(&self, ty: &Type) -> bool {
        matches!(ty.element(), Some(e) if e == self.num || e == self.int || e == self.double)
    }

    pub fn is_object(&self, ty: &Type) -> bool {
        ty.element() == Some(self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::create_core_library;
    use kestrel_syntax::source::Source;

    #[test]
    fn test_from_core() {
        let core = create_core_library();
        let provider = TypeProvider::from_core(&core).unwrap();
        assert_eq!(provider.int_type().element(), core.class_named("int"));
        assert!(provider.is_numeric(&provider.double_type()));
        assert!(!provider.is_numeric(&provider.string_type()));
    }

    #[test]
    fn test_missing_class_is_malformed() {
        let library = LibraryElement::new(Source::library("core"), "dart:core");
        let err = TypeProvider::from_core(&library).unwrap_err();
        assert!(matches!(err, AnalysisException::MalformedBootstrap(_)));
        assert!(err.to_string().contains("Object"));
    }
}
