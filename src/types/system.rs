use std::collections::{HashSet, VecDeque};

use crate::element::{ElementGraph, ElementId, ElementKind};

use super::{InterfaceType, Type, TypeProvider};

/// A member found on a receiver type, with the supertype that declares it.
///
/// `owner` carries the type arguments the member's class is applied to, so the member's declared
/// type can be specialised (`List<int>.[]` returns `int`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub element: ElementId,
    pub owner: InterfaceType,
}

/// Subtyping, least upper bounds and member lookup over one element graph.
#[derive(Debug, Clone, Copy)]
pub struct TypeSystem<'a> {
    graph: &'a ElementGraph,
    provider: &'a TypeProvider,
}

impl<'a> TypeSystem<'a> {
    pub fn new(graph: &'a ElementGraph, provider: &'a TypeProvider) -> Self {
        Self { graph, provider }
    }

    pub fn provider(&self) -> &'a TypeProvider {
        self.provider
    }

    // ========================================================================
    // Supertypes
    // ========================================================================

    /// Superclass, mixins and interfaces of `ty`, with `ty`'s arguments substituted.
    pub fn direct_supertypes(&self, ty: &InterfaceType) -> Vec<InterfaceType> {
        let class = self.graph.element(ty.element);
        let parameters = &class.type_parameters;
        class
            .mixins
            .iter()
            .rev()
            .chain(class.supertype.iter())
            .chain(class.interfaces.iter())
            .filter_map(|s| match s.substitute(parameters, &ty.arguments) {
                Type::Interface(interface) => Some(interface),
                _ => None,
            })
            .collect()
    }

    /// Every supertype of `ty`, nearest first. Each class appears once, so cyclic hierarchies
    /// terminate.
    pub fn supertypes(&self, ty: &InterfaceType) -> Vec<InterfaceType> {
        let mut seen = HashSet::from([ty.element]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            for next in self.direct_supertypes(&current) {
                if seen.insert(next.element) {
                    out.push(next.clone());
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// `ty` as seen through its supertype for `class`, if it has one.
    pub fn as_instance_of(&self, ty: &InterfaceType, class: ElementId) -> Option<InterfaceType> {
        if ty.element == class {
            return Some(ty.clone());
        }
        self.supertypes(ty).into_iter().find(|s| s.element == class)
    }

    /// Interface type members of `ty` are looked up on: type parameters go to their bound and
    /// functions to `Object`. `None` for `dynamic`, `void`, bottom and the error type.
    pub fn receiver_interface(&self, ty: &Type) -> Option<InterfaceType> {
        let mut seen = HashSet::new();
        let mut current = ty.clone();
        loop {
            match current {
                Type::Interface(interface) => return Some(interface),
                Type::Function(_) => return self.provider.object_type().as_interface().cloned(),
                Type::Parameter(id) => {
                    if !seen.insert(id) {
                        return self.provider.object_type().as_interface().cloned();
                    }
                    current = self
                        .graph
                        .element(id)
                        .bound
                        .clone()
                        .unwrap_or_else(|| self.provider.object_type());
                }
                Type::Dynamic | Type::Void | Type::Bottom | Type::Error => return None,
            }
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Return `true` if `sub` is a subtype of `sup`. `dynamic` and the error type relate to
    /// everything in both directions, bottom is below everything and `Object` above everything but
    /// `void`.
    pub fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        if sub.is_unknown() || sup.is_unknown() || sub.is_bottom() || sub == sup {
            return true;
        }
        if sub.is_void() || sup.is_void() {
            return false;
        }
        if self.provider.is_object(sup) {
            return true;
        }
        match (sub, sup) {
            (Type::Parameter(_), _) => match self.receiver_interface(sub) {
                Some(bound) => self.is_subtype(&Type::Interface(bound), sup),
                None => true,
            },
            (Type::Interface(sub), Type::Interface(sup)) => match self.as_instance_of(sub, sup.element) {
                Some(instance) => instance
                    .arguments
                    .iter()
                    .zip(sup.arguments.iter())
                    .all(|(a, b)| self.is_subtype(a, b)),
                None => false,
            },
            (Type::Function(sub), Type::Function(sup)) => {
                if sub.required.len() > sup.required.len()
                    || sub.required.len() + sub.positional.len() < sup.required.len() + sup.positional.len()
                {
                    return false;
                }
                let sub_parameters = sub.required.iter().chain(sub.positional.iter());
                let sup_parameters = sup.required.iter().chain(sup.positional.iter());
                let parameters = sub_parameters
                    .zip(sup_parameters)
                    .all(|(a, b)| self.is_assignable(b, a));
                let named = sup.named.iter().all(|(name, b)| {
                    sub.named
                        .iter()
                        .find(|(n, _)| n == name)
                        .is_some_and(|(_, a)| self.is_assignable(b, a))
                });
                parameters && named && (sup.return_type.is_void() || self.is_assignable(&sub.return_type, &sup.return_type))
            }
            _ => false,
        }
    }

    /// Return `true` if a value of type `from` may be assigned where `to` is expected: one of them
    /// is a subtype of the other.
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        self.is_subtype(from, to) || self.is_subtype(to, from)
    }

    /// Least upper bound of `a` and `b`: the nearer of the two when one is a subtype of the
    /// other, otherwise the first class in `a`'s supertype order that `b` also implements.
    pub fn least_upper_bound(&self, a: &Type, b: &Type) -> Type {
        if a.is_unknown() || b.is_unknown() {
            return Type::Dynamic;
        }
        if self.is_subtype(a, b) {
            return b.clone();
        }
        if self.is_subtype(b, a) {
            return a.clone();
        }
        match (self.receiver_interface(a), self.receiver_interface(b)) {
            (Some(a), Some(b)) => {
                let b = Type::Interface(b);
                self.supertypes(&a)
                    .into_iter()
                    .map(Type::Interface)
                    .find(|candidate| self.is_subtype(&b, candidate))
                    .unwrap_or(Type::Dynamic)
            }
            _ => Type::Dynamic,
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Getter, field or method `name` visible on `receiver`.
    pub fn lookup_member(&self, receiver: &Type, name: &str) -> Option<Member> {
        let interface = self.receiver_interface(receiver)?;
        self.candidates(interface).find_map(|owner| {
            self.graph
                .declared_member(owner.element, name)
                .map(|element| Member { element, owner })
        })
    }

    /// Setter `name` (or a field that can be written) visible on `receiver`.
    pub fn lookup_setter(&self, receiver: &Type, name: &str) -> Option<Member> {
        let interface = self.receiver_interface(receiver)?;
        let setter = format!("{name}=");
        self.candidates(interface).find_map(|owner| {
            let element = self.graph.declared_member(owner.element, &setter).or_else(|| {
                self.graph.declared_member(owner.element, name).filter(|id| {
                    let element = self.graph.element(*id);
                    element.kind == ElementKind::Field && !element.modifiers.is_final && !element.modifiers.is_const
                })
            })?;
            Some(Member { element, owner })
        })
    }

    fn candidates(&self, interface: InterfaceType) -> impl Iterator<Item = InterfaceType> + use<'a> {
        let supertypes = self.supertypes(&interface);
        std::iter::once(interface).chain(supertypes)
    }

    /// Declared type of the member, specialised to the receiver's type arguments.
    pub fn member_type(&self, member: &Member) -> Type {
        let class = self.graph.element(member.owner.element);
        self.graph
            .element(member.element)
            .ty
            .substitute(&class.type_parameters, &member.owner.arguments)
    }

    /// Type of reading the member: a getter's return type, a field's type or a method's function
    /// type.
    pub fn read_type(&self, member: &Member) -> Type {
        let ty = self.member_type(member);
        match self.graph.kind(member.element) {
            ElementKind::Getter => ty.as_function().map(|f| f.return_type.clone()).unwrap_or_default(),
            _ => ty,
        }
    }

    /// Type a write through the member must be assignable to.
    pub fn write_type(&self, member: &Member) -> Type {
        let ty = self.member_type(member);
        match self.graph.kind(member.element) {
            ElementKind::Setter => ty
                .as_function()
                .and_then(|f| f.first_parameter().cloned())
                .unwrap_or_default(),
            _ => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::create_core_library;
    use std::sync::Arc;

    fn setup() -> (ElementGraph, TypeProvider) {
        let core = Arc::new(create_core_library());
        let provider = TypeProvider::from_core(&core).unwrap();
        let mut graph = ElementGraph::new();
        graph.insert(core);
        (graph, provider)
    }

    #[test]
    fn test_subtyping() {
        let (graph, provider) = setup();
        let system = TypeSystem::new(&graph, &provider);
        let int = provider.int_type();
        let num = provider.num_type();
        let string = provider.string_type();
        assert!(system.is_subtype(&int, &num));
        assert!(!system.is_subtype(&num, &int));
        assert!(system.is_assignable(&num, &int));
        assert!(!system.is_assignable(&string, &int));
        assert!(system.is_subtype(&string, &provider.object_type()));
        assert!(system.is_subtype(&Type::Bottom, &string));
        assert!(system.is_subtype(&provider.list_type(int.clone()), &provider.list_type(num.clone())));
        assert!(!system.is_subtype(&provider.list_type(num), &provider.list_type(string.clone())));
        assert!(system.is_assignable(&Type::Dynamic, &string));
    }

    #[test]
    fn test_least_upper_bound() {
        let (graph, provider) = setup();
        let system = TypeSystem::new(&graph, &provider);
        let lub = system.least_upper_bound(&provider.int_type(), &provider.double_type());
        assert_eq!(lub, provider.num_type());
        let lub = system.least_upper_bound(&provider.int_type(), &provider.string_type());
        assert_eq!(lub, provider.object_type());
        assert_eq!(system.least_upper_bound(&Type::Bottom, &provider.int_type()), provider.int_type());
    }

    #[test]
    fn test_member_types_are_specialised() {
        let (graph, provider) = setup();
        let system = TypeSystem::new(&graph, &provider);
        let list_of_string = provider.list_type(provider.string_type());

        let index = system.lookup_member(&list_of_string, "[]").unwrap();
        let function = system.member_type(&index);
        assert_eq!(function.as_function().unwrap().return_type, provider.string_type());

        let length = system.lookup_member(&list_of_string, "length").unwrap();
        assert_eq!(system.read_type(&length), provider.int_type());

        let to_string = system.lookup_member(&provider.int_type(), "toString").unwrap();
        assert_eq!(to_string.owner.element, provider.object_element());
        assert!(system.lookup_member(&Type::Dynamic, "foo").is_none());
        assert!(system.lookup_setter(&provider.int_type(), "isEven").is_none());
    }
}
