use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use kestrel_syntax::source::Source;

use super::{Element, ElementId, ElementKind, LibraryElement, LibraryId, error_element, sentinel};
use crate::types::Type;

/// The libraries visible to one resolution, addressable by id or by defining source.
///
/// Libraries are shared behind [`Arc`]s, so cloning a graph is cheap and a cached library can sit
/// in many graphs at once.
#[derive(Debug, Clone, Default)]
pub struct ElementGraph {
    libraries: HashMap<LibraryId, Arc<LibraryElement>>,
    by_source: HashMap<Source, LibraryId>,
}

impl ElementGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `library`, replacing any library with the same id or defining source.
    pub fn insert(&mut self, library: Arc<LibraryElement>) {
        if let Some(previous) = self.by_source.insert(library.source().clone(), library.id()) {
            if previous != library.id() {
                self.libraries.remove(&previous);
            }
        }
        self.libraries.insert(library.id(), library);
    }

    pub fn library(&self, id: LibraryId) -> Option<&Arc<LibraryElement>> {
        self.libraries.get(&id)
    }

    /// Library whose defining unit is `source`.
    pub fn library_for(&self, source: &Source) -> Option<&Arc<LibraryElement>> {
        self.by_source.get(source).and_then(|id| self.libraries.get(id))
    }

    pub fn libraries(&self) -> impl Iterator<Item = &Arc<LibraryElement>> {
        self.libraries.values()
    }

    /// Mutable access for the type resolution phase; clones the library if it is shared.
    pub(crate) fn library_mut(&mut self, id: LibraryId) -> Option<&mut LibraryElement> {
        self.libraries.get_mut(&id).map(Arc::make_mut)
    }

    pub fn try_element(&self, id: ElementId) -> Option<&Element> {
        if let Some(element) = sentinel(id) {
            return Some(element);
        }
        self.libraries.get(&id.library)?.element(id)
    }

    /// Element for `id`; ids of libraries outside the graph yield the error sentinel.
    pub fn element(&self, id: ElementId) -> &Element {
        self.try_element(id).unwrap_or_else(|| error_element())
    }

    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.element(id).kind
    }

    /// Library declaring `id`.
    pub fn library_of(&self, id: ElementId) -> Option<&Arc<LibraryElement>> {
        self.libraries.get(&id.library)
    }

    // ========================================================================
    // Class queries
    // ========================================================================

    /// Superclass type of `class`.
    pub fn supertype(&self, class: ElementId) -> Option<&Type> {
        self.element(class).supertype.as_ref()
    }

    pub fn interfaces(&self, class: ElementId) -> &[Type] {
        &self.element(class).interfaces
    }

    pub fn mixins(&self, class: ElementId) -> &[Type] {
        &self.element(class).mixins
    }

    /// Classes `class` inherits from, nearest first: mixins (last applied first), then the
    /// superclass chain, then interfaces. Each class appears once, so cyclic hierarchies
    /// terminate.
    pub fn all_supertypes(&self, class: ElementId) -> Vec<ElementId> {
        let mut seen = HashSet::from([class]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            let element = self.element(current);
            let direct = element
                .mixins
                .iter()
                .rev()
                .chain(element.supertype.iter())
                .chain(element.interfaces.iter())
                .filter_map(Type::element);
            for next in direct {
                if seen.insert(next) {
                    out.push(next);
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// Members declared directly in `class` named `name`, setters keyed `name=`.
    pub fn declared_member(&self, class: ElementId, name: &str) -> Option<ElementId> {
        self.element(class).children.iter().copied().find(|child| {
            let element = self.element(*child);
            !matches!(element.kind, ElementKind::Constructor | ElementKind::TypeParameter)
                && element.lookup_name() == name
        })
    }

    /// Getter, field or method `name` of `class` or the nearest class it inherits from.
    pub fn lookup_member(&self, class: ElementId, name: &str) -> Option<ElementId> {
        std::iter::once(class)
            .chain(self.all_supertypes(class))
            .find_map(|c| self.declared_member(c, name))
    }

    /// Setter `name` of `class`, or a non-final field of that name.
    pub fn lookup_setter(&self, class: ElementId, name: &str) -> Option<ElementId> {
        let setter = format!("{name}=");
        std::iter::once(class).chain(self.all_supertypes(class)).find_map(|c| {
            self.declared_member(c, &setter).or_else(|| {
                self.declared_member(c, name).filter(|id| {
                    let element = self.element(*id);
                    element.kind == ElementKind::Field && !element.modifiers.is_final && !element.modifiers.is_const
                })
            })
        })
    }

    /// Constructor `name` of `class` (`""` for the unnamed one). Constructors are not inherited.
    pub fn lookup_constructor(&self, class: ElementId, name: &str) -> Option<ElementId> {
        self.element(class).children.iter().copied().find(|child| {
            let element = self.element(*child);
            element.kind == ElementKind::Constructor && element.name == name
        })
    }
}
