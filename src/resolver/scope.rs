use std::collections::HashMap;

use crate::element::ElementId;

/// Handle to one frame of a [`Scopes`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeId(u32);

#[derive(Debug, Default)]
struct Frame {
    parent: Option<ScopeId>,
    names: HashMap<String, ElementId>,
    labels: HashMap<String, ElementId>,
    /// Class whose members (declared and inherited) are visible from this frame.
    class: Option<ElementId>,
    /// Frame of a function body: labels do not reach past it.
    function_boundary: bool,
}

/// Lexical scopes of one unit, nested innermost-to-outermost through parent links.
///
/// Frames are never popped; a context holding a [`ScopeId`] sees exactly the names defined on
/// its chain, which is what lets the resolution context be copied freely.
#[derive(Debug)]
pub(crate) struct Scopes {
    frames: Vec<Frame>,
}

impl Scopes {
    pub(crate) fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub(crate) fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    fn frame(&self, id: ScopeId) -> &Frame {
        &self.frames[id.0 as usize]
    }

    fn frame_mut(&mut self, id: ScopeId) -> &mut Frame {
        &mut self.frames[id.0 as usize]
    }

    pub(crate) fn push(&mut self, parent: ScopeId) -> ScopeId {
        self.frames.push(Frame {
            parent: Some(parent),
            ..Frame::default()
        });
        ScopeId(self.frames.len() as u32 - 1)
    }

    /// Frame for a function body nested in `parent`.
    pub(crate) fn push_function(&mut self, parent: ScopeId) -> ScopeId {
        let id = self.push(parent);
        self.frame_mut(id).function_boundary = true;
        id
    }

    /// Frame for the body of `class`.
    pub(crate) fn push_class(&mut self, parent: ScopeId, class: ElementId) -> ScopeId {
        let id = self.push(parent);
        self.frame_mut(id).class = Some(class);
        id
    }

    pub(crate) fn define(&mut self, scope: ScopeId, name: impl Into<String>, element: ElementId) {
        self.frame_mut(scope).names.insert(name.into(), element);
    }

    pub(crate) fn define_label(&mut self, scope: ScopeId, name: impl Into<String>, element: ElementId) {
        self.frame_mut(scope).labels.insert(name.into(), element);
    }

    /// Nearest binding of `name`. A class frame also answers with members found by `member_of`,
    /// so inherited members shadow library-level names.
    pub(crate) fn lookup(
        &self,
        scope: ScopeId,
        name: &str,
        member_of: impl Fn(ElementId, &str) -> Option<ElementId>,
    ) -> Option<ElementId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id);
            if let Some(element) = frame.names.get(name) {
                return Some(*element);
            }
            if let Some(element) = frame.class.and_then(|class| member_of(class, name)) {
                return Some(element);
            }
            current = frame.parent;
        }
        None
    }

    /// Label `name` visible from `scope`, without crossing into an enclosing function.
    pub(crate) fn lookup_label(&self, scope: ScopeId, name: &str) -> Option<ElementId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id);
            if let Some(element) = frame.labels.get(name) {
                return Some(*element);
            }
            if frame.function_boundary {
                return None;
            }
            current = frame.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LibraryId;

    fn id(index: u32) -> ElementId {
        ElementId {
            library: LibraryId(99),
            index,
        }
    }

    #[test]
    fn test_inner_bindings_shadow_outer() {
        let mut scopes = Scopes::new();
        let outer = scopes.push(scopes.root());
        scopes.define(outer, "x", id(1));
        let inner = scopes.push(outer);
        scopes.define(inner, "x", id(2));
        assert_eq!(scopes.lookup(inner, "x", |_, _| None), Some(id(2)));
        assert_eq!(scopes.lookup(outer, "x", |_, _| None), Some(id(1)));
        assert_eq!(scopes.lookup(inner, "y", |_, _| None), None);
    }

    #[test]
    fn test_class_frames_consult_members() {
        let mut scopes = Scopes::new();
        let class = scopes.push_class(scopes.root(), id(10));
        let body = scopes.push_function(class);
        let found = scopes.lookup(body, "m", |owner, name| (owner == id(10) && name == "m").then(|| id(11)));
        assert_eq!(found, Some(id(11)));
    }

    #[test]
    fn test_labels_stop_at_function_boundary() {
        let mut scopes = Scopes::new();
        let function = scopes.push_function(scopes.root());
        let labeled = scopes.push(function);
        scopes.define_label(labeled, "outer", id(3));
        let closure = scopes.push_function(labeled);
        let block = scopes.push(closure);
        assert_eq!(scopes.lookup_label(labeled, "outer"), Some(id(3)));
        assert_eq!(scopes.lookup_label(block, "outer"), None);
    }
}
