use super::{Ast, NodeId, NodeKind};

/// Finds the smallest node covering a character range.
///
/// A node covers `start..end` when it begins at or before `start` and ends at or after `end`.
/// Zero-length (synthetic) nodes only match an empty range at their exact position. Comment nodes
/// are never returned.
#[derive(Debug, Clone, Copy)]
pub struct NodeLocator {
    start: usize,
    end: usize,
}

impl NodeLocator {
    /// Locator for the single position `offset`.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Locator for `start..end`; the bounds are reordered if given backwards.
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Search from the root of `ast`.
    pub fn search(&self, ast: &Ast) -> Option<NodeId> {
        self.search_within(ast, ast.root())
    }

    /// Search within the subtree rooted at `node`.
    pub fn search_within(&self, ast: &Ast, node: NodeId) -> Option<NodeId> {
        if !self.covers(ast, node) {
            return None;
        }
        let mut current = node;
        'descend: loop {
            for child in ast.children(current) {
                if matches!(ast.kind(child), NodeKind::Comment(_)) {
                    continue;
                }
                if self.covers(ast, child) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    fn covers(&self, ast: &Ast, node: NodeId) -> bool {
        let offset = ast.offset(node);
        let end = ast.end(node);
        if offset == end && self.start != self.end {
            return false;
        }
        offset <= self.start && self.end <= end
    }
}
