//! Syntax tree.
//!
//! A parsed compilation unit is an [`Ast`]: an arena of [`Node`]s addressed by [`NodeId`], together
//! with the token and comment tables the nodes refer to. Every node records its parent, its first
//! and last token, and a [`NodeKind`] payload naming its children.
//!
//! ## Notes
//! - A node has exactly one parent. Allocating a node that adopts an already-owned child severs the
//!   child from its previous owner, leaving a synthetic identifier behind in a mandatory slot.
//! - Offsets are derived from tokens: a node spans from the start of its first token to the end of
//!   its last one. Missing pieces are represented by synthetic zero-length tokens, so offsets never
//!   fall outside the text.
//! - Node ids are allocated bottom-up, so parsed children have smaller ids than their parents.
//!
//! ## Module Structure
//!
//! - `nodes` - node payload structs and [`NodeKind`]
//! - `visitor` - generic traversal
//! - `locator` - find the smallest node covering a range
//! - `printer` - canonical source reprinting

mod locator;
mod nodes;
mod printer;
mod visitor;

pub use locator::NodeLocator;
pub use nodes::*;
pub use printer::to_source;
pub use visitor::{Visitor, walk_children};

use crate::diagnostics::LineInfo;
use crate::scanner::{CommentToken, Token, TokenId, TokenKind};
use crate::source::Source;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One arena slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub begin: TokenId,
    pub end: TokenId,
}

/// A token, a child node or a list of child nodes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Token(TokenId),
    Node(NodeId),
    /// Separators between list members are not recorded.
    List(Vec<NodeId>),
}

// ============================================================================
// Child slots
// ============================================================================

/// A field of a node payload, classified by how it owns children.
pub(crate) trait ChildSlot {
    fn push_children(&self, _out: &mut Vec<NodeId>) {}
    fn push_parts(&self, _out: &mut Vec<Part>) {}
    /// Remove `child` from this slot; a mandatory slot only yields when given a placeholder.
    fn detach(&mut self, _child: NodeId, _placeholder: Option<NodeId>) -> bool {
        false
    }
}

impl ChildSlot for NodeId {
    fn push_children(&self, out: &mut Vec<NodeId>) {
        out.push(*self);
    }

    fn push_parts(&self, out: &mut Vec<Part>) {
        out.push(Part::Node(*self));
    }

    fn detach(&mut self, child: NodeId, placeholder: Option<NodeId>) -> bool {
        match placeholder {
            Some(replacement) if *self == child => {
                *self = replacement;
                true
            }
            _ => false,
        }
    }
}

impl ChildSlot for Option<NodeId> {
    fn push_children(&self, out: &mut Vec<NodeId>) {
        out.extend(*self);
    }

    fn push_parts(&self, out: &mut Vec<Part>) {
        out.extend(self.map(Part::Node));
    }

    fn detach(&mut self, child: NodeId, _placeholder: Option<NodeId>) -> bool {
        if *self == Some(child) {
            *self = None;
            return true;
        }
        false
    }
}

impl ChildSlot for Vec<NodeId> {
    fn push_children(&self, out: &mut Vec<NodeId>) {
        out.extend(self.iter().copied());
    }

    fn push_parts(&self, out: &mut Vec<Part>) {
        out.push(Part::List(self.clone()));
    }

    fn detach(&mut self, child: NodeId, _placeholder: Option<NodeId>) -> bool {
        match self.iter().position(|id| *id == child) {
            Some(idx) => {
                self.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl ChildSlot for TokenId {
    fn push_parts(&self, out: &mut Vec<Part>) {
        out.push(Part::Token(*self));
    }
}

impl ChildSlot for Option<TokenId> {
    fn push_parts(&self, out: &mut Vec<Part>) {
        out.extend(self.map(Part::Token));
    }
}

macro_rules! leaf_slots {
    ($($ty:ty),* $(,)?) => {
        $(impl ChildSlot for $ty {})*
    };
}

leaf_slots!(bool, f64, String, Option<i64>, ParameterKind, crate::scanner::CommentKind, Vec<CommentId>);

// ============================================================================
// Arena
// ============================================================================

/// A parsed compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    tokens: Vec<Token>,
    comments: Vec<CommentToken>,
    line_info: LineInfo,
    source: Option<Source>,
    root: NodeId,
}

impl Ast {
    pub(crate) fn new(
        source: Option<Source>,
        tokens: Vec<Token>,
        comments: Vec<CommentToken>,
        line_info: LineInfo,
    ) -> Self {
        Self {
            nodes: Vec::new(),
            tokens,
            comments,
            line_info,
            source,
            root: NodeId(0),
        }
    }

    /// Add a node spanning `begin..=end`, taking ownership of the children named by `kind`.
    pub(crate) fn alloc(&mut self, kind: impl Into<NodeKind>, begin: TokenId, end: TokenId) -> NodeId {
        let kind = kind.into();
        let id = NodeId(self.nodes.len() as u32);
        let mut children = Vec::new();
        kind.push_children(&mut children);
        self.nodes.push(Node {
            kind,
            parent: None,
            begin,
            end,
        });
        for child in children {
            self.adopt(id, child);
        }
        id
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }

    /// Move `child` under `new_parent`.
    ///
    /// `place` edits the new parent's payload to hold `child` (push it onto a list, fill an
    /// optional slot). The previous owner loses the child; a mandatory slot there is filled with a
    /// synthetic identifier.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId, place: impl FnOnce(&mut NodeKind, NodeId)) {
        if self.nodes[child.index()].parent == Some(new_parent) {
            return;
        }
        place(&mut self.nodes[new_parent.index()].kind, child);
        self.adopt(new_parent, child);
    }

    /// Make `parent` the sole owner of `child`.
    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        if let Some(previous) = self.nodes[child.index()].parent {
            if previous != parent {
                self.sever(previous, child);
            }
        }
        self.nodes[child.index()].parent = Some(parent);
    }

    fn sever(&mut self, owner: NodeId, child: NodeId) {
        if self.nodes[owner.index()].kind.detach(child, None) {
            return;
        }
        // Mandatory slot: leave an identifier standing in for the moved child.
        let token = self.nodes[child.index()].begin;
        let placeholder = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: NodeKind::SimpleIdentifier(SimpleIdentifier { token }),
            parent: Some(owner),
            begin: token,
            end: token,
        });
        self.nodes[owner.index()].kind.detach(child, Some(placeholder));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// All node ids in allocation order (children before parents).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Direct children in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.kind(id).push_children(&mut out);
        out
    }

    /// Tokens and children of `id` interleaved in source order.
    pub fn parts(&self, id: NodeId) -> Vec<Part> {
        let mut out = Vec::new();
        self.kind(id).push_parts(&mut out);
        out
    }

    /// `id` followed by its parent, grandparent and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.parent(*n))
    }

    /// Return `true` if `ancestor` is `id` or encloses it.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|n| n == ancestor)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn comments(&self) -> &[CommentToken] {
        &self.comments
    }

    pub fn comment(&self, id: CommentId) -> &CommentToken {
        &self.comments[id.0 as usize]
    }

    pub fn line_info(&self) -> &LineInfo {
        &self.line_info
    }

    pub fn begin_token(&self, id: NodeId) -> TokenId {
        self.nodes[id.index()].begin
    }

    pub fn end_token(&self, id: NodeId) -> TokenId {
        self.nodes[id.index()].end
    }

    /// Offset of the first character of `id`.
    pub fn offset(&self, id: NodeId) -> usize {
        if let NodeKind::Comment(comment) = self.kind(id) {
            if let Some(first) = comment.comments.first() {
                return self.comment(*first).offset;
            }
        }
        self.token(self.begin_token(id)).offset
    }

    /// Offset one past the last character of `id`.
    pub fn end(&self, id: NodeId) -> usize {
        if let NodeKind::Comment(comment) = self.kind(id) {
            if let Some(last) = comment.comments.last() {
                return self.comment(*last).end();
            }
        }
        let end = self.token(self.end_token(id)).end();
        end.max(self.offset(id))
    }

    pub fn length(&self, id: NodeId) -> usize {
        self.end(id) - self.offset(id)
    }

    /// Return `true` if every token of `id` is synthetic.
    pub fn is_synthetic(&self, id: NodeId) -> bool {
        self.length(id) == 0
    }

    // ========================================================================
    // Convenience accessors
    // ========================================================================

    /// Directives of the root compilation unit.
    pub fn directives(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::CompilationUnit(unit) => &unit.directives,
            _ => &[],
        }
    }

    /// Top-level declarations of the root compilation unit.
    pub fn declarations(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::CompilationUnit(unit) => &unit.declarations,
            _ => &[],
        }
    }

    /// Lexeme of a simple identifier; `None` for any other node.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::SimpleIdentifier(ident) => Some(self.token(ident.token).lexeme.as_str()),
            _ => None,
        }
    }

    /// Name written by a simple, prefixed or library identifier (`a`, `p.A`, `x.y.z`).
    pub fn name_of(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::SimpleIdentifier(ident) => self.token(ident.token).lexeme.clone(),
            NodeKind::PrefixedIdentifier(p) => format!("{}.{}", self.name_of(p.prefix), self.name_of(p.identifier)),
            NodeKind::LibraryIdentifier(lib) => lib
                .components
                .iter()
                .map(|c| self.name_of(*c))
                .collect::<Vec<_>>()
                .join("."),
            NodeKind::TypeName(t) => self.name_of(t.name),
            _ => String::new(),
        }
    }

    /// Value of a string literal without interpolation, or of adjacent such literals.
    pub fn string_value(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::SimpleStringLiteral(s) => Some(s.value.clone()),
            NodeKind::AdjacentStrings(a) => {
                let mut out = String::new();
                for s in &a.strings {
                    out.push_str(&self.string_value(*s)?);
                }
                Some(out)
            }
            _ => None,
        }
    }

    /// Source text covered by `id`, when the original text is at hand.
    pub fn text<'t>(&self, id: NodeId, source_text: &'t str) -> &'t str {
        let end = self.end(id).min(source_text.len());
        let offset = self.offset(id).min(end);
        &source_text[offset..end]
    }

    /// Return `true` if the token has the given kind.
    pub fn token_is(&self, id: TokenId, kind: TokenKind) -> bool {
        self.token(id).kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LineInfo;

    fn two_token_ast() -> Ast {
        let tokens = vec![
            Token::new(TokenKind::Identifier, "a", 0),
            Token::new(TokenKind::Identifier, "b", 2),
            Token::new(TokenKind::Eof, "", 3),
        ];
        Ast::new(None, tokens, Vec::new(), LineInfo::from_text("a b"))
    }

    #[test]
    fn test_alloc_sets_parents() {
        let mut ast = two_token_ast();
        let a = ast.alloc(SimpleIdentifier { token: TokenId(0) }, TokenId(0), TokenId(0));
        let b = ast.alloc(SimpleIdentifier { token: TokenId(1) }, TokenId(1), TokenId(1));
        let list = ast.alloc(
            LibraryIdentifier {
                components: vec![a, b],
            },
            TokenId(0),
            TokenId(1),
        );
        assert_eq!(ast.parent(a), Some(list));
        assert_eq!(ast.children(list), vec![a, b]);
        assert_eq!(ast.offset(list), 0);
        assert_eq!(ast.end(list), 3);
        assert_eq!(ast.name_of(list), "a.b");
    }

    #[test]
    fn test_adopting_from_list_removes_member() {
        let mut ast = two_token_ast();
        let a = ast.alloc(SimpleIdentifier { token: TokenId(0) }, TokenId(0), TokenId(0));
        let b = ast.alloc(SimpleIdentifier { token: TokenId(1) }, TokenId(1), TokenId(1));
        let first = ast.alloc(
            LibraryIdentifier {
                components: vec![a, b],
            },
            TokenId(0),
            TokenId(1),
        );
        let second = ast.alloc(LibraryIdentifier { components: vec![b] }, TokenId(1), TokenId(1));
        assert_eq!(ast.parent(b), Some(second));
        assert_eq!(ast.children(first), vec![a]);
    }

    #[test]
    fn test_adopting_from_mandatory_slot_leaves_placeholder() {
        let mut ast = two_token_ast();
        let a = ast.alloc(SimpleIdentifier { token: TokenId(0) }, TokenId(0), TokenId(0));
        let stmt = ast.alloc(
            ExpressionStatement {
                expression: a,
                semicolon: TokenId(1),
            },
            TokenId(0),
            TokenId(1),
        );
        let list = ast.alloc(LibraryIdentifier { components: vec![a] }, TokenId(0), TokenId(0));
        assert_eq!(ast.parent(a), Some(list));
        let children = ast.children(stmt);
        assert_eq!(children.len(), 1);
        assert_ne!(children[0], a);
        assert_eq!(ast.parent(children[0]), Some(stmt));
    }

    #[test]
    fn test_reparent_moves_list_member() {
        let mut ast = two_token_ast();
        let a = ast.alloc(SimpleIdentifier { token: TokenId(0) }, TokenId(0), TokenId(0));
        let b = ast.alloc(SimpleIdentifier { token: TokenId(1) }, TokenId(1), TokenId(1));
        let first = ast.alloc(
            LibraryIdentifier {
                components: vec![a, b],
            },
            TokenId(0),
            TokenId(1),
        );
        let second = ast.alloc(LibraryIdentifier { components: vec![] }, TokenId(1), TokenId(1));
        ast.reparent(b, second, |kind, child| {
            if let NodeKind::LibraryIdentifier(lib) = kind {
                lib.components.push(child);
            }
        });
        assert_eq!(ast.parent(b), Some(second));
        assert_eq!(ast.children(first), vec![a]);
        assert_eq!(ast.children(second), vec![b]);
    }

    #[test]
    fn test_ancestors() {
        let mut ast = two_token_ast();
        let a = ast.alloc(SimpleIdentifier { token: TokenId(0) }, TokenId(0), TokenId(0));
        let lib = ast.alloc(LibraryIdentifier { components: vec![a] }, TokenId(0), TokenId(0));
        assert_eq!(ast.ancestors(a).collect::<Vec<_>>(), vec![a, lib]);
        assert!(ast.is_ancestor_of(lib, a));
        assert!(!ast.is_ancestor_of(a, lib));
    }
}
