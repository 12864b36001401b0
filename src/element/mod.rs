//! Element model: the semantic symbols a library declares.
//!
//! Every declaration (class, member, function, variable, parameter, label, import prefix) becomes
//! an [`Element`]. Elements live in the arena of the [`LibraryElement`] that declares them and are
//! addressed by [`ElementId`] (library id + index). Elements reference each other only through
//! ids, so the graph of supertypes and enclosing declarations has no ownership cycles.
//!
//! ## Notes
//! - Element ids are only meaningful while the library that produced them is alive. The stable,
//!   parse-independent identity of an element is its [`ElementLocation`].
//! - Two sentinel elements, `dynamic` and the error element, belong to no library and are always
//!   resolvable through [`ElementGraph::element`].
//!
//! ## Module Structure
//!
//! - `graph` - cross-library lookups and class hierarchy queries
//! - `location` - stable element locations
//! - `builder` - builds a library's elements from its compilation units
//! - `bootstrap` - the minimal core library used to seed resolution

mod bootstrap;
mod builder;
mod graph;
mod location;

pub use bootstrap::{CORE_LIBRARY_URI, create_core_library};
pub(crate) use builder::ElementBuilder;
pub use graph::ElementGraph;
pub use location::ElementLocation;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use kestrel_syntax::ast::ParameterKind;
use kestrel_syntax::diagnostics::AnalysisError;
use kestrel_syntax::source::Source;

use crate::types::Type;

// ============================================================================
// Identity
// ============================================================================

/// Identifies one library arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(pub u32);

static NEXT_LIBRARY_ID: AtomicU32 = AtomicU32::new(1);

impl LibraryId {
    /// Owner of the `dynamic` and error sentinels.
    pub const SENTINEL: LibraryId = LibraryId(0);

    fn fresh() -> Self {
        LibraryId(NEXT_LIBRARY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Index of an element inside its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    pub library: LibraryId,
    pub index: u32,
}

impl ElementId {
    /// The `dynamic` type element.
    pub const DYNAMIC: ElementId = ElementId {
        library: LibraryId::SENTINEL,
        index: 0,
    };
    /// Stands in for anything that failed to resolve.
    pub const ERROR: ElementId = ElementId {
        library: LibraryId::SENTINEL,
        index: 1,
    };

    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library.0, self.index)
    }
}

// ============================================================================
// Elements
// ============================================================================

/// What an element declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Library,
    CompilationUnit,
    Class,
    Constructor,
    Method,
    Getter,
    Setter,
    Field,
    TopLevelVariable,
    Function,
    LocalVariable,
    Parameter,
    TypeAlias,
    TypeParameter,
    Label,
    ImportPrefix,
    Dynamic,
    Error,
}

impl ElementKind {
    /// Constructors, methods, accessors and functions.
    pub fn is_executable(self) -> bool {
        matches!(
            self,
            ElementKind::Constructor
                | ElementKind::Method
                | ElementKind::Getter
                | ElementKind::Setter
                | ElementKind::Function
        )
    }

    /// Anything a name can be read from like a variable.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            ElementKind::Field | ElementKind::TopLevelVariable | ElementKind::LocalVariable | ElementKind::Parameter
        )
    }

    /// Kinds usable as a type annotation.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            ElementKind::Class | ElementKind::TypeAlias | ElementKind::TypeParameter | ElementKind::Dynamic
        )
    }
}

/// Declaration modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_const: bool,
    pub is_external: bool,
    pub is_factory: bool,
    /// Created by the analyzer rather than written (default constructors).
    pub is_synthetic: bool,
    /// `this.x` constructor parameter.
    pub is_initializing_formal: bool,
}

/// One semantic symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    /// Declared name. Empty for unnamed constructors and anonymous functions; operator methods
    /// use the operator (`+`, `[]=`, `unary-`).
    pub name: String,
    pub enclosing: Option<ElementId>,
    pub source: Option<Source>,
    /// Offset of the declaring name; `None` for synthetic and bootstrap elements.
    pub name_offset: Option<usize>,
    pub modifiers: Modifiers,
    /// Declared type: the variable type, the function type of an executable, the interface type
    /// of a class (with its own type parameters as arguments), the bound-less parameter type of a
    /// type parameter.
    pub ty: Type,
    pub children: Vec<ElementId>,
    pub type_parameters: Vec<ElementId>,
    /// Superclass of a class; `None` only for the root class.
    pub supertype: Option<Type>,
    pub interfaces: Vec<Type>,
    pub mixins: Vec<Type>,
    /// Bound of a type parameter.
    pub bound: Option<Type>,
    pub parameter_kind: Option<ParameterKind>,
}

impl Element {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            enclosing: None,
            source: None,
            name_offset: None,
            modifiers: Modifiers::default(),
            ty: Type::Dynamic,
            children: Vec::new(),
            type_parameters: Vec::new(),
            supertype: None,
            interfaces: Vec::new(),
            mixins: Vec::new(),
            bound: None,
            parameter_kind: None,
        }
    }

    /// Name used to look the element up as a setter (`x=`) or otherwise its plain name.
    pub fn lookup_name(&self) -> String {
        match self.kind {
            ElementKind::Setter => format!("{}=", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

static SENTINELS: LazyLock<[Element; 2]> = LazyLock::new(|| {
    let mut error = Element::new(ElementKind::Error, "<error>");
    error.ty = Type::Error;
    [Element::new(ElementKind::Dynamic, "dynamic"), error]
});

pub(crate) fn sentinel(id: ElementId) -> Option<&'static Element> {
    if id.library != LibraryId::SENTINEL {
        return None;
    }
    SENTINELS.get(id.index as usize)
}

pub(crate) fn error_element() -> &'static Element {
    &SENTINELS[1]
}

// ============================================================================
// Libraries
// ============================================================================

/// `show` or `hide` filter of an import or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    Show(Vec<String>),
    Hide(Vec<String>),
}

impl Combinator {
    /// Apply a sequence of combinators to a name.
    pub fn admits(combinators: &[Combinator], name: &str) -> bool {
        let base = name.strip_suffix('=').unwrap_or(name);
        combinators.iter().all(|combinator| match combinator {
            Combinator::Show(names) => names.iter().any(|n| n == base),
            Combinator::Hide(names) => !names.iter().any(|n| n == base),
        })
    }
}

/// An `import` directive of a library's defining unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub uri: String,
    /// The imported library's defining unit; `None` when the URI cannot be resolved.
    pub source: Option<Source>,
    pub prefix: Option<ElementId>,
    pub combinators: Vec<Combinator>,
    pub implicit: bool,
}

/// An `export` directive of a library's defining unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    pub uri: String,
    pub source: Option<Source>,
    pub combinators: Vec<Combinator>,
}

/// Arena of every element one library declares, across its defining unit and parts.
#[derive(Debug, Clone)]
pub struct LibraryElement {
    id: LibraryId,
    source: Source,
    elements: Vec<Element>,
    units: Vec<ElementId>,
    imports: Vec<ImportSpec>,
    exports: Vec<ExportSpec>,
    /// Top-level names of every unit; setters under `name=`.
    definitions: HashMap<String, ElementId>,
    declared_at: HashMap<(Source, usize), ElementId>,
    build_errors: Vec<AnalysisError>,
}

impl LibraryElement {
    /// Empty library whose defining unit is `source`; the library element itself is index 0.
    pub fn new(source: Source, name: impl Into<String>) -> Self {
        let id = LibraryId::fresh();
        let mut library = Element::new(ElementKind::Library, name);
        library.source = Some(source.clone());
        Self {
            id,
            source,
            elements: vec![library],
            units: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            definitions: HashMap::new(),
            declared_at: HashMap::new(),
            build_errors: Vec::new(),
        }
    }

    pub fn id(&self) -> LibraryId {
        self.id
    }

    /// Defining compilation unit.
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.elements[0].name
    }

    /// Id of the library element itself.
    pub fn library_element(&self) -> ElementId {
        self.id_at(0)
    }

    fn id_at(&self, index: usize) -> ElementId {
        ElementId {
            library: self.id,
            index: index as u32,
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        if id.library != self.id {
            return None;
        }
        self.elements.get(id.index as usize)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if id.library != self.id {
            return None;
        }
        self.elements.get_mut(id.index as usize)
    }

    /// Every element with its id, in creation order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (self.id_at(index), element))
    }

    /// Add `element`, linking it into its enclosing element's children.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = self.id_at(self.elements.len());
        if let Some(parent) = element.enclosing {
            if let Some(parent) = self.element_mut(parent) {
                parent.children.push(id);
            }
        }
        if element.kind == ElementKind::CompilationUnit {
            self.units.push(id);
        }
        if let (Some(source), Some(offset)) = (&element.source, element.name_offset) {
            self.declared_at.insert((source.clone(), offset), id);
        }
        self.elements.push(element);
        id
    }

    /// Compilation unit elements, defining unit first.
    pub fn units(&self) -> &[ElementId] {
        &self.units
    }

    /// Unit element for `source`, when `source` belongs to this library.
    pub fn unit_for(&self, source: &Source) -> Option<ElementId> {
        self.units
            .iter()
            .copied()
            .find(|id| self.element(*id).and_then(|e| e.source.as_ref()) == Some(source))
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    pub fn exports(&self) -> &[ExportSpec] {
        &self.exports
    }

    pub(crate) fn add_import(&mut self, import: ImportSpec) {
        self.imports.push(import);
    }

    pub(crate) fn add_export(&mut self, export: ExportSpec) {
        self.exports.push(export);
    }

    /// Top-level names of every unit of the library; setters are keyed `name=`.
    pub fn definitions(&self) -> &HashMap<String, ElementId> {
        &self.definitions
    }

    pub(crate) fn define(&mut self, name: String, id: ElementId) {
        self.definitions.insert(name, id);
    }

    /// Element whose name was declared at `offset` in `source`.
    pub fn declared_at(&self, source: &Source, offset: usize) -> Option<ElementId> {
        self.declared_at.get(&(source.clone(), offset)).copied()
    }

    /// Top-level class named `name`.
    pub fn class_named(&self, name: &str) -> Option<ElementId> {
        self.definitions
            .get(name)
            .copied()
            .filter(|id| self.element(*id).is_some_and(|e| e.kind == ElementKind::Class))
    }

    /// Errors found while building the elements (duplicate definitions).
    pub fn build_errors(&self) -> &[AnalysisError] {
        &self.build_errors
    }

    pub(crate) fn set_build_errors(&mut self, errors: Vec<AnalysisError>) {
        self.build_errors = errors;
    }
}
