//! Loaded package and its top-level scope.

use crate::core::types::{ConstExpr, TypeExpr};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::PathBuf;

/// A source position, 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeDeclKind {
    /// `type A B`
    Defined,
    /// `type A = B`
    Alias,
}

/// A top-level `type` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub type_params: Vec<String>,
    pub ty: TypeExpr,
}

/// A top-level `const` name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstDecl {
    /// Explicit or repeated value; `None` when the spec has fewer values
    /// than names.
    pub value: Option<ConstExpr>,
    /// Index of the spec inside its declaration.
    pub iota: i128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    TypeName(TypeDecl),
    Func,
    Var,
    Const(ConstDecl),
}

impl ObjectKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ObjectKind::TypeName(_) => "type",
            ObjectKind::Func => "func",
            ObjectKind::Var => "var",
            ObjectKind::Const(_) => "const",
        }
    }
}

/// A declared name in package scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub position: Position,
}

impl Object {
    pub fn type_decl(&self) -> Option<&TypeDecl> {
        match &self.kind {
            ObjectKind::TypeName(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn const_decl(&self) -> Option<&ConstDecl> {
        match &self.kind {
            ObjectKind::Const(decl) => Some(decl),
            _ => None,
        }
    }
}

/// Top-level names of one package, enumerated in sorted order.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    objects: BTreeMap<String, Object>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `object`, handing back the existing declaration when the
    /// name is already taken.
    pub fn insert(&mut self, object: Object) -> Result<(), (Object, &Object)> {
        match self.objects.entry(object.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(object);
                Ok(())
            }
            btree_map::Entry::Occupied(slot) => Err((object, slot.into_mut())),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeDecl> {
        self.lookup(name).and_then(Object::type_decl)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Type information for one loaded package.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub scope: Scope,
}
