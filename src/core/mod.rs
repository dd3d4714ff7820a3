pub mod document;
pub mod package;
pub mod types;

pub use document::{OutputDocument, OUTPUT_PACKAGE};
pub use package::{
    ConstDecl, Object, ObjectKind, Package, Position, Scope, TypeDecl, TypeDeclKind,
};
pub use types::{
    ChanDir, ConstExpr, InterfaceElem, InterfaceType, MethodSignature, Param, Signature,
    StructField, TypeExpr,
};
