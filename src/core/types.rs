//! Owned model of Go type expressions.
//!
//! The front-end lowers tree-sitter nodes into these values so that nothing
//! downstream has to hold on to a parse tree or its source text. Equality is
//! structural; parameter names take part in it, use
//! [`Signature::same_shape`] to compare call shapes.

use std::collections::BTreeMap;

/// Direction of a channel type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A Go type expression as written in a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// Unqualified name, optionally instantiated: `Item`, `error`, `List[T]`.
    Named { name: String, args: Vec<TypeExpr> },
    /// Name from another package: `context.Context`, `atomic.Pointer[T]`.
    Qualified {
        package: String,
        name: String,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { len: ConstExpr, elem: Box<TypeExpr> },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(Signature),
    Interface(InterfaceType),
    Struct(Vec<StructField>),
    /// `~T`, only valid as a constraint term.
    Tilde(Box<TypeExpr>),
    /// `A | B`, only valid as a constraint term.
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn array(len: i128, elem: TypeExpr) -> Self {
        Self::Array {
            len: ConstExpr::Int(len),
            elem: Box::new(elem),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Qualified {
            package: package.into(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        Self::Pointer(Box::new(elem))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        Self::Slice(Box::new(elem))
    }

    /// Replaces uninstantiated names bound in `args` with their arguments.
    pub fn substitute(&self, args: &BTreeMap<String, TypeExpr>) -> TypeExpr {
        let sub = |ty: &TypeExpr| Box::new(ty.substitute(args));
        match self {
            TypeExpr::Named { name, args: own } if own.is_empty() => match args.get(name) {
                Some(arg) => arg.clone(),
                None => self.clone(),
            },
            TypeExpr::Named { name, args: own } => TypeExpr::Named {
                name: name.clone(),
                args: own.iter().map(|ty| ty.substitute(args)).collect(),
            },
            TypeExpr::Qualified {
                package,
                name,
                args: own,
            } => TypeExpr::Qualified {
                package: package.clone(),
                name: name.clone(),
                args: own.iter().map(|ty| ty.substitute(args)).collect(),
            },
            TypeExpr::Pointer(elem) => TypeExpr::Pointer(sub(elem)),
            TypeExpr::Slice(elem) => TypeExpr::Slice(sub(elem)),
            TypeExpr::Array { len, elem } => TypeExpr::Array {
                len: len.clone(),
                elem: sub(elem),
            },
            TypeExpr::Map { key, value } => TypeExpr::Map {
                key: sub(key),
                value: sub(value),
            },
            TypeExpr::Chan { dir, elem } => TypeExpr::Chan {
                dir: *dir,
                elem: sub(elem),
            },
            TypeExpr::Func(sig) => TypeExpr::Func(sig.substitute(args)),
            TypeExpr::Interface(iface) => TypeExpr::Interface(iface.substitute(args)),
            TypeExpr::Struct(fields) => TypeExpr::Struct(
                fields
                    .iter()
                    .map(|field| StructField {
                        names: field.names.clone(),
                        ty: field.ty.substitute(args),
                        tag: field.tag.clone(),
                    })
                    .collect(),
            ),
            TypeExpr::Tilde(elem) => TypeExpr::Tilde(sub(elem)),
            TypeExpr::Union(terms) => {
                TypeExpr::Union(terms.iter().map(|ty| ty.substitute(args)).collect())
            }
        }
    }
}

/// A constant expression: an array length or the value of a `const`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstExpr {
    Int(i128),
    /// A package-level name.
    Name(String),
    /// `pkg.Name`
    Qualified { package: String, name: String },
    Iota,
    Unary { op: String, operand: Box<ConstExpr> },
    Binary {
        op: String,
        lhs: Box<ConstExpr>,
        rhs: Box<ConstExpr>,
    },
    Paren(Box<ConstExpr>),
    /// Anything else, source text with whitespace collapsed.
    Verbatim(String),
}

impl ConstExpr {
    /// Parses a Go integer literal: decimal, `0x`, `0o`, `0b` or legacy
    /// octal, with optional `_` separators.
    pub fn parse_int(literal: &str) -> Option<i128> {
        let digits: String = literal.chars().filter(|&c| c != '_').collect();
        let lower = digits.to_ascii_lowercase();
        let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
            (16, hex)
        } else if let Some(bin) = lower.strip_prefix("0b") {
            (2, bin)
        } else if let Some(oct) = lower.strip_prefix("0o") {
            (8, oct)
        } else if lower.len() > 1 && lower.starts_with('0') {
            (8, &lower[1..])
        } else {
            (10, lower.as_str())
        };
        if body.is_empty() {
            return None;
        }
        i128::from_str_radix(body, radix).ok()
    }
}

/// One struct field declaration. Embedded fields have no names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
}

/// A single parameter or result. Grouped declarations such as `a, b int`
/// are expanded into one `Param` per name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl Param {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }

    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// Parameters and results of a callable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// The last parameter was declared `...T`; its `ty` holds `T`.
    pub variadic: bool,
}

impl Signature {
    /// Identical call shape, ignoring parameter and result names.
    pub fn same_shape(&self, other: &Signature) -> bool {
        fn types(params: &[Param]) -> impl Iterator<Item = &TypeExpr> {
            params.iter().map(|p| &p.ty)
        }

        self.variadic == other.variadic
            && self.params.len() == other.params.len()
            && self.results.len() == other.results.len()
            && types(&self.params).eq(types(&other.params))
            && types(&self.results).eq(types(&other.results))
    }

    pub fn substitute(&self, args: &BTreeMap<String, TypeExpr>) -> Signature {
        let params = |list: &[Param]| {
            list.iter()
                .map(|p| Param {
                    name: p.name.clone(),
                    ty: p.ty.substitute(args),
                })
                .collect()
        };
        Signature {
            params: params(&self.params),
            results: params(&self.results),
            variadic: self.variadic,
        }
    }
}

/// A method declared in an interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub signature: Signature,
}

/// One element of an interface body, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterfaceElem {
    Method(MethodSignature),
    /// An embedded type name: `io.Reader`, `Store`.
    Embedded(TypeExpr),
    /// A type set term such as `~int | ~string`.
    Constraint(TypeExpr),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
}

impl InterfaceType {
    pub fn substitute(&self, args: &BTreeMap<String, TypeExpr>) -> InterfaceType {
        let elems = self
            .elems
            .iter()
            .map(|elem| match elem {
                InterfaceElem::Method(method) => InterfaceElem::Method(MethodSignature {
                    name: method.name.clone(),
                    signature: method.signature.substitute(args),
                }),
                InterfaceElem::Embedded(ty) => InterfaceElem::Embedded(ty.substitute(args)),
                InterfaceElem::Constraint(ty) => InterfaceElem::Constraint(ty.substitute(args)),
            })
            .collect();
        InterfaceType { elems }
    }
}
