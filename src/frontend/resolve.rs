//! Type resolution over a package scope.
//!
//! Follows aliases and defined types through the scope and computes
//! flattened interface method sets. Names from other packages are never
//! loaded, so they resolve to [`Resolution::Unresolved`].

use crate::core::{
    InterfaceElem, InterfaceType, MethodSignature, Object, Param, Scope, Signature, TypeExpr,
};
use crate::errors::{Error, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// What a type expression resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Interface {
        iface: InterfaceType,
        /// Type parameters in scope for the interface's methods.
        type_params: Vec<String>,
    },
    /// A type known not to be an interface.
    NotInterface,
    /// Declared outside the package or not declared at all.
    Unresolved,
}

/// A method of a flattened method set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
    /// Type parameters of the declaration the method was written in.
    pub type_params: Vec<String>,
}

pub struct Resolver<'p> {
    scope: &'p Scope,
}

impl<'p> Resolver<'p> {
    pub fn new(scope: &'p Scope) -> Self {
        Self { scope }
    }

    /// Resolves the type declared under `object`, if it is a type name.
    pub fn resolve_object(&self, object: &Object) -> Result<Resolution> {
        match object.type_decl() {
            Some(decl) => {
                let mut visiting = vec![object.name.clone()];
                self.resolve(&decl.ty, &decl.type_params, &mut visiting)
            }
            None => Ok(Resolution::NotInterface),
        }
    }

    fn resolve(
        &self,
        ty: &TypeExpr,
        type_params: &[String],
        visiting: &mut Vec<String>,
    ) -> Result<Resolution> {
        match ty {
            TypeExpr::Interface(iface) => Ok(Resolution::Interface {
                iface: iface.clone(),
                type_params: type_params.to_vec(),
            }),
            TypeExpr::Named { name, args } => {
                if type_params.iter().any(|p| p == name) {
                    return Ok(Resolution::NotInterface);
                }
                match self.scope.lookup(name) {
                    Some(object) => match object.type_decl() {
                        Some(decl) => {
                            if visiting.iter().any(|v| v == name) {
                                return Err(Error::load(format!(
                                    "{}: invalid recursive type {}",
                                    object.position, name
                                )));
                            }
                            visiting.push(name.clone());
                            let resolved = self.resolve(&decl.ty, &decl.type_params, visiting);
                            visiting.pop();
                            Ok(instantiate(resolved?, &decl.type_params, args, type_params))
                        }
                        None => Ok(Resolution::NotInterface),
                    },
                    None => Ok(predeclared(name)),
                }
            }
            TypeExpr::Qualified { .. } => Ok(Resolution::Unresolved),
            _ => Ok(Resolution::NotInterface),
        }
    }

    /// Flattened method set of `iface`, declared (directly or through an
    /// alias) by `owner`. Embedded interfaces contribute their methods at
    /// the position they are embedded.
    pub fn method_set(
        &self,
        owner: &Object,
        iface: &InterfaceType,
        type_params: &[String],
    ) -> Result<Vec<Method>> {
        let mut methods = Vec::new();
        let mut visiting = vec![owner.name.clone()];
        self.collect_methods(owner, iface, type_params, &mut visiting, &mut methods)?;
        Ok(methods)
    }

    fn collect_methods(
        &self,
        owner: &Object,
        iface: &InterfaceType,
        type_params: &[String],
        visiting: &mut Vec<String>,
        methods: &mut Vec<Method>,
    ) -> Result<()> {
        for elem in &iface.elems {
            match elem {
                InterfaceElem::Method(method) => add_method(
                    owner,
                    methods,
                    Method {
                        name: method.name.clone(),
                        signature: method.signature.clone(),
                        type_params: type_params.to_vec(),
                    },
                )?,
                InterfaceElem::Embedded(ty) => match self.resolve(ty, type_params, visiting)? {
                    Resolution::Interface {
                        iface: embedded,
                        type_params: embedded_params,
                    } => {
                        // Stays on the path while its own embeds are walked.
                        let named = match ty {
                            TypeExpr::Named { name, .. } => Some(name.clone()),
                            _ => None,
                        };
                        let pushed = named.is_some();
                        visiting.extend(named);
                        let collected = self.collect_methods(
                            owner,
                            &embedded,
                            &embedded_params,
                            visiting,
                            methods,
                        );
                        if pushed {
                            visiting.pop();
                        }
                        collected?
                    }
                    Resolution::NotInterface => {
                        debug!("{}: embedded {} contributes no methods", owner.name, ty)
                    }
                    Resolution::Unresolved => warn!(
                        "{}: cannot resolve embedded interface {}, its methods are skipped",
                        owner.name, ty
                    ),
                },
                InterfaceElem::Constraint(_) => {}
            }
        }
        Ok(())
    }
}

/// Binds the type arguments of `Name[A, B]` to the declaration's type
/// parameters. The arguments were written where `type_params` are in scope,
/// so those become the parameters of the instantiated interface.
fn instantiate(
    resolved: Resolution,
    decl_params: &[String],
    args: &[TypeExpr],
    type_params: &[String],
) -> Resolution {
    match resolved {
        Resolution::Interface { iface, .. }
            if !args.is_empty() && args.len() == decl_params.len() =>
        {
            let bindings: BTreeMap<String, TypeExpr> =
                decl_params.iter().cloned().zip(args.iter().cloned()).collect();
            Resolution::Interface {
                iface: iface.substitute(&bindings),
                type_params: type_params.to_vec(),
            }
        }
        other => other,
    }
}

fn add_method(owner: &Object, methods: &mut Vec<Method>, method: Method) -> Result<()> {
    match methods.iter().find(|m| m.name == method.name) {
        Some(existing) if existing.signature.same_shape(&method.signature) => Ok(()),
        Some(_) => Err(Error::load(format!(
            "{}: {}: duplicate method {}",
            owner.position, owner.name, method.name
        ))),
        None => {
            methods.push(method);
            Ok(())
        }
    }
}

/// Universe-scope types, used only when the package does not shadow them.
fn predeclared(name: &str) -> Resolution {
    match name {
        "error" => Resolution::Interface {
            iface: error_interface(),
            type_params: Vec::new(),
        },
        "any" | "comparable" => Resolution::Interface {
            iface: InterfaceType::default(),
            type_params: Vec::new(),
        },
        _ if BASIC_TYPES.contains(&name) => Resolution::NotInterface,
        _ => Resolution::Unresolved,
    }
}

fn error_interface() -> InterfaceType {
    InterfaceType {
        elems: vec![InterfaceElem::Method(MethodSignature {
            name: "Error".to_string(),
            signature: Signature {
                params: Vec::new(),
                results: vec![Param::unnamed(TypeExpr::named("string"))],
                variadic: false,
            },
        })],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ObjectKind, Position, TypeDecl, TypeDeclKind};
    use std::path::PathBuf;

    fn decl(name: &str, kind: TypeDeclKind, ty: TypeExpr) -> Object {
        Object {
            name: name.to_string(),
            kind: ObjectKind::TypeName(TypeDecl {
                kind,
                type_params: Vec::new(),
                ty,
            }),
            position: Position {
                file: PathBuf::from("demo.go"),
                line: 1,
                column: 6,
            },
        }
    }

    fn method(name: &str, results: Vec<TypeExpr>) -> InterfaceElem {
        InterfaceElem::Method(MethodSignature {
            name: name.to_string(),
            signature: Signature {
                params: Vec::new(),
                results: results.into_iter().map(Param::unnamed).collect(),
                variadic: false,
            },
        })
    }

    fn iface(elems: Vec<InterfaceElem>) -> TypeExpr {
        TypeExpr::Interface(InterfaceType { elems })
    }

    fn scope(objects: Vec<Object>) -> Scope {
        let mut scope = Scope::new();
        for object in objects {
            scope.insert(object).unwrap();
        }
        scope
    }

    fn names(methods: &[Method]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_alias_and_defined_types_resolve_through_scope() {
        let scope = scope(vec![
            decl("Base", TypeDeclKind::Defined, iface(vec![method("Ping", vec![])])),
            decl("Alias", TypeDeclKind::Alias, TypeExpr::named("Base")),
            decl("Renamed", TypeDeclKind::Defined, TypeExpr::named("Alias")),
            decl("ID", TypeDeclKind::Defined, TypeExpr::named("string")),
        ]);
        let resolver = Resolver::new(&scope);

        for name in ["Alias", "Renamed"] {
            let object = scope.lookup(name).unwrap();
            assert!(matches!(
                resolver.resolve_object(object).unwrap(),
                Resolution::Interface { .. }
            ));
        }
        let id = scope.lookup("ID").unwrap();
        assert_eq!(resolver.resolve_object(id).unwrap(), Resolution::NotInterface);
    }

    #[test]
    fn test_embedded_methods_keep_declaration_position() {
        let scope = scope(vec![
            decl("Closer", TypeDeclKind::Defined, iface(vec![method("Close", vec![])])),
            decl(
                "Conn",
                TypeDeclKind::Defined,
                iface(vec![
                    method("Open", vec![]),
                    InterfaceElem::Embedded(TypeExpr::named("Closer")),
                    InterfaceElem::Embedded(TypeExpr::named("error")),
                    InterfaceElem::Embedded(TypeExpr::qualified("io", "Reader")),
                    method("Close", vec![]),
                ]),
            ),
        ]);
        let resolver = Resolver::new(&scope);
        let conn = scope.lookup("Conn").unwrap();

        let Resolution::Interface { iface, type_params } = resolver.resolve_object(conn).unwrap()
        else {
            panic!("Conn is an interface");
        };
        let methods = resolver.method_set(conn, &iface, &type_params).unwrap();
        assert_eq!(names(&methods), vec!["Open", "Close", "Error"]);
    }

    #[test]
    fn test_conflicting_duplicate_method_is_error() {
        let scope = scope(vec![
            decl("Closer", TypeDeclKind::Defined, iface(vec![method("Close", vec![])])),
            decl(
                "Conn",
                TypeDeclKind::Defined,
                iface(vec![
                    InterfaceElem::Embedded(TypeExpr::named("Closer")),
                    method("Close", vec![TypeExpr::named("error")]),
                ]),
            ),
        ]);
        let resolver = Resolver::new(&scope);
        let conn = scope.lookup("Conn").unwrap();
        let Resolution::Interface { iface, type_params } = resolver.resolve_object(conn).unwrap()
        else {
            panic!("Conn is an interface");
        };

        let err = resolver.method_set(conn, &iface, &type_params).unwrap_err();
        assert!(err.to_string().contains("duplicate method Close"), "{}", err);
    }

    #[test]
    fn test_recursive_embedding_is_error() {
        let scope = scope(vec![
            decl("A", TypeDeclKind::Defined, iface(vec![InterfaceElem::Embedded(TypeExpr::named("B"))])),
            decl("B", TypeDeclKind::Defined, iface(vec![InterfaceElem::Embedded(TypeExpr::named("A"))])),
        ]);
        let resolver = Resolver::new(&scope);
        let a = scope.lookup("A").unwrap();
        let Resolution::Interface { iface, type_params } = resolver.resolve_object(a).unwrap() else {
            panic!("A is an interface");
        };

        let err = resolver.method_set(a, &iface, &type_params).unwrap_err();
        assert!(err.to_string().contains("invalid recursive type"), "{}", err);
    }

    #[test]
    fn test_recursive_alias_is_error() {
        let scope = scope(vec![
            decl("A", TypeDeclKind::Alias, TypeExpr::named("B")),
            decl("B", TypeDeclKind::Alias, TypeExpr::named("A")),
        ]);
        let resolver = Resolver::new(&scope);
        assert!(resolver.resolve_object(scope.lookup("A").unwrap()).is_err());
    }

    #[test]
    fn test_package_declaration_shadows_error() {
        let scope = scope(vec![
            decl("error", TypeDeclKind::Defined, TypeExpr::named("string")),
            decl("E", TypeDeclKind::Defined, TypeExpr::named("error")),
        ]);
        let resolver = Resolver::new(&scope);
        let e = scope.lookup("E").unwrap();
        assert_eq!(resolver.resolve_object(e).unwrap(), Resolution::NotInterface);
    }

    #[test]
    fn test_instantiated_embed_binds_type_arguments() {
        let mut repo = decl(
            "Repo",
            TypeDeclKind::Defined,
            iface(vec![method("Get", vec![TypeExpr::named("T"), TypeExpr::named("error")])]),
        );
        if let ObjectKind::TypeName(decl) = &mut repo.kind {
            decl.type_params = vec!["T".to_string()];
        }
        let users = decl(
            "Users",
            TypeDeclKind::Defined,
            iface(vec![InterfaceElem::Embedded(TypeExpr::Named {
                name: "Repo".into(),
                args: vec![TypeExpr::named("User")],
            })]),
        );
        let scope = scope(vec![repo, users]);
        let resolver = Resolver::new(&scope);
        let users = scope.lookup("Users").unwrap();
        let Resolution::Interface { iface, type_params } = resolver.resolve_object(users).unwrap()
        else {
            panic!("Users is an interface");
        };

        let methods = resolver.method_set(users, &iface, &type_params).unwrap();

        assert_eq!(methods.len(), 1);
        assert!(methods[0].type_params.is_empty());
        assert_eq!(methods[0].signature.results[0].ty, TypeExpr::named("User"));
    }
}
