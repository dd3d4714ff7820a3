//! Lowering of tree-sitter-go nodes into the owned type model.

use super::parser::{all_children, field_children, named_children, node_column, node_line, GoSource};
use crate::core::{
    ChanDir, ConstDecl, ConstExpr, InterfaceElem, InterfaceType, MethodSignature, Object,
    ObjectKind, Param, Position, Signature, StructField, TypeDecl, TypeDeclKind, TypeExpr,
};
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Top-level declarations of one file.
#[derive(Debug)]
pub struct LoweredFile {
    pub path: PathBuf,
    pub package: String,
    pub objects: Vec<Object>,
}

/// Lowers the package clause and every top-level declaration of `src`.
pub fn lower_file(path: &Path, src: &GoSource) -> Result<LoweredFile> {
    let lowerer = Lowerer { path, src };
    let root = src.root();

    let mut package = None;
    let mut objects = Vec::new();

    for node in named_children(&root) {
        match node.kind() {
            "package_clause" => {
                package = named_children(&node)
                    .into_iter()
                    .find(|n| n.kind() == "package_identifier")
                    .map(|n| src.text(&n).to_string());
            }
            "type_declaration" => {
                for spec in named_children(&node) {
                    objects.push(lowerer.type_spec(&spec)?);
                }
            }
            "function_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    lowerer.push_value(&mut objects, &name, ObjectKind::Func);
                }
            }
            "var_declaration" => {
                for spec in specs_of(&node, "var_spec") {
                    for name in field_children(&spec, "name") {
                        lowerer.push_value(&mut objects, &name, ObjectKind::Var);
                    }
                }
            }
            "const_declaration" => lowerer.const_specs(&node, &mut objects),
            // Methods belong to their receiver, imports to the file scope.
            _ => {}
        }
    }

    let package = package.ok_or_else(|| Error::load_in(path, "expected 'package' clause"))?;

    Ok(LoweredFile {
        path: path.to_path_buf(),
        package,
        objects,
    })
}

struct Lowerer<'a> {
    path: &'a Path,
    src: &'a GoSource,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: &Node) -> &'a str {
        self.src.text(node)
    }

    fn position(&self, node: &Node) -> Position {
        Position {
            file: self.path.to_path_buf(),
            line: node_line(node),
            column: node_column(node),
        }
    }

    fn unsupported(&self, node: &Node, what: &str) -> Error {
        Error::load_in(
            self.path,
            format!(
                "unsupported {} `{}` ({}) at {}:{}",
                what,
                compact(self.text(node)),
                node.kind(),
                node_line(node),
                node_column(node)
            ),
        )
    }

    fn required<'t>(&self, node: &Node<'t>, field: &str) -> Result<Node<'t>> {
        node.child_by_field_name(field).ok_or_else(|| {
            Error::load_in(
                self.path,
                format!(
                    "{} without {} at {}:{}",
                    node.kind(),
                    field,
                    node_line(node),
                    node_column(node)
                ),
            )
        })
    }

    fn type_spec(&self, spec: &Node) -> Result<Object> {
        let kind = match spec.kind() {
            "type_spec" => TypeDeclKind::Defined,
            "type_alias" => TypeDeclKind::Alias,
            _ => return Err(self.unsupported(spec, "type declaration")),
        };
        let name = self.required(spec, "name")?;
        let type_params = spec
            .child_by_field_name("type_parameters")
            .map(|list| self.type_param_names(&list))
            .unwrap_or_default();
        let ty = self.ty(&self.required(spec, "type")?)?;

        Ok(Object {
            name: self.text(&name).to_string(),
            kind: ObjectKind::TypeName(TypeDecl {
                kind,
                type_params,
                ty,
            }),
            position: self.position(&name),
        })
    }

    fn type_param_names(&self, list: &Node) -> Vec<String> {
        named_children(list)
            .iter()
            .flat_map(|decl| field_children(decl, "name"))
            .map(|name| self.text(&name).to_string())
            .collect()
    }

    fn push_value(&self, objects: &mut Vec<Object>, name: &Node, kind: ObjectKind) {
        let text = self.text(name);
        // Neither is entered into package scope.
        if text == "_" || (text == "init" && kind == ObjectKind::Func) {
            return;
        }
        objects.push(Object {
            name: text.to_string(),
            kind,
            position: self.position(name),
        });
    }

    /// A spec without values repeats the previous value list; `iota` counts
    /// specs within the declaration.
    fn const_specs(&self, decl: &Node, objects: &mut Vec<Object>) {
        let mut values: Vec<ConstExpr> = Vec::new();
        for (iota, spec) in specs_of(decl, "const_spec").iter().enumerate() {
            if let Some(list) = spec.child_by_field_name("value") {
                values = if list.kind() == "expression_list" {
                    named_children(&list).iter().map(|v| self.const_expr(v)).collect()
                } else {
                    vec![self.const_expr(&list)]
                };
            }
            for (i, name) in field_children(spec, "name").iter().enumerate() {
                let kind = ObjectKind::Const(ConstDecl {
                    value: values.get(i).cloned(),
                    iota: iota as i128,
                });
                self.push_value(objects, name, kind);
            }
        }
    }

    fn const_expr(&self, node: &Node) -> ConstExpr {
        let verbatim = || ConstExpr::Verbatim(compact(self.text(node)));
        match node.kind() {
            "int_literal" => ConstExpr::parse_int(self.text(node))
                .map(ConstExpr::Int)
                .unwrap_or_else(verbatim),
            "iota" => ConstExpr::Iota,
            "identifier" if self.text(node) == "iota" => ConstExpr::Iota,
            "identifier" => ConstExpr::Name(self.text(node).to_string()),
            "selector_expression" => {
                let operand = node.child_by_field_name("operand");
                match (operand, node.child_by_field_name("field")) {
                    (Some(operand), Some(field)) if operand.kind() == "identifier" => {
                        ConstExpr::Qualified {
                            package: self.text(&operand).to_string(),
                            name: self.text(&field).to_string(),
                        }
                    }
                    _ => verbatim(),
                }
            }
            "unary_expression" => {
                let op = node.child_by_field_name("operator");
                match (op, node.child_by_field_name("operand")) {
                    (Some(op), Some(operand)) => ConstExpr::Unary {
                        op: self.text(&op).to_string(),
                        operand: Box::new(self.const_expr(&operand)),
                    },
                    _ => verbatim(),
                }
            }
            "binary_expression" => match (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) {
                (Some(lhs), Some(op), Some(rhs)) => ConstExpr::Binary {
                    op: self.text(&op).to_string(),
                    lhs: Box::new(self.const_expr(&lhs)),
                    rhs: Box::new(self.const_expr(&rhs)),
                },
                _ => verbatim(),
            },
            "parenthesized_expression" => match named_children(node).as_slice() {
                [inner] => ConstExpr::Paren(Box::new(self.const_expr(inner))),
                _ => verbatim(),
            },
            _ => verbatim(),
        }
    }

    fn ty(&self, node: &Node) -> Result<TypeExpr> {
        match node.kind() {
            "type_identifier" | "identifier" => Ok(TypeExpr::named(self.text(node))),
            "qualified_type" => Ok(TypeExpr::Qualified {
                package: self.text(&self.required(node, "package")?).to_string(),
                name: self.text(&self.required(node, "name")?).to_string(),
                args: Vec::new(),
            }),
            "generic_type" => {
                let args = self.type_args(&self.required(node, "type_arguments")?)?;
                match self.ty(&self.required(node, "type")?)? {
                    TypeExpr::Named { name, .. } => Ok(TypeExpr::Named { name, args }),
                    TypeExpr::Qualified { package, name, .. } => {
                        Ok(TypeExpr::Qualified { package, name, args })
                    }
                    _ => Err(self.unsupported(node, "generic type")),
                }
            }
            "pointer_type" => Ok(TypeExpr::pointer(self.only_child(node)?)),
            "slice_type" => Ok(TypeExpr::slice(self.ty(&self.required(node, "element")?)?)),
            "array_type" => Ok(TypeExpr::Array {
                len: self.const_expr(&self.required(node, "length")?),
                elem: Box::new(self.ty(&self.required(node, "element")?)?),
            }),
            "implicit_length_array_type" => Ok(TypeExpr::Array {
                len: ConstExpr::Verbatim("...".to_string()),
                elem: Box::new(self.ty(&self.required(node, "element")?)?),
            }),
            "map_type" => Ok(TypeExpr::Map {
                key: Box::new(self.ty(&self.required(node, "key")?)?),
                value: Box::new(self.ty(&self.required(node, "value")?)?),
            }),
            "channel_type" => Ok(TypeExpr::Chan {
                dir: self.chan_dir(node),
                elem: Box::new(self.ty(&self.required(node, "value")?)?),
            }),
            "function_type" => Ok(TypeExpr::Func(self.signature(node)?)),
            "interface_type" => Ok(TypeExpr::Interface(self.interface(node)?)),
            "struct_type" => {
                let fields = named_children(node)
                    .into_iter()
                    .find(|n| n.kind() == "field_declaration_list")
                    .map(|list| self.struct_fields(&list))
                    .transpose()?
                    .unwrap_or_default();
                Ok(TypeExpr::Struct(fields))
            }
            "parenthesized_type" => self.only_child(node),
            "negated_type" => Ok(TypeExpr::Tilde(Box::new(self.only_child(node)?))),
            "type_elem" => self.type_elem(node),
            _ => Err(self.unsupported(node, "type syntax")),
        }
    }

    fn only_child(&self, node: &Node) -> Result<TypeExpr> {
        match named_children(node).as_slice() {
            [inner] => self.ty(inner),
            _ => Err(self.unsupported(node, "type syntax")),
        }
    }

    fn type_args(&self, node: &Node) -> Result<Vec<TypeExpr>> {
        named_children(node).iter().map(|arg| self.ty(arg)).collect()
    }

    /// `A | B | ~C`; a single term is returned as itself.
    fn type_elem(&self, node: &Node) -> Result<TypeExpr> {
        let mut terms = named_children(node)
            .iter()
            .map(|term| self.ty(term))
            .collect::<Result<Vec<_>>>()?;
        match terms.len() {
            0 => Err(self.unsupported(node, "type element")),
            1 => Ok(terms.remove(0)),
            _ => Ok(TypeExpr::Union(terms)),
        }
    }

    fn chan_dir(&self, node: &Node) -> ChanDir {
        let tokens: Vec<_> = all_children(node).iter().map(|n| n.kind()).collect();
        match tokens.as_slice() {
            ["<-", "chan", ..] => ChanDir::Recv,
            ["chan", "<-", ..] => ChanDir::Send,
            _ => ChanDir::Both,
        }
    }

    /// Signature of a `function_type` or `method_elem`.
    fn signature(&self, node: &Node) -> Result<Signature> {
        let (params, variadic) = self.parameter_list(&self.required(node, "parameters")?)?;
        let results = match node.child_by_field_name("result") {
            None => Vec::new(),
            Some(result) if result.kind() == "parameter_list" => self.parameter_list(&result)?.0,
            Some(result) => vec![Param::unnamed(self.ty(&result)?)],
        };
        Ok(Signature {
            params,
            results,
            variadic,
        })
    }

    fn parameter_list(&self, list: &Node) -> Result<(Vec<Param>, bool)> {
        let mut params = Vec::new();
        let mut variadic = false;

        for decl in named_children(list) {
            let ty = self.ty(&self.required(&decl, "type")?)?;
            match decl.kind() {
                "parameter_declaration" => {
                    let names = field_children(&decl, "name");
                    if names.is_empty() {
                        params.push(Param::unnamed(ty));
                    } else {
                        params.extend(
                            names
                                .iter()
                                .map(|name| Param::named(self.text(name), ty.clone())),
                        );
                    }
                }
                "variadic_parameter_declaration" => {
                    let name = decl.child_by_field_name("name");
                    params.push(Param {
                        name: name.map(|n| self.text(&n).to_string()),
                        ty,
                    });
                    variadic = true;
                }
                _ => return Err(self.unsupported(&decl, "parameter")),
            }
        }

        Ok((params, variadic))
    }

    fn interface(&self, node: &Node) -> Result<InterfaceType> {
        let mut elems = Vec::new();
        for elem in named_children(node) {
            match elem.kind() {
                "method_elem" => elems.push(InterfaceElem::Method(MethodSignature {
                    name: self.text(&self.required(&elem, "name")?).to_string(),
                    signature: self.signature(&elem)?,
                })),
                "type_elem" => match self.type_elem(&elem)? {
                    term @ (TypeExpr::Named { .. } | TypeExpr::Qualified { .. }) => {
                        elems.push(InterfaceElem::Embedded(term))
                    }
                    term => elems.push(InterfaceElem::Constraint(term)),
                },
                _ => return Err(self.unsupported(&elem, "interface element")),
            }
        }
        Ok(InterfaceType { elems })
    }

    fn struct_fields(&self, list: &Node) -> Result<Vec<StructField>> {
        named_children(list)
            .iter()
            .filter(|decl| decl.kind() == "field_declaration")
            .map(|decl| {
                let names: Vec<String> = field_children(decl, "name")
                    .iter()
                    .map(|name| self.text(name).to_string())
                    .collect();
                let mut ty = self.ty(&self.required(decl, "type")?)?;
                let embedded_pointer =
                    names.is_empty() && all_children(decl).iter().any(|n| n.kind() == "*");
                if embedded_pointer {
                    ty = TypeExpr::pointer(ty);
                }
                let tag = decl
                    .child_by_field_name("tag")
                    .map(|tag| self.text(&tag).to_string());
                Ok(StructField { names, ty, tag })
            })
            .collect()
    }
}

/// `var_spec`/`const_spec` children of a declaration, whether written
/// singly or inside a parenthesized group.
fn specs_of<'t>(decl: &Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut specs = Vec::new();
    for child in named_children(decl) {
        if child.kind() == kind {
            specs.push(child);
        } else {
            specs.extend(specs_of(&child, kind));
        }
    }
    specs
}

/// Collapses runs of whitespace so multi-line source renders on one line.
fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;
    use indoc::indoc;

    fn lower(source: &str) -> LoweredFile {
        let path = Path::new("demo.go");
        let parsed = parse_source(source, path).expect("parses");
        lower_file(path, &parsed).expect("lowers")
    }

    fn interface_of(file: &LoweredFile, name: &str) -> InterfaceType {
        let object = file.objects.iter().find(|o| o.name == name).unwrap();
        match &object.type_decl().unwrap().ty {
            TypeExpr::Interface(iface) => iface.clone(),
            other => panic!("{} is not an interface: {:?}", name, other),
        }
    }

    fn methods_of(iface: &InterfaceType) -> Vec<&MethodSignature> {
        iface
            .elems
            .iter()
            .filter_map(|elem| match elem {
                InterfaceElem::Method(method) => Some(method),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_collects_top_level_objects() {
        let file = lower(indoc! {r#"
            package store

            import "context"

            const (
                A = iota
                B
            )

            var x, _ = 1, 2

            type (
                Item struct{ ID string }
                Alias = Item
            )

            func init() {}
            func New() *Item { return nil }
            func (i *Item) Save(ctx context.Context) error { return nil }
        "#});

        assert_eq!(file.package, "store");
        let names: Vec<_> = file.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "x", "Item", "Alias", "New"]);

        let alias = file.objects[4].type_decl().unwrap();
        assert_eq!(alias.kind, TypeDeclKind::Alias);
        assert_eq!(alias.ty, TypeExpr::named("Item"));
        assert_eq!(file.objects[3].position.line, 13);
    }

    #[test]
    fn test_lowers_method_parameters() {
        let file = lower(indoc! {r#"
            package demo

            type Service interface {
                Foo(val string) error
                Copy(dst, src []byte) (n int, err error)
                Log(format string, args ...any)
            }
        "#});
        let iface = interface_of(&file, "Service");
        let methods = methods_of(&iface);
        assert_eq!(methods.len(), 3);

        assert_eq!(methods[0].name, "Foo");
        assert_eq!(
            methods[0].signature.params,
            vec![Param::named("val", TypeExpr::named("string"))]
        );
        assert_eq!(
            methods[0].signature.results,
            vec![Param::unnamed(TypeExpr::named("error"))]
        );

        let copy = &methods[1].signature;
        assert_eq!(copy.params.len(), 2);
        assert_eq!(copy.params[1], Param::named("src", TypeExpr::slice(TypeExpr::named("byte"))));
        assert_eq!(copy.results[1], Param::named("err", TypeExpr::named("error")));

        let log = &methods[2].signature;
        assert!(log.variadic);
        assert_eq!(log.params[1], Param::named("args", TypeExpr::named("any")));
    }

    #[test]
    fn test_lowers_composite_types() {
        let file = lower(indoc! {r#"
            package demo

            type Pipes interface {
                Out() <-chan map[string][4]int
                In(chan<- *Event)
                Both(chan func(int) bool)
            }
        "#});
        let iface = interface_of(&file, "Pipes");
        let methods = methods_of(&iface);

        match &methods[0].signature.results[0].ty {
            TypeExpr::Chan { dir, elem } => {
                assert_eq!(*dir, ChanDir::Recv);
                assert!(matches!(**elem, TypeExpr::Map { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            methods[1].signature.params[0].ty,
            TypeExpr::Chan { dir: ChanDir::Send, .. }
        ));
        assert!(matches!(
            methods[2].signature.params[0].ty,
            TypeExpr::Chan { dir: ChanDir::Both, .. }
        ));
    }

    #[test]
    fn test_lowers_embeds_and_constraints() {
        let file = lower(indoc! {r#"
            package demo

            type ReadCloser interface {
                io.Reader
                Closer
                Close() error
            }

            type Number interface {
                ~int | ~float64
            }

            type Repo[K comparable, V any] interface {
                Get(key K) (V, error)
            }
        "#});

        let rc = interface_of(&file, "ReadCloser");
        assert_eq!(rc.elems[0], InterfaceElem::Embedded(TypeExpr::qualified("io", "Reader")));
        assert_eq!(rc.elems[1], InterfaceElem::Embedded(TypeExpr::named("Closer")));

        let number = interface_of(&file, "Number");
        assert!(matches!(
            number.elems.as_slice(),
            [InterfaceElem::Constraint(TypeExpr::Union(terms))] if terms.len() == 2
        ));

        let repo = file.objects.iter().find(|o| o.name == "Repo").unwrap();
        assert_eq!(repo.type_decl().unwrap().type_params, vec!["K", "V"]);
    }

    #[test]
    fn test_const_specs_repeat_values_with_their_iota() {
        let file = lower(indoc! {r#"
            package demo

            const Size = 0x10

            const (
                KB = 1 << (10 * (iota + 1))
                MB
                Label, Other = "x", len(Label)
            )

            type Block interface {
                Read() [Size * 2]byte
            }
        "#});
        let consts: Vec<_> = file
            .objects
            .iter()
            .filter_map(|o| o.const_decl().map(|d| (o.name.as_str(), d)))
            .collect();

        assert_eq!(consts[0].0, "Size");
        assert_eq!(consts[0].1.value, Some(ConstExpr::Int(16)));
        assert_eq!(consts[1].1.iota, 0);
        assert_eq!((consts[2].0, consts[2].1.iota), ("MB", 1));
        assert_eq!(consts[1].1.value, consts[2].1.value);
        assert!(matches!(consts[2].1.value, Some(ConstExpr::Binary { .. })));
        assert_eq!(consts[4].1.value, Some(ConstExpr::Verbatim("len(Label)".into())));

        let block = interface_of(&file, "Block");
        let read = methods_of(&block)[0];
        assert_eq!(
            read.signature.results[0].ty,
            TypeExpr::Array {
                len: ConstExpr::Binary {
                    op: "*".into(),
                    lhs: Box::new(ConstExpr::Name("Size".into())),
                    rhs: Box::new(ConstExpr::Int(2)),
                },
                elem: Box::new(TypeExpr::named("byte")),
            }
        );
    }

    #[test]
    fn test_missing_package_clause_is_load_error() {
        let path = Path::new("nopkg.go");
        let parsed = parse_source("type A int\n", path);
        // Either the parser or the lowering rejects it.
        let result = parsed.and_then(|src| lower_file(path, &src));
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_compact_collapses_whitespace() {
        assert_eq!(compact("N  *\n  2"), "N * 2");
    }
}
