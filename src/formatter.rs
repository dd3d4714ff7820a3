//! Signature formatter.
//!
//! Prints types the way `go/types` does: `interface{M(); N()}`,
//! `struct{X int; Y string}`, `map[K]V`, directional channels with the
//! arrow attached to `chan`.

use crate::core::{
    ChanDir, ConstExpr, InterfaceElem, InterfaceType, Package, Param, Scope, Signature,
    StructField, TypeExpr,
};
use crate::frontend::constant;
use crate::frontend::resolve::Method;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Keep parameter and result names in printed signatures.
    pub param_names: bool,
}

/// Renders `type <Method> func(...) ...` declarations for one package.
pub struct SignatureFormatter<'a> {
    package: &'a Package,
    options: FormatOptions,
}

impl<'a> SignatureFormatter<'a> {
    pub fn new(package: &'a Package, options: FormatOptions) -> Self {
        Self { package, options }
    }

    pub fn declaration(&self, method: &Method) -> String {
        let printer = Printer {
            qualifier: Some((self.package.name.as_str(), &self.package.scope)),
            type_params: &method.type_params,
            param_names: self.options.param_names,
        };
        let mut out = format!("type {} func", method.name);
        printer.signature(&mut out, &method.signature);
        out
    }
}

struct Printer<'a> {
    /// Package name and scope used to qualify package-local type names.
    qualifier: Option<(&'a str, &'a Scope)>,
    type_params: &'a [String],
    param_names: bool,
}

impl Printer<'_> {
    fn ty(&self, out: &mut String, ty: &TypeExpr) {
        match ty {
            TypeExpr::Named { name, args } => {
                if self.is_local_type(name) {
                    if let Some((package, _)) = self.qualifier {
                        out.push_str(package);
                        out.push('.');
                    }
                }
                out.push_str(name);
                self.type_args(out, args);
            }
            TypeExpr::Qualified {
                package,
                name,
                args,
            } => {
                out.push_str(package);
                out.push('.');
                out.push_str(name);
                self.type_args(out, args);
            }
            TypeExpr::Pointer(elem) => {
                out.push('*');
                self.ty(out, elem);
            }
            TypeExpr::Slice(elem) => {
                out.push_str("[]");
                self.ty(out, elem);
            }
            TypeExpr::Array { len, elem } => {
                out.push('[');
                self.array_len(out, len);
                out.push(']');
                self.ty(out, elem);
            }
            TypeExpr::Map { key, value } => {
                out.push_str("map[");
                self.ty(out, key);
                out.push(']');
                self.ty(out, value);
            }
            TypeExpr::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                // `chan <-chan T` would parse as `chan<- chan T`.
                let needs_parens = *dir == ChanDir::Both
                    && matches!(**elem, TypeExpr::Chan { dir: ChanDir::Recv, .. });
                if needs_parens {
                    out.push('(');
                }
                self.ty(out, elem);
                if needs_parens {
                    out.push(')');
                }
            }
            TypeExpr::Func(sig) => {
                out.push_str("func");
                self.signature(out, sig);
            }
            TypeExpr::Interface(iface) => self.interface(out, iface),
            TypeExpr::Struct(fields) => self.struct_fields(out, fields),
            TypeExpr::Tilde(elem) => {
                out.push('~');
                self.ty(out, elem);
            }
            TypeExpr::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.ty(out, term);
                }
            }
        }
    }

    fn is_local_type(&self, name: &str) -> bool {
        match self.qualifier {
            Some((_, scope)) => {
                scope.lookup_type(name).is_some() && !self.type_params.iter().any(|p| p == name)
            }
            None => false,
        }
    }

    /// Lengths print as their value when they fold, as go/types does.
    fn array_len(&self, out: &mut String, len: &ConstExpr) {
        if let Some((_, scope)) = self.qualifier {
            if let Some(value) = constant::eval(scope, len) {
                out.push_str(&value.to_string());
                return;
            }
        }
        self.const_expr(out, len);
    }

    fn const_expr(&self, out: &mut String, expr: &ConstExpr) {
        match expr {
            ConstExpr::Int(value) => out.push_str(&value.to_string()),
            ConstExpr::Name(name) => {
                if let Some((package, scope)) = self.qualifier {
                    if scope.lookup(name).is_some() {
                        out.push_str(package);
                        out.push('.');
                    }
                }
                out.push_str(name);
            }
            ConstExpr::Qualified { package, name } => {
                out.push_str(package);
                out.push('.');
                out.push_str(name);
            }
            ConstExpr::Iota => out.push_str("iota"),
            ConstExpr::Unary { op, operand } => {
                out.push_str(op);
                self.const_expr(out, operand);
            }
            ConstExpr::Binary { op, lhs, rhs } => {
                self.const_expr(out, lhs);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                self.const_expr(out, rhs);
            }
            ConstExpr::Paren(inner) => {
                out.push('(');
                self.const_expr(out, inner);
                out.push(')');
            }
            ConstExpr::Verbatim(text) => out.push_str(text),
        }
    }

    fn type_args(&self, out: &mut String, args: &[TypeExpr]) {
        if args.is_empty() {
            return;
        }
        out.push('[');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.ty(out, arg);
        }
        out.push(']');
    }

    /// `(<params>)` followed by the result list, if any.
    fn signature(&self, out: &mut String, sig: &Signature) {
        out.push('(');
        self.params(out, &sig.params, sig.variadic);
        out.push(')');

        match sig.results.as_slice() {
            [] => {}
            [single] if single.name.is_none() || !self.param_names => {
                out.push(' ');
                self.ty(out, &single.ty);
            }
            results => {
                out.push_str(" (");
                self.params(out, results, false);
                out.push(')');
            }
        }
    }

    fn params(&self, out: &mut String, params: &[Param], variadic: bool) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if self.param_names {
                if let Some(name) = &param.name {
                    out.push_str(name);
                    out.push(' ');
                }
            }
            if variadic && i + 1 == params.len() {
                out.push_str("...");
            }
            self.ty(out, &param.ty);
        }
    }

    fn interface(&self, out: &mut String, iface: &InterfaceType) {
        out.push_str("interface{");
        for (i, elem) in iface.elems.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            match elem {
                InterfaceElem::Method(method) => {
                    out.push_str(&method.name);
                    self.signature(out, &method.signature);
                }
                InterfaceElem::Embedded(ty) | InterfaceElem::Constraint(ty) => self.ty(out, ty),
            }
        }
        out.push('}');
    }

    fn struct_fields(&self, out: &mut String, fields: &[StructField]) {
        out.push_str("struct{");
        let mut first = true;
        for field in fields {
            let names: Vec<Option<&str>> = if field.names.is_empty() {
                vec![None]
            } else {
                field.names.iter().map(|n| Some(n.as_str())).collect()
            };
            for name in names {
                if !first {
                    out.push_str("; ");
                }
                first = false;
                if let Some(name) = name {
                    out.push_str(name);
                    out.push(' ');
                }
                self.ty(out, &field.ty);
                if let Some(tag) = &field.tag {
                    out.push(' ');
                    out.push_str(tag);
                }
            }
        }
        out.push('}');
    }
}

/// Source-like rendering without package qualification, used in log
/// messages.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer {
            qualifier: None,
            type_params: &[],
            param_names: true,
        };
        let mut out = String::new();
        printer.ty(&mut out, self);
        f.write_str(&out)
    }
}
