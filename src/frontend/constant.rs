//! Integer constant folding over package scope.
//!
//! Only what array lengths need: integer literals, `iota`, package-level
//! `const` names and the integer operators. Anything else (names from
//! other packages, calls such as `len(x)`, floats) does not fold.

use crate::core::{ConstExpr, Scope};

/// Value of `expr` when it is an integer constant expression over `scope`.
pub fn eval(scope: &Scope, expr: &ConstExpr) -> Option<i128> {
    Folder {
        scope,
        visiting: Vec::new(),
    }
    .fold(expr, None)
}

struct Folder<'s> {
    scope: &'s Scope,
    visiting: Vec<String>,
}

impl Folder<'_> {
    fn fold(&mut self, expr: &ConstExpr, iota: Option<i128>) -> Option<i128> {
        match expr {
            ConstExpr::Int(value) => Some(*value),
            ConstExpr::Iota => iota,
            ConstExpr::Name(name) => self.name(name),
            ConstExpr::Paren(inner) => self.fold(inner, iota),
            ConstExpr::Unary { op, operand } => {
                let value = self.fold(operand, iota)?;
                match op.as_str() {
                    "+" => Some(value),
                    "-" => value.checked_neg(),
                    "^" => Some(!value),
                    _ => None,
                }
            }
            ConstExpr::Binary { op, lhs, rhs } => {
                let lhs = self.fold(lhs, iota)?;
                let rhs = self.fold(rhs, iota)?;
                binary(op, lhs, rhs)
            }
            ConstExpr::Qualified { .. } | ConstExpr::Verbatim(_) => None,
        }
    }

    fn name(&mut self, name: &str) -> Option<i128> {
        // Cyclic constants are a type error; they just do not fold.
        if self.visiting.iter().any(|v| v == name) {
            return None;
        }
        let decl = self.scope.lookup(name)?.const_decl()?;
        let value = decl.value.as_ref()?;

        self.visiting.push(name.to_string());
        let folded = self.fold(value, Some(decl.iota));
        self.visiting.pop();
        folded
    }
}

fn binary(op: &str, lhs: i128, rhs: i128) -> Option<i128> {
    let shift = || u32::try_from(rhs).ok();
    match op {
        "+" => lhs.checked_add(rhs),
        "-" => lhs.checked_sub(rhs),
        "*" => lhs.checked_mul(rhs),
        "/" => lhs.checked_div(rhs),
        "%" => lhs.checked_rem(rhs),
        "&" => Some(lhs & rhs),
        "|" => Some(lhs | rhs),
        "^" => Some(lhs ^ rhs),
        "&^" => Some(lhs & !rhs),
        "<<" => shift().and_then(|s| lhs.checked_shl(s)),
        ">>" => shift().and_then(|s| lhs.checked_shr(s)),
        _ => None,
    }
}
