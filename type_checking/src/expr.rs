//! Expression trees handed to the checker.
//!
//! Trees are built once by whoever produced them (a parser, a test) and are
//! only read afterwards. Every variable reference already carries its declared
//! type since there is no name resolution.
use crate::type_system::CheckedType;
use itertools::Itertools;
use std::fmt;
use strum_macros::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq, From, EnumDiscriminants)]
pub enum Expr {
    Var(Var),
    Literal(Literal),
    Assign(Assign),
    MethodCall(MethodCall),
    NewObject(NewObject),
}

pub type ExprKind = ExprDiscriminants;

/// A read of a variable, e.g. `x` in `x + 5`.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: CheckedType,
}

/// A literal value such as `5` or `"hi"`, kept as source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: String,
    pub ty: CheckedType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub lhs: Var,
    pub rhs: Box<Expr>,
}

/// `receiver.method_name(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Box<Expr>,
    pub method_name: String,
    pub args: Vec<Expr>,
}

/// `new Foo(args...)`
///
/// The arguments are not matched against anything, there are no
/// constructor signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObject {
    pub ty: CheckedType,
    pub args: Vec<Expr>,
}

impl Var {
    pub fn new(name: &str, ty: CheckedType) -> Var {
        Var {
            name: name.to_string(),
            ty,
        }
    }
}

impl Literal {
    pub fn new(value: &str, ty: CheckedType) -> Literal {
        Literal {
            value: value.to_string(),
            ty,
        }
    }

    pub fn null() -> Literal {
        Literal::new("null", CheckedType::Null)
    }
}

impl Expr {
    pub fn var(name: &str, ty: CheckedType) -> Expr {
        Var::new(name, ty).into()
    }

    pub fn literal(value: &str, ty: CheckedType) -> Expr {
        Literal::new(value, ty).into()
    }

    pub fn null() -> Expr {
        Literal::null().into()
    }

    pub fn assign(lhs: Var, rhs: impl Into<Expr>) -> Expr {
        Assign {
            lhs,
            rhs: Box::new(rhs.into()),
        }
        .into()
    }

    pub fn method_call(receiver: impl Into<Expr>, method_name: &str, args: Vec<Expr>) -> Expr {
        MethodCall {
            receiver: Box::new(receiver.into()),
            method_name: method_name.to_string(),
            args,
        }
        .into()
    }

    pub fn new_object(ty: CheckedType, args: Vec<Expr>) -> Expr {
        NewObject { ty, args }.into()
    }

    pub fn kind(&self) -> ExprKind {
        ExprKind::from(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(var) => write!(f, "{}", var.name),
            Expr::Literal(literal) => write!(f, "{}", literal.value),
            Expr::Assign(assign) => write!(f, "{} = {}", assign.lhs.name, assign.rhs),
            Expr::MethodCall(call) => write!(
                f,
                "{}.{}({})",
                call.receiver,
                call.method_name,
                call.args.iter().join(", ")
            ),
            Expr::NewObject(new) => write!(f, "new {}({})", new.ty, new.args.iter().join(", ")),
        }
    }
}
