#![warn(rust_2018_idioms)]
#![warn(
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::use_self,
    clippy::use_debug
)]

//! Static type checking of simple Java expressions: variable reads, literals,
//! assignments, method calls and object instantiation.
//!
//! Only compile-time types are involved, nothing is ever evaluated.

#[macro_use]
extern crate derive_more;

pub mod builtin_types;
pub mod checker;
pub mod expr;
pub mod type_error;
pub mod type_system;

pub use self::{
    builtin_types::BuiltinTypes,
    checker::ExprTypeChecker,
    expr::{Assign, Expr, ExprKind, Literal, MethodCall, NewObject, Var},
    type_error::{Mismatch, TypeError, TypeErrorKind, TypeList},
    type_system::{
        CheckedType, ClassDef, ClassDefId, ClassMethodDef, MethodParamDef, TypeSystem,
        TypeSystemError,
    },
};

use diagnostics::Diagnostics;

/// Emits `err` as an error, with its hint if there is one.
pub fn report(err: &TypeError, diagnostics: &Diagnostics) {
    match err.help() {
        Some(help) => diagnostics.error_with_help(err, &help),
        None => diagnostics.error(err),
    }
}

/// Checks `expr` and returns its type, or reports the first error to
/// `diagnostics` and returns `None`.
pub fn check_and_report(
    expr: &Expr,
    type_system: &TypeSystem,
    diagnostics: &Diagnostics,
) -> Option<CheckedType> {
    let checker = ExprTypeChecker::new(type_system);
    match checker
        .check_expr(expr)
        .and_then(|()| checker.type_expr(expr))
    {
        Ok(ty) => Some(ty),
        Err(err) => {
            report(&err, diagnostics);
            None
        }
    }
}
