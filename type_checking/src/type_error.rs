//! Static type errors raised while checking an expression tree.
//!
//! Checking stops at the first error, so a walk yields at most one of these.
use crate::type_system::CheckedType;
use failure::Fail;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Fail, Clone, PartialEq)]
pub enum TypeError {
    #[fail(display = "{}", _0)]
    TypeMismatch(Mismatch),
    #[fail(
        display = "Wrong number of arguments for {}.{}(): expected {}, got {}",
        ty, method_name, expected, actual
    )]
    ArgumentCount {
        ty: CheckedType,
        method_name: String,
        expected: usize,
        actual: usize,
    },
    #[fail(display = "{} has no method named {}", ty, method_name)]
    NoSuchMethod {
        ty: CheckedType,
        method_name: String,
        /// closest visible method name, if any is close enough
        similar: Option<String>,
    },
    /// Not raised yet: there is no model of abstract classes or constructors.
    #[fail(display = "Type {} is not instantiable", ty)]
    IllegalInstantiation { ty: CheckedType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeErrorKind {
    TypeMismatch,
    ArgumentCount,
    NoSuchMethod,
    IllegalInstantiation,
}

impl TypeError {
    pub fn kind(&self) -> TypeErrorKind {
        match self {
            TypeError::TypeMismatch(_) => TypeErrorKind::TypeMismatch,
            TypeError::ArgumentCount { .. } => TypeErrorKind::ArgumentCount,
            TypeError::NoSuchMethod { .. } => TypeErrorKind::NoSuchMethod,
            TypeError::IllegalInstantiation { .. } => TypeErrorKind::IllegalInstantiation,
        }
    }

    /// Additional hint to print below the message.
    pub fn help(&self) -> Option<String> {
        match self {
            TypeError::NoSuchMethod {
                similar: Some(name),
                ..
            } => Some(format!("a method with a similar name exists: `{}`", name)),
            _ => None,
        }
    }
}

impl From<Mismatch> for TypeError {
    fn from(mismatch: Mismatch) -> Self {
        TypeError::TypeMismatch(mismatch)
    }
}

#[derive(Debug, Fail, Clone, PartialEq)]
pub enum Mismatch {
    #[fail(
        display = "Cannot assign {} to variable {} of type {}",
        value_ty, var_name, var_ty
    )]
    Assignment {
        value_ty: CheckedType,
        var_name: String,
        var_ty: CheckedType,
    },
    /// `expected` is the full parameter list, `actual` the argument types up
    /// to and including the offending one.
    #[fail(
        display = "{}.{}() expects arguments of type ({}), but got ({})",
        ty, method_name, expected, actual
    )]
    Arguments {
        ty: CheckedType,
        method_name: String,
        expected: TypeList,
        actual: TypeList,
    },
}

/// Comma separated list of type names, as printed in signatures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeList(pub Vec<CheckedType>);

impl TypeList {
    pub fn push(&mut self, ty: CheckedType) {
        self.0.push(ty)
    }
}

impl fmt::Display for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

impl std::iter::FromIterator<CheckedType> for TypeList {
    fn from_iter<I: IntoIterator<Item = CheckedType>>(iter: I) -> Self {
        TypeList(iter.into_iter().collect())
    }
}
