use super::{expr::*, type_error::*, type_system::*};

/// Walks expression trees against one type system.
///
/// `type_expr` answers "what is the static type", `check_expr` enforces the
/// typing rules of each node and its subtree. Neither mutates the tree or the
/// type system, and checking stops at the first error.
#[derive(Debug, Clone, Copy)]
pub struct ExprTypeChecker<'ts> {
    type_system: &'ts TypeSystem,
}

impl<'ts> ExprTypeChecker<'ts> {
    pub fn new(type_system: &'ts TypeSystem) -> Self {
        ExprTypeChecker { type_system }
    }

    /// Defined for unchecked trees too, but only meaningful once `check_expr`
    /// succeeded. Fails only if a method call does not resolve.
    pub fn type_expr(&self, expr: &Expr) -> Result<CheckedType, TypeError> {
        match expr {
            Expr::Var(var) => Ok(var.ty.clone()),
            Expr::Literal(literal) => Ok(literal.ty.clone()),
            // an assignment has the value and type of its target
            Expr::Assign(assign) => Ok(assign.lhs.ty.clone()),
            Expr::MethodCall(call) => {
                let receiver_ty = self.type_expr(&call.receiver)?;
                let method = self
                    .type_system
                    .get_method(&receiver_ty, &call.method_name)?;
                Ok(method.return_ty.clone())
            }
            Expr::NewObject(new) => Ok(new.ty.clone()),
        }
    }

    pub fn check_expr(&self, expr: &Expr) -> Result<(), TypeError> {
        log::trace!("checking {:?} `{}`", expr.kind(), expr);

        let result = match expr {
            Expr::Var(_) | Expr::Literal(_) => Ok(()),
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::MethodCall(call) => self.check_method_call(call),
            // IMPROVEMENT: match the arguments against constructor signatures
            // and reject non-instantiable types once those are modeled
            Expr::NewObject(_) => Ok(()),
        };

        if let Err(err) = &result {
            log::debug!("`{}` is ill-typed: {}", expr, err);
        }
        result
    }

    fn check_assign(&self, assign: &Assign) -> Result<(), TypeError> {
        // the target is a plain variable, there is nothing to check on it
        let rhs = &*assign.rhs;
        self.check_expr(rhs)?;

        let var_ty = &assign.lhs.ty;
        let value_ty = self.type_expr(rhs)?;

        if !value_ty.is_subtype_of(var_ty, self.type_system) {
            return Err(Mismatch::Assignment {
                value_ty,
                var_name: assign.lhs.name.clone(),
                var_ty: var_ty.clone(),
            }
            .into());
        }

        Ok(())
    }

    fn check_method_call(&self, call: &MethodCall) -> Result<(), TypeError> {
        self.check_expr(&call.receiver)?;
        let receiver_ty = self.type_expr(&call.receiver)?;

        let method = self
            .type_system
            .get_method(&receiver_ty, &call.method_name)?;

        // arity first, so that no argument is checked against the wrong
        // parameter
        if method.params.len() != call.args.len() {
            return Err(TypeError::ArgumentCount {
                ty: receiver_ty,
                method_name: call.method_name.clone(),
                expected: method.params.len(),
                actual: call.args.len(),
            });
        }

        let mut actual = TypeList::default();
        for (arg, param) in call.args.iter().zip(&method.params) {
            self.check_expr(arg)?;
            let arg_ty = self.type_expr(arg)?;
            let conforms = arg_ty.is_subtype_of(&param.ty, self.type_system);
            actual.push(arg_ty);

            if !conforms {
                return Err(Mismatch::Arguments {
                    ty: receiver_ty,
                    method_name: call.method_name.clone(),
                    expected: method.param_types().cloned().collect(),
                    actual,
                }
                .into());
            }
        }

        Ok(())
    }
}

impl Expr {
    /// See [`ExprTypeChecker::type_expr`].
    pub fn static_type(&self, type_system: &TypeSystem) -> Result<CheckedType, TypeError> {
        ExprTypeChecker::new(type_system).type_expr(self)
    }

    /// See [`ExprTypeChecker::check_expr`].
    pub fn check_types(&self, type_system: &TypeSystem) -> Result<(), TypeError> {
        ExprTypeChecker::new(type_system).check_expr(self)
    }
}
