use super::type_system::*;

/// Handles to the types every Java program can use without declaring them.
#[derive(Debug, Clone)]
pub struct BuiltinTypes {
    pub void: CheckedType,
    pub null: CheckedType,
    pub boolean: CheckedType,
    pub int: CheckedType,
    pub double: CheckedType,
    pub object: CheckedType,
    pub string: CheckedType,
}

impl BuiltinTypes {
    /// Declares `Object` and `String` together with their methods.
    pub fn add_to(type_system: &mut TypeSystem) -> Result<BuiltinTypes, TypeSystemError> {
        let object_class_id = type_system.add_class_def(ClassDef::new("Object"))?;
        let object_ty = CheckedType::from(object_class_id.clone());

        let string_class_id = {
            let mut string_class_def =
                ClassDef::with_supertypes("String", vec![object_class_id.clone()]);
            string_class_def.add_method(ClassMethodDef::new(
                "length",
                vec![],
                CheckedType::Int,
            ))?;
            string_class_def.add_method(ClassMethodDef::new(
                "isEmpty",
                vec![],
                CheckedType::Boolean,
            ))?;
            type_system.add_class_def(string_class_def)?
        };
        let string_ty = CheckedType::from(string_class_id.clone());

        // `toString` mentions `String`, so `Object` is completed afterwards
        type_system
            .class_mut(&string_class_id)?
            .add_method(ClassMethodDef::with_params(
                "concat",
                vec![MethodParamDef::new("str", string_ty.clone())],
                string_ty.clone(),
            ))?;
        let object_class_def = type_system.class_mut(&object_class_id)?;
        object_class_def.add_method(ClassMethodDef::with_params(
            "equals",
            vec![MethodParamDef::new("obj", object_ty.clone())],
            CheckedType::Boolean,
        ))?;
        object_class_def.add_method(ClassMethodDef::new(
            "hashCode",
            vec![],
            CheckedType::Int,
        ))?;
        object_class_def.add_method(ClassMethodDef::new(
            "toString",
            vec![],
            string_ty.clone(),
        ))?;

        Ok(BuiltinTypes {
            void: CheckedType::Void,
            null: CheckedType::Null,
            boolean: CheckedType::Boolean,
            int: CheckedType::Int,
            double: CheckedType::Double,
            object: object_ty,
            string: string_ty,
        })
    }
}

impl TypeSystem {
    /// A fresh type system that only knows the built-in types.
    pub fn with_builtins() -> (TypeSystem, BuiltinTypes) {
        let mut type_system = TypeSystem::new();
        let builtin_types = BuiltinTypes::add_to(&mut type_system)
            .expect("An empty type system has no conflicting classes");
        (type_system, builtin_types)
    }
}
