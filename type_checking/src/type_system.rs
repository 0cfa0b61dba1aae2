use crate::type_error::TypeError;
use failure::Fail;
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    sync::Arc,
};

/// Errors raised while the type universe is being declared.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum TypeSystemError {
    #[fail(display = "class {} is already declared", name)]
    ClassAlreadyDeclared { name: String },
    #[fail(display = "method {}.{}() is already declared", class, method)]
    MethodAlreadyDeclared { class: String, method: String },
    #[fail(display = "supertype {} of class {} is not declared", supertype, class)]
    UnknownSupertype { class: String, supertype: String },
    #[fail(display = "class {} is not declared in this type system", name)]
    UnknownClass { name: String },
}

/// Owns every object type and its method signatures.
///
/// Classes are appended once and never removed. A class can only name
/// supertypes that were added before it, so the hierarchy is always acyclic.
#[derive(Debug, Default)]
pub struct TypeSystem {
    defined_classes: Vec<ClassDef>,
    class_ids: HashMap<Arc<str>, ClassDefId>,
}

impl TypeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_type_defined(&self, name: &str) -> bool {
        self.class_ids.contains_key(name)
    }

    pub fn add_class_def(&mut self, class_def: ClassDef) -> Result<ClassDefId, TypeSystemError> {
        for supertype in &class_def.supertypes {
            if !self.owns(supertype) {
                return Err(TypeSystemError::UnknownSupertype {
                    class: class_def.name.to_string(),
                    supertype: supertype.to_string(),
                });
            }
        }

        let id = ClassDefId {
            index: self.defined_classes.len(),
            name: Arc::clone(&class_def.name),
        };

        match self.class_ids.entry(Arc::clone(&class_def.name)) {
            Entry::Occupied(_) => {
                return Err(TypeSystemError::ClassAlreadyDeclared {
                    name: class_def.name.to_string(),
                })
            }
            Entry::Vacant(e) => e.insert(id.clone()),
        };

        log::debug!(
            "declared class {} with {} method(s)",
            class_def.name,
            class_def.methods.len()
        );
        self.defined_classes.push(class_def);
        Ok(id)
    }

    /// Only meant for completing classes during setup, e.g. to add a method
    /// whose signature mentions a class declared later.
    pub fn class_mut(&mut self, id: &ClassDefId) -> Result<&mut ClassDef, TypeSystemError> {
        self.defined_classes
            .get_mut(id.index)
            .filter(|class_def| class_def.name == id.name)
            .ok_or_else(|| TypeSystemError::UnknownClass {
                name: id.name.to_string(),
            })
    }

    fn get_class(&self, id: &ClassDefId) -> Option<&ClassDef> {
        self.defined_classes
            .get(id.index)
            .filter(|class_def| class_def.name == id.name)
    }

    fn owns(&self, id: &ClassDefId) -> bool {
        self.get_class(id).is_some()
    }

    pub fn lookup_class(&self, name: &str) -> Option<(&ClassDef, ClassDefId)> {
        self.class_ids
            .get(name)
            .map(|id| (&self.defined_classes[id.index], id.clone()))
    }

    pub fn defined_classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.defined_classes.iter()
    }

    /// Whether `sub` is `sup` or reaches it through declared supertype edges.
    pub fn derives_from(&self, sub: &ClassDefId, sup: &ClassDefId) -> bool {
        if sub == sup {
            return true;
        }

        match self.get_class(sub) {
            Some(class_def) => class_def
                .supertypes
                .iter()
                .any(|supertype| self.derives_from(supertype, sup)),
            None => false,
        }
    }

    pub fn is_subtype(&self, sub: &CheckedType, sup: &CheckedType) -> bool {
        use self::CheckedType::*;

        match (sub, sup) {
            _ if sub == sup => true,
            (Null, sup) if sup.is_reference() => true,
            (TypeRef(sub), TypeRef(sup)) => self.derives_from(sub, sup),
            _ => false,
        }
    }

    /// Looks `method_name` up on `ty`, then on its supertypes in declaration
    /// order.
    pub fn get_method(
        &self,
        ty: &CheckedType,
        method_name: &str,
    ) -> Result<&ClassMethodDef, TypeError> {
        ty.class_id()
            .and_then(|id| self.find_method(id, method_name))
            .ok_or_else(|| TypeError::NoSuchMethod {
                ty: ty.clone(),
                method_name: method_name.to_string(),
                similar: self.similar_method_name(ty, method_name),
            })
    }

    fn find_method(&self, id: &ClassDefId, method_name: &str) -> Option<&ClassMethodDef> {
        let class_def = self.get_class(id)?;
        class_def.method(method_name).or_else(|| {
            class_def
                .supertypes
                .iter()
                .find_map(|supertype| self.find_method(supertype, method_name))
        })
    }

    /// All methods callable on `ty`, inherited ones included.
    pub fn visible_methods(&self, ty: &CheckedType) -> Vec<&ClassMethodDef> {
        let mut methods = Vec::new();
        if let Some(id) = ty.class_id() {
            self.collect_methods(id, &mut methods);
        }
        methods
    }

    fn collect_methods<'ts>(&'ts self, id: &ClassDefId, acc: &mut Vec<&'ts ClassMethodDef>) {
        if let Some(class_def) = self.get_class(id) {
            for method in class_def.iter_methods() {
                if !acc.iter().any(|seen| seen.name == method.name) {
                    acc.push(method);
                }
            }
            for supertype in &class_def.supertypes {
                self.collect_methods(supertype, acc);
            }
        }
    }

    fn similar_method_name(&self, ty: &CheckedType, method_name: &str) -> Option<String> {
        self.visible_methods(ty)
            .into_iter()
            .map(|method| {
                (
                    levenshtein::levenshtein(&method.name, method_name),
                    &method.name,
                )
            })
            .filter(|(distance, _)| *distance <= MAX_SIMILAR_NAME_DISTANCE)
            .min()
            .map(|(_, name)| name.clone())
    }
}

const MAX_SIMILAR_NAME_DISTANCE: usize = 2;

/// A `ClassDefId` refers to a class definition.
///
/// Having an instance of this struct ensures that
/// the type system that issued this instance can
/// provide the definition of that class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassDefId {
    index: usize,
    name: Arc<str>,
}

impl From<ClassDefId> for CheckedType {
    fn from(id: ClassDefId) -> CheckedType {
        CheckedType::TypeRef(id)
    }
}

impl fmt::Display for ClassDefId {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub struct ClassDef {
    pub name: Arc<str>,
    supertypes: Vec<ClassDefId>,
    methods: HashMap<String, ClassMethodDef>,
}

impl ClassDef {
    pub fn new(name: &str) -> ClassDef {
        ClassDef::with_supertypes(name, vec![])
    }

    pub fn with_supertypes(name: &str, supertypes: Vec<ClassDefId>) -> ClassDef {
        ClassDef {
            name: Arc::from(name),
            supertypes,
            methods: HashMap::new(),
        }
    }

    pub fn add_method(&mut self, method: ClassMethodDef) -> Result<(), TypeSystemError> {
        match self.methods.entry(method.name.clone()) {
            Entry::Occupied(_) => {
                return Err(TypeSystemError::MethodAlreadyDeclared {
                    class: self.name.to_string(),
                    method: method.name,
                })
            }
            Entry::Vacant(e) => e.insert(method),
        };
        Ok(())
    }

    /// Only methods declared on this class, not inherited ones.
    pub fn method(&self, name: &str) -> Option<&ClassMethodDef> {
        self.methods.get(name)
    }

    pub fn iter_methods(&self) -> impl Iterator<Item = &ClassMethodDef> {
        self.methods.values()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethodDef {
    pub name: String,
    pub params: Vec<MethodParamDef>,
    pub return_ty: CheckedType,
}

impl ClassMethodDef {
    /// Declares a method from its parameter types alone; parameters are named
    /// `arg0`, `arg1`, ...
    pub fn new(
        name: &str,
        param_types: impl IntoIterator<Item = CheckedType>,
        return_ty: CheckedType,
    ) -> ClassMethodDef {
        let params = param_types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| MethodParamDef::new(&format!("arg{}", i), ty))
            .collect();
        ClassMethodDef::with_params(name, params, return_ty)
    }

    pub fn with_params(
        name: &str,
        params: Vec<MethodParamDef>,
        return_ty: CheckedType,
    ) -> ClassMethodDef {
        ClassMethodDef {
            name: name.to_string(),
            params,
            return_ty,
        }
    }

    pub fn param_types(&self) -> impl Iterator<Item = &CheckedType> {
        self.params.iter().map(|param| &param.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParamDef {
    pub name: String,
    pub ty: CheckedType,
}

impl MethodParamDef {
    pub fn new(name: &str, ty: CheckedType) -> MethodParamDef {
        MethodParamDef {
            name: name.to_string(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckedType {
    Void,
    Null,
    Boolean,
    Int,
    Double,
    TypeRef(ClassDefId),
}

impl CheckedType {
    /// Object types, i.e. everything `null` can be assigned to.
    pub fn is_reference(&self) -> bool {
        match self {
            CheckedType::TypeRef(_) => true,
            _ => false,
        }
    }

    pub fn class_id(&self) -> Option<&ClassDefId> {
        match self {
            CheckedType::TypeRef(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_subtype_of(&self, other: &CheckedType, ts: &TypeSystem) -> bool {
        ts.is_subtype(self, other)
    }

    pub fn get_method<'ts>(
        &self,
        method_name: &str,
        ts: &'ts TypeSystem,
    ) -> Result<&'ts ClassMethodDef, TypeError> {
        ts.get_method(self, method_name)
    }
}

impl fmt::Display for CheckedType {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        use self::CheckedType::*;
        match self {
            Void => write!(f, "void"),
            Null => write!(f, "null"),
            Boolean => write!(f, "boolean"),
            Int => write!(f, "int"),
            Double => write!(f, "double"),
            TypeRef(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeErrorKind;

    /// `Shape <- Rectangle`, `Paint <- Color`, and `Square` implementing both
    /// `Rectangle` and `Paint`.
    fn shapes() -> (TypeSystem, CheckedType, CheckedType, CheckedType, CheckedType) {
        let mut ts = TypeSystem::new();

        let mut shape = ClassDef::new("Shape");
        shape
            .add_method(ClassMethodDef::new("area", vec![], CheckedType::Double))
            .unwrap();
        let shape = ts.add_class_def(shape).unwrap();

        let mut rectangle = ClassDef::with_supertypes("Rectangle", vec![shape.clone()]);
        rectangle
            .add_method(ClassMethodDef::new(
                "setSize",
                vec![CheckedType::Double, CheckedType::Double],
                CheckedType::Void,
            ))
            .unwrap();
        let rectangle = ts.add_class_def(rectangle).unwrap();

        let paint = ts.add_class_def(ClassDef::new("Paint")).unwrap();
        let square = ts
            .add_class_def(ClassDef::with_supertypes(
                "Square",
                vec![rectangle.clone(), paint.clone()],
            ))
            .unwrap();

        (ts, shape.into(), rectangle.into(), paint.into(), square.into())
    }

    #[test]
    fn subtyping_is_reflexive() {
        let (ts, shape, rectangle, paint, square) = shapes();
        let all = vec![
            CheckedType::Void,
            CheckedType::Null,
            CheckedType::Boolean,
            CheckedType::Int,
            CheckedType::Double,
            shape,
            rectangle,
            paint,
            square,
        ];
        for ty in &all {
            assert!(ty.is_subtype_of(ty, &ts), "{} is not a subtype of itself", ty);
        }
    }

    #[test]
    fn null_is_subtype_of_references_only() {
        let (ts, shape, rectangle, paint, square) = shapes();
        for reference in &[shape, rectangle, paint, square] {
            assert!(CheckedType::Null.is_subtype_of(reference, &ts));
            assert!(!reference.is_subtype_of(&CheckedType::Null, &ts));
        }
        for primitive in &[
            CheckedType::Boolean,
            CheckedType::Int,
            CheckedType::Double,
            CheckedType::Void,
        ] {
            assert!(!CheckedType::Null.is_subtype_of(primitive, &ts));
        }
    }

    #[test]
    fn primitives_do_not_widen() {
        let ts = TypeSystem::new();
        assert!(!CheckedType::Int.is_subtype_of(&CheckedType::Double, &ts));
        assert!(!CheckedType::Boolean.is_subtype_of(&CheckedType::Int, &ts));
        assert!(!CheckedType::Int.is_subtype_of(&CheckedType::Void, &ts));
    }

    #[test]
    fn subtyping_follows_transitive_and_multiple_supertypes() {
        let (ts, shape, rectangle, paint, square) = shapes();
        assert!(rectangle.is_subtype_of(&shape, &ts));
        assert!(square.is_subtype_of(&shape, &ts));
        assert!(square.is_subtype_of(&paint, &ts));
        assert!(!shape.is_subtype_of(&rectangle, &ts));
        assert!(!paint.is_subtype_of(&shape, &ts));
        assert!(!rectangle.is_subtype_of(&paint, &ts));
    }

    #[test]
    fn methods_are_inherited() {
        let (ts, _, rectangle, _, square) = shapes();

        let area = square.get_method("area", &ts).unwrap();
        assert_eq!(area.return_ty, CheckedType::Double);
        assert!(area.params.is_empty());

        let set_size = rectangle.get_method("setSize", &ts).unwrap();
        assert_eq!(
            set_size.param_types().cloned().collect::<Vec<_>>(),
            vec![CheckedType::Double, CheckedType::Double]
        );
        assert_eq!(set_size.params[1].name, "arg1");
    }

    #[test]
    fn missing_method_names_type_and_method() {
        let (ts, shape, ..) = shapes();
        let err = shape.get_method("setSize", &ts).unwrap_err();
        assert_eq!(err.kind(), TypeErrorKind::NoSuchMethod);
        assert_eq!(err.to_string(), "Shape has no method named setSize");
    }

    #[test]
    fn primitives_have_no_methods() {
        let ts = TypeSystem::new();
        let err = CheckedType::Int.get_method("toString", &ts).unwrap_err();
        assert_eq!(err.to_string(), "int has no method named toString");

        let err = CheckedType::Null.get_method("equals", &ts).unwrap_err();
        assert_eq!(err.to_string(), "null has no method named equals");
    }

    #[test]
    fn similar_method_names_are_suggested() {
        let (ts, _, _, _, square) = shapes();
        match square.get_method("setSise", &ts) {
            Err(TypeError::NoSuchMethod { similar, .. }) => {
                assert_eq!(similar, Some("setSize".to_string()))
            }
            other => panic!("unexpected lookup result {:?}", other),
        }
        match square.get_method("perimeter", &ts) {
            Err(TypeError::NoSuchMethod { similar, .. }) => assert_eq!(similar, None),
            other => panic!("unexpected lookup result {:?}", other),
        }
    }

    #[test]
    fn redeclarations_are_rejected() {
        let (mut ts, ..) = shapes();
        assert_eq!(
            ts.add_class_def(ClassDef::new("Paint")).unwrap_err(),
            TypeSystemError::ClassAlreadyDeclared {
                name: "Paint".to_string()
            }
        );

        let mut class_def = ClassDef::new("Circle");
        class_def
            .add_method(ClassMethodDef::new("radius", vec![], CheckedType::Double))
            .unwrap();
        let err = class_def
            .add_method(ClassMethodDef::new("radius", vec![], CheckedType::Int))
            .unwrap_err();
        assert_eq!(err.to_string(), "method Circle.radius() is already declared");
    }

    #[test]
    fn supertypes_must_belong_to_the_type_system() {
        let (_, shape, ..) = shapes();
        let mut other = TypeSystem::new();
        let foreign = shape.class_id().unwrap().clone();
        let err = other
            .add_class_def(ClassDef::with_supertypes("Circle", vec![foreign]))
            .unwrap_err();
        assert_eq!(
            err,
            TypeSystemError::UnknownSupertype {
                class: "Circle".to_string(),
                supertype: "Shape".to_string(),
            }
        );
        assert!(!other.is_type_defined("Circle"));
    }

    #[test]
    fn foreign_ids_cannot_be_completed() {
        let (mut ts, shape, ..) = shapes();
        let mut other = TypeSystem::new();
        other.add_class_def(ClassDef::new("Circle")).unwrap();

        // same index as `Circle`, different class
        let foreign = shape.class_id().unwrap();
        assert_eq!(
            other.class_mut(foreign).unwrap_err(),
            TypeSystemError::UnknownClass {
                name: "Shape".to_string()
            }
        );
        assert!(other.lookup_class("Circle").unwrap().0.method("area").is_none());

        let own = ts.class_mut(foreign).unwrap();
        own.add_method(ClassMethodDef::new("perimeter", vec![], CheckedType::Double))
            .unwrap();
        assert!(shape.get_method("perimeter", &ts).is_ok());
    }

    #[test]
    fn lookup_class_by_name() {
        let (ts, _, rectangle, ..) = shapes();
        let (class_def, id) = ts.lookup_class("Rectangle").unwrap();
        assert_eq!(&*class_def.name, "Rectangle");
        assert_eq!(CheckedType::from(id), rectangle);
        assert!(ts.lookup_class("Circle").is_none());
        assert_eq!(ts.defined_classes().count(), 4);
    }
}
