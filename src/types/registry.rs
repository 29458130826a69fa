use crate::{
    error::TypeLookupError,
    types::{EnumDefinition, PrimitiveKind, TypeBuilder, TypeDescription, TypeKind},
    utils::names_match,
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Owns every type known to a program: the Object root, the primitives, their
/// nullable forms and user-declared types.
pub struct TypeRegistry {
    object: TypeDescription,
    primitives: HashMap<PrimitiveKind, TypeDescription>,
    nullables: RwLock<HashMap<TypeDescription, TypeDescription>>,
    types: Vec<TypeDescription>,
    by_name: HashMap<String, TypeDescription>,
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types)
            .field("nullables", &self.nullables.read().len())
            .finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let object = TypeDescription::leak("System.Object", TypeKind::Object);
        let mut by_name = HashMap::new();
        by_name.insert(object.name().to_string(), object);
        by_name.insert("Object".to_string(), object);
        by_name.insert("object".to_string(), object);

        let mut primitives = HashMap::new();
        for &kind in PrimitiveKind::ALL {
            let ty = TypeDescription::leak(kind.full_name(), TypeKind::Primitive(kind));
            by_name.insert(kind.full_name(), ty);
            by_name.insert(kind.name().to_string(), ty);
            for alias in kind.aliases() {
                by_name.insert(alias.to_string(), ty);
            }
            primitives.insert(kind, ty);
        }

        Self {
            object,
            primitives,
            nullables: RwLock::new(HashMap::new()),
            types: vec![],
            by_name,
        }
    }

    pub fn object(&self) -> TypeDescription {
        self.object
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeDescription {
        self.primitives[&kind]
    }

    /// The nullable form of a value type. Reference types are already
    /// nullable and are returned unchanged.
    pub fn nullable(&self, inner: TypeDescription) -> TypeDescription {
        if inner.is_nullable() {
            return inner;
        }
        if let Some(ty) = self.nullables.read().get(&inner) {
            return *ty;
        }
        *self
            .nullables
            .write()
            .entry(inner)
            .or_insert_with(|| {
                TypeDescription::leak(format!("{}?", inner.name()), TypeKind::Nullable(inner))
            })
    }

    /// User-declared types in declaration order.
    pub fn types(&self) -> &[TypeDescription] {
        &self.types
    }

    fn register(&mut self, ty: TypeDescription) -> TypeDescription {
        if let Some(previous) = self.by_name.insert(ty.name().to_string(), ty) {
            tracing::warn!(name = ty.name(), ?previous, "type name redeclared");
        }
        self.types.push(ty);
        ty
    }

    /// Declares a type without a shape; attach one later with [`Self::define`].
    pub fn declare(&mut self, name: &str, kind: TypeKind) -> TypeDescription {
        self.register(TypeDescription::leak(name, kind))
    }

    /// Starts the shape of a forward-declared type.
    pub fn define(&self, ty: TypeDescription) -> TypeBuilder {
        let base = match ty.kind() {
            TypeKind::Class { .. } => Some(self.object),
            _ => None,
        };
        TypeBuilder::new(ty, base)
    }

    pub fn class(&mut self, name: &str) -> TypeBuilder {
        let ty = self.declare(name, TypeKind::Class { is_abstract: false });
        self.define(ty)
    }

    pub fn abstract_class(&mut self, name: &str) -> TypeBuilder {
        let ty = self.declare(name, TypeKind::Class { is_abstract: true });
        self.define(ty)
    }

    pub fn interface(&mut self, name: &str) -> TypeBuilder {
        let ty = self.declare(name, TypeKind::Interface);
        self.define(ty)
    }

    pub fn enumeration(
        &mut self,
        name: &str,
        flags: bool,
        members: impl IntoIterator<Item = (impl Into<String>, u64)>,
    ) -> TypeDescription {
        let members = members.into_iter().map(|(n, v)| (n.into(), v)).collect();
        self.declare(name, TypeKind::Enum(EnumDefinition { flags, members }))
    }

    /// Looks a type up by full name, then by unique simple name, then
    /// case-insensitively. A trailing `?` asks for the nullable form.
    pub fn find_type(&self, name: &str) -> Result<TypeDescription, TypeLookupError> {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix('?') {
            return self.find_type(inner).map(|t| self.nullable(t));
        }
        if name.is_empty() {
            return Err(TypeLookupError::NotFound(name.to_string()));
        }
        if let Some(ty) = self.by_name.get(name) {
            return Ok(*ty);
        }

        let by_simple: Vec<_> = self
            .types
            .iter()
            .filter(|t| t.simple_name() == name)
            .copied()
            .collect();
        match by_simple.as_slice() {
            [ty] => return Ok(*ty),
            [] => {}
            many => {
                return Err(TypeLookupError::AmbiguousName {
                    name: name.to_string(),
                    candidates: many.len(),
                })
            }
        }

        let folded: Vec<_> = self
            .by_name
            .iter()
            .filter(|(n, _)| names_match(n, name))
            .map(|(_, t)| *t)
            .chain(
                self.types
                    .iter()
                    .filter(|t| names_match(t.simple_name(), name))
                    .copied(),
            )
            .fold(vec![], |mut acc, t| {
                if !acc.contains(&t) {
                    acc.push(t);
                }
                acc
            });
        match folded.as_slice() {
            [ty] => Ok(*ty),
            [] => Err(TypeLookupError::NotFound(name.to_string())),
            many => Err(TypeLookupError::AmbiguousName {
                name: name.to_string(),
                candidates: many.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_primitives_by_any_name() {
        let reg = TypeRegistry::new();
        let int = reg.primitive(PrimitiveKind::Int32);
        assert_eq!(reg.find_type("System.Int32").unwrap(), int);
        assert_eq!(reg.find_type("Int32").unwrap(), int);
        assert_eq!(reg.find_type("int").unwrap(), int);
        assert_eq!(reg.find_type("object").unwrap(), reg.object());
    }

    #[test]
    fn nullable_forms_are_cached() {
        let reg = TypeRegistry::new();
        let int = reg.primitive(PrimitiveKind::Int32);
        let a = reg.find_type("int?").unwrap();
        let b = reg.nullable(int);
        assert_eq!(a, b);
        assert_eq!(a.nullable_inner(), Some(int));
        assert!(a.is_primitive_like());

        let string = reg.primitive(PrimitiveKind::String);
        assert_eq!(reg.nullable(string), string);
    }

    #[test]
    fn simple_names_must_be_unique() {
        let mut reg = TypeRegistry::new();
        let a = reg.interface("One.Shape").build();
        assert_eq!(reg.find_type("Shape").unwrap(), a);
        assert_eq!(reg.find_type("one.shape").unwrap(), a);

        reg.interface("Two.Shape").build();
        assert!(matches!(
            reg.find_type("Shape"),
            Err(TypeLookupError::AmbiguousName { candidates: 2, .. })
        ));
        assert!(matches!(
            reg.find_type("Three.Shape"),
            Err(TypeLookupError::NotFound(_))
        ));
    }
}
