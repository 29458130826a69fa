use crate::{
    error::TypeDefinitionError,
    types::{ConstructorDescription, FieldDescription, TypeDescription, TypeShape},
};

/// Fluent construction of a class or interface shape.
///
/// Obtained from [`TypeRegistry::class`](crate::types::TypeRegistry::class) and
/// friends for fresh types, or from
/// [`TypeRegistry::define`](crate::types::TypeRegistry::define) for a type that
/// was forward-declared.
#[must_use]
pub struct TypeBuilder {
    ty: TypeDescription,
    shape: TypeShape,
}

impl TypeBuilder {
    pub(crate) fn new(ty: TypeDescription, base: Option<TypeDescription>) -> Self {
        Self {
            ty,
            shape: TypeShape {
                base,
                ..TypeShape::default()
            },
        }
    }

    pub fn ty(&self) -> TypeDescription {
        self.ty
    }

    pub fn extends(mut self, base: TypeDescription) -> Self {
        self.shape.base = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeDescription) -> Self {
        self.shape.interfaces.push(interface);
        self
    }

    pub fn constructor(mut self, ctor: ConstructorDescription) -> Self {
        self.shape.constructors.push(ctor);
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDescription) -> Self {
        self.shape.fields.push(FieldDescription {
            name: name.into(),
            ty,
            writable: true,
        });
        self
    }

    pub fn readonly_field(mut self, name: impl Into<String>, ty: TypeDescription) -> Self {
        self.shape.fields.push(FieldDescription {
            name: name.into(),
            ty,
            writable: false,
        });
        self
    }

    pub fn try_build(self) -> Result<TypeDescription, TypeDefinitionError> {
        self.ty.define(self.shape)?;
        Ok(self.ty)
    }

    /// Attaches the shape, logging instead of failing when the type already
    /// has one.
    pub fn build(self) -> TypeDescription {
        let ty = self.ty;
        if let Err(e) = self.try_build() {
            tracing::warn!(%e, "type shape was not attached");
        }
        ty
    }
}
