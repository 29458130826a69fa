use crate::{
    activation::Activator,
    resolve::InstanceResolver,
    source::{Node, SourceValue},
    types::{ConstructorDescription, TypeDescription},
    utils::names_match,
    value::{convert::parse_scalar, ObjectRef, Value},
};

/// Whether values of `ty` are written as text rather than as nested objects.
pub(crate) fn accepts_text(ty: TypeDescription) -> bool {
    let ty = ty.nullable_inner().unwrap_or(ty);
    ty.is_primitive_like() || ty.enum_definition().is_some()
}

impl Activator<'_> {
    /// A field of the container with this name and exactly this type.
    fn from_container(&self, name: &str, ty: TypeDescription) -> Option<Value> {
        if !self.config().container_binding {
            return None;
        }
        let fields = self.container()?.fields();
        let matching = |exact: bool| {
            fields.iter().find(|(n, t, _)| {
                *t == ty && (if exact { n == name } else { names_match(n, name) })
            })
        };
        matching(true)
            .or_else(|| matching(false))
            .map(|(_, _, value)| value.clone())
    }

    fn from_structured(
        &self,
        node: &Node,
        ty: TypeDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Option<Value> {
        if accepts_text(ty) {
            return self.from_text(&node.name, node.inner_text(), ty);
        }
        let nested = Activator::from_node(self.registry(), ty, node, self.config().clone());
        match nested.create_instance(fallback) {
            Ok(object) => Some(Value::Object(object)),
            Err(e) => {
                tracing::debug!(source = %node.name, %ty, error = %e, "nested construction failed");
                None
            }
        }
    }

    fn from_text(&self, name: &str, text: &str, ty: TypeDescription) -> Option<Value> {
        match parse_scalar(text, ty) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(source = %name, %ty, error = %e, "source value not convertible");
                None
            }
        }
    }

    /// Binding steps shared by parameters and fields: the container, then the
    /// best named source.
    fn from_sources(
        &self,
        name: &str,
        ty: TypeDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Option<Value> {
        if let Some(value) = self.from_container(name, ty) {
            tracing::trace!(name, "bound from container");
            return Some(value);
        }
        let source = self.sources().find(name)?;
        let value = match &source.value {
            SourceValue::Scalar(text) => self.from_text(&source.name, text, ty),
            SourceValue::Structured(node) => self.from_structured(node, ty, fallback),
        };
        if value.is_some() {
            tracing::trace!(name, source = %source.name, "bound from named source");
        }
        value
    }

    pub(crate) fn bind_arguments(
        &self,
        constructor: &ConstructorDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Vec<Value> {
        constructor
            .parameters
            .iter()
            .map(|param| {
                if let Some(value) = self.from_sources(&param.name, param.ty, fallback) {
                    return value;
                }
                let resolved = fallback
                    .filter(|f| f.can_resolve(param.ty))
                    .and_then(|f| f.resolve(param.ty));
                if let Some(object) = resolved {
                    tracing::trace!(parameter = %param.name, "bound from fallback resolver");
                    return Value::Object(object);
                }
                tracing::debug!(
                    parameter = %param.name,
                    ty = %param.ty,
                    "no source; using default"
                );
                param.default_value()
            })
            .collect()
    }

    /// Assigns writable fields that were not constructor parameters. Values
    /// come from sources only; failed assignments are dropped.
    pub(crate) fn populate_fields(
        &self,
        object: &ObjectRef,
        constructor: &ConstructorDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) {
        let ty = object.ty();
        for field in ty.fields().into_iter().filter(|f| f.writable) {
            let consumed = constructor
                .parameters
                .iter()
                .any(|p| names_match(&p.name, &field.name));
            if consumed {
                continue;
            }
            let Some(value) = self.from_sources(&field.name, field.ty, fallback) else {
                continue;
            };
            if let Err(e) = object.set_field(&field.name, value) {
                tracing::warn!(%ty, field = %field.name, error = %e, "field assignment skipped");
            }
        }
    }
}
