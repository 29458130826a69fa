//! Construction of objects from named values.
//!
//! An [`Activator`] builds one object: it picks the concrete type (from a
//! type indicator, a configured default or the declared type itself), ranks
//! the constructors of that type against the available sources, binds every
//! parameter and finally fills the remaining writable fields.
//!
//! ```text
//! <shape type="Demo.Circle" radius="2">
//!   <center x="1" y="1" />
//! </shape>
//! ```
//!
//! Here `radius` is an attribute-like source, `center` an element-like one
//! that is itself activated as a nested object, and `type` names the concrete
//! type.
use crate::{
    config::ActivatorConfig,
    error::ConstructionError,
    resolve::InstanceResolver,
    source::{Node, NamedValueSource, SourceBag},
    types::{TypeDescription, TypeRegistry},
    value::ObjectRef,
};

mod binding;
mod ranking;

pub use ranking::ConstructorRank;

#[derive(Debug, Clone)]
pub struct Activator<'a> {
    registry: &'a TypeRegistry,
    config: ActivatorConfig,
    declared: TypeDescription,
    type_indicator: Option<String>,
    default_type: Option<TypeDescription>,
    sources: SourceBag,
    container: Option<ObjectRef>,
}

impl<'a> Activator<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        declared: TypeDescription,
        config: ActivatorConfig,
    ) -> Self {
        Self {
            registry,
            config,
            declared,
            type_indicator: None,
            default_type: None,
            sources: SourceBag::default(),
            container: None,
        }
    }

    /// Harvests the attributes and children of `node` as sources. The
    /// attribute named by the configured type indicator selects the concrete
    /// type.
    pub fn from_node(
        registry: &'a TypeRegistry,
        declared: TypeDescription,
        node: &Node,
        config: ActivatorConfig,
    ) -> Self {
        let (sources, indicator) = SourceBag::from_node(node, &config.type_indicator);
        let mut activator = Self::new(registry, declared, config).with_sources(sources);
        activator.type_indicator = indicator;
        activator
    }

    pub fn with_type_indicator(mut self, name: impl Into<String>) -> Self {
        self.type_indicator = Some(name.into());
        self
    }

    pub fn with_default_type(mut self, ty: TypeDescription) -> Self {
        self.default_type = Some(ty);
        self
    }

    pub fn with_sources(mut self, sources: SourceBag) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_source(mut self, source: NamedValueSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Fields of `container` with a matching name and type are preferred over
    /// every other source.
    pub fn with_container(mut self, container: ObjectRef) -> Self {
        self.container = Some(container);
        self
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn config(&self) -> &ActivatorConfig {
        &self.config
    }

    pub fn declared(&self) -> TypeDescription {
        self.declared
    }

    pub fn sources(&self) -> &SourceBag {
        &self.sources
    }

    pub fn container(&self) -> Option<&ObjectRef> {
        self.container.as_ref()
    }

    /// The type [`create_instance`](Self::create_instance) would build.
    pub fn concrete_type(&self) -> Result<TypeDescription, ConstructionError> {
        let indicator = self
            .type_indicator
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let ty = match indicator {
            Some(name) => {
                self.registry.find_type(name).map_err(|source| {
                    ConstructionError::InvalidTypeIndicator {
                        indicator: name.to_string(),
                        source,
                    }
                })?
            }
            None => match self.default_type {
                Some(ty) => ty,
                None if self.declared.is_instantiable() => self.declared,
                None => {
                    return Err(ConstructionError::MissingTypeIndicator {
                        declared: self.declared.name().to_string(),
                        indicator: self.config.type_indicator.clone(),
                    })
                }
            },
        };

        if !ty.is_assignable_to(self.declared) {
            return Err(ConstructionError::IncompatibleType {
                declared: self.declared.name().to_string(),
                actual: ty.name().to_string(),
            });
        }
        if !ty.is_instantiable() {
            return Err(ConstructionError::NotInstantiable(ty.name().to_string()));
        }
        Ok(ty)
    }

    pub fn create_instance(
        &self,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Result<ObjectRef, ConstructionError> {
        let ty = self.concrete_type()?;
        let constructor = self
            .select(ty, fallback)
            .ok_or_else(|| ConstructionError::NoConstructor(ty.name().to_string()))?;

        let args = self.bind_arguments(constructor, fallback);
        let object = constructor.invoke(ty, args)?;
        self.populate_fields(&object, constructor, fallback);

        tracing::debug!(%ty, sources = self.sources.len(), "instance created");
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::TypeLookupError,
        types::{ConstructorDescription, PrimitiveKind},
        value::Value,
    };

    #[test]
    fn type_indicator_selects_concrete_type() {
        let mut reg = TypeRegistry::new();
        let shape = reg.interface("Demo.IShape").build();
        let double = reg.primitive(PrimitiveKind::Double);
        let circle = reg
            .class("Demo.Circle")
            .implements(shape)
            .constructor(ConstructorDescription::new().param("radius", double))
            .build();

        let node = Node::new("shape")
            .with_attribute("type", "Circle")
            .with_attribute("radius", "2.5");
        let object = Activator::from_node(&reg, shape, &node, ActivatorConfig::default())
            .create_instance(None)
            .unwrap();
        assert_eq!(object.ty(), circle);
        assert_eq!(object.field("radius"), Some(Value::Double(2.5)));
    }

    #[test]
    fn type_indicator_errors() {
        let mut reg = TypeRegistry::new();
        let shape = reg.interface("Demo.IShape").build();
        let other = reg
            .class("Demo.Other")
            .constructor(ConstructorDescription::new())
            .build();

        let missing = Activator::new(&reg, shape, ActivatorConfig::default());
        assert_eq!(
            missing.create_instance(None).unwrap_err(),
            ConstructionError::MissingTypeIndicator {
                declared: "Demo.IShape".into(),
                indicator: "type".into()
            }
        );

        let unknown = missing.clone().with_type_indicator("Demo.Nope");
        assert_eq!(
            unknown.create_instance(None).unwrap_err(),
            ConstructionError::InvalidTypeIndicator {
                indicator: "Demo.Nope".into(),
                source: TypeLookupError::NotFound("Demo.Nope".into())
            }
        );

        let incompatible = missing.clone().with_type_indicator("Demo.Other");
        assert!(matches!(
            incompatible.create_instance(None),
            Err(ConstructionError::IncompatibleType { .. })
        ));

        let defaulted = missing.with_default_type(other);
        assert!(matches!(
            defaulted.create_instance(None),
            Err(ConstructionError::IncompatibleType { .. })
        ));
    }
}
