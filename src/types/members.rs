use crate::{
    error::ConstructionError,
    types::TypeDescription,
    value::{object::ObjectRef, Value},
};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

pub type NativeConstructor =
    Arc<dyn Fn(TypeDescription, &[Value]) -> Result<ObjectRef, String> + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescription {
    pub name: String,
    pub ty: TypeDescription,
    /// `Some` when the parameter declares a default, which may itself be `Value::Null`.
    pub default: Option<Value>,
}

impl ParameterDescription {
    pub fn required(name: impl Into<String>, ty: TypeDescription) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeDescription, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The declared default, or the zero value of the parameter type.
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| Value::default_for(self.ty))
    }
}

#[derive(Clone)]
pub enum ConstructorBody {
    /// Store every argument into the field of the same name.
    AssignFields,
    Native(NativeConstructor),
}

impl Debug for ConstructorBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructorBody::AssignFields => write!(f, "AssignFields"),
            ConstructorBody::Native(_) => write!(f, "Native"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConstructorDescription {
    pub parameters: Vec<ParameterDescription>,
    pub body: ConstructorBody,
}

impl Default for ConstructorDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructorDescription {
    pub fn new() -> Self {
        Self {
            parameters: vec![],
            body: ConstructorBody::AssignFields,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeDescription) -> Self {
        self.parameters.push(ParameterDescription::required(name, ty));
        self
    }

    pub fn optional(
        mut self,
        name: impl Into<String>,
        ty: TypeDescription,
        default: Value,
    ) -> Self {
        self.parameters
            .push(ParameterDescription::optional(name, ty, default));
        self
    }

    pub fn native<F>(mut self, f: F) -> Self
    where
        F: Fn(TypeDescription, &[Value]) -> Result<ObjectRef, String> + Send + Sync + 'static,
    {
        self.body = ConstructorBody::Native(Arc::new(f));
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterDescription> {
        self.parameters.iter().filter(|p| !p.has_default())
    }

    pub fn optional_parameters(&self) -> impl Iterator<Item = &ParameterDescription> {
        self.parameters.iter().filter(|p| p.has_default())
    }

    pub fn signature(&self, owner: TypeDescription) -> String {
        let params: Vec<_> = self
            .parameters
            .iter()
            .map(|p| match &p.default {
                Some(d) => format!("{} {} = {}", p.ty, p.name, d),
                None => format!("{} {}", p.ty, p.name),
            })
            .collect();
        format!("{}({})", owner.simple_name(), params.join(", "))
    }

    pub fn invoke(
        &self,
        ty: TypeDescription,
        args: Vec<Value>,
    ) -> Result<ObjectRef, ConstructionError> {
        match &self.body {
            ConstructorBody::AssignFields => {
                let object = ObjectRef::new(ty);
                for (param, arg) in self.parameters.iter().zip(args) {
                    object.init_field(&param.name, param.ty, arg);
                }
                Ok(object)
            }
            ConstructorBody::Native(f) => f(ty, &args).map_err(|message| {
                ConstructionError::Constructor {
                    type_name: ty.name().to_string(),
                    message,
                }
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescription {
    pub name: String,
    pub ty: TypeDescription,
    pub writable: bool,
}
