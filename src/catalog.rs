//! JSON type catalogs.
//!
//! A catalog declares classes, interfaces and enums for a [`TypeRegistry`]:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Demo.IShape", "kind": "interface" },
//!     {
//!       "name": "Demo.Circle",
//!       "interfaces": ["Demo.IShape"],
//!       "constructors": [
//!         { "parameters": [{ "name": "radius", "type": "Double", "default": 1.0 }] }
//!       ],
//!       "fields": [{ "name": "Label", "type": "String" }]
//!     },
//!     { "name": "Demo.Style", "kind": "enum", "flags": true,
//!       "members": [{ "name": "Bold" }, { "name": "Italic" }] }
//!   ]
//! }
//! ```
//!
//! Types may refer to each other in any order: everything is declared before
//! any shape is attached.
use crate::{
    error::{CatalogError, ConversionError},
    types::{ConstructorDescription, TypeDescription, TypeKind, TypeRegistry},
    value::{convert::parse_scalar, Value},
};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindDecl {
    #[default]
    Class,
    AbstractClass,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub value: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Present (even as `null`) when the parameter is optional.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: KindDecl,
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub flags: bool,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub types: Vec<TypeDecl>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

impl std::str::FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Catalog {
    /// Declares and defines every type of the catalog, returning them in
    /// catalog order.
    pub fn load_into(
        &self,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<TypeDescription>, CatalogError> {
        let mut seen: HashSet<&str> = registry.types().iter().map(|t| t.name()).collect();
        let mut declared = Vec::with_capacity(self.types.len());
        for decl in &self.types {
            if !seen.insert(&decl.name) {
                return Err(CatalogError::Duplicate(decl.name.clone()));
            }
            let ty = match decl.kind {
                KindDecl::Class => {
                    registry.declare(&decl.name, TypeKind::Class { is_abstract: false })
                }
                KindDecl::AbstractClass => {
                    registry.declare(&decl.name, TypeKind::Class { is_abstract: true })
                }
                KindDecl::Interface => registry.declare(&decl.name, TypeKind::Interface),
                KindDecl::Enum => registry.enumeration(
                    &decl.name,
                    decl.flags,
                    decl.members.iter().enumerate().map(|(i, m)| {
                        let implicit = if decl.flags { 1u64 << i.min(63) } else { i as u64 };
                        (m.name.clone(), m.value.unwrap_or(implicit))
                    }),
                ),
            };
            declared.push(ty);
        }

        for (decl, &ty) in self.types.iter().zip(&declared) {
            if decl.kind != KindDecl::Enum {
                define(registry, decl, ty)?;
            }
        }
        tracing::debug!(types = declared.len(), "catalog loaded");
        Ok(declared)
    }
}

fn lookup(
    registry: &TypeRegistry,
    owner: &str,
    name: &str,
) -> Result<TypeDescription, CatalogError> {
    registry
        .find_type(name)
        .map_err(|_| CatalogError::UnknownType {
            owner: owner.to_string(),
            name: name.to_string(),
        })
}

fn default_value(
    owner: &str,
    param: &ParameterDecl,
    ty: TypeDescription,
    json: &serde_json::Value,
) -> Result<Value, CatalogError> {
    let invalid = |source| CatalogError::InvalidDefault {
        owner: owner.to_string(),
        parameter: param.name.clone(),
        source,
    };
    let text = match json {
        serde_json::Value::Null if ty.is_nullable() => return Ok(Value::Null),
        serde_json::Value::Null => {
            return Err(invalid(ConversionError::InvalidFormat {
                type_name: ty.name().to_string(),
                text: "null".to_string(),
            }))
        }
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    parse_scalar(&text, ty).map_err(invalid)
}

fn define(
    registry: &TypeRegistry,
    decl: &TypeDecl,
    ty: TypeDescription,
) -> Result<(), CatalogError> {
    let owner = decl.name.as_str();
    let mut builder = registry.define(ty);
    if let Some(base) = &decl.base {
        builder = builder.extends(lookup(registry, owner, base)?);
    }
    for interface in &decl.interfaces {
        builder = builder.implements(lookup(registry, owner, interface)?);
    }
    for ctor in &decl.constructors {
        let mut constructor = ConstructorDescription::new();
        for param in &ctor.parameters {
            let param_ty = lookup(registry, owner, &param.ty)?;
            constructor = match &param.default {
                Some(json) => {
                    let default = default_value(owner, param, param_ty, json)?;
                    constructor.optional(&param.name, param_ty, default)
                }
                None => constructor.param(&param.name, param_ty),
            };
        }
        builder = builder.constructor(constructor);
    }
    for field in &decl.fields {
        let field_ty = lookup(registry, owner, &field.ty)?;
        builder = if field.readonly {
            builder.readonly_field(&field.name, field_ty)
        } else {
            builder.field(&field.name, field_ty)
        };
    }
    builder.try_build()?;
    Ok(())
}
