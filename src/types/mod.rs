//! Runtime type descriptors.
//!
//! A [`TypeDescription`] is a cheap, copyable handle to a leaked
//! [`TypeDefinition`]. Definitions live for the rest of the program, the same
//! way loaded assembly metadata does, so handles can be hashed and compared by
//! address and shared freely between threads.
//!
//! A type is declared first (name and [`TypeKind`]) and receives its
//! [`TypeShape`] (base type, interfaces, constructors, fields) afterwards. The
//! split lets declarations refer to each other in any order.
use crate::{error::TypeDefinitionError, utils::names_match};
use std::{
    collections::{HashSet, VecDeque},
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::OnceLock,
};

#[macro_use]
mod macros;

pub mod builder;
pub mod comparer;
pub mod members;
pub mod registry;

pub use builder::TypeBuilder;
pub use members::{ConstructorBody, ConstructorDescription, FieldDescription, ParameterDescription};
pub use registry::TypeRegistry;

primitive_kinds! {
    Boolean => "Boolean" | "bool",
    Char => "Char" | "char",
    SByte => "SByte" | "sbyte",
    Byte => "Byte" | "byte",
    Int16 => "Int16" | "short",
    UInt16 => "UInt16" | "ushort",
    Int32 => "Int32" | "int",
    UInt32 => "UInt32" | "uint",
    Int64 => "Int64" | "long",
    UInt64 => "UInt64" | "ulong",
    Single => "Single" | "float",
    Double => "Double" | "double",
    Decimal => "Decimal" | "decimal",
    String => "String" | "string",
    DateTime => "DateTime",
    Guid => "Guid",
    TimeSpan => "TimeSpan",
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDefinition {
    pub flags: bool,
    pub members: Vec<(String, u64)>,
}

impl EnumDefinition {
    pub fn member_value(&self, name: &str) -> Option<u64> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.members.iter().find(|(n, _)| names_match(n, name)))
            .map(|(_, v)| *v)
    }
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    /// The root every type is assignable to.
    Object,
    Primitive(PrimitiveKind),
    Nullable(TypeDescription),
    Enum(EnumDefinition),
    Class { is_abstract: bool },
    Interface,
}

#[derive(Clone, Debug, Default)]
pub struct TypeShape {
    pub base: Option<TypeDescription>,
    pub interfaces: Vec<TypeDescription>,
    pub constructors: Vec<ConstructorDescription>,
    pub fields: Vec<FieldDescription>,
}

pub struct TypeDefinition {
    name: String,
    kind: TypeKind,
    shape: OnceLock<TypeShape>,
}

#[derive(Clone, Copy)]
pub struct TypeDescription {
    definition: &'static TypeDefinition,
}

impl TypeDescription {
    /// Leaks `definition` and returns a handle to it.
    pub fn leak(name: impl Into<String>, kind: TypeKind) -> Self {
        let definition = Box::leak(Box::new(TypeDefinition {
            name: name.into(),
            kind,
            shape: OnceLock::new(),
        }));
        Self { definition }
    }

    pub fn define(&self, shape: TypeShape) -> Result<(), TypeDefinitionError> {
        if !matches!(self.kind(), TypeKind::Class { .. } | TypeKind::Interface) {
            return Err(TypeDefinitionError::ShapeNotAllowed(self.name().to_string()));
        }
        self.definition
            .shape
            .set(shape)
            .map_err(|_| TypeDefinitionError::AlreadyDefined(self.name().to_string()))
    }

    pub fn is_defined(&self) -> bool {
        self.definition.shape.get().is_some()
    }

    fn shape(&self) -> Option<&'static TypeShape> {
        self.definition.shape.get()
    }

    pub fn name(&self) -> &'static str {
        &self.definition.name
    }

    pub fn simple_name(&self) -> &'static str {
        let name = self.name();
        match name.rfind('.') {
            Some(i) => &name[i + 1..],
            None => name,
        }
    }

    pub fn kind(&self) -> &'static TypeKind {
        &self.definition.kind
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind() {
            TypeKind::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn nullable_inner(&self) -> Option<TypeDescription> {
        match self.kind() {
            TypeKind::Nullable(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn enum_definition(&self) -> Option<&'static EnumDefinition> {
        match self.kind() {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind(), TypeKind::Object)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind(), TypeKind::Interface)
    }

    pub fn is_abstract(&self) -> bool {
        match self.kind() {
            TypeKind::Class { is_abstract } => *is_abstract,
            TypeKind::Interface | TypeKind::Object => true,
            _ => false,
        }
    }

    /// Only concrete classes can be constructed.
    pub fn is_instantiable(&self) -> bool {
        matches!(self.kind(), TypeKind::Class { is_abstract: false })
    }

    /// Scalars, and nullable scalars, that a generic capability can never supply.
    pub fn is_primitive_like(&self) -> bool {
        match self.kind() {
            TypeKind::Primitive(_) => true,
            TypeKind::Nullable(inner) => inner.primitive_kind().is_some(),
            _ => false,
        }
    }

    /// Types whose null is a meaningful value.
    pub fn is_nullable(&self) -> bool {
        match self.kind() {
            TypeKind::Primitive(p) => *p == PrimitiveKind::String,
            TypeKind::Enum(_) => false,
            _ => true,
        }
    }

    pub fn base(&self) -> Option<TypeDescription> {
        self.shape().and_then(|s| s.base)
    }

    pub fn interfaces(&self) -> &'static [TypeDescription] {
        self.shape().map(|s| s.interfaces.as_slice()).unwrap_or(&[])
    }

    pub fn constructors(&self) -> &'static [ConstructorDescription] {
        self.shape().map(|s| s.constructors.as_slice()).unwrap_or(&[])
    }

    /// Fields declared directly on this type.
    pub fn declared_fields(&self) -> &'static [FieldDescription] {
        self.shape().map(|s| s.fields.as_slice()).unwrap_or(&[])
    }

    /// Base classes from the immediate parent upwards.
    pub fn ancestors(&self) -> impl Iterator<Item = TypeDescription> {
        let mut seen = HashSet::new();
        seen.insert(*self);
        std::iter::successors(self.base(), |t| t.base()).take_while(move |t| seen.insert(*t))
    }

    /// Declared and inherited fields, base-most first. A derived field hides
    /// an inherited one of the same name.
    pub fn fields(&self) -> Vec<&'static FieldDescription> {
        let mut chain: Vec<_> = self.ancestors().collect();
        chain.reverse();
        chain.push(*self);

        let mut fields: Vec<&'static FieldDescription> = vec![];
        for ty in chain {
            for f in ty.declared_fields() {
                match fields.iter().position(|e| e.name == f.name) {
                    Some(i) => fields[i] = f,
                    None => fields.push(f),
                }
            }
        }
        fields
    }

    /// Every interface reachable from this type and its ancestors.
    pub fn all_interfaces(&self) -> Vec<TypeDescription> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<_> = std::iter::once(*self).chain(self.ancestors()).collect();
        let mut result = vec![];
        while let Some(current) = queue.pop_front() {
            for &i in current.interfaces() {
                if seen.insert(i) {
                    result.push(i);
                    queue.push_back(i);
                }
            }
        }
        result
    }
}

impl Debug for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Display for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.definition, other.definition)
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.definition as *const TypeDefinition).hash(state);
    }
}
