//! Runtime values.
//!
//! [`Value`] is what constructor arguments, parameter defaults and field
//! contents are made of. Reference values point at heap [`Object`](object::Object)s
//! through [`ObjectRef`].
use crate::types::{PrimitiveKind, TypeDescription, TypeKind};
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod convert;
pub mod json;
pub mod object;

pub use object::ObjectRef;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    TimeSpan(Duration),
    Enum(TypeDescription, u64),
    Object(ObjectRef),
}

impl Value {
    /// The zero value of `ty`.
    pub fn default_for(ty: TypeDescription) -> Self {
        use PrimitiveKind as P;
        match ty.kind() {
            TypeKind::Primitive(p) => match p {
                P::Boolean => Value::Boolean(false),
                P::Char => Value::Char('\0'),
                P::SByte => Value::SByte(0),
                P::Byte => Value::Byte(0),
                P::Int16 => Value::Int16(0),
                P::UInt16 => Value::UInt16(0),
                P::Int32 => Value::Int32(0),
                P::UInt32 => Value::UInt32(0),
                P::Int64 => Value::Int64(0),
                P::UInt64 => Value::UInt64(0),
                P::Single => Value::Single(0.0),
                P::Double => Value::Double(0.0),
                P::Decimal => Value::Decimal(Decimal::ZERO),
                P::String => Value::Null,
                P::DateTime => Value::DateTime(NaiveDateTime::default()),
                P::Guid => Value::Guid(Uuid::nil()),
                P::TimeSpan => Value::TimeSpan(Duration::zero()),
            },
            TypeKind::Enum(_) => Value::Enum(ty, 0),
            TypeKind::Object
            | TypeKind::Nullable(_)
            | TypeKind::Class { .. }
            | TypeKind::Interface => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        use PrimitiveKind as P;
        Some(match self {
            Value::Boolean(_) => P::Boolean,
            Value::Char(_) => P::Char,
            Value::SByte(_) => P::SByte,
            Value::Byte(_) => P::Byte,
            Value::Int16(_) => P::Int16,
            Value::UInt16(_) => P::UInt16,
            Value::Int32(_) => P::Int32,
            Value::UInt32(_) => P::UInt32,
            Value::Int64(_) => P::Int64,
            Value::UInt64(_) => P::UInt64,
            Value::Single(_) => P::Single,
            Value::Double(_) => P::Double,
            Value::Decimal(_) => P::Decimal,
            Value::String(_) => P::String,
            Value::DateTime(_) => P::DateTime,
            Value::Guid(_) => P::Guid,
            Value::TimeSpan(_) => P::TimeSpan,
            Value::Null | Value::Enum(..) | Value::Object(_) => return None,
        })
    }

    /// Whether this value may be stored in a location of type `ty`.
    pub fn fits(&self, ty: TypeDescription) -> bool {
        match (self, ty.kind()) {
            (Value::Null, _) => ty.is_nullable(),
            (_, TypeKind::Object) => true,
            (Value::Enum(e, _), _) => *e == ty || ty.nullable_inner() == Some(*e),
            (Value::Object(o), _) => o.ty().is_assignable_to(ty),
            (v, TypeKind::Primitive(p)) => v.primitive_kind() == Some(*p),
            (v, TypeKind::Nullable(inner)) => v.fits(*inner),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::SByte(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Single(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}m"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Guid(v) => write!(f, "{v}"),
            Value::TimeSpan(v) => write!(f, "{}", convert::format_time_span(*v)),
            Value::Enum(ty, bits) => write!(f, "{}", convert::format_enum(*ty, *bits)),
            Value::Object(o) => write!(f, "{}", o.ty()),
        }
    }
}
