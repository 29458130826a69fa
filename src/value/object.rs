use crate::{error::FieldError, types::TypeDescription, utils::names_match, value::Value};
use parking_lot::RwLock;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

#[derive(Clone, Debug)]
struct Slot {
    name: String,
    ty: TypeDescription,
    writable: bool,
    value: Value,
}

pub struct Object {
    ty: TypeDescription,
    slots: RwLock<Vec<Slot>>,
}

/// Shared handle to a heap object.
///
/// Equality is structural (same type, equal slots); use [`ObjectRef::ptr_eq`]
/// for identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

fn find_slot(slots: &[Slot], name: &str) -> Option<usize> {
    slots
        .iter()
        .position(|s| s.name == name)
        .or_else(|| slots.iter().position(|s| names_match(&s.name, name)))
}

impl ObjectRef {
    /// A new instance of `ty` with every field at its zero value.
    pub fn new(ty: TypeDescription) -> Self {
        let slots = ty
            .fields()
            .into_iter()
            .map(|f| Slot {
                name: f.name.clone(),
                ty: f.ty,
                writable: f.writable,
                value: Value::default_for(f.ty),
            })
            .collect();
        Self(Arc::new(Object {
            ty,
            slots: RwLock::new(slots),
        }))
    }

    pub fn ty(&self) -> TypeDescription {
        self.0.ty
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Reads a field, matching the exact name first and then ignoring case.
    pub fn field(&self, name: &str) -> Option<Value> {
        let slots = self.0.slots.read();
        find_slot(&slots, name).map(|i| slots[i].value.clone())
    }

    /// Field names, types and contents in declaration order.
    pub fn fields(&self) -> Vec<(String, TypeDescription, Value)> {
        self.0
            .slots
            .read()
            .iter()
            .map(|s| (s.name.clone(), s.ty, s.value.clone()))
            .collect()
    }

    /// Assigns a writable field after construction.
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), FieldError> {
        let mut slots = self.0.slots.write();
        let Some(i) = find_slot(&slots, name) else {
            return Err(FieldError::UnknownField {
                type_name: self.ty().name().to_string(),
                field: name.to_string(),
            });
        };
        let slot = &mut slots[i];
        if !slot.writable {
            return Err(FieldError::ReadOnly {
                type_name: self.ty().name().to_string(),
                field: slot.name.clone(),
            });
        }
        if !value.fits(slot.ty) {
            return Err(FieldError::TypeMismatch {
                type_name: self.ty().name().to_string(),
                field: slot.name.clone(),
                value: value.to_string(),
            });
        }
        slot.value = value;
        Ok(())
    }

    /// Constructor-time store: ignores the writable flag and records the
    /// value in a read-only slot when no such field is declared.
    pub(crate) fn init_field(&self, name: &str, ty: TypeDescription, value: Value) {
        let mut slots = self.0.slots.write();
        match find_slot(&slots, name) {
            Some(i) => slots[i].value = value,
            None => slots.push(Slot {
                name: name.to_string(),
                ty,
                writable: false,
                value,
            }),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        if self.ty() != other.ty() {
            return false;
        }
        let (l, r) = (self.0.slots.read(), other.0.slots.read());
        l.len() == r.len()
            && l
                .iter()
                .zip(r.iter())
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct(self.ty().name());
        for slot in self.0.slots.read().iter() {
            s.field(&slot.name, &slot.value);
        }
        s.finish()
    }
}
