use crate::value::{ObjectRef, Value};
use serde_json::{json, Map, Number};

/// Renders a value for display. Objects become maps with a `$type` entry;
/// an object reached again while it is being rendered is written as its type
/// name only.
pub fn to_json(value: &Value) -> serde_json::Value {
    render(value, &mut vec![])
}

pub fn object_to_json(object: &ObjectRef) -> serde_json::Value {
    render_object(object, &mut vec![])
}

fn float(v: f64) -> serde_json::Value {
    Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| json!(v.to_string()))
}

fn render(value: &Value, path: &mut Vec<ObjectRef>) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(v) => json!(v),
        Value::Char(v) => json!(v.to_string()),
        Value::SByte(v) => json!(v),
        Value::Byte(v) => json!(v),
        Value::Int16(v) => json!(v),
        Value::UInt16(v) => json!(v),
        Value::Int32(v) => json!(v),
        Value::UInt32(v) => json!(v),
        Value::Int64(v) => json!(v),
        Value::UInt64(v) => json!(v),
        Value::Single(v) => float(*v as f64),
        Value::Double(v) => float(*v),
        Value::Decimal(v) => json!(v.to_string()),
        Value::String(v) => json!(v),
        Value::DateTime(_) | Value::Guid(_) | Value::TimeSpan(_) | Value::Enum(..) => {
            json!(value.to_string())
        }
        Value::Object(o) => render_object(o, path),
    }
}

fn render_object(object: &ObjectRef, path: &mut Vec<ObjectRef>) -> serde_json::Value {
    if path.iter().any(|p| ObjectRef::ptr_eq(p, object)) {
        return json!(object.ty().name());
    }
    path.push(object.clone());
    let mut map = Map::new();
    map.insert("$type".to_string(), json!(object.ty().name()));
    for (name, _, value) in object.fields() {
        map.insert(name, render(&value, path));
    }
    path.pop();
    serde_json::Value::Object(map)
}
