//! `Object.prototype` methods needed by the collections
//!
//! Only `toString` and `valueOf` are provided: `toString` is how a Set's
//! `@@toStringTag` becomes observable, and both are the fallbacks
//! `ToPrimitive` reaches for.

use std::sync::Arc;

use crate::builtin_builder::PrototypeBuilder;
use crate::context::NativeContext;
use crate::error::VmResult;
use crate::intrinsics::{Intrinsics, well_known};
use crate::object::{ObjectKind, PropertyKey};
use crate::string::JsString;
use crate::value::Value;

/// Install `Object.prototype.toString` and `Object.prototype.valueOf`
pub fn init_object_prototype(intrinsics: &Intrinsics) {
    PrototypeBuilder::new(
        intrinsics.function_prototype.clone(),
        intrinsics.object_prototype.clone(),
    )
    .method("toString", object_to_string, 0)
    .method("valueOf", |this, _args, _ncx| Ok(this.clone()), 0)
    .build();
}

/// `Object.prototype.toString` (ES2023 §20.1.3.6)
fn object_to_string(this: &Value, _args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let builtin_tag = match this {
        Value::Undefined => return Ok(tagged("Undefined")),
        Value::Null => return Ok(tagged("Null")),
        Value::Boolean(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Symbol(_) => "Symbol",
        Value::BigInt(_) => "BigInt",
        Value::Object(obj) => match obj.kind() {
            ObjectKind::Array => "Array",
            ObjectKind::Function(_) => "Function",
            _ => "Object",
        },
    };

    let tag = match this.as_object() {
        Some(obj) => ncx.get(obj, &PropertyKey::Symbol(well_known::TO_STRING_TAG))?,
        None => Value::undefined(),
    };
    Ok(match tag.as_string() {
        Some(tag) => tagged(tag.as_str()),
        None => tagged(builtin_tag),
    })
}

fn tagged(tag: &str) -> Value {
    Value::string(Arc::new(JsString::new(format!("[object {tag}]"))))
}
