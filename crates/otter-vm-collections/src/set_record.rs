//! Set Records: the adapter that lets set algorithms consume any set-like
//! object (ES2025 §24.2.1.2).
//!
//! A set-like object is anything with a numeric `size` and callable `has` and
//! `keys` properties. [`get_set_record`] reads those once, in that order, and
//! caches the callables; nothing is cached across calls.

use std::sync::Arc;

use crate::context::NativeContext;
use crate::convert::{to_display_string, to_integer_or_infinity, to_number};
use crate::error::{VmError, VmResult};
use crate::iterator::IteratorRecord;
use crate::object::{JsObject, PropertyKey};
use crate::value::Value;

/// Validated view of a set-like object
#[derive(Debug, Clone)]
pub struct SetRecord {
    /// The set-like object
    pub set: Arc<JsObject>,
    /// `ToIntegerOrInfinity(ToNumber(size))`; may be `±∞` or negative
    pub size: f64,
    /// Its `has` method
    pub has: Value,
    /// Its `keys` method
    pub keys: Value,
}

impl SetRecord {
    /// `ToBoolean(Call(has, set, «value»))`
    pub fn contains(&self, ncx: &mut NativeContext<'_>, value: &Value) -> VmResult<bool> {
        let result = ncx.call_function(&self.has, &Value::object(self.set.clone()), &[value.clone()])?;
        Ok(result.to_boolean())
    }
}

fn require_callable(name: &str, value: Value) -> VmResult<Value> {
    if value.is_callable() {
        Ok(value)
    } else {
        Err(VmError::type_error(format!(
            "{name} property {} is not a function",
            to_display_string(&value)
        )))
    }
}

/// GetSetRecord(obj)
pub fn get_set_record(ncx: &mut NativeContext<'_>, value: &Value) -> VmResult<SetRecord> {
    let Some(obj) = value.as_object().cloned() else {
        return Err(VmError::type_error(format!(
            "{} is not an object",
            to_display_string(value)
        )));
    };

    let raw_size = ncx.get(&obj, &PropertyKey::string("size"))?;
    let num_size = to_number(ncx, &raw_size)?;
    if num_size.is_nan() {
        return Err(VmError::type_error("The size property is NaN"));
    }
    let size = to_integer_or_infinity(num_size);

    let has = require_callable("has", ncx.get(&obj, &PropertyKey::string("has"))?)?;
    let keys = require_callable("keys", ncx.get(&obj, &PropertyKey::string("keys"))?)?;

    tracing::debug!(size, "built set record");
    Ok(SetRecord {
        set: obj,
        size,
        has,
        keys,
    })
}

/// GetIteratorFromMethod(setRecord.[[SetObject]], setRecord.[[Keys]]),
/// checking the shape of the returned iterator.
pub fn get_keys_iterator(ncx: &mut NativeContext<'_>, record: &SetRecord) -> VmResult<IteratorRecord> {
    let keys_iter = ncx.call_function(&record.keys, &Value::object(record.set.clone()), &[])?;
    let Some(iterator) = keys_iter.as_object().cloned() else {
        return Err(VmError::type_error(format!(
            "{} is not an object",
            to_display_string(&keys_iter)
        )));
    };
    let next = require_callable("next", ncx.get(&iterator, &PropertyKey::string("next"))?)?;
    Ok(IteratorRecord::new(iterator, next))
}
