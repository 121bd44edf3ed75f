//! Set constructor and `Set.prototype` methods (ES2023 §24.2)
//!
//! A Set object is a `JsObject` of kind [`ObjectKind::Set`]; every prototype
//! method validates that before touching storage, so a failed call never
//! mutates anything.

use std::sync::Arc;

use crate::builtin_builder::BuiltInBuilder;
use crate::context::NativeContext;
use crate::convert::to_display_string;
use crate::error::{VmError, VmResult};
use crate::intrinsics::Intrinsics;
use crate::intrinsics_impl::set_iterator::{SetIterationKind, create_set_iterator};
use crate::iterator::get_iterator;
use crate::object::{JsObject, ObjectKind, PropertyAttributes, PropertyKey};
use crate::set_data::{SetCursor, SetData};
use crate::string::JsString;
use crate::value::{NativeFn, Value};

fn incompatible_receiver(label: &str, this: &Value) -> VmError {
    VmError::type_error(format!(
        "{label} called on incompatible receiver {}",
        to_display_string(this)
    ))
}

/// Storage of `this` if it is a Set, else a TypeError naming `method`
fn this_set_data(this: &Value, method: &str) -> VmResult<Arc<SetData>> {
    this.as_object()
        .and_then(|obj| obj.as_set_data())
        .cloned()
        .ok_or_else(|| incompatible_receiver(&format!("Method Set.prototype.{method}"), this))
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// Allocate an empty Set. `prototype` defaults to `%Set.prototype%`.
pub fn create_set(ncx: &NativeContext<'_>, prototype: Option<Arc<JsObject>>) -> Arc<JsObject> {
    let prototype = prototype.unwrap_or_else(|| ncx.intrinsics().set_prototype.clone());
    let data = SetData::with_config(ncx.config().set_data);
    Arc::new(JsObject::with_kind(
        Some(prototype),
        ObjectKind::Set(Arc::new(data)),
    ))
}

/// `Set([iterable])` (ES2023 §24.2.1.1)
pub fn set_constructor(_this: &Value, args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let Some(new_target) = ncx.new_target().cloned() else {
        return Err(VmError::type_error("Constructor Set requires 'new'"));
    };

    // OrdinaryCreateFromConstructor(newTarget, "%Set.prototype%")
    let prototype = match new_target.as_object() {
        Some(target) => ncx
            .get(target, &PropertyKey::string("prototype"))?
            .as_object()
            .cloned(),
        None => None,
    };
    let set = Value::object(create_set(ncx, prototype));

    let iterable = arg(args, 0);
    if iterable.is_nullish() {
        return Ok(set);
    }

    let adder = match set.as_object() {
        Some(obj) => ncx.get(obj, &PropertyKey::string("add"))?,
        None => Value::undefined(),
    };
    if !adder.is_callable() {
        return Err(VmError::type_error(format!(
            "'{}' returned for property 'add' of object '#<Set>' is not a function",
            to_display_string(&adder)
        )));
    }

    let mut iter = get_iterator(ncx, &iterable)?;
    while let Some(value) = iter.step_value(ncx)? {
        if let Err(err) = ncx.call_function(&adder, &set, &[value]) {
            return iter.close(ncx, Err(err));
        }
    }
    Ok(set)
}

/// `Set.prototype.add(value)`
fn set_add(this: &Value, args: &[Value], _ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "add")?;
    // -0 is stored as +0
    data.add(arg(args, 0));
    Ok(this.clone())
}

/// `Set.prototype.clear()`
fn set_clear(this: &Value, _args: &[Value], _ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    this_set_data(this, "clear")?.clear();
    Ok(Value::undefined())
}

/// `Set.prototype.delete(value)`
fn set_delete(this: &Value, args: &[Value], _ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "delete")?;
    Ok(Value::boolean(data.remove(&arg(args, 0))))
}

/// `Set.prototype.has(value)`
fn set_has(this: &Value, args: &[Value], _ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "has")?;
    Ok(Value::boolean(data.has(&arg(args, 0))))
}

/// `Set.prototype.entries()`
fn set_entries(this: &Value, _args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "entries")?;
    Ok(create_set_iterator(ncx, data, SetIterationKind::KeyAndValue))
}

/// `Set.prototype.values()`, also installed as `keys` and `@@iterator`
fn set_values(this: &Value, _args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "values")?;
    Ok(create_set_iterator(ncx, data, SetIterationKind::Value))
}

/// `Set.prototype.forEach(callbackfn [, thisArg])`
///
/// Walks the live storage, so values added by the callback are visited and
/// values it deletes are skipped. The first throw stops the walk.
fn set_for_each(this: &Value, args: &[Value], ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this_set_data(this, "forEach")?;
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return Err(VmError::type_error(format!(
            "{} is not a function",
            to_display_string(&callback)
        )));
    }
    let this_arg = arg(args, 1);

    let mut cursor = SetCursor::new(data);
    while let Some(value) = cursor.next_value() {
        ncx.call_function(&callback, &this_arg, &[value.clone(), value, this.clone()])?;
    }
    Ok(Value::undefined())
}

/// `get Set.prototype.size`
fn set_size(this: &Value, _args: &[Value], _ncx: &mut NativeContext<'_>) -> VmResult<Value> {
    let data = this
        .as_object()
        .and_then(|obj| obj.as_set_data())
        .ok_or_else(|| incompatible_receiver("get Set.prototype.size", this))?;
    Ok(Value::number(data.size() as f64))
}

/// Install the `Set` constructor and `Set.prototype`
pub fn init_set(intrinsics: &Intrinsics) {
    let size_getter: NativeFn = Arc::new(set_size);
    let species_getter: NativeFn = Arc::new(|this, _args, _ncx| Ok(this.clone()));

    BuiltInBuilder::new(
        intrinsics.function_prototype.clone(),
        intrinsics.set_constructor.clone(),
        intrinsics.set_prototype.clone(),
        "Set",
    )
    .inherits(intrinsics.object_prototype.clone())
    .constructor_length(0)
    .method("add", set_add, 1)
    .method("clear", set_clear, 0)
    .method("delete", set_delete, 1)
    .method("entries", set_entries, 0)
    .method("forEach", set_for_each, 1)
    .method("has", set_has, 1)
    .accessor("size", Some(size_getter), None)
    .method("values", set_values, 0)
    .alias(PropertyKey::string("keys"), "values")
    .alias(PropertyKey::Symbol(intrinsics.symbol_iterator.id), "values")
    .property(
        PropertyKey::Symbol(intrinsics.symbol_to_string_tag.id),
        Value::string(JsString::intern("Set")),
        PropertyAttributes::builtin_accessor(),
    )
    .static_symbol_accessor(&intrinsics.symbol_species, species_getter)
    .build();
}
