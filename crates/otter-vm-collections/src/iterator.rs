//! Iterator protocol abstract operations (ES2023 §7.4)
//!
//! An [`IteratorRecord`] pairs an iterator object with its `next` method,
//! resolved once when the record is created.

use std::sync::Arc;

use crate::context::NativeContext;
use crate::convert::to_display_string;
use crate::error::{VmError, VmResult};
use crate::intrinsics::well_known;
use crate::object::{JsObject, PropertyKey};
use crate::value::Value;

/// Iterator Record
#[derive(Debug, Clone)]
pub struct IteratorRecord {
    /// The iterator object
    pub iterator: Arc<JsObject>,
    /// Its `next` method, read once
    pub next_method: Value,
    /// Set once the iterator reports completion or throws
    pub done: bool,
}

impl IteratorRecord {
    /// Record over an iterator with an already resolved `next`
    pub fn new(iterator: Arc<JsObject>, next_method: Value) -> Self {
        Self {
            iterator,
            next_method,
            done: false,
        }
    }

    /// IteratorNext: call `next` and require an object result
    fn next_result(&mut self, ncx: &mut NativeContext<'_>) -> VmResult<Arc<JsObject>> {
        let receiver = Value::object(self.iterator.clone());
        let result = match ncx.call_function(&self.next_method, &receiver, &[]) {
            Ok(result) => result,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        match result.as_object() {
            Some(obj) => Ok(obj.clone()),
            None => {
                self.done = true;
                Err(VmError::type_error(format!(
                    "Iterator result {} is not an object",
                    to_display_string(&result)
                )))
            }
        }
    }

    /// IteratorStep: the next result object, or `None` once `done` is true
    pub fn step(&mut self, ncx: &mut NativeContext<'_>) -> VmResult<Option<Arc<JsObject>>> {
        if self.done {
            return Ok(None);
        }
        let result = self.next_result(ncx)?;
        let done = match ncx.get(&result, &PropertyKey::string("done")) {
            Ok(done) => done.to_boolean(),
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        if done {
            self.done = true;
            return Ok(None);
        }
        Ok(Some(result))
    }

    /// IteratorStepValue: the next `value`, or `None` once `done` is true
    pub fn step_value(&mut self, ncx: &mut NativeContext<'_>) -> VmResult<Option<Value>> {
        let Some(result) = self.step(ncx)? else {
            return Ok(None);
        };
        match ncx.get(&result, &PropertyKey::string("value")) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    /// IteratorClose: call the iterator's `return` method, if any.
    ///
    /// An abrupt `completion` always wins over anything `return` does.
    pub fn close(&mut self, ncx: &mut NativeContext<'_>, completion: VmResult<Value>) -> VmResult<Value> {
        self.done = true;
        let receiver = Value::object(self.iterator.clone());
        let return_method = match ncx.get_method(&receiver, &PropertyKey::string("return")) {
            Ok(method) => method,
            Err(err) => return completion.and(Err(err)),
        };
        let Some(return_method) = return_method else {
            return completion;
        };
        let inner = ncx.call_function(&return_method, &receiver, &[]);
        let completion = completion?;
        let inner = inner?;
        if !inner.is_object() {
            return Err(VmError::type_error(format!(
                "Iterator result {} is not an object",
                to_display_string(&inner)
            )));
        }
        Ok(completion)
    }
}

/// GetIterator(value, sync)
pub fn get_iterator(ncx: &mut NativeContext<'_>, value: &Value) -> VmResult<IteratorRecord> {
    let method = ncx
        .get_method(value, &PropertyKey::Symbol(well_known::ITERATOR))?
        .ok_or_else(|| {
            VmError::type_error(format!("{} is not iterable", to_display_string(value)))
        })?;
    get_iterator_from_method(ncx, value, &method)
}

/// GetIteratorFromMethod(value, method)
pub fn get_iterator_from_method(
    ncx: &mut NativeContext<'_>,
    value: &Value,
    method: &Value,
) -> VmResult<IteratorRecord> {
    let iterator = ncx.call_function(method, value, &[])?;
    let Some(iterator) = iterator.as_object().cloned() else {
        return Err(VmError::type_error(
            "Result of the Symbol.iterator method is not an object",
        ));
    };
    let next_method = ncx.get(&iterator, &PropertyKey::string("next"))?;
    Ok(IteratorRecord::new(iterator, next_method))
}

/// CreateIterResultObject(value, done)
pub fn create_iter_result_object(ncx: &NativeContext<'_>, value: Value, done: bool) -> Value {
    let result = ncx.new_object();
    result.set(PropertyKey::string("value"), value);
    result.set(PropertyKey::string("done"), Value::boolean(done));
    Value::object(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;
    use parking_lot::Mutex;

    /// `{ next() }` yielding `0..limit`, with a `return` that records calls
    fn counting_iterator(
        ncx: &NativeContext<'_>,
        limit: i32,
        closed: Arc<Mutex<u32>>,
    ) -> Arc<JsObject> {
        let iter = ncx.new_object();
        let counter = Arc::new(Mutex::new(0));
        let next = ncx.new_function("next", 0, move |_, _, ncx| {
            let mut n = counter.lock();
            let value = *n;
            *n += 1;
            Ok(create_iter_result_object(ncx, Value::int32(value), value >= limit))
        });
        let ret = ncx.new_function("return", 0, move |_, _, ncx| {
            *closed.lock() += 1;
            Ok(Value::object(ncx.new_object()))
        });
        iter.set(PropertyKey::string("next"), next);
        iter.set(PropertyKey::string("return"), ret);
        iter
    }

    #[test]
    fn test_step_value_until_done() {
        let mut ctx = VmRuntime::new().create_context();
        let mut ncx = ctx.native();
        let iter = counting_iterator(&ncx, 3, Arc::new(Mutex::new(0)));
        let next = iter.get(&PropertyKey::string("next")).unwrap();
        let mut record = IteratorRecord::new(iter, next);

        let mut seen = Vec::new();
        while let Some(value) = record.step_value(&mut ncx).unwrap() {
            seen.push(value.as_int32().unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(record.done);
        assert!(record.step(&mut ncx).unwrap().is_none());
    }

    #[test]
    fn test_non_object_result_is_type_error() {
        let mut ctx = VmRuntime::new().create_context();
        let mut ncx = ctx.native();
        let iter = ncx.new_object();
        let next = ncx.new_function("next", 0, |_, _, _| Ok(Value::int32(1)));
        let mut record = IteratorRecord::new(iter, next);
        assert!(record.step(&mut ncx).unwrap_err().is_type_error());
        assert!(record.done);
    }

    #[test]
    fn test_close_prefers_original_error() {
        let mut ctx = VmRuntime::new().create_context();
        let mut ncx = ctx.native();
        let closed = Arc::new(Mutex::new(0));
        let iter = counting_iterator(&ncx, 3, closed.clone());
        let next = iter.get(&PropertyKey::string("next")).unwrap();
        let mut record = IteratorRecord::new(iter, next);

        let err = record
            .close(&mut ncx, Err(VmError::range_error("boom")))
            .unwrap_err();
        assert!(matches!(err, VmError::RangeError(_)));
        assert_eq!(*closed.lock(), 1);
    }

    #[test]
    fn test_close_without_return_method() {
        let mut ctx = VmRuntime::new().create_context();
        let mut ncx = ctx.native();
        let iter = ncx.new_object();
        let mut record = IteratorRecord::new(iter, Value::undefined());
        let value = record.close(&mut ncx, Ok(Value::int32(5))).unwrap();
        assert_eq!(value, Value::int32(5));
    }

    #[test]
    fn test_get_iterator_rejects_non_iterables() {
        let mut ctx = VmRuntime::new().create_context();
        let mut ncx = ctx.native();
        let plain = Value::object(ncx.new_object());
        let err = get_iterator(&mut ncx, &plain).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: [object Object] is not iterable");
        assert!(get_iterator(&mut ncx, &Value::int32(1)).is_err());
    }

    #[test]
    fn test_iter_result_shape() {
        let mut ctx = VmRuntime::new().create_context();
        let ncx = ctx.native();
        let result = create_iter_result_object(&ncx, Value::from("v"), false);
        let obj = result.as_object().unwrap();
        assert_eq!(obj.get(&"value".into()), Some(Value::from("v")));
        assert_eq!(obj.get(&"done".into()), Some(Value::boolean(false)));
    }
}
