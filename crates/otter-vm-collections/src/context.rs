//! Execution context and the native call interface
//!
//! [`VmContext`] is what an embedder holds. Every native function receives a
//! [`NativeContext`], which borrows the `VmContext` and is the only way this
//! crate runs user code: calling functions, constructing objects, and reading
//! properties through getters.

use std::sync::Arc;

use crate::builtin_builder::make_native_fn;
use crate::convert::to_display_string;
use crate::error::{VmError, VmResult};
use crate::intrinsics::Intrinsics;
use crate::object::{JsObject, PropertyDescriptor, PropertyKey};
use crate::runtime::RuntimeConfig;
use crate::value::{NativeFn, Value};

/// Per-thread execution state
pub struct VmContext {
    intrinsics: Intrinsics,
    config: RuntimeConfig,
    /// Current native call nesting
    call_depth: usize,
}

impl VmContext {
    /// Create a context over a set of intrinsics
    pub fn new(intrinsics: Intrinsics, config: RuntimeConfig) -> Self {
        Self {
            intrinsics,
            config,
            call_depth: 0,
        }
    }

    /// Intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current native call nesting
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Borrow a native context for calling into the object model
    pub fn native(&mut self) -> NativeContext<'_> {
        NativeContext {
            ctx: self,
            new_target: None,
        }
    }

    /// `Call(func, this, args)`
    pub fn call_function(&mut self, func: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
        self.native().call_function(func, this, args)
    }

    /// `Construct(ctor, args)`
    pub fn construct(&mut self, ctor: &Value, args: &[Value]) -> VmResult<Value> {
        self.native().construct(ctor, args)
    }

    /// `Get(obj, key)`, running getters
    pub fn get(&mut self, obj: &Arc<JsObject>, key: &PropertyKey) -> VmResult<Value> {
        self.native().get(obj, key)
    }
}

/// Context handed to native functions
pub struct NativeContext<'a> {
    ctx: &'a mut VmContext,
    /// `new.target` of the current call, if it was a construct call
    new_target: Option<Value>,
}

impl NativeContext<'_> {
    /// Intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.ctx.intrinsics
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.ctx.config
    }

    /// `new.target` of the running native function (`None` for plain calls)
    pub fn new_target(&self) -> Option<&Value> {
        self.new_target.as_ref()
    }

    /// `Call(func, this, args)`
    pub fn call_function(&mut self, func: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
        let native = func
            .as_object()
            .and_then(|obj| obj.as_native_function())
            .map(|f| f.func.clone())
            .ok_or_else(|| {
                VmError::type_error(format!("{} is not a function", to_display_string(func)))
            })?;
        self.invoke(&native, this, args, None)
    }

    /// `Construct(ctor, args)` with `new.target` = `ctor`
    pub fn construct(&mut self, ctor: &Value, args: &[Value]) -> VmResult<Value> {
        self.construct_with_new_target(ctor, args, ctor)
    }

    /// `Construct(ctor, args, newTarget)`, as `Reflect.construct` does
    pub fn construct_with_new_target(
        &mut self,
        ctor: &Value,
        args: &[Value],
        new_target: &Value,
    ) -> VmResult<Value> {
        let is_constructor = |v: &Value| v.as_object().is_some_and(|obj| obj.is_constructor());
        if !is_constructor(new_target) {
            return Err(VmError::type_error(format!(
                "{} is not a constructor",
                to_display_string(new_target)
            )));
        }
        let native = ctor
            .as_object()
            .and_then(|obj| obj.as_native_function())
            .filter(|f| f.is_constructor)
            .map(|f| f.func.clone())
            .ok_or_else(|| {
                VmError::type_error(format!("{} is not a constructor", to_display_string(ctor)))
            })?;
        self.invoke(&native, &Value::undefined(), args, Some(new_target.clone()))
    }

    fn invoke(
        &mut self,
        native: &NativeFn,
        this: &Value,
        args: &[Value],
        new_target: Option<Value>,
    ) -> VmResult<Value> {
        if self.ctx.call_depth >= self.ctx.config.max_stack_depth {
            return Err(VmError::StackOverflow);
        }
        self.ctx.call_depth += 1;
        let mut inner = NativeContext {
            ctx: &mut *self.ctx,
            new_target,
        };
        let result = native(this, args, &mut inner);
        self.ctx.call_depth -= 1;
        result
    }

    /// `Get(obj, key)`: walks the prototype chain and runs getters with
    /// `obj` as the receiver.
    pub fn get(&mut self, obj: &Arc<JsObject>, key: &PropertyKey) -> VmResult<Value> {
        let mut current = Some(obj.clone());
        while let Some(holder) = current {
            match holder.get_own_property(key) {
                Some(PropertyDescriptor::Data { value, .. }) => return Ok(value),
                Some(PropertyDescriptor::Accessor { get, .. }) => {
                    return match get {
                        Some(getter) if !getter.is_undefined() => {
                            self.call_function(&getter, &Value::object(obj.clone()), &[])
                        }
                        _ => Ok(Value::undefined()),
                    };
                }
                None => current = holder.prototype(),
            }
        }
        Ok(Value::undefined())
    }

    /// `GetMethod(value, key)`: `None` for `undefined`/`null`, TypeError if
    /// present but not callable. Primitives have no methods here.
    pub fn get_method(&mut self, value: &Value, key: &PropertyKey) -> VmResult<Option<Value>> {
        let Some(obj) = value.as_object() else {
            return Ok(None);
        };
        let method = self.get(obj, key)?;
        if method.is_nullish() {
            return Ok(None);
        }
        if !method.is_callable() {
            return Err(VmError::type_error(format!(
                "{} is not a function",
                to_display_string(&method)
            )));
        }
        Ok(Some(method))
    }

    /// Ordinary object with `Object.prototype`
    pub fn new_object(&self) -> Arc<JsObject> {
        Arc::new(JsObject::new(Some(self.intrinsics().object_prototype.clone())))
    }

    /// Array with `Array.prototype`
    pub fn new_array(&self, values: Vec<Value>) -> Arc<JsObject> {
        Arc::new(JsObject::array(
            Some(self.intrinsics().array_prototype.clone()),
            values,
        ))
    }

    /// Native function object with `name` and `length`
    pub fn new_function<F>(&self, name: &str, length: u32, f: F) -> Value
    where
        F: Fn(&Value, &[Value], &mut NativeContext<'_>) -> VmResult<Value> + Send + Sync + 'static,
    {
        make_native_fn(
            self.intrinsics().function_prototype.clone(),
            Arc::new(f),
            name,
            length,
        )
    }
}
