//! Builder for builtin constructors and prototypes with correct property
//! attributes.
//!
//! Every method installed through a builder is non-enumerable, and every
//! function object it creates has proper `length` and `name` properties.
//!
//! ## Usage
//!
//! ```ignore
//! BuiltInBuilder::new(fn_proto, ctor, proto, "Set")
//!     .inherits(object_proto)
//!     .method("add", set_add, 1)
//!     .alias("keys", "values")
//!     .build();
//! ```

use std::sync::Arc;

use crate::context::NativeContext;
use crate::error::VmResult;
use crate::object::{JsObject, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::string::JsString;
use crate::value::{NativeFn, Symbol, Value};

/// A deferred property definition applied during `build()`.
enum DeferredProperty {
    /// Method on the prototype
    Method {
        key: PropertyKey,
        name: String,
        func: NativeFn,
        length: u32,
    },
    /// Data property on the prototype
    Property {
        key: PropertyKey,
        value: Value,
        attrs: PropertyAttributes,
    },
    /// Getter (and optional setter) on the prototype
    Accessor {
        key: PropertyKey,
        name: String,
        getter: Option<NativeFn>,
        setter: Option<NativeFn>,
    },
    /// Getter (and optional setter) on the constructor
    StaticAccessor {
        key: PropertyKey,
        name: String,
        getter: Option<NativeFn>,
        setter: Option<NativeFn>,
    },
    /// Second key for an already installed prototype method, sharing the
    /// same function object
    Alias {
        key: PropertyKey,
        target: PropertyKey,
    },
}

fn symbol_name(symbol: &Symbol) -> String {
    match &symbol.description {
        Some(desc) => format!("[{desc}]"),
        None => "[]".to_string(),
    }
}

fn accessor_descriptor(
    fn_proto: &Arc<JsObject>,
    name: &str,
    getter: Option<NativeFn>,
    setter: Option<NativeFn>,
) -> PropertyDescriptor {
    PropertyDescriptor::Accessor {
        get: getter.map(|g| make_native_fn(fn_proto.clone(), g, &format!("get {name}"), 0)),
        set: setter.map(|s| make_native_fn(fn_proto.clone(), s, &format!("set {name}"), 1)),
        attributes: PropertyAttributes::builtin_accessor(),
    }
}

fn apply_properties(
    fn_proto: &Arc<JsObject>,
    prototype: &Arc<JsObject>,
    constructor: Option<&Arc<JsObject>>,
    properties: Vec<DeferredProperty>,
) {
    for prop in properties {
        match prop {
            DeferredProperty::Method {
                key,
                name,
                func,
                length,
            } => {
                let fn_val = make_native_fn(fn_proto.clone(), func, &name, length);
                prototype.define_property(key, PropertyDescriptor::builtin_method(fn_val));
            }
            DeferredProperty::Property { key, value, attrs } => {
                prototype.define_property(key, PropertyDescriptor::data_with_attrs(value, attrs));
            }
            DeferredProperty::Accessor {
                key,
                name,
                getter,
                setter,
            } => {
                prototype.define_property(key, accessor_descriptor(fn_proto, &name, getter, setter));
            }
            DeferredProperty::StaticAccessor {
                key,
                name,
                getter,
                setter,
            } => {
                if let Some(ctor) = constructor {
                    ctor.define_property(key, accessor_descriptor(fn_proto, &name, getter, setter));
                }
            }
            DeferredProperty::Alias { key, target } => {
                if let Some(existing) = prototype.get_own_property(&target) {
                    prototype.define_property(key, existing);
                }
            }
        }
    }
}

/// Builder for a builtin constructor + prototype pair.
///
/// The constructor and prototype objects are allocated by the caller before
/// building, which supports the two-stage intrinsics initialization.
pub struct BuiltInBuilder {
    fn_proto: Arc<JsObject>,
    constructor: Arc<JsObject>,
    prototype: Arc<JsObject>,
    name: String,
    parent_proto: Option<Arc<JsObject>>,
    ctor_length: u32,
    properties: Vec<DeferredProperty>,
}

impl BuiltInBuilder {
    /// Create a builder over pre-allocated objects.
    ///
    /// - `fn_proto`: `%Function.prototype%`, the `[[Prototype]]` of every
    ///   function created here
    /// - `constructor`: the constructor function object
    /// - `prototype`: the prototype object
    /// - `name`: constructor name (e.g. `"Set"`)
    pub fn new(
        fn_proto: Arc<JsObject>,
        constructor: Arc<JsObject>,
        prototype: Arc<JsObject>,
        name: &str,
    ) -> Self {
        Self {
            fn_proto,
            constructor,
            prototype,
            name: name.to_string(),
            parent_proto: None,
            ctor_length: 0,
            properties: Vec::new(),
        }
    }

    /// Set the prototype's `[[Prototype]]`
    pub fn inherits(mut self, parent_proto: Arc<JsObject>) -> Self {
        self.parent_proto = Some(parent_proto);
        self
    }

    /// Constructor arity (`Set.length`)
    pub fn constructor_length(mut self, length: u32) -> Self {
        self.ctor_length = length;
        self
    }

    /// Add a method to the prototype.
    pub fn method<F>(mut self, name: &str, f: F, length: u32) -> Self
    where
        F: Fn(&Value, &[Value], &mut NativeContext<'_>) -> VmResult<Value> + Send + Sync + 'static,
    {
        self.properties.push(DeferredProperty::Method {
            key: PropertyKey::string(name),
            name: name.to_string(),
            func: Arc::new(f),
            length,
        });
        self
    }

    /// Add a symbol-keyed method to the prototype (e.g. `[Symbol.iterator]`).
    pub fn symbol_method<F>(mut self, symbol: &Symbol, f: F, length: u32) -> Self
    where
        F: Fn(&Value, &[Value], &mut NativeContext<'_>) -> VmResult<Value> + Send + Sync + 'static,
    {
        self.properties.push(DeferredProperty::Method {
            key: PropertyKey::Symbol(symbol.id),
            name: symbol_name(symbol),
            func: Arc::new(f),
            length,
        });
        self
    }

    /// Install an existing prototype method under another key. The two keys
    /// hold the same function object.
    pub fn alias(mut self, key: PropertyKey, existing: &str) -> Self {
        self.properties.push(DeferredProperty::Alias {
            key,
            target: PropertyKey::string(existing),
        });
        self
    }

    /// Add a data property to the prototype with explicit attributes.
    pub fn property(mut self, key: PropertyKey, value: Value, attrs: PropertyAttributes) -> Self {
        self.properties
            .push(DeferredProperty::Property { key, value, attrs });
        self
    }

    /// Add a getter (and optional setter) to the prototype.
    pub fn accessor(mut self, name: &str, getter: Option<NativeFn>, setter: Option<NativeFn>) -> Self {
        self.properties.push(DeferredProperty::Accessor {
            key: PropertyKey::string(name),
            name: name.to_string(),
            getter,
            setter,
        });
        self
    }

    /// Add a symbol-keyed getter to the constructor (e.g. `[Symbol.species]`).
    pub fn static_symbol_accessor(mut self, symbol: &Symbol, getter: NativeFn) -> Self {
        self.properties.push(DeferredProperty::StaticAccessor {
            key: PropertyKey::Symbol(symbol.id),
            name: symbol_name(symbol),
            getter: Some(getter),
            setter: None,
        });
        self
    }

    /// Build the constructor + prototype pair.
    ///
    /// Sets the prototype's parent, applies the deferred properties, wires
    /// `constructor.prototype` (non-writable, non-configurable) and
    /// `prototype.constructor` (non-enumerable), then sets the constructor's
    /// `length` and `name`. Returns the constructor.
    pub fn build(self) -> Value {
        let BuiltInBuilder {
            fn_proto,
            constructor,
            prototype,
            name,
            parent_proto,
            ctor_length,
            properties,
        } = self;

        if let Some(parent) = parent_proto {
            prototype.set_prototype(Some(parent));
        }

        apply_properties(&fn_proto, &prototype, Some(&constructor), properties);

        constructor.define_property(
            PropertyKey::string("prototype"),
            PropertyDescriptor::data_with_attrs(
                Value::object(prototype.clone()),
                PropertyAttributes::frozen(),
            ),
        );
        prototype.define_property(
            PropertyKey::string("constructor"),
            PropertyDescriptor::data_with_attrs(
                Value::object(constructor.clone()),
                PropertyAttributes::constructor_link(),
            ),
        );

        constructor.define_property(
            PropertyKey::string("length"),
            PropertyDescriptor::function_length(Value::number(ctor_length as f64)),
        );
        constructor.define_property(
            PropertyKey::string("name"),
            PropertyDescriptor::function_length(Value::string(JsString::intern(&name))),
        );

        Value::object(constructor)
    }
}

/// Create a native function value with correct `length` and `name`
/// properties, using `fn_proto` as `[[Prototype]]`.
pub fn make_native_fn(fn_proto: Arc<JsObject>, func: NativeFn, name: &str, length: u32) -> Value {
    let fn_obj = JsObject::function(Some(fn_proto), func, false);

    fn_obj.define_property(
        PropertyKey::string("length"),
        PropertyDescriptor::function_length(Value::number(length as f64)),
    );
    fn_obj.define_property(
        PropertyKey::string("name"),
        PropertyDescriptor::function_length(Value::string(JsString::intern(name))),
    );

    Value::object(Arc::new(fn_obj))
}

/// Builder for prototype objects that have no constructor of their own
/// (`%SetIteratorPrototype%`, `%IteratorPrototype%`, `Object.prototype`).
pub struct PrototypeBuilder {
    fn_proto: Arc<JsObject>,
    object: Arc<JsObject>,
    parent_proto: Option<Arc<JsObject>>,
    properties: Vec<DeferredProperty>,
}

impl PrototypeBuilder {
    /// Create a builder over a pre-allocated object
    pub fn new(fn_proto: Arc<JsObject>, object: Arc<JsObject>) -> Self {
        Self {
            fn_proto,
            object,
            parent_proto: None,
            properties: Vec::new(),
        }
    }

    /// Set the object's `[[Prototype]]`
    pub fn inherits(mut self, parent_proto: Arc<JsObject>) -> Self {
        self.parent_proto = Some(parent_proto);
        self
    }

    /// Add a method
    pub fn method<F>(mut self, name: &str, f: F, length: u32) -> Self
    where
        F: Fn(&Value, &[Value], &mut NativeContext<'_>) -> VmResult<Value> + Send + Sync + 'static,
    {
        self.properties.push(DeferredProperty::Method {
            key: PropertyKey::string(name),
            name: name.to_string(),
            func: Arc::new(f),
            length,
        });
        self
    }

    /// Add a symbol-keyed method
    pub fn symbol_method<F>(mut self, symbol: &Symbol, f: F, length: u32) -> Self
    where
        F: Fn(&Value, &[Value], &mut NativeContext<'_>) -> VmResult<Value> + Send + Sync + 'static,
    {
        self.properties.push(DeferredProperty::Method {
            key: PropertyKey::Symbol(symbol.id),
            name: symbol_name(symbol),
            func: Arc::new(f),
            length,
        });
        self
    }

    /// Add a data property with explicit attributes
    pub fn property(mut self, key: PropertyKey, value: Value, attrs: PropertyAttributes) -> Self {
        self.properties
            .push(DeferredProperty::Property { key, value, attrs });
        self
    }

    /// Apply everything to the object
    pub fn build(self) -> Arc<JsObject> {
        if let Some(parent) = self.parent_proto {
            self.object.set_prototype(Some(parent));
        }
        apply_properties(&self.fn_proto, &self.object, None, self.properties);
        self.object
    }
}
