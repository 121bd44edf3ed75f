//! JavaScript objects
//!
//! Objects keep an insertion-ordered property table (data and accessor
//! properties), a mutable `[[Prototype]]`, and an internal [`ObjectKind`]
//! that carries the slots of exotic and built-in objects (native functions,
//! Sets, Set iterators).
//!
//! Methods on `JsObject` never run user code. Property reads that must invoke
//! getters go through [`NativeContext::get`](crate::context::NativeContext::get).

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

use crate::intrinsics_impl::set_iterator::SetIteratorState;
use crate::set_data::SetData;
use crate::string::JsString;
use crate::value::{NativeFn, Value};

/// Property key (string or symbol)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String property key
    String(Arc<JsString>),
    /// Symbol property key (by symbol id)
    Symbol(u64),
    /// Integer index (for arrays)
    Index(u32),
}

impl PropertyKey {
    /// Create a string property key
    pub fn string(s: &str) -> Self {
        Self::String(JsString::intern(s))
    }

    /// Create an index property key
    pub fn index(i: u32) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::Index(i)
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "Symbol(#{id})"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    /// Built-in methods: writable, non-enumerable, configurable
    pub const fn builtin_method() -> Self {
        Self {
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    /// Built-in accessors and `@@toStringTag`: configurable only
    pub const fn builtin_accessor() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: true,
        }
    }

    /// `prototype.constructor` link
    pub const fn constructor_link() -> Self {
        Self::builtin_method()
    }
}

/// Property descriptor
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<Value>,
        /// Setter function
        set: Option<Value>,
        /// Attributes (`writable` is ignored)
        attributes: PropertyAttributes,
    },
}

impl PropertyDescriptor {
    /// Create a data property
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Built-in method property
    pub fn builtin_method(value: Value) -> Self {
        Self::data_with_attrs(value, PropertyAttributes::builtin_method())
    }

    /// `length` / `name` of a function: configurable only
    pub fn function_length(value: Value) -> Self {
        Self::data_with_attrs(value, PropertyAttributes::builtin_accessor())
    }

    /// Enumerable, configurable accessor (the shape user getters get)
    pub fn accessor(get: Option<Value>, set: Option<Value>) -> Self {
        Self::Accessor {
            get,
            set,
            attributes: PropertyAttributes {
                writable: false,
                enumerable: true,
                configurable: true,
            },
        }
    }

    /// Get the value (for data properties)
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Attributes of either descriptor kind
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Check if writable
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { .. } => false,
        }
    }
}

/// A native (host) function slot
#[derive(Clone)]
pub struct NativeFunction {
    /// Implementation
    pub func: NativeFn,
    /// Whether `construct` may be used on this function
    pub is_constructor: bool,
}

/// Internal slots that distinguish built-in objects from ordinary ones
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array (elements stored as index properties plus `length`)
    Array,
    /// Callable native function
    Function(NativeFunction),
    /// Set instance (`[[SetData]]`)
    Set(Arc<SetData>),
    /// Set Iterator instance
    SetIterator(SetIteratorState),
}

impl ObjectKind {
    /// Short class name used in debug output
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Ordinary => "Object",
            Self::Array => "Array",
            Self::Function(_) => "Function",
            Self::Set(_) => "Set",
            Self::SetIterator(_) => "Set Iterator",
        }
    }
}

type PropertyMap = IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>;

/// A JavaScript object
///
/// Thread-safe with interior mutability. No lock is held while user code
/// runs, so getters and callbacks may freely re-enter the same object.
pub struct JsObject {
    /// Properties storage, in insertion order
    properties: RwLock<PropertyMap>,
    /// Prototype (None for Object.prototype)
    prototype: RwLock<Option<Arc<JsObject>>>,
    kind: ObjectKind,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn new(prototype: Option<Arc<JsObject>>) -> Self {
        Self::with_kind(prototype, ObjectKind::Ordinary)
    }

    /// Create an object with the given internal slots
    pub fn with_kind(prototype: Option<Arc<JsObject>>, kind: ObjectKind) -> Self {
        Self {
            properties: RwLock::new(PropertyMap::default()),
            prototype: RwLock::new(prototype),
            kind,
        }
    }

    /// Create a native function object
    pub fn function(fn_proto: Option<Arc<JsObject>>, func: NativeFn, is_constructor: bool) -> Self {
        Self::with_kind(
            fn_proto,
            ObjectKind::Function(NativeFunction {
                func,
                is_constructor,
            }),
        )
    }

    /// Create an array holding `values`
    pub fn array(prototype: Option<Arc<JsObject>>, values: Vec<Value>) -> Self {
        let obj = Self::with_kind(prototype, ObjectKind::Array);
        {
            let mut props = obj.properties.write();
            let len = values.len();
            for (i, value) in values.into_iter().enumerate() {
                props.insert(PropertyKey::Index(i as u32), PropertyDescriptor::data(value));
            }
            props.insert(
                PropertyKey::string("length"),
                PropertyDescriptor::data_with_attrs(
                    Value::number(len as f64),
                    PropertyAttributes {
                        writable: true,
                        enumerable: false,
                        configurable: false,
                    },
                ),
            );
        }
        obj
    }

    /// Internal slots
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Is this a callable native function
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    /// Is this a constructor
    pub fn is_constructor(&self) -> bool {
        matches!(&self.kind, ObjectKind::Function(f) if f.is_constructor)
    }

    /// Native function slot, if callable
    pub fn as_native_function(&self) -> Option<&NativeFunction> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// `[[SetData]]`, if this is a Set
    pub fn as_set_data(&self) -> Option<&Arc<SetData>> {
        match &self.kind {
            ObjectKind::Set(data) => Some(data),
            _ => None,
        }
    }

    /// Is this a Set instance
    pub fn is_set(&self) -> bool {
        matches!(self.kind, ObjectKind::Set(_))
    }

    /// Is this an array
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array)
    }

    /// Raw data-property read along the prototype chain.
    ///
    /// Accessor properties yield `None`: getters are only run by
    /// `NativeContext::get`.
    pub fn get(&self, key: &PropertyKey) -> Option<Value> {
        if let Some(desc) = self.properties.read().get(key) {
            return desc.value().cloned();
        }
        let proto = self.prototype.read().clone();
        proto.and_then(|p| p.get(key))
    }

    /// Own property descriptor (cloned)
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.read().get(key).cloned()
    }

    /// Set a data property. Returns `false` if the write is rejected
    /// (non-writable or accessor).
    pub fn set(&self, key: PropertyKey, value: Value) -> bool {
        let mut props = self.properties.write();
        match props.get_mut(&key) {
            Some(PropertyDescriptor::Data {
                value: slot,
                attributes,
            }) => {
                if !attributes.writable {
                    return false;
                }
                *slot = value;
                true
            }
            Some(PropertyDescriptor::Accessor { .. }) => false,
            None => {
                props.insert(key, PropertyDescriptor::data(value));
                true
            }
        }
    }

    /// Define (or replace) an own property
    pub fn define_property(&self, key: PropertyKey, desc: PropertyDescriptor) -> bool {
        let mut props = self.properties.write();
        if let Some(existing) = props.get(&key) {
            if !existing.attributes().configurable {
                return false;
            }
        }
        props.insert(key, desc);
        true
    }

    /// Delete an own property. Non-configurable properties are kept.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        let mut props = self.properties.write();
        match props.get(key) {
            Some(desc) if !desc.attributes().configurable => false,
            Some(_) => {
                props.shift_remove(key);
                true
            }
            None => true,
        }
    }

    /// Check if object has own property
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Check if object has property (including prototype chain)
    pub fn has(&self, key: &PropertyKey) -> bool {
        if self.has_own(key) {
            return true;
        }
        let proto = self.prototype.read().clone();
        proto.is_some_and(|p| p.has(key))
    }

    /// Get prototype
    pub fn prototype(&self) -> Option<Arc<JsObject>> {
        self.prototype.read().clone()
    }

    /// Replace the prototype
    pub fn set_prototype(&self, prototype: Option<Arc<JsObject>>) {
        *self.prototype.write() = prototype;
    }

    /// Array elements `0..length` (holes read as `undefined`)
    pub fn array_values(&self) -> Vec<Value> {
        let len = self
            .get(&PropertyKey::string("length"))
            .and_then(|v| v.as_number())
            .unwrap_or(0.0) as u32;
        (0..len)
            .map(|i| self.get(&PropertyKey::Index(i)).unwrap_or_default())
            .collect()
    }
}

impl std::fmt::Debug for JsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsObject")
            .field("kind", &self.kind.class_name())
            .field("properties", &self.properties.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_get_set() {
        let obj = JsObject::new(None);

        obj.set(PropertyKey::string("foo"), Value::int32(42));
        assert_eq!(obj.get(&PropertyKey::string("foo")), Some(Value::int32(42)));
    }

    #[test]
    fn test_object_has_through_prototype() {
        let proto = Arc::new(JsObject::new(None));
        proto.set(PropertyKey::string("inherited"), Value::boolean(true));
        let obj = JsObject::new(Some(proto));
        obj.set(PropertyKey::string("foo"), Value::int32(42));

        assert!(obj.has(&PropertyKey::string("foo")));
        assert!(obj.has(&PropertyKey::string("inherited")));
        assert!(!obj.has_own(&PropertyKey::string("inherited")));
        assert!(!obj.has(&PropertyKey::string("bar")));
    }

    #[test]
    fn test_non_writable_rejects_set() {
        let obj = JsObject::new(None);
        obj.define_property(
            PropertyKey::string("tag"),
            PropertyDescriptor::data_with_attrs(Value::from("Set"), PropertyAttributes::frozen()),
        );
        assert!(!obj.set(PropertyKey::string("tag"), Value::from("Other")));
        assert!(!obj.delete(&PropertyKey::string("tag")));
        assert_eq!(obj.get(&PropertyKey::string("tag")), Some(Value::from("Set")));
    }

    #[test]
    fn test_accessor_not_read_by_raw_get() {
        let obj = JsObject::new(None);
        obj.define_property(
            PropertyKey::string("size"),
            PropertyDescriptor::accessor(None, None),
        );
        assert!(obj.has_own(&PropertyKey::string("size")));
        assert_eq!(obj.get(&PropertyKey::string("size")), None);
    }

    #[test]
    fn test_array() {
        let arr = JsObject::array(None, vec![Value::int32(1), Value::int32(2)]);
        assert!(arr.is_array());
        assert_eq!(arr.get(&PropertyKey::Index(1)), Some(Value::int32(2)));
        assert_eq!(arr.array_values(), vec![Value::int32(1), Value::int32(2)]);
    }

    #[test]
    fn test_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JsObject>();
    }
}
