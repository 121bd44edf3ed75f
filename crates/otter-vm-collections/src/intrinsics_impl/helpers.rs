//! Helper functions for intrinsics (strict equality, SameValueZero, etc.)

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::value::Value;

/// Strict equality (===) for Value.
pub fn strict_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        // NaN !== NaN, +0 === -0
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => Arc::ptr_eq(x, y) || x.as_str() == y.as_str(),
        (Value::Symbol(x), Value::Symbol(y)) => x.id == y.id,
        (Value::BigInt(x), Value::BigInt(y)) => x.value == y.value,
        (Value::Object(x), Value::Object(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}

/// SameValue comparison (ES2026 §7.2.10).
/// Like strict equality but NaN === NaN and +0 !== -0.
pub fn same_value(a: &Value, b: &Value) -> bool {
    if let (Some(n1), Some(n2)) = (a.as_number(), b.as_number()) {
        if n1.is_nan() && n2.is_nan() {
            return true;
        }
        if n1 == 0.0 && n2 == 0.0 {
            return n1.is_sign_positive() == n2.is_sign_positive();
        }
        n1 == n2
    } else {
        strict_equal(a, b)
    }
}

/// SameValueZero comparison (used by Set and Array.prototype.includes).
/// Like strict equality but NaN === NaN.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    if let (Some(n1), Some(n2)) = (a.as_number(), b.as_number()) {
        if n1.is_nan() && n2.is_nan() {
            return true;
        }
        n1 == n2
    } else {
        strict_equal(a, b)
    }
}

/// Replace `-0` with `+0`; every other value passes through.
pub fn normalize_zero(value: Value) -> Value {
    if value.is_negative_zero() {
        Value::number(0.0)
    } else {
        value
    }
}

// ============================================================================
// SetKey: Value wrapper with SameValueZero Hash/Eq for Set members
// ============================================================================

/// A wrapper around `Value` that implements `Hash` and `Eq` using SameValueZero
/// semantics, so it can key the lookup index of a Set.
///
/// SameValueZero: NaN equals NaN, -0 equals +0, otherwise strict equality.
#[derive(Clone)]
pub struct SetKey(Value);

impl SetKey {
    /// Wrap a value. `-0` is stored as `+0`.
    pub fn new(value: Value) -> Self {
        Self(normalize_zero(value))
    }

    /// Returns a reference to the underlying `Value`.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the `SetKey` and returns the underlying `Value`.
    pub fn into_value(self) -> Value {
        self.0
    }
}

// Type discriminant tags for hashing
const HASH_TAG_UNDEFINED: u8 = 0;
const HASH_TAG_NULL: u8 = 1;
const HASH_TAG_BOOL: u8 = 2;
const HASH_TAG_NUMBER: u8 = 3;
const HASH_TAG_STRING: u8 = 4;
const HASH_TAG_SYMBOL: u8 = 5;
const HASH_TAG_BIGINT: u8 = 6;
const HASH_TAG_OBJECT: u8 = 7;

/// Normalize a float for SameValueZero hashing: -0 → +0, NaN → canonical NaN bits.
fn normalize_float_bits(n: f64) -> u64 {
    if n == 0.0 {
        0u64
    } else if n.is_nan() {
        0x7FF8_0000_0000_0000u64
    } else {
        n.to_bits()
    }
}

impl Hash for SetKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => HASH_TAG_UNDEFINED.hash(state),
            Value::Null => HASH_TAG_NULL.hash(state),
            Value::Boolean(b) => {
                HASH_TAG_BOOL.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                HASH_TAG_NUMBER.hash(state);
                normalize_float_bits(*n).hash(state);
            }
            Value::String(s) => {
                HASH_TAG_STRING.hash(state);
                s.as_str().hash(state);
            }
            Value::Symbol(sym) => {
                HASH_TAG_SYMBOL.hash(state);
                sym.id.hash(state);
            }
            Value::BigInt(b) => {
                HASH_TAG_BIGINT.hash(state);
                b.value.hash(state);
            }
            Value::Object(obj) => {
                HASH_TAG_OBJECT.hash(state);
                (Arc::as_ptr(obj) as usize).hash(state);
            }
        }
    }
}

impl PartialEq for SetKey {
    fn eq(&self, other: &Self) -> bool {
        same_value_zero(&self.0, &other.0)
    }
}

impl Eq for SetKey {}

impl std::fmt::Debug for SetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SetKey({:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::JsObject;
    use crate::value::Symbol;
    use rustc_hash::FxHasher;

    fn hash_of(key: &SetKey) -> u64 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_same_value_zero_numbers() {
        assert!(same_value_zero(&Value::number(0.0), &Value::number(-0.0)));
        assert!(same_value_zero(&Value::number(f64::NAN), &Value::number(f64::NAN)));
        assert!(!same_value_zero(&Value::number(1.0), &Value::number(2.0)));
    }

    #[test]
    fn test_equality_relations_differ_on_specials() {
        let nan = Value::number(f64::NAN);
        let pos = Value::number(0.0);
        let neg = Value::number(-0.0);

        assert!(!strict_equal(&nan, &nan));
        assert!(strict_equal(&pos, &neg));
        assert!(same_value(&nan, &nan));
        assert!(!same_value(&pos, &neg));
        assert!(same_value_zero(&nan, &nan));
        assert!(same_value_zero(&pos, &neg));
    }

    #[test]
    fn test_different_kinds_never_equal() {
        assert!(!same_value_zero(&Value::int32(1), &Value::from("1")));
        assert!(!same_value_zero(&Value::undefined(), &Value::null()));
        assert!(!same_value_zero(&Value::boolean(false), &Value::int32(0)));
        assert!(!same_value_zero(&Value::bigint("1"), &Value::int32(1)));
        assert!(same_value_zero(&Value::bigint("01"), &Value::bigint("1")));
    }

    #[test]
    fn test_objects_and_symbols_by_identity() {
        let a = Arc::new(JsObject::new(None));
        let b = Arc::new(JsObject::new(None));
        assert!(same_value_zero(&Value::object(a.clone()), &Value::object(a)));
        assert!(!same_value_zero(&Value::object(b), &Value::object(Arc::new(JsObject::new(None)))));

        let s1 = Symbol::new(Some("s"));
        let s2 = Symbol::new(Some("s"));
        assert!(same_value_zero(&Value::symbol(s1.clone()), &Value::symbol(s1)));
        assert!(!same_value_zero(&Value::symbol(s2), &Value::symbol(Symbol::new(Some("s")))));
    }

    #[test]
    fn test_set_key_hash_consistent_with_eq() {
        let pos = SetKey::new(Value::number(0.0));
        let neg = SetKey::new(Value::number(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(hash_of(&pos), hash_of(&neg));

        let nan_a = SetKey::new(Value::number(f64::NAN));
        let nan_b = SetKey::new(Value::number(f64::from_bits(0x7FF8_0000_0000_0001)));
        assert_eq!(nan_a, nan_b);
        assert_eq!(hash_of(&nan_a), hash_of(&nan_b));

        let s1 = SetKey::new(Value::from("abc"));
        let s2 = SetKey::new(Value::string(std::sync::Arc::new(crate::string::JsString::new("abc"))));
        assert_eq!(s1, s2);
        assert_eq!(hash_of(&s1), hash_of(&s2));
    }

    #[test]
    fn test_set_key_normalizes_negative_zero() {
        let key = SetKey::new(Value::number(-0.0));
        assert!(!key.value().is_negative_zero());
        assert!(key.into_value().as_number().is_some_and(|n| n == 0.0));
    }
}
