//! JavaScript values
//!
//! `Value` is a small tagged enum. Heap data (strings, symbols, objects) sits
//! behind `Arc`, so cloning a value is cheap and values are `Send + Sync`.
//!
//! Two numeric special cases matter to collections and are exposed directly:
//! NaN ([`Value::is_nan`]) and negative zero ([`Value::is_negative_zero`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::NativeContext;
use crate::error::VmError;
use crate::object::JsObject;
use crate::string::JsString;

/// Native function handler type.
///
/// Receives `this`, the argument list, and the calling context.
pub type NativeFn =
    Arc<dyn Fn(&Value, &[Value], &mut NativeContext<'_>) -> Result<Value, VmError> + Send + Sync>;

/// First id handed out to user-created symbols. Ids below this are reserved
/// for the well-known symbols in [`crate::intrinsics::well_known`].
const FIRST_USER_SYMBOL_ID: u64 = 100;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(FIRST_USER_SYMBOL_ID);

/// A JavaScript symbol
#[derive(Debug)]
pub struct Symbol {
    /// Optional description (`Symbol("desc")`)
    pub description: Option<Arc<JsString>>,
    /// Unique identity
    pub id: u64,
}

impl Symbol {
    /// Create a fresh, unique symbol
    pub fn new(description: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            description: description.map(JsString::intern),
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Create a symbol with a fixed, pre-assigned id (well-known symbols)
    pub fn with_id(id: u64, description: &str) -> Arc<Self> {
        Arc::new(Self {
            description: Some(JsString::intern(description)),
            id,
        })
    }
}

/// A JavaScript BigInt, kept in its decimal string form
#[derive(Debug)]
pub struct BigInt {
    /// Canonical decimal digits (with leading `-` when negative)
    pub value: String,
}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// IEEE 754 double
    Number(f64),
    /// String
    String(Arc<JsString>),
    /// Symbol
    Symbol(Arc<Symbol>),
    /// BigInt
    BigInt(Arc<BigInt>),
    /// Any object, including functions, arrays, Sets and iterators
    Object(Arc<JsObject>),
}

impl Value {
    /// `undefined`
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// `null`
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Number value
    #[inline]
    pub const fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Number value from an i32
    #[inline]
    pub const fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// String value
    pub fn string(s: Arc<JsString>) -> Self {
        Self::String(s)
    }

    /// Object value
    pub fn object(obj: Arc<JsObject>) -> Self {
        Self::Object(obj)
    }

    /// Symbol value
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// BigInt value from its decimal digits. Leading zeros are dropped and
    /// `-0` becomes `0`, so equal BigInts always have equal digits.
    pub fn bigint(value: impl AsRef<str>) -> Self {
        let raw = value.as_ref();
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let digits = digits.trim_start_matches('0');
        let value = match (negative, digits.is_empty()) {
            (_, true) => "0".to_string(),
            (true, false) => format!("-{digits}"),
            (false, false) => digits.to_string(),
        };
        Self::BigInt(Arc::new(BigInt { value }))
    }

    /// Is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Is a boolean
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    /// Is a number
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Is the number NaN
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_nan())
    }

    /// Is the number `-0`
    pub fn is_negative_zero(&self) -> bool {
        matches!(self, Self::Number(n) if *n == 0.0 && n.is_sign_negative())
    }

    /// Is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Is a symbol
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Is a BigInt
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    /// Is an object (of any kind)
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Is a callable object
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Object(obj) if obj.is_callable())
    }

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as i32 if the number is integral and in range
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Self::Number(n)
                if n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64 =>
            {
                Some(*n as i32)
            }
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&Arc<JsString>> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as symbol
    pub fn as_symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get as BigInt
    pub fn as_bigint(&self) -> Option<&Arc<BigInt>> {
        match self {
            Self::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&Arc<JsObject>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// ToBoolean (ES2023 §7.1.2)
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::BigInt(b) => b.value != "0",
            Self::Symbol(_) | Self::Object(_) => true,
        }
    }

    /// `typeof` result
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::BigInt(_) => "bigint",
            Self::Object(obj) if obj.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }
}

/// `==` on `Value` is SameValue: NaN equals NaN, `+0` and `-0` differ.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::intrinsics_impl::helpers::same_value(self, other)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) if *n == 0.0 && n.is_sign_negative() => write!(f, "-0"),
            Self::Number(_) => write!(f, "{}", crate::convert::to_display_string(self)),
            Self::String(s) => write!(f, "{:?}", s.as_str()),
            Self::Symbol(sym) => match &sym.description {
                Some(desc) => write!(f, "Symbol({desc})"),
                None => write!(f, "Symbol()"),
            },
            Self::BigInt(b) => write!(f, "{}n", b.value),
            Self::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(JsString::intern(s))
    }
}

impl From<Arc<JsObject>> for Value {
    fn from(obj: Arc<JsObject>) -> Self {
        Self::Object(obj)
    }
}
