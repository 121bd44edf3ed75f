//! Type conversion abstract operations (ES2023 §7.1).
//!
//! `ToNumber` and `ToPrimitive` may run user code (`valueOf`, `toString`,
//! `@@toPrimitive`), so they take a [`NativeContext`]. The pure helpers
//! (`string_to_number`, `to_integer_or_infinity`, display formatting) do not.

use crate::context::NativeContext;
use crate::error::{VmError, VmResult};
use crate::intrinsics::well_known;
use crate::object::{ObjectKind, PropertyKey};
use crate::string::JsString;
use crate::value::Value;

/// Hint passed to `ToPrimitive`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// `"default"`
    Default,
    /// `"number"`
    Number,
    /// `"string"`
    String,
}

impl PreferredType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

/// ToPrimitive (ES2023 §7.1.1)
pub fn to_primitive(ncx: &mut NativeContext<'_>, value: &Value, hint: PreferredType) -> VmResult<Value> {
    let Some(obj) = value.as_object() else {
        return Ok(value.clone());
    };

    let exotic = ncx.get_method(value, &PropertyKey::Symbol(well_known::TO_PRIMITIVE))?;
    if let Some(exotic) = exotic {
        let hint_value = Value::string(JsString::intern(hint.as_str()));
        let result = ncx.call_function(&exotic, value, &[hint_value])?;
        if result.is_object() {
            return Err(VmError::type_error("Cannot convert object to primitive value"));
        }
        return Ok(result);
    }

    // OrdinaryToPrimitive
    let order = if hint == PreferredType::String {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    for name in order {
        let method = ncx.get(obj, &PropertyKey::string(name))?;
        if method.is_callable() {
            let result = ncx.call_function(&method, value, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(VmError::type_error("Cannot convert object to primitive value"))
}

/// ToNumber (ES2023 §7.1.4)
pub fn to_number(ncx: &mut NativeContext<'_>, value: &Value) -> VmResult<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::String(s) => Ok(string_to_number(s.as_str())),
        Value::Symbol(_) => Err(VmError::type_error(
            "Cannot convert a Symbol value to a number",
        )),
        Value::BigInt(_) => Err(VmError::type_error(
            "Cannot convert a BigInt value to a number",
        )),
        Value::Object(_) => {
            let primitive = to_primitive(ncx, value, PreferredType::Number)?;
            to_number(ncx, &primitive)
        }
    }
}

/// ToIntegerOrInfinity (ES2023 §7.1.5) applied to an already-numeric value.
/// NaN becomes 0, infinities pass through, everything else truncates, and
/// `-0` becomes `+0`.
pub fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        return 0.0;
    }
    if n.is_infinite() {
        return n;
    }
    let truncated = n.trunc();
    if truncated == 0.0 { 0.0 } else { truncated }
}

/// JS WhiteSpace and LineTerminator code points
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_decimal_literal(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return false;
    }
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}

/// StringToNumber (ES2023 §7.1.4.1.1)
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let bytes = trimmed.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&trimmed[2..], radix);
        }
    }
    if !is_decimal_literal(trimmed) {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number::toString for display purposes
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// String form of a value that never runs user code, used in error
/// messages.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.as_str().to_string(),
        Value::Symbol(sym) => match &sym.description {
            Some(desc) => format!("Symbol({desc})"),
            None => "Symbol()".to_string(),
        },
        Value::BigInt(b) => b.value.clone(),
        Value::Object(obj) => match obj.kind() {
            ObjectKind::Function(_) => {
                let name = obj
                    .get(&PropertyKey::string("name"))
                    .and_then(|v| v.as_string().map(|s| s.as_str().to_string()))
                    .unwrap_or_default();
                format!("function {name}() {{ [native code] }}")
            }
            ObjectKind::Array => "[object Array]".to_string(),
            ObjectKind::Set(_) => "[object Set]".to_string(),
            ObjectKind::SetIterator(_) => "[object Set Iterator]".to_string(),
            ObjectKind::Ordinary => "[object Object]".to_string(),
        },
    }
}
