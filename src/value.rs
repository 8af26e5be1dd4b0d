#[cfg(not(feature = "std"))]
use crate::std;

#[cfg(feature = "derive")]
use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt;
use std::string::String;

use crate::Error;

#[cfg(feature = "debug")]
use log::debug;

/// How a raw token gets coerced once it has been matched to a definition.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub enum ValueKind {
    String,
    Integer,
    Float,
}

impl Default for ValueKind {
    fn default() -> Self {
        ValueKind::String
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub enum Value {
    String(String),
    Int(i32),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
        }
    }
}

macro_rules! converters {
    ($x:ty, $into:ident) => {
        impl std::convert::From<$x> for Value {
            fn from(val: $x) -> Self {
                Value::$into(val)
            }
        }

        impl TryFrom<Value> for $x {
            type Error = Error;

            fn try_from(value: Value) -> Result<$x, Error> {
                match value {
                    Value::$into(b) => Ok(b),
                    e => Err(Error::WrongValueType(e)),
                }
            }
        }

        impl<'a> TryFrom<&'a Value> for &'a $x {
            type Error = Error;

            fn try_from(value: &'a Value) -> Result<&'a $x, Error> {
                match value {
                    Value::$into(b) => Ok(b),
                    e => Err(Error::WrongValueType(e.clone())),
                }
            }
        }
    };
}

converters!(i32, Int);
converters!(f64, Float);
converters!(String, String);

impl<'a> TryFrom<&'a Value> for &'a str {
    type Error = Error;

    fn try_from(value: &'a Value) -> Result<&'a str, Error> {
        match value {
            Value::String(b) => Ok(b),
            e => Err(Error::WrongValueType(e.clone())),
        }
    }
}

impl std::convert::From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(String::from(val))
    }
}

/// Coerces `raw` into a [`Value`] of the given kind.
///
/// Numeric kinds are permissive unless `strict` is set: the longest numeric prefix is used and text
/// without one becomes zero. In strict mode the whole token has to parse.
pub(crate) fn coerce(kind: ValueKind, raw: &str, strict: bool) -> Result<Value, Error> {
    Ok(match kind {
        ValueKind::String => Value::from(raw),
        ValueKind::Integer if strict => Value::Int(
            raw.parse::<i32>()
                .map_err(|_| Error::InvalidValue(String::from(raw), kind))?,
        ),
        ValueKind::Float if strict => Value::Float(
            raw.parse::<f64>()
                .map_err(|_| Error::InvalidValue(String::from(raw), kind))?,
        ),
        ValueKind::Integer => Value::Int(leading_int(raw)),
        ValueKind::Float => Value::Float(leading_float(raw)),
    })
}

fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

// atoi: optional whitespace and sign, then as many digits as there are. Saturates at the i32 bounds.
fn leading_int(raw: &str) -> i32 {
    let s = raw.trim_start_matches(is_c_space);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let limit = i64::from(i32::MAX) + 1;
    let mut acc: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(|b| b.is_ascii_digit()) {
        seen = true;
        acc = (acc * 10 + i64::from(b - b'0')).min(limit);
    }
    if !seen {
        debug!("no integer prefix in {:?}, using 0", raw);
    }
    let acc = if negative { -acc } else { acc };
    acc.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// atof: optional whitespace and sign, then inf/nan or a decimal mantissa with an optional exponent.
fn leading_float(raw: &str) -> f64 {
    let s = raw.trim_start_matches(is_c_space);
    let bytes = s.as_bytes();
    let mut end = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let sign = if bytes.first() == Some(&b'-') { -1.0 } else { 1.0 };

    let rest = &bytes[end..];
    if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b"nan") {
        return f64::NAN;
    }
    if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b"inf") {
        return sign * f64::INFINITY;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        debug!("no float prefix in {:?}, using 0", raw);
        return 0.0;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if let Some(b'+') | Some(b'-') = bytes.get(exp) {
            exp += 1;
        }
        let start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > start {
            end = exp;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}
