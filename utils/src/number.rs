//! Loose numeric coercion.
//!
//! Concurrency limits and chunk sizes often arrive as untyped input (CLI
//! arguments, JSON payloads, config values). [`to_number`] turns any of them
//! into a number, falling back to a default when the coercion is unusable.

use serde_json::Value;

/// Host-style numeric coercion of a value.
///
/// Implementations never fail; inputs with no numeric reading yield `NaN`.
pub trait ToNumber {
    fn coerce(&self) -> f64;
}

macro_rules! numeric_to_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToNumber for $ty {
                fn coerce(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

numeric_to_number!(f32, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ToNumber for f64 {
    fn coerce(&self) -> f64 {
        *self
    }
}

impl ToNumber for bool {
    fn coerce(&self) -> f64 {
        if *self { 1.0 } else { 0.0 }
    }
}

impl ToNumber for str {
    fn coerce(&self) -> f64 {
        parse_number(self)
    }
}

impl ToNumber for String {
    fn coerce(&self) -> f64 {
        parse_number(self)
    }
}

/// `None` stands for an absent value and never coerces.
impl<T: ToNumber> ToNumber for Option<T> {
    fn coerce(&self) -> f64 {
        self.as_ref().map_or(f64::NAN, ToNumber::coerce)
    }
}

impl<T: ToNumber + ?Sized> ToNumber for &T {
    fn coerce(&self) -> f64 {
        (**self).coerce()
    }
}

impl ToNumber for Value {
    fn coerce(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(flag) => flag.coerce(),
            Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
            Value::String(text) => parse_number(text),
            // Arrays coerce through their comma-joined string form.
            Value::Array(_) => parse_number(&loose_string(self)),
            Value::Object(_) => f64::NAN,
        }
    }
}

/// Converts `value` to a number, returning `default` when the coercion is
/// not finite (`NaN` or infinite).
///
/// Zero-valued coercions are kept: `null`, `false`, `""` and `[]` all give
/// `0` whatever the default.
#[must_use]
pub fn to_number<V: ToNumber + ?Sized>(value: &V, default: f64) -> f64 {
    let number = value.coerce();
    if number.is_finite() { number } else { default }
}

/// Reads a concurrency limit out of a loose value. Anything below 1 is unset (0).
#[must_use]
pub fn concurrency_from<V: ToNumber + ?Sized>(value: &V) -> usize {
    let limit = to_number(value, 0.0);
    if limit >= 1.0 { limit.floor() as usize } else { 0 }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let head = trimmed.get(..2).map(str::to_ascii_lowercase);
        if head.as_deref() == Some(prefix) {
            let digits = &trimmed[2..];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return f64::NAN;
            }
            return u128::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }

    // Rust's float parser also takes "inf" and "nan"; the loose grammar does not.
    let decimal = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn loose_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(loose_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
