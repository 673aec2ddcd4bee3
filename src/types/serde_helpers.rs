//! Custom serde deserializers for flexible type handling
//!
//! OpenAI-style clients are loose about scalar types: `auto_prompt` shows up
//! as `true`, `1` or `"true"`, and `duration` as `5` or `"5"`.

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Deserialize an optional boolean given as a JSON boolean, an integer
/// (`0` is false, positive is true, negative is false) or one of the strings
/// `"true"`, `"false"`, `"1"`, `"0"` (case-insensitive).
pub fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Bool(b)) => Ok(Some(b)),
        Some(Scalar::Int(i)) => Ok(Some(i > 0)),
        Some(Scalar::Float(f)) => Ok(Some(f > 0.0)),
        Some(Scalar::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!("invalid boolean string: {}", s))),
        },
    }
}

/// Deserialize an optional non-negative integer given as a number or a
/// numeric string. Whole-valued floats (`5.0`) are accepted.
pub fn deserialize_flexible_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let out_of_range = |v: &dyn std::fmt::Display| -> D::Error {
        de::Error::custom(format!("invalid non-negative integer: {}", v))
    };

    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(i)) => u32::try_from(i).map(Some).map_err(|_| out_of_range(&i)),
        Some(Scalar::Float(f)) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
            Ok(Some(f as u32))
        }
        Some(Scalar::Float(f)) => Err(out_of_range(&f)),
        Some(Scalar::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse().map(Some).map_err(|_| out_of_range(&s))
        }
        Some(Scalar::Bool(b)) => Err(out_of_range(&b)),
    }
}
