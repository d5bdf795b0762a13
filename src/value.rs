//! Values a clinical finding can hold.
//!
//! Findings are numeric (heart rate, lactate), boolean (seizures present)
//! or enumerated text (skin color, rash type). Values serialize as plain
//! JSON scalars so a snapshot reads `{"heartRate": 170, "fever": true}`.
//! Non-finite floats, which JSON numbers cannot carry, serialize as a
//! marker object such as `{"non_finite": "nan"}`.

use serde::{Deserialize, Serialize};

/// An observed value for a single finding.
///
/// # Examples
///
/// ```
/// use resus_core::FindingValue;
///
/// let hr = FindingValue::from(170);
/// let fever = FindingValue::from(true);
/// let skin = FindingValue::from("mottled");
///
/// assert_eq!(hr.as_number(), Some(170.0));
/// assert_eq!(fever.as_bool(), Some(true));
/// assert_eq!(skin.as_text(), Some("mottled"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingValue {
    /// Present or absent sign.
    Bool(bool),
    /// Whole-number measurement.
    Int(i64),
    /// Fractional measurement. May be non-finite.
    Float(#[serde(with = "lossless_f64")] f64),
    /// Enumerated or free-text observation.
    Text(String),
}

impl FindingValue {
    /// Returns true for a boolean value.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns true for an integer or float value.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns true for a text value.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Reads the value as a number. Integers widen to `f64`; NaN is treated
    /// as not observed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl std::fmt::Display for FindingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for FindingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FindingValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FindingValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FindingValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for FindingValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for FindingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FindingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FindingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Serde codec for `f64` that survives JSON: finite values are plain
/// numbers, NaN and the infinities become `{"non_finite": ...}`.
pub(crate) mod lossless_f64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum NonFinite {
        Nan,
        Infinity,
        NegInfinity,
    }

    #[derive(Serialize)]
    struct Marker {
        non_finite: NonFinite,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Finite(f64),
        Marked { non_finite: NonFinite },
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            return serializer.serialize_f64(*value);
        }
        let non_finite = if value.is_nan() {
            NonFinite::Nan
        } else if value.is_sign_positive() {
            NonFinite::Infinity
        } else {
            NonFinite::NegInfinity
        };
        Marker { non_finite }.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Finite(v) => v,
            Repr::Marked { non_finite } => match non_finite {
                NonFinite::Nan => f64::NAN,
                NonFinite::Infinity => f64::INFINITY,
                NonFinite::NegInfinity => f64::NEG_INFINITY,
            },
        })
    }
}
