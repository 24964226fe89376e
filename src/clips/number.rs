//! Stored numbers are written the way the web app wrote them: whole values
//! without a fractional part (`1`, not `1.0`), everything else in shortest
//! round-trip form.

use serde::{Deserialize, Deserializer, Serializer};

/// Largest magnitude below which every whole f64 is an exact integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer)
}
