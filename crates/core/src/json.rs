//! Serde adapters for loosely-typed JSON fields.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accept an id sent as either a JSON string or a number. Numbers keep their decimal form.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// Integer-valued numbers go out as `12`, not `12.0`.
pub(crate) fn whole_as_integer<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Largest magnitude below which every integer is exact in an f64.
    const EXACT: f64 = 9_007_199_254_740_992.0;

    if value.fract() == 0.0 && value.abs() < EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Tagged {
        #[serde(default, deserialize_with = "string_or_number")]
        id: Option<String>,
    }

    #[derive(Serialize)]
    struct Measured {
        #[serde(serialize_with = "whole_as_integer")]
        value: f64,
    }

    #[test]
    fn ids_accept_strings_and_numbers() {
        let t: Tagged = serde_json::from_value(json!({ "id": "q1" })).unwrap();
        assert_eq!(t.id.as_deref(), Some("q1"));

        let t: Tagged = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(t.id.as_deref(), Some("7"));

        let t: Tagged = serde_json::from_value(json!({ "id": 2.5 })).unwrap();
        assert_eq!(t.id.as_deref(), Some("2.5"));

        let t: Tagged = serde_json::from_value(json!({})).unwrap();
        assert!(t.id.is_none());

        let t: Tagged = serde_json::from_value(json!({ "id": null })).unwrap();
        assert!(t.id.is_none());
    }

    #[test]
    fn ids_reject_other_json_types() {
        assert!(serde_json::from_value::<Tagged>(json!({ "id": [1] })).is_err());
        assert!(serde_json::from_value::<Tagged>(json!({ "id": true })).is_err());
    }

    #[test]
    fn whole_numbers_serialize_without_fraction() {
        assert_eq!(serde_json::to_value(Measured { value: 12.0 }).unwrap(), json!({ "value": 12 }));
        assert_eq!(serde_json::to_value(Measured { value: 49.5 }).unwrap(), json!({ "value": 49.5 }));
        assert_eq!(serde_json::to_value(Measured { value: -3.0 }).unwrap(), json!({ "value": -3 }));
    }
}
