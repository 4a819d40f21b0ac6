//! snake_case → camelCase key mapping for rows returned by the backend.
//!
//! Remote columns are snake_case; application models deserialize from
//! camelCase. Every row passes through [`camelize`] before it reaches a model.

use serde_json::{Map, Value};

/// Converts a single snake_case key to camelCase.
///
/// Each `_x` where `x` is a lowercase ASCII letter becomes `X`. Underscores
/// not followed by a lowercase letter are kept as-is.
#[must_use]
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Recursively renames object keys to camelCase. Values are left untouched.
///
/// Keys that collide after renaming (`user_a` next to `userA`) collapse into
/// one entry holding the value visited last in map order; the dropped key is
/// logged at debug level. Backend rows never carry such pairs.
#[must_use]
pub fn camelize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(camelize).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                let renamed = snake_to_camel(&key);
                if out.insert(renamed.clone(), camelize(inner)).is_some() {
                    tracing::debug!(key = %key, renamed = %renamed, "camelized key collides, earlier value dropped");
                }
            }
            Value::Object(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_simple_keys() {
        assert_eq!(snake_to_camel("created_at"), "createdAt");
        assert_eq!(snake_to_camel("late_penalty_per_day"), "latePenaltyPerDay");
        assert_eq!(snake_to_camel("id"), "id");
    }

    #[test]
    fn leaves_non_letter_underscores() {
        assert_eq!(snake_to_camel("user_a"), "userA");
        assert_eq!(snake_to_camel("field_1"), "field_1");
        assert_eq!(snake_to_camel("_private"), "Private");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
    }

    #[test]
    fn camelizes_nested_structures_and_keeps_values() {
        let input = json!({
            "payer_id": "u1",
            "payer": { "email_address": "a@b.c" },
            "line_items": [ { "unit_price": 10, "tax_rate": null } ],
            "status": "pending_review"
        });
        let expected = json!({
            "payerId": "u1",
            "payer": { "emailAddress": "a@b.c" },
            "lineItems": [ { "unitPrice": 10, "taxRate": null } ],
            "status": "pending_review"
        });
        assert_eq!(camelize(input), expected);
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(camelize(json!(42)), json!(42));
        assert_eq!(camelize(json!("snake_case_value")), json!("snake_case_value"));
        assert_eq!(camelize(Value::Null), Value::Null);
    }

    #[test]
    fn colliding_keys_collapse_into_one() {
        let out = camelize(json!({"user_a": "U1", "userA": "U2", "task_id": "T1"}));
        let map = out.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("userA"));
        assert_eq!(map["taskId"], "T1");
    }
}
