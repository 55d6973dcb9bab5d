//! Deep merge of message trees
//!
//! Two objects combine key by key. Anywhere else the later tree decides:
//! an array, a scalar or a value of a different kind simply takes the slot.

use serde_json::{Map, Value};

/// Combine `base` with `later`, letting `later` win every conflict.
///
/// Objects nested at the same key are combined recursively, so keys present
/// only in `base` survive. Arrays are never concatenated.
pub fn deep_merge(mut base: Value, later: Value) -> Value {
    merge_into(&mut base, later);
    base
}

/// Fold `later` into `target` in place
fn merge_into(target: &mut Value, later: Value) {
    match (target, later) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (slot, later) => *slot = later,
    }
}

/// Merge message trees in order (first is the base, last has highest precedence).
///
/// An empty sequence yields an empty object.
pub fn merge<I>(trees: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    trees
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}

/// Like [`merge`], but leaves the borrowed inputs untouched.
pub fn merge_refs<'a, I>(trees: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    merge(trees.into_iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical_serialize;
    use serde_json::json;

    #[test]
    fn test_scalar_right_bias() {
        let result = merge(vec![json!({"a": 1}), json!({"a": 2})]);
        assert_eq!(result, json!({"a": 2}));
    }

    #[test]
    fn test_array_replace() {
        let result = merge(vec![json!({"a": [1, 2]}), json!({"a": [3]})]);
        assert_eq!(result, json!({"a": [3]}));
    }

    #[test]
    fn test_deep_merge_keeps_non_conflicting_keys() {
        let result = merge(vec![
            json!({"a": {"b": 1, "c": 2}}),
            json!({"a": {"b": 3, "d": 4}}),
        ]);
        assert_eq!(result, json!({"a": {"b": 3, "c": 2, "d": 4}}));
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let nested = json!({
            "en": {
                "nav": {"home": "Home", "about": "About"},
                "greeting": "Hello"
            }
        });
        let merged = merge(vec![nested.clone(), nested.clone()]);
        assert_eq!(canonical_serialize(&merged), canonical_serialize(&nested));

        let with_array = json!({"en": {"days": ["Mon", "Tue"], "title": "Week"}});
        let merged = merge(vec![with_array.clone(), with_array.clone()]);
        assert_eq!(canonical_serialize(&merged), canonical_serialize(&with_array));
    }

    #[test]
    fn test_fill_missing_keys_existing_wins() {
        let seed = json!({"pt": {"greeting": "hello", "farewell": "bye"}});
        let existing = json!({"pt": {"greeting": "oi"}});
        let result = merge(vec![seed, existing]);
        assert_eq!(result, json!({"pt": {"greeting": "oi", "farewell": "bye"}}));
    }

    #[test]
    fn test_mapping_replaced_by_later_scalar() {
        let result = merge(vec![json!({"a": {"b": 1}}), json!({"a": "flat"})]);
        assert_eq!(result, json!({"a": "flat"}));

        // and the other way round: the later mapping wins over a scalar
        let result = merge(vec![json!({"a": "flat"}), json!({"a": {"b": 1}})]);
        assert_eq!(result, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_array_replaced_by_mapping() {
        let result = merge(vec![json!({"a": [1, 2]}), json!({"a": {"b": 1}})]);
        assert_eq!(result, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_scalar_replaced_by_later_mapping() {
        let result = deep_merge(json!({"nav": "Home"}), json!({"nav": {"home": "Home"}}));
        assert_eq!(result, json!({"nav": {"home": "Home"}}));
    }

    #[test]
    fn test_siblings_survive_at_depth() {
        let result = deep_merge(
            json!({"pt": {"nav": {"menu": {"home": "Início", "about": "Sobre"}}, "title": "App"}}),
            json!({"pt": {"nav": {"menu": {"home": "Casa"}}}}),
        );
        assert_eq!(
            result,
            json!({"pt": {"nav": {"menu": {"home": "Casa", "about": "Sobre"}}, "title": "App"}})
        );
    }

    #[test]
    fn test_null_overrides() {
        let result = merge(vec![json!({"a": "x"}), json!({"a": null})]);
        assert!(result["a"].is_null());
    }

    #[test]
    fn test_three_way_precedence() {
        let result = merge(vec![
            json!({"greeting": "a", "nav": {"home": "Home"}}),
            json!({"greeting": "b"}),
            json!({"nav": {"about": "About"}, "greeting": "c"}),
        ]);
        assert_eq!(
            result,
            json!({"greeting": "c", "nav": {"home": "Home", "about": "About"}})
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(merge(Vec::new()), json!({}));
    }

    #[test]
    fn test_merge_refs_leaves_inputs_untouched() {
        let base = json!({"a": {"b": 1}});
        let overlay = json!({"a": {"c": 2}});
        let result = merge_refs([&base, &overlay]);

        assert_eq!(result, json!({"a": {"b": 1, "c": 2}}));
        assert_eq!(base, json!({"a": {"b": 1}}));
        assert_eq!(overlay, json!({"a": {"c": 2}}));
    }
}
