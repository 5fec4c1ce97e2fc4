//! Layer merging for config files read from one directory.
//!
//! Later layers override earlier ones field by field. Lists are replaced
//! entirely, not concatenated.

use serde_json::Value;

/// Merge `overlay` into `base` in place.
///
/// - Mappings are merged recursively: keys in overlay override keys in base
/// - Lists and scalars are replaced entirely
/// - A null overlay leaves base untouched (null means "not specified")
pub fn merge_layer(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_layer(existing, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_slot, overlay) => *base_slot = overlay,
    }
}

/// Merge layers in order on top of `base`, later layers taking precedence.
pub fn merge_layers(mut base: Value, layers: impl IntoIterator<Item = Value>) -> Value {
    for layer in layers {
        merge_layer(&mut base, layer);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_sections_combine() {
        let defaults = json!({"mqtt": {"port": 1883, "keepalive": 60}});
        let layers = vec![
            json!({"mqtt": {"host": "broker.local"}}),
            json!({"devices": [{"name": "grill"}]}),
        ];
        let result = merge_layers(defaults, layers);
        assert_eq!(
            result,
            json!({
                "mqtt": {"port": 1883, "keepalive": 60, "host": "broker.local"},
                "devices": [{"name": "grill"}]
            })
        );
    }

    #[test]
    fn test_later_file_wins_on_conflict() {
        let mut base = json!({"mqtt": {"port": 1883}});
        merge_layer(&mut base, json!({"mqtt": {"port": 8883}}));
        assert_eq!(base, json!({"mqtt": {"port": 8883}}));
    }

    #[test]
    fn test_device_lists_replaced() {
        let mut base = json!({"devices": [{"name": "a"}, {"name": "b"}]});
        merge_layer(&mut base, json!({"devices": [{"name": "c"}]}));
        assert_eq!(base, json!({"devices": [{"name": "c"}]}));
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let mut base = json!({"mqtt": {"port": 1883}});
        merge_layer(&mut base, Value::Null);
        merge_layer(&mut base, json!({"mqtt": {"port": null}}));
        assert_eq!(base, json!({"mqtt": {"port": 1883}}));
    }

    #[test]
    fn test_section_can_change_shape() {
        let mut base = json!({"mqtt": "broker.local"});
        merge_layer(&mut base, json!({"mqtt": {"host": "broker.local"}}));
        assert_eq!(base, json!({"mqtt": {"host": "broker.local"}}));
    }

    #[test]
    fn test_merge_into_null_base() {
        let result = merge_layers(Value::Null, vec![json!({"a": 1})]);
        assert_eq!(result, json!({"a": 1}));
    }
}
