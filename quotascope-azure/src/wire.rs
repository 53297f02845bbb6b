//! Shared helpers for picking fields out of ARM JSON payloads.
//!
//! ARM payloads are lenient by nature; these helpers default rather than
//! fail, leaving it to the callers to log anything suspicious.

use serde_json::Value;
use std::collections::BTreeMap;

/// String at a JSON pointer, empty if absent or not a string.
pub(crate) fn string_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Number at a JSON pointer, accepting numeric strings; zero if absent.
pub(crate) fn f64_at(value: &Value, pointer: &str) -> f64 {
    match value.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}

/// Unsigned integer at a JSON pointer, zero if absent.
pub(crate) fn u32_at(value: &Value, pointer: &str) -> u32 {
    value
        .pointer(pointer)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default()
}

/// Tag map at a JSON pointer, empty if absent.
pub(crate) fn tags_at(value: &Value, pointer: &str) -> BTreeMap<String, String> {
    value
        .pointer(pointer)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Extracts the resource group from an ARM resource id.
///
/// Ids look like
/// `/subscriptions/{id}/resourceGroups/{name}/providers/...`; the segment
/// name is matched case-insensitively.
pub(crate) fn resource_group_from_id(id: &str) -> String {
    let mut segments = id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("resourceGroups") {
            return segments.next().unwrap_or_default().to_string();
        }
    }
    String::new()
}

/// Extracts `Namespace/type` from an ARM resource id.
pub(crate) fn resource_type_from_id(id: &str) -> String {
    let mut segments = id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("providers") {
            let namespace = segments.next().unwrap_or_default();
            let kind = segments.next().unwrap_or_default();
            if namespace.is_empty() || kind.is_empty() {
                return String::new();
            }
            return format!("{namespace}/{kind}");
        }
    }
    String::new()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "/subscriptions/s-1/resourceGroups/rg-prod/providers/Microsoft.Compute/virtualMachines/app-01";

    #[test]
    fn test_resource_group_from_id() {
        assert_eq!(resource_group_from_id(ID), "rg-prod");
        assert_eq!(
            resource_group_from_id("/subscriptions/s-1/resourcegroups/RG-X/providers/p/t/n"),
            "RG-X"
        );
        assert_eq!(resource_group_from_id("/subscriptions/s-1"), "");
    }

    #[test]
    fn test_resource_type_from_id() {
        assert_eq!(
            resource_type_from_id(ID),
            "Microsoft.Compute/virtualMachines"
        );
        assert_eq!(resource_type_from_id("no providers here"), "");
    }

    #[test]
    fn test_field_helpers_default() {
        let value = json!({
            "properties": {"diskSizeGB": 128, "quantity": "2.5"},
            "tags": {"Client": "ClientA", "ignored": 7}
        });
        assert_eq!(f64_at(&value, "/properties/diskSizeGB"), 128.0);
        assert_eq!(f64_at(&value, "/properties/quantity"), 2.5);
        assert_eq!(f64_at(&value, "/properties/missing"), 0.0);
        assert_eq!(string_at(&value, "/properties/nope"), "");
        assert_eq!(u32_at(&value, "/properties/diskSizeGB"), 128);

        let tags = tags_at(&value, "/tags");
        assert_eq!(tags.get("Client").map(String::as_str), Some("ClientA"));
        // Non-string tag values are dropped
        assert!(!tags.contains_key("ignored"));
    }
}
