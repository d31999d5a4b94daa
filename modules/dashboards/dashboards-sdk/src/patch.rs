//! Update payloads accepted by `CrudBackend::update`.

use serde_json::{Map, Value};

use crate::models::DashboardObject;

/// Update request.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Replace the stored object. A `resource_version` on the replacement is a
    /// precondition: the store must reject the write if it no longer matches.
    Replace(DashboardObject),
    /// RFC 7386 JSON merge patch applied to `spec`.
    Merge(Value),
}

/// Apply an RFC 7386 merge patch to `target` in place.
///
/// Object members are merged recursively, `null` removes a member, and any
/// non-object patch replaces the target wholesale.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_members) = patch else {
        patch.clone_into(target);
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_members) = target {
        for (key, value) in patch_members {
            if value.is_null() {
                target_members.remove(key);
            } else {
                apply_merge_patch(
                    target_members.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merges_nested_members() {
        let mut target = json!({"title": "A", "panels": {"a": 1, "b": 2}});
        apply_merge_patch(&mut target, &json!({"panels": {"b": 3, "c": 4}}));
        assert_eq!(target, json!({"title": "A", "panels": {"a": 1, "b": 3, "c": 4}}));
    }

    #[test]
    fn null_removes_member() {
        let mut target = json!({"title": "A", "tags": ["x"]});
        apply_merge_patch(&mut target, &json!({"tags": null}));
        assert_eq!(target, json!({"title": "A"}));
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let mut target = json!({"tags": ["x", "y"]});
        apply_merge_patch(&mut target, &json!({"tags": ["z"]}));
        assert_eq!(target, json!({"tags": ["z"]}));
    }

    #[test]
    fn non_object_patch_replaces_target() {
        let mut target = json!({"title": "A"});
        apply_merge_patch(&mut target, &json!("flat"));
        assert_eq!(target, json!("flat"));
    }

    #[test]
    fn object_patch_over_scalar_target() {
        let mut target = json!(5);
        apply_merge_patch(&mut target, &json!({"title": "B", "gone": null}));
        assert_eq!(target, json!({"title": "B"}));
    }
}
