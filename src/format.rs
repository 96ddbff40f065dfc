// Projection of resource fields into plain text for terminal output.

use serde_json::{Map, Value};

use crate::managers::tasks;
use crate::resource::Resource;

/// Strings print bare, everything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pretty printed JSON of `prop`, or an empty string when it is absent or
/// null.
pub fn format_json_for_object_property(resource: &Resource, prop: &str) -> String {
    match resource.attr(prop) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
    }
}

pub fn format_mapping_for_column(map: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.iter()
        .map(|k| format!("{}: {}", k, value_text(&map[k.as_str()])))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_list_for_column(values: &[Value]) -> String {
    values
        .iter()
        .map(value_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tab separated `fields` of one resource, `-` standing in for missing
/// ones.
pub fn resource_summary_line(resource: &Resource, fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| match resource.attr(f) {
            None | Some(Value::Null) => "-".to_owned(),
            Some(v) => value_text(v),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Tasks of a loaded execution with their progress updates indented below.
pub fn format_execution_tasks(execution: &Resource) -> String {
    let mut lines = Vec::new();
    for task in tasks(execution) {
        let field = |k: &str| task.get(k).map(value_text).unwrap_or_else(|| "-".to_owned());
        lines.push(format!(
            "{} {} {}",
            field("id"),
            field("task_type"),
            field("status")
        ));
        let updates = task
            .get("progress_updates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for update in updates {
            let created = update.get("created_at").map(value_text).unwrap_or_default();
            let message = update.get("message").map(value_text).unwrap_or_default();
            lines.push(format!("    {created} {message}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(v: Value) -> Resource {
        Resource::from_value(v).unwrap()
    }

    #[test]
    fn test_format_json_for_object_property() {
        let res = resource(json!({
            "id": "t1",
            "destination_environment": {"network_map": {"a": "b"}},
            "notes": null,
            "scenario": "replica"
        }));
        assert_eq!(
            format_json_for_object_property(&res, "destination_environment"),
            "{\n  \"network_map\": {\n    \"a\": \"b\"\n  }\n}"
        );
        assert_eq!(format_json_for_object_property(&res, "notes"), "");
        assert_eq!(format_json_for_object_property(&res, "absent"), "");
        assert_eq!(format_json_for_object_property(&res, "scenario"), "replica");
    }

    #[test]
    fn test_format_mapping_and_list() {
        let map = json!({"b": 2, "a": "x", "c": {"d": [1]}});
        assert_eq!(
            format_mapping_for_column(map.as_object().unwrap()),
            "a: x\nb: 2\nc: {\"d\":[1]}"
        );
        assert_eq!(
            format_list_for_column(&[json!("vm1"), json!(3), json!(null)]),
            "vm1\n3\n"
        );
        assert_eq!(format_list_for_column(&[]), "");
    }

    #[test]
    fn test_summary_line() {
        let res = resource(json!({"id": "p1", "name": "pool", "status": null}));
        assert_eq!(
            resource_summary_line(&res, &["id", "name", "status", "notes"]),
            "p1\tpool\t-\t-"
        );
    }

    #[test]
    fn test_format_execution_tasks() {
        let execution = resource(json!({
            "id": "e1",
            "tasks": [
                {
                    "id": "t1",
                    "task_type": "DEPLOY_TRANSFER_DISKS",
                    "status": "COMPLETED",
                    "progress_updates": [
                        {"created_at": "2026-01-01T00:00:00", "message": "disk 1 done"}
                    ]
                },
                {"id": "t2", "task_type": "REPLICATE_DISKS", "status": "RUNNING"}
            ]
        }));
        assert_eq!(
            format_execution_tasks(&execution),
            "t1 DEPLOY_TRANSFER_DISKS COMPLETED\n    2026-01-01T00:00:00 disk 1 done\nt2 REPLICATE_DISKS RUNNING"
        );
        assert_eq!(format_execution_tasks(&resource(json!({"id": "e2"}))), "");
    }
}
