// Inventory Domain Model
// Bolt v2 inventory: top-level `targets` plus arbitrarily nested `groups`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Loaded inventory data and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub path: PathBuf,
    pub data: Value,
}

impl Inventory {
    pub fn new(path: impl Into<PathBuf>, data: Value) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Every target name or uri declared anywhere in the inventory
    pub fn target_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_targets(&self.data, &mut names);
        names
    }

    pub fn contains_target(&self, name: &str) -> bool {
        self.target_names().iter().any(|n| n == name)
    }
}

fn collect_targets(node: &Value, names: &mut Vec<String>) {
    if let Some(targets) = node.get("targets").and_then(Value::as_array) {
        for target in targets {
            match target {
                Value::String(uri) => names.push(uri.clone()),
                Value::Object(obj) => {
                    for key in ["name", "uri"] {
                        if let Some(s) = obj.get(key).and_then(Value::as_str) {
                            names.push(s.to_string());
                        }
                    }
                    // alias is a string or a list of strings
                    match obj.get("alias") {
                        Some(Value::String(alias)) => names.push(alias.clone()),
                        Some(Value::Array(aliases)) => names.extend(
                            aliases.iter().filter_map(Value::as_str).map(str::to_string),
                        ),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    if let Some(groups) = node.get("groups").and_then(Value::as_array) {
        for group in groups {
            collect_targets(group, names);
        }
    }
}
