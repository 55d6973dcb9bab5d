//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default option values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Module resolution strategy (default: "direct")
    pub resolver_kind: String,

    /// File suffix appended to module ids by the base-url resolver (default: ".json")
    pub resolver_suffix: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            resolver_kind: "direct".to_string(),
            resolver_suffix: ".json".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "resolver": {
                "kind": self.resolver_kind,
                "suffix": self.resolver_suffix
            },
            "build": {},
            "bundle": {}
        })
    }
}
