use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value shape a custom field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Checkbox,
    Select,
}

/// Definition of one custom field that items may carry flat on themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Key under which the value is stored on the item
    pub key: String,
    /// Column header text
    pub label: String,
    pub kind: FieldKind,
    /// Allowed values for `Select` fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Registry of custom field definitions, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistry {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl FieldRegistry {
    pub fn get(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Add or replace a definition, keyed by `key`.
    pub fn define(&mut self, def: FieldDef) {
        match self.fields.iter_mut().find(|f| f.key == def.key) {
            Some(existing) => *existing = def,
            None => self.fields.push(def),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.key != key);
        self.fields.len() != before
    }

    /// Check a flat field value against its definition. Unregistered keys
    /// are accepted as text.
    pub fn validate(&self, key: &str, value: &Value) -> bool {
        let Some(def) = self.get(key) else {
            return value.is_string();
        };
        match def.kind {
            FieldKind::Text | FieldKind::Date => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Checkbox => value.is_boolean(),
            FieldKind::Select => value
                .as_str()
                .is_some_and(|s| def.options.iter().any(|o| o == s)),
        }
    }

    /// Pull the registered fields out of a flat item-field map, preserving
    /// registry order. Used for column display.
    pub fn project<'a>(&self, flat: &'a IndexMap<String, Value>) -> Vec<(&str, Option<&'a Value>)> {
        self.fields
            .iter()
            .map(|def| (def.key.as_str(), flat.get(&def.key)))
            .collect()
    }
}
