//! Field catalog — the engine's view of the Field Registry.
//!
//! The registry collaborator exports `{field_name, data_type,
//! allowed_operators}` rows; the catalog indexes them for authoring-time
//! validation of formulas and conditions. The engine never mutates it.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::path::FieldPath;

/// Declared data type of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    Text,
    Boolean,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
        }
    }
}

/// One field as exported by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub field_name: String,
    pub data_type: FieldType,
    #[serde(default)]
    pub allowed_operators: Vec<String>,
}

/// Indexed catalog of known fields, keyed by full dotted name.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: BTreeMap<String, FieldDef>,
}

impl FieldCatalog {
    pub fn new(defs: impl IntoIterator<Item = FieldDef>) -> Self {
        let mut fields = BTreeMap::new();
        for def in defs {
            fields.insert(def.field_name.clone(), def);
        }
        FieldCatalog { fields }
    }

    /// Parse a registry export: a JSON array of field rows.
    pub fn from_json(v: &serde_json::Value) -> Result<Self, String> {
        let defs: Vec<FieldDef> =
            serde_json::from_value(v.clone()).map_err(|e| format!("invalid field catalog: {}", e))?;
        Ok(FieldCatalog::new(defs))
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldDef> {
        self.fields.get(&path.to_string())
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.fields.contains_key(&path.to_string())
    }

    pub fn field_type(&self, path: &FieldPath) -> Option<FieldType> {
        self.get(path).map(|d| d.data_type)
    }

    /// Whether the registry allows `operator` on this field. An empty
    /// allowed_operators list means the registry placed no restriction.
    pub fn operator_allowed(&self, path: &FieldPath, operator: &str) -> bool {
        match self.get(path) {
            Some(def) if def.allowed_operators.is_empty() => true,
            Some(def) => def.allowed_operators.iter().any(|op| op == operator),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
