//! Parameter-schema loading.
//!
//! Loads an optional `nextflow_schema.json` adjacent to a script, flattens
//! `$defs|defs|definitions` one level then `properties`, and synthesizes a
//! virtual class whose fields are the schema properties. Resolved as its
//! own phase/type rather than inlined into the name-resolver visitor (see
//! DESIGN.md's Open Question #3): parse external doc/type metadata, then
//! synthesize typed fields, loading the adjacent file lazily.

use std::path::Path;

use serde_json::Value;

use crate::error::SchemaError;
use crate::syntax::SchemaFieldType;

pub const SCHEMA_FILE_NAME: &str = "nextflow_schema.json";

#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: String,
    pub ty: SchemaFieldType,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    pub fields: Vec<SchemaField>,
}

impl ParamSchema {
    pub fn find(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub struct SchemaLoader;

impl SchemaLoader {
    /// Locates `nextflow_schema.json` next to `script_path`, if any.
    pub fn adjacent_schema_path(script_path: &Path) -> Option<std::path::PathBuf> {
        let dir = script_path.parent()?;
        let candidate = dir.join(SCHEMA_FILE_NAME);
        candidate.exists().then_some(candidate)
    }

    /// Loads and flattens a schema from raw JSON text. Malformed JSON is
    /// reported as a single `SchemaError`, which the caller turns into one
    /// parse warning attached to the entry workflow rather than aborting
    /// analysis.
    pub fn load_from_str(path: &str, text: &str) -> Result<ParamSchema, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SchemaError::Malformed {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let mut fields = Vec::new();
        collect_properties(&value, &mut fields);

        for key in ["$defs", "defs", "definitions"] {
            if let Some(Value::Object(defs)) = value.get(key) {
                for def in defs.values() {
                    collect_properties(def, &mut fields);
                }
            }
        }

        Ok(ParamSchema { fields })
    }
}

fn collect_properties(value: &Value, out: &mut Vec<SchemaField>) {
    let Some(Value::Object(props)) = value.get("properties") else {
        return;
    };
    for (name, spec) in props {
        let ty = spec
            .get("type")
            .and_then(Value::as_str)
            .map(map_schema_type)
            .unwrap_or(SchemaFieldType::Dynamic);
        let description = spec
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        out.push(SchemaField {
            name: name.clone(),
            ty,
            description,
        });
    }
}

fn map_schema_type(type_name: &str) -> SchemaFieldType {
    match type_name {
        "boolean" => SchemaFieldType::Bool,
        "integer" => SchemaFieldType::I64,
        "number" => SchemaFieldType::F64,
        "string" => SchemaFieldType::Str,
        _ => SchemaFieldType::Dynamic,
    }
}
