//! Request and response bodies exchanged with the dialogue service.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::fields::{FieldKind, FieldMapping, RESERVED_FIELD_NAMES};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Final dialogue text used when the service omits `final_selected_dialogue`.
pub const NO_DIALOGUE_FALLBACK: &str = "No dialogue generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GenerateOptions,
    FilterOptions,
    ConfirmFinal,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::GenerateOptions => "/generate_dialogue_options",
            Endpoint::FilterOptions => "/filter_dialogue_options",
            Endpoint::ConfirmFinal => "/confirm_final_dialogue",
        }
    }

    /// What the client was doing, phrased for error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Endpoint::GenerateOptions => "send field data",
            Endpoint::FilterOptions => "send selection",
            Endpoint::ConfirmFinal => "send player state",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPayload {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: String,
}

/// Body of `POST /generate_dialogue_options`:
/// `{"<field>": {"type": .., "value": ..}, .., "debug": bool}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptionsRequest {
    pub fields: Vec<(String, FieldPayload)>,
    pub debug: bool,
}

impl GenerateOptionsRequest {
    pub fn from_fields(fields: &FieldMapping, debug: bool) -> Self {
        let fields = fields
            .iter()
            .filter(|field| !is_reserved(&field.name))
            .map(|field| {
                (
                    field.name.clone(),
                    FieldPayload {
                        kind: field.kind,
                        value: field.value.clone(),
                    },
                )
            })
            .collect();
        Self { fields, debug }
    }
}

impl Serialize for GenerateOptionsRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, payload) in &self.fields {
            map.serialize_entry(name, payload)?;
        }
        map.serialize_entry("debug", &self.debug)?;
        map.end()
    }
}

/// Body of `POST /filter_dialogue_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptionsRequest {
    pub selected_options: Vec<String>,
    pub debug: bool,
}

/// Body of `POST /confirm_final_dialogue`:
/// `{"<choice_field>": "<selected value>", .., "debug": bool}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmFinalRequest {
    pub selections: Vec<(String, String)>,
    pub debug: bool,
}

impl Serialize for ConfirmFinalRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.selections.len() + 1))?;
        for (field, value) in self.selections.iter().filter(|(field, _)| !is_reserved(field)) {
            map.serialize_entry(field, value)?;
        }
        map.serialize_entry("debug", &self.debug)?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateOptionsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dialogue_options: Vec<String>,
    #[serde(default)]
    pub debug_info: Option<Value>,
}

/// An explicit `null` list means the same as a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The service also echoes the filtered list back; the client does not use it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterOptionsResponse {
    #[serde(default)]
    pub debug_info: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfirmFinalResponse {
    #[serde(default)]
    pub final_selected_dialogue: Option<String>,
    #[serde(default)]
    pub debug_info: Option<Value>,
}

impl ConfirmFinalResponse {
    pub fn final_dialogue(&self) -> &str {
        self.final_selected_dialogue
            .as_deref()
            .unwrap_or(NO_DIALOGUE_FALLBACK)
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_FIELD_NAMES.contains(&name)
}
