use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How a field's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free-form text forwarded as-is.
    Text,
    /// Comma-separated list of option labels.
    Choice,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Choice => "choice",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldKind::Text),
            "choice" => Ok(FieldKind::Choice),
            other => Err(format!("unknown field kind '{other}' (expected 'text' or 'choice')")),
        }
    }
}

/// A named configuration entry supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
    /// Placeholder text shown while the value is empty.
    pub example: String,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, example: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: String::new(),
            example: example.into(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn is_choice(&self) -> bool {
        self.kind == FieldKind::Choice
    }

    /// Option labels of a choice field, trimmed, empty segments dropped.
    ///
    /// Text fields have no options.
    pub fn choices(&self) -> Vec<&str> {
        if !self.is_choice() {
            return Vec::new();
        }
        self.value
            .split(',')
            .map(str::trim)
            .filter(|choice| !choice.is_empty())
            .collect()
    }
}

/// On-disk shape of a single field, keyed by name in the enclosing object.
#[derive(Debug, Deserialize)]
struct FieldRecord {
    #[serde(rename = "type")]
    kind: FieldKind,
    #[serde(default)]
    value: String,
    #[serde(default)]
    example: String,
}

#[derive(Serialize)]
struct FieldRecordRef<'a> {
    #[serde(rename = "type")]
    kind: FieldKind,
    value: &'a str,
    example: &'a str,
}

/// Insertion-ordered mapping from field name to [`Field`].
///
/// Serializes to the persisted JSON object
/// `{"<name>": {"type": .., "value": .., "example": ..}, ..}` and keeps the
/// object's key order on the way back in. Duplicate keys are rejected when
/// deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    fields: Vec<Field>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in fields used when no configuration has been persisted yet.
    pub fn defaults() -> Self {
        Self {
            fields: vec![
                Field::new("background", FieldKind::Text, "e.g., Forest"),
                Field::new("faction", FieldKind::Choice, "e.g., vlandian, roman")
                    .with_value("vlandian, roman"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn choice_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_choice())
    }

    /// Appends `field`. Returns it back if the name is already taken.
    pub fn insert(&mut self, field: Field) -> Result<(), Field> {
        if self.contains(&field.name) {
            return Err(field);
        }
        self.fields.push(field);
        Ok(())
    }

    /// Removes the named field, returning it with its former position.
    pub fn remove(&mut self, name: &str) -> Option<(usize, Field)> {
        let index = self.position(name)?;
        Some((index, self.fields.remove(index)))
    }

    /// Puts a field back at `index`, clamped to the current length.
    pub(crate) fn restore(&mut self, index: usize, field: Field) {
        let index = index.min(self.fields.len());
        self.fields.insert(index, field);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl<'a> IntoIterator for &'a FieldMapping {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(
                &field.name,
                &FieldRecordRef {
                    kind: field.kind,
                    value: &field.value,
                    example: &field.example,
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMappingVisitor;

        impl<'de> Visitor<'de> for FieldMappingVisitor {
            type Value = FieldMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping field names to field definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = FieldMapping::new();
                while let Some((name, record)) = access.next_entry::<String, FieldRecord>()? {
                    let field = Field {
                        name,
                        kind: record.kind,
                        value: record.value,
                        example: record.example,
                    };
                    if let Err(duplicate) = mapping.insert(field) {
                        return Err(de::Error::custom(format!(
                            "duplicate field name `{}`",
                            duplicate.name
                        )));
                    }
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(FieldMappingVisitor)
    }
}
