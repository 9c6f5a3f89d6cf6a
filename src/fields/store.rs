use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Field, FieldKind, FieldMapping};
use crate::fs::{FileSystemOperations, StandardFileSystem};

pub const DEFAULT_FIELDS_FILE: &str = "fields_data.json";

/// Names the request bodies already use for their own keys.
pub const RESERVED_FIELD_NAMES: &[&str] = &["debug"];

#[derive(Debug, Error)]
pub enum FieldStoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Malformed field configuration in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of [`FieldStore::add`]. Anything but `Added` is a warning and
/// leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    EmptyName,
    Duplicate,
    ReservedName,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }

    /// User-facing warning for a rejected add.
    pub fn warning(&self, name: &str) -> Option<String> {
        match self {
            AddOutcome::Added => None,
            AddOutcome::EmptyName => Some("Please enter a field name.".to_string()),
            AddOutcome::Duplicate => Some(format!("Field '{name}' already exists.")),
            AddOutcome::ReservedName => Some(format!(
                "Field name '{name}' is reserved; choose another name."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Field),
    NothingRemoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    NotFound,
}

/// Read the persisted mapping at `path`.
///
/// A missing file yields [`FieldMapping::defaults`]; a file that exists but
/// does not parse is reported as [`FieldStoreError::Malformed`].
pub async fn load_fields(
    fs: &dyn FileSystemOperations,
    path: &str,
) -> Result<FieldMapping, FieldStoreError> {
    match fs.read_to_string(path).await? {
        Some(contents) => {
            let mapping = serde_json::from_str(&contents).map_err(|source| {
                FieldStoreError::Malformed {
                    path: path.to_string(),
                    source,
                }
            })?;
            debug!(path = %path, "Loaded persisted field configuration");
            Ok(mapping)
        }
        None => {
            info!(path = %path, "No field configuration found, using defaults");
            Ok(FieldMapping::defaults())
        }
    }
}

/// Overwrite the persisted mapping at `path`.
pub async fn save_fields(
    fs: &dyn FileSystemOperations,
    path: &str,
    fields: &FieldMapping,
) -> Result<(), FieldStoreError> {
    let contents = serde_json::to_vec_pretty(fields)?;
    fs.write(path, &contents).await?;
    debug!(path = %path, fields = fields.len(), "Persisted field configuration");
    Ok(())
}

/// Write-through store for the user's field definitions.
///
/// Every successful mutation is persisted before the call returns. If the
/// write fails the in-memory mapping is rolled back so memory and disk never
/// disagree about which fields exist.
pub struct FieldStore {
    path: String,
    fs: Arc<dyn FileSystemOperations>,
    fields: FieldMapping,
}

impl FieldStore {
    /// Load the store at `path` from the real file system.
    pub async fn open(path: impl Into<String>) -> Result<Self, FieldStoreError> {
        Self::load(path, Arc::new(StandardFileSystem)).await
    }

    pub async fn load(
        path: impl Into<String>,
        fs: Arc<dyn FileSystemOperations>,
    ) -> Result<Self, FieldStoreError> {
        let path = path.into();
        let fields = load_fields(fs.as_ref(), &path).await?;
        Ok(Self { path, fs, fields })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    pub async fn save(&self) -> Result<(), FieldStoreError> {
        save_fields(self.fs.as_ref(), &self.path, &self.fields).await
    }

    /// Add an empty-valued field. Names are trimmed before use.
    pub async fn add(
        &mut self,
        name: &str,
        kind: FieldKind,
        example: &str,
    ) -> Result<AddOutcome, FieldStoreError> {
        let name = name.trim();
        let outcome = if name.is_empty() {
            AddOutcome::EmptyName
        } else if RESERVED_FIELD_NAMES.contains(&name) {
            AddOutcome::ReservedName
        } else if self.fields.contains(name) {
            AddOutcome::Duplicate
        } else {
            AddOutcome::Added
        };

        if !outcome.is_added() {
            warn!(field = %name, outcome = ?outcome, "Field not added");
            return Ok(outcome);
        }

        if self.fields.insert(Field::new(name, kind, example)).is_err() {
            return Ok(AddOutcome::Duplicate);
        }
        if let Err(e) = self.save().await {
            self.fields.remove(name);
            return Err(e);
        }

        info!(field = %name, kind = %kind, "Field added");
        Ok(AddOutcome::Added)
    }

    pub async fn remove(&mut self, name: &str) -> Result<RemoveOutcome, FieldStoreError> {
        let name = name.trim();
        let Some((index, field)) = self.fields.remove(name) else {
            debug!(field = %name, "Nothing to remove");
            return Ok(RemoveOutcome::NothingRemoved);
        };

        if let Err(e) = self.save().await {
            self.fields.restore(index, field);
            return Err(e);
        }

        info!(field = %name, "Field removed");
        Ok(RemoveOutcome::Removed(field))
    }

    /// Replace a field's value in place and persist.
    pub async fn set_value(&mut self, name: &str, value: &str) -> Result<EditOutcome, FieldStoreError> {
        let name = name.trim();
        let Some(field) = self.fields.get_mut(name) else {
            return Ok(EditOutcome::NotFound);
        };
        if field.value == value {
            return Ok(EditOutcome::Updated);
        }

        let previous = std::mem::replace(&mut field.value, value.to_string());
        if let Err(e) = self.save().await {
            if let Some(field) = self.fields.get_mut(name) {
                field.value = previous;
            }
            return Err(e);
        }

        debug!(field = %name, "Field value updated");
        Ok(EditOutcome::Updated)
    }
}
