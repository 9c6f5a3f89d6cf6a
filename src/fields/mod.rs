// Field configuration: the typed entries the user edits and the write-through
// store that persists them as a JSON object keyed by field name.

pub mod store;
pub mod types;

pub use store::{
    load_fields, save_fields, AddOutcome, EditOutcome, FieldStore, FieldStoreError, RemoveOutcome,
    DEFAULT_FIELDS_FILE, RESERVED_FIELD_NAMES,
};
pub use types::{Field, FieldKind, FieldMapping};
