use anyhow::{bail, Result};

use crate::cli::render::render_fields;
use crate::cli::FieldsCommands;
use crate::fields::{EditOutcome, FieldStore, RemoveOutcome};

pub struct FieldsCommand {
    pub fields_file: String,
    pub command: FieldsCommands,
}

impl FieldsCommand {
    pub fn new(fields_file: impl Into<String>, command: FieldsCommands) -> Self {
        Self {
            fields_file: fields_file.into(),
            command,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let mut store = FieldStore::open(&self.fields_file).await?;

        match &self.command {
            FieldsCommands::List => {
                print!("{}", render_fields(store.fields()));
            }
            FieldsCommands::Add {
                name,
                kind,
                example,
            } => {
                let outcome = store.add(name, *kind, example).await?;
                match outcome.warning(name.trim()) {
                    Some(warning) => println!("⚠️  {warning}"),
                    None => println!("✅ Added {kind} field '{}'", name.trim()),
                }
            }
            FieldsCommands::Remove { name } => match store.remove(name).await? {
                RemoveOutcome::Removed(field) => println!("🗑️  Removed field '{}'", field.name),
                RemoveOutcome::NothingRemoved => {
                    println!("ℹ️  Nothing removed: no field named '{name}'")
                }
            },
            FieldsCommands::Set { name, value } => match store.set_value(name, value).await? {
                EditOutcome::Updated => println!("✅ Updated '{name}'"),
                EditOutcome::NotFound => bail!("No field named '{name}'"),
            },
        }

        Ok(())
    }
}
