use clap::{Parser, Subcommand};

use crate::config::DialogueForgeConfig;
use crate::fields::FieldKind;

pub mod commands;
pub mod render;

#[derive(Parser)]
#[command(name = "dialogue-forge")]
#[command(about = "Configure game-context fields and drive a dialogue generation service")]
#[command(long_about = "Dialogue Forge keeps a set of game-context fields in a local JSON file and \
                       walks a dialogue service through generating options, confirming a selection \
                       and resolving the final line. Run without a subcommand to start an \
                       interactive session.")]
pub struct Cli {
    /// Dialogue service base URL
    #[arg(long, global = true, help = "Override the dialogue service base URL")]
    pub base_url: Option<String>,

    /// Field definitions file
    #[arg(long, global = true, help = "Override the JSON file holding field definitions")]
    pub fields_file: Option<String>,

    /// Start with debug mode on
    #[arg(long, global = true, help = "Ask the service for debug information")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut DialogueForgeConfig) {
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(fields_file) = &self.fields_file {
            config.storage.fields_file = fields_file.clone();
        }
        if self.debug {
            config.session.debug_mode = true;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List and edit the configured fields
    Fields {
        #[command(subcommand)]
        command: FieldsCommands,
    },
    /// Start an interactive session (default)
    Session,
    /// Run all three stages non-interactively
    Run {
        /// Option indices to select, comma separated
        #[arg(long, value_delimiter = ',', help = "Indices of the generated options to keep, e.g. 0,2")]
        select: Vec<usize>,
        /// Player-state choice as field=value, repeatable
        #[arg(long, value_parser = parse_key_value, help = "Choice for a player-state field, e.g. faction=roman")]
        choose: Vec<(String, String)>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum FieldsCommands {
    /// Show every field with its value
    List,
    /// Add an empty field
    Add {
        /// Field name
        name: String,
        /// Field kind
        #[arg(long, default_value = "text", help = "Field kind: text or choice")]
        kind: FieldKind,
        /// Placeholder shown next to the field
        #[arg(long, default_value = "", help = "Example text shown as a hint")]
        example: String,
    },
    /// Remove a field
    Remove {
        /// Field name
        name: String,
    },
    /// Set a field's value
    Set {
        /// Field name
        name: String,
        /// New value; for choice fields a comma-separated option list
        value: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write a starter dialogue-forge.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
