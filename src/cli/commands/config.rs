use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::ConfigCommands;
use crate::config::{DialogueForgeConfig, CONFIG_FILE_NAME};

pub struct ConfigCommand {
    pub config: DialogueForgeConfig,
    pub command: ConfigCommands,
    target_dir: PathBuf,
}

impl ConfigCommand {
    pub fn new(config: DialogueForgeConfig, command: ConfigCommands) -> Self {
        Self {
            config,
            command,
            target_dir: PathBuf::from("."),
        }
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = dir.into();
        self
    }

    pub async fn execute(&self) -> Result<()> {
        match self.command {
            ConfigCommands::Show => {
                print!("{}", self.config.to_toml()?);
            }
            ConfigCommands::Init { force } => {
                let path = self.init(force)?;
                println!("✅ Wrote {}", path.display());
            }
        }
        Ok(())
    }

    /// Write a starter file holding the built-in defaults.
    fn init(&self, force: bool) -> Result<PathBuf> {
        let path = self.target_dir.join(CONFIG_FILE_NAME);
        if path.exists() && !force {
            bail!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            );
        }
        DialogueForgeConfig::default().save_to_file(&path)?;
        tracing::info!(path = %path.display(), "Configuration file written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let command = ConfigCommand::new(
            DialogueForgeConfig::default(),
            ConfigCommands::Init { force: false },
        )
        .with_target_dir(dir.path());

        let path = command.init(false).unwrap();
        let written = DialogueForgeConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(written, DialogueForgeConfig::default());

        let err = command.init(false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        std::fs::write(&path, "garbage").unwrap();
        command.init(true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[service]"));
    }
}
