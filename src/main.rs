use anyhow::Result;
use clap::Parser;

use dialogue_forge::cli::commands::config::ConfigCommand;
use dialogue_forge::cli::commands::fields::FieldsCommand;
use dialogue_forge::cli::commands::run::RunCommand;
use dialogue_forge::cli::commands::session::SessionCommand;
use dialogue_forge::cli::{Cli, Commands};
use dialogue_forge::{init_telemetry, DialogueForgeConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    DialogueForgeConfig::load_env_file()?;
    let mut config = DialogueForgeConfig::load()?;
    cli.apply_overrides(&mut config);
    init_telemetry(&config.observability)?;

    match cli.command {
        // Default behavior: no subcommand starts an interactive session
        None | Some(Commands::Session) => tokio::runtime::Runtime::new()?
            .block_on(async { SessionCommand::new(config).execute().await }),
        Some(Commands::Fields { command }) => tokio::runtime::Runtime::new()?.block_on(async {
            FieldsCommand::new(config.storage.fields_file.clone(), command)
                .execute()
                .await
        }),
        Some(Commands::Run { select, choose }) => tokio::runtime::Runtime::new()?
            .block_on(async { RunCommand::new(config, select, choose).execute().await }),
        Some(Commands::Config { command }) => tokio::runtime::Runtime::new()?
            .block_on(async { ConfigCommand::new(config, command).execute().await }),
    }
}
