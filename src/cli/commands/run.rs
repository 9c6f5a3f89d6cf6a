use anyhow::Result;

use super::http_controller;
use crate::cli::render::{render_debug_info, render_final, render_options, render_player_state};
use crate::config::DialogueForgeConfig;
use crate::fields::{FieldMapping, FieldStore};
use crate::service::DialogueService;
use crate::workflow::{StageReport, WorkflowController};

/// All three stages in one go, for scripts.
pub struct RunCommand {
    pub config: DialogueForgeConfig,
    pub select: Vec<usize>,
    pub choose: Vec<(String, String)>,
}

impl RunCommand {
    pub fn new(config: DialogueForgeConfig, select: Vec<usize>, choose: Vec<(String, String)>) -> Self {
        Self {
            config,
            select,
            choose,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = FieldStore::open(&self.config.storage.fields_file).await?;
        let controller = http_controller(&self.config)?;

        self.run_stages(&controller, store.fields()).await?;
        Ok(())
    }

    /// Drive the pipeline and print each stage's result. Returns the final
    /// dialogue.
    pub async fn run_stages<S: DialogueService>(
        &self,
        controller: &WorkflowController<S>,
        fields: &FieldMapping,
    ) -> Result<String> {
        println!("🔄 Generating dialogue options...");
        let report = controller.generate_options(fields).await?;
        let state = controller.snapshot().await;
        print!("{}", render_options(&state));
        print_debug(&report);

        for &index in &self.select {
            controller.set_option_selected(index, true).await?;
        }

        println!("🔄 Confirming selection...");
        let report = controller.confirm_selection().await?;
        print_debug(&report);

        for (field, value) in &self.choose {
            controller.select_choice(fields, field, value).await?;
        }
        controller.player_selections(fields).await;
        print!("{}", render_player_state(fields, &controller.snapshot().await));

        println!("🔄 Resolving final dialogue...");
        let report = controller.submit_final(fields).await?;
        let state = controller.snapshot().await;
        print!("{}", render_final(&state));
        print_debug(&report);

        Ok(state.final_dialogue().to_string())
    }
}

fn print_debug(report: &StageReport) {
    if let Some(debug_info) = &report.debug_info {
        print!("{}", render_debug_info(debug_info));
    }
}
