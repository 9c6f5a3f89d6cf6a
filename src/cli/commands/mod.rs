use anyhow::Result;

use crate::config::DialogueForgeConfig;
use crate::service::HttpDialogueService;
use crate::workflow::WorkflowController;

pub mod config;
pub mod fields;
pub mod run;
pub mod session;

/// Controller talking to the configured dialogue service over HTTP.
pub fn http_controller(
    config: &DialogueForgeConfig,
) -> Result<WorkflowController<HttpDialogueService>> {
    Ok(WorkflowController::new(
        HttpDialogueService::from_config(&config.service)?,
        config.session.debug_mode,
    ))
}

