use serde_json::Value;
use std::fmt;

use crate::service::Endpoint;

/// One of the three user-triggered steps of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStage {
    Generate,
    ConfirmSelection,
    Finalize,
}

impl WorkflowStage {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            WorkflowStage::Generate => Endpoint::GenerateOptions,
            WorkflowStage::ConfirmSelection => Endpoint::FilterOptions,
            WorkflowStage::Finalize => Endpoint::ConfirmFinal,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            WorkflowStage::Generate => 0,
            WorkflowStage::ConfirmSelection => 1,
            WorkflowStage::Finalize => 2,
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowStage::Generate => "generate",
            WorkflowStage::ConfirmSelection => "confirm-selection",
            WorkflowStage::Finalize => "finalize",
        })
    }
}

/// Where a session is in `Idle → OptionsFetched → SelectionConfirmed → Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    OptionsFetched,
    SelectionConfirmed,
    Finalized,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::OptionsFetched => "options fetched",
            WorkflowPhase::SelectionConfirmed => "selection confirmed",
            WorkflowPhase::Finalized => "finalized",
        })
    }
}

/// What a successful stage hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: WorkflowStage,
    pub phase: WorkflowPhase,
    /// The service's `debug_info`, only when debug mode was on for the request.
    pub debug_info: Option<Value>,
}
