// Dialogue Forge Library - game-context fields and the dialogue workflow
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod fields;
pub mod fs;
pub mod service;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use config::DialogueForgeConfig;
pub use fields::{Field, FieldKind, FieldMapping, FieldStore, FieldStoreError};
pub use service::{DialogueService, HttpDialogueService, ServiceError};
pub use telemetry::{create_stage_span, generate_correlation_id, init_telemetry};
pub use workflow::{
    SessionState, StageReport, WorkflowController, WorkflowError, WorkflowPhase, WorkflowStage,
};
