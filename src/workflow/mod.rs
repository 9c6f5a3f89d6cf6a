// Three-stage dialogue workflow: session state, stage state machine and the
// controller that packages fields and selections into service requests.

pub mod controller;
pub mod session;
pub mod state_machine;
pub mod types;


pub use controller::{WorkflowController, WorkflowError};
pub use session::SessionState;
pub use state_machine::{StageEvent, StageTracker, WorkflowStageMachine};
pub use types::{StageReport, WorkflowPhase, WorkflowStage};
