use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{warn, Instrument};

use super::session::SessionState;
use super::state_machine::{StageEvent, StageTracker};
use super::types::{StageReport, WorkflowPhase, WorkflowStage};
use crate::fields::{FieldKind, FieldMapping, FieldStoreError};
use crate::service::{
    ConfirmFinalRequest, DialogueService, FilterOptionsRequest, GenerateOptionsRequest,
    ServiceError,
};
use crate::telemetry::{create_stage_span, generate_correlation_id};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No dialogue options yet. Generate dialogue options first.")]
    NoOptions,

    #[error("Dialogue selection has not been confirmed yet.")]
    SelectionNotConfirmed,

    #[error("A {0} request is already in progress.")]
    RequestInFlight(WorkflowStage),

    #[error(
        "Dialogue options were regenerated while the {0} request was in progress; its reply was discarded."
    )]
    StaleBatch(WorkflowStage),

    #[error("Option {index} does not exist ({len} options available).")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("'{0}' is not a choice field.")]
    UnknownChoiceField(String),

    #[error("'{value}' is not an option of '{field}' (options: {options}).")]
    InvalidChoice {
        field: String,
        value: String,
        options: String,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Store(#[from] FieldStoreError),
}

struct SessionInner {
    state: SessionState,
    tracker: StageTracker,
}

/// Drives the generate → confirm → finalize pipeline for one session.
///
/// Stage methods take `&self` and hold the session lock only while reading
/// or applying state, never across the network call. Each stage has its own
/// in-flight flag: triggering a stage while its previous request is still
/// outstanding fails with [`WorkflowError::RequestInFlight`] and sends
/// nothing.
pub struct WorkflowController<S: DialogueService> {
    service: S,
    inner: Mutex<SessionInner>,
    in_flight: [AtomicBool; 3],
}

/// Clears the stage's in-flight flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, stage: WorkflowStage) -> Result<Self, WorkflowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WorkflowError::RequestInFlight(stage))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<S: DialogueService> WorkflowController<S> {
    pub fn new(service: S, debug_mode: bool) -> Self {
        Self {
            service,
            inner: Mutex::new(SessionInner {
                state: SessionState::new(debug_mode),
                tracker: StageTracker::new(),
            }),
            in_flight: Default::default(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Copy of the current session state, for rendering.
    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn phase(&self) -> WorkflowPhase {
        self.inner.lock().await.tracker.phase()
    }

    pub fn is_in_flight(&self, stage: WorkflowStage) -> bool {
        self.in_flight[stage.index()].load(Ordering::Acquire)
    }

    pub async fn set_debug_mode(&self, enabled: bool) {
        self.inner.lock().await.state.set_debug_mode(enabled);
    }

    pub async fn set_option_selected(&self, index: usize, selected: bool) -> Result<(), WorkflowError> {
        let mut inner = self.inner.lock().await;
        let len = inner.state.dialogue_options().len();
        if !inner.state.set_selected(index, selected) {
            return Err(WorkflowError::OptionOutOfRange { index, len });
        }
        Ok(())
    }

    /// Flip an option's selection flag, returning the new value.
    pub async fn toggle_option(&self, index: usize) -> Result<bool, WorkflowError> {
        let mut inner = self.inner.lock().await;
        let len = inner.state.dialogue_options().len();
        let selected = !inner.state.is_selected(index);
        if !inner.state.set_selected(index, selected) {
            return Err(WorkflowError::OptionOutOfRange { index, len });
        }
        Ok(selected)
    }

    /// Pick the player-state value for one choice field.
    pub async fn select_choice(
        &self,
        fields: &FieldMapping,
        field: &str,
        value: &str,
    ) -> Result<(), WorkflowError> {
        let definition = fields
            .get(field)
            .filter(|f| f.kind == FieldKind::Choice)
            .ok_or_else(|| WorkflowError::UnknownChoiceField(field.to_string()))?;

        let value = value.trim();
        let choices = definition.choices();
        if !choices.contains(&value) {
            return Err(WorkflowError::InvalidChoice {
                field: field.to_string(),
                value: value.to_string(),
                options: choices.join(", "),
            });
        }

        let mut inner = self.inner.lock().await;
        inner.state.reconcile_player_selections(fields);
        inner.state.set_player_selection(field, value);
        Ok(())
    }

    /// Player-state selections as they would be submitted right now.
    pub async fn player_selections(&self, fields: &FieldMapping) -> Vec<(String, String)> {
        let mut inner = self.inner.lock().await;
        inner.state.reconcile_player_selections(fields);
        inner.state.player_state_selections().to_vec()
    }

    /// Stage 1: send every field and replace the option list with the reply.
    pub async fn generate_options(&self, fields: &FieldMapping) -> Result<StageReport, WorkflowError> {
        let stage = WorkflowStage::Generate;
        let _guard = InFlightGuard::acquire(&self.in_flight[stage.index()], stage)?;

        let debug = self.inner.lock().await.state.debug_mode();
        let request = GenerateOptionsRequest::from_fields(fields, debug);

        let span = create_stage_span(stage, &generate_correlation_id());
        let response = self
            .service
            .generate_options(request)
            .instrument(span)
            .await
            .inspect_err(|e| warn!(stage = %stage, error = %e, "Stage request failed"))?;

        let mut inner = self.inner.lock().await;
        let count = response.dialogue_options.len();
        inner.state.replace_options(response.dialogue_options);
        inner.state.reconcile_player_selections(fields);
        inner.tracker.handle(StageEvent::OptionsReceived { count });

        Ok(StageReport {
            stage,
            phase: inner.tracker.phase(),
            debug_info: response.debug_info.filter(|_| debug),
        })
    }

    /// Stage 2: send the selected options and mark the selection confirmed.
    pub async fn confirm_selection(&self) -> Result<StageReport, WorkflowError> {
        let stage = WorkflowStage::ConfirmSelection;

        let (selected_options, debug, batch) = {
            let inner = self.inner.lock().await;
            if inner.state.dialogue_options().is_empty() {
                return Err(WorkflowError::NoOptions);
            }
            (
                inner.state.selected_options(),
                inner.state.debug_mode(),
                inner.state.batch(),
            )
        };

        let _guard = InFlightGuard::acquire(&self.in_flight[stage.index()], stage)?;

        let span = create_stage_span(stage, &generate_correlation_id());
        let response = self
            .service
            .filter_options(FilterOptionsRequest {
                selected_options,
                debug,
            })
            .instrument(span)
            .await
            .inspect_err(|e| warn!(stage = %stage, error = %e, "Stage request failed"))?;

        let mut inner = self.inner.lock().await;
        Self::ensure_current(&inner, stage, batch)?;
        inner.state.confirm_selection();
        inner.tracker.handle(StageEvent::SelectionConfirmed);

        Ok(StageReport {
            stage,
            phase: inner.tracker.phase(),
            debug_info: response.debug_info.filter(|_| debug),
        })
    }

    /// Stage 3: send one value per choice field and store the final dialogue.
    pub async fn submit_final(&self, fields: &FieldMapping) -> Result<StageReport, WorkflowError> {
        let stage = WorkflowStage::Finalize;

        let (selections, debug, batch) = {
            let mut inner = self.inner.lock().await;
            if !inner.state.selection_confirmed() {
                return Err(WorkflowError::SelectionNotConfirmed);
            }
            inner.state.reconcile_player_selections(fields);
            (
                inner.state.player_state_selections().to_vec(),
                inner.state.debug_mode(),
                inner.state.batch(),
            )
        };

        for field in fields.choice_fields().filter(|f| f.choices().is_empty()) {
            warn!(field = %field.name, "Choice field has no options and is left out");
        }

        let _guard = InFlightGuard::acquire(&self.in_flight[stage.index()], stage)?;

        let span = create_stage_span(stage, &generate_correlation_id());
        let response = self
            .service
            .confirm_final(ConfirmFinalRequest { selections, debug })
            .instrument(span)
            .await
            .inspect_err(|e| warn!(stage = %stage, error = %e, "Stage request failed"))?;

        let mut inner = self.inner.lock().await;
        Self::ensure_current(&inner, stage, batch)?;
        inner.state.set_final_dialogue(response.final_dialogue());
        inner.tracker.handle(StageEvent::DialogueFinalized);

        Ok(StageReport {
            stage,
            phase: inner.tracker.phase(),
            debug_info: response.debug_info.filter(|_| debug),
        })
    }

    /// Reject a reply whose request was built from an option batch that has
    /// since been replaced.
    fn ensure_current(
        inner: &SessionInner,
        stage: WorkflowStage,
        batch: u64,
    ) -> Result<(), WorkflowError> {
        if inner.state.batch() != batch {
            warn!(stage = %stage, "Discarding reply for a replaced option batch");
            return Err(WorkflowError::StaleBatch(stage));
        }
        Ok(())
    }
}
