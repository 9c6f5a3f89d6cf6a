use statig::prelude::*;

use super::types::WorkflowPhase;

/// Outcomes of successful service round trips that move the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    OptionsReceived { count: usize },
    SelectionConfirmed,
    DialogueFinalized,
}

/// Stage pipeline of one session.
///
/// A fresh batch of options restarts the pipeline from any state: it lands in
/// `options_fetched`, or in `idle` when the batch is empty. Confirmation and
/// finalization only move forward.
#[derive(Debug, Default)]
pub struct WorkflowStageMachine {
    option_count: usize,
}

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl WorkflowStageMachine {
    #[state]
    fn idle(&mut self, event: &StageEvent) -> Outcome<State> {
        match event {
            StageEvent::OptionsReceived { count } => self.on_options(*count),
            _ => Handled,
        }
    }

    #[state]
    fn options_fetched(&mut self, event: &StageEvent) -> Outcome<State> {
        match event {
            StageEvent::OptionsReceived { count } => self.on_options(*count),
            StageEvent::SelectionConfirmed => {
                tracing::info!(options = self.option_count, "Dialogue selection confirmed");
                Transition(State::selection_confirmed())
            }
            StageEvent::DialogueFinalized => Handled,
        }
    }

    #[state]
    fn selection_confirmed(&mut self, event: &StageEvent) -> Outcome<State> {
        match event {
            StageEvent::OptionsReceived { count } => self.on_options(*count),
            StageEvent::SelectionConfirmed => Handled,
            StageEvent::DialogueFinalized => {
                tracing::info!("Final dialogue resolved");
                Transition(State::finalized())
            }
        }
    }

    #[state]
    fn finalized(&mut self, event: &StageEvent) -> Outcome<State> {
        match event {
            StageEvent::OptionsReceived { count } => self.on_options(*count),
            _ => Handled,
        }
    }
}

impl WorkflowStageMachine {
    fn on_options(&mut self, count: usize) -> Outcome<State> {
        self.option_count = count;
        tracing::info!(count = count, "Dialogue options received");
        if count == 0 {
            Transition(State::idle())
        } else {
            Transition(State::options_fetched())
        }
    }
}

/// Owns the state machine and exposes the current phase as a plain enum.
pub struct StageTracker {
    machine: StateMachine<WorkflowStageMachine>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            machine: WorkflowStageMachine::default().state_machine(),
        }
    }

    pub fn handle(&mut self, event: StageEvent) {
        self.machine.handle(&event);
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self.machine.state() {
            State::Idle { .. } => WorkflowPhase::Idle,
            State::OptionsFetched { .. } => WorkflowPhase::OptionsFetched,
            State::SelectionConfirmed { .. } => WorkflowPhase::SelectionConfirmed,
            State::Finalized { .. } => WorkflowPhase::Finalized,
        }
    }
}

impl std::fmt::Debug for StageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageTracker")
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.phase(), WorkflowPhase::Idle);

        tracker.handle(StageEvent::OptionsReceived { count: 2 });
        assert_eq!(tracker.phase(), WorkflowPhase::OptionsFetched);

        tracker.handle(StageEvent::SelectionConfirmed);
        assert_eq!(tracker.phase(), WorkflowPhase::SelectionConfirmed);

        tracker.handle(StageEvent::DialogueFinalized);
        assert_eq!(tracker.phase(), WorkflowPhase::Finalized);

        // Re-submitting keeps the session finalized.
        tracker.handle(StageEvent::DialogueFinalized);
        tracker.handle(StageEvent::SelectionConfirmed);
        assert_eq!(tracker.phase(), WorkflowPhase::Finalized);
    }

    #[test]
    fn test_events_out_of_order_are_ignored() {
        let mut tracker = StageTracker::new();

        tracker.handle(StageEvent::SelectionConfirmed);
        tracker.handle(StageEvent::DialogueFinalized);
        assert_eq!(tracker.phase(), WorkflowPhase::Idle);

        tracker.handle(StageEvent::OptionsReceived { count: 1 });
        tracker.handle(StageEvent::DialogueFinalized);
        assert_eq!(tracker.phase(), WorkflowPhase::OptionsFetched);
    }

    #[test]
    fn test_empty_option_batch_stays_idle() {
        let mut tracker = StageTracker::new();
        tracker.handle(StageEvent::OptionsReceived { count: 0 });
        assert_eq!(tracker.phase(), WorkflowPhase::Idle);
    }

    #[test]
    fn test_new_options_restart_the_pipeline() {
        let mut tracker = StageTracker::new();
        tracker.handle(StageEvent::OptionsReceived { count: 3 });
        tracker.handle(StageEvent::SelectionConfirmed);
        tracker.handle(StageEvent::DialogueFinalized);

        tracker.handle(StageEvent::OptionsReceived { count: 1 });
        assert_eq!(tracker.phase(), WorkflowPhase::OptionsFetched);

        tracker.handle(StageEvent::SelectionConfirmed);
        tracker.handle(StageEvent::OptionsReceived { count: 0 });
        assert_eq!(tracker.phase(), WorkflowPhase::Idle);
    }
}
