use crate::fields::FieldMapping;

/// Everything one interactive session remembers between actions.
///
/// Owned by the [`WorkflowController`](super::WorkflowController); nothing is
/// shared across sessions and nothing is initialized lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    dialogue_options: Vec<String>,
    /// Parallel to `dialogue_options`.
    selected: Vec<bool>,
    selection_confirmed: bool,
    /// One chosen value per choice field, in field order.
    player_state_selections: Vec<(String, String)>,
    final_dialogue: String,
    debug_mode: bool,
    /// Bumped every time a new option batch is installed.
    batch: u64,
}

impl SessionState {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            ..Default::default()
        }
    }

    pub fn dialogue_options(&self) -> &[String] {
        &self.dialogue_options
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn selection_confirmed(&self) -> bool {
        self.selection_confirmed
    }

    pub fn player_state_selections(&self) -> &[(String, String)] {
        &self.player_state_selections
    }

    pub fn player_selection(&self, field: &str) -> Option<&str> {
        self.player_state_selections
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn final_dialogue(&self) -> &str {
        &self.final_dialogue
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Identifies the current option batch. A reply to a request built
    /// from an older batch must not be applied.
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Selected options in the order the service returned them.
    pub fn selected_options(&self) -> Vec<String> {
        self.dialogue_options
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(option, _)| option.clone())
            .collect()
    }

    pub(crate) fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    /// Install a fresh batch of options. Every flag starts unselected and the
    /// previous confirmation no longer applies.
    pub(crate) fn replace_options(&mut self, options: Vec<String>) {
        self.selected = vec![false; options.len()];
        self.dialogue_options = options;
        self.selection_confirmed = false;
        self.batch = self.batch.wrapping_add(1);
    }

    /// Returns `false` when `index` is out of range.
    pub(crate) fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        match self.selected.get_mut(index) {
            Some(flag) => {
                *flag = selected;
                true
            }
            None => false,
        }
    }

    pub(crate) fn confirm_selection(&mut self) {
        self.selection_confirmed = true;
    }

    pub(crate) fn set_player_selection(&mut self, field: &str, value: &str) {
        match self
            .player_state_selections
            .iter_mut()
            .find(|(name, _)| name == field)
        {
            Some((_, current)) => *current = value.to_string(),
            None => self
                .player_state_selections
                .push((field.to_string(), value.to_string())),
        }
    }

    /// Bring the per-field selections in line with the current fields.
    ///
    /// Each choice field keeps its chosen value while that value is still one
    /// of its options and otherwise falls back to its first option. Fields
    /// that are gone, are no longer choices, or have no options are dropped.
    pub(crate) fn reconcile_player_selections(&mut self, fields: &FieldMapping) {
        let reconciled = fields
            .choice_fields()
            .filter_map(|field| {
                let choices = field.choices();
                let value = self
                    .player_selection(&field.name)
                    .filter(|current| choices.contains(current))
                    .or_else(|| choices.first().copied())?;
                Some((field.name.clone(), value.to_string()))
            })
            .collect();
        self.player_state_selections = reconciled;
    }

    pub(crate) fn set_final_dialogue(&mut self, dialogue: impl Into<String>) {
        self.final_dialogue = dialogue.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Field, FieldKind};

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initial_state_is_empty() {
        let state = SessionState::new(true);
        assert!(state.dialogue_options().is_empty());
        assert!(!state.selection_confirmed());
        assert!(state.player_state_selections().is_empty());
        assert_eq!(state.final_dialogue(), "");
        assert!(state.debug_mode());
    }

    #[test]
    fn test_replacing_options_resets_every_flag() {
        let mut state = SessionState::new(false);
        state.replace_options(options(&["a", "b", "c"]));
        assert!(state.set_selected(0, true));
        assert!(state.set_selected(2, true));
        state.confirm_selection();

        state.replace_options(options(&["d", "e"]));

        assert!(!state.is_selected(0));
        assert!(!state.is_selected(1));
        assert!(!state.selection_confirmed());
        assert!(state.selected_options().is_empty());
    }

    #[test]
    fn test_each_batch_gets_a_new_id() {
        let mut state = SessionState::new(false);
        let initial = state.batch();

        state.replace_options(options(&["a"]));
        let first = state.batch();
        state.replace_options(options(&["a"]));

        assert_ne!(initial, first);
        assert_ne!(first, state.batch());
    }

    #[test]
    fn test_selected_options_keep_service_order() {
        let mut state = SessionState::new(false);
        state.replace_options(options(&["first", "second", "third"]));
        state.set_selected(2, true);
        state.set_selected(0, true);

        assert_eq!(state.selected_options(), options(&["first", "third"]));
        assert!(!state.set_selected(3, true));
    }

    #[test]
    fn test_reconcile_defaults_to_first_option_and_keeps_valid_choices() {
        let mut fields = FieldMapping::defaults();
        fields
            .insert(Field::new("weather", FieldKind::Choice, "").with_value("rain, sun"))
            .unwrap();
        fields
            .insert(Field::new("empty", FieldKind::Choice, "").with_value(" , "))
            .unwrap();

        let mut state = SessionState::new(false);
        state.set_player_selection("weather", "sun");
        state.set_player_selection("gone", "x");
        state.reconcile_player_selections(&fields);

        assert_eq!(
            state.player_state_selections(),
            &[
                ("faction".to_string(), "vlandian".to_string()),
                ("weather".to_string(), "sun".to_string()),
            ]
        );

        fields.get_mut("weather").unwrap().value = "snow, hail".to_string();
        state.reconcile_player_selections(&fields);
        assert_eq!(state.player_selection("weather"), Some("snow"));
    }
}
