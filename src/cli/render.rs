//! Text rendering of the field form and session state.
//!
//! Everything here is a pure function of its arguments; the interactive
//! session and the `run` command print whatever these return.

use serde_json::Value;
use std::fmt::Write;

use crate::fields::{Field, FieldKind, FieldMapping};
use crate::workflow::{SessionState, WorkflowPhase};

const RULE_WIDTH: usize = 60;

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn field_label(field: &Field) -> String {
    match field.kind {
        FieldKind::Text => format!("{} (Text)", capitalize(&field.name)),
        FieldKind::Choice => format!(
            "{} (Choices - separate with commas)",
            capitalize(&field.name)
        ),
    }
}

pub fn render_fields(fields: &FieldMapping) -> String {
    let mut out = String::from("📋 Game Context and Player Information\n");
    if fields.is_empty() {
        out.push_str("   (no fields configured)\n");
        return out;
    }

    for field in fields {
        let value = if field.value.is_empty() {
            "-"
        } else {
            field.value.as_str()
        };
        let _ = write!(out, "   {}: {}", field_label(field), value);
        if !field.example.is_empty() {
            let _ = write!(out, "   [{}]", field.example);
        }
        out.push('\n');
    }
    out
}

pub fn render_options(state: &SessionState) -> String {
    let options = state.dialogue_options();
    if options.is_empty() {
        return "💬 No dialogue options yet.\n".to_string();
    }

    let mut out = String::from("💬 Dialogue Options Generated:\n");
    for (index, option) in options.iter().enumerate() {
        let mark = if state.is_selected(index) { "x" } else { " " };
        let _ = writeln!(out, "   [{mark}] {index}. {option}");
    }
    if state.selection_confirmed() {
        out.push_str("   ✅ Selection confirmed\n");
    }
    out
}

/// One line per choice field showing the value that would be submitted.
pub fn render_player_state(fields: &FieldMapping, state: &SessionState) -> String {
    let mut out = String::from("🎭 Select Options for Player State Fields:\n");
    if fields.choice_fields().next().is_none() {
        out.push_str("   (no choice fields)\n");
        return out;
    }

    for field in fields.choice_fields() {
        let choices = field.choices();
        let Some(default) = choices.first() else {
            let _ = writeln!(out, "   {}: (no options)", capitalize(&field.name));
            continue;
        };
        let current = state
            .player_selection(&field.name)
            .filter(|value| choices.contains(value))
            .unwrap_or(*default);
        let _ = writeln!(
            out,
            "   {}: {}   (options: {})",
            capitalize(&field.name),
            current,
            choices.join(", ")
        );
    }
    out
}

pub fn render_final(state: &SessionState) -> String {
    if state.final_dialogue().is_empty() {
        return String::new();
    }
    format!("🎬 Final Selected Dialogue:\n   {}\n", state.final_dialogue())
}

pub fn render_debug_info(debug_info: &Value) -> String {
    let body = serde_json::to_string_pretty(debug_info).unwrap_or_else(|_| debug_info.to_string());
    format!("🐛 Debug Information:\n{body}\n")
}

/// Full picture of the session, as shown by `status`.
pub fn render_session(fields: &FieldMapping, state: &SessionState, phase: WorkflowPhase) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("{rule}\n");
    out.push_str(&render_fields(fields));
    let _ = writeln!(
        out,
        "\n🔧 Debug mode: {}",
        if state.debug_mode() { "on" } else { "off" }
    );
    let _ = writeln!(out, "📍 Stage: {phase}\n");
    out.push_str(&render_options(state));

    if state.selection_confirmed() {
        out.push('\n');
        out.push_str(&render_player_state(fields, state));
    }

    let final_dialogue = render_final(state);
    if !final_dialogue.is_empty() {
        out.push('\n');
        out.push_str(&final_dialogue);
    }
    let _ = writeln!(out, "{rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capitalize_matches_form_labels() {
        assert_eq!(capitalize("faction"), "Faction");
        assert_eq!(capitalize("playerName"), "Playername");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_default_fields() {
        let rendered = render_fields(&FieldMapping::defaults());

        assert!(rendered.contains("Background (Text): -   [e.g., Forest]"));
        assert!(rendered.contains(
            "Faction (Choices - separate with commas): vlandian, roman   [e.g., vlandian, roman]"
        ));
    }

    #[test]
    fn test_render_empty_store() {
        assert!(render_fields(&FieldMapping::new()).contains("(no fields configured)"));
    }

    #[test]
    fn test_render_player_state_defaults_to_first_option() {
        let state = SessionState::new(false);
        let rendered = render_player_state(&FieldMapping::defaults(), &state);

        assert!(rendered.contains("Faction: vlandian   (options: vlandian, roman)"));
    }

    #[test]
    fn test_render_final_is_empty_until_set() {
        assert_eq!(render_final(&SessionState::new(false)), "");
    }

    #[test]
    fn test_render_debug_info_pretty_prints() {
        let rendered = render_debug_info(&json!({"prompt": "hi"}));
        assert!(rendered.starts_with("🐛 Debug Information:\n{\n"));
        assert!(rendered.contains("\"prompt\": \"hi\""));
    }

    #[test]
    fn test_render_session_without_options() {
        let rendered = render_session(
            &FieldMapping::defaults(),
            &SessionState::new(true),
            WorkflowPhase::Idle,
        );

        assert!(rendered.contains("Debug mode: on"));
        assert!(rendered.contains("Stage: idle"));
        assert!(rendered.contains("No dialogue options yet."));
        assert!(!rendered.contains("Final Selected Dialogue"));
    }
}
