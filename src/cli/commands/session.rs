//! Interactive line-oriented session.
//!
//! Each input line is one user action. Service and validation failures are
//! printed inline and the loop keeps going. Only I/O failures on the
//! terminal itself end the session.

use anyhow::Result;
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::http_controller;
use crate::cli::render::{
    render_debug_info, render_fields, render_final, render_options, render_player_state,
    render_session,
};
use crate::config::DialogueForgeConfig;
use crate::fields::{EditOutcome, FieldKind, FieldStore, RemoveOutcome};
use crate::service::DialogueService;
use crate::workflow::{StageReport, WorkflowController, WorkflowError};

const PROMPT: &str = "dialogue> ";

const HELP: &str = "\
Commands:
  fields                        Show the configured fields
  add <name> <text|choice> [example]
                                Add an empty field
  remove <name>                 Remove a field
  set <name> <value>            Set a field's value (choices: comma separated)
  debug on|off                  Toggle debug mode
  generate                      Stage 1: generate dialogue options
  select <i>                    Toggle option <i>
  confirm                       Stage 2: confirm the selected options
  choose <field> <value>        Pick a player-state value for a choice field
  submit                        Stage 3: resolve the final dialogue
  status                        Show everything
  help                          Show this help
  quit                          Leave the session
";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Fields,
    Add {
        name: String,
        kind: FieldKind,
        example: String,
    },
    Remove(String),
    Set {
        name: String,
        value: String,
    },
    Debug(bool),
    Generate,
    Select(usize),
    Confirm,
    Choose {
        field: String,
        value: String,
    },
    Submit,
    Status,
    Help,
    Quit,
    Nothing,
}

/// Parse one input line. The error is a usage hint for the user.
pub fn parse_action(line: &str) -> Result<SessionAction, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "" => SessionAction::Nothing,
        "fields" => SessionAction::Fields,
        "add" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let name = parts.next().unwrap_or("").to_string();
            let kind = parts
                .next()
                .ok_or("usage: add <name> <text|choice> [example]")?
                .parse::<FieldKind>()?;
            let example = parts.next().unwrap_or("").trim().to_string();
            SessionAction::Add {
                name,
                kind,
                example,
            }
        }
        "remove" => SessionAction::Remove(required(rest, "usage: remove <name>")?),
        "set" => {
            let (name, value) = split_pair(rest, "usage: set <name> <value>")?;
            SessionAction::Set { name, value }
        }
        "debug" => match rest.to_ascii_lowercase().as_str() {
            "on" => SessionAction::Debug(true),
            "off" => SessionAction::Debug(false),
            _ => return Err("usage: debug on|off".to_string()),
        },
        "generate" => SessionAction::Generate,
        "select" => SessionAction::Select(
            rest.parse()
                .map_err(|_| "usage: select <option number>".to_string())?,
        ),
        "confirm" => SessionAction::Confirm,
        "choose" => {
            let (field, value) = split_pair(rest, "usage: choose <field> <value>")?;
            SessionAction::Choose { field, value }
        }
        "submit" => SessionAction::Submit,
        "status" => SessionAction::Status,
        "help" | "?" => SessionAction::Help,
        "quit" | "exit" | "q" => SessionAction::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(action)
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(usage.to_string())
    } else {
        Ok(rest.to_string())
    }
}

/// First word and the remainder of the line; the remainder may be empty.
fn split_pair(rest: &str, usage: &str) -> Result<(String, String), String> {
    if rest.is_empty() {
        return Err(usage.to_string());
    }
    let (first, second) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((first.to_string(), second.trim().to_string()))
}

/// Field store plus workflow controller for one interactive session.
pub struct Session<S: DialogueService> {
    store: FieldStore,
    controller: WorkflowController<S>,
}

impl<S: DialogueService> Session<S> {
    pub fn new(store: FieldStore, controller: WorkflowController<S>) -> Self {
        Self { store, controller }
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn controller(&self) -> &WorkflowController<S> {
        &self.controller
    }

    /// Read actions from `input` until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all(b"\n").await?;
                break;
            };

            let text = match parse_action(&line) {
                Ok(SessionAction::Quit) => break,
                Ok(action) => self.apply(action).await,
                Err(usage) => format!("⚠️  {usage}\n"),
            };
            output.write_all(text.as_bytes()).await?;
        }

        output.write_all("👋 Bye\n".as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    /// Perform one action and return what to show. Failures are rendered
    /// as a `❌` line.
    pub async fn apply(&mut self, action: SessionAction) -> String {
        debug!(action = ?action, "Session action");
        match self.dispatch(action).await {
            Ok(text) => text,
            Err(e) => format!("❌ {e}\n"),
        }
    }

    async fn dispatch(&mut self, action: SessionAction) -> Result<String, WorkflowError> {
        let text = match action {
            SessionAction::Nothing | SessionAction::Quit => String::new(),
            SessionAction::Help => HELP.to_string(),
            SessionAction::Fields => render_fields(self.store.fields()),
            SessionAction::Add {
                name,
                kind,
                example,
            } => {
                let outcome = self.store.add(&name, kind, &example).await?;
                match outcome.warning(name.trim()) {
                    Some(warning) => format!("⚠️  {warning}\n"),
                    None => format!("✅ Added {kind} field '{}'\n", name.trim()),
                }
            }
            SessionAction::Remove(name) => match self.store.remove(&name).await? {
                RemoveOutcome::Removed(field) => format!("🗑️  Removed field '{}'\n", field.name),
                RemoveOutcome::NothingRemoved => {
                    format!("ℹ️  Nothing removed: no field named '{name}'\n")
                }
            },
            SessionAction::Set { name, value } => {
                match self.store.set_value(&name, &value).await? {
                    EditOutcome::Updated => format!("✅ Updated '{name}'\n"),
                    EditOutcome::NotFound => format!("⚠️  No field named '{name}'\n"),
                }
            }
            SessionAction::Debug(enabled) => {
                self.controller.set_debug_mode(enabled).await;
                format!("🔧 Debug mode {}\n", if enabled { "on" } else { "off" })
            }
            SessionAction::Generate => {
                let report = self.controller.generate_options(self.store.fields()).await?;
                let state = self.controller.snapshot().await;
                with_debug(render_options(&state), &report)
            }
            SessionAction::Select(index) => {
                self.controller.toggle_option(index).await?;
                render_options(&self.controller.snapshot().await)
            }
            SessionAction::Confirm => {
                let report = self.controller.confirm_selection().await?;
                // Seed the player-state defaults for display.
                self.controller.player_selections(self.store.fields()).await;
                let state = self.controller.snapshot().await;
                let mut text = String::from("✅ Dialogue selection confirmed\n\n");
                text.push_str(&render_player_state(self.store.fields(), &state));
                with_debug(text, &report)
            }
            SessionAction::Choose { field, value } => {
                self.controller
                    .select_choice(self.store.fields(), &field, &value)
                    .await?;
                render_player_state(self.store.fields(), &self.controller.snapshot().await)
            }
            SessionAction::Submit => {
                let report = self.controller.submit_final(self.store.fields()).await?;
                let state = self.controller.snapshot().await;
                with_debug(render_final(&state), &report)
            }
            SessionAction::Status => {
                self.controller.player_selections(self.store.fields()).await;
                render_session(
                    self.store.fields(),
                    &self.controller.snapshot().await,
                    self.controller.phase().await,
                )
            }
        };
        Ok(text)
    }
}

fn with_debug(mut text: String, report: &StageReport) -> String {
    if let Some(debug_info) = &report.debug_info {
        let _ = write!(text, "\n{}", render_debug_info(debug_info));
    }
    text
}

pub struct SessionCommand {
    pub config: DialogueForgeConfig,
}

impl SessionCommand {
    pub fn new(config: DialogueForgeConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = FieldStore::open(&self.config.storage.fields_file).await?;
        let controller = http_controller(&self.config)?;

        println!("🎲 Dialogue Forge session");
        println!("   Fields file: {}", store.path());
        println!("   Service:     {}", controller.service().base_url());
        println!("   Type 'help' for commands.");
        println!();
        print!("{}", render_fields(store.fields()));
        println!();

        let mut session = Session::new(store, controller);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        session.run(stdin, &mut stdout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldMapping;
    use crate::fs::MockFileSystemOperations;
    use crate::service::{
        ConfirmFinalResponse, Endpoint, FilterOptionsResponse, GenerateOptionsRequest,
        GenerateOptionsResponse, MockDialogueService, ServiceError,
    };
    use serde_json::json;
    use std::sync::Arc;

    async fn session_with(service: MockDialogueService, debug: bool) -> Session<MockDialogueService> {
        let mut fs = MockFileSystemOperations::new();
        fs.expect_read_to_string().returning(|_| Ok(None));
        fs.expect_write().returning(|_, _| Ok(()));
        let store = FieldStore::load("fields.json", Arc::new(fs)).await.unwrap();
        Session::new(store, WorkflowController::new(service, debug))
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("  "), Ok(SessionAction::Nothing));
        assert_eq!(parse_action("GENERATE"), Ok(SessionAction::Generate));
        assert_eq!(parse_action("select 2"), Ok(SessionAction::Select(2)));
        assert_eq!(parse_action("debug on"), Ok(SessionAction::Debug(true)));
        assert_eq!(
            parse_action("add weather choice e.g., rain, sun"),
            Ok(SessionAction::Add {
                name: "weather".into(),
                kind: FieldKind::Choice,
                example: "e.g., rain, sun".into(),
            })
        );
        assert_eq!(
            parse_action("set faction vlandian, roman, sturgian"),
            Ok(SessionAction::Set {
                name: "faction".into(),
                value: "vlandian, roman, sturgian".into(),
            })
        );
        assert_eq!(
            parse_action("choose faction roman"),
            Ok(SessionAction::Choose {
                field: "faction".into(),
                value: "roman".into(),
            })
        );
        assert_eq!(
            parse_action("set background"),
            Ok(SessionAction::Set {
                name: "background".into(),
                value: String::new(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_action("select first").is_err());
        assert!(parse_action("add weather").is_err());
        assert!(parse_action("add weather number").is_err());
        assert!(parse_action("debug maybe").is_err());
        assert!(parse_action("remove").is_err());
        assert!(parse_action("dance").unwrap_err().contains("Unknown command"));
    }

    #[tokio::test]
    async fn test_errors_are_shown_inline() {
        let mut service = MockDialogueService::new();
        service.expect_generate_options().returning(|_| {
            Err(ServiceError::Status {
                endpoint: Endpoint::GenerateOptions,
                code: 500,
            })
        });
        let mut session = session_with(service, false).await;

        let text = session.apply(SessionAction::Confirm).await;
        assert!(text.starts_with("❌ No dialogue options yet."));

        let text = session.apply(SessionAction::Generate).await;
        assert!(text.starts_with("❌"));
        assert!(text.contains("500"));

        let text = session.apply(SessionAction::Submit).await;
        assert!(text.contains("not been confirmed"));
    }

    #[tokio::test]
    async fn test_add_warnings_leave_fields_unchanged() {
        let mut session = session_with(MockDialogueService::new(), false).await;

        let text = session
            .apply(parse_action("add faction text").unwrap())
            .await;
        assert!(text.contains("already exists"));

        let text = session
            .apply(parse_action("add debug text").unwrap())
            .await;
        assert!(text.contains("reserved"));
        assert_eq!(session.store().fields(), &FieldMapping::defaults());

        let text = session
            .apply(parse_action("remove weather").unwrap())
            .await;
        assert!(text.contains("Nothing removed"));
    }

    #[tokio::test]
    async fn test_scripted_session_runs_all_stages() {
        let mut service = MockDialogueService::new();
        service.expect_generate_options().returning(|_| {
            Ok(GenerateOptionsResponse {
                dialogue_options: vec!["Hello traveler".into(), "Who goes there?".into()],
                debug_info: Some(json!({"model": "test"})),
            })
        });
        service
            .expect_filter_options()
            .returning(|_| Ok(FilterOptionsResponse::default()));
        service.expect_confirm_final().returning(|_| {
            Ok(ConfirmFinalResponse {
                final_selected_dialogue: Some("Greetings, roman soldier.".into()),
                debug_info: None,
            })
        });
        let mut session = session_with(service, false).await;

        let script = "generate\nselect 0\nconfirm\nchoose faction roman\nsubmit\nquit\ngenerate\n";
        let mut output = Vec::new();
        session.run(script.as_bytes(), &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Dialogue Options Generated:"));
        assert!(output.contains("[x] 0. Hello traveler"));
        assert!(output.contains("Faction: roman"));
        assert!(output.contains("Final Selected Dialogue:\n   Greetings, roman soldier."));
        assert!(!output.contains("Debug Information"));
        assert!(output.ends_with("👋 Bye\n"));

        let state = session.controller().snapshot().await;
        assert_eq!(state.final_dialogue(), "Greetings, roman soldier.");
    }

    #[tokio::test]
    async fn test_debug_mode_shows_debug_info() {
        let mut service = MockDialogueService::new();
        service
            .expect_generate_options()
            .withf(|request: &GenerateOptionsRequest| request.debug)
            .returning(|_| {
                Ok(GenerateOptionsResponse {
                    dialogue_options: vec!["a".into()],
                    debug_info: Some(json!({"model": "test"})),
                })
            });
        let mut session = session_with(service, false).await;

        session.apply(SessionAction::Debug(true)).await;
        let text = session.apply(SessionAction::Generate).await;

        assert!(text.contains("Debug Information:"));
        assert!(text.contains("\"model\": \"test\""));
    }
}
