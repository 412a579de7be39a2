//! Input parsing for Claude Code hook JSON format
//!
//! Parses the event Claude Code writes to the hook's stdin. Only the fields
//! the engine needs are typed; the raw value is kept for the audit trail.

use serde::Deserialize;
use serde_json::Value;

/// Where a command may live inside the event, tried in order
pub const COMMAND_FIELD_PATHS: &[&[&str]] = &[
    &["tool_input", "command"],
    &["parameters", "command"],
    &["arguments", "command"],
    &["tool_arguments", "command"],
];

/// The tool whose commands are validated
pub const BASH_TOOL: &str = "Bash";

#[derive(Debug, Deserialize, Default)]
struct EventFields {
    #[serde(default)]
    tool_name: Option<String>,

    #[serde(default)]
    session_id: Option<String>,

    #[serde(default)]
    hook_event_name: Option<String>,

    #[serde(default)]
    working_directory: Option<String>,

    #[serde(default)]
    cwd: Option<String>,
}

/// A parsed hook event
#[derive(Debug, Clone, PartialEq)]
pub struct HookInput {
    /// Name of the tool being invoked (e.g., "Bash", "Read")
    pub tool_name: String,

    pub session_id: Option<String>,

    /// Hook event name (e.g., "PreToolUse")
    pub hook_event_name: Option<String>,

    pub working_directory: Option<String>,

    pub cwd: Option<String>,

    /// The full event as received
    pub raw: Value,
}

impl HookInput {
    /// Parse input from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(json)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        // Non-object events still deserialize, with every field missing
        let fields = if raw.is_object() {
            EventFields::deserialize(&raw)?
        } else {
            EventFields::default()
        };

        Ok(Self {
            tool_name: fields.tool_name.unwrap_or_default(),
            session_id: fields.session_id,
            hook_event_name: fields.hook_event_name,
            working_directory: fields.working_directory,
            cwd: fields.cwd,
            raw,
        })
    }

    pub fn is_bash(&self) -> bool {
        self.tool_name == BASH_TOOL
    }

    /// The command text, from the first known field path holding a non-empty string
    pub fn command(&self) -> Option<&str> {
        COMMAND_FIELD_PATHS.iter().find_map(|path| {
            path.iter()
                .try_fold(&self.raw, |value, key| value.get(key))
                .and_then(Value::as_str)
                .filter(|command| !command.trim().is_empty())
        })
    }

    /// Working directory from the event (`working_directory`, then `cwd`),
    /// else the process's current directory
    pub fn working_dir(&self) -> String {
        [&self.working_directory, &self.cwd]
            .into_iter()
            .flatten()
            .find(|dir| !dir.is_empty())
            .cloned()
            .unwrap_or_else(|| {
                std::env::current_dir()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|_| ".".to_string())
            })
    }

    /// Get a summary of the input for logging
    pub fn summary(&self) -> String {
        match self.command() {
            Some(command) => {
                let truncated = if command.chars().count() > 100 {
                    format!("{}...", command.chars().take(100).collect::<String>())
                } else {
                    command.to_string()
                };
                format!("{}: {}", self.tool_name, truncated)
            }
            None => format!("{}: <no command>", self.tool_name),
        }
    }
}
