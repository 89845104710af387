//! Rules loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a rules file from becoming the live snapshot.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rules file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command prefix must not be empty")]
    EmptyPrefix,

    #[error("Group {group} has a trigger with no words: {trigger:?}")]
    EmptyTrigger { group: String, trigger: String },

    #[error("Trigger \"{trigger}\" in group {group} has no responses")]
    NoTemplates { group: String, trigger: String },

    #[error("Trigger \"{trigger}\" in group {group} has an empty response")]
    EmptyTemplate { group: String, trigger: String },

    #[error("Channels are assigned to unknown command group {0}")]
    UnknownGroup(String),
}
