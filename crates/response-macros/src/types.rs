//! Macro type definitions.

use crate::error::MacroError;
use async_trait::async_trait;

/// The user who triggered a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Stable identifier (phone number or service id).
    pub id: String,
    /// Display name shown to other users.
    pub name: String,
}

impl Sender {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Everything a macro gets to see when it runs.
#[derive(Debug, Clone, Copy)]
pub struct MacroContext<'a> {
    /// Who sent the command.
    pub sender: &'a Sender,
    /// Message tokens left over after the trigger phrase.
    pub params: &'a [String],
}

impl<'a> MacroContext<'a> {
    pub fn new(sender: &'a Sender, params: &'a [String]) -> Self {
        Self { sender, params }
    }

    /// Parameters rejoined with single spaces.
    pub fn joined_params(&self) -> String {
        self.params.join(" ")
    }
}

/// Trait for implementing macros.
#[async_trait]
pub trait Macro: Send + Sync {
    /// Marker this macro replaces, including delimiters (e.g. `%ROLL%`).
    fn token(&self) -> &str;

    /// Produce the replacement text.
    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError>;
}
