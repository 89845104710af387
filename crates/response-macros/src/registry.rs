//! Macro registry for managing available macros.

use crate::error::{MacroError, RegistryError};
use crate::types::{Macro, MacroContext};
use std::sync::Arc;

/// Registry of available macros, kept in registration order.
///
/// Expansion checks tokens in this order, so it must be stable.
#[derive(Clone, Default)]
pub struct MacroRegistry {
    macros: Vec<Arc<dyn Macro>>,
}

impl MacroRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { macros: Vec::new() }
    }

    /// Create a registry with the built-in macros that need no network access.
    pub fn with_local_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for m in crate::builtin::local_macros() {
            registry.register(m)?;
        }
        Ok(registry)
    }

    /// Register a macro. Tokens must be unique and look like `%NAME%`.
    pub fn register(&mut self, m: Arc<dyn Macro>) -> Result<(), RegistryError> {
        let token = m.token();
        if !is_valid_token(token) {
            return Err(RegistryError::InvalidToken(token.to_string()));
        }
        if self.get(token).is_some() {
            return Err(RegistryError::DuplicateToken(token.to_string()));
        }
        self.macros.push(m);
        Ok(())
    }

    /// Get a macro by token.
    pub fn get(&self, token: &str) -> Option<&Arc<dyn Macro>> {
        self.macros.iter().find(|m| m.token() == token)
    }

    /// Iterate macros in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Macro>> {
        self.macros.iter()
    }

    /// List all registered tokens.
    pub fn list_tokens(&self) -> Vec<&str> {
        self.macros.iter().map(|m| m.token()).collect()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Expand a single token. Unknown tokens come back unchanged.
    pub async fn expand(&self, token: &str, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        match self.get(token) {
            Some(m) => m.expand(ctx).await,
            None => Ok(token.to_string()),
        }
    }
}

fn is_valid_token(token: &str) -> bool {
    token.len() > 2
        && token.starts_with('%')
        && token.ends_with('%')
        && !token[1..token.len() - 1].contains('%')
        && !token.chars().any(char::is_whitespace)
}
