//! `%CHOICE%` - picks one of a comma-separated list of options.

use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;
use rand::seq::SliceRandom;

pub struct ChoiceMacro;

#[async_trait]
impl Macro for ChoiceMacro {
    fn token(&self) -> &str {
        "%CHOICE%"
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        if ctx.params.is_empty() {
            return Err(MacroError::NoChoices);
        }

        let joined = ctx.joined_params();
        let choices: Vec<&str> = joined.split(',').map(str::trim).collect();

        // split always yields at least one element
        choices
            .choose(&mut rand::thread_rng())
            .map(|c| c.to_string())
            .ok_or(MacroError::NoChoices)
    }
}
