//! `%ROLL%` - rolls the dice described by the parameters.

use crate::dice::{render_rolls, roll};
use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;
use tracing::debug;

pub struct RollMacro;

#[async_trait]
impl Macro for RollMacro {
    fn token(&self) -> &str {
        "%ROLL%"
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        if ctx.params.is_empty() {
            return Err(MacroError::NoDice);
        }

        let rolls = roll(ctx.params)?;
        debug!(dice = ?ctx.params, count = rolls.len(), "Rolled dice");
        Ok(render_rolls(&rolls))
    }
}
