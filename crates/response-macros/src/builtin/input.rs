//! `%INPUT%` - echoes the leftover parameters.

use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;

pub struct InputMacro;

#[async_trait]
impl Macro for InputMacro {
    fn token(&self) -> &str {
        "%INPUT%"
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        Ok(ctx.joined_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sender;

    #[tokio::test]
    async fn test_rejoins_with_single_spaces() {
        let sender = Sender::new("1", "Alex");
        let params: Vec<String> = ["a", "big", "hug"].iter().map(|s| s.to_string()).collect();
        let out = InputMacro
            .expand(MacroContext::new(&sender, &params))
            .await
            .unwrap();
        assert_eq!(out, "a big hug");
    }

    #[tokio::test]
    async fn test_no_params_is_empty() {
        let sender = Sender::new("1", "Alex");
        let out = InputMacro
            .expand(MacroContext::new(&sender, &[]))
            .await
            .unwrap();
        assert_eq!(out, "");
    }
}
