//! `%SENDER%` - the invoking user's display name.

use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;

pub struct SenderMacro;

#[async_trait]
impl Macro for SenderMacro {
    fn token(&self) -> &str {
        "%SENDER%"
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        Ok(ctx.sender.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sender;

    #[tokio::test]
    async fn test_sender_name() {
        let sender = Sender::new("+15550001", "Alex");
        let params = vec!["ignored".to_string()];
        let out = SenderMacro
            .expand(MacroContext::new(&sender, &params))
            .await
            .unwrap();
        assert_eq!(out, "Alex");
    }
}
