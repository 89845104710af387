//! Response synthesis: template selection and macro expansion with timeouts.

use crate::error::MacroError;
use crate::registry::MacroRegistry;
use crate::types::{Macro, MacroContext, Sender};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

/// Turns a matched template set into reply text.
pub struct ResponseSynthesizer {
    registry: Arc<MacroRegistry>,
    timeout: Duration,
    max_reply_len: usize,
}

impl ResponseSynthesizer {
    /// Create a new synthesizer.
    pub fn new(registry: Arc<MacroRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(10),
            max_reply_len: 2000,
        }
    }

    /// Set the per-macro expansion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set maximum reply length in characters.
    pub fn with_max_reply_len(mut self, len: usize) -> Self {
        self.max_reply_len = len;
        self
    }

    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    /// Pick one template at random and expand it.
    ///
    /// Each call draws independently, so repeated commands may get different
    /// replies. An empty template set produces an empty reply.
    #[instrument(skip_all, fields(channel = %channel, sender = %sender.id))]
    pub async fn synthesize(
        &self,
        channel: &str,
        templates: &[String],
        sender: &Sender,
        params: &[String],
    ) -> Result<String, MacroError> {
        let Some(template) = templates.choose(&mut rand::thread_rng()) else {
            return Ok(String::new());
        };
        debug!(template = %template, "Selected response template");

        self.expand_template(template, sender, params).await
    }

    /// Expand every registered token found in `template`.
    ///
    /// Each distinct token is expanded once, in registry order, with the
    /// original parameters. Substitution is a single scan over the original
    /// template, so text produced by a macro is never expanded again. The
    /// first failing macro aborts the whole expansion.
    pub async fn expand_template(
        &self,
        template: &str,
        sender: &Sender,
        params: &[String],
    ) -> Result<String, MacroError> {
        let ctx = MacroContext::new(sender, params);

        let mut expansions: Vec<(&str, String)> = Vec::new();
        for m in self.registry.iter() {
            if template.contains(m.token()) {
                let text = self.run(m.as_ref(), ctx).await?;
                expansions.push((m.token(), text));
            }
        }

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        loop {
            // Earliest occurrence wins; ties go to the earlier registration.
            let next = expansions
                .iter()
                .filter_map(|(token, text)| rest.find(token).map(|pos| (pos, *token, text)))
                .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, token, text)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(text);
                    rest = &rest[pos + token.len()..];
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        Ok(truncate(out, self.max_reply_len))
    }

    async fn run(&self, m: &dyn Macro, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        let token = m.token();
        match timeout(self.timeout, m.expand(ctx)).await {
            Ok(Ok(text)) => {
                debug!(token = %token, len = text.len(), "Macro expanded");
                Ok(text)
            }
            Ok(Err(e)) => {
                warn!(token = %token, error = %e, "Macro failed");
                Err(e)
            }
            Err(_) => {
                error!(token = %token, timeout = ?self.timeout, "Macro timed out");
                Err(MacroError::Timeout)
            }
        }
    }
}

fn truncate(content: String, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... [truncated]", &content[..cut]),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_err;

    struct EchoToken {
        token: &'static str,
        output: &'static str,
        calls: AtomicUsize,
    }

    impl EchoToken {
        fn new(token: &'static str, output: &'static str) -> Self {
            Self {
                token,
                output,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Macro for EchoToken {
        fn token(&self) -> &str {
            self.token
        }

        async fn expand(&self, _ctx: MacroContext<'_>) -> Result<String, MacroError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.into())
        }
    }

    struct SlowMacro;

    #[async_trait]
    impl Macro for SlowMacro {
        fn token(&self) -> &str {
            "%SLOW%"
        }

        async fn expand(&self, _ctx: MacroContext<'_>) -> Result<String, MacroError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("done".into())
        }
    }

    fn synthesizer() -> ResponseSynthesizer {
        ResponseSynthesizer::new(Arc::new(MacroRegistry::with_local_builtins().unwrap()))
    }

    fn params(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_sender_substitution() {
        let out = synthesizer()
            .synthesize("c1", &["Hello %SENDER%".to_string()], &Sender::new("1", "Alex"), &[])
            .await
            .unwrap();
        assert_eq!(out, "Hello Alex");
    }

    #[tokio::test]
    async fn test_every_occurrence_is_replaced() {
        let out = synthesizer()
            .expand_template(
                "%INPUT%! I said %INPUT%!",
                &Sender::new("1", "Alex"),
                &params(&["hey", "you"]),
            )
            .await
            .unwrap();
        assert_eq!(out, "hey you! I said hey you!");
    }

    #[tokio::test]
    async fn test_unknown_tokens_stay_literal() {
        let out = synthesizer()
            .expand_template("%NOPE% and 100%", &Sender::new("1", "Alex"), &[])
            .await
            .unwrap();
        assert_eq!(out, "%NOPE% and 100%");
    }

    #[tokio::test]
    async fn test_generated_text_is_not_rescanned() {
        let mut registry = MacroRegistry::new();
        registry
            .register(Arc::new(EchoToken::new("%FIRST%", "%SECOND%")))
            .unwrap();
        let second = Arc::new(EchoToken::new("%SECOND%", "boom"));
        registry.register(second.clone()).unwrap();

        let out = ResponseSynthesizer::new(Arc::new(registry))
            .expand_template("a %FIRST% b", &Sender::new("1", "Alex"), &[])
            .await
            .unwrap();

        assert_eq!(out, "a %SECOND% b");
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_token_expands_once() {
        let mut registry = MacroRegistry::new();
        let echo = Arc::new(EchoToken::new("%X%", "x"));
        registry.register(echo.clone()).unwrap();

        let out = ResponseSynthesizer::new(Arc::new(registry))
            .expand_template("%X%%X%%X%", &Sender::new("1", "Alex"), &[])
            .await
            .unwrap();

        assert_eq!(out, "xxx");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_replaces_whole_reply() {
        let result = synthesizer()
            .synthesize(
                "c1",
                &["%SENDER% rolled %ROLL%".to_string()],
                &Sender::new("1", "Alex"),
                &params(&["2d1001"]),
            )
            .await;

        let err = assert_err!(result);
        assert_eq!(err.to_string(), "I don't have a die with 1001 sides (\"2d1001\")");
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut registry = MacroRegistry::new();
        registry.register(Arc::new(SlowMacro)).unwrap();
        let synthesizer =
            ResponseSynthesizer::new(Arc::new(registry)).with_timeout(Duration::from_millis(50));

        let result = synthesizer
            .expand_template("%SLOW%", &Sender::new("1", "Alex"), &[])
            .await;
        assert!(matches!(result, Err(MacroError::Timeout)));
    }

    #[tokio::test]
    async fn test_picks_from_template_set() {
        let templates = vec!["one".to_string(), "two".to_string()];
        for _ in 0..10 {
            let out = synthesizer()
                .synthesize("c1", &templates, &Sender::new("1", "Alex"), &[])
                .await
                .unwrap();
            assert!(out == "one" || out == "two");
        }
    }

    #[tokio::test]
    async fn test_long_reply_is_truncated() {
        let out = synthesizer()
            .with_max_reply_len(5)
            .expand_template("héllo wörld", &Sender::new("1", "Alex"), &[])
            .await
            .unwrap();
        assert_eq!(out, "héllo... [truncated]");
    }
}
