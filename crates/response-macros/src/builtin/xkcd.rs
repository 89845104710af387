//! `%XKCD%` and `%RANDOM_XKCD%` - comic lookups against the XKCD JSON API.

use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

const SERVICE: &str = "XKCD";

/// Which comic a token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XkcdMode {
    /// `%XKCD%`: the comic numbered by the first parameter, or a random one.
    Numbered,
    /// `%RANDOM_XKCD%`: always a random comic.
    Random,
}

/// XKCD lookup macro.
pub struct XkcdMacro {
    client: Client,
    base_url: String,
    mode: XkcdMode,
}

#[derive(Debug, Deserialize)]
struct Comic {
    num: u32,
    safe_title: String,
}

impl XkcdMacro {
    pub fn new(base_url: impl Into<String>, mode: XkcdMode) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mode,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Comic, MacroError> {
        debug!(url = %url, "Fetching comic");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "XKCD request failed");
            MacroError::Unreachable(SERVICE.into())
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MacroError::NotFound("Comic not found".into()));
        }
        if !response.status().is_success() {
            warn!(status = %response.status(), "XKCD returned an error");
            return Err(MacroError::Unreachable(SERVICE.into()));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Unexpected XKCD response");
            MacroError::Unreachable(SERVICE.into())
        })
    }

    async fn fetch_number(&self, number: u32) -> Result<Comic, MacroError> {
        self.fetch(&format!("{}/{}/info.0.json", self.base_url, number))
            .await
    }

    async fn fetch_random(&self) -> Result<Comic, MacroError> {
        let latest = self
            .fetch(&format!("{}/info.0.json", self.base_url))
            .await?
            .num;
        if latest == 0 {
            return Err(MacroError::NotFound("Couldn't determine XKCD range".into()));
        }

        let number = rand::thread_rng().gen_range(1..=latest);
        self.fetch_number(number).await
    }
}

#[async_trait]
impl Macro for XkcdMacro {
    fn token(&self) -> &str {
        match self.mode {
            XkcdMode::Numbered => "%XKCD%",
            XkcdMode::Random => "%RANDOM_XKCD%",
        }
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        let requested = match (self.mode, ctx.params.first()) {
            (XkcdMode::Numbered, Some(first)) => Some(
                first
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| MacroError::BadInput("That doesn't sound like a number".into()))?,
            ),
            _ => None,
        };

        let comic = match requested {
            Some(number) => self.fetch_number(number).await?,
            None => self.fetch_random().await?,
        };

        Ok(format!(
            "{}/{} (\"{}\")",
            self.base_url, comic.num, comic.safe_title
        ))
    }
}
