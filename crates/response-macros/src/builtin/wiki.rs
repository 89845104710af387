//! `%WIKI%` - looks up an article via the MediaWiki search API.

use crate::error::MacroError;
use crate::types::{Macro, MacroContext};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

const SERVICE: &str = "Wikipedia";
const USER_AGENT: &str = concat!("response-macros/", env!("CARGO_PKG_VERSION"));

/// Wikipedia search macro.
pub struct WikiMacro {
    client: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    pageid: u64,
}

#[derive(Deserialize)]
struct InfoResponse {
    query: InfoQuery,
}

#[derive(Deserialize)]
struct InfoQuery {
    pages: HashMap<String, PageInfo>,
}

#[derive(Deserialize)]
struct PageInfo {
    fullurl: Option<String>,
}

impl WikiMacro {
    /// Create a new macro talking to the given `api.php` endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.into(),
        }
    }

    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, MacroError> {
        let response: Response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Wikipedia request failed");
                MacroError::Unreachable(SERVICE.into())
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Wikipedia returned an error");
            return Err(MacroError::Unreachable(SERVICE.into()));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Unexpected Wikipedia response");
            MacroError::Unreachable(SERVICE.into())
        })
    }
}

#[async_trait]
impl Macro for WikiMacro {
    fn token(&self) -> &str {
        "%WIKI%"
    }

    async fn expand(&self, ctx: MacroContext<'_>) -> Result<String, MacroError> {
        let search = ctx.joined_params();
        if search.is_empty() {
            return Err(MacroError::BadInput("What should I look up?".into()));
        }

        debug!(query = %search, "Searching Wikipedia");
        let not_found = || MacroError::NotFound(format!("I couldn't find anything about {}", search));

        let results: SearchResponse = self
            .query(&[("list", "search"), ("srsearch", search.as_str()), ("srlimit", "1")])
            .await?;
        let page_id = results
            .query
            .search
            .first()
            .map(|hit| hit.pageid.to_string())
            .ok_or_else(not_found)?;

        let info: InfoResponse = self
            .query(&[("prop", "info"), ("pageids", page_id.as_str()), ("inprop", "url")])
            .await?;

        info.query
            .pages
            .get(&page_id)
            .and_then(|page| page.fullurl.clone())
            .ok_or_else(not_found)
    }
}
