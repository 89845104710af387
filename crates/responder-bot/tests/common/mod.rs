//! Common test utilities for integration tests.

use command_table::RulesStore;
use response_macros::{MacroRegistry, ResponseSynthesizer};
use responder_bot::commands::*;
use responder_bot::config::MacrosConfig;
use responder_bot::macros::build_registry;
use responder_bot::{ChatGateway, Dispatcher, Outbox};
use signal_client::{BotMessage, SignalClient};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOT: &str = "+15550000000";
pub const ALEX: &str = "+15550000001";
pub const ADMIN: &str = "+15550000002";
pub const TABLE: &str = "ZGljZS10YWJsZQ==";

/// Rules used by most tests: one group, one group channel.
pub fn default_rules() -> String {
    format!(
        r#"{{
            "settings": {{ "command_prefix": "!" }},
            "commands": {{
                "table": {{
                    "hi": ["Hello %SENDER%"],
                    "roll *": ["You rolled %ROLL%"],
                    "comic *": ["%XKCD%"]
                }}
            }},
            "channels": {{ "table": ["{TABLE}"] }},
            "permissions": {{ "admin": ["{ADMIN}"], "ignored": [] }}
        }}"#
    )
}

/// A dispatcher wired to a mock Signal server and a rules file on disk.
pub struct Harness {
    pub signal_server: MockServer,
    pub dispatcher: Dispatcher,
    pub outbox: Arc<Outbox>,
    pub rules_file: NamedTempFile,
}

impl Harness {
    pub async fn start(rules: &str) -> Self {
        Self::start_with_macros(rules, MacrosConfig::default()).await
    }

    pub async fn start_with_macros(rules: &str, macros: MacrosConfig) -> Self {
        let signal_server = MockServer::start().await;

        let mut rules_file = NamedTempFile::new().unwrap();
        rules_file.write_all(rules.as_bytes()).unwrap();
        let store = RulesStore::open(rules_file.path()).await.unwrap();

        let registry: MacroRegistry = build_registry(&macros).unwrap();
        let synthesizer = Arc::new(
            ResponseSynthesizer::new(Arc::new(registry)).with_timeout(Duration::from_secs(2)),
        );

        let signal = SignalClient::new(signal_server.uri(), BOT).unwrap();
        let gateway: Arc<dyn ChatGateway> = Arc::new(signal);
        let outbox = Arc::new(Outbox::new(gateway.clone(), Duration::from_millis(10)));

        let handlers: Vec<Box<dyn CommandHandler>> = vec![
            Box::new(WhoamiHandler::new()),
            Box::new(ReloadHandler::new(store.clone())),
            Box::new(StopHandler::new()),
            Box::new(ChannelsHandler::new(gateway)),
        ];
        let dispatcher = Dispatcher::new(store, synthesizer, handlers, outbox.clone());

        Self {
            signal_server,
            dispatcher,
            outbox,
            rules_file,
        }
    }

    /// Accept every send request.
    pub async fn accept_sends(&self) {
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.signal_server)
            .await;
    }

    /// Bodies of all send requests the mock server has seen.
    pub async fn sent(&self) -> Vec<serde_json::Value> {
        self.signal_server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == "/v2/send")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    /// Replace the rules file on disk.
    pub fn rewrite_rules(&self, rules: &str) {
        std::fs::write(self.rules_file.path(), rules).unwrap();
    }
}

pub fn group_message(source: &str, name: &str, text: &str, group: &str) -> BotMessage {
    BotMessage {
        source: source.into(),
        source_name: name.into(),
        text: text.into(),
        timestamp: 1677652288000,
        group_id: Some(group.into()),
        receiving_account: BOT.into(),
    }
}

pub fn direct_message(source: &str, name: &str, text: &str) -> BotMessage {
    BotMessage {
        source: source.into(),
        source_name: name.into(),
        text: text.into(),
        timestamp: 1677652288000,
        group_id: None,
        receiving_account: BOT.into(),
    }
}
