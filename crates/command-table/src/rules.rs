//! Rules file parsing and validation.

use crate::error::RulesError;
use crate::types::{ChannelAuthorization, CommandTable, RulesSnapshot, Trigger};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, instrument};

pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Raw rules file layout.
///
/// ```json
/// {
///   "settings": { "command_prefix": "!" },
///   "commands": { "fun": { "hi": ["Hello %SENDER%"], "roll *": ["You rolled %ROLL%"] } },
///   "channels": { "fun": ["channel-id"] },
///   "permissions": { "admin": ["+15550001"], "ignored": [] }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub settings: Settings,

    /// Group name -> trigger -> response templates.
    pub commands: IndexMap<String, IndexMap<String, Vec<String>>>,

    /// Group name -> channels allowed to use it.
    #[serde(default)]
    pub channels: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Permissions {
    /// Users allowed to run admin commands.
    #[serde(default)]
    pub admin: Vec<String>,

    /// Users the bot never answers.
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
        }
    }
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.into()
}

impl RulesFile {
    /// Parse rules from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate and build an immutable snapshot.
    pub fn into_snapshot(self) -> Result<RulesSnapshot, RulesError> {
        if self.settings.command_prefix.is_empty() {
            return Err(RulesError::EmptyPrefix);
        }

        let mut commands = CommandTable::new();
        for (group_name, entries) in self.commands {
            let group = commands.group_mut(&group_name);
            for (raw, templates) in entries {
                let trigger = Trigger::parse(&raw);
                if trigger.phrase().is_empty() {
                    return Err(RulesError::EmptyTrigger {
                        group: group_name,
                        trigger: raw,
                    });
                }
                if templates.is_empty() {
                    return Err(RulesError::NoTemplates {
                        group: group_name,
                        trigger: raw,
                    });
                }
                if templates.iter().any(|t| t.trim().is_empty()) {
                    return Err(RulesError::EmptyTemplate {
                        group: group_name,
                        trigger: raw,
                    });
                }
                group.insert(trigger, templates.into_iter().map(|t| t.trim().to_string()));
            }
        }

        let mut channels = ChannelAuthorization::new();
        for (group_name, channel_ids) in &self.channels {
            if !commands.contains_group(group_name) {
                return Err(RulesError::UnknownGroup(group_name.clone()));
            }
            for channel in channel_ids {
                channels.grant(channel, group_name);
            }
        }

        debug!(
            groups = commands.len(),
            channels = channels.len(),
            "Built rules snapshot"
        );

        Ok(RulesSnapshot {
            command_prefix: self.settings.command_prefix,
            commands,
            channels,
            admins: self.permissions.admin.into_iter().collect(),
            ignored: self.permissions.ignored.into_iter().collect(),
        })
    }
}

impl RulesSnapshot {
    /// Parse and validate rules from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RulesError> {
        RulesFile::from_json(text)?.into_snapshot()
    }

    /// Read, parse and validate a rules file.
    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, RulesError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RulesError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&text)
    }
}
