//! Command table types.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;

/// Marker that makes a rules-file trigger accept trailing parameters.
pub const WILDCARD: char = '*';

/// Collapse whitespace to single spaces and lowercase.
pub fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A normalized trigger phrase, optionally accepting trailing parameters.
///
/// `roll` and `roll *` are different keys: the first only matches the exact
/// phrase, the second only matches when something follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trigger {
    phrase: String,
    accepts_params: bool,
}

impl Trigger {
    /// Trigger matching `phrase` with nothing after it.
    pub fn exact(phrase: &str) -> Self {
        Self {
            phrase: normalize(phrase),
            accepts_params: false,
        }
    }

    /// Trigger matching `phrase` followed by at least one parameter.
    pub fn with_params(phrase: &str) -> Self {
        Self {
            phrase: normalize(phrase),
            accepts_params: true,
        }
    }

    /// Parse rules-file syntax: `"roll *"` and `"roll*"` accept parameters.
    pub fn parse(raw: &str) -> Self {
        match raw.trim_end().strip_suffix(WILDCARD) {
            Some(phrase) => Self::with_params(phrase),
            None => Self::exact(raw),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn accepts_params(&self) -> bool {
        self.accepts_params
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accepts_params {
            write!(f, "{} {}", self.phrase, WILDCARD)
        } else {
            f.write_str(&self.phrase)
        }
    }
}

/// A named bucket of triggers and their response templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandGroup {
    triggers: IndexMap<Trigger, Vec<String>>,
}

impl CommandGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add templates for a trigger, appending to any it already has.
    pub fn insert(&mut self, trigger: Trigger, templates: impl IntoIterator<Item = String>) {
        self.triggers.entry(trigger).or_default().extend(templates);
    }

    /// Response templates for a trigger.
    pub fn get(&self, trigger: &Trigger) -> Option<&[String]> {
        self.triggers.get(trigger).map(Vec::as_slice)
    }

    /// Get a trigger's stored key and templates.
    pub fn get_key_value(&self, trigger: &Trigger) -> Option<(&Trigger, &[String])> {
        self.triggers
            .get_key_value(trigger)
            .map(|(k, v)| (k, v.as_slice()))
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.keys()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// All command groups, in rules-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    groups: IndexMap<String, CommandGroup>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> &mut CommandGroup {
        self.groups.entry(name.to_string()).or_default()
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &CommandGroup)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Which command groups each channel may use.
///
/// Group order per channel follows the rules file, and the first group that
/// knows a trigger wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAuthorization {
    channels: IndexMap<String, Vec<String>>,
}

impl ChannelAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `channel` to use `group`. Repeated grants are ignored.
    pub fn grant(&mut self, channel: &str, group: &str) {
        let groups = self.channels.entry(channel.to_string()).or_default();
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
    }

    /// Groups for a channel; empty when the channel isn't monitored.
    pub fn groups_for(&self, channel: &str) -> &[String] {
        self.channels
            .get(channel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_monitored(&self, channel: &str) -> bool {
        !self.groups_for(channel).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.channels
            .iter()
            .map(|(channel, groups)| (channel.as_str(), groups.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// One consistent view of the rules file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesSnapshot {
    pub command_prefix: String,
    pub commands: CommandTable,
    pub channels: ChannelAuthorization,
    pub admins: BTreeSet<String>,
    pub ignored: BTreeSet<String>,
}

impl RulesSnapshot {
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.contains(user_id)
    }

    pub fn is_ignored(&self, user_id: &str) -> bool {
        self.ignored.contains(user_id)
    }
}
