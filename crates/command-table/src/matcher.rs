//! Longest-match command lookup.

use crate::types::{normalize, RulesSnapshot, Trigger};

/// Split a prefix-stripped message into tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// A candidate trigger and the tokens that would be left over as parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMatch<'t> {
    pub trigger: Trigger,
    pub params: &'t [String],
}

impl<'t> PendingMatch<'t> {
    /// Candidates from longest to shortest.
    ///
    /// The full message never gets the wildcard form since nothing would be
    /// left over. An empty message has no candidates.
    pub fn candidates(tokens: &'t [String]) -> impl Iterator<Item = PendingMatch<'t>> {
        (1..=tokens.len()).rev().map(move |i| {
            let phrase = normalize(&tokens[..i].join(" "));
            let params = &tokens[i..];
            let trigger = if params.is_empty() {
                Trigger::exact(&phrase)
            } else {
                Trigger::with_params(&phrase)
            };
            PendingMatch { trigger, params }
        })
    }
}

/// A resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch<'a> {
    /// Group that owns the trigger.
    pub group: &'a str,
    pub trigger: &'a Trigger,
    pub templates: &'a [String],
    /// Tokens after the trigger phrase.
    pub params: Vec<String>,
}

impl RulesSnapshot {
    /// Find the longest trigger that `tokens` start with, within the groups
    /// `channel` may use.
    ///
    /// Unmonitored channels never match. Among groups, the first one in
    /// rules-file order that knows the trigger wins.
    pub fn match_command<'a>(&'a self, channel: &str, tokens: &[String]) -> Option<CommandMatch<'a>> {
        let groups = self.channels.groups_for(channel);
        if groups.is_empty() {
            return None;
        }

        for pending in PendingMatch::candidates(tokens) {
            for name in groups {
                let Some(group) = self.commands.group(name) else {
                    continue;
                };

                if let Some((trigger, templates)) = group.get_key_value(&pending.trigger) {
                    return Some(CommandMatch {
                        group: name,
                        trigger,
                        templates,
                        params: pending.params.to_vec(),
                    });
                }
            }
        }

        None
    }
}
