//! `@name` to Discord mention translation for relayed chat.

use kavex_core::{GuildId, UserId};
use kavex_interface::{BridgeStore, Directory};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Rewrites `@Name` references into `<@id>` mentions of linked members.
pub struct MentionTranslator {
    store: Arc<dyn BridgeStore>,
    directory: Arc<dyn Directory>,
    pattern: Regex,
}

impl MentionTranslator {
    /// Create a translator over the given store and directory.
    pub fn new(store: Arc<dyn BridgeStore>, directory: Arc<dyn Directory>) -> Self {
        let pattern = Regex::new(r"@([A-Za-z0-9_]{2,32})\b").expect("Valid mention regex");
        Self {
            store,
            directory,
            pattern,
        }
    }

    /// Translate `text` for delivery into `guild_id`.
    ///
    /// Names are matched case-insensitively against each member's display name,
    /// username and alternate names. When two members share a name, the one the
    /// directory lists first wins. A match counts only if that member has a
    /// linked Minecraft account; everything else is left as typed. Lookup
    /// failures return the text unchanged.
    #[instrument(skip(self, text), fields(guild_id = %guild_id))]
    pub async fn translate(&self, guild_id: GuildId, text: &str) -> String {
        let tokens: HashSet<String> = self
            .pattern
            .captures_iter(text)
            .map(|caps| caps[1].to_lowercase())
            .collect();
        if tokens.is_empty() {
            return text.to_string();
        }

        let members = match self.directory.members(guild_id).await {
            Ok(members) => members,
            Err(e) => {
                debug!(error = %e, "Directory unavailable, leaving mentions literal");
                return text.to_string();
            }
        };
        let linked: HashSet<UserId> = match self.store.account_links_for_guild(guild_id).await {
            Ok(links) => links.into_iter().map(|link| link.discord_id).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load account links, leaving mentions literal");
                return text.to_string();
            }
        };

        let mut by_name: HashMap<String, UserId> = HashMap::new();
        for member in &members {
            for name in member.names() {
                by_name
                    .entry(name.to_lowercase())
                    .or_insert(member.user_id);
            }
        }

        let resolved: HashMap<&str, UserId> = tokens
            .iter()
            .filter_map(|token| {
                by_name
                    .get(token)
                    .filter(|id| linked.contains(*id))
                    .map(|id| (token.as_str(), *id))
            })
            .collect();
        if resolved.is_empty() {
            return text.to_string();
        }

        debug!(resolved = resolved.len(), "Translating mentions");
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                match resolved.get(caps[1].to_lowercase().as_str()) {
                    Some(id) => format!("<@{id}>"),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
