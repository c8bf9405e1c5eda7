//! Discord message text to Minecraft formatting codes.

use regex::{Captures, Regex};
use std::collections::HashMap;

/// Underline formatting code.
pub const MC_UNDERLINE: &str = "§n";
/// Reset formatting code.
pub const MC_RESET: &str = "§r";
/// Code highlight (black background code, green text).
pub const MC_CODE: &str = "§0§a";

/// Translates Discord markup into Minecraft chat.
///
/// # Examples
///
/// ```
/// use kavex_social::MinecraftFormatter;
///
/// let formatter = MinecraftFormatter::new();
/// assert_eq!(formatter.markdown("**hi** ~~no~~"), "§lhi§r §mno§r");
/// ```
#[derive(Debug, Clone)]
pub struct MinecraftFormatter {
    code_block: Regex,
    inline_code: Regex,
    bold: Regex,
    underline: Regex,
    strike: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
    mention: Regex,
}

impl Default for MinecraftFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MinecraftFormatter {
    /// Compile the formatter.
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("Valid formatting regex");
        Self {
            // Optional language hint must end the opening line.
            code_block: compile(r"```(?:[A-Za-z0-9_+\-]*\n)?([\s\S]*?)```"),
            inline_code: compile(r"`([^`\n]+)`"),
            bold: compile(r"\*\*(.+?)\*\*"),
            underline: compile(r"__(.+?)__"),
            strike: compile(r"~~(.+?)~~"),
            // Runs after bold/underline, so doubled markers are already gone.
            italic_star: compile(r"\*([^*\n]+?)\*"),
            italic_underscore: compile(r"_([^_\n]+?)_"),
            mention: compile(r"<@([!&]?)(\d+)>"),
        }
    }

    /// Apply the supported markdown subset.
    ///
    /// `**bold**`, `__underline__`, `~~strike~~`, `*italic*` / `_italic_`,
    /// inline and fenced code. Every span is closed with a reset code.
    pub fn markdown(&self, text: &str) -> String {
        let code = format!("{MC_CODE}${{1}}{MC_RESET}");
        let text = self.code_block.replace_all(text, code.as_str());
        let text = self.inline_code.replace_all(&text, code.as_str());
        let text = self.bold.replace_all(&text, format!("§l${{1}}{MC_RESET}").as_str());
        let text = self
            .underline
            .replace_all(&text, format!("{MC_UNDERLINE}${{1}}{MC_RESET}").as_str());
        let text = self.strike.replace_all(&text, format!("§m${{1}}{MC_RESET}").as_str());
        let italic = format!("§o${{1}}{MC_RESET}");
        let text = self.italic_star.replace_all(&text, italic.as_str());
        self.italic_underscore
            .replace_all(&text, italic.as_str())
            .into_owned()
    }

    /// Replace raw `<@id>`, `<@!id>` and `<@&id>` mentions with underlined
    /// `@name`s.
    pub fn mentions(
        &self,
        text: &str,
        users: &HashMap<u64, String>,
        roles: &HashMap<u64, String>,
    ) -> String {
        self.mention
            .replace_all(text, |caps: &Captures<'_>| {
                let id = caps[2].parse::<u64>().unwrap_or_default();
                let name = if &caps[1] == "&" {
                    roles.get(&id).map(String::as_str).unwrap_or("deleted-role")
                } else {
                    users.get(&id).map(String::as_str).unwrap_or("invalid-user")
                };
                format!("{MC_UNDERLINE}@{name}{MC_RESET}")
            })
            .into_owned()
    }

    /// Full Discord to game conversion: mentions first, then markdown.
    pub fn to_game_text(
        &self,
        text: &str,
        users: &HashMap<u64, String>,
        roles: &HashMap<u64, String>,
    ) -> String {
        self.markdown(&self.mentions(text, users, roles))
    }
}

/// Names among `names` that `text` pings as `@name` or `` `@name` ``.
///
/// Matching is case-insensitive and needs a non-word character (or the text
/// boundary) on both sides. Each name is reported once, in input order.
///
/// # Examples
///
/// ```
/// use kavex_social::pinged_names;
///
/// let names = ["Steve", "Alex"];
/// assert_eq!(pinged_names("hey @steve!", names), vec!["Steve".to_string()]);
/// assert!(pinged_names("mail me@Alexandria", names).is_empty());
/// ```
pub fn pinged_names<'a>(text: &str, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    if !text.contains('@') {
        return Vec::new();
    }
    let mut pinged: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || pinged.iter().any(|p| p == name) {
            continue;
        }
        let pattern = format!(r"(?i)(?:^|\W)`?@{}`?(?:\W|$)", regex::escape(name));
        if Regex::new(&pattern).is_ok_and(|re| re.is_match(text)) {
            pinged.push(name.to_string());
        }
    }
    pinged
}

/// Underline each literal `@name` of `names` in `text`.
pub fn underline_pings(text: &str, names: &[String]) -> String {
    names.iter().fold(text.to_string(), |text, name| {
        let needle = format!("@{name}");
        text.replace(&needle, &format!("{MC_UNDERLINE}{needle}{MC_RESET}"))
    })
}
