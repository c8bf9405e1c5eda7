//! Webhook message rendering for relayed Minecraft traffic.

use kavex_core::{ChatFrame, EventFrame, ModerationFrame, ModerationKind};
use kavex_interface::WebhookMessage;

/// Avatar URL derived from a player name.
pub fn avatar_url(player: &str) -> String {
    format!("https://mc-heads.net/avatar/{player}/64")
}

/// Chat line posted under the player's name and avatar.
pub fn chat_message(frame: &ChatFrame, content: String) -> WebhookMessage {
    WebhookMessage {
        content: Some(content),
        username: Some(frame.player.clone()),
        avatar_url: Some(avatar_url(&frame.player)),
    }
}

fn event_phrase(event: &str) -> &str {
    match event.to_ascii_lowercase().as_str() {
        "join" => "joined the server",
        "quit" | "leave" => "left the server",
        "death" => "died",
        _ => event,
    }
}

/// Join / quit / death style event, in italics.
pub fn event_message(frame: &EventFrame) -> WebhookMessage {
    let text = match frame.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => format!("{} {}", frame.player, event_phrase(&frame.event)),
    };
    WebhookMessage {
        content: Some(format!("*{text}*")),
        username: Some(frame.player.clone()),
        avatar_url: Some(avatar_url(&frame.player)),
    }
}

fn verb(kind: &ModerationKind) -> Option<(&'static str, &'static str)> {
    match kind {
        ModerationKind::Kick => Some(("👢", "kicked")),
        ModerationKind::Ban => Some(("🔨", "banned")),
        ModerationKind::TempBan => Some(("⏳", "temporarily banned")),
        ModerationKind::Mute => Some(("🔇", "muted")),
        ModerationKind::Unmute => Some(("🔊", "unmuted")),
        ModerationKind::Pardon => Some(("🕊️", "pardoned")),
        ModerationKind::Other(_) => None,
    }
}

/// In-game moderation action as a system line from the server.
///
/// # Examples
///
/// ```
/// use kavex_core::ModerationFrame;
/// use kavex_gateway::render::moderation_message;
///
/// let frame = ModerationFrame {
///     action: "tempban".into(),
///     target: "Steve".into(),
///     issuer: "Alex".into(),
///     reason: Some("griefing".into()),
///     minutes: Some(30),
/// };
/// let message = moderation_message("Survival", &frame);
/// assert_eq!(
///     message.content.as_deref(),
///     Some("⏳ **Steve** was temporarily banned by **Alex** for 30 minutes: griefing"),
/// );
/// ```
pub fn moderation_message(server_name: &str, frame: &ModerationFrame) -> WebhookMessage {
    let mut text = match verb(&ModerationKind::from_action(&frame.action)) {
        Some((emoji, verb)) => format!(
            "{emoji} **{}** was {verb} by **{}**",
            frame.target, frame.issuer
        ),
        None => format!(
            "⚙️ `{}` applied to **{}** by **{}**",
            frame.action.trim(),
            frame.target,
            frame.issuer
        ),
    };
    if let Some(minutes) = frame.minutes.filter(|m| *m > 0) {
        text.push_str(&format!(" for {minutes} minutes"));
    }
    if let Some(reason) = frame.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        text.push_str(&format!(": {reason}"));
    }

    WebhookMessage {
        content: Some(text),
        username: Some(server_name.to_string()),
        avatar_url: None,
    }
}

/// Connection lifecycle notice posted to every bound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A server authenticated
    Connected {
        /// Announced server name
        server_name: String,
    },
    /// The registered connection of a server went away
    Disconnected {
        /// Last announced server name
        server_name: String,
    },
}

impl Notice {
    /// Server the notice is about.
    pub fn server_name(&self) -> &str {
        match self {
            Self::Connected { server_name } | Self::Disconnected { server_name } => server_name,
        }
    }
}

/// Render a lifecycle notice.
pub fn notice_message(notice: &Notice) -> WebhookMessage {
    let content = match notice {
        Notice::Connected { server_name } => format!("🟢 **{server_name}** connected."),
        Notice::Disconnected { server_name } => {
            format!("🔴 **{server_name}** disconnected. Waiting for reconnect…")
        }
    };
    WebhookMessage {
        content: Some(content),
        username: Some(notice.server_name().to_string()),
        avatar_url: None,
    }
}
