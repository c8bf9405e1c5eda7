//! Tests for webhook message rendering.

use kavex_core::{ChatFrame, EventFrame, ModerationFrame};
use kavex_gateway::Notice;
use kavex_gateway::render::{
    avatar_url, chat_message, event_message, moderation_message, notice_message,
};

fn moderation(action: &str, reason: Option<&str>, minutes: Option<u64>) -> ModerationFrame {
    ModerationFrame {
        action: action.to_string(),
        target: "Steve".to_string(),
        issuer: "Console".to_string(),
        reason: reason.map(str::to_string),
        minutes,
    }
}

#[test]
fn test_chat_posts_as_player() {
    let frame = ChatFrame {
        player: "Alex".to_string(),
        uuid: None,
        text: "raw".to_string(),
    };
    let message = chat_message(&frame, "translated".to_string());
    assert_eq!(message.content.as_deref(), Some("translated"));
    assert_eq!(message.username.as_deref(), Some("Alex"));
    assert_eq!(message.avatar_url, Some(avatar_url("Alex")));
    assert_eq!(avatar_url("Alex"), "https://mc-heads.net/avatar/Alex/64");
}

#[test]
fn test_event_phrases() {
    let join = EventFrame {
        player: "Alex".to_string(),
        uuid: None,
        event: "join".to_string(),
        message: None,
    };
    assert_eq!(
        event_message(&join).content.as_deref(),
        Some("*Alex joined the server*")
    );

    let death = EventFrame {
        event: "death".to_string(),
        message: Some("Alex fell from a high place".to_string()),
        ..join
    };
    assert_eq!(
        event_message(&death).content.as_deref(),
        Some("*Alex fell from a high place*")
    );
}

#[test]
fn test_moderation_lines() {
    let kick = moderation_message("Survival", &moderation("kick", None, None));
    assert_eq!(kick.content.as_deref(), Some("👢 **Steve** was kicked by **Console**"));
    assert_eq!(kick.username.as_deref(), Some("Survival"));

    let ban = moderation_message("Survival", &moderation("BAN", Some("  "), None));
    assert_eq!(ban.content.as_deref(), Some("🔨 **Steve** was banned by **Console**"));

    let custom = moderation_message("Survival", &moderation("jail", Some("spam"), Some(5)));
    assert_eq!(
        custom.content.as_deref(),
        Some("⚙️ `jail` applied to **Steve** by **Console** for 5 minutes: spam")
    );
}

#[test]
fn test_lifecycle_notices() {
    let connected = notice_message(&Notice::Connected {
        server_name: "Survival".to_string(),
    });
    assert_eq!(connected.content.as_deref(), Some("🟢 **Survival** connected."));
    assert_eq!(connected.username.as_deref(), Some("Survival"));

    let disconnected = notice_message(&Notice::Disconnected {
        server_name: "Survival".to_string(),
    });
    assert!(
        disconnected
            .content
            .as_deref()
            .is_some_and(|c| c.starts_with("🔴 **Survival** disconnected."))
    );
}
