//! Tests for forwarding Discord chat into linked servers.

mod test_utils;

use chrono::Utc;
use kavex_core::{
    AccountLink, ChannelId, ChatToGame, GuildId, NotifyToGame, OutboundFrame, RoleSnapshot, UserId,
};
use kavex_social::{ChatForwarder, DiscordMessage};
use std::collections::HashMap;
use test_utils::{Fixture, drain, member};

const GUILD: u64 = 1;
const CHANNEL: u64 = 10;

fn message(content: &str) -> DiscordMessage {
    DiscordMessage {
        guild_id: Some(GuildId(GUILD)),
        guild_name: "Crafters".to_string(),
        channel_id: ChannelId(CHANNEL),
        author_id: UserId(42),
        author_name: "alex_discord".to_string(),
        from_webhook: false,
        from_bot: false,
        content: content.to_string(),
        user_mentions: HashMap::new(),
        role_mentions: HashMap::new(),
    }
}

fn forwarder(fixture: &Fixture) -> ChatForwarder {
    ChatForwarder::new(
        fixture.gateway.clone(),
        fixture.store.clone(),
        fixture.directory.clone(),
    )
}

fn account_link(user: u64, name: &str, notify_ping: bool) -> AccountLink {
    AccountLink {
        guild_id: GuildId(GUILD),
        discord_id: UserId(user),
        mc_uuid: format!("uuid-{name}"),
        mc_name: name.to_string(),
        notify_ping,
        linked_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_forwards_chat_with_cosmetics() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    let mut alex = member(42, "alex_discord");
    alex.nickname = Some("Alex".to_string());
    alex.roles = vec![
        RoleSnapshot {
            id: 1,
            name: "Staff".to_string(),
            position: 2,
            color: 0,
            hoist: true,
        },
        RoleSnapshot {
            id: 2,
            name: "VIP".to_string(),
            position: 5,
            color: 0x00FF00,
            hoist: false,
        },
    ];
    fixture.directory.add(GUILD, alex);

    let delivered = forwarder(&fixture).forward(&message("**hi** all")).await;

    assert_eq!(delivered, 1);
    assert_eq!(
        drain(&mut rx),
        vec![OutboundFrame::DcChat(ChatToGame {
            guild: "Crafters".to_string(),
            user: "Alex".to_string(),
            text: "§lhi§r all".to_string(),
            prefix: Some("[Staff]".to_string()),
            color: Some("#00FF00".to_string()),
        })]
    );
}

#[tokio::test]
async fn test_unknown_author_falls_back_to_message_name() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;

    forwarder(&fixture).forward(&message("hello")).await;

    let frames = drain(&mut rx);
    assert!(matches!(
        frames.as_slice(),
        [OutboundFrame::DcChat(ChatToGame { user, prefix: None, color: None, .. })]
            if user == "alex_discord"
    ));
}

#[tokio::test]
async fn test_skips_channels_without_connected_link() {
    let fixture = Fixture::new();
    let (mut session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    let forwarder = forwarder(&fixture);

    let mut elsewhere = message("hello");
    elsewhere.channel_id = ChannelId(99);
    assert_eq!(forwarder.forward(&elsewhere).await, 0);

    fixture.gateway.close_session(&mut session).await;
    assert_eq!(forwarder.forward(&message("hello")).await, 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_skips_webhooks_bots_and_dms() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    let forwarder = forwarder(&fixture);

    let mut relayed = message("from minecraft");
    relayed.from_webhook = true;
    let mut bot = message("beep");
    bot.from_bot = true;
    let mut dm = message("psst");
    dm.guild_id = None;

    for skipped in [relayed, bot, dm] {
        assert_eq!(forwarder.forward(&skipped).await, 0);
    }
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_blank_message_is_not_forwarded() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;

    assert_eq!(forwarder(&fixture).forward(&message("   ")).await, 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_pings_notify_opted_in_players() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    fixture.store.insert_account_link(account_link(7, "Steve", true));
    fixture
        .store
        .insert_account_link(account_link(8, "Herobrine", false));

    let delivered = forwarder(&fixture)
        .forward(&message("hey @steve and @Herobrine"))
        .await;

    assert_eq!(delivered, 1);
    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        frames[0],
        OutboundFrame::DcNotify(NotifyToGame {
            player: "Steve".to_string(),
        })
    );
    match &frames[1] {
        OutboundFrame::DcChat(chat) => {
            // Underlining is case-sensitive, like the in-game name.
            assert_eq!(chat.text, "hey @steve and @Herobrine");
        }
        other => panic!("expected chat, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exact_case_ping_is_underlined() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    fixture.store.insert_account_link(account_link(7, "Steve", true));

    forwarder(&fixture).forward(&message("hi @Steve")).await;

    let frames = drain(&mut rx);
    assert!(matches!(
        frames.last(),
        Some(OutboundFrame::DcChat(chat)) if chat.text == "hi §n@Steve§r"
    ));
}

#[tokio::test]
async fn test_discord_mentions_are_named() {
    let fixture = Fixture::new();
    let (_session, mut rx) = fixture.connect(GUILD, CHANNEL, "deadbeef").await;
    let mut msg = message("<@55> look");
    msg.user_mentions.insert(55, "Builder".to_string());

    forwarder(&fixture).forward(&msg).await;

    let frames = drain(&mut rx);
    assert!(matches!(
        frames.last(),
        Some(OutboundFrame::DcChat(chat)) if chat.text == "§n@Builder§r look"
    ));
}
