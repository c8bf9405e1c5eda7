//! Tests for the in-memory bridge store.

use chrono::{Duration, TimeZone, Utc};
use kavex_core::{
    AccountLink, ChannelId, DeliverySink, GuildId, Link, LinkStatus, LinkToken, PermissionProfile,
    UserId,
};
use kavex_database::InMemoryBridgeStore;
use kavex_interface::{BridgeStore, RedeemOutcome};

fn token(code: &str, created_at: chrono::DateTime<Utc>) -> LinkToken {
    LinkToken {
        code: code.to_string(),
        mc_uuid: "uuid-steve".to_string(),
        mc_name: "Steve".to_string(),
        created_at,
        used: false,
    }
}

fn profile(guild: u64, sync_secs: i64, can_kick: bool) -> PermissionProfile {
    PermissionProfile {
        guild_id: GuildId(guild),
        account_id: "uuid-steve".to_string(),
        account_name: Some("Steve".to_string()),
        can_kick,
        can_ban: false,
        can_timeout: false,
        is_staff: can_kick,
        prefix: None,
        color: None,
        last_sync: Utc.timestamp_opt(sync_secs, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_set_link_status_touches_every_link_of_hash() {
    let store = InMemoryBridgeStore::new();
    store
        .upsert_link(&Link::pending(GuildId(1), ChannelId(10), "h1"))
        .await
        .unwrap();
    store
        .upsert_link(&Link::pending(GuildId(2), ChannelId(20), "h1"))
        .await
        .unwrap();
    store
        .upsert_link(&Link::pending(GuildId(1), ChannelId(11), "h2"))
        .await
        .unwrap();

    let now = Utc::now();
    let updated = store
        .set_link_status("h1", LinkStatus::Connected, Some("Survival"), now)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let links = store.links_by_hash("h1").await.unwrap();
    assert!(links.iter().all(|l| l.status == LinkStatus::Connected));
    assert!(links.iter().all(|l| l.server_name.as_deref() == Some("Survival")));

    let other = store.link(GuildId(1), ChannelId(11)).await.unwrap().unwrap();
    assert_eq!(other.status, LinkStatus::Pending);
}

#[tokio::test]
async fn test_status_without_name_keeps_previous_name() {
    let store = InMemoryBridgeStore::new();
    store
        .upsert_link(&Link::pending(GuildId(1), ChannelId(10), "h1"))
        .await
        .unwrap();
    store
        .set_link_status("h1", LinkStatus::Connected, Some("Survival"), Utc::now())
        .await
        .unwrap();
    store
        .set_link_status("h1", LinkStatus::Disconnected, None, Utc::now())
        .await
        .unwrap();

    let link = store.link(GuildId(1), ChannelId(10)).await.unwrap().unwrap();
    assert_eq!(link.status, LinkStatus::Disconnected);
    assert_eq!(link.server_name.as_deref(), Some("Survival"));
}

#[tokio::test]
async fn test_remove_link_drops_sink() {
    let store = InMemoryBridgeStore::new();
    store
        .upsert_link(&Link::pending(GuildId(1), ChannelId(10), "h1"))
        .await
        .unwrap();
    store
        .upsert_sink(&DeliverySink {
            guild_id: GuildId(1),
            channel_id: ChannelId(10),
            endpoint_url: "https://example.invalid/hook".to_string(),
            thread_id: None,
        })
        .await
        .unwrap();

    assert!(store.remove_link(GuildId(1), ChannelId(10)).await.unwrap());
    assert!(store.sink(GuildId(1), ChannelId(10)).await.unwrap().is_none());
    assert!(!store.remove_link(GuildId(1), ChannelId(10)).await.unwrap());
}

#[tokio::test]
async fn test_permission_cache_last_sync_is_monotonic() {
    let store = InMemoryBridgeStore::new();
    store.save_permission_profile(&profile(1, 200, true)).await.unwrap();
    store.save_permission_profile(&profile(1, 100, false)).await.unwrap();

    let cached = store.permission_profile(GuildId(1), "uuid-steve").unwrap();
    assert!(!cached.can_kick);
    assert_eq!(cached.last_sync, Utc.timestamp_opt(200, 0).unwrap());
}

#[tokio::test]
async fn test_latest_profile_across_guilds() {
    let store = InMemoryBridgeStore::new();
    store.save_permission_profile(&profile(1, 100, false)).await.unwrap();
    store.save_permission_profile(&profile(2, 300, true)).await.unwrap();

    let latest = store
        .latest_permission_profile("uuid-steve")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.guild_id, GuildId(2));
    assert!(latest.can_kick);
    assert!(store.latest_permission_profile("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_redeem_link_token_outcomes() {
    let store = InMemoryBridgeStore::new();
    let now = Utc::now();
    let max_age = Duration::hours(24);
    store.put_link_token(&token("FRESH1", now)).await.unwrap();
    store
        .put_link_token(&token("OLD123", now - Duration::hours(25)))
        .await
        .unwrap();

    let unknown = store
        .redeem_link_token("NOPE", GuildId(1), UserId(7), max_age, now)
        .await
        .unwrap();
    assert_eq!(unknown, RedeemOutcome::UnknownCode);

    let expired = store
        .redeem_link_token("OLD123", GuildId(1), UserId(7), max_age, now)
        .await
        .unwrap();
    assert_eq!(expired, RedeemOutcome::Expired);

    let linked = store
        .redeem_link_token("FRESH1", GuildId(1), UserId(7), max_age, now)
        .await
        .unwrap();
    match linked {
        RedeemOutcome::Linked(link) => {
            assert_eq!(link.mc_uuid, "uuid-steve");
            assert_eq!(link.discord_id, UserId(7));
            assert!(!link.notify_ping);
        }
        other => panic!("expected Linked, got {other:?}"),
    }
    assert!(store.link_token("FRESH1").unwrap().used);

    let again = store
        .redeem_link_token("FRESH1", GuildId(1), UserId(8), max_age, now)
        .await
        .unwrap();
    assert_eq!(again, RedeemOutcome::AlreadyUsed);

    let by_uuid = store.account_link_by_uuid("uuid-steve").await.unwrap().unwrap();
    assert_eq!(by_uuid.discord_id, UserId(7));
}

#[tokio::test]
async fn test_purge_keeps_used_and_fresh_tokens() {
    let store = InMemoryBridgeStore::new();
    let now = Utc::now();
    store.put_link_token(&token("FRESH1", now)).await.unwrap();
    store
        .put_link_token(&token("STALE1", now - Duration::hours(48)))
        .await
        .unwrap();
    let mut used = token("USED01", now - Duration::hours(48));
    used.used = true;
    store.put_link_token(&used).await.unwrap();

    let purged = store
        .purge_link_tokens(now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert!(store.link_token("STALE1").is_none());
    assert!(store.link_token("FRESH1").is_some());
    assert!(store.link_token("USED01").is_some());
}

#[tokio::test]
async fn test_account_link_by_uuid_prefers_earliest() {
    let store = InMemoryBridgeStore::new();
    let base = Utc.timestamp_opt(1_000, 0).unwrap();
    for (guild, offset) in [(2u64, 10), (1u64, 50)] {
        store.insert_account_link(AccountLink {
            guild_id: GuildId(guild),
            discord_id: UserId(guild * 100),
            mc_uuid: "uuid-steve".to_string(),
            mc_name: "Steve".to_string(),
            notify_ping: true,
            linked_at: base + Duration::seconds(offset),
        });
    }

    let first = store.account_link_by_uuid("uuid-steve").await.unwrap().unwrap();
    assert_eq!(first.guild_id, GuildId(2));
}

#[tokio::test]
async fn test_cross_moderation_defaults_on() {
    let store = InMemoryBridgeStore::new();
    assert!(store.cross_moderation_enabled(GuildId(5)).await.unwrap());
    store.set_cross_moderation(GuildId(5), false).await.unwrap();
    assert!(!store.cross_moderation_enabled(GuildId(5)).await.unwrap());
}

#[tokio::test]
async fn test_set_notify_ping_requires_link() {
    let store = InMemoryBridgeStore::new();
    assert!(!store.set_notify_ping(GuildId(1), UserId(7), true).await.unwrap());
    store.insert_account_link(AccountLink {
        guild_id: GuildId(1),
        discord_id: UserId(7),
        mc_uuid: "u".to_string(),
        mc_name: "Steve".to_string(),
        notify_ping: false,
        linked_at: Utc::now(),
    });
    assert!(store.set_notify_ping(GuildId(1), UserId(7), true).await.unwrap());
    let links = store.account_links_for_guild(GuildId(1)).await.unwrap();
    assert!(links[0].notify_ping);
}

#[tokio::test]
async fn test_put_link_token_keeps_used_codes() {
    let store = InMemoryBridgeStore::new();
    let now = Utc::now();
    assert!(store.put_link_token(&token("ABC123", now)).await.unwrap());

    let mut refreshed = token("ABC123", now);
    refreshed.mc_name = "Alex".to_string();
    assert!(store.put_link_token(&refreshed).await.unwrap());
    assert_eq!(store.link_token("ABC123").unwrap().mc_name, "Alex");

    store
        .redeem_link_token("ABC123", GuildId(1), UserId(7), Duration::hours(24), now)
        .await
        .unwrap();

    let mut reused = token("ABC123", now);
    reused.mc_name = "Mallory".to_string();
    assert!(!store.put_link_token(&reused).await.unwrap());
    let kept = store.link_token("ABC123").unwrap();
    assert!(kept.used);
    assert_eq!(kept.mc_name, "Alex");
}
