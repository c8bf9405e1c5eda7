//! PostgreSQL store tests.
//!
//! These need a live database named by `DATABASE_URL` and are ignored by
//! default. Run with `cargo test -p kavex_database -- --ignored`.

use chrono::{Duration, Utc};
use kavex_core::{ChannelId, GuildId, Link, LinkStatus, LinkToken, UserId};
use kavex_database::{PostgresBridgeStore, establish_connection, run_migrations};
use kavex_interface::{BridgeStore, RedeemOutcome};

fn store() -> PostgresBridgeStore {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut conn = establish_connection(&url).expect("connect");
    run_migrations(&mut conn).expect("migrate");
    PostgresBridgeStore::new(conn)
}

#[tokio::test]
#[ignore]
async fn test_link_status_roundtrip() {
    let store = store();
    let guild = GuildId(900_000_000_000_000_001);
    let channel = ChannelId(900_000_000_000_000_002);
    store
        .upsert_link(&Link::pending(guild, channel, "pg-test-hash"))
        .await
        .unwrap();

    let updated = store
        .set_link_status("pg-test-hash", LinkStatus::Connected, Some("PG"), Utc::now())
        .await
        .unwrap();
    assert!(updated >= 1);

    let link = store.link(guild, channel).await.unwrap().unwrap();
    assert_eq!(link.status, LinkStatus::Connected);
    assert_eq!(link.server_name.as_deref(), Some("PG"));

    assert!(store.remove_link(guild, channel).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_redeem_marks_token_used() {
    let store = store();
    let code = format!("PG{}", Utc::now().timestamp_micros());
    store
        .put_link_token(&LinkToken {
            code: code.clone(),
            mc_uuid: "pg-uuid".to_string(),
            mc_name: "PgSteve".to_string(),
            created_at: Utc::now(),
            used: false,
        })
        .await
        .unwrap();

    let outcome = store
        .redeem_link_token(&code, GuildId(1), UserId(2), Duration::hours(24), Utc::now())
        .await
        .unwrap();
    assert!(matches!(outcome, RedeemOutcome::Linked(_)));

    let again = store
        .redeem_link_token(&code, GuildId(1), UserId(2), Duration::hours(24), Utc::now())
        .await
        .unwrap();
    assert_eq!(again, RedeemOutcome::AlreadyUsed);

    let reused = store
        .put_link_token(&LinkToken {
            code: code.clone(),
            mc_uuid: "other-uuid".to_string(),
            mc_name: "Mallory".to_string(),
            created_at: Utc::now(),
            used: false,
        })
        .await
        .unwrap();
    assert!(!reused);
    let after = store
        .redeem_link_token(&code, GuildId(1), UserId(3), Duration::hours(24), Utc::now())
        .await
        .unwrap();
    assert_eq!(after, RedeemOutcome::AlreadyUsed);
}
