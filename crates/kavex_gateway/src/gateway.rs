//! The bridge gateway: sessions, auth handshake, frame dispatch and the
//! outbound API used by the Discord side.

use crate::hashing::{hash_token, short_hash};
use crate::registry::{ConnectionHandle, ConnectionRegistry, FrameSender};
use crate::relay::{RelayEngine, RelayEvent};
use crate::render::Notice;
use crate::{GatewaySettings, PermissionResolver, ReadinessGate};
use chrono::Utc;
use kavex_core::{
    AdminToGame, AuthFrame, ChannelId, ChatToGame, GuildId, InboundFrame, Link, LinkAck,
    LinkRequestFrame, LinkStatus, LinkToken, NotifyToGame, OutboundFrame, UserId, decode_frame,
};
use kavex_error::{AuthError, AuthErrorKind, KavexResult};
use kavex_interface::{BridgeStore, Directory, RedeemOutcome, SinkTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_SERVER_NAME: &str = "Minecraft";

/// Per-socket state owned by the socket's task.
#[derive(Debug)]
pub struct Session {
    id: u64,
    sender: FrameSender,
    token_hash: Option<String>,
    server_name: String,
}

impl Session {
    /// Socket id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Token hash once authenticated.
    pub fn token_hash(&self) -> Option<&str> {
        self.token_hash.as_deref()
    }

    /// Last announced server name.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Whether the session has authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.token_hash.is_some()
    }

    fn reply(&self, frame: OutboundFrame) {
        if self.sender.send(frame).is_err() {
            debug!(connection_id = self.id, "Reply dropped, socket closed");
        }
    }
}

/// Bridge gateway shared by every socket task and the Discord side.
pub struct Gateway {
    settings: GatewaySettings,
    store: Arc<dyn BridgeStore>,
    registry: ConnectionRegistry,
    // Serializes registry mutation with the matching status write.
    transitions: Mutex<()>,
    gate: Arc<ReadinessGate<RelayEvent>>,
    permissions: PermissionResolver,
}

impl Gateway {
    /// Create a gateway. The readiness gate starts closed.
    pub fn new(
        settings: GatewaySettings,
        store: Arc<dyn BridgeStore>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn SinkTransport>,
    ) -> Self {
        if settings.token_pepper().is_empty() {
            warn!("Token pepper is empty; link hashes depend on the raw token only");
        }
        let engine = RelayEngine::new(Arc::clone(&store), Arc::clone(&directory), transport);
        Self {
            permissions: PermissionResolver::new(Arc::clone(&store), directory),
            gate: ReadinessGate::new(Arc::new(engine)),
            registry: ConnectionRegistry::new(),
            transitions: Mutex::new(()),
            settings,
            store,
        }
    }

    /// Gateway settings.
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Permission resolver, for the Discord-side moderation bridge.
    pub fn permissions(&self) -> &PermissionResolver {
        &self.permissions
    }

    /// Readiness gate in front of the relay engine.
    pub fn gate(&self) -> &Arc<ReadinessGate<RelayEvent>> {
        &self.gate
    }

    /// Number of live authenticated connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether the readiness signal has fired.
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Whether a connection is registered for `token_hash`.
    pub fn is_connected(&self, token_hash: &str) -> bool {
        self.registry.get(token_hash).is_some()
    }

    /// Hash a shared secret with this deployment's pepper.
    pub fn hash_token(&self, token: &str) -> String {
        hash_token(token, self.settings.token_pepper())
    }

    /// Signal that the directory is populated. Idempotent.
    pub fn mark_ready(&self) {
        self.gate.mark_ready();
    }

    // ========================================================================
    // Socket lifecycle
    // ========================================================================

    /// Start a session for a freshly accepted socket.
    pub fn open_session(&self, sender: FrameSender) -> Session {
        let session = Session {
            id: self.registry.next_id(),
            sender,
            token_hash: None,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        };
        debug!(connection_id = session.id, "Socket opened");
        session
    }

    /// Handle one inbound text frame.
    ///
    /// Malformed frames are answered with an `error` frame; the session stays
    /// usable. Unknown `op`s are ignored.
    pub async fn handle_text(&self, session: &mut Session, text: &str) {
        match decode_frame(text) {
            Ok(Some(frame)) => self.handle_frame(session, frame).await,
            Ok(None) => {}
            Err(e) => {
                warn!(connection_id = session.id, error = %e, "Rejected inbound frame");
                session.reply(OutboundFrame::error(e.kind.code()));
            }
        }
    }

    /// Handle one decoded frame.
    pub async fn handle_frame(&self, session: &mut Session, frame: InboundFrame) {
        let token_hash = match (&frame, session.token_hash.clone()) {
            (InboundFrame::Auth(auth), _) => {
                self.authenticate(session, auth.clone()).await;
                return;
            }
            (_, Some(hash)) => hash,
            (_, None) => {
                let err = AuthError::new(AuthErrorKind::NotAuthenticated);
                debug!(connection_id = session.id, error = %err, "Frame before auth");
                session.reply(OutboundFrame::error(err.kind.code()));
                return;
            }
        };

        match frame {
            InboundFrame::Auth(_) => {}
            InboundFrame::McChat(frame) => {
                self.gate
                    .submit(RelayEvent::Chat { token_hash, frame })
                    .await;
            }
            InboundFrame::McEvent(frame) => {
                self.gate
                    .submit(RelayEvent::PlayerEvent { token_hash, frame })
                    .await;
            }
            InboundFrame::McMod(frame) => {
                self.gate
                    .submit(RelayEvent::Moderation {
                        token_hash,
                        server_name: session.server_name.clone(),
                        frame,
                    })
                    .await;
            }
            InboundFrame::LinkRequest(request) => {
                let ack = self.store_link_request(request).await;
                session.reply(OutboundFrame::LinkAck(ack));
            }
            InboundFrame::PermQuery(query) => {
                let set = self.permissions.permission_set(&query.uuid).await;
                session.reply(OutboundFrame::PermSet(set));
            }
        }
    }

    #[instrument(skip(self, session, auth), fields(connection_id = session.id))]
    async fn authenticate(&self, session: &mut Session, auth: AuthFrame) {
        let Some(token) = auth
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        else {
            let err = AuthError::new(AuthErrorKind::MissingToken);
            info!(error = %err, "Auth rejected");
            session.reply(OutboundFrame::auth_failed(err.kind.code()));
            return;
        };

        let token_hash = self.hash_token(token);
        let server_name = auth
            .server
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| session.server_name.clone());

        let mut released = None;
        let bound = {
            let _transition = self.transitions.lock().await;

            if let Some(previous) = session.token_hash.take() {
                if previous != token_hash && self.release_locked(session.id, &previous).await {
                    released = Some((previous, session.server_name.clone()));
                }
            }

            let replaced = self.registry.register(
                &token_hash,
                ConnectionHandle {
                    id: session.id,
                    server_name: server_name.clone(),
                    sender: session.sender.clone(),
                },
            );
            if let Some(old) = replaced.filter(|old| old.id != session.id) {
                info!(
                    hash = short_hash(&token_hash),
                    replaced_connection = old.id,
                    "Reconnect replaced a live connection"
                );
            }
            session.token_hash = Some(token_hash.clone());
            session.server_name = server_name.clone();
            session.reply(OutboundFrame::auth_ok());

            match self
                .store
                .set_link_status(&token_hash, LinkStatus::Connected, Some(&server_name), Utc::now())
                .await
            {
                Ok(bound) => bound,
                Err(e) => {
                    error!(hash = short_hash(&token_hash), error = %e, "Failed to mark links connected");
                    0
                }
            }
        };

        info!(
            server = %server_name,
            hash = short_hash(&token_hash),
            bound,
            "Minecraft server authenticated"
        );
        if bound == 0 {
            warn!(
                hash = short_hash(&token_hash),
                "Auth ok but no channel is bound to this hash; check the token and pepper"
            );
        }

        if let Some((previous, previous_name)) = released {
            self.gate
                .submit(RelayEvent::Notice {
                    token_hash: previous,
                    notice: Notice::Disconnected {
                        server_name: previous_name,
                    },
                })
                .await;
        }
        self.gate
            .submit(RelayEvent::Notice {
                token_hash,
                notice: Notice::Connected { server_name },
            })
            .await;
    }

    /// Tear a session down after its socket closed, errored or timed out.
    ///
    /// Only the currently registered socket for a hash may mark its links
    /// disconnected; a stale socket that was replaced by a reconnect leaves
    /// everything untouched.
    pub async fn close_session(&self, session: &mut Session) {
        let Some(token_hash) = session.token_hash.take() else {
            debug!(connection_id = session.id, "Unauthenticated socket closed");
            return;
        };

        let released = {
            let _transition = self.transitions.lock().await;
            self.release_locked(session.id, &token_hash).await
        };
        if !released {
            debug!(
                connection_id = session.id,
                hash = short_hash(&token_hash),
                "Stale socket closed, newer connection kept"
            );
            return;
        }

        info!(
            server = %session.server_name,
            hash = short_hash(&token_hash),
            "Minecraft server disconnected"
        );
        self.gate
            .submit(RelayEvent::Notice {
                token_hash,
                notice: Notice::Disconnected {
                    server_name: session.server_name.clone(),
                },
            })
            .await;
    }

    // Caller holds the transition lock.
    async fn release_locked(&self, connection_id: u64, token_hash: &str) -> bool {
        if !self.registry.remove_if_current(token_hash, connection_id) {
            return false;
        }
        if let Err(e) = self
            .store
            .set_link_status(token_hash, LinkStatus::Disconnected, None, Utc::now())
            .await
        {
            error!(hash = short_hash(token_hash), error = %e, "Failed to mark links disconnected");
        }
        true
    }

    async fn store_link_request(&self, request: LinkRequestFrame) -> LinkAck {
        let code = request
            .code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        let player = request
            .player
            .map(|player| player.trim().to_string())
            .filter(|player| !player.is_empty());
        let uuid = request
            .uuid
            .map(|uuid| uuid.trim().to_string())
            .filter(|uuid| !uuid.is_empty());

        let (code, player, uuid) = match (code, player, uuid) {
            (Some(code), Some(player), Some(uuid)) => (code, player, uuid),
            (code, _, _) => {
                return LinkAck {
                    ok: false,
                    code,
                    err: Some("missing code, player or uuid".to_string()),
                };
            }
        };

        let token = LinkToken {
            code: code.clone(),
            mc_uuid: uuid,
            mc_name: player,
            created_at: Utc::now(),
            used: false,
        };
        match self.store.put_link_token(&token).await {
            Ok(false) => {
                warn!(player = %token.mc_name, "Link code was already redeemed");
                LinkAck {
                    ok: false,
                    code: Some(code),
                    err: Some("code_used".to_string()),
                }
            }
            Ok(true) => {
                info!(player = %token.mc_name, "Stored link code");
                LinkAck {
                    ok: true,
                    code: Some(code),
                    err: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to store link code");
                LinkAck {
                    ok: false,
                    code: Some(code),
                    err: Some("store_error".to_string()),
                }
            }
        }
    }

    // ========================================================================
    // Outbound API (Discord -> game)
    // ========================================================================

    async fn send_to_game(&self, guild_id: GuildId, channel_id: ChannelId, frame: OutboundFrame) -> usize {
        let link = match self.store.link(guild_id, channel_id).await {
            Ok(Some(link)) => link,
            Ok(None) => return 0,
            Err(e) => {
                warn!(%guild_id, %channel_id, error = %e, "Failed to load link");
                return 0;
            }
        };
        let Some(handle) = self.registry.get(&link.token_hash) else {
            return 0;
        };

        match handle.sender.send(frame) {
            Ok(()) => 1,
            Err(_) => {
                warn!(
                    connection_id = handle.id,
                    hash = short_hash(&link.token_hash),
                    "Socket closed before write"
                );
                0
            }
        }
    }

    /// Relay a Discord chat message into the game linked to a channel.
    ///
    /// Returns the number of sockets written to; 0 means no active link.
    #[instrument(skip(self, chat), fields(user = %chat.user))]
    pub async fn send_chat(&self, guild_id: GuildId, channel_id: ChannelId, chat: ChatToGame) -> usize {
        self.send_to_game(guild_id, channel_id, OutboundFrame::DcChat(chat))
            .await
    }

    /// Ask the linked server to execute a moderation command.
    #[instrument(skip(self, admin), fields(action = %admin.action, player = %admin.player))]
    pub async fn send_admin(&self, guild_id: GuildId, channel_id: ChannelId, admin: AdminToGame) -> usize {
        self.send_to_game(guild_id, channel_id, OutboundFrame::DcAdmin(admin))
            .await
    }

    /// Play the mention ping for `player` on the linked server.
    #[instrument(skip(self))]
    pub async fn send_notify(&self, guild_id: GuildId, channel_id: ChannelId, player: &str) -> usize {
        let frame = OutboundFrame::DcNotify(NotifyToGame {
            player: player.to_string(),
        });
        self.send_to_game(guild_id, channel_id, frame).await
    }

    // ========================================================================
    // Link administration
    // ========================================================================

    /// Bind a channel to a shared secret.
    ///
    /// The link starts `pending`, or `connected` if a server with that secret
    /// is already online.
    #[instrument(skip(self, token))]
    pub async fn register_link(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        token: &str,
    ) -> KavexResult<Link> {
        if token.trim().is_empty() {
            return Err(AuthError::new(AuthErrorKind::MissingToken).into());
        }
        let mut link = Link::pending(guild_id, channel_id, self.hash_token(token));

        let _transition = self.transitions.lock().await;
        if let Some(handle) = self.registry.get(&link.token_hash) {
            link.status = LinkStatus::Connected;
            link.server_name = Some(handle.server_name);
        }
        self.store.upsert_link(&link).await?;
        info!(hash = short_hash(&link.token_hash), status = %link.status, "Link registered");
        Ok(link)
    }

    /// Remove a channel's link and its delivery sink.
    #[instrument(skip(self))]
    pub async fn unlink(&self, guild_id: GuildId, channel_id: ChannelId) -> KavexResult<bool> {
        Ok(self.store.remove_link(guild_id, channel_id).await?)
    }

    /// Current link of a channel.
    #[instrument(skip(self))]
    pub async fn link_status(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> KavexResult<Option<Link>> {
        Ok(self.store.link(guild_id, channel_id).await?)
    }

    /// Redeem an in-game link code for a Discord user.
    #[instrument(skip(self, code))]
    pub async fn redeem_link_code(
        &self,
        guild_id: GuildId,
        discord_id: UserId,
        code: &str,
    ) -> KavexResult<RedeemOutcome> {
        let outcome = self
            .store
            .redeem_link_token(
                code.trim(),
                guild_id,
                discord_id,
                self.settings.link_token_max_age_chrono(),
                Utc::now(),
            )
            .await?;
        match &outcome {
            RedeemOutcome::Linked(link) => info!(player = %link.mc_name, "Account linked"),
            other => debug!(outcome = ?other, "Link code rejected"),
        }
        Ok(outcome)
    }

    /// Enable or disable in-game mention pings for a linked account.
    #[instrument(skip(self))]
    pub async fn set_mention_notify(
        &self,
        guild_id: GuildId,
        discord_id: UserId,
        enabled: bool,
    ) -> KavexResult<bool> {
        Ok(self
            .store
            .set_notify_ping(guild_id, discord_id, enabled)
            .await?)
    }

    /// Delete unused link codes older than the configured max age.
    pub async fn purge_expired_link_tokens(&self) -> usize {
        let cutoff = Utc::now() - self.settings.link_token_max_age_chrono();
        match self.store.purge_link_tokens(cutoff).await {
            Ok(purged) => {
                if purged > 0 {
                    info!(purged, "Purged expired link codes");
                }
                purged
            }
            Err(e) => {
                warn!(error = %e, "Failed to purge link codes");
                0
            }
        }
    }

    /// Spawn the periodic link code purge.
    pub fn spawn_token_purge(self: &Arc<Self>) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        let period = (*self.settings.link_token_purge_interval()).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                gateway.purge_expired_link_tokens().await;
            }
        })
    }
}
