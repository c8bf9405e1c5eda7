//! JSON wire protocol spoken with the Minecraft plugin.
//!
//! Every frame is a JSON object carrying an `op` discriminator. Inbound frames
//! are decoded in two steps so that unknown discriminators can be ignored while
//! malformed or invalid payloads are reported back to the sender.

use crate::PermissionProfile;
use kavex_error::{ProtocolError, ProtocolErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_player() -> String {
    "Player".to_string()
}

fn default_issuer() -> String {
    "Console".to_string()
}

/// `auth` frame: first frame of every session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthFrame {
    /// Shared secret copied from the plugin's generated file
    #[serde(default)]
    pub token: Option<String>,
    /// Human-readable server name
    #[serde(default)]
    pub server: Option<String>,
}

/// `mc_chat` frame: a player chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFrame {
    /// Player name
    #[serde(default = "default_player")]
    pub player: String,
    /// Player UUID
    #[serde(default)]
    pub uuid: Option<String>,
    /// Raw chat text
    pub text: String,
}

/// `mc_event` frame: join, quit, death and similar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Player name
    #[serde(default = "default_player")]
    pub player: String,
    /// Player UUID
    #[serde(default)]
    pub uuid: Option<String>,
    /// Event name (`join`, `quit`, `death`, ...)
    pub event: String,
    /// Pre-rendered message from the server, e.g. a death message
    #[serde(default)]
    pub message: Option<String>,
}

/// `mc_mod` frame: a moderation action taken in game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFrame {
    /// Action name (`kick`, `ban`, `tempban`, `mute`, `pardon`, `unmute`, ...)
    pub action: String,
    /// Affected player
    pub target: String,
    /// Who issued the action
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Optional reason
    #[serde(default)]
    pub reason: Option<String>,
    /// Duration for temporary actions
    #[serde(default)]
    pub minutes: Option<u64>,
}

/// `link_request` frame: a player asked to link their Discord account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkRequestFrame {
    /// Code shown to the player
    #[serde(default)]
    pub code: Option<String>,
    /// Player name
    #[serde(default)]
    pub player: Option<String>,
    /// Player UUID
    #[serde(default)]
    pub uuid: Option<String>,
}

/// `perm_query` frame: the plugin wants a player's moderation rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermQueryFrame {
    /// Player UUID
    pub uuid: String,
}

/// Frames accepted from the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InboundFrame {
    /// `auth`
    Auth(AuthFrame),
    /// `mc_chat`
    McChat(ChatFrame),
    /// `mc_event`
    McEvent(EventFrame),
    /// `mc_mod`
    McMod(ModerationFrame),
    /// `link_request`
    LinkRequest(LinkRequestFrame),
    /// `perm_query`
    PermQuery(PermQueryFrame),
}

impl InboundFrame {
    /// Discriminators this build understands.
    pub const KNOWN_OPS: [&'static str; 6] = [
        "auth",
        "mc_chat",
        "mc_event",
        "mc_mod",
        "link_request",
        "perm_query",
    ];
}

/// Decode one text frame.
///
/// Returns `Ok(None)` for a well-formed frame with an unknown `op`, so newer
/// plugins can add frame kinds without breaking older bridges.
///
/// # Examples
///
/// ```
/// use kavex_core::{decode_frame, InboundFrame};
///
/// let frame = decode_frame(r#"{"op":"perm_query","uuid":"abc"}"#).unwrap();
/// assert!(matches!(frame, Some(InboundFrame::PermQuery(_))));
///
/// assert!(decode_frame(r#"{"op":"from_the_future"}"#).unwrap().is_none());
/// assert!(decode_frame("{not json").is_err());
/// ```
pub fn decode_frame(text: &str) -> Result<Option<InboundFrame>, ProtocolError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ProtocolError::new(ProtocolErrorKind::MalformedJson(e.to_string())))?;

    if !value.is_object() {
        return Err(ProtocolError::new(ProtocolErrorKind::MalformedJson(
            "frame is not a JSON object".to_string(),
        )));
    }

    let op = match value.get("op").and_then(Value::as_str) {
        Some(op) => op.to_string(),
        None => return Err(ProtocolError::new(ProtocolErrorKind::MissingDiscriminator)),
    };

    if !InboundFrame::KNOWN_OPS.contains(&op.as_str()) {
        tracing::debug!(op = %op, "Ignoring frame with unknown op");
        return Ok(None);
    }

    serde_json::from_value(value).map(Some).map_err(|e| {
        ProtocolError::new(ProtocolErrorKind::InvalidPayload {
            op,
            reason: e.to_string(),
        })
    })
}

/// Kind of an in-game moderation action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModerationKind {
    /// Player kicked
    Kick,
    /// Player banned
    Ban,
    /// Player banned for a duration
    TempBan,
    /// Player muted
    Mute,
    /// Player unmuted
    Unmute,
    /// Player pardoned / unbanned
    Pardon,
    /// Anything this build does not know about
    Other(String),
}

impl ModerationKind {
    /// Classify a raw action name, case-insensitively.
    pub fn from_action(action: &str) -> Self {
        match action.trim().to_ascii_lowercase().as_str() {
            "kick" => Self::Kick,
            "ban" => Self::Ban,
            "tempban" | "temp_ban" => Self::TempBan,
            "mute" => Self::Mute,
            "unmute" => Self::Unmute,
            "pardon" | "unban" => Self::Pardon,
            _ => Self::Other(action.trim().to_string()),
        }
    }
}

/// `auth` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAck {
    /// Whether auth succeeded
    pub ok: bool,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// `dc_chat`: a Discord message for in-game chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatToGame {
    /// Guild name
    pub guild: String,
    /// Author display name
    pub user: String,
    /// Formatted text
    pub text: String,
    /// Author's role prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Author's role colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// `dc_admin`: a moderation command for the server to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminToGame {
    /// Action name
    pub action: String,
    /// Target player
    pub player: String,
    /// Reason
    pub reason: String,
    /// Issuing Discord user
    pub by: String,
    /// Duration for temporary actions, 0 otherwise
    pub minutes: u64,
}

/// `dc_notify`: ping sound for a player mentioned on Discord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyToGame {
    /// Player to ping
    pub player: String,
}

/// `perm_set`: resolved rights for a `perm_query`.
///
/// Only resolvable fields are present; a fully unresolvable account yields just
/// the echoed `uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Echoed account UUID
    pub uuid: String,
    /// May kick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_kick: Option<bool>,
    /// May ban
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_ban: Option<bool>,
    /// May time out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_timeout: Option<bool>,
    /// Staff member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
    /// Chat prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Name colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PermissionSet {
    /// Reply carrying only the echoed id.
    pub fn echo(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Reply carrying every field of `profile`.
    pub fn from_profile(uuid: impl Into<String>, profile: &PermissionProfile) -> Self {
        Self {
            uuid: uuid.into(),
            can_kick: Some(profile.can_kick),
            can_ban: Some(profile.can_ban),
            can_timeout: Some(profile.can_timeout),
            is_staff: Some(profile.is_staff),
            prefix: profile.prefix.clone(),
            color: profile.color.clone(),
        }
    }
}

/// `link_ack` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAck {
    /// Whether the code was stored
    pub ok: bool,
    /// Echoed code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// `error` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    /// Machine-readable reason
    pub err: String,
}

/// Frames sent to the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// `auth`
    Auth(AuthAck),
    /// `dc_chat`
    DcChat(ChatToGame),
    /// `dc_admin`
    DcAdmin(AdminToGame),
    /// `dc_notify`
    DcNotify(NotifyToGame),
    /// `perm_set`
    PermSet(PermissionSet),
    /// `link_ack`
    LinkAck(LinkAck),
    /// `error`
    Error(ErrorFrame),
}

impl OutboundFrame {
    /// Successful auth reply.
    pub fn auth_ok() -> Self {
        Self::Auth(AuthAck { ok: true, err: None })
    }

    /// Failed auth reply.
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::Auth(AuthAck {
            ok: false,
            err: Some(reason.into()),
        })
    }

    /// `error` reply.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(ErrorFrame { err: reason.into() })
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> String {
        // Every variant is a plain struct of strings, bools and integers.
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode outbound frame");
            r#"{"op":"error","err":"encode_failed"}"#.to_string()
        })
    }
}
