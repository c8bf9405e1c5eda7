//! Core data types for the Kavex Discord/Minecraft bridge.
//!
//! This crate holds the types every other Kavex crate speaks:
//!
//! - Snowflake newtypes ([`GuildId`], [`ChannelId`], [`UserId`])
//! - Persisted rows ([`Link`], [`DeliverySink`], [`AccountLink`], [`LinkToken`],
//!   [`PermissionProfile`])
//! - Read-only directory snapshots ([`MemberSnapshot`], [`RoleSnapshot`], [`ChannelInfo`])
//! - The JSON wire protocol spoken with the Minecraft plugin ([`InboundFrame`],
//!   [`OutboundFrame`], [`decode_frame`])

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod ids;
mod link;
mod permission;
mod protocol;

pub use directory::{ChannelInfo, MemberSnapshot, RoleSnapshot};
pub use ids::{ChannelId, GuildId, UserId};
pub use link::{AccountLink, DeliverySink, Link, LinkStatus, LinkToken};
pub use permission::{ModerationCapability, PermissionProfile, Permissions};
pub use protocol::{
    AdminToGame, AuthAck, AuthFrame, ChatFrame, ChatToGame, ErrorFrame, EventFrame, InboundFrame,
    LinkAck, LinkRequestFrame, ModerationFrame, ModerationKind, NotifyToGame, OutboundFrame,
    PermQueryFrame, PermissionSet, decode_frame,
};
