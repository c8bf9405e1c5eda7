//! Discord snowflake newtypes.
//!
//! Discord IDs are 64-bit unsigned integers, but PostgreSQL uses signed bigints,
//! so each newtype carries a lossless conversion to and from `i64`.

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }

            /// Bit-preserving conversion for bigint columns.
            pub fn to_db(self) -> i64 {
                self.0 as i64
            }

            /// Inverse of [`Self::to_db`].
            pub fn from_db(raw: i64) -> Self {
                Self(raw as u64)
            }
        }
    };
}

snowflake!(
    /// Discord guild (server) identifier.
    GuildId
);
snowflake!(
    /// Discord channel or thread identifier.
    ChannelId
);
snowflake!(
    /// Discord user identifier.
    UserId
);
