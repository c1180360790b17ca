//! Strongly-typed wrappers for match identifiers
//!
//! The match service identifies everything with opaque strings. Wrapping each
//! kind of id in its own newtype keeps an instance id from being passed where a
//! catalog id or a battlefield id is expected. All of them serialize as plain
//! JSON strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_id!(
    /// Match identifier assigned by the match service
    MatchId
);

string_id!(
    /// Participant identifier (stable for the whole match)
    PlayerId
);

string_id!(
    /// Identity of one physical card object on board, in hand or in a graveyard
    ///
    /// Distinct from [`CardId`]: two copies of the same printed card share a
    /// catalog id but never an instance id.
    InstanceId
);

string_id!(
    /// Catalog id shared by every copy of the same printed card
    CardId
);

string_id!(
    /// Battlefield identifier
    BattlefieldId
);

string_id!(
    /// Pending-decision identifier
    PromptId
);

/// Sentinel destination id the match service understands as "the player's base"
pub const BASE_DESTINATION: &str = "base";

/// Where a unit can be moved to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The owner's home area
    Base,
    /// A specific battlefield
    Battlefield(BattlefieldId),
}

impl Destination {
    /// Wire id sent to the match service
    pub fn wire_id(&self) -> &str {
        match self {
            Destination::Base => BASE_DESTINATION,
            Destination::Battlefield(id) => id.as_str(),
        }
    }

    /// Parse a wire id (the `base` sentinel or a battlefield id)
    pub fn from_wire(id: &str) -> Self {
        if id == BASE_DESTINATION {
            Destination::Base
        } else {
            Destination::Battlefield(BattlefieldId::new(id))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}
