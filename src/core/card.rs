//! Card instances as reported by the match service

use crate::core::{BattlefieldId, CardId, InstanceId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tag marking a player's legend
pub const LEGEND_TAG: &str = "legend";

/// Tag marking a player's chosen leader unit
pub const LEADER_TAG: &str = "leader";

/// Area a board object currently occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// The owner's home area
    Base,
    /// A contested battlefield
    Battlefield,
    /// Zone tag this client does not know; treated as off the battlefields
    #[serde(other)]
    Unknown,
}

/// Location of a unit that is not in its owner's home area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLocation {
    pub zone: Zone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battlefield_id: Option<BattlefieldId>,
}

impl CardLocation {
    pub fn battlefield(id: impl Into<BattlefieldId>) -> Self {
        CardLocation {
            zone: Zone::Battlefield,
            battlefield_id: Some(id.into()),
        }
    }
}

/// One physical card object
///
/// `instance_id` is stable for the object while it stays on board, in hand or
/// in a graveyard. `card_id` is the catalog id shared by all copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstance {
    pub instance_id: InstanceId,

    pub card_id: CardId,

    #[serde(default)]
    pub name: String,

    /// Category tags such as `legend` or `leader`
    #[serde(default)]
    pub tags: SmallVec<[String; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub might: Option<i32>,

    #[serde(default)]
    pub exhausted: bool,

    /// Only set while the unit occupies a battlefield
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CardLocation>,
}

impl CardInstance {
    pub fn new(
        instance_id: impl Into<InstanceId>,
        card_id: impl Into<CardId>,
        name: impl Into<String>,
    ) -> Self {
        CardInstance {
            instance_id: instance_id.into(),
            card_id: card_id.into(),
            name: name.into(),
            tags: SmallVec::new(),
            might: None,
            exhausted: false,
            location: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_location(mut self, location: CardLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_legend(&self) -> bool {
        self.has_tag(LEGEND_TAG)
    }

    pub fn is_leader(&self) -> bool {
        self.has_tag(LEADER_TAG)
    }

    /// Is this object currently standing on a battlefield?
    pub fn is_on_battlefield(&self) -> bool {
        matches!(
            self.location,
            Some(CardLocation {
                zone: Zone::Battlefield,
                ..
            })
        )
    }

    /// Battlefield this object occupies, if any
    pub fn battlefield_id(&self) -> Option<&BattlefieldId> {
        self.location
            .as_ref()
            .filter(|loc| loc.zone == Zone::Battlefield)
            .and_then(|loc| loc.battlefield_id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_wire() {
        let json = r#"{
            "instanceId": "u-1",
            "cardId": "OGN-001",
            "name": "Vanguard Captain",
            "tags": ["Leader"],
            "might": 3,
            "location": {"zone": "battlefield", "battlefieldId": "bf-1"}
        }"#;
        let card: CardInstance = serde_json::from_str(json).unwrap();

        assert_eq!(card.instance_id.as_str(), "u-1");
        assert_eq!(card.card_id.as_str(), "OGN-001");
        assert!(card.is_leader());
        assert!(!card.is_legend());
        assert!(card.is_on_battlefield());
        assert_eq!(card.battlefield_id().map(|b| b.as_str()), Some("bf-1"));
        assert!(!card.exhausted);
    }

    #[test]
    fn test_card_at_base_has_no_battlefield() {
        let card = CardInstance::new("u-2", "OGN-002", "Scout").with_location(CardLocation {
            zone: Zone::Base,
            battlefield_id: None,
        });
        assert!(!card.is_on_battlefield());
        assert_eq!(card.battlefield_id(), None);

        let bare = CardInstance::new("u-3", "OGN-002", "Scout");
        assert!(!bare.is_on_battlefield());
    }

    #[test]
    fn test_unknown_zone_is_inert() {
        let json = r#"{
            "instanceId": "u-4",
            "cardId": "OGN-003",
            "name": "Drifter",
            "location": {"zone": "shadow_realm", "battlefieldId": "bf-1"}
        }"#;
        let card: CardInstance = serde_json::from_str(json).unwrap();

        assert_eq!(card.location.as_ref().map(|l| l.zone), Some(Zone::Unknown));
        assert!(!card.is_on_battlefield());
        assert_eq!(card.battlefield_id(), None);
    }

    #[test]
    fn test_copies_share_catalog_id_only() {
        let a = CardInstance::new("u-1", "OGN-010", "Recruit");
        let b = CardInstance::new("u-2", "OGN-010", "Recruit");
        assert_eq!(a.card_id, b.card_id);
        assert_ne!(a.instance_id, b.instance_id);
    }
}
