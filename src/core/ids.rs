//! Identifier newtypes for model entities.
//!
//! Every id wraps a random (v4) UUID, so ids generated during a session can never collide,
//! no matter how quickly entities are created.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

entity_id!(
    /// Globally unique table id
    TableId
);
entity_id!(
    /// Field id, unique within the owning table
    FieldId
);
entity_id!(
    /// Globally unique relationship id
    RelationshipId
);
entity_id!(
    /// Globally unique measure id
    MeasureId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rapid_generation_is_collision_free() {
        let ids: HashSet<FieldId> = (0..10_000).map(|_| FieldId::new()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let id = TableId::from(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let back: TableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(MeasureId::from(uuid).to_string(), uuid.to_string());
    }
}
