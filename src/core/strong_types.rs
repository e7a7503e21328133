// Strong Types - newtype identifiers for the blog entities
// A Comment refers to its Post and User through these ids, never through owned records

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw ID value
            pub fn value(self) -> i64 {
                self.0
            }

            /// Database-assigned ids are always positive
            pub fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

strong_id!(
    /// Identity of a persisted comment, assigned by the store on insert
    CommentId
);
strong_id!(
    /// Reference to the post a comment belongs to
    PostId
);
strong_id!(
    /// Reference to a user (comment or post author)
    UserId
);

/// Entity kinds known to the schema and privacy registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Comment,
    Post,
    User,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Comment => "comment",
            EntityType::Post => "post",
            EntityType::User => "user",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_operations() {
        let id = CommentId::new(123);
        assert_eq!(id.value(), 123);
        assert!(id.is_valid());
        assert!(!PostId::new(-1).is_valid());
        assert_eq!(i64::from(UserId::from(7)), 7);
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&PostId::new(42)).unwrap(), "42");
        let id: UserId = serde_json::from_str("9").unwrap();
        assert_eq!(id, UserId::new(9));
    }

    #[test]
    fn test_entity_type_display() {
        assert_eq!(EntityType::Comment.to_string(), "comment");
        assert_eq!(EntityType::User.as_str(), "user");
    }
}
