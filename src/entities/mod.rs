// Blog entities - plain data records; persistence lives in infrastructure

use crate::core::EntityType;

/// Entity trait that all blog entities implement
pub trait Entity: Clone + Send + Sync {
    fn entity_type() -> EntityType;
}

pub mod ent_comment;
pub mod ent_post;
pub mod ent_user;

pub use ent_comment::Comment;
pub use ent_post::Post;
pub use ent_user::{User, ROLE_ADMIN, ROLE_USER};
