// Schema definitions module - one mapping table per entity

pub mod comment_schema;
pub mod post_schema;
pub mod user_schema;

pub use comment_schema::{comment_resource, CommentSchema};
pub use post_schema::PostSchema;
pub use user_schema::UserSchema;
