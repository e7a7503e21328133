// Comment entity schema - table, columns and API resource

use crate::core::EntityType;
use crate::ent_framework::ent_schema::{
    EdgeDefinition, EntSchema, FieldDefinition, FieldType, OrderDirection, ResourceDefinition,
};

/// Page size of the comment collection unless configured otherwise
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 2;

/// Comment entity schema
pub struct CommentSchema;

impl EntSchema for CommentSchema {
    fn table() -> &'static str {
        "symfony_demo_comment"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("content", FieldType::Text),
            FieldDefinition::new("publishedAt", FieldType::Time).storage_key("published_at"),
        ]
    }

    fn edges() -> Vec<EdgeDefinition> {
        vec![
            EdgeDefinition::to("post", EntityType::Post).required(),
            EdgeDefinition::to("author", EntityType::User).required(),
        ]
    }

    fn resource() -> Option<ResourceDefinition> {
        Some(
            ResourceDefinition::new(DEFAULT_ITEMS_PER_PAGE)
                .order("published_at", OrderDirection::Desc)
                .exact_filter("post"),
        )
    }
}

/// The collection resource definition of comments
pub fn comment_resource() -> ResourceDefinition {
    CommentSchema::resource().unwrap_or_else(|| ResourceDefinition::new(DEFAULT_ITEMS_PER_PAGE))
}
