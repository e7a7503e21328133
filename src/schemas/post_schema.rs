// Post entity schema

use crate::core::EntityType;
use crate::ent_framework::ent_schema::{EdgeDefinition, EntSchema, FieldDefinition, FieldType};

pub struct PostSchema;

impl EntSchema for PostSchema {
    fn table() -> &'static str {
        "symfony_demo_post"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("title", FieldType::String),
            FieldDefinition::new("slug", FieldType::String).unique(),
            FieldDefinition::new("publishedAt", FieldType::Time).storage_key("published_at"),
        ]
    }

    fn edges() -> Vec<EdgeDefinition> {
        vec![EdgeDefinition::to("author", EntityType::User).required()]
    }
}
