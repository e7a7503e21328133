// User entity schema

use crate::ent_framework::ent_schema::{EntSchema, FieldDefinition, FieldType};

pub struct UserSchema;

impl EntSchema for UserSchema {
    fn table() -> &'static str {
        "symfony_demo_user"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("username", FieldType::String).unique(),
            FieldDefinition::new("fullName", FieldType::String).storage_key("full_name"),
            // JSON array of role names
            FieldDefinition::new("roles", FieldType::JSON),
        ]
    }
}
