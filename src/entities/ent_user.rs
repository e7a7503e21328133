// EntUser - comment and post authors

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::core::{EntityType, UserId};

pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub username: String,
    pub full_name: String,
    pub roles: Vec<String>,
}

impl User {
    /// Regular user holding only `ROLE_USER`.
    pub fn new(username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            full_name: full_name.into(),
            roles: vec![ROLE_USER.to_string()],
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }
}

impl Entity for User {
    fn entity_type() -> EntityType {
        EntityType::User
    }
}
