use uuid::Uuid;

use crate::core::UserId;

/// How the viewer proved their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Anonymous,
    /// Fresh login in this session
    Full,
    /// Restored from a remember-me cookie
    RememberMe,
}

/// Request-scoped identity of the caller
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: Option<UserId>,
    pub roles: Vec<String>,
    pub auth_method: AuthMethod,
    pub request_id: String,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            roles: Vec::new(),
            auth_method: AuthMethod::Anonymous,
            request_id: new_request_id(),
        }
    }

    pub fn authenticated_user(user_id: UserId, roles: Vec<String>) -> Self {
        Self {
            user_id: Some(user_id),
            roles,
            auth_method: AuthMethod::Full,
            request_id: new_request_id(),
        }
    }

    pub fn remembered_user(user_id: UserId, roles: Vec<String>) -> Self {
        Self {
            user_id: Some(user_id),
            roles,
            auth_method: AuthMethod::RememberMe,
            request_id: new_request_id(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_authenticated_fully(&self) -> bool {
        self.user_id.is_some() && self.auth_method == AuthMethod::Full
    }
}

fn new_request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}
