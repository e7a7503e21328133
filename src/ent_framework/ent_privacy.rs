// Ent Privacy System - access control for comment operations
// Rules are evaluated by priority; the first non-Skip answer wins, default Deny

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{
    core::{EntityType, UserId},
    entities::ROLE_ADMIN,
    error::{AppError, AppResult},
    infrastructure::viewer::ViewerContext,
};

/// Privacy rule context for access control decisions
#[derive(Debug, Clone)]
pub struct PrivacyContext {
    pub entity_type: EntityType,
    pub operation: PrivacyOperation,
    pub user_id: Option<UserId>,
    pub user_roles: Vec<String>,
    pub fully_authenticated: bool,
    /// Author of the record being accessed, for item operations
    pub owner_id: Option<UserId>,
}

impl PrivacyContext {
    pub fn new(viewer: &ViewerContext, entity_type: EntityType, operation: PrivacyOperation) -> Self {
        Self {
            entity_type,
            operation,
            user_id: viewer.user_id,
            user_roles: viewer.roles.clone(),
            fully_authenticated: viewer.is_authenticated_fully(),
            owner_id: None,
        }
    }

    pub fn with_owner(mut self, owner_id: Option<UserId>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user_roles.iter().any(|r| r == role)
    }
}

/// Operations that can be controlled by privacy policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyOperation {
    Create,
    Read,
    Update,
    Delete,
    Query,
}

/// Privacy rule result
#[derive(Debug, Clone, PartialEq)]
pub enum PrivacyResult {
    Allow,
    Deny,
    Skip, // Skip this rule, continue to next
}

/// Trait for implementing privacy rules
#[async_trait]
pub trait PrivacyRule: Send + Sync {
    /// Evaluate the privacy rule
    async fn evaluate(&self, ctx: &PrivacyContext) -> AppResult<PrivacyResult>;

    /// Get rule name for debugging
    fn name(&self) -> &str;

    /// Get supported operations
    fn operations(&self) -> Vec<PrivacyOperation>;

    /// Get rule priority (higher = evaluated first)
    fn priority(&self) -> i32;
}

/// Privacy policy registry
#[derive(Default)]
pub struct PrivacyRegistry {
    rules: HashMap<EntityType, Vec<Box<dyn PrivacyRule>>>,
}

impl PrivacyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a privacy rule for an entity type
    pub fn register_rule(&mut self, entity_type: EntityType, rule: Box<dyn PrivacyRule>) {
        let rules = self.rules.entry(entity_type).or_default();
        rules.push(rule);
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Evaluate privacy rules for an operation
    pub async fn evaluate_access(&self, ctx: &PrivacyContext) -> AppResult<PrivacyResult> {
        if let Some(rules) = self.rules.get(&ctx.entity_type) {
            for rule in rules {
                if !rule.operations().contains(&ctx.operation) {
                    continue;
                }
                match rule.evaluate(ctx).await? {
                    PrivacyResult::Skip => continue,
                    result => {
                        tracing::debug!(
                            rule = rule.name(),
                            operation = ?ctx.operation,
                            entity = %ctx.entity_type,
                            "privacy decision: {:?}",
                            result
                        );
                        return Ok(result);
                    }
                }
            }
        }

        // Default to deny if no rules explicitly allow
        Ok(PrivacyResult::Deny)
    }

    /// Fail with 401 (anonymous viewer) or 403 unless the operation is allowed
    pub async fn enforce(&self, ctx: &PrivacyContext) -> AppResult<()> {
        match self.evaluate_access(ctx).await? {
            PrivacyResult::Allow => Ok(()),
            _ => {
                tracing::warn!(
                    user_id = ?ctx.user_id,
                    operation = ?ctx.operation,
                    entity = %ctx.entity_type,
                    "access denied"
                );
                if ctx.user_id.is_none() {
                    Err(AppError::Unauthorized(
                        "Full authentication is required to access this resource.".to_string(),
                    ))
                } else {
                    Err(AppError::Forbidden("Access Denied.".to_string()))
                }
            }
        }
    }
}

/// Public access rule - anyone may read and list
pub struct PublicReadRule;

#[async_trait]
impl PrivacyRule for PublicReadRule {
    async fn evaluate(&self, ctx: &PrivacyContext) -> AppResult<PrivacyResult> {
        match ctx.operation {
            PrivacyOperation::Read | PrivacyOperation::Query => Ok(PrivacyResult::Allow),
            _ => Ok(PrivacyResult::Skip),
        }
    }

    fn name(&self) -> &str {
        "public_read"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::Read, PrivacyOperation::Query]
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Creating requires a full login; a remember-me session is not enough
pub struct AuthenticatedFullyRule;

#[async_trait]
impl PrivacyRule for AuthenticatedFullyRule {
    async fn evaluate(&self, ctx: &PrivacyContext) -> AppResult<PrivacyResult> {
        if ctx.operation != PrivacyOperation::Create {
            return Ok(PrivacyResult::Skip);
        }
        if ctx.user_id.is_some() && ctx.fully_authenticated {
            Ok(PrivacyResult::Allow)
        } else {
            Ok(PrivacyResult::Deny)
        }
    }

    fn name(&self) -> &str {
        "authenticated_fully"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::Create]
    }

    fn priority(&self) -> i32 {
        500
    }
}

/// EDIT_COMMENT: the comment's author or an admin may update or delete it
pub struct EditCommentRule;

#[async_trait]
impl PrivacyRule for EditCommentRule {
    async fn evaluate(&self, ctx: &PrivacyContext) -> AppResult<PrivacyResult> {
        match ctx.operation {
            PrivacyOperation::Update | PrivacyOperation::Delete => {
                let Some(user_id) = ctx.user_id else {
                    return Ok(PrivacyResult::Deny);
                };
                if ctx.has_role(ROLE_ADMIN) || ctx.owner_id == Some(user_id) {
                    Ok(PrivacyResult::Allow)
                } else {
                    Ok(PrivacyResult::Deny)
                }
            }
            _ => Ok(PrivacyResult::Skip),
        }
    }

    fn name(&self) -> &str {
        "edit_comment"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::Update, PrivacyOperation::Delete]
    }

    fn priority(&self) -> i32 {
        200
    }
}

/// Create default privacy registry with the comment rules
pub fn create_default_privacy_registry() -> PrivacyRegistry {
    let mut registry = PrivacyRegistry::new();

    registry.register_rule(EntityType::Comment, Box::new(AuthenticatedFullyRule));
    registry.register_rule(EntityType::Comment, Box::new(EditCommentRule));
    registry.register_rule(EntityType::Comment, Box::new(PublicReadRule));

    registry
}
