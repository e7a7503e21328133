// Ent Framework - schema mapping, validation and privacy for blog entities

pub mod ent_privacy;
pub mod ent_schema;
pub mod ent_validation;

pub use ent_privacy::{
    create_default_privacy_registry, PrivacyContext, PrivacyOperation, PrivacyRegistry,
    PrivacyResult, PrivacyRule,
};
pub use ent_schema::{EntSchema, ResourceDefinition};
pub use ent_validation::{
    validate, ConstraintViolationList, ValidationError, ValidationField, ValidationKind,
};
