// Ent Validation - explicit constraint list evaluated before a comment is written
// Every constraint runs; failures are aggregated into one violation list

use serde::{Serialize, Serializer};
use std::fmt;

use crate::entities::Comment;

/// Minimum comment length in characters
pub const MIN_CONTENT_LENGTH: usize = 5;

/// Maximum comment length in characters
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Which part of the comment a violation is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationField {
    Content,
    Post,
    Author,
    /// Object-level constraint, no single property
    Object,
}

impl ValidationField {
    pub fn property_path(&self) -> &'static str {
        match self {
            ValidationField::Content => "content",
            ValidationField::Post => "post",
            ValidationField::Author => "author",
            ValidationField::Object => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Blank,
    TooShort,
    TooLong,
    SpamDetected,
    /// Required reference (post or author) not set
    Missing,
}

impl ValidationKind {
    /// Translation key of the violation message
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationKind::Blank => "comment.blank",
            ValidationKind::TooShort => "comment.too_short",
            ValidationKind::TooLong => "comment.too_long",
            ValidationKind::SpamDetected => "comment.is_spam",
            ValidationKind::Missing => "comment.missing_reference",
        }
    }

    /// English rendering of the message key
    pub fn message(&self) -> String {
        match self {
            ValidationKind::Blank => "Please don't leave your comment empty!".to_string(),
            ValidationKind::TooShort => format!(
                "Comment is too short ({} characters minimum).",
                MIN_CONTENT_LENGTH
            ),
            ValidationKind::TooLong => format!(
                "Comment is too long ({} characters maximum).",
                MAX_CONTENT_LENGTH
            ),
            ValidationKind::SpamDetected => {
                "The content of this comment is considered spam.".to_string()
            }
            ValidationKind::Missing => "This value should not be null.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: ValidationField,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(field: ValidationField, kind: ValidationKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            ValidationField::Object => write!(f, "{}", self.kind.message()),
            field => write!(f, "{}: {}", field.property_path(), self.kind.message()),
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationError", 3)?;
        state.serialize_field("propertyPath", self.field.property_path())?;
        state.serialize_field("messageKey", self.kind.message_key())?;
        state.serialize_field("message", &self.kind.message())?;
        state.end()
    }
}

/// All violations found on one object, in constraint order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstraintViolationList(Vec<ValidationError>);

impl ConstraintViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<ValidationKind> {
        self.0.iter().map(|e| e.kind).collect()
    }

    pub fn contains(&self, kind: ValidationKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    fn extend(&mut self, errors: Vec<ValidationError>) {
        self.0.extend(errors);
    }
}

impl fmt::Display for ConstraintViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl From<Vec<ValidationError>> for ConstraintViolationList {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

/// A pure check over a comment
pub type Constraint = fn(&Comment) -> Vec<ValidationError>;

/// Ordered constraint list for comments
pub const COMMENT_CONSTRAINTS: &[Constraint] = &[
    not_blank,
    content_length,
    legit_comment,
    required_references,
];

/// Content must be set and contain something other than whitespace.
pub fn not_blank(comment: &Comment) -> Vec<ValidationError> {
    match comment.content() {
        Some(content) if !content.trim().is_empty() => Vec::new(),
        _ => vec![ValidationError::new(ValidationField::Content, ValidationKind::Blank)],
    }
}

/// Length in characters must lie within [MIN_CONTENT_LENGTH, MAX_CONTENT_LENGTH].
/// Unset content is left to `not_blank`.
pub fn content_length(comment: &Comment) -> Vec<ValidationError> {
    let Some(content) = comment.content() else {
        return Vec::new();
    };

    let length = content.chars().count();
    if length < MIN_CONTENT_LENGTH {
        vec![ValidationError::new(ValidationField::Content, ValidationKind::TooShort)]
    } else if length > MAX_CONTENT_LENGTH {
        vec![ValidationError::new(ValidationField::Content, ValidationKind::TooLong)]
    } else {
        Vec::new()
    }
}

pub fn legit_comment(comment: &Comment) -> Vec<ValidationError> {
    if comment.is_legit_comment() {
        Vec::new()
    } else {
        vec![ValidationError::new(ValidationField::Object, ValidationKind::SpamDetected)]
    }
}

pub fn required_references(comment: &Comment) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if comment.post().is_none() {
        errors.push(ValidationError::new(ValidationField::Post, ValidationKind::Missing));
    }
    if comment.author().is_none() {
        errors.push(ValidationError::new(ValidationField::Author, ValidationKind::Missing));
    }
    errors
}

/// Run every constraint in `constraints` and collect all failures
pub fn validate_with(
    comment: &Comment,
    constraints: &[Constraint],
) -> Result<(), ConstraintViolationList> {
    let mut violations = ConstraintViolationList::new();
    for constraint in constraints {
        violations.extend(constraint(comment));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate a comment against the full comment constraint list
pub fn validate(comment: &Comment) -> Result<(), ConstraintViolationList> {
    validate_with(comment, COMMENT_CONSTRAINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PostId, UserId};

    fn comment_with(content: &str) -> Comment {
        let mut comment = Comment::new();
        comment.set_post(PostId::new(1));
        comment.set_author(UserId::new(1));
        comment.set_content(content);
        comment
    }

    fn kinds_of(content: &str) -> Vec<ValidationKind> {
        validate(&comment_with(content))
            .err()
            .map(|v| v.kinds())
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_comment_passes() {
        assert!(validate(&comment_with("Great post!")).is_ok());
        assert!(validate(&comment_with("12345")).is_ok());
        assert!(validate(&comment_with(&"a".repeat(MAX_CONTENT_LENGTH))).is_ok());
    }

    #[test]
    fn test_too_short() {
        assert_eq!(kinds_of("Hi"), vec![ValidationKind::TooShort]);
        assert_eq!(kinds_of("1234"), vec![ValidationKind::TooShort]);
    }

    #[test]
    fn test_too_long() {
        let content = "a".repeat(MAX_CONTENT_LENGTH + 1);
        assert_eq!(kinds_of(&content), vec![ValidationKind::TooLong]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 5 characters, 10 bytes
        assert!(validate(&comment_with("ééééé")).is_ok());
        // 4 characters, 16 bytes
        assert_eq!(kinds_of("😀😀😀😀"), vec![ValidationKind::TooShort]);
    }

    #[test]
    fn test_spam_detected_regardless_of_length() {
        assert_eq!(
            kinds_of("contact me at foo@bar.com please"),
            vec![ValidationKind::SpamDetected]
        );
        assert_eq!(
            kinds_of("a@b"),
            vec![ValidationKind::TooShort, ValidationKind::SpamDetected]
        );
        let long_spam = format!("{}@", "a".repeat(MAX_CONTENT_LENGTH));
        assert_eq!(
            kinds_of(&long_spam),
            vec![ValidationKind::TooLong, ValidationKind::SpamDetected]
        );
    }

    #[test]
    fn test_blank_content() {
        assert_eq!(kinds_of(""), vec![ValidationKind::Blank, ValidationKind::TooShort]);
        assert_eq!(kinds_of("        "), vec![ValidationKind::Blank]);
        assert_eq!(kinds_of("\t\n"), vec![ValidationKind::Blank, ValidationKind::TooShort]);
    }

    #[test]
    fn test_unset_content_is_blank_only() {
        let mut comment = Comment::new();
        comment.set_post(PostId::new(1));
        comment.set_author(UserId::new(1));
        let violations = validate(&comment).unwrap_err();
        assert_eq!(violations.kinds(), vec![ValidationKind::Blank]);
    }

    #[test]
    fn test_missing_references() {
        let mut comment = Comment::new();
        comment.set_content("Great post!");
        let violations = validate(&comment).unwrap_err();
        let paths: Vec<&str> = violations.iter().map(|e| e.field.property_path()).collect();
        assert_eq!(paths, vec!["post", "author"]);
        assert!(violations.contains(ValidationKind::Missing));
    }

    #[test]
    fn test_validate_with_subset() {
        let comment = Comment::new();
        assert!(validate_with(&comment, &[legit_comment]).is_ok());
        assert!(validate_with(&comment, &[]).is_ok());
    }

    #[test]
    fn test_violation_serialization() {
        let violations = validate(&comment_with("Hi")).unwrap_err();
        let json = serde_json::to_value(&violations).unwrap();
        assert_eq!(json[0]["propertyPath"], "content");
        assert_eq!(json[0]["messageKey"], "comment.too_short");
        assert_eq!(json[0]["message"], "Comment is too short (5 characters minimum).");
    }

    #[test]
    fn test_spam_is_object_level() {
        let violations = validate(&comment_with("ping me @ home")).unwrap_err();
        let error = violations.iter().next().unwrap();
        assert_eq!(error.field, ValidationField::Object);
        assert_eq!(error.to_string(), "The content of this comment is considered spam.");
    }
}
