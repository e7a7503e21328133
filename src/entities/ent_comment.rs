// EntComment - a blog comment attached to a post and written by a user

use chrono::{DateTime, SubsecRound, Utc};

use super::Entity;
use crate::core::{CommentId, EntityType, PostId, UserId};

/// Character whose presence marks a comment as spam.
pub const SPAM_MARKER: char = '@';

/// A comment on a blog post.
///
/// `post` and `author` are non-owning references; resolving them to full
/// records is an explicit store query. The id is assigned by the store on
/// insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    id: Option<CommentId>,
    post: Option<PostId>,
    content: Option<String>,
    published_at: DateTime<Utc>,
    author: Option<UserId>,
}

impl Comment {
    /// New, unsaved comment published now.
    pub fn new() -> Self {
        Self {
            id: None,
            post: None,
            content: None,
            published_at: Utc::now().trunc_subsecs(6),
            author: None,
        }
    }

    /// Rebuild a persisted comment from storage.
    pub(crate) fn hydrate(
        id: CommentId,
        post: PostId,
        content: String,
        published_at: DateTime<Utc>,
        author: UserId,
    ) -> Self {
        Self {
            id: Some(id),
            post: Some(post),
            content: Some(content),
            published_at,
            author: Some(author),
        }
    }

    /// Crude anti-spam check: any `@` in the body rejects the comment.
    pub fn is_legit_comment(&self) -> bool {
        !self
            .content
            .as_deref()
            .is_some_and(|content| content.contains(SPAM_MARKER))
    }

    pub fn id(&self) -> Option<CommentId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// Stored with microsecond precision.
    pub fn set_published_at(&mut self, published_at: DateTime<Utc>) {
        self.published_at = published_at.trunc_subsecs(6);
    }

    pub fn author(&self) -> Option<UserId> {
        self.author
    }

    pub fn set_author(&mut self, author: UserId) {
        self.author = Some(author);
    }

    pub fn post(&self) -> Option<PostId> {
        self.post
    }

    pub fn set_post(&mut self, post: PostId) {
        self.post = Some(post);
    }
}

impl Default for Comment {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Comment {
    fn entity_type() -> EntityType {
        EntityType::Comment
    }
}
