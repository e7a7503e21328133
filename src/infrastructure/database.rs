// Database interface - persistence seam for comments and the records they reference

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    core::{CommentId, PostId, UserId},
    entities::{Comment, Post, User},
    error::AppResult,
};

/// Page request over the comment collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    /// Exact-match filter on the owning post
    pub post: Option<PostId>,
    /// 1-based page number
    pub page: u32,
    pub items_per_page: u32,
}

impl CommentQuery {
    pub fn new(page: u32, items_per_page: u32) -> Self {
        Self {
            post: None,
            page,
            items_per_page,
        }
    }

    pub fn for_post(mut self, post: PostId) -> Self {
        self.post = Some(post);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.items_per_page)
    }
}

/// One page of comments, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u32,
    pub items_per_page: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            items_per_page: self.items_per_page,
        }
    }
}

pub type CommentPage = Page<Comment>;

/// Storage backend for the blog. Implementations own identity assignment and
/// foreign key enforcement; validation happens before these are called.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment and return it with its id assigned.
    /// Fails with `NotFound` if the referenced post or author does not exist.
    async fn insert_comment(&self, comment: &Comment) -> AppResult<Comment>;

    /// Write back content and publication date of a persisted comment.
    async fn update_comment(&self, comment: &Comment) -> AppResult<Comment>;

    /// Returns whether a row was removed.
    async fn delete_comment(&self, id: CommentId) -> AppResult<bool>;

    async fn get_comment(&self, id: CommentId) -> AppResult<Option<Comment>>;

    async fn list_comments(&self, query: &CommentQuery) -> AppResult<CommentPage>;

    async fn insert_post(&self, post: &Post) -> AppResult<Post>;

    async fn get_post(&self, id: PostId) -> AppResult<Option<Post>>;

    async fn insert_user(&self, user: &User) -> AppResult<User>;

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_offset() {
        assert_eq!(CommentQuery::new(1, 2).offset(), 0);
        assert_eq!(CommentQuery::new(3, 2).offset(), 4);
        assert_eq!(CommentQuery::new(0, 2).offset(), 0);
    }

    #[test]
    fn test_page_map() {
        let page = Page {
            items: vec![1, 2],
            total_items: 5,
            page: 1,
            items_per_page: 2,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total_items, 5);
    }
}
