use chrono::{Duration, Utc};

use crate::{
    ent_framework::ent_validation::validate,
    entities::{Comment, Post, User, ROLE_ADMIN},
    error::{AppError, AppResult},
    infrastructure::database::CommentStore,
};

const DEMO_ADMIN: &str = "jane_admin";

const DEMO_COMMENTS: &[&str] = &[
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    "Pellentesque et sapien pulvinar, consectetur eros ac, vehicula odio.",
    "Ut eleifend mauris et risus ultrices egestas.",
    "Aliquam sodales odio id eleifend tristique.",
    "Urna nisl sollicitudin id varius orci quam id turpis.",
];

/// What the seeder inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

/// Insert demo users (one admin), two posts and a handful of comments.
/// Comments go through the same validation as API writes.
/// Does nothing when the demo admin already exists.
pub async fn seed_demo_data(store: &dyn CommentStore) -> AppResult<SeedSummary> {
    if store.find_user_by_username(DEMO_ADMIN).await?.is_some() {
        tracing::info!(username = DEMO_ADMIN, "demo data already present, skipping seed");
        return Ok(SeedSummary::default());
    }

    let admin = store
        .insert_user(&User::new(DEMO_ADMIN, "Jane Doe").with_role(ROLE_ADMIN))
        .await?;
    let user = store.insert_user(&User::new("john_user", "John Doe")).await?;
    let users = [admin, user];

    let post_author = users[0]
        .id
        .ok_or_else(|| AppError::Internal("seeded user has no id".to_string()))?;
    let mut posts = Vec::new();
    for title in ["Lorem ipsum dolor sit amet", "Pellentesque vitae velit ex"] {
        posts.push(store.insert_post(&Post::new(title, post_author)).await?);
    }

    let now = Utc::now();
    let mut comments = 0;
    for (i, content) in DEMO_COMMENTS.iter().enumerate() {
        let (Some(post), Some(author)) = (posts[i % posts.len()].id, users[i % users.len()].id)
        else {
            continue;
        };

        let mut comment = Comment::new();
        comment.set_post(post);
        comment.set_author(author);
        comment.set_content(*content);
        comment.set_published_at(now - Duration::hours((DEMO_COMMENTS.len() - i) as i64));

        validate(&comment)?;
        store.insert_comment(&comment).await?;
        comments += 1;
    }

    tracing::info!(users = users.len(), posts = posts.len(), comments, "demo data seeded");

    Ok(SeedSummary {
        users: users.len(),
        posts: posts.len(),
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{database::CommentQuery, sqlite_database::SqliteDatabase};

    #[tokio::test]
    async fn test_seed_demo_data() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let summary = seed_demo_data(&db).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                users: 2,
                posts: 2,
                comments: DEMO_COMMENTS.len()
            }
        );

        let page = db.list_comments(&CommentQuery::new(1, 2)).await.unwrap();
        assert_eq!(page.total_items, DEMO_COMMENTS.len() as u64);
        // Newest first: the last demo comment was published most recently
        assert_eq!(page.items[0].content(), DEMO_COMMENTS.last().copied());
    }

    #[tokio::test]
    async fn test_seeding_twice_keeps_a_single_copy() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("blog.db").display());

        let db = SqliteDatabase::connect(&url, 2).await.unwrap();
        assert_eq!(seed_demo_data(&db).await.unwrap().comments, DEMO_COMMENTS.len());
        drop(db);

        let reopened = SqliteDatabase::connect(&url, 2).await.unwrap();
        assert_eq!(seed_demo_data(&reopened).await.unwrap(), SeedSummary::default());

        let page = reopened.list_comments(&CommentQuery::new(1, 2)).await.unwrap();
        assert_eq!(page.total_items, DEMO_COMMENTS.len() as u64);
        assert!(reopened.find_user_by_username(DEMO_ADMIN).await.unwrap().is_some());
    }
}
