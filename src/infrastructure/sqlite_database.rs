use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::path::Path;
use std::str::FromStr;

use crate::{
    core::{CommentId, PostId, UserId},
    ent_framework::{
        ent_schema::{create_table_sql, EntSchema},
        ent_validation::{not_blank, required_references, ConstraintViolationList},
    },
    entities::{Comment, Post, User},
    error::{AppError, AppResult},
    infrastructure::database::{CommentPage, CommentQuery, CommentStore, Page},
    schemas::{comment_resource, CommentSchema, PostSchema, UserSchema},
};

/// SQLite implementation of the comment store
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Connect to `url` (e.g. `sqlite:data/blog.db`), creating the file and
    /// its parent directories if needed.
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        if let Some(dir) = database_dir(url) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Configuration(format!("Cannot create database directory {}: {}", dir.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Configuration(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database sees its own database,
        // so the pool must hold exactly one connection and never recycle it.
        let pool_options = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to {}: {}", url, e)))?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Create the blog tables if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        // Referenced tables first
        for (table, ddl) in [
            (UserSchema::table(), create_table_sql::<UserSchema>()),
            (PostSchema::table(), create_table_sql::<PostSchema>()),
            (CommentSchema::table(), create_table_sql::<CommentSchema>()),
        ] {
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Failed to create table {}: {}", table, e)))?;
        }

        let index = format!(
            "CREATE INDEX IF NOT EXISTS idx_comment_post_published ON {}(post_id, published_at DESC)",
            CommentSchema::table()
        );
        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create comment index: {}", e)))?;

        tracing::debug!("database schema initialized");
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Directory holding a file database, if it is not the working directory
fn database_dir(url: &str) -> Option<&Path> {
    if is_in_memory(url) {
        return None;
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Unique constraint failures are caller errors, everything else is a storage fault
fn insert_error(err: sqlx::Error, conflict: String, context: String) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::BadRequest(conflict),
        _ => AppError::Database(format!("{}: {}", context, err)),
    }
}

fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| AppError::Database(format!("Invalid stored timestamp {}", micros)))
}

fn user_from_row(row: &SqliteRow) -> AppResult<User> {
    let id = UserId::new(row.try_get("id")?);
    let roles: String = row.try_get("roles")?;
    Ok(User {
        id: Some(id),
        username: row.try_get("username")?,
        full_name: row.try_get("full_name")?,
        roles: serde_json::from_str(&roles)
            .map_err(|e| AppError::Database(format!("Corrupt roles for user {}: {}", id, e)))?,
    })
}

fn comment_from_row(row: &SqliteRow) -> AppResult<Comment> {
    Ok(Comment::hydrate(
        CommentId::new(row.try_get("id")?),
        PostId::new(row.try_get("post_id")?),
        row.try_get("content")?,
        from_micros(row.try_get("published_at")?)?,
        UserId::new(row.try_get("author_id")?),
    ))
}

#[async_trait]
impl CommentStore for SqliteDatabase {
    async fn insert_comment(&self, comment: &Comment) -> AppResult<Comment> {
        if comment.is_persisted() {
            return Err(AppError::BadRequest("Comment is already persisted".to_string()));
        }
        let (Some(post), Some(author)) = (comment.post(), comment.author()) else {
            return Err(AppError::Validation(ConstraintViolationList::from(
                required_references(comment),
            )));
        };
        let Some(content) = comment.content() else {
            return Err(AppError::Validation(ConstraintViolationList::from(not_blank(comment))));
        };

        let mut tx = self.pool.begin().await?;

        let post_exists = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = ?", PostSchema::table()))
            .bind(post.value())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !post_exists {
            return Err(AppError::NotFound(format!("Post {} not found", post)));
        }

        let author_exists = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = ?", UserSchema::table()))
            .bind(author.value())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !author_exists {
            return Err(AppError::NotFound(format!("User {} not found", author)));
        }

        let result = sqlx::query(&format!(
            "INSERT INTO {} (content, published_at, post_id, author_id) VALUES (?, ?, ?, ?)",
            CommentSchema::table()
        ))
        .bind(content)
        .bind(to_micros(comment.published_at()))
        .bind(post.value())
        .bind(author.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert comment: {}", e)))?;

        tx.commit().await?;

        let id = CommentId::new(result.last_insert_rowid());
        tracing::info!(comment_id = %id, post_id = %post, author_id = %author, "comment created");

        Ok(Comment::hydrate(
            id,
            post,
            content.to_string(),
            comment.published_at(),
            author,
        ))
    }

    async fn update_comment(&self, comment: &Comment) -> AppResult<Comment> {
        let id = comment
            .id()
            .ok_or_else(|| AppError::BadRequest("Cannot update an unsaved comment".to_string()))?;
        let Some(content) = comment.content() else {
            return Err(AppError::Validation(ConstraintViolationList::from(not_blank(comment))));
        };

        let result = sqlx::query(&format!(
            "UPDATE {} SET content = ?, published_at = ? WHERE id = ?",
            CommentSchema::table()
        ))
        .bind(content)
        .bind(to_micros(comment.published_at()))
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update comment {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        tracing::info!(comment_id = %id, "comment updated");
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: CommentId) -> AppResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", CommentSchema::table()))
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete comment {}: {}", id, e)))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(comment_id = %id, "comment deleted");
        }
        Ok(deleted)
    }

    async fn get_comment(&self, id: CommentId) -> AppResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT id, post_id, content, published_at, author_id FROM {} WHERE id = ?",
            CommentSchema::table()
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get comment {}: {}", id, e)))?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_comments(&self, query: &CommentQuery) -> AppResult<CommentPage> {
        let resource = comment_resource();
        let direction = resource.order_direction.as_sql();
        let filter = if query.post.is_some() { " WHERE post_id = ?" } else { "" };

        let count_sql = format!("SELECT COUNT(*) AS total FROM {}{}", CommentSchema::table(), filter);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(post) = query.post {
            count_query = count_query.bind(post.value());
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count comments: {}", e)))?
            .try_get("total")?;

        let select_sql = format!(
            "SELECT id, post_id, content, published_at, author_id FROM {}{} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            CommentSchema::table(),
            filter,
            resource.order_by,
            direction,
            direction
        );
        let mut select_query = sqlx::query(&select_sql);
        if let Some(post) = query.post {
            select_query = select_query.bind(post.value());
        }
        let rows = select_query
            .bind(i64::from(query.items_per_page))
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list comments: {}", e)))?;

        let items = rows.iter().map(comment_from_row).collect::<AppResult<Vec<_>>>()?;
        tracing::debug!(post = ?query.post, page = query.page, found = items.len(), "listed comments");

        Ok(Page {
            items,
            total_items: u64::try_from(total).unwrap_or_default(),
            page: query.page,
            items_per_page: query.items_per_page,
        })
    }

    async fn insert_post(&self, post: &Post) -> AppResult<Post> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (title, slug, published_at, author_id) VALUES (?, ?, ?, ?)",
            PostSchema::table()
        ))
        .bind(&post.title)
        .bind(&post.slug)
        .bind(to_micros(post.published_at))
        .bind(post.author.value())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                e,
                format!("A post with slug {} already exists", post.slug),
                format!("Failed to insert post {}", post.slug),
            )
        })?;

        let mut saved = post.clone();
        saved.id = Some(PostId::new(result.last_insert_rowid()));
        Ok(saved)
    }

    async fn get_post(&self, id: PostId) -> AppResult<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT id, title, slug, published_at, author_id FROM {} WHERE id = ?",
            PostSchema::table()
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Post {
            id: Some(PostId::new(row.try_get("id")?)),
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            published_at: from_micros(row.try_get("published_at")?)?,
            author: UserId::new(row.try_get("author_id")?),
        }))
    }

    async fn insert_user(&self, user: &User) -> AppResult<User> {
        let roles = serde_json::to_string(&user.roles)
            .map_err(|e| AppError::Internal(format!("Failed to encode roles: {}", e)))?;

        let result = sqlx::query(&format!(
            "INSERT INTO {} (username, full_name, roles) VALUES (?, ?, ?)",
            UserSchema::table()
        ))
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(roles)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                e,
                format!("Username {} is already taken", user.username),
                format!("Failed to insert user {}", user.username),
            )
        })?;

        let mut saved = user.clone();
        saved.id = Some(UserId::new(result.last_insert_rowid()));
        Ok(saved)
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT id, username, full_name, roles FROM {} WHERE id = ?",
            UserSchema::table()
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT id, username, full_name, roles FROM {} WHERE username = ?",
            UserSchema::table()
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}
