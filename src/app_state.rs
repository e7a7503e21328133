use std::sync::Arc;

use crate::{
    comment_interface::CommentInterface,
    config::Config,
    ent_framework::create_default_privacy_registry,
    error::AppResult,
    infrastructure::{database::CommentStore, sqlite_database::SqliteDatabase},
};

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentInterface,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let database =
            SqliteDatabase::connect(&config.database.url, config.database.max_connections).await?;
        let store: Arc<dyn CommentStore> = Arc::new(database);

        Ok(Self::with_store(store, config))
    }

    /// Build the state around an already opened store
    pub fn with_store(store: Arc<dyn CommentStore>, config: Config) -> Self {
        let privacy = Arc::new(create_default_privacy_registry());
        let comments = CommentInterface::new(store, privacy, config.api.comments_per_page);

        Self { comments, config }
    }

    pub fn store(&self) -> &Arc<dyn CommentStore> {
        self.comments.store()
    }
}
