// Comment Interface - the comment resource over HTTP
// Every operation goes: load -> authorize -> validate -> persist

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path as AxumPath, Query, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    core::{CommentId, EntityType, PostId, UserId},
    ent_framework::{
        ent_validation::validate, PrivacyContext, PrivacyOperation, PrivacyRegistry,
        ResourceDefinition,
    },
    entities::{Comment, Entity},
    error::{AppError, AppResult},
    infrastructure::{
        database::{CommentQuery, CommentStore, Page},
        middleware::{viewer_context_middleware, Vc},
        viewer::ViewerContext,
    },
    schemas::comment_resource,
};

/// Read view of a comment. Collection items and single reads expose the
/// same fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Option<CommentId>,
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
    pub author: Option<UserId>,
    pub post: Option<PostId>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id(),
            content: comment.content().map(str::to_string),
            published_at: comment.published_at(),
            author: comment.author(),
            post: comment.post(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub post: Option<PostId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListCommentsQuery {
    pub page: Option<u32>,
    pub post: Option<PostId>,
}

impl ListCommentsQuery {
    /// Parse raw query parameters. Anything besides `page` must be an
    /// exact filter declared on the resource.
    pub fn from_params(
        params: &HashMap<String, String>,
        resource: &ResourceDefinition,
    ) -> AppResult<Self> {
        let mut query = Self::default();
        for (name, value) in params {
            if name == "page" {
                let page = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid page number: {:?}", value)))?;
                query.page = Some(page);
                continue;
            }
            if !resource.allows_filter(name) {
                return Err(AppError::BadRequest(format!("Unknown filter: {}", name)));
            }
            match name.as_str() {
                "post" => {
                    let id: i64 = value.trim().parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid post filter: {:?}", value))
                    })?;
                    query.post = Some(PostId::new(id));
                }
                _ => return Err(AppError::BadRequest(format!("Unsupported filter: {}", name))),
            }
        }
        Ok(query)
    }
}

/// Comment resource service shared by all handlers
#[derive(Clone)]
pub struct CommentInterface {
    store: Arc<dyn CommentStore>,
    privacy: Arc<PrivacyRegistry>,
    resource: Arc<ResourceDefinition>,
}

impl CommentInterface {
    /// `items_per_page` overrides the page size declared on the comment resource
    pub fn new(store: Arc<dyn CommentStore>, privacy: Arc<PrivacyRegistry>, items_per_page: u32) -> Self {
        let mut resource = comment_resource();
        resource.items_per_page = items_per_page.max(1);
        Self {
            store,
            privacy,
            resource: Arc::new(resource),
        }
    }

    pub fn store(&self) -> &Arc<dyn CommentStore> {
        &self.store
    }

    pub fn resource(&self) -> &ResourceDefinition {
        &self.resource
    }

    async fn authorize(
        &self,
        viewer: &ViewerContext,
        operation: PrivacyOperation,
        owner: Option<UserId>,
    ) -> AppResult<()> {
        let ctx = PrivacyContext::new(viewer, Comment::entity_type(), operation).with_owner(owner);
        self.privacy.enforce(&ctx).await
    }

    async fn load(&self, id: CommentId) -> AppResult<Comment> {
        self.store
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    pub async fn list_comments(
        &self,
        viewer: &ViewerContext,
        params: ListCommentsQuery,
    ) -> AppResult<Page<CommentView>> {
        self.authorize(viewer, PrivacyOperation::Query, None).await?;

        let page = params.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest("Page should not be less than 1".to_string()));
        }

        let mut query = CommentQuery::new(page, self.resource.items_per_page);
        if let Some(post) = params.post {
            query = query.for_post(post);
        }

        let page = self.store.list_comments(&query).await?;
        Ok(page.map(|comment| CommentView::from(&comment)))
    }

    pub async fn get_comment(&self, viewer: &ViewerContext, id: CommentId) -> AppResult<CommentView> {
        let comment = self.load(id).await?;
        self.authorize(viewer, PrivacyOperation::Read, comment.author()).await?;
        Ok(CommentView::from(&comment))
    }

    pub async fn create_comment(
        &self,
        viewer: &ViewerContext,
        request: CreateCommentRequest,
    ) -> AppResult<CommentView> {
        self.authorize(viewer, PrivacyOperation::Create, None).await?;
        let author = viewer
            .user_id
            .ok_or_else(|| AppError::Internal("authorized create without a user".to_string()))?;

        let mut comment = Comment::new();
        comment.set_author(author);
        if let Some(post) = request.post {
            comment.set_post(post);
        }
        if let Some(content) = request.content {
            comment.set_content(content);
        }

        validate(&comment)?;
        let saved = self.store.insert_comment(&comment).await?;
        Ok(CommentView::from(&saved))
    }

    pub async fn update_comment(
        &self,
        viewer: &ViewerContext,
        id: CommentId,
        request: UpdateCommentRequest,
    ) -> AppResult<CommentView> {
        let mut comment = self.load(id).await?;
        self.authorize(viewer, PrivacyOperation::Update, comment.author()).await?;

        if let Some(content) = request.content {
            comment.set_content(content);
        }
        if let Some(published_at) = request.published_at {
            comment.set_published_at(published_at);
        }

        validate(&comment)?;
        let saved = self.store.update_comment(&comment).await?;
        Ok(CommentView::from(&saved))
    }

    pub async fn delete_comment(&self, viewer: &ViewerContext, id: CommentId) -> AppResult<()> {
        let comment = self.load(id).await?;
        self.authorize(viewer, PrivacyOperation::Delete, comment.author()).await?;

        if !self.store.delete_comment(id).await? {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }
        Ok(())
    }
}

// HTTP Handlers

// Extractors are taken as `Result` so rejections render as `AppError`

pub async fn list_comments_handler(
    State(comments): State<CommentInterface>,
    vc: Vc,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> AppResult<Json<Page<CommentView>>> {
    let Query(params) = params?;
    let query = ListCommentsQuery::from_params(&params, comments.resource())?;
    Ok(Json(comments.list_comments(&vc, query).await?))
}

pub async fn get_comment_handler(
    State(comments): State<CommentInterface>,
    vc: Vc,
    id: Result<AxumPath<CommentId>, PathRejection>,
) -> AppResult<Json<CommentView>> {
    let AxumPath(id) = id?;
    Ok(Json(comments.get_comment(&vc, id).await?))
}

pub async fn create_comment_handler(
    State(comments): State<CommentInterface>,
    vc: Vc,
    request: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = request?;
    let view = comments.create_comment(&vc, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_comment_handler(
    State(comments): State<CommentInterface>,
    vc: Vc,
    id: Result<AxumPath<CommentId>, PathRejection>,
    request: Result<Json<UpdateCommentRequest>, JsonRejection>,
) -> AppResult<Json<CommentView>> {
    let AxumPath(id) = id?;
    let Json(request) = request?;
    Ok(Json(comments.update_comment(&vc, id, request).await?))
}

pub async fn delete_comment_handler(
    State(comments): State<CommentInterface>,
    vc: Vc,
    id: Result<AxumPath<CommentId>, PathRejection>,
) -> AppResult<StatusCode> {
    let AxumPath(id) = id?;
    comments.delete_comment(&vc, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "resource": EntityType::Comment }))
}

/// Comment routes, relative to the API prefix
pub fn create_comment_router(comments: CommentInterface) -> Router {
    Router::new()
        .route(
            "/comments",
            get(list_comments_handler).post(create_comment_handler),
        )
        .route(
            "/comments/{id}",
            get(get_comment_handler)
                .put(update_comment_handler)
                .delete(delete_comment_handler),
        )
        .with_state(comments)
}

/// Full API: `/api/comments...` plus `/api/health`, with viewer resolution
pub fn create_api_router(comments: CommentInterface) -> Router {
    let api = create_comment_router(comments).route("/health", get(health_handler));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(viewer_context_middleware))
}
