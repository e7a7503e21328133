// ViewerContext Extractor - hands the request viewer to handlers

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::{error::AppError, infrastructure::viewer::ViewerContext};

/// Cheap-to-clone handle on the request's `ViewerContext`
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

// Access ViewerContext fields directly: vc.user_id, vc.is_authenticated_fully()
impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or_else(|| AppError::Internal("viewer context middleware not installed".to_string()))
    }
}
