// ViewerContext Middleware - builds the request viewer from gateway identity headers
// Authentication happens upstream; this layer only trusts what the gateway forwards

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use std::sync::Arc;

use crate::{
    core::UserId,
    error::{AppError, AppResult},
    infrastructure::viewer::ViewerContext,
};

/// Authenticated user id, set by the gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Comma-separated role names
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// `remember_me` marks a session restored from a cookie
pub const AUTH_METHOD_HEADER: &str = "x-auth-method";

/// Authentication information extracted from request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthInfo {
    pub user_id: Option<UserId>,
    pub roles: Vec<String>,
    pub remembered: bool,
}

/// Middleware that injects an `Arc<ViewerContext>` into request extensions
pub async fn viewer_context_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_info = extract_auth_from_request(request.headers())?;
    let viewer_context = create_viewer_context(auth_info);

    tracing::debug!(
        request_id = %viewer_context.request_id,
        user_id = ?viewer_context.user_id,
        "viewer resolved"
    );

    request.extensions_mut().insert(viewer_context);
    Ok(next.run(request).await)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::BadRequest(format!("Header {} is not valid ASCII", name)))
        })
        .transpose()
}

/// Extract authentication information from request headers
pub fn extract_auth_from_request(headers: &HeaderMap) -> AppResult<AuthInfo> {
    let Some(raw_id) = header_str(headers, USER_ID_HEADER)? else {
        return Ok(AuthInfo {
            user_id: None,
            roles: Vec::new(),
            remembered: false,
        });
    };

    let user_id = raw_id
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(UserId::new)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {} header: {}", USER_ID_HEADER, raw_id)))?;

    let roles = header_str(headers, USER_ROLES_HEADER)?
        .map(|roles| {
            roles
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let remembered = header_str(headers, AUTH_METHOD_HEADER)?
        .is_some_and(|method| method.trim().eq_ignore_ascii_case("remember_me"));

    Ok(AuthInfo {
        user_id: Some(user_id),
        roles,
        remembered,
    })
}

/// Create appropriate ViewerContext based on authentication info
pub fn create_viewer_context(auth_info: AuthInfo) -> Arc<ViewerContext> {
    let viewer_context = match (auth_info.user_id, auth_info.remembered) {
        (Some(user_id), false) => ViewerContext::authenticated_user(user_id, auth_info.roles),
        (Some(user_id), true) => ViewerContext::remembered_user(user_id, auth_info.roles),
        (None, _) => ViewerContext::anonymous(),
    };

    Arc::new(viewer_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_auth_user() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("42"));
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("ROLE_USER, ROLE_ADMIN,"));

        let auth_info = extract_auth_from_request(&headers).unwrap();
        assert_eq!(auth_info.user_id, Some(UserId::new(42)));
        assert_eq!(auth_info.roles, vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()]);
        assert!(!auth_info.remembered);

        let viewer = create_viewer_context(auth_info);
        assert!(viewer.is_authenticated_fully());
    }

    #[test]
    fn test_extract_auth_remembered() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("7"));
        headers.insert(AUTH_METHOD_HEADER, HeaderValue::from_static("remember_me"));

        let viewer = create_viewer_context(extract_auth_from_request(&headers).unwrap());
        assert!(viewer.is_authenticated());
        assert!(!viewer.is_authenticated_fully());
    }

    #[test]
    fn test_extract_auth_anonymous() {
        let auth_info = extract_auth_from_request(&HeaderMap::new()).unwrap();
        assert_eq!(auth_info.user_id, None);
        assert!(!create_viewer_context(auth_info).is_authenticated());
    }

    #[test]
    fn test_extract_auth_rejects_bad_id() {
        for raw in ["abc", "0", "-3"] {
            let mut headers = HeaderMap::new();
            headers.insert(USER_ID_HEADER, HeaderValue::from_static(raw));
            let err = extract_auth_from_request(&headers).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }
}
