use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use blog_comments::{
    app_state::AppState,
    comment_interface::create_api_router,
    config::Config,
    core::{PostId, UserId},
    entities::{Post, User, ROLE_ADMIN},
    infrastructure::{CommentStore, SqliteDatabase},
};

struct TestApp {
    router: Router,
    author: UserId,
    other: UserId,
    admin: UserId,
    post: PostId,
    other_post: PostId,
}

async fn test_app() -> TestApp {
    let db = SqliteDatabase::new_in_memory().await.unwrap();
    let author = db.insert_user(&User::new("john_user", "John Doe")).await.unwrap().id.unwrap();
    let other = db.insert_user(&User::new("tom_user", "Tom Doe")).await.unwrap().id.unwrap();
    let admin = db
        .insert_user(&User::new("jane_admin", "Jane Doe").with_role(ROLE_ADMIN))
        .await
        .unwrap()
        .id
        .unwrap();
    let post = db.insert_post(&Post::new("First post", admin)).await.unwrap().id.unwrap();
    let other_post = db.insert_post(&Post::new("Second post", admin)).await.unwrap().id.unwrap();

    let store: Arc<dyn CommentStore> = Arc::new(db);
    let state = AppState::with_store(store, Config::default());

    TestApp {
        router: create_api_router(state.comments.clone()),
        author,
        other,
        admin,
        post,
        other_post,
    }
}

fn request(method: &str, uri: &str, user: Option<(UserId, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, roles)) = user {
        builder = builder
            .header("x-user-id", id.to_string())
            .header("x-user-roles", roles);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(app: &TestApp, user: UserId, post: PostId, content: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            "/api/comments",
            Some((user, "ROLE_USER")),
            Some(json!({ "content": content, "post": post })),
        ),
    )
    .await
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = test_app().await;

    let (status, created) = create(&app, app.author, app.post, "Great post!").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["content"], "Great post!");
    assert_eq!(created["author"], app.author.value());
    assert_eq!(created["post"], app.post.value());
    assert!(created["publishedAt"].is_string());

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, request("GET", &format!("/api/comments/{}", id), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/comments",
            None,
            Some(json!({ "content": "Great post!", "post": app.post })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_remember_me_session_cannot_create() {
    let app = test_app().await;
    let mut req = request(
        "POST",
        "/api/comments",
        Some((app.author, "ROLE_USER")),
        Some(json!({ "content": "Great post!", "post": app.post })),
    );
    req.headers_mut()
        .insert("x-auth-method", "remember_me".parse().unwrap());

    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_errors_are_structured() {
    let app = test_app().await;

    let (status, body) = create(&app, app.author, app.post, "Hi").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["propertyPath"], "content");
    assert_eq!(body["violations"][0]["messageKey"], "comment.too_short");

    let (status, body) = create(&app, app.author, app.post, "contact me at foo@bar.com please").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["messageKey"], "comment.is_spam");
    assert_eq!(body["violations"][0]["propertyPath"], "");

    let (status, body) = create(&app, app.author, app.post, &"a".repeat(10_001)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["messageKey"], "comment.too_long");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/comments",
            Some((app.author, "ROLE_USER")),
            Some(json!({ "post": app.post })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["messageKey"], "comment.blank");
}

#[tokio::test]
async fn test_unknown_post_is_not_found() {
    let app = test_app().await;
    let (status, _) = create(&app, app.author, PostId::new(999), "Great post!").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_permissions() {
    let app = test_app().await;
    let (_, created) = create(&app, app.author, app.post, "Original text").await;
    let uri = format!("/api/comments/{}", created["id"]);

    let edit = json!({ "content": "Rewritten text" });

    let (status, _) = send(&app, request("PUT", &uri, None, Some(edit.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request("PUT", &uri, Some((app.other, "ROLE_USER")), Some(edit.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("PUT", &uri, Some((app.author, "ROLE_USER")), Some(edit))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Rewritten text");
    assert_eq!(body["id"], created["id"]);

    let (status, _) = send(&app, request("DELETE", &uri, Some((app.other, "ROLE_USER")), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request("DELETE", &uri, Some((app.admin, "ROLE_USER,ROLE_ADMIN")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_published_at() {
    let app = test_app().await;
    let (_, created) = create(&app, app.author, app.post, "Dated comment").await;
    let uri = format!("/api/comments/{}", created["id"]);

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &uri,
            Some((app.author, "ROLE_USER")),
            Some(json!({ "publishedAt": "2020-01-02T03:04:05Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["publishedAt"], "2020-01-02T03:04:05Z");
    assert_eq!(body["content"], "Dated comment");
}

#[tokio::test]
async fn test_list_is_paginated_sorted_and_filterable() {
    let app = test_app().await;
    for (post, content) in [
        (app.post, "Oldest comment"),
        (app.other_post, "Elsewhere comment"),
        (app.post, "Middle comment"),
        (app.post, "Newest comment"),
    ] {
        let (status, _) = create(&app, app.author, post, content).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, request("GET", "/api/comments", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 4);
    assert_eq!(body["itemsPerPage"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["content"], "Newest comment");
    assert_eq!(body["items"][1]["content"], "Middle comment");

    let uri = format!("/api/comments?post={}&page=2", app.post);
    let (status, body) = send(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["content"], "Oldest comment");

    let (status, _) = send(&app, request("GET", "/api/comments?page=0", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_user_header_is_bad_request() {
    let app = test_app().await;
    let mut req = request("GET", "/api/comments", None, None);
    req.headers_mut().insert("x-user-id", "not-a-number".parse().unwrap());

    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(&app, request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_malformed_requests_keep_the_error_shape() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/comments",
            Some((app.author, "ROLE_USER")),
            Some(json!({ "content": 12345, "post": app.post })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());

    for uri in [
        "/api/comments?page=-1",
        "/api/comments?author=1",
        "/api/comments/not-a-number",
    ] {
        let (status, body) = send(&app, request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], 400, "{}", uri);
    }
}
