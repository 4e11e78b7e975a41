//! HTTP transport end to end.
//!
//! Starts an axum fake backend and drives it through `HttpClient`.

use std::sync::{Arc, RwLock};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pawcache::{
    ClientConfig, FeedService, HttpClient, MutationController, MutationError, Outcome,
    PetmateService, QueryClient, Session, Surface,
};
use serde_json::{json, Value};

use crate::support::init_tracing;

const TOKEN: &str = "tok-1";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn feed(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "likeCount": 41, "isLiked": false }))
}

async fn like(headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "login required" })))
            .into_response();
    }
    match id.as_str() {
        "f409" => (StatusCode::CONFLICT, Json(json!({ "message": "already liked" }))).into_response(),
        "f422" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "post is archived" })),
        )
            .into_response(),
        "f500" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response(),
        _ => Json(json!({ "liked": true, "likeCount": 57, "userId": body["userId"] })).into_response(),
    }
}

async fn unlike_pet() -> Json<Value> {
    Json(Value::Bool(false))
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/api/feeds/:id", get(feed))
        .route("/api/feeds/:id/like", post(like))
        .route("/api/petmate/like", delete(unlike_pet));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn controller(base_url: String, logged_in: bool) -> MutationController<HttpClient> {
    init_tracing();
    let mut session = Session::new();
    if logged_in {
        session.login("u1", TOKEN);
    }
    let config = ClientConfig {
        base_url,
        ..ClientConfig::default()
    };
    let client = HttpClient::new(&config, Arc::new(RwLock::new(session))).unwrap();
    MutationController::new(QueryClient::new(client))
}

#[tokio::test]
async fn like_reconciles_with_server_count() {
    let controller = controller(start_server().await, true);
    let feeds = FeedService::new(controller.clone());

    let post = feeds.load_feed("f1").await.unwrap();
    assert_eq!(post.like_count, 41);

    let settled = feeds.like("f1", "u1").await.unwrap();
    assert_eq!(settled.outcome, Outcome::Reconciled);
    assert_eq!(settled.response["userId"], "u1");

    let post = feeds.load_feed("f1").await.unwrap();
    assert_eq!((post.like_count, post.is_liked), (57, true));
}

#[tokio::test]
async fn conflict_settles_as_already_applied() {
    let controller = controller(start_server().await, true);
    let feeds = FeedService::new(controller.clone());
    feeds.load_feed("f409").await.unwrap();

    let settled = feeds.like("f409", "u1").await.unwrap();
    assert_eq!(settled.outcome, Outcome::AlreadyApplied);

    let post = feeds.load_feed("f409").await.unwrap();
    assert_eq!((post.like_count, post.is_liked), (42, true));
}

#[tokio::test]
async fn client_error_rolls_back_and_shows_inline() {
    let controller = controller(start_server().await, true);
    let feeds = FeedService::new(controller.clone());
    feeds.load_feed("f422").await.unwrap();

    let err = feeds.like("f422", "u1").await.unwrap_err();
    assert_eq!(
        err,
        MutationError::Validation {
            status: 422,
            message: "post is archived".into()
        }
    );
    assert_eq!(err.surface(), Surface::Inline);

    let post = feeds.load_feed("f422").await.unwrap();
    assert_eq!((post.like_count, post.is_liked), (41, false));
}

#[tokio::test]
async fn server_error_is_a_network_failure() {
    let controller = controller(start_server().await, true);
    let feeds = FeedService::new(controller.clone());
    feeds.load_feed("f500").await.unwrap();

    let err = feeds.like("f500", "u1").await.unwrap_err();
    assert_eq!(err, MutationError::Network("upstream down".into()));
    assert_eq!(err.surface(), Surface::Toast);
}

#[tokio::test]
async fn missing_token_is_rejected_by_the_server() {
    let controller = controller(start_server().await, false);
    let feeds = FeedService::new(controller.clone());
    feeds.load_feed("f1").await.unwrap();

    let err = feeds.like("f1", "u1").await.unwrap_err();
    assert!(matches!(err, MutationError::Validation { status: 401, .. }));
}

#[tokio::test]
async fn false_body_fails_the_unlike() {
    let controller = controller(start_server().await, true);
    let petmate = PetmateService::new(controller);

    let err = petmate.unlike("u1", "u2").await.unwrap_err();
    assert!(matches!(err, MutationError::Rejected(_)));
}
