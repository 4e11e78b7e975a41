//! Feed likes: prediction, rollback, and cross-view consistency.

use pawcache::{
    CacheStore, ClientError, FeedCardView, FeedService, LikeButton, MutationError, Outcome,
    ResourceKey, Surface,
};
use serde_json::json;

use crate::support::{controller, ScriptedClient};

fn like_state(store: &impl CacheStore, key: &ResourceKey) -> (u64, bool) {
    let item = FeedCardView::observe(store, key, "f1").snapshot().unwrap();
    (item.like_count, item.is_liked)
}

#[tokio::test]
async fn like_is_visible_before_the_server_answers() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));

    let gate = client.gate();
    let service = FeedService::new(controller.clone());
    let task = tokio::spawn(async move { service.like("f1", "u1").await });

    client.started().await;
    let card = FeedCardView::observe(controller.store(), &detail, "f1");
    assert_eq!(
        card.like_button(controller.is_pending("feed:f1")),
        Some(LikeButton {
            liked: true,
            count: 42,
            disabled: true
        })
    );

    gate.send(Ok(json!({}))).unwrap();
    let settled = task.await.unwrap().unwrap();
    assert_eq!(settled.outcome, Outcome::Confirmed);
    assert!(!controller.is_pending("feed:f1"));
    assert_eq!(like_state(controller.store(), &detail), (42, true));
}

#[tokio::test]
async fn failed_like_rolls_back_exactly() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));

    let gate = client.gate();
    let service = FeedService::new(controller.clone());
    let task = tokio::spawn(async move { service.like("f1", "u1").await });

    client.started().await;
    assert_eq!(like_state(controller.store(), &detail), (42, true));

    gate.send(Err(ClientError::Network("timeout".into()))).unwrap();
    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err, MutationError::Network("timeout".into()));
    assert_eq!(err.surface(), Surface::Toast);
    assert_eq!(like_state(controller.store(), &detail), (41, false));
}

#[tokio::test]
async fn like_on_liked_post_does_not_count_twice() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 42, "isLiked": true }));

    client.reply(Ok(json!({ "alreadyLiked": true, "likeCount": 42 })));
    let settled = FeedService::new(controller.clone())
        .like("f1", "u1")
        .await
        .unwrap();

    assert_eq!(settled.outcome, Outcome::AlreadyApplied);
    assert!(settled.touched.is_empty());
    assert_eq!(like_state(controller.store(), &detail), (42, true));
}

#[tokio::test]
async fn conflict_keeps_the_optimistic_state() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));

    client.reply(Err(ClientError::AlreadyInDesiredState("already liked".into())));
    let settled = FeedService::new(controller.clone())
        .like("f1", "u1")
        .await
        .unwrap();

    assert_eq!(settled.outcome, Outcome::AlreadyApplied);
    assert_eq!(settled.response, serde_json::Value::Null);
    assert_eq!(like_state(controller.store(), &detail), (42, true));
}

#[tokio::test]
async fn list_and_detail_move_together() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let store = controller.store();
    let list = ResourceKey::feed_list("u1", None);
    let detail = ResourceKey::feed_detail("f1");
    store.write(
        &list,
        json!({ "items": [
            { "id": "f1", "likeCount": 41, "isLiked": false },
            { "id": "f2", "likeCount": 3, "isLiked": false }
        ] }),
    );
    store.write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));

    let gate = client.gate();
    let service = FeedService::new(controller.clone());
    let task = tokio::spawn(async move { service.like("f1", "u1").await });

    client.started().await;
    assert_eq!(like_state(store, &list), (42, true));
    assert_eq!(like_state(store, &detail), (42, true));

    gate.send(Err(ClientError::Network("offline".into()))).unwrap();
    task.await.unwrap().unwrap_err();
    assert_eq!(like_state(store, &list), (41, false));
    assert_eq!(like_state(store, &detail), (41, false));

    let untouched = store.read(&list).unwrap().value.unwrap();
    assert_eq!(untouched["items"][1]["likeCount"], 3);
}

#[tokio::test]
async fn server_count_replaces_the_prediction() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let store = controller.store();
    let list = ResourceKey::feed_list("u1", Some("following"));
    let detail = ResourceKey::feed_detail("f1");
    store.write(&list, json!([{ "id": "f1", "likeCount": 41, "isLiked": false }]));
    store.write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));

    client.reply(Ok(json!({ "liked": true, "likeCount": 57 })));
    let settled = FeedService::new(controller.clone())
        .like("f1", "u1")
        .await
        .unwrap();

    assert_eq!(settled.outcome, Outcome::Reconciled);
    assert_eq!(settled.touched.len(), 2);
    assert_eq!(like_state(store, &list), (57, true));
    assert_eq!(like_state(store, &detail), (57, true));
}

#[tokio::test]
async fn rollback_restores_the_state_before_its_own_write() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));
    let service = FeedService::new(controller.clone());

    client.reply(Ok(json!({})));
    service.like("f1", "u1").await.unwrap();
    assert_eq!(like_state(controller.store(), &detail), (42, true));

    client.reply(Err(ClientError::Network("offline".into())));
    service.unlike("f1", "u1").await.unwrap_err();
    assert_eq!(like_state(controller.store(), &detail), (42, true));
}

#[tokio::test]
async fn validation_errors_surface_inline() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 0, "isLiked": false }));

    client.reply(Err(ClientError::Validation {
        status: 403,
        message: "blocked by author".into(),
    }));
    let err = FeedService::new(controller.clone())
        .like("f1", "u1")
        .await
        .unwrap_err();

    assert_eq!(err.surface(), Surface::Inline);
    assert_eq!(err.to_string(), "blocked by author");
    assert_eq!(like_state(controller.store(), &detail), (0, false));
}

#[tokio::test]
async fn load_feed_list_caches_the_response() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let service = FeedService::new(controller.clone());

    client.reply(Ok(json!({ "items": [{ "id": "f1", "likeCount": 2 }] })));
    let items = service.load_feed_list("u1", Some(" nearby ")).await.unwrap();
    assert_eq!(items.len(), 1);

    let again = service.load_feed_list("u1", Some("nearby")).await.unwrap();
    assert_eq!(again, items);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/feeds?userId=u1&filter=nearby");
}

#[tokio::test]
async fn like_then_unlike_returns_to_the_start() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let detail = ResourceKey::feed_detail("f1");
    controller
        .store()
        .write(&detail, json!({ "id": "f1", "likeCount": 41, "isLiked": false }));
    let service = FeedService::new(controller.clone());

    client.reply(Ok(json!({})));
    client.reply(Ok(json!({})));
    service.like("f1", "u1").await.unwrap();
    service.unlike("f1", "u1").await.unwrap();
    assert_eq!(like_state(controller.store(), &detail), (41, false));
}

#[tokio::test]
async fn settled_cycles_leave_nothing_for_another_rollback() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let list = ResourceKey::feed_list("u1", None);
    controller.store().write(
        &list,
        json!([
            { "id": "f1", "likeCount": 41, "isLiked": false },
            { "id": "f2", "likeCount": 7, "isLiked": false }
        ]),
    );
    let service = FeedService::new(controller.clone());

    for _ in 0..2 {
        client.reply(Ok(json!({})));
        client.reply(Ok(json!({})));
        service.like("f1", "u1").await.unwrap();
        service.unlike("f1", "u1").await.unwrap();
    }
    client.reply(Ok(json!({})));
    service.like("f1", "u1").await.unwrap();

    client.reply(Err(ClientError::Network("offline".into())));
    service.like("f2", "u1").await.unwrap_err();

    let f1 = FeedCardView::observe(controller.store(), &list, "f1").snapshot().unwrap();
    let f2 = FeedCardView::observe(controller.store(), &list, "f2").snapshot().unwrap();
    assert_eq!((f1.like_count, f1.is_liked), (42, true));
    assert_eq!((f2.like_count, f2.is_liked), (7, false));
}

#[tokio::test]
async fn like_leaves_nested_objects_with_the_same_id_alone() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let list = ResourceKey::feed_list("u1", None);
    controller.store().write(
        &list,
        json!([
            { "id": 1, "likeCount": 0, "isLiked": false, "commentCount": 0 },
            { "id": 2, "likeCount": 5, "author": { "id": 1, "nickname": "mochi_mom" } }
        ]),
    );
    let service = FeedService::new(controller.clone());

    client.reply(Ok(json!({})));
    service.like("1", "u1").await.unwrap();
    client.reply(Ok(json!({ "id": "c1", "feedId": "1", "userId": "u1", "content": "hi" })));
    service.comment("1", "u1", "hi").await.unwrap();

    let value = controller.store().read(&list).unwrap().value.unwrap();
    assert_eq!(value[0]["likeCount"], 1);
    assert_eq!(value[0]["isLiked"], true);
    assert_eq!(value[0]["commentCount"], 1);
    assert_eq!(value[1]["author"], json!({ "id": 1, "nickname": "mochi_mom" }));
}
