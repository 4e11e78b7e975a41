//! Pet-mate likes, matches, and match requests.

use std::time::Duration;

use pawcache::{
    CacheStore, CandidateView, Change, ClientError, EdgeState, MutationError, PetmateService,
    ResourceKey,
};
use serde_json::json;

use crate::support::{controller, ScriptedClient};

fn seed_deck(store: &impl CacheStore) {
    store.write(
        &ResourceKey::petmate_candidates("u1"),
        json!([
            { "userId": "u2", "petName": "Mochi", "isLiked": false, "isMatched": false },
            { "userId": "u3", "petName": "Bori", "isLiked": false, "isMatched": false }
        ]),
    );
}

#[tokio::test]
async fn match_is_only_shown_after_the_server_confirms() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    seed_deck(controller.store());
    let deck = ResourceKey::petmate_candidates("u1");

    let gate = client.gate();
    let petmate = PetmateService::new(controller.clone());
    let task = tokio::spawn(async move { petmate.like("u1", "u2").await });

    client.started().await;
    let view = CandidateView::observe(controller.store(), &deck, "u2");
    let candidate = view.snapshot().unwrap();
    assert!(candidate.is_liked);
    assert!(!candidate.is_matched);
    assert!(view.match_banner().is_none());
    let service = PetmateService::new(controller.clone());
    assert_eq!(service.edge_state("u1", "u2"), Some(EdgeState::Provisional));

    gate.send(Ok(json!({ "isMatched": true, "alreadyLiked": false, "chatRoomId": "room-9" })))
        .unwrap();
    let outcome = task.await.unwrap().unwrap();
    assert!(outcome.is_matched);
    assert_eq!(outcome.chat_room_id.as_deref(), Some("room-9"));

    let banner = view.match_banner().unwrap();
    assert_eq!(banner.pet_name, "Mochi");
    assert_eq!(banner.chat_room_id.as_deref(), Some("room-9"));
    assert_eq!(service.edge_state("u1", "u2"), Some(EdgeState::Matched));
}

#[tokio::test]
async fn one_sided_like_never_matches() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    seed_deck(controller.store());
    let service = PetmateService::new(controller.clone());

    client.reply(Ok(json!({ "isMatched": false, "alreadyLiked": false })));
    let outcome = service.like("u1", "u3").await.unwrap();
    assert!(!outcome.is_matched);
    assert_eq!(service.edge_state("u1", "u3"), Some(EdgeState::Liked));

    let deck = ResourceKey::petmate_candidates("u1");
    assert!(CandidateView::observe(controller.store(), &deck, "u3")
        .match_banner()
        .is_none());
}

#[tokio::test]
async fn failed_pet_like_rolls_back() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    seed_deck(controller.store());
    let service = PetmateService::new(controller.clone());

    client.reply(Err(ClientError::Network("offline".into())));
    service.like("u1", "u2").await.unwrap_err();
    assert_eq!(service.edge_state("u1", "u2"), Some(EdgeState::Unliked));
}

#[tokio::test]
async fn already_liked_pet_is_not_an_error() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    seed_deck(controller.store());
    let service = PetmateService::new(controller.clone());

    client.reply(Ok(json!({ "isMatched": false, "alreadyLiked": true })));
    let outcome = service.like("u1", "u2").await.unwrap();
    assert!(outcome.already_liked);
    assert_eq!(service.edge_state("u1", "u2"), Some(EdgeState::Liked));
}

#[tokio::test]
async fn refused_unlike_restores_the_like() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    seed_deck(controller.store());
    let service = PetmateService::new(controller.clone());

    client.reply(Ok(json!({ "isMatched": false })));
    service.like("u1", "u2").await.unwrap();

    client.reply(Ok(json!(false)));
    let err = service.unlike("u1", "u2").await.unwrap_err();
    assert!(matches!(err, MutationError::Rejected(_)));
    assert_eq!(service.edge_state("u1", "u2"), Some(EdgeState::Liked));
}

#[tokio::test]
async fn accepting_a_request_refreshes_observed_matches() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let service = PetmateService::new(controller.clone());
    let requests = ResourceKey::petmate_requests("u1");
    let matches = ResourceKey::petmate_matches("u1");

    controller.store().write(
        &requests,
        json!([
            { "matchId": "m1", "fromUserId": "u2", "petName": "Mochi" },
            { "matchId": "m2", "fromUserId": "u3", "petName": "Bori" }
        ]),
    );
    client.reply(Ok(json!([])));
    assert!(service.load_matches("u1").await.unwrap().is_empty());

    let mut observer = controller.store().observe(&matches);
    client.reply(Ok(json!({ "matchId": "m1", "status": "ACCEPTED" })));
    client.reply(Ok(json!([{ "userId": "u2", "petName": "Mochi", "isMatched": true }])));
    service.respond("m1", "u1", true).await.unwrap();

    let remaining = controller.store().read(&requests).unwrap();
    assert!(remaining.stale);
    let remaining = remaining.value.unwrap();
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_eq!(remaining[0]["matchId"], "m2");

    tokio::time::timeout(Duration::from_secs(1), async {
        while let Some(event) = observer.changed().await {
            if event.change == Change::Written {
                break;
            }
        }
    })
    .await
    .unwrap();
    let refreshed = service.load_matches("u1").await.unwrap();
    assert_eq!(refreshed.len(), 1);
    assert!(refreshed[0].is_matched);
}

#[tokio::test]
async fn failed_response_keeps_the_request() {
    let client = ScriptedClient::new();
    let controller = controller(&client);
    let service = PetmateService::new(controller.clone());
    let requests = ResourceKey::petmate_requests("u1");
    controller.store().write(
        &requests,
        json!([
            { "matchId": "m1", "fromUserId": "u2", "petName": "Mochi" },
            { "matchId": "m2", "fromUserId": "u3", "petName": "Bori" }
        ]),
    );

    client.reply(Err(ClientError::Network("offline".into())));
    service.respond("m1", "u1", false).await.unwrap_err();

    let all = service.load_requests("u1").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].match_id, "m1");
}
