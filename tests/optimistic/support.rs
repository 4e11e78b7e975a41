//! Test doubles: a scripted remote client whose replies can be held back
//! until the test has looked at the optimistic state.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use pawcache::{
    ApiRequest, ClientError, InMemoryCacheStore, MutationController, QueryClient, RemoteClient,
};
use serde_json::Value;
use tokio::sync::{oneshot, Notify};

type Reply = Result<Value, ClientError>;

enum Step {
    Now(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Answers calls in order from a script. Every call is recorded.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<ApiRequest>>,
    started: Notify,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue an immediate reply.
    pub fn reply(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(Step::Now(reply));
    }

    /// Queue a reply the test releases through the returned sender.
    pub fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    /// Wait until the next call has reached the client.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl RemoteClient for ScriptedClient {
    async fn call(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(request);
        let step = self.script.lock().unwrap().pop_front();
        self.started.notify_one();
        match step {
            Some(Step::Now(reply)) => reply,
            Some(Step::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Network("gate dropped".into()))),
            None => Err(ClientError::Network("unscripted call".into())),
        }
    }
}

pub fn controller(client: &Arc<ScriptedClient>) -> MutationController<ScriptedClient> {
    init_tracing();
    MutationController::new(QueryClient::from_parts(
        client.clone(),
        InMemoryCacheStore::new(),
    ))
}

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
