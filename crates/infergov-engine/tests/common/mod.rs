// Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use infergov_core::binding::{StaticSnapshotResolver, StaticWorkOrderResolver};
use infergov_core::invoker::{
    ProviderCall, ProviderFailure, ProviderFailureKind, ProviderInvoker, ProviderOutput,
};
use infergov_core::model::TokenUsage;
use infergov_core::policy::PolicyMatrix;
use infergov_engine::Pipeline;
use infergov_store::ArtifactStore;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const SNAPSHOT_ID: &str = "snap-1";
pub const WORK_ORDER_ID: &str = "wo-1";
pub const USER_INPUT: &str = "Summarize the quarterly incident notes for the platform team.";

pub fn snapshot_hash() -> String {
    "a".repeat(64)
}

pub fn candidate() -> Value {
    json!({
        "created_at_utc": "2026-01-15T10:00:00Z",
        "work_order_id": WORK_ORDER_ID,
        "snapshot_hash": snapshot_hash(),
        "snapshot_artifact_id": SNAPSHOT_ID,
        "provider": "openai",
        "model": "gpt-4.1-mini",
        "temperature": 0.2,
        "max_output_tokens": 800,
        "system_prompt": null,
        "user_input": USER_INPUT,
        "input_artifact_ids": ["bundle-1"]
    })
}

pub fn with(field: &str, value: Value) -> Value {
    let mut c = candidate();
    c[field] = value;
    c
}

/// What the fake provider does on every call
#[derive(Clone)]
pub enum Behaviour {
    Reply(String),
    Fail(ProviderFailureKind, String),
    Hang,
}

/// Provider double that counts calls and records the last call
pub struct FakeInvoker {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last: Mutex<Option<ProviderCall>>,
}

impl FakeInvoker {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behaviour::Reply(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<ProviderCall> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderInvoker for FakeInvoker {
    async fn call(&self, call: ProviderCall) -> Result<ProviderOutput, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(call);
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(ProviderOutput {
                text: text.clone(),
                usage: Some(TokenUsage {
                    input_tokens: 42,
                    output_tokens: 7,
                }),
            }),
            Behaviour::Fail(kind, message) => Err(ProviderFailure::new(*kind, message.clone())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ProviderFailure::new(ProviderFailureKind::Error, "woke up"))
            }
        }
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub pipeline: Pipeline,
    pub invoker: Arc<FakeInvoker>,
}

impl Harness {
    pub fn store(&self) -> &ArtifactStore {
        self.pipeline.store()
    }
}

pub fn harness(invoker: Arc<FakeInvoker>) -> Harness {
    harness_with_policy(invoker, PolicyMatrix::baseline())
}

pub fn harness_with_policy(invoker: Arc<FakeInvoker>, policy: PolicyMatrix) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(dir.path().join("store")).unwrap();
    let snapshots = StaticSnapshotResolver::new().with_snapshot(SNAPSHOT_ID, snapshot_hash());
    let work_orders = StaticWorkOrderResolver::new().with_work_order(WORK_ORDER_ID, snapshot_hash());
    let pipeline = Pipeline::new(
        Arc::new(store),
        Arc::new(policy),
        Arc::new(snapshots),
        Arc::new(work_orders),
        invoker.clone(),
    );
    Harness {
        dir,
        pipeline,
        invoker,
    }
}

/// A second pipeline over the harness's store root with its own resolvers
pub fn pipeline_with_resolvers(
    h: &Harness,
    snapshots: StaticSnapshotResolver,
    work_orders: StaticWorkOrderResolver,
) -> Pipeline {
    let store = ArtifactStore::open(h.dir.path().join("store")).unwrap();
    Pipeline::new(
        Arc::new(store),
        Arc::new(PolicyMatrix::baseline()),
        Arc::new(snapshots),
        Arc::new(work_orders),
        h.invoker.clone(),
    )
}
