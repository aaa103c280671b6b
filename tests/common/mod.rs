#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use bson::oid::ObjectId;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use std::{collections::HashMap, sync::Arc, time::Duration};

use notes_api::{
    build_router,
    models::{NewNote, Note, NoteChanges},
    repository::{NoteStore, RepositoryError},
    service::NoteService,
};

/// `NoteStore` kept in a map. It can be slowed down to trip the deadline
/// or made to fail every call with a driver error.
#[derive(Default)]
pub struct MemoryStore {
    notes: Mutex<HashMap<ObjectId, Note>>,
    delay: Option<Duration>,
    failing: bool,
}

impl MemoryStore {
    pub fn slow(delay: Duration) -> Self {
        Self {
            notes: Mutex::default(),
            delay: Some(delay),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn get(&self, id: &str) -> Option<Note> {
        let id = ObjectId::parse_str(id).ok()?;
        self.notes.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.notes.lock().await.len()
    }

    async fn pause(&self) -> Result<(), RepositoryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(RepositoryError::Database(mongodb::error::Error::custom(
                "connection refused",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert(&self, note: NewNote) -> Result<ObjectId, RepositoryError> {
        self.pause().await?;
        let id = ObjectId::new();
        self.notes.lock().await.insert(id, note.with_id(id));
        Ok(id)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Note>, RepositoryError> {
        self.pause().await?;
        Ok(self.notes.lock().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Note>, RepositoryError> {
        self.pause().await?;
        Ok(self.notes.lock().await.values().cloned().collect())
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: NoteChanges,
    ) -> Result<u64, RepositoryError> {
        self.pause().await?;
        match self.notes.lock().await.get_mut(&id) {
            Some(note) => {
                note.apply(changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<u64, RepositoryError> {
        self.pause().await?;
        Ok(u64::from(self.notes.lock().await.remove(&id).is_some()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::default(), Duration::from_secs(10))
    }

    pub fn with_store(store: MemoryStore, timeout: Duration) -> Self {
        let store = Arc::new(store);
        let service = NoteService::new(store.clone(), timeout);

        Self {
            router: build_router(Arc::new(service)),
            store,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|v| v.to_string());
        self.send_raw(method, uri, body.as_deref()).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Creates a note and returns its id.
    pub async fn create(&self, title: &str, content: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/note",
                Some(serde_json::json!({ "title": title, "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");

        body["data"]["data"]["insertedId"]
            .as_str()
            .unwrap()
            .to_string()
    }
}
