use bson::oid::ObjectId;
use chrono::Utc;
use validator::{Validate, ValidationErrors};

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    dto::{CreatedNote, NoteRequest, NoteResponse},
    models::{NewNote, NoteChanges},
    repository::{NoteStore, RepositoryError},
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Note with specified ID not found!")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    #[error("database operation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    timeout: Duration,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Runs a store call under the per-request deadline. Expiry drops the call.
    async fn with_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                tracing::warn!("store call exceeded {:?}, abandoning it", self.timeout);
                Err(ServiceError::Timeout(self.timeout))
            }
        }
    }

    pub async fn create_note(&self, request: NoteRequest) -> Result<CreatedNote, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let note = NewNote {
            title: request.title,
            content: request.content,
            created_at: now,
            updated_at: now,
        };

        let id = self.with_deadline(self.store.insert(note)).await?;
        tracing::info!("Created note {}", id);

        Ok(CreatedNote {
            inserted_id: id.to_hex(),
        })
    }

    pub async fn get_one_note(&self, id: &str) -> Result<NoteResponse, ServiceError> {
        let id = parse_id(id)?;

        self.with_deadline(self.store.find_by_id(id))
            .await?
            .map(NoteResponse::from)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = self.with_deadline(self.store.find_all()).await?;

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    pub async fn update_note(
        &self,
        id: &str,
        request: NoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        request.validate()?;
        let id = parse_id(id)?;

        let changes = NoteChanges {
            title: request.title,
            content: request.content,
            updated_at: Utc::now(),
        };

        let matched = self
            .with_deadline(self.store.update_by_id(id, changes))
            .await?;
        if matched == 0 {
            return Err(ServiceError::NotFound);
        }

        tracing::info!("Updated note {}", id);

        // A concurrent delete may remove the note between the two calls
        self.with_deadline(self.store.find_by_id(id))
            .await?
            .map(NoteResponse::from)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;

        let deleted = self.with_deadline(self.store.delete_by_id(id)).await?;
        if deleted == 0 {
            return Err(ServiceError::NotFound);
        }

        tracing::info!("Deleted note {}", id);

        Ok(())
    }
}

/// An id that is not a valid `ObjectId` cannot name a stored note.
fn parse_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|e| {
        tracing::debug!("rejecting note id '{}': {}", id, e);
        ServiceError::NotFound
    })
}
