use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::{
    config::DatabaseConfig,
    models::{NewNote, Note, NoteChanges},
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// Access to the notes collection.
///
/// Every lookup is keyed by the store's primary key (`_id`).
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Inserts the note and returns the id assigned to it.
    async fn insert(&self, note: NewNote) -> Result<ObjectId, RepositoryError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Note>, RepositoryError>;

    /// Order is whatever the store returns.
    async fn find_all(&self) -> Result<Vec<Note>, RepositoryError>;

    /// Replaces title, content and `updatedAt`. Returns the matched count.
    async fn update_by_id(&self, id: ObjectId, changes: NoteChanges)
    -> Result<u64, RepositoryError>;

    /// Returns the deleted count.
    async fn delete_by_id(&self, id: ObjectId) -> Result<u64, RepositoryError>;
}

/// Filter matching a single note by its primary key.
fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

/// Update document touching only the mutable fields.
fn set_changes(changes: &NoteChanges) -> Document {
    doc! {
        "$set": {
            "title": changes.title.as_str(),
            "content": changes.content.as_str(),
            "updatedAt": bson::DateTime::from_chrono(changes.updated_at),
        }
    }
}

pub struct Repository {
    collection: Collection<Note>,
}

impl Repository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let database = client.database(&config.name);

        // The driver connects lazily, ping so a bad URI fails at startup
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(
            "Connected to MongoDB database '{}', collection '{}'",
            config.name,
            config.collection
        );

        Ok(Self {
            collection: database.collection(&config.collection),
        })
    }
}

#[async_trait]
impl NoteStore for Repository {
    async fn insert(&self, note: NewNote) -> Result<ObjectId, RepositoryError> {
        let id = ObjectId::new();
        self.collection.insert_one(note.with_id(id)).await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Note>, RepositoryError> {
        Ok(self.collection.find_one(by_id(id)).await?)
    }

    async fn find_all(&self) -> Result<Vec<Note>, RepositoryError> {
        let mut cursor = self.collection.find(doc! {}).await?;

        let mut notes: Vec<Note> = Vec::new();
        while cursor.advance().await? {
            notes.push(cursor.deserialize_current()?);
        }

        Ok(notes)
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: NoteChanges,
    ) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .update_one(by_id(id), set_changes(&changes))
            .await?;

        Ok(result.matched_count)
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<u64, RepositoryError> {
        let result = self.collection.delete_one(by_id(id)).await?;

        Ok(result.deleted_count)
    }
}
