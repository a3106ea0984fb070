//! Note CRUD operations over the transport, plus the local cache fallback.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiClient, DataEnvelope};
use crate::error::ApiError;
use crate::models::{CreateNoteData, ListNotesParams, Note, NotesPage, UpdateNoteData};
use crate::notes_cache::NoteCache;

/// Note operations of the remote API.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// One page of the user's notes.
    async fn list(&self, params: &ListNotesParams) -> Result<NotesPage, ApiError>;
    /// A single note by id.
    async fn get(&self, id: &str) -> Result<Note, ApiError>;
    async fn create(&self, data: &CreateNoteData) -> Result<Note, ApiError>;
    async fn update(&self, id: &str, data: &UpdateNoteData) -> Result<Note, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    /// Delete several notes in one request (ids joined by comma).
    async fn delete_many(&self, ids: &[String]) -> Result<(), ApiError>;
    /// Flip the pinned flag server-side; returns the reconciled note.
    async fn toggle_pin(&self, id: &str) -> Result<Note, ApiError>;
    /// Every tag in use across the user's notes.
    async fn all_tags(&self) -> Result<Vec<String>, ApiError>;
    /// Notes matching a partial search query.
    async fn search_suggestions(&self, query: &str) -> Result<Vec<Note>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct NoteBody {
    note: Note,
}

#[derive(Debug, Deserialize)]
struct TagsBody {
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsBody {
    suggestions: Vec<Note>,
}

/// HTTP implementation of [`NotesApi`], carrying the per-identity cache.
pub struct NotesService {
    api: Arc<ApiClient>,
    cache: NoteCache,
}

impl NotesService {
    pub fn new(api: Arc<ApiClient>, cache: NoteCache) -> Self {
        Self { api, cache }
    }

    // The cache is an offline fallback, not part of the fetch path. Callers
    // refresh it after a successful list and read it when the remote is
    // unreachable.

    pub fn save_cached(&self, user_id: &str, notes: &[Note]) {
        if let Err(e) = self.cache.save(user_id, notes) {
            log::warn!("[NOTES] Failed to write note cache: {}", e);
        }
    }

    pub fn load_cached(&self, user_id: &str) -> Vec<Note> {
        self.cache.load(user_id)
    }

    pub fn clear_cached(&self, user_id: &str) {
        if let Err(e) = self.cache.clear(user_id) {
            log::warn!("[NOTES] Failed to clear note cache: {}", e);
        }
    }
}

#[async_trait]
impl NotesApi for NotesService {
    async fn list(&self, params: &ListNotesParams) -> Result<NotesPage, ApiError> {
        let mut query: Vec<(&str, String)> = vec![
            ("page", params.page.to_string()),
            ("limit", params.limit.to_string()),
        ];
        if let Some(ref search) = params.search {
            query.push(("search", search.clone()));
        }
        if let Some(ref tag) = params.tag {
            query.push(("tag", tag.clone()));
        }
        let body: DataEnvelope<NotesPage> = self.api.get("/notes", &query).await?;
        Ok(body.data)
    }

    async fn get(&self, id: &str) -> Result<Note, ApiError> {
        let body: DataEnvelope<NoteBody> = self.api.get(&format!("/notes/{}", id), &[]).await?;
        Ok(body.data.note)
    }

    async fn create(&self, data: &CreateNoteData) -> Result<Note, ApiError> {
        let body: DataEnvelope<NoteBody> = self.api.post("/notes", data).await?;
        Ok(body.data.note)
    }

    async fn update(&self, id: &str, data: &UpdateNoteData) -> Result<Note, ApiError> {
        let body: DataEnvelope<NoteBody> =
            self.api.put(&format!("/notes/{}", id), data).await?;
        Ok(body.data.note)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_unit(&format!("/notes/{}", id), &[]).await
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), ApiError> {
        self.api
            .delete_unit("/notes", &[("noteIds", ids.join(","))])
            .await
    }

    async fn toggle_pin(&self, id: &str) -> Result<Note, ApiError> {
        let body: DataEnvelope<NoteBody> =
            self.api.patch(&format!("/notes/{}/pin", id)).await?;
        Ok(body.data.note)
    }

    async fn all_tags(&self) -> Result<Vec<String>, ApiError> {
        let body: DataEnvelope<TagsBody> = self.api.get("/notes/tags/all", &[]).await?;
        Ok(body.data.tags)
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<Note>, ApiError> {
        let body: DataEnvelope<SuggestionsBody> = self
            .api
            .get("/notes/search/suggestions", &[("query", query.to_string())])
            .await?;
        Ok(body.data.suggestions)
    }
}
