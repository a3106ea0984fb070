//! Notes collection store.
//!
//! In-memory mirror of the remote note list for the current session. The
//! remote store is authoritative: every operation touches local state only
//! after the server confirms it, so the collection never holds speculative
//! entries and there is nothing to roll back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::api::NotesApi;
use crate::error::ApiError;
use crate::models::{CreateNoteData, ListNotesParams, Note, UpdateNoteData};

/// One instance per running client; owns the collection exclusively.
pub struct NotesStore {
    notes_api: Arc<dyn NotesApi>,
    notes: RwLock<Vec<Note>>,
    last_error: RwLock<Option<String>>,
    loading: AtomicBool,
}

impl NotesStore {
    pub fn new(notes_api: Arc<dyn NotesApi>) -> Self {
        Self {
            notes_api,
            notes: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// Replace the whole collection with the server's current default page.
    pub async fn fetch(&self) -> Result<Vec<Note>, ApiError> {
        self.loading.store(true, Ordering::SeqCst);
        self.clear_error().await;

        let result = self.notes_api.list(&ListNotesParams::default()).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(page) => {
                log::info!("[NOTES] Fetched {} notes", page.notes.len());
                let mut notes = self.notes.write().await;
                *notes = page.notes.clone();
                Ok(page.notes)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Create a note; the confirmed result is prepended (most recent first).
    pub async fn create(&self, data: &CreateNoteData) -> Result<Note, ApiError> {
        self.clear_error().await;
        match self.notes_api.create(data).await {
            Ok(note) => {
                self.notes.write().await.insert(0, note.clone());
                Ok(note)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Send partial fields; the confirmed note replaces the local entry.
    pub async fn update(&self, id: &str, data: &UpdateNoteData) -> Result<Note, ApiError> {
        self.clear_error().await;
        match self.notes_api.update(id, data).await {
            Ok(note) => {
                self.replace_local(note.clone()).await;
                Ok(note)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.clear_error().await;
        match self.notes_api.delete(id).await {
            Ok(()) => {
                self.notes.write().await.retain(|n| n.id != id);
                Ok(())
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// One request for the whole batch; a failure is one aggregate error
    /// with no partial-success reporting.
    pub async fn delete_many(&self, ids: &[String]) -> Result<(), ApiError> {
        self.clear_error().await;
        match self.notes_api.delete_many(ids).await {
            Ok(()) => {
                self.notes
                    .write()
                    .await
                    .retain(|n| !ids.iter().any(|id| *id == n.id));
                Ok(())
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Flip the pinned flag server-side and reconcile the returned note.
    pub async fn toggle_pin(&self, id: &str) -> Result<Note, ApiError> {
        self.clear_error().await;
        match self.notes_api.toggle_pin(id).await {
            Ok(note) => {
                self.replace_local(note.clone()).await;
                Ok(note)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Tag listing passes through without touching the collection.
    pub async fn all_tags(&self) -> Result<Vec<String>, ApiError> {
        self.notes_api.all_tags().await
    }

    /// Search suggestions pass through without touching the collection.
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<Note>, ApiError> {
        self.notes_api.search_suggestions(query).await
    }

    async fn replace_local(&self, updated: Note) {
        let mut notes = self.notes.write().await;
        if let Some(slot) = notes.iter_mut().find(|n| n.id == updated.id) {
            *slot = updated;
        }
    }

    async fn record_error(&self, e: &ApiError) {
        *self.last_error.write().await = Some(e.to_string());
    }

    // ── Accessors ───────────────────────────────────

    pub async fn notes(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.last_error.write().await = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}
