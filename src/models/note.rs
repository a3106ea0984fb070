use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as returned by the remote API. The remote store is authoritative;
/// local copies are replaced wholesale from server responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#ffffff".to_string()
}

/// Creation payload.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteData {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

/// Partial update payload; only set fields go on the wire.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

/// Pagination metadata from the list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_notes: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of the remote note list.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub pagination: PaginationInfo,
}

/// Query parameters accepted by the list endpoint. The collection store only
/// ever requests the defaults.
#[derive(Debug, Clone)]
pub struct ListNotesParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl Default for ListNotesParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
            tag: None,
        }
    }
}
