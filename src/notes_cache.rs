//! Per-identity note cache.
//!
//! A JSON snapshot of the last fetched note list, keyed by user id. This is
//! an offline fallback only; the primary fetch path never reads it.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::models::Note;

/// File-backed cache of the last known note list per identity.
pub struct NoteCache {
    dir: PathBuf,
}

impl NoteCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Persist the note list for a user.
    pub fn save(&self, user_id: &str, notes: &[Note]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(notes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.cache_path(user_id), json)
    }

    /// Read the cached list. Absent or unreadable caches read as empty.
    pub fn load(&self, user_id: &str) -> Vec<Note> {
        let path = self.cache_path(user_id);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[NOTES] Corrupt note cache at {:?}: {}", path, e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    /// Drop the cached list for a user.
    pub fn clear(&self, user_id: &str) -> io::Result<()> {
        match fs::remove_file(self.cache_path(user_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn cache_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("notes_{}.json", sanitize(user_id)))
    }
}

/// Keep cache file names flat even if an id ever carries path characters.
fn sanitize(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
