pub mod note;
pub mod user;

pub use note::{CreateNoteData, ListNotesParams, Note, NotesPage, PaginationInfo, UpdateNoteData};
pub use user::{AuthMethod, AuthResponse, OtpData, SignUpData, User};
