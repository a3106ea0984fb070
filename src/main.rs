//! Notelark command-line client.
//!
//! Thin presentation over the session and notes stores. This binary also
//! owns the one decision the core deliberately leaves open: what to do when
//! the session is revoked mid-call.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use notelark::api::{ApiClient, AuthService, NotesApi, NotesService};
use notelark::config::{self, Config};
use notelark::credentials::{CredentialStore, FileCredentialStore};
use notelark::error::ApiError;
use notelark::events::AuthEventBus;
use notelark::models::{CreateNoteData, Note, SignUpData, UpdateNoteData, User};
use notelark::notes_cache::NoteCache;
use notelark::notes_store::NotesStore;
use notelark::session::SessionManager;

#[derive(Parser)]
#[command(name = "notelark", about = "Notelark notes client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account (a one-time code is emailed to you)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: Option<String>,
    },
    /// Request a sign-in code for an existing account
    Signin { email: String },
    /// Exchange the emailed 6-digit code for a session
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Re-send the pending one-time code
    Resend { email: String },
    /// Adopt a session token obtained out-of-band (e.g. a deep link)
    Adopt { token: String },
    /// Show the identity behind the current session
    Whoami,
    /// Sign out and discard the local session
    Signout,
    /// Note operations
    #[command(subcommand)]
    Notes(NotesCommand),
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes
    List {
        /// Filter by a title/content substring
        #[arg(long)]
        search: Option<String>,
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Show the cached snapshot instead of fetching
        #[arg(long)]
        cached: bool,
    },
    /// Create a note
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Hex color, e.g. "#fef3c7"
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        pinned: bool,
    },
    /// Update fields of a note
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replace the tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Show a single note in full
    Show { id: String },
    /// Delete one or more notes
    Delete { ids: Vec<String> },
    /// Toggle a note's pinned flag
    Pin { id: String },
    /// List all tags in use
    Tags,
    /// Search notes by a partial query
    Search { query: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    // One instance of everything per running client, wired explicitly.
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config::token_path()));
    let events = Arc::new(AuthEventBus::new());
    let mut revoked = events.subscribe();

    let api = Arc::new(ApiClient::new(&cfg.api_url, credentials.clone(), events.clone()));
    let auth = Arc::new(AuthService::new(api.clone()));
    let notes_service = Arc::new(NotesService::new(
        api.clone(),
        NoteCache::new(cfg.state_dir.clone()),
    ));
    let session = SessionManager::new(auth, credentials);
    let notes = NotesStore::new(notes_service.clone());

    let result = run(&cli.command, &session, &notes, &notes_service).await;

    // The single place that owns the "back to sign-in" decision; the core
    // only emits the event.
    if revoked.try_recv().is_ok() {
        eprintln!("Session expired. Run `notelark signin <email>` to sign in again.");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: &Command,
    session: &SessionManager,
    notes: &NotesStore,
    notes_service: &NotesService,
) -> Result<(), ApiError> {
    match command {
        Command::Signup { name, email, dob } => {
            session
                .sign_up(SignUpData {
                    name: name.clone(),
                    email: email.clone(),
                    date_of_birth: dob.clone(),
                })
                .await?;
            println!(
                "Check {} for your 6-digit code, then run `notelark verify --email {} --code <code>`.",
                email, email
            );
            Ok(())
        }
        Command::Signin { email } => {
            session.request_sign_in_code(email).await?;
            println!(
                "Check {} for your 6-digit code, then run `notelark verify --email {} --code <code>`.",
                email, email
            );
            Ok(())
        }
        Command::Verify { email, code } => {
            let user = session.verify_code(email, code).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Resend { email } => {
            if let Some(secs) = session.resend_available_in().await {
                println!("A code was sent moments ago; consider waiting {}s.", secs);
            }
            session.resend_code(email).await?;
            println!("Code re-sent to {}.", email);
            Ok(())
        }
        Command::Adopt { token } => {
            let user = session.adopt_token(token).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Whoami => {
            if session.restore().await {
                if let Some(user) = session.current_user().await {
                    println!("{} <{}>", user.name, user.email);
                    if !user.is_email_verified {
                        println!("(email not verified)");
                    }
                }
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        Command::Signout => {
            session.sign_out().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Notes(cmd) => {
            let Some(user) = require_user(session).await else {
                return Ok(());
            };
            run_notes(cmd, &user, notes, notes_service).await
        }
    }
}

async fn run_notes(
    command: &NotesCommand,
    user: &User,
    notes: &NotesStore,
    notes_service: &NotesService,
) -> Result<(), ApiError> {
    match command {
        NotesCommand::List { search, tag, cached } => {
            let mut listed = if *cached {
                notes_service.load_cached(&user.id)
            } else {
                match notes.fetch().await {
                    Ok(fetched) => {
                        notes_service.save_cached(&user.id, &fetched);
                        fetched
                    }
                    Err(ApiError::Network(e)) => {
                        log::warn!("[CLI] Fetch failed, falling back to cache: {}", e);
                        println!("Offline: showing cached notes.");
                        notes_service.load_cached(&user.id)
                    }
                    Err(e) => return Err(e),
                }
            };

            // Filtering is presentation-side, the store always holds the
            // server's default page.
            if let Some(search) = search {
                let needle = search.to_lowercase();
                listed.retain(|n| {
                    n.title.to_lowercase().contains(&needle)
                        || n.content.to_lowercase().contains(&needle)
                });
            }
            if let Some(tag) = tag {
                listed.retain(|n| n.tags.iter().any(|t| t == tag));
            }

            print_notes(&listed);
            Ok(())
        }
        NotesCommand::Create {
            title,
            content,
            tags,
            color,
            pinned,
        } => {
            let note = notes
                .create(&CreateNoteData {
                    title: title.clone(),
                    content: content.clone(),
                    tags: if tags.is_empty() { None } else { Some(tags.clone()) },
                    color: color.clone(),
                    is_pinned: if *pinned { Some(true) } else { None },
                })
                .await?;
            println!("Created note {}", note.id);
            Ok(())
        }
        NotesCommand::Edit {
            id,
            title,
            content,
            tags,
            color,
        } => {
            let note = notes
                .update(
                    id,
                    &UpdateNoteData {
                        title: title.clone(),
                        content: content.clone(),
                        tags: if tags.is_empty() { None } else { Some(tags.clone()) },
                        color: color.clone(),
                        is_pinned: None,
                    },
                )
                .await?;
            println!("Updated note {}", note.id);
            Ok(())
        }
        NotesCommand::Delete { ids } => {
            if ids.is_empty() {
                return Err(ApiError::validation("ids", "At least one note id is required"));
            }
            if ids.len() == 1 {
                notes.delete(&ids[0]).await?;
            } else {
                notes.delete_many(ids).await?;
            }
            println!("Deleted {} note(s).", ids.len());
            Ok(())
        }
        NotesCommand::Show { id } => {
            let note = notes_service.get(id).await?;
            let marker = if note.is_pinned { " (pinned)" } else { "" };
            println!("{}{}", note.title, marker);
            if !note.tags.is_empty() {
                println!(
                    "{}",
                    note.tags
                        .iter()
                        .map(|t| format!("#{}", t))
                        .collect::<Vec<_>>()
                        .join(" ")
                );
            }
            println!("color: {}  updated: {}", note.color, note.updated_at.to_rfc3339());
            println!();
            println!("{}", note.content);
            Ok(())
        }
        NotesCommand::Pin { id } => {
            let note = notes.toggle_pin(id).await?;
            println!(
                "Note {} is now {}.",
                note.id,
                if note.is_pinned { "pinned" } else { "unpinned" }
            );
            Ok(())
        }
        NotesCommand::Tags => {
            let tags = notes.all_tags().await?;
            if tags.is_empty() {
                println!("(no tags)");
            }
            for tag in tags {
                println!("{}", tag);
            }
            Ok(())
        }
        NotesCommand::Search { query } => {
            let suggestions = notes.search_suggestions(query).await?;
            print_notes(&suggestions);
            Ok(())
        }
    }
}

/// Restore the session and hand back the identity, or explain how to get one.
async fn require_user(session: &SessionManager) -> Option<User> {
    if session.restore().await {
        session.current_user().await
    } else {
        println!("Not signed in. Run `notelark signin <email>` first.");
        None
    }
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in notes {
        let marker = if note.is_pinned { "*" } else { " " };
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!(
                "  [{}]",
                note.tags
                    .iter()
                    .map(|t| format!("#{}", t))
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        };
        println!("{} {}  {}{}", marker, note.id, note.title, tags);
    }
}
