//! notekit command-line interface.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use notekit::config::load_config;
use notekit::labels::normalize_label;
use notekit::logging;
use notekit::notes::{EnsureOptions, Note, NoteId, NoteLifecycle, NoteStore};
use notekit::search::note_preview;

#[derive(Parser)]
#[command(name = "notekit", about = "Keyboard-first notes", version)]
struct Cli {
    /// Owner of the notes to operate on. Defaults to the configured owner.
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a note.
    Add {
        #[arg(long)]
        title: Option<String>,
        /// Note body; reads stdin when omitted.
        #[arg(long)]
        content: Option<String>,
        /// Labels to attach; normalized, invalid values are dropped.
        #[arg(long = "label")]
        labels: Vec<String>,
        #[arg(long)]
        pin: bool,
    },
    /// List notes, pinned first.
    List {
        /// Show trashed notes instead.
        #[arg(long)]
        trash: bool,
    },
    /// Search notes with the filter grammar (#label, is:pinned, free text).
    Search { query: String },
    /// Normalize label values and print the results.
    Labels { values: Vec<String> },
    /// Guarantee the owner has an accessible note and print its id.
    Ensure {
        /// Never resolve to this note id.
        #[arg(long)]
        exclude: Option<String>,
        /// Resolve to this note id when it is still accessible.
        #[arg(long)]
        prefer: Option<String>,
    },
    /// Move a note to the trash.
    Trash { id: String },
    /// Restore a note from the trash.
    Restore { id: String },
}

fn main() -> Result<()> {
    let _guard = logging::init();
    let cli = Cli::parse();
    let config = load_config();
    let owner = cli.owner.unwrap_or_else(|| config.default_owner.clone());

    let store = Arc::new(NoteStore::open_default()?);
    match store.prune_deleted(config.trash_retention_days) {
        Ok(0) => {}
        Ok(pruned) => info!(pruned, "Pruned expired trash"),
        Err(err) => warn!(error = %err, "Trash prune failed"),
    }

    match cli.command {
        Command::Add {
            title,
            content,
            labels,
            pin,
        } => {
            let mut note = Note::new(&owner);
            if let Some(title) = title {
                note.title = title;
            }
            note.content = match content {
                Some(content) => content,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            note.set_labels(&labels);
            note.pinned = pin;
            store.save(&note)?;
            println!("{}", note.id);
        }
        Command::List { trash } => {
            let notes = if trash {
                store.list_trash(&owner)?
            } else {
                store.list(&owner)?
            };
            for note in notes {
                print_note(&note);
            }
        }
        Command::Search { query } => {
            for note in store.search(&owner, &query)? {
                print_note(&note);
            }
        }
        Command::Labels { values } => {
            for value in values {
                match normalize_label(&value) {
                    Some(label) => println!("{label}"),
                    None => println!("(rejected) {value}"),
                }
            }
        }
        Command::Ensure { exclude, prefer } => {
            let options = EnsureOptions {
                exclude_note_id: parse_id(exclude.as_deref())?,
                preferred_note_id: parse_id(prefer.as_deref())?,
            };
            let lifecycle = NoteLifecycle::new(store.clone());
            let outcome = lifecycle.ensure_user_has_note(&owner, &options)?;
            println!(
                "{} ({})",
                outcome.note_id,
                if outcome.created { "created" } else { "existing" }
            );
        }
        Command::Trash { id } => {
            store.soft_delete(&required_id(&id)?)?;
        }
        Command::Restore { id } => {
            store.restore(&required_id(&id)?)?;
        }
    }

    Ok(())
}

fn parse_id(value: Option<&str>) -> Result<Option<NoteId>> {
    value.map(required_id).transpose()
}

fn required_id(value: &str) -> Result<NoteId> {
    NoteId::parse(value).ok_or_else(|| anyhow::anyhow!("invalid note id: {value}"))
}

fn print_note(note: &Note) {
    let pin = if note.pinned { "*" } else { " " };
    let labels = if note.labels.is_empty() {
        String::new()
    } else {
        format!(
            " [{}]",
            note.labels
                .iter()
                .map(|l| format!("#{l}"))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    println!(
        "{pin} {}  {}{labels}  {}",
        note.id,
        note.title,
        note_preview(Some(&note.content))
    );
}
