//! Command-line front end for the loadout editor core.
//!
//! Usage:
//!   loadout scan
//!   loadout cache
//!   loadout new loadouts/hunter.json
//!   loadout check loadouts/hunter.json
//!   loadout tree loadouts/hunter.json
//!   loadout search loadouts/hunter.json glock
//!   loadout show loadouts/hunter.json --path InventoryAttachments/0
//!   loadout suggest mag
//!   loadout suggest bel --slots

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use loadout_manager::config::EditorConfig;
use loadout_manager::gateway::{FsGateway, PresetDialogs};
use loadout_manager::search::{self, SearchEntry};
use loadout_manager::session::{Editor, FixedAnswer, NoticeLevel};
use loadout_manager::{DocumentModel, FocusPath, Node};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "loadout")]
#[command(about = "Inspect loadout documents and the server item database")]
struct Cli {
    /// Database root holding types/ and spawnable/ (defaults to discovery).
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Cache snapshot path (defaults to LOADOUT_CACHE_PATH or data/db_cache.json).
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the database, refresh the cache and print stats.
    Scan,
    /// Print the cached database snapshot.
    Cache,
    /// Write a new default document.
    New {
        out: PathBuf,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Open and validate a document.
    Check { file: PathBuf },
    /// List every named node with its path.
    Tree { file: PathBuf },
    /// Case-insensitive name search within a document.
    Search { file: PathBuf, query: String },
    /// Print breadcrumbs, summary and JSON for one node.
    Show {
        file: PathBuf,
        /// Node path such as InventoryAttachments/0/Items/1.
        #[arg(long, default_value = "")]
        path: String,
    },
    /// Autocomplete a class name (or slot name with --slots).
    Suggest {
        query: String,
        #[arg(long)]
        slots: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan => {
            let config = EditorConfig::resolve(cli.database, cli.cache)?;
            let mut editor = editor(&config, PresetDialogs::default());
            let outcome = editor.sync_database();
            flush_notices(&mut editor);
            let Some(outcome) = outcome else {
                bail!("database sync failed");
            };
            for problem in &outcome.report.problems {
                eprintln!("warning: {problem}");
            }
            println!("{}", serde_json::to_string_pretty(&outcome.snapshot.stats)?);
        }
        Command::Cache => {
            let config = cache_only_config(cli.cache);
            let cache = config.cache();
            let Some(snapshot) = cache.try_load()? else {
                bail!("no cached database snapshot at {}", cache.path().display());
            };
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::New { out, force } => {
            if out.exists() && !force {
                bail!("{} already exists (use --force to replace it)", out.display());
            }
            let config = cache_only_config(cli.cache);
            let dialogs = PresetDialogs {
                open: None,
                save: Some(out.clone()),
            };
            let mut editor = editor(&config, dialogs);
            let saved = editor.save();
            flush_notices(&mut editor);
            if !saved {
                bail!("could not write {}", out.display());
            }
            println!("{}", out.display());
        }
        Command::Check { file } => {
            let document = open_document(&file, cli.cache)?;
            let named = search::flatten(document.root(), &FocusPath::root()).len();
            let name = document.focused_name().unwrap_or("Unnamed");
            println!("ok: {name} ({named} named nodes)");
        }
        Command::Tree { file } => {
            let document = open_document(&file, cli.cache)?;
            print_entries(&search::flatten(document.root(), &FocusPath::root()));
        }
        Command::Search { file, query } => {
            let document = open_document(&file, cli.cache)?;
            print_entries(&search::search(document.root(), &query));
        }
        Command::Show { file, path } => {
            let mut document = open_document(&file, cli.cache)?;
            let target: FocusPath = path.parse().unwrap_or_default();
            document.navigate(target);
            let focused = document.focused()?.clone();
            let summary = document.focused_summary()?;
            let crumbs: Vec<String> = document.breadcrumbs().into_iter().map(|c| c.label).collect();
            println!("{}", crumbs.join(" > "));
            let chance = summary
                .chance_percent
                .map(|p| format!(", {p}%"))
                .unwrap_or_default();
            println!("{} ({}{chance}, depth {})", summary.name, summary.kind, summary.depth);
            if !summary.counts.is_empty() {
                println!("{}", summary.counts.join(", "));
            }
            print_node(&focused)?;
        }
        Command::Suggest { query, slots } => {
            let config = cache_only_config(cli.cache);
            let options = if slots {
                config.slot_names.clone()
            } else {
                match config.cache().try_load()? {
                    Some(snapshot) => snapshot.types_items,
                    None => {
                        eprintln!(
                            "no cached database snapshot at {}; run `loadout scan` first",
                            config.cache_path.display()
                        );
                        Vec::new()
                    }
                }
            };
            for option in search::autocomplete(&options, &query) {
                println!("{option}");
            }
        }
    }
    Ok(())
}

/// Commands that never scan do not need the database root.
fn cache_only_config(cache: Option<PathBuf>) -> EditorConfig {
    let cache_path = cache.unwrap_or_else(loadout_manager::ingest::default_cache_path);
    EditorConfig::new(PathBuf::new(), cache_path)
}

fn editor(config: &EditorConfig, dialogs: PresetDialogs) -> Editor {
    let gateway = FsGateway::new(dialogs, config.cache());
    Editor::new(config, Arc::new(gateway), Box::new(FixedAnswer(false)))
}

fn open_document(file: &Path, cache: Option<PathBuf>) -> Result<DocumentModel> {
    let config = cache_only_config(cache);
    let dialogs = PresetDialogs {
        open: Some(file.to_path_buf()),
        save: None,
    };
    let mut editor = editor(&config, dialogs);
    let opened = editor.open();
    flush_notices(&mut editor);
    if !opened {
        bail!("failed to open {}", file.display());
    }
    Ok(editor.document().clone())
}

/// Echo danger notices to stderr.
fn flush_notices(editor: &mut Editor) {
    for notice in editor.take_notices() {
        if notice.level == NoticeLevel::Danger {
            eprintln!("{}", notice.message);
        }
    }
}

fn print_entries(entries: &[SearchEntry]) {
    for entry in entries {
        println!("/{}\t{}\t{}", entry.path, entry.kind, entry.name);
    }
}

fn print_node(node: &Node) -> Result<()> {
    let text = serde_json::to_string_pretty(node).context("serializing node")?;
    println!("{text}");
    Ok(())
}
