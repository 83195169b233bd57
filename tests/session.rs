// Editor session behavior with scripted prompts and an in-memory gateway.
mod support;

use anyhow::Result;
use loadout_manager::config::EditorConfig;
use loadout_manager::gateway::{
    FsGateway, GatewayError, OpenedDocument, PersistenceGateway, PresetDialogs,
};
use loadout_manager::ingest::{DatabaseSnapshot, IngestError, ScanOutcome, ScanReport, ScanStats};
use loadout_manager::session::{Editor, NoticeLevel, Prompter};
use loadout_manager::{Collection, DocumentModel, FocusPath, Node};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use support::{DatabaseFixture, GLOCK_RULES, sample_document, write_document};

#[derive(Default)]
struct ScriptedPrompter {
    answer: bool,
    asked: Arc<Mutex<Vec<String>>>,
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

// Gateway with no disk behind it: saves land in `saved`, scans return a
// canned snapshot and count how often they ran.
#[derive(Default)]
struct MemoryGateway {
    cached: Option<DatabaseSnapshot>,
    scanned: DatabaseSnapshot,
    scans: AtomicUsize,
    save_as_target: Option<PathBuf>,
    saved: Mutex<Vec<(PathBuf, String)>>,
    fail_saves: bool,
}

impl PersistenceGateway for MemoryGateway {
    fn open_document(&self) -> Result<Option<OpenedDocument>, GatewayError> {
        Ok(None)
    }

    fn save_document_as(&self, content: &str) -> Result<Option<PathBuf>, GatewayError> {
        let Some(path) = self.save_as_target.clone() else {
            return Ok(None);
        };
        self.save_document(&path, content)?;
        Ok(Some(path))
    }

    fn save_document(&self, path: &Path, content: &str) -> Result<(), GatewayError> {
        if self.fail_saves {
            return Err(GatewayError::Write {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            });
        }
        self.saved
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }

    fn load_index_snapshot(&self) -> Option<DatabaseSnapshot> {
        self.cached.clone()
    }

    fn scan_and_build_index(&self, _database_root: &Path) -> Result<ScanOutcome, IngestError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(ScanOutcome {
            snapshot: self.scanned.clone(),
            report: ScanReport::default(),
        })
    }
}

fn snapshot(items: &[&str]) -> DatabaseSnapshot {
    DatabaseSnapshot {
        types_items: items.iter().map(|s| s.to_string()).collect(),
        stats: ScanStats {
            types_files: 1,
            types_items: items.len(),
            ..ScanStats::default()
        },
        ..DatabaseSnapshot::default()
    }
}

fn config() -> EditorConfig {
    EditorConfig::new("/nonexistent/database", "/nonexistent/cache.json")
}

fn editor_with(gateway: Arc<MemoryGateway>, answer: bool) -> (Editor, Arc<Mutex<Vec<String>>>) {
    let prompter = ScriptedPrompter {
        answer,
        ..ScriptedPrompter::default()
    };
    let asked = Arc::clone(&prompter.asked);
    (Editor::new(&config(), gateway, Box::new(prompter)), asked)
}

#[test]
fn startup_prefers_cache_and_syncs_without_one() {
    let cached = Arc::new(MemoryGateway {
        cached: Some(snapshot(&["Apple"])),
        scanned: snapshot(&["Pear"]),
        ..MemoryGateway::default()
    });
    let (mut editor, _) = editor_with(Arc::clone(&cached), true);
    editor.startup();
    assert_eq!(cached.scans.load(Ordering::SeqCst), 0);
    assert_eq!(editor.class_name_suggestions("ap"), vec!["Apple"]);

    let uncached = Arc::new(MemoryGateway {
        scanned: snapshot(&["Pear", "Peach"]),
        ..MemoryGateway::default()
    });
    let (mut editor, _) = editor_with(Arc::clone(&uncached), true);
    editor.startup();
    assert_eq!(uncached.scans.load(Ordering::SeqCst), 1);
    assert_eq!(editor.class_name_suggestions("PE"), vec!["Pear", "Peach"]);
    let notice = editor.notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Sync Successful! 2 items imported.");
}

#[test]
fn delete_requires_confirmation() -> Result<()> {
    let gateway = Arc::new(MemoryGateway::default());
    let (mut declined, asked) = editor_with(Arc::clone(&gateway), false);
    declined.document_mut().add_child(&FocusPath::root(), Collection::InventoryCargo)?;
    assert!(!declined.delete_child(&FocusPath::root(), Collection::InventoryCargo, 0));
    assert_eq!(asked.lock().unwrap().as_slice(), ["Delete this?"]);
    assert_eq!(declined.document().children(&FocusPath::root(), Collection::InventoryCargo)?.len(), 1);

    let (mut accepted, _) = editor_with(gateway, true);
    accepted.document_mut().add_child(&FocusPath::root(), Collection::InventoryCargo)?;
    assert!(accepted.delete_child(&FocusPath::root(), Collection::InventoryCargo, 0));
    assert!(accepted.document().children(&FocusPath::root(), Collection::InventoryCargo)?.is_empty());
    Ok(())
}

#[test]
fn class_name_with_rule_creates_slots_after_confirmation() -> Result<()> {
    let gateway = Arc::new(MemoryGateway::default());
    let (mut editor, asked) = editor_with(gateway, true);
    let mut rules = loadout_manager::ingest::AttachmentRules::new();
    rules.insert("Weapon_Glock".into(), vec!["Mag_Glock_15Rnd".into()]);
    editor.store().replace_rules(rules, 1);

    assert!(editor.set_class_name(&FocusPath::root(), "Weapon_Glock"));
    assert_eq!(asked.lock().unwrap().as_slice(), ["Auto-create slots for Weapon_Glock?"]);
    let slots = editor
        .document()
        .children(&FocusPath::root(), Collection::InventoryAttachments)?;
    assert_eq!(slots.len(), 1);
    assert_eq!(
        slots[0].get_key("SlotName").and_then(Node::as_str),
        Some("Att_Mag_Glock_15Rnd")
    );
    Ok(())
}

#[test]
fn declined_suggestion_only_renames() -> Result<()> {
    let gateway = Arc::new(MemoryGateway::default());
    let (mut editor, _) = editor_with(gateway, false);
    let mut rules = loadout_manager::ingest::AttachmentRules::new();
    rules.insert("Weapon_Glock".into(), vec!["Mag_Glock_15Rnd".into()]);
    editor.store().replace_rules(rules, 1);

    assert!(editor.set_class_name(&FocusPath::root(), "Weapon_Glock"));
    assert_eq!(editor.document().focused_name(), Some("Weapon_Glock"));
    assert!(
        editor
            .document()
            .children(&FocusPath::root(), Collection::InventoryAttachments)?
            .is_empty()
    );
    Ok(())
}

#[test]
fn save_without_path_falls_back_to_save_as() {
    let gateway = Arc::new(MemoryGateway {
        save_as_target: Some(PathBuf::from("/loadouts/new.json")),
        ..MemoryGateway::default()
    });
    let (mut editor, _) = editor_with(Arc::clone(&gateway), true);
    assert!(editor.current_path().is_none());

    assert!(editor.save());
    assert_eq!(editor.current_path(), Some(Path::new("/loadouts/new.json")));
    assert!(editor.save());

    let saved = gateway.saved.lock().unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved[0].1.starts_with("{\n    \"ClassName\""));
    let messages: Vec<_> = editor.notices().iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["File saved", "Saved successfully"]);
}

#[test]
fn failures_become_notices_and_keep_state() {
    let gateway = Arc::new(MemoryGateway {
        save_as_target: Some(PathBuf::from("/loadouts/new.json")),
        fail_saves: true,
        ..MemoryGateway::default()
    });
    let (mut editor, _) = editor_with(gateway, true);
    let before = editor.document().clone();

    assert!(!editor.save());
    assert!(editor.current_path().is_none());
    assert!(!editor.import_json("{ not json"));
    assert_eq!(editor.document(), &before);

    let levels: Vec<_> = editor.notices().iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Danger, NoticeLevel::Danger]);
    assert_eq!(editor.notices()[1].message, "Invalid JSON format");
}

#[test]
fn background_sync_leaves_document_usable() -> Result<()> {
    let gateway = Arc::new(MemoryGateway {
        scanned: snapshot(&["Apple"]),
        ..MemoryGateway::default()
    });
    let (mut editor, _) = editor_with(gateway, true);
    let handle = editor.start_sync();
    editor.document_mut().add_child(&FocusPath::root(), Collection::Sets)?;
    let outcome = editor.finish_background_sync(handle).expect("sync finished");
    assert_eq!(outcome.snapshot.types_items, vec!["Apple"]);
    assert_eq!(editor.class_name_suggestions("app"), vec!["Apple"]);
    assert_eq!(editor.document().children(&FocusPath::root(), Collection::Sets)?.len(), 1);
    Ok(())
}

#[test]
fn file_gateway_round_trip() -> Result<()> {
    let db = DatabaseFixture::new()?;
    db.write_types("types.xml", r#"<type name="Weapon_Glock"/>"#)?;
    db.write_spawnable("spawn.xml", GLOCK_RULES)?;
    let source = write_document(db.workspace(), "hunter.json", &sample_document())?;
    let target = db.workspace().join("copy.json");

    let config = EditorConfig::new(db.root(), db.cache_path());
    let gateway = FsGateway::new(
        PresetDialogs {
            open: Some(source.clone()),
            save: Some(target.clone()),
        },
        config.cache(),
    );
    let mut editor = Editor::new(&config, Arc::new(gateway), Box::new(ScriptedPrompter::default()));

    editor.startup();
    assert!(db.cache_path().is_file());
    assert_eq!(editor.slot_name_suggestions("belt"), vec!["BeltLeft", "BeltRight"]);

    assert!(editor.open());
    assert_eq!(editor.current_path(), Some(source.as_path()));
    assert_eq!(editor.notices().last().unwrap().message, "Loaded hunter.json");
    assert!(editor.save_as());
    assert_eq!(editor.current_path(), Some(target.as_path()));

    let mut reopened = DocumentModel::new();
    reopened.import_json(&fs::read_to_string(&target)?)?;
    assert_eq!(reopened.root(), editor.document().root());
    Ok(())
}
