//! Tolerant markup extraction.
//!
//! The scanner never parses markup into a tree. It matches opening tags and
//! `type` blocks with case-insensitive patterns, so truncated or otherwise
//! broken files still give up whatever well-formed tags they contain and
//! never stop the scan. Files are visited in file-name order, which fixes
//! the last-write-wins resolution of the attachment rule map.

use super::{
    AttachmentRules, DatabaseLayout, DatabaseSnapshot, IngestError, MARKUP_SUFFIX, ScanStats,
};
use log::{debug, info, warn};
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const TYPE_TAG_PATTERN: &str = r#"(?i)<type\s+name=["']([^"']+)["'][^>]*>"#;
const TYPE_BLOCK_PATTERN: &str = r#"(?is)<type\s+name=["']([^"']+)["'][^>]*>(.*?)</type>"#;
const ITEM_TAG_PATTERN: &str = r#"(?i)<item\s+name=["']([^"']+)["']"#;

/// Compiled extraction patterns, shared by every file of a run.
#[derive(Clone, Debug)]
pub struct MarkupScanner {
    type_tag: Regex,
    type_block: Regex,
    item_tag: Regex,
}

impl MarkupScanner {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            type_tag: Regex::new(TYPE_TAG_PATTERN)?,
            type_block: Regex::new(TYPE_BLOCK_PATTERN)?,
            item_tag: Regex::new(ITEM_TAG_PATTERN)?,
        })
    }

    /// Every `name` of a `<type name="...">` opening tag, in document order.
    pub fn type_names<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.type_tag
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// `(type name, item names)` for every `type` block carrying at least
    /// one `<item name="...">`, in document order.
    pub fn attachment_blocks<'t>(&self, text: &'t str) -> Vec<(&'t str, Vec<&'t str>)> {
        self.type_block
            .captures_iter(text)
            .filter_map(|caps| {
                let type_name = caps.get(1)?.as_str();
                let inner = caps.get(2)?.as_str();
                let items: Vec<&str> = self
                    .item_tag
                    .captures_iter(inner)
                    .filter_map(|item| item.get(1))
                    .map(|m| m.as_str())
                    .collect();
                (!items.is_empty()).then_some((type_name, items))
            })
            .collect()
    }
}

/// Per-run diagnostics; never persisted.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub problems: Vec<IngestError>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    fn record(&mut self, problem: IngestError) {
        warn!("{problem}");
        self.problems.push(problem);
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub snapshot: DatabaseSnapshot,
    pub report: ScanReport,
}

/// Scan both directories of `layout`. Missing directories and unreadable
/// files are recorded in the report and contribute nothing.
pub fn scan_database(layout: &DatabaseLayout, scanner: &MarkupScanner) -> ScanOutcome {
    let mut report = ScanReport::default();
    let mut stats = ScanStats::default();

    let types_items = match list_markup_files(&layout.types_dir()) {
        Ok(files) => {
            stats.types_files = files.len();
            info!(
                "found {} type files in {}",
                files.len(),
                layout.types_dir().display()
            );
            collect_type_names(&files, scanner, &mut report)
        }
        Err(err) => {
            report.record(err);
            Vec::new()
        }
    };
    stats.types_items = types_items.len();

    let spawnable_rules = match list_markup_files(&layout.spawnable_dir()) {
        Ok(files) => {
            stats.spawnable_files = files.len();
            collect_attachment_rules(&files, scanner, &mut report)
        }
        Err(err) => {
            report.record(err);
            AttachmentRules::new()
        }
    };
    stats.spawnable_rules = spawnable_rules.len();

    ScanOutcome {
        snapshot: DatabaseSnapshot {
            types_items,
            spawnable_rules,
            stats,
        },
        report,
    }
}

/// Deduplicated, sorted type names across `files`.
pub fn collect_type_names(
    files: &[PathBuf],
    scanner: &MarkupScanner,
    report: &mut ScanReport,
) -> Vec<String> {
    let mut names = BTreeSet::new();
    for path in files {
        let Some(text) = read_markup(path, report) else {
            continue;
        };
        let found = scanner.type_names(&text);
        debug!("processed {}: {} items found", path.display(), found.len());
        names.extend(found.into_iter().map(str::to_string));
    }
    names.into_iter().collect()
}

/// Attachment rules across `files`; a later block for the same type replaces
/// the earlier one.
pub fn collect_attachment_rules(
    files: &[PathBuf],
    scanner: &MarkupScanner,
    report: &mut ScanReport,
) -> AttachmentRules {
    let mut rules = AttachmentRules::new();
    for path in files {
        let Some(text) = read_markup(path, report) else {
            continue;
        };
        let blocks = scanner.attachment_blocks(&text);
        debug!("processed {}: {} rule blocks", path.display(), blocks.len());
        for (type_name, items) in blocks {
            let items = items.into_iter().map(str::to_string).collect();
            if rules.insert(type_name.to_string(), items).is_some() {
                debug!("attachment rule for {type_name} overwritten by {}", path.display());
            }
        }
    }
    rules
}

/// `*.xml` files directly inside `dir`, sorted by file name.
pub fn list_markup_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|err| IngestError::UnreadableDirectory {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(MARKUP_SUFFIX))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Item names from one type-definition file. Unlike a directory scan, an
/// unreadable file is an error here since there is nothing else to report.
pub fn scan_types_file(path: &Path, scanner: &MarkupScanner) -> Result<Vec<String>, IngestError> {
    let mut report = ScanReport::default();
    let names = collect_type_names(&[path.to_path_buf()], scanner, &mut report);
    match report.problems.pop() {
        Some(problem) => Err(problem),
        None => Ok(names),
    }
}

/// Attachment rules from one spawn-rule file.
pub fn scan_spawnable_file(path: &Path, scanner: &MarkupScanner) -> Result<AttachmentRules, IngestError> {
    let mut report = ScanReport::default();
    let rules = collect_attachment_rules(&[path.to_path_buf()], scanner, &mut report);
    match report.problems.pop() {
        Some(problem) => Err(problem),
        None => Ok(rules),
    }
}

fn read_markup(path: &Path, report: &mut ScanReport) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            report.record(IngestError::MalformedSourceFile {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            return None;
        }
    };
    // Stray Latin-1 bytes in comments are common; tags around them still count.
    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        debug!("{}: invalid UTF-8 replaced", path.display());
    }
    Some(text.into_owned())
}
