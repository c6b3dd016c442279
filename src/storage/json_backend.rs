use chrono::{NaiveDateTime, Utc};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::core::{
    errors::{CrmError, Result},
    store::{CrmStore, CURRENT_SCHEMA_VERSION},
    utils::{ensure_dir, write_atomic, PathResolver},
};
use crate::config::DEFAULT_BACKUP_RETENTION;

use super::StorageBackend;

const STORE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Stores each named CRM data set as a pretty-printed JSON file.
///
/// Layout under the base directory:
/// `stores/<name>.json` and `backups/<name>/<name>_<YYYYmmdd>_<HHMMSS>[_note].json`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    stores_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let stores_dir = PathResolver::store_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&stores_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            stores_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_BACKUP_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn store_path(&self, name: &str) -> PathBuf {
        self.stores_dir
            .join(format!("{}.{}", canonical_name(name), STORE_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.store_path(name).exists()
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    /// Picks a file name for a new backup that does not collide with an existing one.
    fn next_backup_path(&self, name: &str, note: Option<&str>) -> PathBuf {
        let dir = self.backup_dir(name);
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut candidate = dir.join(format!("{}.{}", stem, STORE_EXTENSION));
        let mut counter = 2;
        while candidate.exists() {
            candidate = dir.join(format!("{}-{}.{}", stem, counter, STORE_EXTENSION));
            counter += 1;
        }
        candidate
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backup_dir(name))?;
        let backup_path = self.next_backup_path(name, None);
        fs::copy(path, &backup_path)?;
        debug!(backup = %backup_path.display(), "previous store file backed up");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            if let Err(err) = fs::remove_file(&path) {
                warn!(backup = %path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, store: &CrmStore, name: &str) -> Result<()> {
        let path = self.store_path(name);
        self.backup_existing_file(name, &path)?;
        let json = serde_json::to_string_pretty(store)?;
        write_atomic(&path, &json)?;
        info!(store = name, path = %path.display(), "store saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<CrmStore> {
        let path = self.store_path(name);
        if !path.exists() {
            return Err(CrmError::StorageError(format!(
                "store `{}` not found at {}",
                name,
                path.display()
            )));
        }
        let store = load_store_from_path(&path)?;
        for warning in store_warnings(&store) {
            warn!(store = name, "{warning}");
        }
        Ok(store)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(STORE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn backup(&self, store: &CrmStore, name: &str, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backup_dir(name))?;
        let path = self.next_backup_path(name, note);
        let json = serde_json::to_string_pretty(store)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        info!(store = name, backup = %path.display(), "backup written");
        path.file_name()
            .and_then(|file| file.to_str())
            .map(str::to_string)
            .ok_or_else(|| CrmError::StorageError("backup path has no file name".into()))
    }

    /// Copies the backup over the current store file and loads it.
    fn restore(&self, name: &str, backup_name: &str) -> Result<CrmStore> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(CrmError::StorageError(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        // Read first: backing up the current file may prune the backup being restored.
        let data = fs::read_to_string(&backup_path)?;
        let store = parse_store(&data, &backup_path)?;
        let target = self.store_path(name);
        ensure_dir(&self.stores_dir)?;
        self.backup_existing_file(name, &target)?;
        write_atomic(&target, &data)?;
        info!(store = name, backup = backup_name, "store restored from backup");
        Ok(store)
    }
}

pub fn load_store_from_path(path: &Path) -> Result<CrmStore> {
    let data = fs::read_to_string(path)?;
    parse_store(&data, path)
}

fn parse_store(data: &str, path: &Path) -> Result<CrmStore> {
    let store: CrmStore = serde_json::from_str(data)?;
    if store.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CrmError::StorageError(format!(
            "`{}` uses schema version {}, newer than supported version {}",
            path.display(),
            store.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(store)
}

/// Dangling references, and ledgers that drifted from their subscription dates or skip months.
pub fn store_warnings(store: &CrmStore) -> Vec<String> {
    let client_ids: HashSet<_> = store.clients.iter().map(|c| c.id).collect();
    let service_ids: HashSet<_> = store.services.iter().map(|s| s.id).collect();
    let mut warnings = Vec::new();

    for sub in &store.subscriptions {
        if !client_ids.contains(&sub.client_id) {
            warnings.push(format!(
                "subscription {} references unknown client {}",
                sub.id, sub.client_id
            ));
        }
        if !service_ids.contains(&sub.service_id) {
            warnings.push(format!(
                "subscription {} references unknown service {}",
                sub.id, sub.service_id
            ));
        }
        if let Some(first) = sub.ledger.first_month() {
            if first != crate::ledger::MonthKey::from_date(sub.start_date) {
                warnings.push(format!(
                    "subscription {} ledger starts at {} but the subscription starts {}",
                    sub.id, first, sub.start_date
                ));
            }
        }
        let entries = sub.ledger.entries();
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].key().succ() != pair[1].key()) {
            warnings.push(format!(
                "subscription {} ledger skips from {} to {}",
                sub.id,
                pair[0].key(),
                pair[1].key()
            ));
        }
    }
    warnings
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "store".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads the `<YYYYmmdd>_<HHMMSS>` pair out of a backup file name.
fn parse_backup_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(&format!(".{}", STORE_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        let time = pair[1].split('-').next()?;
        if is_digits(pair[0], 8) && is_digits(time, 6) {
            NaiveDateTime::parse_from_str(&format!("{}{}", pair[0], time), "%Y%m%d%H%M%S").ok()
        } else {
            None
        }
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
