//! File-backed configuration store
//!
//! Reads never block on a commit in progress for longer than the in-memory
//! swap: the file is written first and the maps are replaced only after the
//! write succeeded, so readers see either the old or the new values.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;

use crate::format::{self, normalize_key, Comments};
use crate::registry::FieldRegistry;
use crate::transaction::ConfigTransaction;
use crate::value::ConfigValue;
use crate::{ConfigError, Result};

#[derive(Debug, Default)]
struct StoreState {
    /// Raw strings for explicitly set keys
    values: BTreeMap<String, String>,
    /// Memoized typed values
    converted: HashMap<String, ConfigValue>,
    comments: Comments,
    exists: bool,
    /// mtime at the last load or commit; `None` if the file did not exist
    load_time: Option<SystemTime>,
}

pub struct ConfigStore {
    filename: PathBuf,
    fields: Arc<FieldRegistry>,
    state: RwLock<StoreState>,
    commit_lock: Mutex<()>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("filename", &self.filename)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Load the store from `filename`
    ///
    /// A missing file is not an error: the store starts empty and the file is
    /// created by the first commit.
    pub fn load(filename: impl Into<PathBuf>, fields: Arc<FieldRegistry>) -> Result<Self> {
        let filename = filename.into();
        let mut state = StoreState::default();

        if filename.is_file() {
            let read_err = |source| ConfigError::Read {
                path: filename.clone(),
                source,
            };
            let text = fs::read_to_string(&filename).map_err(read_err)?;
            let mtime = fs::metadata(&filename)
                .and_then(|meta| meta.modified())
                .map_err(read_err)?;

            let parsed = format::parse(&text);
            state.values = parsed.values;
            state.comments = parsed.comments;
            state.exists = true;
            state.load_time = Some(mtime);
        }

        tracing::debug!(
            path = %filename.display(),
            exists = state.exists,
            keys = state.values.len(),
            "loaded configuration"
        );

        Ok(Self {
            filename,
            fields,
            state: RwLock::new(state),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Whether the file existed at load time or has been written since
    pub fn exists(&self) -> bool {
        self.state.read().exists
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Typed value for `key`
    ///
    /// Falls back to the field default when nothing is stored or the stored
    /// string does not convert.
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        let key = normalize_key(key);
        if let Some(value) = self.state.read().converted.get(key) {
            return Ok(value.clone());
        }

        let field = self.fields.lookup(key)?;
        let mut state = self.state.write();
        if let Some(value) = state.converted.get(key) {
            return Ok(value.clone());
        }
        let value = match state.values.get(key) {
            Some(raw) => field
                .from_string(raw)
                .unwrap_or_else(|_| field.default_value()),
            None => field.default_value(),
        };
        state.converted.insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn get_str(&self, key: &str) -> Result<String> {
        self.typed(key, |value| value.as_str().map(str::to_string))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.typed(key, ConfigValue::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.typed(key, ConfigValue::as_int)
    }

    pub fn get_list(&self, key: &str) -> Result<Vec<String>> {
        self.typed(key, |value| value.as_list().map(<[String]>::to_vec))
    }

    fn typed<T>(&self, key: &str, extract: impl FnOnce(&ConfigValue) -> Option<T>) -> Result<T> {
        let value = self.get(key)?;
        extract(&value).ok_or_else(|| ConfigError::InvalidValue {
            field: normalize_key(key).to_string(),
            message: format!("value is {}", value.type_name()),
        })
    }

    /// Whether a field is registered for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.fields.keys().map(str::to_string).collect()
    }

    /// Every registered key with its typed value
    pub fn items(&self) -> Result<Vec<(String, ConfigValue)>> {
        self.fields
            .keys()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Every registered key with its value rendered as it would be stored
    pub fn export(&self) -> Result<Vec<(String, String)>> {
        self.fields
            .iter()
            .map(|field| {
                let value = self.get(field.key())?;
                let primitive = field
                    .to_primitive(&value)
                    .map_err(|err| ConfigError::invalid(field.key(), err))?;
                Ok((field.key().to_string(), primitive))
            })
            .collect()
    }

    /// Stored string for `key`, if one is set
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.state.read().values.get(normalize_key(key)).cloned()
    }

    /// True if nothing is stored for `key`
    pub fn is_default(&self, key: &str) -> bool {
        !self.state.read().values.contains_key(normalize_key(key))
    }

    /// Snapshot of the stored strings, including keys without a registered field
    pub fn raw_values(&self) -> BTreeMap<String, String> {
        self.state.read().values.clone()
    }

    /// Snapshot of the typed value cache
    pub fn cached_values(&self) -> HashMap<String, ConfigValue> {
        self.state.read().converted.clone()
    }

    /// Start a transaction
    pub fn edit(&self) -> ConfigTransaction<'_> {
        ConfigTransaction::new(self)
    }

    /// Set and commit a single key
    pub fn change_single(&self, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        let mut tx = self.edit();
        tx.set(key, value)?;
        tx.commit()
    }

    /// Bump the file's mtime so other processes reload it
    pub fn touch(&self) -> Result<()> {
        File::options()
            .append(true)
            .open(&self.filename)
            .and_then(|file| file.set_modified(SystemTime::now()))
            .map_err(|source| ConfigError::Write {
                path: self.filename.clone(),
                source,
            })
    }

    /// True if the file was modified after it was loaded or last committed
    pub fn changed_externally(&self) -> bool {
        let Ok(meta) = fs::metadata(&self.filename) else {
            return false;
        };
        if !meta.is_file() {
            return false;
        }
        let Ok(mtime) = meta.modified() else {
            return false;
        };
        match self.state.read().load_time {
            Some(load_time) => mtime > load_time,
            None => true,
        }
    }

    /// Current state serialized the way a commit writes it
    pub fn render(&self) -> String {
        let state = self.state.read();
        format::render(&state.values, &state.comments)
    }

    pub(crate) fn apply_commit(
        &self,
        pending: &BTreeMap<String, String>,
        removals: &BTreeSet<String>,
    ) -> Result<()> {
        let _guard = self.commit_lock.lock();

        let (values, text) = {
            let state = self.state.read();
            let mut values = state.values.clone();
            values.extend(pending.iter().map(|(k, v)| (k.clone(), v.clone())));
            for key in removals {
                values.remove(key);
            }
            let text = format::render(&values, &state.comments);
            (values, text)
        };

        if let Err(source) = write_atomic(&self.filename, &text) {
            tracing::error!(
                path = %self.filename.display(),
                error = %source,
                "could not write configuration"
            );
            return Err(ConfigError::Write {
                path: self.filename.clone(),
                source,
            });
        }
        let mtime = fs::metadata(&self.filename)
            .and_then(|meta| meta.modified())
            .ok();

        let mut state = self.state.write();
        state.values = values;
        for key in pending.keys().chain(removals) {
            state.converted.remove(key);
        }
        state.exists = true;
        state.load_time = mtime;
        drop(state);

        tracing::info!(
            path = %self.filename.display(),
            changed = pending.len(),
            reverted = removals.len(),
            "configuration committed"
        );
        Ok(())
    }
}

/// Write to a unique temp file next to the target and rename it over the target
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // removed on drop unless persisted
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_file() {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
    }
    tmp.persist(path)?;
    Ok(())
}
