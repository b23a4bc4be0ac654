//! File-backed store.
//!
//! One file per key in a configurable directory. Keys are percent-encoded
//! into file names, so any key maps to exactly one file inside the
//! directory:
//!
//! ```text
//! ~/.aegis/storage/
//! ├── aegis.users.entry
//! ├── aegis.session.entry
//! ├── aegis.tier.ana@x.com.entry
//! └── aegis.tier.o%27brien@x.com.entry
//! ```

use super::{KeyValueStore, StorageError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable store keeping each key in its own file.
///
/// # Features
///
/// - Atomic writes (write to temp, then rename)
/// - Automatic directory creation
/// - `~/` expansion of the base path
///
/// # Example
///
/// ```no_run
/// use aegis_runtime::storage::{FileStore, KeyValueStore};
/// use std::path::PathBuf;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileStore::new(PathBuf::from("~/.aegis/storage"))?;
/// store.set("aegis.session", r#"{"name":"Ana","role":"USER","email":"ana@x.com"}"#)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DirectoryCreation` if the directory cannot be created.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        let expanded = expand_tilde(&base_path);

        if !expanded.exists() {
            std::fs::create_dir_all(&expanded)
                .map_err(|e| StorageError::directory_creation(&expanded, e))?;
        }

        Ok(Self {
            base_path: expanded,
        })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let stem = file_stem(key)?;
        Ok(self.base_path.join(format!("{stem}.entry")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let stem = file_stem(key)?;
        let path = self.base_path.join(format!("{stem}.entry"));
        let temp_path = self.base_path.join(format!(".{stem}.entry.tmp"));

        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;

        debug!(key, path = %path.display(), "Wrote storage entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bytes left as-is in file names; everything else, `%` included, is escaped.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'_')
    .remove(b'@')
    .remove(b'+')
    .remove(b'-');

/// Encodes `key` into a file name stem. A leading dot is escaped too,
/// since dot-prefixed names are reserved for temp files.
fn file_stem(key: &str) -> Result<String, StorageError> {
    if key.is_empty() {
        return Err(StorageError::invalid_key(key));
    }
    let encoded = utf8_percent_encode(key, KEY_ENCODE_SET).to_string();
    Ok(match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{rest}"),
        None => encoded,
    })
}

/// Expands `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(rest) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}

/// Returns the default storage directory (`~/.aegis/storage`).
#[must_use]
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aegis")
        .join("storage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().to_path_buf()).unwrap();
        (store, temp)
    }

    #[test]
    fn set_and_get() {
        let (store, _temp) = test_store();
        store.set("aegis.session", "{}").unwrap();
        assert_eq!(store.get("aegis.session").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn get_missing_is_none() {
        let (store, _temp) = test_store();
        assert_eq!(store.get("aegis.users").unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let (store, _temp) = test_store();
        store.set("aegis.session", "{}").unwrap();
        store.remove("aegis.session").unwrap();
        store.remove("aegis.session").unwrap();
        assert_eq!(store.get("aegis.session").unwrap(), None);
    }

    #[test]
    fn email_keys_are_accepted() {
        let (store, _temp) = test_store();
        store.set("aegis.tier.ana+test@x.com", "core").unwrap();
        assert_eq!(
            store.get("aegis.tier.ana+test@x.com").unwrap().as_deref(),
            Some("core")
        );
    }

    #[test]
    fn keys_with_any_characters_round_trip() {
        let (store, _temp) = test_store();
        for key in ["aegis.tier.o'brien@x.com", "aegis.tier.a b/c@x.com", "%2E", "."] {
            store.set(key, key).unwrap();
        }
        for key in ["aegis.tier.o'brien@x.com", "aegis.tier.a b/c@x.com", "%2E", "."] {
            assert_eq!(store.get(key).unwrap().as_deref(), Some(key));
        }
    }

    #[test]
    fn path_like_keys_stay_inside_base_path() {
        let (store, temp) = test_store();
        store.set("../escape", "x").unwrap();
        store.set(".hidden", "y").unwrap();

        assert!(!temp.path().parent().unwrap().join("escape.entry").exists());
        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| !n.starts_with('.') && n.ends_with(".entry")));
        assert_eq!(store.get(".hidden").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let (store, _temp) = test_store();
        assert!(matches!(store.set("", "x"), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (store, temp) = test_store();
        store.set("aegis.users", "[]").unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let store = FileStore::new(nested.clone()).unwrap();
        assert_eq!(store.base_path(), nested.as_path());
        assert!(nested.exists());
    }

    #[test]
    fn expand_tilde_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(expand_tilde(&path), path);
    }
}
