use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;

/// Minimal persistent string storage, the shape of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory, created on first write.
///
/// Writes go to a temporary file in the same directory that is then renamed over the old value, so a crash mid-write
/// leaves the previous contents intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let mut file = NamedTempFile::new_in(&self.data_dir)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.path(key)).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_creates_its_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path().join("nested"));

        assert_eq!(store.get("scores").unwrap(), None);
        store.set("scores", "[]".to_owned()).unwrap();

        assert_eq!(store.get("scores").unwrap().as_deref(), Some("[]"));
        assert!(store.data_dir().join("scores.json").is_file());
    }

    #[test]
    fn file_store_replaces_values_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path());
        store.set("scores", "[1]".to_owned()).unwrap();
        store.set("scores", "[1,2]".to_owned()).unwrap();

        assert_eq!(store.get("scores").unwrap().as_deref(), Some("[1,2]"));
        let files: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, ["scores.json"]);
    }

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.set("k", "1".to_owned()).unwrap();
        store.set("k", "2".to_owned()).unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }
}
