//! Storage backends for the single save file

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::PersistenceError;
use crate::consts::SAVE_FILE_NAME;

/// Somewhere one save blob can be read from and written to
pub trait SaveStorage {
    /// `Ok(None)` when nothing has been saved yet
    fn read(&self) -> Result<Option<Vec<u8>>, PersistenceError>;
    /// Replace the stored blob
    fn write(&self, bytes: &[u8]) -> Result<(), PersistenceError>;
    /// Human-readable location for logs
    fn describe(&self) -> String;
}

/// Save file on the local disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Per-installation default save location
    pub fn default_path() -> PathBuf {
        Self::default_data_dir().join(SAVE_FILE_NAME)
    }

    fn default_data_dir() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join("Library/Application Support/CatPlatformer");
            }
        }
        #[cfg(target_os = "linux")]
        {
            if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
                return PathBuf::from(xdg).join("cat-platformer");
            }
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(".local/share/cat-platformer");
            }
        }
        #[cfg(target_os = "windows")]
        {
            if let Some(local) = std::env::var_os("LOCALAPPDATA") {
                return PathBuf::from(local).join("CatPlatformer");
            }
        }
        PathBuf::from("./save")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStorage for FileStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write beside the target and rename over it so a crash never truncates the save
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory save slot. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    bytes: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, if anything was written
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes.borrow().clone()
    }

    /// Overwrite the buffer directly (e.g. to simulate a corrupt file)
    pub fn set_contents(&self, bytes: impl Into<Vec<u8>>) {
        *self.bytes.borrow_mut() = Some(bytes.into());
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.contents())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.set_contents(bytes);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
