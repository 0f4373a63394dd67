// src/store/mod.rs

//! Remembering the last watched file between runs.
//!
//! The watcher itself never touches this; the binary passes a [`HandleStore`]
//! into a [`LastResource`] and asks it which file to watch when none was
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::types::HandleStorageMode;

/// Relative path (from the state directory) to the remembered-file record.
pub const LAST_RESOURCE_PATH: &str = ".samplewatch/last_resource";

/// Abstract storage for the last watched path.
pub trait HandleStore: Send + Sync {
    fn load(&self) -> Result<Option<PathBuf>>;
    fn save(&mut self, path: &Path) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Stores the path in `<root>/.samplewatch/last_resource`.
#[derive(Debug, Clone)]
pub struct FileHandleStore {
    root: PathBuf,
}

impl FileHandleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self) -> PathBuf {
        self.root.join(LAST_RESOURCE_PATH)
    }
}

impl HandleStore for FileHandleStore {
    fn load(&self) -> Result<Option<PathBuf>> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading last resource record at {:?}", path))?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(trimmed)))
    }

    fn save(&mut self, resource: &Path) -> Result<()> {
        let path = self.record_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating state directory at {:?}", parent))?;
        }
        fs::write(&path, format!("{}\n", resource.display()))
            .with_context(|| format!("writing last resource record at {:?}", path))?;
        debug!(resource = ?resource, "stored last resource (file)");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let path = self.record_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("removing last resource record at {:?}", path))?;
            info!("forgot last resource (file)");
        }
        Ok(())
    }
}

/// Keeps the path in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandleStore {
    path: Option<PathBuf>,
}

impl MemoryHandleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandleStore for MemoryHandleStore {
    fn load(&self) -> Result<Option<PathBuf>> {
        Ok(self.path.clone())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.path = Some(path.to_path_buf());
        debug!(resource = ?path, "stored last resource (memory)");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.path = None;
        Ok(())
    }
}

/// Build the store selected in the config.
pub fn store_for_mode(mode: HandleStorageMode, root: impl Into<PathBuf>) -> Box<dyn HandleStore> {
    match mode {
        HandleStorageMode::File => Box::new(FileHandleStore::new(root)),
        HandleStorageMode::Memory => Box::new(MemoryHandleStore::new()),
    }
}

/// Either a ready value or a function producing it on first use.
pub enum Seed<T> {
    Initial(T),
    Lazy(Box<dyn FnOnce() -> T + Send>),
}

impl<T> Seed<T> {
    pub fn lazy(f: impl FnOnce() -> T + Send + 'static) -> Self {
        Seed::Lazy(Box::new(f))
    }

    /// Produce the value. Consumes the seed, so a lazy one runs at most once.
    pub fn resolve(self) -> T {
        match self {
            Seed::Initial(value) => value,
            Seed::Lazy(f) => f(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Seed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seed::Initial(value) => f.debug_tuple("Initial").field(value).finish(),
            Seed::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// The file the user last chose to watch.
///
/// Seeded either with an explicit path or lazily from the store; the seed is
/// resolved the first time [`current`](Self::current) is called.
pub struct LastResource {
    store: Box<dyn HandleStore>,
    seed: Option<Seed<Option<PathBuf>>>,
    current: Option<PathBuf>,
}

impl LastResource {
    /// Remembered path is read from `store` on first use.
    pub fn from_store(store: Box<dyn HandleStore>) -> Self {
        Self {
            store,
            seed: None,
            current: None,
        }
    }

    /// Use `seed` instead of the stored value for the first lookup.
    pub fn with_seed(mut self, seed: Seed<Option<PathBuf>>) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The chosen path: the seed if it yields one (resolved on first call),
    /// otherwise whatever the store remembers.
    pub fn current(&mut self) -> Option<&Path> {
        if self.current.is_none() {
            if let Some(seed) = self.seed.take() {
                self.current = seed.resolve();
            }
        }
        if self.current.is_none() {
            self.current = match self.store.load() {
                Ok(path) => path,
                Err(err) => {
                    warn!(error = %err, "failed to load last resource");
                    None
                }
            };
        }
        self.current.as_deref()
    }

    /// Make `path` the current resource and persist it.
    pub fn remember(&mut self, path: &Path) -> Result<()> {
        self.seed = None;
        self.current = Some(path.to_path_buf());
        self.store.save(path)
    }

    /// Drop the current resource, in memory and in the store.
    pub fn forget(&mut self) -> Result<()> {
        self.seed = None;
        self.current = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for LastResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LastResource")
            .field("seed", &self.seed)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
