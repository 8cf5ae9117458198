//! Persisted viewport settings.
//!
//! The engine only needs a place to put `(zoom, tile_x, tile_y)` between
//! sessions; hosts that keep their own settings can implement
//! [`ViewportStore`] directly.

use crate::{
    core::{
        constants::{MAX_ZOOM, MIN_ZOOM},
        viewport::ViewportState,
    },
    Result,
};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Saved viewport; `is_set` distinguishes a real save from default settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedViewport {
    pub zoom: u8,
    pub tile_x: i32,
    pub tile_y: i32,
    pub is_set: bool,
}

impl PersistedViewport {
    pub fn from_viewport(viewport: ViewportState) -> Self {
        Self {
            zoom: viewport.zoom,
            tile_x: viewport.tile_x,
            tile_y: viewport.tile_y,
            is_set: true,
        }
    }

    /// The stored viewport, if one was ever saved
    pub fn viewport(&self) -> Option<ViewportState> {
        self.is_set.then(|| {
            ViewportState::new(self.zoom.clamp(MIN_ZOOM, MAX_ZOOM), self.tile_x, self.tile_y)
        })
    }
}

impl From<ViewportState> for PersistedViewport {
    fn from(viewport: ViewportState) -> Self {
        Self::from_viewport(viewport)
    }
}

/// Storage for the last viewport between sessions
pub trait ViewportStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedViewport>>;

    fn save(&self, viewport: &PersistedViewport) -> Result<()>;
}

/// Keeps the viewport in memory; useful for tests and hosts without storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<PersistedViewport>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: PersistedViewport) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(viewport))),
        }
    }

    /// Last saved value without going through the trait
    pub fn current(&self) -> Option<PersistedViewport> {
        self.slot.lock().ok().and_then(|slot| *slot)
    }
}

impl ViewportStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedViewport>> {
        Ok(self.current())
    }

    fn save(&self, viewport: &PersistedViewport) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| crate::MapError::Config("viewport store lock poisoned".to_string()))?;
        *slot = Some(*viewport);
        Ok(())
    }
}

/// Stores the viewport as a small JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ViewportStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedViewport>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: PersistedViewport = serde_json::from_str(&contents)?;
        Ok(stored.is_set.then_some(stored))
    }

    fn save(&self, viewport: &PersistedViewport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(viewport)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
