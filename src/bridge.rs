use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::state::{default_sources, WaveSource};

/// Everything the frame driver reads from the editor side, captured at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub sources: Vec<WaveSource>,
    pub paused: bool,
    /// Bumped on every reset; the driver zeroes its clock when it sees a new value.
    pub reset_epoch: u64,
}

impl Controls {
    pub fn new(sources: Vec<WaveSource>) -> Self {
        Self { sources, paused: false, reset_epoch: 0 }
    }

    pub fn source(&self, id: u32) -> Option<&WaveSource> {
        self.sources.iter().find(|s| s.id == id)
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(default_sources())
    }
}

/// Shared, cloneable handle to the latest source parameters and pause flag.
///
/// Readers take an `Arc` snapshot and never hold the lock while working.
/// Writers replace whole records, so a snapshot never mixes old and new fields.
#[derive(Clone, Debug, Default)]
pub struct ParameterBridge {
    inner: Arc<RwLock<Arc<Controls>>>,
}

impl ParameterBridge {
    pub fn new(sources: Vec<WaveSource>) -> Self {
        Self::from_controls(Controls::new(sources))
    }

    pub fn from_controls(controls: Controls) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(controls))) }
    }

    pub fn snapshot(&self) -> Arc<Controls> {
        // The guarded value is always a complete snapshot, so poisoning is harmless
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn source(&self, id: u32) -> Option<WaveSource> {
        self.snapshot().source(id).copied()
    }

    /// Replace the record with the same id, or append it if the id is new.
    pub fn replace_source(&self, source: WaveSource) {
        self.update(|controls| {
            match controls.sources.iter_mut().find(|s| s.id == source.id) {
                Some(slot) => *slot = source,
                None => controls.sources.push(source),
            }
        });
    }

    pub fn set_paused(&self, paused: bool) {
        let changed = self.update(|controls| {
            let changed = controls.paused != paused;
            controls.paused = paused;
            changed
        });
        if changed {
            info!(paused, "simulation {}", if paused { "paused" } else { "resumed" });
        }
    }

    /// Flip the pause flag. Returns the new value.
    pub fn toggle_paused(&self) -> bool {
        let paused = self.update(|controls| {
            controls.paused = !controls.paused;
            controls.paused
        });
        info!(paused, "simulation {}", if paused { "paused" } else { "resumed" });
        paused
    }

    /// Restore default parameters on every source (positions kept), unpause,
    /// and ask the driver to zero its clock.
    pub fn reset(&self) {
        let epoch = self.update(|controls| {
            for source in controls.sources.iter_mut() {
                *source = source.with_default_params();
            }
            controls.paused = false;
            controls.reset_epoch += 1;
            controls.reset_epoch
        });
        info!(epoch, "simulation reset");
    }

    fn update<R>(&self, f: impl FnOnce(&mut Controls) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Copy-on-write: outstanding snapshots keep the old value
        f(Arc::make_mut(&mut guard))
    }
}
