//! Palette caching with staleness detection.
//!
//! # Records
//!
//! Each stylesheet gets two records in a [`PaletteStore`], keyed by its path:
//!
//! | Key | Value | TTL |
//! |-----|-------|-----|
//! | `rootswatch_scan_timestamp_<path>` | unix seconds of the last scan | `lifetime - 1` |
//! | `rootswatch_palette_<path>` | JSON palette | `lifetime` |
//!
//! The timestamp always expires one second before the palette, so a fresh
//! timestamp is never paired with an evicted palette.
//!
//! # Staleness
//!
//! A palette must be rebuilt when forced, when no timestamp is stored, when
//! the timestamp is older than the lifetime, or when the stylesheet was
//! modified after the last scan.
//!
//! # Failures
//!
//! The cache is an optimization. Backend errors are logged and treated as a
//! miss; nothing here returns an error to the caller.

mod clock;
mod store;

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::palette::Palette;

pub use clock::{unix_seconds, Clock, MockClock, SystemClock};
pub use store::{FileStore, MemoryStore, PaletteStore};

/// Namespace prefix for every cache key.
pub const KEY_PREFIX: &str = "rootswatch";

/// Key holding the last scan time for `path`.
pub fn timestamp_key(path: &Path) -> String {
    format!("{}_scan_timestamp_{}", KEY_PREFIX, path.display())
}

/// Key holding the palette for `path`.
pub fn palette_key(path: &Path) -> String {
    format!("{}_palette_{}", KEY_PREFIX, path.display())
}

/// Cache front end over a [`PaletteStore`].
pub struct PaletteCache<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: PaletteStore> PaletteCache<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: PaletteStore, C: Clock> PaletteCache<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored scan timestamp for `path`, if any.
    pub fn scan_timestamp(&self, path: &Path) -> Option<i64> {
        let raw = match self.store.get(&timestamp_key(path)) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache read failed");
                return None;
            }
        };
        match raw.trim().parse() {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache timestamp is corrupt");
                None
            }
        }
    }

    /// Decides whether the palette for `path` must be rebuilt.
    pub fn is_stale(&self, path: &Path, lifetime: u64, force: bool) -> bool {
        if force {
            debug!(path = %path.display(), "rebuild forced");
            return true;
        }

        let Some(scanned) = self.scan_timestamp(path) else {
            debug!(path = %path.display(), "no scan timestamp cached");
            return true;
        };

        let lifetime = i64::try_from(lifetime).unwrap_or(i64::MAX);
        if self.clock.now().saturating_sub(scanned) >= lifetime {
            debug!(path = %path.display(), scanned, "scan timestamp outlived lifetime");
            return true;
        }

        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(time) => unix_seconds(time),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read stylesheet mtime");
                return true;
            }
        };

        let stale = modified > scanned;
        debug!(path = %path.display(), modified, scanned, stale, "staleness checked");
        stale
    }

    /// Returns the cached palette for `path`, if present and unexpired.
    pub fn load(&self, path: &Path) -> Option<Palette> {
        let raw = match self.store.get(&palette_key(path)) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(palette) => Some(palette),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cached palette is corrupt");
                None
            }
        }
    }

    /// Records `palette` as freshly scanned now.
    ///
    /// The palette is written before the timestamp so a concurrent reader
    /// that sees the new timestamp also sees the new palette.
    pub fn store_palette(&self, path: &Path, palette: &Palette, lifetime: u64) {
        let json = match serde_json::to_string(palette) {
            Ok(json) => json,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot serialize palette");
                return;
            }
        };

        let palette_ttl = Duration::from_secs(lifetime);
        let timestamp_ttl = Duration::from_secs(lifetime.saturating_sub(1));

        if let Err(e) = self.store.set(&palette_key(path), &json, palette_ttl) {
            warn!(path = %path.display(), error = %e, "cache write failed");
            return;
        }
        let now = self.clock.now().to_string();
        if let Err(e) = self.store.set(&timestamp_key(path), &now, timestamp_ttl) {
            warn!(path = %path.display(), error = %e, "cache write failed");
        }
    }

    /// Drops both records for `path`.
    pub fn invalidate(&self, path: &Path) {
        for key in [timestamp_key(path), palette_key(path)] {
            if let Err(e) = self.store.delete(&key) {
                warn!(key = %key, error = %e, "cache delete failed");
            }
        }
    }
}
