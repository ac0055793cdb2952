//! Cached palette derivation for one stylesheet.
//!
//! [`PaletteSource`] is what integrations hold on to. It owns a validated
//! configuration and a cache, and answers "what is the palette now?":
//!
//! ```text
//! palette()
//! ├── cache fresh and palette cached  → cached palette
//! └── otherwise → read → scan → build → store → new palette
//!                  └── on failure: stale cached palette if any, else error
//! ```
//!
//! Concurrent processes deriving the same stylesheet may race between the
//! staleness check and the store. Rebuilds are pure functions of the file, so
//! the last writer wins.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::builder::build;
use crate::cache::{Clock, PaletteCache, PaletteStore, SystemClock};
use crate::config::PaletteConfig;
use crate::error::{PaletteError, Result};
use crate::integration::WidgetSettings;
use crate::legacy::{assemble, LegacyLayout};
use crate::palette::Palette;
use crate::scanner::scan;

/// Derives and caches the palette for a configured stylesheet.
///
/// # Example
///
/// ```rust,ignore
/// use rootswatch::{MemoryStore, PaletteConfig, PaletteSource};
///
/// let config = PaletteConfig::new("theme.css", ["primary", "accent"]).name_prefix("theme");
/// let source = PaletteSource::new(config, MemoryStore::new())?;
///
/// for entry in source.palette()?.iter() {
///     println!("{} {} {}", entry.slug, entry.color, entry.name);
/// }
/// ```
pub struct PaletteSource<S, C = SystemClock> {
    config: PaletteConfig,
    cache: PaletteCache<S, C>,
}

impl<S: PaletteStore> PaletteSource<S, SystemClock> {
    /// Validates `config` and creates a source backed by `store`.
    pub fn new(config: PaletteConfig, store: S) -> Result<Self> {
        Self::with_clock(config, store, SystemClock)
    }
}

impl<S: PaletteStore, C: Clock> PaletteSource<S, C> {
    pub fn with_clock(config: PaletteConfig, store: S, clock: C) -> Result<Self> {
        let config = config.validate()?;
        debug!(stylesheet = %config.stylesheet.display(), "palette source ready");
        Ok(Self {
            config,
            cache: PaletteCache::with_clock(store, clock),
        })
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn cache(&self) -> &PaletteCache<S, C> {
        &self.cache
    }

    /// The absolute stylesheet path.
    pub fn stylesheet(&self) -> &Path {
        &self.config.stylesheet
    }

    /// Whether the next [`palette`](Self::palette) call will rebuild.
    pub fn is_stale(&self) -> bool {
        self.cache
            .is_stale(self.stylesheet(), self.config.lifetime, self.config.force)
    }

    /// Returns the current palette, rebuilding when the cache is stale.
    ///
    /// If a rebuild fails but an older palette is still cached, that palette
    /// is returned and the failure is logged.
    pub fn palette(&self) -> Result<Palette> {
        let path = self.stylesheet();

        if !self.is_stale() {
            if let Some(palette) = self.cache.load(path) {
                debug!(stylesheet = %path.display(), "palette served from cache");
                return Ok(palette);
            }
        }

        match self.rebuild() {
            Ok(palette) => Ok(palette),
            Err(e) => match self.cache.load(path) {
                Some(palette) => {
                    warn!(
                        stylesheet = %path.display(),
                        error = %e,
                        "rebuild failed, serving cached palette"
                    );
                    Ok(palette)
                }
                None => Err(e),
            },
        }
    }

    /// Rebuilds the palette from the stylesheet and caches it.
    pub fn rebuild(&self) -> Result<Palette> {
        let path = self.stylesheet();
        let css = fs::read_to_string(path).map_err(|source| PaletteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let declarations = scan(&css).map_err(|source| PaletteError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let palette = build(
            &declarations,
            &self.config.color_slugs,
            &self.config.name_prefix,
        );

        info!(
            stylesheet = %path.display(),
            declarations = declarations.len(),
            colors = palette.len(),
            "palette rebuilt"
        );
        self.cache
            .store_palette(path, &palette, self.config.lifetime);
        Ok(palette)
    }

    /// The legacy toolbar map for the current palette.
    pub fn legacy(&self) -> Result<LegacyLayout> {
        let palette = self.palette()?;
        Ok(assemble(
            &palette,
            self.config.strict,
            self.config.legacy_mode,
            &self.config.legacy_extra,
        ))
    }

    /// Client widget settings for the current palette.
    pub fn widget_settings(&self) -> Result<WidgetSettings> {
        Ok(WidgetSettings::new(&self.palette()?, &self.config))
    }

    /// Drops the cached palette so the next request rebuilds.
    pub fn invalidate(&self) {
        info!(stylesheet = %self.stylesheet().display(), "palette cache invalidated");
        self.cache.invalidate(self.stylesheet());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{unix_seconds, MemoryStore, MockClock};
    use crate::error::ConfigError;
    use crate::palette::PaletteEntry;
    use std::path::PathBuf;
    use std::sync::Arc;

    const CSS: &str = ":root { --accent: #ff0000; --theme-accent: Accent; }";

    struct Fixture {
        _dir: tempfile::TempDir,
        path: PathBuf,
        clock: Arc<MockClock>,
        store: MemoryStore<MockClock>,
    }

    impl Fixture {
        fn new(css: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("theme.css");
            fs::write(&path, css).unwrap();
            let mtime = unix_seconds(fs::metadata(&path).unwrap().modified().unwrap());
            let clock = Arc::new(MockClock::new(mtime));
            let store = MemoryStore::with_shared_clock(clock.clone());
            Self {
                _dir: dir,
                path,
                clock,
                store,
            }
        }

        fn config(&self) -> PaletteConfig {
            PaletteConfig::new(&self.path, ["accent"]).name_prefix("theme")
        }

        fn source(&self, config: PaletteConfig) -> PaletteSource<MemoryStore<MockClock>, Arc<MockClock>> {
            PaletteSource::with_clock(config, self.store.clone(), self.clock.clone()).unwrap()
        }
    }

    fn expected() -> Palette {
        Palette::from(vec![PaletteEntry::new("accent", "#ff0000", "Accent")])
    }

    #[test]
    fn first_call_rebuilds_and_caches() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        assert!(source.is_stale());
        assert_eq!(source.palette().unwrap(), expected());
        assert!(!source.is_stale());
        assert_eq!(fx.store.len(), 2);
    }

    #[test]
    fn fresh_cache_is_served_without_reading_file() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        source.palette().unwrap();

        // Break the file, then record a scan no older than the new mtime.
        fs::write(&fx.path, ":root { --accent: blue; ").unwrap();
        let mtime = unix_seconds(fs::metadata(&fx.path).unwrap().modified().unwrap());
        fx.clock.set(mtime);
        source
            .cache()
            .store_palette(source.stylesheet(), &expected(), 3_600);

        assert!(!source.is_stale());
        assert_eq!(source.palette().unwrap(), expected());
    }

    #[test]
    fn force_rebuilds_every_time() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config().force(true));
        source.palette().unwrap();
        assert!(source.is_stale());
        assert_eq!(source.palette().unwrap(), expected());
    }

    #[test]
    fn parse_failure_without_cache_is_an_error() {
        let fx = Fixture::new(":root { --accent: red;");
        let source = fx.source(fx.config());
        let err = source.palette().unwrap_err();
        assert!(matches!(err, PaletteError::Parse { .. }));
    }

    #[test]
    fn parse_failure_serves_previous_palette() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        source.palette().unwrap();

        fs::write(&fx.path, ":root { --accent: red;").unwrap();
        let err = source.rebuild().unwrap_err();
        assert!(matches!(err, PaletteError::Parse { .. }));

        let source = fx.source(fx.config().force(true));
        assert_eq!(source.palette().unwrap(), expected());
    }

    #[test]
    fn unreadable_stylesheet_is_an_io_error() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        fs::remove_file(&fx.path).unwrap();
        assert!(matches!(source.palette(), Err(PaletteError::Io { .. })));
    }

    #[test]
    fn missing_stylesheet_is_a_config_error() {
        let result = PaletteSource::new(
            PaletteConfig::new("/no/such/theme.css", ["accent"]),
            MemoryStore::new(),
        );
        assert!(matches!(
            result,
            Err(PaletteError::Config(ConfigError::StylesheetNotFound { .. }))
        ));
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        source.palette().unwrap();
        source.invalidate();
        assert!(fx.store.is_empty());
        assert!(source.is_stale());
    }

    #[test]
    fn legacy_uses_configured_mode() {
        let fx = Fixture::new(CSS);
        let strict = fx.source(fx.config());
        assert_eq!(strict.legacy().unwrap().map, vec!["ff0000", "Accent"]);

        let permissive = fx.source(fx.config().strict(false).legacy_extra("#010203", "Extra"));
        let layout = permissive.legacy().unwrap();
        assert_eq!(layout.pair_count(), 38);
        assert_eq!(&layout.map[..4], &["ff0000", "Accent", "010203", "Extra"]);
    }

    #[test]
    fn widget_settings_carry_palette() {
        let fx = Fixture::new(CSS);
        let source = fx.source(fx.config());
        let settings = source.widget_settings().unwrap();
        assert_eq!(settings.palette.len(), 1);
        assert!(settings.strict && settings.mimic);
    }
}
