//! # Rootswatch - Palettes from `:root` Custom Properties
//!
//! `rootswatch` reads a stylesheet's `:root` block and turns its custom
//! properties into a named color palette for editor integrations, caching the
//! result until the stylesheet changes.
//!
//! ## Core Concepts
//!
//! - [`scan`]: Extract `--name: value` pairs from the first `:root` rule
//! - [`build`]: Merge color and name declarations by slug into a [`Palette`]
//! - [`PaletteCache`]: Store palettes with mtime-based staleness checks
//! - [`assemble`]: Flatten a palette into the legacy toolbar's color map
//! - [`PaletteSource`]: All of the above behind one `palette()` call
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use rootswatch::{build, scan, PaletteEntry};
//!
//! let css = r#"
//! :root {
//!     --theme-primary: Brand Blue;
//!     --primary: #0073aa;
//!     --secondary: #23282d;
//!     --spacing: 4px;
//! }
//! "#;
//!
//! let slugs: BTreeSet<String> = ["primary", "secondary"].map(String::from).into();
//! let palette = build(&scan(css).unwrap(), &slugs, "theme");
//!
//! assert_eq!(
//!     palette.entries(),
//!     &[
//!         PaletteEntry::new("primary", "#0073aa", "Brand Blue"),
//!         PaletteEntry::new("secondary", "#23282d", "Secondary"),
//!     ]
//! );
//! ```
//!
//! ## Naming Conventions
//!
//! | Declaration | Becomes |
//! |-------------|---------|
//! | `--<slug>: <color>` | the color of `<slug>`, if `<slug>` is allowlisted |
//! | `--<prefix>-<slug>: <name>` | the display name of `<slug>` |
//!
//! Names are matched to colors by slug, never by position. A slug without a
//! name is displayed with its first letter upper-cased. A name without a color
//! is dropped.
//!
//! ## Caching
//!
//! [`PaletteSource`] keeps the palette in any [`PaletteStore`] (an in-memory
//! [`MemoryStore`] and a directory-backed [`FileStore`] are included) and only
//! rebuilds when the stylesheet's modification time passes the last scan,
//! the cache lifetime runs out, or a rebuild is forced. See the [`cache`]
//! module for the record layout.
//!
//! ## Errors
//!
//! - [`ConfigError`]: bad configuration, raised when a [`PaletteSource`] is built
//! - [`PaletteError::Parse`]: the stylesheet is not valid CSS
//! - cache failures are logged and treated as misses
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.

pub mod builder;
pub mod cache;
pub mod config;
mod error;
pub mod integration;
pub mod legacy;
mod palette;
pub mod scanner;
mod source;

pub use builder::{build, classify, default_name, Classified};
pub use cache::{FileStore, MemoryStore, PaletteCache, PaletteStore};
pub use config::PaletteConfig;
pub use error::{ConfigError, PaletteError, Result, ScanError, StoreError};
pub use integration::{EditorColor, WidgetSettings};
pub use legacy::{assemble, LegacyColor, LegacyLayout, LegacyMode};
pub use palette::{Palette, PaletteEntry};
pub use scanner::{scan, RawDeclaration};
pub use source::PaletteSource;
