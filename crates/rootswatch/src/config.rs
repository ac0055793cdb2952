//! Palette configuration.
//!
//! Configuration can be written in code with the builder methods or loaded
//! from YAML:
//!
//! ```yaml
//! stylesheet: ./assets/theme.css
//! color_slugs: [primary, secondary, accent]
//! name_prefix: theme        # --theme-primary: "Brand Blue"
//! strict: false
//! lifetime: 86400
//! legacy_mode: append
//! legacy_extra:
//!   - { hex: "#C0FFEE", label: Coffee }
//! ```
//!
//! Only `stylesheet` and `color_slugs` are required.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::legacy::{LegacyColor, LegacyMode};

/// Default cache lifetime: thirty days.
pub const DEFAULT_LIFETIME: u64 = 30 * 24 * 60 * 60;

/// Settings for deriving a palette from one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteConfig {
    /// Stylesheet to scan.
    pub stylesheet: PathBuf,

    /// Allowlist of custom-property names that hold palette colors.
    pub color_slugs: BTreeSet<String>,

    /// Prefix of name declarations (`--<prefix>-<slug>`). Empty disables names.
    #[serde(default)]
    pub name_prefix: String,

    /// Offer only the derived palette, with no free-form color choice.
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Passed through to the client color widget.
    #[serde(default = "default_true")]
    pub mimic: bool,

    /// Cache lifetime in seconds.
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,

    /// Rebuild on every request, ignoring the cache.
    #[serde(default)]
    pub force: bool,

    #[serde(default)]
    pub legacy_mode: LegacyMode,

    /// Extra legacy toolbar colors, spliced next to the palette.
    #[serde(default)]
    pub legacy_extra: Vec<LegacyColor>,
}

fn default_true() -> bool {
    true
}

fn default_lifetime() -> u64 {
    DEFAULT_LIFETIME
}

impl PaletteConfig {
    /// Creates a configuration with defaults for everything but the
    /// stylesheet and allowlist.
    pub fn new<I, S>(stylesheet: impl Into<PathBuf>, color_slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stylesheet: stylesheet.into(),
            color_slugs: color_slugs.into_iter().map(Into::into).collect(),
            name_prefix: String::new(),
            strict: true,
            mimic: true,
            lifetime: DEFAULT_LIFETIME,
            force: false,
            legacy_mode: LegacyMode::default(),
            legacy_extra: Vec::new(),
        }
    }

    /// Parses a YAML configuration document.
    ///
    /// Relative stylesheet paths are kept as written; see [`Self::resolve_relative_to`].
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a YAML configuration file, resolving a relative stylesheet path
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_relative_to(base))
    }

    /// Makes a relative stylesheet path relative to `base`.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        if self.stylesheet.is_relative() && !self.stylesheet.as_os_str().is_empty() {
            self.stylesheet = base.join(&self.stylesheet);
        }
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn mimic(mut self, mimic: bool) -> Self {
        self.mimic = mimic;
        self
    }

    pub fn lifetime(mut self, seconds: u64) -> Self {
        self.lifetime = seconds;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn legacy_mode(mut self, mode: LegacyMode) -> Self {
        self.legacy_mode = mode;
        self
    }

    pub fn legacy_extra(mut self, hex: impl Into<String>, label: impl Into<String>) -> Self {
        self.legacy_extra.push(LegacyColor::new(hex, label));
        self
    }

    /// Checks required fields and canonicalizes the stylesheet path.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.stylesheet.as_os_str().is_empty() {
            return Err(ConfigError::MissingStylesheet);
        }
        if self.lifetime == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        self.stylesheet = self.stylesheet.canonicalize().map_err(|source| {
            ConfigError::StylesheetNotFound {
                path: self.stylesheet.clone(),
                source,
            }
        })?;
        if !self.stylesheet.is_file() {
            return Err(ConfigError::StylesheetNotFound {
                path: self.stylesheet,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            });
        }
        Ok(self)
    }
}
