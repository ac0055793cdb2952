//! Palette value types.
//!
//! A [`Palette`] is produced once per rebuild and never mutated afterwards.
//! It serializes as a plain JSON array of entries, which is also the cache
//! record format.

use serde::{Deserialize, Serialize};

/// One named color position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Identifier from the configured allowlist, e.g. `accent-1`.
    pub slug: String,
    /// The declared CSS value, verbatim (`#ff0000`, `rgb(...)`, `red`, ...).
    pub color: String,
    /// Display name, from a name declaration or derived from the slug.
    pub name: String,
}

impl PaletteEntry {
    pub fn new(
        slug: impl Into<String>,
        color: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            color: color.into(),
            name: name.into(),
        }
    }

    /// The color with one leading `#` removed, as the legacy toolbar expects.
    pub fn hex(&self) -> &str {
        strip_hash(&self.color)
    }
}

/// An ordered collection of palette entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    /// Looks up an entry by slug.
    pub fn get(&self, slug: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.slug == slug)
    }
}

impl From<Vec<PaletteEntry>> for Palette {
    fn from(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<PaletteEntry> for Palette {
    fn from_iter<I: IntoIterator<Item = PaletteEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Palette {
    type Item = PaletteEntry;
    type IntoIter = std::vec::IntoIter<PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub(crate) fn strip_hash(value: &str) -> &str {
    value.strip_prefix('#').unwrap_or(value)
}
