//! Legacy toolbar color map.
//!
//! The older rich-text toolbar takes a flat `[hex, label, hex, label, ...]`
//! list and a row/column grid size. Hex values carry no leading `#`.
//!
//! In strict mode the map is the derived palette alone. Otherwise the palette
//! (followed by any extra pairs) is spliced before or after the built-in
//! 36-color map.

use serde::{Deserialize, Serialize};

use crate::palette::{strip_hash, Palette};

/// Widest grid the toolbar renders.
pub const MAX_COLUMNS: usize = 8;

/// Built-in toolbar colors as `(hex, label)` pairs.
pub const DEFAULT_COLORS: [(&str, &str); 36] = [
    ("000000", "Black"),
    ("993300", "Burnt orange"),
    ("333300", "Dark olive"),
    ("003300", "Dark green"),
    ("003366", "Dark azure"),
    ("000080", "Navy Blue"),
    ("333399", "Indigo"),
    ("333333", "Very dark gray"),
    ("800000", "Maroon"),
    ("FF6600", "Orange"),
    ("808000", "Olive"),
    ("008000", "Green"),
    ("008080", "Teal"),
    ("0000FF", "Blue"),
    ("666699", "Grayish blue"),
    ("808080", "Gray"),
    ("FF0000", "Red"),
    ("FF9900", "Amber"),
    ("99CC00", "Yellow green"),
    ("339966", "Sea green"),
    ("33CCCC", "Turquoise"),
    ("3366FF", "Royal blue"),
    ("800080", "Purple"),
    ("999999", "Medium gray"),
    ("FF00FF", "Magenta"),
    ("FFCC00", "Gold"),
    ("FFFF00", "Yellow"),
    ("00FF00", "Lime"),
    ("00FFFF", "Aqua"),
    ("00CCFF", "Sky blue"),
    ("993366", "Red violet"),
    ("FFFFFF", "White"),
    ("FF99CC", "Pink"),
    ("FFCC99", "Peach"),
    ("FFFF99", "Light yellow"),
    ("CCFFCC", "Pale green"),
];

/// Where custom colors go relative to the built-in map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyMode {
    /// Before the built-in colors.
    #[default]
    Insert,
    /// After the built-in colors.
    Append,
}

/// An extra `(hex, label)` pair for the legacy map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyColor {
    pub hex: String,
    pub label: String,
}

impl LegacyColor {
    pub fn new(hex: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            label: label.into(),
        }
    }
}

/// The assembled toolbar map and grid size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLayout {
    /// Flat `[hex, label, ...]` list.
    pub map: Vec<String>,
    pub rows: usize,
    pub cols: usize,
}

impl LegacyLayout {
    /// Number of `(hex, label)` pairs in the map.
    pub fn pair_count(&self) -> usize {
        self.map.len() / 2
    }

    /// Iterates the map as `(hex, label)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

/// Builds the legacy toolbar map for `palette`.
///
/// `extra` is ignored in strict mode.
pub fn assemble(
    palette: &Palette,
    strict: bool,
    mode: LegacyMode,
    extra: &[LegacyColor],
) -> LegacyLayout {
    let custom = palette
        .iter()
        .map(|entry| (strip_hash(&entry.color), entry.name.as_str()));

    let mut map = Vec::new();
    if strict {
        push_pairs(&mut map, custom);
    } else {
        let extra = extra
            .iter()
            .map(|c| (strip_hash(&c.hex), c.label.as_str()));
        match mode {
            LegacyMode::Insert => {
                push_pairs(&mut map, custom);
                push_pairs(&mut map, extra);
                push_pairs(&mut map, DEFAULT_COLORS);
            }
            LegacyMode::Append => {
                push_pairs(&mut map, DEFAULT_COLORS);
                push_pairs(&mut map, custom);
                push_pairs(&mut map, extra);
            }
        }
    }

    let (rows, cols) = grid(map.len() / 2);
    LegacyLayout { map, rows, cols }
}

/// Grid size for `pairs` colors: `(rows, cols)`.
///
/// A count divisible by eight gets one more row for the "no color" swatch.
/// An empty map is `(0, 0)`.
pub fn grid(pairs: usize) -> (usize, usize) {
    if pairs == 0 {
        return (0, 0);
    }
    let cols = pairs.min(MAX_COLUMNS);
    let mut rows = pairs.div_ceil(16);
    if pairs % MAX_COLUMNS == 0 {
        rows += 1;
    }
    (rows, cols)
}

fn push_pairs<'a>(map: &mut Vec<String>, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    for (hex, label) in pairs {
        map.push(hex.to_string());
        map.push(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteEntry;

    fn single() -> Palette {
        Palette::from(vec![PaletteEntry::new("a", "#abcdef", "Alpha")])
    }

    fn default_map() -> Vec<String> {
        DEFAULT_COLORS
            .iter()
            .flat_map(|(hex, label)| [hex.to_string(), label.to_string()])
            .collect()
    }

    #[test]
    fn default_table_has_72_items() {
        assert_eq!(default_map().len(), 72);
        assert!(DEFAULT_COLORS.iter().all(|(hex, _)| !hex.starts_with('#')));
    }

    #[test]
    fn strict_replaces_defaults() {
        let layout = assemble(&single(), true, LegacyMode::Insert, &[]);
        assert_eq!(layout.map, vec!["abcdef", "Alpha"]);
        assert_eq!((layout.rows, layout.cols), (1, 1));
    }

    #[test]
    fn strict_ignores_extra() {
        let extra = [LegacyColor::new("#123456", "Extra")];
        let layout = assemble(&single(), true, LegacyMode::Append, &extra);
        assert_eq!(layout.map, vec!["abcdef", "Alpha"]);
    }

    #[test]
    fn permissive_insert_prepends() {
        let layout = assemble(&single(), false, LegacyMode::Insert, &[]);
        assert_eq!(&layout.map[..2], &["abcdef", "Alpha"]);
        assert_eq!(&layout.map[2..], default_map().as_slice());
    }

    #[test]
    fn permissive_append_appends() {
        let layout = assemble(&single(), false, LegacyMode::Append, &[]);
        assert_eq!(&layout.map[..72], default_map().as_slice());
        assert_eq!(&layout.map[72..], &["abcdef", "Alpha"]);
    }

    #[test]
    fn extra_follows_custom_on_the_same_edge() {
        let extra = [LegacyColor::new("#123456", "Extra")];

        let inserted = assemble(&single(), false, LegacyMode::Insert, &extra);
        assert_eq!(&inserted.map[..4], &["abcdef", "Alpha", "123456", "Extra"]);

        let appended = assemble(&single(), false, LegacyMode::Append, &extra);
        assert_eq!(&appended.map[72..], &["abcdef", "Alpha", "123456", "Extra"]);
    }

    #[test]
    fn non_hex_colors_pass_through() {
        let palette = Palette::from(vec![PaletteEntry::new("a", "rgb(0, 0, 0)", "A")]);
        let layout = assemble(&palette, true, LegacyMode::Insert, &[]);
        assert_eq!(layout.map, vec!["rgb(0, 0, 0)", "A"]);
    }

    #[test]
    fn grid_sizes() {
        assert_eq!(grid(0), (0, 0));
        assert_eq!(grid(1), (1, 1));
        assert_eq!(grid(7), (1, 7));
        assert_eq!(grid(8), (2, 8));
        assert_eq!(grid(9), (1, 8));
        assert_eq!(grid(16), (2, 8));
        assert_eq!(grid(17), (2, 8));
        assert_eq!(grid(36), (3, 8));
        assert_eq!(grid(37), (3, 8));
        assert_eq!(grid(40), (4, 8));
    }

    #[test]
    fn empty_strict_palette() {
        let layout = assemble(&Palette::new(), true, LegacyMode::Insert, &[]);
        assert!(layout.map.is_empty());
        assert_eq!((layout.rows, layout.cols), (0, 0));
    }

    #[test]
    fn pairs_iterates_in_order() {
        let layout = assemble(&single(), false, LegacyMode::Insert, &[]);
        assert_eq!(layout.pair_count(), 37);
        assert_eq!(layout.pairs().next(), Some(("abcdef", "Alpha")));
        assert_eq!(layout.pairs().last(), Some(("CCFFCC", "Pale green")));
    }

    #[test]
    fn mode_deserializes_lowercase() {
        let mode: LegacyMode = serde_yaml::from_str("append").unwrap();
        assert_eq!(mode, LegacyMode::Append);
    }
}
