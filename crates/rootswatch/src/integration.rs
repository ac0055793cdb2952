//! Payloads handed to editor integrations.
//!
//! Nothing here renders scripts or markup. These are the structured values the
//! editor glue registers or serializes:
//!
//! - [`EditorColor`] list for color-palette registration
//! - [`Palette::editor_css`] for the `.has-<slug>-color` utility classes
//! - [`WidgetSettings`] for the client-side color widget

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::PaletteConfig;
use crate::palette::Palette;

/// One color as the editor's palette registration expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorColor {
    pub name: String,
    pub slug: String,
    pub color: String,
}

/// Settings for the client-side color widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub palette: Vec<EditorColor>,
    /// Hide free-form color input.
    pub strict: bool,
    /// Style the widget after the editor's native picker.
    pub mimic: bool,
}

impl WidgetSettings {
    pub fn new(palette: &Palette, config: &PaletteConfig) -> Self {
        Self {
            palette: palette.editor_colors(),
            strict: config.strict,
            mimic: config.mimic,
        }
    }
}

impl Palette {
    /// Entries in the shape used for editor palette registration.
    pub fn editor_colors(&self) -> Vec<EditorColor> {
        self.iter()
            .map(|entry| EditorColor {
                name: entry.name.clone(),
                slug: entry.slug.clone(),
                color: entry.color.clone(),
            })
            .collect()
    }

    /// Text and background utility classes for every entry, in palette order.
    ///
    /// ```
    /// use rootswatch::{Palette, PaletteEntry};
    ///
    /// let palette = Palette::from(vec![PaletteEntry::new("accent", "#f00", "Accent")]);
    /// assert_eq!(
    ///     palette.editor_css(),
    ///     ".has-accent-color { color: #f00; }\n\
    ///      .has-accent-background-color { background-color: #f00; }\n"
    /// );
    /// ```
    pub fn editor_css(&self) -> String {
        let mut css = String::new();
        for entry in self {
            let _ = writeln!(
                css,
                ".has-{slug}-color {{ color: {color}; }}",
                slug = entry.slug,
                color = entry.color
            );
            let _ = writeln!(
                css,
                ".has-{slug}-background-color {{ background-color: {color}; }}",
                slug = entry.slug,
                color = entry.color
            );
        }
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteEntry;
    use insta::assert_snapshot;

    fn palette() -> Palette {
        Palette::from(vec![
            PaletteEntry::new("primary", "#0073aa", "Brand Blue"),
            PaletteEntry::new("muted", "rgb(120, 120, 120)", "Muted"),
        ])
    }

    #[test]
    fn editor_css_lists_both_classes_per_entry() {
        assert_snapshot!(palette().editor_css().trim_end(), @r"
        .has-primary-color { color: #0073aa; }
        .has-primary-background-color { background-color: #0073aa; }
        .has-muted-color { color: rgb(120, 120, 120); }
        .has-muted-background-color { background-color: rgb(120, 120, 120); }
        ");
    }

    #[test]
    fn editor_css_empty_palette() {
        assert_eq!(Palette::new().editor_css(), "");
    }

    #[test]
    fn editor_colors_serialize_in_registration_shape() {
        let json = serde_json::to_value(palette().editor_colors()).unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({ "name": "Brand Blue", "slug": "primary", "color": "#0073aa" })
        );
    }

    #[test]
    fn widget_settings_pass_flags_through() {
        let config = PaletteConfig::new("a.css", ["primary"]).strict(false).mimic(false);
        let settings = WidgetSettings::new(&palette(), &config);
        assert!(!settings.strict);
        assert!(!settings.mimic);
        assert_eq!(settings.palette.len(), 2);
    }
}
