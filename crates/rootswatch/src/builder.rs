//! Palette building from raw declarations.
//!
//! Two naming conventions are recognized:
//!
//! | Declaration | Meaning |
//! |-------------|---------|
//! | `--<slug>: <color>` | color for `<slug>`, when `<slug>` is in the allowlist |
//! | `--<prefix>-<slug>: <name>` | display name for `<slug>` |
//!
//! Color and name declarations are matched by slug, so they may appear in any
//! order. A slug's position in the palette is where its color was first seen.
//! Names without a color are dropped; colors without a name get the slug with
//! its first character upper-cased.

use std::collections::{BTreeSet, HashMap};

use cssparser::{Parser, ParserInput};

use crate::palette::{Palette, PaletteEntry};
use crate::scanner::RawDeclaration;

/// What a single declaration contributes to the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Color value for an allowlisted slug.
    Color { slug: &'a str, value: &'a str },
    /// Display name for the slug after the prefix.
    Name { slug: &'a str, value: &'a str },
    Ignored,
}

/// Classifies one declaration against the allowlist and name prefix.
///
/// Allowlist membership wins over prefix matching, so a slug that itself
/// starts with `<prefix>-` is still a color. An empty prefix disables names.
pub fn classify<'a>(
    declaration: &'a RawDeclaration,
    color_slugs: &BTreeSet<String>,
    name_prefix: &str,
) -> Classified<'a> {
    let name = declaration.name.as_str();
    let value = declaration.value.as_str();

    if color_slugs.contains(name) {
        return Classified::Color { slug: name, value };
    }

    if !name_prefix.is_empty() {
        let slug = name
            .strip_prefix(name_prefix)
            .and_then(|rest| rest.strip_prefix('-'));
        if let Some(slug) = slug {
            return Classified::Name { slug, value };
        }
    }

    Classified::Ignored
}

#[derive(Default)]
struct Working<'a> {
    color: Option<&'a str>,
    name: Option<&'a str>,
    /// Index of the first color declaration for this slug.
    position: Option<usize>,
}

/// Builds a palette from declarations in document order.
pub fn build(
    declarations: &[RawDeclaration],
    color_slugs: &BTreeSet<String>,
    name_prefix: &str,
) -> Palette {
    let mut working: HashMap<&str, Working<'_>> = HashMap::new();
    let mut next_position = 0;

    for declaration in declarations {
        match classify(declaration, color_slugs, name_prefix) {
            Classified::Color { slug, value } => {
                let entry = working.entry(slug).or_default();
                entry.color = Some(value);
                if entry.position.is_none() {
                    entry.position = Some(next_position);
                    next_position += 1;
                }
            }
            Classified::Name { slug, value } => {
                working.entry(slug).or_default().name = Some(value);
            }
            Classified::Ignored => {}
        }
    }

    let mut placed: Vec<(usize, PaletteEntry)> = working
        .into_iter()
        .filter_map(|(slug, w)| {
            let color = w.color?;
            let position = w.position?;
            let name = match w.name {
                Some(name) => display_name(name),
                None => default_name(slug),
            };
            Some((position, PaletteEntry::new(slug, color, name)))
        })
        .collect();

    placed.sort_by_key(|(position, _)| *position);
    placed.into_iter().map(|(_, entry)| entry).collect()
}

/// Unquotes a name written as a single CSS string: `"Brand Blue"` → `Brand Blue`.
/// Anything else is kept as written.
fn display_name(value: &str) -> String {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    match parser.expect_string().map(|s| s.to_string()) {
        Ok(text) if parser.is_exhausted() => text,
        _ => value.to_string(),
    }
}

/// Upper-cases the first character of a slug: `bg-color` → `Bg-color`.
pub fn default_name(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn decl(name: &str, value: &str) -> RawDeclaration {
        RawDeclaration::new(name, value)
    }

    #[test]
    fn classify_color_name_and_ignored() {
        let allow = slugs(&["accent"]);
        let color = decl("accent", "#f00");
        let name = decl("theme-accent", "Accent");
        let other = decl("spacing", "4px");

        assert_eq!(
            classify(&color, &allow, "theme"),
            Classified::Color { slug: "accent", value: "#f00" }
        );
        assert_eq!(
            classify(&name, &allow, "theme"),
            Classified::Name { slug: "accent", value: "Accent" }
        );
        assert_eq!(classify(&other, &allow, "theme"), Classified::Ignored);
    }

    #[test]
    fn classify_requires_dash_after_prefix() {
        let allow = slugs(&[]);
        assert_eq!(
            classify(&decl("themeaccent", "x"), &allow, "theme"),
            Classified::Ignored
        );
    }

    #[test]
    fn empty_prefix_disables_names() {
        let allow = slugs(&["accent"]);
        assert_eq!(
            classify(&decl("-accent", "Accent"), &allow, ""),
            Classified::Ignored
        );
    }

    #[test]
    fn allowlist_wins_over_prefix() {
        let allow = slugs(&["theme-dark"]);
        assert_eq!(
            classify(&decl("theme-dark", "#000"), &allow, "theme"),
            Classified::Color { slug: "theme-dark", value: "#000" }
        );
    }

    #[test]
    fn merges_name_before_color() {
        let decls = vec![decl("prefix-accent", "Accent"), decl("accent", "#ff0000")];
        let palette = build(&decls, &slugs(&["accent"]), "prefix");
        assert_eq!(
            palette.entries(),
            &[PaletteEntry::new("accent", "#ff0000", "Accent")]
        );
    }

    #[test]
    fn merges_color_before_name() {
        let decls = vec![decl("accent", "#ff0000"), decl("prefix-accent", "Accent")];
        let palette = build(&decls, &slugs(&["accent"]), "prefix");
        assert_eq!(
            palette.entries(),
            &[PaletteEntry::new("accent", "#ff0000", "Accent")]
        );
    }

    #[test]
    fn orphan_names_are_dropped() {
        let decls = vec![decl("prefix-ghost", "Ghost"), decl("accent", "red")];
        let palette = build(&decls, &slugs(&["accent"]), "prefix");
        assert_eq!(palette.len(), 1);
        assert!(palette.get("ghost").is_none());
    }

    #[test]
    fn default_name_capitalizes_slug() {
        let decls = vec![decl("bg-color", "#123456")];
        let palette = build(&decls, &slugs(&["bg-color"]), "");
        assert_eq!(
            palette.entries(),
            &[PaletteEntry::new("bg-color", "#123456", "Bg-color")]
        );
    }

    #[test]
    fn default_name_handles_non_ascii_and_empty() {
        assert_eq!(default_name("écru"), "Écru");
        assert_eq!(default_name("1st"), "1st");
        assert_eq!(default_name(""), "");
    }

    #[test]
    fn last_color_wins_but_position_is_first_seen() {
        let decls = vec![
            decl("a", "red"),
            decl("b", "green"),
            decl("a", "blue"),
        ];
        let palette = build(&decls, &slugs(&["a", "b"]), "");
        let got: Vec<(&str, &str)> = palette
            .iter()
            .map(|e| (e.slug.as_str(), e.color.as_str()))
            .collect();
        assert_eq!(got, vec![("a", "blue"), ("b", "green")]);
    }

    #[test]
    fn last_name_wins() {
        let decls = vec![
            decl("p-a", "First"),
            decl("a", "red"),
            decl("p-a", "Second"),
        ];
        let palette = build(&decls, &slugs(&["a"]), "p");
        assert_eq!(palette.get("a").unwrap().name, "Second");
    }

    #[test]
    fn order_follows_colors_not_names() {
        let decls = vec![
            decl("p-b", "Bee"),
            decl("p-a", "Ay"),
            decl("a", "red"),
            decl("b", "blue"),
        ];
        let palette = build(&decls, &slugs(&["a", "b"]), "p");
        let order: Vec<&str> = palette.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn undeclared_slugs_are_absent() {
        let decls = vec![decl("a", "red")];
        let palette = build(&decls, &slugs(&["a", "missing"]), "");
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn empty_allowlist_yields_empty_palette() {
        let decls = vec![decl("a", "red"), decl("p-a", "A")];
        assert!(build(&decls, &slugs(&[]), "p").is_empty());
    }

    #[test]
    fn quoted_names_are_unquoted() {
        let decls = vec![
            decl("accent", "#ff0000"),
            decl("prefix-accent", "\"Brand Accent\""),
            decl("muted", "#777"),
            decl("prefix-muted", "'Muted \\'grey\\''"),
        ];
        let palette = build(&decls, &slugs(&["accent", "muted"]), "prefix");
        assert_eq!(palette.entries()[0].name, "Brand Accent");
        assert_eq!(palette.entries()[1].name, "Muted 'grey'");
    }

    #[test]
    fn partly_quoted_names_are_kept_as_written() {
        let decls = vec![decl("accent", "#ff0000"), decl("prefix-accent", "\"Brand\" Blue")];
        let palette = build(&decls, &slugs(&["accent"]), "prefix");
        assert_eq!(palette.entries()[0].name, "\"Brand\" Blue");
    }
}
