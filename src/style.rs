//! Style attribute tags and their composition rules.
//!
//! A [`Style`] is an ordered list of [`StyleTag`]s. Composing two styles concatenates
//! their tags; when two tags of the same class conflict (two foreground colors, two
//! background colors) the later one wins. Decorations never conflict with each other.

use crate::error::{MenuError, Result};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The eight basic terminal colors addressable on every SGR terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    Gray,
}

impl ColorName {
    pub const ALL: [ColorName; 8] = [
        ColorName::Black,
        ColorName::Red,
        ColorName::Green,
        ColorName::Yellow,
        ColorName::Blue,
        ColorName::Purple,
        ColorName::Cyan,
        ColorName::Gray,
    ];

    /// ECMA-48 color number (`30 + n` foreground, `40 + n` background).
    pub fn ansi_index(self) -> u8 {
        match self {
            ColorName::Black => 0,
            ColorName::Red => 1,
            ColorName::Green => 2,
            ColorName::Yellow => 3,
            ColorName::Blue => 4,
            ColorName::Purple => 5,
            ColorName::Cyan => 6,
            ColorName::Gray => 7,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ColorName::Black => "black",
            ColorName::Red => "red",
            ColorName::Green => "green",
            ColorName::Yellow => "yellow",
            ColorName::Blue => "blue",
            ColorName::Purple => "purple",
            ColorName::Cyan => "cyan",
            ColorName::Gray => "gray",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        ColorName::ALL.into_iter().find(|color| color.name() == name)
    }
}

/// Text decorations; any combination may be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoration {
    Bold,
    Underline,
    Standout,
    Italics,
}

impl Decoration {
    pub const ALL: [Decoration; 4] = [
        Decoration::Bold,
        Decoration::Underline,
        Decoration::Standout,
        Decoration::Italics,
    ];
}

/// One style attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Foreground(ColorName),
    Background(ColorName),
    Decoration(Decoration),
}

/// Returned when a style tag name is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown style \"{0}\"")]
pub struct StyleParseError(pub String);

impl FromStr for StyleTag {
    type Err = StyleParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        let tag = match name {
            "bold" => StyleTag::Decoration(Decoration::Bold),
            "underline" => StyleTag::Decoration(Decoration::Underline),
            "standout" => StyleTag::Decoration(Decoration::Standout),
            "italics" => StyleTag::Decoration(Decoration::Italics),
            _ => {
                let color = |prefix: &str| name.strip_prefix(prefix).and_then(ColorName::from_name);
                if let Some(color) = color("fg_") {
                    StyleTag::Foreground(color)
                } else if let Some(color) = color("bg_") {
                    StyleTag::Background(color)
                } else {
                    return Err(StyleParseError(name.to_string()));
                }
            }
        };
        Ok(tag)
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleTag::Foreground(color) => write!(f, "fg_{}", color.name()),
            StyleTag::Background(color) => write!(f, "bg_{}", color.name()),
            StyleTag::Decoration(Decoration::Bold) => f.write_str("bold"),
            StyleTag::Decoration(Decoration::Underline) => f.write_str("underline"),
            StyleTag::Decoration(Decoration::Standout) => f.write_str("standout"),
            StyleTag::Decoration(Decoration::Italics) => f.write_str("italics"),
        }
    }
}

/// Ordered set of style tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    tags: Vec<StyleTag>,
}

/// The effective attributes of a [`Style`] after conflict resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub foreground: Option<ColorName>,
    pub background: Option<ColorName>,
    pub decorations: Vec<Decoration>,
}

impl ResolvedStyle {
    pub fn is_plain(&self) -> bool {
        self.foreground.is_none() && self.background.is_none() && self.decorations.is_empty()
    }
}

impl Style {
    pub fn new(tags: impl IntoIterator<Item = StyleTag>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    /// A style without any attributes.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Parse a comma separated list of tag names such as `"fg_red,bold"`.
    ///
    /// Every unknown name is collected so the error can list all of them at once.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut tags = Vec::new();
        let mut invalid = Vec::new();
        for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match name.parse::<StyleTag>() {
                Ok(tag) => tags.push(tag),
                Err(StyleParseError(name)) => invalid.push(name),
            }
        }
        if !invalid.is_empty() {
            return Err(MenuError::invalid_styles(&invalid));
        }
        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[StyleTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Concatenate `other` after `self`; `other` wins conflicts.
    pub fn then(&self, other: &Style) -> Style {
        let mut tags = self.tags.clone();
        tags.extend_from_slice(&other.tags);
        Style { tags }
    }

    /// Apply last-wins precedence per attribute class.
    pub fn resolve(&self) -> ResolvedStyle {
        let mut resolved = ResolvedStyle::default();
        for tag in &self.tags {
            match *tag {
                StyleTag::Foreground(color) => resolved.foreground = Some(color),
                StyleTag::Background(color) => resolved.background = Some(color),
                StyleTag::Decoration(decoration) => {
                    if !resolved.decorations.contains(&decoration) {
                        resolved.decorations.push(decoration);
                    }
                }
            }
        }
        resolved
    }
}

impl FromStr for Style {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self> {
        Style::parse_list(s)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.tags.iter().map(ToString::to_string).collect();
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        let style = Style::parse_list("fg_red, bold").unwrap();
        assert_eq!(
            style.tags(),
            &[
                StyleTag::Foreground(ColorName::Red),
                StyleTag::Decoration(Decoration::Bold)
            ]
        );
        assert_eq!(style.to_string(), "fg_red,bold");
    }

    #[test]
    fn empty_list_is_plain() {
        assert!(Style::parse_list("").unwrap().is_empty());
        assert!(Style::parse_list(" , ").unwrap().is_empty());
    }

    #[test]
    fn reports_every_unknown_tag() {
        let err = Style::parse_list("fg_pink,bold,blink").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The styles (\"fg_pink\", \"blink\") do not exist."
        );
    }

    #[test]
    fn later_tag_wins_per_class() {
        let base = Style::parse_list("fg_red,bg_black,bold").unwrap();
        let overlay = Style::parse_list("fg_blue,underline").unwrap();
        let resolved = base.then(&overlay).resolve();

        assert_eq!(resolved.foreground, Some(ColorName::Blue));
        assert_eq!(resolved.background, Some(ColorName::Black));
        assert_eq!(
            resolved.decorations,
            vec![Decoration::Bold, Decoration::Underline]
        );
    }

    #[test]
    fn duplicate_decorations_collapse() {
        let resolved = Style::parse_list("bold,bold").unwrap().resolve();
        assert_eq!(resolved.decorations, vec![Decoration::Bold]);
        assert!(Style::plain().resolve().is_plain());
    }
}
