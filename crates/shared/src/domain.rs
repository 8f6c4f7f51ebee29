use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Waste classes known to the classification backend, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Cardboard,
    Glass,
    Metal,
    Paper,
    Plastic,
    #[serde(rename = "Organic/Trash")]
    OrganicTrash,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cardboard,
        Category::Glass,
        Category::Metal,
        Category::Paper,
        Category::Plastic,
        Category::OrganicTrash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Cardboard => "Cardboard",
            Category::Glass => "Glass",
            Category::Metal => "Metal",
            Category::Paper => "Paper",
            Category::Plastic => "Plastic",
            Category::OrganicTrash => "Organic/Trash",
        }
    }

    /// Display color used by the stock palette.
    pub fn color(self) -> HexColor {
        match self {
            Category::Cardboard => HexColor::new(0x8B, 0x45, 0x13),
            Category::Glass => HexColor::new(0x1E, 0x90, 0xFF),
            Category::Metal => HexColor::new(0xA9, 0xA9, 0xA9),
            Category::Paper => HexColor::new(0xFF, 0xD7, 0x00),
            Category::Plastic => HexColor::new(0xFF, 0x63, 0x47),
            Category::OrganicTrash => HexColor::new(0x22, 0x8B, 0x22),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Category label to display color lookup. Never fails: unmapped labels get the fallback color.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors: HashMap<String, HexColor>,
    fallback: HexColor,
}

impl CategoryPalette {
    pub const DEFAULT_COLOR: HexColor = HexColor::new(0x77, 0x77, 0x77);

    pub fn new(entries: impl IntoIterator<Item = (String, HexColor)>, fallback: HexColor) -> Self {
        Self {
            colors: entries.into_iter().collect(),
            fallback,
        }
    }

    pub fn color_for(&self, label: &str) -> HexColor {
        self.colors.get(label).copied().unwrap_or(self.fallback)
    }
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::new(
            Category::ALL
                .into_iter()
                .map(|category| (category.label().to_string(), category.color())),
            Self::DEFAULT_COLOR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_maps_every_category() {
        let palette = CategoryPalette::default();
        for category in Category::ALL {
            assert_eq!(palette.color_for(category.label()), category.color());
        }
        assert_eq!(palette.color_for("Plastic").to_string(), "#FF6347");
        assert_eq!(palette.color_for("Organic/Trash").to_string(), "#228B22");
    }

    #[test]
    fn unmapped_label_falls_back_to_default_color() {
        let palette = CategoryPalette::default();
        assert_eq!(palette.color_for("Unknown"), CategoryPalette::DEFAULT_COLOR);
        assert_eq!(palette.color_for("plastic"), CategoryPalette::DEFAULT_COLOR);
        assert_eq!(palette.color_for(""), CategoryPalette::DEFAULT_COLOR);
    }

    #[test]
    fn colors_render_as_uppercase_hex() {
        assert_eq!(CategoryPalette::DEFAULT_COLOR.to_string(), "#777777");
        assert_eq!(HexColor::new(0x1e, 0x90, 0xff).to_string(), "#1E90FF");
        assert_eq!(Category::OrganicTrash.to_string(), "Organic/Trash");
    }
}
