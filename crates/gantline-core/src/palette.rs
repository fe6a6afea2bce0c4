//! Category colour assignment

use serde::{Deserialize, Serialize};

use crate::UNCATEGORIZED;

/// Colours for the standard milestone categories
pub const DEFAULT_PALETTE: [(&str, &str); 7] = [
    ("Planning & Preparation", "#009C7C"),
    ("Development & Implementation", "#A3D65C"),
    ("Documentation", "#4E76E0"),
    ("Evaluation & Visual Interface", "#C40C0C"),
    ("Progress Monitoring & Mentorship", "#FFCA28"),
    ("Bureaucracy & Procurement", "#20C4F4"),
    (UNCATEGORIZED, "#808080"),
];

/// Colours handed out, in turn, to categories missing from the palette
pub const FALLBACK_COLORS: [&str; 3] = ["#808080", "#A4D65E", "#FFE000"];

/// One category/colour pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub category: String,
    pub color: String,
}

/// Ordered mapping from category label to display colour
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMap {
    entries: Vec<CategoryColor>,
    #[serde(skip)]
    fallback_used: usize,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PALETTE
                .iter()
                .map(|(category, color)| CategoryColor {
                    category: (*category).into(),
                    color: (*color).into(),
                })
                .collect(),
            fallback_used: 0,
        }
    }
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map; every category will receive a fallback colour
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            fallback_used: 0,
        }
    }

    /// Set or replace the colour of a category
    pub fn with_color(mut self, category: impl Into<String>, color: impl Into<String>) -> Self {
        let category = category.into();
        let color = color.into();
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.color = color,
            None => self.entries.push(CategoryColor { category, color }),
        }
        self
    }

    /// Give every unmapped category the next fallback colour, in the order seen
    pub fn assign<'a>(&mut self, categories: impl IntoIterator<Item = &'a str>) {
        for category in categories {
            if self.get(category).is_none() {
                let color = FALLBACK_COLORS[self.fallback_used % FALLBACK_COLORS.len()];
                self.fallback_used += 1;
                self.entries.push(CategoryColor {
                    category: category.to_string(),
                    color: color.to_string(),
                });
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.color.as_str())
    }

    /// Colour for a category, falling back to the first fallback colour
    pub fn color_for(&self, category: &str) -> &str {
        self.get(category).unwrap_or(FALLBACK_COLORS[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryColor> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_use_palette() {
        let map = ColorMap::default();
        assert_eq!(map.color_for("Documentation"), "#4E76E0");
        assert_eq!(map.color_for(UNCATEGORIZED), "#808080");
    }

    #[test]
    fn unknown_categories_cycle_fallbacks() {
        let mut map = ColorMap::default();
        map.assign(["Documentation", "Alpha", "Beta", "Alpha", "Gamma", "Delta"]);
        assert_eq!(map.color_for("Alpha"), "#808080");
        assert_eq!(map.color_for("Beta"), "#A4D65E");
        assert_eq!(map.color_for("Gamma"), "#FFE000");
        assert_eq!(map.color_for("Delta"), "#808080");
    }

    #[test]
    fn overrides_replace_and_extend() {
        let map = ColorMap::default()
            .with_color("Documentation", "#000000")
            .with_color("Field Work", "#7B1FA2");
        assert_eq!(map.color_for("Documentation"), "#000000");
        assert_eq!(map.get("Field Work"), Some("#7B1FA2"));
    }
}
