use crate::model::Priority;

const RESET: &str = "\x1b[0m";

/// Badge colours categories are hashed onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColor {
    Pink,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl CategoryColor {
    pub const ALL: [CategoryColor; 6] = [
        CategoryColor::Pink,
        CategoryColor::Blue,
        CategoryColor::Green,
        CategoryColor::Yellow,
        CategoryColor::Purple,
        CategoryColor::Orange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Self::Pink => "\x1b[38;5;218m",
            Self::Blue => "\x1b[38;5;117m",
            Self::Green => "\x1b[38;5;114m",
            Self::Yellow => "\x1b[38;5;229m",
            Self::Purple => "\x1b[38;5;183m",
            Self::Orange => "\x1b[38;5;216m",
        }
    }
}

/// Stable colour for a category name.
///
/// Runs `hash = unit + (hash << 5) - hash` over the UTF-16 code units, where
/// only the shift truncates to 32 bits, then takes `|hash % 6|`.
pub fn category_color(category: &str) -> CategoryColor {
    let mut hash: i64 = 0;
    for unit in category.encode_utf16() {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        hash = i64::from(unit) + shifted - hash;
    }
    let index = (hash % CategoryColor::ALL.len() as i64).unsigned_abs() as usize;
    CategoryColor::ALL[index]
}

fn priority_ansi(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "\x1b[38;5;203m",
        Priority::Medium => "\x1b[38;5;221m",
        Priority::Low => "\x1b[38;5;117m",
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    fn plain() -> Self {
        Self {
            accent: "",
            muted: "",
            reset: "",
        }
    }

    pub fn is_plain(&self) -> bool {
        self.reset.is_empty()
    }

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    pub fn category(&self, category: &str) -> String {
        self.paint(category_color(category).ansi(), category)
    }

    /// Uppercased group heading, coloured by the category name as given.
    pub fn category_heading(&self, category: &str) -> String {
        self.paint(category_color(category).ansi(), &category.to_uppercase())
    }

    pub fn priority(&self, priority: Priority) -> String {
        self.paint(priority_ansi(priority), priority.label())
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.is_plain() || code.is_empty() {
            text.to_string()
        } else {
            format!("{code}{text}{}", self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: RESET,
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: RESET,
        },
        Some("indigo") => Palette {
            accent: "\x1b[38;5;105m",
            muted: "\x1b[38;5;245m",
            reset: RESET,
        },
        _ => Palette::plain(),
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" | "plain" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `_`.
pub fn canonicalize_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::{CategoryColor, canonical_theme_name, category_color, palette_for_theme};
    use crate::model::Priority;

    #[test]
    fn category_colors_are_deterministic() {
        assert_eq!(category_color("General"), CategoryColor::Pink);
        assert_eq!(category_color("Work"), CategoryColor::Orange);
        assert_eq!(category_color("Home"), CategoryColor::Yellow);
        assert_eq!(category_color("Personal"), CategoryColor::Green);
        assert_eq!(category_color(""), CategoryColor::Pink);
    }

    #[test]
    fn category_color_handles_hashes_past_32_bits() {
        let name = "Quarterly planning and budget review for the whole department";
        assert_eq!(category_color(name), CategoryColor::Orange);
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), Some("default".into()));
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name("  "), Some("default".into()));
    }

    #[test]
    fn default_palette_leaves_text_plain() {
        let palette = palette_for_theme(Some("vanilla"));
        assert!(palette.is_plain());
        assert_eq!(palette.category("Work"), "Work");
        assert_eq!(palette.priority(Priority::High), "High");
    }

    #[test]
    fn themed_palette_wraps_text_in_escapes() {
        let palette = palette_for_theme(Some("noir"));
        assert_eq!(palette.accentize("Todos"), "\x1b[38;5;208mTodos\x1b[0m");
        let painted = palette.priority(Priority::High);
        assert!(painted.starts_with("\x1b[38;5;203m"));
        assert!(painted.ends_with("High\x1b[0m"));
    }

    #[test]
    fn known_themes_are_coloured_and_unknown_ones_plain() {
        for theme in ["noir", "solarized", "indigo"] {
            assert!(!palette_for_theme(Some(theme)).is_plain(), "{theme}");
        }
        assert!(palette_for_theme(Some("neon")).is_plain());
    }
}
