//! The closed set of command categories.

use std::fmt;
use std::str::FromStr;

/// Category a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Bot administration; restricted to configured admins.
    Admin,
    /// General purpose commands.
    Utility,
    /// Uncategorised; not listed in the help menu.
    #[default]
    None,
}

impl Category {
    /// Every category.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Utility, Self::None];

    /// Categories offered in the help menu selector.
    pub const LISTED: [Self; 2] = [Self::Admin, Self::Utility];

    /// Stable key used in select-menu values and definitions.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Utility => "UTILITY",
            Self::None => "NONE",
        }
    }

    /// Name shown to users.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Utility => "Utility",
            Self::None => "None",
        }
    }

    /// Emoji shown next to the category in the selector.
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Admin => "⚙️",
            Self::Utility => "🛠️",
            Self::None => "📦",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown category key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not a valid category {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("UTILITY".parse::<Category>(), Ok(Category::Utility));
        assert_eq!("admin".parse::<Category>(), Ok(Category::Admin));
        assert_eq!(
            "MUSIC".parse::<Category>(),
            Err(UnknownCategory("MUSIC".to_string()))
        );
    }

    #[test]
    fn test_keys_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.key().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_none_is_not_listed() {
        assert!(!Category::LISTED.contains(&Category::None));
        assert_eq!(Category::default(), Category::None);
    }
}
