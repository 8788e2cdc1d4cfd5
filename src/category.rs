//! The category registry: a closed set of category keys, synonym
//! resolution for raw classifier labels, and localized folder names.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical, locale-independent identifier for a classification bucket.
///
/// The set is closed: the classifier must resolve to one of these keys,
/// and anything it says that we do not recognize becomes [`CategoryKey::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    TeddyBears,
    Angels,
    Names,
    Cars,
    Flowers,
    Animals,
    Hearts,
    Stars,
    Butterflies,
    Babies,
    Christmas,
    Easter,
    Sports,
    Food,
    Nature,
    Other,
}

impl CategoryKey {
    /// Every key in the closed set, in prompt order.
    pub const ALL: [CategoryKey; 16] = [
        CategoryKey::TeddyBears,
        CategoryKey::Angels,
        CategoryKey::Names,
        CategoryKey::Cars,
        CategoryKey::Flowers,
        CategoryKey::Animals,
        CategoryKey::Hearts,
        CategoryKey::Stars,
        CategoryKey::Butterflies,
        CategoryKey::Babies,
        CategoryKey::Christmas,
        CategoryKey::Easter,
        CategoryKey::Sports,
        CategoryKey::Food,
        CategoryKey::Nature,
        CategoryKey::Other,
    ];

    /// The fallback key for unrecognized classifier output.
    pub const FALLBACK: CategoryKey = CategoryKey::Other;

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::TeddyBears => "teddy_bears",
            CategoryKey::Angels => "angels",
            CategoryKey::Names => "names",
            CategoryKey::Cars => "cars",
            CategoryKey::Flowers => "flowers",
            CategoryKey::Animals => "animals",
            CategoryKey::Hearts => "hearts",
            CategoryKey::Stars => "stars",
            CategoryKey::Butterflies => "butterflies",
            CategoryKey::Babies => "babies",
            CategoryKey::Christmas => "christmas",
            CategoryKey::Easter => "easter",
            CategoryKey::Sports => "sports",
            CategoryKey::Food => "food",
            CategoryKey::Nature => "nature",
            CategoryKey::Other => "other",
        }
    }

    /// Parse a canonical key name. Returns `None` for anything outside
    /// the closed set; callers wanting fallback behavior go through
    /// [`CategoryRegistry::resolve`] instead.
    pub fn parse(s: &str) -> Option<CategoryKey> {
        CategoryKey::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported display languages for folder naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::PtBr => write!(f, "pt-BR"),
        }
    }
}

/// Folder name for a key in the given locale. Total over the closed set.
pub fn localized_name(key: CategoryKey, locale: Locale) -> &'static str {
    match locale {
        Locale::En => key.as_str(),
        Locale::PtBr => match key {
            CategoryKey::TeddyBears => "ursinhos",
            CategoryKey::Angels => "anjos",
            CategoryKey::Names => "nomes",
            CategoryKey::Cars => "carrinhos",
            CategoryKey::Flowers => "flores",
            CategoryKey::Animals => "animais",
            CategoryKey::Hearts => "coracoes",
            CategoryKey::Stars => "estrelas",
            CategoryKey::Butterflies => "borboletas",
            CategoryKey::Babies => "bebes",
            CategoryKey::Christmas => "natal",
            CategoryKey::Easter => "pascoa",
            CategoryKey::Sports => "esportes",
            CategoryKey::Food => "comida",
            CategoryKey::Nature => "natureza",
            CategoryKey::Other => "outros",
        },
    }
}

/// Static, read-only mapping from raw classifier labels to category keys.
///
/// Resolution is case-insensitive exact match against the canonical key
/// names plus a curated synonym table. The built-in synonyms cover the
/// hint words from the classification prompt and the localized folder
/// names; extra entries can be merged in from configuration.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    synonyms: HashMap<String, CategoryKey>,
}

/// Synonyms shipped with the binary. Raw label on the left.
const BUILTIN_SYNONYMS: &[(&str, CategoryKey)] = &[
    ("bear", CategoryKey::TeddyBears),
    ("bears", CategoryKey::TeddyBears),
    ("teddy", CategoryKey::TeddyBears),
    ("teddy_bear", CategoryKey::TeddyBears),
    ("angel", CategoryKey::Angels),
    ("name", CategoryKey::Names),
    ("text", CategoryKey::Names),
    ("letters", CategoryKey::Names),
    ("monogram", CategoryKey::Names),
    ("car", CategoryKey::Cars),
    ("vehicle", CategoryKey::Cars),
    ("vehicles", CategoryKey::Cars),
    ("flower", CategoryKey::Flowers),
    ("floral", CategoryKey::Flowers),
    ("animal", CategoryKey::Animals),
    ("pet", CategoryKey::Animals),
    ("pets", CategoryKey::Animals),
    ("heart", CategoryKey::Hearts),
    ("love", CategoryKey::Hearts),
    ("star", CategoryKey::Stars),
    ("butterfly", CategoryKey::Butterflies),
    ("baby", CategoryKey::Babies),
    ("children", CategoryKey::Babies),
    ("kids", CategoryKey::Babies),
    ("holiday", CategoryKey::Christmas),
    ("xmas", CategoryKey::Christmas),
    ("sport", CategoryKey::Sports),
    ("tree", CategoryKey::Nature),
    ("trees", CategoryKey::Nature),
];

impl CategoryRegistry {
    /// Registry with the built-in synonym table only.
    pub fn new() -> Self {
        let mut synonyms: HashMap<String, CategoryKey> = HashMap::new();
        for &(raw, key) in BUILTIN_SYNONYMS {
            synonyms.insert(raw.to_string(), key);
        }
        // Localized folder names resolve back to their key, so a label
        // like "flores" lands in the same bucket as "flowers".
        for key in CategoryKey::ALL {
            synonyms.insert(localized_name(key, Locale::PtBr).to_string(), key);
        }
        Self { synonyms }
    }

    /// Registry with extra synonym entries merged over the built-ins.
    /// Entries whose target is not a known key are ignored with a warning.
    pub fn with_synonyms(extra: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (raw, target) in extra {
            match CategoryKey::parse(target) {
                Some(key) => {
                    registry.synonyms.insert(normalize(raw), key);
                }
                None => {
                    tracing::warn!(synonym = %raw, target = %target, "ignoring synonym for unknown category key");
                }
            }
        }
        registry
    }

    /// Map an arbitrary classifier label to a key in the closed set.
    ///
    /// Unmatched input maps deterministically to [`CategoryKey::FALLBACK`].
    /// Resolving a key's own name returns that key, so resolution is
    /// idempotent.
    pub fn resolve(&self, raw: &str) -> CategoryKey {
        let normalized = normalize(raw);
        if let Some(key) = CategoryKey::parse(&normalized) {
            return key;
        }
        self.synonyms
            .get(&normalized)
            .copied()
            .unwrap_or(CategoryKey::FALLBACK)
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, strip punctuation the model likes to add, and turn spaces
/// into underscores, so `"Teddy Bears."` matches `teddy_bears`.
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_resolve_to_themselves() {
        let registry = CategoryRegistry::new();
        for key in CategoryKey::ALL {
            assert_eq!(registry.resolve(key.as_str()), key);
        }
    }

    #[test]
    fn resolution_is_case_insensitive_and_strips_punctuation() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.resolve("Teddy Bears."), CategoryKey::TeddyBears);
        assert_eq!(registry.resolve("  FLOWERS  "), CategoryKey::Flowers);
        assert_eq!(registry.resolve("\"hearts\""), CategoryKey::Hearts);
    }

    #[test]
    fn synonyms_resolve() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.resolve("floral"), CategoryKey::Flowers);
        assert_eq!(registry.resolve("vehicles"), CategoryKey::Cars);
        assert_eq!(registry.resolve("xmas"), CategoryKey::Christmas);
    }

    #[test]
    fn localized_names_resolve_back_to_their_key() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.resolve("flores"), CategoryKey::Flowers);
        assert_eq!(registry.resolve("ursinhos"), CategoryKey::TeddyBears);
        assert_eq!(registry.resolve("outros"), CategoryKey::Other);
    }

    #[test]
    fn unknown_labels_fall_back_deterministically() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.resolve("dragons"), CategoryKey::Other);
        assert_eq!(registry.resolve("dragons"), CategoryKey::Other);
        assert_eq!(registry.resolve(""), CategoryKey::Other);
        // Resolving the fallback's own name is idempotent.
        assert_eq!(registry.resolve(CategoryKey::FALLBACK.as_str()), CategoryKey::Other);
    }

    #[test]
    fn configured_synonyms_extend_the_table() {
        let mut extra = HashMap::new();
        extra.insert("rosas".to_string(), "flowers".to_string());
        extra.insert("weird".to_string(), "not_a_key".to_string());
        let registry = CategoryRegistry::with_synonyms(&extra);
        assert_eq!(registry.resolve("rosas"), CategoryKey::Flowers);
        // Bad target entries are dropped, not misrouted.
        assert_eq!(registry.resolve("weird"), CategoryKey::Other);
    }

    #[test]
    fn localization_en_and_pt_br() {
        assert_eq!(localized_name(CategoryKey::Flowers, Locale::En), "flowers");
        assert_eq!(localized_name(CategoryKey::Flowers, Locale::PtBr), "flores");
        assert_eq!(localized_name(CategoryKey::Other, Locale::PtBr), "outros");
        assert_eq!(localized_name(CategoryKey::Hearts, Locale::PtBr), "coracoes");
    }

    #[test]
    fn key_serde_uses_snake_case() {
        let json = serde_json::to_string(&CategoryKey::TeddyBears).unwrap();
        assert_eq!(json, r#""teddy_bears""#);
        let key: CategoryKey = serde_json::from_str(r#""butterflies""#).unwrap();
        assert_eq!(key, CategoryKey::Butterflies);
    }

    #[test]
    fn locale_display() {
        assert_eq!(Locale::En.to_string(), "en");
        assert_eq!(Locale::PtBr.to_string(), "pt-BR");
    }
}
