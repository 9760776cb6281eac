use keywordpulse_core::KeywordCategory;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Trigger phrases per category, checked in order. The first category with
/// a phrase present in the keyword wins.
const CATEGORY_TRIGGERS: &[(KeywordCategory, &[&str])] = &[
    (
        KeywordCategory::AiTechnology,
        &[
            "ai",
            "gpt",
            "chatgpt",
            "artificial intelligence",
            "machine learning",
            "deep learning",
            "claude",
            "llm",
            "generative ai",
        ],
    ),
    (
        KeywordCategory::DigitalMarketing,
        &[
            "marketing",
            "seo",
            "digital marketing",
            "social media",
            "advertising",
            "ads",
            "content marketing",
        ],
    ),
    (
        KeywordCategory::AppDevelopment,
        &[
            "app development",
            "web development",
            "programming",
            "mobile app",
            "website",
            "frontend",
            "backend",
        ],
    ),
    (
        KeywordCategory::Education,
        &[
            "education",
            "learning",
            "course",
            "online course",
            "e-learning",
            "school",
            "university",
        ],
    ),
    (
        KeywordCategory::Health,
        &[
            "health",
            "medical",
            "hospital",
            "fitness",
            "exercise",
            "diet",
            "healthcare",
        ],
    ),
    (
        KeywordCategory::Finance,
        &[
            "finance",
            "investment",
            "investing",
            "stocks",
            "economy",
            "wealth management",
            "crypto",
            "cryptocurrency",
        ],
    ),
    (
        KeywordCategory::Modeling3d,
        &["3d", "modeling", "rendering", "cad", "blender", "unity", "unreal"],
    ),
];

/// Lower-cases the keyword and collapses every run of non-alphanumeric
/// characters into a single space, so "E-Learning!" becomes "e learning".
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classifies a keyword by whole-word trigger matches.
pub fn categorize(keyword: &str) -> KeywordCategory {
    categorize_normalized(&normalize_keyword(keyword))
}

fn categorize_normalized(normalized: &str) -> KeywordCategory {
    if normalized.is_empty() {
        return KeywordCategory::General;
    }

    let padded = format!(" {} ", normalized);
    CATEGORY_TRIGGERS
        .iter()
        .find(|(_, triggers)| {
            triggers
                .iter()
                .any(|trigger| padded.contains(&format!(" {} ", normalize_keyword(trigger))))
        })
        .map(|(category, _)| *category)
        .unwrap_or(KeywordCategory::General)
}

/// Append-only memo of keyword categories keyed by normalized keyword.
///
/// Inserts are idempotent: two racing writers compute the same category, so
/// whichever lands first is kept.
#[derive(Debug, Default)]
pub struct CategoryMap {
    entries: RwLock<HashMap<String, KeywordCategory>>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_of(&self, keyword: &str) -> KeywordCategory {
        let key = normalize_keyword(keyword);
        if let Some(category) = self.entries.read().get(&key) {
            return *category;
        }

        let category = categorize_normalized(&key);
        *self.entries.write().entry(key).or_insert(category)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
