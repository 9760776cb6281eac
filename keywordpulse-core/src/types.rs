use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse recommendation tier derived from a keyword score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationLabel {
    #[serde(rename = "Highly Recommended")]
    HighlyRecommended,
    #[serde(rename = "Recommended")]
    Recommended,
    #[serde(rename = "Low Priority")]
    LowPriority,
}

impl RecommendationLabel {
    pub const HIGH_THRESHOLD: u8 = 80;
    pub const MEDIUM_THRESHOLD: u8 = 50;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            RecommendationLabel::HighlyRecommended
        } else if score >= Self::MEDIUM_THRESHOLD {
            RecommendationLabel::Recommended
        } else {
            RecommendationLabel::LowPriority
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLabel::HighlyRecommended => "Highly Recommended",
            RecommendationLabel::Recommended => "Recommended",
            RecommendationLabel::LowPriority => "Low Priority",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RecommendationLabel::HighlyRecommended => "🟢",
            RecommendationLabel::Recommended => "🟡",
            RecommendationLabel::LowPriority => "⚪",
        }
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored candidate keyword. Records are re-derived on every search and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    pub monthly_searches: u64,
    pub competition_rate: f64,
    pub score: u8,
    pub recommendation: RecommendationLabel,
}

impl KeywordRecord {
    /// Checks the ranges a record received over the wire must respect.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.competition_rate.is_finite() || !(0.0..=1.0).contains(&self.competition_rate) {
            return Err(CoreError::invalid_input(format!(
                "competitionRate for '{}' must be within [0, 1], got {}",
                self.keyword, self.competition_rate
            )));
        }
        if self.score > 100 {
            return Err(CoreError::invalid_input(format!(
                "score for '{}' must be within [0, 100], got {}",
                self.keyword, self.score
            )));
        }
        Ok(())
    }

    pub fn is_high_priority(&self) -> bool {
        self.score >= RecommendationLabel::HIGH_THRESHOLD
    }
}

/// Returns up to `limit` records ordered by descending score. The sort is
/// stable, so records with equal scores keep their input order.
pub fn top_keywords(records: &[KeywordRecord], limit: usize) -> Vec<&KeywordRecord> {
    let mut sorted: Vec<&KeywordRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.truncate(limit);
    sorted
}

/// Formats a count with comma thousands separators, e.g. `25,000`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordCategory {
    #[serde(rename = "AI Technology")]
    AiTechnology,
    #[serde(rename = "Digital Marketing")]
    DigitalMarketing,
    #[serde(rename = "App Development")]
    AppDevelopment,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Health")]
    Health,
    #[serde(rename = "Finance")]
    Finance,
    #[serde(rename = "3D Modeling")]
    Modeling3d,
    #[serde(rename = "General")]
    General,
}

impl KeywordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::AiTechnology => "AI Technology",
            KeywordCategory::DigitalMarketing => "Digital Marketing",
            KeywordCategory::AppDevelopment => "App Development",
            KeywordCategory::Education => "Education",
            KeywordCategory::Health => "Health",
            KeywordCategory::Finance => "Finance",
            KeywordCategory::Modeling3d => "3D Modeling",
            KeywordCategory::General => "General",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
