use crate::scoring::score_keyword;
use keywordpulse_core::KeywordRecord;
use tracing::debug;

/// Suffixes appended to the seed term, in output order.
pub const RELATED_SUFFIXES: [&str; 10] = [
    "marketing",
    "trends",
    "strategy",
    "guide",
    "analysis",
    "tips",
    "examples",
    "case study",
    "tools",
    "comparison",
];

pub const MIN_MONTHLY_SEARCHES: u64 = 1_000;
pub const MAX_MONTHLY_SEARCHES: u64 = 50_000;
pub const MIN_COMPETITION: f64 = 0.1;
pub const MAX_COMPETITION: f64 = 0.9;

/// Derives mock related keywords from a seed term.
///
/// Metrics are drawn from a fresh random source per call. A seeded generator
/// produces the same metrics for every call.
#[derive(Debug, Clone, Default)]
pub struct KeywordGenerator {
    seed: Option<u64>,
}

impl KeywordGenerator {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn generate(&self, term: &str) -> Vec<KeywordRecord> {
        let term = term.trim();
        let mut rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let records: Vec<KeywordRecord> = RELATED_SUFFIXES
            .iter()
            .map(|suffix| {
                let monthly_searches = rng.u64(MIN_MONTHLY_SEARCHES..=MAX_MONTHLY_SEARCHES);
                let competition_rate = round_to_hundredths(
                    MIN_COMPETITION + rng.f64() * (MAX_COMPETITION - MIN_COMPETITION),
                );
                score_keyword(related_keyword(term, suffix), monthly_searches, competition_rate)
            })
            .collect();

        debug!("Generated {} related keywords for '{}'", records.len(), term);
        records
    }
}

// A blank term yields the bare suffix.
fn related_keyword(term: &str, suffix: &str) -> String {
    if term.is_empty() {
        suffix.to_string()
    } else {
        format!("{} {}", term, suffix)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
