use keywordpulse_core::{KeywordRecord, RecommendationLabel};

/// Monthly search volume that earns the full volume half of the score.
pub const VOLUME_SATURATION: f64 = 10_000.0;
const HALF_SCORE: f64 = 50.0;

pub fn volume_score(monthly_searches: u64) -> f64 {
    (monthly_searches as f64 / VOLUME_SATURATION * HALF_SCORE).min(HALF_SCORE)
}

/// Lower competition scores higher. Rates outside `[0, 1]` are clamped.
pub fn competition_score(competition_rate: f64) -> f64 {
    HALF_SCORE * (1.0 - competition_rate.clamp(0.0, 1.0))
}

/// Blends volume and competition into an integer score in `[0, 100]`.
///
/// Halves round to the nearest even integer, so `87.5` becomes `88` and
/// `62.5` becomes `62`.
pub fn calculate_score(monthly_searches: u64, competition_rate: f64) -> u8 {
    let raw = volume_score(monthly_searches) + competition_score(competition_rate);
    raw.round_ties_even().clamp(0.0, 100.0) as u8
}

pub fn score_keyword(
    keyword: impl Into<String>,
    monthly_searches: u64,
    competition_rate: f64,
) -> KeywordRecord {
    let score = calculate_score(monthly_searches, competition_rate);
    KeywordRecord {
        keyword: keyword.into(),
        monthly_searches,
        competition_rate,
        score,
        recommendation: RecommendationLabel::from_score(score),
    }
}
