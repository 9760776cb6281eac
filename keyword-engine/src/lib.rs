pub mod cache;
pub mod category;
pub mod composer;
pub mod generator;
pub mod provider;
pub mod scoring;
pub mod search;

pub use cache::{NoopCache, ResultCache};
pub use category::{categorize, normalize_keyword, CategoryMap};
pub use composer::{compose, Composer, InsightPreferences, InsightReport, EMPTY_ANALYSIS};
pub use generator::KeywordGenerator;
pub use provider::{AnalysisProvider, TemplateProvider};
pub use scoring::{calculate_score, score_keyword};
pub use search::{KeywordSearch, SearchOutcome};
