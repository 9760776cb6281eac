use crate::cache::{NoopCache, ResultCache};
use crate::generator::KeywordGenerator;
use keywordpulse_core::KeywordRecord;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub keywords: Vec<KeywordRecord>,
    pub cached: bool,
}

/// Related-keyword search: consults the result cache, otherwise generates
/// fresh records and offers them back to the cache.
#[derive(Clone)]
pub struct KeywordSearch {
    generator: KeywordGenerator,
    cache: Arc<dyn ResultCache>,
}

impl KeywordSearch {
    pub fn new(generator: KeywordGenerator) -> Self {
        Self::with_cache(generator, Arc::new(NoopCache))
    }

    pub fn with_cache(generator: KeywordGenerator, cache: Arc<dyn ResultCache>) -> Self {
        Self { generator, cache }
    }

    pub fn search(&self, term: &str) -> SearchOutcome {
        if let Some(keywords) = self.cache.get(term) {
            info!("Using cached results for '{}'", term);
            return SearchOutcome {
                keywords,
                cached: true,
            };
        }

        let keywords = self.generator.generate(term);
        self.cache.put(term, &keywords);

        info!("Search for '{}' found {} keywords", term, keywords.len());
        SearchOutcome {
            keywords,
            cached: false,
        }
    }
}

impl Default for KeywordSearch {
    fn default() -> Self {
        Self::new(KeywordGenerator::new())
    }
}
