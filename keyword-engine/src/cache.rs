use keywordpulse_core::KeywordRecord;

/// Lookup seam for previously computed search results.
pub trait ResultCache: Send + Sync {
    fn get(&self, term: &str) -> Option<Vec<KeywordRecord>>;
    fn put(&self, term: &str, records: &[KeywordRecord]);
}

/// Cache that never stores anything and always reports a miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ResultCache for NoopCache {
    fn get(&self, _term: &str) -> Option<Vec<KeywordRecord>> {
        None
    }

    fn put(&self, _term: &str, _records: &[KeywordRecord]) {}
}
