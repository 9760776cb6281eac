use crate::composer::Composer;
use keywordpulse_core::KeywordRecord;
use std::sync::Arc;

/// Produces the analysis text for a set of scored keywords.
pub trait AnalysisProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze(&self, records: &[KeywordRecord]) -> String;
}

/// Fixed-template analysis backed by [`Composer`].
#[derive(Debug, Clone, Default)]
pub struct TemplateProvider {
    composer: Arc<Composer>,
}

impl TemplateProvider {
    pub fn new(composer: Arc<Composer>) -> Self {
        Self { composer }
    }
}

impl AnalysisProvider for TemplateProvider {
    fn name(&self) -> &'static str {
        "template"
    }

    fn analyze(&self, records: &[KeywordRecord]) -> String {
        self.composer.compose(records)
    }
}
