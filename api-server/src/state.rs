use keyword_engine::{AnalysisProvider, Composer, KeywordSearch, TemplateProvider};
use keywordpulse_core::{AppConfig, CoreError, ErrorReporter};
use sheets_client::SheetsClient;
use std::sync::Arc;
use telegram_client::TelegramClient;
use tracing::info;

/// Shared handler state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<KeywordSearch>,
    pub composer: Arc<Composer>,
    pub provider: Arc<dyn AnalysisProvider>,
    pub sheets: Arc<SheetsClient>,
    pub telegram: Arc<TelegramClient>,
    pub reporter: Arc<ErrorReporter>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let composer = Arc::new(Composer::new());
        let provider: Arc<dyn AnalysisProvider> = Arc::new(TemplateProvider::new(composer.clone()));
        let sheets = Arc::new(SheetsClient::new(&config.google)?);
        let telegram = Arc::new(TelegramClient::new(&config.telegram)?);

        info!(
            "Application state ready (analysis: {}, sheets: {}, telegram: {})",
            provider.name(),
            sink_mode(sheets.is_configured()),
            sink_mode(telegram.is_configured())
        );

        Ok(Self {
            search: Arc::new(KeywordSearch::default()),
            composer,
            provider,
            sheets,
            telegram,
            reporter: Arc::new(ErrorReporter::new()),
        })
    }

    /// Replaces the keyword search, e.g. with a seeded generator.
    pub fn with_search(mut self, search: KeywordSearch) -> Self {
        self.search = Arc::new(search);
        self
    }
}

pub fn sink_mode(configured: bool) -> &'static str {
    if configured {
        "live"
    } else {
        "stub"
    }
}
