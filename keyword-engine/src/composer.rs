//! Markdown analysis reports built from fixed templates.

use crate::category::CategoryMap;
use keywordpulse_core::{format_count, top_keywords, KeywordCategory, KeywordRecord};
use serde::Deserialize;
use tracing::debug;

pub const EMPTY_ANALYSIS: &str = "No keywords to analyze.";
pub const TOP_KEYWORD_LIMIT: usize = 5;
const DEFAULT_INSIGHT_COUNT: usize = 3;
const DEFAULT_STRATEGY_COUNT: usize = 3;

/// Renders the summary report for a set of scored keywords.
///
/// The top five records by score are listed. A strategy section is appended
/// when any input record is highly recommended, stating how many are.
pub fn compose(records: &[KeywordRecord]) -> String {
    if records.is_empty() {
        return EMPTY_ANALYSIS.to_string();
    }

    let top = top_keywords(records, TOP_KEYWORD_LIMIT);
    let mut summary = String::new();

    summary.push_str(&format!(
        "Among the analyzed keywords, '{}' recorded the highest recommendation score.\n\n",
        top[0].keyword
    ));

    summary.push_str("## Key Keyword Analysis\n\n");
    for record in &top {
        summary.push_str(&format!(
            "- **{}**: {} monthly searches, competition {:.2}, score {} ({} {})\n",
            record.keyword,
            format_count(record.monthly_searches),
            record.competition_rate,
            record.score,
            record.recommendation.emoji(),
            record.recommendation,
        ));
    }

    let high_priority = records.iter().filter(|r| r.is_high_priority()).count();
    if high_priority > 0 {
        summary.push_str("\n## Recommended Strategy\n\n");
        summary.push_str(&format!(
            "In particular, the {} keyword(s) scoring 80 or above should be prioritized for content production.\n",
            high_priority
        ));
    }

    debug!(
        "Composed analysis for {} keywords ({} characters)",
        records.len(),
        summary.len()
    );
    summary
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPreferences {
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub insight_count: Option<usize>,
    #[serde(default)]
    pub strategy_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightReport {
    pub category: KeywordCategory,
    pub text: String,
}

/// Owns the category memo used when rendering category-aware insights.
#[derive(Debug, Default)]
pub struct Composer {
    categories: CategoryMap,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn compose(&self, records: &[KeywordRecord]) -> String {
        compose(records)
    }

    /// Builds a category-aware insight and content strategy report. The
    /// first keyword decides the category unless an industry preference
    /// overrides it.
    pub fn compose_insights(
        &self,
        keywords: &[String],
        preferences: &InsightPreferences,
    ) -> InsightReport {
        let Some(main_keyword) = keywords.first() else {
            return InsightReport {
                category: KeywordCategory::General,
                text: EMPTY_ANALYSIS.to_string(),
            };
        };

        let category = preferences
            .industry
            .as_deref()
            .and_then(industry_category)
            .unwrap_or_else(|| self.categories.category_of(main_keyword));

        let insight_count = positive_or(preferences.insight_count, DEFAULT_INSIGHT_COUNT);
        let strategy_count = positive_or(preferences.strategy_count, DEFAULT_STRATEGY_COUNT);

        let mut lines = vec![
            format!("## {} Keyword Analysis", main_keyword.trim()),
            String::new(),
            "### Key Insights".to_string(),
        ];
        lines.extend(
            insights_for(category)
                .iter()
                .take(insight_count)
                .map(|insight| format!("- {}", insight)),
        );
        lines.push(String::new());
        lines.push("### Content Strategy".to_string());
        lines.extend(
            strategies_for(category)
                .iter()
                .take(strategy_count)
                .enumerate()
                .map(|(i, strategy)| format!("{}. {}", i + 1, strategy)),
        );

        debug!("Composed insights for '{}' as {}", main_keyword, category);
        InsightReport {
            category,
            text: lines.join("\n"),
        }
    }
}

fn positive_or(value: Option<usize>, default: usize) -> usize {
    match value {
        Some(0) | None => default,
        Some(n) => n,
    }
}

fn industry_category(industry: &str) -> Option<KeywordCategory> {
    let industry = industry.to_lowercase();
    let category = if industry.contains("market") {
        KeywordCategory::DigitalMarketing
    } else if industry.contains("dev") {
        KeywordCategory::AppDevelopment
    } else if industry.contains("ai") {
        KeywordCategory::AiTechnology
    } else if industry.contains("edu") {
        KeywordCategory::Education
    } else if industry.contains("health") || industry.contains("medic") {
        KeywordCategory::Health
    } else if industry.contains("financ") || industry.contains("invest") {
        KeywordCategory::Finance
    } else {
        return None;
    };
    Some(category)
}

fn insights_for(category: KeywordCategory) -> &'static [&'static str] {
    match category {
        KeywordCategory::AiTechnology => &[
            "AI technology continues to evolve rapidly, with increasing adoption across industries",
            "Large language models are becoming more accessible to businesses of all sizes",
            "Users are increasingly concerned about ethical AI and data privacy issues",
        ],
        KeywordCategory::DigitalMarketing => &[
            "Content marketing delivers 3x more leads than traditional marketing for 62% less cost",
            "Video content generates 66% more qualified leads per year",
            "Mobile-first strategies are essential as mobile traffic exceeds 55% of total web traffic",
        ],
        _ => &[
            "Content that answers specific questions performs 70% better in search rankings",
            "Visual content is processed 60,000x faster than text by the human brain",
            "Consistent publishing schedules increase audience retention by 25-30%",
        ],
    }
}

fn strategies_for(category: KeywordCategory) -> &'static [&'static str] {
    match category {
        KeywordCategory::AiTechnology => &[
            "Create educational content that demystifies complex AI concepts for your audience",
            "Develop case studies showcasing practical AI applications in relevant industries",
            "Create comparison content between different AI tools and technologies",
        ],
        KeywordCategory::DigitalMarketing => &[
            "Develop a comprehensive content calendar targeting high-value keywords in your niche",
            "Create video tutorials demonstrating practical marketing techniques with measurable results",
            "Publish data-driven case studies highlighting ROI of digital marketing strategies",
        ],
        _ => &[
            "Create comprehensive guides addressing common questions in your topic area",
            "Develop visual content like infographics to simplify complex information",
            "Establish a consistent publishing schedule to build audience expectations",
        ],
    }
}
