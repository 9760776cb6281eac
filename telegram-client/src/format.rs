use keywordpulse_core::{format_count, top_keywords, KeywordRecord};
use once_cell::sync::Lazy;
use regex::Regex;

pub const ANALYSIS_FOOTER: &str = "*KeywordPulse automated analysis*";
const SUMMARY_LIMIT: usize = 5;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,3} (.+)$").expect("valid heading pattern"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"));
static ITALIC_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic pattern"));
// Underscores inside words (snake_case) are not emphasis
static ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w])_([^_\n]+)_([^\w]|$)").expect("valid italic pattern"));
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- (.+)$").expect("valid bullet pattern"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").expect("valid link pattern"));

/// Builds the chat message for a keyword set. With analysis text the text is
/// sent as-is plus a footer; otherwise a short top-five summary is built.
pub fn format_keywords_message(records: &[KeywordRecord], analysis_text: Option<&str>) -> String {
    if let Some(text) = analysis_text.filter(|t| !t.trim().is_empty()) {
        return format!("{}\n\n{}", text, ANALYSIS_FOOTER);
    }

    let mut message = String::from("*KeywordPulse Keyword Analysis*\n\n");
    for record in top_keywords(records, SUMMARY_LIMIT) {
        message.push_str(&format!(
            "• *{}*: {} monthly searches, score {}\n",
            record.keyword,
            format_count(record.monthly_searches),
            record.score
        ));
    }
    message.push_str("\nSee the KeywordPulse app for the full analysis.");
    message
}

/// Converts the markdown subset produced by the composer into Telegram HTML.
/// Link targets are kept out of the inline passes.
pub fn markdown_to_html(markdown: &str) -> String {
    let escaped = escape_html(markdown);
    let html = HEADING.replace_all(&escaped, "<b>$1</b>");
    let html = BULLET.replace_all(&html, "• $1");

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for caps in LINK.captures_iter(&html) {
        let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push_str(&convert_inline(&html[last..whole.start()]));
        out.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            href.as_str().replace('"', "&quot;"),
            convert_inline(label.as_str())
        ));
        last = whole.end();
    }
    out.push_str(&convert_inline(&html[last..]));
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn convert_inline(text: &str) -> String {
    let html = BOLD.replace_all(text, "<b>$1</b>");
    let html = ITALIC_STAR.replace_all(&html, "<i>$1</i>");
    let html = ITALIC_UNDERSCORE.replace_all(&html, "${1}<i>${2}</i>${3}");
    html.into_owned()
}
