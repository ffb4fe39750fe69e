//! Localized company name extraction from the quote page markup.
//!
//! Page layouts change without notice, so extraction runs through an ordered
//! list of selector strategies, most specific first. The first element whose
//! text contains Japanese script wins; this keeps an English heading or a
//! navigation label from being mistaken for the company name.

use scraper::{Html, Selector};

/// Trailing phrases the page appends to the company name.
const BOILERPLATE_SUFFIXES: &[&str] = &[
    "：株価・株式情報 - Yahoo!ファイナンス",
    " - Yahoo!ファイナンス",
    "の株価・株式情報",
    "の株価",
];

/// One way of locating a name-bearing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameStrategy {
    css: &'static str,
}

impl NameStrategy {
    pub const fn new(css: &'static str) -> Self {
        Self { css }
    }

    pub fn css(&self) -> &'static str {
        self.css
    }

    /// Text of the first matching element that contains Japanese script.
    ///
    /// A selector that fails to parse simply matches nothing.
    pub fn extract(&self, document: &Html) -> Option<String> {
        let selector = match Selector::parse(self.css) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Skipping invalid name selector {:?}: {}", self.css, e);
                return None;
            }
        };

        document
            .select(&selector)
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .find(|text| contains_japanese(text))
    }
}

/// Selector strategies in the order they are tried.
pub const DEFAULT_STRATEGIES: &[NameStrategy] = &[
    NameStrategy::new("div[class*='PriceBoard__main'] header h2"),
    NameStrategy::new("header h1"),
    NameStrategy::new("h1"),
    NameStrategy::new("title"),
];

/// True when the text has at least one character between hiragana and the end of the
/// CJK unified ideographs block.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(|c| ('\u{3040}'..='\u{9FFF}').contains(&c))
}

/// Removes portal boilerplate around a company name.
pub fn strip_boilerplate(text: &str) -> String {
    let mut name = text.trim();

    // "トヨタ自動車(株)【7203】：株価・株式情報" style titles
    if let Some(idx) = name.find('【') {
        name = name[..idx].trim_end();
    }

    loop {
        let stripped = BOILERPLATE_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix));
        match stripped {
            Some(rest) => name = rest.trim_end(),
            None => break,
        }
    }

    name.to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Runs `strategies` in order over `html` and returns the first cleaned,
/// non-empty Japanese name.
pub fn extract_display_name(html: &str, strategies: &[NameStrategy]) -> Option<String> {
    let document = Html::parse_document(html);
    strategies.iter().find_map(|strategy| {
        strategy
            .extract(&document)
            .map(|text| strip_boilerplate(&text))
            .filter(|name| contains_japanese(name))
    })
}
