//! Pattern analysis over free-form request text
//!
//! A fixed table maps UI patterns to the keywords that signal them. Matching
//! is token based so that, say, "performance" does not count as a hit for
//! "form". Confidence starts at 0.4 for a single keyword hit, grows by 0.2
//! per extra hit plus 0.1 when the pattern's own name appears, and caps at
//! 1.0.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::template::TemplateCategory;

/// A pattern inferred from request text, with match confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub description: String,
    pub confidence: f64,
}

const BASE_CONFIDENCE: f64 = 0.4;
const PER_HIT_BONUS: f64 = 0.2;
const NAME_BONUS: f64 = 0.1;
const MAX_MATCHES: usize = 10;

const PATTERN_TABLE: &[(&str, &str, &[&str])] = &[
    (
        "Form",
        "Structured data entry with labelled fields",
        &[
            "form", "input", "login", "signup", "register", "submit", "field", "validation",
            "email", "password",
        ],
    ),
    (
        "Dashboard",
        "Metric overview with widgets and charts",
        &[
            "dashboard", "metrics", "analytics", "chart", "graph", "widget", "overview", "kpi",
        ],
    ),
    (
        "Card",
        "Self-contained content summary tile",
        &["card", "tile", "summary", "preview"],
    ),
    (
        "Table",
        "Tabular data with sortable rows",
        &["table", "rows", "columns", "spreadsheet", "records"],
    ),
    (
        "List",
        "Scrollable collection of repeated items",
        &["list", "feed", "items", "collection", "timeline"],
    ),
    (
        "Navigation",
        "Menus and wayfinding chrome",
        &["navigation", "menu", "navbar", "sidebar", "breadcrumb", "tabs"],
    ),
    (
        "Modal",
        "Overlay dialog for focused interaction",
        &["modal", "dialog", "popup", "overlay", "confirmation"],
    ),
    (
        "Profile",
        "User identity and account details",
        &["profile", "account", "avatar", "bio", "identity"],
    ),
    (
        "Settings",
        "Configuration and preference controls",
        &["settings", "preferences", "configuration", "options", "toggle"],
    ),
    (
        "Landing",
        "Marketing or entry page",
        &["landing", "hero", "marketing", "homepage", "welcome"],
    ),
];

/// Rank patterns against request text, best first, at most ten
pub fn analyze_patterns(text: &str) -> Vec<PatternMatch> {
    let lowered = text.to_lowercase();
    let tokens: HashSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    let mut matches = Vec::new();
    for (name, description, keywords) in PATTERN_TABLE {
        let hits = keywords
            .iter()
            .filter(|keyword| tokens.contains(**keyword))
            .count();
        if hits == 0 {
            continue;
        }
        let mut confidence = BASE_CONFIDENCE + PER_HIT_BONUS * (hits - 1) as f64;
        if tokens.contains(name.to_lowercase().as_str()) {
            confidence += NAME_BONUS;
        }
        matches.push(PatternMatch {
            pattern: name.to_string(),
            description: description.to_string(),
            confidence: confidence.min(1.0),
        });
    }

    // Stable sort keeps table order for equal confidence.
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(MAX_MATCHES);
    matches
}

/// Registry category a pattern most naturally maps onto
pub(crate) fn category_for_pattern(pattern: &str) -> Option<TemplateCategory> {
    match pattern {
        "Form" => Some(TemplateCategory::Form),
        "Dashboard" => Some(TemplateCategory::Dashboard),
        "Card" | "Table" | "List" | "Modal" => Some(TemplateCategory::Component),
        "Navigation" => Some(TemplateCategory::Layout),
        "Profile" | "Settings" | "Landing" => Some(TemplateCategory::Page),
        _ => None,
    }
}
