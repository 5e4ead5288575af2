//! Composition output model and estimates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compose::patterns::PatternMatch;
use crate::compose::request::CompositionRequest;
use crate::context::{ContextMap, SlotMap};
use crate::template::TemplateCategory;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The concrete plan a request composed into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub base_template: String,
    pub mixins: Vec<String>,
    /// Slot content replacements the caller asked for
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
    pub slots: SlotMap,
    pub context: ContextMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionMetadata {
    pub engine_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternMatch>,
}

impl CompositionMetadata {
    pub fn new(patterns: Vec<PatternMatch>) -> Self {
        Self {
            engine_version: ENGINE_VERSION.to_string(),
            patterns,
        }
    }
}

/// A lightweight comparison entry for another viable base template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub template: String,
    pub category: TemplateCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mixins: Vec<String>,
    /// Heuristic affinity for the request, same scale as selection
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub success: bool,
    pub composition: Composition,
    pub metadata: CompositionMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_options: Vec<AlternativeOption>,
    pub estimated_complexity: u8,
    pub estimated_tokens: usize,
    pub compliance_score: u8,
}

/// 1..10 estimate from functionality, mixin, and compliance counts
pub fn estimated_complexity(request: &CompositionRequest, mixins: &[String]) -> u8 {
    let score = 1.0
        + 0.5 * request.requirements.functionality.len() as f64
        + 0.3 * mixins.len() as f64
        + 0.2 * request.context.compliance_requirements.len() as f64
        + request.requirements.complexity.complexity_step();
    (score.round() as i64).clamp(1, 10) as u8
}

/// Rough output-size estimate used for budget planning
pub fn estimated_tokens(request: &CompositionRequest, mixins: &[String], slot_count: usize) -> usize {
    500 + 100 * request.requirements.functionality.len()
        + 150 * mixins.len()
        + 50 * slot_count
        + request.requirements.complexity.token_step()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::request::Complexity;

    #[test]
    fn test_complexity_estimate_bounds() {
        let request = CompositionRequest::new("plain");
        assert_eq!(estimated_complexity(&request, &[]), 1);

        let mut request = CompositionRequest::new("everything")
            .with_functionality(&[
                "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
            ])
            .with_complexity(Complexity::Advanced);
        request.context.compliance_requirements =
            vec!["gdpr".to_string(), "hipaa".to_string(), "sox".to_string()];
        let mixins: Vec<String> = (0..6).map(|i| format!("mixin-{i}")).collect();
        assert_eq!(estimated_complexity(&request, &mixins), 10);
    }

    #[test]
    fn test_complexity_estimate_midrange() {
        // 1 + 0.5*2 + 0.3*3 + 0.2*0 + 0 = 2.9, rounds to 3
        let request = CompositionRequest::new("login").with_functionality(&["email", "password"]);
        let mixins = vec![
            "privacy-compliance".to_string(),
            "accessibility-aaa".to_string(),
            "form-pattern".to_string(),
        ];
        assert_eq!(estimated_complexity(&request, &mixins), 3);
    }

    #[test]
    fn test_token_estimate() {
        let request = CompositionRequest::new("login")
            .with_functionality(&["email", "password"])
            .with_complexity(Complexity::Moderate);
        let mixins = vec!["form-pattern".to_string()];
        // 500 + 200 + 150 + 250 + 150
        assert_eq!(estimated_tokens(&request, &mixins, 5), 1250);
    }
}
