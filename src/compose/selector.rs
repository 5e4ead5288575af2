//! Base-template selection
//!
//! Selection goes through a heuristic collaborator so deployments can plug
//! in their own ranking. The built-in heuristic scores candidates against
//! the detected patterns and business context. Whatever the heuristic
//! answers, composition falls back to a well-known default template when the
//! answer does not resolve in the registry.

use tracing::debug;

use crate::compose::patterns::{category_for_pattern, PatternMatch};
use crate::compose::request::{Complexity, CompositionRequest};
use crate::template::BaseTemplate;

/// Template name used when the heuristic's answer does not resolve
pub const DEFAULT_BASE_TEMPLATE: &str = "page-shell";

pub type SelectionError = Box<dyn std::error::Error + Send + Sync>;

/// Inputs the heuristic may weigh
#[derive(Debug, Clone)]
pub struct SelectionContext {
    pub platform: String,
    pub complexity: Complexity,
    pub industry: Option<String>,
    pub user_type: Option<String>,
    pub data_types: Vec<String>,
    pub compliance_requirements: Vec<String>,
    pub preferred_template: Option<String>,
    pub patterns: Vec<PatternMatch>,
}

impl SelectionContext {
    pub fn from_request(request: &CompositionRequest, patterns: &[PatternMatch]) -> Self {
        Self {
            platform: request.requirements.platform.clone(),
            complexity: request.requirements.complexity,
            industry: request.context.industry.clone(),
            user_type: request.context.user_type.clone(),
            data_types: request.context.data_types.clone(),
            compliance_requirements: request.context.compliance_requirements.clone(),
            preferred_template: request.preferences.preferred_template.clone(),
            patterns: patterns.to_vec(),
        }
    }
}

pub trait SelectionHeuristic: Send + Sync {
    /// Recommend a template name for the request
    fn select_template(
        &self,
        candidates: &[&BaseTemplate],
        ctx: &SelectionContext,
    ) -> Result<String, SelectionError>;
}

/// Built-in heuristic scoring candidates by pattern affinity and context fit
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSelector;

impl WeightedSelector {
    pub(crate) fn score(&self, template: &BaseTemplate, ctx: &SelectionContext) -> f64 {
        let mut score = 0.0;

        if let Some(top) = ctx.patterns.first() {
            if category_for_pattern(&top.pattern) == Some(template.category) {
                score += 4.0 * top.confidence;
            }
        }

        for pattern in &ctx.patterns {
            let lowered = pattern.pattern.to_lowercase();
            if template.metadata.tags.iter().any(|tag| *tag == lowered) {
                score += 1.0;
            }
        }

        let needs_privacy =
            !ctx.data_types.is_empty() || !ctx.compliance_requirements.is_empty();
        if needs_privacy && template.metadata.compliance.privacy_compliant {
            score += 2.0;
        }

        if ctx.preferred_template.as_deref() == Some(template.name.as_str()) {
            score += 5.0;
        }

        score
    }
}

impl SelectionHeuristic for WeightedSelector {
    fn select_template(
        &self,
        candidates: &[&BaseTemplate],
        ctx: &SelectionContext,
    ) -> Result<String, SelectionError> {
        let mut best: Option<(&BaseTemplate, f64)> = None;
        for candidate in candidates {
            let score = self.score(candidate, ctx);
            debug!(template = %candidate.name, score, "candidate scored");
            // Strictly-greater keeps the first (lowest name) on ties.
            let better = match best {
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }
        match best {
            Some((template, _)) => Ok(template.name.clone()),
            None => Err("no base templates to select from".into()),
        }
    }
}
