//! Dynamic composition pipeline
//!
//! Turns a free-form [`CompositionRequest`] into a concrete
//! [`CompositionResult`]: detected UI patterns, a selected base template,
//! mixins, generated slot content, a compliance report and ranked
//! alternatives. The pipeline never fails hard; any stage error degrades to
//! a fallback composition built on the default base template.

mod alternatives;
mod builder;
mod cache;
mod compliance;
mod mixins;
mod patterns;
mod request;
mod result;
mod selector;

pub use alternatives::generate_alternatives;
pub use builder::{build_composition, derive_component_name};
pub use cache::{fingerprint, CompositionCache, DEFAULT_CACHE_CAPACITY};
pub use compliance::{validate_composition, ComplianceReport};
pub use mixins::{select_mixins, MixinRule, MIXIN_RULES, PATTERN_MIXIN_SUFFIX};
pub use patterns::{analyze_patterns, PatternMatch};
pub use request::{Complexity, CompositionRequest, Preferences, RequestContext, Requirements};
pub use result::{
    estimated_complexity, estimated_tokens, AlternativeOption, Composition, CompositionMetadata,
    CompositionResult, ENGINE_VERSION,
};
pub use selector::{
    SelectionContext, SelectionError, SelectionHeuristic, WeightedSelector, DEFAULT_BASE_TEMPLATE,
};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::classification::ClassificationScheme;
use crate::context::{ContextMap, ContextValue, SlotMap};
use crate::hints::HintProvider;
use crate::template::TemplateRegistry;

/// Cooperative cancellation handle shared between a caller and a running
/// composition. Cancellation is observed at stage boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

enum PipelineAbort {
    Cancelled,
    Failed(String),
}

/// One-shot pipeline over borrowed collaborators. The owning engine holds
/// the registry lock for the duration of a composition.
pub struct Composer<'a> {
    registry: &'a TemplateRegistry,
    heuristic: &'a dyn SelectionHeuristic,
    hints: &'a dyn HintProvider,
    scheme: &'a ClassificationScheme,
}

impl<'a> Composer<'a> {
    pub fn new(
        registry: &'a TemplateRegistry,
        heuristic: &'a dyn SelectionHeuristic,
        hints: &'a dyn HintProvider,
        scheme: &'a ClassificationScheme,
    ) -> Self {
        Self {
            registry,
            heuristic,
            hints,
            scheme,
        }
    }

    /// Run the full pipeline. Stage failures and cancellation both land in
    /// [`fallback_composition`] rather than an error.
    pub fn compose(&self, request: &CompositionRequest, cancel: &CancelToken) -> CompositionResult {
        match self.try_compose(request, cancel) {
            Ok(result) => result,
            Err(PipelineAbort::Cancelled) => {
                warn!("composition cancelled, returning fallback");
                fallback_composition(request, "composition was cancelled before completion")
            }
            Err(PipelineAbort::Failed(reason)) => {
                warn!(reason, "composition failed, returning fallback");
                fallback_composition(request, &reason)
            }
        }
    }

    fn try_compose(
        &self,
        request: &CompositionRequest,
        cancel: &CancelToken,
    ) -> Result<CompositionResult, PipelineAbort> {
        let hints = match self
            .hints
            .hints(&request.description, &request.requirements.platform)
        {
            Ok(hints) => hints,
            Err(err) => {
                warn!(error = %err, "hint provider failed, continuing without hints");
                Vec::new()
            }
        };
        self.checkpoint(cancel)?;

        let patterns = analyze_patterns(&request.analysis_text(&hints));
        self.checkpoint(cancel)?;

        let candidates: Vec<_> = self.registry.bases().collect();
        let selection = SelectionContext::from_request(request, &patterns);
        let selected = match self.heuristic.select_template(&candidates, &selection) {
            Ok(name) => name,
            Err(err) => {
                warn!(error = %err, "selection heuristic failed, using the default base");
                DEFAULT_BASE_TEMPLATE.to_string()
            }
        };
        let base = self
            .registry
            .base(&selected)
            .or_else(|| self.registry.base(DEFAULT_BASE_TEMPLATE))
            .ok_or_else(|| {
                PipelineAbort::Failed(format!(
                    "no base template named `{selected}` is registered and the default base is missing"
                ))
            })?;
        self.checkpoint(cancel)?;

        let mixins = select_mixins(request, &patterns);
        let composition = build_composition(request, base, &mixins, &patterns, self.scheme);
        self.checkpoint(cancel)?;

        let report = validate_composition(request, &composition);
        let alternative_options =
            generate_alternatives(self.registry, request, &base.name, &patterns);
        let slot_count = composition.slots.len();

        Ok(CompositionResult {
            success: true,
            estimated_complexity: estimated_complexity(request, &mixins),
            estimated_tokens: estimated_tokens(request, &mixins, slot_count),
            compliance_score: report.score,
            recommendations: report.recommendations,
            alternative_options,
            metadata: CompositionMetadata::new(patterns),
            composition,
        })
    }

    fn checkpoint(&self, cancel: &CancelToken) -> Result<(), PipelineAbort> {
        if cancel.is_cancelled() {
            Err(PipelineAbort::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Minimal composition on the default base, used whenever the pipeline
/// cannot produce a real result. `success` is false and the reason is the
/// first recommendation.
pub fn fallback_composition(request: &CompositionRequest, reason: &str) -> CompositionResult {
    let mut mixins = Vec::new();
    if request.requirements.privacy_compliance || request.context.is_public_sector() {
        mixins.push("privacy-compliance".to_string());
    }

    let mut context = ContextMap::new();
    context.insert(
        "component_name".to_string(),
        ContextValue::from(derive_component_name(&request.description)),
    );
    context.insert(
        "platform".to_string(),
        ContextValue::from(request.requirements.platform.as_str()),
    );

    CompositionResult {
        success: false,
        composition: Composition {
            base_template: DEFAULT_BASE_TEMPLATE.to_string(),
            mixins,
            overrides: BTreeMap::new(),
            slots: SlotMap::new(),
            context,
        },
        metadata: CompositionMetadata::new(Vec::new()),
        recommendations: vec![
            format!("Composition fell back to `{DEFAULT_BASE_TEMPLATE}`: {reason}"),
            "Retry with a more specific description, or register the templates the request needs."
                .to_string(),
        ],
        alternative_options: Vec::new(),
        estimated_complexity: 1,
        estimated_tokens: 500,
        compliance_score: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::{NoHints, StaticHints};
    use crate::template::AccessibilityLevel;

    struct FailingHeuristic;

    impl SelectionHeuristic for FailingHeuristic {
        fn select_template(
            &self,
            _candidates: &[&crate::template::BaseTemplate],
            _ctx: &SelectionContext,
        ) -> Result<String, SelectionError> {
            Err("selector offline".into())
        }
    }

    struct FailingHints;

    impl HintProvider for FailingHints {
        fn hints(
            &self,
            _context_text: &str,
            _platform: &str,
        ) -> Result<Vec<String>, crate::hints::HintError> {
            Err("hint service unreachable".into())
        }
    }

    fn login_request() -> CompositionRequest {
        CompositionRequest::new("user login form with validation")
            .with_functionality(&["email", "password"])
            .with_accessibility(AccessibilityLevel::Aaa)
            .with_privacy_compliance(true)
            .with_data_types(&["user-credentials"])
    }

    #[test]
    fn test_login_request_composes_successfully() {
        let registry = TemplateRegistry::default_set();
        let heuristic = WeightedSelector;
        let hints = NoHints;
        let scheme = ClassificationScheme;
        let composer = Composer::new(&registry, &heuristic, &hints, &scheme);

        let result = composer.compose(&login_request(), &CancelToken::new());

        assert!(result.success);
        assert_eq!(result.composition.base_template, "form-panel");
        assert_eq!(result.metadata.patterns[0].pattern, "Form");
        assert!(result
            .composition
            .mixins
            .iter()
            .any(|m| m == "privacy-compliance"));
        assert!(result
            .composition
            .mixins
            .iter()
            .any(|m| m == "accessibility-aaa"));
        assert_eq!(result.compliance_score, 75);
        assert!(!result.alternative_options.is_empty());
        assert!(result.estimated_tokens >= 500);
    }

    #[test]
    fn test_hints_feed_pattern_analysis() {
        let registry = TemplateRegistry::default_set();
        let heuristic = WeightedSelector;
        let hints = StaticHints::new(["dashboard metrics widget"]);
        let scheme = ClassificationScheme;
        let composer = Composer::new(&registry, &heuristic, &hints, &scheme);

        let request = CompositionRequest::new("team status view");
        let result = composer.compose(&request, &CancelToken::new());

        assert!(result.success);
        assert_eq!(result.metadata.patterns[0].pattern, "Dashboard");
        assert_eq!(result.composition.base_template, "dashboard-grid");
    }

    #[test]
    fn test_failing_collaborators_still_compose() {
        let registry = TemplateRegistry::default_set();
        let heuristic = FailingHeuristic;
        let hints = FailingHints;
        let scheme = ClassificationScheme;
        let composer = Composer::new(&registry, &heuristic, &hints, &scheme);

        let result = composer.compose(&login_request(), &CancelToken::new());

        // Selector failure degrades to the default base, not to a fallback.
        assert!(result.success);
        assert_eq!(result.composition.base_template, DEFAULT_BASE_TEMPLATE);
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let registry = TemplateRegistry::new();
        let heuristic = WeightedSelector;
        let hints = NoHints;
        let scheme = ClassificationScheme;
        let composer = Composer::new(&registry, &heuristic, &hints, &scheme);

        let result = composer.compose(&login_request(), &CancelToken::new());

        assert!(!result.success);
        assert_eq!(result.composition.base_template, DEFAULT_BASE_TEMPLATE);
        assert_eq!(result.compliance_score, 0);
        assert_eq!(result.estimated_complexity, 1);
        assert!(!result.recommendations.is_empty());
        // Privacy was requested, so the fallback still carries the mixin.
        assert_eq!(result.composition.mixins, vec!["privacy-compliance"]);
    }

    #[test]
    fn test_cancelled_token_short_circuits() {
        let registry = TemplateRegistry::default_set();
        let heuristic = WeightedSelector;
        let hints = NoHints;
        let scheme = ClassificationScheme;
        let composer = Composer::new(&registry, &heuristic, &hints, &scheme);

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = composer.compose(&CompositionRequest::new("anything"), &cancel);

        assert!(!result.success);
        assert!(result.recommendations[0].contains("cancelled"));
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
