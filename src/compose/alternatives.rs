//! Alternative template comparison
//!
//! For the base templates not picked by selection, re-run the built-in
//! scoring and keep the ones with any affinity for the request, best first,
//! capped at three. Each entry re-derives the mixins that template would
//! carry so the caller can weigh the options.

use std::cmp::Ordering;

use crate::compose::mixins::{MIXIN_RULES, PATTERN_MIXIN_SUFFIX};
use crate::compose::patterns::PatternMatch;
use crate::compose::request::CompositionRequest;
use crate::compose::result::AlternativeOption;
use crate::compose::selector::{SelectionContext, WeightedSelector};
use crate::template::{TemplateCategory, TemplateRegistry};

const ALTERNATIVE_LIMIT: usize = 3;

pub fn generate_alternatives(
    registry: &TemplateRegistry,
    request: &CompositionRequest,
    chosen: &str,
    patterns: &[PatternMatch],
) -> Vec<AlternativeOption> {
    let ctx = SelectionContext::from_request(request, patterns);

    let rule_mixins: Vec<String> = MIXIN_RULES
        .iter()
        .filter(|rule| rule.applies(request))
        .map(|rule| rule.mixin.to_string())
        .collect();

    let mut ranked: Vec<_> = registry
        .bases()
        .filter(|base| base.name != chosen)
        .map(|base| (base, WeightedSelector.score(base, &ctx)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    ranked.sort_by(|(a, a_score), (b, b_score)| {
        b_score
            .partial_cmp(a_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    ranked
        .into_iter()
        .take(ALTERNATIVE_LIMIT)
        .map(|(base, score)| {
            let mut mixins = rule_mixins.clone();
            let pattern_id = format!(
                "{}{}",
                pattern_for_category(base.category),
                PATTERN_MIXIN_SUFFIX
            );
            if !mixins.contains(&pattern_id) {
                mixins.push(pattern_id);
            }
            AlternativeOption {
                template: base.name.clone(),
                category: base.category,
                description: base.metadata.description.clone(),
                mixins,
                score,
            }
        })
        .collect()
}

fn pattern_for_category(category: TemplateCategory) -> &'static str {
    match category {
        TemplateCategory::Form => "form",
        TemplateCategory::Dashboard => "dashboard",
        TemplateCategory::Component => "card",
        TemplateCategory::Page => "landing",
        TemplateCategory::Layout => "navigation",
    }
}
