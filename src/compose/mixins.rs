//! Mixin selection rules
//!
//! Mixins are cross-cutting behavior bundles named by id. Selection is a
//! closed, ordered rule table over the request's requirement flags, followed
//! by ids derived from the top-ranked patterns. Keeping the table ordered
//! makes the resulting mixin list reproducible for identical requests.

use crate::compose::patterns::PatternMatch;
use crate::compose::request::CompositionRequest;
use crate::template::AccessibilityLevel;

pub const PATTERN_MIXIN_SUFFIX: &str = "-pattern";
const PATTERN_MIXIN_LIMIT: usize = 3;

pub struct MixinRule {
    pub mixin: &'static str,
    pub description: &'static str,
    applies: fn(&CompositionRequest) -> bool,
}

impl MixinRule {
    pub fn applies(&self, request: &CompositionRequest) -> bool {
        (self.applies)(request)
    }
}

fn needs_privacy_compliance(request: &CompositionRequest) -> bool {
    request.requirements.privacy_compliance || request.context.is_public_sector()
}

fn needs_max_accessibility(request: &CompositionRequest) -> bool {
    request.requirements.accessibility_level == AccessibilityLevel::MAX
}

fn needs_performance(request: &CompositionRequest) -> bool {
    request.requirements.performance_optimized
}

fn needs_dark_mode(request: &CompositionRequest) -> bool {
    request.requirements.dark_mode_support
}

fn needs_internationalization(request: &CompositionRequest) -> bool {
    request.requirements.international_support
}

pub const MIXIN_RULES: &[MixinRule] = &[
    MixinRule {
        mixin: "privacy-compliance",
        description: "consent handling and data minimisation scaffolding",
        applies: needs_privacy_compliance,
    },
    MixinRule {
        mixin: "accessibility-aaa",
        description: "landmarks, labels, and focus management at the highest level",
        applies: needs_max_accessibility,
    },
    MixinRule {
        mixin: "performance-optimizations",
        description: "memoisation and lazy loading",
        applies: needs_performance,
    },
    MixinRule {
        mixin: "dark-mode",
        description: "theme switching support",
        applies: needs_dark_mode,
    },
    MixinRule {
        mixin: "internationalization",
        description: "message catalogues and locale-aware formatting",
        applies: needs_internationalization,
    },
];

/// Apply the rule table in order, then derive ids from the top patterns
pub fn select_mixins(request: &CompositionRequest, patterns: &[PatternMatch]) -> Vec<String> {
    let mut mixins: Vec<String> = MIXIN_RULES
        .iter()
        .filter(|rule| rule.applies(request))
        .map(|rule| rule.mixin.to_string())
        .collect();

    for pattern in patterns.iter().take(PATTERN_MIXIN_LIMIT) {
        let id = format!("{}{}", pattern.pattern.to_lowercase(), PATTERN_MIXIN_SUFFIX);
        if !mixins.contains(&id) {
            mixins.push(id);
        }
    }
    mixins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::patterns::analyze_patterns;
    use crate::compose::request::Complexity;

    #[test]
    fn test_login_scenario_mixins() {
        let request = CompositionRequest::new("user login form")
            .with_functionality(&["email", "password"])
            .with_complexity(Complexity::Simple)
            .with_accessibility(AccessibilityLevel::Aaa)
            .with_privacy_compliance(true)
            .with_user_type("citizen")
            .with_data_types(&["personal-data"]);
        let patterns = analyze_patterns(&request.analysis_text(&[]));
        let mixins = select_mixins(&request, &patterns);
        assert_eq!(mixins[0], "privacy-compliance");
        assert_eq!(mixins[1], "accessibility-aaa");
        assert!(mixins.contains(&"form-pattern".to_string()));
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let mut request = CompositionRequest::new("everything");
        request.requirements.privacy_compliance = true;
        request.requirements.accessibility_level = AccessibilityLevel::Aaa;
        request.requirements.performance_optimized = true;
        request.requirements.dark_mode_support = true;
        request.requirements.international_support = true;
        let mixins = select_mixins(&request, &[]);
        assert_eq!(
            mixins,
            vec![
                "privacy-compliance".to_string(),
                "accessibility-aaa".to_string(),
                "performance-optimizations".to_string(),
                "dark-mode".to_string(),
                "internationalization".to_string(),
            ]
        );
    }

    #[test]
    fn test_public_sector_user_triggers_compliance() {
        let request = CompositionRequest::new("case worker portal").with_user_type("government");
        let mixins = select_mixins(&request, &[]);
        assert_eq!(mixins, vec!["privacy-compliance".to_string()]);
    }

    #[test]
    fn test_pattern_mixins_limited_to_three() {
        let request = CompositionRequest::new("plain");
        let patterns =
            analyze_patterns("form dashboard card table list navigation modal profile");
        let mixins = select_mixins(&request, &patterns);
        assert_eq!(mixins.len(), 3);
        assert!(mixins.iter().all(|m| m.ends_with(PATTERN_MIXIN_SUFFIX)));
    }

    #[test]
    fn test_no_flags_no_patterns_is_empty() {
        let request = CompositionRequest::new("plain text");
        assert!(select_mixins(&request, &[]).is_empty());
    }
}
