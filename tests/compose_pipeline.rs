//! Composition pipeline end to end

use std::fs;

use template_weaver::{
    AccessibilityLevel, CancelToken, ClassificationLevel, Complexity, CompositionRequest,
    ContextValue, Engine, EngineConfig, HintProvider,
};

#[test]
fn test_login_form_scenario() {
    let engine = Engine::in_memory();
    let request = CompositionRequest::new("user login form with validation")
        .with_functionality(&["email", "password"])
        .with_accessibility(AccessibilityLevel::Aaa)
        .with_privacy_compliance(true)
        .with_data_types(&["user-credentials"]);

    let result = engine.compose(&request);

    assert!(result.success);
    assert_eq!(result.composition.base_template, "form-panel");
    assert_eq!(result.metadata.patterns[0].pattern, "Form");
    assert!(result
        .composition
        .mixins
        .contains(&"privacy-compliance".to_string()));
    assert!(result
        .composition
        .mixins
        .contains(&"accessibility-aaa".to_string()));
    assert!(result
        .composition
        .mixins
        .contains(&"form-pattern".to_string()));
    assert_eq!(result.compliance_score, 75);
    assert!(result.composition.slots["fields"].contains("email"));
    assert!(result.composition.slots["fields"].contains("password"));
}

#[test]
fn test_compliance_score_spans_full_range() {
    let engine = Engine::in_memory();

    // Nothing the checks look for is present
    let zero = CompositionRequest::new("public widget list")
        .with_user_type("government portal")
        .with_data_types(&["citizen-records"]);
    assert_eq!(engine.compose(&zero).compliance_score, 0);

    // Accessibility and privacy pass, classification and jurisdiction fail
    let mid = CompositionRequest::new("contact form")
        .with_accessibility(AccessibilityLevel::Aaa)
        .with_privacy_compliance(true)
        .with_user_type("city government office");
    assert_eq!(engine.compose(&mid).compliance_score, 50);

    // All four checks pass
    let full = CompositionRequest::new("case management dashboard")
        .with_accessibility(AccessibilityLevel::Aaa)
        .with_privacy_compliance(true)
        .with_classification(ClassificationLevel::Confidential)
        .with_user_type("state agency")
        .with_data_types(&["case-files"])
        .with_compliance_requirements(&["records-retention-act"]);
    assert_eq!(engine.compose(&full).compliance_score, 100);
}

#[test]
fn test_empty_registry_falls_back_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("registry.toml"), "version = 1\n").unwrap();
    let config = EngineConfig::new()
        .with_registry_path(dir.path().join("registry.toml"))
        .with_templates_dir(dir.path().join("templates"));
    let engine = Engine::new(config).unwrap();

    let result = engine.compose(&CompositionRequest::new("metrics dashboard"));

    assert!(!result.success);
    assert_eq!(result.composition.base_template, "page-shell");
    assert_eq!(result.compliance_score, 0);
    assert_eq!(result.estimated_complexity, 1);
    assert!(!result.recommendations.is_empty());
    // Failed compositions are never memoised
    assert_eq!(engine.cached_compositions(), 0);
}

struct FailingHints;

impl HintProvider for FailingHints {
    fn hints(
        &self,
        _context_text: &str,
        _platform: &str,
    ) -> Result<Vec<String>, template_weaver::hints::HintError> {
        Err("hint service unreachable".into())
    }
}

#[test]
fn test_failing_hint_provider_is_tolerated() {
    let engine = Engine::in_memory().with_hint_provider(FailingHints);
    let result = engine.compose(&CompositionRequest::new("user login form"));
    assert!(result.success);
    assert_eq!(result.composition.base_template, "form-panel");
}

#[test]
fn test_cancellation_returns_fallback_and_skips_cache() {
    let engine = Engine::in_memory();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = engine.compose_with_cancel(&CompositionRequest::new("metrics dashboard"), &cancel);

    assert!(!result.success);
    assert!(result.recommendations[0].contains("cancelled"));
    assert_eq!(engine.cached_compositions(), 0);

    // The same request composes normally once the token is fresh
    let result = engine.compose(&CompositionRequest::new("metrics dashboard"));
    assert!(result.success);
    assert_eq!(engine.cached_compositions(), 1);
}

#[test]
fn test_json_request_with_slot_overrides() {
    let engine = Engine::in_memory();
    let request: CompositionRequest = serde_json::from_str(
        r#"{
            "description": "metrics dashboard for operations",
            "requirements": { "functionality": ["uptime", "alerts"], "complexity": "complex" },
            "preferences": { "slot_overrides": { "title": "Ops Center" } }
        }"#,
    )
    .unwrap();

    let result = engine.compose(&request);

    assert!(result.success);
    assert_eq!(result.composition.base_template, "dashboard-grid");
    assert_eq!(result.composition.slots["title"], "Ops Center");
    assert_eq!(result.composition.overrides["title"], "Ops Center");

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"success\":true"));
    assert!(json.contains("dashboard-grid"));
}

#[test]
fn test_classification_flows_into_context() {
    let engine = Engine::in_memory();
    let request = CompositionRequest::new("records form")
        .with_classification(ClassificationLevel::Confidential);

    let context = engine.compose(&request).composition.context;

    assert_eq!(
        context.get("classification"),
        Some(&ContextValue::from("confidential"))
    );
    assert_eq!(context.get("audit_logging"), Some(&ContextValue::Bool(true)));
    assert_eq!(
        context.get("encryption_at_rest"),
        Some(&ContextValue::Bool(true))
    );
    assert_eq!(
        context.get("session_timeout_minutes"),
        Some(&ContextValue::Number(60.0))
    );
}

#[test]
fn test_estimates_scale_with_request_size() {
    let engine = Engine::in_memory();

    let small = engine.compose(&CompositionRequest::new("summary card"));
    let big = engine.compose(
        &CompositionRequest::new("analytics dashboard")
            .with_functionality(&["uptime", "alerts", "billing", "reports"])
            .with_complexity(Complexity::Advanced),
    );

    assert!(big.estimated_tokens > small.estimated_tokens);
    assert!(big.estimated_complexity > small.estimated_complexity);
    assert!((1..=10).contains(&small.estimated_complexity));
    assert!((1..=10).contains(&big.estimated_complexity));
}

#[test]
fn test_alternatives_are_scored_and_exclude_chosen() {
    let engine = Engine::in_memory();
    let request =
        CompositionRequest::new("user login form").with_data_types(&["user-credentials"]);
    let result = engine.compose(&request);

    assert!(result.success);
    assert!(!result.alternative_options.is_empty());
    assert!(result.alternative_options.len() <= 3);
    for alt in &result.alternative_options {
        assert_ne!(alt.template, result.composition.base_template);
        assert!(alt.score > 0.0);
    }
    for pair in result.alternative_options.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_preferred_template_wins_selection() {
    let engine = Engine::in_memory();
    let request = CompositionRequest::new("user login form").with_preferred_template("page-shell");

    let result = engine.compose(&request);

    assert!(result.success);
    assert_eq!(result.composition.base_template, "page-shell");
}
