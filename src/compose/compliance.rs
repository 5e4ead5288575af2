//! Compliance validation and scoring
//!
//! Four independent checks, each worth 25 points of the compliance score.
//! Every failing check contributes one violation plus one remediation
//! recommendation, so a caller can see both what is wrong and what to change.

use crate::compose::request::CompositionRequest;
use crate::compose::result::Composition;
use crate::template::AccessibilityLevel;

const AXIS_POINTS: u8 = 25;

/// Requirement tags that address data privacy rather than a jurisdiction
const PRIVACY_TAGS: [&str; 3] = ["gdpr", "ccpa", "privacy"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceReport {
    pub score: u8,
    pub violations: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ComplianceReport {
    fn pass(&mut self) {
        self.score += AXIS_POINTS;
    }

    fn fail(&mut self, violation: String, recommendation: &str) {
        self.violations.push(violation);
        self.recommendations.push(recommendation.to_string());
    }
}

pub fn validate_composition(
    request: &CompositionRequest,
    composition: &Composition,
) -> ComplianceReport {
    let mut report = ComplianceReport::default();

    if request.requirements.accessibility_level == AccessibilityLevel::MAX {
        report.pass();
    } else {
        report.fail(
            format!(
                "Accessibility level {} is below the supported maximum {}",
                request.requirements.accessibility_level,
                AccessibilityLevel::MAX
            ),
            "Raise accessibility_level to AAA so the accessibility-aaa mixin is applied",
        );
    }

    if request.context.data_types.is_empty() || request.requirements.privacy_compliance {
        report.pass();
    } else {
        report.fail(
            format!(
                "Data types [{}] are collected without privacy compliance enabled",
                request.context.data_types.join(", ")
            ),
            "Enable privacy_compliance so consent and data-minimisation scaffolding is generated",
        );
    }

    if composition.context.contains_key("classification") {
        report.pass();
    } else {
        report.fail(
            "No classification level is attached to the composition".to_string(),
            "Set requirements.classification so security controls can be derived",
        );
    }

    if !request.context.is_public_sector()
        || has_jurisdictional_entry(&request.context.compliance_requirements)
    {
        report.pass();
    } else {
        report.fail(
            format!(
                "User type {:?} requires a jurisdiction-specific compliance requirement",
                request.context.user_type.as_deref().unwrap_or("")
            ),
            "Add the applicable public-sector compliance requirement, such as fedramp or irap",
        );
    }

    report
}

fn has_jurisdictional_entry(entries: &[String]) -> bool {
    entries.iter().any(|entry| {
        let lowered = entry.to_lowercase();
        !PRIVACY_TAGS.iter().any(|tag| lowered.contains(tag))
    })
}
