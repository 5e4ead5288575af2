//! Composition request model
//!
//! The request is the engine's free-form input: a description of what to
//! generate plus structured requirement flags, business context, and caller
//! preferences. Every field hashes, so a whole request can be fingerprinted
//! for the composition cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classification::ClassificationLevel;
use crate::template::AccessibilityLevel;

/// Declared complexity of the requested component
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
    Advanced,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::Advanced => "advanced",
        }
    }

    /// Additive bump on the 1..10 complexity estimate
    pub(crate) fn complexity_step(&self) -> f64 {
        match self {
            Complexity::Simple | Complexity::Moderate => 0.0,
            Complexity::Complex => 2.0,
            Complexity::Advanced => 3.0,
        }
    }

    /// Additive bump on the token estimate
    pub(crate) fn token_step(&self) -> usize {
        match self {
            Complexity::Simple => 0,
            Complexity::Moderate => 150,
            Complexity::Complex => 300,
            Complexity::Advanced => 500,
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_platform() -> String {
    "react".to_string()
}

/// Structured requirement flags
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub functionality: Vec<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_system: Option<String>,
    #[serde(default = "Requirements::default_accessibility")]
    pub accessibility_level: AccessibilityLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationLevel>,
    #[serde(default)]
    pub privacy_compliance: bool,
    #[serde(default)]
    pub international_support: bool,
    #[serde(default)]
    pub responsive_design: bool,
    #[serde(default)]
    pub dark_mode_support: bool,
    #[serde(default)]
    pub performance_optimized: bool,
}

impl Requirements {
    fn default_accessibility() -> AccessibilityLevel {
        AccessibilityLevel::Aa
    }
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            functionality: Vec::new(),
            complexity: Complexity::default(),
            platform: default_platform(),
            design_system: None,
            accessibility_level: Self::default_accessibility(),
            classification: None,
            privacy_compliance: false,
            international_support: false,
            responsive_design: false,
            dark_mode_support: false,
            performance_optimized: false,
        }
    }
}

/// Business context around the request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default)]
    pub compliance_requirements: Vec<String>,
    #[serde(default)]
    pub integrations_needed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_volume: Option<String>,
}

impl RequestContext {
    /// Whether the declared user type falls under public-sector rules
    pub fn is_public_sector(&self) -> bool {
        const PUBLIC_SECTOR_MARKERS: [&str; 3] = ["government", "agency", "public-sector"];
        let Some(user_type) = &self.user_type else {
            return false;
        };
        let lowered = user_type.to_lowercase();
        PUBLIC_SECTOR_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    }
}

/// Caller preferences steering selection and slot filling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_template: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slot_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompositionRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub context: RequestContext,
    #[serde(default)]
    pub preferences: Preferences,
}

impl CompositionRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_functionality(mut self, entries: &[&str]) -> Self {
        self.requirements.functionality = entries.iter().map(|entry| entry.to_string()).collect();
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.requirements.complexity = complexity;
        self
    }

    pub fn with_accessibility(mut self, level: AccessibilityLevel) -> Self {
        self.requirements.accessibility_level = level;
        self
    }

    pub fn with_classification(mut self, level: ClassificationLevel) -> Self {
        self.requirements.classification = Some(level);
        self
    }

    pub fn with_privacy_compliance(mut self, enabled: bool) -> Self {
        self.requirements.privacy_compliance = enabled;
        self
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.context.user_type = Some(user_type.into());
        self
    }

    pub fn with_data_types(mut self, entries: &[&str]) -> Self {
        self.context.data_types = entries.iter().map(|entry| entry.to_string()).collect();
        self
    }

    pub fn with_compliance_requirements(mut self, entries: &[&str]) -> Self {
        self.context.compliance_requirements =
            entries.iter().map(|entry| entry.to_string()).collect();
        self
    }

    pub fn with_preferred_template(mut self, template: impl Into<String>) -> Self {
        self.preferences.preferred_template = Some(template.into());
        self
    }

    /// Text blob handed to pattern analysis
    pub fn analysis_text(&self, hints: &[String]) -> String {
        let mut parts = vec![self.description.clone()];
        if !self.requirements.functionality.is_empty() {
            parts.push(self.requirements.functionality.join(" "));
        }
        if let Some(industry) = &self.context.industry {
            parts.push(industry.clone());
        }
        parts.push(self.requirements.complexity.as_str().to_string());
        if !hints.is_empty() {
            parts.push(hints.join(" "));
        }
        parts.join(" ")
    }
}
