//! Data classification levels and their security requirements
//!
//! Classification is a four-level ordinal scheme. The engine consumes it
//! read-only: composition contexts carry the requested level and the
//! security flags that level implies.

use serde::{Deserialize, Serialize};

/// Ordered from least to most restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationLevel {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl ClassificationLevel {
    pub const ALL: [ClassificationLevel; 4] = [
        ClassificationLevel::Public,
        ClassificationLevel::Internal,
        ClassificationLevel::Confidential,
        ClassificationLevel::Restricted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLevel::Public => "public",
            ClassificationLevel::Internal => "internal",
            ClassificationLevel::Confidential => "confidential",
            ClassificationLevel::Restricted => "restricted",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "public" => Some(ClassificationLevel::Public),
            "internal" => Some(ClassificationLevel::Internal),
            "confidential" => Some(ClassificationLevel::Confidential),
            "restricted" => Some(ClassificationLevel::Restricted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Security controls a classification level demands of generated components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRequirements {
    pub encryption_at_rest: bool,
    pub encryption_in_transit: bool,
    pub audit_logging: bool,
    pub session_timeout_minutes: Option<u32>,
}

/// Maps classification levels to the controls they require
#[derive(Debug, Clone, Default)]
pub struct ClassificationScheme;

impl ClassificationScheme {
    pub fn requirements(&self, level: ClassificationLevel) -> SecurityRequirements {
        match level {
            ClassificationLevel::Public => SecurityRequirements {
                encryption_at_rest: false,
                encryption_in_transit: false,
                audit_logging: false,
                session_timeout_minutes: None,
            },
            ClassificationLevel::Internal => SecurityRequirements {
                encryption_at_rest: false,
                encryption_in_transit: true,
                audit_logging: true,
                session_timeout_minutes: Some(480),
            },
            ClassificationLevel::Confidential => SecurityRequirements {
                encryption_at_rest: true,
                encryption_in_transit: true,
                audit_logging: true,
                session_timeout_minutes: Some(60),
            },
            ClassificationLevel::Restricted => SecurityRequirements {
                encryption_at_rest: true,
                encryption_in_transit: true,
                audit_logging: true,
                session_timeout_minutes: Some(15),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(ClassificationLevel::Public < ClassificationLevel::Internal);
        assert!(ClassificationLevel::Internal < ClassificationLevel::Confidential);
        assert!(ClassificationLevel::Confidential < ClassificationLevel::Restricted);
    }

    #[test]
    fn test_requirements_tighten_with_level() {
        let scheme = ClassificationScheme;
        let timeouts: Vec<_> = ClassificationLevel::ALL
            .iter()
            .map(|level| scheme.requirements(*level).session_timeout_minutes)
            .collect();
        assert_eq!(timeouts, vec![None, Some(480), Some(60), Some(15)]);
        assert!(scheme
            .requirements(ClassificationLevel::Restricted)
            .encryption_at_rest);
        assert!(!scheme
            .requirements(ClassificationLevel::Public)
            .audit_logging);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            ClassificationLevel::from_name("Confidential"),
            Some(ClassificationLevel::Confidential)
        );
        assert_eq!(ClassificationLevel::from_name("secret"), None);
    }

    #[test]
    fn test_serde_names_are_lowercase() {
        let json = serde_json::to_string(&ClassificationLevel::Restricted).unwrap();
        assert_eq!(json, "\"restricted\"");
    }
}
