//! Error types for the template registry and resolver

use thiserror::Error;

use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {name}")]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Template name already in use: {name} (registered as a {kind} template)")]
    Duplicate { name: String, kind: &'static str },

    #[error("Child template '{child}' extends unknown template '{extends}'")]
    DanglingExtends { child: String, extends: String },

    #[error("Circular inheritance detected: {chain}")]
    CircularInheritance { chain: String },

    #[error("Circular template reference: {chain}")]
    CircularReference { chain: String },

    #[error("Required slot '{slot}' of template '{template}' has no content")]
    RequiredSlotMissing { template: String, slot: String },

    #[error("Slot '{slot}' of template '{template}' failed validation: {rule}")]
    SlotValidationFailed {
        template: String,
        slot: String,
        rule: String,
    },

    #[error("Variant '{variant}' not found on template '{template}'")]
    VariantNotFound {
        template: String,
        variant: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors reading or writing the registry document
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read registry document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse registry document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize registry document: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unsupported registry document version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

impl TemplateError {
    pub fn not_found(name: impl Into<String>, suggestions: Vec<String>) -> Self {
        TemplateError::NotFound {
            name: name.into(),
            suggestions,
        }
    }

    pub fn circular_inheritance(chain: &[String]) -> Self {
        TemplateError::CircularInheritance {
            chain: chain.join(" -> "),
        }
    }

    pub fn circular_reference(chain: &[String]) -> Self {
        TemplateError::CircularReference {
            chain: chain.join(" -> "),
        }
    }

    pub fn required_slot(template: impl Into<String>, slot: impl Into<String>) -> Self {
        TemplateError::RequiredSlotMissing {
            template: template.into(),
            slot: slot.into(),
        }
    }

    pub fn slot_validation(
        template: impl Into<String>,
        slot: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        TemplateError::SlotValidationFailed {
            template: template.into(),
            slot: slot.into(),
            rule: rule.into(),
        }
    }

    /// Similarly named templates, for "did you mean" output
    pub fn suggestions(&self) -> &[String] {
        match self {
            TemplateError::NotFound { suggestions, .. } => suggestions,
            TemplateError::VariantNotFound { available, .. } => available,
            _ => &[],
        }
    }
}
