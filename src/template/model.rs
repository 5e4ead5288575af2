//! Template definitions held by the registry
//!
//! Three kinds of template exist. A *base* template owns a renderable
//! resource and declares the slots that resource exposes. A *child* template
//! extends a base (possibly through other children) and overrides specific
//! slots with its own resources. A *composite* template assembles several
//! resolvable templates into the slots of a layout template, each component
//! gated by an optional condition expression.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classification::ClassificationLevel;
use crate::context::ContextMap;

/// WCAG conformance levels, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessibilityLevel {
    A,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl AccessibilityLevel {
    /// Highest level the engine knows about
    pub const MAX: AccessibilityLevel = AccessibilityLevel::Aaa;

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityLevel::A => "A",
            AccessibilityLevel::Aa => "AA",
            AccessibilityLevel::Aaa => "AAA",
        }
    }
}

impl std::fmt::Display for AccessibilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broad shape of what a base template renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Page,
    Component,
    Form,
    Dashboard,
    Layout,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Page => "page",
            TemplateCategory::Component => "component",
            TemplateCategory::Form => "form",
            TemplateCategory::Dashboard => "dashboard",
            TemplateCategory::Layout => "layout",
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content rules for a slot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the content must match somewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A named, fillable region of a base template's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<SlotValidation>,
}

impl Slot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default_content: None,
            description: None,
            validation: None,
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::new(name)
        }
    }

    pub fn with_default(mut self, content: impl Into<String>) -> Self {
        self.default_content = Some(content.into());
        self
    }

    pub fn with_validation(mut self, validation: SlotValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Presentation flags a variant asserts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantCompliance {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default)]
    pub reduced_motion: bool,
}

/// A named override bundle applied on top of a base template's context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(default)]
    pub modifiers: ContextMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<VariantCompliance>,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: ContextMap::new(),
            compliance: None,
        }
    }

    pub fn with_modifier(mut self, key: impl Into<String>, value: impl Into<crate::context::ContextValue>) -> Self {
        self.modifiers.insert(key.into(), value.into());
        self
    }

    pub fn with_compliance(mut self, compliance: VariantCompliance) -> Self {
        self.compliance = Some(compliance);
        self
    }
}

/// Compliance posture a template was authored for
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplianceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_level: Option<AccessibilityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationLevel>,
    #[serde(default)]
    pub privacy_compliant: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub compliance: ComplianceMetadata,
}

/// Root of an inheritance chain; owns a renderable resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseTemplate {
    pub name: String,
    pub resource_path: String,
    pub category: TemplateCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_context: ContextMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

impl BaseTemplate {
    pub fn new(
        name: impl Into<String>,
        resource_path: impl Into<String>,
        category: TemplateCategory,
    ) -> Self {
        Self {
            name: name.into(),
            resource_path: resource_path.into(),
            category,
            slots: Vec::new(),
            partials: Vec::new(),
            default_context: ContextMap::new(),
            variants: Vec::new(),
            metadata: TemplateMetadata::default(),
        }
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.name == name)
    }
}

/// Extends a base or another child, overriding specific slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildTemplate {
    pub name: String,
    pub extends: String,
    pub category: TemplateCategory,
    /// Slot name to resource path rendered as that slot's content
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_context: ContextMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_slots: Vec<String>,
}

impl ChildTemplate {
    pub fn new(
        name: impl Into<String>,
        extends: impl Into<String>,
        category: TemplateCategory,
    ) -> Self {
        Self {
            name: name.into(),
            extends: extends.into(),
            category,
            overrides: BTreeMap::new(),
            additional_context: ContextMap::new(),
            additional_slots: Vec::new(),
            remove_slots: Vec::new(),
        }
    }

    pub fn with_override(
        mut self,
        slot: impl Into<String>,
        resource_path: impl Into<String>,
    ) -> Self {
        self.overrides.insert(slot.into(), resource_path.into());
        self
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.additional_slots.push(slot);
        self
    }
}

/// One entry in a composite's component list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub template: String,
    /// Target slot in the layout template
    #[serde(default = "default_component_slot")]
    pub slot: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: ContextMap,
    /// Condition expression; the component is skipped when it is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

fn default_component_slot() -> String {
    "content".to_string()
}

impl ComponentRef {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            slot: default_component_slot(),
            context: ContextMap::new(),
            condition: None,
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_context_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::context::ContextValue>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Assembles components into the slots of a layout template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeTemplate {
    pub name: String,
    pub layout: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub global_context: ContextMap,
}

impl CompositeTemplate {
    pub fn new(name: impl Into<String>, layout: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: layout.into(),
            components: Vec::new(),
            global_context: ContextMap::new(),
        }
    }

    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_global_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::context::ContextValue>,
    ) -> Self {
        self.global_context.insert(key.into(), value.into());
        self
    }
}

/// Which registry map a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Base,
    Child,
    Composite,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Base => "base",
            TemplateKind::Child => "child",
            TemplateKind::Composite => "composite",
        }
    }
}
