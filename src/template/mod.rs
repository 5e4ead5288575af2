//! Template definitions, storage, and resolution
//!
//! A registry holds three kinds of template. Base templates own a renderable
//! resource and declare slots; child templates extend a base through an
//! inheritance chain and override slots with their own resources; composite
//! templates assemble other templates into the slots of a layout. The
//! resolver turns any registered name plus a caller context into rendered
//! output.

mod error;
mod inheritance;
mod model;
mod registry;
mod resolver;
mod slots;

pub use error::{StoreError, TemplateError};
pub use inheritance::{resolve_chain, validate_hierarchy, Chain};
pub use model::{
    AccessibilityLevel, BaseTemplate, ChildTemplate, ComplianceMetadata, ComponentRef,
    CompositeTemplate, Slot, SlotValidation, TemplateCategory, TemplateKind, TemplateMetadata,
    Variant, VariantCompliance,
};
pub use registry::{RegistryDocument, TemplateRegistry, REGISTRY_VERSION};
pub use resolver::{ResolveContext, TemplateResolver};
pub use slots::resolve_slots;
