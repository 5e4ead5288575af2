//! Template resolution
//!
//! Turns a registered template name plus a caller-supplied context into
//! rendered output. Bases render their own resource, children flatten their
//! inheritance chain first, and composites resolve each component into the
//! slots of their layout template. Composite resolution tracks the templates
//! currently being resolved so reference cycles fail instead of recursing
//! forever.

use tracing::{debug, warn};

use crate::condition::evaluate_str;
use crate::context::{merge, ContextMap, ContextValue, SlotMap};
use crate::render::TemplateRenderer;
use crate::template::error::TemplateError;
use crate::template::inheritance::resolve_chain;
use crate::template::model::{BaseTemplate, ChildTemplate, CompositeTemplate, TemplateKind};
use crate::template::registry::TemplateRegistry;
use crate::template::slots::resolve_slots;

/// Caller-supplied inputs to a resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Values visible to placeholders and condition expressions
    pub vars: ContextMap,
    /// Explicit slot content, which beats every other slot source
    pub slots: SlotMap,
    /// Variant of the underlying base template to apply
    pub variant: Option<String>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_slot(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.slots.insert(name.into(), content.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

pub struct TemplateResolver<'a> {
    registry: &'a TemplateRegistry,
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(registry: &'a TemplateRegistry, renderer: &'a dyn TemplateRenderer) -> Self {
        Self { registry, renderer }
    }

    pub fn resolve(&self, name: &str, ctx: &ResolveContext) -> Result<String, TemplateError> {
        let mut resolving = Vec::new();
        self.resolve_inner(name, ctx, &mut resolving)
    }

    fn resolve_inner(
        &self,
        name: &str,
        ctx: &ResolveContext,
        resolving: &mut Vec<String>,
    ) -> Result<String, TemplateError> {
        if resolving.iter().any(|entry| entry == name) {
            let mut chain = resolving.clone();
            chain.push(name.to_string());
            return Err(TemplateError::circular_reference(&chain));
        }
        resolving.push(name.to_string());
        let result = self.dispatch(name, ctx, resolving);
        resolving.pop();
        result
    }

    fn dispatch(
        &self,
        name: &str,
        ctx: &ResolveContext,
        resolving: &mut Vec<String>,
    ) -> Result<String, TemplateError> {
        match self.registry.kind_of(name) {
            Some(TemplateKind::Base) => {
                let base = self.registry.get_base(name)?;
                self.resolve_base(base, ctx)
            }
            Some(TemplateKind::Child) => {
                let child = self.registry.get_child(name)?;
                self.resolve_child(child, ctx)
            }
            Some(TemplateKind::Composite) => {
                let composite = self.registry.get_composite(name)?;
                self.resolve_composite(composite, ctx, resolving)
            }
            None => Err(self.registry.unknown_template(name)),
        }
    }

    fn resolve_base(
        &self,
        base: &BaseTemplate,
        ctx: &ResolveContext,
    ) -> Result<String, TemplateError> {
        let mut context = base.default_context.clone();
        apply_variant(base, ctx.variant.as_deref(), &mut context)?;
        merge(&mut context, &ctx.vars);

        for partial in &base.partials {
            self.renderer.load(partial)?;
        }

        let resolved = resolve_slots(&base.name, &base.slots, &ctx.slots, &context)?;
        self.render_resource(&base.resource_path, context, &resolved)
    }

    fn resolve_child(
        &self,
        child: &ChildTemplate,
        ctx: &ResolveContext,
    ) -> Result<String, TemplateError> {
        let chain = resolve_chain(self.registry.base_map(), self.registry.child_map(), child)?;
        debug!(
            child = %child.name,
            base = %chain.base.name,
            depth = chain.depth(),
            "resolving inheritance chain"
        );

        let mut context = chain.effective_context();
        apply_variant(chain.base, ctx.variant.as_deref(), &mut context)?;
        merge(&mut context, &ctx.vars);

        for partial in &chain.base.partials {
            self.renderer.load(partial)?;
        }

        let declared = chain.effective_slots();

        // Slot overrides render their resource with the merged context, then
        // act as supplied content unless the caller filled the slot directly.
        let mut supplied = SlotMap::new();
        for (slot, resource) in chain.effective_overrides() {
            if !declared.iter().any(|entry| entry.name == slot) {
                continue;
            }
            if ctx.slots.contains_key(&slot) {
                continue;
            }
            let content = self.renderer.render(&resource, &context)?;
            supplied.insert(slot, content);
        }
        for (slot, content) in &ctx.slots {
            supplied.insert(slot.clone(), content.clone());
        }

        let resolved = resolve_slots(&child.name, &declared, &supplied, &context)?;
        self.render_resource(&chain.base.resource_path, context, &resolved)
    }

    fn resolve_composite(
        &self,
        composite: &CompositeTemplate,
        ctx: &ResolveContext,
        resolving: &mut Vec<String>,
    ) -> Result<String, TemplateError> {
        let mut context = composite.global_context.clone();
        merge(&mut context, &ctx.vars);

        let mut assembled = SlotMap::new();
        for component in &composite.components {
            if let Some(condition) = &component.condition {
                match evaluate_str(condition, &context) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(
                            composite = %composite.name,
                            component = %component.template,
                            condition,
                            "component skipped"
                        );
                        continue;
                    }
                    Err(err) => {
                        warn!(
                            composite = %composite.name,
                            component = %component.template,
                            condition,
                            error = %err,
                            "condition failed to evaluate, skipping component"
                        );
                        continue;
                    }
                }
            }

            let mut component_vars = context.clone();
            merge(&mut component_vars, &component.context);
            let component_ctx = ResolveContext {
                vars: component_vars,
                slots: SlotMap::new(),
                variant: None,
            };
            let output = self.resolve_inner(&component.template, &component_ctx, resolving)?;
            match assembled.get_mut(&component.slot) {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(&output);
                }
                None => {
                    assembled.insert(component.slot.clone(), output);
                }
            }
        }

        // Caller-supplied slot content still wins over assembled components.
        for (slot, content) in &ctx.slots {
            assembled.insert(slot.clone(), content.clone());
        }

        let layout_ctx = ResolveContext {
            vars: context,
            slots: assembled,
            variant: ctx.variant.clone(),
        };
        self.resolve_inner(&composite.layout, &layout_ctx, resolving)
    }

    fn render_resource(
        &self,
        resource: &str,
        mut context: ContextMap,
        slots: &SlotMap,
    ) -> Result<String, TemplateError> {
        for (slot, content) in slots {
            context.insert(slot.clone(), ContextValue::String(content.clone()));
        }
        Ok(self.renderer.render(resource, &context)?)
    }
}

fn apply_variant(
    base: &BaseTemplate,
    requested: Option<&str>,
    context: &mut ContextMap,
) -> Result<(), TemplateError> {
    let Some(name) = requested else {
        return Ok(());
    };
    let Some(variant) = base.variant(name) else {
        return Err(TemplateError::VariantNotFound {
            template: base.name.clone(),
            variant: name.to_string(),
            available: base.variants.iter().map(|v| v.name.clone()).collect(),
        });
    };
    merge(context, &variant.modifiers);
    if let Some(compliance) = &variant.compliance {
        for (key, flag) in [
            ("dark_mode", compliance.dark_mode),
            ("rtl", compliance.rtl),
            ("high_contrast", compliance.high_contrast),
            ("reduced_motion", compliance.reduced_motion),
        ] {
            if flag {
                context.insert(key.to_string(), ContextValue::Bool(true));
            }
        }
    }
    Ok(())
}
