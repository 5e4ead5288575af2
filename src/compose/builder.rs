//! Composition building
//!
//! Folds the request, the selected base template, the mixin list, and the
//! detected patterns into one flat context map plus generated slot content.
//! Slot generation dispatches on the highest-confidence pattern so a form
//! request gets fields and actions while a dashboard request gets widgets.

use crate::classification::ClassificationScheme;
use crate::compose::patterns::PatternMatch;
use crate::compose::request::CompositionRequest;
use crate::compose::result::Composition;
use crate::context::{ContextMap, ContextValue, SlotMap};
use crate::template::BaseTemplate;

pub fn build_composition(
    request: &CompositionRequest,
    base: &BaseTemplate,
    mixins: &[String],
    patterns: &[PatternMatch],
    scheme: &ClassificationScheme,
) -> Composition {
    let context = build_context(request, mixins, patterns, scheme);
    let mut slots = build_slots(request, mixins, patterns);

    let overrides = request.preferences.slot_overrides.clone();
    for (slot, content) in &overrides {
        slots.insert(slot.clone(), content.clone());
    }

    Composition {
        base_template: base.name.clone(),
        mixins: mixins.to_vec(),
        overrides,
        slots,
        context,
    }
}

fn build_context(
    request: &CompositionRequest,
    mixins: &[String],
    patterns: &[PatternMatch],
    scheme: &ClassificationScheme,
) -> ContextMap {
    let requirements = &request.requirements;
    let mut context = ContextMap::new();
    context.insert(
        "component_name".to_string(),
        derive_component_name(&request.description).into(),
    );
    context.insert("platform".to_string(), requirements.platform.as_str().into());
    context.insert(
        "complexity".to_string(),
        requirements.complexity.as_str().into(),
    );
    context.insert(
        "accessibility_level".to_string(),
        requirements.accessibility_level.as_str().into(),
    );
    if let Some(design_system) = &requirements.design_system {
        context.insert("design_system".to_string(), design_system.as_str().into());
    }
    if let Some(industry) = &request.context.industry {
        context.insert("industry".to_string(), industry.as_str().into());
    }
    if let Some(user_type) = &request.context.user_type {
        context.insert("user_type".to_string(), user_type.as_str().into());
    }
    for (key, flag) in [
        ("privacy_compliance", requirements.privacy_compliance),
        ("responsive_design", requirements.responsive_design),
        ("dark_mode_support", requirements.dark_mode_support),
        ("international_support", requirements.international_support),
        ("performance_optimized", requirements.performance_optimized),
    ] {
        context.insert(key.to_string(), flag.into());
    }

    if let Some(level) = requirements.classification {
        context.insert("classification".to_string(), level.as_str().into());
        let security = scheme.requirements(level);
        context.insert(
            "encryption_at_rest".to_string(),
            security.encryption_at_rest.into(),
        );
        context.insert(
            "encryption_in_transit".to_string(),
            security.encryption_in_transit.into(),
        );
        context.insert("audit_logging".to_string(), security.audit_logging.into());
        if let Some(minutes) = security.session_timeout_minutes {
            context.insert(
                "session_timeout_minutes".to_string(),
                ContextValue::Number(f64::from(minutes)),
            );
        }
    }

    context.insert(
        "functionality".to_string(),
        ContextValue::from(requirements.functionality.clone()),
    );
    context.insert("mixins".to_string(), ContextValue::from(mixins.to_vec()));
    context.insert(
        "detected_patterns".to_string(),
        ContextValue::from(
            patterns
                .iter()
                .map(|p| p.pattern.clone())
                .collect::<Vec<String>>(),
        ),
    );
    context
}

fn build_slots(
    request: &CompositionRequest,
    mixins: &[String],
    patterns: &[PatternMatch],
) -> SlotMap {
    let functionality = &request.requirements.functionality;
    let mut slots = SlotMap::new();
    slots.insert("title".to_string(), humanize(&request.description));

    match patterns.first().map(|p| p.pattern.as_str()) {
        Some("Form") => {
            slots.insert("fields".to_string(), form_fields(functionality));
            slots.insert(
                "actions".to_string(),
                "<button type=\"submit\">Submit</button>".to_string(),
            );
        }
        Some("Dashboard") => {
            slots.insert("widgets".to_string(), dashboard_widgets(functionality));
        }
        Some("Card") => {
            slots.insert("body".to_string(), card_body(&request.description));
        }
        _ => {
            slots.insert("content".to_string(), generic_content(&request.description));
        }
    }

    slots.insert(
        "interface_props".to_string(),
        interface_props(request, patterns),
    );
    slots.insert("imports".to_string(), imports(mixins, patterns));
    slots.insert("local_state".to_string(), local_state(patterns));
    slots
}

// ── Derived names ───────────────────────────────────────────────────────

/// Title-cased alphanumeric tokens, concatenated: "user login form" becomes
/// "UserLoginForm"
pub fn derive_component_name(description: &str) -> String {
    let name: String = tokens(description).map(title_case).collect();
    if name.is_empty() {
        "GeneratedComponent".to_string()
    } else {
        name
    }
}

fn humanize(description: &str) -> String {
    let title = tokens(description)
        .map(title_case)
        .collect::<Vec<String>>()
        .join(" ");
    if title.is_empty() {
        "Generated Component".to_string()
    } else {
        title
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn slug(text: &str) -> String {
    tokens(text)
        .map(str::to_lowercase)
        .collect::<Vec<String>>()
        .join("-")
}

// ── Slot content generators ─────────────────────────────────────────────

fn form_fields(functionality: &[String]) -> String {
    if functionality.is_empty() {
        return concat!(
            "      <label htmlFor=\"name\">Name</label>\n",
            "      <input id=\"name\" name=\"name\" type=\"text\" />"
        )
        .to_string();
    }
    functionality
        .iter()
        .map(|entry| {
            let id = slug(entry);
            let input_type = match id.as_str() {
                "email" => "email",
                "password" => "password",
                _ => "text",
            };
            format!(
                "      <label htmlFor=\"{id}\">{label}</label>\n      <input id=\"{id}\" name=\"{id}\" type=\"{input_type}\" />",
                label = humanize(entry),
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn dashboard_widgets(functionality: &[String]) -> String {
    if functionality.is_empty() {
        return "        <div className=\"widget\"><h3>Overview</h3></div>".to_string();
    }
    functionality
        .iter()
        .map(|entry| {
            format!(
                "        <div className=\"widget\" data-widget=\"{id}\"><h3>{label}</h3></div>",
                id = slug(entry),
                label = humanize(entry),
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn card_body(description: &str) -> String {
    format!("    <p>{description}</p>")
}

fn generic_content(description: &str) -> String {
    format!("      <section>\n        <p>{description}</p>\n      </section>")
}

fn interface_props(request: &CompositionRequest, patterns: &[PatternMatch]) -> String {
    let mut props = vec!["  className?: string;".to_string()];
    match patterns.first().map(|p| p.pattern.as_str()) {
        Some("Form") => {
            props.push("  onSubmit?: (values: Record<string, string>) => void;".to_string());
        }
        Some("Dashboard") => {
            props.push("  refreshIntervalMs?: number;".to_string());
        }
        _ => {}
    }
    if request.requirements.dark_mode_support {
        props.push("  theme?: \"light\" | \"dark\";".to_string());
    }
    if request.requirements.international_support {
        props.push("  locale?: string;".to_string());
    }
    props.join("\n")
}

fn imports(mixins: &[String], patterns: &[PatternMatch]) -> String {
    let mut lines = vec!["import * as React from \"react\";".to_string()];
    if matches!(
        patterns.first().map(|p| p.pattern.as_str()),
        Some("Form") | Some("Dashboard")
    ) {
        lines.push("import { useState } from \"react\";".to_string());
    }
    if mixins.iter().any(|m| m == "performance-optimizations") {
        lines.push("import { memo, useMemo } from \"react\";".to_string());
    }
    if mixins.iter().any(|m| m == "internationalization") {
        lines.push("import { useTranslation } from \"react-i18next\";".to_string());
    }
    lines.join("\n")
}

fn local_state(patterns: &[PatternMatch]) -> String {
    match patterns.first().map(|p| p.pattern.as_str()) {
        Some("Form") => {
            "  const [values, setValues] = useState<Record<string, string>>({});".to_string()
        }
        Some("Dashboard") => {
            "  const [data, setData] = useState<Record<string, unknown>>({});".to_string()
        }
        _ => String::new(),
    }
}
