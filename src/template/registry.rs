//! Template registry and its persistent document
//!
//! The registry holds the three template maps and round-trips them through a
//! single versioned TOML document. When no document exists a default starter
//! set is synthesized, including the renderable resources it points at, so a
//! fresh engine can resolve templates out of the box.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::render::TemplateRenderer;
use crate::template::error::{StoreError, TemplateError};
use crate::template::inheritance::validate_hierarchy;
use crate::template::model::{
    BaseTemplate, ChildTemplate, CompositeTemplate, TemplateCategory, TemplateKind,
};

pub const REGISTRY_VERSION: u32 = 1;

/// On-disk shape of the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_templates: Vec<BaseTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_templates: Vec<ChildTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composite_templates: Vec<CompositeTemplate>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    bases: BTreeMap<String, BaseTemplate>,
    children: BTreeMap<String, ChildTemplate>,
    composites: BTreeMap<String, CompositeTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starter set: one base per category, one child, one composite
    pub fn default_set() -> Self {
        let doc: RegistryDocument =
            toml::from_str(DEFAULT_REGISTRY).expect("default registry document is valid");
        Self::from_document(doc).expect("default registry set is consistent")
    }

    /// Resources the starter set renders; seeded through the renderer
    pub fn default_resources() -> &'static [(&'static str, &'static str)] {
        DEFAULT_RESOURCES
    }

    pub fn from_document(doc: RegistryDocument) -> Result<Self, TemplateError> {
        if doc.version != REGISTRY_VERSION {
            return Err(StoreError::Version {
                found: doc.version,
                expected: REGISTRY_VERSION,
            }
            .into());
        }

        let mut registry = Self::new();
        for base in doc.base_templates {
            registry.check_name_free(&base.name)?;
            registry.bases.insert(base.name.clone(), base);
        }
        for child in doc.child_templates {
            registry.check_name_free(&child.name)?;
            registry.children.insert(child.name.clone(), child);
        }
        for composite in doc.composite_templates {
            registry.check_name_free(&composite.name)?;
            registry
                .composites
                .insert(composite.name.clone(), composite);
        }
        validate_hierarchy(&registry.bases, &registry.children)?;
        Ok(registry)
    }

    pub fn to_document(&self) -> RegistryDocument {
        RegistryDocument {
            version: REGISTRY_VERSION,
            base_templates: self.bases.values().cloned().collect(),
            child_templates: self.children.values().cloned().collect(),
            composite_templates: self.composites.values().cloned().collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path).map_err(StoreError::from)?;
        let doc: RegistryDocument = toml::from_str(&text).map_err(StoreError::from)?;
        let registry = Self::from_document(doc)?;
        debug!(
            path = %path.display(),
            bases = registry.bases.len(),
            children = registry.children.len(),
            composites = registry.composites.len(),
            "registry loaded"
        );
        Ok(registry)
    }

    /// Write the document atomically (temp file, then rename)
    pub fn persist(&self, path: &Path) -> Result<(), TemplateError> {
        let text = toml::to_string_pretty(&self.to_document()).map_err(StoreError::from)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::from)?;
            }
        }
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, &text).map_err(StoreError::from)?;
        fs::rename(&tmp, path).map_err(StoreError::from)?;
        info!(path = %path.display(), "registry persisted");
        Ok(())
    }

    /// Load the document, or synthesize and persist the default set
    pub fn load_or_init(
        path: &Path,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Self, TemplateError> {
        if path.exists() {
            return Self::load(path);
        }
        info!(path = %path.display(), "no registry document found, creating default set");
        let registry = Self::default_set();
        registry.seed_default_resources(renderer)?;
        registry.persist(path)?;
        Ok(registry)
    }

    /// Write the starter resources that are not already present
    pub fn seed_default_resources(
        &self,
        renderer: &dyn TemplateRenderer,
    ) -> Result<(), TemplateError> {
        for (resource, content) in DEFAULT_RESOURCES {
            if renderer.load(resource).is_err() {
                renderer.save_content(resource, content)?;
            }
        }
        Ok(())
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    pub fn kind_of(&self, name: &str) -> Option<TemplateKind> {
        if self.bases.contains_key(name) {
            Some(TemplateKind::Base)
        } else if self.children.contains_key(name) {
            Some(TemplateKind::Child)
        } else if self.composites.contains_key(name) {
            Some(TemplateKind::Composite)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty() && self.children.is_empty() && self.composites.is_empty()
    }

    pub fn base(&self, name: &str) -> Option<&BaseTemplate> {
        self.bases.get(name)
    }

    pub fn child(&self, name: &str) -> Option<&ChildTemplate> {
        self.children.get(name)
    }

    pub fn composite(&self, name: &str) -> Option<&CompositeTemplate> {
        self.composites.get(name)
    }

    pub fn get_base(&self, name: &str) -> Result<&BaseTemplate, TemplateError> {
        self.bases
            .get(name)
            .ok_or_else(|| TemplateError::not_found(name, self.similar_names(name)))
    }

    pub fn get_child(&self, name: &str) -> Result<&ChildTemplate, TemplateError> {
        self.children
            .get(name)
            .ok_or_else(|| TemplateError::not_found(name, self.similar_names(name)))
    }

    pub fn get_composite(&self, name: &str) -> Result<&CompositeTemplate, TemplateError> {
        self.composites
            .get(name)
            .ok_or_else(|| TemplateError::not_found(name, self.similar_names(name)))
    }

    pub fn bases(&self) -> impl Iterator<Item = &BaseTemplate> {
        self.bases.values()
    }

    pub fn bases_by_category(&self, category: TemplateCategory) -> Vec<&BaseTemplate> {
        self.bases
            .values()
            .filter(|base| base.category == category)
            .collect()
    }

    pub fn base_names(&self) -> Vec<String> {
        self.bases.keys().cloned().collect()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    pub fn composite_names(&self) -> Vec<String> {
        self.composites.keys().cloned().collect()
    }

    pub(crate) fn base_map(&self) -> &BTreeMap<String, BaseTemplate> {
        &self.bases
    }

    pub(crate) fn child_map(&self) -> &BTreeMap<String, ChildTemplate> {
        &self.children
    }

    pub(crate) fn unknown_template(&self, name: &str) -> TemplateError {
        TemplateError::not_found(name, self.similar_names(name))
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Insert or overwrite a base template
    pub fn register_base(&mut self, template: BaseTemplate) -> Result<(), TemplateError> {
        if !self.bases.contains_key(&template.name) {
            self.check_name_free(&template.name)?;
        }
        self.bases.insert(template.name.clone(), template);
        Ok(())
    }

    /// Insert or overwrite a child template, revalidating the hierarchy
    ///
    /// A failed revalidation leaves the registry unchanged.
    pub fn register_child(&mut self, template: ChildTemplate) -> Result<(), TemplateError> {
        if !self.children.contains_key(&template.name) {
            self.check_name_free(&template.name)?;
        }
        let mut candidate = self.children.clone();
        candidate.insert(template.name.clone(), template);
        validate_hierarchy(&self.bases, &candidate)?;
        self.children = candidate;
        Ok(())
    }

    /// Insert or overwrite a composite template
    pub fn register_composite(&mut self, template: CompositeTemplate) -> Result<(), TemplateError> {
        if !self.composites.contains_key(&template.name) {
            self.check_name_free(&template.name)?;
        }
        self.composites.insert(template.name.clone(), template);
        Ok(())
    }

    /// Names are unique across all three kinds: resolution dispatches on the
    /// kind a name is found in
    fn check_name_free(&self, name: &str) -> Result<(), TemplateError> {
        match self.kind_of(name) {
            None => Ok(()),
            Some(kind) => Err(TemplateError::Duplicate {
                name: name.to_string(),
                kind: kind.as_str(),
            }),
        }
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        let candidates = self
            .bases
            .keys()
            .chain(self.children.keys())
            .chain(self.composites.keys())
            .cloned();
        find_similar(name, candidates)
    }
}

// ── Name suggestions ────────────────────────────────────────────────────

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];
    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Up to three candidates within edit distance 2, closest first
fn find_similar(name: &str, candidates: impl Iterator<Item = String>) -> Vec<String> {
    const MAX_DISTANCE: usize = 2;
    let mut scored: Vec<(usize, String)> = candidates
        .filter_map(|candidate| {
            let distance = levenshtein_distance(name, &candidate);
            (distance <= MAX_DISTANCE).then_some((distance, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, name)| name).take(3).collect()
}

// ── Default starter set ─────────────────────────────────────────────────

const DEFAULT_REGISTRY: &str = r#"
version = 1

[[base_templates]]
name = "page-shell"
resource_path = "page-shell.tmpl"
category = "page"
default_context = { component_name = "GeneratedComponent" }

[base_templates.metadata]
description = "Top-level page scaffold with a header and main region"
tags = ["page", "shell", "layout"]
compliance = { accessibility_level = "AA" }

[[base_templates.slots]]
name = "title"
required = true
default_content = "Untitled Page"

[[base_templates.slots]]
name = "content"
required = true
default_content = "<!-- content -->"

[[base_templates.slots]]
name = "imports"

[[base_templates.slots]]
name = "interface_props"

[[base_templates.slots]]
name = "local_state"

[[base_templates]]
name = "form-panel"
resource_path = "form-panel.tmpl"
category = "form"
default_context = { component_name = "GeneratedComponent" }

[base_templates.metadata]
description = "Labelled form with field and action regions"
tags = ["form", "input", "validation"]
compliance = { accessibility_level = "AAA", privacy_compliant = true }

[[base_templates.variants]]
name = "dark"
modifiers = { theme = "dark" }
compliance = { dark_mode = true }

[[base_templates.slots]]
name = "title"
required = true
default_content = "Form"

[[base_templates.slots]]
name = "fields"
required = true
default_content = "<!-- fields -->"

[[base_templates.slots]]
name = "actions"
default_content = '<button type="submit">Submit</button>'

[[base_templates.slots]]
name = "imports"

[[base_templates.slots]]
name = "interface_props"

[[base_templates.slots]]
name = "local_state"

[[base_templates]]
name = "dashboard-grid"
resource_path = "dashboard-grid.tmpl"
category = "dashboard"
default_context = { component_name = "GeneratedComponent" }

[base_templates.metadata]
description = "Metric grid with a heading and widget region"
tags = ["dashboard", "metrics", "analytics"]
compliance = { accessibility_level = "AAA", privacy_compliant = true }

[[base_templates.slots]]
name = "title"
required = true
default_content = "Dashboard"

[[base_templates.slots]]
name = "widgets"
required = true
default_content = "<!-- widgets -->"

[[base_templates.slots]]
name = "imports"

[[base_templates.slots]]
name = "interface_props"

[[base_templates.slots]]
name = "local_state"

[[base_templates]]
name = "content-card"
resource_path = "content-card.tmpl"
category = "component"

[base_templates.metadata]
description = "Self-contained card fragment with title, body and footer"
tags = ["card", "summary", "tile"]
compliance = { accessibility_level = "AA" }

[[base_templates.variants]]
name = "compact"
modifiers = { density = "compact" }

[[base_templates.slots]]
name = "title"
default_content = "Card"

[[base_templates.slots]]
name = "body"
required = true
default_content = "<p></p>"

[[base_templates.slots]]
name = "footer"

[[base_templates]]
name = "split-layout"
resource_path = "split-layout.tmpl"
category = "layout"
default_context = { component_name = "GeneratedComponent" }

[base_templates.metadata]
description = "Two-column layout with header, sidebar and footer"
tags = ["layout", "columns", "sidebar"]
compliance = { accessibility_level = "AA" }

[[base_templates.slots]]
name = "header"

[[base_templates.slots]]
name = "content"
required = true
default_content = "<!-- content -->"

[[base_templates.slots]]
name = "sidebar"

[[base_templates.slots]]
name = "footer"

[[child_templates]]
name = "login-form"
extends = "form-panel"
category = "form"

[child_templates.overrides]
fields = "login-fields.tmpl"

[child_templates.additional_context]
title = "Sign in"
actions = '<button type="submit">Sign in</button>'

[[composite_templates]]
name = "landing-page"
layout = "split-layout"
global_context = { show_signup = true }

[[composite_templates.components]]
template = "content-card"
slot = "content"
context = { title = "Overview", body = "<p>Start here.</p>" }

[[composite_templates.components]]
template = "content-card"
slot = "sidebar"
condition = "show_signup"
context = { title = "Sign up", body = "<p>Create an account.</p>" }
"#;

const DEFAULT_RESOURCES: &[(&str, &str)] = &[
    (
        "page-shell.tmpl",
        r#"{{imports}}

export interface {{component_name}}Props {
{{interface_props}}
}

export function {{component_name}}(props: {{component_name}}Props) {
{{local_state}}
  return (
    <main className="page-shell">
      <header>
        <h1>{{title}}</h1>
      </header>
      {{content}}
    </main>
  );
}
"#,
    ),
    (
        "form-panel.tmpl",
        r#"{{imports}}

export interface {{component_name}}Props {
{{interface_props}}
}

export function {{component_name}}(props: {{component_name}}Props) {
{{local_state}}
  return (
    <form className="form-panel" aria-label="{{title}}">
      <h2>{{title}}</h2>
      {{fields}}
      <div className="form-actions">
        {{actions}}
      </div>
    </form>
  );
}
"#,
    ),
    (
        "dashboard-grid.tmpl",
        r#"{{imports}}

export interface {{component_name}}Props {
{{interface_props}}
}

export function {{component_name}}(props: {{component_name}}Props) {
{{local_state}}
  return (
    <section className="dashboard-grid" aria-label="{{title}}">
      <h2>{{title}}</h2>
      <div className="grid">
        {{widgets}}
      </div>
    </section>
  );
}
"#,
    ),
    (
        "content-card.tmpl",
        r#"<article className="content-card">
  <h3>{{title}}</h3>
  <div className="card-body">
    {{body}}
  </div>
  <footer className="card-footer">{{footer}}</footer>
</article>
"#,
    ),
    (
        "split-layout.tmpl",
        r#"{{imports}}

export function {{component_name}}() {
  return (
    <div className="split-layout">
      <header className="layout-header">{{header}}</header>
      <div className="layout-columns">
        <section className="layout-content">
{{content}}
        </section>
        <aside className="layout-sidebar">
{{sidebar}}
        </aside>
      </div>
      <footer className="layout-footer">{{footer}}</footer>
    </div>
  );
}
"#,
    ),
    (
        "login-fields.tmpl",
        r#"      <label htmlFor="email">Email</label>
      <input id="email" name="email" type="email" autoComplete="email" required />
      <label htmlFor="password">Password</label>
      <input id="password" name="password" type="password" autoComplete="current-password" required />
"#,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::model::Slot;

    #[test]
    fn test_default_set_is_consistent() {
        let registry = TemplateRegistry::default_set();
        assert_eq!(registry.base_names().len(), 5);
        assert_eq!(registry.child_names(), vec!["login-form".to_string()]);
        assert_eq!(registry.composite_names(), vec!["landing-page".to_string()]);

        // One base per category
        for category in [
            TemplateCategory::Page,
            TemplateCategory::Component,
            TemplateCategory::Form,
            TemplateCategory::Dashboard,
            TemplateCategory::Layout,
        ] {
            assert_eq!(
                registry.bases_by_category(category).len(),
                1,
                "expected one {} template",
                category
            );
        }
    }

    #[test]
    fn test_default_set_resources_exist() {
        let registry = TemplateRegistry::default_set();
        let resources: Vec<&str> = DEFAULT_RESOURCES.iter().map(|(name, _)| *name).collect();
        for base in registry.bases() {
            assert!(
                resources.contains(&base.resource_path.as_str()),
                "missing resource for {}",
                base.name
            );
        }
        let child = registry.get_child("login-form").unwrap();
        for resource in child.overrides.values() {
            assert!(resources.contains(&resource.as_str()));
        }
    }

    #[test]
    fn test_kind_dispatch() {
        let registry = TemplateRegistry::default_set();
        assert_eq!(registry.kind_of("page-shell"), Some(TemplateKind::Base));
        assert_eq!(registry.kind_of("login-form"), Some(TemplateKind::Child));
        assert_eq!(
            registry.kind_of("landing-page"),
            Some(TemplateKind::Composite)
        );
        assert_eq!(registry.kind_of("nope"), None);
    }

    #[test]
    fn test_not_found_carries_suggestions() {
        let registry = TemplateRegistry::default_set();
        let err = registry.get_base("page-shel").unwrap_err();
        assert_eq!(err.suggestions(), &["page-shell".to_string()]);
    }

    #[test]
    fn test_register_overwrites_same_kind() {
        let mut registry = TemplateRegistry::new();
        let first = BaseTemplate::new("card", "card.tmpl", TemplateCategory::Component);
        let second = BaseTemplate::new("card", "card-v2.tmpl", TemplateCategory::Component);
        registry.register_base(first).unwrap();
        registry.register_base(second).unwrap();
        assert_eq!(
            registry.get_base("card").unwrap().resource_path,
            "card-v2.tmpl"
        );
    }

    #[test]
    fn test_register_rejects_cross_kind_duplicate() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_base(BaseTemplate::new(
                "card",
                "card.tmpl",
                TemplateCategory::Component,
            ))
            .unwrap();
        let err = registry
            .register_composite(CompositeTemplate::new("card", "split-layout"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Duplicate { .. }));
    }

    #[test]
    fn test_document_round_trip() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_base(
                BaseTemplate::new("card", "card.tmpl", TemplateCategory::Component)
                    .with_slot(Slot::required("title").with_default("Card")),
            )
            .unwrap();
        let doc = registry.to_document();
        let text = toml::to_string_pretty(&doc).unwrap();
        let reparsed: RegistryDocument = toml::from_str(&text).unwrap();
        let reloaded = TemplateRegistry::from_document(reparsed).unwrap();
        assert_eq!(
            reloaded.get_base("card").unwrap(),
            registry.get_base("card").unwrap()
        );
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let doc = RegistryDocument {
            version: 99,
            base_templates: Vec::new(),
            child_templates: Vec::new(),
            composite_templates: Vec::new(),
        };
        assert!(matches!(
            TemplateRegistry::from_document(doc),
            Err(TemplateError::Store(StoreError::Version { found: 99, .. }))
        ));
    }

    #[test]
    fn test_find_similar_ranks_by_distance() {
        let names = vec![
            "page-shell".to_string(),
            "page-shelf".to_string(),
            "dashboard-grid".to_string(),
        ];
        let similar = find_similar("page-shel", names.into_iter());
        assert_eq!(similar[0], "page-shell");
        assert_eq!(similar.len(), 2);
    }
}
