//! Inheritance chain walking and flattening
//!
//! A child template names its parent through `extends`; parents may be other
//! children, but every chain must terminate at a base template. Chains are
//! checked whenever the registry changes, so resolution can walk them without
//! re-detecting cycles.

use std::collections::BTreeMap;

use crate::context::{merge, ContextMap};
use crate::template::error::TemplateError;
use crate::template::model::{BaseTemplate, ChildTemplate, Slot};

/// A child's path to its root base template
///
/// Links are ordered root-first: the first entry extends the base directly
/// and the last entry is the requested child, so a fold over the links gives
/// the leafmost definition precedence.
#[derive(Debug)]
pub struct Chain<'a> {
    pub base: &'a BaseTemplate,
    pub links: Vec<&'a ChildTemplate>,
}

impl Chain<'_> {
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    /// Slot declarations after applying every link's additions and removals
    pub fn effective_slots(&self) -> Vec<Slot> {
        let mut slots = self.base.slots.clone();
        for link in &self.links {
            for added in &link.additional_slots {
                match slots.iter_mut().find(|slot| slot.name == added.name) {
                    Some(existing) => *existing = added.clone(),
                    None => slots.push(added.clone()),
                }
            }
            slots.retain(|slot| !link.remove_slots.contains(&slot.name));
        }
        slots
    }

    /// Default context with every link's additions overlaid, leaf last
    pub fn effective_context(&self) -> ContextMap {
        let mut context = self.base.default_context.clone();
        for link in &self.links {
            merge(&mut context, &link.additional_context);
        }
        context
    }

    /// Slot overrides with the leafmost definition winning
    pub fn effective_overrides(&self) -> BTreeMap<String, String> {
        let mut overrides = BTreeMap::new();
        for link in &self.links {
            for (slot, resource) in &link.overrides {
                overrides.insert(slot.clone(), resource.clone());
            }
        }
        overrides
    }
}

/// Walk a child's `extends` chain up to its base template
pub fn resolve_chain<'a>(
    bases: &'a BTreeMap<String, BaseTemplate>,
    children: &'a BTreeMap<String, ChildTemplate>,
    child: &'a ChildTemplate,
) -> Result<Chain<'a>, TemplateError> {
    let mut links = vec![child];
    let mut seen = vec![child.name.as_str()];
    let mut current = child;
    loop {
        let parent = current.extends.as_str();
        if let Some(base) = bases.get(parent) {
            links.reverse();
            return Ok(Chain { base, links });
        }
        let Some(next) = children.get(parent) else {
            return Err(TemplateError::DanglingExtends {
                child: current.name.clone(),
                extends: parent.to_string(),
            });
        };
        if seen.contains(&parent) {
            let mut chain: Vec<String> = seen.iter().map(|name| name.to_string()).collect();
            chain.push(parent.to_string());
            return Err(TemplateError::circular_inheritance(&chain));
        }
        seen.push(parent);
        links.push(next);
        current = next;
    }
}

/// Check that every child's chain terminates at a base without repeating
pub fn validate_hierarchy(
    bases: &BTreeMap<String, BaseTemplate>,
    children: &BTreeMap<String, ChildTemplate>,
) -> Result<(), TemplateError> {
    for child in children.values() {
        resolve_chain(bases, children, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;
    use crate::template::model::TemplateCategory;

    fn base(name: &str) -> BaseTemplate {
        BaseTemplate::new(name, format!("{name}.tmpl"), TemplateCategory::Component)
    }

    fn child(name: &str, extends: &str) -> ChildTemplate {
        ChildTemplate::new(name, extends, TemplateCategory::Component)
    }

    fn map<T: Clone>(items: &[(&str, T)]) -> BTreeMap<String, T> {
        items
            .iter()
            .map(|(name, item)| (name.to_string(), item.clone()))
            .collect()
    }

    #[test]
    fn test_chain_orders_links_root_first() {
        let bases = map(&[("root", base("root"))]);
        let children = map(&[
            ("mid", child("mid", "root")),
            ("leaf", child("leaf", "mid")),
        ]);
        let chain = resolve_chain(&bases, &children, &children["leaf"]).unwrap();
        assert_eq!(chain.base.name, "root");
        let names: Vec<&str> = chain.links.iter().map(|link| link.name.as_str()).collect();
        assert_eq!(names, vec!["mid", "leaf"]);
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_dangling_extends_detected() {
        let bases = map(&[("root", base("root"))]);
        let children = map(&[("leaf", child("leaf", "nowhere"))]);
        let err = validate_hierarchy(&bases, &children).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::DanglingExtends { ref child, ref extends }
                if child == "leaf" && extends == "nowhere"
        ));
    }

    #[test]
    fn test_cycle_detected_with_chain() {
        let bases = map(&[("root", base("root"))]);
        let children = map(&[("a", child("a", "b")), ("b", child("b", "a"))]);
        let err = validate_hierarchy(&bases, &children).unwrap_err();
        match err {
            TemplateError::CircularInheritance { chain } => {
                assert_eq!(chain, "a -> b -> a");
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle_detected() {
        let bases = map(&[("root", base("root"))]);
        let children = map(&[("a", child("a", "a"))]);
        let err = validate_hierarchy(&bases, &children).unwrap_err();
        assert!(matches!(err, TemplateError::CircularInheritance { .. }));
    }

    #[test]
    fn test_effective_context_leaf_wins() {
        let mut root = base("root");
        root.default_context
            .insert("title".to_string(), ContextValue::from("Root"));
        root.default_context
            .insert("theme".to_string(), ContextValue::from("light"));
        let bases = map(&[("root", root)]);

        let mut mid = child("mid", "root");
        mid.additional_context
            .insert("title".to_string(), ContextValue::from("Mid"));
        let mut leaf = child("leaf", "mid");
        leaf.additional_context
            .insert("title".to_string(), ContextValue::from("Leaf"));
        let children = map(&[("mid", mid), ("leaf", leaf)]);

        let chain = resolve_chain(&bases, &children, &children["leaf"]).unwrap();
        let context = chain.effective_context();
        assert_eq!(context.get("title"), Some(&ContextValue::from("Leaf")));
        assert_eq!(context.get("theme"), Some(&ContextValue::from("light")));
    }

    #[test]
    fn test_effective_slots_add_replace_remove() {
        let root = base("root")
            .with_slot(Slot::required("title"))
            .with_slot(Slot::new("footer").with_default("root footer"));
        let bases = map(&[("root", root)]);

        let mut leaf = child("leaf", "root");
        leaf.additional_slots
            .push(Slot::new("footer").with_default("leaf footer"));
        leaf.additional_slots.push(Slot::new("badge"));
        leaf.remove_slots.push("title".to_string());
        let children = map(&[("leaf", leaf)]);

        let chain = resolve_chain(&bases, &children, &children["leaf"]).unwrap();
        let slots = chain.effective_slots();
        let names: Vec<&str> = slots.iter().map(|slot| slot.name.as_str()).collect();
        assert_eq!(names, vec!["footer", "badge"]);
        assert_eq!(slots[0].default_content.as_deref(), Some("leaf footer"));
    }

    #[test]
    fn test_effective_overrides_leaf_wins() {
        let bases = map(&[("root", base("root"))]);
        let mid = child("mid", "root")
            .with_override("body", "mid-body.tmpl")
            .with_override("footer", "mid-footer.tmpl");
        let leaf = child("leaf", "mid").with_override("body", "leaf-body.tmpl");
        let children = map(&[("mid", mid), ("leaf", leaf)]);

        let chain = resolve_chain(&bases, &children, &children["leaf"]).unwrap();
        let overrides = chain.effective_overrides();
        assert_eq!(overrides["body"], "leaf-body.tmpl");
        assert_eq!(overrides["footer"], "mid-footer.tmpl");
    }
}
