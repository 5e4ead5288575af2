//! Slot filling and content validation
//!
//! Each declared slot takes its content from the first source that provides
//! one: caller-supplied slot content, then a string context value with the
//! slot's name, then the slot's default. Optional slots with no source render
//! empty; required slots with no source fail resolution.

use regex::Regex;
use tracing::warn;

use crate::context::{ContextMap, SlotMap};
use crate::template::error::TemplateError;
use crate::template::model::{Slot, SlotValidation};

pub fn resolve_slots(
    template: &str,
    declared: &[Slot],
    supplied: &SlotMap,
    context: &ContextMap,
) -> Result<SlotMap, TemplateError> {
    for name in supplied.keys() {
        if !declared.iter().any(|slot| slot.name == *name) {
            warn!(template, slot = %name, "ignoring content for undeclared slot");
        }
    }

    let mut resolved = SlotMap::new();
    for slot in declared {
        let content = match supplied.get(&slot.name) {
            Some(content) => Some(content.clone()),
            None => context
                .get(&slot.name)
                .and_then(|value| value.as_str())
                .map(str::to_string)
                .or_else(|| slot.default_content.clone()),
        };
        let Some(content) = content else {
            if slot.required {
                return Err(TemplateError::required_slot(template, slot.name.as_str()));
            }
            resolved.insert(slot.name.clone(), String::new());
            continue;
        };
        if let Some(validation) = &slot.validation {
            check_content(template, &slot.name, validation, &content)?;
        }
        resolved.insert(slot.name.clone(), content);
    }
    Ok(resolved)
}

fn check_content(
    template: &str,
    slot: &str,
    validation: &SlotValidation,
    content: &str,
) -> Result<(), TemplateError> {
    let length = content.chars().count();
    if let Some(min) = validation.min_length {
        if length < min {
            return Err(TemplateError::slot_validation(
                template,
                slot,
                format!("content must be at least {min} characters, got {length}"),
            ));
        }
    }
    if let Some(max) = validation.max_length {
        if length > max {
            return Err(TemplateError::slot_validation(
                template,
                slot,
                format!("content must be at most {max} characters, got {length}"),
            ));
        }
    }
    if let Some(pattern) = &validation.pattern {
        let regex = Regex::new(pattern).map_err(|_| {
            TemplateError::slot_validation(
                template,
                slot,
                format!("pattern `{pattern}` is not a valid regular expression"),
            )
        })?;
        if !regex.is_match(content) {
            return Err(TemplateError::slot_validation(
                template,
                slot,
                format!("content must match `{pattern}`"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;

    fn slots(pairs: &[(&str, &str)]) -> SlotMap {
        pairs
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect()
    }

    #[test]
    fn test_supplied_beats_context_and_default() {
        let declared = vec![Slot::new("title").with_default("Default")];
        let supplied = slots(&[("title", "Supplied")]);
        let mut context = ContextMap::new();
        context.insert("title".to_string(), ContextValue::from("From context"));

        let resolved = resolve_slots("card", &declared, &supplied, &context).unwrap();
        assert_eq!(resolved["title"], "Supplied");
    }

    #[test]
    fn test_context_string_beats_default() {
        let declared = vec![Slot::new("title").with_default("Default")];
        let mut context = ContextMap::new();
        context.insert("title".to_string(), ContextValue::from("From context"));

        let resolved = resolve_slots("card", &declared, &SlotMap::new(), &context).unwrap();
        assert_eq!(resolved["title"], "From context");
    }

    #[test]
    fn test_non_string_context_value_is_skipped() {
        let declared = vec![Slot::new("title").with_default("Default")];
        let mut context = ContextMap::new();
        context.insert("title".to_string(), ContextValue::from(true));

        let resolved = resolve_slots("card", &declared, &SlotMap::new(), &context).unwrap();
        assert_eq!(resolved["title"], "Default");
    }

    #[test]
    fn test_required_slot_without_source_fails() {
        let declared = vec![Slot::required("body")];
        let err = resolve_slots("card", &declared, &SlotMap::new(), &ContextMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::RequiredSlotMissing { ref template, ref slot }
                if template == "card" && slot == "body"
        ));
    }

    #[test]
    fn test_optional_slot_without_source_renders_empty() {
        let declared = vec![Slot::new("footer")];
        let resolved =
            resolve_slots("card", &declared, &SlotMap::new(), &ContextMap::new()).unwrap();
        assert_eq!(resolved["footer"], "");
    }

    #[test]
    fn test_undeclared_supplied_slot_is_ignored() {
        let declared = vec![Slot::new("title").with_default("Default")];
        let supplied = slots(&[("mystery", "ignored")]);
        let resolved = resolve_slots("card", &declared, &supplied, &ContextMap::new()).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(!resolved.contains_key("mystery"));
    }

    #[test]
    fn test_length_validation() {
        let declared = vec![Slot::new("title").with_validation(SlotValidation {
            min_length: Some(3),
            max_length: Some(5),
            pattern: None,
        })];

        let err = resolve_slots("card", &declared, &slots(&[("title", "ab")]), &ContextMap::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::SlotValidationFailed { .. }));

        let err = resolve_slots(
            "card",
            &declared,
            &slots(&[("title", "abcdef")]),
            &ContextMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::SlotValidationFailed { .. }));

        let resolved = resolve_slots(
            "card",
            &declared,
            &slots(&[("title", "abcd")]),
            &ContextMap::new(),
        )
        .unwrap();
        assert_eq!(resolved["title"], "abcd");
    }

    #[test]
    fn test_pattern_validation() {
        let declared = vec![Slot::new("badge").with_validation(SlotValidation {
            min_length: None,
            max_length: None,
            pattern: Some("^[A-Z]+$".to_string()),
        })];

        let resolved = resolve_slots(
            "card",
            &declared,
            &slots(&[("badge", "NEW")]),
            &ContextMap::new(),
        )
        .unwrap();
        assert_eq!(resolved["badge"], "NEW");

        let err = resolve_slots(
            "card",
            &declared,
            &slots(&[("badge", "new")]),
            &ContextMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::SlotValidationFailed { .. }));
    }

    #[test]
    fn test_unfilled_optional_slot_skips_validation() {
        let declared = vec![Slot::new("badge").with_validation(SlotValidation {
            min_length: Some(2),
            max_length: None,
            pattern: None,
        })];
        let resolved =
            resolve_slots("card", &declared, &SlotMap::new(), &ContextMap::new()).unwrap();
        assert_eq!(resolved["badge"], "");
    }
}
