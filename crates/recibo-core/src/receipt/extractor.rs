//! Per-layout field extraction.

use std::collections::BTreeMap;

use tracing::debug;

use crate::receipt::layout::Layout;
use crate::receipt::registry::LayoutRuleRegistry;

/// Raw extracted fields, keyed by the layout's field names.
///
/// A `BTreeMap` keeps iteration deterministic, so identical `(text,
/// layout)` inputs always produce byte-identical downstream output.
pub type RawFieldMap = BTreeMap<String, String>;

/// Applies a layout's extraction rules to corrected text.
///
/// Pure: no state beyond the borrowed registry, so the same inputs always
/// yield the same map. Fields whose matchers all fail are simply absent.
pub struct FieldExtractor<'r> {
    registry: &'r LayoutRuleRegistry,
}

impl<'r> FieldExtractor<'r> {
    pub fn new(registry: &'r LayoutRuleRegistry) -> Self {
        Self { registry }
    }

    /// Run every rule of the layout's rule set against the text.
    pub fn extract(&self, text: &str, layout: Layout) -> RawFieldMap {
        let set = self.registry.rule_set(layout);
        let mut fields = RawFieldMap::new();

        for rule in set.rules() {
            if let Some(value) = rule.apply(text) {
                fields.insert(rule.field_name().to_string(), value);
            }
        }

        debug!(
            "Extracted {} of {} fields for {:?}",
            fields.len(),
            set.rules().len(),
            layout
        );

        fields
    }
}
