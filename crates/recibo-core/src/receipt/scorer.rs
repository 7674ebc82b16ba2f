//! Weighted extraction confidence scoring.

use crate::receipt::extractor::RawFieldMap;
use crate::receipt::layout::Layout;
use crate::receipt::registry::LayoutRuleRegistry;

/// Combines per-field rule weights into a bounded confidence score.
///
/// Each (layout, field) pair the registry flags with a non-zero weight is
/// a class-discriminating signal; the score is the sum of weights for
/// fields present in the map, clamped to 1.0. The score is informational
/// metadata; extraction always proceeds regardless of it.
pub struct ConfidenceScorer<'r> {
    registry: &'r LayoutRuleRegistry,
}

impl<'r> ConfidenceScorer<'r> {
    pub fn new(registry: &'r LayoutRuleRegistry) -> Self {
        Self { registry }
    }

    /// Score the extraction, returning the clamped score and the names
    /// of the fields that contributed to it.
    pub fn score(&self, layout: Layout, fields: &RawFieldMap) -> (f32, Vec<String>) {
        let set = self.registry.rule_set(layout);

        let mut total = 0.0f32;
        let mut signals = Vec::new();

        for field in fields.keys() {
            let weight = set.weight_of(field);
            if weight > 0.0 {
                total += weight;
                signals.push(field.clone());
            }
        }

        (total.clamp(0.0, 1.0), signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(fields: &[(&str, &str)]) -> RawFieldMap {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_map_scores_zero() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let scorer = ConfidenceScorer::new(&registry);
        let (score, signals) = scorer.score(Layout::WillBank, &RawFieldMap::new());
        assert_eq!(score, 0.0);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_score_is_bounded() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let scorer = ConfidenceScorer::new(&registry);

        for layout in Layout::all() {
            // Present every field the layout knows about, plus noise.
            let mut fields = RawFieldMap::new();
            for rule in registry.rule_set(layout).rules() {
                fields.insert(rule.field_name().to_string(), "x".to_string());
            }
            fields.insert("campo_desconhecido".to_string(), "y".to_string());

            let (score, _) = scorer.score(layout, &fields);
            assert!((0.0..=1.0).contains(&score), "{:?}: {}", layout, score);
        }
    }

    #[test]
    fn test_absent_fields_contribute_nothing() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let scorer = ConfidenceScorer::new(&registry);

        let partial = map(&[("valor", "33,00")]);
        let fuller = map(&[("valor", "33,00"), ("destino_nome", "Ana")]);

        let (a, _) = scorer.score(Layout::WillBank, &partial);
        let (b, signals) = scorer.score(Layout::WillBank, &fuller);
        assert!(b > a);
        assert_eq!(signals, vec!["destino_nome", "valor"]);
    }

    #[test]
    fn test_zero_weight_fields_are_not_signals() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let scorer = ConfidenceScorer::new(&registry);

        let fields = map(&[("descricao", "aluguel")]);
        let (score, signals) = scorer.score(Layout::WillBank, &fields);
        assert_eq!(score, 0.0);
        assert!(signals.is_empty());
    }
}
