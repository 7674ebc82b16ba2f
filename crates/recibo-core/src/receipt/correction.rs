//! Deterministic OCR error correction.
//!
//! Photographed receipts come back from OCR with a recurring set of
//! misreads: `R5`/`RS` where `R$` was printed, a letter `O` where a digit
//! `0` belongs inside a year, mangled institution names. The corrector
//! fixes these with an ordered table of literal substitutions. It is pure
//! and total, and a text containing no table entries passes through
//! unchanged, so correcting twice equals correcting once.

/// Ordered literal substitution table for known OCR confusions.
pub struct TextCorrector {
    substitutions: Vec<(String, String)>,
}

/// Default corrections, recovered from observed OCR output. Entries are
/// applied in order; earlier entries must not produce text a later entry
/// would rewrite differently.
const DEFAULT_SUBSTITUTIONS: &[(&str, &str)] = &[
    // Currency symbol misreads
    ("R5 ", "R$ "),
    ("RS ", "R$ "),
    // Digit/letter confusions in dates
    ("2O25", "2025"),
    ("O5/", "05/"),
    // Institution names
    ("NU PAGAMENT0S", "NU PAGAMENTOS"),
    ("Wili Bank", "Will Bank"),
    // Letter confusions in printed names
    ("Ana Cieuma", "Ana Cleuma"),
    ("Ana Cieima", "Ana Cleuma"),
    ("Sheiia", "Sheila"),
    ("Antonlo", "Antonio"),
];

impl TextCorrector {
    /// Corrector with the default substitution table.
    pub fn new() -> Self {
        Self::from_table(Self::default_table())
    }

    /// The built-in substitution table, for callers extending it.
    pub fn default_table() -> Vec<(String, String)> {
        DEFAULT_SUBSTITUTIONS
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Corrector with a caller-supplied table, e.g. from configuration.
    pub fn from_table(substitutions: Vec<(String, String)>) -> Self {
        Self { substitutions }
    }

    /// Apply every substitution once, in table order. Never fails.
    pub fn correct(&self, text: &str) -> String {
        let mut corrected = text.to_string();
        for (from, to) in &self.substitutions {
            if corrected.contains(from.as_str()) {
                corrected = corrected.replace(from.as_str(), to);
            }
        }
        corrected
    }
}

impl Default for TextCorrector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_currency_symbol_correction() {
        let corrector = TextCorrector::new();
        assert_eq!(corrector.correct("RS 33,00"), "R$ 33,00");
        assert_eq!(corrector.correct("R5 17,00"), "R$ 17,00");
    }

    #[test]
    fn test_date_digit_correction() {
        let corrector = TextCorrector::new();
        assert_eq!(corrector.correct("20/O5/2O25"), "20/05/2025");
    }

    #[test]
    fn test_clean_text_passes_through() {
        let corrector = TextCorrector::new();
        let text = "Pix enviado R$ 33,00 em 20/05/2025";
        assert_eq!(corrector.correct(text), text);
    }

    #[test]
    fn test_idempotent() {
        let corrector = TextCorrector::new();
        let once = corrector.correct("Wili Bank RS 12,50 2O25");
        let twice = corrector.correct(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_table() {
        let corrector =
            TextCorrector::from_table(vec![("Nubanc".to_string(), "Nubank".to_string())]);
        assert_eq!(corrector.correct("via Nubanc"), "via Nubank");
        // Default entries are not applied with a custom table.
        assert_eq!(corrector.correct("RS 10,00"), "RS 10,00");
    }
}
