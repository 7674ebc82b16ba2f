//! Receipt layout classification.
//!
//! A [`Layout`] is a recognized receipt template tied to a specific bank or
//! app; it selects which extraction rules apply. Classification is keyword
//! driven: each layout carries a signature of indicator substrings, tested
//! against the lower-cased text in priority order. Priority matters because
//! some signatures occur inside other layouts' receipts: a Will Bank PIX
//! receipt names "NU PAGAMENTOS" as the payee institution, so Will Bank
//! must be tested before Nubank.

use tracing::debug;

/// Closed set of recognized receipt layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    WillBank,
    Nubank,
    Caixa,
    BancoDoBrasil,
    Bradesco,
    Itau,
    Santander,
    /// Terminal fallback for unclassifiable text. Not an error state.
    #[default]
    Generic,
}

/// Signatures in classification priority order, most specific first.
const SIGNATURES: &[(Layout, &[&str])] = &[
    (Layout::WillBank, &["will bank", "willbank"]),
    (Layout::Nubank, &["nu pagamentos", "nubank"]),
    (Layout::Caixa, &["caixa econômica", "caixa economica", "caixa"]),
    (Layout::BancoDoBrasil, &["banco do brasil"]),
    (Layout::Bradesco, &["bradesco"]),
    (Layout::Itau, &["itaú", "itau"]),
    (Layout::Santander, &["santander"]),
];

impl Layout {
    /// All layouts that carry a rule set, in classification order,
    /// followed by [`Layout::Generic`].
    pub fn all() -> impl Iterator<Item = Layout> {
        SIGNATURES
            .iter()
            .map(|(l, _)| *l)
            .chain(std::iter::once(Layout::Generic))
    }

    /// Snake-case code used in output files (`layout_detectado`).
    pub fn code(&self) -> &'static str {
        match self {
            Layout::WillBank => "will_bank",
            Layout::Nubank => "nubank",
            Layout::Caixa => "caixa",
            Layout::BancoDoBrasil => "banco_do_brasil",
            Layout::Bradesco => "bradesco",
            Layout::Itau => "itau",
            Layout::Santander => "santander",
            Layout::Generic => "generico",
        }
    }

    /// Canonical institution name of the bank issuing this layout's
    /// receipts, used when the text itself never names the payer's bank.
    pub fn canonical_institution(&self) -> Option<&'static str> {
        match self {
            Layout::WillBank => Some("Will Bank"),
            Layout::Nubank => Some("NU PAGAMENTOS S.A."),
            Layout::Caixa => Some("CAIXA ECONÔMICA FEDERAL"),
            Layout::BancoDoBrasil => Some("BANCO DO BRASIL S.A."),
            Layout::Bradesco => Some("BANCO BRADESCO S.A."),
            Layout::Itau => Some("ITAÚ UNIBANCO S.A."),
            Layout::Santander => Some("BANCO SANTANDER (BRASIL) S.A."),
            Layout::Generic => None,
        }
    }

    /// Human-readable channel name (`canal_utilizado`).
    pub fn display_name(&self) -> &'static str {
        match self {
            Layout::WillBank => "Will Bank",
            Layout::Nubank => "Nubank",
            Layout::Caixa => "Caixa",
            Layout::BancoDoBrasil => "Banco do Brasil",
            Layout::Bradesco => "Bradesco",
            Layout::Itau => "Itaú",
            Layout::Santander => "Santander",
            Layout::Generic => "Generico",
        }
    }
}

/// Pluggable ML-assist classifier. An implementation may later be backed
/// by a trained model; none ships in this crate.
pub trait LayoutModel: Send + Sync {
    /// Suggest a layout for the given text, or `None` to abstain.
    fn classify(&self, text: &str) -> Option<Layout>;
}

/// Keyword-signature layout classifier.
///
/// Total and deterministic: text matching no signature classifies as
/// [`Layout::Generic`], never an error.
#[derive(Default)]
pub struct LayoutClassifier {
    model: Option<Box<dyn LayoutModel>>,
}

impl LayoutClassifier {
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Attach an ML-assist model, consulted only when the keyword
    /// signatures fail to classify.
    pub fn with_model(mut self, model: Box<dyn LayoutModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Classify corrected receipt text into a layout.
    pub fn classify(&self, text: &str) -> Layout {
        let lower = text.to_lowercase();

        for (layout, indicators) in SIGNATURES {
            if indicators.iter().any(|ind| lower.contains(ind)) {
                debug!("Classified layout {:?}", layout);
                return *layout;
            }
        }

        if let Some(model) = &self.model {
            if let Some(layout) = model.classify(text) {
                debug!("Model-assisted layout {:?}", layout);
                return layout;
            }
        }

        Layout::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_will_bank() {
        let classifier = LayoutClassifier::new();
        assert_eq!(classifier.classify("Comprovante Will Bank"), Layout::WillBank);
        assert_eq!(classifier.classify("pix willbank enviado"), Layout::WillBank);
    }

    #[test]
    fn test_will_bank_wins_over_nubank_mention() {
        // Will Bank receipts name NU PAGAMENTOS as the payee institution.
        let text = "Will Bank\nDestino\nInstituição NU PAGAMENTOS - IP";
        assert_eq!(LayoutClassifier::new().classify(text), Layout::WillBank);
    }

    #[test]
    fn test_classify_known_banks() {
        let classifier = LayoutClassifier::new();
        assert_eq!(classifier.classify("NU PAGAMENTOS S.A."), Layout::Nubank);
        assert_eq!(classifier.classify("CAIXA ECONÔMICA FEDERAL"), Layout::Caixa);
        assert_eq!(classifier.classify("Banco do Brasil S.A."), Layout::BancoDoBrasil);
        assert_eq!(classifier.classify("bradesco internet banking"), Layout::Bradesco);
        assert_eq!(classifier.classify("Itaú Unibanco"), Layout::Itau);
        assert_eq!(classifier.classify("Santander comprovante"), Layout::Santander);
    }

    #[test]
    fn test_unmatched_text_is_generic() {
        let classifier = LayoutClassifier::new();
        assert_eq!(classifier.classify("comprovante de pagamento"), Layout::Generic);
        assert_eq!(classifier.classify(""), Layout::Generic);
        assert_eq!(classifier.classify("@#$%!"), Layout::Generic);
    }

    #[test]
    fn test_model_consulted_only_on_generic() {
        struct Fixed;
        impl LayoutModel for Fixed {
            fn classify(&self, _text: &str) -> Option<Layout> {
                Some(Layout::Bradesco)
            }
        }

        let classifier = LayoutClassifier::new().with_model(Box::new(Fixed));
        // Signature match wins over the model.
        assert_eq!(classifier.classify("will bank"), Layout::WillBank);
        // Unmatched text falls through to the model.
        assert_eq!(classifier.classify("texto sem assinatura"), Layout::Bradesco);
    }
}
