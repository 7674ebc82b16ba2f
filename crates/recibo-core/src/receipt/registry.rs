//! Data-driven extraction rule registry.
//!
//! One [`LayoutRuleSet`] per [`Layout`] holds the named extraction rules:
//! a raw field name, an ordered chain of pattern matchers (first match
//! wins), a duplicate-match policy, and the confidence weight the field
//! carries as a class-discriminating signal. The registry is process-wide,
//! read-only configuration consumed by both extraction and scoring, built
//! once and injected into the pipeline.

use std::collections::HashMap;

use regex::Regex;

use crate::error::ExtractionError;
use crate::models::receipt::ReceiptType;
use crate::receipt::layout::Layout;

/// Which occurrence wins when a pattern matches more than once.
///
/// `Last` serves trailing summary values that restate an amount already
/// shown earlier in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPick {
    #[default]
    First,
    Last,
}

/// A single compiled pattern matcher. Captures group 1 when the pattern
/// defines one, otherwise the whole match.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    fn new(field: &str, pattern: &str) -> Result<Self, ExtractionError> {
        let regex = Regex::new(pattern).map_err(|source| ExtractionError::InvalidPattern {
            field: field.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Find the picked occurrence in document order, trimmed. Empty
    /// captures count as no match.
    pub fn find(&self, text: &str, pick: MatchPick) -> Option<String> {
        let caps = match pick {
            MatchPick::First => self.regex.captures(text),
            MatchPick::Last => self.regex.captures_iter(text).last(),
        }?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        let value = m.as_str().trim();
        if value.is_empty() {
            return None;
        }
        Some(value.to_string())
    }
}

/// A named field extraction rule: matcher chain plus scoring weight.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    field: String,
    matchers: Vec<Matcher>,
    pick: MatchPick,
    weight: f32,
}

impl ExtractionRule {
    /// Rule with its primary pattern. Further patterns become fallbacks.
    pub fn new(field: impl Into<String>, pattern: &str) -> Result<Self, ExtractionError> {
        let field = field.into();
        let matcher = Matcher::new(&field, pattern)?;
        Ok(Self {
            field,
            matchers: vec![matcher],
            pick: MatchPick::First,
            weight: 0.0,
        })
    }

    /// Append a fallback matcher, tried when earlier matchers fail.
    pub fn fallback(mut self, pattern: &str) -> Result<Self, ExtractionError> {
        let matcher = Matcher::new(&self.field, pattern)?;
        self.matchers.push(matcher);
        Ok(self)
    }

    /// Confidence weight contributed when this field is present.
    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Pick the last occurrence in document order instead of the first.
    pub fn last_match(mut self) -> Self {
        self.pick = MatchPick::Last;
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn signal_weight(&self) -> f32 {
        self.weight
    }

    /// Run the matcher chain against the text; first matcher that
    /// matches wins for this field.
    pub fn apply(&self, text: &str) -> Option<String> {
        self.matchers.iter().find_map(|m| m.find(text, self.pick))
    }
}

/// All rules for one layout, plus the transaction type the layout
/// implies when the text itself does not say.
#[derive(Debug, Clone)]
pub struct LayoutRuleSet {
    layout: Layout,
    default_kind: ReceiptType,
    rules: Vec<ExtractionRule>,
}

impl LayoutRuleSet {
    pub fn new(layout: Layout, default_kind: ReceiptType) -> Self {
        Self {
            layout,
            default_kind,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: ExtractionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn default_kind(&self) -> ReceiptType {
        self.default_kind
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn weight_of(&self, field: &str) -> f32 {
        self.rules
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.weight)
            .unwrap_or(0.0)
    }
}

/// Registry of rule sets keyed by layout.
///
/// Always resolves: layouts without a registered set fall back to the
/// generic set, so extraction is total over the layout enumeration.
#[derive(Debug, Clone)]
pub struct LayoutRuleRegistry {
    sets: HashMap<Layout, LayoutRuleSet>,
}

impl LayoutRuleRegistry {
    /// Build a registry from explicit rule sets. A generic set is always
    /// present; an empty one is installed if the caller omitted it.
    pub fn new(sets: Vec<LayoutRuleSet>) -> Self {
        let mut map: HashMap<Layout, LayoutRuleSet> =
            sets.into_iter().map(|s| (s.layout, s)).collect();
        map.entry(Layout::Generic)
            .or_insert_with(|| LayoutRuleSet::new(Layout::Generic, ReceiptType::Generic));
        Self { sets: map }
    }

    /// The registry with the built-in per-bank rule tables.
    pub fn with_default_rules() -> Self {
        default_rules()
    }

    /// Rule set for a layout, falling back to the generic set.
    pub fn rule_set(&self, layout: Layout) -> &LayoutRuleSet {
        self.sets
            .get(&layout)
            .unwrap_or_else(|| &self.sets[&Layout::Generic])
    }
}

impl Default for LayoutRuleRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

fn rule(field: &str, weight: f32, patterns: &[&str]) -> ExtractionRule {
    let mut r = ExtractionRule::new(field, patterns[0]).expect("built-in rule pattern");
    for p in &patterns[1..] {
        r = r.fallback(p).expect("built-in rule pattern");
    }
    r.weight(weight)
}

// Name fragments: letters (accented included) and spaces, lazily bounded
// by the label that follows on the receipt.
const NAME: &str = r"[\p{L}][\p{L} ]+?";

fn will_bank_rules() -> LayoutRuleSet {
    LayoutRuleSet::new(Layout::WillBank, ReceiptType::Pix)
        .rule(rule("valor", 0.2, &[r"R\$\s*([\d.,]+)"]))
        .rule(rule(
            "destino_nome",
            0.2,
            &[&format!(r"\bPara\s+({NAME})\s*(?:\n|CPF|$)")],
        ))
        .rule(rule(
            "origem_nome",
            0.15,
            &[&format!(r"\bDe\s+({NAME})\s*(?:\n|CPF|$)")],
        ))
        .rule(rule(
            "destino_cpf",
            0.1,
            &[r"CPF/CNPJ\s+(\*{3}[.,]?\d{3}[.,]\d{3}-?\*{2})"],
        ))
        .rule(rule(
            "origem_cpf",
            0.05,
            &[r"(?s)\bDe\s.*?CPF/CNPJ\s+(\*{3}[.,]?\d{3}[.,]\d{3}-?\*{2})"],
        ))
        .rule(rule(
            "destino_instituicao",
            0.0,
            &[r"Institui[çc][ãa]o\s+([\p{Lu}][\p{Lu}0-9 &.\-]*)"],
        ))
        .rule(rule("origem_instituicao", 0.05, &[r"(Will Bank)"]))
        .rule(rule(
            "chave_pix",
            0.1,
            &[r"(\(\d{2}\)\s*\d{5}-\d{4})", r"(\+55\d{10,11})"],
        ))
        .rule(rule("descricao", 0.0, &[r"Descri[çc][ãa]o\s+([^\n\r]+)"]))
        .rule(rule("autenticacao", 0.1, &[r"Autentica[çc][ãa]o\s+([A-Z0-9]+)"]))
        .rule(rule("data", 0.1, &[r"(\d{2}/\d{2}/\d{4})"]))
        .rule(rule("hora", 0.05, &[r"(\d{2}:\d{2}:\d{2})"]))
        .rule(rule(
            "situacao",
            0.0,
            &[r"Situa[çc][ãa]o\s*:?\s*([\p{L}]+)", r"\b(Efetivado)\b"],
        ))
}

fn nubank_rules() -> LayoutRuleSet {
    LayoutRuleSet::new(Layout::Nubank, ReceiptType::Transfer)
        .rule(rule(
            "valor",
            0.2,
            &[r"Valor\s+R\$\s*([\d.,]+)", r"R\$\s*([\d.,]+)"],
        ))
        .rule(rule(
            "data",
            0.15,
            &[
                r"(\d{1,2}\s+(?:JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)\s+\d{4})",
                r"(\d{1,2}/\d{1,2}/\d{4})",
            ],
        ))
        .rule(rule("hora", 0.05, &[r"(\d{1,2}:\d{2}:\d{2})"]))
        .rule(rule(
            "destino_nome",
            0.15,
            &[r"(?s)Destino.*?Nome\s+([^\n]+)"],
        ))
        .rule(rule("origem_nome", 0.15, &[r"(?s)Origem.*?Nome\s+([^\n]+)"]))
        .rule(rule("cnpj", 0.05, &[r"(?s)Destino.*?CNPJ\s+([\d./-]+)"]))
        .rule(rule("origem_cpf", 0.05, &[r"(?s)Origem.*?CPF\s+([^\n]+)"]))
        .rule(rule(
            "destino_instituicao",
            0.0,
            &[r"(?s)Destino.*?Institui[çc][ãa]o\s+([^\n]+)"],
        ))
        .rule(rule(
            "origem_instituicao",
            0.0,
            &[r"(?s)Origem.*?Institui[çc][ãa]o\s+([^\n]+)"],
        ))
        .rule(rule("agencia", 0.0, &[r"Ag[êe]ncia\s+(\d+)"]))
        .rule(rule("conta", 0.0, &[r"Conta\s+([\d-]+)"]))
        .rule(rule(
            "id_transacao",
            0.1,
            &[r"Identificador\s+([A-Za-z0-9]+)", r"\bID\s+([A-Za-z0-9]+)"],
        ))
        .rule(rule(
            "tipo_transferencia",
            0.1,
            &[r"Tipo de transfer[êe]ncia\s+([^\n]+)"],
        ))
        .rule(rule(
            "data_expiracao",
            0.0,
            &[r"Expira[çc][ãa]o\s+(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2})"],
        ))
        .rule(rule(
            "chave_pix",
            0.0,
            &[r"(\+55\d{10,11})", r"(\(\d{2}\)\s*\d{5}-\d{4})"],
        ))
}

fn caixa_rules() -> LayoutRuleSet {
    LayoutRuleSet::new(Layout::Caixa, ReceiptType::Pix)
        .rule(rule(
            "valor",
            0.2,
            &[r"(?:Valor|R\$)\s*R?\$?\s*([\d.,]+)"],
        ))
        .rule(rule(
            "recebedor_nome",
            0.15,
            &[&format!(
                r"(?s)Dados do recebedor.*?Nome\s*\n\s*({NAME})\s*(?:\n|CPF)"
            )],
        ))
        .rule(rule(
            "pagador_nome",
            0.15,
            &[&format!(
                r"(?s)Dados do pagador.*?Nome\s*\n\s*({NAME})\s*(?:\n|CPF)"
            )],
        ))
        .rule(rule(
            "recebedor_cpf",
            0.1,
            &[r"(?s)Dados do recebedor.*?CPF\s*\n?\s*(\*{3}[.,]?\d{3}[.,]?\d{3}-?\*{2})"],
        ))
        .rule(rule(
            "pagador_cpf",
            0.1,
            &[r"(?s)Dados do pagador.*?CPF\s*\n?\s*(\*{3}[.,]?\d{3}[.,]?\d{3}-?\*{2})"],
        ))
        .rule(rule(
            "recebedor_instituicao",
            0.0,
            &[r"(?s)Dados do recebedor.*?Institui[çc][ãa]o\s*\n\s*([\p{Lu}][\p{Lu}0-9 &.\-]+?)\s*(?:\n|Dados)"],
        ))
        .rule(rule(
            "pagador_instituicao",
            0.0,
            &[r"(?s)Dados do pagador.*?Institui[çc][ãa]o\s*\n\s*([\p{Lu}][\p{Lu}0-9 &.\-]+?)\s*(?:\n|Dados)"],
        ))
        .rule(rule("situacao", 0.05, &[r"Situa[çc][ãa]o\s*\n?\s*([\p{L}]+)"]))
        .rule(rule(
            "id_transacao",
            0.1,
            &[r"ID transa[çc][ãa]o\s*\n?\s*([A-Za-z0-9]+)"],
        ))
        .rule(rule(
            "codigo_operacao",
            0.05,
            &[r"C[óo]digo da opera[çc][ãa]o\s*\n?\s*(\d+)"],
        ))
        .rule(rule(
            "chave_seguranca",
            0.0,
            &[r"Chave de seguran[çc]a\s*\n?\s*([A-Z0-9]+)"],
        ))
        .rule(rule("chave_pix", 0.0, &[r"(?i)Chave\s*\n\s*(\d+)"]))
        .rule(rule(
            "data_hora_completa",
            0.1,
            &[r"Data/\s*Hora\s*\n?\s*(\d{1,2}/\d{1,2}/\d{4}\s*-\s*\d{1,2}:\d{2}:\d{2})"],
        ))
        .rule(rule("data", 0.0, &[r"(\d{1,2}/\d{1,2}/\d{4})"]))
        .rule(rule("hora", 0.0, &[r"(\d{1,2}:\d{2}:\d{2})"]))
}

/// Transfer-style layout shared by the remaining full-service banks.
/// Their receipts label fields the same way; only the letterhead differs.
fn transfer_bank_rules(layout: Layout) -> LayoutRuleSet {
    LayoutRuleSet::new(layout, ReceiptType::Transfer)
        .rule(rule(
            "valor",
            0.2,
            &[r"(?i)Valor[\s:]*R\$\s*([\d.,]+)", r"R\$\s*([\d.,]+)"],
        ))
        .rule(rule(
            "origem_nome",
            0.15,
            &[&format!(r"(?i)Nome[\s:]+({NAME})\s*(?:\n|CPF|CNPJ)")],
        ))
        .rule(rule(
            "destino_nome",
            0.15,
            &[&format!(r"(?is)Destino.*?Nome[\s:]+({NAME})\s*(?:\n|CPF|CNPJ|$)")],
        ))
        .rule(rule(
            "cpf",
            0.1,
            &[r"(?i)CPF[\s:]*(\*{3}[.,]?\d{3}[.,]?\d{3}-?\*{2}|\d{3}\.?\d{3}\.?\d{3}-?\d{2})"],
        ))
        .rule(rule("cnpj", 0.1, &[r"(?i)CNPJ[\s:]*(\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})"]))
        .rule(rule(
            "instituicao",
            0.0,
            &[r"(?i)Institui[çc][ãa]o[\s:]+([\p{Lu}][\p{Lu}0-9 &.\-]+)"],
        ))
        .rule(rule("conta", 0.0, &[r"(?i)Conta[\s:]+(\d+-?\d)"]))
        .rule(rule("agencia", 0.0, &[r"(?i)Ag[êe]ncia[\s:]+(\d{4})"]))
        .rule(rule("data", 0.15, &[r"(\d{1,2}/\d{1,2}/\d{4})"]))
        .rule(rule("hora", 0.05, &[r"(\d{1,2}:\d{2}:\d{2})"]))
        .rule(rule(
            "data_expiracao",
            0.0,
            &[r"(?i)Expira[çc][ãa]o[\s:]+(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2})"],
        ))
        .rule(rule(
            "vencimento",
            0.0,
            &[r"(?i)Vencimento[\s:]*(\d{2}/\d{2}/\d{4})"],
        ))
        .rule(rule(
            "beneficiario",
            0.0,
            &[&format!(r"(?i)Benefici[áa]ri[oa][\s:]+({NAME})\s*(?:\n|$)")],
        ))
        .rule(rule("id_transacao", 0.1, &[r"(?i)\bID[\s:]+([A-Za-z0-9]+)"]))
}

fn generic_rules() -> LayoutRuleSet {
    LayoutRuleSet::new(Layout::Generic, ReceiptType::Generic)
        .rule(rule(
            "valor",
            0.3,
            &[r"R\$\s*([\d.,]+)", r"(?i)Valor[\s:]*R?\$?\s*([\d.,]+)"],
        ))
        // Trailing restatement of the amount; boletos print the charged
        // value again at the bottom of the slip.
        .rule(rule("valor_cobrado", 0.0, &[r"R\$\s*([\d.,]+)"]).last_match())
        .rule(rule(
            "data",
            0.15,
            &[r"(\d{1,2}/\d{1,2}/\d{4})", r"(\d{1,2}-\d{1,2}-\d{4})"],
        ))
        .rule(rule("hora", 0.1, &[r"(\d{1,2}:\d{2}:\d{2})", r"(\d{1,2}:\d{2})"]))
        .rule(rule(
            "nome",
            0.15,
            &[&format!(r"(?i)Nome[\s:]+({NAME})\s*(?:\n|CPF|$)")],
        ))
        .rule(rule(
            "cpf",
            0.1,
            &[r"(?i)CPF[\s:]*(\*{3}[.,]?\d{3}[.,]?\d{3}-?\*{2}|\d{3}\.?\d{3}\.?\d{3}-?\d{2})"],
        ))
        .rule(rule("cnpj", 0.0, &[r"(?i)CNPJ[\s:]*(\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})"]))
        .rule(rule(
            "instituicao",
            0.0,
            &[r"(?i)Institui[çc][ãa]o[\s:]+([\p{Lu}][\p{Lu}0-9 &.\-]+)"],
        ))
        .rule(rule("id_transacao", 0.1, &[r"(?i)\bID[\s:]+([A-Za-z0-9]+)"]))
        .rule(rule(
            "chave_pix",
            0.1,
            &[r"(?i)Chave\s*Pix[\s:]+([A-Za-z0-9@.+\-]+)"],
        ))
        .rule(rule(
            "vencimento",
            0.0,
            &[r"(?i)Vencimento[\s:]*(\d{2}/\d{2}/\d{4})"],
        ))
        .rule(rule(
            "codigo_barras",
            0.0,
            &[r"(\d{5}\.\d{5}\s+\d{5}\.\d{6}\s+\d{5}\.\d{6}\s+\d\s+\d{14})"],
        ))
        .rule(rule(
            "beneficiario",
            0.0,
            &[&format!(r"(?i)Benefici[áa]ri[oa][\s:]+({NAME})\s*(?:\n|$)")],
        ))
        .rule(rule("nosso_numero", 0.0, &[r"(?i)Nosso N[úu]mero[\s:]*(\d+)"]))
        .rule(rule(
            "situacao",
            0.0,
            &[r"(?i)Situa[çc][ãa]o[\s:]*\n?\s*([\p{L}]+)"],
        ))
        .rule(rule(
            "tipo_hint",
            0.0,
            &[r"(?i)\b(pix|transfer[êe]ncia|boleto)\b"],
        ))
}

fn default_rules() -> LayoutRuleRegistry {
    LayoutRuleRegistry::new(vec![
        will_bank_rules(),
        nubank_rules(),
        caixa_rules(),
        transfer_bank_rules(Layout::BancoDoBrasil),
        transfer_bank_rules(Layout::Bradesco),
        transfer_bank_rules(Layout::Itau),
        transfer_bank_rules(Layout::Santander),
        generic_rules(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_every_layout() {
        let registry = LayoutRuleRegistry::with_default_rules();
        for layout in Layout::all() {
            let set = registry.rule_set(layout);
            assert_eq!(set.layout(), layout);
            assert!(!set.rules().is_empty(), "no rules for {:?}", layout);
        }
    }

    #[test]
    fn test_missing_layout_falls_back_to_generic() {
        let registry = LayoutRuleRegistry::new(vec![LayoutRuleSet::new(
            Layout::Generic,
            ReceiptType::Generic,
        )]);
        assert_eq!(registry.rule_set(Layout::Itau).layout(), Layout::Generic);
    }

    #[test]
    fn test_matcher_first_and_last_pick() {
        let first = rule("valor", 0.0, &[r"R\$\s*([\d.,]+)"]);
        let last = rule("valor", 0.0, &[r"R\$\s*([\d.,]+)"]).last_match();

        let text = "Documento R$ 10,00\nValor cobrado R$ 12,34";
        assert_eq!(first.apply(text), Some("10,00".to_string()));
        assert_eq!(last.apply(text), Some("12,34".to_string()));
    }

    #[test]
    fn test_fallback_chain_order() {
        let r = rule(
            "valor",
            0.0,
            &[r"Valor\s+R\$\s*([\d.,]+)", r"R\$\s*([\d.,]+)"],
        );
        // Primary pattern wins when it matches.
        assert_eq!(r.apply("Valor R$ 5,00 e taxa R$ 1,00"), Some("5,00".to_string()));
        // Fallback used when the primary finds nothing.
        assert_eq!(r.apply("total R$ 7,50"), Some("7,50".to_string()));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = ExtractionRule::new("broken", r"R\$ (").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_weight_lookup() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let set = registry.rule_set(Layout::WillBank);
        assert!(set.weight_of("valor") > 0.0);
        assert_eq!(set.weight_of("campo_inexistente"), 0.0);
    }
}
