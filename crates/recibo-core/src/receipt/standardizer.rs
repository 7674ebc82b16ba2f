//! Mapping from layout-specific raw fields to the canonical schema.
//!
//! Each canonical slot has a fixed precedence list of raw keys; the first
//! non-empty value wins. This replaces the original system's try-every-key
//! duck typing with one explicit, ordered mapping step.

use tracing::debug;

use crate::models::receipt::{Money, PersonRef, Receipt, ReceiptType, SourceInfo};
use crate::receipt::extractor::RawFieldMap;
use crate::receipt::layout::Layout;
use crate::receipt::registry::LayoutRuleRegistry;
use crate::receipt::rules::{parse_brl, parse_date, parse_date_time, parse_time};

/// Precedence lists, canonical slot ← raw keys in priority order.
const PAYEE_NAME: &[&str] = &["destino_nome", "recebedor_nome", "beneficiario"];
const PAYEE_DOCUMENT: &[&str] = &["destino_cpf", "recebedor_cpf", "destino_cnpj", "cnpj"];
const PAYEE_INSTITUTION: &[&str] = &["destino_instituicao", "recebedor_instituicao"];
const PAYER_NAME: &[&str] = &["origem_nome", "pagador_nome", "nome"];
const PAYER_DOCUMENT: &[&str] = &["origem_cpf", "pagador_cpf", "cpf"];
const PAYER_INSTITUTION: &[&str] = &["origem_instituicao", "pagador_instituicao", "instituicao"];
const AMOUNT: &[&str] = &["valor", "valor_cobrado"];
const DATE: &[&str] = &["data", "data_hora_completa"];
const TIME: &[&str] = &["hora", "data_hora_completa"];
const TRANSACTION_ID: &[&str] = &["id_transacao"];
const AUTH_CODE: &[&str] = &["autenticacao", "chave_seguranca"];
const STATUS: &[&str] = &["situacao"];
const DESCRIPTION: &[&str] = &["descricao"];
const PIX_KEY: &[&str] = &["chave_pix"];

/// Builds a canonical [`Receipt`] from a raw field map.
pub struct Standardizer<'r> {
    registry: &'r LayoutRuleRegistry,
}

impl<'r> Standardizer<'r> {
    pub fn new(registry: &'r LayoutRuleRegistry) -> Self {
        Self { registry }
    }

    /// Map raw fields into the canonical schema. Unparseable values fall
    /// back to their defaults and append a warning; this never fails.
    pub fn standardize(
        &self,
        fields: &RawFieldMap,
        layout: Layout,
        source: SourceInfo,
    ) -> Receipt {
        let mut warnings = Vec::new();

        let amount = match pick(fields, AMOUNT) {
            Some(raw) => match parse_brl(raw).and_then(Money::new) {
                Some(money) => money,
                None => {
                    warnings.push(format!("could not parse amount '{}'", raw));
                    Money::ZERO
                }
            },
            None => Money::ZERO,
        };

        let date = match pick(fields, DATE) {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    warnings.push(format!("could not parse date '{}'", raw));
                }
                parsed
            }
            None => None,
        };

        let time = match pick(fields, TIME) {
            Some(raw) => {
                let parsed = parse_time(raw);
                if parsed.is_none() {
                    warnings.push(format!("could not parse time '{}'", raw));
                }
                parsed
            }
            None => None,
        };

        // Composite Data/Hora fills whichever half is still missing.
        let (date, time) = match fields.get("data_hora_completa") {
            Some(composite) => {
                let (d, t) = parse_date_time(composite);
                (date.or(d), time.or(t))
            }
            None => (date, time),
        };

        // The layout is the payer's own banking app; its canonical bank
        // name stands in when the receipt never names the institution.
        let payer_institution = match pick(fields, PAYER_INSTITUTION) {
            Some(value) => value.clone(),
            None => layout
                .canonical_institution()
                .unwrap_or_default()
                .to_string(),
        };

        let payer = PersonRef {
            name: pick_owned(fields, PAYER_NAME),
            document: pick_owned(fields, PAYER_DOCUMENT),
            institution: payer_institution,
            pix_key: String::new(),
        };

        let payee = PersonRef {
            name: pick_owned(fields, PAYEE_NAME),
            document: pick_owned(fields, PAYEE_DOCUMENT),
            institution: pick_owned(fields, PAYEE_INSTITUTION),
            pix_key: pick_owned(fields, PIX_KEY),
        };

        let transaction_id = pick_owned(fields, TRANSACTION_ID);
        let id = if transaction_id.is_empty() {
            synthetic_id(&source)
        } else {
            transaction_id.clone()
        };

        let kind = self.infer_kind(fields, layout);

        debug!(
            "Standardized {:?} receipt {} ({} raw fields)",
            kind,
            id,
            fields.len()
        );

        Receipt {
            id,
            layout,
            kind,
            amount,
            payer,
            payee,
            transaction_id,
            auth_code: pick_owned(fields, AUTH_CODE),
            date,
            time,
            status: pick_owned(fields, STATUS),
            description: pick_owned(fields, DESCRIPTION),
            confidence: 0.0,
            matched_signals: Vec::new(),
            warnings,
            error: None,
            source,
        }
    }

    /// Transaction type from field evidence, falling back to the
    /// layout's default kind.
    fn infer_kind(&self, fields: &RawFieldMap, layout: Layout) -> ReceiptType {
        if ["codigo_barras", "vencimento", "nosso_numero"]
            .iter()
            .any(|k| fields.contains_key(*k))
        {
            return ReceiptType::Boleto;
        }

        if let Some(hint) = fields.get("tipo_hint") {
            let hint = hint.to_lowercase();
            if hint.starts_with("pix") {
                return ReceiptType::Pix;
            }
            if hint.starts_with("transfer") {
                return ReceiptType::Transfer;
            }
            if hint.starts_with("boleto") {
                return ReceiptType::Boleto;
            }
        }

        if fields.contains_key("chave_pix") {
            return ReceiptType::Pix;
        }
        if fields.contains_key("tipo_transferencia") {
            return ReceiptType::Transfer;
        }

        self.registry.rule_set(layout).default_kind()
    }
}

fn pick<'m>(fields: &'m RawFieldMap, keys: &[&str]) -> Option<&'m String> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_empty())
}

fn pick_owned(fields: &RawFieldMap, keys: &[&str]) -> String {
    pick(fields, keys).cloned().unwrap_or_default()
}

/// `{file_stem}_{YYYYmmdd_HHMMSS}`, the fallback identifier when the
/// receipt itself printed no transaction id.
fn synthetic_id(source: &SourceInfo) -> String {
    let stem = source
        .file
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&source.file);
    format!("{}_{}", stem, source.processed_at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn source() -> SourceInfo {
        SourceInfo {
            file: "comprovante_001.jpg".to_string(),
            processed_at: Utc.with_ymd_and_hms(2025, 5, 20, 18, 0, 0).unwrap(),
        }
    }

    fn map(fields: &[(&str, &str)]) -> RawFieldMap {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_precedence_first_non_empty_wins() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let fields = map(&[
            ("destino_nome", "Ana Cleuma Sousa Dos Santos"),
            ("recebedor_nome", "OUTRO NOME"),
            ("valor", "33,00"),
        ]);
        let receipt = mapper.standardize(&fields, Layout::WillBank, source());

        assert_eq!(receipt.payee.name, "Ana Cleuma Sousa Dos Santos");
        assert_eq!(
            receipt.amount.value(),
            Decimal::from_str("33.00").unwrap()
        );
    }

    #[test]
    fn test_unparseable_amount_defaults_with_warning() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let fields = map(&[("valor", ",,")]);
        let receipt = mapper.standardize(&fields, Layout::Generic, source());

        assert!(receipt.amount.is_zero());
        assert_eq!(receipt.warnings.len(), 1);
        assert!(receipt.warnings[0].contains("could not parse amount"));
    }

    #[test]
    fn test_synthetic_id_when_no_transaction_id() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let receipt = mapper.standardize(&map(&[]), Layout::Generic, source());
        assert_eq!(receipt.id, "comprovante_001_20250520_180000");
        assert!(receipt.transaction_id.is_empty());
    }

    #[test]
    fn test_extracted_transaction_id_becomes_receipt_id() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let fields = map(&[("id_transacao", "E238627622025052020")]);
        let receipt = mapper.standardize(&fields, Layout::Caixa, source());
        assert_eq!(receipt.id, "E238627622025052020");
    }

    #[test]
    fn test_composite_date_time_fills_missing_halves() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let fields = map(&[("data_hora_completa", "20/05/2025 - 17:51:22")]);
        let receipt = mapper.standardize(&fields, Layout::Caixa, source());

        assert_eq!(receipt.date_time_display(), "20/05/2025 17:51:22");
    }

    #[test]
    fn test_missing_date_stays_missing() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let receipt = mapper.standardize(&map(&[]), Layout::Generic, source());
        assert!(receipt.date.is_none());
        assert!(receipt.time.is_none());
        assert_eq!(receipt.date_time_display(), "");
    }

    #[test]
    fn test_payer_institution_falls_back_to_layout_bank() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let caixa = mapper.standardize(&map(&[]), Layout::Caixa, source());
        assert_eq!(caixa.payer.institution, "CAIXA ECONÔMICA FEDERAL");

        let explicit = mapper.standardize(
            &map(&[("pagador_instituicao", "BANCO INTER")]),
            Layout::Caixa,
            source(),
        );
        assert_eq!(explicit.payer.institution, "BANCO INTER");

        let generic = mapper.standardize(&map(&[]), Layout::Generic, source());
        assert!(generic.payer.institution.is_empty());
    }

    #[test]
    fn test_kind_inference() {
        let registry = LayoutRuleRegistry::with_default_rules();
        let mapper = Standardizer::new(&registry);

        let boleto = mapper.standardize(
            &map(&[("vencimento", "10/06/2025")]),
            Layout::Generic,
            source(),
        );
        assert_eq!(boleto.kind, ReceiptType::Boleto);

        let pix = mapper.standardize(
            &map(&[("chave_pix", "(88) 99451-5533")]),
            Layout::Generic,
            source(),
        );
        assert_eq!(pix.kind, ReceiptType::Pix);

        let layout_default = mapper.standardize(&map(&[]), Layout::WillBank, source());
        assert_eq!(layout_default.kind, ReceiptType::Pix);

        let generic = mapper.standardize(&map(&[]), Layout::Generic, source());
        assert_eq!(generic.kind, ReceiptType::Generic);
    }
}
