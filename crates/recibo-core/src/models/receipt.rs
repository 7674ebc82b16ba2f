//! Canonical receipt data model.
//!
//! A [`Receipt`] is the bank-agnostic representation of one payment
//! receipt. It is created once by the pipeline from one text input and
//! never mutated afterwards; callers needing a different view (such as the
//! chatbot export) build a derived structure instead of editing it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::receipt::layout::Layout;

/// Non-negative monetary amount with two-digit precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount, the default for unparseable or missing values.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Build from a decimal, rounding to two digits. Negative input is
    /// rejected; receipts never carry negative amounts.
    pub fn new(amount: Decimal) -> Option<Self> {
        if amount < Decimal::ZERO {
            return None;
        }
        Some(Money(amount.round_dp(2)))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount as an f64 for the numeric wire field.
    pub fn to_f64(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

/// One party on a receipt: payer or payee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonRef {
    /// Full name as printed on the receipt.
    pub name: String,

    /// Masked or full CPF/CNPJ, as printed (e.g. `***.120.983-**`).
    pub document: String,

    /// Institution (bank) name.
    pub institution: String,

    /// PIX key, when the receipt shows one (payee side only).
    pub pix_key: String,
}

impl PersonRef {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.document.is_empty()
    }
}

/// Transaction type recognized by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReceiptType {
    Pix,
    Transfer,
    Boleto,
    #[default]
    Generic,
}

impl ReceiptType {
    /// Wire name, matching the original output files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptType::Pix => "pix",
            ReceiptType::Transfer => "transferencia",
            ReceiptType::Boleto => "boleto",
            ReceiptType::Generic => "generico",
        }
    }
}

/// Where the text came from and when it was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Origin file name, or `unknown` when the caller gave none.
    pub file: String,

    /// Processing timestamp.
    pub processed_at: DateTime<Utc>,
}

/// Canonical structured receipt, the aggregate root of the extraction
/// pipeline. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Stable identifier: the extracted transaction id when present,
    /// otherwise synthesized from source file and processing timestamp.
    pub id: String,

    /// Recognized receipt layout.
    pub layout: Layout,

    /// Transaction type.
    pub kind: ReceiptType,

    /// Transaction amount.
    pub amount: Money,

    /// Paying party.
    pub payer: PersonRef,

    /// Receiving party.
    pub payee: PersonRef,

    /// Transaction id as printed on the receipt, if any.
    pub transaction_id: String,

    /// Authentication code, if any.
    pub auth_code: String,

    /// Transaction date.
    pub date: Option<NaiveDate>,

    /// Transaction time.
    pub time: Option<NaiveTime>,

    /// Receipt status line (e.g. `Efetivado`).
    pub status: String,

    /// Free-text description, if any.
    pub description: String,

    /// Weighted extraction confidence in `[0, 1]`. Informational only.
    pub confidence: f32,

    /// Field names that contributed to the confidence score.
    pub matched_signals: Vec<String>,

    /// Parse and validation warnings, in the order they were recorded.
    pub warnings: Vec<String>,

    /// Hard-failure marker. Set only for the empty-input and internal
    /// fault terminals; such receipts carry no extracted fields.
    pub error: Option<String>,

    /// Source metadata.
    pub source: SourceInfo,
}

impl Receipt {
    /// Whether this receipt is an error terminal rather than an
    /// extraction result.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `DD/MM/YYYY HH:MM:SS` composite, empty when neither part was
    /// extracted.
    pub fn date_time_display(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        let time = self
            .time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        format!("{} {}", date, time).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_money_rounds_to_two_digits() {
        let m = Money::new(Decimal::from_str("33.005").unwrap()).unwrap();
        assert_eq!(m.value(), Decimal::from_str("33.00").unwrap());
    }

    #[test]
    fn test_money_rejects_negative() {
        assert!(Money::new(Decimal::from_str("-1.00").unwrap()).is_none());
    }

    #[test]
    fn test_receipt_type_wire_names() {
        assert_eq!(ReceiptType::Pix.as_str(), "pix");
        assert_eq!(ReceiptType::Transfer.as_str(), "transferencia");
        assert_eq!(ReceiptType::Generic.as_str(), "generico");
    }
}
