//! Canonical-schema completeness and format checks.

use crate::models::receipt::Receipt;
use crate::receipt::rules::is_valid_tax_id;

/// Validates a canonical receipt, returning warnings.
///
/// Warnings never block: the pipeline always completes and returns the
/// receipt together with its (possibly non-empty) warning list.
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, receipt: &Receipt) -> Vec<String> {
        let mut warnings = Vec::new();

        if receipt.amount.is_zero() {
            warnings.push("amount is missing or zero".to_string());
        }

        if receipt.payer.name.is_empty() {
            warnings.push("payer name is missing".to_string());
        }

        if receipt.payee.name.is_empty() {
            warnings.push("payee name is missing".to_string());
        }

        if !receipt.payer.document.is_empty() && !is_valid_tax_id(&receipt.payer.document) {
            warnings.push(format!(
                "payer document '{}' is not a valid CPF/CNPJ",
                receipt.payer.document
            ));
        }

        if !receipt.payee.document.is_empty() && !is_valid_tax_id(&receipt.payee.document) {
            warnings.push(format!(
                "payee document '{}' is not a valid CPF/CNPJ",
                receipt.payee.document
            ));
        }

        warnings
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
