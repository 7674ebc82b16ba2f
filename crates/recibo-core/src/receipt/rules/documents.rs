//! CPF/CNPJ format validation.
//!
//! Receipts print tax ids either fully masked (`***.120.983-**`) or in
//! full. Validation here is format-only: digit counts and separator
//! shape. The Brazilian check-digit algorithm is deliberately not
//! verified; masked ids make it impossible, and the OCR source makes it
//! unreliable even when unmasked.

use super::patterns::{CNPJ, CPF_FULL, CPF_MASKED};

/// Accepts masked (`***.120.983-**`, with ',' tolerated for '.') and
/// unmasked 11-digit CPF forms.
pub fn is_valid_cpf(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    if CPF_MASKED.is_match(s) || CPF_FULL.is_match(s) {
        return true;
    }
    // Bare digits with no separators at all.
    s.len() == 11 && s.chars().all(|c| c.is_ascii_digit())
}

/// Accepts 14-digit CNPJ forms, bare or punctuated.
pub fn is_valid_cnpj(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    if CNPJ.is_match(s) {
        return true;
    }
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.len() == 14 && s.chars().all(|c| c.is_ascii_digit() || "./-".contains(c))
}

/// A document is acceptable when it passes either format check.
pub fn is_valid_tax_id(s: &str) -> bool {
    is_valid_cpf(s) || is_valid_cnpj(s)
}

/// Whether a document string has CNPJ shape (company id). Drives the
/// PF/PJ distinction on the wire: masked and 11-digit ids are persons.
pub fn looks_like_cnpj(s: &str) -> bool {
    !s.contains('*') && s.chars().filter(|c| c.is_ascii_digit()).count() == 14
}
