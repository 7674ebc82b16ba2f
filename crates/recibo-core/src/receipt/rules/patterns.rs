//! Shared regex patterns for value parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date patterns: DD/MM/YYYY, DD-MM-YYYY and the abbreviated month
    // form used by app receipts (e.g. "20 MAI 2025").
    pub static ref DATE_DMY: Regex =
        Regex::new(r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\b").unwrap();

    pub static ref DATE_ABBREV: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)\s+(\d{4})\b"
    )
    .unwrap();

    // Time: HH:MM with optional seconds.
    pub static ref TIME: Regex =
        Regex::new(r"\b(\d{1,2}):(\d{2})(?::(\d{2}))?\b").unwrap();

    // CPF: masked (***.120.983-**) with ',' tolerated for '.' as OCR
    // noise, or full 11-digit with optional punctuation.
    pub static ref CPF_MASKED: Regex =
        Regex::new(r"^\*{3}[.,]?\d{3}[.,]?\d{3}-?\*{2}$").unwrap();

    pub static ref CPF_FULL: Regex =
        Regex::new(r"^\d{3}[.,]?\d{3}[.,]?\d{3}-?\d{2}$").unwrap();

    // CNPJ: 14-digit, bare or punctuated (12.345.678/0001-90).
    pub static ref CNPJ: Regex =
        Regex::new(r"^\d{2}[.,]?\d{3}[.,]?\d{3}/?\d{4}-?\d{2}$").unwrap();
}
