//! Core library for Brazilian payment-receipt extraction.
//!
//! This crate provides:
//! - OCR error correction and layout classification for receipt text
//! - Data-driven per-layout field extraction (PIX, transfers, boletos)
//! - Value parsing (BRL amounts, dates, CPF/CNPJ) and confidence scoring
//! - The canonical receipt schema and the persisted batch artifacts

pub mod batch;
pub mod error;
pub mod models;
pub mod receipt;

pub use batch::{ChatbotExport, StructuredReport};
pub use error::{ExtractionError, ReciboError, Result};
pub use models::config::ReciboConfig;
pub use models::receipt::{Money, PersonRef, Receipt, ReceiptType, SourceInfo};
pub use models::wire::ReceiptRecord;
pub use receipt::{
    ExtractionOutcome, FieldExtractor, Layout, LayoutClassifier, LayoutModel,
    LayoutRuleRegistry, Pipeline, RawFieldMap, TextCorrector, Validator,
};
