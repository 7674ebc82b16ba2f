//! The extraction pipeline orchestrator.
//!
//! One fixed, linear sequence per document:
//! raw text → corrected text → layout → raw field map → receipt.
//! Every stage consumes the previous stage's immutable output, so a
//! document's run holds no shared mutable state and batches may execute
//! runs concurrently in any order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::models::config::ReciboConfig;
use crate::models::receipt::{Money, PersonRef, Receipt, ReceiptType, SourceInfo};
use crate::receipt::correction::TextCorrector;
use crate::receipt::extractor::{FieldExtractor, RawFieldMap};
use crate::receipt::layout::{Layout, LayoutClassifier};
use crate::receipt::registry::LayoutRuleRegistry;
use crate::receipt::scorer::ConfidenceScorer;
use crate::receipt::standardizer::Standardizer;
use crate::receipt::validator::Validator;

/// Full result of one document's run, for callers that persist the raw
/// extraction alongside the canonical receipt.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// The canonical receipt (error receipt on hard failure).
    pub receipt: Receipt,
    /// Raw extracted fields. Empty on hard failure.
    pub fields: RawFieldMap,
    /// Text as supplied by the OCR collaborator.
    pub raw_text: String,
    /// Text after OCR error correction.
    pub corrected_text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Receipt extraction pipeline.
pub struct Pipeline {
    corrector: TextCorrector,
    classifier: LayoutClassifier,
    registry: LayoutRuleRegistry,
    validator: Validator,
}

impl Pipeline {
    /// Pipeline with default corrector, classifier and rule registry.
    pub fn new() -> Self {
        Self {
            corrector: TextCorrector::new(),
            classifier: LayoutClassifier::new(),
            registry: LayoutRuleRegistry::with_default_rules(),
            validator: Validator::new(),
        }
    }

    /// Pipeline configured from a [`ReciboConfig`].
    pub fn from_config(config: &ReciboConfig) -> Self {
        let mut table = if config.correction.enabled {
            TextCorrector::default_table()
        } else {
            Vec::new()
        };
        table.extend(
            config
                .correction
                .extra_substitutions
                .iter()
                .map(|s| (s.from.clone(), s.to.clone())),
        );
        Self {
            corrector: TextCorrector::from_table(table),
            ..Self::new()
        }
    }

    /// Replace the rule registry, e.g. with a test rule set.
    pub fn with_registry(mut self, registry: LayoutRuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the layout classifier.
    pub fn with_classifier(mut self, classifier: LayoutClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the OCR corrector.
    pub fn with_corrector(mut self, corrector: TextCorrector) -> Self {
        self.corrector = corrector;
        self
    }

    /// Process one document, returning only the canonical receipt.
    pub fn process(&self, raw_text: &str, source_file: Option<&str>) -> Receipt {
        self.run(raw_text, source_file).receipt
    }

    /// Process one document, keeping the raw extraction alongside the
    /// receipt. Total: hard failures come back as error receipts, and no
    /// fault escapes the pipeline boundary.
    pub fn run(&self, raw_text: &str, source_file: Option<&str>) -> ExtractionOutcome {
        let start = Instant::now();
        let source = SourceInfo {
            file: source_file.unwrap_or("unknown").to_string(),
            processed_at: Utc::now(),
        };

        if raw_text.trim().is_empty() {
            warn!("Empty input for {}", source.file);
            return ExtractionOutcome {
                receipt: error_receipt(&ExtractionError::EmptyInput, source),
                fields: RawFieldMap::new(),
                raw_text: raw_text.to_string(),
                corrected_text: String::new(),
                processing_time_ms: start.elapsed().as_millis() as u64,
            };
        }

        match catch_unwind(AssertUnwindSafe(|| self.run_stages(raw_text, &source))) {
            Ok(mut outcome) => {
                outcome.processing_time_ms = start.elapsed().as_millis() as u64;
                outcome
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!("Pipeline fault for {}: {}", source.file, message);
                ExtractionOutcome {
                    receipt: error_receipt(&ExtractionError::PipelineFault(message), source),
                    fields: RawFieldMap::new(),
                    raw_text: raw_text.to_string(),
                    corrected_text: String::new(),
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
        }
    }

    fn run_stages(&self, raw_text: &str, source: &SourceInfo) -> ExtractionOutcome {
        let corrected = self.corrector.correct(raw_text);
        let layout = self.classifier.classify(&corrected);

        let fields = FieldExtractor::new(&self.registry).extract(&corrected, layout);
        let (confidence, signals) = ConfidenceScorer::new(&self.registry).score(layout, &fields);

        let mut receipt =
            Standardizer::new(&self.registry).standardize(&fields, layout, source.clone());
        receipt.confidence = confidence;
        receipt.matched_signals = signals;

        let validation = self.validator.validate(&receipt);
        receipt.warnings.extend(validation);

        info!(
            "Processed {} as {:?} ({:?}, confidence {:.2}, {} warnings)",
            source.file,
            layout,
            receipt.kind,
            receipt.confidence,
            receipt.warnings.len()
        );

        ExtractionOutcome {
            receipt,
            fields,
            raw_text: raw_text.to_string(),
            corrected_text: corrected,
            processing_time_ms: 0,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal error receipt: generic layout, zero amount, no parties.
fn error_receipt(error: &ExtractionError, source: SourceInfo) -> Receipt {
    let id = format!(
        "{}_{}",
        source
            .file
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&source.file),
        source.processed_at.format("%Y%m%d_%H%M%S")
    );

    Receipt {
        id,
        layout: Layout::Generic,
        kind: ReceiptType::Generic,
        amount: Money::ZERO,
        payer: PersonRef::default(),
        payee: PersonRef::default(),
        transaction_id: String::new(),
        auth_code: String::new(),
        date: None,
        time: None,
        status: String::new(),
        description: String::new(),
        confidence: 0.0,
        matched_signals: Vec::new(),
        warnings: Vec::new(),
        error: Some(error.to_string()),
        source,
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
